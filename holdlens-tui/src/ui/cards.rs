//! Stock detail rendering: indicator and fundamental card grids, and the
//! compact summary badges used in list rows.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use holdlens_core::detail::DetailState;
use holdlens_core::model::{History, IndicatorEntry};
use holdlens_core::palette::{fundamental_category, fundamental_emphasis, indicator_category};

use crate::theme;

const CARD_HEIGHT: u16 = 4;

/// One coloured tile in a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub value: String,
    pub label: Option<String>,
    pub fill: Style,
    pub value_style: Style,
}

pub fn indicator_cards(history: &History) -> Vec<Card> {
    history
        .indicators
        .iter()
        .map(|entry| {
            let fill = theme::card_style(indicator_category(entry));
            Card {
                title: entry.key.clone(),
                value: entry.value.render(" / "),
                label: entry.value.label.clone(),
                fill,
                value_style: fill.add_modifier(Modifier::BOLD),
            }
        })
        .collect()
}

pub fn fundamental_cards(history: &History) -> Vec<Card> {
    history
        .fundamentals
        .iter()
        .map(|entry| {
            let fill = theme::card_style(fundamental_category(&entry.value));
            Card {
                title: entry.key.clone(),
                value: entry.value.render(),
                label: None,
                fill,
                value_style: theme::emphasis_style(fill, fundamental_emphasis(&entry.value)),
            }
        })
        .collect()
}

/// Cards per grid row for a pane `width` columns wide.
pub fn columns_for(width: u16) -> usize {
    match width {
        w if w >= 100 => 4,
        w if w >= 48 => 2,
        _ => 1,
    }
}

pub fn badge_spans(entries: &[&IndicatorEntry]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        spans.push(Span::styled(
            format!(" {} ", entry.badge()),
            theme::badge_style(indicator_category(entry)),
        ));
        spans.push(Span::raw(" "));
    }
    spans
}

enum Row<'a> {
    Heading(&'static str),
    Cards(&'a [Card]),
}

impl Row<'_> {
    fn height(&self) -> u16 {
        match self {
            Row::Heading(_) => 1,
            Row::Cards(_) => CARD_HEIGHT,
        }
    }
}

/// Render a detail pane. `scroll` skips that many grid rows from the top.
pub fn render_detail(f: &mut Frame, area: Rect, state: &DetailState, scroll: usize) {
    let message = match state {
        DetailState::Empty => Some(Span::styled("Open a row to load its detail.", theme::muted())),
        DetailState::Loading => Some(Span::styled("Loading…", theme::warning())),
        DetailState::NotFound => Some(Span::styled("No ticker found", theme::neutral())),
        DetailState::Failed(message) => Some(Span::styled(message.clone(), theme::negative())),
        DetailState::Loaded(history) if history.is_empty() => {
            Some(Span::styled("No data returned for this symbol.", theme::muted()))
        }
        DetailState::Loaded(_) => None,
    };
    if let Some(span) = message {
        f.render_widget(Paragraph::new(Line::from(span)).wrap(Wrap { trim: true }), area);
        return;
    }
    let DetailState::Loaded(history) = state else {
        return;
    };

    let columns = columns_for(area.width);
    let indicators = indicator_cards(history);
    let fundamentals = fundamental_cards(history);

    let mut rows = vec![Row::Heading("Technical Indicators")];
    rows.extend(indicators.chunks(columns).map(Row::Cards));
    if !fundamentals.is_empty() {
        rows.push(Row::Heading("Fundamentals"));
        rows.extend(fundamentals.chunks(columns).map(Row::Cards));
    }

    let skip = scroll.min(rows.len().saturating_sub(1));
    let mut y = area.y;
    for row in rows.iter().skip(skip) {
        let height = row.height();
        if y + height > area.bottom() {
            break;
        }
        let slot = Rect::new(area.x, y, area.width, height);
        match row {
            Row::Heading(title) => {
                f.render_widget(Paragraph::new(Span::styled(*title, theme::accent_bold())), slot);
            }
            Row::Cards(cards) => render_card_row(f, slot, cards, columns),
        }
        y += height;
    }
}

fn render_card_row(f: &mut Frame, area: Rect, cards: &[Card], columns: usize) {
    let constraints = vec![Constraint::Ratio(1, columns as u32); columns];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, slot) in cards.iter().zip(slots.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(card.title.as_str(), card.fill.add_modifier(Modifier::BOLD)))
            .style(card.fill);
        let mut lines = vec![Line::from(Span::styled(card.value.as_str(), card.value_style))];
        if let Some(label) = &card.label {
            lines.push(Line::from(Span::styled(label.as_str(), card.fill)));
        }
        f.render_widget(Paragraph::new(lines).block(block), *slot);
    }
}
