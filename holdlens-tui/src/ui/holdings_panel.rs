//! Panel 1: Holdings. Company list with summary badges, detail of the
//! selected row on the right.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use holdlens_core::config::Resolution;
use holdlens_core::store::StockRecord;

use crate::app::AppState;
use crate::theme;
use crate::ui::cards;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let dash = &app.dashboard;

    let mut header: Vec<Line> = Vec::new();
    let file = dash.file_path().unwrap_or("(no file)");
    let mode = match dash.mode().resolution {
        Resolution::Eager => "eager",
        Resolution::Lazy => "lazy",
    };
    header.push(Line::from(vec![
        Span::styled("File: ", theme::muted()),
        Span::styled(file, theme::accent()),
        Span::styled(format!("  {} names", dash.names().len()), theme::muted()),
        Span::styled(format!("  [{mode}]"), theme::neutral()),
        Span::styled("  [o]pen [a]ll [r]eload [/]filter", theme::muted()),
    ]));

    if dash.loading() {
        let pending = dash.batch_pending();
        let text = if pending > 0 {
            format!("Loading… {pending} pending")
        } else {
            "Loading…".to_string()
        };
        header.push(Line::from(Span::styled(text, theme::warning())));
    }
    if let Some(error) = dash.error() {
        header.push(Line::from(vec![
            Span::styled(error, theme::negative().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc]dismiss", theme::muted()),
        ]));
    }
    if !dash.query().is_empty() {
        header.push(Line::from(vec![
            Span::styled("Filter: ", theme::muted()),
            Span::styled(dash.query(), theme::accent_bold()),
        ]));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header.len() as u16 + 1), Constraint::Min(1)])
        .split(area);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_list(f, body[0], app);
    render_detail_pane(f, body[1], app);
}

fn row_item<'a>(app: &AppState, name: &'a str, record: Option<&StockRecord>) -> ListItem<'a> {
    let expanded = app.holdings.expanded.contains(name);
    let arrow = if expanded { "▾" } else { "▸" };

    let mut first = vec![Span::raw(format!("{arrow} ")), Span::styled(name, theme::accent())];
    let mut lines = Vec::with_capacity(2);
    if let Some(record) = record {
        first.push(Span::styled(
            format!("  {}", record.phase.label()),
            theme::phase_style(&record.phase),
        ));
        if let Some(symbol) = &record.symbol {
            first.push(Span::styled(format!("  {symbol}"), theme::muted()));
        }
        lines.push(Line::from(first));

        let badges = record.summary();
        if !badges.is_empty() {
            let mut spans = vec![Span::raw("    ")];
            spans.extend(cards::badge_spans(&badges));
            lines.push(Line::from(spans));
        }
    } else {
        lines.push(Line::from(first));
    }
    ListItem::new(Text::from(lines))
}

fn render_list(f: &mut Frame, area: Rect, app: &AppState) {
    let names = app.dashboard.visible_names();
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(theme::muted());

    if names.is_empty() {
        let hint = if app.dashboard.names().is_empty() {
            "Press o to open a holdings file."
        } else {
            "No names match the filter."
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, theme::muted())).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = names
        .iter()
        .map(|&name| row_item(app, name, app.dashboard.record(name)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ")
        .highlight_style(theme::accent_bold().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.holdings.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail_pane(f: &mut Frame, area: Rect, app: &AppState) {
    let inner = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(1),
        ..area
    };

    let Some(name) = app.selected_name() else {
        return;
    };
    let Some(record) = app.dashboard.record(&name) else {
        return;
    };

    let mut title = vec![Span::styled(name.as_str(), theme::accent_bold())];
    if let Some(symbol) = &record.symbol {
        title.push(Span::styled(format!("  {symbol}"), theme::neutral()));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

    if app.holdings.expanded.contains(&name) {
        cards::render_detail(
            f,
            chunks[1],
            &record.detail_state(),
            app.holdings.detail_scroll,
        );
    } else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Press Enter to open the detail.",
                theme::muted(),
            )),
            chunks[1],
        );
    }
}
