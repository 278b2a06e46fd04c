//! Panel 2: Lookup. Resolve any company name and show its detail.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use holdlens_core::store::LookupStatus;

use crate::app::AppState;
use crate::theme;
use crate::ui::cards;

const MAX_CANDIDATES: usize = 3;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(lookup) = app.dashboard.lookup() else {
        let text = vec![
            Line::from(Span::styled("No lookup yet.", theme::muted())),
            Line::from(""),
            Line::from(Span::styled(
                "Press s to search for a company by name.",
                theme::muted(),
            )),
        ];
        f.render_widget(Paragraph::new(text), area);
        return;
    };

    let mut header = vec![Line::from(vec![
        Span::styled("Company: ", theme::muted()),
        Span::styled(lookup.company.as_str(), theme::accent_bold()),
        Span::styled("  [s]earch [j/k]scroll", theme::muted()),
    ])];

    match &lookup.status {
        LookupStatus::Resolving => {
            header.push(Line::from(Span::styled("Resolving symbol…", theme::warning())));
        }
        LookupStatus::Resolved(symbol) => {
            header.push(Line::from(vec![
                Span::styled("Symbol: ", theme::muted()),
                Span::styled(symbol.as_str(), theme::neutral()),
            ]));
            for candidate in lookup.candidates.iter().take(MAX_CANDIDATES) {
                let symbol = candidate.symbol().unwrap_or("-");
                let name = candidate.display_name().unwrap_or("");
                header.push(Line::from(Span::styled(
                    format!("  {symbol:<14} {name}"),
                    theme::muted(),
                )));
            }
        }
        LookupStatus::NotFound | LookupStatus::Failed(_) => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header.len() as u16 + 1), Constraint::Min(1)])
        .split(area);
    f.render_widget(Paragraph::new(header), chunks[0]);

    cards::render_detail(f, chunks[1], &lookup.detail_state(), app.lookup_scroll);
}
