//! Panel 3: Help. Keyboard shortcuts and colour legend.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use holdlens_core::palette::ColorCategory;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-3", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "Esc", "Dismiss the error banner");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1: Holdings");
    key(&mut lines, "o", "Open a holdings file");
    key(&mut lines, "r", "Reload the current file");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "Enter / Space", "Open or close the company detail");
    key(&mut lines, "l / h", "Open / close the company detail");
    key(&mut lines, "J / K", "Scroll the detail cards");
    key(&mut lines, "a", "Load every company");
    if app.dashboard.mode().filtering {
        key(&mut lines, "/", "Filter names (Esc clears)");
    }
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2: Lookup");
    key(&mut lines, "s / Enter", "Look up a company by name");
    key(&mut lines, "j / k", "Scroll the detail cards");
    lines.push(Line::from(""));

    section(&mut lines, "Signal colours");
    for category in ColorCategory::ALL {
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>20}  ", "")),
            Span::styled(format!(" {:<10} ", category.tag()), theme::card_style(category)),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
