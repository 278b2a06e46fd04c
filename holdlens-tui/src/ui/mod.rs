//! Top-level UI layout: one panel at a time plus a status bar.

pub mod cards;
pub mod help_panel;
pub mod holdings_panel;
pub mod lookup_panel;
pub mod overlays;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area, &app.base_url),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::FilePath => overlays::render_prompt(
            f,
            main_area,
            " Open Holdings File [Enter]load [Esc]cancel ",
            "Path to the holdings spreadsheet (as seen by the service):",
            &app.input,
        ),
        Overlay::Filter => overlays::render_prompt(
            f,
            main_area,
            " Filter [Enter]keep [Esc]clear ",
            "Company name contains:",
            &app.input,
        ),
        Overlay::Lookup => overlays::render_prompt(
            f,
            main_area,
            " Company Lookup [Enter]search [Esc]cancel ",
            "Company name:",
            &app.input,
        ),
        Overlay::None => {}
    }
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Holdings => holdings_panel::render(f, inner, app),
        Panel::Lookup => lookup_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
