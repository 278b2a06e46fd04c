//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use holdlens_core::store::Action;

use crate::app::{AppState, Overlay, Panel};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            if key.code == KeyCode::Char('o') {
                open_file_prompt(app);
            }
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::FilePath => {
            handle_file_overlay(app, key);
            return;
        }
        Overlay::Filter => {
            handle_filter_overlay(app, key);
            return;
        }
        Overlay::Lookup => {
            handle_lookup_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Holdings; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Lookup; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Help; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        KeyCode::Esc => {
            app.dismiss_error();
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Holdings => handle_holdings_key(app, key),
        Panel::Lookup => handle_lookup_key(app, key),
        Panel::Help => {}
    }
}

fn open_file_prompt(app: &mut AppState) {
    app.input = app.dashboard.file_path().unwrap_or_default().to_string();
    app.overlay = Overlay::FilePath;
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

/// Shared line editing for the text prompts. Returns true if the input changed.
fn edit_input(input: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Backspace => input.pop().is_some(),
        KeyCode::Char(c) => {
            input.push(c);
            true
        }
        _ => false,
    }
}

fn handle_file_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.input.clear();
        }
        KeyCode::Enter => {
            let path = std::mem::take(&mut app.input);
            app.overlay = Overlay::None;
            if path.trim().is_empty() {
                app.set_warning("Enter a file path");
            } else if app.dashboard.loading() {
                app.set_warning("Still loading, try again when it finishes");
            } else {
                app.set_status(format!("Loading {}", path.trim()));
                app.load_file(path);
            }
        }
        code => {
            edit_input(&mut app.input, code);
        }
    }
}

/// The filter applies on every keystroke.
fn handle_filter_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.input.clear();
            app.dispatch(Action::SetQuery {
                query: String::new(),
            });
        }
        KeyCode::Enter => {
            app.overlay = Overlay::None;
        }
        code => {
            if edit_input(&mut app.input, code) {
                let query = app.input.clone();
                app.dispatch(Action::SetQuery { query });
            }
        }
    }
}

fn handle_lookup_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.input.clear();
        }
        KeyCode::Enter => {
            let company = std::mem::take(&mut app.input);
            app.overlay = Overlay::None;
            if company.trim().is_empty() {
                return;
            }
            app.active_panel = Panel::Lookup;
            app.lookup_scroll = 0;
            app.dispatch(Action::Lookup { company });
        }
        code => {
            edit_input(&mut app.input, code);
        }
    }
}

fn handle_holdings_key(app: &mut AppState, key: KeyEvent) {
    let row_count = app.dashboard.visible_names().len();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if row_count > 0 && app.holdings.cursor + 1 < row_count {
                app.holdings.cursor += 1;
                app.holdings.detail_scroll = 0;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.holdings.cursor = app.holdings.cursor.saturating_sub(1);
            app.holdings.detail_scroll = 0;
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.holdings.cursor = 0;
            app.holdings.detail_scroll = 0;
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.holdings.cursor = row_count.saturating_sub(1);
            app.holdings.detail_scroll = 0;
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(name) = app.selected_name() {
                if !app.holdings.expanded.contains(&name) {
                    app.toggle_selected();
                }
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(name) = app.selected_name() {
                app.holdings.expanded.remove(&name);
            }
        }
        KeyCode::Char('J') | KeyCode::PageDown => {
            app.holdings.detail_scroll += 1;
        }
        KeyCode::Char('K') | KeyCode::PageUp => {
            app.holdings.detail_scroll = app.holdings.detail_scroll.saturating_sub(1);
        }
        KeyCode::Char('a') => {
            if row_count == 0 {
                app.set_warning("Load a holdings file first");
            } else {
                app.dispatch(Action::LoadAll);
            }
        }
        KeyCode::Char('o') => open_file_prompt(app),
        KeyCode::Char('r') => {
            if app.dashboard.loading() {
                app.set_warning("Still loading, try again when it finishes");
                return;
            }
            match app.dashboard.file_path().map(str::to_string) {
                Some(path) => app.load_file(path),
                None => open_file_prompt(app),
            }
        }
        KeyCode::Char('/') => {
            if app.dashboard.mode().filtering {
                app.input = app.dashboard.query().to_string();
                app.overlay = Overlay::Filter;
            } else {
                app.set_warning("Filtering is disabled");
            }
        }
        _ => {}
    }
}

fn handle_lookup_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('s') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input.clear();
            app.overlay = Overlay::Lookup;
        }
        KeyCode::Char('j') | KeyCode::Down | KeyCode::PageDown => {
            app.lookup_scroll += 1;
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::PageUp => {
            app.lookup_scroll = app.lookup_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    use holdlens_core::store::Effect;

    use crate::app::StatusLevel;
    use crate::test_helpers::{load_names, test_app};
    use crate::worker::WorkerCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(app, press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn quit_key_stops_the_app() {
        let (mut app, _cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn number_keys_switch_panels() {
        let (mut app, _cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('2')));
        assert_eq!(app.active_panel, Panel::Lookup);
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.active_panel, Panel::Help);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _cmd_rx) = test_app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn file_prompt_loads_on_enter() {
        let (mut app, cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('o')));
        assert_eq!(app.overlay, Overlay::FilePath);
        type_text(&mut app, "/data/holdings.xlsx");
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.overlay, Overlay::None);
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            WorkerCommand::Execute(Effect::LoadNames { file_path, .. }) if file_path == "/data/holdings.xlsx"
        ));
    }

    #[test]
    fn empty_file_prompt_sends_nothing() {
        let (mut app, cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('o')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn filter_updates_per_keystroke_and_clears_on_escape() {
        let (mut app, _cmd_rx) = test_app();
        load_names(&mut app, &["Alpha", "Beta"]);

        handle_key(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.overlay, Overlay::Filter);
        type_text(&mut app, "be");
        assert_eq!(app.dashboard.visible_names(), vec!["Beta"]);

        handle_key(&mut app, press(KeyCode::Backspace));
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.dashboard.visible_names().len(), 2);

        type_text(&mut app, "al");
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.dashboard.query(), "");
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn enter_expands_row_under_cursor() {
        let (mut app, cmd_rx) = test_app();
        load_names(&mut app, &["Alpha", "Beta"]);
        while cmd_rx.try_recv().is_ok() {}

        handle_key(&mut app, press(KeyCode::Char('j')));
        handle_key(&mut app, press(KeyCode::Enter));

        assert!(app.holdings.expanded.contains("Beta"));
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            WorkerCommand::Execute(Effect::SearchSymbol { company, .. }) if company == "Beta"
        ));
    }

    #[test]
    fn load_all_requests_every_name() {
        let (mut app, cmd_rx) = test_app();
        load_names(&mut app, &["A", "B", "C"]);
        while cmd_rx.try_recv().is_ok() {}

        handle_key(&mut app, press(KeyCode::Char('a')));
        assert_eq!(cmd_rx.try_iter().count(), 3);
        assert!(app.dashboard.loading());
    }

    #[test]
    fn reload_while_loading_keeps_the_view() {
        let (mut app, cmd_rx) = test_app();
        load_names(&mut app, &["A", "B", "C"]);
        handle_key(&mut app, press(KeyCode::Char('a')));
        handle_key(&mut app, press(KeyCode::Char('j')));
        app.holdings.expanded.insert("B".into());
        while cmd_rx.try_recv().is_ok() {}

        handle_key(&mut app, press(KeyCode::Char('r')));

        assert_eq!(app.holdings.cursor, 1);
        assert!(app.holdings.expanded.contains("B"));
        assert!(cmd_rx.try_recv().is_err());
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));
    }

    #[test]
    fn reload_when_idle_refetches_the_file() {
        let (mut app, cmd_rx) = test_app();
        load_names(&mut app, &["A", "B"]);
        handle_key(&mut app, press(KeyCode::Char('j')));
        while cmd_rx.try_recv().is_ok() {}

        handle_key(&mut app, press(KeyCode::Char('r')));

        assert_eq!(app.holdings.cursor, 0);
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            WorkerCommand::Execute(Effect::LoadNames { file_path, .. }) if file_path == "holdings.xlsx"
        ));
    }

    #[test]
    fn lookup_prompt_switches_panel() {
        let (mut app, cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('2')));
        handle_key(&mut app, press(KeyCode::Char('s')));
        type_text(&mut app, "Wipro");
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.active_panel, Panel::Lookup);
        assert_eq!(app.dashboard.lookup().unwrap().company, "Wipro");
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            WorkerCommand::Execute(Effect::SearchSymbol { .. })
        ));
    }

    #[test]
    fn error_overlay_toggles() {
        let (mut app, _cmd_rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.overlay, Overlay::None);
    }
}
