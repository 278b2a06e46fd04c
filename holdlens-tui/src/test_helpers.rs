//! Test helpers for building an app wired to in-memory channels

use std::sync::mpsc::{self, Receiver};

use holdlens_core::config::{Resolution, ShellMode};
use holdlens_core::store::{Action, Dashboard};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

/// A lazy, filtering app plus the receiving end of its worker channel.
pub fn test_app() -> (AppState, Receiver<WorkerCommand>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let dashboard = Dashboard::new(ShellMode {
        resolution: Resolution::Lazy,
        filtering: true,
    });
    let app = AppState::new(dashboard, cmd_tx, resp_rx, "http://localhost:8000".into());
    (app, cmd_rx)
}

/// Load `names` as if the service had answered.
pub fn load_names(app: &mut AppState, names: &[&str]) {
    app.load_file("holdings.xlsx".into());
    app.handle_response(WorkerResponse::Completed(Action::NamesLoaded {
        epoch: app.dashboard.epoch(),
        result: Ok(names.iter().map(|s| s.to_string()).collect()),
    }));
}
