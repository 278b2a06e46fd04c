//! Application state: single-owner, main-thread only.
//!
//! Per-stock data lives in the core [`Dashboard`]; this adds what only the
//! terminal needs (panel focus, cursor, which rows are open, overlays, error
//! history) and the channel to the worker.

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;
use tracing::warn;

use holdlens_core::store::{Action, Dashboard, FailureKind};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Holdings,
    Lookup,
    Help,
}

impl Panel {
    const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Panel::Holdings => 0,
            Panel::Lookup => 1,
            Panel::Help => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Holdings),
            1 => Some(Panel::Lookup),
            2 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Holdings => "Holdings",
            Panel::Lookup => "Lookup",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Holdings)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT)
            .unwrap_or(Panel::Holdings)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An entry in the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    NotFound,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Service => "SVC",
            ErrorCategory::NotFound => "N/F",
            ErrorCategory::Other => "ERR",
        }
    }
}

impl From<FailureKind> for ErrorCategory {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Network => ErrorCategory::Network,
            FailureKind::Service => ErrorCategory::Service,
            FailureKind::NotFound => ErrorCategory::NotFound,
        }
    }
}

/// Holdings panel view state.
#[derive(Debug, Default)]
pub struct HoldingsView {
    /// Index into the visible (filtered) names.
    pub cursor: usize,
    /// Names whose detail is open.
    pub expanded: HashSet<String>,
    /// Card rows scrolled off the top of the detail pane.
    pub detail_scroll: usize,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    FilePath,
    Filter,
    Lookup,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,

    pub dashboard: Dashboard,
    pub holdings: HoldingsView,
    pub lookup_scroll: usize,

    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub input: String,
    pub base_url: String,
}

impl AppState {
    pub fn new(
        dashboard: Dashboard,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        base_url: String,
    ) -> Self {
        Self {
            active_panel: Panel::Holdings,
            running: true,
            dashboard,
            holdings: HoldingsView::default(),
            lookup_scroll: 0,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            input: String::new(),
            base_url,
        }
    }

    /// Run an action through the store, hand its effects to the worker and
    /// record any failures it raised.
    pub fn dispatch(&mut self, action: Action) {
        for effect in self.dashboard.dispatch(action) {
            if self.worker_tx.send(WorkerCommand::Execute(effect)).is_err() {
                warn!("worker channel closed");
                self.push_error(
                    ErrorCategory::Other,
                    "Background worker is not running".into(),
                    String::new(),
                );
                break;
            }
        }
        for failure in self.dashboard.take_failures() {
            self.push_error(failure.kind.into(), failure.message, failure.context);
        }
        self.clamp_cursor();
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Completed(action) => self.dispatch(action),
        }
    }

    /// Start loading a holdings file and reset the list view.
    pub fn load_file(&mut self, path: String) {
        self.holdings = HoldingsView::default();
        self.dispatch(Action::LoadStocks { file_path: path });
    }

    /// Name under the holdings cursor.
    pub fn selected_name(&self) -> Option<String> {
        self.dashboard
            .visible_names()
            .get(self.holdings.cursor)
            .map(|name| name.to_string())
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.dashboard.visible_names().len();
        if self.holdings.cursor >= len {
            self.holdings.cursor = len.saturating_sub(1);
        }
    }

    /// Open or close the detail of the name under the cursor. Opening a name
    /// asks the store to resolve it.
    pub fn toggle_selected(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        self.holdings.detail_scroll = 0;
        if self.holdings.expanded.remove(&name) {
            return;
        }
        self.holdings.expanded.insert(name.clone());
        self.dispatch(Action::Expand { name });
    }

    pub fn dismiss_error(&mut self) {
        self.dashboard.dispatch(Action::DismissError);
        if matches!(self.status_message, Some((_, StatusLevel::Error))) {
            self.status_message = None;
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
