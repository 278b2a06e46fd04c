//! Stock detail view state.
//!
//! A detail view shows one symbol. Given pre-fetched history it displays it
//! directly; otherwise it asks its owner for exactly one fetch the first time
//! the symbol is shown and waits in `Loading` until [`DetailView::complete`].

use crate::api::ApiError;
use crate::model::History;

/// Message shown when a detail fetch fails without a service-provided reason.
pub const FETCH_FAILED: &str = "Error fetching stock info";

/// What a detail pane should display.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Empty,
    Loading,
    NotFound,
    Loaded(History),
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct DetailView {
    symbol: Option<String>,
    state: DetailState,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Show `symbol`. Returns true when the caller must fetch its history.
    pub fn show(&mut self, symbol: &str, preloaded: Option<History>) -> bool {
        if let Some(history) = preloaded {
            self.symbol = Some(symbol.to_string());
            self.state = DetailState::Loaded(history);
            return false;
        }
        if self.symbol.as_deref() == Some(symbol) {
            return false;
        }
        self.symbol = Some(symbol.to_string());
        self.state = DetailState::Loading;
        true
    }

    /// Apply a fetch result. Results for any other symbol, or arriving when
    /// nothing is loading, are ignored. Returns whether it was applied.
    pub fn complete(&mut self, symbol: &str, result: Result<History, ApiError>) -> bool {
        if self.symbol.as_deref() != Some(symbol) || self.state != DetailState::Loading {
            return false;
        }
        self.state = match result {
            Ok(history) => DetailState::Loaded(history),
            Err(err) => DetailState::Failed(
                err.service_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| FETCH_FAILED.to_string()),
            ),
        };
        true
    }
}
