//! Running store effects against a [`DashboardApi`].

use std::collections::VecDeque;

use crate::api::DashboardApi;
use crate::store::{Action, Dashboard, Effect};

/// Perform one effect and turn its outcome into the completion action.
pub fn execute(api: &dyn DashboardApi, effect: Effect) -> Action {
    match effect {
        Effect::LoadNames { epoch, file_path } => Action::NamesLoaded {
            epoch,
            result: api.load_names(&file_path),
        },
        Effect::SearchSymbol { target, company } => Action::SymbolResolved {
            target,
            result: api.search_symbol(&company),
        },
        Effect::FetchHistory { target, symbol } => Action::HistoryLoaded {
            target,
            result: api.fetch_history(&symbol),
        },
    }
}

/// Dispatch `action` and keep executing the resulting effects, in order and
/// on the calling thread, until none remain. Returns how many ran.
pub fn run_until_idle(dashboard: &mut Dashboard, api: &dyn DashboardApi, action: Action) -> usize {
    let mut queue: VecDeque<Effect> = dashboard.dispatch(action).into();
    let mut executed = 0;
    while let Some(effect) = queue.pop_front() {
        executed += 1;
        let completion = execute(api, effect);
        queue.extend(dashboard.dispatch(completion));
    }
    executed
}
