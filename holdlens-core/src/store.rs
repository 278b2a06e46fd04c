//! The dashboard state container.
//!
//! All per-stock state lives in one [`Dashboard`], keyed by company name and
//! changed only through [`Dashboard::dispatch`]. Dispatch returns the
//! [`Effect`]s (service requests) the transition calls for; whoever runs them
//! reports back with another [`Action`].
//!
//! Every request carries a [`Target`] ticket. A completion is applied only if
//! its ticket still matches the record: the session epoch must be current
//! and the record generation unchanged. A record has at most one request in
//! flight, so concurrent triggers for the same name never duplicate work.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::config::{Resolution, ShellMode};
use crate::detail::{DetailState, DetailView};
use crate::filter::filter_names;
use crate::model::{first_symbol, History, IndicatorEntry, SymbolMatch};

/// Who a request's result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Holding {
        epoch: u64,
        name: String,
        generation: u64,
    },
    Lookup {
        seq: u64,
    },
}

/// A service request the store wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadNames { epoch: u64, file_path: String },
    SearchSymbol { target: Target, company: String },
    FetchHistory { target: Target, symbol: String },
}

/// Everything that can change dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadStocks {
        file_path: String,
    },
    NamesLoaded {
        epoch: u64,
        result: Result<Vec<String>, ApiError>,
    },
    /// The user opened a name's detail.
    Expand {
        name: String,
    },
    LoadAll,
    SymbolResolved {
        target: Target,
        result: Result<Vec<SymbolMatch>, ApiError>,
    },
    HistoryLoaded {
        target: Target,
        result: Result<History, ApiError>,
    },
    SetQuery {
        query: String,
    },
    /// Resolve a free-text company name and show its detail.
    Lookup {
        company: String,
    },
    DismissError,
}

/// Where a name is in its resolve → fetch pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Unresolved,
    ResolvingSymbol,
    SymbolNotFound,
    FetchingHistory,
    Ready,
    Failed(String),
}

impl Phase {
    pub fn in_flight(&self) -> bool {
        matches!(self, Phase::ResolvingSymbol | Phase::FetchingHistory)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Unresolved => "unresolved",
            Phase::ResolvingSymbol => "resolving",
            Phase::SymbolNotFound => "no ticker",
            Phase::FetchingHistory => "loading",
            Phase::Ready => "ready",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Per-company state.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub name: String,
    pub phase: Phase,
    pub symbol: Option<String>,
    pub candidates: Vec<SymbolMatch>,
    pub history: Option<History>,
    generation: u64,
}

impl StockRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            phase: Phase::Unresolved,
            symbol: None,
            candidates: Vec::new(),
            history: None,
            generation: 0,
        }
    }

    pub fn detail_state(&self) -> DetailState {
        match &self.phase {
            Phase::Unresolved => DetailState::Empty,
            Phase::ResolvingSymbol | Phase::FetchingHistory => DetailState::Loading,
            Phase::SymbolNotFound => DetailState::NotFound,
            Phase::Ready => DetailState::Loaded(self.history.clone().unwrap_or_default()),
            Phase::Failed(message) => DetailState::Failed(message.clone()),
        }
    }

    pub fn summary(&self) -> Vec<&IndicatorEntry> {
        self.history
            .as_ref()
            .map(|h| h.summary().collect())
            .unwrap_or_default()
    }
}

/// Classification of a user-visible failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Service,
    NotFound,
}

impl FailureKind {
    fn of(err: &ApiError) -> Self {
        match err {
            ApiError::Service(_) => FailureKind::Service,
            _ => FailureKind::Network,
        }
    }
}

/// A failure raised by a transition, kept until the shell drains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupStatus {
    Resolving,
    NotFound,
    Failed(String),
    Resolved(String),
}

/// State of the company-name lookup.
#[derive(Debug, Clone)]
pub struct LookupState {
    pub company: String,
    pub status: LookupStatus,
    pub candidates: Vec<SymbolMatch>,
    pub detail: DetailView,
    seq: u64,
}

impl LookupState {
    pub fn detail_state(&self) -> DetailState {
        match &self.status {
            LookupStatus::Resolving => DetailState::Loading,
            LookupStatus::NotFound => DetailState::NotFound,
            LookupStatus::Failed(message) => DetailState::Failed(message.clone()),
            LookupStatus::Resolved(_) => self.detail.state().clone(),
        }
    }
}

fn holding_message(name: &str, err: &ApiError) -> String {
    err.service_message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Error fetching info for {name}"))
}

pub struct Dashboard {
    mode: ShellMode,
    epoch: u64,
    file_path: Option<String>,
    names: Vec<String>,
    records: HashMap<String, StockRecord>,
    loading_names: bool,
    batch: Option<HashSet<String>>,
    query: String,
    error: Option<String>,
    failures: Vec<Failure>,
    lookup: Option<LookupState>,
    lookup_seq: u64,
}

impl Dashboard {
    pub fn new(mode: ShellMode) -> Self {
        Self {
            mode,
            epoch: 0,
            file_path: None,
            names: Vec::new(),
            records: HashMap::new(),
            loading_names: false,
            batch: None,
            query: String::new(),
            error: None,
            failures: Vec::new(),
            lookup: None,
            lookup_seq: 0,
        }
    }

    pub fn mode(&self) -> ShellMode {
        self.mode
    }

    /// Current session; bumped by every accepted `LoadStocks`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    /// All loaded names, in service order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names after the search filter (if filtering is enabled).
    pub fn visible_names(&self) -> Vec<&str> {
        if self.mode.filtering {
            filter_names(&self.names, &self.query)
        } else {
            self.names.iter().map(String::as_str).collect()
        }
    }

    pub fn record(&self, name: &str) -> Option<&StockRecord> {
        self.records.get(name)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Global loading flag: names loading, or a batch still has members out.
    pub fn loading(&self) -> bool {
        self.loading_names || self.batch.is_some()
    }

    pub fn batch_pending(&self) -> usize {
        self.batch.as_ref().map_or(0, HashSet::len)
    }

    pub fn lookup(&self) -> Option<&LookupState> {
        self.lookup.as_ref()
    }

    /// Failures raised since the last call.
    pub fn take_failures(&mut self) -> Vec<Failure> {
        std::mem::take(&mut self.failures)
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::LoadStocks { file_path } => self.load_stocks(file_path),
            Action::NamesLoaded { epoch, result } => self.names_loaded(epoch, result),
            Action::Expand { name } => self.expand(&name).into_iter().collect(),
            Action::LoadAll => {
                let names = self.names.clone();
                self.start_batch(&names)
            }
            Action::SymbolResolved { target, result } => match target {
                Target::Holding {
                    epoch,
                    name,
                    generation,
                } => self
                    .holding_resolved(epoch, &name, generation, result)
                    .into_iter()
                    .collect(),
                Target::Lookup { seq } => self.lookup_resolved(seq, result).into_iter().collect(),
            },
            Action::HistoryLoaded { target, result } => {
                match target {
                    Target::Holding {
                        epoch,
                        name,
                        generation,
                    } => self.holding_history(epoch, &name, generation, result),
                    Target::Lookup { seq } => self.lookup_history(seq, result),
                }
                Vec::new()
            }
            Action::SetQuery { query } => {
                self.query = query;
                Vec::new()
            }
            Action::Lookup { company } => self.start_lookup(company).into_iter().collect(),
            Action::DismissError => {
                self.error = None;
                Vec::new()
            }
        }
    }

    fn fail(&mut self, kind: FailureKind, message: String, context: String) {
        warn!(?kind, %message, %context, "dashboard failure");
        self.error = Some(message.clone());
        self.failures.push(Failure {
            kind,
            message,
            context,
        });
    }

    fn load_stocks(&mut self, file_path: String) -> Vec<Effect> {
        let file_path = file_path.trim().to_string();
        if file_path.is_empty() || self.loading() {
            return Vec::new();
        }
        self.epoch += 1;
        info!(epoch = self.epoch, %file_path, "loading stocks");
        self.file_path = Some(file_path.clone());
        self.names.clear();
        self.records.clear();
        self.batch = None;
        self.error = None;
        self.loading_names = true;
        vec![Effect::LoadNames {
            epoch: self.epoch,
            file_path,
        }]
    }

    fn names_loaded(&mut self, epoch: u64, result: Result<Vec<String>, ApiError>) -> Vec<Effect> {
        if epoch != self.epoch || !self.loading_names {
            debug!(epoch, current = self.epoch, "dropping stale name list");
            return Vec::new();
        }
        self.loading_names = false;

        match result {
            Ok(names) => {
                let mut seen = HashSet::new();
                self.names = names
                    .into_iter()
                    .filter(|name| seen.insert(name.clone()))
                    .collect();
                self.records = self
                    .names
                    .iter()
                    .map(|name| (name.clone(), StockRecord::new(name.clone())))
                    .collect();
                info!(count = self.names.len(), "names loaded");

                match self.mode.resolution {
                    Resolution::Eager => {
                        let names = self.names.clone();
                        self.start_batch(&names)
                    }
                    Resolution::Lazy => Vec::new(),
                }
            }
            Err(err) => {
                self.names.clear();
                self.records.clear();
                let message = err
                    .service_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| "Error loading stocks".to_string());
                let context = self.file_path.clone().unwrap_or_default();
                self.fail(FailureKind::of(&err), message, context);
                Vec::new()
            }
        }
    }

    /// Resolve every listed name without a known symbol. Names already in
    /// flight join the batch without a new request.
    fn start_batch(&mut self, names: &[String]) -> Vec<Effect> {
        let mut effects = Vec::new();
        let mut members = Vec::new();
        for name in names {
            let Some(record) = self.records.get(name) else {
                continue;
            };
            if record.symbol.is_some() {
                continue;
            }
            if !record.phase.in_flight() {
                effects.extend(self.begin_resolve(name));
            }
            members.push(name.clone());
        }
        if !members.is_empty() {
            info!(
                members = members.len(),
                requests = effects.len(),
                "batch started"
            );
            self.batch.get_or_insert_with(HashSet::new).extend(members);
        }
        effects
    }

    /// First expand resolves an unresolved name; a failed history fetch is
    /// retried. Names without a ticker are only retried by `LoadAll`.
    fn expand(&mut self, name: &str) -> Option<Effect> {
        let record = self.records.get(name)?;
        let retry_history = match &record.phase {
            Phase::Unresolved => false,
            Phase::Failed(_) if record.symbol.is_some() => true,
            _ => return None,
        };
        if retry_history {
            self.begin_history(name)
        } else {
            self.begin_resolve(name)
        }
    }

    fn begin_resolve(&mut self, name: &str) -> Option<Effect> {
        let epoch = self.epoch;
        let record = self.records.get_mut(name)?;
        record.generation += 1;
        record.phase = Phase::ResolvingSymbol;
        record.symbol = None;
        record.candidates.clear();
        record.history = None;
        debug!(name, generation = record.generation, "resolving symbol");
        Some(Effect::SearchSymbol {
            target: Target::Holding {
                epoch,
                name: name.to_string(),
                generation: record.generation,
            },
            company: name.to_string(),
        })
    }

    fn begin_history(&mut self, name: &str) -> Option<Effect> {
        let epoch = self.epoch;
        let record = self.records.get_mut(name)?;
        let symbol = record.symbol.clone()?;
        record.generation += 1;
        record.phase = Phase::FetchingHistory;
        record.history = None;
        debug!(name, %symbol, generation = record.generation, "fetching history");
        Some(Effect::FetchHistory {
            target: Target::Holding {
                epoch,
                name: name.to_string(),
                generation: record.generation,
            },
            symbol,
        })
    }

    /// The record a ticket refers to, if the ticket is still current and the
    /// record is in the `expected` phase.
    fn current_record(
        &mut self,
        epoch: u64,
        name: &str,
        generation: u64,
        expected: &Phase,
    ) -> Option<&mut StockRecord> {
        if epoch != self.epoch {
            debug!(name, epoch, current = self.epoch, "dropping completion from old session");
            return None;
        }
        let record = self.records.get_mut(name)?;
        if record.generation != generation || &record.phase != expected {
            debug!(name, generation, current = record.generation, "dropping stale completion");
            return None;
        }
        Some(record)
    }

    fn settle(&mut self, name: &str) {
        if let Some(pending) = self.batch.as_mut() {
            pending.remove(name);
            if pending.is_empty() {
                self.batch = None;
                info!("batch settled");
            }
        }
    }

    fn holding_resolved(
        &mut self,
        epoch: u64,
        name: &str,
        generation: u64,
        result: Result<Vec<SymbolMatch>, ApiError>,
    ) -> Option<Effect> {
        let record = self.current_record(epoch, name, generation, &Phase::ResolvingSymbol)?;
        match result {
            Ok(matches) => {
                let Some(symbol) = first_symbol(&matches).map(str::to_string) else {
                    record.phase = Phase::SymbolNotFound;
                    self.fail(
                        FailureKind::NotFound,
                        format!("No ticker found for {name}"),
                        name.to_string(),
                    );
                    self.settle(name);
                    return None;
                };
                debug!(name, %symbol, "symbol resolved");
                record.symbol = Some(symbol);
                record.candidates = matches;
                self.begin_history(name)
            }
            Err(err) => {
                let message = holding_message(name, &err);
                record.phase = Phase::Failed(message.clone());
                self.fail(FailureKind::of(&err), message, err.to_string());
                self.settle(name);
                None
            }
        }
    }

    fn holding_history(
        &mut self,
        epoch: u64,
        name: &str,
        generation: u64,
        result: Result<History, ApiError>,
    ) {
        let Some(record) = self.current_record(epoch, name, generation, &Phase::FetchingHistory)
        else {
            return;
        };
        match result {
            Ok(history) => {
                record.history = Some(history);
                record.phase = Phase::Ready;
            }
            Err(err) => {
                let message = holding_message(name, &err);
                record.phase = Phase::Failed(message.clone());
                self.fail(FailureKind::of(&err), message, err.to_string());
            }
        }
        self.settle(name);
    }

    fn start_lookup(&mut self, company: String) -> Option<Effect> {
        let company = company.trim().to_string();
        if company.is_empty() {
            return None;
        }
        self.lookup_seq += 1;
        let seq = self.lookup_seq;
        info!(seq, %company, "lookup");
        self.lookup = Some(LookupState {
            company: company.clone(),
            status: LookupStatus::Resolving,
            candidates: Vec::new(),
            detail: DetailView::new(),
            seq,
        });
        Some(Effect::SearchSymbol {
            target: Target::Lookup { seq },
            company,
        })
    }

    /// History already held by a loaded record for `symbol`.
    fn preloaded(&self, symbol: &str) -> Option<History> {
        self.records
            .values()
            .filter(|r| r.symbol.as_deref() == Some(symbol))
            .find_map(|r| r.history.clone())
    }

    fn lookup_resolved(
        &mut self,
        seq: u64,
        result: Result<Vec<SymbolMatch>, ApiError>,
    ) -> Option<Effect> {
        let lookup = self.lookup.as_ref()?;
        if lookup.seq != seq || lookup.status != LookupStatus::Resolving {
            return None;
        }
        let company = lookup.company.clone();

        match result {
            Ok(matches) => {
                let Some(symbol) = first_symbol(&matches).map(str::to_string) else {
                    self.lookup.as_mut()?.status = LookupStatus::NotFound;
                    self.fail(
                        FailureKind::NotFound,
                        format!("No ticker found for {company}"),
                        company,
                    );
                    return None;
                };
                let preloaded = self.preloaded(&symbol);
                let lookup = self.lookup.as_mut()?;
                lookup.status = LookupStatus::Resolved(symbol.clone());
                lookup.candidates = matches;
                lookup
                    .detail
                    .show(&symbol, preloaded)
                    .then(|| Effect::FetchHistory {
                        target: Target::Lookup { seq },
                        symbol,
                    })
            }
            Err(err) => {
                let message = holding_message(&company, &err);
                self.lookup.as_mut()?.status = LookupStatus::Failed(message.clone());
                self.fail(FailureKind::of(&err), message, err.to_string());
                None
            }
        }
    }

    fn lookup_history(&mut self, seq: u64, result: Result<History, ApiError>) {
        let Some(lookup) = self.lookup.as_mut() else {
            return;
        };
        let LookupStatus::Resolved(symbol) = &lookup.status else {
            return;
        };
        if lookup.seq != seq {
            return;
        }
        let failure = result
            .as_ref()
            .err()
            .map(|err| (FailureKind::of(err), err.to_string()));
        let symbol = symbol.clone();
        if !lookup.detail.complete(&symbol, result) {
            return;
        }
        if let (Some((kind, context)), DetailState::Failed(message)) =
            (failure, lookup.detail.state().clone())
        {
            self.fail(kind, message, context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IndicatorReading, Reading, SymbolDetail};
    use crate::palette::ColorCategory;

    fn eager() -> Dashboard {
        Dashboard::new(ShellMode::default())
    }

    fn lazy() -> Dashboard {
        Dashboard::new(ShellMode {
            resolution: Resolution::Lazy,
            filtering: true,
        })
    }

    fn matched(symbol: &str) -> Vec<SymbolMatch> {
        vec![SymbolMatch::Detailed(SymbolDetail {
            symbol: Some(symbol.into()),
            longname: Some(format!("{symbol} Ltd")),
            ..SymbolDetail::default()
        })]
    }

    fn rsi_history(value: f64) -> History {
        History {
            indicators: vec![IndicatorEntry {
                key: "RSI".into(),
                value: IndicatorReading {
                    display: Some(Reading::Number(value)),
                    category: ColorCategory::DarkGreen,
                    label: Some("Strong Buy".into()),
                },
            }],
            fundamentals: vec![],
        }
    }

    /// Load `names` and return the effects emitted once they arrive.
    fn load(dash: &mut Dashboard, names: &[&str]) -> Vec<Effect> {
        let effects = dash.dispatch(Action::LoadStocks {
            file_path: "holdings.xlsx".into(),
        });
        let Effect::LoadNames { epoch, .. } = effects[0].clone() else {
            panic!("expected LoadNames, got {effects:?}");
        };
        dash.dispatch(Action::NamesLoaded {
            epoch,
            result: Ok(names.iter().map(|s| s.to_string()).collect()),
        })
    }

    fn target_of(effect: &Effect) -> Target {
        match effect {
            Effect::SearchSymbol { target, .. } | Effect::FetchHistory { target, .. } => {
                target.clone()
            }
            Effect::LoadNames { .. } => panic!("no target on LoadNames"),
        }
    }

    #[test]
    fn names_appear_once_in_service_order() {
        let mut dash = lazy();
        load(&mut dash, &["A", "B", "A"]);
        assert_eq!(dash.names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(dash.record("A").unwrap().phase, Phase::Unresolved);
        assert!(!dash.loading());
    }

    #[test]
    fn empty_path_is_ignored() {
        let mut dash = eager();
        assert!(dash
            .dispatch(Action::LoadStocks {
                file_path: "   ".into()
            })
            .is_empty());
        assert_eq!(dash.file_path(), None);
    }

    #[test]
    fn load_is_ignored_while_loading() {
        let mut dash = eager();
        dash.dispatch(Action::LoadStocks {
            file_path: "a.xlsx".into(),
        });
        assert!(dash.loading());
        assert!(dash
            .dispatch(Action::LoadStocks {
                file_path: "b.xlsx".into()
            })
            .is_empty());
        assert_eq!(dash.file_path(), Some("a.xlsx"));
    }

    #[test]
    fn eager_mode_resolves_every_name() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A", "B"]);
        assert_eq!(effects.len(), 2);
        assert!(effects
            .iter()
            .all(|e| matches!(e, Effect::SearchSymbol { .. })));
        assert!(dash.loading());
        assert_eq!(dash.batch_pending(), 2);
    }

    #[test]
    fn full_pipeline_reaches_ready() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A"]);
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Ok(matched("A.NS")),
        });
        assert_eq!(fetch.len(), 1);
        let Effect::FetchHistory { symbol, .. } = &fetch[0] else {
            panic!("expected FetchHistory");
        };
        assert_eq!(symbol, "A.NS");
        assert_eq!(dash.record("A").unwrap().phase, Phase::FetchingHistory);

        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Ok(rsi_history(65.0)),
        });
        let record = dash.record("A").unwrap();
        assert_eq!(record.phase, Phase::Ready);
        assert_eq!(record.summary().len(), 1);
        assert!(!dash.loading());
    }

    #[test]
    fn empty_search_means_no_ticker_and_no_history() {
        let mut dash = eager();
        let effects = load(&mut dash, &["Ghost"]);
        let next = dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Ok(vec![]),
        });
        assert!(next.is_empty());
        let record = dash.record("Ghost").unwrap();
        assert_eq!(record.phase, Phase::SymbolNotFound);
        assert_eq!(record.detail_state(), DetailState::NotFound);
        assert_eq!(dash.error(), Some("No ticker found for Ghost"));
        let failures = dash.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, FailureKind::NotFound);
        assert!(dash.take_failures().is_empty());
    }

    #[test]
    fn history_error_is_shown_verbatim() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A"]);
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Ok(matched("A.NS")),
        });
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Err(ApiError::Service("x".into())),
        });
        let record = dash.record("A").unwrap();
        assert_eq!(record.detail_state(), DetailState::Failed("x".into()));
        assert!(record.history.is_none());
        assert_eq!(dash.error(), Some("x"));
    }

    #[test]
    fn transport_failure_uses_generic_message() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A"]);
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Err(ApiError::Network("connection refused".into())),
        });
        assert_eq!(dash.error(), Some("Error fetching info for A"));
        assert_eq!(
            dash.record("A").unwrap().phase,
            Phase::Failed("Error fetching info for A".into())
        );
        assert!(!dash.loading());
    }

    #[test]
    fn names_error_clears_list() {
        let mut dash = eager();
        let effects = dash.dispatch(Action::LoadStocks {
            file_path: "missing.xlsx".into(),
        });
        let Effect::LoadNames { epoch, .. } = effects[0].clone() else {
            panic!("expected LoadNames");
        };
        dash.dispatch(Action::NamesLoaded {
            epoch,
            result: Err(ApiError::Network("refused".into())),
        });
        assert!(dash.names().is_empty());
        assert_eq!(dash.error(), Some("Error loading stocks"));
        assert!(!dash.loading());
    }

    #[test]
    fn last_failure_wins_the_banner() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A", "B"]);
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[1]),
            result: Ok(vec![]),
        });
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Ok(vec![]),
        });
        assert_eq!(dash.error(), Some("No ticker found for A"));
        dash.dispatch(Action::DismissError);
        assert_eq!(dash.error(), None);
    }

    #[test]
    fn batch_member_failure_does_not_block_siblings() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A", "B"]);
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Err(ApiError::Network("reset".into())),
        });
        assert!(dash.loading());
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[1]),
            result: Ok(matched("B.NS")),
        });
        assert!(dash.loading());
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Ok(History::default()),
        });
        assert!(!dash.loading());
        assert_eq!(dash.record("B").unwrap().phase, Phase::Ready);
    }

    #[test]
    fn load_all_skips_resolved_names() {
        let mut dash = lazy();
        load(&mut dash, &["A", "B", "C"]);
        let first = dash.dispatch(Action::Expand { name: "A".into() });
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&first[0]),
            result: Ok(matched("A.NS")),
        });

        let effects = dash.dispatch(Action::LoadAll);
        let companies: Vec<&str> = effects
            .iter()
            .map(|e| match e {
                Effect::SearchSymbol { company, .. } => company.as_str(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(companies, vec!["B", "C"]);
        assert!(dash.loading());
    }

    #[test]
    fn load_all_adopts_in_flight_names() {
        let mut dash = lazy();
        load(&mut dash, &["A", "B"]);
        let first = dash.dispatch(Action::Expand { name: "A".into() });
        let effects = dash.dispatch(Action::LoadAll);
        assert_eq!(effects.len(), 1);
        assert_eq!(dash.batch_pending(), 2);

        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Ok(vec![]),
        });
        assert!(dash.loading());
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&first[0]),
            result: Ok(vec![]),
        });
        assert!(!dash.loading());
    }

    #[test]
    fn expand_while_resolving_is_a_no_op() {
        let mut dash = lazy();
        load(&mut dash, &["A"]);
        assert_eq!(dash.dispatch(Action::Expand { name: "A".into() }).len(), 1);
        assert!(dash.dispatch(Action::Expand { name: "A".into() }).is_empty());
    }

    #[test]
    fn expand_after_history_failure_refetches_history_only() {
        let mut dash = lazy();
        load(&mut dash, &["A"]);
        let search = dash.dispatch(Action::Expand { name: "A".into() });
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&search[0]),
            result: Ok(matched("A.NS")),
        });
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Err(ApiError::Status {
                status: 500,
                endpoint: "/history".into(),
            }),
        });
        let retry = dash.dispatch(Action::Expand { name: "A".into() });
        assert!(matches!(
            retry.as_slice(),
            [Effect::FetchHistory { symbol, .. }] if symbol == "A.NS"
        ));
    }

    #[test]
    fn expand_on_missing_ticker_issues_nothing() {
        for mut dash in [eager(), lazy()] {
            let mut search = load(&mut dash, &["Ghost"]);
            if search.is_empty() {
                search = dash.dispatch(Action::LoadAll);
            }
            dash.dispatch(Action::SymbolResolved {
                target: target_of(&search[0]),
                result: Ok(vec![]),
            });
            assert_eq!(dash.record("Ghost").unwrap().phase, Phase::SymbolNotFound);

            assert!(dash.dispatch(Action::Expand { name: "Ghost".into() }).is_empty());
            assert_eq!(dash.record("Ghost").unwrap().phase, Phase::SymbolNotFound);
        }
    }

    #[test]
    fn expand_after_search_failure_issues_nothing() {
        let mut dash = eager();
        let effects = load(&mut dash, &["A"]);
        dash.dispatch(Action::SymbolResolved {
            target: target_of(&effects[0]),
            result: Err(ApiError::Network("reset".into())),
        });
        assert!(dash.dispatch(Action::Expand { name: "A".into() }).is_empty());

        let retry = dash.dispatch(Action::LoadAll);
        assert!(matches!(
            retry.as_slice(),
            [Effect::SearchSymbol { company, .. }] if company == "A"
        ));
    }

    #[test]
    fn stale_session_completion_is_dropped() {
        let mut dash = lazy();
        load(&mut dash, &["A"]);
        let old = dash.dispatch(Action::Expand { name: "A".into() });

        load(&mut dash, &["A"]);
        let fresh = dash.dispatch(Action::Expand { name: "A".into() });

        let next = dash.dispatch(Action::SymbolResolved {
            target: target_of(&old[0]),
            result: Ok(matched("OLD.NS")),
        });
        assert!(next.is_empty());
        assert_eq!(dash.record("A").unwrap().phase, Phase::ResolvingSymbol);

        dash.dispatch(Action::SymbolResolved {
            target: target_of(&fresh[0]),
            result: Ok(matched("NEW.NS")),
        });
        assert_eq!(dash.record("A").unwrap().symbol.as_deref(), Some("NEW.NS"));
    }

    #[test]
    fn stale_names_response_is_dropped() {
        let mut dash = lazy();
        load(&mut dash, &["A"]);
        dash.dispatch(Action::NamesLoaded {
            epoch: 0,
            result: Ok(vec!["Z".into()]),
        });
        assert_eq!(dash.names(), &["A".to_string()]);
    }

    #[test]
    fn query_filters_visible_names() {
        let mut dash = lazy();
        load(&mut dash, &["Alpha", "Beta"]);
        dash.dispatch(Action::SetQuery { query: "bet".into() });
        assert_eq!(dash.visible_names(), vec!["Beta"]);
    }

    #[test]
    fn filtering_disabled_shows_everything() {
        let mut dash = Dashboard::new(ShellMode {
            resolution: Resolution::Lazy,
            filtering: false,
        });
        load(&mut dash, &["Alpha", "Beta"]);
        dash.dispatch(Action::SetQuery { query: "bet".into() });
        assert_eq!(dash.visible_names(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn lookup_fetches_once() {
        let mut dash = lazy();
        let search = dash.dispatch(Action::Lookup {
            company: "Tata Consultancy".into(),
        });
        assert_eq!(
            dash.lookup().unwrap().detail_state(),
            DetailState::Loading
        );
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&search[0]),
            result: Ok(matched("TCS.NS")),
        });
        assert_eq!(fetch.len(), 1);
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Ok(rsi_history(70.0)),
        });
        assert_eq!(
            dash.lookup().unwrap().detail_state(),
            DetailState::Loaded(rsi_history(70.0))
        );
    }

    #[test]
    fn lookup_reuses_loaded_history() {
        let mut dash = lazy();
        load(&mut dash, &["Tata"]);
        let search = dash.dispatch(Action::Expand {
            name: "Tata".into(),
        });
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&search[0]),
            result: Ok(matched("TCS.NS")),
        });
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Ok(rsi_history(55.0)),
        });

        let lookup = dash.dispatch(Action::Lookup {
            company: "TCS".into(),
        });
        let next = dash.dispatch(Action::SymbolResolved {
            target: target_of(&lookup[0]),
            result: Ok(matched("TCS.NS")),
        });
        assert!(next.is_empty());
        assert_eq!(
            dash.lookup().unwrap().detail_state(),
            DetailState::Loaded(rsi_history(55.0))
        );
    }

    #[test]
    fn lookup_finds_history_among_records_sharing_a_symbol() {
        let names: Vec<String> = (0..8).map(|i| format!("N{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut dash = eager();
        let searches = load(&mut dash, &refs);
        let mut fetches = Vec::new();
        for search in &searches {
            fetches.extend(dash.dispatch(Action::SymbolResolved {
                target: target_of(search),
                result: Ok(matched("X.NS")),
            }));
        }
        for (i, fetch) in fetches.iter().enumerate() {
            let result = if i == 0 {
                Ok(rsi_history(61.0))
            } else {
                Err(ApiError::Network("reset".into()))
            };
            dash.dispatch(Action::HistoryLoaded {
                target: target_of(fetch),
                result,
            });
        }
        assert_eq!(dash.record("N0").unwrap().phase, Phase::Ready);

        let lookup = dash.dispatch(Action::Lookup {
            company: "X".into(),
        });
        let next = dash.dispatch(Action::SymbolResolved {
            target: target_of(&lookup[0]),
            result: Ok(matched("X.NS")),
        });
        assert!(next.is_empty());
        assert_eq!(
            dash.lookup().unwrap().detail_state(),
            DetailState::Loaded(rsi_history(61.0))
        );
    }

    #[test]
    fn superseded_lookup_is_ignored() {
        let mut dash = lazy();
        let first = dash.dispatch(Action::Lookup {
            company: "Infosys".into(),
        });
        dash.dispatch(Action::Lookup {
            company: "Wipro".into(),
        });
        let next = dash.dispatch(Action::SymbolResolved {
            target: target_of(&first[0]),
            result: Ok(matched("INFY.NS")),
        });
        assert!(next.is_empty());
        assert_eq!(dash.lookup().unwrap().company, "Wipro");
        assert_eq!(dash.lookup().unwrap().status, LookupStatus::Resolving);
    }

    #[test]
    fn lookup_history_error_sets_banner() {
        let mut dash = lazy();
        let search = dash.dispatch(Action::Lookup {
            company: "Acme".into(),
        });
        let fetch = dash.dispatch(Action::SymbolResolved {
            target: target_of(&search[0]),
            result: Ok(matched("ACME.NS")),
        });
        dash.dispatch(Action::HistoryLoaded {
            target: target_of(&fetch[0]),
            result: Err(ApiError::Network("timeout".into())),
        });
        assert_eq!(
            dash.lookup().unwrap().detail_state(),
            DetailState::Failed("Error fetching stock info".into())
        );
        assert_eq!(dash.error(), Some("Error fetching stock info"));
    }
}
