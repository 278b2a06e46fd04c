//! HoldLens core: everything the dashboard shells share.
//!
//! - Service client and wire parsing (`/get-stocks/`, `/search`, `/history`)
//! - Indicator and fundamental data model
//! - Signal colour categories
//! - Per-stock state store with ticketed completions
//! - Client configuration

pub mod api;
pub mod config;
pub mod detail;
pub mod effects;
pub mod filter;
pub mod model;
pub mod palette;
pub mod store;

pub use api::{ApiError, DashboardApi, HttpDashboardClient};
pub use config::{ClientConfig, ConfigError, Resolution, ShellMode};
pub use detail::{DetailState, DetailView};
pub use model::{History, IndicatorEntry, SymbolMatch};
pub use palette::ColorCategory;
pub use store::{Action, Dashboard, Effect, Phase, StockRecord};
