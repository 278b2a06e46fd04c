//! Service client.
//!
//! [`DashboardApi`] abstracts the three service endpoints so the store's
//! effect runner can be driven by the real HTTP client or by a test double.
//! [`HttpDashboardClient`] is the blocking reqwest implementation. It never
//! retries; every failure is reported once as an [`ApiError`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::model::{FundamentalEntry, History, IndicatorEntry, SymbolMatch};

pub const NAMES_PATH: &str = "/get-stocks/";
pub const SEARCH_PATH: &str = "/search";
pub const HISTORY_PATH: &str = "/history";

/// Failures talking to the service.
///
/// Messages are kept as strings so errors can travel between threads and be
/// compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Error text reported by the service itself.
    #[error("{0}")]
    Service(String),

    #[error("client setup failed: {0}")]
    Setup(String),
}

impl ApiError {
    /// The service's own message, if it sent one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ApiError::Service(message) => Some(message),
            _ => None,
        }
    }
}

/// The three operations the dashboard needs from the service.
pub trait DashboardApi: Send + Sync {
    /// Company names parsed from the holdings file at `file_path`.
    fn load_names(&self, file_path: &str) -> Result<Vec<String>, ApiError>;

    /// Candidate symbols for a company name. Empty when nothing matched.
    fn search_symbol(&self, company: &str) -> Result<Vec<SymbolMatch>, ApiError>;

    /// Indicators and fundamentals for a symbol.
    fn fetch_history(&self, symbol: &str) -> Result<History, ApiError>;
}

#[derive(Debug, Deserialize)]
struct NamesResponse {
    #[serde(default)]
    stock_names: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SymbolMatch>>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    data: Option<Vec<IndicatorEntry>>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
    #[serde(default)]
    error: Option<String>,
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn service_error(error: Option<String>) -> Option<ApiError> {
    error
        .filter(|message| !message.is_empty())
        .map(ApiError::Service)
}

/// Parse a `/get-stocks/` body.
pub fn parse_names(body: &str) -> Result<Vec<String>, ApiError> {
    let resp: NamesResponse = decode(NAMES_PATH, body)?;
    if let Some(err) = service_error(resp.error) {
        return Err(err);
    }
    Ok(resp.stock_names.unwrap_or_default())
}

/// Parse a `/search` body.
pub fn parse_search(body: &str) -> Result<Vec<SymbolMatch>, ApiError> {
    let resp: SearchResponse = decode(SEARCH_PATH, body)?;
    Ok(resp.results.unwrap_or_default())
}

/// Parse a `/history` body.
pub fn parse_history(body: &str) -> Result<History, ApiError> {
    let resp: HistoryResponse = decode(HISTORY_PATH, body)?;
    if let Some(err) = service_error(resp.error) {
        return Err(err);
    }
    let fundamentals = resp
        .result
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| FundamentalEntry {
            key,
            value: value.into(),
        })
        .collect();
    Ok(History {
        indicators: resp.data.unwrap_or_default(),
        fundamentals,
    })
}

/// Blocking HTTP client for the dashboard service.
pub struct HttpDashboardClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDashboardClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a POST and return the raw body of a successful response.
    fn post(
        &self,
        path: &str,
        build: impl FnOnce(reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "POST");

        let resp = build(self.client.post(&url)).send().map_err(|e| {
            warn!(%url, error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "non-success response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        resp.text().map_err(|e| ApiError::Network(e.to_string()))
    }
}

impl DashboardApi for HttpDashboardClient {
    fn load_names(&self, file_path: &str) -> Result<Vec<String>, ApiError> {
        let body = serde_json::json!({ "file_path": file_path });
        let text = self.post(NAMES_PATH, |req| req.json(&body))?;
        let names = parse_names(&text)?;
        debug!(count = names.len(), "loaded names");
        Ok(names)
    }

    fn search_symbol(&self, company: &str) -> Result<Vec<SymbolMatch>, ApiError> {
        let text = self.post(SEARCH_PATH, |req| req.form(&[("company_name", company)]))?;
        let matches = parse_search(&text)?;
        debug!(company, count = matches.len(), "symbol search");
        Ok(matches)
    }

    fn fetch_history(&self, symbol: &str) -> Result<History, ApiError> {
        let text = self.post(HISTORY_PATH, |req| req.form(&[("symbol", symbol)]))?;
        let history = parse_history(&text)?;
        debug!(
            symbol,
            indicators = history.indicators.len(),
            fundamentals = history.fundamentals.len(),
            "history loaded"
        );
        Ok(history)
    }
}
