//! Wire and domain types shared by the client, the store and the renderers.
//!
//! The service speaks loosely-typed JSON: indicator values arrive as
//! `[display, colour_tag, label?]` arrays and fundamentals as a flat object
//! whose values may be numbers, text or null. These types absorb that
//! looseness at the edge so the rest of the crate works with closed enums.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::palette::ColorCategory;

/// Indicator keys surfaced as badges in the collapsed holdings row.
pub const SUMMARY_KEYS: [&str; 5] = [
    "RSI",
    "ADX",
    "Price/MA7/MA13",
    "Price/MA100/MA200",
    "MACD/Signal",
];

/// One candidate returned by the symbol search.
///
/// The service normally sends objects, but bare symbol strings are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolMatch {
    Detailed(SymbolDetail),
    Bare(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolDetail {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub shortname: Option<String>,
    #[serde(default)]
    pub longname: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default, rename = "type")]
    pub quote_type: Option<String>,
}

impl SymbolMatch {
    /// The ticker symbol, if the candidate carries a non-empty one.
    pub fn symbol(&self) -> Option<&str> {
        let symbol = match self {
            SymbolMatch::Detailed(detail) => detail.symbol.as_deref()?,
            SymbolMatch::Bare(symbol) => symbol.as_str(),
        };
        let symbol = symbol.trim();
        (!symbol.is_empty()).then_some(symbol)
    }

    /// Long name, falling back to the short name.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            SymbolMatch::Detailed(detail) => {
                detail.longname.as_deref().or(detail.shortname.as_deref())
            }
            SymbolMatch::Bare(_) => None,
        }
    }
}

/// First usable symbol among the candidates.
pub fn first_symbol(matches: &[SymbolMatch]) -> Option<&str> {
    matches.first().and_then(SymbolMatch::symbol)
}

/// The displayed part of an indicator value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
    Series(Vec<Option<f64>>),
}

impl Reading {
    /// Render with `sep` between series elements.
    pub fn render(&self, sep: &str) -> String {
        match self {
            Reading::Number(n) => format_number(*n),
            Reading::Text(text) => text.clone(),
            Reading::Series(values) => values
                .iter()
                .map(|v| v.map(format_number).unwrap_or_else(|| "-".to_string()))
                .collect::<Vec<_>>()
                .join(sep),
        }
    }
}

/// Shortest decimal form: `65.0` renders as `65`, `12.34` as `12.34`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() {
        format!("{n}")
    } else {
        "-".to_string()
    }
}

/// `[display, colour_tag, label?]` as sent by `/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct IndicatorReading {
    pub display: Option<Reading>,
    pub category: ColorCategory,
    pub label: Option<String>,
}

impl IndicatorReading {
    pub fn render(&self, sep: &str) -> String {
        self.display
            .as_ref()
            .map(|d| d.render(sep))
            .unwrap_or_else(|| "-".to_string())
    }
}

impl TryFrom<Vec<Value>> for IndicatorReading {
    type Error = String;

    fn try_from(items: Vec<Value>) -> Result<Self, Self::Error> {
        let mut items = items.into_iter();
        let display = items
            .next()
            .ok_or_else(|| "indicator value is an empty array".to_string())?;
        let display: Option<Reading> =
            serde_json::from_value(display).map_err(|e| format!("indicator display: {e}"))?;
        let category = match items.next() {
            Some(Value::String(tag)) => ColorCategory::from_tag(&tag),
            _ => ColorCategory::Gray,
        };
        let label = match items.next() {
            Some(Value::String(label)) if !label.is_empty() => Some(label),
            _ => None,
        };
        Ok(Self {
            display,
            category,
            label,
        })
    }
}

impl From<IndicatorReading> for Vec<Value> {
    fn from(reading: IndicatorReading) -> Self {
        let display = serde_json::to_value(&reading.display).unwrap_or(Value::Null);
        let mut items = vec![display, Value::String(reading.category.tag().to_string())];
        if let Some(label) = reading.label {
            items.push(Value::String(label));
        }
        items
    }
}

/// One technical metric with its signal colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEntry {
    pub key: String,
    pub value: IndicatorReading,
}

impl IndicatorEntry {
    pub fn is_summary(&self) -> bool {
        SUMMARY_KEYS.contains(&self.key.as_str())
    }

    /// `KEY: value (label)` with series values joined by `/`.
    pub fn badge(&self) -> String {
        let value = self.value.render("/");
        match &self.value.label {
            Some(label) => format!("{}: {value} ({label})", self.key),
            None => format!("{}: {value}", self.key),
        }
    }
}

/// A fundamental metric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FundamentalValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FundamentalValue {
    pub fn render(&self) -> String {
        match self {
            FundamentalValue::Number(n) => format_number(*n),
            FundamentalValue::Text(text) => text.clone(),
            FundamentalValue::Missing => "-".to_string(),
        }
    }
}

impl From<Value> for FundamentalValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FundamentalValue::Missing,
            Value::Number(n) => n
                .as_f64()
                .map(FundamentalValue::Number)
                .unwrap_or(FundamentalValue::Missing),
            Value::String(s) => FundamentalValue::Text(s),
            Value::Bool(b) => FundamentalValue::Text(b.to_string()),
            other => FundamentalValue::Text(other.to_string()),
        }
    }
}

impl From<FundamentalValue> for Value {
    fn from(value: FundamentalValue) -> Self {
        match value {
            FundamentalValue::Number(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FundamentalValue::Text(s) => Value::String(s),
            FundamentalValue::Missing => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalEntry {
    pub key: String,
    pub value: FundamentalValue,
}

/// Technical and fundamental data for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub indicators: Vec<IndicatorEntry>,
    pub fundamentals: Vec<FundamentalEntry>,
}

impl History {
    /// Summary badges, in the order the service sent them.
    pub fn summary(&self) -> impl Iterator<Item = &IndicatorEntry> {
        self.indicators.iter().filter(|e| e.is_summary())
    }

    pub fn indicator(&self, key: &str) -> Option<&IndicatorEntry> {
        self.indicators.iter().find(|e| e.key == key)
    }

    pub fn fundamental(&self, key: &str) -> Option<&FundamentalValue> {
        self.fundamentals
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.fundamentals.is_empty()
    }
}
