//! Colour categories and the pure mappings from values to categories.
//!
//! Renderers translate a [`ColorCategory`] into whatever their surface
//! understands (RGB for the terminal, a tag for the CLI).

use serde::{Deserialize, Serialize};

use crate::model::{FundamentalValue, IndicatorEntry};

/// The fixed set of signal colours the service tags indicators with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorCategory {
    LightRed,
    DarkRed,
    LightGreen,
    DarkGreen,
    #[default]
    #[serde(other)]
    Gray,
}

impl ColorCategory {
    pub const ALL: [ColorCategory; 5] = [
        ColorCategory::LightRed,
        ColorCategory::DarkRed,
        ColorCategory::LightGreen,
        ColorCategory::DarkGreen,
        ColorCategory::Gray,
    ];

    /// Parse a service tag. Unknown tags fall back to gray.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "lightred" => ColorCategory::LightRed,
            "darkred" => ColorCategory::DarkRed,
            "lightgreen" => ColorCategory::LightGreen,
            "darkgreen" => ColorCategory::DarkGreen,
            _ => ColorCategory::Gray,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ColorCategory::LightRed => "lightred",
            ColorCategory::DarkRed => "darkred",
            ColorCategory::LightGreen => "lightgreen",
            ColorCategory::DarkGreen => "darkgreen",
            ColorCategory::Gray => "gray",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ColorCategory::LightRed => (252, 165, 165),
            ColorCategory::DarkRed => (185, 28, 28),
            ColorCategory::LightGreen => (134, 239, 172),
            ColorCategory::DarkGreen => (22, 101, 52),
            ColorCategory::Gray => (209, 213, 219),
        }
    }

    /// Red backgrounds take white text; everything else takes black.
    pub fn wants_light_text(self) -> bool {
        matches!(self, ColorCategory::LightRed | ColorCategory::DarkRed)
    }
}

pub fn indicator_category(entry: &IndicatorEntry) -> ColorCategory {
    entry.value.category
}

/// Sign of a numeric fundamental picks the card colour; text and gaps stay gray.
pub fn fundamental_category(value: &FundamentalValue) -> ColorCategory {
    match value {
        FundamentalValue::Number(n) if *n >= 0.0 => ColorCategory::LightGreen,
        FundamentalValue::Number(n) if *n < 0.0 => ColorCategory::LightRed,
        _ => ColorCategory::Gray,
    }
}

/// Text emphasis for a fundamental value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Positive,
    Negative,
    Plain,
}

/// `Buy` / `Strong Buy` read positive and `Sell` negative; anything else is plain.
pub fn fundamental_emphasis(value: &FundamentalValue) -> Emphasis {
    match value {
        FundamentalValue::Text(text) => match text.as_str() {
            "Buy" | "Strong Buy" => Emphasis::Positive,
            "Sell" => Emphasis::Negative,
            _ => Emphasis::Plain,
        },
        _ => Emphasis::Plain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IndicatorReading, Reading};

    #[test]
    fn tags_round_trip() {
        for category in ColorCategory::ALL {
            assert_eq!(ColorCategory::from_tag(category.tag()), category);
        }
    }

    #[test]
    fn unknown_tag_is_gray() {
        assert_eq!(ColorCategory::from_tag("magenta"), ColorCategory::Gray);
        assert_eq!(ColorCategory::from_tag(""), ColorCategory::Gray);
        assert_eq!(ColorCategory::from_tag(" DarkGreen "), ColorCategory::DarkGreen);
    }

    #[test]
    fn serde_falls_back_to_gray() {
        let c: ColorCategory = serde_json::from_str("\"teal\"").unwrap();
        assert_eq!(c, ColorCategory::Gray);
        let c: ColorCategory = serde_json::from_str("\"darkred\"").unwrap();
        assert_eq!(c, ColorCategory::DarkRed);
    }

    #[test]
    fn red_categories_take_light_text() {
        assert!(ColorCategory::LightRed.wants_light_text());
        assert!(ColorCategory::DarkRed.wants_light_text());
        assert!(!ColorCategory::DarkGreen.wants_light_text());
        assert!(!ColorCategory::Gray.wants_light_text());
    }

    #[test]
    fn rsi_dark_green() {
        let entry = IndicatorEntry {
            key: "RSI".into(),
            value: IndicatorReading {
                display: Some(Reading::Number(65.0)),
                category: ColorCategory::DarkGreen,
                label: None,
            },
        };
        assert_eq!(indicator_category(&entry), ColorCategory::DarkGreen);
        assert_eq!(indicator_category(&entry).rgb(), (22, 101, 52));
    }

    #[test]
    fn fundamental_sign_colours() {
        assert_eq!(
            fundamental_category(&FundamentalValue::Number(0.0)),
            ColorCategory::LightGreen
        );
        assert_eq!(
            fundamental_category(&FundamentalValue::Number(12.5)),
            ColorCategory::LightGreen
        );
        assert_eq!(
            fundamental_category(&FundamentalValue::Number(-0.01)),
            ColorCategory::LightRed
        );
        assert_eq!(
            fundamental_category(&FundamentalValue::Text("1,234".into())),
            ColorCategory::Gray
        );
        assert_eq!(
            fundamental_category(&FundamentalValue::Missing),
            ColorCategory::Gray
        );
    }

    #[test]
    fn buy_sell_emphasis() {
        let text = |s: &str| FundamentalValue::Text(s.into());
        assert_eq!(fundamental_emphasis(&text("Buy")), Emphasis::Positive);
        assert_eq!(fundamental_emphasis(&text("Strong Buy")), Emphasis::Positive);
        assert_eq!(fundamental_emphasis(&text("Sell")), Emphasis::Negative);
        assert_eq!(fundamental_emphasis(&text("Strong Sell")), Emphasis::Plain);
        assert_eq!(
            fundamental_emphasis(&FundamentalValue::Number(3.0)),
            Emphasis::Plain
        );
    }
}
