//! Colour tokens and style helpers for the HoldLens TUI.
//!
//! Chrome (borders, hints, status) uses a small dark-terminal palette.
//! Indicator and fundamental cards use the service's signal colours from
//! [`ColorCategory`], so the terminal shows the same greens and reds as the
//! service tags.

use ratatui::style::{Color, Modifier, Style};

use holdlens_core::palette::{ColorCategory, Emphasis};
use holdlens_core::store::Phase;

pub const ACCENT: Color = Color::Rgb(0, 200, 255);
pub const POSITIVE: Color = Color::Rgb(34, 197, 94);
pub const NEGATIVE: Color = Color::Rgb(239, 68, 68);
pub const WARNING: Color = Color::Rgb(245, 158, 11);
pub const NEUTRAL: Color = Color::Rgb(167, 139, 250);
pub const MUTED: Color = Color::Rgb(120, 130, 150);

const DARK_TEXT: Color = Color::Black;
const LIGHT_TEXT: Color = Color::White;

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

pub fn category_color(category: ColorCategory) -> Color {
    let (r, g, b) = category.rgb();
    Color::Rgb(r, g, b)
}

/// Card fill for a category: white text on the reds, black on the rest.
pub fn card_style(category: ColorCategory) -> Style {
    let fg = if category.wants_light_text() {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    };
    Style::default().bg(category_color(category)).fg(fg)
}

/// Value text on a fundamental card.
pub fn emphasis_style(base: Style, emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Positive => base.fg(Color::Rgb(21, 128, 61)).add_modifier(Modifier::BOLD),
        Emphasis::Negative => base.fg(Color::Rgb(185, 28, 28)).add_modifier(Modifier::BOLD),
        Emphasis::Plain => base,
    }
}

/// Inline badge in the holdings list.
pub fn badge_style(category: ColorCategory) -> Style {
    card_style(category)
}

pub fn phase_style(phase: &Phase) -> Style {
    match phase {
        Phase::Unresolved => muted(),
        Phase::ResolvingSymbol | Phase::FetchingHistory => warning(),
        Phase::SymbolNotFound => neutral(),
        Phase::Ready => positive(),
        Phase::Failed(_) => negative(),
    }
}
