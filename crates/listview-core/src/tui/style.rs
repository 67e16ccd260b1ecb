//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::provider::Severity;
use crate::view::RowStyleClass;

pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;

    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    pub const ACCENT: Color = Color::Cyan;
    pub const INPUT: Color = Color::Yellow;
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
}

pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Title bar.
    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn accent() -> Style {
        Style::default().fg(Theme::ACCENT)
    }

    /// Filter text while it is being typed.
    pub fn filter_input() -> Style {
        Style::default()
            .fg(Theme::INPUT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn from_class(class: RowStyleClass) -> Style {
        match class {
            RowStyleClass::Normal => Self::default(),
            RowStyleClass::Dimmed => Self::dim(),
            RowStyleClass::Accent => Self::accent(),
        }
    }

    /// Status line color for a notification.
    pub fn from_severity(severity: Severity) -> Style {
        match severity {
            Severity::Success => Style::default().fg(Theme::SUCCESS),
            Severity::Info => Self::default(),
            Severity::Warning => Style::default().fg(Theme::WARNING),
            Severity::Error => Style::default()
                .fg(Theme::ERROR)
                .add_modifier(Modifier::BOLD),
        }
    }
}
