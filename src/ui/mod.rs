//! Terminal User Interface components for rainfall-tui.

pub mod chart;
mod help;
pub mod theme;
pub mod widgets;

pub use help::{HelpOverlay, ModeHelp};
pub use theme::Theme;
