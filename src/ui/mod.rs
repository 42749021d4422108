//! Terminal User Interface components for expense-tui.

mod help;
mod theme;
pub mod widgets;

pub use help::HelpOverlay;
pub use theme::Theme;
