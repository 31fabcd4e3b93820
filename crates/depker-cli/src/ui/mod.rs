//! Terminal output. Everything goes to stderr; stdout belongs to the child.

pub mod output;
pub mod theme;

pub use output::Output;
pub use theme::Theme;
