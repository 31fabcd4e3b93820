//! UI Theme - icons and colors shared by every message.

use crossterm::style::Color;

/// Default theme for depker output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different message kinds
    pub colors: ColorScheme,
    /// Message prefixes
    pub icons: Icons,
}

/// Color scheme for messages
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Section headers
    pub header: Color,
    /// Secondary detail (URLs, paths)
    pub secondary: Color,
    /// Success states
    pub success: Color,
    /// Warning states
    pub warning: Color,
    /// Error states
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Cyan,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Status icons for different states
#[derive(Debug, Clone)]
pub struct Icons {
    /// In-progress step (●)
    pub active: &'static str,
    /// Success/completed state (✓)
    pub success: &'static str,
    /// Error/failed state (✗)
    pub error: &'static str,
    /// Warning state (⚠)
    pub warning: &'static str,
    /// Info/Tip state (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}
