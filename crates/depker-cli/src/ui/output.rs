//! Stderr implementation of the core [`Reporter`].

use std::io::{self, IsTerminal};
use std::path::Path;

use crossterm::style::Stylize;
use depker_core::Reporter;

use super::theme::Theme;

/// Message kinds, each with its own icon and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Phase header.
    Section,
    /// Step in progress.
    Active,
    /// Neutral information.
    Info,
    /// Completed step.
    Success,
    /// Degraded but continuing.
    Warning,
    /// Fatal failure.
    Error,
}

/// Writes launcher progress to stderr.
#[derive(Debug, Clone)]
pub struct Output {
    theme: Theme,
    color: bool,
}

impl Output {
    /// Output with colors enabled when stderr is a terminal.
    pub fn new() -> Self {
        Self::with_color(io::stderr().is_terminal())
    }

    /// Output with colors forced on or off.
    pub fn with_color(color: bool) -> Self {
        Self {
            theme: Theme::default(),
            color,
        }
    }

    /// Format one line without printing it.
    pub fn render(&self, severity: Severity, msg: &str) -> String {
        let icons = &self.theme.icons;
        let colors = &self.theme.colors;
        let (icon, color) = match severity {
            Severity::Section => (icons.active, colors.header),
            Severity::Active => (icons.active, colors.secondary),
            Severity::Info => (icons.info, colors.secondary),
            Severity::Success => (icons.success, colors.success),
            Severity::Warning => (icons.warning, colors.warning),
            Severity::Error => (icons.error, colors.error),
        };

        if !self.color {
            return format!("{icon} {msg}");
        }
        match severity {
            Severity::Section => format!("{} {}", icon.with(color), msg.bold()),
            Severity::Active | Severity::Info => format!("{} {msg}", icon.with(color)),
            Severity::Success | Severity::Warning | Severity::Error => {
                format!("{} {}", icon.with(color), msg.with(color))
            }
        }
    }

    fn emit(&self, severity: Severity, msg: &str) {
        eprintln!("{}", self.render(severity, msg));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        self.emit(Severity::Section, title);
    }

    fn downloading(&self, url: &str) {
        self.emit(Severity::Active, &format!("Downloading {url}"));
    }

    fn extracting(&self, dest: &Path) {
        self.emit(
            Severity::Active,
            &format!("Extracting to {}", dest.display()),
        );
    }

    fn info(&self, msg: &str) {
        self.emit(Severity::Info, msg);
    }

    fn success(&self, msg: &str) {
        self.emit(Severity::Success, msg);
    }

    fn warning(&self, msg: &str) {
        self.emit(Severity::Warning, msg);
    }

    fn error(&self, msg: &str) {
        self.emit(Severity::Error, msg);
    }
}
