//! Output styles using owo-colors stylesheet pattern

use hostcheck_common::CheckStatus;
use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// PASS and success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// FAIL and error messages (red)
    pub error: Style,
    /// Info messages (blue)
    pub info: Style,
    /// Dimmed/secondary text, SKIP results
    pub dim: Style,
    /// Bold text
    pub bold: Style,
    /// Headers/section titles
    pub header: Style,
    /// ERROR results (magenta, kept apart from FAIL)
    pub fault: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.bold = Style::new().bold();
        self.header = Style::new().bold().cyan();
        self.fault = Style::new().bold().magenta();
    }

    /// Style for a check status.
    #[must_use]
    pub fn status(&self, status: CheckStatus) -> Style {
        match status {
            CheckStatus::Pass => self.success,
            CheckStatus::Fail => self.error,
            CheckStatus::Skip => self.dim,
            CheckStatus::Error => self.fault,
        }
    }
}
