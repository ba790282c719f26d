//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles progress display during a run.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::InventoryProgress;

use binv_core::config::Defaults;

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress display
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
    /// Print per-bucket progress lines
    pub verbose: bool,
}

impl OutputConfig {
    /// Fill in anything the flags left unset from the config file defaults
    pub fn with_defaults(mut self, defaults: &Defaults) -> Self {
        self.json |= defaults.output == "json";
        self.no_color |= defaults.color == "never";
        self.no_progress |= !defaults.progress;
        if defaults.color == "always" && !self.no_color {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        self
    }
}
