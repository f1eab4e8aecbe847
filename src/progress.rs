//! Progress display for discovery and update steps
//!
//! Provides visual feedback while external commands run using indicatif.

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Progress reporter for the update workflow
pub struct Progress {
    /// Whether spinners are drawn (disabled under --debug so logs stay readable)
    enabled: bool,
    /// Current spinner or bar
    bar: Option<ProgressBar>,
    /// Destination of outcome lines
    out: Box<dyn Write>,
}

impl Progress {
    /// Create a new progress reporter writing outcome lines to stdout
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: None,
            out: Box::new(io::stdout()),
        }
    }

    /// Send outcome lines to `out` instead of stdout
    pub fn with_writer(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Create a disabled progress reporter
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner with a message while a command runs
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Start a progress bar for a known number of steps
    pub fn start(&mut self, total: u64, message: &str) {
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .expect("Invalid template")
                .progress_chars("█▓▒░"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Increment progress by one
    pub fn inc(&self) {
        if let Some(ref bar) = self.bar {
            bar.inc(1);
        }
    }

    /// Update the message
    pub fn set_message(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Clear the spinner and print a success line
    pub fn succeed(&mut self, message: &str) {
        self.outcome("✓".green(), message);
    }

    /// Clear the spinner and print a failure line
    pub fn fail(&mut self, message: &str) {
        self.outcome("✗".red(), message);
    }

    fn outcome(&mut self, mark: ColoredString, message: &str) {
        self.finish_and_clear();
        if self.enabled {
            // A closed stdout must not abort the update run
            let _ = writeln!(self.out, "{} {}", mark, message);
        }
    }

    /// Finish and clear the current spinner
    pub fn finish_and_clear(&mut self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
        self.bar = None;
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(true)
    }
}
