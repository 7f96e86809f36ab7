//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use install_deps::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("uv sync --group dev");
//! ui.error("uv was not found");
//!
//! assert_eq!(ui.messages(), ["uv sync --group dev"]);
//! assert!(ui.has_error("not found"));
//! ```

use std::sync::{Arc, Mutex};

use crate::sync::OutputSink;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    spinners: Vec<String>,
    spinner_outcomes: Arc<Mutex<Vec<Result<String, String>>>>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Messages of every spinner started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// How each spinner finished: `Ok(msg)` for success, `Err(msg)` for error.
    pub fn spinner_outcomes(&self) -> Vec<Result<String, String>> {
        self.spinner_outcomes
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    /// Whether any error message contains `needle`.
    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner {
            outcomes: Arc::clone(&self.spinner_outcomes),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records how it finished.
#[derive(Debug)]
pub struct MockSpinner {
    outcomes: Arc<Mutex<Vec<Result<String, String>>>>,
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        if let Ok(mut o) = self.outcomes.lock() {
            o.push(Ok(msg.to_string()));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        if let Ok(mut o) = self.outcomes.lock() {
            o.push(Err(msg.to_string()));
        }
    }

    fn output_sink(&self) -> Option<OutputSink> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_all_channels() {
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        ui.message("m");
        ui.success("s");
        ui.warning("w");
        ui.error("e");

        assert_eq!(ui.output_mode(), OutputMode::Verbose);
        assert_eq!(ui.messages(), ["m"]);
        assert_eq!(ui.successes(), ["s"]);
        assert_eq!(ui.warnings(), ["w"]);
        assert_eq!(ui.errors(), ["e"]);
    }

    #[test]
    fn records_spinner_outcomes() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Syncing");
        spinner.finish_error("failed");

        assert_eq!(ui.spinners(), ["Syncing"]);
        assert_eq!(ui.spinner_outcomes(), vec![Err("failed".to_string())]);
    }
}
