//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use crate::shell::OutputLine;
use crate::sync::OutputSink;

use super::theme::Theme;
use super::SpinnerHandle;

/// Longest tool line shown next to the spinner.
const MAX_LIVE_WIDTH: usize = 72;

/// A progress spinner for the sync.
pub struct ProgressSpinner {
    bar: ProgressBar,
    base_message: String,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.magenta} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            base_message: message.to_string(),
        }
    }

    /// Create a spinner that doesn't show.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            base_message: String::new(),
        }
    }

    fn finish_with(&mut self, msg: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(msg);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn finish_success(&mut self, msg: &str) {
        let text = Theme::detect().format_success(msg);
        self.finish_with(text);
    }

    fn finish_error(&mut self, msg: &str) {
        let text = Theme::detect().format_error(msg);
        self.finish_with(text);
    }

    fn output_sink(&self) -> Option<OutputSink> {
        if self.bar.is_hidden() {
            return None;
        }
        Some(live_output_sink(self.bar.clone(), self.base_message.clone()))
    }
}

/// Create a sink that shows the latest tool line after the spinner message.
pub fn live_output_sink(bar: ProgressBar, base_message: String) -> OutputSink {
    let theme = Theme::detect();
    Arc::new(move |line: OutputLine| {
        let text = match &line {
            OutputLine::Stdout(t) | OutputLine::Stderr(t) => t.trim(),
        };
        if text.is_empty() {
            return;
        }
        bar.set_message(format!(
            "{} {}",
            base_message,
            theme.dim.apply_to(truncate(text, MAX_LIVE_WIDTH))
        ));
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_has_no_sink() {
        let spinner = ProgressSpinner::hidden();
        assert!(spinner.output_sink().is_none());
    }

    #[test]
    fn hidden_spinner_finishes_quietly() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.finish_success("done");
    }

    #[test]
    fn live_sink_updates_message() {
        let bar = ProgressBar::hidden();
        let sink = live_output_sink(bar.clone(), "Syncing".to_string());

        sink(OutputLine::Stderr("Resolved 42 packages in 3ms".to_string()));

        assert!(bar.message().starts_with("Syncing"));
        assert!(bar.message().contains("Resolved 42 packages"));
    }

    #[test]
    fn truncate_long_lines() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
