//! The package manager capability.
//!
//! [`PackageManager`] has one operation: sync the environment to a set of
//! groups and report how the tool exited. [`ProcessManager`] implements it by
//! spawning the real executable; tests substitute in-memory fakes.

use std::io::{self, Write};
use std::sync::Arc;

use crate::error::{Result, SyncError};
use crate::shell::{execute_streaming, OutputLine};

use super::plan::ToolInvocation;

/// Outcome of a sync invocation that ran to completion or was stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Exit code (None if the process was killed by a signal).
    pub exit_code: Option<i32>,

    /// Whether the process was killed for exceeding its timeout.
    pub timed_out: bool,

    /// Captured diagnostic output (stderr), used to classify failures.
    pub diagnostics: String,
}

impl SyncStatus {
    /// A clean exit.
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    /// A non-zero exit with the tool's diagnostics.
    pub fn failed(exit_code: i32, diagnostics: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            timed_out: false,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// Something that can synchronize an environment with a lockfile.
pub trait PackageManager {
    /// Display name of the tool (e.g. `uv`).
    fn name(&self) -> &str;

    /// Sync the default group plus `groups`.
    ///
    /// Returns `Err(SyncError::ToolUnavailable)` when the tool cannot be
    /// started. Any exit, successful or not, is reported as a [`SyncStatus`].
    fn sync(&self, groups: &[String]) -> Result<SyncStatus>;
}

impl<M: PackageManager + ?Sized> PackageManager for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sync(&self, groups: &[String]) -> Result<SyncStatus> {
        (**self).sync(groups)
    }
}

/// Receives each line of tool output as it is produced.
pub type OutputSink = Arc<dyn Fn(OutputLine) + Send + Sync>;

/// Forward tool output unchanged: stdout to stdout, stderr to stderr.
pub fn passthrough() -> OutputSink {
    Arc::new(|line| match line {
        OutputLine::Stdout(text) => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", text);
        }
        OutputLine::Stderr(text) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{}", text);
        }
    })
}

/// A package manager backed by an external process.
pub struct ProcessManager {
    invocation: ToolInvocation,
    sink: OutputSink,
}

impl ProcessManager {
    /// Create a manager that streams tool output through [`passthrough`].
    pub fn new(invocation: ToolInvocation) -> Self {
        Self {
            invocation,
            sink: passthrough(),
        }
    }

    /// Replace the output sink.
    pub fn with_output(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn invocation(&self) -> &ToolInvocation {
        &self.invocation
    }
}

impl PackageManager for ProcessManager {
    fn name(&self) -> &str {
        self.invocation.tool.program()
    }

    fn sync(&self, groups: &[String]) -> Result<SyncStatus> {
        let spec = self.invocation.command_spec(groups);
        tracing::info!("Running {}", spec.display());

        let sink = Arc::clone(&self.sink);
        let result = execute_streaming(&spec, Box::new(move |line| sink(line))).map_err(|e| {
            let reason = if e.kind() == io::ErrorKind::NotFound {
                format!("'{}' was not found on PATH", self.invocation.program)
            } else {
                format!("could not start '{}': {}", self.invocation.program, e)
            };
            SyncError::ToolUnavailable {
                tool: self.name().to_string(),
                reason,
                interrupted: false,
            }
        })?;

        tracing::debug!(
            "{} exited with {:?} after {:?}",
            self.name(),
            result.exit_code,
            result.duration
        );

        Ok(SyncStatus {
            exit_code: result.exit_code,
            timed_out: result.timed_out,
            diagnostics: result.stderr,
        })
    }
}
