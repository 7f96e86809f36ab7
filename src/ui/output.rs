//! Output verbosity.

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Tool output plus progress and a final status line.
    Verbose,
    /// Tool output only.
    #[default]
    Normal,
    /// A spinner; tool diagnostics are replayed only on failure.
    Quiet,
}

impl OutputMode {
    /// Check if this mode streams the package manager's output.
    pub fn shows_tool_output(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if this mode shows status messages of our own.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}
