//! Admin notification error types.

/// Admin notification error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotifyErrorKind {
    /// The per-day log file could not be written
    LogFile(String),
    /// The DM to an admin could not be delivered
    AdminDm(String),
}

impl std::fmt::Display for NotifyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifyErrorKind::LogFile(msg) => write!(f, "Log file write failed: {}", msg),
            NotifyErrorKind::AdminDm(msg) => write!(f, "Admin DM delivery failed: {}", msg),
        }
    }
}

/// Admin notification error with source location tracking.
#[derive(Debug, Clone)]
pub struct NotifyError {
    /// The kind of error that occurred
    pub kind: NotifyErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl NotifyError {
    /// Create a new NotifyError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotifyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Notify Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for NotifyError {}
