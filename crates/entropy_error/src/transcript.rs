//! Transcript capture error types.

/// Transcript error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TranscriptErrorKind {
    /// Message pagination against the channel failed
    History(String),
    /// Attachment download failed
    Download(String),
    /// Serializing the transcript to JSON failed
    Serialize(String),
    /// Writing the transcript or an attachment to disk failed
    Io(String),
}

impl std::fmt::Display for TranscriptErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptErrorKind::History(msg) => {
                write!(f, "Message history retrieval failed: {}", msg)
            }
            TranscriptErrorKind::Download(msg) => write!(f, "Attachment download failed: {}", msg),
            TranscriptErrorKind::Serialize(msg) => {
                write!(f, "Transcript serialization failed: {}", msg)
            }
            TranscriptErrorKind::Io(msg) => write!(f, "Transcript file I/O failed: {}", msg),
        }
    }
}

/// Transcript error with source location tracking.
#[derive(Debug, Clone)]
pub struct TranscriptError {
    /// The kind of error that occurred
    pub kind: TranscriptErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TranscriptError {
    /// Create a new TranscriptError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TranscriptErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transcript Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for TranscriptError {}

impl From<std::io::Error> for TranscriptError {
    fn from(err: std::io::Error) -> Self {
        TranscriptError::new(TranscriptErrorKind::Io(err.to_string()))
    }
}

impl From<serde_json::Error> for TranscriptError {
    fn from(err: serde_json::Error) -> Self {
        TranscriptError::new(TranscriptErrorKind::Serialize(err.to_string()))
    }
}

impl From<reqwest::Error> for TranscriptError {
    fn from(err: reqwest::Error) -> Self {
        TranscriptError::new(TranscriptErrorKind::Download(err.to_string()))
    }
}
