//! Configuration error types.

/// Configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// Required environment variable missing
    MissingEnv(String),
    /// Constant key missing from the bot_constants table
    MissingConstant(String),
    /// A constant value could not be parsed into the expected type
    InvalidValue {
        /// Constant key
        key: String,
        /// Raw value that failed to parse
        value: String,
    },
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorKind::MissingEnv(name) => {
                write!(f, "Environment variable '{}' not set", name)
            }
            ConfigErrorKind::MissingConstant(key) => {
                write!(f, "Constant '{}' not found in bot_constants", key)
            }
            ConfigErrorKind::InvalidValue { key, value } => {
                write!(f, "Constant '{}' has unparseable value '{}'", key, value)
            }
        }
    }
}

/// Configuration error with source location tracking.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Configuration Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ConfigError {}
