//! Discord API error types.

/// Discord error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DiscordErrorKind {
    /// Underlying API call failed
    Api(String),
    /// Guild member could not be found
    UnknownMember(u64),
    /// The user's DMs are closed
    DmsClosed(u64),
    /// An interaction payload did not carry the expected data
    MalformedInteraction(String),
    /// A channel name did not encode a ticket id
    ChannelName(String),
}

impl std::fmt::Display for DiscordErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscordErrorKind::Api(msg) => write!(f, "Discord API error: {}", msg),
            DiscordErrorKind::UnknownMember(id) => {
                write!(f, "Member {} not found in guild", id)
            }
            DiscordErrorKind::DmsClosed(id) => {
                write!(f, "Cannot send direct messages to user {}", id)
            }
            DiscordErrorKind::MalformedInteraction(msg) => {
                write!(f, "Malformed interaction payload: {}", msg)
            }
            DiscordErrorKind::ChannelName(name) => {
                write!(f, "Channel name '{}' does not encode a ticket id", name)
            }
        }
    }
}

/// Discord error with source location tracking.
#[derive(Debug, Clone)]
pub struct DiscordError {
    /// The kind of error that occurred
    pub kind: DiscordErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DiscordError {
    /// Create a new DiscordError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DiscordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether this error signals that the target user's DMs are closed.
    pub fn is_dms_closed(&self) -> bool {
        matches!(self.kind, DiscordErrorKind::DmsClosed(_))
    }
}

impl std::fmt::Display for DiscordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Discord Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for DiscordError {}

impl From<serenity::Error> for DiscordError {
    fn from(err: serenity::Error) -> Self {
        DiscordError::new(DiscordErrorKind::Api(err.to_string()))
    }
}
