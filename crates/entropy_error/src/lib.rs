//! Error types for the Entropy Gaming community bot.
//!
//! Each domain (database, Discord, tickets, transcripts, configuration,
//! admin notification) carries its own error struct with a `Kind` enum and
//! source-location tracking. The crate-level [`EntropyError`] aggregates all
//! of them so handlers can propagate with `?` regardless of which layer
//! failed.

mod config;
mod database;
mod discord;
mod notify;
mod ticket;
mod transcript;

pub use config::{ConfigError, ConfigErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind};
pub use discord::{DiscordError, DiscordErrorKind};
pub use notify::{NotifyError, NotifyErrorKind};
pub use ticket::{TicketError, TicketErrorKind};
pub use transcript::{TranscriptError, TranscriptErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum EntropyErrorKind {
    /// Database error
    Database(DatabaseError),
    /// Discord API error
    Discord(DiscordError),
    /// Ticket lifecycle error
    Ticket(TicketError),
    /// Transcript capture error
    Transcript(TranscriptError),
    /// Configuration error
    Config(ConfigError),
    /// Admin notification error
    Notify(NotifyError),
}

impl std::fmt::Display for EntropyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntropyErrorKind::Database(e) => write!(f, "{}", e),
            EntropyErrorKind::Discord(e) => write!(f, "{}", e),
            EntropyErrorKind::Ticket(e) => write!(f, "{}", e),
            EntropyErrorKind::Transcript(e) => write!(f, "{}", e),
            EntropyErrorKind::Config(e) => write!(f, "{}", e),
            EntropyErrorKind::Notify(e) => write!(f, "{}", e),
        }
    }
}

/// Entropy error with kind discrimination.
#[derive(Debug)]
pub struct EntropyError(Box<EntropyErrorKind>);

impl EntropyError {
    /// Create a new error from a kind.
    pub fn new(kind: EntropyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EntropyErrorKind {
        &self.0
    }
}

impl std::fmt::Display for EntropyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entropy Error: {}", self.0)
    }
}

impl std::error::Error for EntropyError {}

// Generic From implementation for any type that converts to EntropyErrorKind
impl<T> From<T> for EntropyError
where
    T: Into<EntropyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for bot operations.
pub type EntropyResult<T> = std::result::Result<T, EntropyError>;
