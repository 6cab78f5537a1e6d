//! Ticket lifecycle error types.

/// Ticket error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TicketErrorKind {
    /// Requested transition is not allowed from the ticket's current state
    InvalidTransition {
        /// Ticket id
        ticket_id: i32,
        /// Event name that was rejected
        event: String,
    },
    /// Ticket row not found
    NotFound(i32),
    /// Topic id not present in the registry
    UnknownTopic(String),
    /// Modal submission carried no usable fields
    EmptySubmission,
    /// Ticket has no channel attached yet
    NoChannel(i32),
}

impl std::fmt::Display for TicketErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketErrorKind::InvalidTransition { ticket_id, event } => {
                write!(
                    f,
                    "Transition '{}' rejected for ticket #{}",
                    event, ticket_id
                )
            }
            TicketErrorKind::NotFound(id) => write!(f, "Ticket #{} not found", id),
            TicketErrorKind::UnknownTopic(id) => write!(f, "Unknown ticket topic '{}'", id),
            TicketErrorKind::EmptySubmission => write!(f, "Submission carried no fields"),
            TicketErrorKind::NoChannel(id) => write!(f, "Ticket #{} has no channel", id),
        }
    }
}

/// Ticket error with source location tracking.
#[derive(Debug, Clone)]
pub struct TicketError {
    /// The kind of error that occurred
    pub kind: TicketErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TicketError {
    /// Create a new TicketError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TicketErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for TicketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ticket Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for TicketError {}
