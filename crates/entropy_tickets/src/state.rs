//! The ticket state machine.
//!
//! Transitions form a DAG; nothing ever returns to `Open`. The store applies
//! an event with a conditional UPDATE whose `WHERE state IN (...)` clause is
//! exactly [`TicketEvent::allowed_sources`], so invalid transitions are
//! rejected atomically and concurrent writers resolve to last-write-wins.

use entropy_error::{TicketError, TicketErrorKind};
use strum::{Display, EnumIter, EnumString};

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum TicketState {
    /// Created, waiting for a moderator
    Open,
    /// A moderator owns the case (also the state after reopen)
    Claimed,
    /// Resolved; requester access revoked
    Closed,
    /// Transcript captured, channel destroyed
    Deleted,
    /// The requester left the platform mid-ticket
    RequesterLeft,
}

impl TicketState {
    /// Label shown on the moderation panel and status board.
    pub fn label(&self) -> &'static str {
        match self {
            TicketState::Open => "Open",
            TicketState::Claimed => "Claimed",
            TicketState::Closed => "Closed",
            TicketState::Deleted => "Deleted",
            TicketState::RequesterLeft => "RequesterLeft",
        }
    }

    /// Channel-name fragment for this state.
    pub fn name_fragment(&self) -> &'static str {
        match self {
            TicketState::Open => "open",
            TicketState::Claimed => "claimed",
            TicketState::Closed => "closed",
            TicketState::Deleted => "deleted",
            TicketState::RequesterLeft => "userleft",
        }
    }
}

/// Moderator-driven lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TicketEvent {
    /// A moderator takes the case
    Claim,
    /// The case is handed to a chosen moderator (overwrites the claimer)
    Assign,
    /// The case is resolved
    Close,
    /// A closed case is picked back up
    Reopen,
    /// Transcript capture and channel destruction
    Delete,
}

impl TicketEvent {
    /// States this event may fire from.
    ///
    /// Delete is additionally allowed from `RequesterLeft` so moderators can
    /// still archive tickets whose requester is gone.
    pub fn allowed_sources(&self) -> &'static [TicketState] {
        match self {
            TicketEvent::Claim => &[TicketState::Open],
            TicketEvent::Assign => &[TicketState::Open, TicketState::Claimed],
            TicketEvent::Close => &[TicketState::Open, TicketState::Claimed],
            TicketEvent::Reopen => &[TicketState::Closed],
            TicketEvent::Delete => &[
                TicketState::Open,
                TicketState::Claimed,
                TicketState::Closed,
                TicketState::RequesterLeft,
            ],
        }
    }

    /// State this event lands in.
    pub fn target(&self) -> TicketState {
        match self {
            TicketEvent::Claim | TicketEvent::Assign | TicketEvent::Reopen => TicketState::Claimed,
            TicketEvent::Close => TicketState::Closed,
            TicketEvent::Delete => TicketState::Deleted,
        }
    }
}

/// Apply an event to a state, rejecting transitions outside the DAG.
pub fn apply(
    ticket_id: i32,
    state: TicketState,
    event: TicketEvent,
) -> Result<TicketState, TicketError> {
    if event.allowed_sources().contains(&state) {
        Ok(event.target())
    } else {
        Err(TicketError::new(TicketErrorKind::InvalidTransition {
            ticket_id,
            event: event.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const EVENTS: [TicketEvent; 5] = [
        TicketEvent::Claim,
        TicketEvent::Assign,
        TicketEvent::Close,
        TicketEvent::Reopen,
        TicketEvent::Delete,
    ];

    #[test]
    fn happy_path_walks_the_dag() {
        let s = apply(1, TicketState::Open, TicketEvent::Claim).unwrap();
        assert_eq!(s, TicketState::Claimed);
        let s = apply(1, s, TicketEvent::Close).unwrap();
        assert_eq!(s, TicketState::Closed);
        let s = apply(1, s, TicketEvent::Reopen).unwrap();
        assert_eq!(s, TicketState::Claimed);
        let s = apply(1, s, TicketEvent::Close).unwrap();
        let s = apply(1, s, TicketEvent::Delete).unwrap();
        assert_eq!(s, TicketState::Deleted);
    }

    #[test]
    fn nothing_returns_to_open() {
        for event in EVENTS {
            assert_ne!(event.target(), TicketState::Open);
        }
    }

    #[test]
    fn deleted_is_terminal() {
        for event in EVENTS {
            assert!(apply(1, TicketState::Deleted, event).is_err());
        }
    }

    #[test]
    fn requester_left_only_allows_delete() {
        for event in EVENTS {
            let result = apply(1, TicketState::RequesterLeft, event);
            if event == TicketEvent::Delete {
                assert_eq!(result.unwrap(), TicketState::Deleted);
            } else {
                assert!(result.is_err());
            }
        }
    }

    #[test]
    fn double_claim_is_rejected_at_the_guard() {
        let claimed = apply(4, TicketState::Open, TicketEvent::Claim).unwrap();
        assert!(apply(4, claimed, TicketEvent::Claim).is_err());
        // the second concurrent moderator goes through Assign instead
        assert_eq!(
            apply(4, claimed, TicketEvent::Assign).unwrap(),
            TicketState::Claimed
        );
    }

    #[test]
    fn reopen_only_from_closed() {
        for state in TicketState::iter() {
            let result = apply(1, state, TicketEvent::Reopen);
            assert_eq!(result.is_ok(), state == TicketState::Closed);
        }
    }

    #[test]
    fn state_labels_round_trip_through_strum() {
        for state in TicketState::iter() {
            let text = state.to_string();
            let parsed: TicketState = text.parse().unwrap();
            assert_eq!(parsed, state);
        }
    }
}
