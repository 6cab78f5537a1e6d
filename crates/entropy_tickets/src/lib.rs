//! Ticket lifecycle subsystem for the Entropy Gaming bot.
//!
//! Turns ephemeral chat interactions into persistent, auditable support and
//! application cases: a requester picks a topic, fills a modal, and gets a
//! private channel whose access and moderation surface track a durable state
//! machine. Moderators drive the case through claim / close / reopen /
//! assign / delete; deletion captures a full transcript (attachments
//! included) before the channel is destroyed.
//!
//! Module map:
//! - [`topic`] — the single registry of ticket topics (labels, modal fields,
//!   category and role keys)
//! - [`state`] — the ticket state machine (DAG of transitions)
//! - [`store`] — durable ticket, survey and staff rows
//! - [`identity`] — platform user → internal user row resolution
//! - [`permission`] — role-flag seniority hierarchy
//! - [`intake`] — topic selectors, modals, and the submission pipeline
//! - [`provision`] — per-ticket channel creation and access overrides
//! - [`panel`] — the four-button moderation surface
//! - [`assign`] — hand a case to an eligible moderator
//! - [`transcript`] — capture-then-destroy delete path
//! - [`absentee`] — detects requesters who left the platform
//! - [`staff`] — topic → eligible moderator reconciliation
//! - [`survey`] — once-per-requester "how did you hear about us" DM
//! - [`status`] — the live-ticket status board

#![warn(missing_docs)]

pub mod absentee;
mod context;
pub mod intake;
pub mod panel;
pub mod provision;
pub mod staff;
pub mod status;
pub mod survey;
pub mod transcript;

pub mod assign;
pub mod identity;
pub mod permission;
pub mod state;
pub mod store;
pub mod topic;

mod model;

pub use context::{Core, CoreBuilder};
pub use model::{Actor, NewTicket, StaffMemberRow, TicketRow, UserRow};
pub use state::{TicketEvent, TicketState};
pub use store::TicketStore;
pub use topic::{FieldSpec, FieldStyle, Topic, TopicSpec};

/// Result type for ticket operations.
pub type TicketResult<T> = std::result::Result<T, entropy_error::TicketError>;
