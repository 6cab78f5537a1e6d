//! Diesel row models for the ticket subsystem.

use crate::state::TicketState;
use crate::topic::Topic;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use entropy_database::schema::{staff_members, survey_answers, tickets, users};
use entropy_error::{TicketError, TicketErrorKind};
use serenity::all::User;

/// An acting user: platform id plus cached display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Platform (Discord) user id
    pub id: i64,
    /// Cached username at the time of the action
    pub name: String,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get() as i64,
            name: user.name.clone(),
        }
    }
}

/// Database row for the tickets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TicketRow {
    /// Monotonically increasing ticket id
    pub id: i32,
    /// Stored state label, see [`TicketRow::state`]
    pub status: String,
    /// Stored topic id, see [`TicketRow::topic`]
    pub topic: String,
    /// Channel handle, set once provisioning succeeded
    pub channel_id: Option<i64>,
    /// Requester platform id
    pub creator_id: i64,
    /// Requester name at creation time
    pub creator_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Claimer platform id
    pub claimer_id: Option<i64>,
    /// Claimer name at claim time
    pub claimer_name: Option<String>,
    /// Claim timestamp
    pub claimed_at: Option<DateTime<Utc>>,
    /// Closer platform id
    pub closer_id: Option<i64>,
    /// Closer name at close time
    pub closer_name: Option<String>,
    /// Close timestamp
    pub closed_at: Option<DateTime<Utc>>,
    /// Deleter platform id
    pub deleter_id: Option<i64>,
    /// Deleter name at delete time
    pub deleter_name: Option<String>,
    /// Delete timestamp
    pub deleted_at: Option<DateTime<Utc>>,
    /// First submission field
    pub field_one: Option<String>,
    /// Second submission field
    pub field_two: Option<String>,
    /// Third submission field
    pub field_three: Option<String>,
    /// Fourth submission field
    pub field_four: Option<String>,
    /// Fifth submission field
    pub field_five: Option<String>,
    /// Transcript file path, set at delete time
    pub transcript_path: Option<String>,
}

impl TicketRow {
    /// Parse the stored state label.
    ///
    /// # Errors
    ///
    /// Returns an error if the column holds text this bot never writes.
    pub fn state(&self) -> Result<TicketState, TicketError> {
        self.status.parse().map_err(|_| {
            TicketError::new(TicketErrorKind::InvalidTransition {
                ticket_id: self.id,
                event: format!("unparseable state '{}'", self.status),
            })
        })
    }

    /// Parse the stored topic id against the registry.
    pub fn topic(&self) -> Result<Topic, TicketError> {
        Topic::from_id(&self.topic)
            .ok_or_else(|| TicketError::new(TicketErrorKind::UnknownTopic(self.topic.clone())))
    }

    /// The five submission field slots in order.
    pub fn fields(&self) -> [Option<&str>; 5] {
        [
            self.field_one.as_deref(),
            self.field_two.as_deref(),
            self.field_three.as_deref(),
            self.field_four.as_deref(),
            self.field_five.as_deref(),
        ]
    }

    /// Channel handle, or an error when provisioning has not run yet.
    pub fn channel(&self) -> Result<i64, TicketError> {
        self.channel_id
            .ok_or_else(|| TicketError::new(TicketErrorKind::NoChannel(self.id)))
    }
}

/// Insertable struct for the tickets table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicket {
    pub(crate) status: String,
    pub(crate) topic: String,
    pub(crate) creator_id: i64,
    pub(crate) creator_name: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) field_one: Option<String>,
    pub(crate) field_two: Option<String>,
    pub(crate) field_three: Option<String>,
    pub(crate) field_four: Option<String>,
    pub(crate) field_five: Option<String>,
}

/// Database row for the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Surrogate id
    pub id: i32,
    /// Platform (Discord) id, unique
    pub discord_id: i64,
    /// Account username
    pub username: String,
    /// Global display name
    pub display_name: Option<String>,
    /// Guild nickname
    pub nickname: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Whether the account is a bot
    pub is_bot: bool,
    /// When the user joined the guild
    pub joined_server_at: Option<DateTime<Utc>>,
    /// First interaction with this bot
    pub first_seen: DateTime<Utc>,
    /// Most recent interaction
    pub last_seen: DateTime<Utc>,
    /// Diamond Club member
    pub role_diamond_club: bool,
    /// Diamond Teams member
    pub role_diamond_teams: bool,
    /// Entropy member
    pub role_entropy_member: bool,
    /// Management
    pub role_management: bool,
    /// Developer
    pub role_developer: bool,
    /// Head management
    pub role_head_management: bool,
    /// Projektleitung
    pub role_projektleitung: bool,
}

/// Insertable struct for the users table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub(crate) discord_id: i64,
    pub(crate) username: String,
    pub(crate) display_name: Option<String>,
    pub(crate) nickname: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) is_bot: bool,
    pub(crate) joined_server_at: Option<DateTime<Utc>>,
    pub(crate) first_seen: DateTime<Utc>,
    pub(crate) last_seen: DateTime<Utc>,
    pub(crate) role_diamond_club: bool,
    pub(crate) role_diamond_teams: bool,
    pub(crate) role_entropy_member: bool,
    pub(crate) role_management: bool,
    pub(crate) role_developer: bool,
    pub(crate) role_head_management: bool,
    pub(crate) role_projektleitung: bool,
}

/// Database row for the staff_members table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = staff_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StaffMemberRow {
    /// Surrogate id
    pub id: i32,
    /// Topic id this member may handle
    pub topic: String,
    /// Platform (Discord) id
    pub discord_id: i64,
    /// Cached username
    pub username: String,
}

/// Insertable struct for the staff_members table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = staff_members)]
pub struct NewStaffMember {
    pub(crate) topic: String,
    pub(crate) discord_id: i64,
    pub(crate) username: String,
}

/// Database row for the survey_answers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = survey_answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SurveyAnswerRow {
    /// Platform (Discord) id of the requester, unique
    pub user_id: i64,
    /// Cached username
    pub username: Option<String>,
    /// Chosen answer (canned value or free text)
    pub answer: String,
    /// Unix timestamp of the answer
    pub answered_at: i64,
}

/// Insertable struct for the survey_answers table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = survey_answers)]
pub struct NewSurveyAnswer {
    pub(crate) user_id: i64,
    pub(crate) username: Option<String>,
    pub(crate) answer: String,
    pub(crate) answered_at: i64,
}
