//! Durable ticket, survey-answer and staff-member rows.
//!
//! All mutations are single statements; the only explicit transaction is the
//! absentee reconciler's batch update. Transition validity is enforced by the
//! statement itself (`WHERE status IN (...)`), so two concurrent moderators
//! racing on the same ticket resolve to last-write-wins without any
//! in-memory locking.

use crate::model::{
    Actor, NewStaffMember, NewSurveyAnswer, NewTicket, StaffMemberRow, TicketRow,
};
use crate::state::{TicketEvent, TicketState};
use crate::topic::Topic;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::upsert::excluded;
use entropy_database::schema::{staff_members, survey_answers, tickets};
use entropy_database::DbPool;
use entropy_error::{DatabaseError, EntropyResult, TicketError, TicketErrorKind};
use tracing::{debug, info, instrument};

type PooledPg = PooledConnection<ConnectionManager<PgConnection>>;

/// Repository over the tickets, survey_answers and staff_members tables.
#[derive(Clone)]
pub struct TicketStore {
    pool: DbPool,
}

impl TicketStore {
    /// Create a store over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> EntropyResult<PooledPg> {
        Ok(self.pool.get().map_err(DatabaseError::from)?)
    }

    /// Insert a new Open ticket and return its id.
    #[instrument(skip(self, fields), fields(topic = topic.id(), requester = requester.id))]
    pub async fn create(
        &self,
        topic: Topic,
        requester: &Actor,
        fields: [Option<String>; 5],
    ) -> EntropyResult<i32> {
        let [one, two, three, four, five] = fields;
        let row = NewTicket {
            status: TicketState::Open.to_string(),
            topic: topic.id().to_string(),
            creator_id: requester.id,
            creator_name: requester.name.clone(),
            created_at: Utc::now(),
            field_one: one,
            field_two: two,
            field_three: three,
            field_four: four,
            field_five: five,
        };

        let mut conn = self.conn()?;
        let id: i32 = diesel::insert_into(tickets::table)
            .values(&row)
            .returning(tickets::id)
            .get_result(&mut conn)
            .map_err(DatabaseError::from)?;

        info!(ticket_id = id, "Ticket created");
        Ok(id)
    }

    /// Set the channel handle after provisioning.
    #[instrument(skip(self))]
    pub async fn attach_channel(&self, ticket_id: i32, channel_id: i64) -> EntropyResult<()> {
        let mut conn = self.conn()?;
        diesel::update(tickets::table.filter(tickets::id.eq(ticket_id)))
            .set(tickets::channel_id.eq(channel_id))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Apply a lifecycle event with the DAG as an atomic guard.
    ///
    /// The update only matches rows whose current state is an allowed source
    /// of the event; zero matched rows is reported as an invalid transition.
    /// Returns the ticket as it stands after the write.
    #[instrument(skip(self, actor), fields(event = %event, actor = actor.id))]
    pub async fn transition(
        &self,
        ticket_id: i32,
        event: TicketEvent,
        actor: &Actor,
    ) -> EntropyResult<TicketRow> {
        let sources: Vec<String> = event
            .allowed_sources()
            .iter()
            .map(TicketState::to_string)
            .collect();
        let target = event.target().to_string();
        let now = Utc::now();

        let mut conn = self.conn()?;
        let scope = tickets::table
            .filter(tickets::id.eq(ticket_id))
            .filter(tickets::status.eq_any(sources));

        let result = match event {
            TicketEvent::Claim | TicketEvent::Assign => diesel::update(scope)
                .set((
                    tickets::status.eq(&target),
                    tickets::claimer_id.eq(actor.id),
                    tickets::claimer_name.eq(&actor.name),
                    tickets::claimed_at.eq(now),
                ))
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(&mut conn),
            TicketEvent::Close => diesel::update(scope)
                .set((
                    tickets::status.eq(&target),
                    tickets::closer_id.eq(actor.id),
                    tickets::closer_name.eq(&actor.name),
                    tickets::closed_at.eq(now),
                ))
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(&mut conn),
            // reopen keeps the claimer and closer triples; the reopen actor
            // only shows up in the channel topic
            TicketEvent::Reopen => diesel::update(scope)
                .set(tickets::status.eq(&target))
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(&mut conn),
            TicketEvent::Delete => diesel::update(scope)
                .set((
                    tickets::status.eq(&target),
                    tickets::deleter_id.eq(actor.id),
                    tickets::deleter_name.eq(&actor.name),
                    tickets::deleted_at.eq(now),
                ))
                .returning(TicketRow::as_returning())
                .get_result::<TicketRow>(&mut conn),
        };

        match result {
            Ok(row) => {
                info!(ticket_id, state = %row.status, "Ticket transitioned");
                Ok(row)
            }
            Err(diesel::result::Error::NotFound) => {
                debug!(ticket_id, "Transition rejected by state guard");
                Err(TicketError::new(TicketErrorKind::InvalidTransition {
                    ticket_id,
                    event: event.to_string(),
                })
                .into())
            }
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }

    /// Persist the transcript file path.
    #[instrument(skip(self))]
    pub async fn record_transcript(&self, ticket_id: i32, path: &str) -> EntropyResult<()> {
        let mut conn = self.conn()?;
        diesel::update(tickets::table.filter(tickets::id.eq(ticket_id)))
            .set(tickets::transcript_path.eq(path))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Read one ticket.
    #[instrument(skip(self))]
    pub async fn read(&self, ticket_id: i32) -> EntropyResult<TicketRow> {
        let mut conn = self.conn()?;
        tickets::table
            .filter(tickets::id.eq(ticket_id))
            .select(TicketRow::as_select())
            .first(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    TicketError::new(TicketErrorKind::NotFound(ticket_id)).into()
                }
                other => DatabaseError::from(other).into(),
            })
    }

    /// Every ticket not in Deleted.
    #[instrument(skip(self))]
    pub async fn list_live(&self) -> EntropyResult<Vec<TicketRow>> {
        let mut conn = self.conn()?;
        let rows = tickets::table
            .filter(tickets::status.ne(TicketState::Deleted.to_string()))
            .order(tickets::id.asc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    /// Tickets whose requester may still be on the platform.
    #[instrument(skip(self))]
    pub async fn absentee_candidates(&self) -> EntropyResult<Vec<TicketRow>> {
        let mut conn = self.conn()?;
        let rows = tickets::table
            .filter(tickets::status.ne_all(vec![
                TicketState::Deleted.to_string(),
                TicketState::RequesterLeft.to_string(),
            ]))
            .order(tickets::id.asc())
            .select(TicketRow::as_select())
            .load(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    /// Mark one ticket RequesterLeft, keyed by channel handle.
    #[instrument(skip(self))]
    pub async fn mark_requester_left(&self, channel_id: i64) -> EntropyResult<()> {
        let mut conn = self.conn()?;
        diesel::update(tickets::table.filter(tickets::channel_id.eq(channel_id)))
            .set(tickets::status.eq(TicketState::RequesterLeft.to_string()))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Mark a batch of tickets RequesterLeft in one transaction per sweep.
    #[instrument(skip(self), fields(count = channel_ids.len()))]
    pub async fn mark_requester_left_batch(&self, channel_ids: &[i64]) -> EntropyResult<()> {
        if channel_ids.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            for channel_id in channel_ids {
                diesel::update(tickets::table.filter(tickets::channel_id.eq(channel_id)))
                    .set(tickets::status.eq(TicketState::RequesterLeft.to_string()))
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(DatabaseError::from)?;

        info!(count = channel_ids.len(), "Absentee batch committed");
        Ok(())
    }

    /// Status-board reconciliation: the channel is gone, so the ticket is too.
    #[instrument(skip(self))]
    pub async fn mark_channel_gone(&self, ticket_id: i32) -> EntropyResult<()> {
        let mut conn = self.conn()?;
        diesel::update(tickets::table.filter(tickets::id.eq(ticket_id)))
            .set(tickets::status.eq(TicketState::Deleted.to_string()))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Whether the requester already answered the after-ticket survey.
    #[instrument(skip(self))]
    pub async fn has_survey_answer(&self, user_id: i64) -> EntropyResult<bool> {
        let mut conn = self.conn()?;
        let count: i64 = survey_answers::table
            .filter(survey_answers::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(count > 0)
    }

    /// Record a survey answer; at most one row per requester.
    #[instrument(skip(self, answer), fields(user_id))]
    pub async fn insert_survey_answer(
        &self,
        user_id: i64,
        username: Option<String>,
        answer: String,
    ) -> EntropyResult<()> {
        let row = NewSurveyAnswer {
            user_id,
            username,
            answer,
            answered_at: Utc::now().timestamp(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(survey_answers::table)
            .values(&row)
            .on_conflict(survey_answers::user_id)
            .do_nothing()
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Eligible moderators for a topic, stable order.
    #[instrument(skip(self), fields(topic = topic.id()))]
    pub async fn staff_for_topic(&self, topic: Topic) -> EntropyResult<Vec<StaffMemberRow>> {
        let mut conn = self.conn()?;
        let rows = staff_members::table
            .filter(staff_members::topic.eq(topic.id()))
            .order(staff_members::username.asc())
            .select(StaffMemberRow::as_select())
            .load(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    /// Platform ids currently mapped to a topic.
    #[instrument(skip(self))]
    pub async fn staff_ids_for_topic(&self, topic_id: &str) -> EntropyResult<Vec<i64>> {
        let mut conn = self.conn()?;
        let ids = staff_members::table
            .filter(staff_members::topic.eq(topic_id))
            .select(staff_members::discord_id)
            .load(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(ids)
    }

    /// Add or refresh one topic → member mapping.
    #[instrument(skip(self, username))]
    pub async fn upsert_staff(
        &self,
        topic_id: &str,
        discord_id: i64,
        username: &str,
    ) -> EntropyResult<()> {
        let row = NewStaffMember {
            topic: topic_id.to_string(),
            discord_id,
            username: username.to_string(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(staff_members::table)
            .values(&row)
            .on_conflict((staff_members::topic, staff_members::discord_id))
            .do_update()
            .set(staff_members::username.eq(excluded(staff_members::username)))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Evict one topic → member mapping no longer backed by a role.
    #[instrument(skip(self))]
    pub async fn remove_staff(&self, topic_id: &str, discord_id: i64) -> EntropyResult<()> {
        let mut conn = self.conn()?;
        diesel::delete(
            staff_members::table
                .filter(staff_members::topic.eq(topic_id))
                .filter(staff_members::discord_id.eq(discord_id)),
        )
        .execute(&mut conn)
        .map_err(DatabaseError::from)?;
        Ok(())
    }
}
