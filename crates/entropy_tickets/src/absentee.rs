//! Absentee reconciler: detects tickets whose requester left the platform.
//!
//! Runs on a fixed schedule. Unknown-member lookups post a red notice in the
//! ticket channel and queue the state flip; the queue is committed as one
//! batch transaction per sweep. Every other lookup error is logged and the
//! requester stays as-is.

use crate::context::Core;
use entropy_discord::error_embed;
use entropy_error::{DiscordErrorKind, EntropyErrorKind, EntropyResult};
use serenity::all::{ChannelId, CreateMessage, UserId};
use tracing::{info, instrument, warn};

/// One reconciliation pass over all live tickets.
///
/// Returns how many tickets were marked RequesterLeft.
#[instrument(skip(core))]
pub async fn run_sweep(core: &Core) -> EntropyResult<usize> {
    let tickets = core.store().absentee_candidates().await?;
    let mut departed_channels: Vec<i64> = Vec::new();

    for ticket in &tickets {
        let Some(channel_id) = ticket.channel_id else {
            continue;
        };

        let requester = UserId::new(ticket.creator_id as u64);
        match core.api().member(core.guild_id(), requester).await {
            Ok(_) => {}
            Err(e) if matches!(e.kind, DiscordErrorKind::UnknownMember(_)) => {
                let notice = CreateMessage::new().embed(error_embed(
                    "Benutzer nicht mehr auf dem Server",
                    "Der Ersteller dieses Tickets ist nicht mehr auf dem Server.",
                ));
                if let Err(send_err) = core
                    .api()
                    .send_message(ChannelId::new(channel_id as u64), notice)
                    .await
                {
                    warn!(error = %send_err, ticket_id = ticket.id, "Absentee notice failed");
                }
                departed_channels.push(channel_id);
            }
            Err(e) => {
                // transient lookup failure, the requester stays as-is
                warn!(error = %e, ticket_id = ticket.id, "Requester lookup failed, skipping");
            }
        }
    }

    let count = departed_channels.len();
    if let Err(e) = core
        .store()
        .mark_requester_left_batch(&departed_channels)
        .await
    {
        if let EntropyErrorKind::Database(db) = e.kind() {
            warn!(error = %db, "Absentee batch update failed");
        }
        return Err(e);
    }

    if count > 0 {
        info!(count, "Requesters marked as departed");
    }
    Ok(count)
}
