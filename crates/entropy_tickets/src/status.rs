//! The status board: one pinned message listing all live tickets grouped by
//! topic, edited in place every minute.
//!
//! Doubles as a reconciliation path: a live ticket whose channel no longer
//! resolves on the platform is marked Deleted in the store.

use crate::context::Core;
use crate::model::TicketRow;
use entropy_discord::colors;
use entropy_error::EntropyResult;
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage, EditMessage, MessageId};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// One board line for a live ticket.
pub fn board_entry(ticket: &TicketRow) -> String {
    let moderator = match ticket.claimer_id {
        Some(claimer) => format!(" Bearbeiter: <@{}> -", claimer),
        None => String::new(),
    };
    let channel = ticket
        .channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "kein Kanal".to_string());
    format!("#{} - {} -{} {}", ticket.id, ticket.status, moderator, channel)
}

/// Group board lines by topic area label, stable order.
pub fn group_by_area(tickets: &[TicketRow]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for ticket in tickets {
        let area = ticket
            .topic()
            .map(|t| t.area_label().to_string())
            .unwrap_or_else(|_| ticket.topic.clone());
        groups.entry(area).or_default().push(board_entry(ticket));
    }
    groups
}

/// Build the board embed from grouped entries.
pub fn board_embed(groups: &BTreeMap<String, Vec<String>>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("Ticket Status Updates")
        .colour(Colour::new(colors::BLUE));
    if groups.is_empty() {
        embed = embed.description("Keine Tickets");
    }
    for (area, entries) in groups {
        embed = embed.field(area, entries.join("\n"), false);
    }
    embed
}

/// Delete everything in the board channel, in pages of 100.
///
/// Bulk delete first; pages the platform rejects (single message, anything
/// older than two weeks) drain one message at a time.
async fn purge_channel(core: &Core, channel: ChannelId) -> EntropyResult<()> {
    loop {
        let page = core.api().messages_before(channel, None, 100).await?;
        if page.is_empty() {
            break;
        }

        let ids: Vec<_> = page.iter().map(|message| message.id).collect();
        let bulk = if ids.len() >= 2 {
            core.api().bulk_delete_messages(channel, &ids).await
        } else {
            Err(entropy_error::DiscordError::new(
                entropy_error::DiscordErrorKind::Api("batch too small".to_string()),
            ))
        };
        if bulk.is_err() {
            for id in ids {
                if let Err(e) = core.api().delete_message(channel, id).await {
                    warn!(error = %e, "Board purge failed to delete a message");
                }
            }
        }
    }
    Ok(())
}

/// Clear the board channel and post a fresh board header message.
#[instrument(skip(core))]
pub async fn ensure_board_message(core: &Core, channel: ChannelId) -> EntropyResult<MessageId> {
    purge_channel(core, channel).await?;
    let message = core
        .api()
        .send_message(channel, CreateMessage::new().content("# Ticket Status Updates"))
        .await?;
    if let Err(e) = core.api().pin_message(channel, message.id).await {
        warn!(error = %e, "Board message could not be pinned");
    }
    info!(message = %message.id, "Status board initialized");
    Ok(message.id)
}

/// One board refresh: reconcile vanished channels and redraw the embed.
#[instrument(skip(core))]
pub async fn run_update(
    core: &Core,
    channel: ChannelId,
    board_message: MessageId,
) -> EntropyResult<()> {
    let tickets = core.store().list_live().await?;

    let mut visible = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let Some(channel_id) = ticket.channel_id else {
            // row without a channel: provisioning died mid-flight, surface it
            visible.push(ticket);
            continue;
        };
        match core
            .api()
            .get_channel(ChannelId::new(channel_id as u64))
            .await
        {
            Ok(_) => visible.push(ticket),
            Err(e) => {
                debug!(error = %e, ticket_id = ticket.id, "Channel gone, marking ticket Deleted");
                core.store().mark_channel_gone(ticket.id).await?;
            }
        }
    }

    let groups = group_by_area(&visible);
    core.api()
        .edit_message(
            channel,
            board_message,
            EditMessage::new().embed(board_embed(&groups)),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ticket(id: i32, topic: &str, status: &str, claimer: Option<i64>) -> TicketRow {
        TicketRow {
            id,
            status: status.to_string(),
            topic: topic.to_string(),
            channel_id: Some(id as i64 * 100),
            creator_id: 1,
            creator_name: "Alice".to_string(),
            created_at: Utc::now(),
            claimer_id: claimer,
            claimer_name: claimer.map(|_| "Mod".to_string()),
            claimed_at: claimer.map(|_| Utc::now()),
            closer_id: None,
            closer_name: None,
            closed_at: None,
            deleter_id: None,
            deleter_name: None,
            deleted_at: None,
            field_one: None,
            field_two: None,
            field_three: None,
            field_four: None,
            field_five: None,
            transcript_path: None,
        }
    }

    #[test]
    fn entries_carry_state_and_channel_mention() {
        let entry = board_entry(&ticket(3, "ticket_support_kontakt", "Open", None));
        assert_eq!(entry, "#3 - Open - <#300>");
    }

    #[test]
    fn claimed_entries_mention_the_moderator() {
        let entry = board_entry(&ticket(4, "ticket_support_kontakt", "Claimed", Some(42)));
        assert!(entry.contains("Bearbeiter: <@42>"));
    }

    #[test]
    fn grouping_uses_area_labels() {
        let tickets = vec![
            ticket(1, "ticket_support_kontakt", "Open", None),
            ticket(2, "ticket_game_lol", "Claimed", Some(9)),
            ticket(3, "ticket_support_kontakt", "Closed", Some(9)),
        ];
        let groups = group_by_area(&tickets);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["Kontakt/Support"].len(), 2);
        assert_eq!(groups["League of Legends"].len(), 1);
    }

    #[test]
    fn empty_board_says_so() {
        let embed = board_embed(&BTreeMap::new());
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["description"], "Keine Tickets");
    }
}
