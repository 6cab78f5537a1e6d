//! Per-ticket channel provisioning and access control.
//!
//! The channel name encodes `<id>-<state>-<participants>` and is the only
//! place the ticket id lives on the platform side. The requester's
//! per-member permission override is the single source of truth for "this
//! requester may see this channel"; close/reopen flip it.

use crate::context::Core;
use crate::model::{Actor, TicketRow};
use crate::state::TicketState;
use crate::topic::Topic;
use entropy_discord::colors;
use entropy_error::{DiscordError, DiscordErrorKind, EntropyResult};
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage, GuildChannel, UserId};
use tracing::{info, instrument};

/// Build the channel name for a ticket in a given state.
pub fn channel_name(
    ticket_id: i32,
    state: TicketState,
    creator: &str,
    moderator: Option<&str>,
) -> String {
    match moderator {
        Some(moderator) => format!(
            "{}-{}-{}-{}",
            ticket_id,
            state.name_fragment(),
            creator,
            moderator
        ),
        None => format!("{}-{}-{}", ticket_id, state.name_fragment(), creator),
    }
}

/// Build the channel topic string for a ticket.
///
/// Grows as the lifecycle advances: claimer, closer and reopener mentions are
/// appended once the corresponding actor exists.
pub fn channel_topic(
    ticket_id: i32,
    status_label: &str,
    creator_id: i64,
    claimer_id: Option<i64>,
    closer_id: Option<i64>,
    reopener_id: Option<i64>,
) -> String {
    let mut topic = format!(
        "Ticket #{} - Status: {} - Ticket von <@{}>",
        ticket_id, status_label, creator_id
    );
    if let Some(claimer) = claimer_id {
        topic.push_str(&format!(" - Ticket Bearbeiter <@{}>", claimer));
    }
    if let Some(closer) = closer_id {
        topic.push_str(&format!(" - Ticket geschlossen von <@{}>", closer));
    }
    if let Some(reopener) = reopener_id {
        topic.push_str(&format!(" - Ticket erneut geöffnet von <@{}>", reopener));
    }
    topic
}

/// Recover the ticket id from a channel name of the form `<id>-<state>-…`.
pub fn ticket_id_from_channel_name(name: &str) -> Result<i32, DiscordError> {
    name.split('-')
        .next()
        .and_then(|part| part.parse::<i32>().ok())
        .ok_or_else(|| DiscordError::new(DiscordErrorKind::ChannelName(name.to_string())))
}

/// Resolve the ticket a component interaction happened in.
pub async fn ticket_id_from_channel(core: &Core, channel: ChannelId) -> EntropyResult<i32> {
    let name = core.api().channel_name(channel).await?;
    Ok(ticket_id_from_channel_name(&name)?)
}

/// Create the ticket channel under the topic's category and grant the
/// requester the full text bundle on it.
#[instrument(skip(core, requester), fields(ticket_id, topic = topic.id()))]
pub async fn provision(
    core: &Core,
    ticket_id: i32,
    topic: Topic,
    requester: &Actor,
) -> EntropyResult<GuildChannel> {
    let category = ChannelId::new(core.constants().get_id(topic.spec().category_key)?);
    let name = channel_name(ticket_id, TicketState::Open, &requester.name, None);
    let topic_string = channel_topic(
        ticket_id,
        TicketState::Open.label(),
        requester.id,
        None,
        None,
        None,
    );

    let channel = core
        .api()
        .create_text_channel(core.guild_id(), category, &name, &topic_string)
        .await?;

    core.api()
        .grant_member_text(channel.id, UserId::new(requester.id as u64))
        .await?;

    info!(ticket_id, channel = %channel.id, "Ticket channel provisioned");
    Ok(channel)
}

/// Post and pin the submission summary: one embed field per topic label.
#[instrument(skip(core, ticket), fields(ticket_id = ticket.id))]
pub async fn post_summary(core: &Core, channel: ChannelId, ticket: &TicketRow) -> EntropyResult<()> {
    let topic = ticket.topic()?;
    let spec = topic.spec();

    let mut embed = CreateEmbed::new()
        .title(spec.area_label)
        .description("Details des Tickets:")
        .colour(Colour::new(colors::RED));
    for (field_spec, value) in spec.fields.iter().zip(ticket.fields()) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            embed = embed.field(field_spec.label, value, false);
        }
    }

    let mention_id = core.constants().get_id(spec.role_key)?;
    let mention = if spec.mention_user {
        format!("<@{}>", mention_id)
    } else {
        format!("<@&{}>", mention_id)
    };

    let message = core
        .api()
        .send_message(channel, CreateMessage::new().content(mention).embed(embed))
        .await?;
    core.api().pin_message(channel, message.id).await?;
    Ok(())
}

/// Replace the requester's override with a deny (close path).
pub async fn revoke_requester_access(
    core: &Core,
    channel: ChannelId,
    requester_id: i64,
) -> EntropyResult<()> {
    core.api()
        .deny_member_text(channel, UserId::new(requester_id as u64))
        .await?;
    Ok(())
}

/// Re-grant the requester's override (reopen path).
pub async fn restore_requester_access(
    core: &Core,
    channel: ChannelId,
    requester_id: i64,
) -> EntropyResult<()> {
    core.api()
        .grant_member_text(channel, UserId::new(requester_id as u64))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_channel_name_has_no_moderator() {
        assert_eq!(
            channel_name(1, TicketState::Open, "Alice", None),
            "1-open-Alice"
        );
    }

    #[test]
    fn claimed_channel_name_carries_both_names() {
        assert_eq!(
            channel_name(7, TicketState::Claimed, "Alice", Some("Mod")),
            "7-claimed-Alice-Mod"
        );
    }

    #[test]
    fn ticket_id_round_trips_through_the_name() {
        let name = channel_name(42, TicketState::Closed, "Alice", Some("Mod"));
        assert_eq!(ticket_id_from_channel_name(&name).unwrap(), 42);
    }

    #[test]
    fn garbage_names_are_rejected() {
        assert!(ticket_id_from_channel_name("general").is_err());
        assert!(ticket_id_from_channel_name("").is_err());
    }

    #[test]
    fn topic_string_grows_with_the_lifecycle() {
        let open = channel_topic(3, "Open", 10, None, None, None);
        assert_eq!(open, "Ticket #3 - Status: Open - Ticket von <@10>");

        let claimed = channel_topic(3, "Claimed", 10, Some(20), None, None);
        assert!(claimed.ends_with("Ticket Bearbeiter <@20>"));

        let reopened = channel_topic(3, "Reopen", 10, Some(20), Some(30), Some(40));
        assert!(reopened.contains("Ticket geschlossen von <@30>"));
        assert!(reopened.ends_with("Ticket erneut geöffnet von <@40>"));
    }
}
