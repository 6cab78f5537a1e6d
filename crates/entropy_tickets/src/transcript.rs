//! Transcript capture and the destructive delete path.
//!
//! Delete is a two-step confirm. Confirmation paginates the channel's full
//! history (pages of 100, newest first, stored as retrieved), downloads every
//! attachment best-effort into a per-ticket directory, serializes the result
//! as indented JSON, and only then transitions the ticket, posts the audit
//! summary and destroys the channel. Pagination or write failures abort the
//! capture and leave the ticket in its pre-confirm state.

use crate::context::Core;
use crate::model::{Actor, TicketRow};
use crate::provision;
use crate::state::TicketEvent;
use entropy_discord::{colors, error_embed, Priority};
use entropy_error::{
    DiscordError, EntropyError, EntropyErrorKind, EntropyResult, TranscriptError,
};
use serde::{Deserialize, Serialize};
use serenity::all::{
    ButtonStyle, ChannelId, Colour, ComponentInteraction, CreateActionRow, CreateButton,
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
    MessageId,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Custom id of the delete confirmation button.
pub const CONFIRM_DELETE: &str = "ticket_confirm_delete_ticket";
/// Custom id of the delete cancel button.
pub const CANCEL_DELETE: &str = "ticket_cancel_delete_ticket";

/// History page size; the platform maximum.
const PAGE_SIZE: u8 = 100;

/// Grace period between the audit summary and channel destruction.
const DESTRUCTION_DELAY: Duration = Duration::from_secs(5);

/// One attachment of a captured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// Platform attachment id
    pub id: String,
    /// Original filename
    pub filename: String,
    /// Source URL on the platform CDN
    pub url: String,
    /// Local path; empty when the download failed
    #[serde(rename = "localPath", default, skip_serializing_if = "String::is_empty")]
    pub local_path: String,
}

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Sender platform id
    #[serde(rename = "userID")]
    pub user_id: String,
    /// Sender display name
    pub username: String,
    /// Message text
    pub message: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    /// Attachment descriptors, input order preserved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRecord>,
    /// Whether the sender is a bot account (not serialized)
    #[serde(skip)]
    pub bot: bool,
}

/// Download one attachment into the ticket's attachment directory.
async fn download_attachment(
    client: &reqwest::Client,
    url: &str,
    filename: &str,
    dir: &Path,
) -> Result<PathBuf, TranscriptError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    let path = dir.join(filename);
    tokio::fs::write(&path, &bytes).await?;
    Ok(path)
}

/// Paginate the channel's history into records, downloading attachments.
///
/// Attachment failures are per-item best-effort (descriptor kept, local path
/// empty); a pagination failure aborts the whole capture.
#[instrument(skip(core), fields(channel = %channel))]
pub async fn collect_transcript(
    core: &Core,
    channel: ChannelId,
    attachment_dir: &Path,
) -> EntropyResult<Vec<MessageRecord>> {
    tokio::fs::create_dir_all(attachment_dir)
        .await
        .map_err(TranscriptError::from)?;

    let mut records = Vec::new();
    let mut before: Option<MessageId> = None;

    loop {
        let page = core.api().messages_before(channel, before, PAGE_SIZE).await?;
        let Some(last) = page.last() else {
            break;
        };
        before = Some(last.id);

        for message in &page {
            let mut attachments = Vec::with_capacity(message.attachments.len());
            for attachment in &message.attachments {
                let local_path = match download_attachment(
                    core.downloader(),
                    &attachment.url,
                    &attachment.filename,
                    attachment_dir,
                )
                .await
                {
                    Ok(path) => path.to_string_lossy().into_owned(),
                    Err(e) => {
                        warn!(error = %e, url = %attachment.url, "Attachment download failed");
                        String::new()
                    }
                };
                attachments.push(AttachmentRecord {
                    id: attachment.id.to_string(),
                    filename: attachment.filename.clone(),
                    url: attachment.url.clone(),
                    local_path,
                });
            }

            records.push(MessageRecord {
                user_id: message.author.id.to_string(),
                username: message.author.name.clone(),
                message: message.content.clone(),
                timestamp: message.timestamp.to_string(),
                attachments,
                bot: message.author.bot,
            });
        }
    }

    Ok(records)
}

/// Serialize the transcript as indented JSON.
///
/// The file only appears once serialization of the full capture succeeded,
/// so partial transcripts are never produced.
pub async fn write_transcript(
    path: &Path,
    records: &[MessageRecord],
) -> Result<(), TranscriptError> {
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Per-author message counts, bots excluded, heaviest participants first.
pub fn participant_counts(records: &[MessageRecord]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| !r.bot) {
        *counts.entry(record.user_id.as_str()).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn chronology_field(embed: CreateEmbed, label: &str, actor: Option<i64>, at: Option<i64>) -> CreateEmbed {
    match (actor, at) {
        (Some(actor), Some(at)) => embed.field(
            label,
            format!("<@{}> <t:{}:R> | <t:{}>", actor, at, at),
            false,
        ),
        _ => embed,
    }
}

/// Build the audit summary embed: conditional chronology plus participants.
pub fn summary_embed(ticket: &TicketRow, records: &[MessageRecord]) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Ticket #{}", ticket.id))
        .colour(Colour::new(colors::RED));

    embed = chronology_field(
        embed,
        "Created by",
        Some(ticket.creator_id),
        Some(ticket.created_at.timestamp()),
    );
    embed = chronology_field(
        embed,
        "Claimed by",
        ticket.claimer_id,
        ticket.claimed_at.map(|t| t.timestamp()),
    );
    embed = chronology_field(
        embed,
        "Closed by",
        ticket.closer_id,
        ticket.closed_at.map(|t| t.timestamp()),
    );
    embed = chronology_field(
        embed,
        "Deleted by",
        ticket.deleter_id,
        ticket.deleted_at.map(|t| t.timestamp()),
    );

    let participants = participant_counts(records);
    let value = if participants.is_empty() {
        "Keine Nachrichten".to_string()
    } else {
        participants
            .iter()
            .map(|(id, count)| format!("{} messages by <@{}>", count, id))
            .collect::<Vec<_>>()
            .join("\n")
    };
    embed.field("Participants", value, false)
}

/// Delete button: ask for confirmation first.
#[instrument(skip(core, interaction), fields(channel = %interaction.channel_id))]
pub async fn handle_delete_button(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let components = vec![CreateActionRow::Buttons(vec![
        CreateButton::new(CONFIRM_DELETE)
            .label("Bestätigen")
            .style(ButtonStyle::Danger),
        CreateButton::new(CANCEL_DELETE)
            .label("Abbrechen")
            .style(ButtonStyle::Secondary),
    ])];

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(error_embed(
                        "Ticket Löschen?",
                        "Bist du sicher, dass du das Ticket löschen möchtest?",
                    ))
                    .components(components)
                    .ephemeral(true),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

/// Cancel: drop the confirmation buttons and walk away.
#[instrument(skip(core, interaction))]
pub async fn handle_cancel_delete(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content("Löschen abgebrochen")
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

fn is_invalid_transition(err: &EntropyError) -> bool {
    matches!(err.kind(), EntropyErrorKind::Ticket(e) if matches!(
        e.kind,
        entropy_error::TicketErrorKind::InvalidTransition { .. }
    ))
}

/// Confirm: capture, persist, audit, destroy.
#[instrument(skip(core, interaction), fields(channel = %interaction.channel_id))]
pub async fn handle_confirm_delete(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(error_embed(
                        "Löschung Bestätigt",
                        "Transkript wird erstellt. Ticket wird in Kürze gelöscht.",
                    ))
                    .components(vec![]),
            ),
        )
        .await
        .map_err(DiscordError::from)?;

    let ticket_id = provision::ticket_id_from_channel(core, interaction.channel_id).await?;
    let ticket = core.store().read(ticket_id).await?;
    let actor = Actor::from(&interaction.user);

    let attachment_dir = core
        .transcript_dir()
        .join("attachments")
        .join(ticket_id.to_string());

    // any failure up to the file write leaves the ticket in its pre-confirm
    // state; the capture can simply be retried
    let records = match collect_transcript(core, interaction.channel_id, &attachment_dir).await {
        Ok(records) => records,
        Err(e) => {
            core.notifier()
                .log_and_notify(
                    Priority::High,
                    "Error",
                    "transcript.rs",
                    true,
                    Some(&e.to_string()),
                    &format!("Transcript capture aborted for ticket #{}", ticket_id),
                )
                .await;
            return Err(e);
        }
    };

    let transcript_path = core
        .transcript_dir()
        .join(format!("{}_{}.json", ticket_id, ticket.creator_name));
    if let Err(e) = write_transcript(&transcript_path, &records).await {
        core.notifier()
            .log_and_notify(
                Priority::Critical,
                "Error",
                "transcript.rs",
                true,
                Some(&e.to_string()),
                &format!("Transcript write aborted deletion of ticket #{}", ticket_id),
            )
            .await;
        return Err(e.into());
    }

    let ticket = match core
        .store()
        .transition(ticket_id, TicketEvent::Delete, &actor)
        .await
    {
        Ok(ticket) => ticket,
        // a concurrent confirm already deleted the ticket; exit cleanly
        Err(e) if is_invalid_transition(&e) => {
            info!(ticket_id, "Ticket already deleted by a concurrent confirm");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    post_audit_summary(core, &ticket, &records).await?;

    core.store()
        .record_transcript(ticket_id, &transcript_path.to_string_lossy())
        .await?;

    // let the summary land and late audit consumers finish
    tokio::time::sleep(DESTRUCTION_DELAY).await;
    core.api().delete_channel(interaction.channel_id).await?;

    info!(ticket_id, deleter = actor.id, "Ticket deleted and channel destroyed");
    Ok(())
}

async fn post_audit_summary(
    core: &Core,
    ticket: &TicketRow,
    records: &[MessageRecord],
) -> EntropyResult<()> {
    let audit_channel = ChannelId::new(core.constants().get_id("CHANNEL_TICKET_TRANSCRIPTS")?);
    let viewer_base = core.constants().get("TRANSCRIPT_VIEWER_BASE_URL")?;
    let viewer_url = format!(
        "{}/ticket/{}",
        viewer_base.trim_end_matches('/'),
        ticket.id
    );

    core.api()
        .send_message(
            audit_channel,
            CreateMessage::new()
                .embed(summary_embed(ticket, records))
                .components(vec![CreateActionRow::Buttons(vec![
                    CreateButton::new_link(viewer_url).label("View Transcript"),
                ])]),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: &str, bot: bool) -> MessageRecord {
        MessageRecord {
            user_id: user_id.to_string(),
            username: format!("user{}", user_id),
            message: "hi".to_string(),
            timestamp: "2025-06-10T12:00:00Z".to_string(),
            attachments: vec![],
            bot,
        }
    }

    #[test]
    fn participants_exclude_bots_and_sort_by_volume() {
        let records = vec![
            record("1", false),
            record("2", false),
            record("2", false),
            record("9", true),
            record("9", true),
            record("9", true),
        ];
        let counts = participant_counts(&records);
        assert_eq!(
            counts,
            vec![("2".to_string(), 2), ("1".to_string(), 1)]
        );
    }

    #[test]
    fn serialized_records_match_the_transcript_shape() {
        let mut rec = record("42", false);
        rec.attachments.push(AttachmentRecord {
            id: "7".to_string(),
            filename: "proof.png".to_string(),
            url: "https://cdn.example/proof.png".to_string(),
            local_path: String::new(),
        });

        let json = serde_json::to_value(&[rec]).unwrap();
        assert_eq!(json[0]["userID"], "42");
        assert_eq!(json[0]["attachments"][0]["filename"], "proof.png");
        // failed downloads keep the descriptor but omit the local path
        assert!(json[0]["attachments"][0].get("localPath").is_none());
        // the bot flag is capture-internal
        assert!(json[0].get("bot").is_none());
    }

    #[test]
    fn attachment_order_is_preserved() {
        let mut rec = record("1", false);
        for i in 0..4 {
            rec.attachments.push(AttachmentRecord {
                id: i.to_string(),
                filename: format!("file{}.txt", i),
                url: format!("https://cdn.example/file{}.txt", i),
                local_path: format!("/tmp/file{}.txt", i),
            });
        }
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: MessageRecord = serde_json::from_str(&json).unwrap();
        let ids: Vec<&str> = parsed.attachments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3"]);
    }

    #[tokio::test]
    async fn transcript_file_is_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1_Alice.json");
        let records = vec![record("1", false), record("2", false)];

        write_transcript(&path, &records).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  "));
        let parsed: Vec<MessageRecord> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn summary_embed_skips_absent_chronology() {
        let ticket = TicketRow {
            id: 5,
            status: "Deleted".to_string(),
            topic: "ticket_support_kontakt".to_string(),
            channel_id: Some(1),
            creator_id: 10,
            creator_name: "Alice".to_string(),
            created_at: chrono::Utc::now(),
            claimer_id: None,
            claimer_name: None,
            claimed_at: None,
            closer_id: None,
            closer_name: None,
            closed_at: None,
            deleter_id: Some(20),
            deleter_name: Some("Mod".to_string()),
            deleted_at: Some(chrono::Utc::now()),
            field_one: None,
            field_two: None,
            field_three: None,
            field_four: None,
            field_five: None,
            transcript_path: None,
        };

        let embed = summary_embed(&ticket, &[]);
        let json = serde_json::to_value(&embed).unwrap();
        let names: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Created by", "Deleted by", "Participants"]);
    }
}
