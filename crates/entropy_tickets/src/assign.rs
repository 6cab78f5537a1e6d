//! Assignment flow: hand a case to an eligible moderator.
//!
//! The selector is built from the staff-member mapping for the ticket's
//! topic (refreshed by the staff reconciler), capped at the platform's 25
//! select options. "No eligible staff" is a notice, not an error.

use crate::context::Core;
use crate::intake::selected_value;
use crate::model::Actor;
use crate::provision::{self, channel_name, channel_topic};
use crate::state::{TicketEvent, TicketState};
use crate::{panel, StaffMemberRow};
use entropy_error::{DiscordError, DiscordErrorKind, EntropyResult};
use serenity::all::{
    ComponentInteraction, CreateActionRow, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, UserId,
};
use tracing::{info, instrument, warn};

/// Prefix of the assignment selector custom id; the ticket id follows.
pub const ASSIGN_SELECT_PREFIX: &str = "ticket_assign_ticket_dropdown_";

/// Discord caps string selects at 25 options; excess staff is silently cut.
const MAX_SELECT_OPTIONS: usize = 25;

/// Build the selector options from the staff mapping, capped at 25.
pub fn staff_options(staff: &[StaffMemberRow]) -> Vec<(String, String)> {
    staff
        .iter()
        .take(MAX_SELECT_OPTIONS)
        .map(|member| (member.username.clone(), member.discord_id.to_string()))
        .collect()
}

/// Assign button: offer the topic's eligible moderators.
#[instrument(skip(core, interaction), fields(channel = %interaction.channel_id))]
pub async fn handle_assign_button(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let ticket_id = provision::ticket_id_from_channel(core, interaction.channel_id).await?;
    let ticket = core.store().read(ticket_id).await?;
    let staff = core.store().staff_for_topic(ticket.topic()?).await?;

    if staff.is_empty() {
        interaction
            .create_response(
                core.api().http(),
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("Für diesen Bereich ist aktuell kein Staff eingetragen.")
                        .ephemeral(true),
                ),
            )
            .await
            .map_err(DiscordError::from)?;
        return Ok(());
    }

    let options = staff_options(&staff)
        .into_iter()
        .map(|(label, value)| CreateSelectMenuOption::new(label, value))
        .collect();
    let menu = CreateSelectMenu::new(
        format!("{}{}", ASSIGN_SELECT_PREFIX, ticket_id),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Wähle einen Moderator...");

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Wem soll Ticket #{} zugewiesen werden?", ticket_id))
                    .components(vec![CreateActionRow::SelectMenu(menu)])
                    .ephemeral(true),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

/// Moderator chosen: transition the ticket and update every surface.
#[instrument(skip(core, interaction), fields(custom_id = %interaction.data.custom_id))]
pub async fn handle_assign_select(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let ticket_id: i32 = interaction
        .data
        .custom_id
        .strip_prefix(ASSIGN_SELECT_PREFIX)
        .and_then(|suffix| suffix.parse().ok())
        .ok_or_else(|| {
            DiscordError::new(DiscordErrorKind::MalformedInteraction(
                interaction.data.custom_id.clone(),
            ))
        })?;

    let assignee_id: i64 = selected_value(interaction)?.parse().map_err(|_| {
        DiscordError::new(DiscordErrorKind::MalformedInteraction(
            "assignment selector carried a non-numeric user id".to_string(),
        ))
    })?;

    let assignee_name = match core.api().user(UserId::new(assignee_id as u64)).await {
        Ok(user) => user.name,
        Err(e) => {
            warn!(error = %e, assignee_id, "Assignee lookup failed, using placeholder");
            "Unbekannt".to_string()
        }
    };
    let assignee = Actor {
        id: assignee_id,
        name: assignee_name,
    };

    let ticket = match core
        .store()
        .transition(ticket_id, TicketEvent::Assign, &assignee)
        .await
    {
        Ok(ticket) => ticket,
        Err(e) => {
            // ticket left the assignable states while the selector was open
            let _ = interaction
                .create_response(
                    core.api().http(),
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .content(format!(
                                "Ticket #{} kann nicht mehr zugewiesen werden.",
                                ticket_id
                            ))
                            .components(vec![]),
                    ),
                )
                .await;
            return Err(e);
        }
    };

    let channel = serenity::all::ChannelId::new(ticket.channel()? as u64);
    core.api()
        .edit_channel(
            channel,
            &channel_name(
                ticket_id,
                TicketState::Claimed,
                &ticket.creator_name,
                Some(&assignee.name),
            ),
            &channel_topic(
                ticket_id,
                TicketState::Claimed.label(),
                ticket.creator_id,
                Some(assignee.id),
                None,
                None,
            ),
        )
        .await?;

    core.api()
        .send_message(
            channel,
            CreateMessage::new().content(format!(
                "Das Ticket #{} wurde von <@{}> geclaimt.",
                ticket_id, assignee.id
            )),
        )
        .await?;

    // the selector is not the panel message, so redraw the panel separately
    panel::redraw(core, channel, &ticket).await?;

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content(format!("Das Ticket wurde <@{}> zugewiesen.", assignee.id))
                    .components(vec![]),
            ),
        )
        .await
        .map_err(DiscordError::from)?;

    info!(ticket_id, assignee = assignee.id, "Ticket assigned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(n: usize) -> Vec<StaffMemberRow> {
        (0..n)
            .map(|i| StaffMemberRow {
                id: i as i32,
                topic: "ticket_support_kontakt".to_string(),
                discord_id: 1000 + i as i64,
                username: format!("mod{}", i),
            })
            .collect()
    }

    #[test]
    fn options_mirror_the_mapping() {
        let options = staff_options(&staff(3));
        assert_eq!(options.len(), 3);
        assert_eq!(options[0], ("mod0".to_string(), "1000".to_string()));
    }

    #[test]
    fn excess_staff_is_silently_truncated() {
        let options = staff_options(&staff(40));
        assert_eq!(options.len(), 25);
    }

    #[test]
    fn empty_mapping_yields_no_options() {
        assert!(staff_options(&[]).is_empty());
    }
}
