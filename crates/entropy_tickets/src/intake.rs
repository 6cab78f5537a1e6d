//! The intake pipeline: persistent ticket view → topic selector → modal →
//! submission.
//!
//! Selecting the community-teams entry expands into a second, game-specific
//! selector; every other entry leads straight to the topic's modal. The
//! submission handler defers its reply first — provisioning can take longer
//! than the platform's ack deadline.

use crate::context::Core;
use crate::model::Actor;
use crate::topic::{
    Topic, COMMUNITY_TEAMS_VALUE, GAME_SELECT_OPTIONS, TOPIC_SELECT_OPTIONS,
};
use crate::{panel, provision, survey};
use entropy_discord::{error_embed, info_embed, Priority};
use entropy_error::{
    DiscordError, DiscordErrorKind, EntropyResult, TicketError, TicketErrorKind,
};
use serenity::all::{
    ActionRowComponent, ButtonStyle, Colour, CommandInteraction, ComponentInteraction,
    ComponentInteractionDataKind, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal,
    CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, EditInteractionResponse,
    InputTextStyle, ModalInteraction,
};
use tracing::{info, instrument};

/// Custom id of the persistent "Create Ticket" button.
pub const CREATE_TICKET_BUTTON: &str = "ticket_create_ticket";
/// Custom id of the topic selector.
pub const TOPIC_SELECT: &str = "ticket_dropdown";
/// Custom id of the game selector.
pub const GAME_SELECT: &str = "ticket_game_dropdown";

/// Post the persistent ticket view (slash command, developer-gated).
#[instrument(skip(core, interaction))]
pub async fn handle_ticket_view(
    core: &Core,
    interaction: &CommandInteraction,
) -> EntropyResult<()> {
    let embed = CreateEmbed::new()
        .title("Ticket-System – Bewerbung & Support")
        .description("Willkommen beim Ticket-System von **Entropy Gaming**!")
        .colour(Colour::new(entropy_discord::colors::RED))
        .field(
            "Bewerbung",
            "Möchtest du ein Teil von Entropy Gaming werden? Bewirb dich jetzt und wähle den \
             Bereich aus, für den du dich bewerben möchtest. Teile uns im Ticket einige Infos zu \
             dir mit (Name, Alter, bisherige E-Sports-Erfahrung etc.).",
            false,
        )
        .field(
            "Support",
            "Hast du ein Problem oder benötigst Unterstützung vom Entropy-Management? Erstelle \
             einfach ein Ticket und wir kümmern uns zeitnah um dein Anliegen!",
            false,
        )
        .footer(CreateEmbedFooter::new("Entropy Gaming | Ticket System"));

    let components = vec![CreateActionRow::Buttons(vec![CreateButton::new(
        CREATE_TICKET_BUTTON,
    )
    .label("Create Ticket")
    .style(ButtonStyle::Primary)])];

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(components),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

fn select_options(entries: &[(&str, &str)]) -> Vec<CreateSelectMenuOption> {
    entries
        .iter()
        .map(|(label, value)| CreateSelectMenuOption::new(*label, *value))
        .collect()
}

/// Expand the "Create Ticket" button into the topic selector.
#[instrument(skip(core, interaction))]
pub async fn handle_create_ticket(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let menu = CreateSelectMenu::new(
        TOPIC_SELECT,
        CreateSelectMenuKind::String {
            options: select_options(TOPIC_SELECT_OPTIONS),
        },
    )
    .placeholder("Wähle einen Bereich...");

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content("Wähle einen Ticket-Bereich aus:")
                    .components(vec![CreateActionRow::SelectMenu(menu)])
                    .ephemeral(true),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

pub(crate) fn selected_value(interaction: &ComponentInteraction) -> EntropyResult<String> {
    match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().cloned().ok_or_else(|| {
                DiscordError::new(DiscordErrorKind::MalformedInteraction(
                    "select interaction without a value".to_string(),
                ))
                .into()
            })
        }
        _ => Err(DiscordError::new(DiscordErrorKind::MalformedInteraction(
            "expected a string select".to_string(),
        ))
        .into()),
    }
}

/// Topic selected: either expand into the game selector or open the modal.
#[instrument(skip(core, interaction))]
pub async fn handle_topic_select(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let value = selected_value(interaction)?;

    if value == COMMUNITY_TEAMS_VALUE {
        let menu = CreateSelectMenu::new(
            GAME_SELECT,
            CreateSelectMenuKind::String {
                options: select_options(GAME_SELECT_OPTIONS),
            },
        )
        .placeholder("Wähle ein Spiel...");

        interaction
            .create_response(
                core.api().http(),
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("Wähle das Spiel aus, für das du dich bewerben möchtest:")
                        .components(vec![CreateActionRow::SelectMenu(menu)])
                        .ephemeral(true),
                ),
            )
            .await
            .map_err(DiscordError::from)?;
        return Ok(());
    }

    let topic = Topic::from_id(&value)
        .ok_or_else(|| TicketError::new(TicketErrorKind::UnknownTopic(value.clone())))?;
    open_modal(core, interaction, topic).await
}

/// Game selected: open the game topic's modal.
#[instrument(skip(core, interaction))]
pub async fn handle_game_select(
    core: &Core,
    interaction: &ComponentInteraction,
) -> EntropyResult<()> {
    let value = selected_value(interaction)?;
    let topic = Topic::from_id(&value)
        .ok_or_else(|| TicketError::new(TicketErrorKind::UnknownTopic(value.clone())))?;
    open_modal(core, interaction, topic).await
}

/// Field custom ids, positional.
const FIELD_IDS: [&str; 5] = [
    "field_one",
    "field_two",
    "field_three",
    "field_four",
    "field_five",
];

/// Compose a topic's modal from its field specification.
pub fn build_modal(topic: Topic) -> CreateModal {
    let spec = topic.spec();
    let rows = spec
        .fields
        .iter()
        .zip(FIELD_IDS)
        .map(|(field, custom_id)| {
            let style = match field.style {
                crate::topic::FieldStyle::Short => InputTextStyle::Short,
                crate::topic::FieldStyle::Paragraph => InputTextStyle::Paragraph,
            };
            let mut input =
                CreateInputText::new(style, field.label, custom_id).required(field.required);
            if let Some(max) = field.max_length {
                input = input.max_length(max);
            }
            CreateActionRow::InputText(input)
        })
        .collect();

    CreateModal::new(spec.id, spec.modal_title).components(rows)
}

async fn open_modal(
    core: &Core,
    interaction: &ComponentInteraction,
    topic: Topic,
) -> EntropyResult<()> {
    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Modal(build_modal(topic)),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

/// Pull the submitted values out of a modal, in field order.
///
/// Empty inputs become `None` so optional fields stay unset in the store.
pub fn extract_fields(interaction: &ModalInteraction) -> [Option<String>; 5] {
    let mut fields: [Option<String>; 5] = Default::default();
    let mut index = 0;
    for row in &interaction.data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                if index < fields.len() {
                    fields[index] = input
                        .value
                        .clone()
                        .filter(|value| !value.is_empty());
                    index += 1;
                }
            }
        }
    }
    fields
}

/// Modal submitted: create the ticket, provision its channel, wire the
/// moderation surface and point the requester at the result.
#[instrument(skip(core, interaction), fields(custom_id = %interaction.data.custom_id))]
pub async fn handle_submit(core: &Core, interaction: &ModalInteraction) -> EntropyResult<()> {
    // ack within the platform deadline; provisioning takes longer
    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await
        .map_err(DiscordError::from)?;

    match submit_inner(core, interaction).await {
        Ok(channel_id) => {
            interaction
                .edit_response(
                    core.api().http(),
                    EditInteractionResponse::new().embed(info_embed(
                        "Ticket erstellt",
                        format!(
                            "Ein Moderator wird sich in Kürze um dein Anliegen kümmern.\n\n<#{}>",
                            channel_id
                        ),
                    )),
                )
                .await
                .map_err(DiscordError::from)?;

            survey::maybe_send_prompt(core, &interaction.user).await;
            Ok(())
        }
        Err(e) => {
            // the requester sees a short reason; diagnostics go to the admins
            let _ = interaction
                .edit_response(
                    core.api().http(),
                    EditInteractionResponse::new().embed(error_embed(
                        "Ticket konnte nicht erstellt werden",
                        "Bitte versuche es später erneut.",
                    )),
                )
                .await;
            core.notifier()
                .log_and_notify(
                    Priority::High,
                    "Error",
                    "intake.rs",
                    true,
                    Some(&e.to_string()),
                    "Ticket submission failed",
                )
                .await;
            Err(e)
        }
    }
}

async fn submit_inner(core: &Core, interaction: &ModalInteraction) -> EntropyResult<u64> {
    let topic = Topic::from_id(&interaction.data.custom_id).ok_or_else(|| {
        TicketError::new(TicketErrorKind::UnknownTopic(
            interaction.data.custom_id.clone(),
        ))
    })?;

    let fields = extract_fields(interaction);
    if fields.iter().all(Option::is_none) {
        return Err(TicketError::new(TicketErrorKind::EmptySubmission).into());
    }

    let requester = Actor::from(&interaction.user);
    let ticket_id = core.store().create(topic, &requester, fields).await?;

    let channel = provision::provision(core, ticket_id, topic, &requester).await?;
    core.store()
        .attach_channel(ticket_id, channel.id.get() as i64)
        .await?;

    let ticket = core.store().read(ticket_id).await?;
    provision::post_summary(core, channel.id, &ticket).await?;
    panel::send_panel(core, channel.id, ticket_id, &requester.name).await?;

    info!(ticket_id, channel = %channel.id, "Ticket intake completed");
    Ok(channel.id.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_topic_builds_a_modal_with_one_row_per_field() {
        for topic in Topic::iter() {
            let modal = build_modal(topic);
            let json = serde_json::to_value(&modal).unwrap();
            let rows = json["components"].as_array().unwrap();
            assert_eq!(rows.len(), topic.spec().fields.len(), "{:?}", topic);
            assert_eq!(json["custom_id"], topic.id());
        }
    }

    #[test]
    fn modal_fields_carry_labels_and_required_flags() {
        let modal = build_modal(Topic::Support);
        let json = serde_json::to_value(&modal).unwrap();
        let first = &json["components"][0]["components"][0];
        assert_eq!(first["label"], "Vorname");
        assert_eq!(first["required"], true);
        let second = &json["components"][1]["components"][0];
        assert_eq!(second["label"], "Was ist dein Anliegen?");
        assert_eq!(second["max_length"], 750);
    }
}
