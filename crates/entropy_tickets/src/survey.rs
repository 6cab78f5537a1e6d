//! The after-ticket survey: a once-per-requester DM asking how they found
//! the organization.
//!
//! Existence of any survey_answers row suppresses the prompt forever, so a
//! requester sees it at most once no matter how many tickets they open.

use crate::context::Core;
use crate::intake::selected_value;
use entropy_discord::{info_embed, Priority};
use entropy_error::{DiscordError, EntropyResult};
use serenity::all::{
    ActionRowComponent, ComponentInteraction, CreateActionRow, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, CreateModal,
    CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, InputTextStyle,
    ModalInteraction, User,
};
use tracing::{info, instrument, warn};

/// Custom id of the survey dropdown delivered via DM.
pub const SURVEY_DROPDOWN: &str = "ticket_after_survey_dropdown";
/// Custom id of the free-text modal behind the "Sonstige" entry.
pub const SURVEY_MODAL: &str = "ticket_after_survey_modal";
/// Custom id of the free-text input inside the modal.
pub const SURVEY_MODAL_INPUT: &str = "ticket_after_custom_answer";

/// Canned answers: (label, stored value).
pub const SURVEY_OPTIONS: &[(&str, &str)] = &[
    ("Discord", "discord"),
    ("Gamertransfer", "gamertransfer"),
    ("Social Media", "social_media"),
    ("Empfehlung von Freunden", "friends"),
    ("Sonstige", "other"),
];

/// Fallback stored when the free-text answer comes back empty.
pub const FALLBACK_ANSWER: &str = "other";

/// Send the survey DM unless the requester already answered once.
///
/// Never fails the caller: closed DMs are informational, anything else
/// notifies the admins.
#[instrument(skip(core, user), fields(user = %user.id))]
pub async fn maybe_send_prompt(core: &Core, user: &User) {
    let user_id = user.id.get() as i64;
    match core.store().has_survey_answer(user_id).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => {
            warn!(error = %e, "Survey idempotence check failed, skipping prompt");
            return;
        }
    }

    let options = SURVEY_OPTIONS
        .iter()
        .map(|(label, value)| CreateSelectMenuOption::new(*label, *value))
        .collect();
    let menu = CreateSelectMenu::new(SURVEY_DROPDOWN, CreateSelectMenuKind::String { options })
        .placeholder("Woher kennst du uns?");

    let message = CreateMessage::new()
        .embed(info_embed(
            "Kurze Umfrage",
            "Bitte teile uns kurz mit, woher du uns kennst. Dies hilft uns dabei, unsere \
             Reichweite besser zu verstehen.",
        ))
        .components(vec![CreateActionRow::SelectMenu(menu)]);

    match core.api().send_dm(user.id, message).await {
        Ok(_) => info!("Survey prompt delivered"),
        Err(e) if e.is_dms_closed() => {
            info!("Survey prompt skipped, DMs are closed");
        }
        Err(e) => {
            core.notifier()
                .log_and_notify(
                    Priority::Medium,
                    "Error",
                    "survey.rs",
                    true,
                    Some(&e.to_string()),
                    "Survey DM delivery failed",
                )
                .await;
        }
    }
}

async fn store_answer(core: &Core, user: &User, answer: String) -> EntropyResult<()> {
    core.store()
        .insert_survey_answer(user.id.get() as i64, Some(user.name.clone()), answer)
        .await
}

async fn thank(core: &Core, interaction: &ComponentInteraction) -> EntropyResult<()> {
    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content("Danke für deine Antwort!")
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

/// Dropdown answered: store a canned value, or open the free-text modal.
#[instrument(skip(core, interaction))]
pub async fn handle_dropdown(core: &Core, interaction: &ComponentInteraction) -> EntropyResult<()> {
    let selected = selected_value(interaction)?;

    if selected == FALLBACK_ANSWER {
        let input = CreateInputText::new(
            InputTextStyle::Short,
            "Bitte gib hier deine Antwort ein",
            SURVEY_MODAL_INPUT,
        )
        .required(true);
        interaction
            .create_response(
                core.api().http(),
                CreateInteractionResponse::Modal(
                    CreateModal::new(SURVEY_MODAL, "Sonstige Antwort")
                        .components(vec![CreateActionRow::InputText(input)]),
                ),
            )
            .await
            .map_err(DiscordError::from)?;
        return Ok(());
    }

    store_answer(core, &interaction.user, selected).await?;
    thank(core, interaction).await
}

/// Free-text modal submitted: store the text, falling back to "other".
#[instrument(skip(core, interaction))]
pub async fn handle_modal(core: &Core, interaction: &ModalInteraction) -> EntropyResult<()> {
    let answer = extract_answer(interaction);
    store_answer(core, &interaction.user, answer).await?;

    interaction
        .create_response(
            core.api().http(),
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content("Danke für deine Antwort!")
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await
        .map_err(DiscordError::from)?;
    Ok(())
}

/// Pull the free-text answer out of the modal, empty input becomes "other".
pub fn extract_answer(interaction: &ModalInteraction) -> String {
    interaction
        .data
        .components
        .iter()
        .flat_map(|row| &row.components)
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == SURVEY_MODAL_INPUT => {
                input.value.clone()
            }
            _ => None,
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_options_cover_the_five_sources() {
        let values: Vec<&str> = SURVEY_OPTIONS.iter().map(|(_, v)| *v).collect();
        assert_eq!(
            values,
            vec!["discord", "gamertransfer", "social_media", "friends", "other"]
        );
    }

    #[test]
    fn the_escape_hatch_is_the_last_option() {
        assert_eq!(SURVEY_OPTIONS.last().unwrap().1, FALLBACK_ANSWER);
    }
}
