//! Interaction dispatch.
//!
//! One table from custom id to handler, with permission gating where the
//! state machine requires it. Every handler is the top of its own error
//! tree: failures are logged and reported to admins here and never cross
//! into other handlers.

use entropy_discord::Priority;
use entropy_error::EntropyResult;
use entropy_tickets::permission::{check_command, check_component, RequiredRole};
use entropy_tickets::{assign, identity, intake, panel, survey, transcript, Core};
use serenity::all::{CommandInteraction, ComponentInteraction, Interaction, ModalInteraction};
use tracing::{error, instrument, warn};

async fn report(core: &Core, result: EntropyResult<()>, file: &str, context: &str) {
    if let Err(e) = result {
        error!(file, context, error = %e, "Handler failed");
        core.notifier()
            .log_and_notify(
                Priority::High,
                "Error",
                file,
                true,
                Some(&e.to_string()),
                context,
            )
            .await;
    }
}

/// Route one interaction to its handler.
#[instrument(skip(core, interaction))]
pub async fn dispatch(core: &Core, interaction: Interaction) {
    match interaction {
        Interaction::Command(command) => dispatch_command(core, command).await,
        Interaction::Component(component) => dispatch_component(core, component).await,
        Interaction::Modal(modal) => dispatch_modal(core, modal).await,
        _ => {}
    }
}

async fn dispatch_command(core: &Core, command: CommandInteraction) {
    match command.data.name.as_str() {
        "ticket_view" => {
            match check_command(core, &command, RequiredRole::Developer).await {
                Ok(true) => {
                    let result = intake::handle_ticket_view(core, &command).await;
                    report(core, result, "intake.rs", "Posting the ticket view failed").await;
                }
                Ok(false) => {}
                Err(e) => report(core, Err(e), "dispatch.rs", "Permission check failed").await,
            }
        }
        other => {
            warn!(command = other, "Unknown slash command");
            core.notifier()
                .log_and_notify(
                    Priority::Warn,
                    "Warnung",
                    "dispatch.rs",
                    true,
                    None,
                    &format!("Unknown slash command: {}", other),
                )
                .await;
        }
    }
}

async fn guarded(
    core: &Core,
    interaction: &ComponentInteraction,
    required: RequiredRole,
) -> bool {
    match check_component(core, interaction, required).await {
        Ok(granted) => granted,
        Err(e) => {
            report(core, Err(e), "dispatch.rs", "Permission check failed").await;
            false
        }
    }
}

async fn dispatch_component(core: &Core, interaction: ComponentInteraction) {
    let custom_id = interaction.data.custom_id.clone();
    match custom_id.as_str() {
        intake::CREATE_TICKET_BUTTON => {
            if let Err(e) = identity::resolve(core, interaction.user.id).await {
                warn!(error = %e, "Identity refresh failed");
            }
            let result = intake::handle_create_ticket(core, &interaction).await;
            report(core, result, "intake.rs", "Topic selector failed").await;
        }
        intake::TOPIC_SELECT => {
            let result = intake::handle_topic_select(core, &interaction).await;
            report(core, result, "intake.rs", "Topic selection failed").await;
        }
        intake::GAME_SELECT => {
            let result = intake::handle_game_select(core, &interaction).await;
            report(core, result, "intake.rs", "Game selection failed").await;
        }
        survey::SURVEY_DROPDOWN => {
            let result = survey::handle_dropdown(core, &interaction).await;
            report(core, result, "survey.rs", "Survey answer failed").await;
        }
        panel::BUTTON_CLAIM => {
            if guarded(core, &interaction, RequiredRole::Management).await {
                let result = panel::handle_claim(core, &interaction).await;
                report(core, result, "panel.rs", "Claim failed").await;
            }
        }
        panel::BUTTON_CLOSE => {
            if guarded(core, &interaction, RequiredRole::Management).await {
                let result = panel::handle_close(core, &interaction).await;
                report(core, result, "panel.rs", "Close failed").await;
            }
        }
        panel::BUTTON_REOPEN => {
            if guarded(core, &interaction, RequiredRole::Management).await {
                let result = panel::handle_reopen(core, &interaction).await;
                report(core, result, "panel.rs", "Reopen failed").await;
            }
        }
        panel::BUTTON_ASSIGN => {
            if guarded(core, &interaction, RequiredRole::Management).await {
                let result = assign::handle_assign_button(core, &interaction).await;
                report(core, result, "assign.rs", "Assign selector failed").await;
            }
        }
        panel::BUTTON_DELETE => {
            if guarded(core, &interaction, RequiredRole::Management).await {
                let result = transcript::handle_delete_button(core, &interaction).await;
                report(core, result, "transcript.rs", "Delete prompt failed").await;
            }
        }
        transcript::CONFIRM_DELETE => {
            let result = transcript::handle_confirm_delete(core, &interaction).await;
            report(core, result, "transcript.rs", "Delete confirmation failed").await;
        }
        transcript::CANCEL_DELETE => {
            let result = transcript::handle_cancel_delete(core, &interaction).await;
            report(core, result, "transcript.rs", "Delete cancel failed").await;
        }
        other if other.starts_with(assign::ASSIGN_SELECT_PREFIX) => {
            let result = assign::handle_assign_select(core, &interaction).await;
            report(core, result, "assign.rs", "Assignment failed").await;
        }
        other => {
            warn!(custom_id = other, "Unknown component custom id");
            core.notifier()
                .log_and_notify(
                    Priority::Warn,
                    "Warnung",
                    "dispatch.rs",
                    true,
                    None,
                    &format!("Unknown component custom id: {}", other),
                )
                .await;
        }
    }
}

async fn dispatch_modal(core: &Core, interaction: ModalInteraction) {
    let custom_id = interaction.data.custom_id.clone();
    match custom_id.as_str() {
        survey::SURVEY_MODAL => {
            let result = survey::handle_modal(core, &interaction).await;
            report(core, result, "survey.rs", "Survey free-text answer failed").await;
        }
        other if entropy_tickets::Topic::from_id(other).is_some() => {
            if let Err(e) = identity::resolve(core, interaction.user.id).await {
                warn!(error = %e, "Identity refresh failed");
            }
            let result = intake::handle_submit(core, &interaction).await;
            report(core, result, "intake.rs", "Ticket submission failed").await;
        }
        other => {
            warn!(custom_id = other, "Unknown modal custom id");
            core.notifier()
                .log_and_notify(
                    Priority::Warn,
                    "Warnung",
                    "dispatch.rs",
                    true,
                    None,
                    &format!("Unknown modal custom id: {}", other),
                )
                .await;
        }
    }
}
