//! Role-flag seniority hierarchy.
//!
//! Developer, head management and Projektleitung may do everything;
//! management covers everything at or below management; everyone else needs
//! an exact flag match. The check is total — every (flags, required) pair
//! yields a boolean.

use crate::context::Core;
use crate::identity;
use entropy_discord::permission_denied_embed;
use entropy_error::EntropyResult;
use serenity::all::{
    CommandInteraction, ComponentInteraction, CreateInteractionResponse,
    CreateInteractionResponseMessage, User,
};
use tracing::{debug, instrument, warn};

/// The seven role flags cached on a user row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserRoles {
    /// Diamond Club member
    pub diamond_club: bool,
    /// Diamond Teams member
    pub diamond_teams: bool,
    /// Entropy member
    pub entropy_member: bool,
    /// Management
    pub management: bool,
    /// Developer
    pub developer: bool,
    /// Head management
    pub head_management: bool,
    /// Projektleitung
    pub projektleitung: bool,
}

/// Permission level an action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Diamond Club member
    DiamondClub,
    /// Diamond Teams member
    DiamondTeams,
    /// Entropy member
    EntropyMember,
    /// Management
    Management,
    /// Developer
    Developer,
    /// Head management
    HeadManagement,
    /// Projektleitung
    Projektleitung,
}

/// Evaluate the seniority hierarchy.
pub fn allowed(roles: &UserRoles, required: RequiredRole) -> bool {
    if roles.developer || roles.head_management || roles.projektleitung {
        return true;
    }

    if roles.management {
        match required {
            RequiredRole::DiamondClub
            | RequiredRole::DiamondTeams
            | RequiredRole::EntropyMember
            | RequiredRole::Management => return true,
            _ => {}
        }
    }

    match required {
        RequiredRole::DiamondClub => roles.diamond_club,
        RequiredRole::DiamondTeams => roles.diamond_teams,
        RequiredRole::EntropyMember => roles.entropy_member,
        RequiredRole::Management => roles.management,
        RequiredRole::Developer => roles.developer,
        RequiredRole::HeadManagement => roles.head_management,
        RequiredRole::Projektleitung => roles.projektleitung,
    }
}

/// Refresh the actor's row and evaluate the hierarchy against it.
#[instrument(skip(core, user), fields(user = %user.id))]
async fn check(core: &Core, user: &User, required: RequiredRole) -> EntropyResult<bool> {
    identity::resolve(core, user.id).await?;

    let roles = identity::load_roles(core, user.id.get() as i64)
        .await?
        .unwrap_or_default();
    let granted = allowed(&roles, required);
    if !granted {
        debug!(?required, "Permission denied");
    }
    Ok(granted)
}

/// Guard a component interaction; sends the standard denial embed on false.
pub async fn check_component(
    core: &Core,
    interaction: &ComponentInteraction,
    required: RequiredRole,
) -> EntropyResult<bool> {
    let granted = check(core, &interaction.user, required).await?;
    if !granted {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .embed(permission_denied_embed())
                .ephemeral(true),
        );
        if let Err(e) = interaction.create_response(core.api().http(), response).await {
            warn!(error = %e, "Failed to deliver permission denial");
        }
    }
    Ok(granted)
}

/// Guard a slash command; sends the standard denial embed on false.
pub async fn check_command(
    core: &Core,
    interaction: &CommandInteraction,
    required: RequiredRole,
) -> EntropyResult<bool> {
    let granted = check(core, &interaction.user, required).await?;
    if !granted {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .embed(permission_denied_embed())
                .ephemeral(true),
        );
        if let Err(e) = interaction.create_response(core.api().http(), response).await {
            warn!(error = %e, "Failed to deliver permission denial");
        }
    }
    Ok(granted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REQUIRED: [RequiredRole; 7] = [
        RequiredRole::DiamondClub,
        RequiredRole::DiamondTeams,
        RequiredRole::EntropyMember,
        RequiredRole::Management,
        RequiredRole::Developer,
        RequiredRole::HeadManagement,
        RequiredRole::Projektleitung,
    ];

    #[test]
    fn admin_flags_grant_everything() {
        for roles in [
            UserRoles {
                developer: true,
                ..Default::default()
            },
            UserRoles {
                head_management: true,
                ..Default::default()
            },
            UserRoles {
                projektleitung: true,
                ..Default::default()
            },
        ] {
            for required in ALL_REQUIRED {
                assert!(allowed(&roles, required));
            }
        }
    }

    #[test]
    fn management_covers_everything_at_or_below() {
        let roles = UserRoles {
            management: true,
            ..Default::default()
        };
        assert!(allowed(&roles, RequiredRole::DiamondClub));
        assert!(allowed(&roles, RequiredRole::DiamondTeams));
        assert!(allowed(&roles, RequiredRole::EntropyMember));
        assert!(allowed(&roles, RequiredRole::Management));
        assert!(!allowed(&roles, RequiredRole::Developer));
        assert!(!allowed(&roles, RequiredRole::HeadManagement));
        assert!(!allowed(&roles, RequiredRole::Projektleitung));
    }

    #[test]
    fn plain_members_need_an_exact_match() {
        let roles = UserRoles {
            entropy_member: true,
            ..Default::default()
        };
        assert!(allowed(&roles, RequiredRole::EntropyMember));
        assert!(!allowed(&roles, RequiredRole::DiamondClub));
        assert!(!allowed(&roles, RequiredRole::Management));
    }

    #[test]
    fn no_flags_grants_nothing() {
        let roles = UserRoles::default();
        for required in ALL_REQUIRED {
            assert!(!allowed(&roles, required));
        }
    }
}
