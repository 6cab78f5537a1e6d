//! Identity resolution: platform user → internal user row.
//!
//! Every interaction refreshes the actor's profile snapshot and role flags,
//! so stale flags survive at most one additional interaction. Fetch failures
//! are non-fatal — the cached row keeps serving, and a user we have never
//! seen resolves to `None` (callers must not persist a foreign key then).

use crate::context::Core;
use crate::model::NewUser;
use crate::permission::UserRoles;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use entropy_database::schema::users;
use entropy_database::ConstantStore;
use entropy_error::{ConfigError, DatabaseError, EntropyResult};
use serenity::all::{Member, RoleId, UserId};
use tracing::{instrument, warn};

/// Resolved role ids backing the seven role flags.
#[derive(Debug, Clone)]
pub struct RoleIds {
    /// Diamond Club role
    pub diamond_club: RoleId,
    /// Diamond Teams role
    pub diamond_teams: RoleId,
    /// Entropy member role
    pub entropy_member: RoleId,
    /// Management role
    pub management: RoleId,
    /// Developer role
    pub developer: RoleId,
    /// Head management role
    pub head_management: RoleId,
    /// Projektleitung role
    pub projektleitung: RoleId,
}

impl RoleIds {
    /// Resolve all seven role ids from the constant store.
    pub fn from_constants(constants: &ConstantStore) -> Result<Self, ConfigError> {
        Ok(Self {
            diamond_club: RoleId::new(constants.get_id("ROLE_DIAMOND_CLUB")?),
            diamond_teams: RoleId::new(constants.get_id("ROLE_DIAMOND_TEAMS")?),
            entropy_member: RoleId::new(constants.get_id("ROLE_ENTROPY_MEMBER")?),
            management: RoleId::new(constants.get_id("ROLE_MANAGEMENT")?),
            developer: RoleId::new(constants.get_id("ROLE_DEVELOPER")?),
            head_management: RoleId::new(constants.get_id("ROLE_HEAD_MANAGEMENT")?),
            projektleitung: RoleId::new(constants.get_id("ROLE_PROJEKTLEITUNG")?),
        })
    }
}

/// Compute the seven role flags from a member's current role list.
///
/// Idempotent: the same role list always yields the same flags.
pub fn compute_flags(roles: &[RoleId], ids: &RoleIds) -> UserRoles {
    UserRoles {
        diamond_club: roles.contains(&ids.diamond_club),
        diamond_teams: roles.contains(&ids.diamond_teams),
        entropy_member: roles.contains(&ids.entropy_member),
        management: roles.contains(&ids.management),
        developer: roles.contains(&ids.developer),
        head_management: roles.contains(&ids.head_management),
        projektleitung: roles.contains(&ids.projektleitung),
    }
}

fn joined_at(member: &Member) -> Option<DateTime<Utc>> {
    member
        .joined_at
        .and_then(|ts| DateTime::from_timestamp(ts.unix_timestamp(), 0))
}

/// Resolve a platform user to the internal surrogate id.
///
/// Fetches a live profile snapshot, recomputes role flags and upserts the
/// user row with a `last_seen` touch. When the platform lookup fails, the
/// existing row (if any) is returned unmodified; `None` means "unknown user,
/// do not persist a foreign key".
#[instrument(skip(core), fields(user = %user_id))]
pub async fn resolve(core: &Core, user_id: UserId) -> EntropyResult<Option<i32>> {
    let discord_id = user_id.get() as i64;

    let member = match core.api().member(core.guild_id(), user_id).await {
        Ok(member) => member,
        Err(e) => {
            warn!(error = %e, "Profile snapshot failed, keeping cached row");
            return existing_id(core, discord_id);
        }
    };

    let flags = compute_flags(&member.roles, core.role_ids());
    let now = Utc::now();
    let row = NewUser {
        discord_id,
        username: member.user.name.clone(),
        display_name: member.user.global_name.clone(),
        nickname: member.nick.clone(),
        avatar_url: member.user.avatar_url(),
        is_bot: member.user.bot,
        joined_server_at: joined_at(&member),
        first_seen: now,
        last_seen: now,
        role_diamond_club: flags.diamond_club,
        role_diamond_teams: flags.diamond_teams,
        role_entropy_member: flags.entropy_member,
        role_management: flags.management,
        role_developer: flags.developer,
        role_head_management: flags.head_management,
        role_projektleitung: flags.projektleitung,
    };

    let mut conn = core.pool().get().map_err(DatabaseError::from)?;
    let id: i32 = diesel::insert_into(users::table)
        .values(&row)
        .on_conflict(users::discord_id)
        .do_update()
        .set((
            users::username.eq(excluded(users::username)),
            users::display_name.eq(excluded(users::display_name)),
            users::nickname.eq(excluded(users::nickname)),
            users::avatar_url.eq(excluded(users::avatar_url)),
            users::is_bot.eq(excluded(users::is_bot)),
            users::joined_server_at.eq(excluded(users::joined_server_at)),
            users::last_seen.eq(excluded(users::last_seen)),
            users::role_diamond_club.eq(excluded(users::role_diamond_club)),
            users::role_diamond_teams.eq(excluded(users::role_diamond_teams)),
            users::role_entropy_member.eq(excluded(users::role_entropy_member)),
            users::role_management.eq(excluded(users::role_management)),
            users::role_developer.eq(excluded(users::role_developer)),
            users::role_head_management.eq(excluded(users::role_head_management)),
            users::role_projektleitung.eq(excluded(users::role_projektleitung)),
        ))
        .returning(users::id)
        .get_result(&mut conn)
        .map_err(DatabaseError::from)?;

    Ok(Some(id))
}

fn existing_id(core: &Core, discord_id: i64) -> EntropyResult<Option<i32>> {
    let mut conn = core.pool().get().map_err(DatabaseError::from)?;
    let id = users::table
        .filter(users::discord_id.eq(discord_id))
        .select(users::id)
        .first::<i32>(&mut conn)
        .optional()
        .map_err(DatabaseError::from)?;
    Ok(id)
}

/// Load the cached role flags for a platform user.
#[instrument(skip(core))]
pub async fn load_roles(core: &Core, discord_id: i64) -> EntropyResult<Option<UserRoles>> {
    let mut conn = core.pool().get().map_err(DatabaseError::from)?;
    let row = users::table
        .filter(users::discord_id.eq(discord_id))
        .select((
            users::role_diamond_club,
            users::role_diamond_teams,
            users::role_entropy_member,
            users::role_management,
            users::role_developer,
            users::role_head_management,
            users::role_projektleitung,
        ))
        .first::<(bool, bool, bool, bool, bool, bool, bool)>(&mut conn)
        .optional()
        .map_err(DatabaseError::from)?;

    Ok(row.map(
        |(
            diamond_club,
            diamond_teams,
            entropy_member,
            management,
            developer,
            head_management,
            projektleitung,
        )| UserRoles {
            diamond_club,
            diamond_teams,
            entropy_member,
            management,
            developer,
            head_management,
            projektleitung,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_ids() -> RoleIds {
        RoleIds {
            diamond_club: RoleId::new(1),
            diamond_teams: RoleId::new(2),
            entropy_member: RoleId::new(3),
            management: RoleId::new(4),
            developer: RoleId::new(5),
            head_management: RoleId::new(6),
            projektleitung: RoleId::new(7),
        }
    }

    #[test]
    fn flags_follow_role_membership() {
        let ids = role_ids();
        let flags = compute_flags(&[RoleId::new(3), RoleId::new(4)], &ids);
        assert!(flags.entropy_member);
        assert!(flags.management);
        assert!(!flags.diamond_club);
        assert!(!flags.developer);
    }

    #[test]
    fn flag_computation_is_idempotent() {
        let ids = role_ids();
        let roles = vec![RoleId::new(1), RoleId::new(7)];
        assert_eq!(compute_flags(&roles, &ids), compute_flags(&roles, &ids));
    }

    #[test]
    fn unrelated_roles_set_nothing() {
        let ids = role_ids();
        let flags = compute_flags(&[RoleId::new(99), RoleId::new(100)], &ids);
        assert_eq!(flags, UserRoles::default());
    }
}
