//! Staff-member reconciler: keeps the topic → eligible-moderator mapping in
//! step with platform role membership.
//!
//! Walks the full guild member list (pages of 1000), then treats each topic
//! as a set difference: members holding the topic role are upserted, rows no
//! longer backed by the role are evicted.

use crate::context::Core;
use crate::topic::Topic;
use entropy_error::EntropyResult;
use serenity::all::{RoleId, UserId};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

/// Member page size; the platform maximum.
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Flattened member data the reconciler works on.
#[derive(Debug, Clone)]
pub struct GuildMemberInfo {
    /// Platform user id
    pub id: i64,
    /// Account username
    pub username: String,
    /// Role ids the member currently holds
    pub roles: Vec<RoleId>,
}

/// Members currently holding a role, keyed by platform id.
pub fn role_holders(members: &[GuildMemberInfo], role: RoleId) -> HashMap<i64, String> {
    members
        .iter()
        .filter(|member| member.roles.contains(&role))
        .map(|member| (member.id, member.username.clone()))
        .collect()
}

/// Rows to evict: present in the store, no longer backed by the role.
pub fn evictions(current: &HashMap<i64, String>, stored: &[i64]) -> Vec<i64> {
    stored
        .iter()
        .copied()
        .filter(|id| !current.contains_key(id))
        .collect()
}

async fn fetch_all_members(core: &Core) -> EntropyResult<Vec<GuildMemberInfo>> {
    let mut members = Vec::new();
    let mut after: Option<UserId> = None;

    loop {
        let page = core
            .api()
            .members_page(core.guild_id(), after, MEMBER_PAGE_SIZE)
            .await?;
        let Some(last) = page.last() else {
            break;
        };
        after = Some(last.user.id);
        let short_page = (page.len() as u64) < MEMBER_PAGE_SIZE;

        members.extend(page.into_iter().map(|member| GuildMemberInfo {
            id: member.user.id.get() as i64,
            username: member.user.name.clone(),
            roles: member.roles.clone(),
        }));

        if short_page {
            break;
        }
    }

    Ok(members)
}

/// One reconciliation pass over every topic-role pair.
#[instrument(skip(core))]
pub async fn run_sweep(core: &Core) -> EntropyResult<()> {
    let members = fetch_all_members(core).await?;
    debug!(count = members.len(), "Guild membership fetched");

    for topic in Topic::iter() {
        let role_key = topic.spec().role_key;
        let role = match core.constants().get_id(role_key) {
            Ok(id) => RoleId::new(id),
            Err(e) => {
                warn!(error = %e, role_key, "Topic role unresolved, skipping");
                continue;
            }
        };

        let current = role_holders(&members, role);
        for (id, username) in &current {
            core.store().upsert_staff(topic.id(), *id, username).await?;
        }

        let stored = core.store().staff_ids_for_topic(topic.id()).await?;
        for id in evictions(&current, &stored) {
            core.store().remove_staff(topic.id(), id).await?;
        }
    }

    info!("Staff mapping reconciled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, roles: &[u64]) -> GuildMemberInfo {
        GuildMemberInfo {
            id,
            username: format!("user{}", id),
            roles: roles.iter().map(|r| RoleId::new(*r)).collect(),
        }
    }

    #[test]
    fn holders_are_filtered_by_role() {
        let members = vec![member(1, &[10]), member(2, &[11]), member(3, &[10, 11])];
        let holders = role_holders(&members, RoleId::new(10));
        assert_eq!(holders.len(), 2);
        assert!(holders.contains_key(&1));
        assert!(holders.contains_key(&3));
    }

    #[test]
    fn reconciliation_is_a_set_difference() {
        let members = vec![member(1, &[10]), member(2, &[10])];
        let holders = role_holders(&members, RoleId::new(10));
        // 3 lost the role, 1 and 2 keep their rows
        let stored = vec![1, 2, 3];
        assert_eq!(evictions(&holders, &stored), vec![3]);
    }

    #[test]
    fn no_role_holders_evicts_everything() {
        let holders = role_holders(&[], RoleId::new(10));
        assert_eq!(evictions(&holders, &[5, 6]), vec![5, 6]);
    }
}
