//! Shared dependency container for the ticket subsystem.
//!
//! One `Core` value is constructed at startup with every adapter injected;
//! handlers and scheduled tasks borrow it. There is no process-global state.

use crate::identity::RoleIds;
use crate::store::TicketStore;
use entropy_database::{ConstantStore, DbPool};
use entropy_discord::{AdminNotifier, DiscordApi};
use serenity::all::GuildId;
use std::path::PathBuf;

/// Injected adapters and configuration for the ticket core.
#[derive(Clone, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct Core {
    api: DiscordApi,
    store: TicketStore,
    notifier: AdminNotifier,
    constants: ConstantStore,
    pool: DbPool,
    guild_id: GuildId,
    role_ids: RoleIds,
    transcript_dir: PathBuf,
    /// Attachment downloads carry their own HTTP client (30 s timeout).
    downloader: reqwest::Client,
}

impl Core {
    /// The platform adapter.
    pub fn api(&self) -> &DiscordApi {
        &self.api
    }

    /// The ticket store.
    pub fn store(&self) -> &TicketStore {
        &self.store
    }

    /// The admin notification sink.
    pub fn notifier(&self) -> &AdminNotifier {
        &self.notifier
    }

    /// The bot_constants lookup.
    pub fn constants(&self) -> &ConstantStore {
        &self.constants
    }

    /// The shared connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// The guild this bot manages.
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// Resolved role ids backing the seven role flags.
    pub fn role_ids(&self) -> &RoleIds {
        &self.role_ids
    }

    /// Directory transcripts and attachments are written under.
    pub fn transcript_dir(&self) -> &PathBuf {
        &self.transcript_dir
    }

    /// HTTP client for attachment downloads.
    pub fn downloader(&self) -> &reqwest::Client {
        &self.downloader
    }
}
