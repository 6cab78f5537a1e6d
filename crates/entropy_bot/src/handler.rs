//! Gateway event handler.

use crate::{dispatch, schedule};
use entropy_tickets::Core;
use serenity::all::{Context, CreateCommand, EventHandler, Interaction, Ready};
use serenity::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Serenity event handler holding the shared core.
pub struct Handler {
    core: Arc<Core>,
    tasks_started: AtomicBool,
}

impl Handler {
    /// Create the handler around the shared core.
    pub fn new(core: Arc<Core>) -> Self {
        Self {
            core,
            tasks_started: AtomicBool::new(false),
        }
    }

    async fn register_commands(&self) {
        let command = CreateCommand::new("ticket_view")
            .description("Postet das Ticket-System Panel in diesen Kanal");
        if let Err(e) = self
            .core
            .guild_id()
            .create_command(self.core.api().http(), command)
            .await
        {
            error!(error = %e, "Slash command registration failed");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Gateway session ready");

        self.register_commands().await;

        // ready re-fires on reconnect; the schedulers must only start once
        if !self.tasks_started.swap(true, Ordering::SeqCst) {
            schedule::spawn_status_board(self.core.clone());
            schedule::spawn_staff_reconciler(self.core.clone());
            schedule::spawn_absentee_reconciler(self.core.clone());
        }
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        // every interaction gets its own task so a slow handler (transcript
        // capture) never blocks the event stream
        let core = self.core.clone();
        tokio::spawn(async move {
            dispatch::dispatch(&core, interaction).await;
        });
    }
}
