//! Entropy Gaming community bot.
//!
//! Startup wires the injected adapters into one [`Core`] value, connects the
//! gateway, and hands every event to the dispatch table. Background
//! reconcilers start once the first ready event arrives.

mod config;
mod dispatch;
mod handler;
mod schedule;

use config::BotConfig;
use entropy_database::{create_pool, run_migrations, ConstantStore};
use entropy_discord::{AdminNotifier, DiscordApi};
use entropy_error::{DatabaseError, DiscordError, EntropyResult, TranscriptError};
use entropy_tickets::identity::RoleIds;
use entropy_tickets::{CoreBuilder, TicketStore};
use handler::Handler;
use serenity::all::GatewayIntents;
use serenity::http::Http;
use serenity::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Outbound API calls time out after this long.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> EntropyResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = BotConfig::from_env()?;
    info!(is_prod = config.is_prod, guild = %config.guild_id, "Starting entropy-bot");

    let pool = create_pool()?;
    {
        let mut conn = pool.get().map_err(DatabaseError::from)?;
        run_migrations(&mut conn)?;
    }

    let http = Arc::new(Http::new(&config.token));
    let api = DiscordApi::new(http.clone());
    let notifier = AdminNotifier::new(http, config.admin_ids.clone(), &config.log_dir);
    let constants = ConstantStore::new(pool.clone(), config.is_prod);
    let role_ids = RoleIds::from_constants(&constants)?;
    let store = TicketStore::new(pool.clone());
    let downloader = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(TranscriptError::from)?;

    let core = CoreBuilder::default()
        .api(api)
        .store(store)
        .notifier(notifier)
        .constants(constants)
        .pool(pool)
        .guild_id(config.guild_id)
        .role_ids(role_ids)
        .transcript_dir(config.transcript_dir.clone())
        .downloader(downloader)
        .build()
        .expect("Core with every adapter injected");

    let mut client = Client::builder(&config.token, GatewayIntents::all())
        .event_handler(Handler::new(Arc::new(core)))
        .await
        .map_err(DiscordError::from)?;

    info!("Connecting to the gateway");
    client.start().await.map_err(DiscordError::from)?;
    Ok(())
}
