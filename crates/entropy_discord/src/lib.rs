//! Discord adapter for the Entropy Gaming bot.
//!
//! Everything the ticket core needs from the platform goes through
//! [`DiscordApi`], a thin wrapper over Serenity's HTTP client: channel
//! lifecycle, per-member permission overrides, paged message history,
//! membership lookups and DM channels. The crate also carries the standard
//! embed vocabulary and the admin notification sink.

#![warn(missing_docs)]

mod api;
mod embeds;
mod notify;

pub use api::{DiscordApi, ALL_TEXT};
pub use embeds::{
    colors, error_embed, info_embed, permission_denied_embed, success_embed, warning_embed,
};
pub use notify::{AdminNotifier, Priority};

/// Result type for Discord adapter operations.
pub type DiscordResult<T> = std::result::Result<T, entropy_error::DiscordError>;
