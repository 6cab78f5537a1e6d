//! Standard embed vocabulary.
//!
//! Every user-visible notice the bot sends uses one of these builders so
//! color semantics stay consistent across handlers.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

/// Embed color constants.
pub mod colors {
    /// Entropy red, used for errors and destructive prompts.
    pub const RED: u32 = 0xFF0000;
    /// Confirmation blue.
    pub const BLUE: u32 = 0x3498DB;
    /// Moderation panel gold.
    pub const GOLD: u32 = 0xFFD700;
    /// Success green.
    pub const GREEN: u32 = 0x00FF00;
    /// Medium-priority orange.
    pub const ORANGE: u32 = 0xFFA500;
    /// Low-priority yellow.
    pub const YELLOW: u32 = 0xFFFF00;
}

/// Blue informational embed.
pub fn info_embed(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(colors::BLUE))
}

/// Green success embed.
pub fn success_embed(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(colors::GREEN))
}

/// Red error embed. Short reason only, no diagnostics.
pub fn error_embed(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(colors::RED))
}

/// Yellow warning embed.
pub fn warning_embed(title: impl Into<String>, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .colour(Colour::new(colors::YELLOW))
}

/// The standard "no permission" embed shown on every denied action.
pub fn permission_denied_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Keine Berechtigung")
        .description("Dir fehlen die Berechtigungen um diese Aktion auszuführen.")
        .colour(Colour::new(colors::RED))
        .footer(CreateEmbedFooter::new(
            "Wende dich an einen Administrator, falls du glaubst, dass dies ein Fehler ist.",
        ))
}
