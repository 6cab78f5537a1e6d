//! Admin notification sink.
//!
//! Every noteworthy failure is appended to a per-day log file; priorities
//! that warrant attention additionally fan out as a color-coded embed DM to
//! the configured admin list.

use chrono::Local;
use serenity::all::{Colour, CreateEmbed, CreateMessage, UserId};
use serenity::http::Http;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, instrument, warn};

/// Notification priority, mapped onto embed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Immediate attention required
    Critical,
    /// Broken functionality
    High,
    /// Degraded functionality
    Medium,
    /// Cosmetic or recoverable
    Low,
    /// Informational
    Info,
    /// Suspicious but not broken
    Warn,
}

impl Priority {
    /// Embed color for this priority.
    pub fn colour(&self) -> u32 {
        match self {
            Priority::Critical | Priority::High => 0xFF0000,
            Priority::Medium => 0xFFA500,
            Priority::Low | Priority::Warn => 0xFFFF00,
            Priority::Info => 0x00FF00,
        }
    }

    /// Label used in log lines and embed titles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Info => "info",
            Priority::Warn => "warn",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log-and-DM sink for operational events.
#[derive(Clone)]
pub struct AdminNotifier {
    http: Arc<Http>,
    admin_ids: Vec<UserId>,
    log_dir: PathBuf,
}

impl AdminNotifier {
    /// Create a notifier that DMs the given admins and logs under `log_dir`.
    pub fn new(http: Arc<Http>, admin_ids: Vec<UserId>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            admin_ids,
            log_dir: log_dir.into(),
        }
    }

    /// Append to the per-day log file and, if requested, DM the admin list.
    ///
    /// Notification is a side-effect, not a failure signal: delivery errors
    /// are logged and swallowed so callers never fail because the messenger
    /// did.
    #[instrument(skip(self, error, context), fields(priority = %priority, kind, file))]
    pub async fn log_and_notify(
        &self,
        priority: Priority,
        kind: &str,
        file: &str,
        notify_admins: bool,
        error: Option<&str>,
        context: &str,
    ) {
        let detail = error.unwrap_or("no error attached");
        self.append_log_line(priority, kind, file, detail, context)
            .await;

        if !notify_admins {
            return;
        }

        let mut embed = CreateEmbed::new()
            .title(format!("Prio: {} — Typ: {}", priority, kind))
            .colour(Colour::new(priority.colour()))
            .field("Datei", file, true);
        if !context.is_empty() {
            embed = embed.field("Context", context, false);
        }
        embed = embed.field("Fehlermeldung", detail, false);

        for admin in &self.admin_ids {
            let dm = match admin.create_dm_channel(&self.http).await {
                Ok(dm) => dm,
                Err(e) => {
                    warn!(admin = %admin, error = %e, "Failed to open admin DM channel");
                    continue;
                }
            };
            if let Err(e) = dm
                .id
                .send_message(&self.http, CreateMessage::new().embed(embed.clone()))
                .await
            {
                warn!(admin = %admin, error = %e, "Failed to deliver admin DM");
            }
        }
    }

    async fn append_log_line(
        &self,
        priority: Priority,
        kind: &str,
        file: &str,
        detail: &str,
        context: &str,
    ) {
        if let Err(e) = tokio::fs::create_dir_all(&self.log_dir).await {
            error!(error = %e, "Failed to create log directory");
            return;
        }

        let today = Local::now().format("%Y-%m-%d");
        let path = self.log_dir.join(format!("{}.log", today));
        let line = format!(
            "{} [ADMIN-ALERT] {}/{} {} {} | {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            priority,
            kind,
            file,
            detail,
            context,
        );

        let result = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await;
        match result {
            Ok(mut handle) => {
                if let Err(e) = handle.write_all(line.as_bytes()).await {
                    error!(error = %e, path = ?path, "Failed to append log line");
                } else {
                    debug!(path = ?path, "Admin alert logged");
                }
            }
            Err(e) => error!(error = %e, path = ?path, "Failed to open log file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalating_priorities_map_to_red() {
        assert_eq!(Priority::Critical.colour(), 0xFF0000);
        assert_eq!(Priority::High.colour(), 0xFF0000);
    }

    #[test]
    fn informational_priorities_stay_soft() {
        assert_eq!(Priority::Medium.colour(), 0xFFA500);
        assert_eq!(Priority::Low.colour(), 0xFFFF00);
        assert_eq!(Priority::Warn.colour(), 0xFFFF00);
        assert_eq!(Priority::Info.colour(), 0x00FF00);
    }

    #[test]
    fn labels_round_trip_through_display() {
        for p in [
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
            Priority::Info,
            Priority::Warn,
        ] {
            assert_eq!(format!("{}", p), p.as_str());
        }
    }
}
