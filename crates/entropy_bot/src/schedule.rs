//! Scheduled background tasks.
//!
//! Each schedule is a cron spec from `bot_constants`, evaluated in the local
//! timezone, with a fixed-interval fallback when the constant is missing or
//! unparseable. Tasks run until process shutdown; a failing pass is logged
//! and the schedule keeps ticking.

use chrono::Local;
use entropy_database::ConstantStore;
use entropy_error::EntropyResult;
use entropy_tickets::{absentee, staff, status, Core};
use serenity::all::ChannelId;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// When and how often a background task fires.
pub enum TaskSchedule {
    /// Cron expression evaluated against the local timezone
    Cron(Box<cron::Schedule>),
    /// Fixed interval
    Every(Duration),
}

impl TaskSchedule {
    /// Resolve a schedule constant, falling back to a fixed interval.
    pub fn resolve(constants: &ConstantStore, key: &str, fallback: Duration) -> Self {
        match constants.get(key) {
            Ok(spec) => match cron::Schedule::from_str(&spec) {
                Ok(schedule) => TaskSchedule::Cron(Box::new(schedule)),
                Err(e) => {
                    warn!(key, spec, error = %e, "Unparseable cron spec, using interval fallback");
                    TaskSchedule::Every(fallback)
                }
            },
            Err(_) => TaskSchedule::Every(fallback),
        }
    }

    /// Time until the next firing.
    pub fn next_delay(&self) -> Duration {
        match self {
            TaskSchedule::Every(period) => *period,
            TaskSchedule::Cron(schedule) => schedule
                .upcoming(Local)
                .next()
                .and_then(|next| (next - Local::now()).to_std().ok())
                .unwrap_or(Duration::from_secs(60)),
        }
    }
}

/// Spawn a task that runs on the given schedule until shutdown.
pub fn spawn_task<F, Fut>(name: &'static str, schedule: TaskSchedule, task: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = EntropyResult<()>> + Send,
{
    tokio::spawn(async move {
        info!(task = name, "Scheduled task started");
        loop {
            tokio::time::sleep(schedule.next_delay()).await;
            if let Err(e) = task().await {
                error!(task = name, error = %e, "Scheduled task pass failed");
            }
        }
    })
}

/// Spawn the staff-member reconciler (default: every 2 minutes).
pub fn spawn_staff_reconciler(core: Arc<Core>) -> JoinHandle<()> {
    let schedule = TaskSchedule::resolve(
        core.constants(),
        "CRON_STAFF_SYNC",
        Duration::from_secs(120),
    );
    spawn_task("staff_reconciler", schedule, move || {
        let core = core.clone();
        async move { staff::run_sweep(&core).await }
    })
}

/// Spawn the absentee reconciler (default: every 5 minutes).
pub fn spawn_absentee_reconciler(core: Arc<Core>) -> JoinHandle<()> {
    let schedule = TaskSchedule::resolve(
        core.constants(),
        "CRON_ABSENTEE_CHECK",
        Duration::from_secs(300),
    );
    spawn_task("absentee_reconciler", schedule, move || {
        let core = core.clone();
        async move { absentee::run_sweep(&core).await.map(|_| ()) }
    })
}

/// Spawn the status board (default: every minute).
///
/// The board channel is purged and re-seeded once, then the same message is
/// edited on every pass.
pub fn spawn_status_board(core: Arc<Core>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let channel = match core.constants().get_id("CHANNEL_TICKET_STATUS") {
            Ok(id) => ChannelId::new(id),
            Err(e) => {
                warn!(error = %e, "Status board channel unresolved, board disabled");
                return;
            }
        };

        let board_message = match status::ensure_board_message(&core, channel).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Status board initialization failed, board disabled");
                return;
            }
        };

        let schedule = TaskSchedule::resolve(
            core.constants(),
            "CRON_STATUS_BOARD",
            Duration::from_secs(60),
        );
        info!("Status board task started");
        loop {
            tokio::time::sleep(schedule.next_delay()).await;
            if let Err(e) = status::run_update(&core, channel, board_message).await {
                error!(error = %e, "Status board update failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_schedules_report_their_period() {
        let schedule = TaskSchedule::Every(Duration::from_secs(120));
        assert_eq!(schedule.next_delay(), Duration::from_secs(120));
    }

    #[test]
    fn cron_schedules_fire_within_their_period() {
        // every minute, at second 0
        let schedule = TaskSchedule::Cron(Box::new(
            cron::Schedule::from_str("0 * * * * *").unwrap(),
        ));
        assert!(schedule.next_delay() <= Duration::from_secs(60));
    }
}
