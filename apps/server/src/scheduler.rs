//! Background scheduler for delivery follow-ups.
//!
//! Polls on a fixed interval. Each poll claims due orders atomically, so it
//! is safe to run next to an external cron hitting the follow-up endpoint.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the background follow-up poll.
pub fn start_follow_up_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("Follow-up scheduler started ({}s interval)", every.as_secs());

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            run_scheduled_follow_ups(&state).await;
        }
    });
}

async fn run_scheduled_follow_ups(state: &Arc<AppState>) {
    match state.follow_up_service.run_due_follow_ups().await {
        Ok(report) if report.processed_count == 0 => {
            debug!("Scheduled follow-up run found nothing due");
        }
        Ok(report) => {
            info!(
                "Scheduled follow-up run processed {} order(s): {:?}",
                report.processed_count, report.order_ids
            );
        }
        Err(e) => warn!("Scheduled follow-up run failed: {}", e),
    }
}
