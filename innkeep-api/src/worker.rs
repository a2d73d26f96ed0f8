use innkeep_frontdesk::FrontDesk;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// Periodically expires PENDING_PAYMENT reservations whose hold has lapsed.
pub async fn start_hold_expiry_worker(front_desk: Arc<FrontDesk>, sweep_interval_seconds: u64) {
    let mut ticker = interval(Duration::from_secs(sweep_interval_seconds.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Hold expiry worker started, sweeping every {}s", sweep_interval_seconds);

    loop {
        ticker.tick().await;
        match front_desk.expire_stale_holds().await {
            Ok(expired) if !expired.is_empty() => {
                info!(count = expired.len(), "Expired stale holds");
            }
            Ok(_) => {}
            Err(e) => error!("Hold expiry sweep failed: {}", e),
        }
    }
}
