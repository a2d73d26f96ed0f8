use innkeep_core::AccessPolicy;
use innkeep_frontdesk::FrontDesk;
use innkeep_shared::FrontDeskEvent;
use innkeep_store::app_config::RateLimitConfig;
use innkeep_store::RedisClient;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub front_desk: Arc<FrontDesk>,
    pub access: Arc<AccessPolicy>,
    /// Rate limiting is off when no Redis is configured.
    pub redis: Option<Arc<RedisClient>>,
    pub rate_limit: RateLimitConfig,
    pub events_tx: broadcast::Sender<FrontDeskEvent>,
    pub metrics: Arc<Metrics>,
}
