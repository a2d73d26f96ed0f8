use async_trait::async_trait;
use innkeep_core::EventPublisher;
use innkeep_shared::FrontDeskEvent;
use innkeep_store::EventProducer;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Sends every event to connected SSE clients and, when a broker is
/// configured, to Kafka.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<FrontDeskEvent>,
    kafka: Option<Arc<EventProducer>>,
}

impl BroadcastPublisher {
    pub fn new(tx: broadcast::Sender<FrontDeskEvent>, kafka: Option<Arc<EventProducer>>) -> Self {
        Self { tx, kafka }
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event: &FrontDeskEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        // no subscribers is not an error
        if self.tx.send(event.clone()).is_err() {
            debug!(event = event.kind(), "No stream subscribers");
        }

        if let Some(kafka) = &self.kafka {
            kafka.publish(event).await?;
        }
        Ok(())
    }
}
