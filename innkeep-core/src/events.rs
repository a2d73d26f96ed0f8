use async_trait::async_trait;
use innkeep_shared::FrontDeskEvent;
use std::sync::Mutex;

/// Outbound channel for lifecycle notifications.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(
        &self,
        event: &FrontDeskEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Keeps published events in memory so tests can assert on them.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<FrontDeskEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FrontDeskEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(
        &self,
        event: &FrontDeskEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events
            .lock()
            .map_err(|_| "recording publisher poisoned")?
            .push(event.clone());
        Ok(())
    }
}
