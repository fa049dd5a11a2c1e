//! Broadcast channel for engine events and user-facing notices.

use tokio::sync::broadcast;
use tracing::trace;

use foldertree_core::error::AppError;
use foldertree_core::events::{EngineEvent, FolderEvent, Notice};

/// Fan-out of [`EngineEvent`]s to any number of UI subscribers.
///
/// Sending never fails: events emitted with no subscriber are dropped,
/// and slow subscribers observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventNotifier {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventNotifier {
    /// Create a notifier buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Publish a folder lifecycle event.
    pub fn folder(&self, event: FolderEvent) {
        self.publish(event.into());
    }

    /// Publish a notice describing `err`.
    pub fn error(&self, err: &AppError) {
        self.publish(Notice::from(err).into());
    }

    fn publish(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}
