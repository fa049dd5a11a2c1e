//! Events emitted by the folder tree engine.
//!
//! Events are broadcast to UI collaborators: mutation lifecycle changes
//! drive pending indicators, and notices carry user-facing messages.

pub mod folder;
pub mod notice;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use folder::FolderEvent;
pub use notice::{Notice, NoticeLevel};

/// Wrapper for all engine events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all engine event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A folder mutation changed state.
    Folder(FolderEvent),
    /// A message for the user.
    Notice(Notice),
}

impl EngineEvent {
    /// Create a new engine event.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Return the folder event, if this is one.
    pub fn as_folder(&self) -> Option<&FolderEvent> {
        match &self.payload {
            EventPayload::Folder(event) => Some(event),
            EventPayload::Notice(_) => None,
        }
    }

    /// Return the notice, if this is one.
    pub fn as_notice(&self) -> Option<&Notice> {
        match &self.payload {
            EventPayload::Notice(notice) => Some(notice),
            EventPayload::Folder(_) => None,
        }
    }
}

impl From<FolderEvent> for EngineEvent {
    fn from(event: FolderEvent) -> Self {
        Self::new(EventPayload::Folder(event))
    }
}

impl From<Notice> for EngineEvent {
    fn from(notice: Notice) -> Self {
        Self::new(EventPayload::Notice(notice))
    }
}
