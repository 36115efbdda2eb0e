//! Notification channel shared by the workspace, the file service and the
//! platform shell.
//!
//! Components subscribe at construction time via [`EventBus::subscribe`] and
//! deregister by dropping the receiver. There is no import-time global wiring:
//! the bus is created once at process start and injected into everything that
//! needs it.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{channel, Receiver, Sender};

use crate::content::ContentRef;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    #[default]
    Ping,
    /// Request that the UI navigate to (activate or open) the given note.
    OpenNote { note_id: String },
    /// A temp file handed to an external editor was modified on disk.
    OpenedFileUpdated {
        entity: ContentRef,
        last_modified_ms: i64,
        file_path: PathBuf,
    },
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Event::Ping => write!(f, "Ping"),
            Event::OpenNote { .. } => write!(f, "OpenNote"),
            Event::OpenedFileUpdated { .. } => write!(f, "OpenedFileUpdated"),
        }
    }
}

/// Broadcast wrapper carrying [`Event`]s between decoupled components.
///
/// Cloning the bus clones the sender half; all clones feed the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        let (tx, _rx) = channel(EVENT_CHANNEL_CAPACITY);
        EventBus { tx }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener. Dropping the returned receiver deregisters it.
    pub fn subscribe(&self) -> Receiver<Event> {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish. A send failure means no receiver is currently
    /// subscribed, which is a normal shutdown/startup condition, so it is
    /// logged at debug and never propagated.
    pub fn publish(&self, event: Event) {
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("No subscribers for event {}", err.0);
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
