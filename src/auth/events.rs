//! Session lifecycle events
//!
//! The client never navigates or prompts. When it drops the stored
//! session it broadcasts a `SessionEvent` and leaves the reaction to
//! whoever subscribed.

use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 16;

/// Why the stored session was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// A 401 arrived and no refresh token was stored
    MissingRefreshToken,
    /// The refresh call failed or returned an unusable body
    RefreshFailed,
    /// The user logged out
    LoggedOut,
}

/// Events emitted by the authenticated client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new access token was obtained and stored
    Refreshed,
    /// All stored credentials were cleared; the user must log in again
    Invalidated {
        /// What triggered the invalidation
        reason: InvalidationReason,
    },
}

/// Broadcast channel for session events
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    /// Create a new event channel
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to current subscribers
    pub fn emit(&self, event: SessionEvent) {
        // No subscribers is not an error
        if self.sender.send(event.clone()).is_err() {
            debug!(?event, "Session event dropped, no subscribers");
        }
    }

    /// Publish an invalidation event
    pub fn invalidated(&self, reason: InvalidationReason) {
        self.emit(SessionEvent::Invalidated { reason });
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
