//! Navigation signals from the data layer to the view layer.
//!
//! The data layer never navigates. It publishes a [`NavigationEvent`] and
//! whatever renders the screens decides what to do with it.

use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the navigation channel. Slow subscribers lag rather than block.
const CHANNEL_CAPACITY: usize = 16;

/// A request for the view layer to change screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    /// The session is gone; show the login entry point.
    RedirectToLogin,
}

/// Broadcast channel carrying [`NavigationEvent`]s.
///
/// Cloning the bus shares the channel. Publishing with no subscribers is not
/// an error.
#[derive(Debug, Clone)]
pub struct NavigationBus {
    tx: broadcast::Sender<NavigationEvent>,
}

impl Default for NavigationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: NavigationEvent) {
        match self.tx.send(event) {
            Ok(receivers) => debug!(?event, receivers, "Navigation event published"),
            Err(_) => debug!(?event, "Navigation event published with no subscribers"),
        }
    }

    /// Shorthand for publishing [`NavigationEvent::RedirectToLogin`].
    pub fn redirect_to_login(&self) {
        self.publish(NavigationEvent::RedirectToLogin);
    }
}
