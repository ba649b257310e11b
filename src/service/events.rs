//! Purchase notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Default capacity of the notification channel
pub const DEFAULT_EVENT_BUFFER: usize = 16;

/// Broadcast stream type used by purchase subscribers.
pub type PurchaseStream = broadcast::Receiver<ProductPurchased>;

/// Emitted once per purchase that granted ownership, after the ownership
/// cache was updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPurchased {
    /// Id written to the ownership cache (override id if one was given)
    pub product_id: String,
    /// Attempt that produced the purchase
    pub attempt_id: Uuid,
    pub purchased_at: DateTime<Utc>,
}

impl ProductPurchased {
    pub fn new(product_id: impl Into<String>, attempt_id: Uuid) -> Self {
        Self {
            product_id: product_id.into(),
            attempt_id,
            purchased_at: Utc::now(),
        }
    }
}

/// Fan-out channel for purchase notifications
#[derive(Clone, Debug)]
pub struct PurchaseEvents {
    event_tx: broadcast::Sender<ProductPurchased>,
}

impl PurchaseEvents {
    /// Create a channel holding at most `buffer` undelivered events per
    /// subscriber.
    pub fn new(buffer: usize) -> Self {
        let (event_tx, _) = broadcast::channel(buffer.max(1));
        Self { event_tx }
    }

    /// Subscribe to future purchase events.
    pub fn subscribe(&self) -> PurchaseStream {
        self.event_tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Emission is best-effort; having no subscribers is not an error and
    /// lagged subscribers are handled by `broadcast`.
    pub fn emit(&self, event: ProductPurchased) {
        let _ = self.event_tx.send(event);
    }
}

impl Default for PurchaseEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}
