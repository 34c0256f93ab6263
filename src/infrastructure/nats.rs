//! Cart events over NATS.

use async_trait::async_trait;
use tracing::warn;

use crate::domain::events::CartEvent;
use crate::domain::ports::CartEventPublisher;

#[derive(Clone, Debug)]
pub struct NatsPublisher {
    client: async_nats::Client,
    prefix: String,
}

impl NatsPublisher {
    pub fn new(client: async_nats::Client, prefix: impl Into<String>) -> Self {
        Self { client, prefix: prefix.into() }
    }

    pub fn subject_for(&self, event: &CartEvent) -> String { subject(&self.prefix, event) }
}

/// `<prefix>.<event name>`, e.g. `storefront.cart.item_added`.
pub fn subject(prefix: &str, event: &CartEvent) -> String { format!("{prefix}.{}", event.name()) }

#[async_trait]
impl CartEventPublisher for NatsPublisher {
    async fn publish(&self, event: &CartEvent) {
        let subject = self.subject_for(event);
        let payload = match serde_json::to_vec(event) {
            Ok(bytes) => bytes,
            Err(e) => { warn!(%subject, error = %e, "failed to encode cart event"); return; }
        };
        if let Err(e) = self.client.publish(subject.clone(), payload.into()).await {
            warn!(%subject, error = %e, "failed to publish cart event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{GuestId, OwnerKey, UserId};

    #[test]
    fn subject_is_prefix_then_event_name() {
        let cleared = CartEvent::CartCleared { owner: OwnerKey::from(UserId::new("u1").unwrap()) };
        assert_eq!(subject("storefront.cart", &cleared), "storefront.cart.cart_cleared");

        let merged = CartEvent::GuestCartMerged { guest_id: GuestId::new("guest_1").unwrap(), user_id: UserId::new("u1").unwrap(), lines_merged: 2 };
        assert_eq!(subject("shop", &merged), "shop.guest_cart_merged");
    }
}
