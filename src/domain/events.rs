//! Domain events published to NATS for downstream consumers (fulfilment
//! dashboards, notification senders). Delivery is best-effort.

use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    ProductCreated { product_id: Uuid, name: String },
    ProductUpdated { product_id: Uuid },
    ProductArchived { product_id: Uuid },
    OrderPlaced { order_id: Uuid, order_number: String, total: i64 },
    PaymentClaimed { order_id: Uuid, reference: Option<String> },
    OrderStatusChanged { order_id: Uuid, from: String, to: String },
}

impl StoreEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::ProductCreated { .. } | Self::ProductUpdated { .. } | Self::ProductArchived { .. } => {
                "store.products"
            }
            Self::OrderPlaced { .. } | Self::PaymentClaimed { .. } | Self::OrderStatusChanged { .. } => {
                "store.orders"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_route_to_their_subject() {
        let e = StoreEvent::OrderPlaced {
            order_id: Uuid::new_v4(),
            order_number: "ORD-1".into(),
            total: 100,
        };
        assert_eq!(e.subject(), "store.orders");
        let e = StoreEvent::ProductUpdated { product_id: Uuid::new_v4() };
        assert_eq!(e.subject(), "store.products");
    }

    #[test]
    fn serializes_with_a_type_tag() {
        let e = StoreEvent::ProductArchived { product_id: Uuid::nil() };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "product_archived");
    }
}
