//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::events::StoreEvent;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub nats: Option<async_nats::Client>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Publish a domain event, best-effort. A missing or unreachable broker
    /// never fails the request.
    pub async fn publish(&self, event: StoreEvent) {
        let Some(client) = &self.nats else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("failed to serialize {event:?}: {e}");
                return;
            }
        };
        if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!("failed to publish to {}: {e}", event.subject());
        }
    }
}
