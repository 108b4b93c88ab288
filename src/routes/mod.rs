//! HTTP surface: one module per storefront resource.

pub mod browsing;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest(
            "/api/v1",
            Router::new()
                .merge(products::router())
                .merge(search::router())
                .merge(cart::router())
                .merge(wishlist::router())
                .merge(browsing::router())
                .merge(checkout::router())
                .merge(orders::router()),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "meher-store"}))
}
