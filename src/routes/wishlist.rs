//! Session wishlist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::state::AppState;
use crate::{Result, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wishlist/:session", get(list_wishlist).post(add_to_wishlist))
        .route("/wishlist/:session/:product_id", delete(remove_from_wishlist))
}

async fn fetch_wishlist(db: &PgPool, session: &str) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM wishlist_items w JOIN products p ON p.id = w.product_id \
         WHERE w.session_id = $1 AND p.status = 'active' ORDER BY w.created_at DESC",
    )
    .bind(session)
    .fetch_all(db)
    .await?;
    Ok(products)
}

async fn list_wishlist(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(fetch_wishlist(&s.db, &session).await?))
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub product_id: Uuid,
}

async fn add_to_wishlist(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<WishlistRequest>,
) -> Result<(StatusCode, Json<Vec<Product>>)> {
    let exists: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM products WHERE id = $1 AND status = 'active'")
            .bind(r.product_id)
            .fetch_optional(&s.db)
            .await?;
    if exists.is_none() {
        return Err(StoreError::ProductNotFound);
    }
    sqlx::query(
        "INSERT INTO wishlist_items (session_id, product_id, created_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT DO NOTHING",
    )
    .bind(&session)
    .bind(r.product_id)
    .execute(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(fetch_wishlist(&s.db, &session).await?)))
}

async fn remove_from_wishlist(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
) -> Result<StatusCode> {
    sqlx::query("DELETE FROM wishlist_items WHERE session_id = $1 AND product_id = $2")
        .bind(&session)
        .bind(product_id)
        .execute(&s.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
