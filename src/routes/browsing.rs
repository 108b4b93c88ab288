//! Recently-viewed tracking, capped per session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::state::AppState;
use crate::{Result, StoreError};

/// How many recently-viewed products are kept per session.
const RECENTLY_VIEWED_CAP: i64 = 8;

pub fn router() -> Router<AppState> {
    Router::new().route("/recently-viewed/:session", get(list_recently_viewed).post(record_view))
}

#[derive(Debug, Deserialize)]
pub struct RecordViewRequest {
    pub product_id: Uuid,
}

async fn record_view(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<RecordViewRequest>,
) -> Result<StatusCode> {
    let exists: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM products WHERE id = $1 AND status = 'active'")
            .bind(r.product_id)
            .fetch_optional(&s.db)
            .await?;
    if exists.is_none() {
        return Err(StoreError::ProductNotFound);
    }
    sqlx::query(
        "INSERT INTO recently_viewed (session_id, product_id, viewed_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT (session_id, product_id) DO UPDATE SET viewed_at = NOW()",
    )
    .bind(&session)
    .bind(r.product_id)
    .execute(&s.db)
    .await?;
    // drop anything beyond the cap, oldest first
    sqlx::query(
        "DELETE FROM recently_viewed WHERE session_id = $1 AND product_id NOT IN \
         (SELECT product_id FROM recently_viewed WHERE session_id = $1 \
          ORDER BY viewed_at DESC LIMIT $2)",
    )
    .bind(&session)
    .bind(RECENTLY_VIEWED_CAP)
    .execute(&s.db)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_recently_viewed(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT p.* FROM recently_viewed rv JOIN products p ON p.id = rv.product_id \
         WHERE rv.session_id = $1 AND p.status = 'active' ORDER BY rv.viewed_at DESC",
    )
    .bind(&session)
    .fetch_all(&s.db)
    .await?;
    Ok(Json(products))
}
