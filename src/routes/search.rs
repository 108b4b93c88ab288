//! Catalog search. The active catalog is small enough to scan and rank in
//! memory on every request; debouncing keystrokes is the client's job.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::domain::catalog::Product;
use crate::domain::search;
use crate::state::AppState;
use crate::Result;

pub fn router() -> Router<AppState> {
    Router::new().route("/search", get(search_products))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

async fn search_products(
    State(s): State<AppState>,
    Query(p): Query<SearchParams>,
) -> Result<Json<Vec<Product>>> {
    let query = p.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let catalog = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE status = 'active' ORDER BY created_at DESC",
    )
    .fetch_all(&s.db)
    .await?;
    Ok(Json(search::rank(catalog, &query)))
}
