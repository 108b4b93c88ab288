//! Catalog browsing plus the admin CRUD console.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::catalog::Product;
use crate::domain::events::StoreEvent;
use crate::routes::PaginatedResponse;
use crate::state::AppState;
use crate::{Result, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/categories", get(list_categories))
        .route("/admin/products", post(create_product))
        .route("/admin/products/:id", put(update_product).delete(archive_product))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

async fn list_products(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE status = 'active' \
         AND ($1::text IS NULL OR category = $1) \
         AND ($2::boolean IS NULL OR featured = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(&p.category)
    .bind(p.featured)
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE status = 'active' \
         AND ($1::text IS NULL OR category = $1) \
         AND ($2::boolean IS NULL OR featured = $2)",
    )
    .bind(&p.category)
    .bind(p.featured)
    .fetch_one(&s.db)
    .await?;
    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND status = 'active'")
        .bind(id)
        .fetch_optional(&s.db)
        .await?
        .map(Json)
        .ok_or(StoreError::ProductNotFound)
}

async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<String>>> {
    let categories: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT category FROM products WHERE status = 'active' ORDER BY category",
    )
    .fetch_all(&s.db)
    .await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub category: String,
    pub brand: Option<String>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub in_stock: Option<bool>,
}

async fn create_product(
    State(s): State<AppState>,
    Json(r): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    let p = sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, description, price, original_price, category, brand, \
         images, colors, featured, in_stock, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'active', NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(r.description.unwrap_or_default())
    .bind(r.price)
    .bind(r.original_price)
    .bind(&r.category)
    .bind(&r.brand)
    .bind(r.images.unwrap_or_default())
    .bind(r.colors.unwrap_or_default())
    .bind(r.featured.unwrap_or(false))
    .bind(r.in_stock.unwrap_or(true))
    .fetch_one(&s.db)
    .await?;
    s.publish(StoreEvent::ProductCreated { product_id: p.id, name: p.name.clone() }).await;
    Ok((StatusCode::CREATED, Json(p)))
}

async fn update_product(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<ProductPayload>,
) -> Result<Json<Product>> {
    let p = sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, description = $3, price = $4, original_price = $5, \
         category = $6, brand = $7, images = $8, colors = $9, featured = $10, in_stock = $11, \
         updated_at = NOW() WHERE id = $1 AND status = 'active' RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(r.description.unwrap_or_default())
    .bind(r.price)
    .bind(r.original_price)
    .bind(&r.category)
    .bind(&r.brand)
    .bind(r.images.unwrap_or_default())
    .bind(r.colors.unwrap_or_default())
    .bind(r.featured.unwrap_or(false))
    .bind(r.in_stock.unwrap_or(true))
    .fetch_optional(&s.db)
    .await?
    .ok_or(StoreError::ProductNotFound)?;
    s.publish(StoreEvent::ProductUpdated { product_id: p.id }).await;
    Ok(Json(p))
}

async fn archive_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    let result = sqlx::query(
        "UPDATE products SET status = 'archived', updated_at = NOW() \
         WHERE id = $1 AND status = 'active'",
    )
    .bind(id)
    .execute(&s.db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::ProductNotFound);
    }
    s.publish(StoreEvent::ProductArchived { product_id: id }).await;
    Ok(StatusCode::NO_CONTENT)
}
