//! Session cart endpoints. Every read or mutation re-runs the coupon
//! re-validation invariant before totals are returned.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};
use crate::domain::catalog::Product;
use crate::domain::pricing::{self, AppliedCoupon, CouponKind, PackagingOption, Totals, COUPONS};
use crate::state::AppState;
use crate::{Result, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart/:session", get(get_cart).post(add_item).delete(clear_cart))
        .route("/cart/:session/items/:item_id", patch(update_item).delete(remove_item))
        .route("/cart/:session/coupon", post(apply_coupon).delete(remove_coupon))
        .route("/coupons", get(list_coupons))
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: Uuid,
    product_id: Uuid,
    name: String,
    category: String,
    image: Option<String>,
    unit_price: i64,
    quantity: i32,
    color: String,
    packaging: String,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            item_id: row.item_id,
            product_id: row.product_id,
            name: row.name,
            category: row.category,
            image: row.image,
            unit_price: row.unit_price,
            quantity: row.quantity.max(0) as u32,
            color: (!row.color.is_empty()).then_some(row.color),
            packaging: PackagingOption::parse(&row.packaging).unwrap_or_default(),
        }
    }
}

/// Rebuild the session cart from storage, joining the live catalog for
/// names, categories and current prices.
pub(crate) async fn load_cart(db: &PgPool, session: &str) -> Result<Cart> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT ci.id AS item_id, ci.product_id, p.name, p.category, p.images[1] AS image, \
         p.price AS unit_price, ci.quantity, ci.color, ci.packaging \
         FROM cart_items ci JOIN products p ON p.id = ci.product_id \
         WHERE ci.session_id = $1 AND p.status = 'active' \
         ORDER BY ci.created_at",
    )
    .bind(session)
    .fetch_all(db)
    .await?;

    let coupon_code: Option<String> =
        sqlx::query_scalar("SELECT coupon_code FROM cart_sessions WHERE session_id = $1")
            .bind(session)
            .fetch_optional(db)
            .await?
            .flatten();

    let mut cart = Cart::new(session);
    cart.lines = rows.into_iter().map(Into::into).collect();
    cart.coupon = coupon_code
        .as_deref()
        .and_then(pricing::find)
        .map(|c| AppliedCoupon { code: c.code.to_string(), kind: c.kind });
    Ok(cart)
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub session_id: String,
    pub lines: Vec<CartLine>,
    pub totals: Totals,
    pub coupon: Option<AppliedCoupon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_notice: Option<String>,
}

pub(crate) async fn cart_view(db: &PgPool, session: &str) -> Result<CartView> {
    let mut cart = load_cart(db, session).await?;
    let coupon_notice = cart.enforce_coupon();
    if coupon_notice.is_some() {
        clear_session_coupon(db, session).await?;
    }
    let totals = cart.totals();
    Ok(CartView {
        session_id: cart.session_id,
        lines: cart.lines,
        totals,
        coupon: cart.coupon,
        coupon_notice,
    })
}

pub(crate) async fn clear_session_coupon(db: &PgPool, session: &str) -> Result<()> {
    sqlx::query("UPDATE cart_sessions SET coupon_code = NULL, updated_at = NOW() WHERE session_id = $1")
        .bind(session)
        .execute(db)
        .await?;
    Ok(())
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>> {
    Ok(Json(cart_view(&s.db, &session).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: Option<u32>,
    pub color: Option<String>,
    pub packaging: Option<PackagingOption>,
}

async fn add_item(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND status = 'active'")
            .bind(r.product_id)
            .fetch_optional(&s.db)
            .await?
            .ok_or(StoreError::ProductNotFound)?;
    if !product.in_stock {
        return Err(StoreError::OutOfStock);
    }
    let color = r.color.unwrap_or_default();
    if !color.is_empty() && !product.colors.iter().any(|c| c.eq_ignore_ascii_case(&color)) {
        return Err(StoreError::Validation(format!(
            "{} is not available in {color}",
            product.name
        )));
    }
    let quantity = r.quantity.unwrap_or(1).clamp(1, 99) as i32;
    let packaging = r.packaging.unwrap_or_default();
    sqlx::query(
        "INSERT INTO cart_items (id, session_id, product_id, quantity, color, packaging, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW()) \
         ON CONFLICT (session_id, product_id, color, packaging) \
         DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
    )
    .bind(Uuid::now_v7())
    .bind(&session)
    .bind(r.product_id)
    .bind(quantity)
    .bind(&color)
    .bind(packaging.as_str())
    .execute(&s.db)
    .await?;
    Ok((StatusCode::CREATED, Json(cart_view(&s.db, &session).await?)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

async fn update_item(
    State(s): State<AppState>,
    Path((session, item_id)): Path<(String, Uuid)>,
    Json(r): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let result = if r.quantity == 0 {
        sqlx::query("DELETE FROM cart_items WHERE id = $1 AND session_id = $2")
            .bind(item_id)
            .bind(&session)
            .execute(&s.db)
            .await?
    } else {
        sqlx::query("UPDATE cart_items SET quantity = $3 WHERE id = $1 AND session_id = $2")
            .bind(item_id)
            .bind(&session)
            .bind(r.quantity.min(99) as i32)
            .execute(&s.db)
            .await?
    };
    if result.rows_affected() == 0 {
        return Err(StoreError::CartItemNotFound);
    }
    Ok(Json(cart_view(&s.db, &session).await?))
}

async fn remove_item(
    State(s): State<AppState>,
    Path((session, item_id)): Path<(String, Uuid)>,
) -> Result<Json<CartView>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND session_id = $2")
        .bind(item_id)
        .bind(&session)
        .execute(&s.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::CartItemNotFound);
    }
    Ok(Json(cart_view(&s.db, &session).await?))
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1").bind(&session).execute(&s.db).await?;
    sqlx::query("DELETE FROM cart_sessions WHERE session_id = $1").bind(&session).execute(&s.db).await?;
    Ok(Json(cart_view(&s.db, &session).await?))
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

async fn apply_coupon(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<ApplyCouponRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&s.db, &session).await?;
    // rejection propagates as 422 with the rule that failed; the stored cart
    // is untouched so previous totals stand
    let applied = cart.apply_coupon(&r.code)?;
    sqlx::query(
        "INSERT INTO cart_sessions (session_id, coupon_code, updated_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT (session_id) DO UPDATE SET coupon_code = EXCLUDED.coupon_code, updated_at = NOW()",
    )
    .bind(&session)
    .bind(&applied.code)
    .execute(&s.db)
    .await?;
    Ok(Json(cart_view(&s.db, &session).await?))
}

async fn remove_coupon(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartView>> {
    clear_session_coupon(&s.db, &session).await?;
    Ok(Json(cart_view(&s.db, &session).await?))
}

#[derive(Debug, Serialize)]
pub struct CouponInfo {
    pub code: &'static str,
    pub kind: CouponKind,
    pub description: &'static str,
}

async fn list_coupons() -> Json<Vec<CouponInfo>> {
    Json(
        COUPONS
            .iter()
            .map(|c| CouponInfo { code: c.code, kind: c.kind, description: c.description })
            .collect(),
    )
}
