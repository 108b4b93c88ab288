//! Customer order view, payment claims, and the admin order console.

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::events::StoreEvent;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::routes::PaginatedResponse;
use crate::state::AppState;
use crate::{Result, StoreError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/payment-claim", post(claim_payment))
        .route("/admin/orders", get(admin_list_orders))
        .route("/admin/orders/:id", get(admin_get_order))
        .route("/admin/orders/:id/status", patch(admin_set_status))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

async fn fetch_order(db: &PgPool, id: Uuid) -> Result<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(StoreError::OrderNotFound)
}

async fn fetch_detail(db: &PgPool, id: Uuid) -> Result<OrderDetail> {
    let order = fetch_order(db, id).await?;
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at",
    )
    .bind(id)
    .fetch_all(db)
    .await?;
    Ok(OrderDetail { order, items })
}

async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>> {
    Ok(Json(fetch_detail(&s.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct PaymentClaimRequest {
    pub reference: Option<String>,
}

/// Shopper-side "I have paid" signal, optionally carrying the UPI reference
/// from their payment app. Verification stays with the operator.
async fn claim_payment(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<PaymentClaimRequest>,
) -> Result<Json<OrderDetail>> {
    let order = fetch_order(&s.db, id).await?;
    let current = parse_status(&order)?;
    if !current.can_transition(OrderStatus::PaymentClaimed) {
        return Err(StoreError::InvalidTransition {
            from: order.status.clone(),
            to: OrderStatus::PaymentClaimed.as_str().to_string(),
        });
    }
    sqlx::query(
        "UPDATE orders SET status = $2, payment_reference = COALESCE($3, payment_reference), \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(OrderStatus::PaymentClaimed.as_str())
    .bind(&r.reference)
    .execute(&s.db)
    .await?;
    s.publish(StoreEvent::PaymentClaimed { order_id: id, reference: r.reference }).await;
    Ok(Json(fetch_detail(&s.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
}

async fn admin_list_orders(
    State(s): State<AppState>,
    Query(p): Query<AdminListParams>,
) -> Result<Json<PaginatedResponse<Order>>> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(&p.status)
    .bind(per_page as i64)
    .bind(((page - 1) * per_page) as i64)
    .fetch_all(&s.db)
    .await?;
    let total: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)")
            .bind(&p.status)
            .fetch_one(&s.db)
            .await?;
    Ok(Json(PaginatedResponse { data: orders, total: total.0, page }))
}

async fn admin_get_order(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(fetch_detail(&s.db, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

async fn admin_set_status(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<SetStatusRequest>,
) -> Result<Json<Order>> {
    let next = OrderStatus::parse(&r.status)
        .ok_or_else(|| StoreError::Validation(format!("unknown status {}", r.status)))?;
    let order = fetch_order(&s.db, id).await?;
    let current = parse_status(&order)?;
    if !current.can_transition(next) {
        return Err(StoreError::InvalidTransition {
            from: order.status.clone(),
            to: next.as_str().to_string(),
        });
    }
    let updated = sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(next.as_str())
    .fetch_one(&s.db)
    .await?;
    s.publish(StoreEvent::OrderStatusChanged {
        order_id: id,
        from: order.status.clone(),
        to: updated.status.clone(),
    })
    .await;
    Ok(Json(updated))
}

fn parse_status(order: &Order) -> Result<OrderStatus> {
    order
        .status()
        .ok_or_else(|| StoreError::Validation(format!("order has unknown status {}", order.status)))
}
