//! Checkout: turns a priced cart into an order awaiting manual UPI payment.
//!
//! The wizard's review step is the cart view; this module covers the details
//! and payment steps. The response carries the UPI intent (for the QR) and
//! the prefilled WhatsApp confirmation link.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::checkout::{payment_handoff, PaymentHandoff};
use crate::domain::events::StoreEvent;
use crate::domain::order::{Order, OrderItem};
use crate::routes::cart;
use crate::state::AppState;
use crate::{Result, StoreError};

pub fn router() -> Router<AppState> {
    Router::new().route("/checkout", post(checkout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 64))]
    pub session: String,
    #[validate(length(min = 2, max = 120))]
    pub customer_name: String,
    #[validate(length(min = 10, max = 15))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 200))]
    pub address_line1: String,
    #[validate(length(max = 200))]
    pub address_line2: Option<String>,
    #[validate(length(min = 2, max = 80))]
    pub city: String,
    #[validate(length(min = 2, max = 80))]
    pub state: String,
    #[validate(length(min = 6, max = 6))]
    pub pincode: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payment: PaymentHandoff,
}

async fn checkout(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    r.validate()?;

    let mut cart = cart::load_cart(&s.db, &r.session).await?;
    if cart.enforce_coupon().is_some() {
        cart::clear_session_coupon(&s.db, &r.session).await?;
    }
    if cart.is_empty() {
        return Err(StoreError::EmptyCart);
    }
    let totals = cart.totals();

    let mut tx = s.db.begin().await?;
    let order_id = Uuid::now_v7();
    let order_number = format!("ORD-{:08}", rand::random::<u32>() % 100_000_000);
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, order_number, session_id, customer_name, phone, email, \
         address_line1, address_line2, city, state, pincode, status, subtotal, \
         packaging_charges, discount, total, coupon_code, free_shipping, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'awaiting_payment', \
         $12, $13, $14, $15, $16, $17, NOW(), NOW()) RETURNING *",
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(&r.session)
    .bind(&r.customer_name)
    .bind(&r.phone)
    .bind(&r.email)
    .bind(&r.address_line1)
    .bind(&r.address_line2)
    .bind(&r.city)
    .bind(&r.state)
    .bind(&r.pincode)
    .bind(totals.subtotal)
    .bind(totals.packaging_charges)
    .bind(totals.discount)
    .bind(totals.total)
    .bind(cart.coupon.as_ref().map(|c| c.code.as_str()))
    .bind(totals.free_shipping)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(cart.lines.len());
    for line in &cart.lines {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (id, order_id, product_id, name, unit_price, quantity, \
             color, packaging, packaging_fee, line_total, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(line.quantity as i32)
        .bind(&line.color)
        .bind(line.packaging.as_str())
        .bind(line.packaging.fee())
        .bind(line.line_total())
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&r.session)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM cart_sessions WHERE session_id = $1")
        .bind(&r.session)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    s.publish(StoreEvent::OrderPlaced {
        order_id,
        order_number: order.order_number.clone(),
        total: order.total,
    })
    .await;

    let cfg = &s.config;
    let payment = payment_handoff(
        &order,
        &items,
        &cfg.store_name,
        &cfg.upi_vpa,
        &cfg.upi_payee,
        &cfg.whatsapp_number,
    );
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order, items, payment })))
}
