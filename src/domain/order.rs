//! Orders: checkout snapshots plus the payment-verification lifecycle.
//!
//! Payment is a manual UPI flow: the shopper scans the QR, pays, and sends a
//! WhatsApp confirmation; an operator verifies the transfer before the order
//! moves to `paid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    AwaitingPayment,
    PaymentClaimed,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "awaiting_payment",
            Self::PaymentClaimed => "payment_claimed",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "awaiting_payment" => Some(Self::AwaitingPayment),
            "payment_claimed" => Some(Self::PaymentClaimed),
            "paid" => Some(Self::Paid),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Forward transitions only; cancellation is allowed until delivery.
    pub fn can_transition(self, next: Self) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (AwaitingPayment, PaymentClaimed | Paid) => true,
            (PaymentClaimed, Paid) => true,
            (Paid, Shipped) => true,
            (Shipped, Delivered) => true,
            (AwaitingPayment | PaymentClaimed | Paid | Shipped, Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub session_id: String,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub status: String,
    pub subtotal: i64,
    pub packaging_charges: i64,
    pub discount: i64,
    pub total: i64,
    pub coupon_code: Option<String>,
    pub free_shipping: bool,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }
}

/// Immutable line snapshot taken at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub color: Option<String>,
    pub packaging: String,
    pub packaging_fee: i64,
    pub line_total: i64,
    pub created_at: DateTime<Utc>,
}
