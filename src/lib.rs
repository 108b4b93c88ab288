//! Meher Store
//!
//! Self-hosted direct-to-consumer storefront backend.
//!
//! ## Features
//! - Product catalog with fuzzy search
//! - Session carts with packaging options and coupons
//! - Manual UPI-QR + WhatsApp checkout flow
//! - Wishlist and recently-viewed tracking
//! - Minimal admin console (catalog CRUD, order verification)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::domain::pricing::CouponError;

pub mod config;
pub mod domain;
pub mod routes;
pub mod state;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("product not found")]
    ProductNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("cart item not found")]
    CartItemNotFound,

    #[error("cart is empty")]
    EmptyCart,

    #[error("product is out of stock")]
    OutOfStock,

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl StoreError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ProductNotFound | Self::OrderNotFound | Self::CartItemNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::EmptyCart | Self::OutOfStock | Self::Coupon(_) | Self::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{self}");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
