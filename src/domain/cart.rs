//! Session cart: catalog-joined lines plus the (at most one) active coupon.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::pricing::{self, AppliedCoupon, CouponError, PackagingOption, Totals};

/// One product entry in a cart, with quantity and selected options. Unit
/// price and category are resolved from the live catalog when the cart is
/// loaded, so price edits reprice open carts.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub category: String,
    pub image: Option<String>,
    pub unit_price: i64,
    pub quantity: u32,
    pub color: Option<String>,
    pub packaging: PackagingOption,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.unit_price * i64::from(self.quantity)
    }

    pub fn packaging_total(&self) -> i64 {
        self.packaging.fee() * i64::from(self.quantity)
    }
}

/// Cart state for one session. The coupon is an optional single slot, never
/// a set of flags, so invalid combinations cannot be represented.
#[derive(Clone, Debug)]
pub struct Cart {
    pub session_id: String,
    pub lines: Vec<CartLine>,
    pub coupon: Option<AppliedCoupon>,
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), lines: Vec::new(), coupon: None }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        pricing::total_quantity(&self.lines)
    }

    /// Totals for the current lines and coupon. Call [`Cart::enforce_coupon`]
    /// first after any mutation so a stale coupon cannot discount.
    pub fn totals(&self) -> Totals {
        pricing::compute_totals(&self.lines, self.coupon.as_ref())
    }

    pub fn apply_coupon(&mut self, code: &str) -> Result<AppliedCoupon, CouponError> {
        let applied = pricing::apply(code, &self.lines)?;
        self.coupon = Some(applied.clone());
        Ok(applied)
    }

    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    /// Standing invariant: a coupon whose eligibility no longer holds is
    /// cleared. Returns the user-facing reason when one was dropped.
    pub fn enforce_coupon(&mut self) -> Option<String> {
        let applied = self.coupon.take()?;
        match pricing::revalidate(&applied, &self.lines) {
            Ok(()) => {
                self.coupon = Some(applied);
                None
            }
            Err(reason) => Some(format!("coupon {} removed: {reason}", applied.code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: u32, category: &str) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Test".into(),
            category: category.into(),
            image: None,
            unit_price: price,
            quantity,
            color: None,
            packaging: PackagingOption::Without,
        }
    }

    #[test]
    fn totals_follow_lines_and_coupon() {
        let mut cart = Cart::new("sess-1");
        cart.lines.push(line(2999, 1, "goggles"));
        cart.lines.push(line(1000, 1, "goggles"));
        cart.apply_coupon("COMBO15").unwrap();
        let t = cart.totals();
        assert_eq!(t.subtotal, 3999);
        assert_eq!(t.discount, 600); // round(3999 * 0.15) = round(599.85)
        assert_eq!(t.total, 3399);
    }

    #[test]
    fn coupon_cleared_when_cart_shrinks_below_eligibility() {
        let mut cart = Cart::new("sess-1");
        cart.lines.push(line(500, 2, "goggles"));
        cart.apply_coupon("COMBO15").unwrap();
        assert!(cart.enforce_coupon().is_none());

        cart.lines[0].quantity = 1;
        let notice = cart.enforce_coupon().expect("coupon should be dropped");
        assert!(notice.contains("COMBO15"));
        assert!(cart.coupon.is_none());
        assert_eq!(cart.totals().discount, 0);
    }

    #[test]
    fn rejection_leaves_cart_unchanged() {
        let mut cart = Cart::new("sess-1");
        cart.lines.push(line(500, 1, "goggles"));
        assert!(cart.apply_coupon("WATCH15").is_err());
        assert!(cart.coupon.is_none());
        assert_eq!(cart.totals().discount, 0);
    }

    #[test]
    fn replacing_a_coupon_keeps_a_single_slot() {
        let mut cart = Cart::new("sess-1");
        cart.lines.push(line(500, 2, "watches"));
        cart.apply_coupon("COMBO15").unwrap();
        cart.apply_coupon("WATCH15").unwrap();
        assert_eq!(cart.coupon.as_ref().map(|c| c.code.as_str()), Some("WATCH15"));
    }
}
