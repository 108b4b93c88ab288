//! Cart pricing: subtotal, packaging charges, coupon discounts.
//!
//! Pure functions over in-memory cart lines. All amounts are whole rupees;
//! callers guarantee `quantity >= 0` and `price >= 0`. The final total is
//! always `max(0, base - discount)` and the discount never exceeds the base.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::cart::CartLine;

/// Minimum order value (subtotal + packaging) for free shipping.
pub const FREE_SHIPPING_MIN: i64 = 799;

/// Presentation-box upgrade chosen per cart line, priced per unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagingOption {
    #[default]
    Without,
    Indian,
    Imported,
}

impl PackagingOption {
    pub fn fee(self) -> i64 {
        match self {
            Self::Without => 0,
            Self::Indian => 70,
            Self::Imported => 250,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Without => "without",
            Self::Indian => "indian",
            Self::Imported => "imported",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "without" => Some(Self::Without),
            "indian" => Some(Self::Indian),
            "imported" => Some(Self::Imported),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    PercentOff(u32),
    FreeShipping,
}

/// Eligibility predicate a coupon checks against the current cart.
#[derive(Clone, Copy, Debug)]
pub enum Eligibility {
    MinTotalQuantity(u32),
    RequiresCategory(&'static str),
    MinBaseAmount(i64),
}

pub struct Coupon {
    pub code: &'static str,
    pub kind: CouponKind,
    pub eligibility: Eligibility,
    pub description: &'static str,
}

/// The statically enumerated coupon catalog. At most one coupon is active on
/// a cart at a time.
pub const COUPONS: &[Coupon] = &[
    Coupon {
        code: "COMBO15",
        kind: CouponKind::PercentOff(15),
        eligibility: Eligibility::MinTotalQuantity(2),
        description: "15% off when you buy 2 or more items",
    },
    Coupon {
        code: "WATCH15",
        kind: CouponKind::PercentOff(15),
        eligibility: Eligibility::RequiresCategory("watches"),
        description: "15% off on carts with a watch",
    },
    Coupon {
        code: "FREESHIP",
        kind: CouponKind::FreeShipping,
        eligibility: Eligibility::MinBaseAmount(FREE_SHIPPING_MIN),
        description: "Free shipping on orders of \u{20b9}799 or more",
    },
];

/// A coupon accepted onto a cart session. Only the code is persisted; the
/// kind is re-resolved from [`COUPONS`] when a session is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub kind: CouponKind,
}

/// Recoverable, user-facing rejection. Display strings are shown verbatim to
/// the shopper.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("coupon code {0} is not valid")]
    UnknownCode(String),
    #[error("add at least {0} items to your cart to use this coupon")]
    MinQuantity(u32),
    #[error("this coupon needs a {0} item in your cart")]
    RequiresCategory(&'static str),
    #[error("this coupon needs an order of \u{20b9}{0} or more")]
    MinOrderValue(i64),
}

/// Computed cart totals, all in whole rupees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: i64,
    pub packaging_charges: i64,
    pub discount: i64,
    pub total: i64,
    pub free_shipping: bool,
}

pub fn find(code: &str) -> Option<&'static Coupon> {
    let code = code.trim();
    COUPONS.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Validate `code` against the cart and return the coupon to store on the
/// session. Rejections carry the rule that failed.
pub fn apply(code: &str, lines: &[CartLine]) -> Result<AppliedCoupon, CouponError> {
    let coupon = find(code).ok_or_else(|| CouponError::UnknownCode(code.trim().to_uppercase()))?;
    check_eligibility(coupon, lines)?;
    Ok(AppliedCoupon { code: coupon.code.to_string(), kind: coupon.kind })
}

/// Standing invariant check: an already-applied coupon must still be eligible
/// for the current cart contents. Run on every cart load or mutation.
pub fn revalidate(applied: &AppliedCoupon, lines: &[CartLine]) -> Result<(), CouponError> {
    let coupon =
        find(&applied.code).ok_or_else(|| CouponError::UnknownCode(applied.code.clone()))?;
    check_eligibility(coupon, lines)
}

fn check_eligibility(coupon: &Coupon, lines: &[CartLine]) -> Result<(), CouponError> {
    match coupon.eligibility {
        Eligibility::MinTotalQuantity(min) => {
            if total_quantity(lines) >= min {
                Ok(())
            } else {
                Err(CouponError::MinQuantity(min))
            }
        }
        Eligibility::RequiresCategory(category) => {
            if lines.iter().any(|l| l.category.eq_ignore_ascii_case(category)) {
                Ok(())
            } else {
                Err(CouponError::RequiresCategory(category))
            }
        }
        Eligibility::MinBaseAmount(min) => {
            if base_amount(lines) >= min {
                Ok(())
            } else {
                Err(CouponError::MinOrderValue(min))
            }
        }
    }
}

/// Subtotal, packaging and discount for the given lines and active coupon.
///
/// Pure and idempotent; eligibility is the caller's concern (see
/// [`revalidate`]), this only resolves the arithmetic.
pub fn compute_totals(lines: &[CartLine], coupon: Option<&AppliedCoupon>) -> Totals {
    let subtotal: i64 = lines.iter().map(CartLine::line_total).sum();
    let packaging_charges: i64 = lines.iter().map(CartLine::packaging_total).sum();
    let base = subtotal + packaging_charges;
    let (discount, free_shipping) = match coupon.map(|c| c.kind) {
        Some(CouponKind::PercentOff(percent)) => (percent_of(base, percent).min(base), false),
        Some(CouponKind::FreeShipping) => (0, true),
        None => (0, false),
    };
    Totals {
        subtotal,
        packaging_charges,
        discount,
        total: (base - discount).max(0),
        free_shipping,
    }
}

pub fn total_quantity(lines: &[CartLine]) -> u32 {
    lines.iter().map(|l| l.quantity).sum()
}

fn base_amount(lines: &[CartLine]) -> i64 {
    lines.iter().map(|l| l.line_total() + l.packaging_total()).sum()
}

/// Half-up integer rounding of `base * percent / 100`.
fn percent_of(base: i64, percent: u32) -> i64 {
    (base * i64::from(percent) + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn line(price: i64, quantity: u32, packaging: PackagingOption, category: &str) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            name: "Test".into(),
            category: category.into(),
            image: None,
            unit_price: price,
            quantity,
            color: None,
            packaging,
        }
    }

    #[test]
    fn packaging_fees() {
        assert_eq!(PackagingOption::Without.fee(), 0);
        assert_eq!(PackagingOption::Indian.fee(), 70);
        assert_eq!(PackagingOption::Imported.fee(), 250);
    }

    #[test]
    fn totals_without_coupon() {
        let lines = [line(2999, 1, PackagingOption::Indian, "goggles")];
        let t = compute_totals(&lines, None);
        assert_eq!(t.subtotal, 2999);
        assert_eq!(t.packaging_charges, 70);
        assert_eq!(t.discount, 0);
        assert_eq!(t.total, 3069);
        assert!(!t.free_shipping);
    }

    #[test]
    fn packaging_charged_per_unit() {
        let lines = [line(500, 3, PackagingOption::Imported, "goggles")];
        let t = compute_totals(&lines, None);
        assert_eq!(t.subtotal, 1500);
        assert_eq!(t.packaging_charges, 750);
    }

    #[test]
    fn combo_discount_on_two_items() {
        let lines = [
            line(2999, 1, PackagingOption::Indian, "goggles"),
            line(1500, 1, PackagingOption::Without, "goggles"),
        ];
        let applied = apply("COMBO15", &lines).unwrap();
        let t = compute_totals(&lines, Some(&applied));
        // base 4569, 15% = 685.35 -> 685
        assert_eq!(t.discount, 685);
        assert_eq!(t.total, 3884);
    }

    #[test]
    fn combo_rejected_on_single_item() {
        let lines = [line(2999, 1, PackagingOption::Without, "goggles")];
        let err = apply("COMBO15", &lines).unwrap_err();
        assert_eq!(err, CouponError::MinQuantity(2));
    }

    #[test]
    fn combo_counts_quantity_not_lines() {
        let lines = [line(999, 2, PackagingOption::Without, "goggles")];
        assert!(apply("COMBO15", &lines).is_ok());
    }

    #[test]
    fn watch_coupon_needs_a_watch() {
        let goggles = [line(2999, 1, PackagingOption::Without, "goggles")];
        assert_eq!(
            apply("WATCH15", &goggles).unwrap_err(),
            CouponError::RequiresCategory("watches")
        );

        let watches = [line(2999, 1, PackagingOption::Without, "watches")];
        let applied = apply("WATCH15", &watches).unwrap();
        let t = compute_totals(&watches, Some(&applied));
        assert_eq!(t.discount, 450); // round(2999 * 0.15) = round(449.85)
    }

    #[test]
    fn free_shipping_threshold_is_inclusive() {
        let at = [line(799, 1, PackagingOption::Without, "goggles")];
        let applied = apply("FREESHIP", &at).unwrap();
        let t = compute_totals(&at, Some(&applied));
        assert_eq!(t.discount, 0);
        assert_eq!(t.total, 799);
        assert!(t.free_shipping);

        let below = [line(798, 1, PackagingOption::Without, "goggles")];
        assert_eq!(
            apply("FREESHIP", &below).unwrap_err(),
            CouponError::MinOrderValue(FREE_SHIPPING_MIN)
        );
    }

    #[test]
    fn free_shipping_counts_packaging_toward_threshold() {
        let lines = [line(750, 1, PackagingOption::Indian, "goggles")];
        assert!(apply("FREESHIP", &lines).is_ok()); // base 820
    }

    #[test]
    fn unknown_code_rejected() {
        let lines = [line(100, 1, PackagingOption::Without, "goggles")];
        assert_eq!(
            apply("nope42", &lines).unwrap_err(),
            CouponError::UnknownCode("NOPE42".into())
        );
    }

    #[test]
    fn code_is_case_insensitive() {
        let lines = [line(100, 2, PackagingOption::Without, "goggles")];
        let applied = apply("  combo15 ", &lines).unwrap();
        assert_eq!(applied.code, "COMBO15");
    }

    #[test]
    fn revalidate_fails_after_quantity_drops() {
        let two = [line(100, 2, PackagingOption::Without, "goggles")];
        let applied = apply("COMBO15", &two).unwrap();
        let one = [line(100, 1, PackagingOption::Without, "goggles")];
        assert!(revalidate(&applied, &two).is_ok());
        assert_eq!(revalidate(&applied, &one).unwrap_err(), CouponError::MinQuantity(2));
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(percent_of(10, 15), 2); // 1.5 rounds up
        assert_eq!(percent_of(9, 15), 1); // 1.35 rounds down
        assert_eq!(percent_of(0, 15), 0);
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let t = compute_totals(&[], None);
        assert_eq!(t, Totals::default());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_packaging() -> impl Strategy<Value = PackagingOption> {
            prop_oneof![
                Just(PackagingOption::Without),
                Just(PackagingOption::Indian),
                Just(PackagingOption::Imported),
            ]
        }

        fn any_lines() -> impl Strategy<Value = Vec<CartLine>> {
            prop::collection::vec(
                (0i64..50_000, 0u32..6, any_packaging(), prop_oneof![
                    Just("goggles"),
                    Just("watches"),
                    Just("wallets")
                ]),
                0..8,
            )
            .prop_map(|specs| {
                specs
                    .into_iter()
                    .map(|(price, qty, packaging, category)| line(price, qty, packaging, category))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn discount_never_exceeds_base_and_total_is_nonnegative(
                lines in any_lines(),
                code in prop_oneof![Just("COMBO15"), Just("WATCH15"), Just("FREESHIP")],
            ) {
                let coupon = apply(code, &lines).ok();
                let t = compute_totals(&lines, coupon.as_ref());
                let base = t.subtotal + t.packaging_charges;
                prop_assert!(t.discount <= base);
                prop_assert!(t.total >= 0);
                prop_assert_eq!(t.total, (base - t.discount).max(0));
            }

            #[test]
            fn compute_totals_is_pure(lines in any_lines()) {
                let coupon = apply("COMBO15", &lines).ok();
                prop_assert_eq!(
                    compute_totals(&lines, coupon.as_ref()),
                    compute_totals(&lines, coupon.as_ref())
                );
            }
        }
    }
}
