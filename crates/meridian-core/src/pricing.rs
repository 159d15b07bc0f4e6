//! # Pricing Calculator
//!
//! Pure functions computing line totals, tax, discounts, and price
//! adjustments. No side effects, no lookups - callers fetch whatever
//! rates or flags they need first and pass them in.
//!
//! ## Where These Are Used
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PricingCalculator Callers                           │
//! │                                                                         │
//! │  callout::recalculate_line ──────► compute_line_amounts                │
//! │  callout::apply_volume_discount ─► DiscountSchedule + apply_discount   │
//! │  repricer::BatchRepricer ────────► adjust_price (×3 per record)        │
//! │                                                                         │
//! │  All rounding is half-up at cent precision; percentage intermediate    │
//! │  precision is basis points (see money module).                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};
use crate::money::Money;
use crate::types::{Adjustment, TaxRate};

// =============================================================================
// Line Amounts
// =============================================================================

/// The derived monetary fields of one order line.
///
/// Invariant: `total == net + tax`, with `tax` being the only rounded term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// quantity × unit price, exact.
    pub net: Money,
    /// net × rate / 100, rounded half-up to cents. Zero without a rate.
    pub tax: Money,
    /// net + tax.
    pub total: Money,
}

/// Computes net, tax, and total for one line.
///
/// ## Contract
/// - `quantity` must be > 0, `unit_price` must be ≥ 0, otherwise
///   [`CalcError`] - these are argument-domain violations, not business
///   rule outcomes.
/// - A `tax_rate` of `None` or a zero rate yields zero tax.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::compute_line_amounts;
/// use meridian_core::types::TaxRate;
///
/// let amounts =
///     compute_line_amounts(3, Money::from_cents(1000), Some(TaxRate::from_bps(1000))).unwrap();
/// assert_eq!(amounts.net.cents(), 3000);
/// assert_eq!(amounts.tax.cents(), 300);
/// assert_eq!(amounts.total.cents(), 3300);
/// ```
pub fn compute_line_amounts(
    quantity: i64,
    unit_price: Money,
    tax_rate: Option<TaxRate>,
) -> CalcResult<LineAmounts> {
    if quantity <= 0 {
        return Err(CalcError::NonPositiveQuantity { quantity });
    }
    if unit_price.is_negative() {
        return Err(CalcError::NegativePrice { price: unit_price });
    }

    let net = unit_price.multiply_quantity(quantity);
    let tax = match tax_rate {
        Some(rate) if !rate.is_zero() => net.tax_portion(rate),
        _ => Money::zero(),
    };

    Ok(LineAmounts {
        net,
        tax,
        total: net + tax,
    })
}

// =============================================================================
// Discount Schedule
// =============================================================================

/// Tiered volume discount plus a special-customer bonus, in basis points.
///
/// The default schedule reproduces the historical behavior: 5% from 10
/// units, 10% from 50 units, +5% flat for special customers, with NO cap -
/// so a special customer at 50 units gets 15%, which exceeds the 50% line
/// discount the order-line validator allows elsewhere only because the cap
/// is `None` here. Hosts that want the validator and the schedule to
/// agree set `cap_bps` to the validator's ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountSchedule {
    /// Quantity from which the first tier applies.
    pub bulk_threshold: i64,
    /// First-tier discount.
    pub bulk_bps: u32,
    /// Quantity from which the second tier replaces the first.
    pub volume_threshold: i64,
    /// Second-tier discount.
    pub volume_bps: u32,
    /// Additive bonus for special customers.
    pub special_bonus_bps: u32,
    /// Optional ceiling on the combined discount.
    pub cap_bps: Option<u32>,
}

impl Default for DiscountSchedule {
    fn default() -> Self {
        DiscountSchedule {
            bulk_threshold: 10,
            bulk_bps: 500,
            volume_threshold: 50,
            volume_bps: 1000,
            special_bonus_bps: 500,
            cap_bps: None,
        }
    }
}

impl DiscountSchedule {
    /// Combined discount for a quantity, in basis points.
    ///
    /// Tiers replace each other (the 10% tier supersedes the 5% tier); the
    /// special-customer bonus is additive on top.
    pub fn discount_for(&self, quantity: i64, special_customer: bool) -> u32 {
        let mut discount = 0;
        if quantity >= self.bulk_threshold {
            discount = self.bulk_bps;
        }
        if quantity >= self.volume_threshold {
            discount = self.volume_bps;
        }
        if special_customer {
            discount += self.special_bonus_bps;
        }
        match self.cap_bps {
            Some(cap) => discount.min(cap),
            None => discount,
        }
    }
}

// =============================================================================
// Discount Application
// =============================================================================

/// Result of applying a percentage discount to a list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discounted {
    /// list price × discount / 100, rounded half-up.
    pub discount_amount: Money,
    /// list price − discount amount.
    pub net_price: Money,
}

/// Applies a basis-point discount to a list price.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::apply_discount;
///
/// let d = apply_discount(Money::from_cents(10000), 1500); // 15% off 100.00
/// assert_eq!(d.discount_amount.cents(), 1500);
/// assert_eq!(d.net_price.cents(), 8500);
/// ```
pub fn apply_discount(list_price: Money, discount_bps: u32) -> Discounted {
    let discount_amount = list_price.scaled_by_bps(discount_bps as i64);
    Discounted {
        discount_amount,
        net_price: list_price - discount_amount,
    }
}

// =============================================================================
// Price Adjustment
// =============================================================================

/// Adjusts one price by the given adjustment, rounding half-up to cents.
///
/// An absent price passes through unchanged - the repricer treats a NULL
/// price column as "nothing to adjust", not as zero. A zero-valued
/// adjustment is a true no-op value: the returned price equals the input.
///
/// ## Example
/// ```rust
/// use meridian_core::money::Money;
/// use meridian_core::pricing::adjust_price;
/// use meridian_core::types::Adjustment;
///
/// let p = Money::from_cents(10000);
/// assert_eq!(
///     adjust_price(Some(p), &Adjustment::Percentage(1000)),
///     Some(Money::from_cents(11000))
/// );
/// assert_eq!(adjust_price(None, &Adjustment::Percentage(1000)), None);
/// ```
pub fn adjust_price(current: Option<Money>, adjustment: &Adjustment) -> Option<Money> {
    let current = current?;
    let adjusted = match adjustment {
        Adjustment::Percentage(bps) => current.scaled_by_bps(10_000 + bps),
        Adjustment::Fixed(amount) => current + *amount,
    };
    Some(adjusted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_amounts_total_is_net_plus_tax() {
        let amounts =
            compute_line_amounts(7, Money::from_cents(1234), Some(TaxRate::from_bps(825)))
                .unwrap();
        assert_eq!(amounts.net.cents(), 8638);
        // 8638 * 825 / 10000 = 712.635 → 713
        assert_eq!(amounts.tax.cents(), 713);
        assert_eq!(amounts.total, amounts.net + amounts.tax);
    }

    #[test]
    fn test_line_amounts_without_tax() {
        let amounts = compute_line_amounts(2, Money::from_cents(500), None).unwrap();
        assert_eq!(amounts.net.cents(), 1000);
        assert!(amounts.tax.is_zero());
        assert_eq!(amounts.total.cents(), 1000);

        let zero_rate =
            compute_line_amounts(2, Money::from_cents(500), Some(TaxRate::zero())).unwrap();
        assert!(zero_rate.tax.is_zero());
    }

    #[test]
    fn test_line_amounts_rejects_bad_input() {
        assert_eq!(
            compute_line_amounts(0, Money::from_cents(100), None),
            Err(CalcError::NonPositiveQuantity { quantity: 0 })
        );
        assert_eq!(
            compute_line_amounts(-3, Money::from_cents(100), None),
            Err(CalcError::NonPositiveQuantity { quantity: -3 })
        );
        assert_eq!(
            compute_line_amounts(1, Money::from_cents(-1), None),
            Err(CalcError::NegativePrice {
                price: Money::from_cents(-1)
            })
        );
    }

    #[test]
    fn test_free_items_are_allowed() {
        let amounts =
            compute_line_amounts(5, Money::zero(), Some(TaxRate::from_bps(1000))).unwrap();
        assert!(amounts.total.is_zero());
    }

    #[test]
    fn test_discount_tiers() {
        let schedule = DiscountSchedule::default();
        assert_eq!(schedule.discount_for(9, false), 0);
        assert_eq!(schedule.discount_for(10, false), 500);
        assert_eq!(schedule.discount_for(49, false), 500);
        assert_eq!(schedule.discount_for(50, false), 1000);
        assert_eq!(schedule.discount_for(10, true), 1000);
    }

    #[test]
    fn test_discount_uncapped_by_default() {
        let schedule = DiscountSchedule::default();
        // Special customer at the volume tier stacks to 15%
        assert_eq!(schedule.discount_for(50, true), 1500);
    }

    #[test]
    fn test_discount_cap_applies_when_configured() {
        let schedule = DiscountSchedule {
            cap_bps: Some(1200),
            ..DiscountSchedule::default()
        };
        assert_eq!(schedule.discount_for(50, true), 1200);
        assert_eq!(schedule.discount_for(10, false), 500);
    }

    #[test]
    fn test_apply_discount_rounds_half_up() {
        // 12.34% of 9.99: 999 * 1234 / 10000 = 123.2766 → 123
        let d = apply_discount(Money::from_cents(999), 1234);
        assert_eq!(d.discount_amount.cents(), 123);
        assert_eq!(d.net_price.cents(), 876);
    }

    #[test]
    fn test_adjust_price_percentage() {
        let p = Money::from_cents(10000);
        assert_eq!(
            adjust_price(Some(p), &Adjustment::Percentage(1000)),
            Some(Money::from_cents(11000))
        );
        assert_eq!(
            adjust_price(Some(p), &Adjustment::Percentage(-1000)),
            Some(Money::from_cents(9000))
        );
    }

    #[test]
    fn test_adjust_price_fixed() {
        let p = Money::from_cents(10000);
        assert_eq!(
            adjust_price(Some(p), &Adjustment::Fixed(Money::from_cents(1000))),
            Some(Money::from_cents(11000))
        );
    }

    #[test]
    fn test_adjust_price_absent_passthrough() {
        assert_eq!(adjust_price(None, &Adjustment::Percentage(1000)), None);
        assert_eq!(adjust_price(None, &Adjustment::Fixed(Money::from_cents(1))), None);
    }

    #[test]
    fn test_adjust_price_zero_is_true_noop() {
        let p = Money::from_cents(9999);
        assert_eq!(adjust_price(Some(p), &Adjustment::Fixed(Money::zero())), Some(p));
        assert_eq!(adjust_price(Some(p), &Adjustment::Percentage(0)), Some(p));
    }

    #[test]
    fn test_adjust_price_fractional_percentage_rounds() {
        // 9.99 +5% = 10.4895 → 10.49
        let p = Money::from_cents(999);
        assert_eq!(
            adjust_price(Some(p), &Adjustment::Percentage(500)),
            Some(Money::from_cents(1049))
        );
    }
}
