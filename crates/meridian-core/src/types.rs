//! # Domain Types
//!
//! Core domain types used throughout the Meridian engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │ ValidationEvent  │   │ PriceAdjustment  │   │   PricedRecord   │    │
//! │  │ ───────────────  │   │      Spec        │   │ ───────────────  │    │
//! │  │ entity kind      │   │ ───────────────  │   │ list price       │    │
//! │  │ lifecycle phase  │   │ adjustment       │   │ standard price   │    │
//! │  └──────────────────┘   │ category filter  │   │ limit price      │    │
//! │                         │ validity window  │   │ product id       │    │
//! │  ┌──────────────────┐   └──────────────────┘   │ list-version id  │    │
//! │  │     TaxRate      │                          └──────────────────┘    │
//! │  │  ───────────────  │   Snapshot rows returned by QueryGateway:       │
//! │  │  bps (u32)       │   PartnerSnapshot, ProductSnapshot,              │
//! │  │  825 = 8.25%     │   OrderLineSnapshot, CustomerSales               │
//! │  └──────────────────┘                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entity identity is the host's integer surrogate key (`i64`); this core
//! never generates ids, it only carries them between lookups and updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25%
///
/// Basis points keep all rate math in integers; see
/// [`Money::scaled_by_bps`](crate::money::Money::scaled_by_bps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Validation Events
// =============================================================================

/// The kind of business entity a validation event targets.
///
/// Modeled as an enum rather than the host's table-name strings, so rule
/// dispatch is exhaustive and a typo cannot silently skip a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A sales order header.
    Order,
    /// A single line on a sales order.
    OrderLine,
    /// A business partner (customer/vendor master record).
    BusinessPartner,
}

/// The lifecycle phase the host is about to perform on the record.
///
/// Each phase is terminal per event: one host callback maps to one phase,
/// and there are no transitions between phases within a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Record is about to be inserted.
    BeforeNew,
    /// Record is about to be updated.
    BeforeChange,
    /// Record is about to be deleted.
    BeforeDelete,
    /// Document is about to be completed (orders only).
    BeforeComplete,
}

/// One validation event, created per host callback and consumed
/// synchronously. The target record and its changed-field set travel
/// separately as a [`RecordAccessor`](crate::record::RecordAccessor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationEvent {
    /// What kind of entity is being mutated.
    pub entity: EntityKind,
    /// Which lifecycle transition triggered the event.
    pub phase: LifecyclePhase,
}

impl ValidationEvent {
    /// Creates a new validation event.
    pub const fn new(entity: EntityKind, phase: LifecyclePhase) -> Self {
        ValidationEvent { entity, phase }
    }
}

// =============================================================================
// Price Adjustments
// =============================================================================

/// A price adjustment: how the repricer moves a price.
///
/// The mode carries its own value, so an adjustment can never be in a
/// "percentage type with amount semantics" state:
/// - `Percentage(bps)` multiplies by `(1 + bps/10000)`, e.g. `Percentage(500)`
///   is +5% and `Percentage(-1000)` is -10%.
/// - `Fixed(amount)` adds the amount directly (may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Adjustment {
    /// Relative adjustment in basis points.
    Percentage(i64),
    /// Absolute adjustment in money.
    Fixed(Money),
}

impl Adjustment {
    /// Checks whether the adjustment would leave every price unchanged.
    pub fn is_zero(&self) -> bool {
        match self {
            Adjustment::Percentage(bps) => *bps == 0,
            Adjustment::Fixed(amount) => amount.is_zero(),
        }
    }

    /// Human-readable mode name for run-report summaries.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Adjustment::Percentage(_) => "percentage",
            Adjustment::Fixed(_) => "fixed amount",
        }
    }

    /// Human-readable value for run-report summaries.
    pub fn value_display(&self) -> String {
        match self {
            Adjustment::Percentage(bps) => format!("{:.2}%", *bps as f64 / 100.0),
            Adjustment::Fixed(amount) => amount.to_string(),
        }
    }
}

/// Parameters for one batch repricing run. Immutable once the run starts.
///
/// Absent filters are omitted from the scan entirely - they are never
/// defaulted to wildcard-matching literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustmentSpec {
    /// How to move each price.
    pub adjustment: Adjustment,
    /// Restrict to products in this category.
    pub category_id: Option<i64>,
    /// Restrict to price-list versions valid from this instant or later.
    pub valid_from: Option<DateTime<Utc>>,
    /// Restrict to price-list versions valid from this instant or earlier.
    pub valid_to: Option<DateTime<Utc>>,
    /// Scan only active products (true) or only inactive ones (false).
    pub active_only: bool,
}

impl PriceAdjustmentSpec {
    /// Creates a spec with the given adjustment and no optional filters.
    pub fn new(adjustment: Adjustment) -> Self {
        PriceAdjustmentSpec {
            adjustment,
            category_id: None,
            valid_from: None,
            valid_to: None,
            active_only: true,
        }
    }

    /// Restricts the scan to one product category.
    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Restricts the scan to versions valid from `from` onwards.
    pub fn valid_from(mut self, from: DateTime<Utc>) -> Self {
        self.valid_from = Some(from);
        self
    }

    /// Restricts the scan to versions valid up to `to`.
    pub fn valid_to(mut self, to: DateTime<Utc>) -> Self {
        self.valid_to = Some(to);
        self
    }
}

/// One priced row as read from the store for a single batch iteration.
/// Transient - exists only within one repricing pass.
///
/// Any of the three prices may be absent in the store; the adjustment
/// passes absent prices through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedRecord {
    /// Owning product id.
    pub product_id: i64,
    /// Product display name (for the run-report line).
    pub product_name: String,
    /// Price-list version this row belongs to.
    pub price_list_version_id: i64,
    /// Customer-facing list price.
    pub list_price: Option<Money>,
    /// Standard selling price.
    pub standard_price: Option<Money>,
    /// Lowest permitted price.
    pub limit_price: Option<Money>,
}

/// The adjusted triple written back for one product, keyed exactly like the
/// row it came from. Persisted as a single update so the three prices can
/// never be committed partially.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub product_id: i64,
    pub price_list_version_id: i64,
    pub list_price: Option<Money>,
    pub standard_price: Option<Money>,
    pub limit_price: Option<Money>,
}

// =============================================================================
// Gateway Snapshot Rows
// =============================================================================

/// Business partner fields the rule chain needs, as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSnapshot {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub is_customer: bool,
    /// Credit ceiling; zero means "no credit check".
    pub credit_limit: Money,
    /// Credit already consumed by open orders.
    pub credit_used: Money,
}

/// Product fields the callouts and rule chain need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    /// Whether the product may appear on sales documents.
    pub is_sellable: bool,
}

/// One order line as read back for the before-complete document check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineSnapshot {
    pub id: i64,
    /// Absent for charge/description lines, which skip the stock check.
    pub product_id: Option<i64>,
    pub quantity: i64,
    /// Warehouse the line ships from.
    pub warehouse_id: i64,
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Aggregated completed-order figures for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSales {
    pub customer: String,
    pub total: Money,
    pub orders: i64,
}

impl CustomerSales {
    /// Average order value (total / orders), zero when there are no orders.
    pub fn average_ticket(&self) -> Money {
        if self.orders <= 0 {
            return Money::zero();
        }
        Money::from_cents(self.total.cents() / self.orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_adjustment_is_zero() {
        assert!(Adjustment::Percentage(0).is_zero());
        assert!(Adjustment::Fixed(Money::zero()).is_zero());
        assert!(!Adjustment::Percentage(500).is_zero());
        assert!(!Adjustment::Fixed(Money::from_cents(-100)).is_zero());
    }

    #[test]
    fn test_adjustment_display() {
        assert_eq!(Adjustment::Percentage(550).value_display(), "5.50%");
        assert_eq!(
            Adjustment::Fixed(Money::from_cents(250)).value_display(),
            "2.50"
        );
    }

    #[test]
    fn test_adjustment_wire_shape() {
        let json = serde_json::to_value(Adjustment::Percentage(500)).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "percentage", "value": 500}));

        let parsed: Adjustment =
            serde_json::from_value(serde_json::json!({"mode": "fixed", "value": 250})).unwrap();
        assert_eq!(parsed, Adjustment::Fixed(Money::from_cents(250)));
    }

    #[test]
    fn test_spec_builder_defaults() {
        let spec = PriceAdjustmentSpec::new(Adjustment::Percentage(500));
        assert!(spec.category_id.is_none());
        assert!(spec.valid_from.is_none());
        assert!(spec.valid_to.is_none());
        assert!(spec.active_only);

        let spec = spec.category(42);
        assert_eq!(spec.category_id, Some(42));
    }

    #[test]
    fn test_average_ticket() {
        let sales = CustomerSales {
            customer: "Acme".to_string(),
            total: Money::from_cents(10000),
            orders: 3,
        };
        assert_eq!(sales.average_ticket().cents(), 3333);

        let empty = CustomerSales {
            customer: "None".to_string(),
            total: Money::zero(),
            orders: 0,
        };
        assert!(empty.average_ticket().is_zero());
    }
}
