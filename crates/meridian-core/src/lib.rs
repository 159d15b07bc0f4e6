//! # meridian-core: Pure Business Logic for the Meridian Order Engine
//!
//! This crate is the **heart** of Meridian. It contains the pricing
//! calculators, the validation rule chain, the field callouts, and the
//! batch repricer - all free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Meridian Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Host ERP Framework                          │   │
//! │  │   owns records • fires lifecycle events • runs batch jobs      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ RecordAccessor + events                │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ meridian-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   rules   │  │  callout  │  │ repricer  │  │   │
//! │  │   │ line amts │  │ Validator │  │ derived   │  │ batch     │  │   │
//! │  │   │ discounts │  │ verdicts  │  │ fields    │  │ runs      │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O OF ITS OWN - all lookups go through QueryGateway      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ QueryGateway trait                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  meridian-db (Store Layer)                      │   │
//! │  │           SQLite queries, migrations, SqliteGateway             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (TaxRate, Adjustment, snapshots, ...)
//! - [`record`] - RecordAccessor trait over host-owned records
//! - [`gateway`] - QueryGateway trait, the engine's only doorway to a store
//! - [`pricing`] - Pure calculators: line amounts, discounts, adjustments
//! - [`callout`] - Derived-field writers fired during editing
//! - [`rules`] - The validation rule chain
//! - [`repricer`] - Batch price adjustment runs
//! - [`sales`] - Per-customer sales summary report
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Core**: calculators are deterministic; lookups are injected
//! 2. **Integer Money**: all monetary values are cents (i64), rates are
//!    basis points - no floats anywhere near an amount
//! 3. **Rejections Are Values**: a failed business rule is a
//!    [`rules::Verdict::Rejected`], never an `Err`
//! 4. **Explicit Errors**: store failures are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use meridian_core::money::Money;
//! use meridian_core::pricing::compute_line_amounts;
//! use meridian_core::types::TaxRate;
//!
//! // 3 × $10.99 at 8.25% tax
//! let amounts = compute_line_amounts(
//!     3,
//!     Money::from_cents(1099),
//!     Some(TaxRate::from_bps(825)),
//! )
//! .unwrap();
//!
//! assert_eq!(amounts.net.cents(), 3297);
//! assert_eq!(amounts.tax.cents(), 272); // 272.0025 rounded half-up
//! assert_eq!(amounts.total.cents(), 3569);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod callout;
pub mod error;
pub mod gateway;
pub mod money;
pub mod pricing;
pub mod record;
pub mod repricer;
pub mod rules;
pub mod sales;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use meridian_core::Money` instead of
// `use meridian_core::money::Money`

pub use error::{BatchError, CalcError, LookupError};
pub use gateway::QueryGateway;
pub use money::Money;
pub use record::RecordAccessor;
pub use rules::{Validator, Verdict};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Ceiling on an order's grand total: 100,000.00.
///
/// ## Business Reason
/// Orders above this size need a manual contract, not the standard order
/// flow. Enforced on change of the grand total; see
/// [`rules::ValidatorConfig`].
pub const MAX_ORDER_TOTAL: Money = Money::from_cents(10_000_000);

/// Ceiling on a single line discount: 50% (5000 basis points).
///
/// ## Business Reason
/// Anything deeper than half price is a pricing mistake or needs manager
/// sign-off outside this engine.
pub const LINE_DISCOUNT_CAP_BPS: u32 = 5_000;

/// Credit-limit floor above which a customer counts as "special":
/// 10,000.00.
///
/// ## Business Reason
/// Special customers earn the additive volume-discount bonus. Qualifying
/// by credit limit keeps the flag derivable instead of hand-maintained.
pub const SPECIAL_CUSTOMER_CREDIT_FLOOR: Money = Money::from_cents(1_000_000);
