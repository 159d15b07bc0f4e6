//! # Query Gateway
//!
//! The engine's only doorway to the backing store.
//!
//! ## Contract Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      QueryGateway Contract                              │
//! │                                                                         │
//! │  single-row lookups   → Result<Option<Row>, LookupError>               │
//! │  multi-row lookups    → Result<Vec<Row>, LookupError>                  │
//! │  writes               → Result<u64 /* affected rows */, LookupError>   │
//! │                                                                         │
//! │  Every method is one parameterized query in spirit: the engine names   │
//! │  WHAT it needs, the implementation decides HOW (SQL, REST, fixture).   │
//! │  No schema is mandated - meridian-db ships one concrete mapping.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations should surface query-level timeouts as
//! [`LookupError::Timeout`] rather than blocking indefinitely; the engine
//! aborts the current event or run on any lookup failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LookupResult;
use crate::types::{
    CustomerSales, OrderLineSnapshot, PartnerSnapshot, PriceAdjustmentSpec, PriceUpdate,
    PricedRecord, ProductSnapshot, TaxRate,
};

/// Executes parameterized reads and writes against the backing store.
///
/// `Send + Sync` because one gateway instance is typically shared across
/// the validator and the repricer for the lifetime of the host session.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Looks up one business partner by id.
    async fn partner(&self, partner_id: i64) -> LookupResult<Option<PartnerSnapshot>>;

    /// True if another partner (excluding `exclude_id`) already carries
    /// this exact name.
    async fn partner_name_taken(&self, name: &str, exclude_id: Option<i64>) -> LookupResult<bool>;

    /// True if the partner qualifies for the special-customer bonus:
    /// a customer whose credit limit exceeds the configured floor.
    async fn is_special_customer(&self, partner_id: i64) -> LookupResult<bool>;

    /// Looks up one product by id.
    async fn product(&self, product_id: i64) -> LookupResult<Option<ProductSnapshot>>;

    /// Looks up a tax rate by tax id.
    async fn tax_rate(&self, tax_id: i64) -> LookupResult<Option<TaxRate>>;

    /// All lines of one order, for the before-complete document check.
    async fn order_lines(&self, order_id: i64) -> LookupResult<Vec<OrderLineSnapshot>>;

    /// On-hand quantity of a product summed across every locator of the
    /// given warehouse. Zero when the product is not stocked there.
    ///
    /// This is a plain read with no reservation or locking. Two concurrent
    /// completions can both pass against the same stock; the host's
    /// ambient transaction model accepts that.
    async fn quantity_on_hand(&self, product_id: i64, warehouse_id: i64) -> LookupResult<i64>;

    /// Scans priced records matching the spec's filters. Filters are
    /// conjunctive; absent filters must be omitted from the scan, not
    /// defaulted to wildcard-matching literals.
    async fn scan_prices(&self, spec: &PriceAdjustmentSpec) -> LookupResult<Vec<PricedRecord>>;

    /// Persists one adjusted price triple atomically (a single update
    /// covering all three prices, keyed by product id + price-list-version
    /// id). Returns the affected-row count.
    async fn update_prices(&self, update: &PriceUpdate) -> LookupResult<u64>;

    /// Per-customer completed-order aggregates inside the optional date
    /// window, ordered by total descending.
    async fn sales_by_customer(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LookupResult<Vec<CustomerSales>>;
}
