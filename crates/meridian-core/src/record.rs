//! # Record Access
//!
//! Typed get/set over a host-managed mutable record.
//!
//! ## Why a Trait?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Record Ownership                                   │
//! │                                                                         │
//! │  Host ERP framework                                                    │
//! │  ├── owns the live record (grid row / persistent object)               │
//! │  ├── tracks which fields changed since last persist                    │
//! │  └── exposes it to this engine through RecordAccessor                  │
//! │                                                                         │
//! │  meridian-core                                                         │
//! │  ├── reads only the fields it knows about (see [`fields`])             │
//! │  ├── writes derived fields during callouts                             │
//! │  └── never creates, persists, or destroys records                      │
//! │                                                                         │
//! │  Tests use [`MemoryRecord`] - a plain HashMap-backed fixture -         │
//! │  instead of a live host object.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::money::Money;

// =============================================================================
// Field Names
// =============================================================================

/// Field names the engine reads and writes. The host maps these onto its
/// own column/property names behind its `RecordAccessor` implementation.
pub mod fields {
    /// Entity surrogate key (order id, line id, partner id).
    pub const ID: &str = "id";
    /// Order / order line: referenced business partner.
    pub const PARTNER_ID: &str = "partner_id";
    /// Order: document grand total.
    pub const GRAND_TOTAL: &str = "grand_total";
    /// Order: promised order date.
    pub const DATE_ORDERED: &str = "date_ordered";
    /// Order: set once the document has been processed.
    pub const PROCESSED: &str = "processed";
    /// Order / order line: shipping warehouse.
    pub const WAREHOUSE_ID: &str = "warehouse_id";
    /// Order line: entered quantity.
    pub const QUANTITY: &str = "quantity";
    /// Order line: entered unit price.
    pub const UNIT_PRICE: &str = "unit_price";
    /// Order line: list price before discount.
    pub const PRICE_LIST: &str = "price_list";
    /// Order line: discount in basis points.
    pub const DISCOUNT_BPS: &str = "discount_bps";
    /// Order line: referenced tax.
    pub const TAX_ID: &str = "tax_id";
    /// Order line: referenced product.
    pub const PRODUCT_ID: &str = "product_id";
    /// Order line: derived net amount (quantity × unit price).
    pub const LINE_NET: &str = "line_net";
    /// Order line: derived tax amount.
    pub const TAX_AMOUNT: &str = "tax_amount";
    /// Order line: derived total (net + tax).
    pub const LINE_TOTAL: &str = "line_total";
    /// Order line: display name copied from the product.
    pub const PRODUCT_NAME: &str = "product_name";
    /// Business partner: display name.
    pub const NAME: &str = "name";
}

// =============================================================================
// Field Values
// =============================================================================

/// A typed field value. The engine only ever sees these five shapes; the
/// host converts to and from its own column types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Money(Money),
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Bool(bool),
}

// =============================================================================
// RecordAccessor Trait
// =============================================================================

/// Narrow typed accessor over one mutable record.
///
/// `is_changed` answers "does this field differ from its last-persisted
/// value within the current event" - the host tracks that; the engine
/// only asks.
///
/// The typed helpers (`money`, `integer`, ...) return `None` both when the
/// field is absent and when it holds a different shape; a shape mismatch
/// is a host mapping bug, and rules treat it the same as an absent value.
pub trait RecordAccessor {
    /// Reads a field, `None` if absent.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Writes a field, replacing any previous value.
    fn set(&mut self, field: &str, value: FieldValue);

    /// True if the field differs from its last-persisted value.
    fn is_changed(&self, field: &str) -> bool;

    /// Reads a field as money.
    fn money(&self, field: &str) -> Option<Money> {
        match self.get(field) {
            Some(FieldValue::Money(m)) => Some(m),
            _ => None,
        }
    }

    /// Reads a field as an integer.
    fn integer(&self, field: &str) -> Option<i64> {
        match self.get(field) {
            Some(FieldValue::Integer(i)) => Some(i),
            _ => None,
        }
    }

    /// Reads a field as text.
    fn text(&self, field: &str) -> Option<String> {
        match self.get(field) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Reads a field as a timestamp.
    fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.get(field) {
            Some(FieldValue::Timestamp(t)) => Some(t),
            _ => None,
        }
    }

    /// Reads a field as a boolean.
    fn boolean(&self, field: &str) -> Option<bool> {
        match self.get(field) {
            Some(FieldValue::Bool(b)) => Some(b),
            _ => None,
        }
    }
}

// =============================================================================
// In-Memory Record
// =============================================================================

/// HashMap-backed [`RecordAccessor`] for tests and host-free embedding.
///
/// ## Example
/// ```rust
/// use meridian_core::record::{fields, FieldValue, MemoryRecord, RecordAccessor};
///
/// let mut line = MemoryRecord::new()
///     .with(fields::QUANTITY, FieldValue::Integer(3))
///     .changed(fields::QUANTITY);
///
/// assert_eq!(line.integer(fields::QUANTITY), Some(3));
/// assert!(line.is_changed(fields::QUANTITY));
///
/// line.set(fields::PRODUCT_NAME, FieldValue::Text("Widget".into()));
/// assert_eq!(line.text(fields::PRODUCT_NAME).as_deref(), Some("Widget"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecord {
    values: HashMap<String, FieldValue>,
    changed: HashSet<String>,
}

impl MemoryRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        MemoryRecord::default()
    }

    /// Builder-style field assignment (does not mark the field changed).
    pub fn with(mut self, field: &str, value: FieldValue) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }

    /// Builder-style changed-flag marker.
    pub fn changed(mut self, field: &str) -> Self {
        self.changed.insert(field.to_string());
        self
    }
}

impl RecordAccessor for MemoryRecord {
    fn get(&self, field: &str) -> Option<FieldValue> {
        self.values.get(field).cloned()
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
        self.changed.insert(field.to_string());
    }

    fn is_changed(&self, field: &str) -> bool {
        self.changed.contains(field)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
