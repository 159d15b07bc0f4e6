//! # Validation Rule Chain
//!
//! Business-rule validation fired by the host on record mutation and
//! document lifecycle events.
//!
//! ## Evaluation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Rule Chain Evaluation                                 │
//! │                                                                         │
//! │  Host callback (entity kind + lifecycle phase + record)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Validator::validate(event, record, gateway)                           │
//! │       │                                                                 │
//! │       ├── dispatch on (EntityKind, LifecyclePhase)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  rules evaluated IN ORDER                                              │
//! │       │                                                                 │
//! │       ├── rule fails      → Ok(Verdict::Rejected(message))  STOP       │
//! │       ├── lookup fails    → Err(LookupError)                STOP       │
//! │       └── all rules pass  → Ok(Verdict::Pass)                          │
//! │                                                                         │
//! │  The host shows a Rejected message to the end user unchanged and       │
//! │  vetoes the operation; a LookupError tells it the store itself is      │
//! │  in trouble and the ambient transaction should roll back.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rules are predicates: they never mutate the record. Derived-field
//! writes happen in the [`callout`](crate::callout) module, not here.

use chrono::Utc;
use tracing::debug;

use crate::error::LookupResult;
use crate::gateway::QueryGateway;
use crate::money::Money;
use crate::record::{fields, RecordAccessor};
use crate::types::{EntityKind, LifecyclePhase, ValidationEvent};
use crate::{LINE_DISCOUNT_CAP_BPS, MAX_ORDER_TOTAL};

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of one rule-chain evaluation.
///
/// A rejection is an expected, frequent outcome - it is a value, not an
/// error. Only store failures travel the `Err` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every rule passed; the host may proceed.
    Pass,
    /// A rule failed; the message is user-facing and surfaced unchanged.
    Rejected(String),
}

impl Verdict {
    /// Builds a rejection from any message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Verdict::Rejected(message.into())
    }

    /// True if the chain passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

// =============================================================================
// Validator Configuration
// =============================================================================

/// Tunable business constants for the rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Ceiling on an order's grand total.
    pub max_order_total: Money,
    /// Ceiling on a line discount, in basis points.
    pub discount_cap_bps: u32,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            max_order_total: MAX_ORDER_TOTAL,
            discount_cap_bps: LINE_DISCOUNT_CAP_BPS,
        }
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Ordered rule sets per entity kind, evaluated per lifecycle event.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Creates a validator with the default business constants.
    pub fn new() -> Self {
        Validator::default()
    }

    /// Creates a validator with custom limits.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Validator { config }
    }

    /// Evaluates the rule chain for one event.
    ///
    /// Rules run in order; the first failure short-circuits with its
    /// message. Entity/phase combinations with no registered rules pass.
    pub async fn validate(
        &self,
        event: ValidationEvent,
        record: &dyn RecordAccessor,
        gateway: &dyn QueryGateway,
    ) -> LookupResult<Verdict> {
        debug!(entity = ?event.entity, phase = ?event.phase, "evaluating rule chain");

        match event.entity {
            EntityKind::Order => self.validate_order(event.phase, record, gateway).await,
            EntityKind::OrderLine => self.validate_order_line(event.phase, record),
            EntityKind::BusinessPartner => {
                self.validate_partner(event.phase, record, gateway).await
            }
        }
    }

    // -------------------------------------------------------------------------
    // Order rules
    // -------------------------------------------------------------------------

    async fn validate_order(
        &self,
        phase: LifecyclePhase,
        record: &dyn RecordAccessor,
        gateway: &dyn QueryGateway,
    ) -> LookupResult<Verdict> {
        match phase {
            LifecyclePhase::BeforeNew => self.check_order_partner(record, gateway).await,
            LifecyclePhase::BeforeChange => Ok(self.check_order_changes(record)),
            LifecyclePhase::BeforeDelete => Ok(check_order_not_processed(record)),
            LifecyclePhase::BeforeComplete => self.check_order_completion(record, gateway).await,
        }
    }

    /// BeforeNew: the referenced partner must exist, be active, and be
    /// flagged as a customer. Orders without a partner reference pass -
    /// the host's own mandatory-field layer handles those.
    async fn check_order_partner(
        &self,
        record: &dyn RecordAccessor,
        gateway: &dyn QueryGateway,
    ) -> LookupResult<Verdict> {
        let Some(partner_id) = record.integer(fields::PARTNER_ID).filter(|id| *id > 0) else {
            return Ok(Verdict::Pass);
        };

        let Some(partner) = gateway.partner(partner_id).await? else {
            return Ok(Verdict::rejected(format!(
                "business partner {partner_id} does not exist"
            )));
        };
        if !partner.is_active {
            return Ok(Verdict::rejected("business partner is not active"));
        }
        if !partner.is_customer {
            return Ok(Verdict::rejected("business partner is not a customer"));
        }
        Ok(Verdict::Pass)
    }

    /// BeforeChange: only fields that actually changed within this event
    /// are checked.
    fn check_order_changes(&self, record: &dyn RecordAccessor) -> Verdict {
        if record.is_changed(fields::GRAND_TOTAL) {
            if let Some(total) = record.money(fields::GRAND_TOTAL) {
                if total > self.config.max_order_total {
                    return Verdict::rejected(format!(
                        "order total {total} exceeds the maximum allowed ({})",
                        self.config.max_order_total
                    ));
                }
            }
        }

        if record.is_changed(fields::DATE_ORDERED) {
            if let Some(date) = record.timestamp(fields::DATE_ORDERED) {
                if date < Utc::now() {
                    return Verdict::rejected("order date cannot be before the current date");
                }
            }
        }

        Verdict::Pass
    }

    /// BeforeComplete, in order: the order must have lines, fit in the
    /// customer's credit, and be coverable from warehouse stock.
    ///
    /// The zero-lines rule runs first, so an empty order never triggers a
    /// stock lookup. The stock check itself is read-then-validate without
    /// reservation: concurrent completions may both pass against the same
    /// stock, exactly as the host's ambient transaction model allows.
    async fn check_order_completion(
        &self,
        record: &dyn RecordAccessor,
        gateway: &dyn QueryGateway,
    ) -> LookupResult<Verdict> {
        // An order that was never persisted has no id and no lines.
        let lines = match record.integer(fields::ID) {
            Some(order_id) => gateway.order_lines(order_id).await?,
            None => Vec::new(),
        };
        if lines.is_empty() {
            return Ok(Verdict::rejected("order must have at least one line"));
        }

        if let Some(partner_id) = record.integer(fields::PARTNER_ID).filter(|id| *id > 0) {
            if let Some(partner) = gateway.partner(partner_id).await? {
                if partner.credit_limit.is_positive() {
                    let grand_total =
                        record.money(fields::GRAND_TOTAL).unwrap_or_else(Money::zero);
                    let new_credit_used = partner.credit_used + grand_total;
                    if new_credit_used > partner.credit_limit {
                        return Ok(Verdict::rejected(format!(
                            "order exceeds the customer credit limit. \
                             limit: {}, used: {}, new total: {new_credit_used}",
                            partner.credit_limit, partner.credit_used
                        )));
                    }
                }
            }
        }

        for line in &lines {
            let Some(product_id) = line.product_id.filter(|id| *id > 0) else {
                continue;
            };
            let on_hand = gateway.quantity_on_hand(product_id, line.warehouse_id).await?;
            if line.quantity > on_hand {
                let product_name = gateway
                    .product(product_id)
                    .await?
                    .map(|p| p.name)
                    .unwrap_or_else(|| product_id.to_string());
                return Ok(Verdict::rejected(format!(
                    "requested quantity ({}) exceeds available stock ({on_hand}) \
                     for product: {product_name}",
                    line.quantity
                )));
            }
        }

        Ok(Verdict::Pass)
    }

    // -------------------------------------------------------------------------
    // Order line rules
    // -------------------------------------------------------------------------

    /// BeforeNew / BeforeChange: quantity > 0, price ≥ 0, discount within
    /// the cap. Absent fields pass - the rules guard values, not presence.
    fn validate_order_line(
        &self,
        phase: LifecyclePhase,
        record: &dyn RecordAccessor,
    ) -> LookupResult<Verdict> {
        if !matches!(
            phase,
            LifecyclePhase::BeforeNew | LifecyclePhase::BeforeChange
        ) {
            return Ok(Verdict::Pass);
        }

        if let Some(quantity) = record.integer(fields::QUANTITY) {
            if quantity <= 0 {
                return Ok(Verdict::rejected("quantity must be greater than zero"));
            }
        }

        if let Some(price) = record.money(fields::UNIT_PRICE) {
            if price.is_negative() {
                return Ok(Verdict::rejected("price cannot be negative"));
            }
        }

        if let Some(discount_bps) = record.integer(fields::DISCOUNT_BPS) {
            if discount_bps > self.config.discount_cap_bps as i64 {
                return Ok(Verdict::rejected(format!(
                    "discount cannot exceed {}%",
                    self.config.discount_cap_bps / 100
                )));
            }
        }

        Ok(Verdict::Pass)
    }

    // -------------------------------------------------------------------------
    // Business partner rules
    // -------------------------------------------------------------------------

    /// BeforeNew / BeforeChange: name must be non-blank and unique among
    /// all partners excluding the record itself. The uniqueness lookup
    /// only fires when the name is new or actually changed.
    async fn validate_partner(
        &self,
        phase: LifecyclePhase,
        record: &dyn RecordAccessor,
        gateway: &dyn QueryGateway,
    ) -> LookupResult<Verdict> {
        if !matches!(
            phase,
            LifecyclePhase::BeforeNew | LifecyclePhase::BeforeChange
        ) {
            return Ok(Verdict::Pass);
        }

        let name = record.text(fields::NAME).unwrap_or_default();
        let name = name.trim();
        if name.is_empty() {
            return Ok(Verdict::rejected("business partner name is required"));
        }

        if phase == LifecyclePhase::BeforeNew || record.is_changed(fields::NAME) {
            let exclude_id = record.integer(fields::ID);
            if gateway.partner_name_taken(name, exclude_id).await? {
                return Ok(Verdict::rejected(
                    "a business partner with this name already exists",
                ));
            }
        }

        Ok(Verdict::Pass)
    }
}

/// BeforeDelete: processed orders are immutable history.
fn check_order_not_processed(record: &dyn RecordAccessor) -> Verdict {
    if record.boolean(fields::PROCESSED).unwrap_or(false) {
        return Verdict::rejected("processed orders cannot be deleted");
    }
    Verdict::Pass
}

// =============================================================================
// Unit Tests
// =============================================================================
