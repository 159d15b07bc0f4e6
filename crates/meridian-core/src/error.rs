//! # Error Types
//!
//! Domain-specific error types for meridian-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CalcError    - malformed arguments to a pure calculator; local to     │
//! │                 the immediate call, never crosses the engine boundary  │
//! │  Verdict::Rejected (rules module) - a business rule failed; this is    │
//! │                 an expected, frequent outcome, so it is a VALUE, not   │
//! │                 an error                                               │
//! │  LookupError  - the store could not answer; aborts the current rule    │
//! │                 chain or batch run                                     │
//! │  BatchError   - a repricing run was rejected up front (InvalidSpec)    │
//! │                 or aborted mid-run (carries the partial RunReport)     │
//! │                                                                         │
//! │  Nothing here is fatal to the process - every failure is scoped to     │
//! │  one event or one batch run; the host's transaction boundary decides   │
//! │  whether to retry or roll back.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, amounts, counts)
//! 3. Errors are enum variants, never bare Strings

use thiserror::Error;

use crate::repricer::RunReport;

// =============================================================================
// Calculator Errors
// =============================================================================

/// Contract violations on the pure calculators.
///
/// Calculators never fail for business reasons - only for arguments that
/// are outside their domain. Callers either guard before calling or treat
/// the error as a rule violation at their own level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// Quantity must be strictly positive.
    #[error("quantity must be greater than zero (got {quantity})")]
    NonPositiveQuantity { quantity: i64 },

    /// Unit price must not be negative.
    #[error("price cannot be negative (got {price})")]
    NegativePrice { price: crate::money::Money },
}

/// Result type for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;

// =============================================================================
// Lookup Errors
// =============================================================================

/// The backing store could not answer a query.
///
/// ## When This Occurs
/// - Connection lost or pool exhausted mid-event
/// - Query-level timeout
/// - Malformed row (a mapping bug between gateway and schema)
///
/// A lookup failure is never silently swallowed: it aborts the remaining
/// rule chain for the event, or the remaining batch run, and surfaces to
/// the host as a distinct error so it can decide to retry or roll back.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The store is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query failed at execution time.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// The store did not answer within its configured deadline.
    #[error("query timed out: {0}")]
    Timeout(String),

    /// A row came back in a shape the gateway mapping did not expect.
    #[error("malformed row: {0}")]
    MalformedRow(String),
}

/// Result type for gateway lookups.
pub type LookupResult<T> = Result<T, LookupError>;

// =============================================================================
// Batch Errors
// =============================================================================

/// A batch repricing run failed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The adjustment specification is nonsensical. Rejected before any
    /// scanning - zero gateway calls have been made when this is returned.
    #[error("invalid adjustment spec: {reason}")]
    InvalidSpec { reason: String },

    /// A mid-run lookup or persistence failure. Carries the report
    /// accumulated up to the failing record; there are no commit
    /// guarantees beyond per-record update atomicity.
    #[error("repricing run aborted after {} scanned, {} updated: {source}",
            report.scanned, report.updated)]
    Aborted {
        report: RunReport,
        #[source]
        source: LookupError,
    },
}

impl BatchError {
    /// Creates an InvalidSpec error.
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        BatchError::InvalidSpec {
            reason: reason.into(),
        }
    }
}

/// Result type for batch runs.
pub type BatchResult<T> = Result<T, BatchError>;

// =============================================================================
// Unit Tests
// =============================================================================
