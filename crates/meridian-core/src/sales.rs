//! # Sales Summary Report
//!
//! Per-customer completed-order aggregates over an optional date window,
//! rendered as plain report lines the host can show or print verbatim.
//!
//! The aggregation itself happens in the store (see
//! [`QueryGateway::sales_by_customer`](crate::gateway::QueryGateway::sales_by_customer));
//! this module only renders and totals.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::LookupResult;
use crate::gateway::QueryGateway;
use crate::money::Money;

/// A rendered sales summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Report body: header, one line per customer, grand-total footer.
    pub lines: Vec<String>,
    /// Grand total across all listed customers.
    pub grand_total: Money,
    /// Number of customers listed.
    pub customers: usize,
}

/// Builds the per-customer sales summary for the given window.
///
/// Customers come back ordered by total descending; each line shows the
/// customer name, order count, total, and average ticket.
pub async fn sales_summary(
    gateway: &dyn QueryGateway,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> LookupResult<SalesSummary> {
    let rows = gateway.sales_by_customer(from, to).await?;

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format!(
        "{:<30} {:>8} {:>14} {:>14}",
        "customer", "orders", "total", "avg ticket"
    ));
    lines.push("-".repeat(70));

    let mut grand_total = Money::zero();
    for row in &rows {
        grand_total += row.total;
        lines.push(format!(
            "{:<30} {:>8} {:>14} {:>14}",
            row.customer,
            row.orders,
            row.total.to_string(),
            row.average_ticket().to_string()
        ));
    }

    lines.push("-".repeat(70));
    lines.push(format!(
        "{:<30} {:>8} {:>14}",
        "grand total",
        "",
        grand_total.to_string()
    ));

    info!(customers = rows.len(), total = %grand_total, "built sales summary");

    Ok(SalesSummary {
        lines,
        grand_total,
        customers: rows.len(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
