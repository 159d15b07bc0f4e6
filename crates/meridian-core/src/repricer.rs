//! # Batch Repricer
//!
//! Applies one price adjustment across every priced record matching a
//! filter, producing a human-readable run report.
//!
//! ## Run Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       BatchRepricer::run                                │
//! │                                                                         │
//! │  1. validate the spec          (zero-valued adjustment → InvalidSpec,  │
//! │                                 BEFORE any gateway call)               │
//! │  2. scan_prices(spec)          (filters are conjunctive; absent       │
//! │                                 filters are omitted from the scan)     │
//! │  3. per record:                                                        │
//! │       adjust list / standard / limit price   (NULL passes through)    │
//! │       update_prices(...)       (one atomic write per record)          │
//! │       log "old → new" when the row was touched                        │
//! │  4. append the summary block                                           │
//! │                                                                         │
//! │  Any mid-run lookup or write failure aborts with the partial report    │
//! │  attached - records already written STAY written; there is no          │
//! │  run-level rollback.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BatchError, BatchResult};
use crate::gateway::QueryGateway;
use crate::money::Money;
use crate::pricing::adjust_price;
use crate::types::{PriceAdjustmentSpec, PriceUpdate, PricedRecord};

// =============================================================================
// Run Report
// =============================================================================

/// What one repricing run saw and did.
///
/// `lines` is the user-facing report body: one line per touched record
/// plus a trailing summary block, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Records returned by the scan.
    pub scanned: u64,
    /// Records whose persisted prices actually changed.
    pub updated: u64,
    /// Report body, in scan order.
    pub lines: Vec<String>,
}

impl RunReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        RunReport::default()
    }

    /// Counts one scanned record.
    pub fn record_scanned(&mut self) {
        self.scanned += 1;
    }

    /// Counts one updated record.
    pub fn record_updated(&mut self) {
        self.updated += 1;
    }

    /// Appends one report line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

// =============================================================================
// Batch Repricer
// =============================================================================

/// Scans, adjusts, and persists prices through a [`QueryGateway`].
pub struct BatchRepricer<'a> {
    gateway: &'a dyn QueryGateway,
}

impl<'a> BatchRepricer<'a> {
    /// Creates a repricer over the given gateway.
    pub fn new(gateway: &'a dyn QueryGateway) -> Self {
        BatchRepricer { gateway }
    }

    /// Runs one adjustment across every record the spec's filters match.
    ///
    /// A zero-valued adjustment is rejected up front with
    /// [`BatchError::InvalidSpec`]; no scanning happens in that case. A
    /// mid-run failure returns [`BatchError::Aborted`] carrying the report
    /// accumulated so far - updates already persisted are not undone.
    pub async fn run(&self, spec: &PriceAdjustmentSpec) -> BatchResult<RunReport> {
        if spec.adjustment.is_zero() {
            return Err(BatchError::invalid_spec(format!(
                "{} adjustment value must not be zero",
                spec.adjustment.mode_name()
            )));
        }

        info!(
            mode = spec.adjustment.mode_name(),
            value = %spec.adjustment.value_display(),
            category = ?spec.category_id,
            active_only = spec.active_only,
            "starting repricing run"
        );

        let mut report = RunReport::new();

        let records = match self.gateway.scan_prices(spec).await {
            Ok(records) => records,
            Err(source) => return Err(BatchError::Aborted { report, source }),
        };

        for record in &records {
            report.record_scanned();

            let update = PriceUpdate {
                product_id: record.product_id,
                price_list_version_id: record.price_list_version_id,
                list_price: adjust_price(record.list_price, &spec.adjustment),
                standard_price: adjust_price(record.standard_price, &spec.adjustment),
                limit_price: adjust_price(record.limit_price, &spec.adjustment),
            };

            let affected = match self.gateway.update_prices(&update).await {
                Ok(affected) => affected,
                Err(source) => return Err(BatchError::Aborted { report, source }),
            };

            if affected > 0 {
                report.record_updated();
                report.log(price_change_line(record, &update));
                debug!(
                    product_id = record.product_id,
                    affected, "repriced product record"
                );
            }
        }

        report.log(String::new());
        report.log(format!("records processed: {}", report.scanned));
        report.log(format!("records updated: {}", report.updated));
        report.log(format!(
            "adjustment: {} {}",
            spec.adjustment.mode_name(),
            spec.adjustment.value_display()
        ));

        info!(
            scanned = report.scanned,
            updated = report.updated,
            "repricing run finished"
        );
        Ok(report)
    }
}

/// One report line per touched record, showing the list price movement.
fn price_change_line(record: &PricedRecord, update: &PriceUpdate) -> String {
    format!(
        "{}: list {} -> {}",
        record.product_name,
        display_price(record.list_price),
        display_price(update.list_price)
    )
}

fn display_price(price: Option<Money>) -> String {
    match price {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemoryGateway;
    use crate::types::Adjustment;

    fn priced(
        product_id: i64,
        name: &str,
        list: Option<i64>,
        standard: Option<i64>,
        limit: Option<i64>,
    ) -> PricedRecord {
        PricedRecord {
            product_id,
            product_name: name.to_string(),
            price_list_version_id: 100,
            list_price: list.map(Money::from_cents),
            standard_price: standard.map(Money::from_cents),
            limit_price: limit.map(Money::from_cents),
        }
    }

    #[tokio::test]
    async fn zero_adjustment_is_rejected_before_any_scan() {
        let gateway = MemoryGateway::default();
        let repricer = BatchRepricer::new(&gateway);

        let spec = PriceAdjustmentSpec::new(Adjustment::Percentage(0));
        let err = repricer.run(&spec).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidSpec { .. }));

        let spec = PriceAdjustmentSpec::new(Adjustment::Fixed(Money::zero()));
        let err = repricer.run(&spec).await.unwrap_err();
        assert!(matches!(err, BatchError::InvalidSpec { .. }));

        assert_eq!(gateway.scan_call_count(), 0);
    }

    #[tokio::test]
    async fn percentage_run_adjusts_all_three_prices() {
        let mut gateway = MemoryGateway::default();
        gateway.priced = vec![
            priced(1, "Widget", Some(999), Some(899), Some(799)),
            priced(2, "Gadget", Some(10000), Some(9000), Some(8000)),
            priced(3, "Sprocket", Some(5000), Some(4500), Some(4000)),
        ];
        let repricer = BatchRepricer::new(&gateway);

        let report = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.updated, 3);

        let updates = gateway.recorded_updates();
        // 9.99 +5% = 10.4895 → 10.49
        assert_eq!(updates[0].list_price, Some(Money::from_cents(1049)));
        assert_eq!(updates[0].standard_price, Some(Money::from_cents(944)));
        assert_eq!(updates[0].limit_price, Some(Money::from_cents(839)));
        assert_eq!(updates[1].list_price, Some(Money::from_cents(10500)));
        assert_eq!(updates[2].list_price, Some(Money::from_cents(5250)));

        assert!(report.lines[0].contains("Widget"));
        assert!(report.lines[0].contains("9.99 -> 10.49"));
        assert!(report.lines.iter().any(|l| l == "records processed: 3"));
        assert!(report.lines.iter().any(|l| l == "records updated: 3"));
    }

    #[tokio::test]
    async fn fixed_run_adds_the_amount_directly() {
        let mut gateway = MemoryGateway::default();
        gateway.priced = vec![priced(1, "Widget", Some(999), Some(899), None)];
        let repricer = BatchRepricer::new(&gateway);

        let report = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Fixed(Money::from_cents(
                150,
            ))))
            .await
            .unwrap();

        let updates = gateway.recorded_updates();
        assert_eq!(updates[0].list_price, Some(Money::from_cents(1149)));
        assert_eq!(updates[0].standard_price, Some(Money::from_cents(1049)));
        // NULL limit price stays NULL
        assert_eq!(updates[0].limit_price, None);
        assert!(report.lines.iter().any(|l| l == "adjustment: fixed amount 1.50"));
    }

    #[tokio::test]
    async fn negative_percentage_lowers_prices() {
        let mut gateway = MemoryGateway::default();
        gateway.priced = vec![priced(1, "Widget", Some(10000), None, None)];
        let repricer = BatchRepricer::new(&gateway);

        repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(-1000)))
            .await
            .unwrap();

        let updates = gateway.recorded_updates();
        assert_eq!(updates[0].list_price, Some(Money::from_cents(9000)));
    }

    #[tokio::test]
    async fn empty_scan_yields_summary_only() {
        let gateway = MemoryGateway::default();
        let repricer = BatchRepricer::new(&gateway);

        let report = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap();

        assert_eq!(report.scanned, 0);
        assert_eq!(report.updated, 0);
        assert!(report.lines.iter().any(|l| l == "records processed: 0"));
    }

    #[tokio::test]
    async fn scan_failure_aborts_with_empty_report() {
        let mut gateway = MemoryGateway::default();
        gateway.fail_scans = true;
        let repricer = BatchRepricer::new(&gateway);

        let err = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap_err();
        match err {
            BatchError::Aborted { report, .. } => {
                assert_eq!(report.scanned, 0);
                assert_eq!(report.updated, 0);
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_failure_aborts_with_partial_report() {
        let mut gateway = MemoryGateway::default();
        gateway.priced = vec![
            priced(1, "Widget", Some(999), None, None),
            priced(2, "Gadget", Some(888), None, None),
        ];
        gateway.fail_updates = true;
        let repricer = BatchRepricer::new(&gateway);

        let err = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap_err();
        match err {
            BatchError::Aborted { report, .. } => {
                assert_eq!(report.scanned, 1);
                assert_eq!(report.updated, 0);
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unaffected_rows_are_scanned_but_not_counted_updated() {
        let mut gateway = MemoryGateway::default();
        gateway.priced = vec![priced(1, "Ghost", Some(999), None, None)];
        gateway.update_affects_no_rows = true;
        let repricer = BatchRepricer::new(&gateway);

        let report = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.updated, 0);
        assert!(report.lines.iter().all(|l| !l.contains("Ghost")));
    }
}
