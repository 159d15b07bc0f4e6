//! # SQLite Query Gateway
//!
//! The [`QueryGateway`] implementation over the Meridian SQLite schema.
//!
//! ## Query Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SqliteGateway Queries                              │
//! │                                                                         │
//! │  partner / product / tax_rate     one parameterized SELECT, one row    │
//! │  order_lines / scan_prices        one parameterized SELECT, many rows  │
//! │  quantity_on_hand                 SUM over locators of one warehouse   │
//! │  update_prices                    one UPDATE per priced record         │
//! │  sales_by_customer                GROUP BY aggregate                   │
//! │                                                                         │
//! │  scan_prices and sales_by_customer assemble their WHERE clause from    │
//! │  the filters actually present - an absent filter contributes no        │
//! │  predicate at all.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All queries are runtime-bound (`sqlx::query` + `bind`); the dynamic
//! filters rule out compile-time checked macros here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use meridian_core::error::{LookupError, LookupResult};
use meridian_core::gateway::QueryGateway;
use meridian_core::types::{
    CustomerSales, OrderLineSnapshot, PartnerSnapshot, PriceAdjustmentSpec, PriceUpdate,
    PricedRecord, ProductSnapshot, TaxRate,
};
use meridian_core::{Money, SPECIAL_CUSTOMER_CREDIT_FLOOR};

use crate::error::StoreError;

/// [`QueryGateway`] over a SQLite pool.
///
/// Cheap to clone; all clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteGateway {
    pool: SqlitePool,
}

impl SqliteGateway {
    /// Creates a gateway over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteGateway { pool }
    }
}

/// Execution failures, categorized through [`StoreError`].
fn to_lookup(err: sqlx::Error) -> LookupError {
    StoreError::from(err).into()
}

/// Row-decode failures are mapping bugs, not store outages.
fn bad_row(err: sqlx::Error) -> LookupError {
    LookupError::MalformedRow(err.to_string())
}

fn map_partner(row: &SqliteRow) -> LookupResult<PartnerSnapshot> {
    Ok(PartnerSnapshot {
        id: row.try_get("id").map_err(bad_row)?,
        name: row.try_get("name").map_err(bad_row)?,
        is_active: row.try_get("is_active").map_err(bad_row)?,
        is_customer: row.try_get("is_customer").map_err(bad_row)?,
        credit_limit: Money::from_cents(row.try_get("credit_limit_cents").map_err(bad_row)?),
        credit_used: Money::from_cents(row.try_get("credit_used_cents").map_err(bad_row)?),
    })
}

fn map_priced(row: &SqliteRow) -> LookupResult<PricedRecord> {
    let cents = |col: &str| -> LookupResult<Option<Money>> {
        let value: Option<i64> = row.try_get(col).map_err(bad_row)?;
        Ok(value.map(Money::from_cents))
    };
    Ok(PricedRecord {
        product_id: row.try_get("product_id").map_err(bad_row)?,
        product_name: row.try_get("product_name").map_err(bad_row)?,
        price_list_version_id: row.try_get("price_list_version_id").map_err(bad_row)?,
        list_price: cents("list_price_cents")?,
        standard_price: cents("standard_price_cents")?,
        limit_price: cents("limit_price_cents")?,
    })
}

#[async_trait]
impl QueryGateway for SqliteGateway {
    async fn partner(&self, partner_id: i64) -> LookupResult<Option<PartnerSnapshot>> {
        let row = sqlx::query(
            "SELECT id, name, is_active, is_customer, credit_limit_cents, credit_used_cents \
             FROM partners WHERE id = ?",
        )
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_lookup)?;

        row.as_ref().map(map_partner).transpose()
    }

    async fn partner_name_taken(&self, name: &str, exclude_id: Option<i64>) -> LookupResult<bool> {
        let taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM partners WHERE name = ? AND (? IS NULL OR id <> ?)",
        )
        .bind(name)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(to_lookup)?;

        Ok(taken > 0)
    }

    async fn is_special_customer(&self, partner_id: i64) -> LookupResult<bool> {
        let row: Option<(bool, i64)> = sqlx::query_as(
            "SELECT is_customer, credit_limit_cents FROM partners WHERE id = ?",
        )
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_lookup)?;

        Ok(match row {
            Some((is_customer, credit_limit_cents)) => {
                is_customer && credit_limit_cents > SPECIAL_CUSTOMER_CREDIT_FLOOR.cents()
            }
            None => false,
        })
    }

    async fn product(&self, product_id: i64) -> LookupResult<Option<ProductSnapshot>> {
        let row =
            sqlx::query("SELECT id, name, is_active, is_sellable FROM products WHERE id = ?")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(to_lookup)?;

        row.map(|row| {
            Ok(ProductSnapshot {
                id: row.try_get("id").map_err(bad_row)?,
                name: row.try_get("name").map_err(bad_row)?,
                is_active: row.try_get("is_active").map_err(bad_row)?,
                is_sellable: row.try_get("is_sellable").map_err(bad_row)?,
            })
        })
        .transpose()
    }

    async fn tax_rate(&self, tax_id: i64) -> LookupResult<Option<TaxRate>> {
        let bps: Option<i64> = sqlx::query_scalar("SELECT rate_bps FROM taxes WHERE id = ?")
            .bind(tax_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(to_lookup)?;

        Ok(bps.map(|bps| TaxRate::from_bps(bps as u32)))
    }

    async fn order_lines(&self, order_id: i64) -> LookupResult<Vec<OrderLineSnapshot>> {
        let rows = sqlx::query(
            "SELECT id, product_id, quantity, warehouse_id \
             FROM order_lines WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(to_lookup)?;

        rows.iter()
            .map(|row| {
                Ok(OrderLineSnapshot {
                    id: row.try_get("id").map_err(bad_row)?,
                    product_id: row.try_get("product_id").map_err(bad_row)?,
                    quantity: row.try_get("quantity").map_err(bad_row)?,
                    warehouse_id: row.try_get("warehouse_id").map_err(bad_row)?,
                })
            })
            .collect()
    }

    async fn quantity_on_hand(&self, product_id: i64, warehouse_id: i64) -> LookupResult<i64> {
        let on_hand: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(s.quantity_on_hand), 0) \
             FROM storage s \
             JOIN locators l ON l.id = s.locator_id \
             WHERE s.product_id = ? AND l.warehouse_id = ?",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_one(&self.pool)
        .await
        .map_err(to_lookup)?;

        debug!(product_id, warehouse_id, on_hand, "stock lookup");
        Ok(on_hand)
    }

    async fn scan_prices(&self, spec: &PriceAdjustmentSpec) -> LookupResult<Vec<PricedRecord>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT pp.product_id, pr.name AS product_name, pp.price_list_version_id, \
             pp.list_price_cents, pp.standard_price_cents, pp.limit_price_cents \
             FROM product_prices pp \
             JOIN products pr ON pr.id = pp.product_id \
             JOIN price_list_versions plv ON plv.id = pp.price_list_version_id \
             WHERE pr.is_active = ",
        );
        qb.push_bind(spec.active_only);

        if let Some(category_id) = spec.category_id {
            qb.push(" AND pr.category_id = ").push_bind(category_id);
        }
        if let Some(from) = spec.valid_from {
            qb.push(" AND plv.valid_from >= ").push_bind(from);
        }
        if let Some(to) = spec.valid_to {
            qb.push(" AND plv.valid_from <= ").push_bind(to);
        }
        qb.push(" ORDER BY pp.product_id, pp.price_list_version_id");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(to_lookup)?;

        debug!(matched = rows.len(), "price scan");
        rows.iter().map(map_priced).collect()
    }

    async fn update_prices(&self, update: &PriceUpdate) -> LookupResult<u64> {
        let result = sqlx::query(
            "UPDATE product_prices \
             SET list_price_cents = ?, standard_price_cents = ?, limit_price_cents = ?, \
                 updated_at = ? \
             WHERE product_id = ? AND price_list_version_id = ?",
        )
        .bind(update.list_price.map(|m| m.cents()))
        .bind(update.standard_price.map(|m| m.cents()))
        .bind(update.limit_price.map(|m| m.cents()))
        .bind(Utc::now())
        .bind(update.product_id)
        .bind(update.price_list_version_id)
        .execute(&self.pool)
        .await
        .map_err(to_lookup)?;

        Ok(result.rows_affected())
    }

    async fn sales_by_customer(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LookupResult<Vec<CustomerSales>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT pa.name AS customer, \
             COALESCE(SUM(o.grand_total_cents), 0) AS total_cents, \
             COUNT(o.id) AS orders \
             FROM orders o \
             JOIN partners pa ON pa.id = o.partner_id \
             WHERE o.is_processed = 1",
        );
        if let Some(from) = from {
            qb.push(" AND o.date_ordered >= ").push_bind(from);
        }
        if let Some(to) = to {
            qb.push(" AND o.date_ordered <= ").push_bind(to);
        }
        qb.push(" GROUP BY pa.id, pa.name ORDER BY total_cents DESC");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(to_lookup)?;

        rows.iter()
            .map(|row| {
                Ok(CustomerSales {
                    customer: row.try_get("customer").map_err(bad_row)?,
                    total: Money::from_cents(row.try_get("total_cents").map_err(bad_row)?),
                    orders: row.try_get("orders").map_err(bad_row)?,
                })
            })
            .collect()
    }
}

// =============================================================================
// Integration Tests (in-memory SQLite)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use meridian_core::repricer::BatchRepricer;
    use meridian_core::types::Adjustment;

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pool = db.pool();

        let statements = [
            // Partners: 1 plain customer, 2 special (limit > 10,000.00), 3 vendor
            "INSERT INTO partners (id, name, is_active, is_customer, credit_limit_cents, credit_used_cents) \
             VALUES (1, 'Acme', 1, 1, 1000000, 0)",
            "INSERT INTO partners (id, name, is_active, is_customer, credit_limit_cents, credit_used_cents) \
             VALUES (2, 'Globex', 1, 1, 1000001, 250000)",
            "INSERT INTO partners (id, name, is_active, is_customer, credit_limit_cents, credit_used_cents) \
             VALUES (3, 'SupplyCo', 1, 0, 99999999, 0)",
            // Products
            "INSERT INTO products (id, name, category_id, is_active, is_sellable) VALUES (10, 'Widget', 7, 1, 1)",
            "INSERT INTO products (id, name, category_id, is_active, is_sellable) VALUES (11, 'Gadget', 7, 1, 1)",
            "INSERT INTO products (id, name, category_id, is_active, is_sellable) VALUES (12, 'Sprocket', 8, 1, 1)",
            "INSERT INTO products (id, name, category_id, is_active, is_sellable) VALUES (13, 'Retired', 7, 0, 1)",
            // Taxes
            "INSERT INTO taxes (id, rate_bps) VALUES (5, 825)",
            // Stock: warehouse 1 has two locators, warehouse 2 one
            "INSERT INTO locators (id, warehouse_id) VALUES (201, 1)",
            "INSERT INTO locators (id, warehouse_id) VALUES (202, 1)",
            "INSERT INTO locators (id, warehouse_id) VALUES (203, 2)",
            "INSERT INTO storage VALUES (10, 201, 3)",
            "INSERT INTO storage VALUES (10, 202, 4)",
            "INSERT INTO storage VALUES (10, 203, 50)",
        ];
        for stmt in statements {
            sqlx::query(stmt).execute(pool).await.unwrap();
        }

        // Date-bearing rows are seeded with bound timestamps so the stored
        // text format matches what the gateway binds in WHERE clauses.
        let day = |m: u32, d: u32| Utc.with_ymd_and_hms(2026, m, d, 0, 0, 0).unwrap();

        for (id, valid_from) in [(100i64, day(1, 1)), (101, day(6, 1))] {
            sqlx::query("INSERT INTO price_list_versions (id, valid_from) VALUES (?, ?)")
                .bind(id)
                .bind(valid_from)
                .execute(pool)
                .await
                .unwrap();
        }

        let prices: [(i64, i64, Option<i64>, Option<i64>, Option<i64>); 4] = [
            (10, 100, Some(999), Some(899), Some(799)),
            (11, 100, Some(10000), Some(9000), None),
            (12, 101, Some(5000), Some(4500), Some(4000)),
            (13, 100, Some(123), Some(123), Some(123)),
        ];
        for (product_id, plv_id, list, standard, limit) in prices {
            sqlx::query("INSERT INTO product_prices VALUES (?, ?, ?, ?, ?, ?)")
                .bind(product_id)
                .bind(plv_id)
                .bind(list)
                .bind(standard)
                .bind(limit)
                .bind(day(1, 1))
                .execute(pool)
                .await
                .unwrap();
        }

        // Orders: two processed for Acme, one for Globex, one draft
        let orders = [
            (300i64, 1i64, 50000i64, day(2, 1), true),
            (301, 1, 25000, day(3, 1), true),
            (302, 2, 100000, day(2, 15), true),
            (303, 2, 999999, day(4, 1), false),
        ];
        for (id, partner_id, total, date_ordered, processed) in orders {
            sqlx::query("INSERT INTO orders VALUES (?, ?, 1, ?, ?, ?)")
                .bind(id)
                .bind(partner_id)
                .bind(total)
                .bind(date_ordered)
                .bind(processed)
                .execute(pool)
                .await
                .unwrap();
        }

        // Order lines on order 300 (one product line, one charge line)
        for stmt in [
            "INSERT INTO order_lines VALUES (400, 300, 10, 2, 999, 1)",
            "INSERT INTO order_lines VALUES (401, 300, NULL, 1, 500, 1)",
        ] {
            sqlx::query(stmt).execute(pool).await.unwrap();
        }

        db
    }

    #[tokio::test]
    async fn test_partner_lookup_and_name_uniqueness() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        let partner = gateway.partner(2).await.unwrap().unwrap();
        assert_eq!(partner.name, "Globex");
        assert_eq!(partner.credit_limit, Money::from_cents(1000001));
        assert_eq!(partner.credit_used, Money::from_cents(250000));
        assert!(partner.is_customer);

        assert!(gateway.partner(99).await.unwrap().is_none());

        assert!(gateway.partner_name_taken("Acme", None).await.unwrap());
        // Excluding the record itself
        assert!(!gateway.partner_name_taken("Acme", Some(1)).await.unwrap());
        assert!(!gateway.partner_name_taken("Initech", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_special_customer_requires_limit_above_floor() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        // Exactly at the floor does not qualify
        assert!(!gateway.is_special_customer(1).await.unwrap());
        // One cent above does
        assert!(gateway.is_special_customer(2).await.unwrap());
        // A vendor never qualifies, whatever its limit
        assert!(!gateway.is_special_customer(3).await.unwrap());
        assert!(!gateway.is_special_customer(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_stock_sums_across_warehouse_locators() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        assert_eq!(gateway.quantity_on_hand(10, 1).await.unwrap(), 7);
        assert_eq!(gateway.quantity_on_hand(10, 2).await.unwrap(), 50);
        // Unstocked product reads as zero
        assert_eq!(gateway.quantity_on_hand(11, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_order_lines_round_trip() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        let lines = gateway.order_lines(300).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, Some(10));
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].product_id, None);

        assert!(gateway.order_lines(999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tax_rate_lookup() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        assert_eq!(gateway.tax_rate(5).await.unwrap(), Some(TaxRate::from_bps(825)));
        assert_eq!(gateway.tax_rate(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_price_scan_applies_only_present_filters() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        // No optional filters: every active product's prices
        let all = gateway
            .scan_prices(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)))
            .await
            .unwrap();
        assert_eq!(all.len(), 3); // product 13 is inactive
        assert_eq!(all[0].product_name, "Widget");
        assert_eq!(all[1].limit_price, None);

        // Category filter
        let cat7 = gateway
            .scan_prices(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)).category(7))
            .await
            .unwrap();
        assert_eq!(cat7.len(), 2);

        // Validity window filter
        let june = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let recent = gateway
            .scan_prices(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)).valid_from(june))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].product_name, "Sprocket");
    }

    #[tokio::test]
    async fn test_update_prices_persists_and_reports_affected() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        let affected = gateway
            .update_prices(&PriceUpdate {
                product_id: 10,
                price_list_version_id: 100,
                list_price: Some(Money::from_cents(1049)),
                standard_price: Some(Money::from_cents(944)),
                limit_price: Some(Money::from_cents(839)),
            })
            .await
            .unwrap();
        assert_eq!(affected, 1);

        // Unknown key affects nothing
        let affected = gateway
            .update_prices(&PriceUpdate {
                product_id: 999,
                price_list_version_id: 100,
                list_price: None,
                standard_price: None,
                limit_price: None,
            })
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let rescanned = gateway
            .scan_prices(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)).category(7))
            .await
            .unwrap();
        assert_eq!(rescanned[0].list_price, Some(Money::from_cents(1049)));
    }

    #[tokio::test]
    async fn test_repricer_end_to_end() {
        let db = seeded_db().await;
        let gateway = db.gateway();
        let repricer = BatchRepricer::new(&gateway);

        let report = repricer
            .run(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)).category(7))
            .await
            .unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.updated, 2);

        let rescanned = gateway
            .scan_prices(&PriceAdjustmentSpec::new(Adjustment::Percentage(500)).category(7))
            .await
            .unwrap();
        // 9.99 +5% = 10.49, NULL limit price untouched
        assert_eq!(rescanned[0].list_price, Some(Money::from_cents(1049)));
        assert_eq!(rescanned[1].list_price, Some(Money::from_cents(10500)));
        assert_eq!(rescanned[1].limit_price, None);
    }

    #[tokio::test]
    async fn test_sales_by_customer_aggregates_processed_orders() {
        let db = seeded_db().await;
        let gateway = db.gateway();

        let sales = gateway.sales_by_customer(None, None).await.unwrap();
        assert_eq!(sales.len(), 2);
        // Ordered by total descending: Globex 1000.00 then Acme 750.00
        assert_eq!(sales[0].customer, "Globex");
        assert_eq!(sales[0].total, Money::from_cents(100000));
        assert_eq!(sales[0].orders, 1);
        assert_eq!(sales[1].customer, "Acme");
        assert_eq!(sales[1].total, Money::from_cents(75000));
        assert_eq!(sales[1].orders, 2);

        // The draft order (999999) never counts
        assert!(sales.iter().all(|s| s.total != Money::from_cents(999999)));

        // Date window trims to March onwards
        let march = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let windowed = gateway.sales_by_customer(Some(march), None).await.unwrap();
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].customer, "Acme");
        assert_eq!(windowed[0].total, Money::from_cents(25000));
    }
}
