//! In-memory [`QueryGateway`] fixture shared by the unit tests.
//!
//! Failure-injection flags simulate a store that stops answering mid-event;
//! call counters let tests assert which lookups did NOT happen.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{LookupError, LookupResult};
use crate::gateway::QueryGateway;
use crate::types::{
    CustomerSales, OrderLineSnapshot, PartnerSnapshot, PriceAdjustmentSpec, PriceUpdate,
    PricedRecord, ProductSnapshot, TaxRate,
};

#[derive(Default)]
pub(crate) struct MemoryGateway {
    pub partners: HashMap<i64, PartnerSnapshot>,
    pub special_customers: HashSet<i64>,
    pub products: HashMap<i64, ProductSnapshot>,
    pub tax_rates: HashMap<i64, TaxRate>,
    pub order_lines: HashMap<i64, Vec<OrderLineSnapshot>>,
    pub on_hand: HashMap<(i64, i64), i64>,
    pub priced: Vec<PricedRecord>,
    pub sales: Vec<CustomerSales>,

    pub fail_partner_lookups: bool,
    pub fail_stock_lookups: bool,
    pub fail_scans: bool,
    pub fail_updates: bool,
    pub update_affects_no_rows: bool,

    stock_calls: AtomicUsize,
    scan_calls: AtomicUsize,
    updates: Mutex<Vec<PriceUpdate>>,
}

impl MemoryGateway {
    pub fn stock_call_count(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    pub fn scan_call_count(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_updates(&self) -> Vec<PriceUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn down() -> LookupError {
        LookupError::Unavailable("fixture store is down".to_string())
    }
}

#[async_trait]
impl QueryGateway for MemoryGateway {
    async fn partner(&self, partner_id: i64) -> LookupResult<Option<PartnerSnapshot>> {
        if self.fail_partner_lookups {
            return Err(Self::down());
        }
        Ok(self.partners.get(&partner_id).cloned())
    }

    async fn partner_name_taken(&self, name: &str, exclude_id: Option<i64>) -> LookupResult<bool> {
        if self.fail_partner_lookups {
            return Err(Self::down());
        }
        Ok(self
            .partners
            .values()
            .any(|p| p.name == name && Some(p.id) != exclude_id))
    }

    async fn is_special_customer(&self, partner_id: i64) -> LookupResult<bool> {
        if self.fail_partner_lookups {
            return Err(Self::down());
        }
        Ok(self.special_customers.contains(&partner_id))
    }

    async fn product(&self, product_id: i64) -> LookupResult<Option<ProductSnapshot>> {
        Ok(self.products.get(&product_id).cloned())
    }

    async fn tax_rate(&self, tax_id: i64) -> LookupResult<Option<TaxRate>> {
        Ok(self.tax_rates.get(&tax_id).copied())
    }

    async fn order_lines(&self, order_id: i64) -> LookupResult<Vec<OrderLineSnapshot>> {
        Ok(self.order_lines.get(&order_id).cloned().unwrap_or_default())
    }

    async fn quantity_on_hand(&self, product_id: i64, warehouse_id: i64) -> LookupResult<i64> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stock_lookups {
            return Err(Self::down());
        }
        Ok(self
            .on_hand
            .get(&(product_id, warehouse_id))
            .copied()
            .unwrap_or(0))
    }

    async fn scan_prices(&self, _spec: &PriceAdjustmentSpec) -> LookupResult<Vec<PricedRecord>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scans {
            return Err(Self::down());
        }
        Ok(self.priced.clone())
    }

    async fn update_prices(&self, update: &PriceUpdate) -> LookupResult<u64> {
        if self.fail_updates {
            return Err(Self::down());
        }
        if self.update_affects_no_rows {
            return Ok(0);
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(1)
    }

    async fn sales_by_customer(
        &self,
        _from: Option<DateTime<Utc>>,
        _to: Option<DateTime<Utc>>,
    ) -> LookupResult<Vec<CustomerSales>> {
        Ok(self.sales.clone())
    }
}
