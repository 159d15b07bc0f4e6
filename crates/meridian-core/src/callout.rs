//! # Field Callouts
//!
//! Derived-field writers fired by the host while a user edits an order
//! line. Unlike the [`rules`](crate::rules) chain, callouts MUTATE the
//! record: they read the fields the user just touched, fetch whatever
//! reference data they need, and write the derived fields back.
//!
//! A callout can still veto: a [`Verdict::Rejected`] tells the host to
//! show the message and discard the edit.

use tracing::debug;

use crate::error::LookupResult;
use crate::gateway::QueryGateway;
use crate::pricing::{apply_discount, compute_line_amounts, DiscountSchedule};
use crate::record::{fields, FieldValue, RecordAccessor};
use crate::rules::Verdict;

/// Recomputes net, tax, and total after a quantity, price, or tax edit.
///
/// Does nothing (passes) while quantity or unit price is still absent -
/// the user has not finished entering the line yet. Invalid entered
/// values come back as rejections, not errors: the host surfaces them
/// exactly like rule violations.
pub async fn recalculate_line(
    record: &mut dyn RecordAccessor,
    gateway: &dyn QueryGateway,
) -> LookupResult<Verdict> {
    let (Some(quantity), Some(unit_price)) = (
        record.integer(fields::QUANTITY),
        record.money(fields::UNIT_PRICE),
    ) else {
        return Ok(Verdict::Pass);
    };

    let tax_rate = match record.integer(fields::TAX_ID).filter(|id| *id > 0) {
        Some(tax_id) => gateway.tax_rate(tax_id).await?,
        None => None,
    };

    let amounts = match compute_line_amounts(quantity, unit_price, tax_rate) {
        Ok(amounts) => amounts,
        Err(err) => return Ok(Verdict::rejected(err.to_string())),
    };

    record.set(fields::LINE_NET, FieldValue::Money(amounts.net));
    record.set(fields::TAX_AMOUNT, FieldValue::Money(amounts.tax));
    record.set(fields::LINE_TOTAL, FieldValue::Money(amounts.total));
    debug!(quantity, net = %amounts.net, total = %amounts.total, "recalculated line");
    Ok(Verdict::Pass)
}

/// Copies the product display name onto the line after a product edit,
/// vetoing products that cannot be sold.
///
/// An unknown product id passes untouched; the host's own reference
/// integrity rejects it at persist time with a better message.
pub async fn refresh_product(
    record: &mut dyn RecordAccessor,
    gateway: &dyn QueryGateway,
) -> LookupResult<Verdict> {
    let Some(product_id) = record.integer(fields::PRODUCT_ID).filter(|id| *id > 0) else {
        return Ok(Verdict::Pass);
    };
    let Some(product) = gateway.product(product_id).await? else {
        return Ok(Verdict::Pass);
    };

    if !product.is_active {
        return Ok(Verdict::rejected(format!(
            "product {} is not active",
            product.name
        )));
    }
    if !product.is_sellable {
        return Ok(Verdict::rejected(format!(
            "product {} is not available for sale",
            product.name
        )));
    }

    record.set(fields::PRODUCT_NAME, FieldValue::Text(product.name));
    Ok(Verdict::Pass)
}

/// Applies the tiered volume discount after a quantity edit.
///
/// Writes the combined discount (basis points) and, when a discount
/// actually applies and a list price is present, the discounted unit
/// price. A below-threshold quantity still writes the zero discount so a
/// lowered quantity clears an earlier one.
pub async fn apply_volume_discount(
    record: &mut dyn RecordAccessor,
    gateway: &dyn QueryGateway,
    schedule: &DiscountSchedule,
) -> LookupResult<Verdict> {
    let Some(quantity) = record.integer(fields::QUANTITY) else {
        return Ok(Verdict::Pass);
    };

    let special = match record.integer(fields::PARTNER_ID).filter(|id| *id > 0) {
        Some(partner_id) => gateway.is_special_customer(partner_id).await?,
        None => false,
    };

    let discount_bps = schedule.discount_for(quantity, special);
    record.set(fields::DISCOUNT_BPS, FieldValue::Integer(discount_bps as i64));

    if discount_bps > 0 {
        if let Some(list_price) = record.money(fields::PRICE_LIST) {
            let discounted = apply_discount(list_price, discount_bps);
            record.set(fields::UNIT_PRICE, FieldValue::Money(discounted.net_price));
            debug!(
                quantity,
                special,
                discount_bps,
                unit_price = %discounted.net_price,
                "applied volume discount"
            );
        }
    }

    Ok(Verdict::Pass)
}

// =============================================================================
// Unit Tests
// =============================================================================
