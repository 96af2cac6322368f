//! The core grouping and validation pass.
//!
//! [`aggregate`] is a pure function of the row sequence: no I/O, deterministic given row order, and it never fails
//! on a malformed individual row. Bad rows are logged and skipped, bad orders are excluded whole and reported in the
//! outcome so an operator can follow up.

use chrono::NaiveDate;
use indexmap::IndexMap;
use log::*;
use recon_common::{parse_amount, parse_fee, Money};

use crate::export::{
    RawLineItemRow,
    COL_ITEM_NAME,
    COL_ITEM_SUBTOTAL,
    COL_ITEM_VARIATION,
    COL_ORDER_DATE,
    COL_ORDER_ID,
    FEE_COLUMN_ALIASES,
};

/// Label used in the order description for items without a variation.
const NO_VARIATION_LABEL: &str = "standard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub name: String,
    pub variation: Option<String>,
    pub subtotal: Money,
}

/// One order under construction. The fee and date are frozen the first time they are seen; items accumulate across
/// every row belonging to the order.
#[derive(Debug, Clone)]
pub struct OrderAggregate {
    pub order_id: String,
    pub order_date: Option<String>,
    pub total_fee: Money,
    pub items: Vec<OrderItem>,
}

impl OrderAggregate {
    fn new(order_id: &str, row: &RawLineItemRow) -> Self {
        let raw_fee = row.first_of(&FEE_COLUMN_ALIASES).unwrap_or("0");
        let total_fee = parse_fee(raw_fee).unwrap_or_else(|e| {
            warn!("Order {order_id}: unparseable fee, defaulting to zero. {e}");
            Money::default()
        });
        Self { order_id: order_id.to_string(), order_date: None, total_fee, items: Vec::new() }
    }

    fn observe_date(&mut self, row: &RawLineItemRow) {
        // First non-blank date wins; later rows never overwrite it.
        if self.order_date.is_none() {
            let date = row.get_or_blank(COL_ORDER_DATE);
            if !date.is_empty() {
                self.order_date = Some(date.to_string());
            }
        }
    }

    fn push_item(&mut self, row: &RawLineItemRow) {
        let name = row.get_or_blank(COL_ITEM_NAME).to_string();
        let variation = row.get(COL_ITEM_VARIATION).filter(|v| !v.is_empty()).map(String::from);
        let subtotal = parse_amount(row.get_or_blank(COL_ITEM_SUBTOTAL)).unwrap_or_else(|e| {
            warn!("Order {}: unparseable item subtotal, defaulting to zero. {e}", self.order_id);
            Money::default()
        });
        self.items.push(OrderItem { name, variation, subtotal });
    }
}

/// An order that survived validation, ready for posting.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub order_id: String,
    pub issue_date: NaiveDate,
    pub total_amount: Money,
    pub fee: Money,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No row of the order carried a parseable calendar date.
    UnparseableDate,
    /// The item subtotals summed to zero, so there is nothing to post.
    ZeroTotal,
}

/// A whole order excluded from posting, with the unvalidated aggregate attached for manual follow-up.
#[derive(Debug, Clone)]
pub struct SkippedOrder {
    pub reason: SkipReason,
    pub aggregate: OrderAggregate,
}

#[derive(Debug, Default)]
pub struct AggregationOutcome {
    pub orders: Vec<ValidatedOrder>,
    pub skipped: Vec<SkippedOrder>,
    /// Rows discarded before grouping because they carried no order id.
    pub dropped_rows: usize,
}

/// Group raw export rows into validated orders.
///
/// Single forward pass, insertion-ordered. Rows without an order id are dropped with a warning. An order's fee comes
/// from its first row only (fees are order-level values repeated nowhere else in the export, never summed); the date
/// comes from the first row that has one, wherever in the group that row sits.
pub fn aggregate<I>(rows: I) -> AggregationOutcome
where I: IntoIterator<Item = RawLineItemRow> {
    let mut groups: IndexMap<String, OrderAggregate> = IndexMap::new();
    let mut dropped_rows = 0;
    for row in rows {
        let order_id = row.get_or_blank(COL_ORDER_ID).to_string();
        if order_id.is_empty() {
            warn!("Dropping export row without an order id: {row:?}");
            dropped_rows += 1;
            continue;
        }
        let aggregate = groups.entry(order_id.clone()).or_insert_with(|| OrderAggregate::new(&order_id, &row));
        aggregate.observe_date(&row);
        aggregate.push_item(&row);
    }
    let mut outcome = AggregationOutcome { dropped_rows, ..Default::default() };
    for (_, aggregate) in groups {
        match validate(aggregate) {
            Ok(order) => outcome.orders.push(order),
            Err(skip) => {
                warn!("Skipping order {} ({:?}): {:?}", skip.aggregate.order_id, skip.reason, skip.aggregate);
                outcome.skipped.push(skip);
            },
        }
    }
    debug!(
        "Aggregation complete: {} orders validated, {} skipped, {} rows dropped",
        outcome.orders.len(),
        outcome.skipped.len(),
        outcome.dropped_rows
    );
    outcome
}

fn validate(aggregate: OrderAggregate) -> Result<ValidatedOrder, SkippedOrder> {
    let parsed_date = aggregate.order_date.as_deref().and_then(parse_order_date);
    let issue_date = match parsed_date {
        Some(date) => date,
        None => return Err(SkippedOrder { reason: SkipReason::UnparseableDate, aggregate }),
    };
    let total_amount: Money = aggregate.items.iter().map(|i| i.subtotal).sum();
    if total_amount.is_zero() {
        return Err(SkippedOrder { reason: SkipReason::ZeroTotal, aggregate });
    }
    let description = describe(&aggregate.items);
    Ok(ValidatedOrder {
        order_id: aggregate.order_id,
        issue_date,
        total_amount,
        fee: aggregate.total_fee,
        description,
    })
}

/// Parse the export's order timestamp into a calendar date. Both `2024/01/10` and `2024-01-10` spellings occur, with
/// or without a trailing time-of-day component.
fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
        .ok()
}

fn describe(items: &[OrderItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} ({})", item.name, item.variation.as_deref().unwrap_or(NO_VARIATION_LABEL)))
        .collect::<Vec<String>>()
        .join(" / ")
}
