use ledger_tools::{EntryDetail, EntryPayment, EntryType, LedgerApiError, NewLedgerEntry};
use log::*;
use recon_common::Secret;

use crate::{aggregator::ValidatedOrder, metadata::LedgerIds, traits::LedgerClient};

/// Build the double-entry representation of one validated order: gross income and the (negative) platform fee as
/// opposing accrual lines, and the net settlement into the configured wallet as the payment line.
pub fn build_ledger_entry(
    order: &ValidatedOrder,
    ids: &LedgerIds,
    company_id: i64,
    wallet_id: i64,
) -> NewLedgerEntry {
    let income = EntryDetail {
        account_category_id: ids.income_account_id,
        tax_category_id: ids.income_tax_id,
        amount: order.total_amount.value(),
        description: Some(format!("Order {}: {}", order.order_id, order.description)),
    };
    let fee = EntryDetail {
        account_category_id: ids.fee_account_id,
        tax_category_id: ids.fee_tax_id,
        amount: (-order.fee).value(),
        description: None,
    };
    let settlement = EntryPayment {
        date: order.issue_date,
        wallet_id,
        amount: (order.total_amount - order.fee).value(),
    };
    NewLedgerEntry {
        company_id,
        issue_date: order.issue_date,
        entry_type: EntryType::Income,
        details: vec![income, fee],
        payments: vec![settlement],
    }
}

/// Post one order to the ledger. Creates exactly one remote entry per successful call; there is no idempotency key,
/// so a retry after an ambiguous failure can double-post. Reprocessing an export is a manual procedure that must
/// first check the ledger for existing entries (see DESIGN.md).
pub async fn post_order<L: LedgerClient>(
    ledger: &L,
    access_token: &Secret<String>,
    order: &ValidatedOrder,
    ids: &LedgerIds,
    company_id: i64,
    wallet_id: i64,
) -> Result<i64, LedgerApiError> {
    let entry = build_ledger_entry(order, ids, company_id, wallet_id);
    debug!("Posting order {} ({} items total {})", order.order_id, entry.details.len(), order.total_amount);
    let entry_id = ledger.create_entry(access_token, &entry).await?;
    info!("Posted order {} as ledger entry #{entry_id}", order.order_id);
    Ok(entry_id)
}
