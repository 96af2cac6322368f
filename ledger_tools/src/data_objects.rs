use chrono::NaiveDate;
use recon_common::Secret;
use serde::{Deserialize, Serialize};

/// The result of a refresh-token exchange. The provider rotates refresh tokens on every exchange, so the
/// `refresh_token` carried here is brand new and the one that was sent is already dead.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
}

/// One entry from the provider's account-category listing. The numeric ids are account-specific and must always be
/// resolved at runtime by name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountCategory {
    pub id: i64,
    pub name: String,
}

/// One entry from the provider's tax-category listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaxCategory {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Income,
    Expense,
}

/// One accrual line of a ledger entry. Income lines carry a positive amount, deductions (fees) a negative one.
#[derive(Debug, Clone, Serialize)]
pub struct EntryDetail {
    pub account_category_id: i64,
    pub tax_category_id: i64,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One settlement line of a ledger entry, recording the net amount received into a wallet.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPayment {
    pub date: NaiveDate,
    pub wallet_id: i64,
    pub amount: i64,
}

/// The payload of the entry-creation endpoint. Write-once: the pipeline never updates or deletes remote entries.
#[derive(Debug, Clone, Serialize)]
pub struct NewLedgerEntry {
    pub company_id: i64,
    pub issue_date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub details: Vec<EntryDetail>,
    pub payments: Vec<EntryPayment>,
}
