//! In-memory trait implementations and fixtures for unit and pipeline tests.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use ledger_tools::{AccountCategory, LedgerApiError, NewLedgerEntry, TaxCategory, TokenPair};
use log::*;
use recon_common::Secret;

use crate::{
    credentials::{CredentialBundle, VersionedCredentials},
    errors::{CredentialStoreError, RowSourceError},
    export::{RawLineItemRow, COL_ITEM_NAME, COL_ITEM_SUBTOTAL, COL_ORDER_DATE, COL_ORDER_ID},
    traits::{CredentialStore, LedgerClient, RowSource},
};

pub fn prepare_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// Build a raw row from column/value pairs.
pub fn row(pairs: &[(&str, &str)]) -> RawLineItemRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Build a typical line-item row, using the legacy fee column spelling.
pub fn item_row(order: &str, date: &str, name: &str, subtotal: &str, fee: &str) -> RawLineItemRow {
    row(&[
        (COL_ORDER_ID, order),
        (COL_ORDER_DATE, date),
        (COL_ITEM_NAME, name),
        (COL_ITEM_SUBTOTAL, subtotal),
        ("fee", fee),
    ])
}

/// A credential bundle whose category names match [`FlakyLedger`]'s listings.
pub fn sample_bundle() -> CredentialBundle {
    CredentialBundle {
        client_id: "client-id".to_string(),
        client_secret: Secret::new("client-secret".to_string()),
        refresh_token: Secret::new("refresh-0".to_string()),
        company_id: 7,
        wallet_id: 55,
        income_account_name: "Sales".to_string(),
        fee_account_name: "Payment processing fees".to_string(),
        income_tax_name: "Taxable sales 10%".to_string(),
        fee_tax_name: "Non-taxable purchases".to_string(),
    }
}

/// An in-memory [`CredentialStore`] with the same versioned CAS semantics as the file-backed store.
#[derive(Clone)]
pub struct MemoryCredentialStore {
    inner: Arc<Mutex<(CredentialBundle, u64)>>,
}

impl MemoryCredentialStore {
    pub fn new(bundle: CredentialBundle) -> Self {
        Self { inner: Arc::new(Mutex::new((bundle, 1))) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn read(&self) -> Result<VersionedCredentials, CredentialStoreError> {
        let guard = self.inner.lock().map_err(|e| CredentialStoreError::Storage(e.to_string()))?;
        Ok(VersionedCredentials { bundle: guard.0.clone(), version: guard.1 })
    }

    async fn write(&self, bundle: &CredentialBundle, expected_version: u64) -> Result<u64, CredentialStoreError> {
        let mut guard = self.inner.lock().map_err(|e| CredentialStoreError::Storage(e.to_string()))?;
        if guard.1 != expected_version {
            return Err(CredentialStoreError::VersionConflict { expected: expected_version, actual: guard.1 });
        }
        *guard = (bundle.clone(), expected_version + 1);
        Ok(guard.1)
    }
}

/// A [`RowSource`] over a fixed row list.
#[derive(Clone, Default)]
pub struct StaticRowSource {
    rows: Vec<RawLineItemRow>,
}

impl StaticRowSource {
    pub fn new(rows: Vec<RawLineItemRow>) -> Self {
        Self { rows }
    }
}

impl RowSource for StaticRowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawLineItemRow>, RowSourceError> {
        Ok(self.rows.clone())
    }
}

/// A scriptable [`LedgerClient`] stub. By default everything succeeds; individual calls can be made to fail to
/// exercise the fatal-setup and per-order isolation paths. Created entries are recorded for inspection.
#[derive(Clone, Default)]
pub struct FlakyLedger {
    fail_refresh: bool,
    fail_first_post: bool,
    entries: Arc<Mutex<Vec<NewLedgerEntry>>>,
    posts: Arc<AtomicUsize>,
}

impl FlakyLedger {
    pub fn failing_refresh(mut self) -> Self {
        self.fail_refresh = true;
        self
    }

    pub fn failing_first_post(mut self) -> Self {
        self.fail_first_post = true;
        self
    }

    pub fn created_entries(&self) -> Vec<NewLedgerEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl LedgerClient for FlakyLedger {
    async fn refresh_access_token(&self, _bundle: &CredentialBundle) -> Result<TokenPair, LedgerApiError> {
        if self.fail_refresh {
            return Err(LedgerApiError::TokenExchangeError { status: 401, message: "invalid_grant".to_string() });
        }
        Ok(TokenPair {
            access_token: Secret::new("access-1".to_string()),
            refresh_token: Secret::new("refresh-1".to_string()),
        })
    }

    async fn account_categories(
        &self,
        _access_token: &Secret<String>,
        _company_id: i64,
    ) -> Result<Vec<AccountCategory>, LedgerApiError> {
        Ok(vec![
            AccountCategory { id: 101, name: "Sales".to_string() },
            AccountCategory { id: 102, name: "Payment processing fees".to_string() },
        ])
    }

    async fn tax_categories(
        &self,
        _access_token: &Secret<String>,
        _company_id: i64,
    ) -> Result<Vec<TaxCategory>, LedgerApiError> {
        Ok(vec![
            TaxCategory { id: 21, name: "Taxable sales 10%".to_string() },
            TaxCategory { id: 22, name: "Non-taxable purchases".to_string() },
        ])
    }

    async fn create_entry(
        &self,
        _access_token: &Secret<String>,
        entry: &NewLedgerEntry,
    ) -> Result<i64, LedgerApiError> {
        let call = self.posts.fetch_add(1, Ordering::SeqCst);
        if self.fail_first_post && call == 0 {
            return Err(LedgerApiError::QueryError { status: 422, message: "unprocessable entry".to_string() });
        }
        let mut entries = self.entries.lock().map_err(|e| LedgerApiError::RestRequestError(e.to_string()))?;
        entries.push(entry.clone());
        Ok(1000 + call as i64)
    }
}
