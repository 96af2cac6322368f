use ledger_tools::{AccountCategory, LedgerApi, LedgerApiError, NewLedgerEntry, TaxCategory, TokenPair};
use recon_common::Secret;

use crate::credentials::CredentialBundle;

/// The slice of the bookkeeping API the pipeline uses. [`LedgerApi`] is the production implementation; tests
/// substitute stubs to exercise the failure-isolation paths without a network.
#[allow(async_fn_in_trait)]
pub trait LedgerClient {
    /// Exchange the bundle's refresh token for a fresh token pair. The submitted refresh token is dead afterwards.
    async fn refresh_access_token(&self, bundle: &CredentialBundle) -> Result<TokenPair, LedgerApiError>;

    async fn account_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<AccountCategory>, LedgerApiError>;

    async fn tax_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<TaxCategory>, LedgerApiError>;

    /// Create one remote ledger entry, returning its id. Not idempotent.
    async fn create_entry(
        &self,
        access_token: &Secret<String>,
        entry: &NewLedgerEntry,
    ) -> Result<i64, LedgerApiError>;
}

impl LedgerClient for LedgerApi {
    async fn refresh_access_token(&self, bundle: &CredentialBundle) -> Result<TokenPair, LedgerApiError> {
        LedgerApi::refresh_access_token(self, &bundle.client_id, &bundle.client_secret, &bundle.refresh_token).await
    }

    async fn account_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<AccountCategory>, LedgerApiError> {
        LedgerApi::account_categories(self, access_token, company_id).await
    }

    async fn tax_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<TaxCategory>, LedgerApiError> {
        LedgerApi::tax_categories(self, access_token, company_id).await
    }

    async fn create_entry(
        &self,
        access_token: &Secret<String>,
        entry: &NewLedgerEntry,
    ) -> Result<i64, LedgerApiError> {
        LedgerApi::create_entry(self, access_token, entry).await
    }
}
