use log::*;
use recon_common::Secret;

use crate::{
    credentials::CredentialBundle,
    errors::MetadataError,
    traits::LedgerClient,
};

/// The four provider-specific numeric ids every ledger entry needs. Resolved once per run, by exact name match,
/// because the ids differ between ledger accounts and must never be hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerIds {
    pub income_account_id: i64,
    pub fee_account_id: i64,
    pub income_tax_id: i64,
    pub fee_tax_id: i64,
}

/// Resolve the configured account/tax category names against the provider's listings. Any missing name is fatal;
/// posting with a guessed id is explicitly disallowed.
pub async fn resolve_ledger_ids<L: LedgerClient>(
    ledger: &L,
    access_token: &Secret<String>,
    bundle: &CredentialBundle,
) -> Result<LedgerIds, MetadataError> {
    let accounts = ledger.account_categories(access_token, bundle.company_id).await?;
    let taxes = ledger.tax_categories(access_token, bundle.company_id).await?;
    let income_account_id =
        find_id("account category", &bundle.income_account_name, accounts.iter().map(|a| (a.id, a.name.as_str())))?;
    let fee_account_id =
        find_id("account category", &bundle.fee_account_name, accounts.iter().map(|a| (a.id, a.name.as_str())))?;
    let income_tax_id =
        find_id("tax category", &bundle.income_tax_name, taxes.iter().map(|t| (t.id, t.name.as_str())))?;
    let fee_tax_id = find_id("tax category", &bundle.fee_tax_name, taxes.iter().map(|t| (t.id, t.name.as_str())))?;
    let ids = LedgerIds { income_account_id, fee_account_id, income_tax_id, fee_tax_id };
    info!("Resolved ledger ids: {ids:?}");
    Ok(ids)
}

fn find_id<'a, I>(kind: &'static str, name: &str, mut entries: I) -> Result<i64, MetadataError>
where I: Iterator<Item = (i64, &'a str)> {
    entries
        .find(|(_, n)| *n == name)
        .map(|(id, _)| id)
        .ok_or_else(|| MetadataError::NameNotFound { kind, name: name.to_string() })
}

#[cfg(test)]
mod test {
    use recon_common::Secret;

    use crate::test_utils::{prepare_env, sample_bundle, FlakyLedger};

    use super::*;

    #[tokio::test]
    async fn all_four_names_resolve() {
        prepare_env();
        let ledger = FlakyLedger::default();
        let bundle = sample_bundle();
        let token = Secret::new("access-1".to_string());
        let ids = resolve_ledger_ids(&ledger, &token, &bundle).await.unwrap();
        assert_eq!(ids, LedgerIds { income_account_id: 101, fee_account_id: 102, income_tax_id: 21, fee_tax_id: 22 });
    }

    #[tokio::test]
    async fn a_missing_name_is_a_named_failure() {
        prepare_env();
        let ledger = FlakyLedger::default();
        let mut bundle = sample_bundle();
        bundle.fee_tax_name = "No Such Tax".to_string();
        let token = Secret::new("access-1".to_string());
        let err = resolve_ledger_ids(&ledger, &token, &bundle).await.unwrap_err();
        match err {
            MetadataError::NameNotFound { kind, name } => {
                assert_eq!(kind, "tax category");
                assert_eq!(name, "No Such Tax");
            },
            other => panic!("Expected NameNotFound, got {other:?}"),
        }
    }
}
