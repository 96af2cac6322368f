use std::{fs, path::PathBuf};

use log::*;
use recon_common::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    credentials::{CredentialBundle, VersionedCredentials},
    errors::CredentialStoreError,
    traits::CredentialStore,
};

/// The on-disk representation: a flat object of named secret fields plus the version counter.
#[derive(Serialize, Deserialize)]
struct StoredBundle {
    version: u64,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    company_id: i64,
    wallet_id: i64,
    income_account_name: String,
    fee_account_name: String,
    income_tax_name: String,
    fee_tax_name: String,
}

impl StoredBundle {
    fn from_bundle(bundle: &CredentialBundle, version: u64) -> Self {
        Self {
            version,
            client_id: bundle.client_id.clone(),
            client_secret: bundle.client_secret.reveal().clone(),
            refresh_token: bundle.refresh_token.reveal().clone(),
            company_id: bundle.company_id,
            wallet_id: bundle.wallet_id,
            income_account_name: bundle.income_account_name.clone(),
            fee_account_name: bundle.fee_account_name.clone(),
            income_tax_name: bundle.income_tax_name.clone(),
            fee_tax_name: bundle.fee_tax_name.clone(),
        }
    }

    fn into_versioned(self) -> VersionedCredentials {
        let bundle = CredentialBundle {
            client_id: self.client_id,
            client_secret: Secret::new(self.client_secret),
            refresh_token: Secret::new(self.refresh_token),
            company_id: self.company_id,
            wallet_id: self.wallet_id,
            income_account_name: self.income_account_name,
            fee_account_name: self.fee_account_name,
            income_tax_name: self.income_tax_name,
            fee_tax_name: self.fee_tax_name,
        };
        VersionedCredentials { bundle, version: self.version }
    }
}

/// A file-backed credential store for single-host deployments.
///
/// Writes are conditional on the stored version matching the caller's expectation. There is no OS-level file lock,
/// so the check-then-write is not atomic against a concurrent process on the same file; the scheduler must still
/// guarantee at most one run per bundle.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<StoredBundle, CredentialStoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| CredentialStoreError::Storage(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| CredentialStoreError::Malformed(e.to_string()))
    }
}

impl CredentialStore for JsonFileStore {
    async fn read(&self) -> Result<VersionedCredentials, CredentialStoreError> {
        debug!("Reading credential bundle from {}", self.path.display());
        Ok(self.load()?.into_versioned())
    }

    async fn write(&self, bundle: &CredentialBundle, expected_version: u64) -> Result<u64, CredentialStoreError> {
        let current = self.load()?;
        if current.version != expected_version {
            return Err(CredentialStoreError::VersionConflict {
                expected: expected_version,
                actual: current.version,
            });
        }
        let next = StoredBundle::from_bundle(bundle, expected_version + 1);
        let raw = serde_json::to_string_pretty(&next).map_err(|e| CredentialStoreError::Malformed(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| CredentialStoreError::Storage(e.to_string()))?;
        debug!("Credential bundle written at version {}", next.version);
        Ok(next.version)
    }
}

#[cfg(test)]
mod test {
    use recon_common::Secret;

    use crate::test_utils::{prepare_env, sample_bundle};

    use super::*;

    fn store_with(bundle: &CredentialBundle, version: u64) -> (tempfile::NamedTempFile, JsonFileStore) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let raw = serde_json::to_string_pretty(&StoredBundle::from_bundle(bundle, version)).unwrap();
        fs::write(file.path(), raw).unwrap();
        let store = JsonFileStore::new(file.path());
        (file, store)
    }

    #[tokio::test]
    async fn round_trips_the_bundle() {
        prepare_env();
        let (_file, store) = store_with(&sample_bundle(), 3);
        let creds = store.read().await.unwrap();
        assert_eq!(creds.version, 3);
        assert_eq!(creds.bundle.client_id, "client-id");
        assert_eq!(creds.bundle.refresh_token.reveal(), "refresh-0");
        assert_eq!(creds.bundle.company_id, 7);
    }

    #[tokio::test]
    async fn conditional_write_bumps_the_version() {
        prepare_env();
        let (_file, store) = store_with(&sample_bundle(), 1);
        let mut bundle = sample_bundle();
        bundle.rotate_refresh_token(Secret::new("refresh-next".to_string()));
        let version = store.write(&bundle, 1).await.unwrap();
        assert_eq!(version, 2);
        let creds = store.read().await.unwrap();
        assert_eq!(creds.bundle.refresh_token.reveal(), "refresh-next");
    }

    #[tokio::test]
    async fn stale_writes_are_rejected_and_leave_the_file_alone() {
        prepare_env();
        let (_file, store) = store_with(&sample_bundle(), 5);
        let mut bundle = sample_bundle();
        bundle.rotate_refresh_token(Secret::new("refresh-stale".to_string()));
        let err = store.write(&bundle, 4).await.unwrap_err();
        assert!(matches!(err, CredentialStoreError::VersionConflict { expected: 4, actual: 5 }));
        let creds = store.read().await.unwrap();
        assert_eq!(creds.version, 5);
        assert_eq!(creds.bundle.refresh_token.reveal(), "refresh-0");
    }

    #[tokio::test]
    async fn a_garbled_file_is_a_malformed_error() {
        prepare_env();
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "not json").unwrap();
        let store = JsonFileStore::new(file.path());
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, CredentialStoreError::Malformed(_)));
    }
}
