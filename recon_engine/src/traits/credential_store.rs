use crate::{
    credentials::{CredentialBundle, VersionedCredentials},
    errors::CredentialStoreError,
};

/// Storage for the OAuth credential bundle.
///
/// The ledger provider's refresh tokens are single-use: each exchange invalidates the token that was sent. If the
/// rotated token is lost before it is persisted, every subsequent run is locked out until a human re-authorizes the
/// app. The store therefore exposes a compare-and-swap write: the caller presents the version it read, and the write
/// fails with [`CredentialStoreError::VersionConflict`] if another run rotated first.
///
/// The CAS narrows the concurrent-run hazard to a named error; it does not remove it. Schedulers must still
/// guarantee at most one concurrent run per credential bundle.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Fetch the current bundle and its version.
    async fn read(&self) -> Result<VersionedCredentials, CredentialStoreError>;

    /// Persist the bundle, conditional on `expected_version` still being current. Returns the new version.
    async fn write(&self, bundle: &CredentialBundle, expected_version: u64) -> Result<u64, CredentialStoreError>;
}
