use log::*;
use recon_common::Secret;

use crate::{
    credentials::{CredentialBundle, VersionedCredentials},
    errors::PipelineError,
    traits::{CredentialStore, LedgerClient},
};

/// Exchange the bundle's refresh token and persist the rotated replacement.
///
/// The order of operations is load-bearing: the new refresh token is written back to the store *before* the access
/// token is released to the caller. The provider invalidated the old refresh token the moment the exchange
/// succeeded, so a persist failure here means the only copy of the new token is about to be dropped. That is fatal
/// for every future run, not just this one, and is surfaced as [`PipelineError::TokenPersist`].
pub async fn rotate_and_refresh<L, S>(
    ledger: &L,
    store: &S,
    creds: VersionedCredentials,
) -> Result<(Secret<String>, CredentialBundle), PipelineError>
where
    L: LedgerClient,
    S: CredentialStore,
{
    let VersionedCredentials { mut bundle, version } = creds;
    let tokens = ledger.refresh_access_token(&bundle).await.map_err(PipelineError::TokenRefresh)?;
    bundle.rotate_refresh_token(tokens.refresh_token);
    match store.write(&bundle, version).await {
        Ok(new_version) => {
            debug!("Rotated refresh token persisted at version {new_version}");
            Ok((tokens.access_token, bundle))
        },
        Err(e) => {
            error!(
                "Rotated refresh token could not be persisted. The old refresh token is already invalid; manual \
                 re-authorization will be required. {e}"
            );
            Err(PipelineError::TokenPersist(e))
        },
    }
}
