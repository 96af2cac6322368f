//! The OAuth credential bundle shared by every ledger call in a run.
//!
//! The bundle is fetched once per invocation and mutated exactly once, when the refresh token is rotated. Because the
//! provider's refresh tokens are single-use, the store treats the bundle as a versioned resource: writes are
//! conditional on the version read at the start of the run (see [`crate::traits::CredentialStore`]).

use recon_common::Secret;

#[derive(Debug, Clone)]
pub struct CredentialBundle {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub refresh_token: Secret<String>,
    /// The ledger company the entries are posted under.
    pub company_id: i64,
    /// The wallet the settlement payment lines are recorded against.
    pub wallet_id: i64,
    pub income_account_name: String,
    pub fee_account_name: String,
    pub income_tax_name: String,
    pub fee_tax_name: String,
}

impl CredentialBundle {
    /// Replace the refresh token after a successful exchange. The old token is already invalid at this point.
    pub fn rotate_refresh_token(&mut self, new_token: Secret<String>) {
        self.refresh_token = new_token;
    }
}

/// A credential bundle together with the store version it was read at.
#[derive(Debug, Clone)]
pub struct VersionedCredentials {
    pub bundle: CredentialBundle,
    pub version: u64,
}
