use log::*;

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Base url of the bookkeeping REST API, e.g. "https://api.ledger.example.com"
    pub api_base: String,
    /// Base url of the OAuth authorization server. Often, but not always, the same host as `api_base`.
    pub auth_base: String,
    /// Value of the `X-Api-Version` header sent with every API call.
    pub api_version: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.ledger.example.com".to_string(),
            auth_base: "https://accounts.ledger.example.com".to_string(),
            api_version: "2024-06-01".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = LedgerConfig::default();
        let api_base = std::env::var("RECON_LEDGER_API_BASE").unwrap_or_else(|_| {
            warn!("RECON_LEDGER_API_BASE not set, using (probably useless) default");
            defaults.api_base
        });
        let auth_base = std::env::var("RECON_LEDGER_AUTH_BASE").unwrap_or_else(|_| {
            warn!("RECON_LEDGER_AUTH_BASE not set, using (probably useless) default");
            defaults.auth_base
        });
        let api_version = std::env::var("RECON_LEDGER_API_VERSION").unwrap_or_else(|_| {
            warn!("RECON_LEDGER_API_VERSION not set, using {} as default", defaults.api_version);
            defaults.api_version
        });
        Self { api_base, auth_base, api_version }
    }
}
