use std::sync::Arc;

use log::*;
use recon_common::Secret;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config::LedgerConfig,
    data_objects::{AccountCategory, NewLedgerEntry, TaxCategory, TokenPair},
    LedgerApiError,
};

#[derive(Clone)]
pub struct LedgerApi {
    config: LedgerConfig,
    client: Arc<Client>,
}

/// A request that never reached the server (bad build, refused connection) is a request error; anything that failed
/// after delivery is a response error.
fn request_error(e: reqwest::Error) -> LedgerApiError {
    if e.is_builder() || e.is_connect() {
        LedgerApiError::RestRequestError(e.to_string())
    } else {
        LedgerApiError::RestResponseError(e.to_string())
    }
}

impl LedgerApi {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let version = HeaderValue::from_str(config.api_version.as_str())
            .map_err(|e| LedgerApiError::Initialization(e.to_string()))?;
        headers.insert("X-Api-Version", version);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
        access_token: &Secret<String>,
    ) -> Result<T, LedgerApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url).bearer_auth(access_token.reveal());
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(request_error)?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| LedgerApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| LedgerApiError::RestResponseError(e.to_string()))?;
            Err(LedgerApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.config.api_base)
    }

    /// Exchange the current refresh token for a fresh access/refresh token pair.
    ///
    /// The provider invalidates the submitted refresh token the moment the exchange succeeds, so the caller must
    /// persist the returned refresh token before doing anything else with the pair.
    pub async fn refresh_access_token(
        &self,
        client_id: &str,
        client_secret: &Secret<String>,
        refresh_token: &Secret<String>,
    ) -> Result<TokenPair, LedgerApiError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            refresh_token: String,
        }
        let url = format!("{}/oauth/token", self.config.auth_base);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret.reveal().as_str()),
            ("refresh_token", refresh_token.reveal().as_str()),
        ];
        debug!("Exchanging refresh token at {url}");
        let response = self.client.post(url).form(&form).send().await.map_err(request_error)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| LedgerApiError::RestResponseError(e.to_string()))?;
            return Err(LedgerApiError::TokenExchangeError { status, message });
        }
        let tokens = response.json::<TokenResponse>().await.map_err(|e| LedgerApiError::JsonError(e.to_string()))?;
        info!("Refresh token exchange succeeded");
        Ok(TokenPair {
            access_token: Secret::new(tokens.access_token),
            refresh_token: Secret::new(tokens.refresh_token),
        })
    }

    pub async fn account_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<AccountCategory>, LedgerApiError> {
        #[derive(Deserialize)]
        struct CategoryResponse {
            account_categories: Vec<AccountCategory>,
        }
        let company = company_id.to_string();
        debug!("Fetching account categories for company {company}");
        let result = self
            .rest_query::<CategoryResponse, ()>(
                Method::GET,
                "/account_categories",
                &[("company_id", company.as_str())],
                None,
                access_token,
            )
            .await?;
        info!("Fetched {} account categories", result.account_categories.len());
        Ok(result.account_categories)
    }

    pub async fn tax_categories(
        &self,
        access_token: &Secret<String>,
        company_id: i64,
    ) -> Result<Vec<TaxCategory>, LedgerApiError> {
        #[derive(Deserialize)]
        struct CategoryResponse {
            tax_categories: Vec<TaxCategory>,
        }
        let company = company_id.to_string();
        debug!("Fetching tax categories for company {company}");
        let result = self
            .rest_query::<CategoryResponse, ()>(
                Method::GET,
                "/tax_categories",
                &[("company_id", company.as_str())],
                None,
                access_token,
            )
            .await?;
        info!("Fetched {} tax categories", result.tax_categories.len());
        Ok(result.tax_categories)
    }

    /// Create one ledger entry. There is no idempotency key on this endpoint: every successful call creates a new
    /// remote entry, so a retry after an ambiguous failure can double-post. See the operational notes in DESIGN.md.
    pub async fn create_entry(
        &self,
        access_token: &Secret<String>,
        entry: &NewLedgerEntry,
    ) -> Result<i64, LedgerApiError> {
        #[derive(Deserialize)]
        struct CreatedEntry {
            id: i64,
        }
        #[derive(Deserialize)]
        struct EntryResponse {
            ledger_entry: CreatedEntry,
        }
        debug!("Creating ledger entry dated {}", entry.issue_date);
        let result = self
            .rest_query::<EntryResponse, &NewLedgerEntry>(Method::POST, "/ledger_entries", &[], Some(entry), access_token)
            .await?;
        info!("Created ledger entry #{}", result.ledger_entry.id);
        Ok(result.ledger_entry.id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unroutable_api() -> LedgerApi {
        // Nothing listens on port 1; the connection is refused before any request is delivered.
        let config = LedgerConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            auth_base: "http://127.0.0.1:1".to_string(),
            api_version: "2024-06-01".to_string(),
        };
        LedgerApi::new(config).unwrap()
    }

    #[tokio::test]
    async fn an_undeliverable_query_is_a_request_error() {
        let api = unroutable_api();
        let token = Secret::new("access".to_string());
        let err = api.account_categories(&token, 1).await.unwrap_err();
        assert!(matches!(err, LedgerApiError::RestRequestError(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn an_undeliverable_token_exchange_is_a_request_error() {
        let api = unroutable_api();
        let secret = Secret::new("secret".to_string());
        let refresh = Secret::new("refresh".to_string());
        let err = api.refresh_access_token("client", &secret, &refresh).await.unwrap_err();
        assert!(matches!(err, LedgerApiError::RestRequestError(_)), "got {err:?}");
    }
}
