use crate::core::constants::{CLIENT_NAME, CLIENT_VERSION};
use crate::error::{BoxError, Result, WebWalletError};
use crate::types::TokenBalance;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use starknet_types_core::felt::Felt;

/// Token balances of an account, as reported by the wallet backend.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Balances in the backend's order; `network` is `mainnet` or `sepolia`.
    async fn fetch_address_token_balances(
        &self,
        address: &Felt,
        network: &str,
    ) -> std::result::Result<Vec<TokenBalance>, BoxError>;
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<BackendBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendBalance {
    token_address: Felt,
    token_balance: String,
}

#[derive(Debug, Clone)]
pub struct HttpTokenService {
    client: Client,
    base_url: String,
}

impl HttpTokenService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn balances(&self, address: &Felt, network: &str) -> Result<Vec<TokenBalance>> {
        let url = format!(
            "{}/activity/starknet/{}/account/{:#x}/balance",
            self.base_url.trim_end_matches('/'),
            network,
            address
        );
        let response = self
            .client
            .get(&url)
            .header("Argent-Client", CLIENT_NAME)
            .header("Argent-Version", CLIENT_VERSION)
            .header("Argent-Network", network)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebWalletError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: BalancesResponse = response.json().await?;
        Ok(payload
            .balances
            .into_iter()
            .map(|entry| TokenBalance {
                address: entry.token_address,
                balance: entry.token_balance,
            })
            .collect())
    }
}

#[async_trait]
impl TokenService for HttpTokenService {
    async fn fetch_address_token_balances(
        &self,
        address: &Felt,
        network: &str,
    ) -> std::result::Result<Vec<TokenBalance>, BoxError> {
        Ok(self.balances(address, network).await?)
    }
}
