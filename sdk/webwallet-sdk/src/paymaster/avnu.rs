//! Gasless (paymaster) backend client.
//!
//! The backend quotes gas-token prices, reports per-account gas overheads,
//! builds the outside-execution typed data a user signs and relays the
//! signed result. Sponsored requests carry an `api-key` header; gas-token
//! requests name the token and the maximum amount the paymaster may take.

use crate::core::constants::{GASLESS_MAINNET_BASE_URL, GASLESS_SEPOLIA_BASE_URL};
use crate::error::{BoxError, Result, WebWalletError};
use crate::types::{AccountDeploymentPayload, Call, ChainId, InvokeResponse, TypedData};
use crate::utils::serde_u128;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

pub fn gasless_base_url(chain_id: ChainId) -> &'static str {
    match chain_id {
        ChainId::Mainnet => GASLESS_MAINNET_BASE_URL,
        ChainId::Sepolia => GASLESS_SEPOLIA_BASE_URL,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaslessOptions {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Gas token quote, prices expressed in the native fee token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasTokenPrice {
    pub token_address: Felt,
    #[serde(rename = "priceInETH", with = "serde_u128")]
    pub price_in_eth: u128,
    #[serde(rename = "priceInUSD", default)]
    pub price_in_usd: f64,
    pub decimals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaslessCompatibility {
    pub is_compatible: bool,
    #[serde(with = "serde_u128")]
    pub gas_consumed_overhead: u128,
    #[serde(with = "serde_u128")]
    pub data_gas_consumed_overhead: u128,
}

impl GaslessCompatibility {
    /// Overheads used for accounts that are not deployed yet
    pub fn undeployed() -> Self {
        Self {
            is_compatible: true,
            gas_consumed_overhead: 0,
            data_gas_consumed_overhead: 0,
        }
    }
}

/// Deployment attached to the first gasless transaction of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentData {
    pub class_hash: Felt,
    pub salt: Felt,
    pub unique: Felt,
    pub calldata: Vec<Felt>,
}

impl From<&AccountDeploymentPayload> for DeploymentData {
    fn from(payload: &AccountDeploymentPayload) -> Self {
        Self {
            class_hash: payload.class_hash,
            salt: payload.address_salt,
            unique: Felt::ZERO,
            calldata: payload.constructor_calldata.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTypedDataRequest {
    pub user_address: Felt,
    pub calls: Vec<Call>,
    /// Absent when the transaction is sponsored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_token_address: Option<Felt>,
    /// `0x`-prefixed hex amount in the gas token's base units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gas_token_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_class_hash: Option<Felt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub user_address: Felt,
    /// Typed data exactly as it was signed, JSON-encoded
    pub typed_data: String,
    pub signature: Vec<Felt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_data: Option<DeploymentData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteResponse {
    transaction_hash: Felt,
}

/// Paymaster API used by the fee orchestrator.
#[async_trait]
pub trait GaslessBackend: Send + Sync {
    async fn fetch_gas_token_prices(
        &self,
        options: &GaslessOptions,
    ) -> std::result::Result<Vec<GasTokenPrice>, BoxError>;

    async fn fetch_account_compatibility(
        &self,
        address: &Felt,
        options: &GaslessOptions,
    ) -> std::result::Result<GaslessCompatibility, BoxError>;

    async fn build_typed_data(
        &self,
        request: &BuildTypedDataRequest,
        options: &GaslessOptions,
    ) -> std::result::Result<TypedData, BoxError>;

    async fn execute(
        &self,
        request: &ExecuteRequest,
        options: &GaslessOptions,
    ) -> std::result::Result<InvokeResponse, BoxError>;
}

/// `reqwest` implementation talking to the public paymaster REST API.
#[derive(Debug, Clone, Default)]
pub struct HttpGaslessBackend {
    client: Client,
}

impl HttpGaslessBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn url(options: &GaslessOptions, path: &str) -> String {
        format!("{}/paymaster/v1{}", options.base_url.trim_end_matches('/'), path)
    }

    fn authorize(request: RequestBuilder, options: &GaslessOptions) -> RequestBuilder {
        match &options.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebWalletError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    pub async fn gas_token_prices(&self, options: &GaslessOptions) -> Result<Vec<GasTokenPrice>> {
        let request = self.client.get(Self::url(options, "/gas-token-prices"));
        let response = Self::authorize(request, options).send().await?;
        Self::read(response).await
    }

    pub async fn account_compatibility(
        &self,
        address: &Felt,
        options: &GaslessOptions,
    ) -> Result<GaslessCompatibility> {
        let path = format!("/accounts/{:#x}/compatible", address);
        let request = self.client.get(Self::url(options, &path));
        let response = Self::authorize(request, options).send().await?;
        Self::read(response).await
    }

    pub async fn typed_data(
        &self,
        body: &BuildTypedDataRequest,
        options: &GaslessOptions,
    ) -> Result<TypedData> {
        let request = self
            .client
            .post(Self::url(options, "/build-typed-data"))
            .json(body);
        let response = Self::authorize(request, options).send().await?;
        Self::read(response).await
    }

    pub async fn relay(&self, body: &ExecuteRequest, options: &GaslessOptions) -> Result<InvokeResponse> {
        let request = self.client.post(Self::url(options, "/execute")).json(body);
        let response = Self::authorize(request, options).send().await?;
        let executed: ExecuteResponse = Self::read(response).await?;
        Ok(InvokeResponse {
            transaction_hash: executed.transaction_hash,
        })
    }
}

#[async_trait]
impl GaslessBackend for HttpGaslessBackend {
    async fn fetch_gas_token_prices(
        &self,
        options: &GaslessOptions,
    ) -> std::result::Result<Vec<GasTokenPrice>, BoxError> {
        Ok(self.gas_token_prices(options).await?)
    }

    async fn fetch_account_compatibility(
        &self,
        address: &Felt,
        options: &GaslessOptions,
    ) -> std::result::Result<GaslessCompatibility, BoxError> {
        Ok(self.account_compatibility(address, options).await?)
    }

    async fn build_typed_data(
        &self,
        request: &BuildTypedDataRequest,
        options: &GaslessOptions,
    ) -> std::result::Result<TypedData, BoxError> {
        Ok(self.typed_data(request, options).await?)
    }

    async fn execute(
        &self,
        request: &ExecuteRequest,
        options: &GaslessOptions,
    ) -> std::result::Result<InvokeResponse, BoxError> {
        Ok(self.relay(request, options).await?)
    }
}
