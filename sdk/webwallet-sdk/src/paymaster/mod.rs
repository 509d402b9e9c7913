//! Fee payment orchestration.
//!
//! Every outgoing batch is paid one of three ways:
//!
//! 1. **Sponsored**: an API key is configured, the paymaster covers the fee.
//! 2. **Gas token**: the paymaster takes a fee in one of the account's
//!    tokens, sized from a native fee estimate.
//! 3. **Native**: the account pays its own fee (handled by the session
//!    account, not here).
//!
//! Paths 1 and 2 go through an outside-execution typed data message that the
//! account signs through a [`TypedDataSigner`].

pub mod avnu;
pub mod fees;
pub mod transfer;

use crate::account::SelfDeployingAccount;
use crate::core::constants::STRK_TOKEN_ADDRESS;
use crate::error::{Result, WebWalletError};
use crate::services::token::TokenService;
use crate::types::{Call, ChainId, ExecutionDetails, InvokeResponse, TypedData};
use async_trait::async_trait;
use avnu::{
    gasless_base_url, BuildTypedDataRequest, DeploymentData, ExecuteRequest, GaslessBackend,
    GaslessOptions,
};
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use tracing::{debug, info};

pub use fees::{fee_in_gas_token, get_estimated_fees_in_gas_token, get_native_fees, select_gas_token};
pub use transfer::{is_out_of_gas_error, prepend_paymaster_transfer};

/// Paymaster policy configured by the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Sponsors every transaction when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Only this token may be used to pay fees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<Felt>,
}

impl PaymasterParameters {
    pub fn sponsored(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_token_address(mut self, token_address: Felt) -> Self {
        self.token_address = Some(token_address);
        self
    }

    pub fn is_sponsored(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Signs the typed data the paymaster builds.
///
/// `fee_token` is the token the paymaster may have added a fee transfer on.
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    async fn sign_typed_data(&self, typed_data: &TypedData, fee_token: Felt) -> Result<Vec<Felt>>;
}

/// Collaborators used by [`execute_with_paymaster`]
pub struct PaymasterContext<'a> {
    pub account: &'a SelfDeployingAccount,
    pub signer: &'a dyn TypedDataSigner,
    pub backend: &'a dyn GaslessBackend,
    pub token_service: &'a dyn TokenService,
    pub chain_id: ChainId,
    pub params: &'a PaymasterParameters,
}

/// Submit `calls` through the paymaster, deploying the account in the same
/// transaction when it is not deployed yet.
pub async fn execute_with_paymaster(
    ctx: &PaymasterContext<'_>,
    calls: &[Call],
    details: &ExecutionDetails,
) -> Result<InvokeResponse> {
    let is_deployed = ctx.account.is_deployed().await;
    let deployment_data =
        (!is_deployed).then(|| DeploymentData::from(ctx.account.deployment_payload()));
    let base_url = ctx
        .params
        .base_url
        .clone()
        .unwrap_or_else(|| gasless_base_url(ctx.chain_id).to_string());

    if let Some(api_key) = &ctx.params.api_key {
        info!("Executing {} calls with sponsored fees", calls.len());
        let options = GaslessOptions {
            base_url,
            api_key: Some(api_key.clone()),
        };
        let request = BuildTypedDataRequest {
            user_address: ctx.account.address(),
            calls: calls.to_vec(),
            gas_token_address: None,
            max_gas_token_amount: None,
            account_class_hash: deployment_data.as_ref().map(|data| data.class_hash),
        };
        return submit(ctx, &options, request, deployment_data).await;
    }

    let mut details = details.clone();
    if !is_deployed {
        details.nonce = Some(Felt::ZERO);
    }
    let fee = get_native_fees(ctx.account, calls, is_deployed, &details).await?;
    let options = GaslessOptions {
        base_url,
        api_key: None,
    };
    let fees =
        get_estimated_fees_in_gas_token(ctx.account, ctx.backend, &options, &fee, is_deployed)
            .await?;

    let balances = ctx
        .token_service
        .fetch_address_token_balances(&ctx.account.address(), ctx.chain_id.network())
        .await
        .map_err(|e| WebWalletError::TokenService(e.to_string()))?;
    let (gas_token, max_amount) = select_gas_token(&balances, &fees, ctx.params.token_address)?;
    info!(
        "Paying fees in gas token {:#x} (max {})",
        gas_token, max_amount
    );

    let request = BuildTypedDataRequest {
        user_address: ctx.account.address(),
        calls: calls.to_vec(),
        gas_token_address: Some(gas_token),
        max_gas_token_amount: Some(format!("0x{:x}", max_amount)),
        account_class_hash: deployment_data.as_ref().map(|data| data.class_hash),
    };
    submit(ctx, &options, request, deployment_data).await
}

async fn submit(
    ctx: &PaymasterContext<'_>,
    options: &GaslessOptions,
    request: BuildTypedDataRequest,
    deployment_data: Option<DeploymentData>,
) -> Result<InvokeResponse> {
    let fee_token = request
        .gas_token_address
        .unwrap_or_else(|| Felt::from_hex_unchecked(STRK_TOKEN_ADDRESS));

    let typed_data = ctx
        .backend
        .build_typed_data(&request, options)
        .await
        .map_err(|e| WebWalletError::Gasless(e.to_string()))?;
    let signature = ctx.signer.sign_typed_data(&typed_data, fee_token).await?;

    let execute = ExecuteRequest {
        user_address: request.user_address,
        typed_data: serde_json::to_string(&typed_data)?,
        signature,
        deployment_data,
    };
    let response = ctx
        .backend
        .execute(&execute, options)
        .await
        .map_err(|e| WebWalletError::Gasless(e.to_string()))?;
    debug!("Paymaster accepted tx {:#x}", response.transaction_hash);
    Ok(response)
}
