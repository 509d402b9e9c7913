use crate::error::BoxError;
use crate::types::{AccountDeploymentPayload, ApprovalRequest, Call, TypedData};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAndSignSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approval_requests: Vec<ApprovalRequest>,
    pub session_typed_data: TypedData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAndSignSessionResponse {
    /// Connected addresses, first one is the user's account
    pub account: Vec<Felt>,
    pub signature: Vec<Felt>,
    #[serde(default)]
    pub deployment_payload: Option<AccountDeploymentPayload>,
    #[serde(default)]
    pub approval_requests_calls: Option<Vec<Call>>,
    #[serde(default)]
    pub approval_transaction_hash: Option<Felt>,
}

/// JSON-RPC style requests understood by the wallet
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "params")]
pub enum WalletRequest {
    #[serde(rename = "wallet_addInvokeTransaction")]
    AddInvokeTransaction { calls: Vec<Call> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddInvokeTransactionResult {
    pub transaction_hash: Felt,
}

/// Transport to the user's web wallet (popup / iframe).
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn ready(&self) -> bool;

    async fn connect_and_sign_session(
        &self,
        request: ConnectAndSignSessionRequest,
    ) -> Result<ConnectAndSignSessionResponse, BoxError>;

    async fn request(&self, request: WalletRequest) -> Result<AddInvokeTransactionResult, BoxError>;
}
