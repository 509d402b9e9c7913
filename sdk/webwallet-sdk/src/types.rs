use crate::core::constants::{SN_MAIN, SN_SEPOLIA};
use crate::error::{Result, WebWalletError};
use crate::utils::selector_from_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use starknet_types_core::felt::Felt;
use std::fmt;

/// ABI fragment handed through to the underlying account untouched
pub type Abi = Value;

/// Networks the SDK knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    Mainnet,
    Sepolia,
}

impl ChainId {
    pub fn as_felt(&self) -> Felt {
        match self {
            ChainId::Mainnet => Felt::from_hex_unchecked(SN_MAIN),
            ChainId::Sepolia => Felt::from_hex_unchecked(SN_SEPOLIA),
        }
    }

    /// Network name used by the session service and the token backend
    pub fn network(&self) -> &'static str {
        match self {
            ChainId::Mainnet => "mainnet",
            ChainId::Sepolia => "sepolia",
        }
    }

    pub fn from_felt(chain_id: &Felt) -> Result<Self> {
        if *chain_id == ChainId::Mainnet.as_felt() {
            Ok(ChainId::Mainnet)
        } else if *chain_id == ChainId::Sepolia.as_felt() {
            Ok(ChainId::Sepolia)
        } else {
            Err(WebWalletError::UnsupportedChain(*chain_id))
        }
    }
}

/// A single contract invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub contract_address: Felt,
    pub entrypoint: String,
    #[serde(default)]
    pub calldata: Vec<Felt>,
}

impl Call {
    pub fn new(contract_address: Felt, entrypoint: impl Into<String>, calldata: Vec<Felt>) -> Self {
        Self {
            contract_address,
            entrypoint: entrypoint.into(),
            calldata,
        }
    }

    pub fn selector(&self) -> Felt {
        selector_from_name(&self.entrypoint)
    }
}

//=============================================================================
// Sessions
//=============================================================================

/// Ephemeral keypair the session delegates signing authority to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKey {
    pub public_key: Felt,
    pub private_key: Felt,
}

/// Entry of a session's allow-list, as signed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMethod {
    #[serde(rename = "Contract Address")]
    pub contract_address: Felt,
    pub selector: String,
}

/// Time-boxed, scope-limited delegation produced by the session codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_key: SessionKey,
    pub allowed_methods: Vec<AllowedMethod>,
    /// Unix timestamp, seconds
    pub expires_at: u64,
    pub chain_id: Felt,
    pub authorisation_signature: Vec<Felt>,
    pub hash: Felt,
    pub version: String,
    pub session_key_guid: Felt,
    #[serde(default)]
    pub metadata: String,
}

/// Session plus what the wallet returns once the user approved it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedSession {
    #[serde(flatten)]
    pub session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<Felt>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_payload: Option<AccountDeploymentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Felt>,
}

impl SignedSession {
    /// Signature and address are both present
    pub fn is_signed(&self) -> bool {
        self.signature.is_some() && self.address.is_some()
    }
}

/// Method the application wants the session to cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMethod {
    pub contract: Felt,
    pub selector: String,
}

impl SessionMethod {
    pub fn new(contract: Felt, selector: impl Into<String>) -> Self {
        Self {
            contract,
            selector: selector.into(),
        }
    }
}

/// Session policy configured by the application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParameters {
    pub allowed_methods: Vec<SessionMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
}

impl SessionParameters {
    pub fn allow(mut self, contract: Felt, selector: impl Into<String>) -> Self {
        self.allowed_methods.push(SessionMethod::new(contract, selector));
        self
    }

    pub fn with_validity_days(mut self, days: u32) -> Self {
        self.validity_days = Some(days);
        self
    }
}

/// Fee cap per token recorded in the session metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFee {
    pub token_address: Felt,
    pub max_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub tx_fees: Vec<TxFee>,
}

/// Input of [`SessionCodec::create_session_request`](crate::core::codec::SessionCodec::create_session_request)
#[derive(Debug, Clone)]
pub struct SessionRequestParams {
    pub allowed_methods: Vec<AllowedMethod>,
    pub expires_at: u64,
    pub metadata: SessionMetadata,
    pub session_key: SessionKey,
}

/// Session awaiting the user's authorisation signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_key: SessionKey,
    pub allowed_methods: Vec<AllowedMethod>,
    pub expires_at: u64,
    pub chain_id: Felt,
    pub metadata: String,
    pub session_typed_data: TypedData,
}

/// Answer written back by the wallet flow under the user's address key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub address: Felt,
    pub signature: Vec<Felt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_data: Option<AccountDeploymentPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_transaction_hash: Option<Felt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub address: Felt,
}

/// Result of evaluating a loaded session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Valid,
    Expired,
    InvalidScope,
    InvalidSignature,
    InvalidSession,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Valid => "VALID",
            SessionStatus::Expired => "EXPIRED",
            SessionStatus::InvalidScope => "INVALID_SCOPE",
            SessionStatus::InvalidSignature => "INVALID_SIGNATURE",
            SessionStatus::InvalidSession => "INVALID_SESSION",
        };
        f.write_str(name)
    }
}

//=============================================================================
// Accounts & Transactions
//=============================================================================

/// Everything needed to deploy an account at its deterministic address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDeploymentPayload {
    pub class_hash: Felt,
    pub constructor_calldata: Vec<Felt>,
    pub address_salt: Felt,
    pub contract_address: Felt,
}

/// Universal-deployer style deployment issued from another account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContractPayload {
    pub class_hash: Felt,
    pub constructor_calldata: Vec<Felt>,
    pub salt: Felt,
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployContractResponse {
    pub contract_address: Felt,
    pub transaction_hash: Felt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub transaction_hash: Felt,
}

/// Optional knobs forwarded to the underlying account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionDetails {
    pub nonce: Option<Felt>,
    pub tip: Option<u64>,
    pub skip_validate: bool,
}

/// Entry of a bulk fee estimate
#[derive(Debug, Clone)]
pub enum Invocation {
    Invoke(Vec<Call>),
    DeployAccount(AccountDeploymentPayload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeEstimate {
    pub overall_fee: u128,
    pub gas_price: u128,
    pub data_gas_price: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Received,
    Accepted,
    Reverted(String),
    Rejected(String),
}

/// Token allowance the application asks the user to grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub token_address: Felt,
    pub amount: String,
    pub spender: Felt,
}

/// Balance row returned by the token backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub address: Felt,
    /// Decimal string, base units
    pub balance: String,
}

//=============================================================================
// Typed Data
//=============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<Value>,
}

/// SNIP-12 typed data message, kept loosely typed apart from the envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: Value,
    pub primary_type: String,
    pub domain: TypedDataDomain,
    pub message: Value,
}

/// Call as it appears inside an outside-execution message
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutsideCall {
    #[serde(rename = "To", alias = "to")]
    pub to: Felt,
    #[serde(rename = "Selector", alias = "selector")]
    pub selector: Felt,
    #[serde(rename = "Calldata", alias = "calldata", default)]
    pub calldata: Vec<Felt>,
}

impl TypedData {
    /// Calls listed in an outside-execution message (revision 1 or 0 keys)
    pub fn outside_execution_calls(&self) -> Result<Vec<OutsideCall>> {
        let calls = self
            .message
            .get("Calls")
            .or_else(|| self.message.get("calls"))
            .ok_or_else(|| {
                WebWalletError::UnalignedCalls("typed data message has no calls".to_string())
            })?;
        Ok(serde_json::from_value(calls.clone())?)
    }
}
