use starknet_types_core::felt::Felt;
use thiserror::Error;

use crate::core::storage::StorageError;

/// Boxed error returned by external collaborators (RPC client, session codec,
/// wallet connector, backends).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SDK-specific error types for web wallet operations
#[derive(Debug, Error)]
pub enum WebWalletError {
    /// Chain RPC error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Underlying account (signing / submission) error
    #[error("Account error: {0}")]
    Account(String),

    /// Session codec failure (create, build, sign)
    #[error("Session codec error: {0}")]
    Codec(String),

    /// Wallet connector transport or user rejection
    #[error("Wallet connector error: {0}")]
    Connector(String),

    /// Gasless backend rejected or failed the request
    #[error("Gasless backend error: {0}")]
    Gasless(String),

    /// Token balance lookup failed
    #[error("Token service error: {0}")]
    TokenService(String),

    /// Account is already deployed on-chain
    #[error("Account is already deployed")]
    AlreadyDeployed,

    /// Deployed address differs from the deterministic one
    #[error("The deployed address {actual:#x} does not match the expected address {expected:#x}")]
    AddressMismatch { expected: Felt, actual: Felt },

    /// The transaction was not confirmed within the polling budget
    #[error(
        "Transaction {transaction_hash:#x} not confirmed after {attempts} attempts{}",
        .last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default()
    )]
    ConfirmationTimeout {
        transaction_hash: Felt,
        attempts: u32,
        last_error: Option<String>,
    },

    /// The transaction was reverted or rejected
    #[error("Transaction {transaction_hash:#x} failed: {reason}")]
    TransactionFailed { transaction_hash: Felt, reason: String },

    /// The fee bounds of the transaction cannot be covered by the account
    #[error("validation failed: gas bounds exceed balance ({0})")]
    FeeBoundsExceeded(String),

    /// Message signing requested for anything but an outside execution
    #[error("signMessage only for outside execution: {0}")]
    UnsupportedSigningContext(String),

    /// The call batch does not line up with the signed message
    #[error("Unaligned calls: {0}")]
    UnalignedCalls(String),

    /// No gas token balance covers the fee
    #[error("Not enough balance in any gas token - please fund your wallet with a valid gas token")]
    InsufficientGasTokenBalance,

    /// Approval request is missing a required field
    #[error("Invalid approval request at index {index}: {reason}")]
    InvalidApprovalRequest { index: usize, reason: String },

    /// Chain id not supported by the SDK or the gasless backend
    #[error("Unsupported chain id {0:#x}")]
    UnsupportedChain(Felt),

    /// Transaction version the signer cannot hash
    #[error("Unsupported transaction version: {0}")]
    UnsupportedTransactionVersion(String),

    /// No session account held by the facade
    #[error("Not connected")]
    NotConnected,

    /// The facade was built without a required collaborator
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Environment name not recognized
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Key-value store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// JSON encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed numeric / hex value
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, WebWalletError>;
