use crate::error::BoxError;
use crate::types::{
    Abi, AccountDeploymentPayload, Call, DeployContractPayload, DeployContractResponse,
    ExecutionDetails, FeeEstimate, Invocation, InvokeResponse, TransactionStatus,
};
use async_trait::async_trait;
use starknet_types_core::felt::Felt;
use std::sync::Arc;

/// Read side of the chain RPC client.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Errors when no contract is deployed at `address`.
    async fn get_class_hash_at(&self, address: &Felt) -> Result<Felt, BoxError>;

    async fn get_transaction_status(
        &self,
        transaction_hash: &Felt,
    ) -> Result<TransactionStatus, BoxError>;
}

/// Builds a provider for an RPC endpoint when the application did not supply one.
pub trait ProviderFactory: Send + Sync {
    fn connect(&self, node_url: &str) -> Arc<dyn Provider>;
}

/// A plain signing account: submits transactions signed by its own signer.
#[async_trait]
pub trait Account: Send + Sync {
    fn address(&self) -> Felt;

    fn provider(&self) -> Arc<dyn Provider>;

    /// Public key of the account's signer
    async fn public_key(&self) -> Result<Felt, BoxError>;

    async fn execute(
        &self,
        calls: &[Call],
        abis: Option<&[Abi]>,
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError>;

    /// DEPLOY_ACCOUNT transaction for this very account
    async fn deploy_account(
        &self,
        payload: &AccountDeploymentPayload,
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError>;

    /// Deploy another contract through the universal deployer
    async fn deploy_contract(
        &self,
        payload: &DeployContractPayload,
    ) -> Result<DeployContractResponse, BoxError>;

    async fn estimate_fee_bulk(
        &self,
        invocations: &[Invocation],
        details: &ExecutionDetails,
    ) -> Result<Vec<FeeEstimate>, BoxError>;
}
