use crate::config::DeployPolling;
use crate::core::connection::{Account, Provider};
use crate::error::{Result, WebWalletError};
use crate::types::{
    Abi, AccountDeploymentPayload, Call, DeployContractPayload, DeployContractResponse,
    ExecutionDetails, InvokeResponse, TransactionStatus,
};
use starknet_types_core::felt::Felt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Account that deploys itself on first use.
///
/// Wraps a plain [`Account`] together with the payload that determines its
/// address. Deployment state is queried from the chain at most once and
/// then kept in memory.
pub struct SelfDeployingAccount {
    inner: Arc<dyn Account>,
    deployment_payload: AccountDeploymentPayload,
    deployed: Mutex<Option<bool>>,
    polling: DeployPolling,
}

impl SelfDeployingAccount {
    pub fn new(
        inner: Arc<dyn Account>,
        deployment_payload: AccountDeploymentPayload,
        polling: DeployPolling,
    ) -> Self {
        Self {
            inner,
            deployment_payload,
            deployed: Mutex::new(None),
            polling,
        }
    }

    /// Deterministic address of the account
    pub fn address(&self) -> Felt {
        self.deployment_payload.contract_address
    }

    pub fn inner(&self) -> &Arc<dyn Account> {
        &self.inner
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        self.inner.provider()
    }

    pub fn deployment_payload(&self) -> &AccountDeploymentPayload {
        &self.deployment_payload
    }

    /// Whether a contract exists at the account address.
    ///
    /// A failing class-hash lookup counts as "not deployed".
    pub async fn is_deployed(&self) -> bool {
        let mut deployed = self.deployed.lock().await;
        if let Some(known) = *deployed {
            return known;
        }
        let found = self
            .inner
            .provider()
            .get_class_hash_at(&self.address())
            .await
            .is_ok();
        debug!("Account {:#x} deployed: {}", self.address(), found);
        *deployed = Some(found);
        found
    }

    /// Record a confirmed deployment without querying the chain again.
    pub async fn mark_deployed(&self) {
        *self.deployed.lock().await = Some(true);
    }

    /// Deploy this account through the universal deployer of `funding`.
    pub async fn deploy_from(&self, funding: &dyn Account) -> Result<DeployContractResponse> {
        if self.is_deployed().await {
            return Err(WebWalletError::AlreadyDeployed);
        }

        let payload = DeployContractPayload {
            class_hash: self.deployment_payload.class_hash,
            constructor_calldata: self.deployment_payload.constructor_calldata.clone(),
            salt: self.deployment_payload.address_salt,
            unique: false,
        };
        let response = funding
            .deploy_contract(&payload)
            .await
            .map_err(|e| WebWalletError::Account(e.to_string()))?;

        if response.contract_address != self.address() {
            return Err(WebWalletError::AddressMismatch {
                expected: self.address(),
                actual: response.contract_address,
            });
        }

        Ok(response)
    }

    /// Execute `calls`, deploying the account first when needed.
    ///
    /// The deployed flag flips as soon as the deployment is confirmed, so a
    /// failing execute afterwards does not trigger a second deployment.
    pub async fn execute_with_deploy(
        &self,
        calls: &[Call],
        abis: Option<&[Abi]>,
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse> {
        if !self.is_deployed().await {
            let deploy = self
                .inner
                .deploy_account(&self.deployment_payload, &ExecutionDetails::default())
                .await
                .map_err(|e| WebWalletError::Account(e.to_string()))?;
            info!(
                "Account not deployed, deploy tx: {:#x}",
                deploy.transaction_hash
            );
            self.wait_for_transaction(&deploy.transaction_hash).await?;
            self.mark_deployed().await;
        }

        self.inner
            .execute(calls, abis, details)
            .await
            .map_err(|e| WebWalletError::Account(e.to_string()))
    }

    /// Poll the transaction status until it is accepted, fails, or the
    /// attempt budget runs out.
    pub async fn wait_for_transaction(&self, transaction_hash: &Felt) -> Result<()> {
        let provider = self.inner.provider();
        let mut last_error = None;
        for attempt in 1..=self.polling.max_attempts {
            match provider.get_transaction_status(transaction_hash).await {
                Ok(TransactionStatus::Accepted) => return Ok(()),
                Ok(TransactionStatus::Reverted(reason))
                | Ok(TransactionStatus::Rejected(reason)) => {
                    return Err(WebWalletError::TransactionFailed {
                        transaction_hash: *transaction_hash,
                        reason,
                    });
                },
                Ok(TransactionStatus::Received) => {
                    debug!("Transaction {:#x} pending (attempt {})", transaction_hash, attempt);
                },
                Err(e) => {
                    debug!(
                        "Transaction {:#x} status unavailable (attempt {}): {}",
                        transaction_hash, attempt, e
                    );
                    last_error = Some(e.to_string());
                },
            }
            if attempt < self.polling.max_attempts {
                tokio::time::sleep(self.polling.retry_interval).await;
            }
        }

        Err(WebWalletError::ConfirmationTimeout {
            transaction_hash: *transaction_hash,
            attempts: self.polling.max_attempts,
            last_error,
        })
    }
}
