use crate::account::SelfDeployingAccount;
use crate::config::DeployPolling;
use crate::core::codec::{OutsideExecutionContext, SessionCodec};
use crate::core::connection::{Account, Provider};
use crate::core::constants::{OUTSIDE_EXECUTION_DOMAIN_NAME, OUTSIDE_EXECUTION_PRIMARY_TYPE};
use crate::error::{Result, WebWalletError};
use crate::paymaster::avnu::GaslessBackend;
use crate::paymaster::{
    self, is_out_of_gas_error, prepend_paymaster_transfer, PaymasterContext,
    PaymasterParameters, TypedDataSigner,
};
use crate::services::token::TokenService;
use crate::types::{
    Abi, AccountDeploymentPayload, Call, ChainId, DeployContractResponse, ExecutionDetails,
    InvokeResponse, SessionParameters, SessionStatus, SignedSession, TypedData,
};
use crate::utils::argent_deployment_payload;
use async_trait::async_trait;
use chrono::Utc;
use starknet_types_core::felt::Felt;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything needed to rebuild a session account from a stored session
pub struct SessionAccountParams {
    pub session: SignedSession,
    pub session_params: SessionParameters,
    pub paymaster_params: PaymasterParameters,
    pub provider: Arc<dyn Provider>,
    pub chain_id: Felt,
    pub session_service_url: String,
    pub codec: Arc<dyn SessionCodec>,
    pub gasless: Arc<dyn GaslessBackend>,
    pub token_service: Arc<dyn TokenService>,
    pub deploy_polling: DeployPolling,
}

/// Account operated by a session key on behalf of the user.
///
/// Transactions are paid natively when the account can afford it and fall
/// back to the paymaster once when it cannot.
pub struct SessionAccount {
    base: SelfDeployingAccount,
    session: SignedSession,
    session_params: SessionParameters,
    paymaster_params: PaymasterParameters,
    session_service_url: String,
    chain_id: Felt,
    codec: Arc<dyn SessionCodec>,
    gasless: Arc<dyn GaslessBackend>,
    token_service: Arc<dyn TokenService>,
}

/// Build the session-signed account for `params.session`.
///
/// The deployment payload is the one the wallet returned, or the Argent
/// account derived from the session signer's public key.
pub async fn create_session_account(params: SessionAccountParams) -> Result<SessionAccount> {
    let inner = params
        .codec
        .build_session_account(&params.session, params.provider, &params.session_service_url)
        .await
        .map_err(|e| WebWalletError::Codec(e.to_string()))?;

    let deployment_payload = match &params.session.deployment_payload {
        Some(payload) => payload.clone(),
        None => {
            let public_key = inner
                .public_key()
                .await
                .map_err(|e| WebWalletError::Account(e.to_string()))?;
            AccountDeploymentPayload {
                contract_address: inner.address(),
                ..argent_deployment_payload(&public_key)
            }
        },
    };

    Ok(SessionAccount {
        base: SelfDeployingAccount::new(inner, deployment_payload, params.deploy_polling),
        session: params.session,
        session_params: params.session_params,
        paymaster_params: params.paymaster_params,
        session_service_url: params.session_service_url,
        chain_id: params.chain_id,
        codec: params.codec,
        gasless: params.gasless,
        token_service: params.token_service,
    })
}

impl SessionAccount {
    pub fn address(&self) -> Felt {
        self.base.address()
    }

    pub fn session(&self) -> &SignedSession {
        &self.session
    }

    pub fn chain_id(&self) -> Felt {
        self.chain_id
    }

    pub fn base(&self) -> &SelfDeployingAccount {
        &self.base
    }

    pub fn deployment_payload(&self) -> &AccountDeploymentPayload {
        self.base.deployment_payload()
    }

    pub async fn is_deployed(&self) -> bool {
        self.base.is_deployed().await
    }

    pub async fn deploy_from(&self, funding: &dyn Account) -> Result<DeployContractResponse> {
        self.base.deploy_from(funding).await
    }

    /// `mainnet` or `sepolia`
    pub fn network(&self) -> Result<&'static str> {
        Ok(ChainId::from_felt(&self.chain_id)?.network())
    }

    //=========================================================================
    // Status
    //=========================================================================

    pub fn status(&self) -> SessionStatus {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        self.status_at(now)
    }

    /// Evaluate the session at unix time `now` (seconds).
    pub fn status_at(&self, now: u64) -> SessionStatus {
        let status = if now >= self.session.session.expires_at {
            SessionStatus::Expired
        } else if !self.is_session_scope_valid() {
            SessionStatus::InvalidScope
        } else if self.session.signature.is_none() {
            SessionStatus::InvalidSignature
        } else if !self.codec.verify_session(&self.session) {
            SessionStatus::InvalidSession
        } else {
            SessionStatus::Valid
        };
        if status != SessionStatus::Valid {
            info!("Session status: {}", status);
        }
        status
    }

    // Every configured method must still be granted by the session.
    fn is_session_scope_valid(&self) -> bool {
        self.session_params.allowed_methods.iter().all(|wanted| {
            self.session.session.allowed_methods.iter().any(|granted| {
                granted.contract_address == wanted.contract && granted.selector == wanted.selector
            })
        })
    }

    //=========================================================================
    // Execution
    //=========================================================================

    /// Submit `calls`, choosing how fees are paid.
    ///
    /// Sponsored accounts go straight to the paymaster. Otherwise the account
    /// pays natively, which requires it to be deployed. An out-of-gas failure
    /// of that first attempt is retried once through the paymaster.
    pub async fn execute(
        &self,
        calls: &[Call],
        abis: Option<&[Abi]>,
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse> {
        let first_attempt = if self.paymaster_params.is_sponsored() {
            self.execute_with_paymaster(calls, details).await
        } else {
            self.execute_natively(calls, abis, details).await
        };

        match first_attempt {
            Err(e) if is_out_of_gas_error(&e) => {
                warn!("Falling back to paymaster after: {}", e);
                self.execute_with_paymaster(calls, details).await
            },
            other => other,
        }
    }

    async fn execute_natively(
        &self,
        calls: &[Call],
        abis: Option<&[Abi]>,
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse> {
        if !self.base.is_deployed().await {
            return Err(WebWalletError::FeeBoundsExceeded(
                "account is not deployed".to_string(),
            ));
        }
        self.base.execute_with_deploy(calls, abis, details).await
    }

    async fn execute_with_paymaster(
        &self,
        calls: &[Call],
        details: &ExecutionDetails,
    ) -> Result<InvokeResponse> {
        let signer = OutsideExecutionSigner::new(self, calls);
        let ctx = PaymasterContext {
            account: &self.base,
            signer: &signer,
            backend: self.gasless.as_ref(),
            token_service: self.token_service.as_ref(),
            chain_id: ChainId::from_felt(&self.chain_id)?,
            params: &self.paymaster_params,
        };
        let response = paymaster::execute_with_paymaster(&ctx, calls, details).await?;
        self.base.mark_deployed().await;
        Ok(response)
    }

    //=========================================================================
    // Outside Execution
    //=========================================================================

    fn outside_execution_context(&self) -> Result<OutsideExecutionContext<'_>> {
        Ok(OutsideExecutionContext {
            session: &self.session,
            session_service_url: &self.session_service_url,
            network: self.network()?,
        })
    }

    /// Sign an outside-execution message built by a paymaster for `calls`.
    pub async fn sign_message_from_outside(
        &self,
        typed_data: &TypedData,
        calls: &[Call],
        fee_token: Felt,
    ) -> Result<Vec<Felt>> {
        if typed_data.primary_type != OUTSIDE_EXECUTION_PRIMARY_TYPE {
            return Err(WebWalletError::UnsupportedSigningContext(format!(
                "primary type {}",
                typed_data.primary_type
            )));
        }
        if typed_data.domain.name.as_deref() != Some(OUTSIDE_EXECUTION_DOMAIN_NAME) {
            return Err(WebWalletError::UnsupportedSigningContext(format!(
                "domain {:?}",
                typed_data.domain.name
            )));
        }

        let calls = prepend_paymaster_transfer(typed_data, calls, fee_token)?;
        self.codec
            .sign_outside_execution(self.outside_execution_context()?, typed_data, &calls)
            .await
            .map_err(|e| WebWalletError::Codec(e.to_string()))
    }

    /// Single `execute_from_outside` call wrapping `calls`, for a relayer.
    pub async fn get_outside_execution_payload(&self, calls: &[Call]) -> Result<Call> {
        self.codec
            .create_outside_execution_call(self.outside_execution_context()?, calls)
            .await
            .map_err(|e| WebWalletError::Codec(e.to_string()))
    }
}

/// Signing strategy handed to the paymaster: signs outside-execution
/// messages with the session key for one specific call batch.
pub struct OutsideExecutionSigner<'a> {
    account: &'a SessionAccount,
    calls: &'a [Call],
}

impl<'a> OutsideExecutionSigner<'a> {
    pub fn new(account: &'a SessionAccount, calls: &'a [Call]) -> Self {
        Self { account, calls }
    }
}

#[async_trait]
impl TypedDataSigner for OutsideExecutionSigner<'_> {
    async fn sign_typed_data(&self, typed_data: &TypedData, fee_token: Felt) -> Result<Vec<Felt>> {
        self.account
            .sign_message_from_outside(typed_data, self.calls, fee_token)
            .await
    }
}
