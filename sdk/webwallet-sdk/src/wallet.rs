use crate::account::{create_session_account, SessionAccount, SessionAccountParams};
use crate::config::{Environment, InitParams};
use crate::core::codec::SessionCodec;
use crate::core::connection::{Provider, ProviderFactory};
use crate::core::connector::{ConnectAndSignSessionRequest, WalletConnector, WalletRequest};
use crate::core::constants::{
    ETH_TOKEN_ADDRESS, SESSION_DEFAULT_VALIDITY_DAYS, SESSION_MAX_FEE_ETH, SESSION_MAX_FEE_STRK,
    STRK_TOKEN_ADDRESS,
};
use crate::core::signer::StarkKeyPair;
use crate::core::storage::{get_json, set_json, KeyValueStore, MemoryStore};
use crate::error::{Result, WebWalletError};
use crate::paymaster::avnu::{GaslessBackend, HttpGaslessBackend};
use crate::services::token::{HttpTokenService, TokenService};
use crate::types::{
    AccountDeploymentPayload, AllowedMethod, ApprovalRequest, Call, SessionKey, SessionMetadata,
    SessionRequest, SessionRequestParams, SessionResponse, SessionStatus, SignedSession, TxFee,
    User,
};
use crate::utils::{normalize_address, u256_from_dec_str};
use chrono::Utc;
use starknet_types_core::felt::Felt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage keys
pub const SESSION_KEY: &str = "session";
pub const SESSION_REQUEST_KEY: &str = "session_request";
pub const USER_KEY: &str = "User";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Result of a successful connection
#[derive(Clone)]
pub struct ConnectResponse {
    pub account: Arc<SessionAccount>,
    pub user: Option<User>,
    pub callback_data: Option<String>,
    pub approval_transaction_hash: Option<Felt>,
}

impl ConnectResponse {
    fn account_only(account: Arc<SessionAccount>) -> Self {
        Self {
            account,
            user: None,
            callback_data: None,
            approval_transaction_hash: None,
        }
    }
}

/// Application-facing entry point.
///
/// Sequences the connection flows and keeps the session in the store:
/// `connect` restores, `request_connection` creates, `clear_session` forgets.
pub struct WebWallet {
    environment: Environment,
    params: InitParams,
    provider: Arc<dyn Provider>,
    storage: Arc<dyn KeyValueStore>,
    connector: Arc<dyn WalletConnector>,
    codec: Arc<dyn SessionCodec>,
    gasless: Arc<dyn GaslessBackend>,
    token_service: Arc<dyn TokenService>,
    account: Mutex<Option<Arc<SessionAccount>>>,
}

/// Wires a [`WebWallet`] to its collaborators
pub struct WebWalletBuilder {
    params: InitParams,
    storage: Option<Arc<dyn KeyValueStore>>,
    connector: Option<Arc<dyn WalletConnector>>,
    codec: Option<Arc<dyn SessionCodec>>,
    gasless: Option<Arc<dyn GaslessBackend>>,
    token_service: Option<Arc<dyn TokenService>>,
    provider_factory: Option<Arc<dyn ProviderFactory>>,
    http_client: Option<reqwest::Client>,
}

impl WebWalletBuilder {
    pub fn new(params: InitParams) -> Self {
        Self {
            params,
            storage: None,
            connector: None,
            codec: None,
            gasless: None,
            token_service: None,
            provider_factory: None,
            http_client: None,
        }
    }

    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn SessionCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_gasless_backend(mut self, gasless: Arc<dyn GaslessBackend>) -> Self {
        self.gasless = Some(gasless);
        self
    }

    pub fn with_token_service(mut self, token_service: Arc<dyn TokenService>) -> Self {
        self.token_service = Some(token_service);
        self
    }

    /// Used when the init params carry no provider
    pub fn with_provider_factory(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.provider_factory = Some(factory);
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<WebWallet> {
        let environment = Environment::for_name(self.params.environment);
        let connector = self
            .connector
            .ok_or(WebWalletError::MissingCollaborator("wallet connector"))?;
        let codec = self
            .codec
            .ok_or(WebWalletError::MissingCollaborator("session codec"))?;
        let provider = match (&self.params.provider, &self.provider_factory) {
            (Some(provider), _) => provider.clone(),
            (None, Some(factory)) => factory.connect(&environment.provider_default_url),
            (None, None) => return Err(WebWalletError::MissingCollaborator("provider")),
        };

        let client = self.http_client.unwrap_or_default();
        let gasless = self
            .gasless
            .unwrap_or_else(|| Arc::new(HttpGaslessBackend::new(client.clone())));
        let token_service = self.token_service.unwrap_or_else(|| {
            Arc::new(HttpTokenService::new(
                client,
                environment.backend_base_url.clone(),
            ))
        });
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        debug!(
            "Initialized web wallet for {} on {}",
            self.params.app_name, self.params.environment
        );
        Ok(WebWallet {
            environment,
            params: self.params,
            provider,
            storage,
            connector,
            codec,
            gasless,
            token_service,
            account: Mutex::new(None),
        })
    }
}

impl WebWallet {
    pub fn builder(params: InitParams) -> WebWalletBuilder {
        WebWalletBuilder::new(params)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn provider(&self) -> Arc<dyn Provider> {
        self.provider.clone()
    }

    /// Account of the current connection, if any
    pub async fn session_account(&self) -> Option<Arc<SessionAccount>> {
        self.account.lock().await.clone()
    }

    //=========================================================================
    // Connection Flows
    //=========================================================================

    /// Restore a connection from the store.
    ///
    /// Uses the stored signed session when it is still valid and drops it
    /// otherwise. Without one, completes a pending request with the response
    /// the wallet flow left under the user's address. Returns `None` when
    /// there is nothing to restore.
    pub async fn connect(&self) -> Result<Option<ConnectResponse>> {
        if let Some(session) = get_json::<SignedSession>(self.storage.as_ref(), SESSION_KEY)? {
            if session.is_signed() {
                info!("connect - Found a signed session");
                let account = self.build_session_account(session).await?;
                let status = account.status();
                if status == SessionStatus::Valid {
                    *self.account.lock().await = Some(account.clone());
                    return Ok(Some(ConnectResponse::account_only(account)));
                }
                warn!("connect - Dropping stored session: {}", status);
                self.storage.remove(SESSION_KEY)?;
            }
        }

        let Some(request) =
            get_json::<SessionRequest>(self.storage.as_ref(), SESSION_REQUEST_KEY)?
        else {
            info!("connect - No session request found");
            return Ok(None);
        };

        let Some((user, response)) = self.session_response_from_storage()? else {
            debug!("connect - No session response yet");
            return Ok(None);
        };

        info!("connect - Found a session response, creating the session");
        let signed = self
            .finalize_session(
                &request,
                response.address,
                response.signature.clone(),
                response.deployment_data.clone(),
            )
            .await?;
        let account = self.build_session_account(signed.clone()).await?;
        *self.account.lock().await = Some(account.clone());

        if !self.is_connected().await {
            warn!("connect - Session built but not usable");
            *self.account.lock().await = None;
            return Ok(None);
        }

        set_json(self.storage.as_ref(), SESSION_KEY, &signed)?;
        Ok(Some(ConnectResponse {
            account,
            user: Some(user),
            callback_data: response.callback_data,
            approval_transaction_hash: response.approval_transaction_hash,
        }))
    }

    /// Ask the user, through the wallet connector, to approve a new session.
    ///
    /// Any failure clears the session state before being returned.
    pub async fn request_connection(
        &self,
        callback_data: Option<String>,
        approval_requests: Vec<ApprovalRequest>,
    ) -> Result<ConnectResponse> {
        if self.is_connected().await {
            if let Some(account) = self.session_account().await {
                info!("requestConnection - Already connected");
                return Ok(ConnectResponse::account_only(account));
            }
        }

        info!("requestConnection - Connecting");
        self.clear_session().await?;

        match self.connect_with_wallet(callback_data, approval_requests).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!("requestConnection - Failed: {}", e);
                if let Err(clear_err) = self.clear_session().await {
                    warn!("requestConnection - Could not clear session: {}", clear_err);
                }
                Err(e)
            },
        }
    }

    async fn connect_with_wallet(
        &self,
        callback_data: Option<String>,
        approval_requests: Vec<ApprovalRequest>,
    ) -> Result<ConnectResponse> {
        validate_approval_requests(&approval_requests)?;

        let key_pair = StarkKeyPair::generate();
        let session_key = SessionKey {
            public_key: key_pair.public_key(),
            private_key: key_pair.private_key(),
        };
        let request = self.build_session_request(session_key)?;
        set_json(self.storage.as_ref(), SESSION_REQUEST_KEY, &request)?;

        let response = self
            .connector
            .connect_and_sign_session(ConnectAndSignSessionRequest {
                callback_data: callback_data.clone(),
                approval_requests,
                session_typed_data: request.session_typed_data.clone(),
            })
            .await
            .map_err(|e| WebWalletError::Connector(e.to_string()))?;

        let address = *response.account.first().ok_or_else(|| {
            WebWalletError::Connector("wallet returned no account".to_string())
        })?;
        if let Some(calls) = &response.approval_requests_calls {
            debug!("Wallet executed {} approval calls", calls.len());
        }

        let signed = self
            .finalize_session(
                &request,
                address,
                response.signature,
                response.deployment_payload,
            )
            .await?;
        let account = self.build_session_account(signed.clone()).await?;
        set_json(self.storage.as_ref(), SESSION_KEY, &signed)?;
        *self.account.lock().await = Some(account.clone());
        info!("requestConnection - Connected {:#x}", address);

        Ok(ConnectResponse {
            account,
            user: Some(User { address }),
            callback_data,
            approval_transaction_hash: response.approval_transaction_hash,
        })
    }

    /// Submit token approvals as one invoke transaction through the wallet.
    pub async fn request_approvals(&self, approval_requests: &[ApprovalRequest]) -> Result<Felt> {
        validate_approval_requests(approval_requests)?;

        let calls = approval_requests
            .iter()
            .map(|request| {
                let [low, high] = u256_from_dec_str(&request.amount)?;
                Ok(Call::new(
                    request.token_address,
                    "approve",
                    vec![request.spender, low, high],
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .connector
            .request(WalletRequest::AddInvokeTransaction { calls })
            .await
            .map_err(|e| WebWalletError::Connector(e.to_string()))?;
        info!("Approvals submitted in tx {:#x}", result.transaction_hash);
        Ok(result.transaction_hash)
    }

    /// Connector ready, account held and session valid.
    pub async fn is_connected(&self) -> bool {
        if !self.connector.ready().await {
            return false;
        }
        match self.session_account().await {
            Some(account) => account.status() == SessionStatus::Valid,
            None => false,
        }
    }

    /// Stored session, when it is complete enough to be used elsewhere.
    pub async fn export_signed_session(&self) -> Result<Option<SignedSession>> {
        let session = get_json::<SignedSession>(self.storage.as_ref(), SESSION_KEY)?;
        Ok(session.filter(|s| s.is_signed() && s.deployment_payload.is_some()))
    }

    pub async fn clear_session(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)?;
        self.storage.remove(SESSION_REQUEST_KEY)?;
        *self.account.lock().await = None;
        Ok(())
    }

    //=========================================================================
    // Helpers
    //=========================================================================

    fn build_session_request(&self, session_key: SessionKey) -> Result<SessionRequest> {
        let session_params = &self.params.session_params;
        let days = session_params
            .validity_days
            .unwrap_or(SESSION_DEFAULT_VALIDITY_DAYS);
        if days > SESSION_DEFAULT_VALIDITY_DAYS {
            warn!(
                "Requested session validity of {} days exceeds the default of {} days",
                days, SESSION_DEFAULT_VALIDITY_DAYS
            );
        }

        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let params = SessionRequestParams {
            allowed_methods: session_params
                .allowed_methods
                .iter()
                .map(|method| AllowedMethod {
                    contract_address: method.contract,
                    selector: method.selector.clone(),
                })
                .collect(),
            expires_at: now + u64::from(days) * SECONDS_PER_DAY,
            metadata: SessionMetadata {
                project_id: self.params.app_name.clone(),
                tx_fees: vec![
                    TxFee {
                        token_address: Felt::from_hex_unchecked(STRK_TOKEN_ADDRESS),
                        max_amount: SESSION_MAX_FEE_STRK.to_string(),
                    },
                    TxFee {
                        token_address: Felt::from_hex_unchecked(ETH_TOKEN_ADDRESS),
                        max_amount: SESSION_MAX_FEE_ETH.to_string(),
                    },
                ],
            },
            session_key,
        };

        self.codec
            .create_session_request(self.environment.chain_id.as_felt(), params)
            .map_err(|e| WebWalletError::Codec(e.to_string()))
    }

    async fn finalize_session(
        &self,
        request: &SessionRequest,
        address: Felt,
        signature: Vec<Felt>,
        deployment_payload: Option<AccountDeploymentPayload>,
    ) -> Result<SignedSession> {
        let session = self
            .codec
            .create_session(request, address, self.environment.chain_id.as_felt(), &signature)
            .await
            .map_err(|e| WebWalletError::Codec(e.to_string()))?;
        Ok(SignedSession {
            session,
            signature: Some(signature),
            deployment_payload,
            address: Some(address),
        })
    }

    async fn build_session_account(&self, session: SignedSession) -> Result<Arc<SessionAccount>> {
        let account = create_session_account(SessionAccountParams {
            session,
            session_params: self.params.session_params.clone(),
            paymaster_params: self.params.paymaster_params.clone().unwrap_or_default(),
            provider: self.provider.clone(),
            chain_id: self.environment.chain_id.as_felt(),
            session_service_url: self.environment.backend_base_url.clone(),
            codec: self.codec.clone(),
            gasless: self.gasless.clone(),
            token_service: self.token_service.clone(),
            deploy_polling: self.params.deploy_polling,
        })
        .await?;
        Ok(Arc::new(account))
    }

    fn session_response_from_storage(&self) -> Result<Option<(User, SessionResponse)>> {
        let Some(user) = get_json::<User>(self.storage.as_ref(), USER_KEY)? else {
            return Ok(None);
        };
        let key = normalize_address(&user.address);
        Ok(get_json::<SessionResponse>(self.storage.as_ref(), &key)?.map(|response| (user, response)))
    }
}

/// Every request needs a token, a spender and a decimal amount.
pub fn validate_approval_requests(requests: &[ApprovalRequest]) -> Result<()> {
    for (index, request) in requests.iter().enumerate() {
        let reason = if request.token_address == Felt::ZERO {
            Some("missing tokenAddress")
        } else if request.spender == Felt::ZERO {
            Some("missing spender")
        } else if request.amount.is_empty() || !request.amount.bytes().all(|b| b.is_ascii_digit()) {
            Some("missing amount")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(WebWalletError::InvalidApprovalRequest {
                index,
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}
