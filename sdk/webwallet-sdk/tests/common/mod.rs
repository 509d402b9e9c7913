#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webwallet_sdk::account::{create_session_account, SessionAccount, SessionAccountParams};
use webwallet_sdk::config::{DeployPolling, InitParams};
use webwallet_sdk::core::codec::{OutsideExecutionContext, SessionCodec};
use webwallet_sdk::core::connection::{Account, Provider};
use webwallet_sdk::core::connector::{
    AddInvokeTransactionResult, ConnectAndSignSessionRequest, ConnectAndSignSessionResponse,
    WalletConnector, WalletRequest,
};
use webwallet_sdk::core::constants::{
    ETH_TOKEN_ADDRESS, SN_SEPOLIA, STRK_TOKEN_ADDRESS, USDC_TOKEN_ADDRESS,
};
use webwallet_sdk::core::storage::MemoryStore;
use webwallet_sdk::paymaster::avnu::{
    BuildTypedDataRequest, ExecuteRequest, GasTokenPrice, GaslessBackend, GaslessCompatibility,
    GaslessOptions,
};
use webwallet_sdk::paymaster::PaymasterParameters;
use webwallet_sdk::services::token::TokenService;
use webwallet_sdk::types::{
    Abi, AccountDeploymentPayload, AllowedMethod, Call, DeployContractPayload,
    DeployContractResponse, ExecutionDetails, FeeEstimate, Invocation, InvokeResponse, Session,
    SessionKey, SessionParameters, SessionRequest, SessionRequestParams, SignedSession,
    TokenBalance, TransactionStatus, TypedData, TypedDataDomain,
};
use webwallet_sdk::utils::selector_from_name;
use webwallet_sdk::{BoxError, Felt, WebWallet};

//=============================================================================
// Fixtures
//=============================================================================

pub fn felt(hex: &str) -> Felt {
    Felt::from_hex_unchecked(hex)
}

pub fn account_address() -> Felt {
    felt("0xacc0")
}

pub fn session_public_key() -> Felt {
    felt("0x9b")
}

pub fn strk() -> Felt {
    felt(STRK_TOKEN_ADDRESS)
}

pub fn eth() -> Felt {
    felt(ETH_TOKEN_ADDRESS)
}

pub fn usdc() -> Felt {
    felt(USDC_TOKEN_ADDRESS)
}

pub fn game_contract() -> Felt {
    felt("0x6a3e")
}

pub fn play_call() -> Call {
    Call::new(game_contract(), "play", vec![Felt::from(1u8)])
}

pub fn game_params() -> SessionParameters {
    SessionParameters::default().allow(game_contract(), "play")
}

pub fn fast_polling() -> DeployPolling {
    DeployPolling {
        retry_interval: Duration::from_millis(1),
        max_attempts: 3,
    }
}

pub fn deployment_payload() -> AccountDeploymentPayload {
    AccountDeploymentPayload {
        class_hash: felt("0xc1a55"),
        constructor_calldata: vec![Felt::ZERO, session_public_key(), Felt::ONE],
        address_salt: session_public_key(),
        contract_address: account_address(),
    }
}

/// A signed session over `game_params()` expiring at `expires_at`
pub fn signed_session(expires_at: u64) -> SignedSession {
    SignedSession {
        session: Session {
            session_key: SessionKey {
                public_key: felt("0x5e55"),
                private_key: felt("0x5eed"),
            },
            allowed_methods: vec![AllowedMethod {
                contract_address: game_contract(),
                selector: "play".to_string(),
            }],
            expires_at,
            chain_id: felt(SN_SEPOLIA),
            authorisation_signature: vec![felt("0x1"), felt("0x2")],
            hash: felt("0x4a54"),
            version: "0x1".to_string(),
            session_key_guid: felt("0x6"),
            metadata: "{}".to_string(),
        },
        signature: Some(vec![felt("0x1"), felt("0x2")]),
        deployment_payload: Some(deployment_payload()),
        address: Some(account_address()),
    }
}

pub fn far_future() -> u64 {
    4_102_444_800 // 2100-01-01
}

/// Outside-execution typed data listing `(to, entrypoint)` pairs
pub fn outside_typed_data(calls: &[(Felt, &str)]) -> TypedData {
    let message_calls: Vec<_> = calls
        .iter()
        .map(|(to, entrypoint)| {
            json!({
                "To": format!("{:#x}", to),
                "Selector": format!("{:#x}", selector_from_name(entrypoint)),
                "Calldata": []
            })
        })
        .collect();
    TypedData {
        types: json!({}),
        primary_type: "OutsideExecution".to_string(),
        domain: TypedDataDomain {
            name: Some("Account.execute_from_outside".to_string()),
            version: Some(json!("2")),
            chain_id: Some(json!("SN_SEPOLIA")),
            revision: Some(json!("1")),
        },
        message: json!({
            "Caller": "0x414e595f43414c4c4552",
            "Nonce": "0x1",
            "Execute After": "0x0",
            "Execute Before": "0xffffffff",
            "Calls": message_calls
        }),
    }
}

//=============================================================================
// Provider
//=============================================================================

pub struct MockProvider {
    pub deployed: AtomicBool,
    pub class_hash_queries: AtomicUsize,
    pub statuses: Mutex<VecDeque<Result<TransactionStatus, String>>>,
    pub fallback_status: Mutex<TransactionStatus>,
    pub status_queries: AtomicUsize,
}

impl MockProvider {
    pub fn new(deployed: bool) -> Self {
        Self {
            deployed: AtomicBool::new(deployed),
            class_hash_queries: AtomicUsize::new(0),
            statuses: Mutex::new(VecDeque::new()),
            fallback_status: Mutex::new(TransactionStatus::Accepted),
            status_queries: AtomicUsize::new(0),
        }
    }

    pub fn push_status(&self, status: Result<TransactionStatus, String>) {
        self.statuses.lock().unwrap().push_back(status);
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn get_class_hash_at(&self, _address: &Felt) -> Result<Felt, BoxError> {
        self.class_hash_queries.fetch_add(1, Ordering::SeqCst);
        if self.deployed.load(Ordering::SeqCst) {
            Ok(felt("0xc1a55"))
        } else {
            Err("Contract not found".into())
        }
    }

    async fn get_transaction_status(
        &self,
        _transaction_hash: &Felt,
    ) -> Result<TransactionStatus, BoxError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(Ok(status)) => Ok(status),
            Some(Err(e)) => Err(e.into()),
            None => Ok(self.fallback_status.lock().unwrap().clone()),
        }
    }
}

//=============================================================================
// Account
//=============================================================================

pub struct MockAccount {
    pub address: Felt,
    pub provider: Arc<MockProvider>,
    pub execute_results: Mutex<VecDeque<Result<Felt, String>>>,
    pub executed: Mutex<Vec<Vec<Call>>>,
    pub deploy_account_calls: AtomicUsize,
    pub deployed_contract_address: Mutex<Felt>,
    pub deploy_contract_payloads: Mutex<Vec<DeployContractPayload>>,
    pub fee_estimate: FeeEstimate,
    pub estimates: Mutex<Vec<Vec<&'static str>>>,
    pub estimate_nonces: Mutex<Vec<Option<Felt>>>,
}

impl MockAccount {
    pub fn new(address: Felt, provider: Arc<MockProvider>) -> Self {
        Self {
            address,
            provider,
            execute_results: Mutex::new(VecDeque::new()),
            executed: Mutex::new(Vec::new()),
            deploy_account_calls: AtomicUsize::new(0),
            deployed_contract_address: Mutex::new(Felt::ZERO),
            deploy_contract_payloads: Mutex::new(Vec::new()),
            fee_estimate: FeeEstimate {
                overall_fee: 1_000,
                gas_price: 1,
                data_gas_price: None,
            },
            estimates: Mutex::new(Vec::new()),
            estimate_nonces: Mutex::new(Vec::new()),
        }
    }

    pub fn push_execute_result(&self, result: Result<Felt, String>) {
        self.execute_results.lock().unwrap().push_back(result);
    }

    pub fn execute_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }
}

#[async_trait]
impl Account for MockAccount {
    fn address(&self) -> Felt {
        self.address
    }

    fn provider(&self) -> Arc<dyn Provider> {
        self.provider.clone()
    }

    async fn public_key(&self) -> Result<Felt, BoxError> {
        Ok(session_public_key())
    }

    async fn execute(
        &self,
        calls: &[Call],
        _abis: Option<&[Abi]>,
        _details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError> {
        self.executed.lock().unwrap().push(calls.to_vec());
        let next = self.execute_results.lock().unwrap().pop_front();
        match next.unwrap_or(Ok(felt("0xe1"))) {
            Ok(transaction_hash) => Ok(InvokeResponse { transaction_hash }),
            Err(e) => Err(e.into()),
        }
    }

    async fn deploy_account(
        &self,
        _payload: &AccountDeploymentPayload,
        _details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError> {
        self.deploy_account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(InvokeResponse {
            transaction_hash: felt("0xd0"),
        })
    }

    async fn deploy_contract(
        &self,
        payload: &DeployContractPayload,
    ) -> Result<DeployContractResponse, BoxError> {
        self.deploy_contract_payloads
            .lock()
            .unwrap()
            .push(payload.clone());
        Ok(DeployContractResponse {
            contract_address: *self.deployed_contract_address.lock().unwrap(),
            transaction_hash: felt("0xdc"),
        })
    }

    async fn estimate_fee_bulk(
        &self,
        invocations: &[Invocation],
        details: &ExecutionDetails,
    ) -> Result<Vec<FeeEstimate>, BoxError> {
        let kinds = invocations
            .iter()
            .map(|invocation| match invocation {
                Invocation::Invoke(_) => "invoke",
                Invocation::DeployAccount(_) => "deploy_account",
            })
            .collect();
        self.estimates.lock().unwrap().push(kinds);
        self.estimate_nonces.lock().unwrap().push(details.nonce);
        Ok(invocations.iter().map(|_| self.fee_estimate).collect())
    }
}

//=============================================================================
// Session Codec
//=============================================================================

pub struct MockCodec {
    pub account: Arc<MockAccount>,
    pub valid: AtomicBool,
    pub created_sessions: AtomicUsize,
    pub signed_batches: Mutex<Vec<Vec<Call>>>,
    pub networks: Mutex<Vec<String>>,
}

impl MockCodec {
    pub fn new(account: Arc<MockAccount>) -> Self {
        Self {
            account,
            valid: AtomicBool::new(true),
            created_sessions: AtomicUsize::new(0),
            signed_batches: Mutex::new(Vec::new()),
            networks: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SessionCodec for MockCodec {
    fn create_session_request(
        &self,
        chain_id: Felt,
        params: SessionRequestParams,
    ) -> Result<SessionRequest, BoxError> {
        let metadata = serde_json::to_string(&params.metadata)?;
        Ok(SessionRequest {
            session_typed_data: TypedData {
                types: json!({}),
                primary_type: "Session".to_string(),
                domain: TypedDataDomain {
                    name: Some("SessionAccount.session".to_string()),
                    ..TypedDataDomain::default()
                },
                message: json!({ "Expires At": params.expires_at }),
            },
            session_key: params.session_key,
            allowed_methods: params.allowed_methods,
            expires_at: params.expires_at,
            chain_id,
            metadata,
        })
    }

    async fn create_session(
        &self,
        request: &SessionRequest,
        _address: Felt,
        chain_id: Felt,
        authorisation_signature: &[Felt],
    ) -> Result<Session, BoxError> {
        self.created_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Session {
            session_key: request.session_key.clone(),
            allowed_methods: request.allowed_methods.clone(),
            expires_at: request.expires_at,
            chain_id,
            authorisation_signature: authorisation_signature.to_vec(),
            hash: felt("0x4a54"),
            version: "0x1".to_string(),
            session_key_guid: felt("0x6"),
            metadata: request.metadata.clone(),
        })
    }

    fn verify_session(&self, _session: &SignedSession) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    async fn build_session_account(
        &self,
        _session: &SignedSession,
        _provider: Arc<dyn Provider>,
        _session_service_url: &str,
    ) -> Result<Arc<dyn Account>, BoxError> {
        Ok(self.account.clone() as Arc<dyn Account>)
    }

    async fn create_outside_execution_call(
        &self,
        context: OutsideExecutionContext<'_>,
        calls: &[Call],
    ) -> Result<Call, BoxError> {
        self.networks
            .lock()
            .unwrap()
            .push(context.network.to_string());
        Ok(Call::new(
            account_address(),
            "execute_from_outside_v2",
            vec![Felt::from(calls.len() as u64)],
        ))
    }

    async fn sign_outside_execution(
        &self,
        context: OutsideExecutionContext<'_>,
        _typed_data: &TypedData,
        calls: &[Call],
    ) -> Result<Vec<Felt>, BoxError> {
        self.networks
            .lock()
            .unwrap()
            .push(context.network.to_string());
        self.signed_batches.lock().unwrap().push(calls.to_vec());
        Ok(vec![felt("0x5151"), felt("0x5252")])
    }
}

//=============================================================================
// Wallet Connector
//=============================================================================

pub struct MockConnector {
    pub ready: AtomicBool,
    pub response: Mutex<Option<ConnectAndSignSessionResponse>>,
    pub session_requests: Mutex<Vec<ConnectAndSignSessionRequest>>,
    pub wallet_requests: Mutex<Vec<WalletRequest>>,
}

impl MockConnector {
    /// Connector whose user approves with `account_address()`
    pub fn approving() -> Self {
        Self {
            ready: AtomicBool::new(true),
            response: Mutex::new(Some(ConnectAndSignSessionResponse {
                account: vec![account_address()],
                signature: vec![felt("0xa1"), felt("0xa2")],
                deployment_payload: Some(deployment_payload()),
                approval_requests_calls: None,
                approval_transaction_hash: None,
            })),
            session_requests: Mutex::new(Vec::new()),
            wallet_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        let connector = Self::approving();
        *connector.response.lock().unwrap() = None;
        connector
    }

    pub fn session_request_count(&self) -> usize {
        self.session_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn connect_and_sign_session(
        &self,
        request: ConnectAndSignSessionRequest,
    ) -> Result<ConnectAndSignSessionResponse, BoxError> {
        self.session_requests.lock().unwrap().push(request);
        let response = self.response.lock().unwrap().clone();
        response.ok_or_else(|| "User rejected the session".into())
    }

    async fn request(&self, request: WalletRequest) -> Result<AddInvokeTransactionResult, BoxError> {
        self.wallet_requests.lock().unwrap().push(request);
        Ok(AddInvokeTransactionResult {
            transaction_hash: felt("0xa99"),
        })
    }
}

//=============================================================================
// Gasless Backend
//=============================================================================

pub struct MockGasless {
    pub prices: Vec<GasTokenPrice>,
    pub compatibility: GaslessCompatibility,
    pub price_calls: AtomicUsize,
    pub compatibility_calls: AtomicUsize,
    pub build_requests: Mutex<Vec<BuildTypedDataRequest>>,
    pub execute_requests: Mutex<Vec<ExecuteRequest>>,
    pub execute_results: Mutex<VecDeque<Result<Felt, String>>>,
    pub options: Mutex<Vec<GaslessOptions>>,
}

impl MockGasless {
    pub fn new() -> Self {
        Self {
            prices: vec![
                GasTokenPrice {
                    token_address: strk(),
                    price_in_eth: 1_000_000_000_000_000_000,
                    price_in_usd: 0.5,
                    decimals: 18,
                },
                GasTokenPrice {
                    token_address: usdc(),
                    price_in_eth: 1_000_000_000_000_000,
                    price_in_usd: 1.0,
                    decimals: 6,
                },
            ],
            compatibility: GaslessCompatibility {
                is_compatible: true,
                gas_consumed_overhead: 10,
                data_gas_consumed_overhead: 20,
            },
            price_calls: AtomicUsize::new(0),
            compatibility_calls: AtomicUsize::new(0),
            build_requests: Mutex::new(Vec::new()),
            execute_requests: Mutex::new(Vec::new()),
            execute_results: Mutex::new(VecDeque::new()),
            options: Mutex::new(Vec::new()),
        }
    }

    pub fn push_execute_result(&self, result: Result<Felt, String>) {
        self.execute_results.lock().unwrap().push_back(result);
    }

    pub fn execute_count(&self) -> usize {
        self.execute_requests.lock().unwrap().len()
    }

    pub fn build_count(&self) -> usize {
        self.build_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GaslessBackend for MockGasless {
    async fn fetch_gas_token_prices(
        &self,
        _options: &GaslessOptions,
    ) -> Result<Vec<GasTokenPrice>, BoxError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prices.clone())
    }

    async fn fetch_account_compatibility(
        &self,
        _address: &Felt,
        _options: &GaslessOptions,
    ) -> Result<GaslessCompatibility, BoxError> {
        self.compatibility_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.compatibility)
    }

    /// Lists the requested calls, followed by the fee transfer when a gas
    /// token pays
    async fn build_typed_data(
        &self,
        request: &BuildTypedDataRequest,
        options: &GaslessOptions,
    ) -> Result<TypedData, BoxError> {
        self.build_requests.lock().unwrap().push(request.clone());
        self.options.lock().unwrap().push(options.clone());
        let mut entries: Vec<(Felt, &str)> = request
            .calls
            .iter()
            .map(|call| (call.contract_address, call.entrypoint.as_str()))
            .collect();
        if let Some(token) = request.gas_token_address {
            entries.push((token, "transfer"));
        }
        Ok(outside_typed_data(&entries))
    }

    async fn execute(
        &self,
        request: &ExecuteRequest,
        _options: &GaslessOptions,
    ) -> Result<InvokeResponse, BoxError> {
        self.execute_requests.lock().unwrap().push(request.clone());
        let next = self.execute_results.lock().unwrap().pop_front();
        match next.unwrap_or(Ok(felt("0x9a5"))) {
            Ok(transaction_hash) => Ok(InvokeResponse { transaction_hash }),
            Err(e) => Err(e.into()),
        }
    }
}

//=============================================================================
// Token Service
//=============================================================================

pub struct MockTokenService {
    pub balances: Mutex<Vec<TokenBalance>>,
    pub networks: Mutex<Vec<String>>,
}

impl MockTokenService {
    pub fn new(balances: Vec<TokenBalance>) -> Self {
        Self {
            balances: Mutex::new(balances),
            networks: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.networks.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenService for MockTokenService {
    async fn fetch_address_token_balances(
        &self,
        _address: &Felt,
        network: &str,
    ) -> Result<Vec<TokenBalance>, BoxError> {
        self.networks.lock().unwrap().push(network.to_string());
        Ok(self.balances.lock().unwrap().clone())
    }
}

pub fn balance(address: Felt, amount: &str) -> TokenBalance {
    TokenBalance {
        address,
        balance: amount.to_string(),
    }
}

//=============================================================================
// Test Environment
//=============================================================================

pub struct TestEnv {
    pub provider: Arc<MockProvider>,
    pub account: Arc<MockAccount>,
    pub codec: Arc<MockCodec>,
    pub connector: Arc<MockConnector>,
    pub gasless: Arc<MockGasless>,
    pub tokens: Arc<MockTokenService>,
    pub storage: Arc<MemoryStore>,
}

impl TestEnv {
    pub fn new(deployed: bool) -> Self {
        Self::with_connector(deployed, MockConnector::approving())
    }

    pub fn with_connector(deployed: bool, connector: MockConnector) -> Self {
        let provider = Arc::new(MockProvider::new(deployed));
        let account = Arc::new(MockAccount::new(account_address(), provider.clone()));
        Self {
            codec: Arc::new(MockCodec::new(account.clone())),
            provider,
            account,
            connector: Arc::new(connector),
            gasless: Arc::new(MockGasless::new()),
            tokens: Arc::new(MockTokenService::new(vec![
                balance(strk(), "0"),
                balance(usdc(), "5000000"),
            ])),
            storage: Arc::new(MemoryStore::new()),
        }
    }

    pub async fn session_account(
        &self,
        session: SignedSession,
        session_params: SessionParameters,
        paymaster_params: PaymasterParameters,
    ) -> SessionAccount {
        create_session_account(SessionAccountParams {
            session,
            session_params,
            paymaster_params,
            provider: self.provider.clone(),
            chain_id: felt(SN_SEPOLIA),
            session_service_url: "https://api.hydrogen.argent47.net/v1".to_string(),
            codec: self.codec.clone(),
            gasless: self.gasless.clone(),
            token_service: self.tokens.clone(),
            deploy_polling: fast_polling(),
        })
        .await
        .unwrap()
    }

    pub fn init_params(&self) -> InitParams {
        InitParams::new("test-app", game_params())
            .with_provider(self.provider.clone())
            .with_deploy_polling(fast_polling())
    }

    pub fn wallet(&self, params: InitParams) -> WebWallet {
        WebWallet::builder(params)
            .with_storage(self.storage.clone())
            .with_connector(self.connector.clone())
            .with_codec(self.codec.clone())
            .with_gasless_backend(self.gasless.clone())
            .with_token_service(self.tokens.clone())
            .build()
            .unwrap()
    }
}
