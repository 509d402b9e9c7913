#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use webwallet_gifting::{DepositParams, Gift};
use webwallet_sdk::core::constants::{ETH_TOKEN_ADDRESS, STRK_TOKEN_ADDRESS};
use webwallet_sdk::types::{
    Abi, AccountDeploymentPayload, Call, DeployContractPayload, DeployContractResponse,
    ExecutionDetails, FeeEstimate, Invocation, InvokeResponse, TransactionStatus,
};
use webwallet_sdk::{Account, BoxError, Felt, Provider};

pub fn felt(hex: &str) -> Felt {
    Felt::from_hex_unchecked(hex)
}

pub fn strk() -> Felt {
    felt(STRK_TOKEN_ADDRESS)
}

pub fn eth() -> Felt {
    felt(ETH_TOKEN_ADDRESS)
}

pub fn sender() -> Felt {
    felt("0x5e4d")
}

pub fn factory() -> Felt {
    felt("0xfac7")
}

pub fn escrow_class_hash() -> Felt {
    felt("0xe5c0")
}

pub fn deposit_params(gift_token: Felt, gift_amount: u128, fee_amount: u128) -> DepositParams {
    DepositParams {
        gift_amount,
        fee_amount,
        factory_address: factory(),
        fee_token_address: strk(),
        gift_token_address: gift_token,
        gift_signer_pub_key: felt("0x91f7"),
        escrow_account_class_hash: escrow_class_hash(),
    }
}

pub fn gift() -> Gift {
    Gift {
        factory: factory(),
        escrow_class_hash: escrow_class_hash(),
        sender: sender(),
        gift_token: eth(),
        gift_amount: 5_000,
        fee_token: strk(),
        fee_amount: 100,
        gift_pubkey: felt("0x91f7"),
    }
}

pub struct NoopProvider;

#[async_trait]
impl Provider for NoopProvider {
    async fn get_class_hash_at(&self, _address: &Felt) -> Result<Felt, BoxError> {
        Ok(Felt::ZERO)
    }

    async fn get_transaction_status(
        &self,
        _transaction_hash: &Felt,
    ) -> Result<TransactionStatus, BoxError> {
        Ok(TransactionStatus::Accepted)
    }
}

/// Account that records the batches it is asked to execute
pub struct RecordingAccount {
    pub address: Felt,
    pub executed: Mutex<Vec<Vec<Call>>>,
    pub fail_with: Option<String>,
}

impl RecordingAccount {
    pub fn new(address: Felt) -> Self {
        Self {
            address,
            executed: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(address: Felt, message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(address)
        }
    }

    pub fn executed(&self) -> Vec<Vec<Call>> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Account for RecordingAccount {
    fn address(&self) -> Felt {
        self.address
    }

    fn provider(&self) -> Arc<dyn Provider> {
        Arc::new(NoopProvider)
    }

    async fn public_key(&self) -> Result<Felt, BoxError> {
        Ok(felt("0x91f7"))
    }

    async fn execute(
        &self,
        calls: &[Call],
        _abis: Option<&[Abi]>,
        _details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError> {
        self.executed.lock().unwrap().push(calls.to_vec());
        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => Ok(InvokeResponse {
                transaction_hash: felt("0x7a"),
            }),
        }
    }

    async fn deploy_account(
        &self,
        _payload: &AccountDeploymentPayload,
        _details: &ExecutionDetails,
    ) -> Result<InvokeResponse, BoxError> {
        Err("not supported".into())
    }

    async fn deploy_contract(
        &self,
        _payload: &DeployContractPayload,
    ) -> Result<DeployContractResponse, BoxError> {
        Err("not supported".into())
    }

    async fn estimate_fee_bulk(
        &self,
        _invocations: &[Invocation],
        _details: &ExecutionDetails,
    ) -> Result<Vec<FeeEstimate>, BoxError> {
        Err("not supported".into())
    }
}
