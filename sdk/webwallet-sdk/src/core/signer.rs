use crate::error::{Result, WebWalletError};
use crate::types::{AccountDeploymentPayload, Call};
use crate::utils::{compute_hash_on_elements, short_string};
use async_trait::async_trait;
use rand::RngCore;
use starknet_crypto::{get_public_key, rfc6979_generate_k, sign};
use starknet_types_core::felt::Felt;

/// Abstraction for an entity that can sign a message hash.
/// Higher level transaction signing is built on top of it by the free
/// functions in this module.
#[async_trait]
pub trait RawSigner: Send + Sync {
    /// Not every signer exposes a single public key.
    async fn public_key(&self) -> Result<Felt> {
        Err(WebWalletError::Account(
            "This signer allows multiple public keys".to_string(),
        ))
    }

    async fn sign_raw(&self, message_hash: &Felt) -> Result<Vec<Felt>>;
}

/// Plain STARK-curve keypair
#[derive(Clone)]
pub struct StarkKeyPair {
    private_key: Felt,
}

impl StarkKeyPair {
    /// Fresh random key below 2**251, hence below the curve order
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            bytes[0] &= 0x07;
            let private_key = Felt::from_bytes_be(&bytes);
            if private_key != Felt::ZERO {
                return Self { private_key };
            }
        }
    }

    pub fn from_private_key(private_key: Felt) -> Self {
        Self { private_key }
    }

    pub fn private_key(&self) -> Felt {
        self.private_key
    }

    pub fn public_key(&self) -> Felt {
        get_public_key(&self.private_key)
    }
}

impl std::fmt::Debug for StarkKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarkKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RawSigner for StarkKeyPair {
    async fn public_key(&self) -> Result<Felt> {
        Ok(StarkKeyPair::public_key(self))
    }

    async fn sign_raw(&self, message_hash: &Felt) -> Result<Vec<Felt>> {
        let k = rfc6979_generate_k(message_hash, &self.private_key, None);
        let signature = sign(&self.private_key, message_hash, &k)
            .map_err(|e| WebWalletError::Account(format!("signing failed: {e}")))?;
        Ok(vec![signature.r, signature.s])
    }
}

//=============================================================================
// Transaction Hashes
//=============================================================================

/// Transaction versions a signer may be asked to hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionVersion {
    V1,
    V3,
}

/// Signing details of an INVOKE transaction
#[derive(Debug, Clone)]
pub struct InvocationSignerDetails {
    pub wallet_address: Felt,
    pub chain_id: Felt,
    pub nonce: Felt,
    pub max_fee: Felt,
    pub version: TransactionVersion,
}

/// Signing details of a DEPLOY_ACCOUNT transaction
#[derive(Debug, Clone)]
pub struct DeployAccountSignerDetails {
    pub payload: AccountDeploymentPayload,
    pub chain_id: Felt,
    pub nonce: Felt,
    pub max_fee: Felt,
    pub version: TransactionVersion,
}

/// `__execute__` calldata of a Cairo 1 account
pub fn execute_calldata(calls: &[Call]) -> Vec<Felt> {
    let mut calldata = vec![Felt::from(calls.len() as u64)];
    for call in calls {
        calldata.push(call.contract_address);
        calldata.push(call.selector());
        calldata.push(Felt::from(call.calldata.len() as u64));
        calldata.extend_from_slice(&call.calldata);
    }
    calldata
}

pub fn invoke_transaction_hash(calls: &[Call], details: &InvocationSignerDetails) -> Result<Felt> {
    if details.version != TransactionVersion::V1 {
        return Err(WebWalletError::UnsupportedTransactionVersion(format!(
            "{:?} invoke",
            details.version
        )));
    }
    Ok(compute_hash_on_elements(&[
        short_string("invoke")?,
        Felt::ONE,
        details.wallet_address,
        Felt::ZERO,
        compute_hash_on_elements(&execute_calldata(calls)),
        details.max_fee,
        details.chain_id,
        details.nonce,
    ]))
}

pub fn deploy_account_transaction_hash(details: &DeployAccountSignerDetails) -> Result<Felt> {
    if details.version != TransactionVersion::V1 {
        return Err(WebWalletError::UnsupportedTransactionVersion(format!(
            "{:?} deploy_account",
            details.version
        )));
    }
    let payload = &details.payload;
    let mut constructor = vec![payload.class_hash, payload.address_salt];
    constructor.extend_from_slice(&payload.constructor_calldata);
    Ok(compute_hash_on_elements(&[
        short_string("deploy_account")?,
        Felt::ONE,
        payload.contract_address,
        Felt::ZERO,
        compute_hash_on_elements(&constructor),
        details.max_fee,
        details.chain_id,
        details.nonce,
    ]))
}

pub async fn sign_transaction(
    signer: &dyn RawSigner,
    calls: &[Call],
    details: &InvocationSignerDetails,
) -> Result<Vec<Felt>> {
    let hash = invoke_transaction_hash(calls, details)?;
    signer.sign_raw(&hash).await
}

pub async fn sign_deploy_account_transaction(
    signer: &dyn RawSigner,
    details: &DeployAccountSignerDetails,
) -> Result<Vec<Felt>> {
    let hash = deploy_account_transaction_hash(details)?;
    signer.sign_raw(&hash).await
}
