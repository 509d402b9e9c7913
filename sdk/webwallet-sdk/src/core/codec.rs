use crate::core::connection::{Account, Provider};
use crate::error::BoxError;
use crate::types::{Call, Session, SessionRequest, SessionRequestParams, SignedSession, TypedData};
use async_trait::async_trait;
use starknet_types_core::felt::Felt;
use std::sync::Arc;

/// Inputs shared by the outside-execution operations of the codec
pub struct OutsideExecutionContext<'a> {
    pub session: &'a SignedSession,
    pub session_service_url: &'a str,
    /// `mainnet` or `sepolia`
    pub network: &'a str,
}

/// Cryptographic session construction and verification.
///
/// Implemented outside this crate; the SDK only sequences calls into it and
/// supplies the session, the session key and the network.
#[async_trait]
pub trait SessionCodec: Send + Sync {
    /// Build the off-chain session request (typed data the user will sign).
    fn create_session_request(
        &self,
        chain_id: Felt,
        params: SessionRequestParams,
    ) -> Result<SessionRequest, BoxError>;

    /// Finalize a session once the wallet returned the authorisation signature.
    async fn create_session(
        &self,
        request: &SessionRequest,
        address: Felt,
        chain_id: Felt,
        authorisation_signature: &[Felt],
    ) -> Result<Session, BoxError>;

    fn verify_session(&self, session: &SignedSession) -> bool;

    /// Plain account whose signer produces session signatures.
    async fn build_session_account(
        &self,
        session: &SignedSession,
        provider: Arc<dyn Provider>,
        session_service_url: &str,
    ) -> Result<Arc<dyn Account>, BoxError>;

    /// Wrap `calls` into one `execute_from_outside` call authorized by the session key.
    async fn create_outside_execution_call(
        &self,
        context: OutsideExecutionContext<'_>,
        calls: &[Call],
    ) -> Result<Call, BoxError>;

    /// Sign an outside-execution typed data message covering exactly `calls`.
    async fn sign_outside_execution(
        &self,
        context: OutsideExecutionContext<'_>,
        typed_data: &TypedData,
        calls: &[Call],
    ) -> Result<Vec<Felt>, BoxError>;
}
