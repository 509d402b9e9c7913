use crate::state::{GiftAction, GiftState};
use starknet_types_core::felt::Felt;
use thiserror::Error;
use webwallet_sdk::WebWalletError;

#[derive(Debug, Error)]
pub enum GiftError {
    /// Gift and fee share a token and the gift would not cover the fee
    #[error("Amount must be greater than {minimum} for this token when sending as a gift")]
    AmountTooLow { minimum: String },

    /// Only STRK and ETH can pay escrow fees
    #[error("Unsupported token: {0:#x}")]
    UnsupportedToken(Felt),

    /// The sending or escrow account failed to submit
    #[error("Account error: {0}")]
    Account(String),

    #[error("Cannot {action} a gift that is {state}")]
    InvalidTransition { state: GiftState, action: GiftAction },

    #[error(transparent)]
    Sdk(#[from] WebWalletError),
}

pub type Result<T> = std::result::Result<T, GiftError>;
