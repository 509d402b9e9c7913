//! Gifts held in escrow accounts created by the gift factory.
//!
//! A sender deposits a token amount plus a claim fee; whoever holds the
//! one-time gift key can then claim it, directly from the escrow or through
//! a relaying account, until the sender cancels it.

pub mod claim;
pub mod constants;
pub mod deposit;
pub mod error;
pub mod gift;
pub mod state;

pub use crate::claim::{
    cancel_call, cancel_gift, claim_external_call, claim_internal, claim_internal_call,
    escrow_transaction_version, execute_action_on_account, uses_tx_v3, ClaimOverrides,
};
pub use crate::constants::{gift_factory_address, max_fee, FeeToken};
pub use crate::deposit::{create_deposit, deposit, DepositParams};
pub use crate::error::{GiftError, Result};
pub use crate::gift::{calculate_escrow_address, Gift};
pub use crate::state::{GiftAction, GiftState};
