use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use webwallet_sdk::utils::{calculate_contract_address, serde_u128, u256_from_u128};

/// A deposited gift, enough to recompute its escrow account and to claim or
/// cancel it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    pub factory: Felt,
    pub escrow_class_hash: Felt,
    pub sender: Felt,
    pub gift_token: Felt,
    /// Encoded as a `u256` with a zero high word, so amounts are capped at
    /// `u128::MAX` base units.
    #[serde(with = "serde_u128")]
    pub gift_amount: u128,
    pub fee_token: Felt,
    #[serde(with = "serde_u128")]
    pub fee_amount: u128,
    /// Public key of the one-time gift signer
    pub gift_pubkey: Felt,
}

impl Gift {
    /// Escrow constructor arguments
    pub fn constructor_calldata(&self) -> Vec<Felt> {
        let [low, high] = u256_from_u128(self.gift_amount);
        vec![
            self.sender,
            self.gift_token,
            low,
            high,
            self.fee_token,
            Felt::from(self.fee_amount),
            self.gift_pubkey,
        ]
    }

    /// The gift as the escrow entrypoints expect it
    pub fn calldata(&self) -> Vec<Felt> {
        let mut calldata = vec![self.factory, self.escrow_class_hash];
        calldata.extend(self.constructor_calldata());
        calldata
    }

    /// Address the factory deploys this gift's escrow account at (salt 0)
    pub fn escrow_address(&self) -> Felt {
        calculate_escrow_address(self)
    }
}

pub fn calculate_escrow_address(gift: &Gift) -> Felt {
    calculate_contract_address(
        &Felt::ZERO,
        &gift.escrow_class_hash,
        &gift.constructor_calldata(),
        &gift.factory,
    )
}
