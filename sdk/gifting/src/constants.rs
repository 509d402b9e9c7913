use crate::error::{GiftError, Result};
use starknet_types_core::felt::Felt;
use webwallet_sdk::core::constants::{ETH_TOKEN_ADDRESS, STRK_TOKEN_ADDRESS};
use webwallet_sdk::types::ChainId;

pub const GIFT_FACTORY_MAINNET: &str =
    "0x03667b42afbb0c8539aa411a6b181ab30b9da64725bdf61e997820dd630f39fa";
pub const GIFT_FACTORY_SEPOLIA: &str =
    "0x42a18d85a621332f749947a96342ba682f08e499b9f1364325903a37c5def60";

/// 0.2 STRK
pub const STRK_GIFT_MAX_FEE: u128 = 200_000_000_000_000_000;
/// 0.0002 ETH
pub const ETH_GIFT_MAX_FEE: u128 = 200_000_000_000_000;

pub const ALLOWED_GIFT_TOKEN_ADDRESSES: [&str; 2] = [STRK_TOKEN_ADDRESS, ETH_TOKEN_ADDRESS];

/// Tokens an escrow fee can be paid in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeToken {
    Eth,
    Strk,
}

impl FeeToken {
    pub fn from_address(address: &Felt) -> Result<Self> {
        if *address == Felt::from_hex_unchecked(STRK_TOKEN_ADDRESS) {
            Ok(FeeToken::Strk)
        } else if *address == Felt::from_hex_unchecked(ETH_TOKEN_ADDRESS) {
            Ok(FeeToken::Eth)
        } else {
            Err(GiftError::UnsupportedToken(*address))
        }
    }

    pub fn address(&self) -> Felt {
        match self {
            FeeToken::Eth => Felt::from_hex_unchecked(ETH_TOKEN_ADDRESS),
            FeeToken::Strk => Felt::from_hex_unchecked(STRK_TOKEN_ADDRESS),
        }
    }
}

pub fn gift_factory_address(chain_id: ChainId) -> Felt {
    match chain_id {
        ChainId::Mainnet => Felt::from_hex_unchecked(GIFT_FACTORY_MAINNET),
        ChainId::Sepolia => Felt::from_hex_unchecked(GIFT_FACTORY_SEPOLIA),
    }
}

/// Fee cap reserved for claiming, per chain and fee token
pub fn max_fee(chain_id: ChainId, token: FeeToken) -> u128 {
    match (chain_id, token) {
        (ChainId::Mainnet, FeeToken::Eth) => 200_000_000_000_000,
        (ChainId::Mainnet, FeeToken::Strk) => 200_000_000_000_000_000,
        (ChainId::Sepolia, FeeToken::Eth) => 1_000_000_000_000_000,
        (ChainId::Sepolia, FeeToken::Strk) => 3_000_000_000_000_000_000,
    }
}

/// Chain-independent cap used when the claim transaction version is known
pub fn get_max_fee(use_tx_v3: bool) -> u128 {
    if use_tx_v3 {
        STRK_GIFT_MAX_FEE
    } else {
        ETH_GIFT_MAX_FEE
    }
}

pub fn is_allowed_gift_token(address: &Felt) -> bool {
    ALLOWED_GIFT_TOKEN_ADDRESSES
        .iter()
        .any(|allowed| Felt::from_hex_unchecked(allowed) == *address)
}
