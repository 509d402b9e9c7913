use crate::error::{GiftError, Result};
use crate::gift::Gift;
use starknet_types_core::felt::Felt;
use tracing::info;
use webwallet_sdk::types::{Call, ExecutionDetails, InvokeResponse};
use webwallet_sdk::utils::u256_from_u128;
use webwallet_sdk::{Account, WebWalletError};

const TOKEN_DECIMALS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositParams {
    /// Base units; the `u256` sent on chain always has a zero high word.
    pub gift_amount: u128,
    pub fee_amount: u128,
    pub factory_address: Felt,
    pub fee_token_address: Felt,
    pub gift_token_address: Felt,
    pub gift_signer_pub_key: Felt,
    pub escrow_account_class_hash: Felt,
}

/// Approvals and the factory `deposit` call funding a new gift.
///
/// When the gift is paid in the fee token a single approval covers both and
/// the gift must be larger than the fee.
pub fn create_deposit(sender: Felt, params: &DepositParams) -> Result<(Vec<Call>, Gift)> {
    let mut calls = Vec::with_capacity(3);
    if params.fee_token_address == params.gift_token_address {
        if params.gift_amount <= params.fee_amount {
            return Err(GiftError::AmountTooLow {
                minimum: format_units(params.fee_amount.saturating_mul(2), TOKEN_DECIMALS),
            });
        }
        let total = params
            .gift_amount
            .checked_add(params.fee_amount)
            .ok_or_else(|| WebWalletError::InvalidValue("gift plus fee overflows u128".to_string()))?;
        calls.push(approve(params.fee_token_address, params.factory_address, total));
    } else {
        calls.push(approve(
            params.fee_token_address,
            params.factory_address,
            params.fee_amount,
        ));
        calls.push(approve(
            params.gift_token_address,
            params.factory_address,
            params.gift_amount,
        ));
    }

    let [gift_low, gift_high] = u256_from_u128(params.gift_amount);
    calls.push(Call::new(
        params.factory_address,
        "deposit",
        vec![
            params.escrow_account_class_hash,
            params.gift_token_address,
            gift_low,
            gift_high,
            params.fee_token_address,
            Felt::from(params.fee_amount),
            params.gift_signer_pub_key,
        ],
    ));

    let gift = Gift {
        factory: params.factory_address,
        escrow_class_hash: params.escrow_account_class_hash,
        sender,
        gift_token: params.gift_token_address,
        gift_amount: params.gift_amount,
        fee_token: params.fee_token_address,
        fee_amount: params.fee_amount,
        gift_pubkey: params.gift_signer_pub_key,
    };
    Ok((calls, gift))
}

/// Submit the deposit from `sender`.
pub async fn deposit(sender: &dyn Account, params: &DepositParams) -> Result<(InvokeResponse, Gift)> {
    let (calls, gift) = create_deposit(sender.address(), params)?;
    let response = sender
        .execute(&calls, None, &ExecutionDetails::default())
        .await
        .map_err(|e| GiftError::Account(e.to_string()))?;
    info!(
        "Deposited gift to escrow {:#x} in tx {:#x}",
        gift.escrow_address(),
        response.transaction_hash
    );
    Ok((response, gift))
}

fn approve(token: Felt, spender: Felt, amount: u128) -> Call {
    let [low, high] = u256_from_u128(amount);
    Call::new(token, "approve", vec![spender, low, high])
}

// Decimal rendering of a base-unit amount, trailing zeros trimmed
fn format_units(value: u128, decimals: usize) -> String {
    let digits = format!("{:0>width$}", value, width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
