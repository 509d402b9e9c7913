use crate::constants::FeeToken;
use crate::error::{GiftError, Result};
use crate::gift::Gift;
use starknet_types_core::felt::Felt;
use tracing::info;
use webwallet_sdk::core::signer::TransactionVersion;
use webwallet_sdk::types::{Call, ExecutionDetails, InvokeResponse};
use webwallet_sdk::utils::selector_from_name;
use webwallet_sdk::Account;

/// Addresses that replace the computed escrow, e.g. for a gift whose
/// escrow was deployed from a different class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimOverrides {
    pub escrow_account_address: Option<Felt>,
    pub call_to_address: Option<Felt>,
}

/// Whether the escrow of a gift paying fees in `fee_token` transacts with
/// v3 (STRK) rather than legacy (ETH) transactions
pub fn uses_tx_v3(fee_token: &Felt) -> Result<bool> {
    Ok(FeeToken::from_address(fee_token)? == FeeToken::Strk)
}

/// Transaction version the escrow account must be driven with
pub fn escrow_transaction_version(gift: &Gift) -> Result<TransactionVersion> {
    Ok(if uses_tx_v3(&gift.fee_token)? {
        TransactionVersion::V3
    } else {
        TransactionVersion::V1
    })
}

/// Escrow address for `gift`, honouring an override
pub fn escrow_address(gift: &Gift, overrides: &ClaimOverrides) -> Felt {
    overrides
        .escrow_account_address
        .unwrap_or_else(|| gift.escrow_address())
}

/// `claim_internal` call sending the gift to `receiver`
pub fn claim_internal_call(gift: &Gift, receiver: Felt, overrides: &ClaimOverrides) -> Call {
    let mut calldata = gift.calldata();
    calldata.push(receiver);
    Call::new(
        overrides
            .call_to_address
            .unwrap_or_else(|| escrow_address(gift, overrides)),
        "claim_internal",
        calldata,
    )
}

/// Claim from the escrow account itself.
///
/// `escrow_account` must be the escrow address operated by the gift key,
/// using [`escrow_transaction_version`].
pub async fn claim_internal(
    escrow_account: &dyn Account,
    gift: &Gift,
    receiver: Felt,
    overrides: &ClaimOverrides,
    details: &ExecutionDetails,
) -> Result<InvokeResponse> {
    let call = claim_internal_call(gift, receiver, overrides);
    let response = escrow_account
        .execute(&[call], None, details)
        .await
        .map_err(|e| GiftError::Account(e.to_string()))?;
    info!(
        "Claimed gift from {:#x} to {:#x} in tx {:#x}",
        escrow_account.address(),
        receiver,
        response.transaction_hash
    );
    Ok(response)
}

/// Call through which any account relays `function_name` to the escrow
pub fn execute_action_on_account(function_name: &str, account_address: Felt, args: &[Felt]) -> Call {
    let mut calldata = Vec::with_capacity(args.len() + 2);
    calldata.push(selector_from_name(function_name));
    calldata.push(Felt::from(args.len() as u64));
    calldata.extend_from_slice(args);
    Call::new(account_address, "execute_action", calldata)
}

/// Claim paid by a third-party account, authorised by the gift key's
/// `[r, s]` signature over the claim.
pub fn claim_external_call(
    gift: &Gift,
    receiver: Felt,
    dust_receiver: Option<Felt>,
    signature: [Felt; 2],
) -> Call {
    let mut args = gift.calldata();
    args.push(receiver);
    args.push(dust_receiver.unwrap_or(Felt::ZERO));
    args.extend(signature);
    execute_action_on_account("claim_external", gift.escrow_address(), &args)
}

pub fn cancel_call(gift: &Gift) -> Call {
    execute_action_on_account("cancel", gift.escrow_address(), &gift.calldata())
}

/// Return the gift to its sender.
pub async fn cancel_gift(sender_account: &dyn Account, gift: &Gift) -> Result<InvokeResponse> {
    let response = sender_account
        .execute(&[cancel_call(gift)], None, &ExecutionDetails::default())
        .await
        .map_err(|e| GiftError::Account(e.to_string()))?;
    info!(
        "Cancelled gift {:#x} in tx {:#x}",
        gift.escrow_address(),
        response.transaction_hash
    );
    Ok(response)
}
