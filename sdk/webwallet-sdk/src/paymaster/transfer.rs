use crate::error::{Result, WebWalletError};
use crate::types::{Call, TypedData};
use crate::utils::selector_from_name;
use once_cell::sync::Lazy;
use regex::Regex;
use starknet_types_core::felt::Felt;
use tracing::debug;

static SIGN_SESSION_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sign session error").expect("invalid sign session regex"));
static GAS_BOUNDS_EXCEED_BALANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)validation failed.*gas bounds.*exceed balance")
        .expect("invalid gas bounds regex")
});

/// Whether `error` means the account could not cover its own fees.
///
/// Collaborator errors only reach us as text, so their messages are matched
/// as well.
pub fn is_out_of_gas_error(error: &WebWalletError) -> bool {
    if matches!(error, WebWalletError::FeeBoundsExceeded(_)) {
        return true;
    }
    let message = error.to_string();
    SIGN_SESSION_ERROR.is_match(&message) || GAS_BOUNDS_EXCEED_BALANCE.is_match(&message)
}

/// Line `calls` up with the calls of an outside-execution message.
///
/// A paymaster may add a fee transfer on `fee_token` to the message. When the
/// message holds exactly one call more than `calls`, a placeholder `transfer`
/// is inserted where the message has it. The result must then match the
/// message call for call, by address and selector.
pub fn prepend_paymaster_transfer(
    typed_data: &TypedData,
    calls: &[Call],
    fee_token: Felt,
) -> Result<Vec<Call>> {
    let message_calls = typed_data.outside_execution_calls()?;
    let transfer_selector = selector_from_name("transfer");

    let aligned = if message_calls.len() == calls.len() + 1 {
        let mut merged = Vec::with_capacity(message_calls.len());
        let mut cursor = 0;
        let mut inserted = false;
        for expected in &message_calls {
            let is_fee_transfer = expected.to == fee_token && expected.selector == transfer_selector;
            let caller_matches = calls.get(cursor).is_some_and(|call| {
                call.contract_address == expected.to && call.selector() == expected.selector
            });
            if !inserted && is_fee_transfer && !caller_matches {
                merged.push(Call::new(fee_token, "transfer", Vec::new()));
                inserted = true;
            } else if let Some(call) = calls.get(cursor) {
                merged.push(call.clone());
                cursor += 1;
            }
        }
        merged
    } else {
        calls.to_vec()
    };
    debug!("Aligned {} calls for outside execution", aligned.len());

    if aligned.len() != message_calls.len() {
        return Err(WebWalletError::UnalignedCalls(format!(
            "message has {} calls, got {}",
            message_calls.len(),
            aligned.len()
        )));
    }
    for (index, (expected, call)) in message_calls.iter().zip(&aligned).enumerate() {
        if expected.to != call.contract_address {
            return Err(WebWalletError::UnalignedCalls(format!(
                "mismatched contract address at index {index}"
            )));
        }
        if expected.selector != call.selector() {
            return Err(WebWalletError::UnalignedCalls(format!(
                "mismatched selector at index {index}"
            )));
        }
    }

    Ok(aligned)
}
