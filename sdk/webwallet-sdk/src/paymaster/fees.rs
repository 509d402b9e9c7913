use crate::account::SelfDeployingAccount;
use crate::error::{Result, WebWalletError};
use crate::paymaster::avnu::{GasTokenPrice, GaslessBackend, GaslessCompatibility, GaslessOptions};
use crate::types::{Call, ExecutionDetails, FeeEstimate, Invocation, TokenBalance};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use starknet_types_core::felt::Felt;
use std::collections::HashMap;
use tracing::debug;

/// Fee the account would pay natively for `calls`.
///
/// When the account is not deployed yet, a deploy-account invocation is
/// estimated first and the second estimate (the invoke) is returned.
pub async fn get_native_fees(
    account: &SelfDeployingAccount,
    calls: &[Call],
    is_deployed: bool,
    details: &ExecutionDetails,
) -> Result<FeeEstimate> {
    let mut invocations = vec![Invocation::Invoke(calls.to_vec())];
    if !is_deployed {
        invocations.insert(
            0,
            Invocation::DeployAccount(account.deployment_payload().clone()),
        );
    }

    let estimates = account
        .inner()
        .estimate_fee_bulk(&invocations, details)
        .await
        .map_err(|e| WebWalletError::Account(e.to_string()))?;

    let index = if is_deployed { 0 } else { 1 };
    estimates.get(index).copied().ok_or_else(|| {
        WebWalletError::Account(format!(
            "fee estimate returned {} entries, expected {}",
            estimates.len(),
            invocations.len()
        ))
    })
}

/// Native fee converted into `price`'s token, rounded up.
///
/// Returns `None` for tokens quoted at a zero price.
pub fn fee_in_gas_token(
    fee: &FeeEstimate,
    price: &GasTokenPrice,
    compatibility: &GaslessCompatibility,
) -> Option<BigUint> {
    if price.price_in_eth == 0 {
        return None;
    }

    let data_gas_price = fee.data_gas_price.unwrap_or(1);
    let total = BigUint::from(fee.overall_fee)
        + BigUint::from(compatibility.gas_consumed_overhead) * BigUint::from(fee.gas_price)
        + BigUint::from(compatibility.data_gas_consumed_overhead) * BigUint::from(data_gas_price);

    let scaled = total * BigUint::from(10u32).pow(price.decimals);
    let divisor = BigUint::from(price.price_in_eth);
    let (quotient, remainder) = (&scaled / &divisor, &scaled % &divisor);
    if remainder.is_zero() {
        Some(quotient)
    } else {
        Some(quotient + BigUint::one())
    }
}

/// Fee of `fee` in every quoted gas token, keyed by token address.
pub async fn get_estimated_fees_in_gas_token(
    account: &SelfDeployingAccount,
    backend: &dyn GaslessBackend,
    options: &GaslessOptions,
    fee: &FeeEstimate,
    is_deployed: bool,
) -> Result<HashMap<Felt, BigUint>> {
    let compatibility = if is_deployed {
        backend
            .fetch_account_compatibility(&account.address(), options)
            .await
            .map_err(|e| WebWalletError::Gasless(e.to_string()))?
    } else {
        GaslessCompatibility::undeployed()
    };

    let prices = backend
        .fetch_gas_token_prices(options)
        .await
        .map_err(|e| WebWalletError::Gasless(e.to_string()))?;

    Ok(prices
        .iter()
        .filter_map(|price| {
            fee_in_gas_token(fee, price, &compatibility).map(|amount| (price.token_address, amount))
        })
        .collect())
}

/// First token, in balance order, whose balance strictly exceeds its fee.
///
/// With `restrict_to` set only that token is eligible.
pub fn select_gas_token(
    balances: &[TokenBalance],
    fees: &HashMap<Felt, BigUint>,
    restrict_to: Option<Felt>,
) -> Result<(Felt, BigUint)> {
    for token in balances {
        if restrict_to.is_some_and(|wanted| wanted != token.address) {
            continue;
        }
        let Some(fee) = fees.get(&token.address) else {
            continue;
        };
        let Some(balance) = parse_balance(&token.balance) else {
            debug!("Skipping unparsable balance for {:#x}", token.address);
            continue;
        };
        if balance > *fee {
            return Ok((token.address, fee.clone()));
        }
    }
    Err(WebWalletError::InsufficientGasTokenBalance)
}

fn parse_balance(raw: &str) -> Option<BigUint> {
    let raw = raw.trim();
    match raw.strip_prefix("0x") {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16),
        None => BigUint::parse_bytes(raw.as_bytes(), 10),
    }
}
