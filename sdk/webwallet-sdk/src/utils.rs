use crate::core::constants::{ARGENT_ACCOUNT_CLASS_HASH, CONTRACT_ADDRESS_PREFIX};
use crate::error::{Result, WebWalletError};
use crate::types::AccountDeploymentPayload;
use num_bigint::BigUint;
use num_traits::One;
use sha3::{Digest, Keccak256};
use starknet_crypto::pedersen_hash;
use starknet_types_core::felt::Felt;

//=============================================================================
// Selectors & Encodings
//=============================================================================

/// Starknet keccak of an entrypoint name (keccak256 truncated to 250 bits)
pub fn selector_from_name(name: &str) -> Felt {
    let mut hash: [u8; 32] = Keccak256::digest(name.as_bytes()).into();
    hash[0] &= 0x03;
    Felt::from_bytes_be(&hash)
}

/// Encode an ASCII string of at most 31 characters as a felt
pub fn short_string(value: &str) -> Result<Felt> {
    if value.len() > 31 || !value.is_ascii() {
        return Err(WebWalletError::InvalidValue(format!(
            "short string must be ASCII and at most 31 chars: {value}"
        )));
    }
    Ok(Felt::from_bytes_be_slice(value.as_bytes()))
}

/// Split an amount into its Cairo `u256` `(low, high)` felts
pub fn u256_from_biguint(value: &BigUint) -> Result<[Felt; 2]> {
    if value.bits() > 256 {
        return Err(WebWalletError::InvalidValue(format!("{value} overflows u256")));
    }
    let mask = (BigUint::one() << 128) - BigUint::one();
    let low = value & &mask;
    let high = value >> 128;
    Ok([biguint_to_felt(&low), biguint_to_felt(&high)])
}

/// Parse a decimal amount string into `u256` calldata
pub fn u256_from_dec_str(amount: &str) -> Result<[Felt; 2]> {
    let value = BigUint::parse_bytes(amount.trim().as_bytes(), 10)
        .ok_or_else(|| WebWalletError::InvalidValue(format!("not a decimal amount: {amount}")))?;
    u256_from_biguint(&value)
}

pub fn u256_from_u128(amount: u128) -> [Felt; 2] {
    [Felt::from(amount), Felt::ZERO]
}

pub fn biguint_to_felt(value: &BigUint) -> Felt {
    Felt::from_bytes_be_slice(&value.to_bytes_be())
}

//=============================================================================
// Address Helpers
//=============================================================================

/// 66-character, zero-padded, lowercase representation of an address
pub fn normalize_address(address: &Felt) -> String {
    format!("0x{}", hex_digits_padded(address))
}

/// Short display form: `0x0123…cdef`
pub fn format_address(address: &Felt) -> String {
    let full = normalize_address(address);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

fn hex_digits_padded(value: &Felt) -> String {
    value
        .to_bytes_be()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

//=============================================================================
// Hashing & Deterministic Addresses
//=============================================================================

/// Pedersen hash chain terminated by the element count
pub fn compute_hash_on_elements(elements: &[Felt]) -> Felt {
    let folded = elements
        .iter()
        .fold(Felt::ZERO, |acc, element| pedersen_hash(&acc, element));
    pedersen_hash(&folded, &Felt::from(elements.len() as u64))
}

/// Address of a contract deployed from `deployer` (zero for deploy-account)
pub fn calculate_contract_address(
    salt: &Felt,
    class_hash: &Felt,
    constructor_calldata: &[Felt],
    deployer: &Felt,
) -> Felt {
    let prefix = Felt::from_bytes_be_slice(CONTRACT_ADDRESS_PREFIX.as_bytes());
    let raw = compute_hash_on_elements(&[
        prefix,
        *deployer,
        *salt,
        *class_hash,
        compute_hash_on_elements(constructor_calldata),
    ]);
    // 2**251 - 256
    let bound = (BigUint::one() << 251) - BigUint::from(256u32);
    biguint_to_felt(&(raw.to_biguint() % bound))
}

/// Deployment payload of an Argent account owned by a single Starknet signer
pub fn argent_deployment_payload(public_key: &Felt) -> AccountDeploymentPayload {
    let class_hash = Felt::from_hex_unchecked(ARGENT_ACCOUNT_CLASS_HASH);
    // owner: Signer::Starknet(pubkey), guardian: Option::None
    let constructor_calldata = vec![Felt::ZERO, *public_key, Felt::ONE];
    let contract_address =
        calculate_contract_address(public_key, &class_hash, &constructor_calldata, &Felt::ZERO);
    AccountDeploymentPayload {
        class_hash,
        constructor_calldata,
        address_salt: *public_key,
        contract_address,
    }
}

//=============================================================================
// Serde Helpers
//=============================================================================

/// `u128` amounts encoded as `0x` hex strings, accepting hex, decimal or
/// plain JSON numbers on input.
pub mod serde_u128 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n as u128),
            Raw::Text(text) => super::parse_u128(&text).map_err(de::Error::custom),
        }
    }
}

/// Parse a hex (`0x`) or decimal string into a `u128`
pub fn parse_u128(text: &str) -> Result<u128> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => text.parse::<u128>(),
    };
    parsed.map_err(|_| WebWalletError::InvalidValue(format!("not an amount: {text}")))
}
