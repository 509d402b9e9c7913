use std::time::Duration;

/// `encodeShortString("SN_MAIN")`
pub const SN_MAIN: &str = "0x534e5f4d41494e";
/// `encodeShortString("SN_SEPOLIA")`
pub const SN_SEPOLIA: &str = "0x534e5f5345504f4c4941";

pub const STRK_TOKEN_ADDRESS: &str =
    "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d";
pub const ETH_TOKEN_ADDRESS: &str =
    "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";
pub const USDC_TOKEN_ADDRESS: &str =
    "0x053b40a647cedfca6ca84f542a0fe36736031905a9639a7f19a3c1e66bfd5080";

/// Argent account class deployed for session users
pub const ARGENT_ACCOUNT_CLASS_HASH: &str =
    "0x036078334509b514626504edc9fb252328d1a240e4e948bef8d0c08dff45927f";

pub const CONTRACT_ADDRESS_PREFIX: &str = "STARKNET_CONTRACT_ADDRESS";

pub const GASLESS_MAINNET_BASE_URL: &str = "https://starknet.api.avnu.fi";
pub const GASLESS_SEPOLIA_BASE_URL: &str = "https://sepolia.api.avnu.fi";

/// Validity window of a new session when the caller does not set one.
/// Earlier releases shipped 30 in one snapshot and 90 in another.
pub const SESSION_DEFAULT_VALIDITY_DAYS: u32 = 90;

/// Per-token fee caps written into the session metadata
pub const SESSION_MAX_FEE_STRK: &str = "10000000000000000000"; // 10
pub const SESSION_MAX_FEE_ETH: &str = "100000000000000000"; // 0.1

pub const OUTSIDE_EXECUTION_PRIMARY_TYPE: &str = "OutsideExecution";
pub const OUTSIDE_EXECUTION_DOMAIN_NAME: &str = "Account.execute_from_outside";

pub const DEPLOY_RETRY_INTERVAL: Duration = Duration::from_secs(2);
pub const DEPLOY_MAX_ATTEMPTS: u32 = 30;

pub const CLIENT_NAME: &str = "webwallet-sdk";
pub const CLIENT_VERSION: &str = "1.0.0";
