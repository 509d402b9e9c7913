pub mod account;
pub mod config;
pub mod core;
pub mod error;
pub mod paymaster;
pub mod services;
pub mod types;
pub mod utils;
pub mod wallet;

pub use crate::account::{create_session_account, SelfDeployingAccount, SessionAccount};
pub use crate::config::{DeployPolling, Environment, EnvironmentName, InitParams};
pub use crate::core::codec::SessionCodec;
pub use crate::core::connection::{Account, Provider, ProviderFactory};
pub use crate::core::connector::WalletConnector;
pub use crate::core::signer::{RawSigner, StarkKeyPair};
pub use crate::core::storage::{KeyValueStore, MemoryStore};
pub use crate::error::{BoxError, Result, WebWalletError};
pub use crate::paymaster::{execute_with_paymaster, PaymasterParameters};
pub use crate::types::{Call, SessionParameters, SessionStatus, SignedSession};
pub use crate::wallet::{ConnectResponse, WebWallet, WebWalletBuilder};
pub use starknet_types_core::felt::Felt;
