//! Environments and initialization parameters.

use crate::core::connection::Provider;
use crate::core::constants::{DEPLOY_MAX_ATTEMPTS, DEPLOY_RETRY_INTERVAL};
use crate::error::WebWalletError;
use crate::paymaster::PaymasterParameters;
use crate::types::{ChainId, SessionParameters};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Named deployment targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EnvironmentName {
    #[default]
    Sepolia,
    Mainnet,
    Dev,
}

impl FromStr for EnvironmentName {
    type Err = WebWalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sepolia" => Ok(Self::Sepolia),
            "mainnet" => Ok(Self::Mainnet),
            "dev" => Ok(Self::Dev),
            other => Err(WebWalletError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sepolia => "sepolia",
            Self::Mainnet => "mainnet",
            Self::Dev => "dev",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub chain_id: ChainId,
    /// Web wallet the connector opens
    pub web_wallet_url: String,
    /// Wallet backend (session service, token balances)
    pub backend_base_url: String,
    pub provider_default_url: String,
}

impl Environment {
    pub fn for_name(name: EnvironmentName) -> Self {
        match name {
            EnvironmentName::Sepolia | EnvironmentName::Dev => Self {
                chain_id: ChainId::Sepolia,
                web_wallet_url: "https://web-v2.hydrogen.argent47.net".to_string(),
                backend_base_url: "https://api.hydrogen.argent47.net/v1".to_string(),
                provider_default_url: "https://free-rpc.nethermind.io/sepolia-juno".to_string(),
            },
            EnvironmentName::Mainnet => Self {
                chain_id: ChainId::Mainnet,
                web_wallet_url: "https://web.argent.xyz".to_string(),
                backend_base_url: "https://cloud.argent-api.com/v1".to_string(),
                provider_default_url: "https://free-rpc.nethermind.io/mainnet-juno".to_string(),
            },
        }
    }
}

/// Bounded polling used while waiting for a deployment to land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployPolling {
    pub retry_interval: Duration,
    pub max_attempts: u32,
}

impl Default for DeployPolling {
    fn default() -> Self {
        Self {
            retry_interval: DEPLOY_RETRY_INTERVAL,
            max_attempts: DEPLOY_MAX_ATTEMPTS,
        }
    }
}

/// Facade construction parameters
#[derive(Clone)]
pub struct InitParams {
    pub app_name: String,
    pub environment: EnvironmentName,
    pub session_params: SessionParameters,
    pub paymaster_params: Option<PaymasterParameters>,
    pub provider: Option<Arc<dyn Provider>>,
    pub deploy_polling: DeployPolling,
}

impl InitParams {
    pub fn new(app_name: impl Into<String>, session_params: SessionParameters) -> Self {
        Self {
            app_name: app_name.into(),
            environment: EnvironmentName::default(),
            session_params,
            paymaster_params: None,
            provider: None,
            deploy_polling: DeployPolling::default(),
        }
    }

    pub fn with_environment(mut self, environment: EnvironmentName) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_paymaster(mut self, params: PaymasterParameters) -> Self {
        self.paymaster_params = Some(params);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_deploy_polling(mut self, polling: DeployPolling) -> Self {
        self.deploy_polling = polling;
        self
    }
}

impl fmt::Debug for InitParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitParams")
            .field("app_name", &self.app_name)
            .field("environment", &self.environment)
            .field("session_params", &self.session_params)
            .field("paymaster_params", &self.paymaster_params)
            .field("has_provider", &self.provider.is_some())
            .field("deploy_polling", &self.deploy_polling)
            .finish()
    }
}
