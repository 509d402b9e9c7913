//! Composition of several [`TokenService`] implementations behind one.

use crate::error::BoxError;
use crate::services::token::TokenService;
use crate::types::TokenBalance;
use async_trait::async_trait;
use futures::future::join_all;
use starknet_types_core::felt::Felt;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

type Balances = std::result::Result<Vec<TokenBalance>, BoxError>;

fn no_services() -> BoxError {
    "no token service configured".into()
}

/// Tries each service in order and returns the first success.
/// Fails with the last service's error.
pub struct Failover {
    services: Vec<Arc<dyn TokenService>>,
}

impl Failover {
    pub fn new(services: Vec<Arc<dyn TokenService>>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl TokenService for Failover {
    async fn fetch_address_token_balances(&self, address: &Felt, network: &str) -> Balances {
        let mut last_error = None;
        for (index, service) in self.services.iter().enumerate() {
            match service.fetch_address_token_balances(address, network).await {
                Ok(balances) => return Ok(balances),
                Err(e) => {
                    warn!("Token service {} failed: {}", index, e);
                    last_error = Some(e);
                },
            }
        }
        Err(last_error.unwrap_or_else(no_services))
    }
}

/// Queries every service concurrently.
///
/// Returns the first non-empty success, then any success, then the last
/// error.
pub struct Combine {
    services: Vec<Arc<dyn TokenService>>,
}

impl Combine {
    pub fn new(services: Vec<Arc<dyn TokenService>>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl TokenService for Combine {
    async fn fetch_address_token_balances(&self, address: &Felt, network: &str) -> Balances {
        let results = join_all(
            self.services
                .iter()
                .map(|service| service.fetch_address_token_balances(address, network)),
        )
        .await;

        let mut first_success = None;
        let mut last_error = None;
        for result in results {
            match result {
                Ok(balances) if !balances.is_empty() => return Ok(balances),
                Ok(balances) => {
                    first_success.get_or_insert(balances);
                },
                Err(e) => last_error = Some(e),
            }
        }

        match (first_success, last_error) {
            (Some(balances), _) => Ok(balances),
            (None, Some(e)) => Err(e),
            (None, None) => Err(no_services()),
        }
    }
}

/// Picks one service per request from the network name.
pub struct Route {
    services: HashMap<String, Arc<dyn TokenService>>,
    select: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl Route {
    pub fn new(
        services: HashMap<String, Arc<dyn TokenService>>,
        select: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            services,
            select: Box::new(select),
        }
    }

    /// Route on the network name itself
    pub fn by_network(services: HashMap<String, Arc<dyn TokenService>>) -> Self {
        Self::new(services, |network| network.to_string())
    }
}

#[async_trait]
impl TokenService for Route {
    async fn fetch_address_token_balances(&self, address: &Felt, network: &str) -> Balances {
        let key = (self.select)(network);
        let service = self
            .services
            .get(&key)
            .ok_or_else(|| -> BoxError { format!("no token service for route {key}").into() })?;
        service.fetch_address_token_balances(address, network).await
    }
}
