//! Network and deployment configuration for the integration layer.
//!
//! This module provides configuration for connecting to the EVM networks the
//! platform deploys on (Ethereum, Polygon, Base, Arbitrum) along with the
//! portal API endpoint and the deployed contract addresses.

use crate::error::{ClientError, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Network {
    /// Ethereum mainnet
    Ethereum,
    /// Polygon PoS mainnet
    Polygon,
    /// Base mainnet
    Base,
    /// Arbitrum One
    Arbitrum,
    /// Custom network with user-defined chain id and endpoints
    Custom,
}

impl Network {
    /// Get the chain id for this network
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Ethereum => 1,
            Network::Polygon => 137,
            Network::Base => 8453,
            Network::Arbitrum => 42161,
            Network::Custom => 0,
        }
    }

    /// Get the human-readable network name
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Ethereum => "Ethereum Mainnet",
            Network::Polygon => "Polygon Mainnet",
            Network::Base => "Base",
            Network::Arbitrum => "Arbitrum One",
            Network::Custom => "Custom Network",
        }
    }

    /// Get the default public RPC URL for this network
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Ethereum => "https://cloudflare-eth.com",
            Network::Polygon => "https://polygon-rpc.com",
            Network::Base => "https://mainnet.base.org",
            Network::Arbitrum => "https://arb1.arbitrum.io/rpc",
            Network::Custom => "",
        }
    }
}

/// Deployed contract addresses for one network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// Campaign Core contract (contributions, milestones, release)
    pub core: Address,
    /// Stablecoin used for contributions (ERC-20)
    pub token: Address,
}

/// Configuration for the investment client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Network to connect to
    pub network: Network,

    /// Chain id the wallet provider must report
    pub chain_id: u64,

    /// JSON-RPC endpoint URL
    pub rpc_url: String,

    /// Portal API base URL
    pub portal_url: String,

    /// Deployed contract addresses
    pub contracts: ContractAddresses,

    /// HTTP request timeout
    pub request_timeout: Duration,

    /// Maximum number of retries for failed portal requests
    pub max_retries: usize,

    /// Initial retry delay (in milliseconds)
    pub retry_initial_delay_ms: u64,

    /// Maximum retry delay (in milliseconds)
    pub retry_max_delay_ms: u64,

    /// Retry backoff multiplier
    pub retry_multiplier: f64,

    /// Transaction polling interval (in milliseconds)
    pub tx_poll_interval_ms: u64,

    /// Transaction timeout (in seconds)
    pub tx_timeout_secs: u64,

    /// Confirmations required before a transaction counts as mined
    pub confirmations: u64,
}

impl ClientConfig {
    /// Create a new configuration for the specified network
    pub fn new(network: Network, portal_url: impl Into<String>, contracts: ContractAddresses) -> Self {
        Self {
            network,
            chain_id: network.chain_id(),
            rpc_url: network.default_rpc_url().to_string(),
            portal_url: portal_url.into(),
            contracts,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_initial_delay_ms: 100,
            retry_max_delay_ms: 5000,
            retry_multiplier: 2.0,
            tx_poll_interval_ms: 1000,
            tx_timeout_secs: 120,
            confirmations: 1,
        }
    }

    /// Create configuration for Polygon
    pub fn polygon(portal_url: impl Into<String>, contracts: ContractAddresses) -> Self {
        Self::new(Network::Polygon, portal_url, contracts)
    }

    /// Create configuration for Ethereum mainnet
    pub fn ethereum(portal_url: impl Into<String>, contracts: ContractAddresses) -> Self {
        Self::new(Network::Ethereum, portal_url, contracts)
    }

    /// Create configuration for Base
    pub fn base(portal_url: impl Into<String>, contracts: ContractAddresses) -> Self {
        Self::new(Network::Base, portal_url, contracts)
    }

    /// Create configuration for Arbitrum One
    pub fn arbitrum(portal_url: impl Into<String>, contracts: ContractAddresses) -> Self {
        Self::new(Network::Arbitrum, portal_url, contracts)
    }

    /// Create a custom configuration
    pub fn custom(
        chain_id: u64,
        rpc_url: String,
        portal_url: String,
        contracts: ContractAddresses,
    ) -> Result<Self> {
        if chain_id == 0 {
            return Err(ClientError::ConfigError(
                "Chain id cannot be zero".to_string(),
            ));
        }
        if rpc_url.is_empty() {
            return Err(ClientError::ConfigError(
                "RPC URL cannot be empty".to_string(),
            ));
        }
        if portal_url.is_empty() {
            return Err(ClientError::ConfigError(
                "Portal URL cannot be empty".to_string(),
            ));
        }

        let mut config = Self::new(Network::Custom, portal_url, contracts);
        config.chain_id = chain_id;
        config.rpc_url = rpc_url;
        Ok(config)
    }

    /// Set the RPC endpoint URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set maximum retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set retry delays
    pub fn with_retry_config(
        mut self,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        self.retry_initial_delay_ms = initial_delay_ms;
        self.retry_max_delay_ms = max_delay_ms;
        self.retry_multiplier = multiplier;
        self
    }

    /// Set transaction polling configuration
    pub fn with_tx_config(mut self, poll_interval_ms: u64, timeout_secs: u64) -> Self {
        self.tx_poll_interval_ms = poll_interval_ms;
        self.tx_timeout_secs = timeout_secs;
        self
    }

    /// Set required confirmations
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.chain_id == 0 {
            return Err(ClientError::ConfigError(
                "Chain id cannot be zero".to_string(),
            ));
        }
        if self.rpc_url.is_empty() {
            return Err(ClientError::ConfigError(
                "RPC URL cannot be empty".to_string(),
            ));
        }
        if self.portal_url.is_empty() {
            return Err(ClientError::ConfigError(
                "Portal URL cannot be empty".to_string(),
            ));
        }
        Url::parse(&self.rpc_url)?;
        Url::parse(&self.portal_url)?;
        if self.contracts.core == Address::zero() {
            return Err(ClientError::ConfigError(
                "Core contract address cannot be zero".to_string(),
            ));
        }
        if self.contracts.token == Address::zero() {
            return Err(ClientError::ConfigError(
                "Token contract address cannot be zero".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(ClientError::ConfigError(
                "Max retries must be greater than 0".to_string(),
            ));
        }
        if self.retry_initial_delay_ms == 0 {
            return Err(ClientError::ConfigError(
                "Retry initial delay must be greater than 0".to_string(),
            ));
        }
        if self.retry_multiplier <= 1.0 {
            return Err(ClientError::ConfigError(
                "Retry multiplier must be greater than 1.0".to_string(),
            ));
        }
        if self.tx_poll_interval_ms == 0 {
            return Err(ClientError::ConfigError(
                "Transaction poll interval must be greater than 0".to_string(),
            ));
        }
        if self.tx_timeout_secs == 0 {
            return Err(ClientError::ConfigError(
                "Transaction timeout must be greater than 0".to_string(),
            ));
        }
        if self.confirmations == 0 {
            return Err(ClientError::ConfigError(
                "Confirmations must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
