/*
 * Configuration management for the swap service
 */

pub mod networks;

use crate::models::{Result, SwapError};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use networks::{load_network, NetworkConfig, ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub chain: ChainConfig,
    pub overrides: ContractOverrides,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct PrivateKey(String);

impl PrivateKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub private_key: PrivateKey,
}

/// Per-deployment overrides applied on top of the network table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContractOverrides {
    pub rpc_url: Option<String>,
    pub pool_factory: Option<Address>,
    pub quoter: Option<Address>,
    pub swap_router: Option<Address>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Slippage tolerance in basis points (5 = 0.05%).
    pub slippage_bps: u32,
    /// Seconds from submission until the swap expires on-chain.
    pub deadline_secs: i64,
    pub receipt: ReceiptPolicy,
    pub approval: ApprovalSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            slippage_bps: 5,
            deadline_secs: 60 * 15,
            receipt: ReceiptPolicy::default(),
            approval: ApprovalSettings::default(),
        }
    }
}

/// Receipt polling schedule: exponential backoff capped at `max_backoff`, abandoned after `timeout`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ReceiptPolicy {
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(8),
            timeout: Duration::from_secs(300),
        }
    }
}

impl ReceiptPolicy {
    #[must_use]
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ApprovalSettings {
    /// When false an unlimited approval is always submitted, even if the
    /// existing allowance already covers the swap.
    pub check_allowance_for_max: bool,
}

/// Fully resolved addresses and settings one engine instance runs with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub pool_factory: Address,
    pub quoter: Address,
    pub swap_router: Address,
    pub wrapped_native: Address,
    pub settings: EngineSettings,
}

impl EngineConfig {
    pub fn resolve(
        chain_id: u64,
        overrides: &ContractOverrides,
        settings: EngineSettings,
    ) -> Result<Self> {
        let network = load_network(chain_id)?;

        Ok(Self {
            chain_id: network.chain_id,
            rpc_url: overrides
                .rpc_url
                .clone()
                .unwrap_or_else(|| network.rpc_url.to_string()),
            pool_factory: overrides.pool_factory.unwrap_or(network.pool_factory),
            quoter: overrides.quoter.unwrap_or(network.quoter),
            swap_router: overrides.swap_router.unwrap_or(network.swap_router),
            wrapped_native: network.wrapped_native,
            settings,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let engine = EngineSettings {
            slippage_bps: env_or("SLIPPAGE_BPS", 5)?,
            deadline_secs: env_or("DEADLINE_SECS", 60 * 15)?,
            receipt: ReceiptPolicy {
                timeout: Duration::from_secs(env_or("RECEIPT_TIMEOUT_SECS", 300)?),
                ..ReceiptPolicy::default()
            },
            approval: ApprovalSettings {
                check_allowance_for_max: env_or("APPROVAL_MAX_CHECKS_ALLOWANCE", false)?,
            },
        };

        if engine.slippage_bps >= 10_000 {
            return Err(SwapError::ConfigError(format!(
                "SLIPPAGE_BPS must be below 10000, got {}",
                engine.slippage_bps
            )));
        }

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("SERVER_PORT", 8080)?,
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| "text".to_string())
                    .parse()?,
            },
            chain: ChainConfig {
                chain_id: env_or("CHAIN_ID", ETHEREUM_CHAIN_ID)?,
                private_key: PrivateKey::new(
                    env::var("PRIVATE_KEY")
                        .map_err(|_| SwapError::ConfigError("PRIVATE_KEY not set".to_string()))?,
                ),
            },
            overrides: ContractOverrides {
                rpc_url: env::var("RPC_URL").ok(),
                pool_factory: env_address("POOL_FACTORY_ADDRESS")?,
                quoter: env_address("QUOTER_ADDRESS")?,
                swap_router: env_address("SWAP_ROUTER_ADDRESS")?,
            },
            engine,
        })
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::resolve(self.chain.chain_id, &self.overrides, self.engine.clone())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| SwapError::ConfigError(format!("Invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_address(key: &str) -> Result<Option<Address>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Address::from_str(value.trim())
            .map(Some)
            .map_err(|e| SwapError::ConfigError(format!("Invalid {key}: {e}"))),
        _ => Ok(None),
    }
}

impl FromStr for LogFormat {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(SwapError::ConfigError(format!("Unknown log format: {s}"))),
        }
    }
}
