/*
 * Known Uniswap V3 deployments keyed by chain id
 */

use crate::models::{Result, SwapError};
use ethers::types::Address;
use std::str::FromStr;

pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const POLYGON_CHAIN_ID: u64 = 137;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub pool_factory: Address,
    pub quoter: Address,
    pub swap_router: Address,
    pub wrapped_native: Address,
}

struct NetworkEntry {
    chain_id: u64,
    name: &'static str,
    rpc_url: &'static str,
    pool_factory: &'static str,
    quoter: &'static str,
    swap_router: &'static str,
    wrapped_native: &'static str,
}

const NETWORKS: &[NetworkEntry] = &[
    NetworkEntry {
        chain_id: ETHEREUM_CHAIN_ID,
        name: "eth-mainnet",
        rpc_url: "https://eth.llamarpc.com",
        pool_factory: "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        quoter: "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
        swap_router: "0xE592427A0AEce92De3Edee1F18E0157C05861564",
        wrapped_native: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
    },
    NetworkEntry {
        chain_id: POLYGON_CHAIN_ID,
        name: "polygon-mainnet",
        rpc_url: "https://polygon-rpc.com",
        pool_factory: "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        quoter: "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
        swap_router: "0xE592427A0AEce92De3Edee1F18E0157C05861564",
        wrapped_native: "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270",
    },
];

fn parse_address(label: &str, value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|e| SwapError::ConfigError(format!("Invalid {label} address {value}: {e}")))
}

/// Looks up the deployment for `chain_id`. Unknown chains are a configuration error.
pub fn load_network(chain_id: u64) -> Result<NetworkConfig> {
    let entry = NETWORKS
        .iter()
        .find(|entry| entry.chain_id == chain_id)
        .ok_or_else(|| SwapError::ConfigError(format!("invalid chain id {chain_id}")))?;

    Ok(NetworkConfig {
        chain_id: entry.chain_id,
        name: entry.name,
        rpc_url: entry.rpc_url,
        pool_factory: parse_address("pool factory", entry.pool_factory)?,
        quoter: parse_address("quoter", entry.quoter)?,
        swap_router: parse_address("swap router", entry.swap_router)?,
        wrapped_native: parse_address("wrapped native", entry.wrapped_native)?,
    })
}
