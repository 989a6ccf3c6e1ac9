/*
 * Data models and types for the swap execution engine
 */

use ethers::types::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decimals used by every chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// An asset is either the chain's native coin or an ERC-20 contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Contract(Address),
}

impl Asset {
    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Address used for pool, quoter and router calls. The native coin trades
    /// through its wrapped ERC-20.
    #[must_use]
    pub fn routing_address(&self, wrapped_native: Address) -> Address {
        match self {
            Asset::Native => wrapped_native,
            Asset::Contract(address) => *address,
        }
    }
}

impl FromStr for Asset {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("native") || trimmed.eq_ignore_ascii_case("eth") {
            return Ok(Asset::Native);
        }
        let address = crate::utils::format_address(trimmed)?;
        Address::from_str(&address)
            .map(Asset::Contract)
            .map_err(|e| SwapError::ConfigError(format!("Invalid token address {s}: {e}")))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Contract(address) => write!(f, "{address:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenIdentity {
    pub chain_id: u64,
    pub asset: Asset,
    pub decimals: u8,
}

impl TokenIdentity {
    #[must_use]
    pub fn new(chain_id: u64, asset: Asset, decimals: u8) -> Self {
        Self {
            chain_id,
            asset,
            decimals,
        }
    }

    #[must_use]
    pub fn native(chain_id: u64) -> Self {
        Self::new(chain_id, Asset::Native, NATIVE_DECIMALS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    New,
    Sending,
    Sent,
    Failed,
    Rejected,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionState::New => "New",
            TransactionState::Sending => "Sending",
            TransactionState::Sent => "Sent",
            TransactionState::Failed => "Failed",
            TransactionState::Rejected => "Rejected",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub estimated_output: Decimal,
    pub price_impact_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapOutcome {
    State { state: TransactionState },
    Preview { preview: PreviewResult },
}

impl SwapOutcome {
    #[must_use]
    pub fn state(&self) -> Option<TransactionState> {
        match self {
            SwapOutcome::State { state } => Some(*state),
            SwapOutcome::Preview { .. } => None,
        }
    }
}

impl From<TransactionState> for SwapOutcome {
    fn from(state: TransactionState) -> Self {
        SwapOutcome::State { state }
    }
}

impl From<PreviewResult> for SwapOutcome {
    fn from(preview: PreviewResult) -> Self {
        SwapOutcome::Preview { preview }
    }
}

/// A single swap attempt as requested by a caller. A non-positive `amount`
/// sweeps the full balance of `token_in`.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: Asset,
    pub token_out: Asset,
    pub amount: Decimal,
    pub preview_only: bool,
    pub need_approval: bool,
    pub approval_max: bool,
}

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract interaction error: {0}")]
    ContractError(String),

    #[error("Pool not found for {token_a:?}/{token_b:?} at any fee tier")]
    PoolNotFound { token_a: Address, token_b: Address },

    #[error("Quote failed: {0}")]
    QuoteFailed(String),

    #[error("Signer error: {0}")]
    SignerError(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, SwapError>;
