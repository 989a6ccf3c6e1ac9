/*
 * Uniswap V3 integration: pool discovery, quoting, trade construction
 */

#[cfg(test)]
pub(crate) mod fixtures;
pub mod pool;
pub mod quoter;
pub mod router;
pub mod trade;

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

pub use pool::PoolResolver;
pub use quoter::Quoter;
pub use router::{swap_call_parameters, SwapOptions};
pub use trade::{TradeBuilder, TradeDescriptor};

/// Pool fee in hundredths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeTier {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeTier {
    /// Candidate order for pool discovery; cheaper pools win.
    pub const ASCENDING: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    #[must_use]
    pub fn fee(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    #[must_use]
    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    #[must_use]
    pub fn from_fee(fee: u32) -> Option<Self> {
        Self::ASCENDING.into_iter().find(|tier| tier.fee() == fee)
    }
}

/// Snapshot of one pool, read fresh for every trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeTier,
    pub tick_spacing: i32,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
}

impl PoolState {
    #[must_use]
    pub fn contains(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// True when swapping `token_in` moves the pool from token0 to token1.
    #[must_use]
    pub fn zero_for_one(&self, token_in: Address) -> bool {
        token_in == self.token0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_tiers_ascend() {
        let fees: Vec<u32> = FeeTier::ASCENDING.iter().map(|t| t.fee()).collect();
        assert_eq!(fees, vec![100, 500, 3_000, 10_000]);
    }

    #[test]
    fn test_from_fee() {
        assert_eq!(FeeTier::from_fee(3_000), Some(FeeTier::Medium));
        assert_eq!(FeeTier::from_fee(2_500), None);
    }
}
