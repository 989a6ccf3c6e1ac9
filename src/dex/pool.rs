/*
 * Uniswap V3 pool discovery and state reads
 */

use super::{FeeTier, PoolState};
use crate::contracts::{self, FEE, LIQUIDITY, SLOT0, TICK_SPACING, TOKEN0, TOKEN1};
use crate::models::{Result, SwapError};
use crate::rpc::ChainClient;
use ethers::types::{Address, Bytes};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PoolResolver<C: ?Sized> {
    client: Arc<C>,
    factory: Address,
}

impl<C: ChainClient + ?Sized> PoolResolver<C> {
    pub fn new(client: Arc<C>, factory: Address) -> Self {
        Self { client, factory }
    }

    /// Finds the pool for a token pair and reads its current state.
    ///
    /// Fee tiers are tried from cheapest to most expensive and the first
    /// deployed pool wins.
    pub async fn resolve_pool(&self, token_a: Address, token_b: Address) -> Result<PoolState> {
        let (address, tier) = self.find_pool_address(token_a, token_b).await?;
        info!(pool = ?address, fee = tier.fee(), "Pool found");
        self.read_pool_state(address).await
    }

    pub async fn find_pool_address(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<(Address, FeeTier)> {
        for tier in FeeTier::ASCENDING {
            let data = self
                .client
                .call(self.factory, contracts::get_pool(token_a, token_b, tier.fee()))
                .await?;
            let pool = contracts::decode_address(&data, "getPool")?;

            if !pool.is_zero() {
                return Ok((pool, tier));
            }
            debug!(fee = tier.fee(), "No pool at fee tier");
        }

        Err(SwapError::PoolNotFound { token_a, token_b })
    }

    /// Reads token ordering, fee, spacing, liquidity and slot0 concurrently.
    pub async fn read_pool_state(&self, pool: Address) -> Result<PoolState> {
        let (token0, token1, fee, tick_spacing, liquidity, slot0) = tokio::try_join!(
            self.read(pool, TOKEN0),
            self.read(pool, TOKEN1),
            self.read(pool, FEE),
            self.read(pool, TICK_SPACING),
            self.read(pool, LIQUIDITY),
            self.read(pool, SLOT0),
        )?;

        let fee_raw = contracts::decode_uint(&fee, "fee")?;
        let fee = u32::try_from(fee_raw)
            .ok()
            .and_then(FeeTier::from_fee)
            .ok_or_else(|| SwapError::ContractError(format!("Unsupported pool fee {fee_raw}")))?;

        let liquidity = u128::try_from(contracts::decode_uint(&liquidity, "liquidity")?)
            .map_err(|e| SwapError::ContractError(format!("Invalid liquidity: {e}")))?;
        let (sqrt_price_x96, tick) = contracts::decode_slot0(&slot0)?;

        let tick_spacing = contracts::decode_int24(&tick_spacing, "tickSpacing")?;
        if tick_spacing != fee.tick_spacing() {
            return Err(SwapError::ContractError(format!(
                "Pool {pool:?} reports tick spacing {tick_spacing} for fee {}",
                fee.fee()
            )));
        }

        let state = PoolState {
            address: pool,
            token0: contracts::decode_address(&token0, "token0")?,
            token1: contracts::decode_address(&token1, "token1")?,
            fee,
            tick_spacing,
            sqrt_price_x96,
            liquidity,
            tick,
        };

        debug!(
            pool = ?pool,
            liquidity = state.liquidity,
            tick = state.tick,
            "Pool state read"
        );

        Ok(state)
    }

    async fn read(&self, pool: Address, signature: &str) -> Result<Bytes> {
        self.client
            .call(pool, contracts::call_data(signature, &[]))
            .await
    }
}
