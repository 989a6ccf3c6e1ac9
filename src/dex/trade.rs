/*
 * Trade construction and read-only previews
 */

use super::{PoolResolver, PoolState, Quoter};
use crate::models::{PreviewResult, Result, TokenIdentity};
use crate::rpc::ChainClient;
use crate::utils::{
    calculate_price_impact, spot_output, to_raw_amount, to_readable_amount, u256_to_biguint,
};
use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// A single-hop exact-input trade priced against one quote.
///
/// The quote is not re-validated on-chain; the router deadline bounds how
/// stale it may get. Consumed by value by either a preview or an execution.
#[derive(Debug, Clone)]
pub struct TradeDescriptor {
    pool: PoolState,
    token_in: TokenIdentity,
    token_out: TokenIdentity,
    input_amount: Decimal,
    input_amount_raw: U256,
    quoted_output_raw: U256,
    route: Vec<PoolState>,
}

impl TradeDescriptor {
    #[must_use]
    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    #[must_use]
    pub fn token_in(&self) -> &TokenIdentity {
        &self.token_in
    }

    #[must_use]
    pub fn token_out(&self) -> &TokenIdentity {
        &self.token_out
    }

    #[must_use]
    pub fn input_amount(&self) -> Decimal {
        self.input_amount
    }

    #[must_use]
    pub fn input_amount_raw(&self) -> U256 {
        self.input_amount_raw
    }

    #[must_use]
    pub fn quoted_output_raw(&self) -> U256 {
        self.quoted_output_raw
    }

    #[must_use]
    pub fn route(&self) -> &[PoolState] {
        &self.route
    }
}

impl fmt::Display for TradeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let output = to_readable_amount(self.quoted_output_raw, self.token_out.decimals)
            .map(|amount| amount.to_string())
            .unwrap_or_else(|_| format!("{} raw", self.quoted_output_raw));
        write!(
            f,
            "{} {} for {} {}",
            self.input_amount, self.token_in.asset, output, self.token_out.asset
        )
    }
}

pub struct TradeBuilder<C: ?Sized> {
    resolver: PoolResolver<C>,
    quoter: Quoter<C>,
    wrapped_native: Address,
}

impl<C: ChainClient + ?Sized> TradeBuilder<C> {
    pub fn new(client: Arc<C>, factory: Address, quoter: Address, wrapped_native: Address) -> Self {
        Self {
            resolver: PoolResolver::new(client.clone(), factory),
            quoter: Quoter::new(client, quoter, wrapped_native),
            wrapped_native,
        }
    }

    pub async fn resolve_pool(&self, token_in: &TokenIdentity, token_out: &TokenIdentity) -> Result<PoolState> {
        self.resolver
            .resolve_pool(
                token_in.asset.routing_address(self.wrapped_native),
                token_out.asset.routing_address(self.wrapped_native),
            )
            .await
    }

    pub async fn build_trade(
        &self,
        pool: PoolState,
        token_in: TokenIdentity,
        token_out: TokenIdentity,
        input_amount: Decimal,
    ) -> Result<TradeDescriptor> {
        let input_amount_raw = to_raw_amount(input_amount, token_in.decimals)?;
        self.build_trade_raw(pool, token_in, token_out, input_amount_raw)
            .await
    }

    /// Same as [`build_trade`](Self::build_trade) for an amount already in
    /// the token's smallest unit. The raw amount is what gets quoted and
    /// swapped; the decimal form is kept for display only.
    pub async fn build_trade_raw(
        &self,
        pool: PoolState,
        token_in: TokenIdentity,
        token_out: TokenIdentity,
        input_amount_raw: U256,
    ) -> Result<TradeDescriptor> {
        let quoted_output_raw = self
            .quoter
            .quote(&pool, &token_in, &token_out, input_amount_raw)
            .await?;

        let trade = TradeDescriptor {
            route: vec![pool.clone()],
            input_amount: to_readable_amount(input_amount_raw, token_in.decimals)?,
            pool,
            token_in,
            token_out,
            input_amount_raw,
            quoted_output_raw,
        };

        info!(trade = %trade, pool = ?trade.pool.address, "Trade built");
        Ok(trade)
    }

    /// Re-reads the pool, re-quotes, and reports output and price impact
    /// against the fresh spot price. Never submits anything.
    pub async fn preview_trade(&self, trade: TradeDescriptor) -> Result<PreviewResult> {
        let pool = self.resolver.read_pool_state(trade.pool.address).await?;
        let amount_out = self
            .quoter
            .quote(&pool, &trade.token_in, &trade.token_out, trade.input_amount_raw)
            .await?;

        let token_in = trade.token_in.asset.routing_address(self.wrapped_native);
        let expected = spot_output(
            pool.sqrt_price_x96,
            trade.input_amount_raw,
            pool.zero_for_one(token_in),
        )?;
        let price_impact_percent = calculate_price_impact(&expected, &u256_to_biguint(amount_out))?;

        let estimated_output = to_readable_amount(amount_out, trade.token_out.decimals)?;

        Ok(PreviewResult {
            estimated_output,
            price_impact_percent,
        })
    }
}
