/*
 * QuoterV2 client for single-hop exact-input quotes
 */

use super::PoolState;
use crate::contracts;
use crate::models::{Result, SwapError, TokenIdentity};
use crate::rpc::ChainClient;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::debug;

pub struct Quoter<C: ?Sized> {
    client: Arc<C>,
    quoter: Address,
    wrapped_native: Address,
}

impl<C: ChainClient + ?Sized> Quoter<C> {
    pub fn new(client: Arc<C>, quoter: Address, wrapped_native: Address) -> Self {
        Self {
            client,
            quoter,
            wrapped_native,
        }
    }

    /// Simulates an exact-input swap of `amount_in` (raw units) through `pool`
    /// and returns the raw output amount.
    pub async fn quote(
        &self,
        pool: &PoolState,
        token_in: &TokenIdentity,
        token_out: &TokenIdentity,
        amount_in: U256,
    ) -> Result<U256> {
        let token_in = token_in.asset.routing_address(self.wrapped_native);
        let token_out = token_out.asset.routing_address(self.wrapped_native);

        if !pool.contains(token_in) || !pool.contains(token_out) || token_in == token_out {
            return Err(SwapError::QuoteFailed(format!(
                "Pool {:?} does not trade {token_in:?} for {token_out:?}",
                pool.address
            )));
        }

        let call = contracts::quote_exact_input_single(token_in, token_out, amount_in, pool.fee.fee());
        let data = self
            .client
            .call(self.quoter, call)
            .await
            .map_err(|e| SwapError::QuoteFailed(e.to_string()))?;

        let amount_out = contracts::decode_uint(&data, "quoteExactInputSingle")
            .map_err(|e| SwapError::QuoteFailed(e.to_string()))?;

        debug!(%amount_in, %amount_out, fee = pool.fee.fee(), "Quote received");
        Ok(amount_out)
    }
}
