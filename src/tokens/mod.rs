/*
 * ERC-20 and native asset metadata and balance lookups
 */

use crate::contracts::{self, DECIMALS};
use crate::models::{Asset, Result, SwapError, TokenIdentity, NATIVE_DECIMALS};
use crate::rpc::ChainClient;
use crate::utils::to_readable_amount;
use ethers::types::{Address, Bytes, U256};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct TokenReader<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ChainClient + ?Sized> TokenReader<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub async fn decimals(&self, asset: &Asset) -> Result<u8> {
        match asset {
            Asset::Native => Ok(NATIVE_DECIMALS),
            Asset::Contract(address) => {
                let data = self
                    .client
                    .call(*address, contracts::call_data(DECIMALS, &[]))
                    .await?;
                let decimals = contracts::decode_uint(&data, "decimals")?;
                u8::try_from(decimals).map_err(|_| {
                    SwapError::ContractError(format!("Token {address:?} reports {decimals} decimals"))
                })
            }
        }
    }

    pub async fn token(&self, asset: Asset) -> Result<TokenIdentity> {
        let decimals = self.decimals(&asset).await?;
        Ok(TokenIdentity::new(self.client.chain_id(), asset, decimals))
    }

    pub async fn raw_balance(&self, owner: Address, asset: &Asset) -> Result<U256> {
        match asset {
            Asset::Native => self.client.native_balance(owner).await,
            Asset::Contract(address) => {
                let data: Bytes = self
                    .client
                    .call(*address, contracts::balance_of(owner))
                    .await?;
                contracts::decode_uint(&data, "balanceOf")
            }
        }
    }

    /// Human-readable balance of `owner` in `token`.
    pub async fn balance(&self, owner: Address, token: &TokenIdentity) -> Result<Decimal> {
        let raw = self.raw_balance(owner, &token.asset).await?;
        to_readable_amount(raw, token.decimals)
    }
}
