/*
 * RPC client module: signing and read access to an EVM chain
 */

#[cfg(test)]
pub mod mock;

use crate::models::{Result, SwapError};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockNumber, Bytes, TransactionReceipt, TransactionRequest, H256, U256};
use std::sync::Arc;
use tracing::{debug, info};

/// Priority fee assumed when the node does not support `eth_maxPriorityFeePerGas`.
const FALLBACK_PRIORITY_FEE_WEI: u64 = 1_000_000_000;

/// Network fee snapshot. EIP-1559 fields are absent on chains without a base fee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeData {
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
}

/// Everything the swap engine needs from a signing connection to one chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    fn chain_id(&self) -> u64;

    /// Read-only `eth_call` against `to`.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    async fn fee_data(&self) -> Result<FeeData>;

    async fn native_balance(&self, owner: Address) -> Result<U256>;

    /// Signs and broadcasts `tx`, returning its hash.
    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256>;

    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>>;
}

pub struct SignerClient {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    chain_id: u64,
}

impl SignerClient {
    /// Connects to `rpc_url` and binds `private_key` (hex, `0x` optional).
    /// Fails if the endpoint reports a different chain than `chain_id`.
    pub async fn new(rpc_url: &str, chain_id: u64, private_key: &str) -> Result<Self> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| SwapError::SignerError(format!("Invalid private key: {e}")))?
            .with_chain_id(chain_id);

        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| SwapError::RpcError(format!("Failed to create provider: {e}")))?;

        let chain = provider
            .get_chainid()
            .await
            .map_err(|e| SwapError::RpcError(format!("Failed to get chain ID: {e}")))?;

        if chain.as_u64() != chain_id {
            return Err(SwapError::RpcError(format!(
                "Chain ID mismatch: expected {}, got {}",
                chain_id,
                chain.as_u64()
            )));
        }

        info!(chain_id, address = ?wallet.address(), "Signer connected");

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            chain_id,
        })
    }
}

#[async_trait]
impl ChainClient for SignerClient {
    fn address(&self) -> Address {
        self.client.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();

        self.client
            .provider()
            .call(&tx, None)
            .await
            .map_err(|e| SwapError::ContractError(format!("eth_call to {to:?} failed: {e}")))
    }

    async fn fee_data(&self) -> Result<FeeData> {
        let provider = self.client.provider();

        let gas_price = provider
            .get_gas_price()
            .await
            .map_err(|e| SwapError::RpcError(format!("Failed to get gas price: {e}")))?;

        let base_fee = provider
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| SwapError::RpcError(format!("Failed to get latest block: {e}")))?
            .and_then(|block| block.base_fee_per_gas);

        let Some(base_fee) = base_fee else {
            return Ok(FeeData {
                gas_price: Some(gas_price),
                ..FeeData::default()
            });
        };

        let priority_fee = match provider
            .request::<_, U256>("eth_maxPriorityFeePerGas", ())
            .await
        {
            Ok(fee) => fee,
            Err(e) => {
                debug!(error = %e, "eth_maxPriorityFeePerGas unavailable, using fallback");
                U256::from(FALLBACK_PRIORITY_FEE_WEI)
            }
        };

        Ok(FeeData {
            gas_price: Some(gas_price),
            max_fee_per_gas: Some(base_fee * 2 + priority_fee),
            max_priority_fee_per_gas: Some(priority_fee),
        })
    }

    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.client
            .get_balance(owner, None)
            .await
            .map_err(|e| SwapError::RpcError(format!("Failed to get balance: {e}")))
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256> {
        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| SwapError::SignerError(format!("Failed to send transaction: {e}")))?;

        Ok(pending.tx_hash())
    }

    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        self.client
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| SwapError::RpcError(format!("Failed to get receipt: {e}")))
    }
}
