/*
 * Fee strategy, signing/broadcast and receipt confirmation
 */

use super::{SubmitMode, TransactionCall};
use crate::config::{ReceiptPolicy, POLYGON_CHAIN_ID};
use crate::metrics::SwapMetrics;
use crate::models::{Result, SwapError, TransactionState};
use crate::rpc::{ChainClient, FeeData};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Eip1559TransactionRequest, TransactionRequest, H256, U256};
use std::future::pending;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The one chain priced with a single legacy gas price.
pub const LEGACY_GAS_CHAIN_ID: u64 = POLYGON_CHAIN_ID;

/// Network fees are doubled so the transaction outbids current conditions.
pub const FEE_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPricing {
    Legacy {
        gas_price: U256,
    },
    Eip1559 {
        max_fee_per_gas: U256,
        max_priority_fee_per_gas: U256,
    },
}

fn escalate(value: Option<U256>, field: &str) -> Result<U256> {
    value
        .ok_or_else(|| SwapError::RpcError(format!("Network did not report {field}")))?
        .checked_mul(U256::from(FEE_MULTIPLIER))
        .ok_or_else(|| SwapError::CalculationError(format!("{field} overflow")))
}

impl GasPricing {
    pub fn for_chain(chain_id: u64, fee_data: &FeeData) -> Result<Self> {
        if chain_id == LEGACY_GAS_CHAIN_ID {
            Ok(GasPricing::Legacy {
                gas_price: escalate(fee_data.gas_price, "gas price")?,
            })
        } else {
            Ok(GasPricing::Eip1559 {
                max_fee_per_gas: escalate(fee_data.max_fee_per_gas, "max fee per gas")?,
                max_priority_fee_per_gas: escalate(
                    fee_data.max_priority_fee_per_gas,
                    "max priority fee per gas",
                )?,
            })
        }
    }

    #[must_use]
    pub fn into_transaction(self, from: Address, call: TransactionCall) -> TypedTransaction {
        match self {
            GasPricing::Legacy { gas_price } => TransactionRequest::new()
                .from(from)
                .to(call.to)
                .data(call.data)
                .value(call.value)
                .gas_price(gas_price)
                .into(),
            GasPricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => Eip1559TransactionRequest::new()
                .from(from)
                .to(call.to)
                .data(call.data)
                .value(call.value)
                .max_fee_per_gas(max_fee_per_gas)
                .max_priority_fee_per_gas(max_priority_fee_per_gas)
                .into(),
        }
    }
}

pub struct TransactionSubmitter<C: ?Sized> {
    client: Arc<C>,
    receipt_policy: ReceiptPolicy,
    cancel: Option<watch::Receiver<bool>>,
    metrics: Arc<SwapMetrics>,
}

impl<C: ChainClient + ?Sized> TransactionSubmitter<C> {
    pub fn new(client: Arc<C>, receipt_policy: ReceiptPolicy, metrics: Arc<SwapMetrics>) -> Self {
        Self {
            client,
            receipt_policy,
            cancel: None,
            metrics,
        }
    }

    /// Abandons receipt waits once `true` is published on `cancel`.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Prices, signs and broadcasts `call`. Every failure is reported as
    /// `Failed`; nothing is retried.
    pub async fn submit(&self, call: TransactionCall, mode: SubmitMode) -> TransactionState {
        let state = match self.broadcast(call).await {
            Ok(hash) => match mode {
                SubmitMode::FireAndForget => TransactionState::Sent,
                SubmitMode::AwaitReceipt => self.await_receipt(hash).await,
            },
            Err(e) => {
                warn!(error = %e, "Transaction submission failed");
                TransactionState::Failed
            }
        };

        self.metrics.record_submission(mode, state);
        state
    }

    async fn broadcast(&self, call: TransactionCall) -> Result<H256> {
        let fee_data = self.client.fee_data().await?;
        let pricing = GasPricing::for_chain(self.client.chain_id(), &fee_data)?;
        debug!(?pricing, chain_id = self.client.chain_id(), "Fee strategy selected");

        let to = call.to;
        let tx = pricing.into_transaction(self.client.address(), call);
        let hash = self.client.send_transaction(tx).await?;

        info!(tx_hash = ?hash, to = ?to, "Transaction broadcast");
        Ok(hash)
    }

    async fn await_receipt(&self, hash: H256) -> TransactionState {
        let policy = self.receipt_policy;

        let poll = async {
            let mut backoff = policy.initial_backoff;
            loop {
                match self.client.transaction_receipt(hash).await {
                    Ok(Some(receipt)) => {
                        if receipt.status == Some(0u64.into()) {
                            warn!(tx_hash = ?hash, "Transaction mined but reverted");
                        } else {
                            info!(tx_hash = ?hash, block = ?receipt.block_number, "Transaction confirmed");
                        }
                        return TransactionState::Sent;
                    }
                    Ok(None) => {
                        tokio::time::sleep(backoff).await;
                        backoff = policy.next_backoff(backoff);
                    }
                    Err(e) => {
                        warn!(tx_hash = ?hash, error = %e, "Receipt polling failed");
                        return TransactionState::Failed;
                    }
                }
            }
        };

        let cancelled = wait_cancelled(self.cancel.clone());

        tokio::select! {
            result = tokio::time::timeout(policy.timeout, poll) => result.unwrap_or_else(|_| {
                warn!(tx_hash = ?hash, timeout_secs = policy.timeout.as_secs(), "Receipt wait timed out");
                TransactionState::Failed
            }),
            () = cancelled => {
                warn!(tx_hash = ?hash, "Receipt wait cancelled");
                TransactionState::Failed
            }
        }
    }
}

async fn wait_cancelled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut cancel) = cancel else {
        return pending().await;
    };
    while !*cancel.borrow() {
        if cancel.changed().await.is_err() {
            return pending().await;
        }
    }
}
