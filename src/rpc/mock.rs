/*
 * Scripted in-memory chain for unit tests
 */

use super::{ChainClient, FeeData};
use crate::contracts::selector;
use crate::models::{Result, SwapError};
use async_trait::async_trait;
use ethers::abi::{encode, Token};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type CallHandler = Arc<dyn Fn(&[u8]) -> Result<Bytes> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub enum ReceiptStep {
    Pending,
    Mined,
    Error,
}

#[derive(Default)]
struct MockState {
    handlers: HashMap<(Address, [u8; 4]), CallHandler>,
    calls: Vec<(Address, Bytes)>,
    sent: Vec<TypedTransaction>,
    receipts: VecDeque<ReceiptStep>,
    receipt_polls: usize,
    fee_data: FeeData,
    native_balance: U256,
    fail_sends: bool,
    fail_fee_data: bool,
}

pub struct MockChain {
    address: Address,
    chain_id: u64,
    state: Mutex<MockState>,
}

pub fn word(value: impl Into<U256>) -> Bytes {
    Bytes::from(encode(&[Token::Uint(value.into())]))
}

pub fn address_word(address: Address) -> Bytes {
    Bytes::from(encode(&[Token::Address(address)]))
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            address: Address::repeat_byte(0xaa),
            chain_id,
            state: Mutex::new(MockState {
                fee_data: FeeData {
                    gas_price: Some(U256::from(30_000_000_000u64)),
                    max_fee_per_gas: Some(U256::from(40_000_000_000u64)),
                    max_priority_fee_per_gas: Some(U256::from(2_000_000_000u64)),
                },
                ..MockState::default()
            }),
        }
    }

    pub fn on_call<F>(&self, to: Address, signature: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<Bytes> + Send + Sync + 'static,
    {
        self.state
            .lock()
            .unwrap()
            .handlers
            .insert((to, selector(signature)), Arc::new(handler));
    }

    pub fn respond(&self, to: Address, signature: &str, response: Bytes) {
        self.on_call(to, signature, move |_| Ok(response.clone()));
    }

    pub fn set_fee_data(&self, fee_data: FeeData) {
        self.state.lock().unwrap().fee_data = fee_data;
    }

    pub fn set_native_balance(&self, balance: U256) {
        self.state.lock().unwrap().native_balance = balance;
    }

    pub fn fail_sends(&self) {
        self.state.lock().unwrap().fail_sends = true;
    }

    pub fn fail_fee_data(&self) {
        self.state.lock().unwrap().fail_fee_data = true;
    }

    /// Scripts receipt polls in order; once exhausted every poll finds a receipt.
    pub fn script_receipts(&self, steps: impl IntoIterator<Item = ReceiptStep>) {
        self.state.lock().unwrap().receipts.extend(steps);
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, to: Address, signature: &str) -> usize {
        let wanted = selector(signature);
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(target, data)| *target == to && data.len() >= 4 && data[..4] == wanted)
            .count()
    }

    pub fn sent(&self) -> Vec<TypedTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn receipt_polls(&self) -> usize {
        self.state.lock().unwrap().receipt_polls
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn address(&self) -> Address {
        self.address
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let handler = {
            let mut state = self.state.lock().unwrap();
            state.calls.push((to, data.clone()));
            let key: [u8; 4] = data
                .get(..4)
                .and_then(|s| s.try_into().ok())
                .unwrap_or_default();
            state.handlers.get(&(to, key)).cloned()
        };

        match handler {
            Some(handler) => handler(&data[4..]),
            None => Err(SwapError::ContractError("execution reverted".to_string())),
        }
    }

    async fn fee_data(&self) -> Result<FeeData> {
        let state = self.state.lock().unwrap();
        if state.fail_fee_data {
            return Err(SwapError::RpcError("fee data unavailable".to_string()));
        }
        Ok(state.fee_data.clone())
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256> {
        Ok(self.state.lock().unwrap().native_balance)
    }

    async fn send_transaction(&self, tx: TypedTransaction) -> Result<H256> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sends {
            return Err(SwapError::SignerError("nonce too low".to_string()));
        }
        state.sent.push(tx);
        Ok(H256::from_low_u64_be(state.sent.len() as u64))
    }

    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls += 1;
        match state.receipts.pop_front().unwrap_or(ReceiptStep::Mined) {
            ReceiptStep::Pending => Ok(None),
            ReceiptStep::Error => Err(SwapError::RpcError("connection reset".to_string())),
            ReceiptStep::Mined => Ok(Some(TransactionReceipt {
                transaction_hash: hash,
                status: Some(1u64.into()),
                ..TransactionReceipt::default()
            })),
        }
    }
}
