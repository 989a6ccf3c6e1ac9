/*
 * Transaction execution: approvals and fee-escalated submission
 */

pub mod approval;
pub mod submitter;

use ethers::types::{Address, Bytes, U256};

pub use approval::ApprovalManager;
pub use submitter::{GasPricing, TransactionSubmitter, FEE_MULTIPLIER, LEGACY_GAS_CHAIN_ID};

/// Target, calldata and value of a transaction before fees are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCall {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// `Sent` as soon as the node accepts the transaction.
    FireAndForget,
    /// `Sent` only once a receipt is observed.
    AwaitReceipt,
}

impl SubmitMode {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SubmitMode::FireAndForget => "fire_and_forget",
            SubmitMode::AwaitReceipt => "await_receipt",
        }
    }
}
