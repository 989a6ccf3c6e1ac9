/*
 * ERC-20 allowance checks and approval transactions
 */

use super::{SubmitMode, TransactionCall, TransactionSubmitter};
use crate::config::ApprovalSettings;
use crate::contracts;
use crate::models::{Asset, Result, TokenIdentity, TransactionState};
use crate::rpc::ChainClient;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ApprovalManager<C: ?Sized> {
    client: Arc<C>,
    submitter: Arc<TransactionSubmitter<C>>,
    settings: ApprovalSettings,
}

impl<C: ChainClient + ?Sized> ApprovalManager<C> {
    pub fn new(
        client: Arc<C>,
        submitter: Arc<TransactionSubmitter<C>>,
        settings: ApprovalSettings,
    ) -> Self {
        Self {
            client,
            submitter,
            settings,
        }
    }

    /// Makes sure `spender` may pull `required` raw units of `token` from the
    /// signer. Unlimited approvals skip the allowance read unless
    /// `check_allowance_for_max` is set.
    pub async fn ensure_approval(
        &self,
        token: &TokenIdentity,
        spender: Address,
        required: U256,
        approval_max: bool,
    ) -> TransactionState {
        let Asset::Contract(address) = token.asset else {
            debug!("Native asset needs no approval");
            return TransactionState::Sent;
        };

        let check_allowance = !approval_max || self.settings.check_allowance_for_max;
        if check_allowance {
            match self.allowance(address, spender).await {
                Ok(current) if current >= required => {
                    debug!(token = ?address, %current, %required, "Allowance already sufficient");
                    return TransactionState::Sent;
                }
                Ok(current) => {
                    debug!(token = ?address, %current, %required, "Allowance too low");
                }
                Err(e) => {
                    warn!(token = ?address, error = %e, "Allowance lookup failed");
                    return TransactionState::Failed;
                }
            }
        }

        let amount = if approval_max { U256::MAX } else { required };
        info!(token = ?address, spender = ?spender, unlimited = approval_max, "Submitting approval");

        let call = TransactionCall {
            to: address,
            data: contracts::approve(spender, amount),
            value: U256::zero(),
        };
        self.submitter.submit(call, SubmitMode::AwaitReceipt).await
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        let data = self
            .client
            .call(token, contracts::allowance(self.client.address(), spender))
            .await?;
        contracts::decode_uint(&data, "allowance")
    }
}
