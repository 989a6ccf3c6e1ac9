/*
 * SwapRouter call construction for single-hop trades
 */

use super::TradeDescriptor;
use crate::contracts::{self, ExactInputSingleParams};
use crate::execution::TransactionCall;
use crate::utils::minimum_amount_out;
use ethers::types::{Address, U256};

#[derive(Debug, Clone, Copy)]
pub struct SwapOptions {
    pub slippage_bps: u32,
    /// Unix timestamp after which the router rejects the swap.
    pub deadline: U256,
    pub recipient: Address,
}

/// Builds the router transaction for `trade`.
///
/// Native input is paid as `value` and any unspent coin refunded; native
/// output is received by the router as the wrapped token and unwrapped to
/// the recipient in the same call.
#[must_use]
pub fn swap_call_parameters(
    trade: &TradeDescriptor,
    router: Address,
    wrapped_native: Address,
    options: &SwapOptions,
) -> TransactionCall {
    let input_native = trade.token_in().asset.is_native();
    let output_native = trade.token_out().asset.is_native();
    let amount_out_minimum = minimum_amount_out(trade.quoted_output_raw(), options.slippage_bps);

    let params = ExactInputSingleParams {
        token_in: trade.token_in().asset.routing_address(wrapped_native),
        token_out: trade.token_out().asset.routing_address(wrapped_native),
        fee: trade.pool().fee.fee(),
        recipient: if output_native {
            Address::zero()
        } else {
            options.recipient
        },
        deadline: options.deadline,
        amount_in: trade.input_amount_raw(),
        amount_out_minimum,
    };

    let mut calls = vec![contracts::exact_input_single(&params)];
    if input_native {
        calls.push(contracts::refund_eth());
    }
    if output_native {
        calls.push(contracts::unwrap_weth9(amount_out_minimum, options.recipient));
    }

    let data = if calls.len() == 1 {
        calls.remove(0)
    } else {
        contracts::multicall(calls)
    };

    TransactionCall {
        to: router,
        data,
        value: if input_native {
            trade.input_amount_raw()
        } else {
            U256::zero()
        },
    }
}
