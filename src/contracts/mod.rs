/*
 * Calldata encoding and return-data decoding for the Uniswap V3 and ERC-20 contracts
 */

use crate::models::{Result, SwapError};
use ethers::{
    abi::{decode, encode, ParamType, Token},
    types::{Address, Bytes, U256},
    utils::keccak256,
};

pub const GET_POOL: &str = "getPool(address,address,uint24)";
pub const TOKEN0: &str = "token0()";
pub const TOKEN1: &str = "token1()";
pub const FEE: &str = "fee()";
pub const TICK_SPACING: &str = "tickSpacing()";
pub const LIQUIDITY: &str = "liquidity()";
pub const SLOT0: &str = "slot0()";
pub const QUOTE_EXACT_INPUT_SINGLE: &str =
    "quoteExactInputSingle((address,address,uint256,uint24,uint160))";
pub const EXACT_INPUT_SINGLE: &str =
    "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))";
pub const MULTICALL: &str = "multicall(bytes[])";
pub const REFUND_ETH: &str = "refundETH()";
pub const UNWRAP_WETH9: &str = "unwrapWETH9(uint256,address)";
pub const ALLOWANCE: &str = "allowance(address,address)";
pub const APPROVE: &str = "approve(address,uint256)";
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const DECIMALS: &str = "decimals()";

#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[must_use]
pub fn call_data(signature: &str, params: &[Token]) -> Bytes {
    let mut data = Vec::from(selector(signature));
    data.extend_from_slice(&encode(params));
    Bytes::from(data)
}

pub fn get_pool(token_a: Address, token_b: Address, fee: u32) -> Bytes {
    call_data(
        GET_POOL,
        &[
            Token::Address(token_a),
            Token::Address(token_b),
            Token::Uint(fee.into()),
        ],
    )
}

pub fn quote_exact_input_single(
    token_in: Address,
    token_out: Address,
    amount_in: U256,
    fee: u32,
) -> Bytes {
    call_data(
        QUOTE_EXACT_INPUT_SINGLE,
        &[Token::Tuple(vec![
            Token::Address(token_in),
            Token::Address(token_out),
            Token::Uint(amount_in),
            Token::Uint(fee.into()),
            Token::Uint(U256::zero()),
        ])],
    )
}

/// Parameters of the router's `exactInputSingle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: U256,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

pub fn exact_input_single(params: &ExactInputSingleParams) -> Bytes {
    call_data(
        EXACT_INPUT_SINGLE,
        &[Token::Tuple(vec![
            Token::Address(params.token_in),
            Token::Address(params.token_out),
            Token::Uint(params.fee.into()),
            Token::Address(params.recipient),
            Token::Uint(params.deadline),
            Token::Uint(params.amount_in),
            Token::Uint(params.amount_out_minimum),
            Token::Uint(U256::zero()),
        ])],
    )
}

pub fn multicall(calls: Vec<Bytes>) -> Bytes {
    let calls = calls
        .into_iter()
        .map(|call| Token::Bytes(call.to_vec()))
        .collect();
    call_data(MULTICALL, &[Token::Array(calls)])
}

pub fn refund_eth() -> Bytes {
    call_data(REFUND_ETH, &[])
}

pub fn unwrap_weth9(amount_minimum: U256, recipient: Address) -> Bytes {
    call_data(
        UNWRAP_WETH9,
        &[Token::Uint(amount_minimum), Token::Address(recipient)],
    )
}

pub fn allowance(owner: Address, spender: Address) -> Bytes {
    call_data(ALLOWANCE, &[Token::Address(owner), Token::Address(spender)])
}

pub fn approve(spender: Address, amount: U256) -> Bytes {
    call_data(APPROVE, &[Token::Address(spender), Token::Uint(amount)])
}

pub fn balance_of(owner: Address) -> Bytes {
    call_data(BALANCE_OF, &[Token::Address(owner)])
}

fn decode_words(types: &[ParamType], data: &[u8], what: &str) -> Result<Vec<Token>> {
    decode(types, data)
        .map_err(|e| SwapError::ContractError(format!("Invalid {what} response: {e}")))
}

pub fn decode_address(data: &[u8], what: &str) -> Result<Address> {
    match decode_words(&[ParamType::Address], data, what)?.into_iter().next() {
        Some(Token::Address(address)) => Ok(address),
        _ => Err(SwapError::ContractError(format!("Invalid {what} response"))),
    }
}

pub fn decode_uint(data: &[u8], what: &str) -> Result<U256> {
    match decode_words(&[ParamType::Uint(256)], data, what)?.into_iter().next() {
        Some(Token::Uint(value)) => Ok(value),
        _ => Err(SwapError::ContractError(format!("Invalid {what} response"))),
    }
}

/// Decodes a sign-extended int24 word.
pub fn decode_int24(data: &[u8], what: &str) -> Result<i32> {
    match decode_words(&[ParamType::Int(24)], data, what)?.into_iter().next() {
        Some(Token::Int(raw)) => Ok(low_i32(raw)),
        _ => Err(SwapError::ContractError(format!("Invalid {what} response"))),
    }
}

/// `slot0()` returns `(sqrtPriceX96, tick, ...)`; only the first two are used.
pub fn decode_slot0(data: &[u8]) -> Result<(U256, i32)> {
    let tokens = decode_words(
        &[
            ParamType::Uint(160),
            ParamType::Int(24),
            ParamType::Uint(16),
            ParamType::Uint(16),
            ParamType::Uint(16),
            ParamType::Uint(8),
            ParamType::Bool,
        ],
        data,
        "slot0",
    )?;

    match (tokens.first(), tokens.get(1)) {
        (Some(Token::Uint(sqrt_price)), Some(Token::Int(tick))) => Ok((*sqrt_price, low_i32(*tick))),
        _ => Err(SwapError::ContractError("Invalid slot0 response".to_string())),
    }
}

#[allow(clippy::cast_possible_wrap)]
fn low_i32(raw: U256) -> i32 {
    raw.low_u32() as i32
}
