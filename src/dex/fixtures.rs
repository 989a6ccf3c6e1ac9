/*
 * Pool and quoter fixtures shared by unit tests
 */

use super::FeeTier;
use crate::contracts::{FEE, GET_POOL, LIQUIDITY, QUOTE_EXACT_INPUT_SINGLE, SLOT0, TICK_SPACING, TOKEN0, TOKEN1};
use crate::models::SwapError;
use crate::rpc::mock::{address_word, word, MockChain};
use ethers::abi::{decode, encode, ParamType, Token};
use ethers::types::{Address, Bytes, U256};

#[derive(Debug, Clone)]
pub struct PoolFixture {
    pub factory: Address,
    pub quoter: Address,
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub tier: FeeTier,
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub tick: i32,
}

impl Default for PoolFixture {
    fn default() -> Self {
        Self {
            factory: Address::repeat_byte(0xfa),
            quoter: Address::repeat_byte(0x0c),
            pool: Address::repeat_byte(0x90),
            token0: Address::repeat_byte(0x10),
            token1: Address::repeat_byte(0x20),
            tier: FeeTier::Low,
            // price of 1 token1 per token0
            sqrt_price_x96: U256::one() << 96,
            liquidity: 5_000_000_000_000_000_000,
            tick: -12,
        }
    }
}

/// Two's complement word for a signed value.
fn int_raw(value: i32) -> U256 {
    if value < 0 {
        U256::MAX - U256::from(value.unsigned_abs() - 1)
    } else {
        U256::from(value.unsigned_abs())
    }
}

fn int_word(value: i32) -> Bytes {
    Bytes::from(encode(&[Token::Int(int_raw(value))]))
}

/// Registers a factory that knows only `fixture.tier` plus the pool's reads.
pub fn install_pool(chain: &MockChain, fixture: &PoolFixture) {
    let (pool, token0, token1, fee) = (fixture.pool, fixture.token0, fixture.token1, fixture.tier.fee());
    chain.on_call(fixture.factory, GET_POOL, move |args| {
        let tokens = decode(&[ParamType::Address, ParamType::Address, ParamType::Uint(24)], args)
            .map_err(|e| SwapError::ContractError(e.to_string()))?;
        let matches = match tokens.as_slice() {
            [Token::Address(a), Token::Address(b), Token::Uint(f)] => {
                let pair = (*a == token0 && *b == token1) || (*a == token1 && *b == token0);
                pair && f.low_u32() == fee
            }
            _ => false,
        };
        Ok(address_word(if matches { pool } else { Address::zero() }))
    });

    chain.respond(pool, TOKEN0, address_word(token0));
    chain.respond(pool, TOKEN1, address_word(token1));
    chain.respond(pool, FEE, word(fee));
    chain.respond(pool, TICK_SPACING, int_word(fixture.tier.tick_spacing()));
    chain.respond(pool, LIQUIDITY, word(fixture.liquidity));

    let slot0 = Bytes::from(encode(&[
        Token::Uint(fixture.sqrt_price_x96),
        Token::Int(int_raw(fixture.tick)),
        Token::Uint(U256::zero()),
        Token::Uint(U256::one()),
        Token::Uint(U256::one()),
        Token::Uint(U256::zero()),
        Token::Bool(true),
    ]));
    chain.respond(pool, SLOT0, slot0);
}

/// QuoterV2 answer `(amountOut, sqrtPriceX96After, ticksCrossed, gasEstimate)`.
pub fn install_quote(chain: &MockChain, quoter: Address, amount_out: U256) {
    let response = Bytes::from(encode(&[
        Token::Uint(amount_out),
        Token::Uint(U256::one() << 96),
        Token::Uint(U256::one()),
        Token::Uint(U256::from(90_000u32)),
    ]));
    chain.respond(quoter, QUOTE_EXACT_INPUT_SINGLE, response);
}
