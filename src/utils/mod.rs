/*
 * Utility functions and helpers
 */

use crate::models::{Result, SwapError};
use ethers::types::U256;
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::str::FromStr;

const BASIS_POINTS: u32 = 10_000;
const IMPACT_SCALE: u32 = 6;

/// Converts a human-readable amount into the token's smallest unit.
///
/// The conversion is exact: an amount carrying more fractional digits than the
/// token supports is rejected instead of rounded.
pub fn to_raw_amount(amount: Decimal, decimals: u8) -> Result<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(SwapError::CalculationError(format!(
            "Negative amount: {amount}"
        )));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    let decimals = u32::from(decimals);
    if scale > decimals {
        return Err(SwapError::CalculationError(format!(
            "Amount {amount} has more than {decimals} fractional digits"
        )));
    }

    let mantissa = u128::try_from(normalized.mantissa())
        .map_err(|e| SwapError::CalculationError(format!("Invalid mantissa: {e}")))?;
    let multiplier = U256::from(10u8)
        .checked_pow(U256::from(decimals - scale))
        .ok_or_else(|| SwapError::CalculationError("Decimal multiplier overflow".to_string()))?;

    U256::from(mantissa)
        .checked_mul(multiplier)
        .ok_or_else(|| SwapError::CalculationError(format!("Amount {amount} overflows uint256")))
}

/// Converts a raw integer amount into a human-readable decimal.
pub fn to_readable_amount(raw: U256, decimals: u8) -> Result<Decimal> {
    let formatted = ethers::utils::format_units(raw, u32::from(decimals))
        .map_err(|e| SwapError::CalculationError(format!("Failed to format units: {e}")))?;

    Decimal::from_str(&formatted)
        .map(|d| d.normalize())
        .map_err(|e| SwapError::CalculationError(format!("Failed to parse amount {formatted}: {e}")))
}

#[must_use]
pub fn u256_to_biguint(value: U256) -> BigUint {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigUint::from_bytes_be(&bytes)
}

/// Output implied by the pool's spot price for `amount_in`, ignoring fees
/// and depth. Price is `sqrtPriceX96^2 / 2^192` of token1 per token0.
pub fn spot_output(sqrt_price_x96: U256, amount_in: U256, zero_for_one: bool) -> Result<BigUint> {
    if sqrt_price_x96.is_zero() {
        return Err(SwapError::CalculationError("Invalid sqrt price: zero".to_string()));
    }

    let price_x192 = u256_to_biguint(sqrt_price_x96).pow(2u32);
    let amount = u256_to_biguint(amount_in);

    if zero_for_one {
        Ok((amount * price_x192) >> 192u32)
    } else {
        Ok((amount << 192u32) / price_x192)
    }
}

/// Percentage shortfall of `actual_out` against `expected_out`, six decimal places.
pub fn calculate_price_impact(expected_out: &BigUint, actual_out: &BigUint) -> Result<Decimal> {
    if expected_out.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let expected = BigInt::from(expected_out.clone());
    let shortfall = &expected - BigInt::from(actual_out.clone());
    let scaled = shortfall * BigInt::from(100u32) * BigInt::from(10u64.pow(IMPACT_SCALE)) / expected;

    let value = scaled
        .to_i128()
        .ok_or_else(|| SwapError::CalculationError("Price impact out of range".to_string()))?;
    Decimal::try_from_i128_with_scale(value, IMPACT_SCALE)
        .map_err(|e| SwapError::CalculationError(format!("Price impact out of range: {e}")))
}

/// `floor(quoted / (1 + slippage))`, computed without intermediate overflow.
#[must_use]
pub fn minimum_amount_out(quoted: U256, slippage_bps: u32) -> U256 {
    let numerator = U256::from(BASIS_POINTS);
    let denominator = U256::from(BASIS_POINTS + slippage_bps);
    let whole = quoted / denominator;
    let remainder = quoted % denominator;
    whole * numerator + remainder * numerator / denominator
}

pub fn format_address(address: &str) -> Result<String> {
    if !address.starts_with("0x") || address.len() != 42 {
        return Err(SwapError::ConfigError(format!("Invalid address format: {address}")));
    }
    Ok(address.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_amount_scales_by_decimals() {
        let raw = to_raw_amount(Decimal::from_str("1.5").unwrap(), 6).unwrap();
        assert_eq!(raw, U256::from(1_500_000u64));

        let raw = to_raw_amount(Decimal::from(100), 18).unwrap();
        assert_eq!(raw, U256::from(100u64) * U256::exp10(18));
    }

    #[test]
    fn test_to_raw_amount_ignores_trailing_zeros() {
        let raw = to_raw_amount(Decimal::from_str("2.500000000").unwrap(), 2).unwrap();
        assert_eq!(raw, U256::from(250u64));
    }

    #[test]
    fn test_to_raw_amount_rejects_excess_precision() {
        assert!(to_raw_amount(Decimal::from_str("0.0000001").unwrap(), 6).is_err());
    }

    #[test]
    fn test_to_raw_amount_rejects_negative() {
        assert!(to_raw_amount(Decimal::from(-1), 18).is_err());
    }

    #[test]
    fn test_to_readable_amount() {
        let readable = to_readable_amount(U256::from(1_234_500u64), 6).unwrap();
        assert_eq!(readable, Decimal::from_str("1.2345").unwrap());

        let readable = to_readable_amount(U256::exp10(18) * 100, 18).unwrap();
        assert_eq!(readable, Decimal::from(100));
    }

    #[test]
    fn test_spot_output_at_unit_price() {
        let sqrt_price = U256::one() << 96;
        let amount = U256::from(1_000u64);
        assert_eq!(spot_output(sqrt_price, amount, true).unwrap(), BigUint::from(1_000u32));
        assert_eq!(spot_output(sqrt_price, amount, false).unwrap(), BigUint::from(1_000u32));
    }

    #[test]
    fn test_spot_output_orientation() {
        // price = 4 token1 per token0
        let sqrt_price = U256::from(2u8) << 96;
        let amount = U256::from(1_000u64);
        assert_eq!(spot_output(sqrt_price, amount, true).unwrap(), BigUint::from(4_000u32));
        assert_eq!(spot_output(sqrt_price, amount, false).unwrap(), BigUint::from(250u32));
    }

    #[test]
    fn test_spot_output_rejects_zero_price() {
        assert!(spot_output(U256::zero(), U256::one(), true).is_err());
    }

    #[test]
    fn test_price_impact_percent() {
        let impact = calculate_price_impact(&BigUint::from(1_000u32), &BigUint::from(997u32)).unwrap();
        assert_eq!(impact, Decimal::from_str("0.3").unwrap());

        let impact = calculate_price_impact(&BigUint::zero(), &BigUint::from(5u32)).unwrap();
        assert_eq!(impact, Decimal::ZERO);
    }

    #[test]
    fn test_minimum_amount_out_matches_sdk_rounding() {
        // 1_000_000 / 1.0005 = 999_500.24...
        assert_eq!(minimum_amount_out(U256::from(1_000_000u64), 5), U256::from(999_500u64));
        assert_eq!(minimum_amount_out(U256::zero(), 5), U256::zero());
        assert!(minimum_amount_out(U256::MAX, 5) < U256::MAX);
    }

    #[test]
    fn test_format_address() {
        assert!(format_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_ok());
        assert!(format_address("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_err());
    }
}
