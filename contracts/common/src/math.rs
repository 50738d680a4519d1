//! Mathematical Utilities for the vaultzap Protocol
//!
//! Exact integer arithmetic for leveraged issuance. Every division truncates
//! toward zero and every multiplication is checked.

use crate::constants::{precision, token};
use crate::errors::{VaultZapError, VaultZapResult};

/// Result of splitting newly issued debt between the user and the fee recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceSplit {
    /// Debt issued against the deposit
    pub debt_gross: u128,
    /// Issuance fee routed to the borrow fee recipient
    pub fee_share: u128,
    /// Remainder owned by the depositor
    pub user_share: u128,
}

/// Scale a collateral amount to debt token decimals
///
/// Identity for 18-decimal collateral; truncates when the collateral has more
/// decimals than the debt token.
pub fn normalize_to_debt_decimals(amount: u128, decimals: u8) -> VaultZapResult<u128> {
    let target = token::DEBT_DECIMALS;
    if decimals == target {
        return Ok(amount);
    }
    if decimals < target {
        let factor = pow10(target - decimals)?;
        amount.checked_mul(factor).ok_or(VaultZapError::ArithmeticOverflow)
    } else {
        let factor = pow10(decimals - target)?;
        Ok(amount / factor)
    }
}

/// Inverse of [`normalize_to_debt_decimals`]
pub fn denormalize_from_debt_decimals(amount: u128, decimals: u8) -> VaultZapResult<u128> {
    let target = token::DEBT_DECIMALS;
    if decimals == target {
        return Ok(amount);
    }
    if decimals < target {
        let factor = pow10(target - decimals)?;
        Ok(amount / factor)
    } else {
        let factor = pow10(decimals - target)?;
        amount.checked_mul(factor).ok_or(VaultZapError::ArithmeticOverflow)
    }
}

fn pow10(exp: u8) -> VaultZapResult<u128> {
    10u128.checked_pow(exp as u32).ok_or(VaultZapError::ArithmeticOverflow)
}

/// Calculate gross debt issued against a collateral amount
///
/// debt_gross = floor(amount * price * 100 / mcr / 1e8)
///
/// # Arguments
/// * `amount` - Collateral in debt-token decimals
/// * `price` - Collateral price with 8 decimals
/// * `mcr` - Minimum collateralization ratio (110 = 110%)
pub fn calculate_debt_gross(amount: u128, price: u128, mcr: u64) -> VaultZapResult<u128> {
    if mcr == 0 {
        return Err(VaultZapError::DivisionByZero);
    }

    let debt = amount
        .checked_mul(price)
        .ok_or(VaultZapError::ArithmeticOverflow)?
        .checked_mul(precision::PERCENT_PRECISION)
        .ok_or(VaultZapError::ArithmeticOverflow)?
        / mcr as u128
        / precision::PRICE_PRECISION;

    Ok(debt)
}

/// Split gross debt into fee and user shares
///
/// fee_share = floor(debt_gross * issuance_fee / 1e6), user_share = the rest.
pub fn split_issuance_fee(debt_gross: u128, issuance_fee: u64) -> VaultZapResult<IssuanceSplit> {
    if issuance_fee as u128 > precision::ISSUANCE_FEE_PRECISION {
        return Err(VaultZapError::InvalidParameters {
            param: "issuance_fee",
            reason: "exceeds 1e6",
        });
    }

    let fee_share = debt_gross
        .checked_mul(issuance_fee as u128)
        .ok_or(VaultZapError::ArithmeticOverflow)?
        / precision::ISSUANCE_FEE_PRECISION;

    // fee_share <= debt_gross because issuance_fee <= 1e6
    let user_share = debt_gross - fee_share;

    Ok(IssuanceSplit {
        debt_gross,
        fee_share,
        user_share,
    })
}

/// Compute the full issuance for a leveraged deposit
pub fn calculate_issuance(
    amount: u128,
    decimals: u8,
    price: u128,
    mcr: u64,
    issuance_fee: u64,
) -> VaultZapResult<IssuanceSplit> {
    let normalized = normalize_to_debt_decimals(amount, decimals)?;
    let debt_gross = calculate_debt_gross(normalized, price, mcr)?;
    split_issuance_fee(debt_gross, issuance_fee)
}

/// Maximum debt a collateral position supports at its MCR
///
/// Equal to [`calculate_debt_gross`]; kept separate for readability at call sites.
pub fn max_debt_for_collateral(collateral: u128, price: u128, mcr: u64) -> VaultZapResult<u128> {
    calculate_debt_gross(collateral, price, mcr)
}

/// Check the issuance solvency invariant
///
/// debt * mcr * 1e8 <= collateral * price * 100, evaluated as
/// debt <= floor(collateral * price * 100 / (mcr * 1e8)).
pub fn is_solvent(debt: u128, collateral: u128, price: u128, mcr: u64) -> VaultZapResult<bool> {
    if debt == 0 {
        return Ok(true);
    }
    Ok(debt <= max_debt_for_collateral(collateral, price, mcr)?)
}

/// Collateral worth `debt` at the oracle price (debt-token decimals)
///
/// collateral = floor(debt * 1e8 / price)
pub fn collateral_for_debt_value(debt: u128, price: u128) -> VaultZapResult<u128> {
    if price == 0 {
        return Err(VaultZapError::DivisionByZero);
    }
    let value = debt
        .checked_mul(precision::PRICE_PRECISION)
        .ok_or(VaultZapError::ArithmeticOverflow)?
        / price;
    Ok(value)
}

/// Reduce an amount by a tolerance in basis points
pub fn apply_slippage(amount: u128, slippage_bps: u64) -> VaultZapResult<u128> {
    let keep = precision::BPS_DENOMINATOR.saturating_sub(slippage_bps as u128);
    let bounded = amount
        .checked_mul(keep)
        .ok_or(VaultZapError::ArithmeticOverflow)?
        / precision::BPS_DENOMINATOR;
    Ok(bounded)
}

/// Safe addition with overflow check
pub fn safe_add(a: u128, b: u128) -> VaultZapResult<u128> {
    a.checked_add(b).ok_or(VaultZapError::ArithmeticOverflow)
}
