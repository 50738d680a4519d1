//! Constant-Product Pricing
//!
//! out = in·(1e6 − fee)·R_out / (R_in·1e6 + in·(1e6 − fee))
//!
//! Intermediate products use 256-bit integers; 18-decimal reserves overflow
//! u128 otherwise.

use ethnum::U256;

use vaultzap_common::{
    constants::precision::FEE_TIER_PRECISION,
    errors::{VaultZapError, VaultZapResult},
    traits::ReserveSource,
    types::{Address, TokenId},
};

use crate::pool::{LiquidityRegistry, Pool};

/// floor(a * b / denominator) without intermediate overflow
pub fn mul_div(a: u128, b: u128, denominator: u128) -> VaultZapResult<u128> {
    if denominator == 0 {
        return Err(VaultZapError::DivisionByZero);
    }
    let result = U256::from(a) * U256::from(b) / U256::from(denominator);
    if result > U256::from(u128::MAX) {
        return Err(VaultZapError::ArithmeticOverflow);
    }
    Ok(result.as_u128())
}

/// Output of one constant-product swap
///
/// Zero when either reserve is empty.
pub fn get_amount_out(amount_in: u128, reserve_in: u128, reserve_out: u128, fee_tier: u32) -> VaultZapResult<u128> {
    if amount_in == 0 || reserve_in == 0 || reserve_out == 0 {
        return Ok(0);
    }

    let fee_factor = FEE_TIER_PRECISION.saturating_sub(fee_tier as u128);
    let amount_in_with_fee = amount_in
        .checked_mul(fee_factor)
        .ok_or(VaultZapError::ArithmeticOverflow)?;
    let denominator = reserve_in
        .checked_mul(FEE_TIER_PRECISION)
        .and_then(|scaled| scaled.checked_add(amount_in_with_fee))
        .ok_or(VaultZapError::ArithmeticOverflow)?;

    mul_div(amount_in_with_fee, reserve_out, denominator)
}

/// Quoted traversal of one hop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopQuote {
    pub pool: Address,
    pub fee_tier: u32,
    pub amount_out: u128,
}

/// Quote a single pool in the `from -> to` direction
pub fn quote_pool<R: ReserveSource + ?Sized>(
    pool: &Pool,
    reserves: &R,
    from: &TokenId,
    to: &TokenId,
    amount_in: u128,
) -> VaultZapResult<u128> {
    let reserve_in = reserves.reserve_of(&pool.address, from);
    let reserve_out = reserves.reserve_of(&pool.address, to);
    get_amount_out(amount_in, reserve_in, reserve_out, pool.fee_tier)
}

/// Best active pool for a hop
///
/// Highest output wins; ties go to the lower fee tier, then the lower pool
/// address. `None` when the pair has no active pool.
pub fn best_pool_for_hop<R: ReserveSource + ?Sized>(
    registry: &LiquidityRegistry,
    reserves: &R,
    from: &TokenId,
    to: &TokenId,
    amount_in: u128,
) -> VaultZapResult<Option<HopQuote>> {
    let mut best: Option<HopQuote> = None;

    for pool in registry.active_pools_for_pair(from, to) {
        let amount_out = quote_pool(pool, reserves, from, to, amount_in)?;
        let candidate = HopQuote {
            pool: pool.address,
            fee_tier: pool.fee_tier,
            amount_out,
        };
        best = match best {
            None => Some(candidate),
            Some(current) if is_better_hop(&candidate, &current) => Some(candidate),
            keep => keep,
        };
    }

    Ok(best)
}

fn is_better_hop(candidate: &HopQuote, current: &HopQuote) -> bool {
    (candidate.amount_out, core::cmp::Reverse(candidate.fee_tier), core::cmp::Reverse(candidate.pool))
        > (current.amount_out, core::cmp::Reverse(current.fee_tier), core::cmp::Reverse(current.pool))
}
