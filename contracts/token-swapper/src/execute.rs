//! Route Execution
//!
//! Swaps along a route against the token ledger. For every hop the trader
//! pays the input into the best active pool and the pool pays the output
//! back, so intermediate tokens pass through the trader.
//!
//! Execution is all-or-nothing: the ledger and event log are only touched
//! when every hop succeeds and the final output meets the minimum.

use vaultzap_common::{
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    token_ops::TokenLedger,
    types::{Address, Route},
    validation::require_positive,
    Vec,
};

use crate::optimizer::validate_route;
use crate::pool::LiquidityRegistry;
use crate::quote::best_pool_for_hop;

/// Outcome of an executed route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    pub amount_in: u128,
    pub amount_out: u128,
    /// Pool used for each hop
    pub pools: Vec<Address>,
}

/// Execute `route` for `trader`, spending `amount_in` of the source token
///
/// # Errors
/// - `InvalidRoute` if the route is broken or a hop lost its pool
/// - `InsufficientBalance` if the trader cannot pay
/// - `InsufficientOutput` if any hop yields nothing or the final output is
///   below `min_amount_out`
pub fn execute_route(
    registry: &LiquidityRegistry,
    ledger: &mut TokenLedger,
    trader: Address,
    route: &Route,
    amount_in: u128,
    min_amount_out: u128,
    events: &mut EventLog,
) -> VaultZapResult<SwapReceipt> {
    require_positive(amount_in)?;

    let (source, destination) = match (route.source(), route.destination()) {
        (Some(source), Some(destination)) => (source, destination),
        _ => {
            return Err(VaultZapError::InvalidRoute {
                reason: "empty route cannot be executed",
            })
        }
    };
    validate_route(registry, route, &source, &destination)?;

    let mut staged = ledger.clone();
    let mut staged_events = EventLog::new();
    let mut amount = amount_in;
    let mut pools = Vec::with_capacity(route.hop_count());

    for hop in &route.hops {
        let quote = best_pool_for_hop(registry, &staged, &hop.from, &hop.to, amount)?.ok_or(
            VaultZapError::InvalidRoute {
                reason: "hop has no active pool",
            },
        )?;
        if quote.amount_out == 0 {
            return Err(VaultZapError::InsufficientOutput {
                minimum: min_amount_out.max(1),
                actual: 0,
            });
        }

        staged.transfer(hop.from, trader, quote.pool, amount, &mut staged_events)?;
        staged.transfer(hop.to, quote.pool, trader, quote.amount_out, &mut staged_events)?;
        staged_events.emit(VaultZapEvent::SwapExecuted {
            pool: quote.pool,
            token_in: hop.from,
            token_out: hop.to,
            amount_in: amount,
            amount_out: quote.amount_out,
        });

        amount = quote.amount_out;
        pools.push(quote.pool);
    }

    if amount < min_amount_out {
        return Err(VaultZapError::InsufficientOutput {
            minimum: min_amount_out,
            actual: amount,
        });
    }

    *ledger = staged;
    events.extend(staged_events);

    Ok(SwapReceipt {
        amount_in,
        amount_out: amount,
        pools,
    })
}
