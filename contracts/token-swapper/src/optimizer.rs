//! Route Optimizer
//!
//! Enumerates simple paths of at most `MAX_ROUTE_HOPS` hops between two
//! tokens, quotes each against current reserves, and returns the one with
//! the highest output. Intermediate tokens must be hub tokens when any hub
//! is designated.
//!
//! Selection order: highest output, then fewer hops, then lower combined
//! fee tier, then the lexicographically smaller token path. Paths quoting
//! zero output are never selected. Enumeration walks ordered collections so
//! identical state always yields the identical route.

use core::cmp::Reverse;

use serde::{Deserialize, Serialize};

use vaultzap_common::{
    constants::routing::MAX_ROUTE_HOPS,
    errors::{VaultZapError, VaultZapResult},
    traits::ReserveSource,
    types::{Address, Route, TokenId},
    Vec,
};

use crate::pool::LiquidityRegistry;
use crate::quote::best_pool_for_hop;

/// Simulated route with its expected output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub route: Route,
    /// Output after the last hop at current reserves
    pub expected_out: u128,
    /// Sum of the chosen pools' fee tiers
    pub total_fee_tier: u32,
    /// Pool used for each hop
    pub pools: Vec<Address>,
}

impl RouteQuote {
    fn identity(amount_in: u128) -> Self {
        Self {
            route: Route::identity(),
            expected_out: amount_in,
            total_fee_tier: 0,
            pools: Vec::new(),
        }
    }

    fn ranking(&self) -> (u128, Reverse<usize>, Reverse<u32>, Reverse<Vec<TokenId>>) {
        (
            self.expected_out,
            Reverse(self.route.hop_count()),
            Reverse(self.total_fee_tier),
            Reverse(self.route.token_path()),
        )
    }
}

/// Read-only route search over a registry and a reserve source
pub struct RouteOptimizer<'a, R: ReserveSource + ?Sized> {
    registry: &'a LiquidityRegistry,
    reserves: &'a R,
}

impl<'a, R: ReserveSource + ?Sized> RouteOptimizer<'a, R> {
    pub fn new(registry: &'a LiquidityRegistry, reserves: &'a R) -> Self {
        Self { registry, reserves }
    }

    /// Best route from `token_in` to `token_out` for `amount_in`
    ///
    /// # Errors
    /// - `NoRouteFound` if either token has no active pool, no path connects
    ///   them, or a non-zero `amount_in` yields nothing on every path
    ///
    /// A zero `amount_in` still resolves the connecting route, quoted at zero.
    pub fn calculate_best_route(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_in: u128,
    ) -> VaultZapResult<RouteQuote> {
        if token_in == token_out {
            return Ok(RouteQuote::identity(amount_in));
        }

        let no_route = VaultZapError::NoRouteFound {
            token_in: *token_in,
            token_out: *token_out,
        };
        if !self.registry.has_active_pool(token_in) || !self.registry.has_active_pool(token_out) {
            return Err(no_route);
        }

        let mut best: Option<RouteQuote> = None;
        for path in self.candidate_paths(token_in, token_out) {
            let Some(quote) = self.simulate_path(&path, amount_in)? else {
                continue;
            };
            if quote.expected_out == 0 && amount_in > 0 {
                continue;
            }
            best = match best {
                Some(current) if current.ranking() >= quote.ranking() => Some(current),
                _ => Some(quote),
            };
        }

        best.ok_or(no_route)
    }

    /// Validate a supplied route and simulate it
    ///
    /// Output may be zero; callers apply their own minimum.
    pub fn quote_route(&self, route: &Route, amount_in: u128) -> VaultZapResult<RouteQuote> {
        if route.is_identity() {
            return Ok(RouteQuote::identity(amount_in));
        }
        validate_hops(self.registry, route)?;

        self.simulate_path(&route.token_path(), amount_in)?
            .ok_or(VaultZapError::InvalidRoute {
                reason: "hop has no active pool",
            })
    }

    /// Check a supplied route against the expected endpoints
    pub fn validate_route(&self, route: &Route, from: &TokenId, to: &TokenId) -> VaultZapResult<()> {
        validate_route(self.registry, route, from, to)
    }

    /// Simple paths from `from` to `to` with routable intermediates
    pub fn candidate_paths(&self, from: &TokenId, to: &TokenId) -> Vec<Vec<TokenId>> {
        let mut paths = Vec::new();
        let mut path = vec![*from];
        self.extend_paths(to, &mut path, &mut paths);
        paths
    }

    fn extend_paths(&self, to: &TokenId, path: &mut Vec<TokenId>, paths: &mut Vec<Vec<TokenId>>) {
        if path.len() > MAX_ROUTE_HOPS {
            return;
        }
        let current = match path.last() {
            Some(token) => *token,
            None => return,
        };

        for next in self.registry.neighbors(&current) {
            if path.contains(&next) {
                continue;
            }
            if next == *to {
                let mut found = path.clone();
                found.push(next);
                paths.push(found);
                continue;
            }
            if !self.registry.is_routable_intermediate(&next) {
                continue;
            }
            path.push(next);
            self.extend_paths(to, path, paths);
            path.pop();
        }
    }

    /// Quote a token path hop by hop; `None` if a hop has no active pool
    fn simulate_path(&self, path: &[TokenId], amount_in: u128) -> VaultZapResult<Option<RouteQuote>> {
        let mut amount = amount_in;
        let mut total_fee_tier = 0u32;
        let mut pools = Vec::with_capacity(path.len().saturating_sub(1));

        for pair in path.windows(2) {
            let Some(hop) = best_pool_for_hop(self.registry, self.reserves, &pair[0], &pair[1], amount)? else {
                return Ok(None);
            };
            amount = hop.amount_out;
            total_fee_tier = total_fee_tier.saturating_add(hop.fee_tier);
            pools.push(hop.pool);
        }

        Ok(Some(RouteQuote {
            route: Route::from_path(path),
            expected_out: amount,
            total_fee_tier,
            pools,
        }))
    }
}

/// Check a route's endpoints, continuity, length and pool coverage
///
/// The empty route is valid only when `from == to`.
pub fn validate_route(
    registry: &LiquidityRegistry,
    route: &Route,
    from: &TokenId,
    to: &TokenId,
) -> VaultZapResult<()> {
    if route.is_identity() {
        if from == to {
            return Ok(());
        }
        return Err(VaultZapError::InvalidRoute {
            reason: "empty route between different tokens",
        });
    }
    if route.source() != Some(*from) {
        return Err(VaultZapError::InvalidRoute {
            reason: "route does not start at source token",
        });
    }
    if route.destination() != Some(*to) {
        return Err(VaultZapError::InvalidRoute {
            reason: "route does not end at destination token",
        });
    }
    validate_hops(registry, route)
}

fn validate_hops(registry: &LiquidityRegistry, route: &Route) -> VaultZapResult<()> {
    if route.hop_count() > MAX_ROUTE_HOPS {
        return Err(VaultZapError::InvalidRoute { reason: "too many hops" });
    }
    if !route.is_continuous() {
        return Err(VaultZapError::InvalidRoute {
            reason: "hops are not continuous",
        });
    }
    for hop in &route.hops {
        if hop.from == hop.to {
            return Err(VaultZapError::InvalidRoute {
                reason: "hop swaps a token for itself",
            });
        }
        if registry.active_pools_for_pair(&hop.from, &hop.to).is_empty() {
            return Err(VaultZapError::InvalidRoute {
                reason: "hop has no active pool",
            });
        }
    }
    Ok(())
}
