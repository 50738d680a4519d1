//! Liquidity Registry
//!
//! Registered pools keyed by a deterministic address derived from the
//! ordered token pair and fee tier. A pool is an undirected edge; several
//! fee tiers may exist for the same pair. Hub tokens restrict which tokens
//! may appear in the middle of a multi-hop route.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vaultzap_common::{
    check,
    constants::routing::{MAX_FEE_TIER, MAX_HUB_TOKENS},
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    types::{Address, TokenId},
    validation::{require_admin, require_valid_address},
    BTreeMap, BTreeSet, Vec,
};

/// A liquidity pool between two tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Pool {
    /// Pool address, holder of the reserves
    pub address: Address,
    /// Lower token of the ordered pair
    pub token_a: TokenId,
    /// Higher token of the ordered pair
    pub token_b: TokenId,
    /// Swap fee in 1e6 units (500 = 0.05%)
    pub fee_tier: u32,
    /// Whether the pool is used for routing
    pub is_active: bool,
}

impl Pool {
    /// Whether this pool trades `token`
    pub fn contains(&self, token: &TokenId) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    /// The other side of the pair, if `token` is in this pool
    pub fn other(&self, token: &TokenId) -> Option<TokenId> {
        if self.token_a == *token {
            Some(self.token_b)
        } else if self.token_b == *token {
            Some(self.token_a)
        } else {
            None
        }
    }
}

/// Order tokens consistently
pub fn order_tokens(a: TokenId, b: TokenId) -> (TokenId, TokenId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Deterministic pool address for a pair and fee tier
///
/// Independent of argument order.
pub fn pool_address(token_a: &TokenId, token_b: &TokenId, fee_tier: u32) -> Address {
    let (low, high) = order_tokens(*token_a, *token_b);
    let mut hasher = Sha256::new();
    hasher.update(b"vaultzap-pool");
    hasher.update(low);
    hasher.update(high);
    hasher.update(fee_tier.to_le_bytes());
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Pool and hub token registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LiquidityRegistry {
    /// Admin (can register pools and hubs)
    pub admin: Address,
    /// Pools by address
    pools: BTreeMap<Address, Pool>,
    /// Pool addresses by ordered pair
    pairs: BTreeMap<(TokenId, TokenId), BTreeSet<Address>>,
    /// Designated intermediate tokens
    hubs: BTreeSet<TokenId>,
}

impl LiquidityRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            ..Self::default()
        }
    }

    // ============ Configuration ============

    /// Register a pool for a pair at a fee tier
    ///
    /// Returns the pool address. The pool starts active and empty; reserves
    /// are whatever balances the pool address holds.
    pub fn add_pool(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
        events: &mut EventLog,
    ) -> VaultZapResult<Address> {
        require_admin(self.admin, caller)?;
        require_valid_address(token_a, "token_a")?;
        require_valid_address(token_b, "token_b")?;
        check!(
            token_a != token_b,
            VaultZapError::InvalidParameters {
                param: "token_b",
                reason: "pool tokens must differ",
            }
        );
        check!(
            fee_tier <= MAX_FEE_TIER,
            VaultZapError::InvalidParameters {
                param: "fee_tier",
                reason: "must be below 1e6",
            }
        );

        let (low, high) = order_tokens(token_a, token_b);
        let address = pool_address(&low, &high, fee_tier);
        check!(
            !self.pools.contains_key(&address),
            VaultZapError::DuplicatePool {
                token_a: low,
                token_b: high,
                fee_tier,
            }
        );

        self.pools.insert(
            address,
            Pool {
                address,
                token_a: low,
                token_b: high,
                fee_tier,
                is_active: true,
            },
        );
        self.pairs.entry((low, high)).or_default().insert(address);

        events.emit(VaultZapEvent::PoolAdded {
            pool: address,
            token_a: low,
            token_b: high,
            fee_tier,
        });
        Ok(address)
    }

    /// Activate or deactivate a pool
    pub fn set_pool_active(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
        is_active: bool,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        let address = pool_address(&token_a, &token_b, fee_tier);
        let pool = self
            .pools
            .get_mut(&address)
            .ok_or(VaultZapError::PoolNotFound { token_a, token_b })?;

        if pool.is_active != is_active {
            pool.is_active = is_active;
            events.emit(VaultZapEvent::PoolStatusChanged { pool: address, is_active });
        }
        Ok(())
    }

    /// Designate a token as routing hub
    pub fn add_hub_token(&mut self, caller: Address, token: TokenId, events: &mut EventLog) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        require_valid_address(token, "token")?;
        check!(
            !self.hubs.contains(&token),
            VaultZapError::InvalidParameters {
                param: "token",
                reason: "already a hub",
            }
        );
        check!(
            self.hubs.len() < MAX_HUB_TOKENS,
            VaultZapError::InvalidParameters {
                param: "token",
                reason: "hub limit reached",
            }
        );

        self.hubs.insert(token);
        events.emit(VaultZapEvent::HubTokenAdded { token });
        Ok(())
    }

    // ============ Queries ============

    /// Pool by address
    pub fn pool(&self, address: &Address) -> Option<&Pool> {
        self.pools.get(address)
    }

    /// Pool by pair and fee tier
    pub fn pool_for(&self, token_a: &TokenId, token_b: &TokenId, fee_tier: u32) -> Option<&Pool> {
        self.pools.get(&pool_address(token_a, token_b, fee_tier))
    }

    /// Active pools on a pair, in address order
    pub fn active_pools_for_pair(&self, token_a: &TokenId, token_b: &TokenId) -> Vec<&Pool> {
        let key = order_tokens(*token_a, *token_b);
        self.pairs
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|address| self.pools.get(address))
            .filter(|pool| pool.is_active)
            .collect()
    }

    /// Whether at least one active pool trades `token`
    pub fn has_active_pool(&self, token: &TokenId) -> bool {
        self.pools.values().any(|pool| pool.is_active && pool.contains(token))
    }

    /// Tokens reachable from `token` through one active pool, sorted
    pub fn neighbors(&self, token: &TokenId) -> BTreeSet<TokenId> {
        self.pools
            .values()
            .filter(|pool| pool.is_active)
            .filter_map(|pool| pool.other(token))
            .collect()
    }

    /// Every token with active pool membership, sorted
    pub fn active_tokens(&self) -> BTreeSet<TokenId> {
        self.pools
            .values()
            .filter(|pool| pool.is_active)
            .flat_map(|pool| [pool.token_a, pool.token_b])
            .collect()
    }

    /// Designated hub tokens, sorted
    pub fn hub_tokens(&self) -> &BTreeSet<TokenId> {
        &self.hubs
    }

    /// Whether `token` may appear in the middle of a route
    ///
    /// With no hub designated every token qualifies.
    pub fn is_routable_intermediate(&self, token: &TokenId) -> bool {
        self.hubs.is_empty() || self.hubs.contains(token)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}
