//! Core Types for the vaultzap Protocol
//!
//! This module defines the data structures shared by every contract crate:
//! collateral configuration, vault state, price feed rounds and swap routes.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for token identifiers
pub type TokenId = [u8; 32];

/// Type alias for vault identifiers
pub type VaultId = [u8; 32];

// ============ Collateral Types ============

/// Per-collateral risk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CollateralConfig {
    /// Collateral token
    pub token: TokenId,
    /// Price feed reference resolved by the oracle
    pub price_feed: Address,
    /// Minimum collateralization ratio at issuance (110 = 110%)
    pub mcr: u64,
    /// Maintenance ratio consumed by liquidation logic
    pub mlr: u64,
    /// Issuance fee in 1e6 units (100 = 0.01%)
    pub issuance_fee: u64,
    /// Token decimals
    pub decimals: u8,
    /// Whether deposits are accepted
    pub is_active: bool,
}

/// One answer reported by a price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeedRound {
    /// Price with 8 decimals; non-positive answers are invalid
    pub answer: i128,
    /// Block height of the update
    pub updated_at: u64,
}

impl FeedRound {
    /// Creates a new round
    pub fn new(answer: i128, updated_at: u64) -> Self {
        Self { answer, updated_at }
    }

    /// Checks if the round is too old relative to `current_block`
    pub fn is_stale(&self, current_block: u64) -> bool {
        current_block.saturating_sub(self.updated_at) > crate::constants::oracle::MAX_PRICE_AGE_BLOCKS
    }
}

// ============ Vault Types ============

/// Individual vault state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Vault {
    /// Unique identifier for this vault
    pub id: VaultId,
    /// Owner's address
    pub owner: Address,
    /// Collateral token held by this vault
    pub collateral_token: TokenId,
    /// Collateral amount in token base units
    pub total_collateral: u128,
    /// Debt amount in debt token base units
    pub debt_amount: u128,
    /// Block height when vault was created
    pub created_at: u64,
    /// Last modification block height
    pub last_updated: u64,
}

impl Vault {
    /// Creates an empty vault
    pub fn new(id: VaultId, owner: Address, collateral_token: TokenId, block_height: u64) -> Self {
        Self {
            id,
            owner,
            collateral_token,
            total_collateral: 0,
            debt_amount: 0,
            created_at: block_height,
            last_updated: block_height,
        }
    }
}

// ============ Route Types ============

/// A directed traversal of one pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Hop {
    pub from: TokenId,
    pub to: TokenId,
}

impl Hop {
    pub fn new(from: TokenId, to: TokenId) -> Self {
        Self { from, to }
    }
}

/// Ordered sequence of hops
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Route {
    pub hops: Vec<Hop>,
}

impl Route {
    /// The empty route, valid only when source equals destination
    pub fn identity() -> Self {
        Self { hops: Vec::new() }
    }

    /// Builds a route from the token path `[t0, t1, ..., tn]`
    pub fn from_path(path: &[TokenId]) -> Self {
        let hops = path.windows(2).map(|w| Hop::new(w[0], w[1])).collect();
        Self { hops }
    }

    pub fn is_identity(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Source token, if any hop exists
    pub fn source(&self) -> Option<TokenId> {
        self.hops.first().map(|h| h.from)
    }

    /// Destination token, if any hop exists
    pub fn destination(&self) -> Option<TokenId> {
        self.hops.last().map(|h| h.to)
    }

    /// Each hop's output token is the next hop's input token
    pub fn is_continuous(&self) -> bool {
        self.hops.windows(2).all(|w| w[0].to == w[1].from)
    }

    /// Token path visited by this route (empty for the identity route)
    pub fn token_path(&self) -> Vec<TokenId> {
        let mut path = Vec::with_capacity(self.hops.len() + 1);
        if let Some(first) = self.hops.first() {
            path.push(first.from);
        }
        path.extend(self.hops.iter().map(|h| h.to));
        path
    }

    /// Deterministic digest of the route, used to compare a simulated route
    /// with the one submitted for execution
    ///
    /// Hashes the hop count and every hop's raw token ids, so no encoding
    /// step can fail.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"vaultzap-route");
        hasher.update((self.hops.len() as u64).to_le_bytes());
        for hop in &self.hops {
            hasher.update(hop.from);
            hasher.update(hop.to);
        }
        let result = hasher.finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(&result);
        id
    }
}

/// Collateral source for a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum DepositAsset {
    /// ERC20-style collateral pulled from the caller
    Token(TokenId),
    /// Native currency attached to the call, wrapped on entry
    Native,
}
