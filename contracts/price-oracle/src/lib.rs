//! Price Oracle Contract
//!
//! Holds the latest round of every registered price feed. Feeds report
//! 8-decimal answers and are referenced from collateral configuration by
//! their feed address. A trusted operator submits updates; the admin
//! registers feeds and rotates the operator.
//!
//! Consumers read feeds through [`PriceOracle::latest_round`] and apply
//! their own staleness rules, or call [`FeedOracle::get_price`] for a
//! validated price.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use vaultzap_common::{
    check,
    constants::oracle::{MAX_PRICE_AGE_BLOCKS, MAX_PRICE_DEVIATION_BPS},
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    traits::PriceOracle,
    types::{Address, FeedRound},
    validation::{require_admin, require_valid_address},
    BTreeMap,
};

// ============ Oracle Actions ============

/// Operations accepted by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum OracleAction {
    /// Register a new feed with its first answer (admin only)
    RegisterFeed { feed: Address, initial_price: i128 },
    /// Submit a new answer for a feed (operator only)
    UpdatePrice { feed: Address, price: i128 },
    /// Rotate the operator (admin only)
    SetOperator { operator: Address },
    /// Pause or resume every feed (admin only)
    SetActive { is_active: bool },
}

// ============ Oracle State ============

/// Oracle contract state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FeedOracle {
    /// Latest round per feed
    feeds: BTreeMap<Address, FeedRound>,
    /// Authorized operator (can update prices)
    pub operator: Address,
    /// Admin (can register feeds and change operator)
    pub admin: Address,
    /// Whether feeds are served
    pub is_active: bool,
}

impl FeedOracle {
    /// Create an oracle with no feeds
    pub fn new(admin: Address, operator: Address) -> Self {
        Self {
            feeds: BTreeMap::new(),
            operator,
            admin,
            is_active: true,
        }
    }

    /// Dispatch an action from `signer` at `block_height`
    pub fn apply(
        &mut self,
        signer: Address,
        action: &OracleAction,
        block_height: u64,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        match action {
            OracleAction::RegisterFeed { feed, initial_price } => {
                self.register_feed(signer, *feed, *initial_price, block_height, events)
            }
            OracleAction::UpdatePrice { feed, price } => {
                self.update_price(signer, *feed, *price, block_height, events)
            }
            OracleAction::SetOperator { operator } => self.set_operator(signer, *operator, events),
            OracleAction::SetActive { is_active } => self.set_active(signer, *is_active, events),
        }
    }

    /// Register a feed and record its first answer
    pub fn register_feed(
        &mut self,
        signer: Address,
        feed: Address,
        initial_price: i128,
        block_height: u64,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, signer)?;
        require_valid_address(feed, "feed")?;
        check!(
            !self.feeds.contains_key(&feed),
            VaultZapError::InvalidParameters {
                param: "feed",
                reason: "already registered",
            }
        );
        check!(validate_price_format(initial_price), VaultZapError::ZeroAmount);

        self.feeds.insert(feed, FeedRound::new(initial_price, block_height));

        events.emit(VaultZapEvent::PriceUpdated {
            feed,
            old_price: 0,
            new_price: initial_price,
            block_height,
        });
        Ok(())
    }

    /// Submit a new answer for a registered feed
    pub fn update_price(
        &mut self,
        signer: Address,
        feed: Address,
        new_price: i128,
        block_height: u64,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        // 1. Only operator can update price
        if signer != self.operator {
            return Err(VaultZapError::Unauthorized {
                expected: self.operator,
                actual: signer,
            });
        }

        // 2. Price must be positive
        check!(validate_price_format(new_price), VaultZapError::ZeroAmount);

        // 3. Feed must exist
        let old = self.feeds.get(&feed).copied().ok_or(VaultZapError::InvalidParameters {
            param: "feed",
            reason: "not registered",
        })?;

        // 4. Check price deviation (prevent manipulation)
        let deviation = calculate_price_deviation(old.answer, new_price);
        if deviation > MAX_PRICE_DEVIATION_BPS {
            return Err(VaultZapError::PriceDeviation {
                old_price: old.answer,
                new_price,
                max_deviation_bps: MAX_PRICE_DEVIATION_BPS,
            });
        }

        self.feeds.insert(feed, FeedRound::new(new_price, block_height));

        events.emit(VaultZapEvent::PriceUpdated {
            feed,
            old_price: old.answer,
            new_price,
            block_height,
        });
        Ok(())
    }

    /// Rotate the operator
    pub fn set_operator(
        &mut self,
        signer: Address,
        new_operator: Address,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, signer)?;
        require_valid_address(new_operator, "operator")?;
        check!(
            new_operator != self.operator,
            VaultZapError::InvalidParameters {
                param: "operator",
                reason: "same as current",
            }
        );

        events.emit(VaultZapEvent::OracleOperatorChanged {
            old_operator: self.operator,
            new_operator,
        });
        self.operator = new_operator;
        Ok(())
    }

    /// Pause or resume every feed
    pub fn set_active(&mut self, signer: Address, is_active: bool, events: &mut EventLog) -> VaultZapResult<()> {
        require_admin(self.admin, signer)?;
        if self.is_active != is_active {
            self.is_active = is_active;
            events.emit(VaultZapEvent::OracleStatusChanged { is_active });
        }
        Ok(())
    }

    // ============ Query Functions ============

    /// Validated price of a feed
    ///
    /// # Errors
    /// - `StalePrice` if the feed is unknown, paused, non-positive, or older
    ///   than `MAX_PRICE_AGE_BLOCKS`
    pub fn get_price(&self, feed: &Address, current_block: u64) -> VaultZapResult<u128> {
        let stale = |updated_at| VaultZapError::StalePrice {
            token: *feed,
            updated_at,
            current_block,
        };

        let round = self.latest_round(feed).ok_or_else(|| stale(0))?;
        if round.answer <= 0 || round.is_stale(current_block) {
            return Err(stale(round.updated_at));
        }
        Ok(round.answer as u128)
    }

    /// Check if a feed is fresh (not stale)
    pub fn is_price_fresh(&self, feed: &Address, current_block: u64) -> bool {
        self.get_price(feed, current_block).is_ok()
    }

    /// Number of registered feeds
    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }
}

impl PriceOracle for FeedOracle {
    fn latest_round(&self, feed: &Address) -> Option<FeedRound> {
        if !self.is_active {
            return None;
        }
        self.feeds.get(feed).copied()
    }
}

// ============ Helper Functions ============

/// Calculate price deviation in basis points
///
/// 100 bps = 1%, 10000 bps = 100%
pub fn calculate_price_deviation(old_price: i128, new_price: i128) -> u64 {
    if old_price <= 0 {
        return 10_000; // 100% if no previous price
    }

    let diff = old_price.abs_diff(new_price);
    let deviation = diff.saturating_mul(10_000) / old_price.unsigned_abs();
    deviation.min(u64::MAX as u128) as u64
}

/// Feed answers must be strictly positive
pub fn validate_price_format(price: i128) -> bool {
    price > 0
}

/// Blocks left before a round goes stale, zero once it has
pub fn blocks_until_stale(round: &FeedRound, current_block: u64) -> u64 {
    let age = current_block.saturating_sub(round.updated_at);
    MAX_PRICE_AGE_BLOCKS.saturating_sub(age)
}

// ============ Tests ============
