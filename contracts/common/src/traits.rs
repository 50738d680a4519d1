//! Collaborator Interfaces
//!
//! Fixed capability traits for the external systems the protocol reads
//! from. Each has a minimal method set so tests can substitute mocks.

use crate::errors::VaultZapResult;
use crate::types::{Address, CollateralConfig, FeedRound, TokenId};

/// Source of price feed answers, keyed by feed reference
pub trait PriceOracle {
    /// Latest round of `feed`, or `None` if the feed is unknown
    fn latest_round(&self, feed: &Address) -> Option<FeedRound>;
}

/// Read access to collateral configuration and validated prices
pub trait CollateralSource {
    /// Configuration of a registered collateral token
    fn collateral_info(&self, token: &TokenId) -> VaultZapResult<CollateralConfig>;

    /// Validated 8-decimal price of an active collateral token
    fn token_price(&self, token: &TokenId, current_block: u64) -> VaultZapResult<u128>;
}

/// Read access to pool reserves
pub trait ReserveSource {
    /// Amount of `token` held by `holder`
    fn reserve_of(&self, holder: &Address, token: &TokenId) -> u128;
}

impl<T: PriceOracle + ?Sized> PriceOracle for &T {
    fn latest_round(&self, feed: &Address) -> Option<FeedRound> {
        (**self).latest_round(feed)
    }
}
