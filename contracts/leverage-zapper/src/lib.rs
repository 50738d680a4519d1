//! Leverage Zapper Contract
//!
//! Entry point of the vaultzap protocol. Wires the collateral registry,
//! price oracle, liquidity registry and vault ledger together and exposes
//! one-call leveraged deposits.
//!
//! ## Deposit Paths
//!
//! - **deposit**: pull an ERC20-style collateral from the caller
//! - **deposit_eth**: wrap attached native currency into wrapped-native collateral
//!
//! With `leverage` set, debt is issued against the deposit at the
//! collateral's MCR, the user share is swapped into collateral along the
//! supplied route, and both land in the caller's vault. Every deposit is
//! all-or-nothing and guarded against reentry.

pub mod config;
pub mod zapper;

#[cfg(test)]
mod integration_tests;

pub use config::{validate_slippage, ZapperConfig};
pub use zapper::{DepositOutcome, DepositRequest, LeveragePreview, VaultLeverageZapper};

/// Zapper reading prices from the protocol's feed oracle
pub type FeedZapper = VaultLeverageZapper<vaultzap_price_oracle::FeedOracle>;
