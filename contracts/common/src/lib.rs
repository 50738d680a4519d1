//! vaultzap Common Library
//!
//! Shared types, constants, and utilities for all vaultzap contracts.
//!
//! ## Contents
//!
//! - **Types**: Collateral configuration, vaults, price rounds and swap routes
//! - **Math**: Exact integer issuance arithmetic (debt gross, fee split, solvency)
//! - **Token Operations**: Balance ledger with mint authorization
//! - **Events**: Indexable protocol events collected in an [`EventLog`]
//! - **Traits**: Collaborator interfaces for oracles, collateral and reserves
//! - **Guard**: Reentrancy lock for multi-step operations
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, collections::BTreeSet, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, collections::BTreeSet, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod token_ops;
pub mod traits;
pub mod guard;
pub mod validation;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use token_ops::*;
pub use traits::*;
pub use guard::*;
