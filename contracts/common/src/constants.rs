//! Protocol Constants
//!
//! All magic numbers and configuration values for the vaultzap protocol.
//! Precision constants are part of the external interface: prices are quoted
//! with 8 decimals, issuance fees and pool fee tiers with 6 decimals, and
//! collateral ratios as whole percentages.
//!
//! # Network Configuration
//!
//! Use feature flags to compile for different networks:
//! - `mainnet` - Production values (tighter slippage, shorter price age)
//! - Default (no feature) - Testnet values (looser guards for forked testing)
//!
//! ```toml
//! # For mainnet deployment:
//! vaultzap-common = { path = "...", features = ["mainnet"] }
//! ```

/// Debt token metadata
pub mod token {
    /// Decimal places of the protocol debt token
    pub const DEBT_DECIMALS: u8 = 18;
    /// One debt token in base units
    pub const ONE: u128 = 1_000_000_000_000_000_000;
    /// Largest supported collateral decimals (keeps 10^d inside u128)
    pub const MAX_DECIMALS: u8 = 36;
}

/// Precision constants
pub mod precision {
    /// Price feeds report 8-decimal fixed point values
    pub const PRICE_PRECISION: u128 = 100_000_000;

    /// Issuance fee precision (100 = 0.01%)
    pub const ISSUANCE_FEE_PRECISION: u128 = 1_000_000;

    /// Pool fee tier precision (500 = 0.05%)
    pub const FEE_TIER_PRECISION: u128 = 1_000_000;

    /// Percentage precision (100 = 100%)
    pub const PERCENT_PRECISION: u128 = 100;

    /// Basis points denominator
    pub const BPS_DENOMINATOR: u128 = 10_000;
}

/// Collateralization ratio bounds (whole percentages)
pub mod ratios {
    /// MCR must be strictly greater than this
    pub const MIN_MCR_EXCLUSIVE: u64 = 100;
}

/// Oracle Configuration
pub mod oracle {
    /// Maximum feed age in blocks before a price is considered stale
    /// - Mainnet: 1,800 blocks (~1 hour on a 2s chain)
    /// - Testnet: 43,200 blocks (forked chains freeze feed updates)
    #[cfg(feature = "mainnet")]
    pub const MAX_PRICE_AGE_BLOCKS: u64 = 1_800;
    #[cfg(not(feature = "mainnet"))]
    pub const MAX_PRICE_AGE_BLOCKS: u64 = 43_200;

    /// Maximum allowed price deviation per operator update (20%)
    pub const MAX_PRICE_DEVIATION_BPS: u64 = 2_000;
}

/// Routing Configuration
pub mod routing {
    /// Longest route the optimizer will consider
    pub const MAX_ROUTE_HOPS: usize = 3;

    /// Maximum number of designated hub tokens
    pub const MAX_HUB_TOKENS: usize = 8;

    /// Largest accepted fee tier (exclusive of 100%)
    pub const MAX_FEE_TIER: u32 = 999_999;
}

/// Slippage Configuration
pub mod slippage {
    /// Default tolerated shortfall against oracle fair value
    /// - Mainnet: 1%
    /// - Testnet: 5% (forked pools drift from feeds)
    #[cfg(feature = "mainnet")]
    pub const DEFAULT_MAX_SLIPPAGE_BPS: u64 = 100;
    #[cfg(not(feature = "mainnet"))]
    pub const DEFAULT_MAX_SLIPPAGE_BPS: u64 = 500;

    /// Upper bound for a configured slippage tolerance (50%)
    pub const MAX_SLIPPAGE_BPS: u64 = 5_000;
}

/// Vault limits
pub mod limits {
    /// Maximum vaults a single owner can hold
    pub const MAX_VAULTS_PER_OWNER: usize = 100;
}

/// Well-known identifiers
pub mod ids {
    use crate::types::Address;

    /// Zero address (never a valid owner or recipient)
    pub const ZERO_ADDRESS: Address = [0u8; 32];

    /// Pseudo-token used for native currency balances
    pub const NATIVE_TOKEN: Address = [0xEE; 32];
}
