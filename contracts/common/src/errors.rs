//! Error Types for the vaultzap Protocol
//!
//! Typed errors give callers a specific failure reason. Every error aborts
//! the surrounding operation as a whole; nothing is retried internally.

use core::fmt;

use crate::types::{Address, TokenId, VaultId};

/// Result type alias for vaultzap operations
pub type VaultZapResult<T> = Result<T, VaultZapError>;

/// Main error enum for all vaultzap protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultZapError {
    // ============ Routing Errors ============
    /// Supplied route has a broken hop chain or wrong endpoints
    InvalidRoute { reason: &'static str },

    /// No candidate path connects the two tokens
    NoRouteFound { token_in: TokenId, token_out: TokenId },

    /// No pool registered for a hop
    PoolNotFound { token_a: TokenId, token_b: TokenId },

    /// Pool with the same pair and fee tier already registered
    DuplicatePool { token_a: TokenId, token_b: TokenId, fee_tier: u32 },

    /// Realized swap output below the acceptable bound
    InsufficientOutput { minimum: u128, actual: u128 },

    // ============ Collateral Errors ============
    /// Token was never registered as collateral
    UnknownCollateral { token: TokenId },

    /// Collateral is registered but deactivated
    InactiveCollateral { token: TokenId },

    /// Collateral already registered
    DuplicateCollateral { token: TokenId },

    /// Price feed missing, non-positive, or expired
    StalePrice {
        token: TokenId,
        updated_at: u64,
        current_block: u64,
    },

    /// Operator update moves the price further than allowed in one step
    PriceDeviation {
        old_price: i128,
        new_price: i128,
        max_deviation_bps: u64,
    },

    // ============ Vault Errors ============
    /// Vault not found with given ID
    VaultNotFound { vault_id: VaultId },

    /// Vault would fall below its minimum collateralization ratio
    Undercollateralized { debt: u128, max_debt: u128 },

    // ============ Authorization Errors ============
    /// Caller is not authorized for this operation
    Unauthorized { expected: Address, actual: Address },

    /// Nested entry into a locked operation
    Reentrancy,

    // ============ Amount Errors ============
    /// Zero amount not allowed
    ZeroAmount,

    /// Insufficient balance for operation
    InsufficientBalance { available: u128, requested: u128 },

    // ============ Input Validation Errors ============
    /// Invalid configuration or call parameter
    InvalidParameters { param: &'static str, reason: &'static str },

    /// Route or state could not be encoded or decoded
    EncodingFailed,

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    ArithmeticOverflow,

    /// Division by zero
    DivisionByZero,
}

impl VaultZapError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRoute { .. } => "E001_INVALID_ROUTE",
            Self::NoRouteFound { .. } => "E002_NO_ROUTE",
            Self::PoolNotFound { .. } => "E003_POOL_NOT_FOUND",
            Self::DuplicatePool { .. } => "E004_DUPLICATE_POOL",
            Self::InsufficientOutput { .. } => "E005_INSUFFICIENT_OUTPUT",
            Self::UnknownCollateral { .. } => "E010_UNKNOWN_COLLATERAL",
            Self::InactiveCollateral { .. } => "E011_INACTIVE_COLLATERAL",
            Self::DuplicateCollateral { .. } => "E012_DUPLICATE_COLLATERAL",
            Self::StalePrice { .. } => "E013_STALE_PRICE",
            Self::PriceDeviation { .. } => "E014_PRICE_DEVIATION",
            Self::VaultNotFound { .. } => "E020_VAULT_NOT_FOUND",
            Self::Undercollateralized { .. } => "E021_UNDERCOLLATERALIZED",
            Self::Unauthorized { .. } => "E030_UNAUTHORIZED",
            Self::Reentrancy => "E031_REENTRANCY",
            Self::ZeroAmount => "E040_ZERO_AMOUNT",
            Self::InsufficientBalance { .. } => "E041_INSUFFICIENT_BALANCE",
            Self::InvalidParameters { .. } => "E050_INVALID_PARAMETERS",
            Self::EncodingFailed => "E051_ENCODING_FAILED",
            Self::ArithmeticOverflow => "E060_OVERFLOW",
            Self::DivisionByZero => "E061_DIV_ZERO",
        }
    }

    /// Returns true if the caller can resubmit after fixing inputs or waiting
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::StalePrice { .. } => true,          // Wait for feed update
            Self::InsufficientOutput { .. } => true,  // Recompute route
            Self::InsufficientBalance { .. } => true, // Get more funds
            Self::InvalidRoute { .. } => true,        // Resubmit a fresh route
            _ => false,
        }
    }
}

impl fmt::Display for VaultZapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoute { reason } => write!(f, "{}: {}", self.code(), reason),
            Self::InsufficientOutput { minimum, actual } => {
                write!(f, "{}: got {} below minimum {}", self.code(), actual, minimum)
            }
            Self::Undercollateralized { debt, max_debt } => {
                write!(f, "{}: debt {} exceeds {}", self.code(), debt, max_debt)
            }
            Self::InsufficientBalance { available, requested } => {
                write!(f, "{}: requested {} of {}", self.code(), requested, available)
            }
            Self::InvalidParameters { param, reason } => {
                write!(f, "{}: {} {}", self.code(), param, reason)
            }
            _ => f.write_str(self.code()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VaultZapError {}
