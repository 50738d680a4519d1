//! Validation Helpers for vaultzap
//!
//! Reusable guards shared by the registry, swapper, vault ledger and zapper.
//!
//! ```rust,ignore
//! use vaultzap_common::validation::{check, require_positive};
//!
//! check!(amount > 0, VaultZapError::ZeroAmount);
//! require_admin(self.admin, caller)?;
//! ```

use crate::constants::ids::ZERO_ADDRESS;
use crate::errors::{VaultZapError, VaultZapResult};
use crate::types::Address;

// ============ Validation Macro ============

/// Return `Err($error)` from the enclosing function when `$condition` is false.
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use crate::check;

// ============ Common Validation Helpers ============

/// Require an amount to be non-zero.
pub fn require_positive(amount: u128) -> VaultZapResult<()> {
    if amount == 0 {
        return Err(VaultZapError::ZeroAmount);
    }
    Ok(())
}

/// Require the caller to be the admin.
pub fn require_admin(admin: Address, caller: Address) -> VaultZapResult<()> {
    if admin != caller {
        return Err(VaultZapError::Unauthorized {
            expected: admin,
            actual: caller,
        });
    }
    Ok(())
}

/// Require address to not be zero.
pub fn require_valid_address(address: Address, param: &'static str) -> VaultZapResult<()> {
    if address == ZERO_ADDRESS {
        return Err(VaultZapError::InvalidParameters {
            param,
            reason: "cannot be zero address",
        });
    }
    Ok(())
}

/// Debt issuance conservation: everything minted is either fee or user share.
pub fn issuance_balanced(minted: u128, fee_share: u128, user_share: u128) -> VaultZapResult<()> {
    let distributed = fee_share
        .checked_add(user_share)
        .ok_or(VaultZapError::ArithmeticOverflow)?;
    if distributed != minted {
        return Err(VaultZapError::InvalidParameters {
            param: "issuance",
            reason: "fee and user shares do not add up to minted debt",
        });
    }
    Ok(())
}
