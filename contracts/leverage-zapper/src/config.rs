//! Zapper Deployment Configuration
//!
//! Loaded once at deployment. Derives `serde` so deployments can keep it
//! next to the other contract state.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use vaultzap_common::{
    check,
    constants::slippage::{DEFAULT_MAX_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS},
    errors::{VaultZapError, VaultZapResult},
    types::{Address, TokenId},
    validation::require_valid_address,
};

/// Zapper configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ZapperConfig {
    /// Admin (can tune slippage and forward configuration calls)
    pub admin: Address,
    /// The zapper's own address: debt minter, swap trader, vault orchestrator
    pub address: Address,
    /// Protocol debt token
    pub debt_token: TokenId,
    /// Collateral used for native currency deposits
    pub wrapped_native: TokenId,
    /// Tolerated swap shortfall against oracle fair value
    pub max_slippage_bps: u64,
}

impl ZapperConfig {
    /// Config with the network's default slippage tolerance
    pub fn new(admin: Address, address: Address, debt_token: TokenId, wrapped_native: TokenId) -> Self {
        Self {
            admin,
            address,
            debt_token,
            wrapped_native,
            max_slippage_bps: DEFAULT_MAX_SLIPPAGE_BPS,
        }
    }

    pub fn validate(&self) -> VaultZapResult<()> {
        require_valid_address(self.admin, "admin")?;
        require_valid_address(self.address, "address")?;
        require_valid_address(self.debt_token, "debt_token")?;
        require_valid_address(self.wrapped_native, "wrapped_native")?;
        check!(
            self.debt_token != self.wrapped_native,
            VaultZapError::InvalidParameters {
                param: "wrapped_native",
                reason: "cannot be the debt token",
            }
        );
        validate_slippage(self.max_slippage_bps)
    }
}

/// Slippage tolerance must stay within `MAX_SLIPPAGE_BPS`
pub fn validate_slippage(bps: u64) -> VaultZapResult<()> {
    check!(
        bps <= MAX_SLIPPAGE_BPS,
        VaultZapError::InvalidParameters {
            param: "max_slippage_bps",
            reason: "exceeds 5000",
        }
    );
    Ok(())
}
