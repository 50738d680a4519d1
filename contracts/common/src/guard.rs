//! Reentrancy Lock
//!
//! Covers a whole multi-step operation. A nested `enter` while the lock is
//! held fails with [`VaultZapError::Reentrancy`].

use crate::errors::{VaultZapError, VaultZapResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReentrancyLock {
    entered: bool,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock
    pub fn enter(&mut self) -> VaultZapResult<()> {
        if self.entered {
            return Err(VaultZapError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    /// Release the lock
    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}
