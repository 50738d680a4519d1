//! Token Operations Module
//!
//! Balance ledger for every token the protocol touches: collateral tokens,
//! the debt token, wrapped native currency, and the native currency itself.
//! Pool reserves are ordinary balances held by pool addresses.
//!
//! ## Key Features
//!
//! - **Mint Authorization**: Only the registered minter of a token can mint
//! - **Conservation**: Transfers never create or destroy balance
//! - **Supply Tracking**: Total supply per token follows mints and native wraps

use crate::BTreeMap;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::ids::{NATIVE_TOKEN, ZERO_ADDRESS};
use crate::errors::{VaultZapError, VaultZapResult};
use crate::events::{EventLog, VaultZapEvent};
use crate::traits::ReserveSource;
use crate::types::{Address, TokenId};

/// Token balances, supplies and mint authorities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenLedger {
    balances: BTreeMap<(TokenId, Address), u128>,
    supplies: BTreeMap<TokenId, u128>,
    minters: BTreeMap<TokenId, Address>,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `owner` in `token`
    pub fn balance_of(&self, token: &TokenId, owner: &Address) -> u128 {
        self.balances.get(&(*token, *owner)).copied().unwrap_or(0)
    }

    /// Total supply of `token`
    pub fn total_supply(&self, token: &TokenId) -> u128 {
        self.supplies.get(token).copied().unwrap_or(0)
    }

    /// Registered minter of `token`, if any
    pub fn minter_of(&self, token: &TokenId) -> Option<Address> {
        self.minters.get(token).copied()
    }

    /// Register the only address allowed to mint `token`
    pub fn set_minter(&mut self, token: TokenId, minter: Address) -> VaultZapResult<()> {
        if minter == ZERO_ADDRESS {
            return Err(VaultZapError::InvalidParameters {
                param: "minter",
                reason: "cannot be zero address",
            });
        }
        self.minters.insert(token, minter);
        Ok(())
    }

    /// Bridge in a balance of an externally issued token
    ///
    /// Used for genesis allocations and for tokens whose issuance lives
    /// outside this ledger. Fails for tokens that have a registered minter.
    pub fn credit_external(&mut self, token: TokenId, to: Address, amount: u128) -> VaultZapResult<()> {
        if let Some(minter) = self.minter_of(&token) {
            return Err(VaultZapError::Unauthorized {
                expected: minter,
                actual: ZERO_ADDRESS,
            });
        }
        self.increase(token, to, amount)?;
        let supply = self.total_supply(&token).checked_add(amount).ok_or(VaultZapError::ArithmeticOverflow)?;
        self.supplies.insert(token, supply);
        Ok(())
    }

    /// Move `amount` of `token` between two holders
    pub fn transfer(
        &mut self,
        token: TokenId,
        from: Address,
        to: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        if amount == 0 {
            return Err(VaultZapError::ZeroAmount);
        }
        if to == ZERO_ADDRESS {
            return Err(VaultZapError::InvalidParameters {
                param: "to",
                reason: "cannot be zero address",
            });
        }

        self.decrease(token, from, amount)?;
        self.increase(token, to, amount)?;

        events.emit(VaultZapEvent::TokenTransfer {
            token,
            from,
            to,
            amount,
        });
        Ok(())
    }

    /// Mint new supply (registered minter only)
    pub fn mint(
        &mut self,
        caller: Address,
        token: TokenId,
        to: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        if amount == 0 {
            return Err(VaultZapError::ZeroAmount);
        }
        self.require_minter(&token, caller)?;

        let new_supply = self
            .total_supply(&token)
            .checked_add(amount)
            .ok_or(VaultZapError::ArithmeticOverflow)?;
        self.increase(token, to, amount)?;
        self.supplies.insert(token, new_supply);

        events.emit(VaultZapEvent::TokenMint {
            token,
            to,
            amount,
            new_total_supply: new_supply,
        });
        Ok(())
    }

    /// Lock native currency in the `wrapped` token and credit it 1:1
    ///
    /// The wrapped token's address holds the locked native balance, so its
    /// supply stays fully backed.
    pub fn wrap_native(
        &mut self,
        wrapped: TokenId,
        holder: Address,
        amount: u128,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        if amount == 0 {
            return Err(VaultZapError::ZeroAmount);
        }
        self.decrease(NATIVE_TOKEN, holder, amount)?;
        self.increase(NATIVE_TOKEN, wrapped, amount)?;
        events.emit(VaultZapEvent::TokenTransfer {
            token: NATIVE_TOKEN,
            from: holder,
            to: wrapped,
            amount,
        });

        let new_supply = self
            .total_supply(&wrapped)
            .checked_add(amount)
            .ok_or(VaultZapError::ArithmeticOverflow)?;
        self.increase(wrapped, holder, amount)?;
        self.supplies.insert(wrapped, new_supply);
        events.emit(VaultZapEvent::TokenMint {
            token: wrapped,
            to: holder,
            amount,
            new_total_supply: new_supply,
        });
        Ok(())
    }

    fn require_minter(&self, token: &TokenId, caller: Address) -> VaultZapResult<()> {
        match self.minter_of(token) {
            Some(minter) if minter == caller => Ok(()),
            Some(minter) => Err(VaultZapError::Unauthorized {
                expected: minter,
                actual: caller,
            }),
            None => Err(VaultZapError::Unauthorized {
                expected: ZERO_ADDRESS,
                actual: caller,
            }),
        }
    }

    fn increase(&mut self, token: TokenId, owner: Address, amount: u128) -> VaultZapResult<()> {
        let entry = self.balances.entry((token, owner)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(VaultZapError::ArithmeticOverflow)?;
        Ok(())
    }

    fn decrease(&mut self, token: TokenId, owner: Address, amount: u128) -> VaultZapResult<()> {
        let available = self.balance_of(&token, &owner);
        if available < amount {
            return Err(VaultZapError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&(token, owner));
        } else {
            self.balances.insert((token, owner), remaining);
        }
        Ok(())
    }
}

impl ReserveSource for TokenLedger {
    fn reserve_of(&self, holder: &Address, token: &TokenId) -> u128 {
        self.balance_of(token, holder)
    }
}
