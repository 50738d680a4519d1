//! Protocol Events for vaultzap
//!
//! Events are emitted during contract execution and can be indexed
//! off-chain for building UIs, analytics, and notifications. A failed
//! operation discards the events it staged together with its state.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, TokenId, VaultId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Configuration Events (0x01 - 0x1F)
    CollateralAdded = 0x01,
    CollateralStatusChanged = 0x02,
    FeeRecipientChanged = 0x03,
    OrchestratorChanged = 0x04,
    SlippageChanged = 0x05,

    // Liquidity Events (0x20 - 0x3F)
    PoolAdded = 0x20,
    PoolStatusChanged = 0x21,
    HubTokenAdded = 0x22,
    SwapExecuted = 0x23,

    // Token Events (0x40 - 0x5F)
    TokenTransfer = 0x40,
    TokenMint = 0x41,

    // Oracle Events (0x60 - 0x7F)
    PriceUpdated = 0x60,
    OracleOperatorChanged = 0x61,
    OracleStatusChanged = 0x62,

    // Vault Events (0x80 - 0x9F)
    VaultOpened = 0x80,
    VaultIncreased = 0x81,
    LeverageDeposit = 0x82,
}

/// Main event enum containing all possible protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum VaultZapEvent {
    // ============ Configuration Events ============

    /// Emitted when a collateral type is registered
    CollateralAdded {
        token: TokenId,
        price_feed: Address,
        mcr: u64,
        mlr: u64,
        issuance_fee: u64,
    },

    /// Emitted when a collateral type is (de)activated
    CollateralStatusChanged { token: TokenId, is_active: bool },

    /// Emitted when the borrow fee recipient changes
    FeeRecipientChanged { old_recipient: Address, new_recipient: Address },

    /// Emitted when the vault ledger's orchestrator changes
    OrchestratorChanged { old_orchestrator: Address, new_orchestrator: Address },

    /// Emitted when the zapper's slippage tolerance changes
    SlippageChanged { old_bps: u64, new_bps: u64 },

    // ============ Liquidity Events ============

    /// Emitted when a pool is registered
    PoolAdded {
        pool: Address,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
    },

    /// Emitted when a pool is (de)activated
    PoolStatusChanged { pool: Address, is_active: bool },

    /// Emitted when a hub token is designated
    HubTokenAdded { token: TokenId },

    /// Emitted for every executed hop
    SwapExecuted {
        pool: Address,
        token_in: TokenId,
        token_out: TokenId,
        amount_in: u128,
        amount_out: u128,
    },

    // ============ Token Events ============

    /// Emitted on token transfer
    TokenTransfer {
        token: TokenId,
        from: Address,
        to: Address,
        amount: u128,
    },

    /// Emitted when tokens are minted
    TokenMint {
        token: TokenId,
        to: Address,
        amount: u128,
        new_total_supply: u128,
    },

    // ============ Oracle Events ============

    /// Emitted when a feed answer is updated
    PriceUpdated {
        feed: Address,
        old_price: i128,
        new_price: i128,
        block_height: u64,
    },

    /// Emitted when the oracle operator changes
    OracleOperatorChanged { old_operator: Address, new_operator: Address },

    /// Emitted when every feed is paused or resumed
    OracleStatusChanged { is_active: bool },

    // ============ Vault Events ============

    /// Emitted when a new vault is opened
    VaultOpened {
        vault_id: VaultId,
        owner: Address,
        collateral_token: TokenId,
        block_height: u64,
    },

    /// Emitted when a vault's collateral or debt grows
    VaultIncreased {
        vault_id: VaultId,
        collateral_delta: u128,
        debt_delta: u128,
        new_collateral: u128,
        new_debt: u128,
        block_height: u64,
    },

    /// Emitted once per completed zapper deposit
    LeverageDeposit {
        vault_id: VaultId,
        owner: Address,
        collateral_token: TokenId,
        amount: u128,
        swap_output: u128,
        debt_gross: u128,
        fee_share: u128,
        user_share: u128,
        block_height: u64,
    },
}

impl VaultZapEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollateralAdded { .. } => EventType::CollateralAdded,
            Self::CollateralStatusChanged { .. } => EventType::CollateralStatusChanged,
            Self::FeeRecipientChanged { .. } => EventType::FeeRecipientChanged,
            Self::OrchestratorChanged { .. } => EventType::OrchestratorChanged,
            Self::SlippageChanged { .. } => EventType::SlippageChanged,
            Self::PoolAdded { .. } => EventType::PoolAdded,
            Self::PoolStatusChanged { .. } => EventType::PoolStatusChanged,
            Self::HubTokenAdded { .. } => EventType::HubTokenAdded,
            Self::SwapExecuted { .. } => EventType::SwapExecuted,
            Self::TokenTransfer { .. } => EventType::TokenTransfer,
            Self::TokenMint { .. } => EventType::TokenMint,
            Self::PriceUpdated { .. } => EventType::PriceUpdated,
            Self::OracleOperatorChanged { .. } => EventType::OracleOperatorChanged,
            Self::OracleStatusChanged { .. } => EventType::OracleStatusChanged,
            Self::VaultOpened { .. } => EventType::VaultOpened,
            Self::VaultIncreased { .. } => EventType::VaultIncreased,
            Self::LeverageDeposit { .. } => EventType::LeverageDeposit,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<VaultZapEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: VaultZapEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[VaultZapEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<VaultZapEvent> {
        self.events
    }

    /// Append every event of another log, preserving order
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&VaultZapEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
