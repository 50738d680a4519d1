//! Vault Manager - Vault Ledger for vaultzap
//!
//! Records collateralized debt positions. Each owner holds at most one
//! vault per collateral token; later deposits increase it. Only the
//! designated orchestrator (the leverage zapper) may open or grow vaults.
//!
//! ## Solvency
//!
//! Every mutation that leaves debt on a vault re-reads the collateral price
//! and checks
//!
//! ```text
//! debt × mcr × 1e8 ≤ normalized(collateral) × price × 100
//! ```
//!
//! The ledger only does accounting. Collateral tokens are held by the
//! ledger's custody address, moved there by the orchestrator.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vaultzap_common::{
    check,
    constants::limits::MAX_VAULTS_PER_OWNER,
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    math::{max_debt_for_collateral, normalize_to_debt_decimals, safe_add},
    traits::CollateralSource,
    types::{Address, TokenId, Vault, VaultId},
    validation::{require_admin, require_valid_address},
    BTreeMap, Vec,
};

// ============ Vault Ledger State ============

/// Vault ledger state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultLedger {
    /// Admin (can change the orchestrator)
    pub admin: Address,
    /// Only caller allowed to open or increase vaults
    orchestrator: Address,
    /// Address holding every vault's collateral
    custody: Address,
    /// Vaults by id
    vaults: BTreeMap<VaultId, Vault>,
    /// Vault ids per owner, in creation order
    owner_vaults: BTreeMap<Address, Vec<VaultId>>,
    /// Monotonic counter mixed into vault ids
    nonce: u64,
}

impl VaultLedger {
    /// Creates an empty ledger.
    ///
    /// # Errors
    /// Returns `InvalidParameters` if any address is zero.
    pub fn new(admin: Address, orchestrator: Address, custody: Address) -> VaultZapResult<Self> {
        require_valid_address(admin, "admin")?;
        require_valid_address(orchestrator, "orchestrator")?;
        require_valid_address(custody, "custody")?;

        Ok(Self {
            admin,
            orchestrator,
            custody,
            vaults: BTreeMap::new(),
            owner_vaults: BTreeMap::new(),
            nonce: 0,
        })
    }

    /// Change the orchestrator (admin only)
    pub fn set_orchestrator(
        &mut self,
        caller: Address,
        orchestrator: Address,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        require_valid_address(orchestrator, "orchestrator")?;

        events.emit(VaultZapEvent::OrchestratorChanged {
            old_orchestrator: self.orchestrator,
            new_orchestrator: orchestrator,
        });
        self.orchestrator = orchestrator;
        Ok(())
    }

    // ============ Mutations ============

    /// Open a vault for (`owner`, `collateral_token`) or increase the
    /// existing one.
    ///
    /// # Errors
    /// - `Unauthorized` unless `caller` is the orchestrator
    /// - `UnknownCollateral` / `InactiveCollateral` for unusable collateral
    /// - `ZeroAmount` if both deltas are zero
    /// - `StalePrice` if debt is added and no fresh price exists
    /// - `Undercollateralized` if the resulting debt exceeds the MCR bound
    pub fn open_or_increase_vault<C: CollateralSource + ?Sized>(
        &mut self,
        caller: Address,
        registry: &C,
        owner: Address,
        collateral_token: TokenId,
        collateral_delta: u128,
        debt_delta: u128,
        block_height: u64,
        events: &mut EventLog,
    ) -> VaultZapResult<VaultId> {
        // 1. Only the orchestrator mutates vaults
        if caller != self.orchestrator {
            return Err(VaultZapError::Unauthorized {
                expected: self.orchestrator,
                actual: caller,
            });
        }
        require_valid_address(owner, "owner")?;
        check!(collateral_delta > 0 || debt_delta > 0, VaultZapError::ZeroAmount);

        // 2. Collateral must be registered and active
        let config = registry.collateral_info(&collateral_token)?;
        check!(
            config.is_active,
            VaultZapError::InactiveCollateral { token: collateral_token }
        );

        // 3. Post-delta position
        let existing = self.vault_for(&owner, &collateral_token);
        let (current_collateral, current_debt) = existing
            .and_then(|id| self.vaults.get(&id))
            .map(|v| (v.total_collateral, v.debt_amount))
            .unwrap_or((0, 0));
        let new_collateral = safe_add(current_collateral, collateral_delta)?;
        let new_debt = safe_add(current_debt, debt_delta)?;

        // 4. Solvency at the current price, only when debt is minted
        if debt_delta > 0 {
            let price = registry.token_price(&collateral_token, block_height)?;
            let normalized = normalize_to_debt_decimals(new_collateral, config.decimals)?;
            let max_debt = max_debt_for_collateral(normalized, price, config.mcr)?;
            if new_debt > max_debt {
                return Err(VaultZapError::Undercollateralized {
                    debt: new_debt,
                    max_debt,
                });
            }
        }

        // 5. Open if needed
        let vault_id = match existing {
            Some(id) => id,
            None => self.open_vault(owner, collateral_token, block_height, events)?,
        };

        // 6. Apply deltas
        let vault = self
            .vaults
            .get_mut(&vault_id)
            .ok_or(VaultZapError::VaultNotFound { vault_id })?;
        vault.total_collateral = new_collateral;
        vault.debt_amount = new_debt;
        vault.last_updated = block_height;

        events.emit(VaultZapEvent::VaultIncreased {
            vault_id,
            collateral_delta,
            debt_delta,
            new_collateral,
            new_debt,
            block_height,
        });

        Ok(vault_id)
    }

    fn open_vault(
        &mut self,
        owner: Address,
        collateral_token: TokenId,
        block_height: u64,
        events: &mut EventLog,
    ) -> VaultZapResult<VaultId> {
        let owned = self.vault_count(&owner);
        if owned >= MAX_VAULTS_PER_OWNER {
            return Err(VaultZapError::InvalidParameters {
                param: "owner",
                reason: "vault limit reached",
            });
        }

        let vault_id = generate_vault_id(&owner, &collateral_token, block_height, self.nonce);
        self.nonce = self.nonce.checked_add(1).ok_or(VaultZapError::ArithmeticOverflow)?;

        self.vaults
            .insert(vault_id, Vault::new(vault_id, owner, collateral_token, block_height));
        self.owner_vaults.entry(owner).or_default().push(vault_id);

        events.emit(VaultZapEvent::VaultOpened {
            vault_id,
            owner,
            collateral_token,
            block_height,
        });
        Ok(vault_id)
    }

    // ============ Queries ============

    /// The `index`-th vault of `owner`, in creation order
    pub fn vaults_by_owner(&self, owner: &Address, index: usize) -> Option<VaultId> {
        self.owner_vaults.get(owner).and_then(|ids| ids.get(index)).copied()
    }

    /// Number of vaults owned by `owner`
    pub fn vault_count(&self, owner: &Address) -> usize {
        self.owner_vaults.get(owner).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Vault of `owner` for `collateral_token`, if one exists
    pub fn vault_for(&self, owner: &Address, collateral_token: &TokenId) -> Option<VaultId> {
        self.owner_vaults.get(owner)?.iter().copied().find(|id| {
            self.vaults
                .get(id)
                .map(|v| v.collateral_token == *collateral_token)
                .unwrap_or(false)
        })
    }

    pub fn vault(&self, vault_id: &VaultId) -> Option<&Vault> {
        self.vaults.get(vault_id)
    }

    /// Collateral held by a vault
    pub fn total_collateral(&self, vault_id: &VaultId) -> VaultZapResult<u128> {
        self.vault(vault_id)
            .map(|v| v.total_collateral)
            .ok_or(VaultZapError::VaultNotFound { vault_id: *vault_id })
    }

    /// Debt owed by a vault
    pub fn debt_amount(&self, vault_id: &VaultId) -> VaultZapResult<u128> {
        self.vault(vault_id)
            .map(|v| v.debt_amount)
            .ok_or(VaultZapError::VaultNotFound { vault_id: *vault_id })
    }

    /// Sum of debt across all vaults
    pub fn total_system_debt(&self) -> u128 {
        self.vaults.values().fold(0u128, |acc, v| acc.saturating_add(v.debt_amount))
    }

    /// Sum of collateral of one token across all vaults
    pub fn total_system_collateral(&self, collateral_token: &TokenId) -> u128 {
        self.vaults
            .values()
            .filter(|v| v.collateral_token == *collateral_token)
            .fold(0u128, |acc, v| acc.saturating_add(v.total_collateral))
    }

    pub fn orchestrator(&self) -> Address {
        self.orchestrator
    }

    pub fn custody(&self) -> Address {
        self.custody
    }
}

// ============ Helper Functions ============

/// Deterministic vault id from owner, collateral token, block and nonce
pub fn generate_vault_id(owner: &Address, collateral_token: &TokenId, block_height: u64, nonce: u64) -> VaultId {
    let mut hasher = Sha256::new();
    hasher.update(b"vaultzap-vault");
    hasher.update(owner);
    hasher.update(collateral_token);
    hasher.update(block_height.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let result = hasher.finalize();
    let mut id = [0u8; 32];
    id.copy_from_slice(&result);
    id
}

// ============ Tests ============
