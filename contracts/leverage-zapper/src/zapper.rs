//! Vault Leverage Zapper
//!
//! One-call leveraged deposits. The caller's collateral is pulled in, debt
//! is issued against it at the collateral's MCR, the user share of that
//! debt is swapped along a caller-supplied route into more collateral, and
//! the enlarged position lands in the caller's vault.
//!
//! ## Deposit Steps
//!
//! 1. Lock, check the amount and collateral, validate the route
//! 2. Pull the collateral (or wrap attached native currency)
//! 3. Issue `debt_gross`, split into fee share and user share
//! 4. Swap the user share into collateral, bounded below by the caller's
//!    minimum and the oracle fair value less the slippage tolerance
//! 5. Mint the fee share to the borrow fee recipient
//! 6. Open or increase the vault with `amount + swap_output` collateral and
//!    `user_share` debt, then move the collateral into vault custody
//!
//! Every step runs on staged copies of the token ledger, vault ledger and
//! event log. State is replaced only after the last step succeeds.

use vaultzap_common::{
    check,
    constants::ids::NATIVE_TOKEN,
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    guard::ReentrancyLock,
    math::{
        apply_slippage, calculate_issuance, collateral_for_debt_value, denormalize_from_debt_decimals,
        safe_add, IssuanceSplit,
    },
    token_ops::TokenLedger,
    traits::PriceOracle,
    types::{Address, CollateralConfig, DepositAsset, Route, TokenId, VaultId},
    validation::{issuance_balanced, require_admin, require_positive},
};
use vaultzap_config::CollateralRegistry;
use vaultzap_token_swapper::{execute_route, validate_route, LiquidityRegistry, RouteOptimizer, RouteQuote};
use vaultzap_vault_manager::VaultLedger;

use crate::config::{validate_slippage, ZapperConfig};

// ============ Request / Outcome Types ============

/// A single deposit call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    pub caller: Address,
    pub asset: DepositAsset,
    pub amount: u128,
    pub leverage: bool,
    /// Debt token to collateral route; ignored without leverage
    pub route: Route,
    /// Caller's lower bound on swap output
    pub min_collateral_out: u128,
}

/// What a completed deposit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub vault_id: VaultId,
    pub collateral_token: TokenId,
    pub collateral_delta: u128,
    pub swap_output: u128,
    /// Issuance split, `None` without leverage
    pub issuance: Option<IssuanceSplit>,
}

/// Read-only estimate of a leveraged deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeveragePreview {
    pub collateral_token: TokenId,
    pub price: u128,
    pub issuance: IssuanceSplit,
    /// Best route for the user share at current reserves
    pub quote: RouteQuote,
    /// Lower bound the swap must meet with no caller minimum
    pub min_swap_output: u128,
}

struct StagedDeposit {
    tokens: TokenLedger,
    vaults: VaultLedger,
    events: EventLog,
    outcome: DepositOutcome,
}

// ============ Zapper ============

/// Leverage zapper and the protocol state it orchestrates
#[derive(Debug, Clone)]
pub struct VaultLeverageZapper<O> {
    config: ZapperConfig,
    registry: CollateralRegistry<O>,
    liquidity: LiquidityRegistry,
    vaults: VaultLedger,
    tokens: TokenLedger,
    events: EventLog,
    pub(crate) lock: ReentrancyLock,
}

impl<O: PriceOracle> VaultLeverageZapper<O> {
    /// Wire the zapper to its collaborators.
    ///
    /// # Errors
    /// Returns `InvalidParameters` if the config is invalid, the registry
    /// uses another debt token, the vault ledger has another orchestrator,
    /// or the zapper cannot mint the debt token.
    pub fn new(
        config: ZapperConfig,
        registry: CollateralRegistry<O>,
        liquidity: LiquidityRegistry,
        vaults: VaultLedger,
        tokens: TokenLedger,
    ) -> VaultZapResult<Self> {
        config.validate()?;
        check!(
            registry.debt_token == config.debt_token,
            VaultZapError::InvalidParameters {
                param: "registry",
                reason: "debt token mismatch",
            }
        );
        check!(
            vaults.orchestrator() == config.address,
            VaultZapError::InvalidParameters {
                param: "vaults",
                reason: "orchestrator must be the zapper",
            }
        );
        check!(
            tokens.minter_of(&config.debt_token) == Some(config.address),
            VaultZapError::InvalidParameters {
                param: "tokens",
                reason: "zapper must mint the debt token",
            }
        );

        Ok(Self {
            config,
            registry,
            liquidity,
            vaults,
            tokens,
            events: EventLog::new(),
            lock: ReentrancyLock::new(),
        })
    }

    // ============ Deposits ============

    /// Deposit `amount` of `collateral_token`, optionally leveraged
    pub fn deposit(
        &mut self,
        caller: Address,
        collateral_token: TokenId,
        amount: u128,
        leverage: bool,
        route: Route,
        min_collateral_out: u128,
        block_height: u64,
    ) -> VaultZapResult<VaultId> {
        let request = DepositRequest {
            caller,
            asset: DepositAsset::Token(collateral_token),
            amount,
            leverage,
            route,
            min_collateral_out,
        };
        self.execute_deposit(&request, block_height).map(|outcome| outcome.vault_id)
    }

    /// Deposit attached native currency as wrapped-native collateral
    pub fn deposit_eth(
        &mut self,
        caller: Address,
        value: u128,
        leverage: bool,
        route: Route,
        min_collateral_out: u128,
        block_height: u64,
    ) -> VaultZapResult<VaultId> {
        let request = DepositRequest {
            caller,
            asset: DepositAsset::Native,
            amount: value,
            leverage,
            route,
            min_collateral_out,
        };
        self.execute_deposit(&request, block_height).map(|outcome| outcome.vault_id)
    }

    /// Run a deposit and commit it only if every step succeeds
    pub fn execute_deposit(&mut self, request: &DepositRequest, block_height: u64) -> VaultZapResult<DepositOutcome> {
        self.lock.enter()?;
        let staged = self.stage_deposit(request, block_height);
        self.lock.exit();

        let staged = staged?;
        self.tokens = staged.tokens;
        self.vaults = staged.vaults;
        self.events.extend(staged.events);
        Ok(staged.outcome)
    }

    fn stage_deposit(&self, request: &DepositRequest, block_height: u64) -> VaultZapResult<StagedDeposit> {
        require_positive(request.amount)?;
        let zapper = self.config.address;

        // 1. Collateral must be registered and active
        let collateral_token = match request.asset {
            DepositAsset::Native => self.config.wrapped_native,
            DepositAsset::Token(token) if token == NATIVE_TOKEN => {
                return Err(VaultZapError::InvalidParameters {
                    param: "collateral_token",
                    reason: "native currency goes through deposit_eth",
                })
            }
            DepositAsset::Token(token) => token,
        };
        let collateral = self.registry.get_collateral_info(&collateral_token)?;
        check!(
            collateral.is_active,
            VaultZapError::InactiveCollateral { token: collateral_token }
        );

        // 2. Route must turn debt into this collateral, before funds move
        if request.leverage {
            validate_route(&self.liquidity, &request.route, &self.config.debt_token, &collateral_token)?;
        }

        let mut tokens = self.tokens.clone();
        let mut vaults = self.vaults.clone();
        let mut events = EventLog::new();

        // 3. Pull collateral
        match request.asset {
            DepositAsset::Native => {
                tokens.transfer(NATIVE_TOKEN, request.caller, zapper, request.amount, &mut events)?;
                tokens.wrap_native(collateral_token, zapper, request.amount, &mut events)?;
            }
            DepositAsset::Token(_) => {
                tokens.transfer(collateral_token, request.caller, zapper, request.amount, &mut events)?;
            }
        }

        // 4. Issue and swap
        let (issuance, swap_output) = if request.leverage {
            let price = self.registry.token_price(&collateral_token, block_height)?;
            let split = calculate_issuance(
                request.amount,
                collateral.decimals,
                price,
                collateral.mcr,
                collateral.issuance_fee,
            )?;
            issuance_balanced(split.debt_gross, split.fee_share, split.user_share)?;

            let swap_output = self.swap_user_share(
                &mut tokens,
                &request.route,
                &collateral,
                price,
                split.user_share,
                request.min_collateral_out,
                &mut events,
            )?;

            if split.fee_share > 0 {
                tokens.mint(
                    zapper,
                    self.config.debt_token,
                    self.registry.borrow_fee_recipient(),
                    split.fee_share,
                    &mut events,
                )?;
            }
            (Some(split), swap_output)
        } else {
            (None, 0)
        };

        // 5. Vault bookkeeping, solvency checked by the ledger
        let debt_delta = issuance.map(|split| split.user_share).unwrap_or(0);
        let collateral_delta = safe_add(request.amount, swap_output)?;
        let vault_id = vaults.open_or_increase_vault(
            zapper,
            &self.registry,
            request.caller,
            collateral_token,
            collateral_delta,
            debt_delta,
            block_height,
            &mut events,
        )?;

        // 6. Collateral into custody
        tokens.transfer(collateral_token, zapper, vaults.custody(), collateral_delta, &mut events)?;

        let split = issuance.unwrap_or(IssuanceSplit {
            debt_gross: 0,
            fee_share: 0,
            user_share: 0,
        });
        events.emit(VaultZapEvent::LeverageDeposit {
            vault_id,
            owner: request.caller,
            collateral_token,
            amount: request.amount,
            swap_output,
            debt_gross: split.debt_gross,
            fee_share: split.fee_share,
            user_share: split.user_share,
            block_height,
        });

        Ok(StagedDeposit {
            tokens,
            vaults,
            events,
            outcome: DepositOutcome {
                vault_id,
                collateral_token,
                collateral_delta,
                swap_output,
                issuance,
            },
        })
    }

    /// Mint the user share to the zapper and swap it into collateral
    fn swap_user_share(
        &self,
        tokens: &mut TokenLedger,
        route: &Route,
        collateral: &CollateralConfig,
        price: u128,
        user_share: u128,
        min_collateral_out: u128,
        events: &mut EventLog,
    ) -> VaultZapResult<u128> {
        let min_out = self.min_swap_output(collateral, price, user_share)?.max(min_collateral_out);
        if user_share == 0 {
            check!(min_out == 0, VaultZapError::InsufficientOutput { minimum: min_out, actual: 0 });
            return Ok(0);
        }

        let zapper = self.config.address;
        tokens.mint(zapper, self.config.debt_token, zapper, user_share, events)?;
        let receipt = execute_route(&self.liquidity, tokens, zapper, route, user_share, min_out, events)?;
        Ok(receipt.amount_out)
    }

    /// Oracle fair value of `user_share` in collateral, less slippage
    fn min_swap_output(&self, collateral: &CollateralConfig, price: u128, user_share: u128) -> VaultZapResult<u128> {
        let fair_value = collateral_for_debt_value(user_share, price)?;
        let fair_value = denormalize_from_debt_decimals(fair_value, collateral.decimals)?;
        apply_slippage(fair_value, self.config.max_slippage_bps)
    }

    // ============ Routing ============

    /// Best route at current reserves
    pub fn calculate_best_route(
        &self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_in: u128,
    ) -> VaultZapResult<RouteQuote> {
        RouteOptimizer::new(&self.liquidity, &self.tokens).calculate_best_route(token_in, token_out, amount_in)
    }

    /// Estimate a leveraged deposit without touching state
    ///
    /// # Errors
    /// `ZeroAmount` if the deposit is too small to borrow against.
    pub fn preview_leverage(
        &self,
        collateral_token: &TokenId,
        amount: u128,
        block_height: u64,
    ) -> VaultZapResult<LeveragePreview> {
        require_positive(amount)?;
        let collateral = self.registry.get_collateral_info(collateral_token)?;
        let price = self.registry.token_price(collateral_token, block_height)?;
        let issuance = calculate_issuance(
            amount,
            collateral.decimals,
            price,
            collateral.mcr,
            collateral.issuance_fee,
        )?;
        require_positive(issuance.user_share)?;

        let quote = self.calculate_best_route(&self.config.debt_token, collateral_token, issuance.user_share)?;
        let min_swap_output = self.min_swap_output(&collateral, price, issuance.user_share)?;

        Ok(LeveragePreview {
            collateral_token: *collateral_token,
            price,
            issuance,
            quote,
            min_swap_output,
        })
    }

    // ============ Configuration ============

    /// Change the slippage tolerance (admin only)
    pub fn set_max_slippage_bps(&mut self, caller: Address, bps: u64) -> VaultZapResult<()> {
        require_admin(self.config.admin, caller)?;
        validate_slippage(bps)?;

        self.events.emit(VaultZapEvent::SlippageChanged {
            old_bps: self.config.max_slippage_bps,
            new_bps: bps,
        });
        self.config.max_slippage_bps = bps;
        Ok(())
    }

    pub fn add_collateral(&mut self, caller: Address, config: CollateralConfig) -> VaultZapResult<()> {
        self.registry.add_collateral(caller, config, &mut self.events)
    }

    pub fn set_collateral_active(&mut self, caller: Address, token: TokenId, is_active: bool) -> VaultZapResult<()> {
        self.registry.set_active(caller, token, is_active, &mut self.events)
    }

    pub fn set_borrow_fee_recipient(&mut self, caller: Address, recipient: Address) -> VaultZapResult<()> {
        self.registry.set_borrow_fee_recipient(caller, recipient, &mut self.events)
    }

    pub fn add_pool(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
    ) -> VaultZapResult<Address> {
        self.liquidity.add_pool(caller, token_a, token_b, fee_tier, &mut self.events)
    }

    pub fn set_pool_active(
        &mut self,
        caller: Address,
        token_a: TokenId,
        token_b: TokenId,
        fee_tier: u32,
        is_active: bool,
    ) -> VaultZapResult<()> {
        self.liquidity
            .set_pool_active(caller, token_a, token_b, fee_tier, is_active, &mut self.events)
    }

    pub fn add_hub_token(&mut self, caller: Address, token: TokenId) -> VaultZapResult<()> {
        self.liquidity.add_hub_token(caller, token, &mut self.events)
    }

    // ============ Queries ============

    pub fn get_collateral_info(&self, token: &TokenId) -> VaultZapResult<CollateralConfig> {
        self.registry.get_collateral_info(token)
    }

    pub fn token_price(&self, token: &TokenId, current_block: u64) -> VaultZapResult<u128> {
        self.registry.token_price(token, current_block)
    }

    pub fn vaults_by_owner(&self, owner: &Address, index: usize) -> Option<VaultId> {
        self.vaults.vaults_by_owner(owner, index)
    }

    pub fn total_collateral(&self, vault_id: &VaultId) -> VaultZapResult<u128> {
        self.vaults.total_collateral(vault_id)
    }

    pub fn debt_amount(&self, vault_id: &VaultId) -> VaultZapResult<u128> {
        self.vaults.debt_amount(vault_id)
    }

    pub fn config(&self) -> &ZapperConfig {
        &self.config
    }

    pub fn registry(&self) -> &CollateralRegistry<O> {
        &self.registry
    }

    pub fn liquidity(&self) -> &LiquidityRegistry {
        &self.liquidity
    }

    pub fn vaults(&self) -> &VaultLedger {
        &self.vaults
    }

    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    /// Token ledger shared with the rest of the chain (funding, LP deposits)
    pub fn tokens_mut(&mut self) -> &mut TokenLedger {
        &mut self.tokens
    }

    /// Price feed source, for operator updates
    pub fn oracle_mut(&mut self) -> &mut O {
        self.registry.oracle_mut()
    }

    /// Events of every committed operation, in order
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}
