//! Integration Tests for the Leverage Zapper
//!
//! End-to-end deposits through oracle, registry, router and vault ledger
//! over a small market:
//!
//! - EURO3/USDC at fee tier 500, EURO3 ≈ 1.087 USDC
//! - DAI/USDC at fee tier 100, 1:1
//! - WMATIC/USDC at fee tier 500, WMATIC ≈ 0.5435 USDC

use super::*;
use vaultzap_common::{
    constants::{ids::NATIVE_TOKEN, oracle::MAX_PRICE_AGE_BLOCKS, slippage::MAX_SLIPPAGE_BPS},
    errors::VaultZapError,
    events::{EventLog, EventType, VaultZapEvent},
    math::{calculate_issuance, is_solvent},
    token_ops::TokenLedger,
    types::{Address, CollateralConfig, DepositAsset, Route, TokenId},
};
use vaultzap_config::CollateralRegistry;
use vaultzap_price_oracle::FeedOracle;
use vaultzap_token_swapper::LiquidityRegistry;
use vaultzap_vault_manager::VaultLedger;

// ============ Test Fixtures ============

const ONE: u128 = 1_000_000_000_000_000_000;
const BLOCK: u64 = 1_000;

const ADMIN: Address = [9u8; 32];
const OPERATOR: Address = [5u8; 32];
const ZAPPER: Address = [7u8; 32];
const CUSTODY: Address = [6u8; 32];
const TREASURY: Address = [8u8; 32];
const ALICE: Address = [2u8; 32];
const BOB: Address = [3u8; 32];

const EURO3: TokenId = [0xE3; 32];
const DAI: TokenId = [0xDA; 32];
const USDC: TokenId = [0xC0; 32];
const WMATIC: TokenId = [0x3A; 32];

const DAI_FEED: Address = [0xF1; 32];
const WMATIC_FEED: Address = [0xF2; 32];

/// 0.92 EURO3 per DAI
const DAI_PRICE: i128 = 92_000_000;
/// 0.50 EURO3 per WMATIC
const WMATIC_PRICE: i128 = 50_000_000;

fn dai_config() -> CollateralConfig {
    CollateralConfig {
        token: DAI,
        price_feed: DAI_FEED,
        mcr: 110,
        mlr: 105,
        issuance_fee: 100,
        decimals: 18,
        is_active: true,
    }
}

fn wmatic_config() -> CollateralConfig {
    CollateralConfig {
        token: WMATIC,
        price_feed: WMATIC_FEED,
        mcr: 120,
        mlr: 110,
        issuance_fee: 100,
        decimals: 18,
        is_active: true,
    }
}

fn create_test_zapper() -> FeedZapper {
    let mut events = EventLog::new();

    let mut oracle = FeedOracle::new(ADMIN, OPERATOR);
    oracle.register_feed(ADMIN, DAI_FEED, DAI_PRICE, BLOCK, &mut events).unwrap();
    oracle
        .register_feed(ADMIN, WMATIC_FEED, WMATIC_PRICE, BLOCK, &mut events)
        .unwrap();

    let mut registry = CollateralRegistry::new(ADMIN, EURO3, TREASURY, oracle);
    registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();
    registry.add_collateral(ADMIN, wmatic_config(), &mut events).unwrap();

    let mut liquidity = LiquidityRegistry::new(ADMIN);
    let mut tokens = TokenLedger::new();

    let euro_usdc = liquidity.add_pool(ADMIN, EURO3, USDC, 500, &mut events).unwrap();
    tokens.credit_external(EURO3, euro_usdc, 1_000_000 * ONE).unwrap();
    tokens.credit_external(USDC, euro_usdc, 1_087_000 * ONE).unwrap();

    let dai_usdc = liquidity.add_pool(ADMIN, DAI, USDC, 100, &mut events).unwrap();
    tokens.credit_external(DAI, dai_usdc, 1_000_000 * ONE).unwrap();
    tokens.credit_external(USDC, dai_usdc, 1_000_000 * ONE).unwrap();

    let wmatic_usdc = liquidity.add_pool(ADMIN, WMATIC, USDC, 500, &mut events).unwrap();
    tokens.credit_external(WMATIC, wmatic_usdc, 1_000_000 * ONE).unwrap();
    tokens.credit_external(USDC, wmatic_usdc, 543_500 * ONE).unwrap();

    tokens.credit_external(DAI, ALICE, 100 * ONE).unwrap();
    tokens.credit_external(NATIVE_TOKEN, ALICE, 100 * ONE).unwrap();
    tokens.set_minter(EURO3, ZAPPER).unwrap();

    let vaults = VaultLedger::new(ADMIN, ZAPPER, CUSTODY).unwrap();
    let config = ZapperConfig::new(ADMIN, ZAPPER, EURO3, WMATIC);

    VaultLeverageZapper::new(config, registry, liquidity, vaults, tokens).unwrap()
}

fn debt_to_collateral_route(zapper: &FeedZapper, collateral: &TokenId) -> Route {
    zapper.calculate_best_route(&EURO3, collateral, ONE).unwrap().route
}

fn leverage_deposit_count(zapper: &FeedZapper) -> usize {
    zapper.events().filter_by_type(EventType::LeverageDeposit).len()
}

// ============ Leveraged Deposits ============

#[test]
fn test_leveraged_dai_deposit() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);
    assert_eq!(route.token_path(), vec![EURO3, USDC, DAI]);

    let split = calculate_issuance(10 * ONE, 18, DAI_PRICE as u128, 110, 100).unwrap();
    let supply_before = zapper.tokens().total_supply(&EURO3);

    let vault_id = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK).unwrap();

    // Vault holds the deposit plus swapped collateral, debt is the user share
    assert_eq!(zapper.vaults_by_owner(&ALICE, 0), Some(vault_id));
    assert_eq!(zapper.debt_amount(&vault_id), Ok(split.user_share));
    let collateral = zapper.total_collateral(&vault_id).unwrap();
    assert!(collateral > 10 * ONE);
    assert!(is_solvent(split.user_share, collateral, DAI_PRICE as u128, 110).unwrap());

    // Collateral sits in custody, nothing stays with the zapper
    assert_eq!(zapper.tokens().balance_of(&DAI, &CUSTODY), collateral);
    assert_eq!(zapper.tokens().balance_of(&DAI, &ZAPPER), 0);
    assert_eq!(zapper.tokens().balance_of(&EURO3, &ZAPPER), 0);
    assert_eq!(zapper.tokens().balance_of(&DAI, &ALICE), 90 * ONE);

    // Fee share reaches the recipient and total issuance is debt_gross
    assert_eq!(zapper.tokens().balance_of(&EURO3, &TREASURY), split.fee_share);
    assert_eq!(
        zapper.tokens().total_supply(&EURO3),
        supply_before + split.debt_gross
    );

    assert_eq!(leverage_deposit_count(&zapper), 1);
}

#[test]
fn test_leveraged_native_deposit() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &WMATIC);
    assert_eq!(route.token_path(), vec![EURO3, USDC, WMATIC]);

    let split = calculate_issuance(10 * ONE, 18, WMATIC_PRICE as u128, 120, 100).unwrap();
    let vault_id = zapper.deposit_eth(ALICE, 10 * ONE, true, route, 0, BLOCK).unwrap();

    let debt = zapper.debt_amount(&vault_id).unwrap();
    assert!(debt.abs_diff(split.user_share) * 100 <= split.user_share);
    assert!(zapper.total_collateral(&vault_id).unwrap() > 10 * ONE);

    // Native currency is locked behind the wrapped token
    assert_eq!(zapper.tokens().balance_of(&NATIVE_TOKEN, &ALICE), 90 * ONE);
    assert_eq!(zapper.tokens().balance_of(&NATIVE_TOKEN, &WMATIC), 10 * ONE);
    assert_eq!(zapper.vaults().vault(&vault_id).unwrap().collateral_token, WMATIC);
}

#[test]
fn test_preview_matches_execution() {
    let mut zapper = create_test_zapper();
    let preview = zapper.preview_leverage(&DAI, 10 * ONE, BLOCK).unwrap();

    assert_eq!(
        preview.issuance,
        calculate_issuance(10 * ONE, 18, DAI_PRICE as u128, 110, 100).unwrap()
    );
    assert!(preview.quote.expected_out >= preview.min_swap_output);

    let outcome = zapper
        .execute_deposit(
            &DepositRequest {
                caller: ALICE,
                asset: DepositAsset::Token(DAI),
                amount: 10 * ONE,
                leverage: true,
                route: preview.quote.route.clone(),
                min_collateral_out: preview.quote.expected_out,
            },
            BLOCK,
        )
        .unwrap();

    assert_eq!(outcome.swap_output, preview.quote.expected_out);
    assert_eq!(outcome.collateral_delta, 10 * ONE + preview.quote.expected_out);
    assert_eq!(outcome.issuance, Some(preview.issuance));
}

#[test]
fn test_repeat_deposit_increases_vault() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);

    let first = zapper.deposit(ALICE, DAI, 10 * ONE, true, route.clone(), 0, BLOCK).unwrap();
    let debt_after_first = zapper.debt_amount(&first).unwrap();
    let second = zapper.deposit(ALICE, DAI, 5 * ONE, true, route, 0, BLOCK + 1).unwrap();

    assert_eq!(first, second);
    assert_eq!(zapper.vaults().vault_count(&ALICE), 1);
    assert!(zapper.debt_amount(&first).unwrap() > debt_after_first);
    assert_eq!(leverage_deposit_count(&zapper), 2);
}

#[test]
fn test_price_update_changes_issuance() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);

    let mut events = EventLog::new();
    zapper
        .oracle_mut()
        .update_price(OPERATOR, DAI_FEED, 95_000_000, BLOCK + 1, &mut events)
        .unwrap();

    let split = calculate_issuance(10 * ONE, 18, 95_000_000, 110, 100).unwrap();
    let vault_id = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK + 1).unwrap();
    assert_eq!(zapper.debt_amount(&vault_id), Ok(split.user_share));
}

#[test]
fn test_leveraged_six_decimal_collateral() {
    const USDX: TokenId = [0x06; 32];
    const USDX_FEED: Address = [0xF3; 32];
    const UNIT: u128 = 1_000_000;

    let mut zapper = create_test_zapper();
    let mut events = EventLog::new();
    zapper
        .oracle_mut()
        .register_feed(ADMIN, USDX_FEED, DAI_PRICE, BLOCK, &mut events)
        .unwrap();
    zapper
        .add_collateral(
            ADMIN,
            CollateralConfig {
                token: USDX,
                price_feed: USDX_FEED,
                decimals: 6,
                ..dai_config()
            },
        )
        .unwrap();
    let pool = zapper.add_pool(ADMIN, USDX, USDC, 100).unwrap();
    zapper.tokens_mut().credit_external(USDX, pool, 1_000_000 * UNIT).unwrap();
    zapper.tokens_mut().credit_external(USDC, pool, 1_000_000 * ONE).unwrap();
    zapper.tokens_mut().credit_external(USDX, ALICE, 100 * UNIT).unwrap();

    // Issuance sees the deposit at 18 decimals
    let split = calculate_issuance(10 * UNIT, 6, DAI_PRICE as u128, 110, 100).unwrap();
    assert_eq!(split, calculate_issuance(10 * ONE, 18, DAI_PRICE as u128, 110, 100).unwrap());

    let route = debt_to_collateral_route(&zapper, &USDX);
    assert_eq!(route.token_path(), vec![EURO3, USDC, USDX]);
    let vault_id = zapper.deposit(ALICE, USDX, 10 * UNIT, true, route, 0, BLOCK).unwrap();

    // Swap output is in collateral units: about 9.08 USDX on top of the 10 deposited
    let collateral = zapper.total_collateral(&vault_id).unwrap();
    assert!(collateral > 19 * UNIT);
    assert!(collateral < 20 * UNIT);
    assert_eq!(zapper.debt_amount(&vault_id), Ok(split.user_share));
    assert_eq!(zapper.tokens().balance_of(&USDX, &CUSTODY), collateral);
    assert!(is_solvent(split.user_share, collateral * 1_000_000_000_000, DAI_PRICE as u128, 110).unwrap());
}

// ============ Plain Deposits ============

#[test]
fn test_deposit_without_leverage() {
    let mut zapper = create_test_zapper();
    let supply_before = zapper.tokens().total_supply(&EURO3);

    let vault_id = zapper
        .deposit(ALICE, DAI, 10 * ONE, false, Route::identity(), 0, BLOCK)
        .unwrap();

    assert_eq!(zapper.debt_amount(&vault_id), Ok(0));
    assert_eq!(zapper.total_collateral(&vault_id), Ok(10 * ONE));
    assert_eq!(zapper.tokens().total_supply(&EURO3), supply_before);
    assert_eq!(zapper.tokens().balance_of(&DAI, &CUSTODY), 10 * ONE);
    assert_eq!(leverage_deposit_count(&zapper), 1);
}

#[test]
fn test_plain_deposit_ignores_stale_price() {
    let mut zapper = create_test_zapper();
    let later = BLOCK + MAX_PRICE_AGE_BLOCKS + 1;

    let vault_id = zapper
        .deposit(ALICE, DAI, 10 * ONE, false, Route::identity(), 0, later)
        .unwrap();
    assert_eq!(zapper.debt_amount(&vault_id), Ok(0));
}

#[test]
fn test_top_up_of_indebted_vault_ignores_stale_price() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);
    let vault_id = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK).unwrap();
    let debt = zapper.debt_amount(&vault_id).unwrap();
    let collateral = zapper.total_collateral(&vault_id).unwrap();

    let later = BLOCK + MAX_PRICE_AGE_BLOCKS + 1;
    zapper.deposit(ALICE, DAI, ONE, false, Route::identity(), 0, later).unwrap();

    assert_eq!(zapper.debt_amount(&vault_id), Ok(debt));
    assert_eq!(zapper.total_collateral(&vault_id), Ok(collateral + ONE));
}

#[test]
fn test_top_up_of_undercollateralized_vault() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);
    let vault_id = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK).unwrap();
    let debt = zapper.debt_amount(&vault_id).unwrap();

    // Walk the price down to 0.40 within the per-update deviation bound
    let mut events = EventLog::new();
    for (step, price) in [75_000_000, 61_000_000, 50_000_000, 41_000_000, 40_000_000].into_iter().enumerate() {
        zapper
            .oracle_mut()
            .update_price(OPERATOR, DAI_FEED, price, BLOCK + 1 + step as u64, &mut events)
            .unwrap();
    }
    let now = BLOCK + 5;
    let collateral = zapper.total_collateral(&vault_id).unwrap();
    assert!(!is_solvent(debt, collateral, 40_000_000, 110).unwrap());

    // Adding collateral only improves the ratio
    zapper.deposit(ALICE, DAI, ONE, false, Route::identity(), 0, now).unwrap();
    assert_eq!(zapper.total_collateral(&vault_id), Ok(collateral + ONE));
    assert_eq!(zapper.debt_amount(&vault_id), Ok(debt));
}

// ============ Failure Atomicity ============

#[test]
fn test_invalid_route_moves_nothing() {
    let mut zapper = create_test_zapper();
    let tokens_before = zapper.tokens().clone();
    let events_before = zapper.events().len();

    // Does not start at the debt token
    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, Route::from_path(&[USDC, DAI]), 0, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InvalidRoute { .. })));

    // Ends at the wrong collateral
    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, Route::from_path(&[EURO3, USDC]), 0, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InvalidRoute { .. })));

    assert_eq!(zapper.tokens(), &tokens_before);
    assert_eq!(zapper.events().len(), events_before);
    assert_eq!(zapper.vaults().vault_count(&ALICE), 0);
}

#[test]
fn test_slippage_failure_is_atomic() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);
    let tokens_before = zapper.tokens().clone();
    let events_before = zapper.events().len();

    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 100 * ONE, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InsufficientOutput { .. })));

    assert_eq!(zapper.tokens(), &tokens_before);
    assert_eq!(zapper.events().len(), events_before);
    assert_eq!(zapper.vaults().vault_count(&ALICE), 0);
    assert_eq!(zapper.vaults().total_system_debt(), 0);
}

#[test]
fn test_oracle_fair_value_bounds_swap() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);

    // Pool fees alone push the swap below fair value
    zapper.set_max_slippage_bps(ADMIN, 0).unwrap();
    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, route.clone(), 0, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InsufficientOutput { .. })));

    zapper.set_max_slippage_bps(ADMIN, 100).unwrap();
    assert!(zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK).is_ok());
}

#[test]
fn test_insufficient_balance() {
    let mut zapper = create_test_zapper();
    let result = zapper.deposit(BOB, DAI, 10 * ONE, false, Route::identity(), 0, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InsufficientBalance { .. })));

    let result = zapper.deposit_eth(BOB, ONE, false, Route::identity(), 0, BLOCK);
    assert!(matches!(result, Err(VaultZapError::InsufficientBalance { .. })));
}

#[test]
fn test_reentrant_deposit_rejected() {
    let mut zapper = create_test_zapper();
    zapper.lock.enter().unwrap();

    let result = zapper.deposit(ALICE, DAI, 10 * ONE, false, Route::identity(), 0, BLOCK);
    assert_eq!(result, Err(VaultZapError::Reentrancy));

    zapper.lock.exit();
    assert!(zapper
        .deposit(ALICE, DAI, 10 * ONE, false, Route::identity(), 0, BLOCK)
        .is_ok());
    assert!(!zapper.lock.is_entered());
}

#[test]
fn test_failed_deposit_releases_lock() {
    let mut zapper = create_test_zapper();
    assert!(zapper.deposit(ALICE, DAI, 0, false, Route::identity(), 0, BLOCK).is_err());
    assert!(!zapper.lock.is_entered());
}

// ============ Input Validation ============

#[test]
fn test_zero_amount_rejected() {
    let mut zapper = create_test_zapper();
    assert_eq!(
        zapper.deposit(ALICE, DAI, 0, true, Route::identity(), 0, BLOCK),
        Err(VaultZapError::ZeroAmount)
    );
    assert_eq!(
        zapper.deposit_eth(ALICE, 0, false, Route::identity(), 0, BLOCK),
        Err(VaultZapError::ZeroAmount)
    );
}

#[test]
fn test_unknown_and_inactive_collateral() {
    let mut zapper = create_test_zapper();

    let result = zapper.deposit(ALICE, USDC, ONE, false, Route::identity(), 0, BLOCK);
    assert_eq!(result, Err(VaultZapError::UnknownCollateral { token: USDC }));

    zapper.set_collateral_active(ADMIN, DAI, false).unwrap();
    let result = zapper.deposit(ALICE, DAI, ONE, false, Route::identity(), 0, BLOCK);
    assert_eq!(result, Err(VaultZapError::InactiveCollateral { token: DAI }));
}

#[test]
fn test_native_token_needs_deposit_eth() {
    let mut zapper = create_test_zapper();
    let result = zapper.deposit(ALICE, NATIVE_TOKEN, ONE, false, Route::identity(), 0, BLOCK);
    assert!(matches!(
        result,
        Err(VaultZapError::InvalidParameters { param: "collateral_token", .. })
    ));
}

#[test]
fn test_stale_price_blocks_leverage() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);
    let later = BLOCK + MAX_PRICE_AGE_BLOCKS + 1;

    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, later);
    assert!(matches!(result, Err(VaultZapError::StalePrice { .. })));
    assert!(matches!(
        zapper.preview_leverage(&DAI, 10 * ONE, later),
        Err(VaultZapError::StalePrice { .. })
    ));
}

// ============ Configuration ============

#[test]
fn test_set_max_slippage_bps() {
    let mut zapper = create_test_zapper();

    assert!(matches!(
        zapper.set_max_slippage_bps(ALICE, 50),
        Err(VaultZapError::Unauthorized { .. })
    ));
    assert!(zapper.set_max_slippage_bps(ADMIN, MAX_SLIPPAGE_BPS + 1).is_err());

    let old_bps = zapper.config().max_slippage_bps;
    zapper.set_max_slippage_bps(ADMIN, 50).unwrap();
    assert_eq!(zapper.config().max_slippage_bps, 50);
    assert_eq!(
        zapper.events().events().last(),
        Some(&VaultZapEvent::SlippageChanged { old_bps, new_bps: 50 })
    );
}

#[test]
fn test_fee_recipient_change() {
    let mut zapper = create_test_zapper();
    zapper.set_borrow_fee_recipient(ADMIN, BOB).unwrap();

    let route = debt_to_collateral_route(&zapper, &DAI);
    zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK).unwrap();

    let split = calculate_issuance(10 * ONE, 18, DAI_PRICE as u128, 110, 100).unwrap();
    assert_eq!(zapper.tokens().balance_of(&EURO3, &BOB), split.fee_share);
    assert_eq!(zapper.tokens().balance_of(&EURO3, &TREASURY), 0);
}

#[test]
fn test_disabled_pool_breaks_route() {
    let mut zapper = create_test_zapper();
    let route = debt_to_collateral_route(&zapper, &DAI);

    zapper.set_pool_active(ADMIN, DAI, USDC, 100, false).unwrap();
    let result = zapper.deposit(ALICE, DAI, 10 * ONE, true, route, 0, BLOCK);
    assert!(result.is_err());
    assert_eq!(zapper.tokens().balance_of(&DAI, &ALICE), 100 * ONE);
}

#[test]
fn test_new_rejects_miswired_components() {
    let zapper = create_test_zapper();
    let config = zapper.config().clone();

    // Vault ledger orchestrated by someone else
    let vaults = VaultLedger::new(ADMIN, BOB, CUSTODY).unwrap();
    let result = VaultLeverageZapper::new(
        config.clone(),
        zapper.registry().clone(),
        zapper.liquidity().clone(),
        vaults,
        zapper.tokens().clone(),
    );
    assert!(matches!(result, Err(VaultZapError::InvalidParameters { param: "vaults", .. })));

    // Zapper cannot mint the debt token
    let result = VaultLeverageZapper::new(
        config,
        zapper.registry().clone(),
        zapper.liquidity().clone(),
        zapper.vaults().clone(),
        TokenLedger::new(),
    );
    assert!(matches!(result, Err(VaultZapError::InvalidParameters { param: "tokens", .. })));
}
