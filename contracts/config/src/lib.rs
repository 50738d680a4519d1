//! Collateral Registry
//!
//! Per-collateral risk configuration (mcr, mlr, issuance fee, decimals,
//! price feed) plus the borrow fee recipient. The registry resolves
//! validated collateral prices through its [`PriceOracle`].
//!
//! ## Validation Rules
//!
//! - `mcr` strictly above 100%
//! - `mlr` never above `mcr`
//! - `issuance_fee` at most 1e6 (100%)
//! - `decimals` at most 36
//! - The protocol debt token can never be collateral

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use vaultzap_common::{
    check,
    constants::{
        precision::ISSUANCE_FEE_PRECISION,
        ratios::MIN_MCR_EXCLUSIVE,
        token::MAX_DECIMALS,
    },
    errors::{VaultZapError, VaultZapResult},
    events::{EventLog, VaultZapEvent},
    traits::{CollateralSource, PriceOracle},
    types::{Address, CollateralConfig, TokenId},
    validation::{require_admin, require_valid_address},
    BTreeMap, Vec,
};

// ============ Registry State ============

/// Collateral registry state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CollateralRegistry<O> {
    /// Admin (can register collateral and change the fee recipient)
    pub admin: Address,
    /// Protocol debt token, never accepted as collateral
    pub debt_token: TokenId,
    /// Registered configurations
    configs: BTreeMap<TokenId, CollateralConfig>,
    /// Registration order
    tokens: Vec<TokenId>,
    /// Receiver of issuance fees
    borrow_fee_recipient: Address,
    /// Price feed source
    oracle: O,
}

impl<O: PriceOracle> CollateralRegistry<O> {
    /// Create an empty registry
    pub fn new(admin: Address, debt_token: TokenId, borrow_fee_recipient: Address, oracle: O) -> Self {
        Self {
            admin,
            debt_token,
            configs: BTreeMap::new(),
            tokens: Vec::new(),
            borrow_fee_recipient,
            oracle,
        }
    }

    // ============ Configuration ============

    /// Register a collateral type
    pub fn add_collateral(
        &mut self,
        caller: Address,
        config: CollateralConfig,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        check!(
            !self.configs.contains_key(&config.token),
            VaultZapError::DuplicateCollateral { token: config.token }
        );
        validate_collateral_config(&config, &self.debt_token)?;

        events.emit(VaultZapEvent::CollateralAdded {
            token: config.token,
            price_feed: config.price_feed,
            mcr: config.mcr,
            mlr: config.mlr,
            issuance_fee: config.issuance_fee,
        });
        self.tokens.push(config.token);
        self.configs.insert(config.token, config);
        Ok(())
    }

    /// Activate or deactivate a collateral type
    pub fn set_active(
        &mut self,
        caller: Address,
        token: TokenId,
        is_active: bool,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        let config = self
            .configs
            .get_mut(&token)
            .ok_or(VaultZapError::UnknownCollateral { token })?;

        if config.is_active != is_active {
            config.is_active = is_active;
            events.emit(VaultZapEvent::CollateralStatusChanged { token, is_active });
        }
        Ok(())
    }

    /// Change the issuance fee receiver
    pub fn set_borrow_fee_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
        events: &mut EventLog,
    ) -> VaultZapResult<()> {
        require_admin(self.admin, caller)?;
        require_valid_address(recipient, "borrow_fee_recipient")?;

        events.emit(VaultZapEvent::FeeRecipientChanged {
            old_recipient: self.borrow_fee_recipient,
            new_recipient: recipient,
        });
        self.borrow_fee_recipient = recipient;
        Ok(())
    }

    // ============ Queries ============

    /// Configuration of a registered collateral token
    pub fn get_collateral_info(&self, token: &TokenId) -> VaultZapResult<CollateralConfig> {
        self.configs
            .get(token)
            .cloned()
            .ok_or(VaultZapError::UnknownCollateral { token: *token })
    }

    /// Validated 8-decimal price of an active collateral token
    ///
    /// # Errors
    /// - `UnknownCollateral` if never registered
    /// - `InactiveCollateral` if deactivated
    /// - `StalePrice` if the feed is missing, non-positive, or too old
    pub fn token_price(&self, token: &TokenId, current_block: u64) -> VaultZapResult<u128> {
        let config = self.get_collateral_info(token)?;
        check!(config.is_active, VaultZapError::InactiveCollateral { token: *token });

        let round = self
            .oracle
            .latest_round(&config.price_feed)
            .ok_or(VaultZapError::StalePrice {
                token: *token,
                updated_at: 0,
                current_block,
            })?;

        if round.answer <= 0 || round.is_stale(current_block) {
            return Err(VaultZapError::StalePrice {
                token: *token,
                updated_at: round.updated_at,
                current_block,
            });
        }
        Ok(round.answer as u128)
    }

    /// Current borrow fee recipient
    pub fn borrow_fee_recipient(&self) -> Address {
        self.borrow_fee_recipient
    }

    /// Registered collateral tokens in registration order
    pub fn collateral_tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Whether `token` is registered and active
    pub fn is_active(&self, token: &TokenId) -> bool {
        self.configs.get(token).map(|c| c.is_active).unwrap_or(false)
    }

    /// Price feed source
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable price feed source, for operator updates
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }
}

impl<O: PriceOracle> CollateralSource for CollateralRegistry<O> {
    fn collateral_info(&self, token: &TokenId) -> VaultZapResult<CollateralConfig> {
        self.get_collateral_info(token)
    }

    fn token_price(&self, token: &TokenId, current_block: u64) -> VaultZapResult<u128> {
        CollateralRegistry::token_price(self, token, current_block)
    }
}

// ============ Validation ============

/// Validate a collateral configuration before registration
pub fn validate_collateral_config(config: &CollateralConfig, debt_token: &TokenId) -> VaultZapResult<()> {
    require_valid_address(config.token, "token")?;
    require_valid_address(config.price_feed, "price_feed")?;
    check!(
        config.token != *debt_token,
        VaultZapError::InvalidParameters {
            param: "token",
            reason: "debt token cannot be collateral",
        }
    );
    check!(
        config.mcr > MIN_MCR_EXCLUSIVE,
        VaultZapError::InvalidParameters {
            param: "mcr",
            reason: "must exceed 100",
        }
    );
    check!(
        config.mlr <= config.mcr,
        VaultZapError::InvalidParameters {
            param: "mlr",
            reason: "must not exceed mcr",
        }
    );
    check!(
        config.issuance_fee as u128 <= ISSUANCE_FEE_PRECISION,
        VaultZapError::InvalidParameters {
            param: "issuance_fee",
            reason: "exceeds 1e6",
        }
    );
    check!(
        config.decimals <= MAX_DECIMALS,
        VaultZapError::InvalidParameters {
            param: "decimals",
            reason: "exceeds 36",
        }
    );
    Ok(())
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use vaultzap_common::{constants::oracle::MAX_PRICE_AGE_BLOCKS, events::EventType, types::FeedRound};

    const ADMIN: Address = [9u8; 32];
    const TREASURY: Address = [8u8; 32];
    const EURO3: TokenId = [0xE3; 32];
    const DAI: TokenId = [0xDA; 32];
    const DAI_FEED: Address = [0xF1; 32];

    #[derive(Debug, Default)]
    struct MockOracle {
        rounds: BTreeMap<Address, FeedRound>,
    }

    impl PriceOracle for MockOracle {
        fn latest_round(&self, feed: &Address) -> Option<FeedRound> {
            self.rounds.get(feed).copied()
        }
    }

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

    fn create_test_registry() -> (CollateralRegistry<MockOracle>, EventLog) {
        let mut oracle = MockOracle::default();
        oracle.rounds.insert(DAI_FEED, FeedRound::new(92_000_000, 100));
        (CollateralRegistry::new(ADMIN, EURO3, TREASURY, oracle), EventLog::new())
    }

    #[test]
    fn test_add_collateral_success() {
        let (mut registry, mut events) = create_test_registry();
        registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();

        assert_eq!(registry.get_collateral_info(&DAI).unwrap(), dai_config());
        assert_eq!(registry.collateral_tokens(), &[DAI]);
        assert_eq!(events.filter_by_type(EventType::CollateralAdded).len(), 1);
    }

    #[test]
    fn test_add_collateral_duplicate() {
        let (mut registry, mut events) = create_test_registry();
        registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();

        let result = registry.add_collateral(ADMIN, dai_config(), &mut events);
        assert!(matches!(result, Err(VaultZapError::DuplicateCollateral { .. })));
    }

    #[test]
    fn test_add_collateral_unauthorized() {
        let (mut registry, mut events) = create_test_registry();
        let result = registry.add_collateral([1u8; 32], dai_config(), &mut events);
        assert!(matches!(result, Err(VaultZapError::Unauthorized { .. })));
        assert!(events.is_empty());
    }

    #[test]
    fn test_add_collateral_invalid_parameters() {
        let (mut registry, mut events) = create_test_registry();

        let mut config = dai_config();
        config.mcr = 100;
        assert!(matches!(
            registry.add_collateral(ADMIN, config, &mut events),
            Err(VaultZapError::InvalidParameters { param: "mcr", .. })
        ));

        let mut config = dai_config();
        config.mlr = 111;
        assert!(matches!(
            registry.add_collateral(ADMIN, config, &mut events),
            Err(VaultZapError::InvalidParameters { param: "mlr", .. })
        ));

        let mut config = dai_config();
        config.issuance_fee = 1_000_001;
        assert!(matches!(
            registry.add_collateral(ADMIN, config, &mut events),
            Err(VaultZapError::InvalidParameters { param: "issuance_fee", .. })
        ));

        let mut config = dai_config();
        config.decimals = 37;
        assert!(matches!(
            registry.add_collateral(ADMIN, config, &mut events),
            Err(VaultZapError::InvalidParameters { param: "decimals", .. })
        ));

        let mut config = dai_config();
        config.token = EURO3;
        assert!(matches!(
            registry.add_collateral(ADMIN, config, &mut events),
            Err(VaultZapError::InvalidParameters { param: "token", .. })
        ));

        assert!(registry.collateral_tokens().is_empty());
    }

    #[test]
    fn test_token_price() {
        let (mut registry, mut events) = create_test_registry();
        registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();

        assert_eq!(registry.token_price(&DAI, 150), Ok(92_000_000));
        assert!(matches!(
            registry.token_price(&[0x77; 32], 150),
            Err(VaultZapError::UnknownCollateral { .. })
        ));
    }

    #[test]
    fn test_token_price_stale() {
        let (mut registry, mut events) = create_test_registry();
        registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();

        let result = registry.token_price(&DAI, 101 + MAX_PRICE_AGE_BLOCKS);
        assert!(matches!(result, Err(VaultZapError::StalePrice { updated_at: 100, .. })));

        // Non-positive answers are treated as stale
        registry.oracle_mut().rounds.insert(DAI_FEED, FeedRound::new(0, 150));
        assert!(matches!(
            registry.token_price(&DAI, 150),
            Err(VaultZapError::StalePrice { .. })
        ));

        // Missing feed
        registry.oracle_mut().rounds.clear();
        assert!(matches!(
            registry.token_price(&DAI, 150),
            Err(VaultZapError::StalePrice { updated_at: 0, .. })
        ));
    }

    #[test]
    fn test_inactive_collateral() {
        let (mut registry, mut events) = create_test_registry();
        registry.add_collateral(ADMIN, dai_config(), &mut events).unwrap();
        registry.set_active(ADMIN, DAI, false, &mut events).unwrap();

        assert!(!registry.is_active(&DAI));
        assert!(matches!(
            registry.token_price(&DAI, 150),
            Err(VaultZapError::InactiveCollateral { .. })
        ));
        // Info stays readable
        assert!(!registry.get_collateral_info(&DAI).unwrap().is_active);
        assert_eq!(events.filter_by_type(EventType::CollateralStatusChanged).len(), 1);
    }

    #[test]
    fn test_set_borrow_fee_recipient() {
        let (mut registry, mut events) = create_test_registry();
        let new_recipient = [5u8; 32];

        registry.set_borrow_fee_recipient(ADMIN, new_recipient, &mut events).unwrap();
        assert_eq!(registry.borrow_fee_recipient(), new_recipient);

        assert!(matches!(
            registry.set_borrow_fee_recipient(ADMIN, [0u8; 32], &mut events),
            Err(VaultZapError::InvalidParameters { .. })
        ));
        assert!(matches!(
            registry.set_borrow_fee_recipient([1u8; 32], new_recipient, &mut events),
            Err(VaultZapError::Unauthorized { .. })
        ));
    }
}
