//! Strategy Manager - yield strategies and the positions enrolled in them
//!
//! Holds the strategy registry and the per-user position ledger. Vault-backed
//! enrollments take their principal from the vault collateral oracle.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::errors::StrategyError;
use super::events::*;
use super::strategy::{
    default_strategies, ClaimOutcome, CompoundOutcome, RiskLevel, YieldPosition,
    YieldPositionView, YieldStats, YieldStrategy,
};
use crate::lending::collateral_source::VaultCollateralOracleContractRef;
use crate::math;

/// Strategy Manager contract
#[odra::module]
pub struct StrategyManager {
    /// Strategies by name
    strategies: Mapping<String, YieldStrategy>,
    /// Strategy names in registration order
    strategy_index: Mapping<u32, String>,
    strategy_count: Var<u32>,
    /// Positions by id
    positions: Mapping<u64, YieldPosition>,
    /// Positions emptied by an emergency withdrawal
    withdrawn: Mapping<u64, bool>,
    next_position_id: Var<u64>,
    /// Position ids per user: (user, index) -> position id
    user_position_ids: Mapping<(Address, u32), u64>,
    user_position_count: Mapping<Address, u32>,
    /// Vault collateral oracle address
    collateral_source: Var<Address>,
    admin: Var<Address>,
    paused: Var<bool>,
}

#[odra::module]
impl StrategyManager {
    /// Initialize the manager with the default strategies
    pub fn init(&mut self, collateral_source: Address) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.paused.set(false);
        self.collateral_source.set(collateral_source);
        self.next_position_id.set(1);
        self.strategy_count.set(0);

        for strategy in default_strategies() {
            self.insert_strategy(strategy);
        }
    }

    // ========================================
    // Strategy Registry
    // ========================================

    /// Register a new strategy (admin only)
    pub fn register_strategy(
        &mut self,
        name: String,
        display_name: String,
        apy: U256,
        risk_level: RiskLevel,
        minimum_deposit: U256,
    ) {
        self.only_admin();

        if self.strategies.get(&name).is_some() {
            self.env().revert(StrategyError::DuplicateStrategy);
        }
        let strategy = YieldStrategy::new(name, display_name, apy, risk_level, minimum_deposit)
            .unwrap_or_revert(&self.env());
        self.insert_strategy(strategy);
    }

    /// Registered strategies in registration order
    pub fn available_strategies(&self) -> Vec<YieldStrategy> {
        (0..self.strategy_count.get_or_default())
            .filter_map(|index| self.strategy_index.get(&index))
            .filter_map(|name| self.strategies.get(&name))
            .collect()
    }

    pub fn get_strategy(&self, name: String) -> Option<YieldStrategy> {
        self.strategies.get(&name)
    }

    // ========================================
    // Positions
    // ========================================

    /// Enroll `principal` in a strategy
    pub fn enroll(&mut self, strategy_name: String, principal: U256) -> u64 {
        self.ensure_not_paused();
        let strategy = self.load_strategy(&strategy_name);
        self.open_position(&strategy, None, principal)
    }

    /// Enroll the caller's contribution to `vault_id`, valued by the collateral source
    pub fn enroll_vault(&mut self, strategy_name: String, vault_id: u64) -> u64 {
        self.ensure_not_paused();
        let strategy = self.load_strategy(&strategy_name);
        let principal = self.vault_contribution(self.env().caller(), vault_id);
        self.open_position(&strategy, Some(vault_id), principal)
    }

    /// Unclaimed yield of a position
    pub fn accrued_yield(&self, position_id: u64) -> U256 {
        let position = self.load_position(position_id);
        let strategy = self.load_strategy(&position.strategy_name);
        position
            .accrued_yield(strategy.apy, self.now())
            .unwrap_or_revert(&self.env())
    }

    /// Claim the yield accrued since the last claim (owner only)
    pub fn claim(&mut self, position_id: u64) -> ClaimOutcome {
        self.ensure_not_paused();
        let mut position = self.load_owned_position(position_id);
        let outcome = self.claim_position(&mut position);
        self.positions.set(&position_id, position);
        outcome
    }

    /// Close a position without claiming; unclaimed yield is forfeited (owner only)
    pub fn emergency_withdraw(&mut self, position_id: u64) -> U256 {
        let position = self.load_owned_position(position_id);
        let strategy = self.load_strategy(&position.strategy_name);
        let now = self.now();
        let forfeited_yield = position
            .accrued_yield(strategy.apy, now)
            .unwrap_or_revert(&self.env());

        self.withdrawn.set(&position_id, true);

        self.env().emit_event(EmergencyWithdrawn {
            position_id,
            user: position.user,
            principal: position.principal,
            forfeited_yield,
            timestamp: now,
        });

        position.principal
    }

    /// Claim and put the yield back to work (owner only)
    ///
    /// With no target the yield is added to the same position's principal.
    /// With a target strategy it opens a new position there, subject to the
    /// target's minimum deposit.
    pub fn compound(&mut self, position_id: u64, target_strategy: Option<String>) -> CompoundOutcome {
        self.ensure_not_paused();
        let mut position = self.load_owned_position(position_id);
        let claim = self.claim_position(&mut position);

        let outcome = match target_strategy {
            None => {
                position.add_principal(claim.amount).unwrap_or_revert(&self.env());
                let principal = position.principal;
                self.positions.set(&position_id, position);
                CompoundOutcome {
                    claimed: claim.amount,
                    position_id,
                    principal,
                }
            }
            Some(name) => {
                self.positions.set(&position_id, position);
                let target = self.load_strategy(&name);
                let target_id = self.open_position(&target, None, claim.amount);
                CompoundOutcome {
                    claimed: claim.amount,
                    position_id: target_id,
                    principal: claim.amount,
                }
            }
        };

        self.env().emit_event(YieldCompounded {
            source_position_id: position_id,
            target_position_id: outcome.position_id,
            user: self.env().caller(),
            amount: claim.amount,
            timestamp: self.now(),
        });

        outcome
    }

    /// Live position; `None` once withdrawn
    pub fn get_position(&self, position_id: u64) -> Option<YieldPosition> {
        if self.withdrawn.get_or_default(&position_id) {
            return None;
        }
        self.positions.get(&position_id)
    }

    /// Live positions of a user with their current yield
    pub fn user_positions(&self, user: Address) -> Vec<YieldPositionView> {
        let now = self.now();
        (0..self.user_position_count.get_or_default(&user))
            .filter_map(|index| self.user_position_ids.get(&(user, index)))
            .filter_map(|id| self.get_position(id))
            .map(|position| {
                let strategy = self.load_strategy(&position.strategy_name);
                position.view(&strategy, now).unwrap_or_revert(&self.env())
            })
            .collect()
    }

    pub fn user_yield_stats(&self, user: Address) -> YieldStats {
        YieldStats::from_views(&self.user_positions(user)).unwrap_or_revert(&self.env())
    }

    // ========================================
    // Admin Functions
    // ========================================

    pub fn set_collateral_source(&mut self, new_source: Address) {
        self.only_admin();

        let old_source = self.collateral_source.get_or_revert_with(StrategyError::InvalidConfiguration);
        self.collateral_source.set(new_source);

        self.env().emit_event(CollateralSourceUpdated {
            old_source,
            new_source,
            updated_by: self.env().caller(),
        });
    }

    pub fn get_collateral_source(&self) -> Address {
        self.collateral_source.get_or_revert_with(StrategyError::InvalidConfiguration)
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(StrategyError::Unauthorized)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    pub fn pause(&mut self) {
        self.only_admin();
        self.paused.set(true);
        self.env().emit_event(ContractPaused {
            paused_by: self.env().caller(),
            timestamp: self.now(),
        });
    }

    pub fn unpause(&mut self) {
        self.only_admin();
        self.paused.set(false);
        self.env().emit_event(ContractUnpaused {
            unpaused_by: self.env().caller(),
            timestamp: self.now(),
        });
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn insert_strategy(&mut self, strategy: YieldStrategy) {
        let index = self.strategy_count.get_or_default();
        self.strategy_index.set(&index, strategy.name.clone());
        self.strategy_count.set(index + 1);

        self.env().emit_event(StrategyRegistered {
            name: strategy.name.clone(),
            apy: strategy.apy,
            minimum_deposit: strategy.minimum_deposit,
            registered_by: self.env().caller(),
        });
        let name = strategy.name.clone();
        self.strategies.set(&name, strategy);
    }

    fn open_position(&mut self, strategy: &YieldStrategy, vault_id: Option<u64>, principal: U256) -> u64 {
        strategy.check_deposit(principal).unwrap_or_revert(&self.env());

        let user = self.env().caller();
        let now = self.now();
        let position_id = self.next_position_id.get_or_default();
        self.positions.set(&position_id, YieldPosition {
            id: position_id,
            user,
            strategy_name: strategy.name.clone(),
            vault_id,
            principal,
            earned_claimed: U256::zero(),
            start_time: now,
            last_claim_time: now,
        });
        self.next_position_id.set(position_id + 1);
        let count = self.user_position_count.get_or_default(&user);
        self.user_position_ids.set(&(user, count), position_id);
        self.user_position_count.set(&user, count + 1);

        self.env().emit_event(YieldEnrolled {
            position_id,
            user,
            strategy_name: strategy.name.clone(),
            vault_id,
            principal,
            timestamp: now,
        });

        position_id
    }

    fn claim_position(&self, position: &mut YieldPosition) -> ClaimOutcome {
        let strategy = self.load_strategy(&position.strategy_name);
        let now = self.now();
        let outcome = position.claim(strategy.apy, now).unwrap_or_revert(&self.env());

        self.env().emit_event(YieldClaimed {
            position_id: position.id,
            user: position.user,
            amount: outcome.amount,
            total_earned: outcome.total_earned,
            timestamp: now,
        });

        outcome
    }

    fn vault_contribution(&self, user: Address, vault_id: u64) -> U256 {
        let source = self.collateral_source.get_or_revert_with(StrategyError::InvalidConfiguration);
        VaultCollateralOracleContractRef::new(self.env(), source)
            .get_collateral_value(user, vault_id)
            .unwrap_or_revert_with(&self.env(), StrategyError::CollateralUnavailable)
    }

    fn load_strategy(&self, name: &String) -> YieldStrategy {
        self.strategies
            .get(name)
            .unwrap_or_revert_with(&self.env(), StrategyError::StrategyNotFound)
    }

    fn load_position(&self, position_id: u64) -> YieldPosition {
        self.get_position(position_id)
            .unwrap_or_revert_with(&self.env(), StrategyError::PositionNotFound)
    }

    fn load_owned_position(&self, position_id: u64) -> YieldPosition {
        let position = self.load_position(position_id);
        if position.user != self.env().caller() {
            self.env().revert(StrategyError::Unauthorized);
        }
        position
    }

    fn now(&self) -> u64 {
        math::to_seconds(self.env().get_block_time())
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(StrategyError::Unauthorized);
        if caller != admin {
            self.env().revert(StrategyError::Unauthorized);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(StrategyError::ContractPaused);
        }
    }
}
