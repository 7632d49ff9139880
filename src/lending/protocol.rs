//! Lending Protocol - pools, loans and lender deposits
//!
//! Core contract that coordinates:
//! - Pool registry (liquidity, borrowed totals, risk parameters)
//! - Borrowing against savings-vault collateral
//! - Repayments and liquidations
//! - Lender deposits and withdrawals
//!
//! Each entry point loads what it needs, runs the pure accounting in
//! `pool`, `loan`, `health` and `deposit`, and writes back only once every
//! check has passed. A revert discards the whole call.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use super::collateral_source::VaultCollateralOracleContractRef;
use super::deposit::{LendingPosition, LendingPositionView, WithdrawalOutcome};
use super::errors::LendingError;
use super::events::*;
use super::health::{HealthEvaluator, LoanHealth};
use super::loan::{LiquidationOutcome, LoanPosition, PoolSettlement, RepaymentOutcome};
use super::pool::{default_pools, Adjustment, LendingPool, PoolParams, PoolStats};
use crate::math;

/// Protocol-wide counters
#[odra::odra_type]
pub struct ProtocolStats {
    pub pool_count: u32,
    /// Loans ever opened
    pub total_loans: u64,
    /// Loans neither repaid nor liquidated
    pub active_loans: u64,
    /// Lender positions ever opened
    pub lending_positions: u64,
}

/// Lending Protocol contract
#[odra::module]
pub struct LendingProtocol {
    /// Pools by name
    pools: Mapping<String, LendingPool>,
    /// Pool names in registration order
    pool_index: Mapping<u32, String>,
    /// Number of registered pools
    pool_count: Var<u32>,
    /// Loans by id
    loans: Mapping<u64, LoanPosition>,
    /// Next loan id
    next_loan_id: Var<u64>,
    /// Number of open loans
    active_loans: Var<u64>,
    /// Loan ids per borrower: (borrower, index) -> loan id
    borrower_loan_ids: Mapping<(Address, u32), u64>,
    /// Number of loans per borrower
    borrower_loan_count: Mapping<Address, u32>,
    /// Lender positions by id
    lending_positions: Mapping<u64, LendingPosition>,
    /// Next lender position id
    next_position_id: Var<u64>,
    /// Position ids per lender: (lender, index) -> position id
    lender_position_ids: Mapping<(Address, u32), u64>,
    /// Number of positions per lender
    lender_position_count: Mapping<Address, u32>,
    /// Vault collateral oracle address
    collateral_source: Var<Address>,
    /// Admin address
    admin: Var<Address>,
    /// Paused state
    paused: Var<bool>,
}

#[odra::module]
impl LendingProtocol {
    /// Initialize the protocol with the default travel pools
    pub fn init(&mut self, collateral_source: Address) {
        let caller = self.env().caller();

        self.admin.set(caller);
        self.paused.set(false);
        self.collateral_source.set(collateral_source);
        self.next_loan_id.set(1);
        self.next_position_id.set(1);
        self.active_loans.set(0);
        self.pool_count.set(0);

        for pool in default_pools() {
            self.insert_pool(pool);
        }
    }

    // ========================================
    // Pool Registry
    // ========================================

    /// Register a new pool (admin only)
    pub fn register_pool(
        &mut self,
        name: String,
        display_name: String,
        initial_liquidity: U256,
        params: PoolParams,
    ) {
        self.only_admin();

        if self.pools.get(&name).is_some() {
            self.env().revert(LendingError::DuplicatePool);
        }
        let pool = LendingPool::new(name, display_name, initial_liquidity, params)
            .unwrap_or_revert(&self.env());
        self.insert_pool(pool);
    }

    /// Replace a pool's risk parameters (admin only)
    ///
    /// Open loans and lender positions keep their snapshotted rates.
    pub fn reconfigure_pool(&mut self, name: String, params: PoolParams) {
        self.only_admin();

        let mut pool = self.load_pool(&name);
        params.validate().unwrap_or_revert(&self.env());
        pool.params = params;
        self.pools.set(&name, pool.clone());

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(PoolReconfigured {
            pool_name: name,
            borrow_apr: pool.params.borrow_apr,
            collateral_ratio: pool.params.collateral_ratio,
            liquidation_threshold: pool.params.liquidation_threshold,
            updated_by: admin,
            timestamp: self.now(),
        });
    }

    pub fn get_pool(&self, name: String) -> LendingPool {
        self.load_pool(&name)
    }

    /// Registered pool names in registration order
    pub fn pool_names(&self) -> Vec<String> {
        (0..self.pool_count.get_or_default())
            .filter_map(|index| self.pool_index.get(&index))
            .collect()
    }

    pub fn pool_stats(&self, name: String) -> PoolStats {
        self.load_pool(&name).stats().unwrap_or_revert(&self.env())
    }

    pub fn protocol_stats(&self) -> ProtocolStats {
        ProtocolStats {
            pool_count: self.pool_count.get_or_default(),
            total_loans: self.loan_count(),
            active_loans: self.active_loans.get_or_default(),
            lending_positions: self.next_position_id.get_or_default().saturating_sub(1),
        }
    }

    // ========================================
    // Borrowing
    // ========================================

    /// Borrow from `pool_name` against a caller-supplied collateral valuation
    pub fn borrow(&mut self, pool_name: String, collateral_value: U256, amount: U256) -> u64 {
        self.ensure_not_paused();
        let pool = self.load_pool(&pool_name);
        self.open_loan(pool, None, collateral_value, amount)
    }

    /// Borrow from `pool_name` against the caller's contribution to `vault_id`
    pub fn borrow_against_vault(&mut self, pool_name: String, vault_id: u64, amount: U256) -> u64 {
        self.ensure_not_paused();
        let pool = self.load_pool(&pool_name);
        let collateral_value = self.vault_collateral(self.env().caller(), vault_id);
        self.open_loan(pool, Some(vault_id), collateral_value, amount)
    }

    /// Repay part or all of a loan
    ///
    /// Anyone may repay. Payments above the current debt are capped at the debt.
    pub fn repay(&mut self, loan_id: u64, amount: U256) -> RepaymentOutcome {
        self.ensure_not_paused();

        let loan = self.load_loan(loan_id);
        let now = self.now();
        let plan = loan.plan_repayment(amount, now).unwrap_or_revert(&self.env());

        let mut pool = self.load_pool(&loan.pool_name);
        self.settle(&mut pool, plan.settlement);

        self.pools.set(&loan.pool_name, pool);
        self.loans.set(&loan_id, plan.loan);
        if plan.outcome.closed {
            self.active_loans.set(self.active_loans.get_or_default().saturating_sub(1));
        }

        self.env().emit_event(LoanRepaid {
            loan_id,
            payer: self.env().caller(),
            amount: plan.outcome.repaid,
            remaining_debt: plan.outcome.remaining_debt,
            closed: plan.outcome.closed,
            timestamp: now,
        });

        plan.outcome
    }

    // ========================================
    // Health & Liquidation
    // ========================================

    /// Health of a loan against the given collateral valuation
    pub fn loan_health(&self, loan_id: u64, collateral_value: U256) -> LoanHealth {
        let loan = self.load_loan(loan_id);
        let pool = self.load_pool(&loan.pool_name);
        HealthEvaluator::evaluate(&loan, pool.params.liquidation_threshold, collateral_value, self.now())
            .unwrap_or_revert(&self.env())
    }

    /// Health of a vault-backed loan, valued through the collateral source
    pub fn loan_health_from_vault(&self, loan_id: u64) -> LoanHealth {
        let loan = self.load_loan(loan_id);
        let collateral_value = self.linked_vault_collateral(&loan);
        self.loan_health(loan_id, collateral_value)
    }

    /// Liquidate a loan below its pool's liquidation threshold
    ///
    /// The liquidator pays off the full debt and receives the seized
    /// collateral value less the pool's liquidation discount.
    pub fn liquidate(&mut self, loan_id: u64, collateral_value: U256) -> LiquidationOutcome {
        self.ensure_not_paused();

        let loan = self.load_loan(loan_id);
        let mut pool = self.load_pool(&loan.pool_name);
        let now = self.now();
        let plan = loan
            .plan_liquidation(&pool.params, collateral_value, now)
            .unwrap_or_revert(&self.env());

        self.settle(&mut pool, plan.settlement);

        self.pools.set(&loan.pool_name, pool);
        self.loans.set(&loan_id, plan.loan);
        self.active_loans.set(self.active_loans.get_or_default().saturating_sub(1));

        self.env().emit_event(LoanLiquidated {
            loan_id,
            borrower: loan.borrower,
            liquidator: self.env().caller(),
            debt_cleared: plan.outcome.debt_cleared,
            collateral_seized: plan.outcome.collateral_seized,
            collateral_received: plan.outcome.collateral_received,
            timestamp: now,
        });

        plan.outcome
    }

    /// Liquidate a vault-backed loan, valued through the collateral source
    pub fn liquidate_from_vault(&mut self, loan_id: u64) -> LiquidationOutcome {
        let loan = self.load_loan(loan_id);
        let collateral_value = self.linked_vault_collateral(&loan);
        self.liquidate(loan_id, collateral_value)
    }

    // ========================================
    // Lending Deposits
    // ========================================

    /// Supply liquidity to a pool
    pub fn deposit(&mut self, pool_name: String, amount: U256) -> u64 {
        self.ensure_not_paused();

        let mut pool = self.load_pool(&pool_name);
        if amount < pool.params.min_deposit {
            self.env().revert(LendingError::BelowMinimum);
        }
        // Only reachable when the pool has no minimum
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let interest_rate = pool.lend_apr().unwrap_or_revert(&self.env());
        pool.adjust_liquidity(Adjustment::Increase(amount))
            .unwrap_or_revert(&self.env());

        let lender = self.env().caller();
        let now = self.now();
        let position_id = self.next_position_id.get_or_default();
        let position = LendingPosition {
            id: position_id,
            lender,
            pool_name: pool_name.clone(),
            amount,
            interest_rate,
            start_time: now,
            interest_settled: U256::zero(),
            active: true,
        };

        self.pools.set(&pool_name, pool);
        self.lending_positions.set(&position_id, position);
        self.next_position_id.set(position_id + 1);
        let count = self.lender_position_count.get_or_default(&lender);
        self.lender_position_ids.set(&(lender, count), position_id);
        self.lender_position_count.set(&lender, count + 1);

        self.env().emit_event(LiquidityDeposited {
            position_id,
            lender,
            pool_name,
            amount,
            interest_rate,
            timestamp: now,
        });

        position_id
    }

    /// Withdraw supplied liquidity that is not currently lent out
    pub fn withdraw_lending(&mut self, position_id: u64, amount: U256) -> WithdrawalOutcome {
        self.ensure_not_paused();

        let mut position = self.load_position(position_id);
        let caller = self.env().caller();
        if caller != position.lender {
            self.env().revert(LendingError::Unauthorized);
        }

        let now = self.now();
        let outcome = position.withdraw(amount, now).unwrap_or_revert(&self.env());

        let mut pool = self.load_pool(&position.pool_name);
        pool.adjust_liquidity(Adjustment::Decrease(amount))
            .unwrap_or_revert(&self.env());

        let pool_name = position.pool_name.clone();
        self.pools.set(&pool_name, pool);
        self.lending_positions.set(&position_id, position);

        self.env().emit_event(LiquidityWithdrawn {
            position_id,
            lender: caller,
            pool_name,
            amount,
            interest_paid: outcome.interest_paid,
            timestamp: now,
        });

        outcome
    }

    /// Interest earned by a lender position in its current accrual window
    pub fn earned_interest(&self, position_id: u64) -> U256 {
        self.load_position(position_id)
            .earned_interest(self.now())
            .unwrap_or_revert(&self.env())
    }

    pub fn get_lending_position(&self, position_id: u64) -> Option<LendingPosition> {
        self.lending_positions.get(&position_id)
    }

    /// Active positions of a lender with their current earnings
    pub fn lender_positions(&self, lender: Address) -> Vec<LendingPositionView> {
        let now = self.now();
        (0..self.lender_position_count.get_or_default(&lender))
            .filter_map(|index| self.lender_position_ids.get(&(lender, index)))
            .filter_map(|id| self.lending_positions.get(&id))
            .filter(|position| position.active)
            .map(|position| position.view(now).unwrap_or_revert(&self.env()))
            .collect()
    }

    // ========================================
    // Loan Views
    // ========================================

    pub fn get_loan(&self, loan_id: u64) -> Option<LoanPosition> {
        self.loans.get(&loan_id)
    }

    /// Loans ever opened, including closed ones
    pub fn loan_count(&self) -> u64 {
        self.next_loan_id.get_or_default().saturating_sub(1)
    }

    /// Principal plus accrued interest of an open loan
    pub fn loan_debt(&self, loan_id: u64) -> U256 {
        let loan = self.load_loan(loan_id);
        loan.ensure_active().unwrap_or_revert(&self.env());
        loan.total_debt(self.now()).unwrap_or_revert(&self.env())
    }

    /// Open loans of a borrower
    pub fn borrower_loans(&self, borrower: Address) -> Vec<LoanPosition> {
        (0..self.borrower_loan_count.get_or_default(&borrower))
            .filter_map(|index| self.borrower_loan_ids.get(&(borrower, index)))
            .filter_map(|id| self.loans.get(&id))
            .filter(|loan| loan.active)
            .collect()
    }

    // ========================================
    // Admin Functions
    // ========================================

    pub fn set_collateral_source(&mut self, new_source: Address) {
        self.only_admin();

        let old_source = self.collateral_source.get_or_revert_with(LendingError::InvalidConfiguration);
        self.collateral_source.set(new_source);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(CollateralSourceUpdated {
            old_source,
            new_source,
            updated_by: admin,
        });
    }

    pub fn get_collateral_source(&self) -> Address {
        self.collateral_source.get_or_revert_with(LendingError::InvalidConfiguration)
    }

    pub fn get_admin(&self) -> Address {
        self.admin.get_or_revert_with(LendingError::Unauthorized)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    pub fn pause(&mut self) {
        self.only_admin();
        self.paused.set(true);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(ContractPaused {
            paused_by: admin,
            timestamp: self.now(),
        });
    }

    pub fn unpause(&mut self) {
        self.only_admin();
        self.paused.set(false);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(ContractUnpaused {
            unpaused_by: admin,
            timestamp: self.now(),
        });
    }

    // ========================================
    // Internal Functions
    // ========================================

    fn open_loan(
        &mut self,
        mut pool: LendingPool,
        vault_id: Option<u64>,
        collateral_value: U256,
        amount: U256,
    ) -> u64 {
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }
        if collateral_value.is_zero() {
            self.env().revert(LendingError::InsufficientCollateral);
        }
        if !pool.covers_collateral_ratio(collateral_value, amount).unwrap_or_revert(&self.env()) {
            self.env().revert(LendingError::InsufficientCollateral);
        }
        pool.adjust_borrowed(Adjustment::Increase(amount))
            .unwrap_or_revert(&self.env());

        let borrower = self.env().caller();
        let now = self.now();
        let loan_id = self.next_loan_id.get_or_default();
        let loan = LoanPosition {
            id: loan_id,
            borrower,
            pool_name: pool.name.clone(),
            vault_id,
            collateral_value_at_origination: collateral_value,
            principal: amount,
            interest_rate: pool.params.borrow_apr,
            start_time: now,
            last_payment_time: now,
            active: true,
        };

        let pool_name = pool.name.clone();
        let interest_rate = pool.params.borrow_apr;
        self.pools.set(&pool_name, pool);
        self.loans.set(&loan_id, loan);
        self.next_loan_id.set(loan_id + 1);
        self.active_loans.set(self.active_loans.get_or_default() + 1);
        let count = self.borrower_loan_count.get_or_default(&borrower);
        self.borrower_loan_ids.set(&(borrower, count), loan_id);
        self.borrower_loan_count.set(&borrower, count + 1);

        self.env().emit_event(LoanOpened {
            loan_id,
            borrower,
            pool_name,
            amount,
            collateral_value,
            interest_rate,
            timestamp: now,
        });

        loan_id
    }

    /// Moves retired principal out of `total_borrowed` and interest into `total_liquidity`
    ///
    /// Principal closed out as dust without being paid leaves `total_liquidity` too.
    fn settle(&self, pool: &mut LendingPool, settlement: PoolSettlement) {
        pool.adjust_borrowed(Adjustment::Decrease(settlement.principal_retired))
            .unwrap_or_revert(&self.env());
        pool.adjust_liquidity(Adjustment::Increase(settlement.interest_income))
            .unwrap_or_revert(&self.env());
        pool.adjust_liquidity(Adjustment::Decrease(settlement.debt_forgiven))
            .unwrap_or_revert(&self.env());
    }

    fn insert_pool(&mut self, pool: LendingPool) {
        let index = self.pool_count.get_or_default();
        self.pool_index.set(&index, pool.name.clone());
        self.pool_count.set(index + 1);

        self.env().emit_event(PoolRegistered {
            pool_name: pool.name.clone(),
            initial_liquidity: pool.total_liquidity,
            borrow_apr: pool.params.borrow_apr,
            collateral_ratio: pool.params.collateral_ratio,
            liquidation_threshold: pool.params.liquidation_threshold,
            timestamp: self.now(),
        });
        let name = pool.name.clone();
        self.pools.set(&name, pool);
    }

    fn vault_collateral(&self, user: Address, vault_id: u64) -> U256 {
        let source = self.collateral_source.get_or_revert_with(LendingError::InvalidConfiguration);
        VaultCollateralOracleContractRef::new(self.env(), source)
            .get_collateral_value(user, vault_id)
            .unwrap_or_revert_with(&self.env(), LendingError::CollateralUnavailable)
    }

    fn linked_vault_collateral(&self, loan: &LoanPosition) -> U256 {
        let vault_id = loan
            .vault_id
            .unwrap_or_revert_with(&self.env(), LendingError::MissingVaultLink);
        self.vault_collateral(loan.borrower, vault_id)
    }

    fn load_pool(&self, name: &String) -> LendingPool {
        self.pools
            .get(name)
            .unwrap_or_revert_with(&self.env(), LendingError::PoolNotFound)
    }

    fn load_loan(&self, loan_id: u64) -> LoanPosition {
        self.loans
            .get(&loan_id)
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFound)
    }

    fn load_position(&self, position_id: u64) -> LendingPosition {
        self.lending_positions
            .get(&position_id)
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound)
    }

    fn now(&self) -> u64 {
        math::to_seconds(self.env().get_block_time())
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::ContractPaused);
        }
    }
}
