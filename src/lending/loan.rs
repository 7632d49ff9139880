//! Loan positions and their settlement arithmetic
//!
//! Interest accounting is re-basing: every repayment folds accrued interest
//! into a smaller principal and restarts the accrual clock. Principal and
//! interest are not tracked separately once a payment has been made.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use super::health::{HealthEvaluator, HealthStatus};
use super::pool::PoolParams;
use crate::math::{self, InterestMath, SafeMath};

/// Remaining debt at or below which a loan is considered repaid (0.001)
pub const DEBT_DUST: u128 = 1_000_000_000_000_000;

/// A borrow against savings-vault collateral
#[odra::odra_type]
pub struct LoanPosition {
    /// Loan id, assigned monotonically from 1
    pub id: u64,
    pub borrower: Address,
    pub pool_name: String,
    /// Vault whose contribution backs the loan, when opened through the collateral source
    pub vault_id: Option<u64>,
    pub collateral_value_at_origination: U256,
    /// Outstanding principal, excluding interest accrued since `start_time`
    pub principal: U256,
    /// Borrow APR snapshotted at origination (percent, scaled by 1e18)
    pub interest_rate: U256,
    /// Start of the current accrual window (Unix seconds)
    pub start_time: u64,
    pub last_payment_time: u64,
    pub active: bool,
}

/// Result of a repayment
#[odra::odra_type]
pub struct RepaymentOutcome {
    /// Amount actually applied to the loan
    pub repaid: U256,
    /// Debt left after the payment (zero once closed)
    pub remaining_debt: U256,
    pub closed: bool,
}

/// Result of a liquidation
#[odra::odra_type]
pub struct LiquidationOutcome {
    /// Principal plus accrued interest paid off by the liquidator
    pub debt_cleared: U256,
    /// Collateral value taken from the borrower
    pub collateral_seized: U256,
    /// Seized value after the liquidation discount
    pub collateral_received: U256,
    /// `collateral_received - debt_cleared` when positive
    pub liquidator_reward: U256,
    /// `debt_cleared - collateral_received` when positive
    pub liquidator_shortfall: U256,
}

/// How a settlement moves the pool totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettlement {
    /// Principal returned to the pool (reduces `total_borrowed`)
    pub principal_retired: U256,
    /// Interest paid into the pool (adds to `total_liquidity`)
    pub interest_income: U256,
    /// Retired principal that was never paid back (dust written off `total_liquidity`)
    pub debt_forgiven: U256,
}

/// Repayment applied to a loan, ready to be written back
pub struct RepaymentPlan {
    pub loan: LoanPosition,
    pub outcome: RepaymentOutcome,
    pub settlement: PoolSettlement,
}

/// Liquidation applied to a loan, ready to be written back
pub struct LiquidationPlan {
    pub loan: LoanPosition,
    pub outcome: LiquidationOutcome,
    pub settlement: PoolSettlement,
}

impl LoanPosition {
    /// Fails unless the loan is still open
    pub fn ensure_active(&self) -> Result<(), LendingError> {
        if !self.active {
            return Err(LendingError::LoanClosed);
        }
        Ok(())
    }

    /// Interest accrued since the start of the current window
    pub fn accrued_interest(&self, now: u64) -> Result<U256, LendingError> {
        Ok(InterestMath::accrued(self.principal, self.interest_rate, self.start_time, now)?)
    }

    /// Principal plus accrued interest
    pub fn total_debt(&self, now: u64) -> Result<U256, LendingError> {
        Ok(SafeMath::add(self.principal, self.accrued_interest(now)?)?)
    }

    /// Applies a payment of `amount` at `now`
    pub fn plan_repayment(&self, amount: U256, now: u64) -> Result<RepaymentPlan, LendingError> {
        self.ensure_active()?;
        if amount.is_zero() {
            return Err(LendingError::ZeroAmount);
        }

        let total_debt = self.total_debt(now)?;
        let repaid = SafeMath::min(amount, total_debt);
        let remaining = SafeMath::sub(total_debt, repaid)?;

        let mut loan = self.clone();
        let closed = remaining <= U256::from(DEBT_DUST);
        if closed {
            loan.principal = U256::zero();
            loan.active = false;
        } else {
            // principal * (1 - repaid / total_debt)
            loan.principal = SafeMath::mul_div(self.principal, remaining, total_debt)?;
            loan.start_time = now;
        }
        loan.last_payment_time = now;

        let principal_retired = SafeMath::sub(self.principal, loan.principal)?;
        let settlement = PoolSettlement {
            principal_retired,
            interest_income: repaid.saturating_sub(principal_retired),
            debt_forgiven: principal_retired.saturating_sub(repaid),
        };
        let outcome = RepaymentOutcome {
            repaid,
            remaining_debt: if closed { U256::zero() } else { remaining },
            closed,
        };

        Ok(RepaymentPlan { loan, outcome, settlement })
    }

    /// Closes the loan against `collateral_value`, provided it is liquidatable
    pub fn plan_liquidation(
        &self,
        params: &PoolParams,
        collateral_value: U256,
        now: u64,
    ) -> Result<LiquidationPlan, LendingError> {
        self.ensure_active()?;

        let health = HealthEvaluator::evaluate(self, params.liquidation_threshold, collateral_value, now)?;
        if health.status != HealthStatus::Liquidatable {
            return Err(LendingError::LoanNotLiquidatable);
        }

        let keep = SafeMath::sub(math::scale(), params.liquidation_discount)?;
        let collateral_received = SafeMath::mul_scaled(collateral_value, keep)?;
        let debt_cleared = health.total_debt;

        let mut loan = self.clone();
        loan.principal = U256::zero();
        loan.active = false;
        loan.last_payment_time = now;

        let outcome = LiquidationOutcome {
            debt_cleared,
            collateral_seized: collateral_value,
            collateral_received,
            liquidator_reward: collateral_received.saturating_sub(debt_cleared),
            liquidator_shortfall: debt_cleared.saturating_sub(collateral_received),
        };
        let settlement = PoolSettlement {
            principal_retired: self.principal,
            interest_income: health.accrued_interest,
            debt_forgiven: U256::zero(),
        };

        Ok(LiquidationPlan { loan, outcome, settlement })
    }
}
