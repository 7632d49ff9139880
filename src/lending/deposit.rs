//! Lender positions earning a share of the pool's borrow APR

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use crate::math::{InterestMath, SafeMath};

/// Liquidity supplied to a pool by a lender
#[odra::odra_type]
pub struct LendingPosition {
    pub id: u64,
    pub lender: Address,
    pub pool_name: String,
    /// Principal currently supplied
    pub amount: U256,
    /// Lend APR snapshotted at deposit (percent, scaled by 1e18)
    pub interest_rate: U256,
    /// Start of the current accrual window (Unix seconds)
    pub start_time: u64,
    /// Interest settled by earlier withdrawals
    pub interest_settled: U256,
    pub active: bool,
}

/// Lender position together with its current earnings
#[odra::odra_type]
pub struct LendingPositionView {
    pub position: LendingPosition,
    /// Earned in the current accrual window
    pub earned_interest: U256,
    /// `amount + earned_interest`
    pub total_value: U256,
}

/// Result of a lender withdrawal
#[odra::odra_type]
pub struct WithdrawalOutcome {
    pub principal_returned: U256,
    /// Interest settled by this withdrawal
    pub interest_paid: U256,
    pub remaining_amount: U256,
}

impl LendingPosition {
    /// Interest earned since the start of the current window
    pub fn earned_interest(&self, now: u64) -> Result<U256, LendingError> {
        Ok(InterestMath::accrued(self.amount, self.interest_rate, self.start_time, now)?)
    }

    pub fn view(&self, now: u64) -> Result<LendingPositionView, LendingError> {
        let earned_interest = self.earned_interest(now)?;
        Ok(LendingPositionView {
            position: self.clone(),
            earned_interest,
            total_value: SafeMath::add(self.amount, earned_interest)?,
        })
    }

    /// Takes `amount` out of the position, settling interest earned so far
    pub fn withdraw(&mut self, amount: U256, now: u64) -> Result<WithdrawalOutcome, LendingError> {
        if !self.active {
            return Err(LendingError::PositionNotFound);
        }
        if amount.is_zero() {
            return Err(LendingError::ZeroAmount);
        }
        if amount > self.amount {
            return Err(LendingError::InsufficientBalance);
        }

        let interest_paid = self.earned_interest(now)?;
        self.interest_settled = SafeMath::add(self.interest_settled, interest_paid)?;
        self.amount = SafeMath::sub(self.amount, amount)?;
        self.start_time = now;
        if self.amount.is_zero() {
            self.active = false;
        }

        Ok(WithdrawalOutcome {
            principal_returned: amount,
            interest_paid,
            remaining_amount: self.amount,
        })
    }
}
