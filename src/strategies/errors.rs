//! Error types for yield strategies

use odra::prelude::*;
use crate::math::MathError;

#[odra::odra_error]
pub enum StrategyError {
    /// No strategy registered under the name
    StrategyNotFound = 1,
    /// Strategy name already registered
    DuplicateStrategy = 2,
    /// Principal below the strategy's minimum deposit
    BelowMinimumDeposit = 3,
    /// No yield accrued since the last claim
    NothingToClaim = 4,
    /// Accrual window ends before it starts
    InvalidTimeRange = 5,
    /// Collateral source has no valuation for the vault
    CollateralUnavailable = 6,
    /// Position not found or already withdrawn
    PositionNotFound = 7,
    /// Unauthorized access
    Unauthorized = 8,
    /// Contract paused
    ContractPaused = 9,
    /// Invalid strategy parameters
    InvalidConfiguration = 10,
    /// Math overflow occurred
    MathOverflow = 11,
    /// Math underflow occurred
    MathUnderflow = 12,
    /// Division by zero
    DivisionByZero = 13,
}

impl From<MathError> for StrategyError {
    fn from(error: MathError) -> Self {
        match error {
            MathError::Overflow => StrategyError::MathOverflow,
            MathError::Underflow => StrategyError::MathUnderflow,
            MathError::DivisionByZero => StrategyError::DivisionByZero,
            MathError::InvalidTimeRange => StrategyError::InvalidTimeRange,
        }
    }
}
