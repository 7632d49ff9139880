//! Error types for the lending ledgers

use odra::prelude::*;
use crate::math::MathError;

/// Errors that can occur in pools, loans and lending deposits
#[odra::odra_error]
pub enum LendingError {
    // Pool Registry Errors
    /// No pool registered under the given name
    PoolNotFound = 1,
    /// A pool with the given name already exists
    DuplicatePool = 2,
    /// Operation would push borrowed funds above pool liquidity
    InsufficientLiquidity = 3,

    // Loan Errors
    /// Collateral does not cover the pool's collateral ratio
    InsufficientCollateral = 4,
    /// Unknown loan id
    LoanNotFound = 5,
    /// Loan was already repaid or liquidated
    LoanClosed = 6,
    /// Loan is not below its liquidation threshold
    LoanNotLiquidatable = 7,
    /// Loan was opened without a vault link
    MissingVaultLink = 8,

    // Lending Deposit Errors
    /// Deposit is below the pool minimum
    BelowMinimum = 9,
    /// Withdrawal exceeds the lending position
    InsufficientBalance = 10,
    /// Unknown lending position id
    PositionNotFound = 11,

    // Collateral Source Errors
    /// Collateral valuation could not be obtained
    CollateralUnavailable = 12,

    // Access Control Errors
    /// Caller is not authorized
    Unauthorized = 13,
    /// Contract is paused
    ContractPaused = 14,
    /// Invalid configuration parameter
    InvalidConfiguration = 15,

    // General Errors
    /// Zero amount not allowed
    ZeroAmount = 16,
    /// Accrual window ends before it starts
    InvalidTimeRange = 17,
    /// Math overflow occurred
    MathOverflow = 18,
    /// Math underflow occurred
    MathUnderflow = 19,
    /// Division by zero
    DivisionByZero = 20,
}

impl From<MathError> for LendingError {
    fn from(error: MathError) -> Self {
        match error {
            MathError::Overflow => LendingError::MathOverflow,
            MathError::Underflow => LendingError::MathUnderflow,
            MathError::DivisionByZero => LendingError::DivisionByZero,
            MathError::InvalidTimeRange => LendingError::InvalidTimeRange,
        }
    }
}
