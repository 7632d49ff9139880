//! Lending Protocol - borrowing against travel-savings vault contributions
//!
//! Named pools lend liquidity against the value of a user's savings-vault
//! contribution. Loans accrue simple interest at the APR frozen when they were
//! opened; lenders earn a fixed share of the pool's borrow APR.
//!
//! Collateral values come either from the caller or from the
//! `VaultCollateralOracle`, which stands in for the savings-vault contracts.

pub mod protocol;
pub mod pool;
pub mod loan;
pub mod health;
pub mod deposit;
pub mod collateral_source;
pub mod errors;
pub mod events;

#[cfg(test)]
mod tests;

pub use protocol::{LendingProtocol, ProtocolStats};
pub use pool::{LendingPool, PoolParams, PoolStats};
pub use loan::{LiquidationOutcome, LoanPosition, RepaymentOutcome};
pub use health::{HealthEvaluator, HealthStatus, LoanHealth};
pub use deposit::{LendingPosition, LendingPositionView, WithdrawalOutcome};
pub use collateral_source::VaultCollateralOracle;
pub use errors::LendingError;
pub use events::*;
