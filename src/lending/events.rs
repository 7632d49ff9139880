//! Events for the lending ledgers

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Pool Registry Events
// ============================================================================

/// Event emitted when a pool is registered
#[odra::event]
pub struct PoolRegistered {
    /// Registry key of the pool
    pub pool_name: String,
    /// Liquidity the pool starts with
    pub initial_liquidity: U256,
    /// Borrow APR (percent, scaled by 1e18)
    pub borrow_apr: U256,
    /// Required collateral ratio (scaled by 1e18)
    pub collateral_ratio: U256,
    /// Liquidation threshold (scaled by 1e18)
    pub liquidation_threshold: U256,
    /// Timestamp of registration
    pub timestamp: u64,
}

/// Event emitted when a pool's risk parameters change
#[odra::event]
pub struct PoolReconfigured {
    pub pool_name: String,
    pub borrow_apr: U256,
    pub collateral_ratio: U256,
    pub liquidation_threshold: U256,
    pub updated_by: Address,
    pub timestamp: u64,
}

// ============================================================================
// Loan Events
// ============================================================================

/// Event emitted when a loan is opened
#[odra::event]
pub struct LoanOpened {
    /// Id of the new loan
    pub loan_id: u64,
    /// Address that borrowed
    pub borrower: Address,
    /// Pool the funds came from
    pub pool_name: String,
    /// Amount borrowed
    pub amount: U256,
    /// Collateral value at origination
    pub collateral_value: U256,
    /// Borrow APR frozen for the loan's life
    pub interest_rate: U256,
    /// Timestamp of borrow
    pub timestamp: u64,
}

/// Event emitted when a loan is repaid in part or in full
#[odra::event]
pub struct LoanRepaid {
    pub loan_id: u64,
    /// Address that paid
    pub payer: Address,
    /// Amount applied to the loan
    pub amount: U256,
    /// Debt left afterwards
    pub remaining_debt: U256,
    /// Whether the loan closed
    pub closed: bool,
    pub timestamp: u64,
}

/// Event emitted when a loan is liquidated
#[odra::event]
pub struct LoanLiquidated {
    pub loan_id: u64,
    pub borrower: Address,
    pub liquidator: Address,
    /// Debt paid off by the liquidator
    pub debt_cleared: U256,
    /// Collateral value seized
    pub collateral_seized: U256,
    /// Collateral value received after the discount
    pub collateral_received: U256,
    pub timestamp: u64,
}

// ============================================================================
// Lending Deposit Events
// ============================================================================

/// Event emitted when a lender supplies liquidity
#[odra::event]
pub struct LiquidityDeposited {
    pub position_id: u64,
    pub lender: Address,
    pub pool_name: String,
    pub amount: U256,
    /// Lend APR snapshotted for the position
    pub interest_rate: U256,
    pub timestamp: u64,
}

/// Event emitted when a lender withdraws liquidity
#[odra::event]
pub struct LiquidityWithdrawn {
    pub position_id: u64,
    pub lender: Address,
    pub pool_name: String,
    pub amount: U256,
    /// Interest settled with the withdrawal
    pub interest_paid: U256,
    pub timestamp: u64,
}

// ============================================================================
// Collateral Source Events
// ============================================================================

/// Event emitted when a vault contribution is valued
#[odra::event]
pub struct CollateralReported {
    pub user: Address,
    pub vault_id: u64,
    pub value: U256,
    pub reporter: Address,
    pub timestamp: u64,
}

/// Event emitted when a vault's valuations are switched off or back on
#[odra::event]
pub struct VaultDisabled {
    pub vault_id: u64,
    pub disabled: bool,
    pub timestamp: u64,
}

/// Event emitted when a reporter is granted or loses publishing rights
#[odra::event]
pub struct ReporterUpdated {
    pub reporter: Address,
    pub enabled: bool,
    pub updated_by: Address,
}

/// Event emitted when the report staleness window changes
#[odra::event]
pub struct MaxStalenessUpdated {
    pub old_staleness: u64,
    pub new_staleness: u64,
    pub updated_by: Address,
}

/// Event emitted when the collateral source changes
#[odra::event]
pub struct CollateralSourceUpdated {
    pub old_source: Address,
    pub new_source: Address,
    pub updated_by: Address,
}

// ============================================================================
// Admin Events
// ============================================================================

/// Event emitted when the protocol is paused
#[odra::event]
pub struct ContractPaused {
    pub paused_by: Address,
    pub timestamp: u64,
}

/// Event emitted when the protocol is unpaused
#[odra::event]
pub struct ContractUnpaused {
    pub unpaused_by: Address,
    pub timestamp: u64,
}
