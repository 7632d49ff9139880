//! Events for yield strategies

use odra::prelude::*;
use odra::casper_types::U256;

/// Event emitted when a strategy is registered
#[odra::event]
pub struct StrategyRegistered {
    pub name: String,
    pub apy: U256,
    pub minimum_deposit: U256,
    pub registered_by: Address,
}

/// Event emitted when principal is enrolled in a strategy
#[odra::event]
pub struct YieldEnrolled {
    pub position_id: u64,
    pub user: Address,
    pub strategy_name: String,
    pub vault_id: Option<u64>,
    pub principal: U256,
    pub timestamp: u64,
}

/// Event emitted when yield is claimed
#[odra::event]
pub struct YieldClaimed {
    pub position_id: u64,
    pub user: Address,
    pub amount: U256,
    pub total_earned: U256,
    pub timestamp: u64,
}

/// Event emitted when claimed yield is put back to work
#[odra::event]
pub struct YieldCompounded {
    /// Position the yield was claimed from
    pub source_position_id: u64,
    /// Position that received it
    pub target_position_id: u64,
    pub user: Address,
    pub amount: U256,
    pub timestamp: u64,
}

/// Event emitted when a position is withdrawn without claiming
#[odra::event]
pub struct EmergencyWithdrawn {
    pub position_id: u64,
    pub user: Address,
    pub principal: U256,
    /// Unclaimed yield given up
    pub forfeited_yield: U256,
    pub timestamp: u64,
}

/// Event emitted when the collateral source changes
#[odra::event]
pub struct CollateralSourceUpdated {
    pub old_source: Address,
    pub new_source: Address,
    pub updated_by: Address,
}

/// Event emitted when the manager is paused
#[odra::event]
pub struct ContractPaused {
    pub paused_by: Address,
    pub timestamp: u64,
}

/// Event emitted when the manager is unpaused
#[odra::event]
pub struct ContractUnpaused {
    pub unpaused_by: Address,
    pub timestamp: u64,
}
