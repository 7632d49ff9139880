//! Yield strategies and the positions enrolled in them
//!
//! Yield is simple interest on the principal since the last claim. Claiming
//! moves the accrual baseline; the principal only changes when claimed yield
//! is compounded back into the same position.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::StrategyError;
use crate::math::{self, InterestMath, SafeMath};

pub const CONSERVATIVE: &str = "CONSERVATIVE";
pub const LIQUIDITY: &str = "LIQUIDITY";
pub const AGGRESSIVE: &str = "AGGRESSIVE";
pub const TRAVEL_TOKENS: &str = "TRAVEL_TOKENS";

#[odra::odra_type]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A named yield product; immutable once registered
#[odra::odra_type]
pub struct YieldStrategy {
    pub name: String,
    pub display_name: String,
    /// Annual yield in percent (scaled by 1e18). Example: 5.5% = 5.5 * 1e18
    pub apy: U256,
    pub risk_level: RiskLevel,
    /// Smallest principal accepted at enrollment
    pub minimum_deposit: U256,
}

impl YieldStrategy {
    pub fn new(
        name: String,
        display_name: String,
        apy: U256,
        risk_level: RiskLevel,
        minimum_deposit: U256,
    ) -> Result<Self, StrategyError> {
        if apy.is_zero() || name.is_empty() {
            return Err(StrategyError::InvalidConfiguration);
        }
        Ok(Self {
            name,
            display_name,
            apy,
            risk_level,
            minimum_deposit,
        })
    }

    pub fn check_deposit(&self, principal: U256) -> Result<(), StrategyError> {
        if principal < self.minimum_deposit {
            return Err(StrategyError::BelowMinimumDeposit);
        }
        Ok(())
    }
}

/// Principal enrolled in a strategy by one user
#[odra::odra_type]
pub struct YieldPosition {
    pub id: u64,
    pub user: Address,
    pub strategy_name: String,
    /// Savings vault the principal was valued from, if any
    pub vault_id: Option<u64>,
    pub principal: U256,
    /// Yield claimed over the position's life
    pub earned_claimed: U256,
    pub start_time: u64,
    /// Baseline of the current accrual window
    pub last_claim_time: u64,
}

/// Result of a claim
#[odra::odra_type]
pub struct ClaimOutcome {
    pub amount: U256,
    /// `earned_claimed` after the claim
    pub total_earned: U256,
}

/// Result of a compound
#[odra::odra_type]
pub struct CompoundOutcome {
    /// Yield claimed from the source position
    pub claimed: U256,
    /// Position now holding the claimed yield
    pub position_id: u64,
    /// Principal of that position
    pub principal: U256,
}

/// Position together with its current yield
#[odra::odra_type]
pub struct YieldPositionView {
    pub position: YieldPosition,
    pub apy: U256,
    pub risk_level: RiskLevel,
    /// Unclaimed yield
    pub accrued_yield: U256,
    /// `principal + accrued_yield`
    pub total_value: U256,
}

/// Aggregate over a user's positions
#[odra::odra_type]
pub struct YieldStats {
    pub total_principal: U256,
    /// Unclaimed yield across positions
    pub total_yield: U256,
    pub total_value: U256,
    pub active_positions: u32,
    /// Unweighted mean of the positions' APYs
    pub average_apy: U256,
}

impl YieldPosition {
    pub fn accrued_yield(&self, apy: U256, now: u64) -> Result<U256, StrategyError> {
        Ok(InterestMath::accrued(self.principal, apy, self.last_claim_time, now)?)
    }

    /// Settles the accrued yield and restarts the accrual window at `now`
    pub fn claim(&mut self, apy: U256, now: u64) -> Result<ClaimOutcome, StrategyError> {
        let amount = self.accrued_yield(apy, now)?;
        if amount.is_zero() {
            return Err(StrategyError::NothingToClaim);
        }
        self.earned_claimed = SafeMath::add(self.earned_claimed, amount)?;
        self.last_claim_time = now;
        Ok(ClaimOutcome {
            amount,
            total_earned: self.earned_claimed,
        })
    }

    pub fn add_principal(&mut self, amount: U256) -> Result<(), StrategyError> {
        self.principal = SafeMath::add(self.principal, amount)?;
        Ok(())
    }

    pub fn view(&self, strategy: &YieldStrategy, now: u64) -> Result<YieldPositionView, StrategyError> {
        let accrued_yield = self.accrued_yield(strategy.apy, now)?;
        Ok(YieldPositionView {
            position: self.clone(),
            apy: strategy.apy,
            risk_level: strategy.risk_level.clone(),
            accrued_yield,
            total_value: SafeMath::add(self.principal, accrued_yield)?,
        })
    }
}

impl YieldStats {
    pub fn from_views(views: &[YieldPositionView]) -> Result<Self, StrategyError> {
        let mut total_principal = U256::zero();
        let mut total_yield = U256::zero();
        let mut apy_sum = U256::zero();
        for view in views {
            total_principal = SafeMath::add(total_principal, view.position.principal)?;
            total_yield = SafeMath::add(total_yield, view.accrued_yield)?;
            apy_sum = SafeMath::add(apy_sum, view.apy)?;
        }

        let average_apy = if views.is_empty() {
            U256::zero()
        } else {
            SafeMath::div(apy_sum, U256::from(views.len()))?
        };

        Ok(Self {
            total_principal,
            total_yield,
            total_value: SafeMath::add(total_principal, total_yield)?,
            active_positions: views.len() as u32,
            average_apy,
        })
    }
}

/// Strategies installed at init
pub fn default_strategies() -> Vec<YieldStrategy> {
    alloc::vec![
        YieldStrategy {
            name: String::from(CONSERVATIVE),
            display_name: String::from("Travel Safe Staking"),
            apy: math::ratio(11, 2),
            risk_level: RiskLevel::Low,
            minimum_deposit: math::ratio(1, 10),
        },
        YieldStrategy {
            name: String::from(LIQUIDITY),
            display_name: String::from("Travel Liquidity Pool"),
            apy: math::units(12),
            risk_level: RiskLevel::Medium,
            minimum_deposit: math::ratio(1, 2),
        },
        YieldStrategy {
            name: String::from(AGGRESSIVE),
            display_name: String::from("Adventure Yield Farm"),
            apy: math::units(25),
            risk_level: RiskLevel::High,
            minimum_deposit: math::units(1),
        },
        YieldStrategy {
            name: String::from(TRAVEL_TOKENS),
            display_name: String::from("Travel Token Rewards"),
            apy: math::units(8),
            risk_level: RiskLevel::Low,
            minimum_deposit: math::ratio(1, 100),
        },
    ]
}
