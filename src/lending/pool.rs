//! Lending pools - named liquidity buckets with fixed risk parameters
//!
//! Pool values are plain data; `LendingProtocol` owns the registry storage and
//! writes a pool back only after every check on it has passed.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use crate::math::{self, SafeMath};

/// Name of the main travel pool installed at init
pub const TRAVEL_MAIN: &str = "TRAVEL_MAIN";

/// Name of the emergency pool installed at init
pub const EMERGENCY: &str = "EMERGENCY";

/// Risk and pricing parameters of a pool (all scaled by 1e18)
#[odra::odra_type]
pub struct PoolParams {
    /// Borrow APR in percent. Example: 8.5% = 8.5 * 1e18
    pub borrow_apr: U256,
    /// Required collateral / debt at origination. Example: 1.5 * 1e18
    pub collateral_ratio: U256,
    /// Collateral / debt below which a loan can be liquidated. Example: 1.2 * 1e18
    pub liquidation_threshold: U256,
    /// Fraction of the borrow APR paid to lenders. Example: 0.8 * 1e18
    pub lender_share: U256,
    /// Haircut applied to collateral received by a liquidator. Example: 0.05 * 1e18
    pub liquidation_discount: U256,
    /// Smallest accepted lender deposit. Example: 0.1 * 1e18
    pub min_deposit: U256,
}

impl PoolParams {
    /// Parameters shared by the default pools
    pub fn travel(borrow_apr: U256, collateral_ratio: U256, liquidation_threshold: U256) -> Self {
        Self {
            borrow_apr,
            collateral_ratio,
            liquidation_threshold,
            lender_share: math::ratio(8, 10),
            liquidation_discount: math::ratio(5, 100),
            min_deposit: math::ratio(1, 10),
        }
    }

    /// Rejects parameter sets the ledgers cannot honour
    pub fn validate(&self) -> Result<(), LendingError> {
        let one = math::scale();
        if self.collateral_ratio < one
            || self.liquidation_threshold.is_zero()
            || self.liquidation_threshold > self.collateral_ratio
            || self.lender_share > one
            || self.liquidation_discount > one
        {
            return Err(LendingError::InvalidConfiguration);
        }
        Ok(())
    }
}

/// Signed change applied to a pool total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Increase(U256),
    Decrease(U256),
}

/// A named pool of lendable liquidity
#[odra::odra_type]
pub struct LendingPool {
    /// Registry key
    pub name: String,
    /// Human readable pool name
    pub display_name: String,
    /// Total liquidity supplied to the pool
    pub total_liquidity: U256,
    /// Principal currently lent out
    pub total_borrowed: U256,
    /// Risk parameters
    pub params: PoolParams,
}

impl LendingPool {
    /// Creates an empty pool after validating its parameters
    pub fn new(
        name: String,
        display_name: String,
        initial_liquidity: U256,
        params: PoolParams,
    ) -> Result<Self, LendingError> {
        params.validate()?;
        Ok(Self {
            name,
            display_name,
            total_liquidity: initial_liquidity,
            total_borrowed: U256::zero(),
            params,
        })
    }

    /// Liquidity not currently lent out
    pub fn available_liquidity(&self) -> U256 {
        self.total_liquidity.saturating_sub(self.total_borrowed)
    }

    /// Applies a liquidity change, refusing to drop below what is borrowed
    pub fn adjust_liquidity(&mut self, delta: Adjustment) -> Result<(), LendingError> {
        let liquidity = match delta {
            Adjustment::Increase(amount) => SafeMath::add(self.total_liquidity, amount)?,
            Adjustment::Decrease(amount) => SafeMath::sub(self.total_liquidity, amount)?,
        };
        if self.total_borrowed > liquidity {
            return Err(LendingError::InsufficientLiquidity);
        }
        self.total_liquidity = liquidity;
        Ok(())
    }

    /// Applies a borrowed change, refusing to exceed liquidity
    pub fn adjust_borrowed(&mut self, delta: Adjustment) -> Result<(), LendingError> {
        let borrowed = match delta {
            Adjustment::Increase(amount) => SafeMath::add(self.total_borrowed, amount)?,
            Adjustment::Decrease(amount) => SafeMath::sub(self.total_borrowed, amount)?,
        };
        if borrowed > self.total_liquidity {
            return Err(LendingError::InsufficientLiquidity);
        }
        self.total_borrowed = borrowed;
        Ok(())
    }

    /// Whether `collateral / amount >= collateral_ratio`, without truncation
    pub fn covers_collateral_ratio(&self, collateral: U256, amount: U256) -> Result<bool, LendingError> {
        let lhs = SafeMath::mul(collateral, math::scale())?;
        let rhs = SafeMath::mul(self.params.collateral_ratio, amount)?;
        Ok(lhs >= rhs)
    }

    /// APR paid to lenders: borrow APR scaled by the lender share
    pub fn lend_apr(&self) -> Result<U256, LendingError> {
        Ok(SafeMath::mul_scaled(self.params.borrow_apr, self.params.lender_share)?)
    }

    /// Borrowed / liquidity (scaled by 1e18), zero for an empty pool
    pub fn utilization(&self) -> Result<U256, LendingError> {
        if self.total_liquidity.is_zero() {
            return Ok(U256::zero());
        }
        Ok(SafeMath::div_scaled(self.total_borrowed, self.total_liquidity)?)
    }

    pub fn stats(&self) -> Result<PoolStats, LendingError> {
        Ok(PoolStats {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            total_liquidity: self.total_liquidity,
            total_borrowed: self.total_borrowed,
            available_liquidity: self.available_liquidity(),
            utilization: self.utilization()?,
            borrow_apr: self.params.borrow_apr,
            lend_apr: self.lend_apr()?,
        })
    }
}

/// Point-in-time view of a pool
#[odra::odra_type]
pub struct PoolStats {
    pub name: String,
    pub display_name: String,
    pub total_liquidity: U256,
    pub total_borrowed: U256,
    pub available_liquidity: U256,
    /// Borrowed / liquidity (scaled by 1e18)
    pub utilization: U256,
    pub borrow_apr: U256,
    pub lend_apr: U256,
}

/// The pools every deployment starts with
pub fn default_pools() -> Vec<LendingPool> {
    alloc::vec![
        LendingPool {
            name: String::from(TRAVEL_MAIN),
            display_name: String::from("Travel Savings Pool"),
            total_liquidity: math::units(100),
            total_borrowed: U256::zero(),
            params: PoolParams::travel(math::ratio(17, 2), math::ratio(3, 2), math::ratio(6, 5)),
        },
        LendingPool {
            name: String::from(EMERGENCY),
            display_name: String::from("Emergency Travel Fund"),
            total_liquidity: math::units(50),
            total_borrowed: U256::zero(),
            params: PoolParams::travel(math::units(12), math::ratio(13, 10), math::ratio(23, 20)),
        },
    ]
}
