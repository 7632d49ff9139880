//! Health Evaluator - collateral ratio and liquidation state of a loan
//!
//! Status bands, with `t` the pool's liquidation threshold:
//! - Healthy: ratio > 1.1 * t
//! - AtRisk: t <= ratio <= 1.1 * t
//! - Liquidatable: ratio < t

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use super::loan::LoanPosition;
use crate::math::{self, SafeMath};

/// Width of the at-risk band above the liquidation threshold (1.1 = 11 / 10)
const AT_RISK_NUMERATOR: u64 = 11;
const AT_RISK_DENOMINATOR: u64 = 10;

/// Liquidation state of a loan
#[odra::odra_type]
pub enum HealthStatus {
    Healthy,
    AtRisk,
    Liquidatable,
}

/// Health snapshot of a loan against a collateral valuation
#[odra::odra_type]
pub struct LoanHealth {
    pub loan_id: u64,
    pub principal: U256,
    pub accrued_interest: U256,
    pub total_debt: U256,
    pub collateral_value: U256,
    /// Collateral / debt (scaled by 1e18, truncated)
    pub ratio: U256,
    pub liquidation_threshold: U256,
    pub status: HealthStatus,
}

pub struct HealthEvaluator;

impl HealthEvaluator {
    /// Evaluates `loan` at `now` against the current `collateral_value`
    pub fn evaluate(
        loan: &LoanPosition,
        liquidation_threshold: U256,
        collateral_value: U256,
        now: u64,
    ) -> Result<LoanHealth, LendingError> {
        loan.ensure_active()?;

        let accrued_interest = loan.accrued_interest(now)?;
        let total_debt = SafeMath::add(loan.principal, accrued_interest)?;
        if total_debt.is_zero() {
            return Err(LendingError::LoanClosed);
        }

        let ratio = SafeMath::div_scaled(collateral_value, total_debt)?;
        let status = Self::classify(collateral_value, total_debt, liquidation_threshold)?;

        Ok(LoanHealth {
            loan_id: loan.id,
            principal: loan.principal,
            accrued_interest,
            total_debt,
            collateral_value,
            ratio,
            liquidation_threshold,
            status,
        })
    }

    /// Compares `collateral / debt` with the threshold bands by cross-multiplying
    pub fn classify(
        collateral_value: U256,
        total_debt: U256,
        liquidation_threshold: U256,
    ) -> Result<HealthStatus, LendingError> {
        // collateral / debt < t  <=>  collateral * 1e18 < t * debt
        let scaled_collateral = SafeMath::mul(collateral_value, math::scale())?;
        let threshold_debt = SafeMath::mul(liquidation_threshold, total_debt)?;
        if scaled_collateral < threshold_debt {
            return Ok(HealthStatus::Liquidatable);
        }

        let band_collateral = SafeMath::mul(scaled_collateral, U256::from(AT_RISK_DENOMINATOR))?;
        let band_debt = SafeMath::mul(threshold_debt, U256::from(AT_RISK_NUMERATOR))?;
        if band_collateral > band_debt {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::AtRisk)
        }
    }
}
