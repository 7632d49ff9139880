//! Fixed-point arithmetic shared by the lending and yield ledgers
//! Every amount, ratio and percentage is a `U256` scaled by `SCALE` (1e18)
use odra::casper_types::U256;

/// Fixed-point scale (1e18)
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// Rates are expressed in percent
pub const PERCENT: u128 = 100;

/// Length of the accrual year in seconds (365 days, no leap years)
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Host block time is reported in milliseconds
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Failures of the shared arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    Overflow,
    Underflow,
    DivisionByZero,
    /// `now` is earlier than the start of the accrual window
    InvalidTimeRange,
}

/// `SCALE` as a `U256`
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Whole units as a fixed-point value: `units(3)` is 3.0
pub fn units(whole: u128) -> U256 {
    U256::from(whole) * scale()
}

/// Fixed-point value of `numer / denom`: `ratio(17, 2)` is 8.5
pub fn ratio(numer: u128, denom: u128) -> U256 {
    (U256::from(numer) * scale()) / U256::from(denom)
}

/// Converts host milliseconds into Unix seconds
pub fn to_seconds(block_time_millis: u64) -> u64 {
    block_time_millis / MILLIS_PER_SECOND
}

/// Checked operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_add(b).ok_or(MathError::Overflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_sub(b).ok_or(MathError::Underflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, MathError> {
        a.checked_mul(b).ok_or(MathError::Overflow)
    }

    /// Safe division with zero check
    pub fn div(a: U256, b: U256) -> Result<U256, MathError> {
        if b.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// Product of two fixed-point values
    pub fn mul_scaled(a: U256, b: U256) -> Result<U256, MathError> {
        Self::div(Self::mul(a, b)?, scale())
    }

    /// Quotient of two fixed-point values
    pub fn div_scaled(a: U256, b: U256) -> Result<U256, MathError> {
        Self::div(Self::mul(a, scale())?, b)
    }

    /// `a * b / c` without intermediate truncation
    pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256, MathError> {
        Self::div(Self::mul(a, b)?, c)
    }

    /// Returns the minimum of two U256 values
    pub fn min(a: U256, b: U256) -> U256 {
        if a < b { a } else { b }
    }
}

/// Simple (non-compounding) interest, shared by loan debt, lender
/// earnings and strategy yield.
pub struct InterestMath;

impl InterestMath {
    /// Interest on `principal` at `annual_rate` percent between `start` and `now`
    /// (Unix seconds).
    ///
    /// accrued = principal * rate / 100 * elapsed / SECONDS_PER_YEAR
    ///
    /// The product is formed before the single division so one year at 8.5%
    /// on 10.0 is exactly 0.85.
    pub fn accrued(
        principal: U256,
        annual_rate: U256,
        start: u64,
        now: u64,
    ) -> Result<U256, MathError> {
        if now < start {
            return Err(MathError::InvalidTimeRange);
        }
        let elapsed = U256::from(now - start);
        if elapsed.is_zero() || principal.is_zero() || annual_rate.is_zero() {
            return Ok(U256::zero());
        }

        let numerator = SafeMath::mul(SafeMath::mul(principal, annual_rate)?, elapsed)?;
        let denominator = SafeMath::mul(
            SafeMath::mul(U256::from(PERCENT), scale())?,
            U256::from(SECONDS_PER_YEAR),
        )?;
        SafeMath::div(numerator, denominator)
    }
}
