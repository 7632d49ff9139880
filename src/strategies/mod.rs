//! Yield strategies - simple-interest yield on travel savings
//!
//! Users enroll principal (or a vault contribution) in a named strategy and
//! claim, compound or withdraw the yield it accrues.

pub mod manager;
pub mod strategy;
pub mod errors;
pub mod events;


pub use manager::StrategyManager;
pub use strategy::{
    ClaimOutcome, CompoundOutcome, RiskLevel, YieldPosition, YieldPositionView, YieldStats,
    YieldStrategy,
};
pub use errors::StrategyError;
pub use events::*;
