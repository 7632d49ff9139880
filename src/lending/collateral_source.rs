//! Vault Collateral Oracle - valuations of savings-vault contributions
//!
//! Reporters publish the ETH-equivalent value of a user's contribution to a
//! savings vault. Readers get `None` when no usable valuation exists, which is
//! distinct from a reported contribution of zero.

use odra::prelude::*;
use odra::casper_types::U256;
use super::errors::LendingError;
use super::events::{CollateralReported, MaxStalenessUpdated, ReporterUpdated, VaultDisabled};
use crate::math;

/// Latest valuation of a user's vault contribution
#[odra::odra_type]
pub struct ContributionReport {
    pub user: Address,
    pub vault_id: u64,
    /// Contribution value (scaled by 1e18)
    pub value: U256,
    /// Time of the report (Unix seconds)
    pub reported_at: u64,
}

/// Vault Collateral Oracle contract
#[odra::module]
pub struct VaultCollateralOracle {
    /// Latest report per (user, vault)
    reports: Mapping<(Address, u64), ContributionReport>,
    /// Vaults whose valuations must not be used
    disabled_vaults: Mapping<u64, bool>,
    /// Addresses allowed to publish reports
    reporters: Mapping<Address, bool>,
    /// Admin address
    admin: Var<Address>,
    /// Maximum report age (in seconds)
    max_staleness: Var<u64>,
}

#[odra::module]
impl VaultCollateralOracle {
    /// Initialize the oracle; the deployer becomes admin and first reporter
    pub fn init(&mut self, max_staleness: u64) {
        let caller = self.env().caller();
        self.admin.set(caller);
        self.reporters.set(&caller, true);
        self.max_staleness.set(max_staleness);
    }

    /// Publish the value of `user`'s contribution to `vault_id` (reporters only)
    pub fn report_contribution(&mut self, user: Address, vault_id: u64, value: U256) {
        self.only_reporter();

        let reported_at = self.now();
        self.reports.set(&(user, vault_id), ContributionReport {
            user,
            vault_id,
            value,
            reported_at,
        });

        self.env().emit_event(CollateralReported {
            user,
            vault_id,
            value,
            reporter: self.env().caller(),
            timestamp: reported_at,
        });
    }

    /// Usable valuation of `user`'s contribution to `vault_id`
    ///
    /// `None` if never reported, if the vault is disabled, or if the report is
    /// older than the staleness window.
    pub fn get_collateral_value(&self, user: Address, vault_id: u64) -> Option<U256> {
        if self.disabled_vaults.get_or_default(&vault_id) {
            return None;
        }
        let report = self.reports.get(&(user, vault_id))?;
        let age = self.now().saturating_sub(report.reported_at);
        if age > self.max_staleness.get_or_default() {
            return None;
        }
        Some(report.value)
    }

    /// Raw report, ignoring staleness and disabled vaults
    pub fn get_report(&self, user: Address, vault_id: u64) -> Option<ContributionReport> {
        self.reports.get(&(user, vault_id))
    }

    /// Stop serving valuations for a vault (admin only)
    pub fn disable_vault(&mut self, vault_id: u64) {
        self.only_admin();
        self.disabled_vaults.set(&vault_id, true);
        self.env().emit_event(VaultDisabled {
            vault_id,
            disabled: true,
            timestamp: self.now(),
        });
    }

    /// Resume serving valuations for a vault (admin only)
    pub fn enable_vault(&mut self, vault_id: u64) {
        self.only_admin();
        self.disabled_vaults.set(&vault_id, false);
        self.env().emit_event(VaultDisabled {
            vault_id,
            disabled: false,
            timestamp: self.now(),
        });
    }

    pub fn add_reporter(&mut self, reporter: Address) {
        self.only_admin();
        self.set_reporter(reporter, true);
    }

    pub fn remove_reporter(&mut self, reporter: Address) {
        self.only_admin();
        self.set_reporter(reporter, false);
    }

    pub fn is_reporter(&self, account: Address) -> bool {
        self.reporters.get_or_default(&account)
    }

    /// Update max staleness period (admin only)
    pub fn set_max_staleness(&mut self, seconds: u64) {
        self.only_admin();
        let old_staleness = self.max_staleness.get_or_default();
        self.max_staleness.set(seconds);

        self.env().emit_event(MaxStalenessUpdated {
            old_staleness,
            new_staleness: seconds,
            updated_by: self.env().caller(),
        });
    }

    pub fn get_max_staleness(&self) -> u64 {
        self.max_staleness.get_or_default()
    }

    fn set_reporter(&mut self, reporter: Address, enabled: bool) {
        self.reporters.set(&reporter, enabled);
        self.env().emit_event(ReporterUpdated {
            reporter,
            enabled,
            updated_by: self.env().caller(),
        });
    }

    fn now(&self) -> u64 {
        math::to_seconds(self.env().get_block_time())
    }

    fn only_reporter(&self) {
        let caller = self.env().caller();
        if !self.reporters.get_or_default(&caller) {
            self.env().revert(LendingError::Unauthorized);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units;
    use odra::host::Deployer;

    #[test]
    fn test_unreported_contribution_is_unavailable() {
        let env = odra_test::env();
        let oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness: 3_600 });
        assert_eq!(oracle.get_collateral_value(env.get_account(1), 7), None);
    }

    #[test]
    fn test_zero_contribution_is_a_valuation() {
        let env = odra_test::env();
        let mut oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness: 3_600 });
        let user = env.get_account(1);
        oracle.report_contribution(user, 7, U256::zero());
        assert_eq!(oracle.get_collateral_value(user, 7), Some(U256::zero()));
    }

    #[test]
    fn test_stale_and_disabled_reports_are_unavailable() {
        let env = odra_test::env();
        let mut oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness: 3_600 });
        let user = env.get_account(1);
        oracle.report_contribution(user, 7, units(16));
        assert_eq!(oracle.get_collateral_value(user, 7), Some(units(16)));

        oracle.disable_vault(7);
        assert_eq!(oracle.get_collateral_value(user, 7), None);
        oracle.enable_vault(7);

        env.advance_block_time(3_601 * 1_000);
        assert_eq!(oracle.get_collateral_value(user, 7), None);
        assert!(oracle.get_report(user, 7).is_some());
    }

    #[test]
    fn test_reporter_and_staleness_changes() {
        let env = odra_test::env();
        let mut oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness: 3_600 });
        let reporter = env.get_account(2);

        oracle.add_reporter(reporter);
        assert!(oracle.is_reporter(reporter));
        assert!(env.emitted(&oracle, "ReporterUpdated"));

        env.set_caller(reporter);
        oracle.report_contribution(env.get_account(1), 3, units(5));
        assert_eq!(
            oracle.try_set_max_staleness(60),
            Err(LendingError::Unauthorized.into())
        );

        env.set_caller(env.get_account(0));
        oracle.remove_reporter(reporter);
        assert!(!oracle.is_reporter(reporter));

        oracle.set_max_staleness(60);
        assert_eq!(oracle.get_max_staleness(), 60);
        assert!(env.emitted(&oracle, "MaxStalenessUpdated"));
    }

    #[test]
    fn test_only_reporters_publish() {
        let env = odra_test::env();
        let mut oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness: 3_600 });
        let outsider = env.get_account(3);
        env.set_caller(outsider);
        assert_eq!(
            oracle.try_report_contribution(outsider, 1, units(100)),
            Err(LendingError::Unauthorized.into())
        );
    }
}
