//! Tests for the lending protocol contracts

#[cfg(test)]
mod tests {
    use odra::casper_types::U256;
    use odra::host::{Deployer, HostEnv};
    use odra::prelude::*;
    use crate::lending::collateral_source::{
        VaultCollateralOracle, VaultCollateralOracleHostRef, VaultCollateralOracleInitArgs,
    };
    use crate::lending::pool::{PoolParams, EMERGENCY, TRAVEL_MAIN};
    use crate::lending::protocol::{LendingProtocol, LendingProtocolHostRef, LendingProtocolInitArgs};
    use crate::lending::{HealthStatus, LendingError};
    use crate::math::{ratio, units, SECONDS_PER_YEAR};

    const YEAR_MILLIS: u64 = SECONDS_PER_YEAR * 1_000;

    fn setup_with_staleness(max_staleness: u64) -> (HostEnv, VaultCollateralOracleHostRef, LendingProtocolHostRef) {
        let env = odra_test::env();
        let admin = env.get_account(0);
        env.set_caller(admin);

        let oracle = VaultCollateralOracle::deploy(&env, VaultCollateralOracleInitArgs { max_staleness });
        let protocol = LendingProtocol::deploy(
            &env,
            LendingProtocolInitArgs {
                collateral_source: oracle.address(),
            },
        );
        (env, oracle, protocol)
    }

    fn setup() -> (HostEnv, VaultCollateralOracleHostRef, LendingProtocolHostRef) {
        setup_with_staleness(10 * SECONDS_PER_YEAR)
    }

    fn main_pool() -> String {
        String::from(TRAVEL_MAIN)
    }

    fn assert_pool_invariant(protocol: &LendingProtocolHostRef) {
        for name in protocol.pool_names() {
            let pool = protocol.get_pool(name);
            assert!(pool.total_borrowed <= pool.total_liquidity);
        }
    }

    #[test]
    fn test_default_pools_installed() {
        let (_env, _oracle, protocol) = setup();

        assert_eq!(protocol.pool_names(), vec![String::from(TRAVEL_MAIN), String::from(EMERGENCY)]);

        let main = protocol.get_pool(main_pool());
        assert_eq!(main.total_liquidity, units(100));
        assert_eq!(main.total_borrowed, U256::zero());
        assert_eq!(main.params.borrow_apr, ratio(17, 2));
        assert_eq!(main.params.collateral_ratio, ratio(3, 2));
        assert_eq!(main.params.liquidation_threshold, ratio(6, 5));

        let emergency = protocol.pool_stats(String::from(EMERGENCY));
        assert_eq!(emergency.total_liquidity, units(50));
        assert_eq!(emergency.borrow_apr, units(12));
        assert_eq!(emergency.lend_apr, ratio(96, 10));
    }

    #[test]
    fn test_borrow_collateral_ratio_scenario() {
        let (env, _oracle, mut protocol) = setup();
        let borrower = env.get_account(1);
        env.set_caller(borrower);

        // 14 / 10 = 1.4 < 1.5
        assert_eq!(
            protocol.try_borrow(main_pool(), units(14), units(10)),
            Err(LendingError::InsufficientCollateral.into())
        );
        assert_eq!(protocol.get_pool(main_pool()).total_borrowed, U256::zero());

        // 16 / 10 = 1.6 >= 1.5
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));
        assert_eq!(loan_id, 1);

        let loan = protocol.get_loan(loan_id).unwrap();
        assert_eq!(loan.borrower, borrower);
        assert_eq!(loan.principal, units(10));
        assert_eq!(loan.interest_rate, ratio(17, 2));
        assert_eq!(loan.collateral_value_at_origination, units(16));
        assert!(loan.active);
        assert_eq!(protocol.get_pool(main_pool()).total_borrowed, units(10));
        assert_pool_invariant(&protocol);
    }

    #[test]
    fn test_borrow_rejections() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));

        assert_eq!(
            protocol.try_borrow(String::from("NOWHERE"), units(16), units(10)),
            Err(LendingError::PoolNotFound.into())
        );
        assert_eq!(
            protocol.try_borrow(main_pool(), units(16), U256::zero()),
            Err(LendingError::ZeroAmount.into())
        );
        assert_eq!(
            protocol.try_borrow(main_pool(), U256::zero(), units(1)),
            Err(LendingError::InsufficientCollateral.into())
        );
        assert_eq!(
            protocol.try_borrow(main_pool(), units(300), units(101)),
            Err(LendingError::InsufficientLiquidity.into())
        );
        assert_eq!(protocol.protocol_stats().total_loans, 0);
    }

    #[test]
    fn test_loan_ids_are_monotonic() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));

        let first = protocol.borrow(main_pool(), units(16), units(10));
        protocol.repay(first, units(10));
        let second = protocol.borrow(main_pool(), units(16), units(10));
        let third = protocol.borrow(String::from(EMERGENCY), units(13), units(10));

        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(protocol.loan_count(), 3);
        let stats = protocol.protocol_stats();
        assert_eq!(stats.total_loans, 3);
        assert_eq!(stats.active_loans, 2);
    }

    #[test]
    fn test_debt_after_one_year() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));

        let loan_id = protocol.borrow(main_pool(), units(16), units(10));
        env.advance_block_time(YEAR_MILLIS);

        assert_eq!(protocol.loan_debt(loan_id), ratio(1085, 100));
        let health = protocol.loan_health(loan_id, units(16));
        assert_eq!(health.accrued_interest, ratio(85, 100));
        assert_eq!(health.total_debt, ratio(1085, 100));
    }

    #[test]
    fn test_repaying_total_debt_closes_after_partial_payments() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));

        let loan_id = protocol.borrow(main_pool(), units(16), units(10));
        env.advance_block_time(YEAR_MILLIS / 2);

        let partial = protocol.repay(loan_id, units(3));
        assert!(!partial.closed);
        assert_eq!(partial.repaid, units(3));
        assert_eq!(partial.remaining_debt, ratio(7425, 1000));
        assert!(protocol.get_loan(loan_id).unwrap().principal < units(10));
        assert_pool_invariant(&protocol);

        env.advance_block_time(YEAR_MILLIS / 4);
        let debt = protocol.loan_debt(loan_id);
        let outcome = protocol.repay(loan_id, debt);

        assert!(outcome.closed);
        assert_eq!(outcome.repaid, debt);
        assert_eq!(outcome.remaining_debt, U256::zero());
        assert!(!protocol.get_loan(loan_id).unwrap().active);

        let pool = protocol.get_pool(main_pool());
        assert_eq!(pool.total_borrowed, U256::zero());
        assert!(pool.total_liquidity > units(100));

        assert_eq!(
            protocol.try_repay(loan_id, units(1)),
            Err(LendingError::LoanClosed.into())
        );
        assert_eq!(
            protocol.try_repay(99, units(1)),
            Err(LendingError::LoanNotFound.into())
        );
    }

    #[test]
    fn test_dust_left_on_close_is_written_off() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));

        // 0.0005 short of the principal, inside the dust allowance
        let outcome = protocol.repay(loan_id, ratio(99_995, 10_000));
        assert!(outcome.closed);

        let pool = protocol.get_pool(main_pool());
        assert_eq!(pool.total_borrowed, U256::zero());
        assert_eq!(pool.total_liquidity, ratio(999_995, 10_000));
        assert_pool_invariant(&protocol);
    }

    #[test]
    fn test_health_bands() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));

        assert_eq!(protocol.loan_health(loan_id, units(16)).status, HealthStatus::Healthy);
        assert_eq!(protocol.loan_health(loan_id, ratio(25, 2)).status, HealthStatus::AtRisk);
        assert_eq!(protocol.loan_health(loan_id, units(12)).status, HealthStatus::AtRisk);

        let health = protocol.loan_health(loan_id, units(11));
        assert_eq!(health.status, HealthStatus::Liquidatable);
        assert_eq!(health.ratio, ratio(11, 10));
        assert_eq!(health.liquidation_threshold, ratio(6, 5));
    }

    #[test]
    fn test_liquidating_healthy_loan_changes_nothing() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));

        env.set_caller(env.get_account(3));
        assert_eq!(
            protocol.try_liquidate(loan_id, units(13)),
            Err(LendingError::LoanNotLiquidatable.into())
        );
        assert!(protocol.get_loan(loan_id).unwrap().active);
        assert_eq!(protocol.get_pool(main_pool()).total_borrowed, units(10));
    }

    #[test]
    fn test_liquidation_closes_loan_and_blocks_repay() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));

        env.set_caller(env.get_account(3));
        let outcome = protocol.liquidate(loan_id, units(11));
        assert_eq!(outcome.debt_cleared, units(10));
        assert_eq!(outcome.collateral_seized, units(11));
        assert_eq!(outcome.collateral_received, ratio(1045, 100));
        assert_eq!(outcome.liquidator_reward, ratio(45, 100));
        assert_eq!(outcome.liquidator_shortfall, U256::zero());

        assert!(!protocol.get_loan(loan_id).unwrap().active);
        assert_eq!(protocol.get_pool(main_pool()).total_borrowed, U256::zero());
        assert_eq!(protocol.protocol_stats().active_loans, 0);

        // The loser of a liquidate / repay race gets a clear error
        env.set_caller(env.get_account(1));
        assert_eq!(
            protocol.try_repay(loan_id, units(10)),
            Err(LendingError::LoanClosed.into())
        );
        assert_eq!(
            protocol.try_liquidate(loan_id, units(1)),
            Err(LendingError::LoanClosed.into())
        );
    }

    #[test]
    fn test_liquidation_with_interest_credits_pool() {
        let (env, _oracle, mut protocol) = setup();
        env.set_caller(env.get_account(1));
        let loan_id = protocol.borrow(main_pool(), units(16), units(10));
        env.advance_block_time(YEAR_MILLIS);

        env.set_caller(env.get_account(3));
        let outcome = protocol.liquidate(loan_id, units(12));
        // 12 / 10.85 < 1.2
        assert_eq!(outcome.debt_cleared, ratio(1085, 100));
        assert_eq!(outcome.collateral_received, ratio(114, 10));
        assert_eq!(outcome.liquidator_reward, ratio(55, 100));

        let pool = protocol.get_pool(main_pool());
        assert_eq!(pool.total_borrowed, U256::zero());
        assert_eq!(pool.total_liquidity, ratio(10085, 100));
    }

    #[test]
    fn test_vault_backed_borrow_and_liquidation() {
        let (env, mut oracle, mut protocol) = setup();
        let borrower = env.get_account(1);
        oracle.report_contribution(borrower, 7, units(16));

        env.set_caller(borrower);
        let loan_id = protocol.borrow_against_vault(main_pool(), 7, units(10));
        let loan = protocol.get_loan(loan_id).unwrap();
        assert_eq!(loan.vault_id, Some(7));
        assert_eq!(loan.collateral_value_at_origination, units(16));
        assert_eq!(protocol.loan_health_from_vault(loan_id).status, HealthStatus::Healthy);

        env.set_caller(env.get_account(0));
        oracle.report_contribution(borrower, 7, units(11));

        env.set_caller(env.get_account(3));
        let outcome = protocol.liquidate_from_vault(loan_id);
        assert_eq!(outcome.collateral_seized, units(11));
        assert!(!protocol.get_loan(loan_id).unwrap().active);
    }

    #[test]
    fn test_missing_collateral_is_not_zero_collateral() {
        let (env, mut oracle, mut protocol) = setup();
        let borrower = env.get_account(1);
        oracle.report_contribution(borrower, 8, U256::zero());

        env.set_caller(borrower);
        assert_eq!(
            protocol.try_borrow_against_vault(main_pool(), 7, units(1)),
            Err(LendingError::CollateralUnavailable.into())
        );
        assert_eq!(
            protocol.try_borrow_against_vault(main_pool(), 8, units(1)),
            Err(LendingError::InsufficientCollateral.into())
        );

        let loan_id = protocol.borrow(main_pool(), units(16), units(10));
        assert_eq!(
            protocol.try_loan_health_from_vault(loan_id),
            Err(LendingError::MissingVaultLink.into())
        );
    }

    #[test]
    fn test_stale_collateral_is_unavailable() {
        let (env, mut oracle, mut protocol) = setup_with_staleness(3_600);
        let borrower = env.get_account(1);
        oracle.report_contribution(borrower, 7, units(16));

        env.advance_block_time(2 * 3_600 * 1_000);
        env.set_caller(borrower);
        assert_eq!(
            protocol.try_borrow_against_vault(main_pool(), 7, units(10)),
            Err(LendingError::CollateralUnavailable.into())
        );
        assert_eq!(protocol.get_pool(main_pool()).total_borrowed, U256::zero());
    }

    #[test]
    fn test_lender_deposit_and_earnings() {
        let (env, _oracle, mut protocol) = setup();
        let lender = env.get_account(2);
        env.set_caller(lender);

        assert_eq!(
            protocol.try_deposit(main_pool(), ratio(5, 100)),
            Err(LendingError::BelowMinimum.into())
        );
        assert_eq!(
            protocol.try_deposit(main_pool(), U256::zero()),
            Err(LendingError::BelowMinimum.into())
        );

        let position_id = protocol.deposit(main_pool(), units(5));
        let position = protocol.get_lending_position(position_id).unwrap();
        assert_eq!(position.interest_rate, ratio(68, 10));
        assert_eq!(protocol.get_pool(main_pool()).total_liquidity, units(105));

        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(protocol.earned_interest(position_id), ratio(34, 100));

        let views = protocol.lender_positions(lender);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].total_value, ratio(534, 100));
    }

    #[test]
    fn test_lender_withdrawal_limited_by_unborrowed_liquidity() {
        let (env, _oracle, mut protocol) = setup();
        let lender = env.get_account(2);
        env.set_caller(lender);
        let position_id = protocol.deposit(main_pool(), units(10));

        env.set_caller(env.get_account(1));
        protocol.borrow(main_pool(), ratio(315, 2), units(105));
        assert_eq!(
            protocol.try_withdraw_lending(position_id, units(5)),
            Err(LendingError::Unauthorized.into())
        );

        env.set_caller(lender);
        assert_eq!(
            protocol.try_withdraw_lending(position_id, units(6)),
            Err(LendingError::InsufficientLiquidity.into())
        );
        assert_eq!(
            protocol.try_withdraw_lending(position_id, units(11)),
            Err(LendingError::InsufficientBalance.into())
        );

        let outcome = protocol.withdraw_lending(position_id, units(5));
        assert_eq!(outcome.principal_returned, units(5));
        assert_eq!(outcome.remaining_amount, units(5));

        let pool = protocol.get_pool(main_pool());
        assert_eq!(pool.total_liquidity, units(105));
        assert_eq!(pool.total_borrowed, units(105));
        assert_pool_invariant(&protocol);
    }

    #[test]
    fn test_pool_administration() {
        let (env, _oracle, mut protocol) = setup();
        let params = PoolParams::travel(units(5), ratio(3, 2), ratio(6, 5));

        assert_eq!(
            protocol.try_register_pool(main_pool(), String::from("Again"), units(1), params.clone()),
            Err(LendingError::DuplicatePool.into())
        );

        protocol.register_pool(String::from("SUMMER"), String::from("Summer Trips"), units(20), params.clone());
        assert_eq!(protocol.protocol_stats().pool_count, 3);
        assert_eq!(protocol.get_pool(String::from("SUMMER")).total_liquidity, units(20));

        let invalid = PoolParams::travel(units(5), ratio(11, 10), ratio(6, 5));
        assert_eq!(
            protocol.try_register_pool(String::from("BAD"), String::from("Bad"), units(1), invalid),
            Err(LendingError::InvalidConfiguration.into())
        );

        env.set_caller(env.get_account(1));
        assert_eq!(
            protocol.try_register_pool(String::from("MINE"), String::from("Mine"), units(1), params),
            Err(LendingError::Unauthorized.into())
        );
    }

    #[test]
    fn test_reconfiguration_keeps_loan_rate() {
        let (env, _oracle, mut protocol) = setup();
        let borrower = env.get_account(1);

        env.set_caller(borrower);
        let before = protocol.borrow(main_pool(), units(16), units(10));

        env.set_caller(env.get_account(0));
        protocol.reconfigure_pool(main_pool(), PoolParams::travel(units(20), ratio(3, 2), ratio(6, 5)));

        env.set_caller(borrower);
        let after = protocol.borrow(main_pool(), units(16), units(10));

        assert_eq!(protocol.get_loan(before).unwrap().interest_rate, ratio(17, 2));
        assert_eq!(protocol.get_loan(after).unwrap().interest_rate, units(20));
        assert_eq!(protocol.borrower_loans(borrower).len(), 2);
    }

    #[test]
    fn test_pause_blocks_mutations() {
        let (env, _oracle, mut protocol) = setup();
        protocol.pause();
        assert!(protocol.is_paused());

        env.set_caller(env.get_account(1));
        assert_eq!(
            protocol.try_borrow(main_pool(), units(16), units(10)),
            Err(LendingError::ContractPaused.into())
        );

        env.set_caller(env.get_account(0));
        protocol.unpause();
        env.set_caller(env.get_account(1));
        assert_eq!(protocol.borrow(main_pool(), units(16), units(10)), 1);
    }

    #[test]
    fn test_invariant_holds_across_activity() {
        let (env, _oracle, mut protocol) = setup();
        let lender = env.get_account(2);
        let borrower = env.get_account(1);

        env.set_caller(lender);
        protocol.deposit(main_pool(), units(20));

        env.set_caller(borrower);
        let a = protocol.borrow(main_pool(), units(90), units(60));
        let b = protocol.borrow(main_pool(), units(90), units(60));
        assert_eq!(
            protocol.try_borrow(main_pool(), units(30), units(1)),
            Err(LendingError::InsufficientLiquidity.into())
        );
        assert_pool_invariant(&protocol);

        for _ in 0..4 {
            env.advance_block_time(YEAR_MILLIS / 12);
            protocol.repay(a, units(7));
            assert_pool_invariant(&protocol);
        }

        env.set_caller(env.get_account(3));
        protocol.liquidate(b, units(70));
        assert_pool_invariant(&protocol);

        env.set_caller(borrower);
        let debt = protocol.loan_debt(a);
        assert!(protocol.repay(a, debt).closed);

        let pool = protocol.get_pool(main_pool());
        assert_eq!(pool.total_borrowed, U256::zero());
        assert!(protocol.borrower_loans(borrower).is_empty());
    }
}
