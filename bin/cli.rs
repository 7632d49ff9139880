//! CLI tool for deploying and operating the travel lending contracts.

use travel_lending::lending::{LendingProtocol, VaultCollateralOracle};
use travel_lending::strategies::StrategyManager;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::HostEnv;
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Reports older than this are not used as collateral (one day)
const DEFAULT_MAX_STALENESS: u64 = 86_400;

/// Deploys the vault collateral oracle.
pub struct OracleDeployScript;

impl DeployScript for OracleDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use travel_lending::lending::collateral_source::VaultCollateralOracleInitArgs;

        let _oracle = VaultCollateralOracle::load_or_deploy(
            &env,
            VaultCollateralOracleInitArgs {
                max_staleness: DEFAULT_MAX_STALENESS,
            },
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the lending protocol.
/// Requires the oracle to be deployed first.
pub struct LendingDeployScript;

impl DeployScript for LendingDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use travel_lending::lending::protocol::LendingProtocolInitArgs;

        let oracle = container.contract_ref::<VaultCollateralOracle>(env)?;
        let _protocol = LendingProtocol::load_or_deploy(
            &env,
            LendingProtocolInitArgs {
                collateral_source: oracle.address().clone(),
            },
            container,
            600_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the strategy manager.
/// Requires the oracle to be deployed first.
pub struct StrategiesDeployScript;

impl DeployScript for StrategiesDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use travel_lending::strategies::manager::StrategyManagerInitArgs;

        let oracle = container.contract_ref::<VaultCollateralOracle>(env)?;
        let _manager = StrategyManager::load_or_deploy(
            &env,
            StrategyManagerInitArgs {
                collateral_source: oracle.address().clone(),
            },
            container,
            500_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the oracle, the lending protocol and the strategy manager.
pub struct FullDeployScript;

impl DeployScript for FullDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        OracleDeployScript.deploy(env, container)?;
        LendingDeployScript.deploy(env, container)?;
        StrategiesDeployScript.deploy(env, container)?;

        Ok(())
    }
}

/// Scenario to publish a vault contribution valuation.
pub struct ReportCollateralScenario;

impl Scenario for ReportCollateralScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "user",
                "Owner of the vault contribution",
                NamedCLType::Key,
            ),
            CommandArg::new(
                "vault_id",
                "Savings vault id",
                NamedCLType::U64,
            ),
            CommandArg::new(
                "value",
                "Contribution value scaled by 1e18",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut oracle = container.contract_ref::<VaultCollateralOracle>(env)?;
        let user = args.get_single::<Address>("user")?;
        let vault_id = args.get_single::<u64>("vault_id")?;
        let value = args.get_single::<U256>("value")?;

        env.set_gas(50_000_000_000);
        oracle.try_report_contribution(user, vault_id, value)?;

        println!("Reported vault {} contribution: {}", vault_id, value);
        Ok(())
    }
}

impl ScenarioMetadata for ReportCollateralScenario {
    const NAME: &'static str = "report-collateral";
    const DESCRIPTION: &'static str = "Publishes the value of a user's savings-vault contribution";
}

/// Scenario to print a pool's totals and rates.
pub struct PoolStatsScenario;

impl Scenario for PoolStatsScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "pool",
                "Pool name, e.g. TRAVEL_MAIN",
                NamedCLType::String,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let protocol = container.contract_ref::<LendingProtocol>(env)?;
        let pool = args.get_single::<String>("pool")?;

        let stats = protocol.try_pool_stats(pool)?;
        println!("{} ({})", stats.display_name, stats.name);
        println!("  liquidity:   {}", stats.total_liquidity);
        println!("  borrowed:    {}", stats.total_borrowed);
        println!("  available:   {}", stats.available_liquidity);
        println!("  utilization: {}", stats.utilization);
        println!("  borrow APR:  {}", stats.borrow_apr);
        println!("  lend APR:    {}", stats.lend_apr);
        Ok(())
    }
}

impl ScenarioMetadata for PoolStatsScenario {
    const NAME: &'static str = "pool-stats";
    const DESCRIPTION: &'static str = "Prints the totals and rates of a lending pool";
}

/// Scenario to print a user's yield summary.
pub struct YieldStatsScenario;

impl Scenario for YieldStatsScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "user",
                "Account holding the yield positions",
                NamedCLType::Key,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let manager = container.contract_ref::<StrategyManager>(env)?;
        let user = args.get_single::<Address>("user")?;

        let stats = manager.try_user_yield_stats(user)?;
        println!("Active positions: {}", stats.active_positions);
        println!("  principal:   {}", stats.total_principal);
        println!("  yield:       {}", stats.total_yield);
        println!("  value:       {}", stats.total_value);
        println!("  average APY: {}", stats.average_apy);
        Ok(())
    }
}

impl ScenarioMetadata for YieldStatsScenario {
    const NAME: &'static str = "yield-stats";
    const DESCRIPTION: &'static str = "Prints the yield summary of an account";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the travel lending contracts")
        // Deploy scripts
        .deploy(OracleDeployScript)
        .deploy(LendingDeployScript)
        .deploy(StrategiesDeployScript)
        .deploy(FullDeployScript)
        // Contract references
        .contract::<VaultCollateralOracle>()
        .contract::<LendingProtocol>()
        .contract::<StrategyManager>()
        // Scenarios
        .scenario(ReportCollateralScenario)
        .scenario(PoolStatsScenario)
        .scenario(YieldStatsScenario)
        .build()
        .run();
}
