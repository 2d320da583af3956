//! Run driver: seed, generate, execute, report.

use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use erc20_bench_adapter::{
    LedgerConnector, LedgerSession, MetricsPort, RecorderMetrics, SubmissionCounter,
    TransactionAdapter,
    ethereum::{EthereumConfig, EthereumConnector, EthereumSession},
    seed_from_ledger,
};
use erc20_bench_workload::{
    SenderMode, ShadowLedger, WorkloadConfig, WorkloadGenerator, WorkloadProfile,
};
use eyre::{OptionExt, WrapErr};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    cli::{Cli, LedgerSeed},
    network::NetworkConfig,
    report::RunReport,
};

/// Runs the benchmark described by `cli` against the configured Ethereum node.
pub(crate) async fn run(cli: &Cli) -> eyre::Result<RunReport> {
    let config = WorkloadConfig::from_args(cli.workload, &cli.workload_args())?;
    let network = NetworkConfig::load(&cli.network)?;
    let connector = EthereumConnector::new(network.ethereum);

    connector.init().await.wrap_err("ethereum node is unreachable")?;
    let session = connector.acquire_session().await.wrap_err("failed to acquire a session")?;

    let counter = SubmissionCounter::new();
    let metrics = (&counter, RecorderMetrics::default());
    let result = benchmark(cli, config, &connector, &session, &metrics).await;

    tracing::debug!(pending = counter.pending(), "submission counter at end of run");
    connector.release_session(session).await.wrap_err("failed to release the session")?;
    result
}

async fn benchmark(
    cli: &Cli,
    config: WorkloadConfig,
    connector: &EthereumConnector,
    session: &EthereumSession,
    metrics: &dyn MetricsPort,
) -> eyre::Result<RunReport> {
    let ledger = initial_ledger(cli, connector.config(), session, metrics)
        .await?
        .with_approval_accounting(cli.approval_accounting());
    let rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    let mut generator = WorkloadGenerator::new(config, ledger, session.default_sender(), rng)?;

    drive(connector, session, &cli.contract, &mut generator, cli.rounds, cli.tx_timeout(), metrics)
        .await
}

/// Executes `rounds` batches, stopping at the first batch that cannot be generated.
pub(crate) async fn drive<C: LedgerConnector, R: Rng>(
    connector: &C,
    session: &C::Session,
    contract: &str,
    generator: &mut WorkloadGenerator<R>,
    rounds: usize,
    timeout: Duration,
    metrics: &dyn MetricsPort,
) -> eyre::Result<RunReport> {
    let started = Instant::now();
    let mut report = RunReport::default();

    for round in 0..rounds {
        let batch = generator
            .generate_batch()
            .wrap_err_with(|| format!("failed to generate round {round}"))?;
        let statuses = connector.execute_batch(session, contract, &batch, timeout, metrics).await;

        let failed = statuses.iter().filter(|status| !status.is_success()).count();
        tracing::info!(round, size = statuses.len(), failed, "round complete");
        report.record(&statuses);
    }

    generator.log_summary();
    report.finish(started.elapsed(), *generator.counters());
    Ok(report)
}

async fn initial_ledger<S: LedgerSession>(
    cli: &Cli,
    network: &EthereumConfig,
    session: &S,
    metrics: &dyn MetricsPort,
) -> eyre::Result<ShadowLedger> {
    let accounts = network.account_addresses();
    match cli.ledger_seed {
        LedgerSeed::Supply => {
            let supply = network
                .initial_supply(&cli.contract)
                .ok_or_eyre("contract has no initial supply among its constructor arguments")?;
            Ok(supply_ledger(cli.workload, session.default_sender(), &accounts, supply))
        }
        LedgerSeed::Query => {
            let adapter = TransactionAdapter::new(session, &cli.contract, cli.tx_timeout());
            seed_from_ledger(&adapter, session.default_sender(), &accounts, Some(metrics))
                .await
                .wrap_err("failed to seed the shadow ledger")
        }
    }
}

/// Distributes the constructor supply the way the token was deployed: everything on the
/// default sender for default-sender workloads, evenly between the accounts otherwise.
fn supply_ledger(
    profile: WorkloadProfile,
    default_sender: Address,
    accounts: &[Address],
    supply: U256,
) -> ShadowLedger {
    match profile.sender_mode() {
        SenderMode::PerAccount => ShadowLedger::with_uniform_supply(accounts, supply),
        SenderMode::DefaultSender => {
            let others = accounts
                .iter()
                .filter(|account| **account != default_sender)
                .map(|account| (*account, U256::ZERO));
            ShadowLedger::with_balances(std::iter::once((default_sender, supply)).chain(others))
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use erc20_bench_adapter::{SessionResult, test_utils::ScriptedSession};
    use erc20_bench_workload::{OperationKind, WorkloadArgs, WorkloadError};

    use super::*;

    const DEFAULT: Address = Address::repeat_byte(0xde);
    const ACCOUNTS: [Address; 3] =
        [Address::repeat_byte(0xa1), Address::repeat_byte(0xb0), Address::repeat_byte(0xc4)];

    /// Hands out sessions failing every call whose amount is `fail_amount`.
    #[derive(Debug)]
    struct ScriptedConnector {
        fail_amount: Option<U256>,
    }

    #[async_trait]
    impl LedgerConnector for ScriptedConnector {
        type Session = ScriptedSession;

        async fn init(&self) -> SessionResult<()> {
            Ok(())
        }

        async fn acquire_session(&self) -> SessionResult<ScriptedSession> {
            let fail_amount = self.fail_amount;
            Ok(ScriptedSession::new(DEFAULT).fail_when(move |call, _| {
                call.args.last().and_then(|arg| arg.as_uint()) == fail_amount
            }))
        }
    }

    fn generator(
        profile: WorkloadProfile,
        args: &WorkloadArgs,
        ledger: ShadowLedger,
    ) -> WorkloadGenerator<ChaCha8Rng> {
        let config = WorkloadConfig::from_args(profile, args).unwrap();
        WorkloadGenerator::new(config, ledger, DEFAULT, ChaCha8Rng::seed_from_u64(11)).unwrap()
    }

    #[tokio::test]
    async fn drives_every_round() {
        let connector = ScriptedConnector { fail_amount: Some(U256::from(50)) };
        let session = connector.acquire_session().await.unwrap();
        let args = WorkloadArgs::default()
            .with_transfer_money(100)
            .with_allower_money(50)
            .with_txn_per_batch(4);
        let ledger = ShadowLedger::with_uniform_supply(&ACCOUNTS, U256::from(30_000));
        let mut generator = generator(WorkloadProfile::TransferApproveTransferFrom, &args, ledger);
        let counter = SubmissionCounter::new();

        let report = drive(
            &connector,
            &session,
            "mintable",
            &mut generator,
            5,
            Duration::from_secs(1),
            &counter,
        )
        .await
        .unwrap();

        assert_eq!(report.rounds, 5);
        assert_eq!(report.submitted, 20);
        assert_eq!(counter.pending(), 20);
        let delegated = report.counters.approve + report.counters.transfer_from;
        assert_eq!(report.failed, delegated);
        assert_eq!(report.succeeded, report.counters.get(OperationKind::Transfer));
        assert_eq!(session.invoked().len(), 20);
    }

    #[tokio::test]
    async fn exhaustion_stops_the_run() {
        let connector = ScriptedConnector { fail_amount: None };
        let session = connector.acquire_session().await.unwrap();
        let args = WorkloadArgs::default().with_allower_money(50);
        let ledger =
            supply_ledger(WorkloadProfile::TransferFrom, DEFAULT, &ACCOUNTS, U256::from(1_000));
        let mut generator = generator(WorkloadProfile::TransferFrom, &args, ledger);
        let counter = SubmissionCounter::new();

        let err = drive(
            &connector,
            &session,
            "mintable",
            &mut generator,
            3,
            Duration::from_secs(1),
            &counter,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WorkloadError>(),
            Some(WorkloadError::Exhausted { .. })
        ));
        assert!(session.invoked().is_empty());
    }

    #[test]
    fn supply_goes_to_default_sender_in_default_sender_workloads() {
        let ledger =
            supply_ledger(WorkloadProfile::Transfer, DEFAULT, &ACCOUNTS, U256::from(9_000));

        assert_eq!(ledger.balance_of(DEFAULT), U256::from(9_000));
        assert_eq!(ledger.len(), 4);
        assert!(ACCOUNTS.iter().all(|account| ledger.balance_of(*account).is_zero()));
    }

    #[test]
    fn supply_is_split_in_per_account_workloads() {
        let ledger = supply_ledger(
            WorkloadProfile::TransferApproveTransferFrom,
            DEFAULT,
            &ACCOUNTS,
            U256::from(9_000),
        );

        assert_eq!(ledger.len(), 3);
        assert!(ACCOUNTS.iter().all(|account| ledger.balance_of(*account) == U256::from(3_000)));
    }
}
