use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tlalix_engine::application::engine::{EngineConfig, RemittanceEngine};
use tlalix_engine::domain::account::Address;
use tlalix_engine::domain::money::{BasisPoints, ExchangeRate, Usd};
use tlalix_engine::domain::platform::DEFAULT_EXPIRATION_SECS;
use tlalix_engine::domain::ports::{
    AliasStoreBox, CashoutStoreBox, ProfileStoreBox, RemittanceStoreBox, SystemClock,
};
use tlalix_engine::error::EngineError;
use tlalix_engine::infrastructure::in_memory::{
    InMemoryAliasStore, InMemoryCashoutStore, InMemoryProfileStore, InMemoryRemittanceStore,
};
use tlalix_engine::interfaces::csv::operation_reader::{
    OpKind, Operation, OperationReader, parse_recipient,
};
use tlalix_engine::interfaces::csv::report_writer::ReportWriter;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file
    input: PathBuf,

    /// Administrator account
    #[arg(long, default_value = "admin")]
    owner: String,

    /// Initial exchange rate, 2 implied decimals (1750 = 17.50 MXN/USD)
    #[arg(long, default_value_t = 1750)]
    rate: u64,

    /// Initial platform fee in basis points (150 = 1.5%)
    #[arg(long, default_value_t = 150)]
    fee_bps: u32,

    /// Claim window in seconds
    #[arg(long, default_value_t = DEFAULT_EXPIRATION_SECS)]
    expiration_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles: ProfileStoreBox = Box::new(InMemoryProfileStore::new());
    let aliases: AliasStoreBox = Box::new(InMemoryAliasStore::new());
    let remittances: RemittanceStoreBox = Box::new(InMemoryRemittanceStore::new());
    let cashouts: CashoutStoreBox = Box::new(InMemoryCashoutStore::new());
    let engine = RemittanceEngine::new(
        profiles,
        aliases,
        remittances,
        cashouts,
        Box::new(SystemClock),
        EngineConfig {
            owner: Address::new(cli.owner),
            exchange_rate: ExchangeRate::new(cli.rate).into_diagnostic()?,
            platform_fee: BasisPoints::new(cli.fee_bps).into_diagnostic()?,
            expiration_secs: cli.expiration_secs,
        },
    );

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for (line, op_result) in reader.operations().enumerate() {
        match op_result {
            Ok(op) => {
                if let Err(e) = apply(&engine, &op).await {
                    warn!(line, op = ?op.op, error = %e, "operation rejected");
                }
            }
            Err(e) => {
                warn!(line, error = %e, "unreadable operation row");
            }
        }
    }

    let stats = engine.get_stats().await;
    eprintln!(
        "{}",
        serde_json::to_string(&stats).into_diagnostic()?
    );

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer
        .write_profiles(engine.get_all_profiles().await.into_diagnostic()?)
        .into_diagnostic()?;

    Ok(())
}

async fn apply(
    engine: &RemittanceEngine,
    op: &Operation,
) -> std::result::Result<(), EngineError> {
    let account = Address::new(op.account.clone());
    let arg = |value: &Option<String>| value.clone().unwrap_or_default();
    match op.op {
        OpKind::Deposit => engine.deposit(&account, amount(op)?).await,
        OpKind::RegisterAlias => engine.register_alias(&account, &arg(&op.arg1)).await,
        OpKind::RegisterPoint => {
            let fee_bps: u32 = arg(&op.arg3).parse().map_err(|_| EngineError::InvalidFee)?;
            engine
                .register_cashout_point(&account, arg(&op.arg1), arg(&op.arg2), fee_bps)
                .await
        }
        OpKind::Create => engine
            .create_remittance(
                &account,
                amount(op)?,
                parse_recipient(&arg(&op.arg1)),
                &arg(&op.arg2),
            )
            .await
            .map(drop),
        OpKind::Lock => engine.lock_remittance(&account, &arg(&op.arg1)).await.map(drop),
        OpKind::Ready => engine
            .mark_ready_for_pickup(&account, &arg(&op.arg1))
            .await
            .map(drop),
        OpKind::Claim => engine
            .claim_remittance(&account, &arg(&op.arg1))
            .await
            .map(drop),
        OpKind::Cancel => engine
            .cancel_remittance(&account, &arg(&op.arg1))
            .await
            .map(drop),
        OpKind::Reclaim => engine
            .reclaim_expired(&account, &arg(&op.arg1))
            .await
            .map(drop),
        OpKind::WithdrawPoint => engine.withdraw_point_balance(&account).await.map(drop),
    }
}

fn amount(op: &Operation) -> std::result::Result<Usd, EngineError> {
    let value = op.amount.ok_or(EngineError::InvalidAmount)?;
    Usd::from_decimal(value)
}
