use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use solana_transaction_status::UiTransactionEncoding;
use solana_tx_normalizer::output::{self, OutputFormat};
use solana_tx_normalizer::rpc::{self, RpcAccountSource, DEFAULT_RPC_URL};
use solana_tx_normalizer::{NormalizeConfig, RawTransaction, TransactionNormalizer};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Normalize a Solana transaction into one CSV/JSON record per instruction",
    long_about = None
)]
struct Cli {
    /// Transaction signature to fetch
    signature: String,
    /// Address whose balance changes are tracked; empty means the first signer
    #[arg(default_value = "")]
    owner: String,
    /// Output format: csv or json
    #[arg(default_value = "csv")]
    format: OutputFormat,
    /// RPC endpoint URL (can also be set via SOLANA_RPC_URL)
    #[arg(long, env = "SOLANA_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
    /// Read the transaction JSON from a file instead of fetching it
    #[arg(long)]
    file: Option<PathBuf>,
    /// Fail the run on the first instruction that cannot be decoded or resolved
    #[arg(long)]
    strict: bool,
    /// Omit the CSV header line
    #[arg(long)]
    no_header: bool,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
    /// Fetch with base64 encoding (versioned message shape)
    #[arg(long)]
    base64: bool,
    /// Debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = NormalizeConfig {
        throw_error: cli.strict,
        csv_header: !cli.no_header,
        pretty_json: cli.pretty,
        ..NormalizeConfig::default()
    };

    let client = rpc::connect(&cli.rpc_url);
    let tx = match &cli.file {
        Some(path) => {
            let mut tx = read_transaction(path)?;
            if tx.signature.is_none() && tx.transaction.signatures.is_empty() {
                tx.signature = Some(cli.signature.clone());
            }
            tx
        }
        None => {
            let encoding = if cli.base64 {
                UiTransactionEncoding::Base64
            } else {
                UiTransactionEncoding::Json
            };
            tracing::info!("fetching transaction {} from {}", cli.signature, cli.rpc_url);
            rpc::fetch_transaction(&client, &cli.signature, encoding).await?
        }
    };

    let normalizer = TransactionNormalizer::new(
        std::sync::Arc::new(RpcAccountSource::new(client)),
        config,
    );
    let records = normalizer
        .normalize(&tx, Some(cli.owner.as_str()))
        .await
        .context("failed to normalize transaction")?;

    let config = normalizer.config();
    let rendered = output::render(&records, cli.format, config.csv_header, config.pretty_json)?;
    print!("{rendered}");
    if cli.format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn read_transaction(path: &PathBuf) -> Result<RawTransaction> {
    let data = fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    serde_json::from_slice(&data).with_context(|| format!("failed to parse JSON in {:?}", path))
}
