//! explorer-history CLI: fetch or replay an account's explorer history.

use clap::{Args, Parser, Subcommand};
use explorer_history::{
    decode_response, normalize, Address, FetchConfig, Fetcher, Transaction, TransactionHistory,
};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::History(args) => run_history(args),
        Command::Normalize(args) => run_normalize(args),
    }
}

#[derive(Parser)]
#[command(name = "explorer-history")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Account transaction history from a block explorer API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and normalize an account's transactions from the explorer.
    History(HistoryArgs),
    /// Normalize a saved `txlist` response body.
    Normalize(NormalizeArgs),
}

#[derive(Args)]
struct OutputArgs {
    /// Print a JSON array instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct HistoryArgs {
    #[arg(long)]
    address: Address,
    /// Highest block to include.
    #[arg(long)]
    end_block: u64,
    #[arg(long, env = "EXPLORER_URL", default_value = "https://api.etherscan.io/api")]
    base_url: String,
    #[arg(long, env = "EXPLORER_API_KEY")]
    api_key: Option<String>,
    /// Minimum spacing between explorer calls.
    #[arg(long, env = "EXPLORER_INTERVAL_MS", default_value_t = 210)]
    interval_ms: u64,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct NormalizeArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long)]
    address: Address,
    #[command(flatten)]
    output: OutputArgs,
}

fn run_history(args: HistoryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = FetchConfig {
        base_url: args.base_url,
        min_interval_ms: args.interval_ms,
        api_key: args.api_key,
    };
    let fetcher = Fetcher::new(config)?;
    let rt = tokio::runtime::Runtime::new()?;
    let txs = rt.block_on(fetcher.fetch_and_normalize(&args.address, args.end_block))?;
    info!(
        count = txs.len(),
        requests = fetcher.request_count(),
        "history complete"
    );
    print_transactions(&txs, &args.output)
}

fn run_normalize(args: NormalizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let body = std::fs::read_to_string(&args.file)?;
    let txs = normalize(decode_response(&body)?, &args.address)?;
    info!(count = txs.len(), file = ?args.file, "normalize complete");
    print_transactions(&txs, &args.output)
}

fn print_transactions(
    txs: &[Transaction],
    output: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(txs)?);
        return Ok(());
    }
    println!("direction\thash\tcounterparty\tamount\tfee\tconfirmations\ttime");
    for tx in txs {
        let direction = tx
            .direction()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            direction,
            tx.hash(),
            tx.counterparty().address(),
            tx.amount(),
            tx.fee(),
            tx.confirmations(),
            tx.timestamp().format(&Rfc3339)?
        );
    }
    Ok(())
}
