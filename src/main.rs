use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use receipt_points::{breakdown, validate, Receipt, ReceiptStore, SqliteStore};

#[derive(Parser)]
#[command(name = "receipt-points")]
#[command(about = "Score purchase receipts and inspect stored receipts", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a receipt JSON file and print its points per rule
    Score {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check a receipt JSON file without scoring it
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List receipts stored in a SQLite database
    List {
        #[arg(short, long, env = "RECEIPTS_DATABASE", default_value = "receipts.db")]
        database: PathBuf,
    },
}

fn main() -> Result<()> {
    receipt_points::logging::init("warn");
    let cli = Cli::parse();

    match cli.command {
        Commands::Score { file } => run_score(&file),
        Commands::Validate { file } => run_validate(&file),
        Commands::List { database } => run_list(&database),
    }
}

fn load_receipt(path: &Path) -> Result<Receipt> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).context("Invalid receipt format")
}

fn run_score(path: &Path) -> Result<()> {
    let receipt = load_receipt(path)?;
    validate(&receipt)?;

    let result = breakdown(&receipt)?;
    for rule_score in &result.scores {
        println!("{:<18} {:>5}", rule_score.rule.name(), rule_score.points);
    }
    println!("{:<18} {:>5}", "total", result.total());

    Ok(())
}

fn check_receipt(path: &Path) -> Result<()> {
    let receipt = load_receipt(path)?;

    if let Err(e) = validate(&receipt) {
        anyhow::bail!("invalid: {} ({})", e.reason, e.field);
    }

    Ok(())
}

fn run_validate(path: &Path) -> Result<()> {
    check_receipt(path)?;
    println!("valid");
    Ok(())
}

fn run_list(database: &Path) -> Result<()> {
    if !database.exists() {
        anyhow::bail!("Database not found at {}", database.display());
    }

    let store = SqliteStore::open(database)?;
    let receipts = store.list()?;

    for stored in &receipts {
        println!(
            "{}  {:<24} {} {}  {:>8}  {:>4} pts",
            stored.id,
            stored.receipt.retailer,
            stored.receipt.purchase_date,
            stored.receipt.purchase_time,
            stored.receipt.total,
            stored.points,
        );
    }
    println!("{} receipt(s)", receipts.len());

    Ok(())
}
