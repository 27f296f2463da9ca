//! teket Report - buyer rankings and per-seat final state from sales-history CSVs
//!
//! Reads a teket sales-history export (Shift_JIS or UTF-8), prints the
//! resulting table and optionally writes it as a UTF-8 CSV (with BOM) and/or
//! an Excel workbook.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use teket_report::buyers::{BuyerReportConfig, DEFAULT_COUPON};
use teket_report::decode::{SourceEncoding, DEFAULT_ENCODING_LIST};
use teket_report::ownership::DEFAULT_CANCEL_WORDS;
use teket_report::pipeline::{
    list_columns, run_buyer_report, run_seat_report, BuyerRunConfig, OutputConfig, RunOutcome,
    SeatRunConfig,
};
use teket_report::seats::SeatReportConfig;

#[derive(Parser)]
#[command(name = "teket-report")]
#[command(about = "Summarize teket sales-history CSV exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank buyers by S/A ticket count for a coupon code.
    ///
    /// Hand-over transactions (無料受取 / 有料受取 by default) are excluded.
    Buyers {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV file, or a directory to receive teket_購入者別集計.csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save an Excel workbook (file or directory)
        #[arg(long)]
        xlsx: Option<PathBuf>,

        /// Coupon code rows must carry to be counted
        #[arg(long, env = "TEKET_COUPON", default_value = DEFAULT_COUPON)]
        coupon: String,

        /// Transaction types (処理) to exclude
        #[arg(long, default_value = "無料受取,有料受取", value_delimiter = ',')]
        exclude: Vec<String>,

        /// Encodings to try, in order
        #[arg(long, default_value = DEFAULT_ENCODING_LIST, value_delimiter = ',')]
        encoding: Vec<SourceEncoding>,
    },

    /// Summarize each seat's final state and ownership chain
    Seats {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV file, or a directory to receive teket_席ごと最終状態.csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save an Excel workbook (file or directory)
        #[arg(long)]
        xlsx: Option<PathBuf>,

        /// Status words that mark a cancellation
        #[arg(long, value_delimiter = ',')]
        cancel_words: Vec<String>,

        /// Encodings to try, in order
        #[arg(long, default_value = DEFAULT_ENCODING_LIST, value_delimiter = ',')]
        encoding: Vec<SourceEncoding>,
    },

    /// List the input's columns and the fields detected in them
    Columns {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Encodings to try, in order
        #[arg(long, default_value = DEFAULT_ENCODING_LIST, value_delimiter = ',')]
        encoding: Vec<SourceEncoding>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Buyers {
            input,
            output,
            xlsx,
            coupon,
            exclude,
            encoding,
        } => {
            let outcome = run_buyer_report(&BuyerRunConfig {
                input,
                encodings: encoding,
                output: OutputConfig { csv: output, xlsx },
                report: BuyerReportConfig {
                    coupon,
                    excluded_transactions: exclude,
                },
            })?;
            print_outcome(&outcome);
        }
        Commands::Seats {
            input,
            output,
            xlsx,
            cancel_words,
            encoding,
        } => {
            let cancel_words = if cancel_words.is_empty() {
                DEFAULT_CANCEL_WORDS.iter().map(|s| s.to_string()).collect()
            } else {
                cancel_words
            };
            let outcome = run_seat_report(&SeatRunConfig {
                input,
                encodings: encoding,
                output: OutputConfig { csv: output, xlsx },
                report: SeatReportConfig { cancel_words },
            })?;
            print_outcome(&outcome);
        }
        Commands::Columns { input, encoding } => {
            print!("{}", list_columns(&input, &encoding)?);
        }
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    print!("{}", outcome.text);
    if outcome.rows > 0 {
        println!("\n{} rows", outcome.rows);
    }
    for path in &outcome.written {
        println!("Saved {}", path.display());
    }
}
