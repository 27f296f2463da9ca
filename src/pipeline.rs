//! Pipeline functions for programmatic use by the CLI.
//!
//! Each run reads one export, builds one report and writes the download
//! artifacts, returning structured data instead of printing to stdout.

use crate::buyers::{aggregate_buyers, BuyerReportConfig};
use crate::columns::{resolve_column, LogicalField};
use crate::decode::{read_csv_file, SourceEncoding};
use crate::report::{
    csv_bytes, render_text, write_xlsx, Diagnostic, Report, ReportTable, TableRow,
};
use crate::seats::{summarize_seats, SeatReportConfig};
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared
// ============================================================================

/// Where a run writes its artifacts.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// CSV download path. An existing directory receives the suggested file name.
    pub csv: Option<PathBuf>,
    /// Optional Excel workbook path
    pub xlsx: Option<PathBuf>,
}

/// Result of one report run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Rendered text table, or the reason nothing was produced
    pub text: String,
    /// Number of rows in the output table
    pub rows: usize,
    /// Files written
    pub written: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Path for a download: `path` itself, or `path/<file_name>` when `path` is
/// an existing directory.
pub fn resolve_output_path(path: &Path, file_name: &str) -> PathBuf {
    if path.is_dir() {
        path.join(file_name)
    } else {
        path.to_path_buf()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Log diagnostics, then either stop on an empty report or render and write it.
fn finish<T: TableRow>(report: Report<T>, output: &OutputConfig) -> Result<RunOutcome> {
    for diagnostic in &report.diagnostics {
        log::warn!("{}", diagnostic);
    }

    if report.is_empty() {
        return Ok(RunOutcome {
            text: format!("{}\n", Diagnostic::EmptyResult),
            rows: 0,
            written: Vec::new(),
            diagnostics: report.diagnostics,
        });
    }

    let table = ReportTable::from_rows(&report.rows);
    let mut written = Vec::new();

    if let Some(csv_path) = &output.csv {
        let path = resolve_output_path(csv_path, table.file_name);
        ensure_parent(&path)?;
        let bytes = csv_bytes(&table)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }

    if let Some(xlsx_path) = &output.xlsx {
        let file_name = Path::new(table.file_name).with_extension("xlsx");
        let path = resolve_output_path(xlsx_path, &file_name.to_string_lossy());
        ensure_parent(&path)?;
        write_xlsx(&table, &path)
            .with_context(|| format!("Failed to save workbook {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(RunOutcome {
        text: render_text(&table),
        rows: table.rows.len(),
        written,
        diagnostics: report.diagnostics,
    })
}

// ============================================================================
// Buyer ranking
// ============================================================================

/// Configuration for the buyer ranking run.
#[derive(Debug, Clone)]
pub struct BuyerRunConfig {
    /// Input CSV path
    pub input: PathBuf,
    /// Encodings to try, in order
    pub encodings: Vec<SourceEncoding>,
    pub output: OutputConfig,
    pub report: BuyerReportConfig,
}

/// Rank buyers by S/A ticket count for the configured coupon.
pub fn run_buyer_report(config: &BuyerRunConfig) -> Result<RunOutcome> {
    let table = read_csv_file(&config.input, &config.encodings)
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let report = aggregate_buyers(&table, &config.report)?;
    finish(report, &config.output)
}

// ============================================================================
// Seat history
// ============================================================================

/// Configuration for the seat-history run.
#[derive(Debug, Clone)]
pub struct SeatRunConfig {
    /// Input CSV path
    pub input: PathBuf,
    /// Encodings to try, in order
    pub encodings: Vec<SourceEncoding>,
    pub output: OutputConfig,
    pub report: SeatReportConfig,
}

/// Summarize each seat's final state and ownership chain.
pub fn run_seat_report(config: &SeatRunConfig) -> Result<RunOutcome> {
    let table = read_csv_file(&config.input, &config.encodings)
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let report = summarize_seats(&table, &config.report)?;
    finish(report, &config.output)
}

// ============================================================================
// Column listing
// ============================================================================

const ALL_FIELDS: [LogicalField; 8] = [
    LogicalField::Seat,
    LogicalField::Timestamp,
    LogicalField::Status,
    LogicalField::Buyer,
    LogicalField::Recipient,
    LogicalField::Transaction,
    LogicalField::Coupon,
    LogicalField::Ticket,
];

/// Describe the input's columns and which logical field each one would be
/// read as, for checking an export before running a report.
pub fn list_columns(input: &Path, encodings: &[SourceEncoding]) -> Result<String> {
    let table = read_csv_file(input, encodings)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut out = String::new();
    writeln!(
        out,
        "{} ({}, {} rows)",
        input.display(),
        table.encoding,
        table.rows.len()
    )?;
    writeln!(out, "\nColumns:")?;
    for (i, header) in table.headers.iter().enumerate() {
        writeln!(out, "  {:>3}  {}", i + 1, header)?;
    }

    writeln!(out, "\nDetected fields:")?;
    for field in ALL_FIELDS {
        match resolve_column(&table.headers, field.default_candidates()) {
            Some(idx) => writeln!(out, "  {} -> '{}'", field, table.headers[idx])?,
            None => writeln!(out, "  {} -> (not found)", field)?,
        }
    }

    Ok(out)
}
