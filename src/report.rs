//! Report results, user-facing diagnostics, and table output (terminal text,
//! CSV download, Excel workbook).

use crate::buyers::BuyerSummary;
use crate::columns::LogicalField;
use crate::error::ReportResult;
use crate::ownership::SeatSummary;
use std::fmt;
use std::io::Write;
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// UTF-8 byte-order marker written at the start of CSV downloads so that
/// Excel opens them as UTF-8.
pub const CSV_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Non-fatal conditions found while building a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No rows survived filtering; the report is empty.
    EmptyResult,
    /// Rows dropped because their seat text could not be parsed.
    UnparseableSeats(usize),
    /// Rows whose timestamp could not be parsed; they sort first.
    UnparseableTimestamps(usize),
    /// No timestamp column, so input order is used.
    MissingTimestampColumn,
    /// An optional column was not found.
    MissingOptionalColumn(LogicalField),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyResult => write!(f, "No rows match the report conditions"),
            Diagnostic::UnparseableSeats(n) => {
                write!(f, "{} row(s) with unreadable seat text were excluded", n)
            }
            Diagnostic::UnparseableTimestamps(n) => write!(
                f,
                "{} row(s) have an unreadable purchase time and were ordered first",
                n
            ),
            Diagnostic::MissingTimestampColumn => write!(
                f,
                "No purchase-time column found; rows are ordered as they appear in the file"
            ),
            Diagnostic::MissingOptionalColumn(field) => {
                write!(f, "No '{}' column found; treated as empty", field)
            }
        }
    }
}

/// Rows of a report plus the diagnostics raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<T> {
    pub rows: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Report<T> {
    pub fn new(rows: Vec<T>, mut diagnostics: Vec<Diagnostic>) -> Self {
        if rows.is_empty() && !diagnostics.contains(&Diagnostic::EmptyResult) {
            diagnostics.push(Diagnostic::EmptyResult);
        }
        Report { rows, diagnostics }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Count(u64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Count(n) => write!(f, "{}", n),
        }
    }
}

/// A row type that can be laid out as an output table.
pub trait TableRow {
    /// Column headers, in output order.
    const HEADERS: &'static [&'static str];
    /// Suggested download file name.
    const FILE_NAME: &'static str;
    /// Worksheet name for Excel export.
    const SHEET_NAME: &'static str;

    fn cells(&self) -> Vec<Cell>;
}

impl TableRow for BuyerSummary {
    const HEADERS: &'static [&'static str] = &["購入者", "S席購入数", "A席購入数", "購入総数"];
    const FILE_NAME: &'static str = "teket_購入者別集計.csv";
    const SHEET_NAME: &'static str = "購入者別集計";

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.buyer.clone()),
            Cell::Count(self.s_count),
            Cell::Count(self.a_count),
            Cell::Count(self.total()),
        ]
    }
}

impl TableRow for SeatSummary {
    const HEADERS: &'static [&'static str] = &[
        "席 (階-列-番)",
        "キャンセル",
        "経由",
        "最終所有者",
        "最終購入日時",
    ];
    const FILE_NAME: &'static str = "teket_席ごと最終状態.csv";
    const SHEET_NAME: &'static str = "席ごと最終状態";

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.seat.to_string()),
            Cell::Text(if self.cancelled { "キャンセル済み" } else { "-" }.to_string()),
            Cell::Text(self.chain_display()),
            Cell::Text(self.final_owner.clone()),
            Cell::Text(self.final_time.clone()),
        ]
    }
}

/// A laid-out output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub file_name: &'static str,
    pub sheet_name: &'static str,
}

impl ReportTable {
    pub fn from_rows<T: TableRow>(rows: &[T]) -> Self {
        ReportTable {
            headers: T::HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(TableRow::cells).collect(),
            file_name: T::FILE_NAME,
            sheet_name: T::SHEET_NAME,
        }
    }
}

fn pad_right(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(sw)))
}

fn pad_left(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(sw)), s)
}

/// Render a fixed-width text table. Widths use terminal display width, so
/// full-width Japanese text stays aligned; counts are right-aligned.
pub fn render_text(table: &ReportTable) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.width()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.width());
            }
        }
    }

    let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let mut out = String::new();

    let header_line: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| pad_right(h, w))
        .collect();
    out.push_str(header_line.join("  ").trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(total_width));
    out.push('\n');

    for (cells, texts) in table.rows.iter().zip(&rendered) {
        let line: Vec<String> = cells
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((cell, text), &w)| match cell {
                Cell::Count(_) => pad_left(text, w),
                Cell::Text(_) => pad_right(text, w),
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}

/// Write the table as CSV, preceded by a UTF-8 byte-order marker.
pub fn write_csv<W: Write>(table: &ReportTable, mut writer: W) -> ReportResult<()> {
    writer.write_all(CSV_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// CSV download bytes for `table`.
pub fn csv_bytes(table: &ReportTable) -> ReportResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

/// Save the table as a single-sheet Excel workbook.
pub fn write_xlsx(table: &ReportTable, path: &Path) -> ReportResult<()> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.sheet_name)?;

        for (j, h) in table.headers.iter().enumerate() {
            sheet.write_string_with_format(0, j as u16, h, &header_fmt)?;
        }
        for (i, row) in table.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (j, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(s) => sheet.write_string(r, j as u16, s)?,
                    Cell::Count(n) => sheet.write_number(r, j as u16, *n as f64)?,
                };
            }
        }
        sheet.set_freeze_panes(1, 0)?;
        sheet.autofit();
    }
    workbook.save(path)?;
    Ok(())
}
