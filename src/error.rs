//! Error type shared by the report library.

use crate::columns::LogicalField;
use crate::decode::SourceEncoding;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// None of the attempted encodings produced a readable CSV table.
    #[error("could not read the CSV (tried {}): {last}", encodings_list(.tried))]
    Decode {
        tried: Vec<SourceEncoding>,
        last: String,
    },

    /// Required columns could not be found in the header row.
    #[error("required columns missing: {}", fields_list(.0))]
    MissingColumns(Vec<LogicalField>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type ReportResult<T> = Result<T, ReportError>;

fn encodings_list(tried: &[SourceEncoding]) -> String {
    tried
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fields_list(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}
