//! Best-effort decoding of uploaded sales-history CSV files.
//!
//! teket exports arrive either as Shift_JIS (Excel on Japanese Windows) or as
//! UTF-8, with or without a byte-order marker. Encodings are attempted in a
//! fixed order and the first one that yields a CSV header row wins.

use crate::error::{ReportError, ReportResult};
use encoding_rs::{SHIFT_JIS, UTF_8};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encodings tried when reading an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    /// Legacy Japanese 8-bit encoding (cp932 / Windows-31J)
    ShiftJis,
    /// UTF-8 with an optional byte-order marker
    Utf8Bom,
    /// Plain UTF-8
    Utf8,
}

/// [`DEFAULT_ENCODINGS`] as a comma-separated list of labels.
pub const DEFAULT_ENCODING_LIST: &str = "cp932,utf-8-sig,utf-8";

/// Default attempt order.
pub const DEFAULT_ENCODINGS: [SourceEncoding; 3] = [
    SourceEncoding::ShiftJis,
    SourceEncoding::Utf8Bom,
    SourceEncoding::Utf8,
];

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::ShiftJis => "cp932",
            SourceEncoding::Utf8Bom => "utf-8-sig",
            SourceEncoding::Utf8 => "utf-8",
        }
    }

    /// Strictly decode `bytes`. Malformed input fails the attempt rather than
    /// producing replacement characters.
    fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, String> {
        match self {
            SourceEncoding::ShiftJis => {
                // A byte-order marker, or non-ASCII text that is already valid
                // UTF-8, is not a Shift_JIS export even if the bytes happen to
                // decode as one.
                if bytes.starts_with(UTF8_BOM) {
                    return Err("input starts with a UTF-8 byte-order marker".to_string());
                }
                if !bytes.is_ascii() && std::str::from_utf8(bytes).is_ok() {
                    return Err("input is valid UTF-8".to_string());
                }
                SHIFT_JIS
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .ok_or_else(|| "malformed Shift_JIS byte sequence".to_string())
            }
            SourceEncoding::Utf8Bom => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                UTF_8
                    .decode_without_bom_handling_and_without_replacement(body)
                    .ok_or_else(|| "malformed UTF-8 byte sequence".to_string())
            }
            SourceEncoding::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| "malformed UTF-8 byte sequence".to_string()),
        }
    }
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "cp932" | "shift-jis" | "sjis" | "windows-31j" => Ok(SourceEncoding::ShiftJis),
            "utf-8-sig" | "utf8-sig" => Ok(SourceEncoding::Utf8Bom),
            "utf-8" | "utf8" => Ok(SourceEncoding::Utf8),
            other => Err(format!(
                "unknown encoding '{}' (expected cp932, utf-8-sig or utf-8)",
                other
            )),
        }
    }
}

/// One data record of the export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<String>,
}

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Row { fields }
    }

    /// Field value at `idx`, or `""` when the record is shorter than the header.
    pub fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Like [`Row::get`] but for an optional column.
    pub fn get_opt(&self, idx: Option<usize>) -> &str {
        idx.map(|i| self.get(i)).unwrap_or("")
    }
}

/// A decoded export: verbatim header names plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub encoding: SourceEncoding,
}

impl Table {
    /// Parse already-decoded CSV text. The first record is the header row.
    pub fn from_csv_str(text: &str, encoding: SourceEncoding) -> ReportResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(Row::new(record.iter().map(|f| f.to_string()).collect()));
        }

        Ok(Table {
            headers,
            rows,
            encoding,
        })
    }
}

/// Decode raw bytes, trying `encodings` in order.
///
/// An attempt succeeds when the bytes decode without errors and the text has
/// a header row with at least one column. If every attempt fails, the error
/// lists the encodings tried and the last failure.
pub fn decode_csv(bytes: &[u8], encodings: &[SourceEncoding]) -> ReportResult<Table> {
    let mut last = String::from("no encodings to try");

    for &encoding in encodings {
        let attempt = encoding.decode(bytes).and_then(|text| {
            let table = Table::from_csv_str(&text, encoding).map_err(|e| e.to_string())?;
            if table.headers.is_empty() {
                return Err("no header row".to_string());
            }
            Ok(table)
        });

        match attempt {
            Ok(table) => {
                log::info!(
                    "Decoded CSV as {} ({} columns, {} rows)",
                    encoding,
                    table.headers.len(),
                    table.rows.len()
                );
                return Ok(table);
            }
            Err(e) => {
                log::debug!("Decoding as {} failed: {}", encoding, e);
                last = format!("{}: {}", encoding, e);
            }
        }
    }

    Err(ReportError::Decode {
        tried: encodings.to_vec(),
        last,
    })
}

/// Read a file from disk and decode it with [`decode_csv`].
pub fn read_csv_file(path: &Path, encodings: &[SourceEncoding]) -> ReportResult<Table> {
    let bytes = std::fs::read(path)?;
    decode_csv(&bytes, encodings)
}
