//! teket Report
//!
//! Reports built from teket sales-history CSV exports.
//!
//! This library provides:
//! - `decode`: Reading exports in Shift_JIS or UTF-8
//! - `columns`: Finding logical fields among changing column names
//! - `seat`: Parsing free-text seat descriptions into canonical seat keys
//! - `ownership`: Folding a seat's events into its ownership chain and final state
//! - `buyers`: Per-buyer S/A ticket ranking
//! - `seats`: Per-seat final-state summary
//! - `report`: Text, CSV and Excel output
//! - `pipeline`: End-to-end runs used by the CLI
//!
//! Binaries:
//! - `teket-report`: Command-line front end

pub mod buyers;
pub mod columns;
pub mod decode;
pub mod error;
pub mod ownership;
pub mod pipeline;
pub mod report;
pub mod seat;
pub mod seats;
pub mod timestamp;

pub use buyers::{aggregate_buyers, BuyerReportConfig, BuyerSummary};
pub use decode::{decode_csv, SourceEncoding, Table, DEFAULT_ENCODINGS};
pub use error::{ReportError, ReportResult};
pub use ownership::SeatSummary;
pub use seat::{parse_seat, RowDesignator, SeatKey};
pub use seats::{summarize_seats, SeatReportConfig};
