//! Seat history: one row per seat with its final state and ownership chain.

use crate::columns::{resolve_fields, FieldSpec, LogicalField};
use crate::decode::Table;
use crate::error::ReportResult;
use crate::ownership::{
    is_cancel_status, reduce_seat, OwnershipEvent, SeatSummary, DEFAULT_CANCEL_WORDS,
};
use crate::report::{Diagnostic, Report};
use crate::seat::{parse_seat, SeatKey};
use crate::timestamp::{parse_event_time, EventTime};
use std::collections::HashMap;

/// Settings for the seat-history report.
#[derive(Debug, Clone)]
pub struct SeatReportConfig {
    /// Status words that mark a cancellation
    pub cancel_words: Vec<String>,
}

impl Default for SeatReportConfig {
    fn default() -> Self {
        SeatReportConfig {
            cancel_words: DEFAULT_CANCEL_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Build the per-seat summary for a decoded export, sorted by seat.
///
/// Only the seat column is required. Without a recipient column every event
/// is its buyer keeping the seat; without a status column nothing is
/// cancelled; without a timestamp column rows keep file order.
pub fn summarize_seats(
    table: &Table,
    config: &SeatReportConfig,
) -> ReportResult<Report<SeatSummary>> {
    let columns = resolve_fields(
        &table.headers,
        &[
            FieldSpec::required(LogicalField::Seat),
            FieldSpec::optional(LogicalField::Timestamp),
            FieldSpec::optional(LogicalField::Status),
            FieldSpec::optional(LogicalField::Buyer),
            FieldSpec::optional(LogicalField::Recipient),
        ],
    )?;
    let seat_col = columns.required(LogicalField::Seat)?;
    let time_col = columns.get(LogicalField::Timestamp);
    let status_col = columns.get(LogicalField::Status);
    let buyer_col = columns.get(LogicalField::Buyer);
    let recipient_col = columns.get(LogicalField::Recipient);

    let mut diagnostics = Vec::new();
    if time_col.is_none() {
        diagnostics.push(Diagnostic::MissingTimestampColumn);
    }
    for (field, col) in [
        (LogicalField::Buyer, buyer_col),
        (LogicalField::Status, status_col),
    ] {
        if col.is_none() {
            diagnostics.push(Diagnostic::MissingOptionalColumn(field));
        }
    }

    let mut order: Vec<SeatKey> = Vec::new();
    let mut groups: HashMap<SeatKey, Vec<OwnershipEvent>> = HashMap::new();
    let mut bad_seats = 0usize;
    let mut bad_times = 0usize;

    for (row_num, row) in table.rows.iter().enumerate() {
        let Some(seat) = parse_seat(row.get(seat_col)) else {
            log::debug!("Row {}: unreadable seat '{}'", row_num + 1, row.get(seat_col));
            bad_seats += 1;
            continue;
        };

        let time = match time_col {
            Some(col) => {
                let time = parse_event_time(row.get(col));
                if !time.is_parsed() {
                    bad_times += 1;
                }
                time
            }
            None => EventTime::Unparsed(String::new()),
        };

        let from = row.get_opt(buyer_col);
        let to = match recipient_col {
            Some(col) => row.get(col),
            None => from,
        };
        let is_cancel = status_col
            .map(|col| is_cancel_status(row.get(col), &config.cancel_words))
            .unwrap_or(false);

        groups
            .entry(seat)
            .or_insert_with(|| {
                order.push(seat);
                Vec::new()
            })
            .push(OwnershipEvent::new(from, to, time, is_cancel));
    }

    if bad_seats > 0 {
        diagnostics.push(Diagnostic::UnparseableSeats(bad_seats));
    }
    if bad_times > 0 {
        diagnostics.push(Diagnostic::UnparseableTimestamps(bad_times));
    }

    let mut rows: Vec<SeatSummary> = order
        .into_iter()
        .filter_map(|seat| groups.remove(&seat).map(|events| reduce_seat(seat, events)))
        .collect();
    rows.sort_by_key(|s| s.seat);

    log::info!(
        "{} seats from {} rows ({} unreadable seat texts)",
        rows.len(),
        table.rows.len(),
        bad_seats
    );

    Ok(Report::new(rows, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::SourceEncoding;
    use crate::error::ReportError;

    fn table(csv: &str) -> Table {
        Table::from_csv_str(csv, SourceEncoding::Utf8).unwrap()
    }

    #[test]
    fn test_groups_and_sorts_seats() {
        let t = table(
            "座席,購入日時,処理,購入者,受取者\n\
             1階3列2番,2024-10-01 10:00,購入,A,\n\
             1階R列1番,2024-10-01 10:00,購入,B,\n\
             1-3-1,2024-10-01 10:00,購入,C,\n\
             １階Ｌ列１番,2024-10-01 10:00,購入,D,\n\
             1階L列1番,2024-10-02 10:00,キャンセル,D,\n",
        );
        let report = summarize_seats(&t, &SeatReportConfig::default()).unwrap();
        let keys: Vec<String> = report.rows.iter().map(|r| r.seat.to_string()).collect();
        assert_eq!(keys, vec!["1-L-01", "1-R-01", "1-03-01", "1-03-02"]);
        assert!(report.rows[0].cancelled);
        assert_eq!(report.rows[0].final_owner, "D");
        assert!(!report.rows[1].cancelled);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_unreadable_seats_counted() {
        let t = table(
            "座席,購入日時,処理,購入者\n\
             elevator shaft,2024-10-01,購入,A\n\
             ,2024-10-01,購入,B\n\
             2階L列8番,2024-10-01,購入,C\n",
        );
        let report = summarize_seats(&t, &SeatReportConfig::default()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert!(report.diagnostics.contains(&Diagnostic::UnparseableSeats(2)));
    }

    #[test]
    fn test_without_optional_columns() {
        let t = table("席\n1階1列1番\n1階1列1番\n");
        let report = summarize_seats(&t, &SeatReportConfig::default()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].final_owner, "");
        assert_eq!(report.rows[0].final_time, "");
        assert!(!report.rows[0].cancelled);
        assert!(report
            .diagnostics
            .contains(&Diagnostic::MissingTimestampColumn));
        assert!(report
            .diagnostics
            .contains(&Diagnostic::MissingOptionalColumn(LogicalField::Buyer)));
    }

    #[test]
    fn test_no_timestamp_column_leaves_final_time_empty() {
        let t = table(
            "座席,処理,購入者,受取者\n\
             1-1-2,購入,Alice,\n\
             1-1-1,購入,Dave,\n\
             1-1-2,譲渡,Alice,Bob\n\
             1-1-2,譲渡,Bob,Carol\n\
             1-1-1,キャンセル,Dave,\n",
        );
        let report = summarize_seats(&t, &SeatReportConfig::default()).unwrap();
        assert_eq!(report.rows.len(), 2);
        // No row positions stand in for the missing time
        for row in &report.rows {
            assert_eq!(row.final_time, "");
        }
        assert_eq!(report.rows[0].chain, vec!["Dave"]);
        assert!(report.rows[0].cancelled);
        assert_eq!(report.rows[1].chain, vec!["Alice", "Bob", "Carol"]);
        assert!(!report.rows[1].cancelled);
        assert_eq!(report.diagnostics, vec![Diagnostic::MissingTimestampColumn]);
    }

    #[test]
    fn test_bad_timestamps_counted() {
        let t = table(
            "座席,購入日時,購入者\n\
             1-1-1,2024-10-02 09:00,Bob\n\
             1-1-1,不明,Alice\n",
        );
        let report = summarize_seats(&t, &SeatReportConfig::default()).unwrap();
        assert_eq!(report.rows[0].chain, vec!["Alice", "Bob"]);
        assert!(report.diagnostics.contains(&Diagnostic::UnparseableTimestamps(1)));
    }

    #[test]
    fn test_missing_seat_column() {
        let t = table("購入者,購入日時\nA,2024-10-01\n");
        assert!(matches!(
            summarize_seats(&t, &SeatReportConfig::default()),
            Err(ReportError::MissingColumns(ref m)) if m == &vec![LogicalField::Seat]
        ));
    }

    #[test]
    fn test_custom_cancel_words() {
        let t = table("座席,処理,購入者\n1-1-1,VOID,A\n");
        let config = SeatReportConfig {
            cancel_words: vec!["VOID".to_string()],
        };
        let report = summarize_seats(&t, &config).unwrap();
        assert!(report.rows[0].cancelled);
    }
}
