//! Guessing which export column holds which logical field.
//!
//! teket exports have changed column names over time ("購入者" vs "購入者名",
//! "購入日時" vs "注文日時"), so each logical field carries an ordered list of
//! candidates. Resolution is two passes: exact header match first, then
//! substring containment.

use crate::error::{ReportError, ReportResult};
use std::collections::HashMap;
use std::fmt;

/// A candidate column name for a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Matches a header equal to the name, or (second pass) containing it.
    Name(&'static str),
    /// Matches (second pass only) a header containing every keyword.
    AllOf(&'static [&'static str]),
}

impl Candidate {
    fn matches_exact(&self, header: &str) -> bool {
        match self {
            Candidate::Name(name) => header == *name,
            Candidate::AllOf([only]) => header == *only,
            Candidate::AllOf(_) => false,
        }
    }

    fn matches_partial(&self, header: &str) -> bool {
        match self {
            Candidate::Name(name) => header.contains(name),
            Candidate::AllOf(keywords) => keywords.iter().all(|k| header.contains(k)),
        }
    }
}

/// Logical fields the reports read from an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Buyer,
    Recipient,
    Seat,
    Status,
    Timestamp,
    Transaction,
    Coupon,
    Ticket,
}

impl LogicalField {
    /// User-facing label, also used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            LogicalField::Buyer => "購入者",
            LogicalField::Recipient => "受取者",
            LogicalField::Seat => "座席",
            LogicalField::Status => "処理",
            LogicalField::Timestamp => "購入日時",
            LogicalField::Transaction => "処理(取引種別)",
            LogicalField::Coupon => "クーポン",
            LogicalField::Ticket => "チケット",
        }
    }

    /// Candidate header names, most specific first.
    pub fn default_candidates(&self) -> &'static [Candidate] {
        use Candidate::{AllOf, Name};
        match self {
            LogicalField::Seat => &[
                Name("座席"),
                Name("座席情報"),
                Name("席"),
                Name("座席名"),
                Name("エリア/座席"),
                Name("券面座席"),
            ],
            LogicalField::Timestamp => &[
                Name("購入日時"),
                Name("注文日時"),
                Name("購入日"),
                Name("購入時間"),
                AllOf(&["購入", "日時"]),
            ],
            LogicalField::Status => &[Name("処理"), Name("ステータス"), Name("状態")],
            LogicalField::Buyer => &[
                Name("購入者"),
                Name("購入者名"),
                Name("注文者"),
                Name("購入者氏名"),
            ],
            LogicalField::Recipient => &[
                Name("受取者"),
                Name("受取者名"),
                Name("来場者"),
                Name("来場者名"),
                Name("譲渡先"),
                Name("受取先"),
            ],
            LogicalField::Transaction => &[Name("処理"), Name("取引種別")],
            LogicalField::Coupon => &[Name("クーポン"), Name("クーポンコード")],
            LogicalField::Ticket => &[Name("チケット"), Name("券種"), Name("チケット名")],
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Return the index of the header that best matches `candidates`, or `None`.
pub fn resolve_column<S: AsRef<str>>(headers: &[S], candidates: &[Candidate]) -> Option<usize> {
    for candidate in candidates {
        if let Some(idx) = headers
            .iter()
            .position(|h| candidate.matches_exact(h.as_ref()))
        {
            return Some(idx);
        }
    }
    for candidate in candidates {
        if let Some(idx) = headers
            .iter()
            .position(|h| candidate.matches_partial(h.as_ref()))
        {
            return Some(idx);
        }
    }
    None
}

/// One logical field to resolve.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: LogicalField,
    pub candidates: &'static [Candidate],
    pub required: bool,
}

impl FieldSpec {
    pub fn required(field: LogicalField) -> Self {
        FieldSpec {
            field,
            candidates: field.default_candidates(),
            required: true,
        }
    }

    pub fn optional(field: LogicalField) -> Self {
        FieldSpec {
            field,
            candidates: field.default_candidates(),
            required: false,
        }
    }
}

/// Column indices for every resolved logical field.
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    indices: HashMap<LogicalField, usize>,
}

impl ResolvedColumns {
    pub fn get(&self, field: LogicalField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Index of a field that must be present.
    pub fn required(&self, field: LogicalField) -> ReportResult<usize> {
        self.get(field)
            .ok_or(ReportError::MissingColumns(vec![field]))
    }
}

/// Resolve every field in `specs`.
///
/// Fails with [`ReportError::MissingColumns`] naming every required field that
/// has no matching header, in `specs` order.
pub fn resolve_fields<S: AsRef<str>>(
    headers: &[S],
    specs: &[FieldSpec],
) -> ReportResult<ResolvedColumns> {
    let mut resolved = ResolvedColumns::default();
    let mut missing = Vec::new();

    for spec in specs {
        match resolve_column(headers, spec.candidates) {
            Some(idx) => {
                log::info!(
                    "Column for {}: '{}'",
                    spec.field,
                    headers[idx].as_ref()
                );
                resolved.indices.insert(spec.field, idx);
            }
            None if spec.required => missing.push(spec.field),
            None => log::info!("No column found for optional field {}", spec.field),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(ReportError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins_over_earlier_substring() {
        // "座席番号" contains "座席" but "席" is an exact match
        let headers = ["座席番号", "席"];
        let seat = LogicalField::Seat.default_candidates();
        assert_eq!(resolve_column(&headers, seat), Some(1));
    }

    #[test]
    fn test_candidate_order_decides_exact_match() {
        let headers = ["購入者名", "購入者"];
        assert_eq!(
            resolve_column(&headers, LogicalField::Buyer.default_candidates()),
            Some(1)
        );
    }

    #[test]
    fn test_substring_fallback() {
        let headers = ["注文番号", "座席(階-列-番)"];
        assert_eq!(
            resolve_column(&headers, LogicalField::Seat.default_candidates()),
            Some(1)
        );
    }

    #[test]
    fn test_all_of_keywords() {
        let headers = ["購入した日時"];
        assert_eq!(
            resolve_column(&headers, LogicalField::Timestamp.default_candidates()),
            Some(0)
        );
        let headers = ["購入方法"];
        assert_eq!(
            resolve_column(&headers, LogicalField::Timestamp.default_candidates()),
            None
        );
    }

    #[test]
    fn test_no_match_is_none() {
        let headers = ["name", "seat"];
        assert_eq!(
            resolve_column(&headers, LogicalField::Buyer.default_candidates()),
            None
        );
    }

    #[test]
    fn test_headers_are_not_case_folded() {
        let headers = ["Seat"];
        assert_eq!(resolve_column(&headers, &[Candidate::Name("seat")]), None);
    }

    #[test]
    fn test_missing_columns_lists_every_field() {
        let headers = ["購入者", "備考"];
        let specs = [
            FieldSpec::required(LogicalField::Buyer),
            FieldSpec::required(LogicalField::Coupon),
            FieldSpec::optional(LogicalField::Status),
            FieldSpec::required(LogicalField::Ticket),
        ];
        match resolve_fields(&headers, &specs) {
            Err(ReportError::MissingColumns(missing)) => {
                assert_eq!(missing, vec![LogicalField::Coupon, LogicalField::Ticket]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_fields_optional_absent() {
        let headers = vec!["座席".to_string(), "購入者".to_string()];
        let specs = [
            FieldSpec::required(LogicalField::Seat),
            FieldSpec::optional(LogicalField::Recipient),
        ];
        let resolved = resolve_fields(&headers, &specs).unwrap();
        assert_eq!(resolved.required(LogicalField::Seat).unwrap(), 0);
        assert!(resolved.required(LogicalField::Recipient).is_err());
        assert_eq!(resolved.get(LogicalField::Recipient), None);
    }
}
