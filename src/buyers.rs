//! Buyer ranking: how many S and A seats each buyer bought with the campaign
//! coupon, excluding hand-over ("受取") transactions.

use crate::columns::{resolve_fields, FieldSpec, LogicalField};
use crate::decode::Table;
use crate::error::ReportResult;
use crate::report::Report;
use std::collections::HashMap;

pub const DEFAULT_COUPON: &str = "TAO1013gregor";
pub const DEFAULT_EXCLUDED_TRANSACTIONS: &[&str] = &["無料受取", "有料受取"];

/// Seat class printed at the start of the ticket name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatClass {
    S,
    A,
}

/// Classify a ticket by its name prefix (`S席...`, `A席...`).
pub fn classify_ticket(ticket: &str) -> Option<SeatClass> {
    if ticket.starts_with("S席") {
        Some(SeatClass::S)
    } else if ticket.starts_with("A席") {
        Some(SeatClass::A)
    } else {
        None
    }
}

/// Ticket counts for one buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuyerSummary {
    pub buyer: String,
    pub s_count: u64,
    pub a_count: u64,
}

impl BuyerSummary {
    fn new(buyer: &str) -> Self {
        BuyerSummary {
            buyer: buyer.to_string(),
            ..Default::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.s_count + self.a_count
    }

    fn add(&mut self, class: Option<SeatClass>) {
        match class {
            Some(SeatClass::S) => self.s_count += 1,
            Some(SeatClass::A) => self.a_count += 1,
            None => {}
        }
    }
}

/// Filter settings for the buyer ranking.
#[derive(Debug, Clone)]
pub struct BuyerReportConfig {
    /// Only rows whose coupon code equals this exactly are counted
    pub coupon: String,
    /// Transaction types (処理) that are not purchases
    pub excluded_transactions: Vec<String>,
}

impl Default for BuyerReportConfig {
    fn default() -> Self {
        BuyerReportConfig {
            coupon: DEFAULT_COUPON.to_string(),
            excluded_transactions: DEFAULT_EXCLUDED_TRANSACTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Build the buyer ranking for a decoded export.
///
/// Buyers appear once each, ordered by total descending and then by name.
/// Buyers whose rows carry neither an S nor an A ticket still appear with zero
/// counts.
pub fn aggregate_buyers(
    table: &Table,
    config: &BuyerReportConfig,
) -> ReportResult<Report<BuyerSummary>> {
    let columns = resolve_fields(
        &table.headers,
        &[
            FieldSpec::required(LogicalField::Buyer),
            FieldSpec::required(LogicalField::Transaction),
            FieldSpec::required(LogicalField::Coupon),
            FieldSpec::required(LogicalField::Ticket),
        ],
    )?;
    let buyer_col = columns.required(LogicalField::Buyer)?;
    let transaction_col = columns.required(LogicalField::Transaction)?;
    let coupon_col = columns.required(LogicalField::Coupon)?;
    let ticket_col = columns.required(LogicalField::Ticket)?;

    let mut order: Vec<String> = Vec::new();
    let mut by_buyer: HashMap<String, BuyerSummary> = HashMap::new();
    let mut matched = 0usize;

    for row in &table.rows {
        if row.get(coupon_col) != config.coupon {
            continue;
        }
        let transaction = row.get(transaction_col);
        if config
            .excluded_transactions
            .iter()
            .any(|t| t == transaction)
        {
            continue;
        }
        matched += 1;

        let buyer = row.get(buyer_col);
        let summary = by_buyer.entry(buyer.to_string()).or_insert_with(|| {
            order.push(buyer.to_string());
            BuyerSummary::new(buyer)
        });
        summary.add(classify_ticket(row.get(ticket_col)));
    }

    log::info!(
        "{} of {} rows matched coupon '{}' ({} buyers)",
        matched,
        table.rows.len(),
        config.coupon,
        order.len()
    );

    let mut rows: Vec<BuyerSummary> = order
        .iter()
        .filter_map(|name| by_buyer.remove(name))
        .collect();
    rows.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.buyer.cmp(&b.buyer)));

    Ok(Report::new(rows, Vec::new()))
}
