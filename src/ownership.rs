//! Per-seat ownership history: who held a seat, through whom it passed, and
//! whether its final state is cancelled.

use crate::seat::SeatKey;
use crate::timestamp::EventTime;

/// Separator used when rendering an ownership chain.
pub const CHAIN_SEPARATOR: &str = " → ";

/// Status words that mark a row as a cancellation.
pub const DEFAULT_CANCEL_WORDS: &[&str] = &["キャンセル", "取消", "払戻", "返金", "無効"];

/// One sales-history row, reduced to what the ownership fold needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipEvent {
    /// Buyer / current owner
    pub from: String,
    /// Recipient / transferee; equals `from` when the export has no recipient column
    pub to: String,
    pub time: EventTime,
    pub is_cancel: bool,
}

impl OwnershipEvent {
    pub fn new(from: &str, to: &str, time: EventTime, is_cancel: bool) -> Self {
        OwnershipEvent {
            from: from.trim().to_string(),
            to: to.trim().to_string(),
            time,
            is_cancel,
        }
    }
}

/// Final state of one seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSummary {
    pub seat: SeatKey,
    /// Whether the chronologically last event was a cancellation
    pub cancelled: bool,
    /// Successive holders, no two consecutive entries equal
    pub chain: Vec<String>,
    pub final_owner: String,
    /// Time of the last event, `""` when the export has no timestamps
    pub final_time: String,
}

impl SeatSummary {
    pub fn chain_display(&self) -> String {
        self.chain.join(CHAIN_SEPARATOR)
    }
}

/// True when `status` contains any of the cancellation words.
pub fn is_cancel_status<S: AsRef<str>>(status: &str, words: &[S]) -> bool {
    words.iter().any(|w| status.contains(w.as_ref()))
}

/// Accumulator for the ownership fold.
#[derive(Debug, Default)]
struct Custody {
    chain: Vec<String>,
    holder: String,
}

impl Custody {
    fn observe(mut self, event: &OwnershipEvent) -> Self {
        if self.chain.is_empty() {
            let first = if event.from.is_empty() {
                &event.to
            } else {
                &event.from
            };
            if first.is_empty() {
                return self;
            }
            self.chain.push(first.clone());
            self.holder = first.clone();
        }

        let next = if event.to.is_empty() {
            &event.from
        } else {
            &event.to
        };
        if !next.is_empty() && *next != self.holder {
            self.chain.push(next.clone());
            self.holder = next.clone();
        }
        self
    }
}

/// Fold all events for one seat into its summary.
///
/// Events are ordered by time with a stable sort, so events sharing a time
/// (including every unparsed time) keep their input order.
pub fn reduce_seat(seat: SeatKey, mut events: Vec<OwnershipEvent>) -> SeatSummary {
    events.sort_by_key(|e| e.time.sort_key());

    let custody = events.iter().fold(Custody::default(), Custody::observe);

    let final_owner = match custody.chain.last() {
        Some(owner) => owner.clone(),
        None => events
            .iter()
            .rev()
            .find(|e| !e.to.is_empty())
            .map(|e| e.to.clone())
            .unwrap_or_default(),
    };

    let last = events.last();
    SeatSummary {
        seat,
        cancelled: last.map(|e| e.is_cancel).unwrap_or(false),
        chain: custody.chain,
        final_owner,
        final_time: last.map(|e| e.time.display()).unwrap_or_default(),
    }
}
