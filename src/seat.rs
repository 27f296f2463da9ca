//! Seat identifiers: parsing free-text seat descriptions into canonical
//! `floor-row-number` keys.
//!
//! Examples of accepted input:
//! - `1階5列12番` → `1-05-12`
//! - `2階L列8番`, `2階L8`, `2-L-08`, `２階 Ｌ 列 ８ 番` → `2-L-08`
//! - `2階R列15番` → `2-R-15`
//! - `2階L列⑧番` → `2-L-08` (compatibility digits fold to ASCII)

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Row part of a seat key. Balcony side rows (`L`, `R`) sort before any
/// numbered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowDesignator {
    Left,
    Right,
    Number(u64),
}

impl RowDesignator {
    fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "L" => Some(RowDesignator::Left),
            "R" => Some(RowDesignator::Right),
            _ => None,
        }
    }
}

impl fmt::Display for RowDesignator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDesignator::Left => f.write_str("L"),
            RowDesignator::Right => f.write_str("R"),
            RowDesignator::Number(n) => write!(f, "{:02}", n),
        }
    }
}

/// Canonical seat identifier. Ordering is floor, then row (`L < R < 1 < 2 ...`),
/// then seat number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeatKey {
    pub floor: u64,
    pub row: RowDesignator,
    pub number: u64,
}

impl SeatKey {
    pub fn new(floor: u64, row: RowDesignator, number: u64) -> Self {
        SeatKey { floor, row, number }
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:02}", self.floor, self.row, self.number)
    }
}

impl FromStr for SeatKey {
    type Err = String;

    /// Accepts canonical keys only (`2-L-08`, `1-5-12`); use [`parse_seat`]
    /// for free text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical(&normalize_seat_text(s))
            .ok_or_else(|| format!("'{}' is not a seat key of the form floor-row-number", s))
    }
}

/// NFKC-normalize, trim and uppercase.
pub fn normalize_seat_text(raw: &str) -> String {
    fold_compatibility(raw).trim().to_uppercase()
}

/// Unicode NFKC: full-width ASCII, the ideographic space and compatibility
/// digits such as `⑧` become their plain forms.
pub(crate) fn fold_compatibility(raw: &str) -> String {
    raw.nfkc().collect()
}

lazy_static! {
    static ref CANONICAL: Regex = Regex::new(r"^([0-9]+)-([0-9]+|L|R)-([0-9]+)$").unwrap();
    static ref SIDE_ROW: Regex = Regex::new(
        r"([0-9]+)\s*(?:階|F)?\s*[-\s]*([LR])\s*(?:列)?\s*[-\s]*([0-9]+)\s*(?:番)?"
    )
    .unwrap();
    static ref NUMBERED_ROW: Regex = Regex::new(
        r"([0-9]+)\s*(?:階|F)?\s*[-\s]*([0-9]+)\s*(?:列)?\s*[-\s]*([0-9]+)\s*(?:番)?"
    )
    .unwrap();
}

fn parse_canonical(s: &str) -> Option<SeatKey> {
    let caps = CANONICAL.captures(s)?;
    let floor = caps[1].parse().ok()?;
    let row = match RowDesignator::from_letter(&caps[2]) {
        Some(side) => side,
        None => RowDesignator::Number(caps[2].parse().ok()?),
    };
    let number = caps[3].parse().ok()?;
    Some(SeatKey::new(floor, row, number))
}

fn parse_side_row(s: &str) -> Option<SeatKey> {
    let caps = SIDE_ROW.captures(s)?;
    Some(SeatKey::new(
        caps[1].parse().ok()?,
        RowDesignator::from_letter(&caps[2])?,
        caps[3].parse().ok()?,
    ))
}

fn parse_numbered_row(s: &str) -> Option<SeatKey> {
    let caps = NUMBERED_ROW.captures(s)?;
    Some(SeatKey::new(
        caps[1].parse().ok()?,
        RowDesignator::Number(caps[2].parse().ok()?),
        caps[3].parse().ok()?,
    ))
}

/// Parse a free-text seat description.
///
/// Rules are tried in priority order: canonical `F-R-N`, then floor / L-R row /
/// number, then floor / numbered row / number. Returns `None` when none apply.
pub fn parse_seat(raw: &str) -> Option<SeatKey> {
    let s = normalize_seat_text(raw);
    if s.is_empty() {
        return None;
    }
    parse_canonical(&s)
        .or_else(|| parse_side_row(&s))
        .or_else(|| parse_numbered_row(&s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> String {
        parse_seat(s).map(|k| k.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_numbered_rows() {
        assert_eq!(key("1階5列12番"), "1-05-12");
        assert_eq!(key("S席1階5列1番"), "1-05-01");
        assert_eq!(key("1F 5列 3番"), "1-05-03");
        assert_eq!(key("1-5-12"), "1-05-12");
    }

    #[test]
    fn test_side_rows() {
        assert_eq!(key("2階L列8番"), "2-L-08");
        assert_eq!(key("2階L8"), "2-L-08");
        assert_eq!(key("2-L-08"), "2-L-08");
        assert_eq!(key("2階R列15番"), "2-R-15");
        assert_eq!(key("2f-r-3"), "2-R-03");
    }

    #[test]
    fn test_full_width_matches_half_width() {
        assert_eq!(parse_seat("２階 Ｌ 列 ８ 番"), parse_seat("2階L列8番"));
        assert_eq!(parse_seat("１階５列１２番"), parse_seat("1階5列12番"));
        assert_eq!(parse_seat("　２－Ｒ－０３　"), parse_seat("2-R-03"));
    }

    #[test]
    fn test_compatibility_digits_fold() {
        assert_eq!(parse_seat("2階L列⑧番"), parse_seat("2階L列8番"));
        assert_eq!(key("2階L列⑧番"), "2-L-08");
        assert_eq!(key("①階⑤列⑫番"), "1-05-12");
        assert_eq!(key("2階R列⒖番"), "2-R-15");
    }

    #[test]
    fn test_large_numbers() {
        assert_eq!(key("99999999999階5列1番"), "99999999999-05-01");
        assert_eq!(key("1-L-4294967296"), "1-L-4294967296");
        // Beyond u64 the rule cannot hold the value
        assert_eq!(parse_seat("99999999999999999999階5列1番"), None);
    }

    #[test]
    fn test_equivalent_spellings_share_a_key() {
        fn full_width(s: &str) -> String {
            s.chars()
                .map(|c| match c {
                    '!'..='~' => char::from_u32(c as u32 + 0xFEE0).unwrap_or(c),
                    ' ' => '\u{3000}',
                    _ => c,
                })
                .collect()
        }

        let rows = [RowDesignator::Left, RowDesignator::Right]
            .into_iter()
            .chain((1..=12).map(RowDesignator::Number));
        let mut checked = 0;
        for row in rows {
            for floor in 1..=3u64 {
                for number in [1u64, 7, 10, 25] {
                    let expected = SeatKey::new(floor, row, number);
                    let row_text = match row {
                        RowDesignator::Left => "L".to_string(),
                        RowDesignator::Right => "R".to_string(),
                        RowDesignator::Number(n) => n.to_string(),
                    };
                    let plain = format!("{floor}階{row_text}列{number}番");
                    let spellings = [
                        expected.to_string(),
                        format!("{floor}-{row_text}-{number}"),
                        plain.clone(),
                        format!("{floor}F {row_text}列 {number}番"),
                        format!(" {floor} 階 {row_text} 列 {number} 番 "),
                        format!("S席{plain}"),
                        full_width(&plain),
                        full_width(&expected.to_string()),
                    ];
                    for spelling in &spellings {
                        assert_eq!(parse_seat(spelling), Some(expected), "{spelling}");
                    }
                    assert_eq!(expected.to_string().parse::<SeatKey>(), Ok(expected));
                    checked += 1;
                }
            }
        }
        assert_eq!(checked, 14 * 3 * 4);
    }

    #[test]
    fn test_canonical_round_trip() {
        for s in ["1-05-12", "2-L-08", "2-R-15", "10-12-100"] {
            assert_eq!(key(s), s);
            assert_eq!(s.parse::<SeatKey>().unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_seat("elevator shaft"), None);
        assert_eq!(parse_seat(""), None);
        assert_eq!(parse_seat("   "), None);
        assert_eq!(parse_seat("自由席"), None);
        assert_eq!(parse_seat("1階5列"), None);
        assert!("1階5列12番".parse::<SeatKey>().is_err());
    }

    #[test]
    fn test_sort_order() {
        let mut keys = vec![
            SeatKey::new(1, RowDesignator::Number(3), 2),
            SeatKey::new(1, RowDesignator::Number(3), 1),
            SeatKey::new(1, RowDesignator::Right, 1),
            SeatKey::new(1, RowDesignator::Left, 1),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["1-L-01", "1-R-01", "1-03-01", "1-03-02"]);
    }

    #[test]
    fn test_floor_sorts_first() {
        let mut keys = vec![
            SeatKey::new(2, RowDesignator::Left, 1),
            SeatKey::new(1, RowDesignator::Number(20), 9),
        ];
        keys.sort();
        assert_eq!(keys[0].floor, 1);
    }
}
