use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::season::{Month, Season};

// ---------------------------------------------------------------------------
// Missing-value markers
// ---------------------------------------------------------------------------

/// Cell texts read as "no value", the same set pandas recognises by default.
/// Matching is exact after trimming surrounding whitespace.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a text cell is a missing-value marker.
pub fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// A country cell as an ISO-3 code, or empty when the cell marks a missing value.
pub fn country_code(cell: &str) -> String {
    if is_na(cell) {
        String::new()
    } else {
        cell.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// RawNumber – a single numeric cell as read from the source file
// ---------------------------------------------------------------------------

/// A numeric cell before cleaning. Missing cells are filled with zero by the
/// cleaner; unparseable ones disqualify the row.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNumber {
    Missing,
    Value(f64),
    Invalid(String),
}

impl RawNumber {
    /// Interpret a text cell (CSV, or a JSON string).
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if is_na(s) {
            return RawNumber::Missing;
        }
        match s.parse::<f64>() {
            Ok(v) => RawNumber::Value(v),
            Err(_) => RawNumber::Invalid(s.to_string()),
        }
    }

    /// `None` when the cell cannot be used as a number.
    pub fn or_zero(&self) -> Option<f64> {
        match self {
            RawNumber::Missing => Some(0.0),
            RawNumber::Value(v) if v.is_finite() => Some(*v),
            RawNumber::Value(_) | RawNumber::Invalid(_) => None,
        }
    }
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            RawNumber::Missing
        } else {
            RawNumber::Value(v)
        }
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumber::Missing => write!(f, "<missing>"),
            RawNumber::Value(v) => write!(f, "{v}"),
            RawNumber::Invalid(s) => write!(f, "{s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawBooking – one row of the source file
// ---------------------------------------------------------------------------

/// One booking as loaded, before the cleaning rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBooking {
    pub is_canceled: RawNumber,
    pub adults: RawNumber,
    pub children: RawNumber,
    pub babies: RawNumber,
    /// Average daily rate.
    pub adr: RawNumber,
    pub month: Month,
    /// ISO-3 code, empty when unknown.
    pub country: String,
}

// ---------------------------------------------------------------------------
// BookingRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A booking that passed cleaning.
///
/// Guarantees: `1 <= adults + children + babies <= 12`, `adults <= 6`,
/// `children <= 5`, `babies <= 5` and `0 <= adr <= 500`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRecord {
    pub is_canceled: bool,
    pub month: Month,
    pub season: Season,
    pub adults: u8,
    pub children: u8,
    pub babies: u8,
    pub adr: f64,
    pub country: String,
}

impl BookingRecord {
    pub fn guests(&self) -> u32 {
        u32::from(self.adults) + u32::from(self.children) + u32::from(self.babies)
    }
}

// ---------------------------------------------------------------------------
// BookingDataset – the canonical cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset together with the value domains offered by the filter
/// controls. Built once after loading and never mutated.
#[derive(Debug, Clone, Default)]
pub struct BookingDataset {
    pub records: Vec<BookingRecord>,
    pub adults: BTreeSet<u8>,
    pub children: BTreeSet<u8>,
    pub babies: BTreeSet<u8>,
    /// Seasons with at least one record.
    pub seasons: BTreeSet<Season>,
    /// `(min, max)` of the ADR column, `None` for an empty dataset.
    pub adr_range: Option<(f64, f64)>,
}

impl BookingDataset {
    /// Compute the control domains from the cleaned records.
    pub fn from_records(records: Vec<BookingRecord>) -> Self {
        let mut adults = BTreeSet::new();
        let mut children = BTreeSet::new();
        let mut babies = BTreeSet::new();
        let mut seasons = BTreeSet::new();
        let mut adr_range: Option<(f64, f64)> = None;

        for r in &records {
            adults.insert(r.adults);
            children.insert(r.children);
            babies.insert(r.babies);
            seasons.insert(r.season);
            adr_range = Some(match adr_range {
                None => (r.adr, r.adr),
                Some((lo, hi)) => (lo.min(r.adr), hi.max(r.adr)),
            });
        }

        BookingDataset {
            records,
            adults,
            children,
            babies,
            seasons,
            adr_range,
        }
    }

    /// Integer bounds for the price slider: `(floor(min), ceil(max))`.
    pub fn price_bounds(&self) -> (f64, f64) {
        self.adr_range
            .map(|(lo, hi)| (lo.floor(), hi.ceil()))
            .unwrap_or((0.0, 0.0))
    }

    /// Seasons present in the data, in display order.
    pub fn season_options(&self) -> Vec<Season> {
        Season::DISPLAY_ORDER
            .into_iter()
            .filter(|s| self.seasons.contains(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
