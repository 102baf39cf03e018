use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::model::{BookingDataset, BookingRecord, RawBooking, RawNumber};

/// Upper bound on the party size of a single booking.
pub const MAX_GUESTS: u32 = 12;
pub const MAX_ADULTS: u8 = 6;
pub const MAX_CHILDREN: u8 = 5;
pub const MAX_BABIES: u8 = 5;
pub const MAX_ADR: f64 = 500.0;

// ---------------------------------------------------------------------------
// Drop reasons and the cleaning report
// ---------------------------------------------------------------------------

/// Why a raw row was excluded from the canonical dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// A numeric cell was not a finite number, was negative, or
    /// `is_canceled` was neither 0 nor 1.
    Unparseable,
    NoGuests,
    TooManyGuests,
    TooManyAdults,
    TooManyChildren,
    TooManyBabies,
    AdrOutOfRange,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::Unparseable => "unparseable numeric cell",
            DropReason::NoGuests => "no guests",
            DropReason::TooManyGuests => "more than 12 guests",
            DropReason::TooManyAdults => "more than 6 adults",
            DropReason::TooManyChildren => "more than 5 children",
            DropReason::TooManyBabies => "more than 5 babies",
            DropReason::AdrOutOfRange => "ADR outside [0, 500]",
        };
        f.write_str(s)
    }
}

/// Row counts produced by [`clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl CleaningReport {
    pub fn rows_dropped(&self) -> usize {
        self.dropped.values().sum()
    }
}

// ---------------------------------------------------------------------------
// Cleaning rules
// ---------------------------------------------------------------------------

/// Read a guest count: missing → 0, negative or non-finite → `None`.
/// The value is kept fractional so the upper bounds see the raw number.
fn count(cell: &RawNumber) -> Option<f64> {
    cell.or_zero().filter(|v| *v >= 0.0)
}

/// Apply the cleaning rules to a single row.
///
/// Upper bounds are checked against the raw counts, so `children = 5.5`
/// exceeds the limit of 5. Counts are truncated afterwards; a row whose
/// truncated counts sum to zero has no guests.
pub fn clean_row(raw: &RawBooking) -> Result<BookingRecord, DropReason> {
    let canceled = match raw.is_canceled.or_zero() {
        Some(v) if v == 0.0 => false,
        Some(v) if v == 1.0 => true,
        _ => return Err(DropReason::Unparseable),
    };
    let adults = count(&raw.adults).ok_or(DropReason::Unparseable)?;
    let children = count(&raw.children).ok_or(DropReason::Unparseable)?;
    let babies = count(&raw.babies).ok_or(DropReason::Unparseable)?;
    let adr = raw.adr.or_zero().ok_or(DropReason::Unparseable)?;

    if adults.trunc() + children.trunc() + babies.trunc() == 0.0 {
        return Err(DropReason::NoGuests);
    }
    if adults + children + babies > f64::from(MAX_GUESTS) {
        return Err(DropReason::TooManyGuests);
    }
    if adults > f64::from(MAX_ADULTS) {
        return Err(DropReason::TooManyAdults);
    }
    if children > f64::from(MAX_CHILDREN) {
        return Err(DropReason::TooManyChildren);
    }
    if babies > f64::from(MAX_BABIES) {
        return Err(DropReason::TooManyBabies);
    }
    if !(0.0..=MAX_ADR).contains(&adr) {
        return Err(DropReason::AdrOutOfRange);
    }

    // Bounds checked above, the casts only drop the fraction.
    Ok(BookingRecord {
        is_canceled: canceled,
        month: raw.month,
        season: raw.month.season(),
        adults: adults as u8,
        children: children as u8,
        babies: babies as u8,
        adr,
        country: raw.country.trim().to_string(),
    })
}

/// Clean every raw row, keeping source order.
pub fn clean(rows: &[RawBooking]) -> (Vec<BookingRecord>, CleaningReport) {
    let mut report = CleaningReport {
        rows_read: rows.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for raw in rows {
        match clean_row(raw) {
            Ok(rec) => records.push(rec),
            Err(reason) => *report.dropped.entry(reason).or_default() += 1,
        }
    }
    report.rows_kept = records.len();
    (records, report)
}

/// Clean the raw rows and build the canonical dataset.
pub fn build_dataset(rows: &[RawBooking]) -> (BookingDataset, CleaningReport) {
    let (records, report) = clean(rows);
    log::info!(
        "Cleaned dataset: {} of {} rows kept",
        report.rows_kept,
        report.rows_read
    );
    for (reason, n) in &report.dropped {
        log::debug!("  dropped {n} rows: {reason}");
    }
    if report.rows_read > 0 && report.rows_kept == 0 {
        log::warn!("Every row was removed during cleaning");
    }
    (BookingDataset::from_records(records), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::season::{Month, Season};

    fn raw(adults: f64, children: f64, babies: f64, adr: f64) -> RawBooking {
        RawBooking {
            is_canceled: RawNumber::Value(0.0),
            adults: RawNumber::Value(adults),
            children: RawNumber::Value(children),
            babies: RawNumber::Value(babies),
            adr: RawNumber::Value(adr),
            month: Month::July,
            country: "PRT".into(),
        }
    }

    #[test]
    fn keeps_valid_row() {
        let rec = clean_row(&raw(2.0, 1.0, 0.0, 100.0)).unwrap();
        assert_eq!(rec.adults, 2);
        assert_eq!(rec.children, 1);
        assert_eq!(rec.season, Season::Summer);
        assert!(!rec.is_canceled);
    }

    #[test]
    fn missing_cells_become_zero() {
        let mut r = raw(2.0, 0.0, 0.0, 80.0);
        r.children = RawNumber::Missing;
        r.babies = RawNumber::Missing;
        r.is_canceled = RawNumber::Missing;
        let rec = clean_row(&r).unwrap();
        assert_eq!((rec.children, rec.babies), (0, 0));
        assert!(!rec.is_canceled);
    }

    #[test]
    fn fractional_children_are_truncated() {
        let rec = clean_row(&raw(1.0, 2.0, 0.0, 50.0)).unwrap();
        assert_eq!(rec.children, 2);
        let rec = clean_row(&raw(1.0, 1.9, 0.0, 50.0)).unwrap();
        assert_eq!(rec.children, 1);
        let rec = clean_row(&raw(1.0, 4.9, 0.0, 50.0)).unwrap();
        assert_eq!(rec.children, 4);
    }

    #[test]
    fn bounds_apply_before_truncation() {
        assert_eq!(clean_row(&raw(1.0, 5.5, 0.0, 50.0)), Err(DropReason::TooManyChildren));
        assert_eq!(clean_row(&raw(6.5, 0.0, 0.0, 50.0)), Err(DropReason::TooManyAdults));
        assert_eq!(clean_row(&raw(1.0, 0.0, 5.1, 50.0)), Err(DropReason::TooManyBabies));
        assert_eq!(clean_row(&raw(6.0, 5.0, 1.5, 50.0)), Err(DropReason::TooManyGuests));
        assert_eq!(clean_row(&raw(0.5, 0.0, 0.0, 50.0)), Err(DropReason::NoGuests));
    }

    #[test]
    fn drop_reasons() {
        assert_eq!(clean_row(&raw(0.0, 0.0, 0.0, 50.0)), Err(DropReason::NoGuests));
        assert_eq!(clean_row(&raw(6.0, 5.0, 2.0, 50.0)), Err(DropReason::TooManyGuests));
        assert_eq!(clean_row(&raw(7.0, 0.0, 0.0, 50.0)), Err(DropReason::TooManyAdults));
        assert_eq!(clean_row(&raw(1.0, 6.0, 0.0, 50.0)), Err(DropReason::TooManyChildren));
        assert_eq!(clean_row(&raw(1.0, 0.0, 6.0, 50.0)), Err(DropReason::TooManyBabies));
        assert_eq!(clean_row(&raw(2.0, 0.0, 0.0, 600.0)), Err(DropReason::AdrOutOfRange));
        assert_eq!(clean_row(&raw(2.0, 0.0, 0.0, -6.38)), Err(DropReason::AdrOutOfRange));
        assert_eq!(clean_row(&raw(-1.0, 2.0, 0.0, 50.0)), Err(DropReason::Unparseable));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert!(clean_row(&raw(6.0, 5.0, 1.0, 500.0)).is_ok());
        assert!(clean_row(&raw(1.0, 0.0, 0.0, 0.0)).is_ok());
        assert!(clean_row(&raw(0.0, 0.0, 1.0, 0.0)).is_ok());
    }

    #[test]
    fn unparseable_cells_drop_the_row() {
        let mut r = raw(2.0, 0.0, 0.0, 80.0);
        r.children = RawNumber::Invalid("two".into());
        assert_eq!(clean_row(&r), Err(DropReason::Unparseable));

        let mut r = raw(2.0, 0.0, 0.0, 80.0);
        r.is_canceled = RawNumber::Value(2.0);
        assert_eq!(clean_row(&r), Err(DropReason::Unparseable));
    }

    #[test]
    fn report_counts_every_row() {
        let rows = vec![
            raw(2.0, 0.0, 0.0, 100.0),
            raw(1.0, 1.0, 0.0, 600.0),
            raw(0.0, 0.0, 0.0, 50.0),
        ];
        let (records, report) = clean(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.rows_dropped(), 2);
        assert_eq!(report.dropped.get(&DropReason::AdrOutOfRange), Some(&1));
        assert_eq!(report.dropped.get(&DropReason::NoGuests), Some(&1));
    }
}
