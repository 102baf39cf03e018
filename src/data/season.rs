use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Month
// ---------------------------------------------------------------------------

/// Arrival month, parsed from the full English month name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

/// Raised at the loader boundary when `arrival_date_month` is not one of the
/// twelve canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown month name: {0:?}")]
pub struct UnknownMonth(pub String);

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Meteorological season of the month.
    pub fn season(self) -> Season {
        use Month::*;
        match self {
            December | January | February => Season::Winter,
            March | April | May => Season::Spring,
            June | July | August => Season::Summer,
            September | October | November => Season::Fall,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.name() == trimmed)
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Display order of seasons in the season/month chart and the selector.
    pub const DISPLAY_ORDER: [Season; 4] =
        [Season::Winter, Season::Fall, Season::Summer, Season::Spring];

    pub fn of(month: Month) -> Self {
        month.season()
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }

    /// Position in [`Season::DISPLAY_ORDER`].
    pub fn rank(self) -> usize {
        match self {
            Season::Winter => 0,
            Season::Fall => 1,
            Season::Summer => 2,
            Season::Spring => 3,
        }
    }

    /// Months belonging to this season, December first for winter.
    pub fn months(self) -> [Month; 3] {
        use Month::*;
        match self {
            Season::Winter => [December, January, February],
            Season::Spring => [March, April, May],
            Season::Summer => [June, July, August],
            Season::Fall => [September, October, November],
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Month ordering
// ---------------------------------------------------------------------------

/// Categorical ordering of months used for display and sorting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthOrder {
    /// January through December.
    #[default]
    Calendar,
    /// Season triplets with each triplet reversed:
    /// February, January, December, May, April, March, ...
    Legacy,
}

impl MonthOrder {
    /// The twelve months in this order.
    pub fn sequence(self) -> [Month; 12] {
        match self {
            MonthOrder::Calendar => Month::ALL,
            MonthOrder::Legacy => {
                let mut out = [Month::January; 12];
                let triplets = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];
                for (i, season) in triplets.into_iter().enumerate() {
                    let [a, b, c] = season.months();
                    out[i * 3] = c;
                    out[i * 3 + 1] = b;
                    out[i * 3 + 2] = a;
                }
                out
            }
        }
    }

    /// Sort key of `month` within this order.
    pub fn rank(self, month: Month) -> usize {
        self.sequence()
            .iter()
            .position(|m| *m == month)
            .unwrap_or(usize::MAX)
    }
}

impl FromStr for MonthOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "calendar" => Ok(MonthOrder::Calendar),
            "legacy" => Ok(MonthOrder::Legacy),
            other => Err(format!("unknown month order '{other}' (expected calendar or legacy)")),
        }
    }
}
