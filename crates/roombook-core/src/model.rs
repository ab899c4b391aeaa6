use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

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

impl Month {
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

    /// Zero-based position in the calendar year.
    pub fn index(self) -> usize {
        self as usize
    }

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

    /// Match a full English month name or its three-letter abbreviation.
    pub fn from_str_loose(s: &str) -> Option<Month> {
        let lower = s.trim().trim_end_matches('.').to_lowercase();
        if lower.len() < 3 {
            return None;
        }
        Month::ALL.into_iter().find(|m| {
            let name = m.name().to_lowercase();
            lower == name || (lower.len() == 3 && name.starts_with(&lower))
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One month's figures for a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthEntry {
    pub month: Month,
    pub arrivals: Option<u32>,
    pub nights: u32,
    pub revenue: Decimal,
    pub adr: Option<Decimal>,
}

/// Totals row closing a room block. Counts are u64 so summed month rows
/// cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTotals {
    pub arrivals: Option<u64>,
    pub nights: u64,
    pub revenue: Decimal,
    pub adr: Option<Decimal>,
    /// False when the report had no totals row and the figures were summed.
    pub reported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room: u32,
    pub months: Vec<MonthEntry>,
    pub totals: RoomTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

/// Parsed content of a single report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomReport {
    /// File name of the report the rows came from.
    pub source: String,
    pub fiscal_year: i32,
    pub rooms: Vec<RoomRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

impl RoomReport {
    pub fn month_count(&self) -> usize {
        self.rooms.iter().map(|r| r.months.len()).sum()
    }
}
