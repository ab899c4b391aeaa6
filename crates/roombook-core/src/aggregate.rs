use crate::model::{Month, RoomReport};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// One room-month as listed in the raw data sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StayRow {
    pub room: u32,
    pub month: Month,
    pub arrivals: Option<u32>,
    pub nights: u32,
    pub revenue: Decimal,
    pub adr: Option<Decimal>,
    pub source: String,
}

/// Everything known about one fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearDataset {
    pub year: i32,
    /// Raw room-month rows in the order the reports were merged.
    pub rows: Vec<StayRow>,
    pub revenue: BTreeMap<u32, [Option<Decimal>; 12]>,
    pub nights: BTreeMap<u32, [Option<u32>; 12]>,
    pub sources: Vec<String>,
}

impl YearDataset {
    pub fn new(year: i32) -> Self {
        YearDataset {
            year,
            ..Default::default()
        }
    }

    /// Merge a report into this year. A later report overwrites a room-month
    /// an earlier one already set; differing values are logged.
    pub fn add_report(&mut self, report: &RoomReport) {
        self.sources.push(report.source.clone());

        for record in &report.rooms {
            for entry in &record.months {
                self.rows.push(StayRow {
                    room: record.room,
                    month: entry.month,
                    arrivals: entry.arrivals,
                    nights: entry.nights,
                    revenue: entry.revenue,
                    adr: entry.adr,
                    source: report.source.clone(),
                });

                let m = entry.month.index();
                let revenue = self.revenue.entry(record.room).or_default();
                if let Some(previous) = revenue[m] {
                    if previous != entry.revenue {
                        warn!(
                            year = self.year,
                            room = record.room,
                            month = %entry.month,
                            source = %report.source,
                            "room revenue {} replaces {}",
                            entry.revenue,
                            previous
                        );
                    }
                }
                revenue[m] = Some(entry.revenue);

                let nights = self.nights.entry(record.room).or_default();
                if let Some(previous) = nights[m] {
                    if previous != entry.nights {
                        warn!(
                            year = self.year,
                            room = record.room,
                            month = %entry.month,
                            source = %report.source,
                            "room nights {} replace {}",
                            entry.nights,
                            previous
                        );
                    }
                }
                nights[m] = Some(entry.nights);
            }
        }
    }

    /// Rooms for the revenue and booking grids, plus rooms that have data but
    /// are missing from `configured`. An empty `configured` lists every room
    /// with data.
    pub fn grid_rooms(&self, configured: &[u32]) -> (Vec<u32>, Vec<u32>) {
        if configured.is_empty() {
            return (self.revenue.keys().copied().collect(), Vec::new());
        }
        let unlisted = self
            .revenue
            .keys()
            .copied()
            .filter(|r| !configured.contains(r))
            .collect();
        (configured.to_vec(), unlisted)
    }

    pub fn yearly_revenue(&self, room: u32) -> Decimal {
        self.revenue
            .get(&room)
            .map(|months| months.iter().flatten().sum())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn yearly_nights(&self, room: u32) -> u64 {
        self.nights
            .get(&room)
            .map(|months| months.iter().flatten().map(|&n| u64::from(n)).sum())
            .unwrap_or(0)
    }
}

/// Year buckets keyed by fiscal year.
#[derive(Debug, Default)]
pub struct YearBuckets {
    years: BTreeMap<i32, YearDataset>,
}

impl YearBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_report(&mut self, report: &RoomReport) {
        self.years
            .entry(report.fiscal_year)
            .or_insert_with(|| YearDataset::new(report.fiscal_year))
            .add_report(report);
    }

    pub fn get(&self, year: i32) -> Option<&YearDataset> {
        self.years.get(&year)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Datasets in ascending year order.
    pub fn into_datasets(self) -> Vec<YearDataset> {
        self.years.into_values().collect()
    }
}

/// Merge reports into year buckets in the order given.
pub fn aggregate<'a>(reports: impl IntoIterator<Item = &'a RoomReport>) -> YearBuckets {
    let mut buckets = YearBuckets::new();
    for report in reports {
        buckets.add_report(report);
    }
    buckets
}
