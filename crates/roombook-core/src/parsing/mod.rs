pub mod values;
pub mod year;

use crate::error::RoombookError;
use crate::extraction::table::{extract_tables, ColumnMap, ExtractedTable, TableRow};
use crate::extraction::PageContent;
use crate::model::{Month, MonthEntry, RoomRecord, RoomReport, RoomTotals, SkippedLine};
use rust_decimal::Decimal;
use values::{parse_count, parse_money, parse_room_number};
use year::{derive_fiscal_year, YearSource};

fn cell(row: &TableRow, idx: usize) -> &str {
    row.cells.get(idx).map(|s| s.trim()).unwrap_or("")
}

fn is_total_label(s: &str) -> bool {
    s.is_empty() || s.to_lowercase().starts_with("total")
}

/// Figures of a month or totals row.
struct RowFigures {
    arrivals: Option<u32>,
    nights: Option<u32>,
    revenue: Option<Decimal>,
    adr: Option<Decimal>,
}

impl RowFigures {
    fn is_empty(&self) -> bool {
        self.arrivals.is_none() && self.nights.is_none() && self.revenue.is_none() && self.adr.is_none()
    }
}

fn parse_figures(row: &TableRow, cols: &ColumnMap) -> Result<RowFigures, RoombookError> {
    Ok(RowFigures {
        arrivals: match cols.arrivals {
            Some(i) => parse_count(cell(row, i))?,
            None => None,
        },
        nights: parse_count(cell(row, cols.nights))?,
        revenue: parse_money(cell(row, cols.revenue))?,
        adr: match cols.adr {
            Some(i) => parse_money(cell(row, i))?,
            None => None,
        },
    })
}

/// A room block being read; it may continue across pages.
struct RoomBuilder {
    room: u32,
    months: Vec<MonthEntry>,
}

impl RoomBuilder {
    fn finish(self, totals: Option<RoomTotals>, skipped: &mut Vec<SkippedLine>) -> Option<RoomRecord> {
        if self.months.is_empty() {
            skipped.push(SkippedLine {
                line_text: self.room.to_string(),
                reason: "room block has no month rows".into(),
            });
            return None;
        }
        let totals = totals.unwrap_or_else(|| summed_totals(&self.months));
        Some(RoomRecord {
            room: self.room,
            months: self.months,
            totals,
        })
    }
}

/// Totals for a room block that had no totals row.
fn summed_totals(months: &[MonthEntry]) -> RoomTotals {
    let nights: u64 = months.iter().map(|m| u64::from(m.nights)).sum();
    let revenue: Decimal = months.iter().map(|m| m.revenue).sum();
    let arrivals = if months.iter().any(|m| m.arrivals.is_some()) {
        Some(months.iter().filter_map(|m| m.arrivals).map(u64::from).sum())
    } else {
        None
    };
    let adr = if nights > 0 {
        Some((revenue / Decimal::from(nights)).round_dp(2))
    } else {
        None
    };
    RoomTotals {
        arrivals,
        nights,
        revenue,
        adr,
        reported: false,
    }
}

/// Walk the rows of every room table and rebuild the room blocks.
///
/// A row with a room number opens a block, rows with a month name add
/// figures to it, and a row with neither closes it as its totals row.
fn parse_room_tables(tables: &[ExtractedTable]) -> (Vec<RoomRecord>, Vec<SkippedLine>) {
    let mut rooms = Vec::new();
    let mut skipped = Vec::new();
    let mut current: Option<RoomBuilder> = None;

    for table in tables {
        let cols = &table.columns;

        for row in &table.rows {
            let room_cell = cell(row, cols.room);
            let month = Month::from_str_loose(cell(row, cols.month));

            if let Some(room) = parse_room_number(room_cell) {
                if let Some(builder) = current.take() {
                    rooms.extend(builder.finish(None, &mut skipped));
                }
                current = Some(RoomBuilder {
                    room,
                    months: Vec::new(),
                });
                if month.is_none() {
                    continue;
                }
            }

            let figures = match parse_figures(row, cols) {
                Ok(f) => f,
                Err(e) => {
                    skipped.push(SkippedLine {
                        line_text: row.raw.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Some(month) = month {
                match current.as_mut() {
                    Some(builder) => builder.months.push(MonthEntry {
                        month,
                        arrivals: figures.arrivals,
                        nights: figures.nights.unwrap_or(0),
                        revenue: figures.revenue.unwrap_or(Decimal::ZERO),
                        adr: figures.adr,
                    }),
                    None => skipped.push(SkippedLine {
                        line_text: row.raw.clone(),
                        reason: "month row outside a room block".into(),
                    }),
                }
                continue;
            }

            let is_totals = !figures.is_empty()
                && is_total_label(room_cell)
                && is_total_label(cell(row, cols.month));
            match (is_totals, current.take()) {
                (true, Some(builder)) => {
                    let totals = RoomTotals {
                        arrivals: figures.arrivals.map(u64::from),
                        nights: figures.nights.map(u64::from).unwrap_or(0),
                        revenue: figures.revenue.unwrap_or(Decimal::ZERO),
                        adr: figures.adr,
                        reported: true,
                    };
                    rooms.extend(builder.finish(Some(totals), &mut skipped));
                }
                (true, None) => skipped.push(SkippedLine {
                    line_text: row.raw.clone(),
                    reason: "totals row outside a room block".into(),
                }),
                (false, builder) => {
                    current = builder;
                    skipped.push(SkippedLine {
                        line_text: row.raw.clone(),
                        reason: "unrecognized row".into(),
                    });
                }
            }
        }
    }

    if let Some(builder) = current.take() {
        rooms.extend(builder.finish(None, &mut skipped));
    }

    (rooms, skipped)
}

/// Parse extracted page content of one report into a RoomReport.
///
/// Fails with `NoTables` when the report has no room table or no room rows,
/// and with `NoFiscalYear` when its year cannot be derived.
pub fn parse_room_report(
    file_name: &str,
    pages: &[PageContent],
    year_source: YearSource,
) -> Result<RoomReport, RoombookError> {
    let tables = extract_tables(pages);
    if tables.is_empty() {
        return Err(RoombookError::NoTables(file_name.to_string()));
    }

    let (rooms, skipped_lines) = parse_room_tables(&tables);
    if rooms.is_empty() {
        return Err(RoombookError::NoTables(file_name.to_string()));
    }

    let fiscal_year = derive_fiscal_year(year_source, file_name, pages)
        .ok_or_else(|| RoombookError::NoFiscalYear(file_name.to_string()))?;

    Ok(RoomReport {
        source: file_name.to_string(),
        fiscal_year,
        rooms,
        skipped_lines,
    })
}
