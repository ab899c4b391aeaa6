pub mod xlsx;

use crate::aggregate::YearDataset;
use crate::error::RoombookError;
use crate::model::Month;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xlsx::{Cell, CellStyle, Sheet, Workbook};

pub const DATA_SHEET: &str = "pdfData";
pub const REVENUE_SHEET: &str = "roomRevenue";
pub const BOOKING_SHEET: &str = "roomBooking";
pub const YEARLY_TOTAL: &str = "Yearly Total";

/// `rooms_2023.xlsx` for prefix "rooms".
pub fn workbook_file_name(file_prefix: &str, year: i32) -> String {
    format!("{}_{}.xlsx", file_prefix, year)
}

/// Raw room-month rows in merge order.
fn data_sheet(dataset: &YearDataset) -> Sheet {
    let mut sheet = Sheet::new(DATA_SHEET)
        .column("Room No.", CellStyle::Integer)
        .column("Month", CellStyle::General)
        .column("Arrivals", CellStyle::Integer)
        .column("Room Nights", CellStyle::Integer)
        .column("Room Revenue", CellStyle::Accounting)
        .column("ADR", CellStyle::Accounting)
        .column("Source", CellStyle::General);

    for row in &dataset.rows {
        sheet.push_row(vec![
            Cell::int(row.room.into()),
            Cell::text(row.month.name()),
            row.arrivals.into(),
            Cell::int(row.nights.into()),
            Cell::decimal(row.revenue),
            row.adr.into(),
            Cell::text(row.source.as_str()),
        ]);
    }
    sheet
}

fn month_grid_sheet(name: &str, style: CellStyle) -> Sheet {
    let mut sheet = Sheet::new(name).column("Room No.", CellStyle::Integer);
    for month in Month::ALL {
        sheet = sheet.column(month.name(), style);
    }
    sheet.column(YEARLY_TOTAL, style)
}

/// Rooms × months of revenue. Months without data stay blank.
fn revenue_sheet(dataset: &YearDataset, rooms: &[u32]) -> Sheet {
    let mut sheet = month_grid_sheet(REVENUE_SHEET, CellStyle::Accounting);
    for &room in rooms {
        let months = dataset.revenue.get(&room);
        let mut row = vec![Cell::int(room.into())];
        row.extend((0..12).map(|m| Cell::from(months.and_then(|ms| ms[m]))));
        row.push(Cell::decimal(dataset.yearly_revenue(room)));
        sheet.push_row(row);
    }
    sheet
}

/// Rooms × months of room nights. Months without data are 0.
fn booking_sheet(dataset: &YearDataset, rooms: &[u32]) -> Sheet {
    let mut sheet = month_grid_sheet(BOOKING_SHEET, CellStyle::Integer);
    for &room in rooms {
        let months = dataset.nights.get(&room);
        let mut row = vec![Cell::int(room.into())];
        row.extend((0..12).map(|m| Cell::int(months.and_then(|ms| ms[m]).unwrap_or(0).into())));
        row.push(Cell::int(dataset.yearly_nights(room)));
        sheet.push_row(row);
    }
    sheet
}

/// Render one year's dataset into its workbook.
///
/// `configured_rooms` fixes the rows of the revenue and booking sheets; rooms
/// with data that are not listed are logged and left out of those sheets.
pub fn render_year(dataset: &YearDataset, configured_rooms: &[u32]) -> Workbook {
    let (rooms, unlisted) = dataset.grid_rooms(configured_rooms);
    if !unlisted.is_empty() {
        let total: Decimal = unlisted.iter().map(|r| dataset.yearly_revenue(*r)).sum();
        warn!(
            year = dataset.year,
            rooms = ?unlisted,
            "rooms missing from the configured room list; revenue {} left out of the grids",
            total
        );
    }

    let mut workbook = Workbook::new();
    workbook.add_sheet(data_sheet(dataset));
    workbook.add_sheet(revenue_sheet(dataset, &rooms));
    workbook.add_sheet(booking_sheet(dataset, &rooms));
    workbook
}

/// Write one workbook per year into `output_dir`, returning the paths written.
pub fn write_year_workbooks(
    datasets: &[YearDataset],
    configured_rooms: &[u32],
    output_dir: &Path,
    file_prefix: &str,
) -> Result<Vec<PathBuf>, RoombookError> {
    std::fs::create_dir_all(output_dir).map_err(|e| RoombookError::WorkbookWrite {
        path: output_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut written = Vec::new();
    for dataset in datasets {
        if dataset.rows.is_empty() {
            continue;
        }
        let path = output_dir.join(workbook_file_name(file_prefix, dataset.year));
        render_year(dataset, configured_rooms).save(&path)?;
        info!(
            year = dataset.year,
            reports = dataset.sources.len(),
            rows = dataset.rows.len(),
            path = %path.display(),
            "wrote workbook"
        );
        written.push(path);
    }
    Ok(written)
}
