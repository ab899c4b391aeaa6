//! In-memory sheets and their serialization to .xlsx.
//!
//! Sheets are built as plain rows of cells so their layout can be checked
//! without a file; `Workbook::to_bytes` hands them to rust_xlsxwriter. The
//! document creation date is fixed so the same sheets always produce the
//! same bytes.

use crate::error::RoombookError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{ColNum, DocProperties, ExcelDateTime, Format, RowNum, Worksheet};
use std::io::Write;
use std::path::Path;

/// Number format applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    General,
    /// Built-in format 1 (`0`).
    Integer,
    /// Built-in format 44 (accounting).
    Accounting,
    Header,
}

impl CellStyle {
    fn format(self) -> Format {
        match self {
            CellStyle::General => Format::new(),
            CellStyle::Integer => Format::new().set_num_format_index(1),
            CellStyle::Accounting => Format::new().set_num_format_index(44),
            CellStyle::Header => Format::new().set_bold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    pub fn int(n: u64) -> Cell {
        Cell::Number(Decimal::from(n))
    }

    pub fn decimal(d: Decimal) -> Cell {
        Cell::Number(d)
    }

    fn display_len(&self) -> usize {
        match self {
            Cell::Empty => 0,
            Cell::Text(s) => s.chars().count(),
            Cell::Number(d) => d.to_string().chars().count(),
        }
    }
}

impl From<Option<Decimal>> for Cell {
    fn from(d: Option<Decimal>) -> Cell {
        d.map(Cell::decimal).unwrap_or(Cell::Empty)
    }
}

impl From<Option<u32>> for Cell {
    fn from(n: Option<u32>) -> Cell {
        n.map(|n| Cell::int(u64::from(n))).unwrap_or(Cell::Empty)
    }
}

/// A sheet: a bold header row followed by data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    /// Style of each column's data cells.
    pub styles: Vec<CellStyle>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            headers: Vec::new(),
            styles: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, header: impl Into<String>, style: CellStyle) -> Self {
        self.headers.push(header.into());
        self.styles.push(style);
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Column widths: the longest cell or header text plus 5.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(Cell::display_len)
                    .max()
                    .unwrap_or(0);
                longest.max(header.chars().count()) + 5
            })
            .collect()
    }

    fn write_to(&self, worksheet: &mut Worksheet) -> Result<(), RoombookError> {
        worksheet.set_name(self.name.as_str())?;

        let header = CellStyle::Header.format();
        for (c, title) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, c as ColNum, title.as_str(), &header)?;
        }

        let general = Format::new();
        let formats: Vec<Format> = self.styles.iter().map(|s| s.format()).collect();
        for (r, row) in self.rows.iter().enumerate() {
            let row_num = (r + 1) as RowNum;
            for (c, cell) in row.iter().enumerate() {
                let col = c as ColNum;
                let format = formats.get(c).unwrap_or(&general);
                match cell {
                    Cell::Empty => {
                        worksheet.write_blank(row_num, col, format)?;
                    }
                    Cell::Text(s) => {
                        worksheet.write_string_with_format(row_num, col, s.as_str(), format)?;
                    }
                    Cell::Number(d) => {
                        // Decimal always has an f64 approximation
                        let value = d.to_f64().unwrap_or_default();
                        worksheet.write_number_with_format(row_num, col, value, format)?;
                    }
                }
            }
        }

        for (c, width) in self.column_widths().into_iter().enumerate() {
            worksheet.set_column_width(c as ColNum, width as f64)?;
        }
        Ok(())
    }
}

/// An in-memory workbook.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Serialize to .xlsx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RoombookError> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

        for sheet in &self.sheets {
            sheet.write_to(workbook.add_worksheet())?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Write the workbook to `path`, replacing any existing file.
    ///
    /// The bytes go to a temp file next to `path` first and are renamed into
    /// place, so a failed run never leaves a truncated workbook behind.
    pub fn save(&self, path: &Path) -> Result<(), RoombookError> {
        let write_err = |reason: String| RoombookError::WorkbookWrite {
            path: path.to_path_buf(),
            reason,
        };
        let bytes = self.to_bytes()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| write_err(e.to_string()))?;
        tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;
        Ok(())
    }
}
