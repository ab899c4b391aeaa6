//! Integration tests for the run_pipeline() end-to-end pipeline.
//!
//! Uses a MockExtractor that reads the "PDF" bytes as pdftotext layout text,
//! so these tests run without poppler-utils.

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use roombook_core::config::{PipelineConfig, RoomRange};
use roombook_core::error::RoombookError;
use roombook_core::extraction::pdftotext::split_pages;
use roombook_core::extraction::{PageContent, PdfExtractor};
use roombook_core::model::Month;
use roombook_core::parsing::year::YearSource;
use roombook_core::{parse_pdf, run_pipeline};
use rust_decimal_macros::dec;
use std::fs;
use std::path::{Path, PathBuf};

struct MockExtractor;

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, RoombookError> {
        let text = String::from_utf8_lossy(pdf_bytes);
        if text.starts_with("%CORRUPT") {
            return Err(RoombookError::Extraction("unreadable xref table".into()));
        }
        Ok(split_pages(&text))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

const HEADER: &str = "Room No.   Month        Arrivals   Room Nights   Room Revenue      ADR";

/// (month, arrivals, nights, revenue, adr) as printed in the report.
type MonthLine<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

fn month_line((month, arrivals, nights, revenue, adr): MonthLine) -> String {
    format!("           {month:<9}{arrivals:>12}{nights:>14}{revenue:>15}{adr:>9}")
}

fn totals_line(arrivals: &str, nights: &str, revenue: &str, adr: &str) -> String {
    format!("{:20}{arrivals:>12}{nights:>14}{revenue:>15}{adr:>9}", "")
}

fn report_text(title: &str, rooms: &[(u32, Vec<MonthLine>)]) -> String {
    let mut lines = vec![title.to_string(), String::new(), HEADER.to_string()];
    for (room, months) in rooms {
        lines.push(room.to_string());
        lines.extend(months.iter().copied().map(month_line));
    }
    lines.push("Page 1 of 1".into());
    lines.join("\n") + "\n"
}

struct Fixture {
    _dir: tempfile::TempDir,
    reports: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new(files: &[(&str, String)]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        let output = dir.path().join("output");
        fs::create_dir_all(&reports).unwrap();
        for (name, content) in files {
            fs::write(reports.join(name), content).unwrap();
        }
        Fixture {
            _dir: dir,
            reports,
            output,
        }
    }

    fn config(&self, workers: usize) -> PipelineConfig {
        PipelineConfig {
            reports_dir: self.reports.clone(),
            output_dir: self.output.clone(),
            batch_size: 2,
            workers: Some(workers),
            ..Default::default()
        }
    }
}

fn sheet(path: &Path, name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook.worksheet_range(name).unwrap()
}

fn float(range: &Range<Data>, row: u32, col: u32) -> f64 {
    match range.get_value((row, col)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected a number at ({row}, {col}), got {other:?}"),
    }
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text at ({row}, {col}), got {other:?}"),
    }
}

fn is_blank(range: &Range<Data>, row: u32, col: u32) -> bool {
    matches!(range.get_value((row, col)), None | Some(Data::Empty))
}

fn two_year_reports() -> Vec<(&'static str, String)> {
    vec![
        (
            "rooms_2022.pdf",
            report_text(
                "Room Statistics Report",
                &[(
                    101,
                    vec![
                        ("January", "3", "7", "1,050.00", "150.00"),
                        ("February", "2", "4", "600.00", "150.00"),
                    ],
                )],
            ),
        ),
        (
            "rooms_2023.pdf",
            report_text(
                "Room Statistics Report",
                &[
                    (101, vec![("March", "1", "2", "250.00", "125.00")]),
                    (102, vec![("March", "4", "10", "1,800.00", "180.00")]),
                ],
            ),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Test 1: Reports from two fiscal years produce one workbook per year
// ---------------------------------------------------------------------------
#[test]
fn two_years_produce_two_workbooks() {
    let fx = Fixture::new(&two_year_reports());
    let summary = run_pipeline(&fx.config(2), &MockExtractor).unwrap();

    assert_eq!(summary.reports_found, 2);
    assert_eq!(summary.parsed, vec!["rooms_2022.pdf", "rooms_2023.pdf"]);
    assert_eq!(summary.years, vec![2022, 2023]);
    assert_eq!(
        summary.workbooks,
        vec![
            fx.output.join("rooms_2022.xlsx"),
            fx.output.join("rooms_2023.xlsx")
        ]
    );

    let revenue = sheet(&summary.workbooks[0], "roomRevenue");
    assert_eq!(text(&revenue, 0, 0), "Room No.");
    assert_eq!(text(&revenue, 0, 1), "January");
    assert_eq!(text(&revenue, 0, 13), "Yearly Total");
    assert_eq!(float(&revenue, 1, 0), 101.0);
    assert_eq!(float(&revenue, 1, 1), 1050.0);
    assert_eq!(float(&revenue, 1, 2), 600.0);
    assert!(is_blank(&revenue, 1, 3));
    assert_eq!(float(&revenue, 1, 13), 1650.0);

    let booking = sheet(&summary.workbooks[1], "roomBooking");
    assert_eq!(float(&booking, 1, 0), 101.0);
    assert_eq!(float(&booking, 1, 1), 0.0);
    assert_eq!(float(&booking, 1, 3), 2.0);
    assert_eq!(float(&booking, 2, 0), 102.0);
    assert_eq!(float(&booking, 2, 3), 10.0);
    assert_eq!(float(&booking, 2, 13), 10.0);

    let data = sheet(&summary.workbooks[1], "pdfData");
    assert_eq!(text(&data, 0, 6), "Source");
    assert_eq!(text(&data, 2, 1), "March");
    assert_eq!(float(&data, 2, 4), 1800.0);
    assert_eq!(text(&data, 2, 6), "rooms_2023.pdf");
}

// ---------------------------------------------------------------------------
// Test 2: A report without a room table is skipped, not fatal
// ---------------------------------------------------------------------------
#[test]
fn report_without_tables_is_skipped() {
    let mut files = two_year_reports();
    files.push((
        "rooms_2024.pdf",
        "Room Statistics Report\n\nNo activity for the selected period.\n".to_string(),
    ));
    let fx = Fixture::new(&files);

    let summary = run_pipeline(&fx.config(2), &MockExtractor).unwrap();
    assert_eq!(summary.empty, vec!["rooms_2024.pdf"]);
    assert!(summary.failed.is_empty());
    assert_eq!(summary.years, vec![2022, 2023]);
    assert!(!fx.output.join("rooms_2024.xlsx").exists());
}

// ---------------------------------------------------------------------------
// Test 3: Re-running on unchanged input gives byte-identical workbooks
// ---------------------------------------------------------------------------
#[test]
fn reruns_are_byte_identical() {
    let fx = Fixture::new(&two_year_reports());

    let first = run_pipeline(&fx.config(2), &MockExtractor).unwrap();
    let before: Vec<Vec<u8>> = first.workbooks.iter().map(|p| fs::read(p).unwrap()).collect();

    let second = run_pipeline(&fx.config(2), &MockExtractor).unwrap();
    let after: Vec<Vec<u8>> = second.workbooks.iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(first.workbooks, second.workbooks);
    assert_eq!(before, after);
}

// ---------------------------------------------------------------------------
// Test 4: Worker count does not change workbook content
// ---------------------------------------------------------------------------
#[test]
fn worker_count_does_not_change_output() {
    let files: Vec<(String, String)> = (0..7u32)
        .map(|i| {
            let text = report_text(
                "Room Statistics Report",
                &[(
                    101 + i,
                    vec![
                        ("April", "1", "3", "450.00", "150.00"),
                        ("May", "2", "5", "700.00", "140.00"),
                    ],
                )],
            );
            (format!("part{i}_2023.pdf"), text)
        })
        .collect();
    let files: Vec<(&str, String)> = files.iter().map(|(n, t)| (n.as_str(), t.clone())).collect();
    let fx = Fixture::new(&files);

    let single = run_pipeline(&fx.config(1), &MockExtractor).unwrap();
    let single_bytes = fs::read(&single.workbooks[0]).unwrap();

    let pooled = run_pipeline(&fx.config(4), &MockExtractor).unwrap();
    let pooled_bytes = fs::read(&pooled.workbooks[0]).unwrap();

    assert_eq!(single.parsed, pooled.parsed);
    assert_eq!(single_bytes, pooled_bytes);
}

// ---------------------------------------------------------------------------
// Test 5: An extractor failure is reported while other files still land
// ---------------------------------------------------------------------------
#[test]
fn extractor_failure_is_reported() {
    let mut files = two_year_reports();
    files.push(("broken_2023.pdf", "%CORRUPT".to_string()));
    let fx = Fixture::new(&files);

    let summary = run_pipeline(&fx.config(2), &MockExtractor).unwrap();
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].file, "broken_2023.pdf");
    assert!(summary.failed[0].reason.contains("unreadable xref table"));
    assert_eq!(summary.parsed.len(), 2);
    assert_eq!(summary.workbooks.len(), 2);
}

// ---------------------------------------------------------------------------
// Test 6: No PDFs at all is an error; the directory is created
// ---------------------------------------------------------------------------
#[test]
fn empty_reports_dir_is_error() {
    let fx = Fixture::new(&[("notes.txt", "not a report".to_string())]);
    let err = run_pipeline(&fx.config(1), &MockExtractor).unwrap_err();
    assert!(matches!(err, RoombookError::NoReports(_)));

    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        reports_dir: dir.path().join("missing"),
        output_dir: dir.path().join("output"),
        ..Default::default()
    };
    let err = run_pipeline(&config, &MockExtractor).unwrap_err();
    assert!(matches!(err, RoombookError::NoReports(_)));
    assert!(config.reports_dir.is_dir());
}

// ---------------------------------------------------------------------------
// Test 7: Nothing extracted from any report is an error
// ---------------------------------------------------------------------------
#[test]
fn nothing_extracted_is_error() {
    let fx = Fixture::new(&[
        ("cover_2023.pdf", "Cover page\n".to_string()),
        ("broken_2023.pdf", "%CORRUPT".to_string()),
    ]);
    let err = run_pipeline(&fx.config(2), &MockExtractor).unwrap_err();
    assert!(matches!(err, RoombookError::NothingExtracted(2)));
    assert!(!fx.output.exists());
}

// ---------------------------------------------------------------------------
// Test 8: Configured rooms fix the grid rows
// ---------------------------------------------------------------------------
#[test]
fn configured_rooms_fix_grid_rows() {
    let fx = Fixture::new(&[(
        "rooms_2023.pdf",
        report_text(
            "Room Statistics Report",
            &[
                (101, vec![("June", "1", "3", "390.00", "130.00")]),
                (999, vec![("June", "1", "1", "80.00", "80.00")]),
            ],
        ),
    )]);
    let mut config = fx.config(1);
    config.rooms = vec![RoomRange {
        start: 100,
        end: Some(102),
    }];

    let summary = run_pipeline(&config, &MockExtractor).unwrap();
    let revenue = sheet(&summary.workbooks[0], "roomRevenue");
    assert_eq!(revenue.height(), 4);
    assert_eq!(float(&revenue, 1, 0), 100.0);
    assert_eq!(float(&revenue, 1, 13), 0.0);
    assert_eq!(float(&revenue, 2, 6), 390.0);
    assert_eq!(float(&revenue, 3, 0), 102.0);

    // Unlisted rooms still appear in the raw data sheet.
    let data = sheet(&summary.workbooks[0], "pdfData");
    assert_eq!(float(&data, 2, 0), 999.0);
}

// ---------------------------------------------------------------------------
// Test 9: A later report overrides an earlier one for the same room-month
// ---------------------------------------------------------------------------
#[test]
fn later_report_wins_on_conflict() {
    let fx = Fixture::new(&[
        (
            "a_2023.pdf",
            report_text(
                "Room Statistics Report",
                &[(101, vec![("July", "1", "2", "300.00", "150.00")])],
            ),
        ),
        (
            "b_2023.pdf",
            report_text(
                "Room Statistics Report (revised)",
                &[(101, vec![("July", "2", "4", "640.00", "160.00")])],
            ),
        ),
    ]);

    let summary = run_pipeline(&fx.config(2), &MockExtractor).unwrap();
    let revenue = sheet(&summary.workbooks[0], "roomRevenue");
    assert_eq!(float(&revenue, 1, 7), 640.0);

    let data = sheet(&summary.workbooks[0], "pdfData");
    assert_eq!(data.height(), 3);
}

// ---------------------------------------------------------------------------
// Test 10: The fiscal year comes from the content when the name has none
// ---------------------------------------------------------------------------
#[test]
fn parse_single_report_year_from_content() {
    let mut text = report_text(
        "Room Statistics Report   Fiscal Year: 2021",
        &[(
            305,
            vec![
                ("Aug", "2", "6", "1,020.00", "170.00"),
                ("Sep", "", "3", "480.00", ""),
            ],
        )],
    );
    let totals = totals_line("2", "9", "1,500.00", "166.67");
    text = text.replace("Page 1 of 1\n", &format!("{totals}\n"));

    let report = parse_pdf(
        text.as_bytes(),
        "monthly_rooms.pdf",
        &MockExtractor,
        YearSource::Auto,
    )
    .unwrap();

    assert_eq!(report.fiscal_year, 2021);
    assert_eq!(report.rooms.len(), 1);
    let room = &report.rooms[0];
    assert_eq!(room.room, 305);
    assert_eq!(room.months[0].month, Month::August);
    assert_eq!(room.months[1].arrivals, None);
    assert_eq!(room.months[1].revenue, dec!(480.00));
    assert!(room.totals.reported);
    assert_eq!(room.totals.revenue, dec!(1500.00));
    assert_eq!(room.totals.adr, Some(dec!(166.67)));
    assert!(report.skipped_lines.is_empty());
}
