pub mod aggregate;
pub mod collect;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod workbook;

use config::PipelineConfig;
use dispatch::FileOutcome;
use error::RoombookError;
use extraction::PdfExtractor;
use model::RoomReport;
use parsing::year::YearSource;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Extract and parse a single PDF report without writing anything.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    file_name: &str,
    extractor: &dyn PdfExtractor,
    year_source: YearSource,
) -> Result<RoomReport, RoombookError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    parsing::parse_room_report(file_name, &pages, year_source)
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedReport {
    pub file: String,
    pub reason: String,
}

/// What a pipeline run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports_found: usize,
    pub parsed: Vec<String>,
    /// Reports without room table data.
    pub empty: Vec<String>,
    pub failed: Vec<FailedReport>,
    pub years: Vec<i32>,
    pub workbooks: Vec<PathBuf>,
}

/// Main API entry point: consolidate every report in `config.reports_dir`
/// into one workbook per fiscal year under `config.output_dir`.
///
/// Reports that fail or hold no table data are logged and skipped. The run
/// fails when there are no reports at all, when none of them produced data,
/// or when a workbook cannot be written.
pub fn run_pipeline(
    config: &PipelineConfig,
    extractor: &dyn PdfExtractor,
) -> Result<RunSummary, RoombookError> {
    config::validate_config(config)?;

    let files = collect::collect_reports(&config.reports_dir)?;
    if files.is_empty() {
        return Err(RoombookError::NoReports(config.reports_dir.clone()));
    }
    info!(
        reports = files.len(),
        dir = %config.reports_dir.display(),
        backend = extractor.backend_name(),
        "found pdf reports"
    );

    let results = dispatch::dispatch(
        &files,
        extractor,
        config.batch_size,
        config.effective_workers(),
        config.year_source,
    )?;

    let mut summary = RunSummary {
        reports_found: files.len(),
        ..Default::default()
    };
    let mut reports = Vec::new();
    for result in results {
        match result.outcome {
            FileOutcome::Parsed(report) => {
                summary.parsed.push(result.file.name);
                reports.push(report);
            }
            FileOutcome::Empty => summary.empty.push(result.file.name),
            FileOutcome::Failed(e) => summary.failed.push(FailedReport {
                file: result.file.name,
                reason: e.to_string(),
            }),
        }
    }

    if reports.is_empty() {
        error!("no room table data extracted from any report");
        return Err(RoombookError::NothingExtracted(files.len()));
    }

    let datasets = aggregate::aggregate(&reports).into_datasets();
    summary.years = datasets.iter().map(|d| d.year).collect();

    summary.workbooks = workbook::write_year_workbooks(
        &datasets,
        &config.room_list(),
        &config.output_dir,
        &config.file_prefix,
    )?;

    info!(
        parsed = summary.parsed.len(),
        empty = summary.empty.len(),
        failed = summary.failed.len(),
        workbooks = summary.workbooks.len(),
        "run complete"
    );
    Ok(summary)
}
