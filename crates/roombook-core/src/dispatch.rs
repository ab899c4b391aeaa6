use crate::collect::ReportFile;
use crate::error::RoombookError;
use crate::extraction::PdfExtractor;
use crate::model::RoomReport;
use crate::parsing::parse_room_report;
use crate::parsing::year::YearSource;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// What became of one report file.
#[derive(Debug)]
pub enum FileOutcome {
    Parsed(RoomReport),
    /// The report had no room table or no room rows.
    Empty,
    Failed(RoombookError),
}

#[derive(Debug)]
pub struct FileResult {
    pub file: ReportFile,
    pub outcome: FileOutcome,
}

/// Read, extract and parse a single report. Never fails the caller; errors
/// are returned as `FileOutcome::Failed`.
#[instrument(level = "debug", skip(extractor), fields(file = %file.name))]
pub fn process_file(
    file: &ReportFile,
    extractor: &dyn PdfExtractor,
    year_source: YearSource,
) -> FileOutcome {
    let parsed = std::fs::read(&file.path)
        .map_err(RoombookError::from)
        .and_then(|bytes| extractor.extract_pages(&bytes))
        .and_then(|pages| parse_room_report(&file.name, &pages, year_source));

    match parsed {
        Ok(report) => {
            for skipped in &report.skipped_lines {
                warn!(file = %file.name, line = %skipped.line_text, "skipped line: {}", skipped.reason);
            }
            FileOutcome::Parsed(report)
        }
        Err(RoombookError::NoTables(_)) => {
            warn!(file = %file.name, "no room table data found");
            FileOutcome::Empty
        }
        Err(e) => {
            warn!(file = %file.name, "failed: {e}");
            FileOutcome::Failed(e)
        }
    }
}

/// Process one batch of reports sequentially on the current worker.
#[instrument(level = "info", skip_all, fields(batch = batch_number, files = files.len()))]
pub fn process_batch(
    batch_number: usize,
    files: &[ReportFile],
    extractor: &dyn PdfExtractor,
    year_source: YearSource,
) -> Vec<FileResult> {
    info!("processing pdf report batch #{batch_number}");
    let results = files
        .iter()
        .map(|file| FileResult {
            file: file.clone(),
            outcome: process_file(file, extractor, year_source),
        })
        .collect();
    info!("finished pdf report batch #{batch_number}");
    results
}

/// Split `files` into batches of `batch_size` and run them on a pool of
/// `workers` threads.
///
/// Results come back in the order of `files`, whatever order the batches
/// finished in.
pub fn dispatch(
    files: &[ReportFile],
    extractor: &dyn PdfExtractor,
    batch_size: usize,
    workers: usize,
    year_source: YearSource,
) -> Result<Vec<FileResult>, RoombookError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("roombook-worker-{i}"))
        .build()
        .map_err(|e| RoombookError::WorkerPool(e.to_string()))?;

    let start = Instant::now();
    let batches: Vec<Vec<FileResult>> = pool.install(|| {
        files
            .par_chunks(batch_size.max(1))
            .enumerate()
            .map(|(i, chunk)| process_batch(i + 1, chunk, extractor, year_source))
            .collect()
    });

    info!(
        files = files.len(),
        workers,
        elapsed = ?start.elapsed(),
        "processed pdf reports"
    );
    Ok(batches.into_iter().flatten().collect())
}
