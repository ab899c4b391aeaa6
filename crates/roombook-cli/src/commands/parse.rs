use roombook_core::error::RoombookError;
use roombook_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use super::run::parse_year_source;
use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    year_source: &str,
) -> Result<(), RoombookError> {
    let year_source = parse_year_source(year_source)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let file_name = pdf_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let extractor = PdftotextExtractor::new();
    let report = roombook_core::parse_pdf(&pdf_bytes, &file_name, &extractor, year_source)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} room(s), {} room-month(s) for {}, written to {}",
                report.rooms.len(),
                report.month_count(),
                report.fiscal_year,
                path.display()
            );
            if !report.skipped_lines.is_empty() {
                eprintln!(
                    "  {} line(s) skipped during parsing",
                    report.skipped_lines.len()
                );
            }
        }
        None => match output_format {
            "json" => output::json::print_report(&report)?,
            _ => println!("{}", output::table::format_report(&report)),
        },
    }

    Ok(())
}
