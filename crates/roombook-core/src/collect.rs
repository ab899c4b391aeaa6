use crate::error::RoombookError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A PDF report waiting to be processed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportFile {
    pub path: PathBuf,
    /// File name, used to derive the fiscal year and in log lines.
    pub name: String,
}

impl ReportFile {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        ReportFile { path, name }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// List the PDF reports in `dir`, sorted by path.
///
/// A missing directory is created so there is a place to drop reports; the
/// result is then empty. Entries that cannot be inspected are logged and
/// skipped.
pub fn collect_reports(dir: &Path) -> Result<Vec<ReportFile>, RoombookError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), "skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if !is_pdf(&path) {
            continue;
        }
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => reports.push(ReportFile::new(path)),
            Ok(_) => debug!(path = %path.display(), "not a regular file"),
            Err(e) => warn!(path = %path.display(), "skipping unreadable report: {e}"),
        }
    }

    reports.sort();
    Ok(reports)
}
