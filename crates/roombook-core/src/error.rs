use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RoombookError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to parse report: {0}")]
    ParseError(String),

    #[error("no room table found in '{0}'")]
    NoTables(String),

    #[error("no fiscal year found for '{0}' (looked at the file name and the report header)")]
    NoFiscalYear(String),

    #[error("failed to load config from {}: {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("no PDF report files found in {}", .0.display())]
    NoReports(PathBuf),

    #[error("no table data extracted from {0} report file(s)")]
    NothingExtracted(usize),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("failed to write workbook {}: {reason}", .path.display())]
    WorkbookWrite { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
