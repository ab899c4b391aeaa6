use chrono::Local;
use roombook_core::config::{self, PipelineConfig};
use roombook_core::error::RoombookError;
use roombook_core::extraction::pdftotext::PdftotextExtractor;
use roombook_core::parsing::year::YearSource;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use crate::logging::{self, Console};
use crate::output;

/// Flags of `roombook run`; each one set overrides the config file.
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub workers: Option<usize>,
    pub year_source: Option<String>,
    pub no_dated_dirs: bool,
}

pub fn parse_year_source(value: &str) -> Result<YearSource, RoombookError> {
    YearSource::from_str_loose(value).ok_or_else(|| {
        RoombookError::ConfigInvalid(format!(
            "unknown year source '{value}' (expected auto, filename or content)"
        ))
    })
}

/// Merge the config file (or the built-in default) with command line flags.
pub fn resolve_config(args: RunArgs) -> Result<PipelineConfig, RoombookError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => PipelineConfig::builtin()?,
    };

    if let Some(dir) = args.reports_dir {
        config.reports_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(n) = args.batch_size {
        config.batch_size = n;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    if let Some(source) = args.year_source {
        config.year_source = parse_year_source(&source)?;
    }
    if args.no_dated_dirs {
        config.dated_subdirs = false;
    }

    config::validate_config(&config)?;
    Ok(config)
}

pub fn run(args: RunArgs, output_format: &str) -> Result<(), RoombookError> {
    let mut config = resolve_config(args)?;

    let now = Local::now();
    config.output_dir = logging::dated_dir(&config.output_dir, config.dated_subdirs, &now);
    config.log_dir = logging::dated_dir(&config.log_dir, config.dated_subdirs, &now);

    let console = match output_format {
        "json" => Console::Stderr,
        _ => Console::Stdout,
    };
    let log_path = logging::init(console, Some(&config.log_dir))?;
    if let Some(path) = &log_path {
        info!(path = %path.display(), "logging to file");
    }
    info!(
        reports_dir = %config.reports_dir.display(),
        output_dir = %config.output_dir.display(),
        batch_size = config.batch_size,
        workers = config.effective_workers(),
        year_source = %config.year_source,
        "starting run"
    );

    if !PdftotextExtractor::is_available() {
        error!("pdftotext not found on PATH");
        return Err(RoombookError::PdftotextNotFound);
    }

    let start = Instant::now();
    let extractor = PdftotextExtractor::new();
    let result = roombook_core::run_pipeline(&config, &extractor);
    info!(elapsed = ?start.elapsed(), "total runtime");

    let summary = result?;
    match output_format {
        "json" => output::json::print_summary(&summary)?,
        _ => output::table::print_summary(&summary),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            reports_dir: None,
            output_dir: None,
            batch_size: None,
            workers: None,
            year_source: None,
            no_dated_dirs: false,
        }
    }

    #[test]
    fn test_builtin_config_without_flags() {
        let config = resolve_config(args()).unwrap();
        assert_eq!(config, PipelineConfig::builtin().unwrap());
    }

    #[test]
    fn test_flags_override_config() {
        let config = resolve_config(RunArgs {
            reports_dir: Some("in".into()),
            output_dir: Some("out".into()),
            batch_size: Some(2),
            workers: Some(3),
            year_source: Some("content".into()),
            no_dated_dirs: true,
            ..args()
        })
        .unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.workers, Some(3));
        assert_eq!(config.year_source, YearSource::Content);
        assert!(!config.dated_subdirs);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let err = resolve_config(RunArgs {
            batch_size: Some(0),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, RoombookError::ConfigInvalid(_)));

        let err = resolve_config(RunArgs {
            year_source: Some("calendar".into()),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("calendar"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = resolve_config(RunArgs {
            config: Some("/nonexistent/roombook.json".into()),
            ..args()
        })
        .unwrap_err();
        assert!(matches!(err, RoombookError::ConfigLoad { .. }));
    }
}
