use crate::error::RoombookError;
use crate::parsing::year::YearSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_JSON: &str = include_str!("../../../config/default.json");

/// Largest number of rooms a single range may cover.
pub const MAX_RANGE_ROOMS: u32 = 10_000;

/// An inclusive range of room numbers; `end` omitted means a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRange {
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl RoomRange {
    pub fn rooms(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end.unwrap_or(self.start)
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory scanned for `*.pdf` reports.
    pub reports_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Put output and logs under a `YYYY_MM_DD` subdirectory.
    pub dated_subdirs: bool,
    /// Reports handed to a worker at a time.
    pub batch_size: usize,
    /// Worker threads; None uses the available parallelism.
    pub workers: Option<usize>,
    pub year_source: YearSource,
    /// Workbooks are named `<file_prefix>_<year>.xlsx`.
    pub file_prefix: String,
    /// Rooms listed in the revenue and booking sheets. Empty means every
    /// room found in the reports.
    pub rooms: Vec<RoomRange>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            reports_dir: PathBuf::from("reports"),
            output_dir: PathBuf::from("output"),
            log_dir: PathBuf::from("logs"),
            dated_subdirs: true,
            batch_size: 5,
            workers: None,
            year_source: YearSource::Auto,
            file_prefix: "rooms".into(),
            rooms: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// The configuration shipped with the crate.
    pub fn builtin() -> Result<PipelineConfig, RoombookError> {
        parse_config_str(DEFAULT_CONFIG_JSON)
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Configured rooms in order, duplicates removed.
    pub fn room_list(&self) -> Vec<u32> {
        let mut seen = BTreeSet::new();
        self.rooms
            .iter()
            .flat_map(RoomRange::rooms)
            .filter(|room| seen.insert(*room))
            .collect()
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, RoombookError> {
    let content = std::fs::read_to_string(path).map_err(|e| RoombookError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: PipelineConfig =
        serde_json::from_str(&content).map_err(|e| RoombookError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<PipelineConfig, RoombookError> {
    let config: PipelineConfig = serde_json::from_str(json).map_err(RoombookError::Json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a config is usable.
pub fn validate_config(config: &PipelineConfig) -> Result<(), RoombookError> {
    if config.batch_size == 0 {
        return Err(RoombookError::ConfigInvalid(
            "batch_size must be at least 1".into(),
        ));
    }

    if config.workers == Some(0) {
        return Err(RoombookError::ConfigInvalid(
            "workers must be at least 1 (omit it to use all cores)".into(),
        ));
    }

    if config.file_prefix.trim().is_empty() {
        return Err(RoombookError::ConfigInvalid(
            "file_prefix must not be empty".into(),
        ));
    }

    if config.file_prefix.contains(|c: char| c == '/' || c == '\\') {
        return Err(RoombookError::ConfigInvalid(format!(
            "file_prefix '{}' must not contain path separators",
            config.file_prefix
        )));
    }

    for range in &config.rooms {
        if range.start == 0 {
            return Err(RoombookError::ConfigInvalid(
                "room numbers must be positive".into(),
            ));
        }
        if let Some(end) = range.end {
            if end < range.start {
                return Err(RoombookError::ConfigInvalid(format!(
                    "room range {}-{} ends before it starts",
                    range.start, end
                )));
            }
            if end - range.start >= MAX_RANGE_ROOMS {
                return Err(RoombookError::ConfigInvalid(format!(
                    "room range {}-{} covers more than {} rooms",
                    range.start, end, MAX_RANGE_ROOMS
                )));
            }
        }
    }

    Ok(())
}
