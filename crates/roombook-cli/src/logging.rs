use chrono::{DateTime, Local};
use roombook_core::error::RoombookError;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Where console log lines go.
pub enum Console {
    Stdout,
    /// Keeps stdout clean for command output.
    Stderr,
}

/// Install the global subscriber. With a `log_dir`, every event is also
/// written to a fresh `run_<timestamp>.log` file there; its path is returned.
pub fn init(console: Console, log_dir: Option<&Path>) -> Result<Option<PathBuf>, RoombookError> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match console {
        Console::Stdout => BoxMakeWriter::new(std::io::stdout),
        Console::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let console_layer = fmt::layer().with_target(false).with_writer(writer);

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name(&Local::now()));
            let file = File::create(&path)?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(Mutex::new(file));
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(log_path)
}

pub fn log_file_name(now: &DateTime<Local>) -> String {
    format!("run_{}.log", now.format("%Y_%m_%d_%H_%M_%S"))
}

/// `base/YYYY_MM_DD` when `dated` is set, otherwise `base` unchanged.
pub fn dated_dir(base: &Path, dated: bool, now: &DateTime<Local>) -> PathBuf {
    if dated {
        base.join(now.format("%Y_%m_%d").to_string())
    } else {
        base.to_path_buf()
    }
}
