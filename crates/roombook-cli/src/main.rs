mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use logging::Console;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "roombook",
    version,
    about = "Consolidate monthly PDF room reports into one spreadsheet per fiscal year"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in the reports directory and write the yearly workbooks
    Run {
        /// JSON config file (default: built-in configuration)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory scanned for PDF reports
        #[arg(long, value_name = "DIR")]
        reports_dir: Option<PathBuf>,

        /// Directory the workbooks are written to
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Reports handed to a worker at a time
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,

        /// Worker threads (default: available parallelism)
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Where the fiscal year is read from: auto, filename or content
        #[arg(long, value_name = "SOURCE")]
        year_source: Option<String>,

        /// Write output and logs directly into the configured directories
        #[arg(long)]
        no_dated_dirs: bool,

        /// Summary format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Parse a single PDF report into structured data (no workbook is written)
    Parse {
        /// Path to the PDF report
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Where the fiscal year is read from: auto, filename or content
        #[arg(long, value_name = "SOURCE", default_value = "auto")]
        year_source: String,
    },
    /// Check that pdftotext is installed
    Check,
    /// Print the built-in configuration as JSON
    Config,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            reports_dir,
            output_dir,
            batch_size,
            workers,
            year_source,
            no_dated_dirs,
            output,
        } => commands::run::run(
            commands::run::RunArgs {
                config,
                reports_dir,
                output_dir,
                batch_size,
                workers,
                year_source,
                no_dated_dirs,
            },
            &output,
        ),
        Commands::Parse {
            input_file,
            output,
            out,
            year_source,
        } => logging::init(Console::Stderr, None)
            .and_then(|_| commands::parse::run(input_file, &output, out, &year_source)),
        Commands::Check => logging::init(Console::Stderr, None).and_then(|_| commands::check::run()),
        Commands::Config => commands::config::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
