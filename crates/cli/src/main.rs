// askbook - interactive XLSX questionnaire processor

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use askbook_cli::app::{self, RunConfig};

#[derive(Parser)]
#[command(name = "askbook")]
#[command(about = "Extract questionnaire text from an XLSX workbook, answer it interactively, and write the answers back")]
#[command(version)]
struct Cli {
    /// Path to the questionnaire workbook
    source: PathBuf,

    /// Where to save the answered workbook (default: <source>_answered.xlsx)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override the catalog CSV path (default: <source>_catalog.csv)
    #[arg(long, value_name = "CSV")]
    catalog: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = RunConfig {
        source: cli.source,
        output: cli.output,
        catalog: cli.catalog,
    };

    match app::cmd_run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}
