// Run flow: extract → merge → persist → session → persist → write.

use std::path::{Path, PathBuf};

use askbook_engine::merge;
use askbook_engine::session::{self, Outcome, SessionIo};
use askbook_io::{catalog as catalog_store, xlsx};

use crate::console::ConsoleIo;
use crate::CliError;

/// Configuration derived from command-line options.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

/// What a run did, for reporting and tests.
#[derive(Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub aborted: bool,
    pub answered: usize,
    pub skipped: usize,
    /// Path of the answered workbook, when one was written.
    pub output: Option<PathBuf>,
    pub answers_written: usize,
}

/// Entry point for the `askbook` binary.
pub fn cmd_run(config: RunConfig) -> Result<(), CliError> {
    let interactive = atty::is(atty::Stream::Stdin);
    let mut io = ConsoleIo::new();
    run_flow(&config, &mut io, interactive)?;
    Ok(())
}

/// The full workflow, with the session IO injected so tests can drive it
/// with a script. `interactive` gates whether a question loop may start.
pub fn run_flow(
    config: &RunConfig,
    io: &mut dyn SessionIo,
    interactive: bool,
) -> Result<RunSummary, CliError> {
    // 1. Fail fast before any catalog work.
    if !config.source.is_file() {
        return Err(CliError::io(format!(
            "workbook not found: {}",
            config.source.display()
        )));
    }
    let output_path = config
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&config.source));
    if output_path == config.source {
        return Err(CliError::usage(format!(
            "refusing to overwrite the source workbook: {}",
            config.source.display()
        ))
        .with_hint("pass -o with a different path"));
    }

    // 2. Extract.
    let entries = xlsx::extract_text(&config.source).map_err(CliError::io)?;
    if entries.is_empty() {
        return Err(CliError::data(format!(
            "no textual entries found in {}",
            config.source.display()
        )));
    }

    // 3. Merge against the persisted catalog and save immediately, so
    // fresh text reaches disk even if nothing gets asked.
    let catalog_path = config
        .catalog
        .clone()
        .unwrap_or_else(|| default_catalog_path(&config.source));
    let existing = catalog_store::load(&catalog_path).map_err(CliError::data)?;
    let mut merged = merge::merge(&entries, &existing).map_err(|e| CliError::data(e.to_string()))?;
    catalog_store::save(&merged, &catalog_path).map_err(CliError::io)?;
    println!("Catalog saved to: {}", catalog_path.display());

    // 4. Select candidates.
    let candidates = merged.candidate_indices();
    if candidates.is_empty() {
        if merged.answered().next().is_none() {
            println!(
                "No unanswered questions flagged in catalog. Mark isQuestion rows in {} and rerun.",
                catalog_path.display()
            );
            return Ok(RunSummary {
                aborted: false,
                answered: 0,
                skipped: 0,
                output: None,
                answers_written: 0,
            });
        }
        let written = write_answered_workbook(config, &merged, &output_path)?;
        return Ok(RunSummary {
            aborted: false,
            answered: 0,
            skipped: 0,
            output: Some(output_path),
            answers_written: written,
        });
    }

    println!("Found {} unanswered questions marked in catalog.", candidates.len());
    if !interactive {
        return Err(CliError::usage("stdin is not a TTY").with_hint(format!(
            "run from a terminal, or fill textResponse in {} and rerun",
            catalog_path.display()
        )));
    }

    // 5. Run the session, then re-persist on every exit path — the
    // answers are the expensive, human-entered state.
    let session_result = session::run_session(&mut merged, io);
    let save_result = catalog_store::save(&merged, &catalog_path);

    let result = match session_result {
        Ok(result) => result,
        Err(e) => {
            if let Err(save_err) = &save_result {
                eprintln!("error: failed to save catalog {}: {}", catalog_path.display(), save_err);
            }
            return Err(CliError::general(format!("session failed: {}", e)));
        }
    };
    if let Err(save_err) = save_result {
        // An operator seeing "answered" without saved state is the
        // worst-case outcome; make the persistence failure unmissable.
        return Err(CliError::io(format!(
            "failed to save catalog {}: {}",
            catalog_path.display(),
            save_err
        ))
        .with_hint(format!(
            "{} answers from this session are NOT persisted",
            result.answered
        )));
    }
    println!("Catalog saved to: {}", catalog_path.display());

    match result.outcome {
        Outcome::Aborted => println!(
            "Session aborted. {} answered, {} still open.",
            result.answered, result.skipped
        ),
        Outcome::Completed => println!(
            "Session complete. {} answered, {} skipped.",
            result.answered, result.skipped
        ),
    }

    // 6. Write whatever responses exist, aborted or not.
    let (output, answers_written) = if merged.answered().next().is_some() {
        let written = write_answered_workbook(config, &merged, &output_path)?;
        (Some(output_path), written)
    } else {
        (None, 0)
    };

    Ok(RunSummary {
        aborted: result.outcome == Outcome::Aborted,
        answered: result.answered,
        skipped: result.skipped,
        output,
        answers_written,
    })
}

fn write_answered_workbook(
    config: &RunConfig,
    catalog: &askbook_engine::record::Catalog,
    output_path: &Path,
) -> Result<usize, CliError> {
    let written = xlsx::write_answers(&config.source, catalog, output_path).map_err(CliError::io)?;
    println!("Answers written to: {} ({} cells)", output_path.display(), written);
    Ok(written)
}

/// `<source-stem>_catalog.csv`, next to the source workbook.
pub fn default_catalog_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    source.with_file_name(format!("{}_catalog.csv", stem))
}

/// `<source-stem>_answered.xlsx` — always .xlsx, the only format the
/// writer produces.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    source.with_file_name(format!("{}_answered.xlsx", stem))
}
