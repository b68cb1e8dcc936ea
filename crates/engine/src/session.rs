// Interactive session state machine.
//
// The candidate list and the default-answer map are computed once at
// session start; back/forward only move a cursor over that fixed list.
// Recomputing the filter mid-loop would let answering question 3 change
// the index of question 5 already queued.

use std::collections::HashMap;

use crate::cell_ref;
use crate::record::Catalog;

/// IO seam for the question loop. The CLI implements this over
/// stdin/stdout; tests drive the session with a scripted implementation.
pub trait SessionIo {
    /// Emit one display line (no trailing newline in `line`).
    fn write(&mut self, line: &str);
    /// Show `prompt` and read one line of operator input.
    fn read(&mut self, prompt: &str) -> Result<String, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub outcome: Outcome,
    pub answered: usize,
    pub skipped: usize,
}

const DIVIDER_WIDTH: usize = 70;

/// One line of operator input, control tokens resolved first.
enum Input {
    Quit,
    Back,
    Skip,
    Empty,
    Text(String),
}

fn parse_input(raw: &str) -> Input {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => Input::Empty,
        "q" | "quit" => Input::Quit,
        "b" | "back" => Input::Back,
        "s" | "skip" => Input::Skip,
        // Anything else is literal answer text. There is no "invalid
        // input" state in the dialogue. `\n` escapes become line breaks.
        _ => Input::Text(trimmed.replace("\\n", "\n")),
    }
}

enum Turn {
    Advance,
    Back,
    Quit,
}

enum LocationChoice {
    Chosen(String),
    Back,
    Quit,
}

/// Run the question loop over `catalog`, mutating candidate records in
/// place. The caller re-persists the catalog on every exit path — natural
/// completion, quit, and errors propagated from here alike.
pub fn run_session(catalog: &mut Catalog, io: &mut dyn SessionIo) -> Result<SessionResult, String> {
    let candidates = catalog.candidate_indices();
    let defaults = catalog.default_answers();
    let total = candidates.len();

    let mut cursor = 0usize;
    let mut outcome = Outcome::Completed;

    while cursor < total {
        match run_turn(catalog, candidates[cursor], cursor, total, &defaults, io)? {
            Turn::Advance => cursor += 1,
            // At the first question back stays put.
            Turn::Back => cursor = cursor.saturating_sub(1),
            Turn::Quit => {
                outcome = Outcome::Aborted;
                break;
            }
        }
    }

    // Count from the candidate list at exit so a back-navigation rewrite
    // is not tallied twice.
    let answered = candidates
        .iter()
        .filter(|&&i| catalog.records()[i].has_response())
        .count();
    Ok(SessionResult {
        outcome,
        answered,
        skipped: total - answered,
    })
}

fn run_turn(
    catalog: &mut Catalog,
    idx: usize,
    pos: usize,
    total: usize,
    defaults: &HashMap<String, String>,
    io: &mut dyn SessionIo,
) -> Result<Turn, String> {
    // Loop so "back" at the location sub-prompt re-asks the same question
    // with the just-entered answer dropped.
    loop {
        let (sheet, location, text, default) = {
            let record = &catalog.records()[idx];
            // A prior answer (rewritten via back-navigation this session)
            // wins over a catalog-supplied default.
            let default = record
                .response_text()
                .map(str::to_string)
                .or_else(|| defaults.get(&record.location).cloned());
            (
                record.sheet.clone(),
                record.location.clone(),
                record.text.clone(),
                default,
            )
        };

        let divider = "=".repeat(DIVIDER_WIDTH);
        io.write(&divider);
        io.write(&format!(
            "Question {}/{}  |  Sheet: {}  |  Cell: {}",
            pos + 1,
            total,
            sheet,
            location
        ));
        io.write(&divider);
        io.write("");
        io.write(&text);
        io.write("");

        let prompt = match &default {
            Some(value) => {
                io.write(&format!("Default answer: {}", value));
                "Answer (enter = accept default, 's' skip, 'b' back, 'q' quit): "
            }
            None => "Answer (enter = skip, 's' skip, 'b' back, 'q' quit): ",
        };

        let answer = match parse_input(&io.read(prompt)?) {
            Input::Quit => return Ok(Turn::Quit),
            Input::Back => return Ok(Turn::Back),
            // Skip never takes the default — that is what empty input does.
            Input::Skip => return Ok(Turn::Advance),
            Input::Empty => match default {
                Some(value) => value,
                None => return Ok(Turn::Advance),
            },
            Input::Text(text) => text,
        };

        match prompt_response_location(&location, io)? {
            LocationChoice::Chosen(response_location) => {
                if let Some(record) = catalog.get_mut(idx) {
                    record.response = Some(answer);
                    record.response_location = Some(response_location);
                }
                return Ok(Turn::Advance);
            }
            LocationChoice::Back => continue,
            LocationChoice::Quit => {
                // The typed answer is the expensive part; keep it even
                // without a location. The operator can fill the location
                // in the catalog CSV by hand, or on the next run.
                if let Some(record) = catalog.get_mut(idx) {
                    record.response = Some(answer);
                }
                return Ok(Turn::Quit);
            }
        }
    }
}

/// Ask where the answer should be written. The cell one column right of
/// the question is offered as the default; empty input accepts it.
fn prompt_response_location(
    question_location: &str,
    io: &mut dyn SessionIo,
) -> Result<LocationChoice, String> {
    let suggested = cell_ref::offset_right(question_location, 1);

    loop {
        let prompt = match &suggested {
            Some(cell) => format!("Response cell [{}]: ", cell),
            None => "Response cell: ".to_string(),
        };
        let raw = io.read(&prompt)?;
        let trimmed = raw.trim();

        match trimmed.to_ascii_lowercase().as_str() {
            "q" | "quit" => return Ok(LocationChoice::Quit),
            "b" | "back" => return Ok(LocationChoice::Back),
            "" => match &suggested {
                Some(cell) => return Ok(LocationChoice::Chosen(cell.clone())),
                None => {
                    io.write("Enter a cell reference (e.g. C3).");
                }
            },
            _ => {
                if cell_ref::parse_cell_ref(trimmed).is_some() {
                    return Ok(LocationChoice::Chosen(trimmed.to_string()));
                }
                io.write(&format!("{:?} is not a cell reference (e.g. C3).", trimmed));
            }
        }
    }
}
