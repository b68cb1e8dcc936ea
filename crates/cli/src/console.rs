// Console IO for the interactive session.

use std::io::{self, Write};

use askbook_engine::session::SessionIo;
use unicode_width::UnicodeWidthStr;

/// `SessionIo` over stdin/stdout. Long display lines are wrapped to the
/// terminal width; prompts are flushed before blocking on input.
pub struct ConsoleIo {
    width: usize,
}

impl ConsoleIo {
    pub fn new() -> Self {
        Self { width: detect_terminal_width() }
    }
}

impl Default for ConsoleIo {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionIo for ConsoleIo {
    fn write(&mut self, line: &str) {
        for wrapped in wrap_text(line, self.width) {
            println!("{}", wrapped);
        }
    }

    fn read(&mut self, prompt: &str) -> Result<String, String> {
        print!("{}", prompt);
        io::stdout().flush().ok();

        let mut buf = String::new();
        io::stdin()
            .read_line(&mut buf)
            .map_err(|e| format!("failed to read input: {}", e))?;
        Ok(buf.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Terminal width clamped to a readable range; 80 when undetectable
/// (pipes, dumb terminals).
fn detect_terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) => (cols as usize).clamp(40, 120),
        Err(_) => 80,
    }
}

/// Wrap at whitespace by display width. Words longer than the width (and
/// the `====` dividers) are emitted whole rather than hard-broken.
fn wrap_text(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();

    for raw in line.split('\n') {
        if UnicodeWidthStr::width(raw) <= width {
            out.push(raw.to_string());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0usize;
        for word in raw.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);
            if current_width > 0 && current_width + 1 + word_width > width {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if current_width > 0 {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        if !current.is_empty() {
            out.push(current);
        }
    }

    if out.is_empty() {
        out.push(String::new());
    }
    out
}
