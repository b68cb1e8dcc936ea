// Workbook collaborators: text extraction (calamine) and answer
// write-back (rust_xlsxwriter).
//
// Both are one-way value conversions. Formatting fidelity is out of
// scope; formulas land as their cached values.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook as XlsxWorkbook;

use askbook_engine::cell_ref::{cell_ref, parse_cell_ref};
use askbook_engine::record::{Catalog, CellEntry};

/// Extract every non-blank text cell, in sheet order, then row order,
/// then column order. Numbers, dates, and booleans are not questionnaire
/// text and are omitted, as are cells that are blank after trimming; the
/// stored text is the verbatim cell string.
pub fn extract_text(path: &Path) -> Result<Vec<CellEntry>, String> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| format!("failed to open workbook {}: {}", path.display(), e))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut entries = Vec::new();

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| format!("failed to read sheet '{}': {}", sheet_name, e))?;

        // Data may not begin at A1.
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                if let Data::String(text) = value {
                    if text.trim().is_empty() {
                        continue;
                    }
                    entries.push(CellEntry {
                        sheet: sheet_name.clone(),
                        location: cell_ref(
                            start_row as usize + row_idx,
                            start_col as usize + col_idx,
                        ),
                        text: text.clone(),
                    });
                }
            }
        }
    }

    Ok(entries)
}

/// Write every answered record into a fresh copy of `source`, saved at
/// `output`. The source workbook is re-loaded here — never the handle the
/// extraction pass used — and is never written to.
///
/// Answered records pointing at a sheet the workbook no longer has, or at
/// a location that does not parse, are skipped. Returns the number of
/// answers written.
pub fn write_answers(source: &Path, catalog: &Catalog, output: &Path) -> Result<usize, String> {
    let mut workbook = open_workbook_auto(source)
        .map_err(|e| format!("failed to open workbook {}: {}", source.display(), e))?;
    let sheet_names = workbook.sheet_names().to_vec();

    // Answers grouped by sheet, locations resolved up front.
    let mut answers: HashMap<&str, Vec<(usize, usize, &str)>> = HashMap::new();
    for record in catalog.answered() {
        if !sheet_names.iter().any(|name| name == &record.sheet) {
            continue;
        }
        let location = record.response_location.as_deref().unwrap_or_default();
        let Some((row, col)) = parse_cell_ref(location) else {
            continue;
        };
        let Some(response) = record.response_text() else {
            continue;
        };
        answers
            .entry(record.sheet.as_str())
            .or_default()
            .push((row, col, response));
    }

    let mut xlsx = XlsxWorkbook::new();
    let mut written = 0usize;

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| format!("failed to read sheet '{}': {}", sheet_name, e))?;

        let worksheet = xlsx
            .add_worksheet()
            .set_name(sheet_name.as_str())
            .map_err(|e| format!("failed to create sheet '{}': {}", sheet_name, e))?;

        let cell_err = |e: rust_xlsxwriter::XlsxError| format!("failed to write cell: {}", e);

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                let out_row = start_row + row_idx as u32;
                let out_col = start_col as u16 + col_idx as u16;
                match value {
                    Data::Empty | Data::Error(_) => {}
                    Data::String(s) => {
                        worksheet
                            .write_string(out_row, out_col, s.as_str())
                            .map_err(cell_err)?;
                    }
                    Data::Float(n) => {
                        worksheet.write_number(out_row, out_col, *n).map_err(cell_err)?;
                    }
                    Data::Int(n) => {
                        worksheet
                            .write_number(out_row, out_col, *n as f64)
                            .map_err(cell_err)?;
                    }
                    Data::Bool(b) => {
                        worksheet.write_boolean(out_row, out_col, *b).map_err(cell_err)?;
                    }
                    // Serial value; the answered copy is for reading, not
                    // date arithmetic.
                    Data::DateTime(dt) => {
                        worksheet
                            .write_number(out_row, out_col, dt.as_f64())
                            .map_err(cell_err)?;
                    }
                    Data::DateTimeIso(s) | Data::DurationIso(s) => {
                        worksheet
                            .write_string(out_row, out_col, s.as_str())
                            .map_err(cell_err)?;
                    }
                }
            }
        }

        if let Some(cells) = answers.get(sheet_name.as_str()) {
            for &(row, col, response) in cells {
                worksheet
                    .write_string(row as u32, col as u16, response)
                    .map_err(cell_err)?;
                written += 1;
            }
        }
    }

    xlsx.save(output)
        .map_err(|e| format!("failed to save {}: {}", output.display(), e))?;
    Ok(written)
}
