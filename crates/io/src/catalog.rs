// Catalog CSV store.
//
// The catalog is the only durable state this tool has, so `save` is
// atomic: the file is written to a `.csv.tmp` sibling and renamed over
// the target. A crash mid-write cannot corrupt the previously good file.

use std::fs;
use std::io::Read;
use std::path::Path;

use askbook_engine::record::{Catalog, CatalogRecord};

/// The nine catalog columns, in row order. Operators edit this file by
/// hand, so loads validate the header before trusting any row.
pub const CATALOG_HEADERS: [&str; 9] = [
    "tabName",
    "textLocation",
    "textValue",
    "isQuestion",
    "textResponse",
    "textResponseLocation",
    "isDefaultAnswer",
    "defaultAnswerQuestionLocation",
    "isInstruction",
];

/// Load a catalog. A missing file is an empty catalog, not an error —
/// first runs have nothing persisted yet.
pub fn load(path: &Path) -> Result<Catalog, String> {
    if !path.is_file() {
        return Ok(Catalog::new());
    }

    let content = read_file_as_utf8(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| format!("failed to read catalog header in {}: {}", path.display(), e))?
        .clone();
    let missing: Vec<&str> = CATALOG_HEADERS
        .iter()
        .filter(|required| !headers.iter().any(|field| field == **required))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(format!(
            "catalog {} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        ));
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.deserialize::<CatalogRecord>().enumerate() {
        let record = result.map_err(|e| {
            format!(
                "catalog parse error in {} at row {}: {}",
                path.display(),
                row_idx + 2, // 1-based, after the header row
                e
            )
        })?;
        records.push(record);
    }

    Ok(Catalog::from_records(records))
}

/// Persist a catalog atomically (write tmp, then rename).
///
/// Every field is quoted so embedded newlines in question text and
/// multi-line answers round-trip exactly.
pub fn save(catalog: &Catalog, path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("failed to create {}: {}", dir.display(), e))?;
        }
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .from_path(&tmp_path)
            .map_err(|e| format!("failed to write {}: {}", tmp_path.display(), e))?;

        for record in catalog.iter() {
            writer
                .serialize(record)
                .map_err(|e| format!("failed to write catalog row: {}", e))?;
        }
        writer
            .flush()
            .map_err(|e| format!("failed to flush {}: {}", tmp_path.display(), e))?;
    }

    fs::rename(&tmp_path, path)
        .map_err(|e| format!("failed to move {} into place: {}", tmp_path.display(), e))
}

/// Read file and convert to UTF-8 if needed. Catalogs re-saved from Excel
/// are frequently Windows-1252.
fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = fs::File::open(path)
        .map_err(|e| format!("failed to open {}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
