// Catalog merge engine.
//
// Reconciles a fresh extraction pass against the previously persisted
// catalog. The workbook owns `text`; the operator owns every other field.
// Identities only ever accumulate: a cell that disappeared from the
// workbook keeps its row so operator annotations survive workbook edits.

use std::collections::{HashMap, HashSet};

use crate::record::{Catalog, CatalogRecord, CellEntry, RecordKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The same (sheet, location) appeared twice in one extraction pass.
    /// That is a collaborator bug, not a data condition to merge around.
    DuplicateCell(RecordKey),
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::DuplicateCell(key) => {
                write!(f, "duplicate cell {} in extraction pass", key)
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Merge freshly extracted cells into an existing catalog.
///
/// - Matching identities get their `text` refreshed (newest extraction
///   wins); all operator fields are left untouched.
/// - Existing records with no matching extraction are retained as-is.
/// - New identities append after all existing records, in extraction
///   order, with default (unknown) classification.
///
/// Pure: the inputs are not modified and no I/O happens here. Persisting
/// the result is the caller's job.
pub fn merge(extracted: &[CellEntry], existing: &Catalog) -> Result<Catalog, MergeError> {
    let index: HashMap<RecordKey, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, r)| (r.key(), i))
        .collect();

    let mut merged = existing.clone();
    let mut seen: HashSet<RecordKey> = HashSet::with_capacity(extracted.len());

    for entry in extracted {
        let key = entry.key();
        if !seen.insert(key.clone()) {
            return Err(MergeError::DuplicateCell(key));
        }
        match index.get(&key) {
            Some(&i) => {
                // Identity already cataloged: refresh text only.
                if let Some(record) = merged.get_mut(i) {
                    record.text = entry.text.clone();
                }
            }
            None => {
                merged.push(CatalogRecord::new(
                    entry.sheet.clone(),
                    entry.location.clone(),
                    entry.text.clone(),
                ));
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TriState;

    fn entry(sheet: &str, location: &str, text: &str) -> CellEntry {
        CellEntry {
            sheet: sheet.to_string(),
            location: location.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn new_cells_become_records_with_unknown_classification() {
        let extracted = vec![entry("Security", "B3", "Do you have a policy?")];
        let merged = merge(&extracted, &Catalog::new()).unwrap();

        assert_eq!(merged.len(), 1);
        let record = merged.get(0).unwrap();
        assert_eq!(record.key(), RecordKey::new("Security", "B3"));
        assert_eq!(record.text, "Do you have a policy?");
        assert_eq!(record.is_question, TriState::Unknown);
        assert_eq!(record.response, None);
    }

    #[test]
    fn operator_fields_survive_remerge() {
        let extracted = vec![entry("Security", "B3", "Do you have a policy?")];
        let mut catalog = merge(&extracted, &Catalog::new()).unwrap();

        // Operator triages the record between runs.
        catalog.get_mut(0).unwrap().is_question = TriState::True;

        let remerged = merge(&extracted, &catalog).unwrap();
        assert_eq!(remerged.get(0).unwrap().is_question, TriState::True);
    }

    #[test]
    fn text_refresh_keeps_everything_else() {
        let mut record = CatalogRecord::new("S", "A1", "old wording");
        record.is_question = TriState::True;
        record.response = Some("captured".to_string());
        record.response_location = Some("B1".to_string());
        let catalog = Catalog::from_records(vec![record]);

        let merged = merge(&[entry("S", "A1", "new wording")], &catalog).unwrap();
        let updated = merged.get(0).unwrap();
        assert_eq!(updated.text, "new wording");
        assert_eq!(updated.response.as_deref(), Some("captured"));
        assert_eq!(updated.response_location.as_deref(), Some("B1"));
        assert_eq!(updated.is_question, TriState::True);
    }

    #[test]
    fn stale_records_are_never_pruned() {
        let mut stale = CatalogRecord::new("S", "A1", "removed from workbook");
        stale.is_question = TriState::True;
        let catalog = Catalog::from_records(vec![stale]);

        let merged = merge(&[entry("S", "B9", "brand new")], &catalog).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(0).unwrap().location, "A1");
        assert_eq!(merged.get(1).unwrap().location, "B9");
    }

    #[test]
    fn new_records_append_in_extraction_order() {
        let catalog = Catalog::from_records(vec![CatalogRecord::new("S", "A1", "kept")]);
        let extracted = vec![
            entry("S", "C1", "third cell"),
            entry("S", "A1", "kept"),
            entry("S", "B1", "fourth cell"),
        ];

        let merged = merge(&extracted, &catalog).unwrap();
        let locations: Vec<&str> = merged.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["A1", "C1", "B1"]);
    }

    #[test]
    fn duplicate_extraction_key_fails_fast() {
        let extracted = vec![
            entry("Security", "B3", "first read"),
            entry("Security", "B3", "second read"),
        ];
        let err = merge(&extracted, &Catalog::new()).unwrap_err();
        assert_eq!(err, MergeError::DuplicateCell(RecordKey::new("Security", "B3")));
        assert!(err.to_string().contains("Security!B3"));
    }

    #[test]
    fn same_location_different_sheets_is_not_a_duplicate() {
        let extracted = vec![entry("Alpha", "B3", "one"), entry("Beta", "B3", "two")];
        let merged = merge(&extracted, &Catalog::new()).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let extracted = vec![
            entry("S", "A1", "question one"),
            entry("S", "A2", "question two"),
        ];
        let mut catalog = Catalog::from_records(vec![CatalogRecord::new("S", "A1", "stale text")]);
        catalog.get_mut(0).unwrap().is_question = TriState::True;

        let once = merge(&extracted, &catalog).unwrap();
        let twice = merge(&extracted, &once).unwrap();
        assert_eq!(once, twice);
    }
}
