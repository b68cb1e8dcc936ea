// Property tests for the catalog merge engine.

use std::collections::{HashMap, HashSet};

use proptest::collection::vec;
use proptest::prelude::*;

use askbook_engine::cell_ref;
use askbook_engine::merge::merge;
use askbook_engine::record::{Catalog, CatalogRecord, CellEntry, TriState};

/// Extraction passes with unique (sheet, location) keys, as the extraction
/// collaborator guarantees.
fn cell_entries() -> impl Strategy<Value = Vec<CellEntry>> {
    vec(("[AB]", 0usize..12, 0usize..4, ".{0,12}"), 0..16).prop_map(|items| {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (sheet, row, col, text) in items {
            let location = cell_ref::cell_ref(row, col);
            if seen.insert((sheet.clone(), location.clone())) {
                out.push(CellEntry { sheet, location, text });
            }
        }
        out
    })
}

/// Catalogs with a mix of triaged, answered, and untouched records.
fn catalogs() -> impl Strategy<Value = Catalog> {
    (cell_entries(), any::<u64>()).prop_map(|(entries, seed)| {
        let mut catalog = Catalog::new();
        for (i, entry) in entries.into_iter().enumerate() {
            let mut record = CatalogRecord::new(entry.sheet, entry.location, entry.text);
            match (seed >> ((2 * i) % 62)) & 3 {
                0 => record.is_question = TriState::True,
                1 => {
                    record.is_question = TriState::True;
                    record.response = Some("captured".to_string());
                    record.response_location = Some("B1".to_string());
                }
                2 => record.is_question = TriState::False,
                _ => {}
            }
            catalog.push(record);
        }
        catalog
    })
}

proptest! {
    #[test]
    fn merge_is_idempotent(entries in cell_entries(), catalog in catalogs()) {
        let once = merge(&entries, &catalog).unwrap();
        let twice = merge(&entries, &once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_never_deletes_identities(entries in cell_entries(), catalog in catalogs()) {
        let merged = merge(&entries, &catalog).unwrap();
        prop_assert!(merged.len() >= catalog.len());

        let merged_keys: HashSet<_> = merged.iter().map(|r| r.key()).collect();
        for record in catalog.iter() {
            prop_assert!(merged_keys.contains(&record.key()));
        }
    }

    #[test]
    fn merge_preserves_operator_fields(entries in cell_entries(), catalog in catalogs()) {
        let merged = merge(&entries, &catalog).unwrap();
        let by_key: HashMap<_, _> = merged.iter().map(|r| (r.key(), r)).collect();

        for record in catalog.iter() {
            let kept = by_key[&record.key()];
            prop_assert_eq!(kept.is_question, record.is_question);
            prop_assert_eq!(&kept.response, &record.response);
            prop_assert_eq!(&kept.response_location, &record.response_location);
            prop_assert_eq!(kept.is_default_answer, record.is_default_answer);
            prop_assert_eq!(&kept.default_answer_target, &record.default_answer_target);
            prop_assert_eq!(kept.is_instruction, record.is_instruction);
        }
    }

    #[test]
    fn merged_text_matches_latest_extraction(entries in cell_entries(), catalog in catalogs()) {
        let merged = merge(&entries, &catalog).unwrap();
        let by_key: HashMap<_, _> = merged.iter().map(|r| (r.key(), r)).collect();

        for entry in &entries {
            prop_assert_eq!(&by_key[&entry.key()].text, &entry.text);
        }
    }
}
