// Catalog records: identity keys, tri-state classification, ordered catalog.

use std::collections::HashMap;
use std::fmt;

use serde::de::{Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Operator-supplied classification. `Unknown` is a real state — a record
/// nobody has triaged yet — and must never collapse into `False` when the
/// catalog round-trips through disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    True,
    False,
    #[default]
    Unknown,
}

impl TriState {
    /// Parse a catalog field. Accepts the spellings operators actually type
    /// into the CSV; anything unrecognized (including blank) is `Unknown`.
    pub fn parse(field: &str) -> TriState {
        match field.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => TriState::True,
            "false" | "no" | "n" | "0" => TriState::False,
            _ => TriState::Unknown,
        }
    }

    /// Canonical catalog field representation: `true`, `false`, or blank.
    pub fn as_field(&self) -> &'static str {
        match self {
            TriState::True => "true",
            TriState::False => "false",
            TriState::Unknown => "",
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, TriState::True)
    }
}

impl Serialize for TriState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_field())
    }
}

struct TriStateVisitor;

impl Visitor<'_> for TriStateVisitor {
    type Value = TriState;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a tri-state field (true/false/blank)")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<TriState, E> {
        Ok(TriState::parse(v))
    }
}

impl<'de> Deserialize<'de> for TriState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<TriState, D::Error> {
        deserializer.deserialize_str(TriStateVisitor)
    }
}

/// Composite identity of a catalog record: `(sheet, location)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub sheet: String,
    pub location: String,
}

impl RecordKey {
    pub fn new(sheet: impl Into<String>, location: impl Into<String>) -> Self {
        Self { sheet: sheet.into(), location: location.into() }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.location)
    }
}

/// One non-empty text cell read from the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEntry {
    pub sheet: String,
    pub location: String,
    pub text: String,
}

impl CellEntry {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.sheet.clone(), self.location.clone())
    }
}

/// One catalog row. Serde renames match the nine CSV headers exactly, so
/// rows serialize straight through the csv crate.
///
/// `sheet`/`location` are the immutable identity; `text` is owned by the
/// workbook (refreshed on every merge); everything else is owned by the
/// operator or the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "tabName")]
    pub sheet: String,
    #[serde(rename = "textLocation")]
    pub location: String,
    #[serde(rename = "textValue")]
    pub text: String,
    #[serde(rename = "isQuestion")]
    pub is_question: TriState,
    #[serde(rename = "textResponse")]
    pub response: Option<String>,
    #[serde(rename = "textResponseLocation")]
    pub response_location: Option<String>,
    #[serde(rename = "isDefaultAnswer")]
    pub is_default_answer: TriState,
    #[serde(rename = "defaultAnswerQuestionLocation")]
    pub default_answer_target: Option<String>,
    #[serde(rename = "isInstruction")]
    pub is_instruction: TriState,
}

impl CatalogRecord {
    /// A freshly extracted record: classification unknown, nothing answered.
    pub fn new(sheet: impl Into<String>, location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            location: location.into(),
            text: text.into(),
            is_question: TriState::Unknown,
            response: None,
            response_location: None,
            is_default_answer: TriState::Unknown,
            default_answer_target: None,
            is_instruction: TriState::Unknown,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.sheet.clone(), self.location.clone())
    }

    /// Response text, treating blank the same as absent.
    pub fn response_text(&self) -> Option<&str> {
        self.response.as_deref().filter(|s| !s.is_empty())
    }

    pub fn has_response(&self) -> bool {
        self.response_text().is_some()
    }

    /// True when this record has both a response and a place to write it.
    pub fn is_answered(&self) -> bool {
        self.has_response()
            && self.response_location.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Ordered collection of catalog records. Order is first-seen order:
/// previously persisted records first, newly discovered ones appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: CatalogRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&CatalogRecord> {
        self.records.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CatalogRecord> {
        self.records.get_mut(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogRecord> {
        self.records.iter()
    }

    /// Indices of records the session should ask about, in catalog order:
    /// classified as questions and not yet answered.
    pub fn candidate_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_question.is_true() && !r.has_response())
            .map(|(i, _)| i)
            .collect()
    }

    /// Default answers keyed by the question location they apply to, built
    /// from rows the operator marked `isDefaultAnswer=true`.
    pub fn default_answers(&self) -> HashMap<String, String> {
        let mut lookup = HashMap::new();
        for record in &self.records {
            if !record.is_default_answer.is_true() || record.text.is_empty() {
                continue;
            }
            if let Some(target) = record.default_answer_target.as_deref() {
                if !target.is_empty() {
                    lookup.insert(target.to_string(), record.text.clone());
                }
            }
        }
        lookup
    }

    /// Records carrying both a response and a response location — the set
    /// the answer writer acts on.
    pub fn answered(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.iter().filter(|r| r.is_answered())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogRecord;
    type IntoIter = std::slice::Iter<'a, CatalogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
