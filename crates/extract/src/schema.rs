use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A cleaned abstract or a single generator response. Shared between every
/// relation extracted from it.
pub type SourceText = Arc<str>;

/// One key of a recovered mapping together with its chemical mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub key: String,
    pub values: Vec<String>,
}

/// Ordered key -> mentions mapping recovered from a response.
///
/// Keys are not unique: fallback recovery can yield the same key more than
/// once and each occurrence is kept as its own entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMapping {
    entries: Vec<MappingEntry>,
}

impl ParsedMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.push(MappingEntry {
            key: key.into(),
            values,
        });
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for ParsedMapping {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, values)| MappingEntry { key, values })
                .collect(),
        }
    }
}

/// A single asserted (subject, chemical) relation before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRelation {
    pub subject: String,
    pub mention: String,
    /// The abstract the generator was shown when it produced this relation.
    pub provenance: SourceText,
}

/// Aggregated evidence for one canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub canonical_id: String,
    /// Distinct surface forms, first-seen order.
    pub surface_forms: Vec<String>,
    /// One entry per contributing relation; empty string for ambiguous provenance.
    pub provenance_ids: Vec<String>,
}

impl ResolvedEntity {
    pub fn new(canonical_id: impl Into<String>) -> Self {
        Self {
            canonical_id: canonical_id.into(),
            surface_forms: Vec::new(),
            provenance_ids: Vec::new(),
        }
    }

    pub fn record(&mut self, surface_form: &str, provenance_id: String) {
        if !self.surface_forms.iter().any(|s| s == surface_form) {
            self.surface_forms.push(surface_form.to_string());
        }
        self.provenance_ids.push(provenance_id);
    }

    /// Absorb another record for the same identifier, keeping `self`'s order first.
    pub fn absorb(&mut self, other: ResolvedEntity) {
        for form in other.surface_forms {
            if !self.surface_forms.contains(&form) {
                self.surface_forms.push(form);
            }
        }
        self.provenance_ids.extend(other.provenance_ids);
    }
}

/// One generator response paired with the abstract it was prompted with.
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub response: String,
    pub source: SourceText,
}

impl ResponseRecord {
    pub fn new(response: impl Into<String>, source: impl Into<SourceText>) -> Self {
        Self {
            response: response.into(),
            source: source.into(),
        }
    }
}

/// Exported row: one per canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRow {
    pub canonical_id: String,
    pub surface_forms: String,
    pub provenance_ids: String,
    /// Left empty for manual review.
    pub eval: String,
}
