use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A cleaned abstract as the extraction pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub doi: Option<String>,
    pub clean_abstract: String,
}

impl Document {
    pub fn new(doc_id: impl Into<String>, doi: Option<String>, clean_abstract: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            doi: doi.filter(|d| !d.trim().is_empty()),
            clean_abstract: clean_abstract.into(),
        }
    }

    /// Build a document whose id is derived from its text.
    pub fn from_text(doi: Option<String>, clean_abstract: impl Into<String>) -> Self {
        let clean_abstract = clean_abstract.into();
        Self::new(generate_doc_id(&clean_abstract), doi, clean_abstract)
    }

    /// Identifier recorded as provenance: the DOI when known.
    pub fn provenance_id(&self) -> &str {
        self.doi.as_deref().unwrap_or(&self.doc_id)
    }
}

/// Stable document ID from content
pub fn generate_doc_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16]) // first 16 bytes (32 hex chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_stable() {
        let a = Document::from_text(None, "Lead in rice.");
        let b = Document::from_text(None, "Lead in rice.");
        let c = Document::from_text(None, "Lead in wheat.");
        assert_eq!(a.doc_id, b.doc_id);
        assert_ne!(a.doc_id, c.doc_id);
        assert_eq!(a.doc_id.len(), 32);
    }

    #[test]
    fn test_provenance_prefers_doi() {
        let with_doi = Document::new("7", Some("10.1016/j.food.2020.1".into()), "text");
        assert_eq!(with_doi.provenance_id(), "10.1016/j.food.2020.1");

        let blank_doi = Document::new("7", Some("  ".into()), "text");
        assert_eq!(blank_doi.doi, None);
        assert_eq!(blank_doi.provenance_id(), "7");
    }
}
