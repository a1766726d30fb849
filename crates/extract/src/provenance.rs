use std::collections::HashMap;
use tracing::debug;

/// Result of looking up the document a relation's source text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceLookup {
    Unique(String),
    /// Zero or several documents share the text.
    Ambiguous { matches: usize },
}

impl ProvenanceLookup {
    /// The document identifier, or the empty string when ambiguous.
    pub fn into_id(self) -> String {
        match self {
            ProvenanceLookup::Unique(id) => id,
            ProvenanceLookup::Ambiguous { .. } => String::new(),
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, ProvenanceLookup::Unique(_))
    }
}

pub trait DocumentLookup {
    fn lookup(&self, text: &str) -> ProvenanceLookup;
}

/// Exact-text index from cleaned abstract to document identifiers.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    by_text: HashMap<String, Vec<String>>,
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: impl Into<String>, id: impl Into<String>) {
        self.by_text.entry(text.into()).or_default().push(id.into());
    }

    /// Number of distinct texts indexed.
    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}

impl<T: Into<String>, I: Into<String>> FromIterator<(T, I)> for DocumentIndex {
    fn from_iter<It: IntoIterator<Item = (T, I)>>(iter: It) -> Self {
        let mut index = Self::new();
        for (text, id) in iter {
            index.insert(text, id);
        }
        index
    }
}

impl DocumentLookup for DocumentIndex {
    fn lookup(&self, text: &str) -> ProvenanceLookup {
        match self.by_text.get(text).map(Vec::as_slice) {
            Some([id]) => ProvenanceLookup::Unique(id.clone()),
            Some(ids) => {
                debug!(matches = ids.len(), "Source text matches several documents");
                ProvenanceLookup::Ambiguous { matches: ids.len() }
            }
            None => ProvenanceLookup::Ambiguous { matches: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_lookup() {
        let index: DocumentIndex = [("abstract one", "10.1/a"), ("abstract two", "10.1/b")]
            .into_iter()
            .collect();
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.lookup("abstract two"),
            ProvenanceLookup::Unique("10.1/b".to_string())
        );
    }

    #[test]
    fn test_ambiguous_and_missing_give_empty_id() {
        let mut index = DocumentIndex::new();
        index.insert("shared text", "10.1/a");
        index.insert("shared text", "10.1/b");

        let shared = index.lookup("shared text");
        assert_eq!(shared, ProvenanceLookup::Ambiguous { matches: 2 });
        assert!(!shared.is_unique());
        assert_eq!(shared.into_id(), "");

        assert_eq!(
            index.lookup("never indexed"),
            ProvenanceLookup::Ambiguous { matches: 0 }
        );
    }

    #[test]
    fn test_lookup_is_exact() {
        let index: DocumentIndex = [("Lead in milk.", "10.1/a")].into_iter().collect();
        assert!(!index.lookup("lead in milk.").is_unique());
        assert!(!index.lookup("Lead in milk. ").is_unique());
    }
}
