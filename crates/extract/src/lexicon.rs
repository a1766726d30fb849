use crate::normalizer::normalize_name;
use std::collections::HashMap;

pub const DEFAULT_NAMESPACE: &str = "CHEBI";

/// Read-only map from normalized chemical names to canonical identifiers.
#[derive(Debug, Clone, Default)]
pub struct CanonicalLexicon {
    names: HashMap<String, String>,
    /// lowercased identifier -> identifier, for direct hits on an ID
    ids: HashMap<String, String>,
}

impl CanonicalLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, identifier)` rows. The first row for a name wins.
    pub fn from_entries<I, N, V>(entries: I, namespace: &str) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut lexicon = Self::new();
        for (name, identifier) in entries {
            lexicon.insert(name.as_ref(), identifier.as_ref(), namespace);
        }
        lexicon
    }

    /// Returns false when the name was empty or already present.
    pub fn insert(&mut self, name: &str, identifier: &str, namespace: &str) -> bool {
        let key = normalize_name(name);
        let identifier = format_identifier(namespace, identifier);
        if key.is_empty() || identifier.is_empty() || self.names.contains_key(&key) {
            return false;
        }
        self.ids
            .entry(identifier.to_lowercase())
            .or_insert_with(|| identifier.clone());
        self.names.insert(key, identifier);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.names.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Value-set membership: `chebi:27889` finds `CHEBI:27889`.
    pub fn canonical_id(&self, id: &str) -> Option<&str> {
        self.ids.get(&id.trim().to_lowercase()).map(String::as_str)
    }

    /// Name lookup, falling back to treating the input as an identifier.
    pub fn resolve_direct(&self, mention: &str) -> Option<&str> {
        self.lookup(mention).or_else(|| self.canonical_id(mention))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `("CHEBI", "27889")` -> `CHEBI:27889`; an already-prefixed identifier is
/// kept as is.
pub fn format_identifier(namespace: &str, identifier: &str) -> String {
    let identifier = identifier.trim();
    if identifier.is_empty() || namespace.is_empty() {
        return identifier.to_string();
    }
    let prefix = format!("{}:", namespace);
    let already_prefixed = identifier
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(&prefix));
    if already_prefixed {
        identifier.to_string()
    } else {
        format!("{}{}", prefix, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> CanonicalLexicon {
        CanonicalLexicon::from_entries(
            [
                ("lead", "25016"),
                ("Polychlorinated  Biphenyls", "53156"),
                ("lead", "99999"),
                ("cadmium", "CHEBI:22977"),
            ],
            DEFAULT_NAMESPACE,
        )
    }

    #[test]
    fn test_lookup_is_normalized_and_first_wins() {
        let lexicon = lexicon();
        assert_eq!(lexicon.len(), 3);
        assert_eq!(lexicon.lookup("Lead"), Some("CHEBI:25016"));
        assert_eq!(
            lexicon.lookup("polychlorinated biphenyls"),
            Some("CHEBI:53156")
        );
        assert_eq!(lexicon.lookup("cadmium"), Some("CHEBI:22977"));
        assert!(!lexicon.contains("biphenyls"));
    }

    #[test]
    fn test_identifier_membership() {
        let lexicon = lexicon();
        assert_eq!(lexicon.canonical_id("chebi:25016"), Some("CHEBI:25016"));
        assert_eq!(lexicon.resolve_direct("CHEBI:53156"), Some("CHEBI:53156"));
        assert_eq!(lexicon.canonical_id("CHEBI:99999"), None);
    }

    #[test]
    fn test_format_identifier() {
        assert_eq!(format_identifier("CHEBI", "123"), "CHEBI:123");
        assert_eq!(format_identifier("CHEBI", " chebi:123 "), "chebi:123");
        assert_eq!(format_identifier("", "X1"), "X1");
    }
}
