//! Abbreviation expansion from local context.
//!
//! Abstracts usually introduce a chemical once by its full name with the
//! abbreviation in parentheses, `... polychlorinated biphenyls (pcbs) ...`,
//! and generator output tends to repeat only the abbreviation. The words
//! right before `(abbreviation)` are searched for a lexicon entry.

use crate::lexicon::CanonicalLexicon;
use regex::Regex;

pub const DEFAULT_WINDOW: usize = 6;

pub trait AbbreviationResolver {
    /// Return the full name `mention` abbreviates in `source`, or `mention`
    /// unchanged when no expansion is found.
    fn resolve(&self, mention: &str, source: &str, lexicon: &CanonicalLexicon) -> String;
}

/// Looks at up to `window` words preceding `(mention)` in the source text
/// and keeps the longest trailing phrase that is a lexicon entry.
#[derive(Debug, Clone)]
pub struct ContextWindowResolver {
    window: usize,
}

impl Default for ContextWindowResolver {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl ContextWindowResolver {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Text before the parenthesized mention, lowercased. Same-line only,
    /// and the last such occurrence on that line.
    fn preceding_text(mention: &str, source: &str) -> Option<String> {
        if mention.is_empty() {
            return None;
        }
        let pattern = format!(r"(.*)\({}\)", regex::escape(mention));
        let re = Regex::new(&pattern).ok()?;
        let source = source.to_lowercase();
        re.captures(&source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Suffixes of the trailing word window, shortest first.
    pub fn candidates(&self, preceding: &str) -> Vec<String> {
        let words: Vec<&str> = preceding.split_whitespace().collect();
        let window = &words[words.len().saturating_sub(self.window)..];
        (1..=window.len())
            .map(|n| window[window.len() - n..].join(" "))
            .collect()
    }
}

impl AbbreviationResolver for ContextWindowResolver {
    fn resolve(&self, mention: &str, source: &str, lexicon: &CanonicalLexicon) -> String {
        let mention_lower = mention.to_lowercase();
        let Some(preceding) = Self::preceding_text(&mention_lower, source) else {
            return mention.to_string();
        };

        // longest matching candidate wins
        self.candidates(&preceding)
            .into_iter()
            .rev()
            .find(|candidate| lexicon.contains(candidate))
            .unwrap_or_else(|| mention.to_string())
    }
}
