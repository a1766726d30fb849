//! Repair strategies for mapping-shaped text that failed the strict parse.
//!
//! Two heuristics, tried in order, first success wins:
//!
//! 1. flat pairs: `{bladder cancer : arsenic, rice: cadmium}`
//! 2. nested groups: `{fish: {se : [], hg: []}, tilapia: {heptachlor: []}}`
//!
//! Neither applies partially. A heuristic either accounts for the whole
//! literal or is rejected.

use crate::error::ExtractError;
use crate::schema::ParsedMapping;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Whole-literal shape required before nested groups are extracted.
static NESTED_STRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\{\n*([^{}]+\{\n*[^{}]+\n*\})+\n*\}$").unwrap()
});

/// One `outer: {inner...}` group at the front of the remaining text.
static NESTED_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^{}]+)\{([^{}]+)\}").unwrap());

pub const DEFAULT_NESTED_GROUP_CAP: usize = 64;

/// Which heuristic recovered the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    FlatPairs,
    NestedGroups,
}

#[derive(Debug, Clone)]
pub struct FallbackParser {
    nested_group_cap: usize,
}

impl Default for FallbackParser {
    fn default() -> Self {
        Self::new(DEFAULT_NESTED_GROUP_CAP)
    }
}

impl FallbackParser {
    pub fn new(nested_group_cap: usize) -> Self {
        Self { nested_group_cap }
    }

    /// Try every heuristic on a literal that failed the strict parse.
    pub fn recover(&self, literal: &str) -> Result<(ParsedMapping, Recovery), ExtractError> {
        if let Some(mapping) = flat_pairs(literal) {
            return Ok((mapping, Recovery::FlatPairs));
        }
        if let Some(mapping) = self.nested_groups(literal) {
            return Ok((mapping, Recovery::NestedGroups));
        }
        Err(ExtractError::HeuristicMismatch)
    }

    /// Extract `outer: {inner: ..., inner2: ...}` groups in document order.
    /// Each group becomes one entry: outer key -> inner keys. The inner
    /// values are discarded.
    pub fn nested_groups(&self, literal: &str) -> Option<ParsedMapping> {
        let literal = literal.trim();
        if !NESTED_STRUCTURE.is_match(literal) {
            return None;
        }

        // structure match guarantees the outer braces
        let mut rest = &literal[1..literal.len() - 1];
        let mut mapping = ParsedMapping::new();
        let mut iterations = 0;

        while let Some(caps) = NESTED_GROUP.captures(rest) {
            iterations += 1;
            if iterations > self.nested_group_cap {
                warn!(
                    cap = self.nested_group_cap,
                    "Nested-group extraction exceeded iteration cap"
                );
                return None;
            }

            let outer = clean_outer_key(&caps[1]);
            let inner = inner_keys(&caps[2]);
            mapping.push(outer, inner);

            let consumed = caps.get(0).map_or(rest.len(), |m| m.end());
            rest = &rest[consumed..];
        }

        let leftover = rest.trim_matches(|c: char| c.is_whitespace() || c == ',');
        if !leftover.is_empty() || mapping.is_empty() {
            debug!(leftover, "Nested-group extraction left unconsumed text");
            return None;
        }

        Some(mapping)
    }
}

/// `key: value` pairs separated by commas. Every comma-separated piece must
/// contain exactly one colon, otherwise the heuristic is rejected.
pub fn flat_pairs(literal: &str) -> Option<ParsedMapping> {
    let mut mapping = ParsedMapping::new();

    for piece in literal.split(',') {
        let parts: Vec<&str> = piece.split(':').collect();
        let [key, value] = parts.as_slice() else {
            return None;
        };

        let key = key.trim_matches(|c: char| c.is_whitespace() || c == '{' || c == '}');
        let value = clean_flat_value(value);
        let values = if value.is_empty() { Vec::new() } else { vec![value] };
        mapping.push(key, values);
    }

    Some(mapping)
}

fn clean_flat_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\'' | '"' | '[' | ']' | '{' | '}'))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

fn clean_outer_key(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '\'' | '"'))
        .to_string()
}

/// Keys of an inner group body such as `se : [], hg: [a, b]`.
fn inner_keys(body: &str) -> Vec<String> {
    split_top_level(body)
        .into_iter()
        .filter_map(|part| {
            let key = part.split(':').next().unwrap_or("");
            let key = key
                .trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"')
                .to_lowercase();
            (!key.is_empty()).then_some(key)
        })
        .collect()
}

/// Split on commas that are not inside brackets or parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (idx, c) in body.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
