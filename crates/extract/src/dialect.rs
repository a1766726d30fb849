use crate::error::ExtractError;
use crate::literal::{Literal, parse_literal};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DICTIONARY_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Dictionary:\s*(\{.*\})").unwrap());

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(\{.*\})\s*```").unwrap());

const END_OF_SEQUENCE: &str = "</s>";

/// Surface shape a response uses to present its mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `Dictionary: {...}` after free-text reasoning.
    DictionaryHeader,
    /// A ```-fenced block holding the literal.
    Fenced,
    /// The whole response is the literal, possibly followed by `</s>`.
    BareLiteral,
}

impl Dialect {
    /// Locate the literal text for this dialect, if the marker is present.
    pub fn locate(self, response: &str) -> Option<String> {
        match self {
            Dialect::DictionaryHeader => DICTIONARY_HEADER
                .captures(response)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Dialect::Fenced => FENCED_BLOCK
                .captures(response)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            Dialect::BareLiteral => {
                let trimmed = response.trim_end();
                let trimmed = trimmed.strip_suffix(END_OF_SEQUENCE).unwrap_or(trimmed).trim();
                (trimmed.starts_with('{') && trimmed.ends_with('}'))
                    .then(|| trimmed.to_lowercase())
            }
        }
    }
}

/// Literal text found in a response together with the dialect that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedLiteral {
    pub dialect: Dialect,
    pub text: String,
}

/// Ordered set of dialects to try; the first marker present wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    dialects: Vec<Dialect>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new(vec![
            Dialect::DictionaryHeader,
            Dialect::Fenced,
            Dialect::BareLiteral,
        ])
    }
}

impl MarkerSet {
    pub fn new(dialects: Vec<Dialect>) -> Self {
        Self { dialects }
    }

    pub fn dialects(&self) -> &[Dialect] {
        &self.dialects
    }

    pub fn locate(&self, response: &str) -> Option<LocatedLiteral> {
        self.dialects.iter().find_map(|dialect| {
            dialect.locate(response).map(|text| LocatedLiteral {
                dialect: *dialect,
                text,
            })
        })
    }
}

/// Result of looking for and strictly parsing a literal in one response.
///
/// `NotRecognized` and `Malformed` are different outcomes: only the latter
/// is worth handing to the fallback heuristics.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralOutcome {
    NotRecognized,
    Parsed {
        located: LocatedLiteral,
        value: Literal,
    },
    Malformed {
        located: LocatedLiteral,
        error: ExtractError,
    },
}

#[derive(Debug, Clone, Default)]
pub struct StructuredLiteralExtractor {
    markers: MarkerSet,
}

impl StructuredLiteralExtractor {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    pub fn extract(&self, response: &str) -> LiteralOutcome {
        let Some(located) = self.markers.locate(response) else {
            return LiteralOutcome::NotRecognized;
        };

        match parse_literal(&located.text) {
            Ok(value) => LiteralOutcome::Parsed { located, value },
            Err(error) => LiteralOutcome::Malformed { located, error },
        }
    }
}
