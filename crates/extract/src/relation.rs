use crate::error::ExtractError;
use crate::literal::Literal;
use crate::schema::{ParsedMapping, RawRelation, SourceText};
use serde::{Deserialize, Serialize};

/// Accepts mapping keys that mention one logical subject.
///
/// Matching is substring-based on the lowercased key: `"dairy"` accepts
/// `"Dairy products"` and `"raw dairy milk"` alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFilter {
    name: String,
    synonyms: Vec<String>,
}

impl SubjectFilter {
    pub fn new<I, S>(name: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let synonyms = synonyms
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            name: name.into(),
            synonyms,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.synonyms.iter().any(|synonym| key.contains(synonym.as_str()))
    }
}

/// Shape of a strictly parsed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingShape {
    /// `{'maize': ['fumonisin', 'zearalenone']}`
    ListValued,
    /// `{'maize': 'fumonisin'}`, read as singleton lists
    ScalarValued,
    /// `{'fish': {'se': [], 'hg': []}}`, inner keys are the mentions
    Nested,
}

/// Validate a strictly parsed literal and turn it into a mapping.
///
/// The whole mapping is rejected when any value breaks the shape shared by
/// the others; nothing is accepted partially.
pub fn mapping_from_literal(
    literal: &Literal,
) -> Result<(ParsedMapping, MappingShape), ExtractError> {
    let Literal::Dict(pairs) = literal else {
        return Err(ExtractError::ShapeViolation("not a mapping"));
    };
    if pairs.is_empty() {
        return Err(ExtractError::ShapeViolation("empty mapping"));
    }

    let pairs = dedup_keys(pairs)?;

    let lists: Option<Vec<(&str, &[Literal])>> = pairs
        .iter()
        .map(|(key, value)| match value {
            Literal::List(items) => Some((*key, items.as_slice())),
            _ => None,
        })
        .collect();
    if let Some(lists) = lists {
        let mut mapping = ParsedMapping::new();
        for (key, items) in lists {
            let values = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or(ExtractError::ShapeViolation("list element is not a string"))?;
            mapping.push(key, values);
        }
        return Ok((mapping, MappingShape::ListValued));
    }

    let scalars: Option<ParsedMapping> = pairs
        .iter()
        .map(|(key, value)| value.as_str().map(|v| (key.to_string(), vec![v.to_string()])))
        .collect();
    if let Some(mapping) = scalars {
        return Ok((mapping, MappingShape::ScalarValued));
    }

    let nested: Option<Vec<(&str, &[(Literal, Literal)])>> = pairs
        .iter()
        .map(|(key, value)| match value {
            Literal::Dict(inner) => Some((*key, inner.as_slice())),
            _ => None,
        })
        .collect();
    if let Some(nested) = nested {
        let mut mapping = ParsedMapping::new();
        for (key, inner) in nested {
            let values = inner
                .iter()
                .map(|(inner_key, _)| inner_key.as_str().map(|k| k.trim().to_lowercase()))
                .collect::<Option<Vec<_>>>()
                .ok_or(ExtractError::ShapeViolation("inner key is not a string"))?;
            mapping.push(key, values);
        }
        return Ok((mapping, MappingShape::Nested));
    }

    Err(ExtractError::ShapeViolation("values have mixed shapes"))
}

/// String keys in first-seen order; a repeated key takes the later value,
/// as literal evaluation of a dict does.
fn dedup_keys(pairs: &[(Literal, Literal)]) -> Result<Vec<(&str, &Literal)>, ExtractError> {
    let mut out: Vec<(&str, &Literal)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let key = key
            .as_str()
            .ok_or(ExtractError::ShapeViolation("non-string key"))?;
        match out.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => out.push((key, value)),
        }
    }
    Ok(out)
}

/// Emits one relation per mention under every key the filter accepts.
pub struct RelationExtractor;

impl RelationExtractor {
    pub fn extract(
        mapping: &ParsedMapping,
        filter: &SubjectFilter,
        provenance: &SourceText,
    ) -> Vec<RawRelation> {
        mapping
            .entries()
            .iter()
            .filter(|entry| filter.matches(&entry.key))
            .flat_map(|entry| {
                entry.values.iter().map(|mention| RawRelation {
                    subject: entry.key.clone(),
                    mention: mention.clone(),
                    provenance: provenance.clone(),
                })
            })
            .collect()
    }
}
