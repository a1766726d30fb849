use crate::document::Document;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?(?:i|b|sub|sup)>").unwrap());

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h4>.*?</h4>").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static SPACE_BEFORE_PERIOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\.").unwrap());

static COPYRIGHT_BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)this article is protected by copyright. all rights reserved.").unwrap()
});

/// A copyright sign and at most 50 characters after it.
static COPYRIGHT_NOTICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:copyright)*[:\s]*©.{0,50}").unwrap());

/// One row of the raw literature table: `query,doi,title,abstract,year`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub query: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub year: Option<String>,
}

pub struct CleanerConfig {
    /// Abstracts with this many characters or fewer are dropped.
    pub min_length: usize,
    /// Lowercase phrases marking correction and retraction notices.
    pub excluded_phrases: Vec<String>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            min_length: 60,
            excluded_phrases: vec![
                "this corrects the article".to_string(),
                "this retracts the article".to_string(),
                "an amendment to this paper".to_string(),
            ],
        }
    }
}

/// Strip markup and publisher boilerplate from an abstract and normalize
/// its spacing.
pub fn clean_abstract(text: &str) -> String {
    let text = INLINE_TAG.replace_all(text, "");
    let text = SECTION_HEADER.replace_all(&text, " ");
    let text = space_after_periods(&text);
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = SPACE_BEFORE_PERIOD.replace_all(&text, ".");
    let text = COPYRIGHT_BOILERPLATE.replace_all(&text, "");
    let text = COPYRIGHT_NOTICE.replace_all(&text, "");
    text.trim().to_string()
}

/// Insert a space after a period unless a digit or whitespace follows it,
/// so `levels.Milk` splits but `0.5` does not.
fn space_after_periods(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '.' {
            match chars.peek() {
                Some(next) if next.is_numeric() || next.is_whitespace() => {}
                _ => out.push(' '),
            }
        }
    }
    out
}

/// Filter, order and clean raw articles into the document table.
///
/// Document ids are the article's row position in the raw table, so they
/// stay stable when filters change.
pub fn prepare_corpus(articles: Vec<RawArticle>, config: &CleanerConfig) -> Vec<Document> {
    let total = articles.len();
    let mut seen_abstracts = HashSet::new();
    let mut seen_dois = HashSet::new();
    let mut kept: Vec<(usize, Option<String>, String)> = Vec::new();

    for (row, article) in articles.into_iter().enumerate() {
        let Some(text) = article.abstract_text.filter(|a| !a.trim().is_empty()) else {
            continue;
        };
        if !seen_abstracts.insert(text.clone()) {
            debug!(row, "Dropping duplicate abstract");
            continue;
        }
        let doi = article.doi.filter(|d| !d.trim().is_empty());
        if let Some(doi) = &doi {
            if !seen_dois.insert(doi.clone()) {
                debug!(row, doi = %doi, "Dropping duplicate DOI");
                continue;
            }
        }
        kept.push((row, doi, text));
    }

    kept.retain(|(_, _, text)| text.chars().count() > config.min_length);
    kept.retain(|(row, _, text)| {
        let lower = text.to_lowercase();
        let excluded = config.excluded_phrases.iter().any(|p| lower.contains(p.as_str()));
        if excluded {
            debug!(row, "Dropping correction or retraction notice");
        }
        !excluded
    });
    kept.sort_by_key(|(_, _, text)| text.chars().count());

    let documents: Vec<Document> = kept
        .into_iter()
        .map(|(row, doi, text)| Document::new(row.to_string(), doi, clean_abstract(&text)))
        .collect();

    info!(total, kept = documents.len(), "Prepared abstract corpus");
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(doi: &str, text: &str) -> RawArticle {
        RawArticle {
            query: "food safety".to_string(),
            doi: (!doi.is_empty()).then(|| doi.to_string()),
            title: None,
            abstract_text: Some(text.to_string()),
            year: Some("2021".to_string()),
        }
    }

    fn long(text: &str) -> String {
        format!("{} Samples were collected from retail markets across the region.", text)
    }

    #[test]
    fn test_clean_markup_and_spacing() {
        assert_eq!(
            clean_abstract("<i>Aflatoxin</i> B<sub>1</sub> levels.Milk samples  were tested ."),
            "Aflatoxin B1 levels. Milk samples were tested."
        );
        assert_eq!(
            clean_abstract("<h4>Background</h4>Cadmium at 0.5 mg/kg.\nLead too."),
            "Cadmium at 0.5 mg/kg. Lead too."
        );
    }

    #[test]
    fn test_clean_copyright() {
        assert_eq!(
            clean_abstract("Mercury in tuna. This article is protected by copyright. All rights reserved."),
            "Mercury in tuna."
        );
        assert_eq!(
            clean_abstract("Lead was found. © 2023 Elsevier Ltd. All rights reserved."),
            "Lead was found."
        );
    }

    #[test]
    fn test_prepare_corpus_filters() {
        let articles = vec![
            article("10.1/a", &long("Lead in rice, a much longer abstract than the others.")),
            article("10.1/b", &long("Lead in rice, a much longer abstract than the others.")),
            article("10.1/a", &long("Arsenic in rice.")),
            article("", "Too short."),
            article("10.1/c", &long("This corrects the article on cadmium.")),
            RawArticle::default(),
            article("", &long("Cadmium in cocoa.")),
        ];
        let documents = prepare_corpus(articles, &CleanerConfig::default());

        assert_eq!(documents.len(), 2);
        // shortest first, ids from the raw row position
        assert_eq!(documents[0].doc_id, "6");
        assert_eq!(documents[0].doi, None);
        assert_eq!(documents[1].doc_id, "0");
        assert_eq!(documents[1].provenance_id(), "10.1/a");
    }
}
