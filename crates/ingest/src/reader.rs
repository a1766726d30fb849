use crate::cleaner::RawArticle;
use crate::document::Document;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Column of a response table holding the abstract each response was
/// prompted with.
pub const ABSTRACT_COLUMN: &str = "abstracts";

/// Row of the cleaned-document table. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct DocumentRow {
    doc_id: Option<String>,
    doi: Option<String>,
    clean_abstract: String,
}

pub struct TableReader;

impl TableReader {
    async fn read_text(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read table: {:?}", path))
    }

    fn reader(content: &str, has_headers: bool) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(content.as_bytes())
    }

    /// Headerless `name,identifier` rows.
    pub async fn read_lexicon(path: &Path) -> Result<Vec<(String, String)>> {
        let content = Self::read_text(path).await?;
        let mut rows = Vec::new();

        for (line, record) in Self::reader(&content, false).records().enumerate() {
            let record = record.with_context(|| format!("Bad lexicon row {} in {:?}", line + 1, path))?;
            match (record.get(0), record.get(1)) {
                (Some(name), Some(id)) if !name.trim().is_empty() && !id.trim().is_empty() => {
                    rows.push((name.to_string(), id.to_string()));
                }
                _ => debug!(line = line + 1, "Skipping incomplete lexicon row"),
            }
        }

        Ok(rows)
    }

    /// Cleaned documents with a `clean_abstract` column and optional
    /// `doc_id` and `doi` columns.
    pub async fn read_documents(path: &Path) -> Result<Vec<Document>> {
        let content = Self::read_text(path).await?;
        let mut documents = Vec::new();

        for row in Self::reader(&content, true).deserialize::<DocumentRow>() {
            let row = row.with_context(|| format!("Bad document row in {:?}", path))?;
            let document = match row.doc_id.filter(|id| !id.trim().is_empty()) {
                Some(id) => Document::new(id, row.doi, row.clean_abstract),
                None => Document::from_text(row.doi, row.clean_abstract),
            };
            documents.push(document);
        }

        Ok(documents)
    }

    /// Headerless raw article table. Malformed rows are skipped with a warning.
    pub async fn read_articles(path: &Path) -> Result<Vec<RawArticle>> {
        let content = Self::read_text(path).await?;
        let mut articles = Vec::new();

        for (line, row) in Self::reader(&content, false).deserialize::<RawArticle>().enumerate() {
            match row {
                Ok(article) => articles.push(article),
                Err(err) => warn!(line = line + 1, error = %err, "Skipping malformed article row"),
            }
        }

        Ok(articles)
    }

    /// `(abstract, response)` pairs from a response table, reading the
    /// response from the column named after the prompt variant.
    pub async fn read_responses(path: &Path, variant: &str) -> Result<Vec<(String, String)>> {
        let content = Self::read_text(path).await?;
        let mut reader = Self::reader(&content, true);

        let headers = reader
            .headers()
            .with_context(|| format!("Missing header row in {:?}", path))?
            .clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        let abstract_idx = position(ABSTRACT_COLUMN)
            .with_context(|| format!("No '{}' column in {:?}", ABSTRACT_COLUMN, path))?;
        let response_idx = position(variant)
            .with_context(|| format!("No '{}' column in {:?}", variant, path))?;

        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Bad response row in {:?}", path))?;
            let source = record.get(abstract_idx).unwrap_or_default();
            let response = record.get(response_idx).unwrap_or_default();
            pairs.push((source.to_string(), response.to_string()));
        }

        Ok(pairs)
    }
}
