pub mod cleaner;
pub mod document;
pub mod reader;

pub use cleaner::{CleanerConfig, RawArticle, clean_abstract, prepare_corpus};
pub use document::{Document, generate_doc_id};
pub use reader::TableReader;

use anyhow::Result;
use std::path::Path;

/// Read a raw article table and turn it into cleaned documents.
pub async fn clean_article_file(path: &Path, config: &CleanerConfig) -> Result<Vec<Document>> {
    let articles = TableReader::read_articles(path).await?;
    Ok(prepare_corpus(articles, config))
}
