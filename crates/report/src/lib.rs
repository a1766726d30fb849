pub mod config;
pub mod export;

pub use config::{AppConfig, ExportConfig, ParsingConfig, ResolutionConfig, SubjectConfig};
pub use export::{ExportSummary, write_all, write_documents};

use anyhow::{Context, Result};
use extract::{
    CanonicalLexicon, ContextWindowResolver, DocumentIndex, EntityResolutionPipeline,
    FallbackParser, HazardExtractor, MarkerSet, ResponseRecord, SubjectFilter, SubjectReport,
    run_subject,
};
use ingest::{CleanerConfig, TableReader};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Clean a raw article table and write the document table.
pub async fn run_clean(input: &Path, output: &Path) -> Result<usize> {
    let documents = ingest::clean_article_file(input, &CleanerConfig::default()).await?;
    write_documents(output, &documents)?;
    Ok(documents.len())
}

/// Run every configured subject against the lexicon and document table.
///
/// Subjects run as independent blocking tasks; reports come back in
/// configuration order.
pub async fn run_extraction(
    config: &AppConfig,
    lexicon_path: &Path,
    documents_path: &Path,
) -> Result<Vec<SubjectReport>> {
    let rows = TableReader::read_lexicon(lexicon_path).await?;
    let lexicon = Arc::new(CanonicalLexicon::from_entries(
        rows,
        &config.resolution.id_namespace,
    ));
    info!(entries = lexicon.len(), "Loaded canonical lexicon");

    let documents = TableReader::read_documents(documents_path).await?;
    let index: Arc<DocumentIndex> = Arc::new(
        documents
            .iter()
            .map(|d| (d.clean_abstract.clone(), d.provenance_id().to_string()))
            .collect(),
    );
    info!(documents = documents.len(), "Loaded document table");

    let extractor = Arc::new(HazardExtractor::new(
        MarkerSet::new(config.parsing.dialects.clone()),
        FallbackParser::new(config.parsing.nested_group_cap),
    ));
    let window = config.resolution.abbreviation_window;

    let mut handles = Vec::with_capacity(config.subjects.len());
    for subject in &config.subjects {
        let pairs = TableReader::read_responses(&subject.responses, &subject.prompt_variant)
            .await
            .with_context(|| format!("Failed to load responses for '{}'", subject.name))?;
        let records: Vec<ResponseRecord> = pairs
            .into_iter()
            .map(|(source, response)| ResponseRecord::new(response, source))
            .collect();
        let filter = SubjectFilter::new(&subject.name, &subject.synonyms);

        let lexicon = Arc::clone(&lexicon);
        let index = Arc::clone(&index);
        let extractor = Arc::clone(&extractor);
        handles.push(tokio::task::spawn_blocking(move || {
            let pipeline =
                EntityResolutionPipeline::with_resolver(&lexicon, ContextWindowResolver::new(window));
            run_subject(&extractor, &filter, &pipeline, &*index, &records)
        }));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        reports.push(handle.await.context("Subject task failed")?);
    }
    Ok(reports)
}
