use anyhow::{Context, Result};
use extract::{ExtractionStats, SubjectReport};
use ingest::Document;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub rows: usize,
    pub stats: ExtractionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub subjects: Vec<SubjectSummary>,
    pub total_rows: usize,
}

impl ExportSummary {
    pub fn from_reports(reports: &[SubjectReport]) -> Self {
        let subjects: Vec<SubjectSummary> = reports
            .iter()
            .map(|report| SubjectSummary {
                subject: report.subject.clone(),
                rows: report.table.len(),
                stats: report.stats.clone(),
            })
            .collect();
        let total_rows = subjects.iter().map(|s| s.rows).sum();
        Self { subjects, total_rows }
    }
}

/// Subject names become file names; keep them to a safe character set.
fn file_stem(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// `<dir>/<subject>.csv` with one row per canonical identifier.
pub fn write_subject_csv(dir: &Path, report: &SubjectReport, delimiter: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", file_stem(&report.subject)));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    let rows = report.table.rows(delimiter);
    if rows.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record(["canonical_id", "surface_forms", "provenance_ids", "eval"])?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().with_context(|| format!("Failed to write {:?}", path))?;

    info!(subject = %report.subject, rows = rows.len(), path = ?path, "Wrote subject table");
    Ok(path)
}

pub fn write_summary(dir: &Path, reports: &[SubjectReport]) -> Result<PathBuf> {
    let path = dir.join("summary.json");
    let summary = ExportSummary::from_reports(reports);
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Every subject table plus the summary, creating `dir` when needed.
pub fn write_all(dir: &Path, reports: &[SubjectReport], delimiter: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let mut written = Vec::with_capacity(reports.len() + 1);
    for report in reports {
        written.push(write_subject_csv(dir, report, delimiter)?);
    }
    written.push(write_summary(dir, reports)?);
    Ok(written)
}

/// Cleaned corpus as `doc_id,doi,clean_abstract`.
pub fn write_documents(path: &Path, documents: &[Document]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    if documents.is_empty() {
        writer.write_record(["doc_id", "doi", "clean_abstract"])?;
    }
    for document in documents {
        writer.serialize(document)?;
    }
    writer.flush().with_context(|| format!("Failed to write {:?}", path))?;
    info!(documents = documents.len(), path = ?path, "Wrote cleaned documents");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report() -> SubjectReport {
        let mut report = SubjectReport::new("leafy greens");
        report.table.record("CHEBI:25016", "lead", "10.1/a".to_string());
        report.table.record("CHEBI:25016", "pb", String::new());
        report.table.record("CHEBI:22977", "cadmium", "10.1/b".to_string());
        report.stats.responses = 3;
        report
    }

    #[test]
    fn test_subject_csv_layout() {
        let dir = TempDir::new().unwrap();
        let path = write_subject_csv(dir.path(), &report(), "|").unwrap();
        assert!(path.ends_with("leafy_greens.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "canonical_id,surface_forms,provenance_ids,eval");
        assert_eq!(lines[1], "CHEBI:22977,cadmium,10.1/b,");
        assert_eq!(lines[2], "CHEBI:25016,lead|pb,10.1/a|,");
    }

    #[test]
    fn test_empty_subject_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = write_subject_csv(dir.path(), &SubjectReport::new("maize"), "|").unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.trim(), "canonical_id,surface_forms,provenance_ids,eval");
    }

    #[test]
    fn test_write_all_with_summary() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/out");
        let written = write_all(&out, &[report(), SubjectReport::new("maize")], "|").unwrap();
        assert_eq!(written.len(), 3);

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["total_rows"], 2);
        assert_eq!(summary["subjects"][0]["subject"], "leafy greens");
        assert_eq!(summary["subjects"][0]["stats"]["responses"], 3);
    }

    #[test]
    fn test_write_documents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean.csv");
        let documents = vec![
            Document::new("0", Some("10.1/a".to_string()), "Lead, in rice."),
            Document::new("1", None, "Arsenic."),
        ];
        write_documents(&path, &documents).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "doc_id,doi,clean_abstract");
        assert_eq!(lines[1], "0,10.1/a,\"Lead, in rice.\"");
        assert_eq!(lines[2], "1,,Arsenic.");
    }
}
