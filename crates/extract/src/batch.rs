use crate::abbreviation::AbbreviationResolver;
use crate::pipeline::{EntityResolutionPipeline, EvidenceTable};
use crate::provenance::DocumentLookup;
use crate::relation::{RelationExtractor, SubjectFilter};
use crate::schema::ResponseRecord;
use crate::stats::ExtractionStats;
use crate::{HazardExtractor, ParsePath};
use tracing::{debug, info};

/// Everything one subject run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectReport {
    pub subject: String,
    pub table: EvidenceTable,
    pub stats: ExtractionStats,
}

impl SubjectReport {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            table: EvidenceTable::new(),
            stats: ExtractionStats::default(),
        }
    }

    /// Fold in the report for a later partition of the same subject.
    pub fn merge(&mut self, other: SubjectReport) {
        self.table.merge(other.table);
        self.stats.merge(&other.stats);
    }
}

/// Parse, filter and resolve every response for one subject.
///
/// Malformed or unrecognized responses are counted and skipped; the run
/// itself cannot fail.
pub fn run_subject<R: AbbreviationResolver>(
    extractor: &HazardExtractor,
    filter: &SubjectFilter,
    pipeline: &EntityResolutionPipeline<'_, R>,
    documents: &dyn DocumentLookup,
    records: &[ResponseRecord],
) -> SubjectReport {
    let mut report = SubjectReport::new(filter.name());

    for (idx, record) in records.iter().enumerate() {
        report.stats.responses += 1;

        let (mapping, path) = match extractor.parse_response(&record.response) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(
                    subject = filter.name(),
                    response = idx,
                    reason = err.kind(),
                    "Skipping response"
                );
                report.stats.record_failure(&err);
                continue;
            }
        };

        match path {
            ParsePath::Strict(_) => report.stats.strict_parses += 1,
            ParsePath::FlatPairs => report.stats.flat_pair_recoveries += 1,
            ParsePath::NestedGroups => report.stats.nested_recoveries += 1,
        }

        let relations = RelationExtractor::extract(&mapping, filter, &record.source);
        pipeline.resolve_into(&relations, documents, &mut report.table, &mut report.stats);
    }

    info!(
        subject = filter.name(),
        responses = report.stats.responses,
        parsed = report.stats.parsed(),
        relations = report.stats.raw_relations,
        resolved = report.stats.resolved_relations,
        entities = report.table.len(),
        "Subject run complete"
    );

    report
}
