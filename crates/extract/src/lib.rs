pub mod abbreviation;
pub mod batch;
pub mod dialect;
pub mod error;
pub mod fallback;
pub mod lexicon;
pub mod literal;
pub mod normalizer;
pub mod pipeline;
pub mod provenance;
pub mod relation;
pub mod schema;
pub mod stats;

pub use abbreviation::{AbbreviationResolver, ContextWindowResolver};
pub use batch::{SubjectReport, run_subject};
pub use dialect::{Dialect, LiteralOutcome, MarkerSet, StructuredLiteralExtractor};
pub use error::ExtractError;
pub use fallback::{FallbackParser, Recovery};
pub use lexicon::CanonicalLexicon;
pub use pipeline::{EntityResolutionPipeline, EvidenceTable, Resolution};
pub use provenance::{DocumentIndex, DocumentLookup, ProvenanceLookup};
pub use relation::{MappingShape, RelationExtractor, SubjectFilter};
pub use schema::{EvidenceRow, ParsedMapping, RawRelation, ResolvedEntity, ResponseRecord, SourceText};
pub use stats::ExtractionStats;

use relation::mapping_from_literal;

/// How a response's mapping was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePath {
    Strict(MappingShape),
    FlatPairs,
    NestedGroups,
}

/// Turns one generator response into a typed mapping.
///
/// Marker search and strict parsing come first; a marker whose literal
/// fails the strict parse is handed to the fallback heuristics.
#[derive(Debug, Clone, Default)]
pub struct HazardExtractor {
    literal: StructuredLiteralExtractor,
    fallback: FallbackParser,
}

impl HazardExtractor {
    pub fn new(markers: MarkerSet, fallback: FallbackParser) -> Self {
        Self {
            literal: StructuredLiteralExtractor::new(markers),
            fallback,
        }
    }

    pub fn parse_response(&self, response: &str) -> Result<(ParsedMapping, ParsePath), ExtractError> {
        match self.literal.extract(response) {
            LiteralOutcome::NotRecognized => Err(ExtractError::FormatNotRecognized),
            LiteralOutcome::Parsed { value, .. } => {
                let (mapping, shape) = mapping_from_literal(&value)?;
                Ok((mapping, ParsePath::Strict(shape)))
            }
            LiteralOutcome::Malformed { located, error } => {
                tracing::trace!(dialect = ?located.dialect, %error, "Strict parse failed, trying fallbacks");
                let (mapping, recovery) = self.fallback.recover(&located.text)?;
                let path = match recovery {
                    Recovery::FlatPairs => ParsePath::FlatPairs,
                    Recovery::NestedGroups => ParsePath::NestedGroups,
                };
                Ok((mapping, path))
            }
        }
    }

    /// Relations for one subject asserted by `response`, attributed to
    /// `provenance`.
    pub fn extract_relations(
        &self,
        response: &str,
        filter: &SubjectFilter,
        provenance: &SourceText,
    ) -> Result<Vec<RawRelation>, ExtractError> {
        let (mapping, _) = self.parse_response(response)?;
        Ok(RelationExtractor::extract(&mapping, filter, provenance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::DEFAULT_NAMESPACE;
    use std::cell::Cell;

    fn pairs(relations: &[RawRelation]) -> Vec<(String, String)> {
        relations
            .iter()
            .map(|r| (r.subject.clone(), r.mention.clone()))
            .collect()
    }

    fn source() -> SourceText {
        "an abstract about food hazards".into()
    }

    #[test]
    fn test_fenced_dairy_scenario() {
        let extractor = HazardExtractor::default();
        let filter = SubjectFilter::new("dairy", ["dairy"]);
        let relations = extractor
            .extract_relations(
                "```{'dairy products': ['aflatoxin', 'lead']}```",
                &filter,
                &source(),
            )
            .unwrap();
        assert_eq!(
            pairs(&relations),
            vec![
                ("dairy products".to_string(), "aflatoxin".to_string()),
                ("dairy products".to_string(), "lead".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_group_scenario() {
        let extractor = HazardExtractor::default();
        let filter = SubjectFilter::new("fish", ["fish"]);
        let response =
            "Dictionary: {fish: {se : [], hg: []}, tilapia: {heptachlor: [], mycotoxin: []}}";

        let (_, path) = extractor.parse_response(response).unwrap();
        assert_eq!(path, ParsePath::NestedGroups);

        let relations = extractor.extract_relations(response, &filter, &source()).unwrap();
        assert_eq!(
            pairs(&relations),
            vec![
                ("fish".to_string(), "se".to_string()),
                ("fish".to_string(), "hg".to_string()),
            ]
        );
    }

    #[test]
    fn test_unrecognized_response_yields_nothing() {
        let extractor = HazardExtractor::default();
        let filter = SubjectFilter::new("dairy", ["dairy"]);
        let response = "I could not find any hazards in this abstract.";
        assert_eq!(
            extractor.parse_response(response).unwrap_err(),
            ExtractError::FormatNotRecognized
        );
        assert!(extractor.extract_relations(response, &filter, &source()).is_err());
    }

    #[test]
    fn test_unrecognized_and_mismatch_are_distinct() {
        let extractor = HazardExtractor::default();
        assert_eq!(
            extractor.parse_response("Dictionary: {dairy; lead}").unwrap_err(),
            ExtractError::HeuristicMismatch
        );
        assert_eq!(
            extractor.parse_response("dairy; lead").unwrap_err(),
            ExtractError::FormatNotRecognized
        );
    }

    #[test]
    fn test_bare_literal_with_end_token() {
        let extractor = HazardExtractor::default();
        let (mapping, path) = extractor
            .parse_response("{'Salmon': ['PCBs', 'Dioxins']}</s>")
            .unwrap();
        assert_eq!(path, ParsePath::Strict(MappingShape::ListValued));
        assert_eq!(mapping.entries()[0].key, "salmon");
        assert_eq!(mapping.entries()[0].values, vec!["pcbs", "dioxins"]);
    }

    #[test]
    fn test_flat_pairs_reject_partial_parse() {
        let extractor = HazardExtractor::default();
        let filter = SubjectFilter::new("maize", ["maize", "corn"]);
        let relations = extractor
            .extract_relations("Dictionary: {maize: fumonisin, corn: zearalenone}", &filter, &source())
            .unwrap();
        assert_eq!(relations.len(), 2);

        let err = extractor
            .extract_relations("Dictionary: {maize: fumonisin, zearalenone}", &filter, &source())
            .unwrap_err();
        assert_eq!(err, ExtractError::HeuristicMismatch);
    }

    #[test]
    fn test_configured_markers_only() {
        let extractor = HazardExtractor::new(
            MarkerSet::new(vec![Dialect::DictionaryHeader]),
            FallbackParser::default(),
        );
        assert_eq!(
            extractor.parse_response("```{'maize': ['zen']}```").unwrap_err(),
            ExtractError::FormatNotRecognized
        );
    }

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl AbbreviationResolver for CountingResolver {
        fn resolve(&self, mention: &str, source: &str, lexicon: &CanonicalLexicon) -> String {
            self.calls.set(self.calls.get() + 1);
            ContextWindowResolver::default().resolve(mention, source, lexicon)
        }
    }

    #[test]
    fn test_direct_hit_end_to_end() {
        let lexicon = CanonicalLexicon::from_entries([("leafy-greens", "7")], DEFAULT_NAMESPACE);
        let pipeline = EntityResolutionPipeline::with_resolver(
            &lexicon,
            CountingResolver { calls: Cell::new(0) },
        );
        let filter = SubjectFilter::new("leafy", ["leafy"]);
        let relations = HazardExtractor::default()
            .extract_relations("Dictionary: {'leafy vegetables': ['leafy-greens']}", &filter, &source())
            .unwrap();

        let mut table = EvidenceTable::new();
        let mut stats = ExtractionStats::default();
        pipeline.resolve_into(&relations, &DocumentIndex::new(), &mut table, &mut stats);

        assert_eq!(pipeline.resolver().calls.get(), 0);
        assert_eq!(table.get("CHEBI:7").unwrap().surface_forms, vec!["leafy-greens"]);
        // source text was never indexed
        assert_eq!(table.get("CHEBI:7").unwrap().provenance_ids, vec![""]);
    }
}
