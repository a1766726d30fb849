use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Per-subject counters. Every skipped response or relation lands in exactly
/// one failure bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub responses: usize,
    pub not_recognized: usize,
    pub strict_parses: usize,
    pub flat_pair_recoveries: usize,
    pub nested_recoveries: usize,
    pub heuristic_mismatches: usize,
    pub shape_violations: usize,
    pub raw_relations: usize,
    pub resolved_relations: usize,
    pub abbreviation_expansions: usize,
    pub unresolved: usize,
    pub ambiguous_provenance: usize,
}

impl ExtractionStats {
    pub fn record_failure(&mut self, error: &ExtractError) {
        match error {
            ExtractError::FormatNotRecognized => self.not_recognized += 1,
            // a literal that failed both the strict parse and the fallbacks
            ExtractError::LiteralParseFailure { .. } | ExtractError::HeuristicMismatch => {
                self.heuristic_mismatches += 1
            }
            ExtractError::ShapeViolation(_) => self.shape_violations += 1,
            ExtractError::UnresolvedEntity(_) => self.unresolved += 1,
        }
    }

    /// Responses that produced a mapping.
    pub fn parsed(&self) -> usize {
        self.strict_parses + self.flat_pair_recoveries + self.nested_recoveries
    }

    pub fn merge(&mut self, other: &ExtractionStats) {
        self.responses += other.responses;
        self.not_recognized += other.not_recognized;
        self.strict_parses += other.strict_parses;
        self.flat_pair_recoveries += other.flat_pair_recoveries;
        self.nested_recoveries += other.nested_recoveries;
        self.heuristic_mismatches += other.heuristic_mismatches;
        self.shape_violations += other.shape_violations;
        self.raw_relations += other.raw_relations;
        self.resolved_relations += other.resolved_relations;
        self.abbreviation_expansions += other.abbreviation_expansions;
        self.unresolved += other.unresolved;
        self.ambiguous_provenance += other.ambiguous_provenance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_land_in_one_bucket() {
        let mut stats = ExtractionStats::default();
        stats.record_failure(&ExtractError::FormatNotRecognized);
        stats.record_failure(&ExtractError::HeuristicMismatch);
        stats.record_failure(&ExtractError::ShapeViolation("empty mapping"));
        stats.record_failure(&ExtractError::UnresolvedEntity("xyz".into()));
        assert_eq!(stats.not_recognized, 1);
        assert_eq!(stats.heuristic_mismatches, 1);
        assert_eq!(stats.shape_violations, 1);
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn test_merge_adds_counters() {
        let mut a = ExtractionStats {
            responses: 2,
            strict_parses: 1,
            ..Default::default()
        };
        let b = ExtractionStats {
            responses: 3,
            nested_recoveries: 2,
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.responses, 5);
        assert_eq!(a.parsed(), 3);
    }
}
