//! Mention canonicalization and per-identifier evidence aggregation.

use crate::abbreviation::{AbbreviationResolver, ContextWindowResolver};
use crate::error::ExtractError;
use crate::lexicon::CanonicalLexicon;
use crate::normalizer::normalize_mention;
use crate::provenance::{DocumentLookup, ProvenanceLookup};
use crate::schema::{EvidenceRow, RawRelation, ResolvedEntity};
use crate::stats::ExtractionStats;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A mention that reached a canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub canonical_id: String,
    /// The normalized mention as it appeared in generator output.
    pub surface_form: String,
    /// True when the identifier was only found through abbreviation expansion.
    pub expanded: bool,
}

pub struct EntityResolutionPipeline<'a, R = ContextWindowResolver> {
    lexicon: &'a CanonicalLexicon,
    resolver: R,
}

impl<'a> EntityResolutionPipeline<'a> {
    pub fn new(lexicon: &'a CanonicalLexicon) -> Self {
        Self::with_resolver(lexicon, ContextWindowResolver::default())
    }
}

impl<'a, R: AbbreviationResolver> EntityResolutionPipeline<'a, R> {
    pub fn with_resolver(lexicon: &'a CanonicalLexicon, resolver: R) -> Self {
        Self { lexicon, resolver }
    }

    pub fn lexicon(&self) -> &CanonicalLexicon {
        self.lexicon
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Normalize `mention` and find its canonical identifier.
    ///
    /// A direct hit (by name or by identifier) never consults the
    /// abbreviation resolver.
    pub fn resolve_mention(&self, mention: &str, source: &str) -> Result<Resolution, ExtractError> {
        let surface_form = normalize_mention(mention);
        if surface_form.is_empty() {
            return Err(ExtractError::UnresolvedEntity(mention.to_string()));
        }

        if let Some(id) = self.lexicon.resolve_direct(&surface_form) {
            return Ok(Resolution {
                canonical_id: id.to_string(),
                surface_form,
                expanded: false,
            });
        }

        let expanded = self.resolver.resolve(&surface_form, source, self.lexicon);
        match self.lexicon.lookup(&expanded) {
            Some(id) => Ok(Resolution {
                canonical_id: id.to_string(),
                surface_form,
                expanded: true,
            }),
            None => Err(ExtractError::UnresolvedEntity(surface_form)),
        }
    }

    /// Resolve every relation and record the survivors in `table`.
    pub fn resolve_into(
        &self,
        relations: &[RawRelation],
        documents: &dyn DocumentLookup,
        table: &mut EvidenceTable,
        stats: &mut ExtractionStats,
    ) {
        for relation in relations {
            stats.raw_relations += 1;

            let resolution = match self.resolve_mention(&relation.mention, &relation.provenance) {
                Ok(resolution) => resolution,
                Err(err) => {
                    debug!(
                        subject = %relation.subject,
                        mention = %relation.mention,
                        reason = err.kind(),
                        "Dropping relation"
                    );
                    stats.record_failure(&err);
                    continue;
                }
            };

            let lookup = documents.lookup(&relation.provenance);
            if let ProvenanceLookup::Ambiguous { matches } = lookup {
                warn!(
                    canonical_id = %resolution.canonical_id,
                    matches,
                    "Ambiguous provenance, recording empty identifier"
                );
                stats.ambiguous_provenance += 1;
            }

            if resolution.expanded {
                stats.abbreviation_expansions += 1;
            }
            stats.resolved_relations += 1;
            table.record(&resolution.canonical_id, &resolution.surface_form, lookup.into_id());
        }
    }
}

/// Evidence grouped by canonical identifier, iterated in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceTable {
    entities: BTreeMap<String, ResolvedEntity>,
}

impl EvidenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, canonical_id: &str, surface_form: &str, provenance_id: String) {
        self.entities
            .entry(canonical_id.to_string())
            .or_insert_with(|| ResolvedEntity::new(canonical_id))
            .record(surface_form, provenance_id);
    }

    /// Fold in a table built from a later partition of the same input.
    pub fn merge(&mut self, other: EvidenceTable) {
        for (id, entity) in other.entities {
            match self.entities.get_mut(&id) {
                Some(existing) => existing.absorb(entity),
                None => {
                    self.entities.insert(id, entity);
                }
            }
        }
    }

    pub fn get(&self, canonical_id: &str) -> Option<&ResolvedEntity> {
        self.entities.get(canonical_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &ResolvedEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Export rows with surface forms and provenance ids joined by `delimiter`.
    pub fn rows(&self, delimiter: &str) -> Vec<EvidenceRow> {
        self.entities()
            .map(|entity| EvidenceRow {
                canonical_id: entity.canonical_id.clone(),
                surface_forms: entity.surface_forms.join(delimiter),
                provenance_ids: entity.provenance_ids.join(delimiter),
                eval: String::new(),
            })
            .collect()
    }
}
