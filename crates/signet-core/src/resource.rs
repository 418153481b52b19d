//! # Interaction Resources
//!
//! The read-only capability that supplies candidate directed interactions.
//!
//! The Connection Engine depends only on the `InteractionResource` trait;
//! each backing source (curated database, flat file, user table) is one
//! implementation. `TableResource` is the in-memory variant, which can also
//! be parsed from TSV or SIF text.
//!
//! Parsing is a pure transformation; reading files is the caller's job.

use crate::primitives::HIGH_CONFIDENCE_THRESHOLD;
use crate::{Accession, Confidence, Effect, EffectRecord, NetworkError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// INTERACTION
// =============================================================================

/// A directed interaction as supplied by a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: Accession,
    pub target: Accession,
    pub effect: Effect,
    pub interaction_type: Option<String>,
    /// Resource-provided consensus marker. Never recomputed.
    pub consensus: bool,
    /// Curated by the resource maintainers.
    pub curated: bool,
    pub confidence: Confidence,
    pub references: BTreeSet<String>,
    /// Source-type tag of the backing resource (e.g. "SIGNOR", "sif").
    pub source_tag: String,
}

impl Interaction {
    /// Create an interaction with no markers and no references.
    #[must_use]
    pub fn new(source: Accession, target: Accession, effect: Effect) -> Self {
        Self {
            source,
            target,
            effect,
            interaction_type: None,
            consensus: false,
            curated: false,
            confidence: Confidence::default(),
            references: BTreeSet::new(),
            source_tag: String::new(),
        }
    }

    #[must_use]
    pub fn with_consensus(mut self, consensus: bool) -> Self {
        self.consensus = consensus;
        self
    }

    #[must_use]
    pub fn with_curated(mut self, curated: bool) -> Self {
        self.curated = curated;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, evidence: u32) -> Self {
        self.confidence = Confidence::new(evidence);
        self
    }

    #[must_use]
    pub fn with_type(mut self, interaction_type: impl Into<String>) -> Self {
        self.interaction_type = Some(interaction_type.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.insert(reference.into());
        self
    }

    #[must_use]
    pub fn with_source_tag(mut self, tag: impl Into<String>) -> Self {
        self.source_tag = tag.into();
        self
    }

    /// Signed iff the effect is stimulation or inhibition.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.effect.is_signed()
    }

    /// Curated, or backed by at least `HIGH_CONFIDENCE_THRESHOLD` evidence items.
    #[must_use]
    pub fn is_high_confidence(&self) -> bool {
        self.curated || self.confidence.value() >= HIGH_CONFIDENCE_THRESHOLD
    }

    /// Convert into edge evidence.
    #[must_use]
    pub fn to_record(&self) -> EffectRecord {
        let mut record = EffectRecord::new(self.effect);
        record.interaction_types.extend(self.interaction_type.clone());
        record.references.extend(self.references.iter().cloned());
        if !self.source_tag.is_empty() {
            record.sources.insert(self.source_tag.clone());
        }
        record
    }
}

// =============================================================================
// RESOURCE TRAIT
// =============================================================================

/// Query shapes understood by every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceQuery {
    /// Interactions `source -> target`.
    Pair { source: Accession, target: Accession },
    /// Interactions whose source is any of the identifiers.
    Outgoing(Vec<Accession>),
    /// Interactions whose target is any of the identifiers.
    Incoming(Vec<Accession>),
}

/// A read-only supplier of directed interactions.
///
/// Implementations must be deterministic: the same query returns the same
/// interactions in the same order.
pub trait InteractionResource: Send + Sync + fmt::Debug {
    /// Answer a query.
    fn query(&self, query: &ResourceQuery) -> Vec<Interaction>;

    /// Whether the resource knows the identifier at all.
    fn knows(&self, id: &Accession) -> bool;

    /// Interactions `source -> target`.
    fn between(&self, source: &Accession, target: &Accession) -> Vec<Interaction> {
        self.query(&ResourceQuery::Pair {
            source: source.clone(),
            target: target.clone(),
        })
    }

    /// Interactions leaving `id`.
    fn outgoing(&self, id: &Accession) -> Vec<Interaction> {
        self.query(&ResourceQuery::Outgoing(vec![id.clone()]))
    }

    /// Interactions entering `id`.
    fn incoming(&self, id: &Accession) -> Vec<Interaction> {
        self.query(&ResourceQuery::Incoming(vec![id.clone()]))
    }
}

// =============================================================================
// TABLE RESOURCE
// =============================================================================

/// In-memory resource backed by a user-supplied interaction table.
#[derive(Debug, Clone, Default)]
pub struct TableResource {
    interactions: Vec<Interaction>,
    by_source: BTreeMap<Accession, Vec<usize>>,
    by_target: BTreeMap<Accession, Vec<usize>>,
}

impl TableResource {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interaction.
    pub fn insert(&mut self, interaction: Interaction) {
        let index = self.interactions.len();
        self.by_source
            .entry(interaction.source.clone())
            .or_default()
            .push(index);
        self.by_target
            .entry(interaction.target.clone())
            .or_default()
            .push(index);
        self.interactions.push(interaction);
    }

    /// Number of interactions in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// All interactions in insertion order.
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> + '_ {
        self.interactions.iter()
    }

    fn collect(
        &self,
        index: &BTreeMap<Accession, Vec<usize>>,
        ids: &[Accession],
    ) -> Vec<Interaction> {
        let positions: BTreeSet<usize> = ids
            .iter()
            .filter_map(|id| index.get(id))
            .flatten()
            .copied()
            .collect();
        positions
            .into_iter()
            .filter_map(|i| self.interactions.get(i).cloned())
            .collect()
    }

    /// Parse a tab-separated interaction table.
    ///
    /// Columns: `source target effect [consensus] [curated] [confidence]
    /// [type] [references] [source_tag]`. References are `;`-separated.
    /// Blank lines, `#` comments and a header row starting with `source`
    /// are skipped.
    pub fn from_tsv(text: &str) -> Result<Self, NetworkError> {
        let mut table = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if is_skippable(line) || line.to_ascii_lowercase().starts_with("source\t") {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [source, target, effect, rest @ ..] = columns.as_slice() else {
                return Err(line_error(number, "expected at least 3 tab-separated columns"));
            };

            let source =
                Accession::parse(source).map_err(|e| line_error(number, &e.to_string()))?;
            let target =
                Accession::parse(target).map_err(|e| line_error(number, &e.to_string()))?;
            let mut interaction = Interaction::new(source, target, Effect::from_label(effect));

            let column = |i: usize| rest.get(i).copied().filter(|c| !c.is_empty());
            if let Some(raw) = column(0) {
                interaction.consensus = parse_flag(raw)
                    .ok_or_else(|| line_error(number, "bad consensus flag"))?;
            }
            if let Some(raw) = column(1) {
                interaction.curated =
                    parse_flag(raw).ok_or_else(|| line_error(number, "bad curated flag"))?;
            }
            if let Some(raw) = column(2) {
                let evidence: u32 = raw
                    .parse()
                    .map_err(|_| line_error(number, "confidence must be a non-negative integer"))?;
                interaction.confidence = Confidence::new(evidence);
            }
            interaction.interaction_type = column(3).map(str::to_string);
            if let Some(raw) = column(4) {
                interaction.references = raw
                    .split(';')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            if let Some(tag) = column(5) {
                interaction.source_tag = tag.to_string();
            }
            table.insert(interaction);
        }
        Ok(table)
    }

    /// Parse SIF text: `source relation target [target ...]`.
    ///
    /// The relation label is mapped with `Effect::from_label` and kept as
    /// the interaction type. SIF carries no consensus or curation markers.
    pub fn from_sif(text: &str) -> Result<Self, NetworkError> {
        let mut table = Self::new();
        for (number, line) in text.lines().enumerate() {
            if is_skippable(line) {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [source, relation, targets @ ..] = fields.as_slice() else {
                return Err(line_error(number, "expected `source relation target`"));
            };
            if targets.is_empty() {
                return Err(line_error(number, "missing target"));
            }
            let source =
                Accession::parse(source).map_err(|e| line_error(number, &e.to_string()))?;
            for target in targets {
                let target =
                    Accession::parse(target).map_err(|e| line_error(number, &e.to_string()))?;
                table.insert(
                    Interaction::new(source.clone(), target, Effect::from_label(relation))
                        .with_type(*relation)
                        .with_reference("SIF file")
                        .with_source_tag("sif"),
                );
            }
        }
        Ok(table)
    }
}

impl FromIterator<Interaction> for TableResource {
    fn from_iter<I: IntoIterator<Item = Interaction>>(iter: I) -> Self {
        let mut table = Self::new();
        for interaction in iter {
            table.insert(interaction);
        }
        table
    }
}

impl InteractionResource for TableResource {
    fn query(&self, query: &ResourceQuery) -> Vec<Interaction> {
        match query {
            ResourceQuery::Pair { source, target } => self
                .collect(&self.by_source, std::slice::from_ref(source))
                .into_iter()
                .filter(|i| &i.target == target)
                .collect(),
            ResourceQuery::Outgoing(ids) => self.collect(&self.by_source, ids),
            ResourceQuery::Incoming(ids) => self.collect(&self.by_target, ids),
        }
    }

    fn knows(&self, id: &Accession) -> bool {
        self.by_source.contains_key(id) || self.by_target.contains_key(id)
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn line_error(number: usize, message: &str) -> NetworkError {
    NetworkError::DeserializationError(format!("line {}: {}", number.saturating_add(1), message))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    #[test]
    fn table_answers_all_query_shapes() {
        let table: TableResource = [
            Interaction::new(acc("A"), acc("B"), Effect::Stimulation),
            Interaction::new(acc("A"), acc("C"), Effect::Inhibition),
            Interaction::new(acc("C"), acc("B"), Effect::Undefined),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.between(&acc("A"), &acc("B")).len(), 1);
        assert_eq!(table.outgoing(&acc("A")).len(), 2);
        assert_eq!(table.incoming(&acc("B")).len(), 2);
        assert_eq!(
            table
                .query(&ResourceQuery::Incoming(vec![acc("B"), acc("C")]))
                .len(),
            3
        );
        assert!(table.knows(&acc("C")));
        assert!(!table.knows(&acc("Z")));
    }

    #[test]
    fn tsv_parses_markers_and_references() {
        let text = "source\ttarget\teffect\tconsensus\tcurated\tconfidence\ttype\treferences\tsource_tag\n\
                    # comment\n\
                    P1\tP2\tstimulation\ttrue\tfalse\t4\tphosphorylation\tPMID:1;PMID:2\tSIGNOR\n\
                    P2\tP3\tinhibition\n";
        let table = TableResource::from_tsv(text).expect("parse");
        assert_eq!(table.len(), 2);

        let first = table.between(&acc("P1"), &acc("P2"));
        let first = first.first().expect("interaction");
        assert!(first.consensus);
        assert!(first.is_high_confidence());
        assert_eq!(first.references.len(), 2);
        assert_eq!(first.source_tag, "SIGNOR");
        assert_eq!(first.to_record().sources.len(), 1);

        let second = table.between(&acc("P2"), &acc("P3"));
        assert_eq!(second.first().map(|i| i.effect), Some(Effect::Inhibition));
    }

    #[test]
    fn tsv_reports_line_of_bad_row() {
        let result = TableResource::from_tsv("A\tB\tstimulation\tmaybe\n");
        match result {
            Err(NetworkError::DeserializationError(message)) => {
                assert!(message.starts_with("line 1"));
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }
    }

    #[test]
    fn sif_expands_multiple_targets() {
        let table = TableResource::from_sif("A activate B C\nC -| A\n").expect("parse");
        assert_eq!(table.len(), 3);
        let back = table.between(&acc("C"), &acc("A"));
        assert_eq!(back.first().map(|i| i.effect), Some(Effect::Inhibition));
        assert!(TableResource::from_sif("A activate\n").is_err());
    }
}
