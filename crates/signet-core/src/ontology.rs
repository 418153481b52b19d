//! # Ontology Lookup
//!
//! Read-only capability mapping ontology terms to annotated genes and
//! answering tissue-expression questions. Used by phenotype attachment.

use crate::{Accession, NetworkError};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Ontology collaborator.
pub trait Ontology: Send + Sync + fmt::Debug {
    /// Gene identifiers annotated with the term (not yet canonicalized).
    fn genes_for_term(&self, term: &str) -> Result<BTreeSet<String>, NetworkError>;

    /// For each gene, whether it is annotated as expressed in the tissue.
    fn check_tissue_annotation(&self, genes: &[Accession], tissue: &str)
    -> BTreeMap<Accession, bool>;

    /// Human-readable label of a term, if known.
    fn term_label(&self, _term: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Default)]
struct TermEntry {
    label: Option<String>,
    genes: BTreeSet<String>,
}

/// In-memory ontology built from explicit term and tissue tables.
#[derive(Debug, Clone, Default)]
pub struct StaticOntology {
    terms: BTreeMap<String, TermEntry>,
    tissues: BTreeMap<String, BTreeSet<Accession>>,
}

impl StaticOntology {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a term with its label and annotated genes.
    /// Registering the same term again extends its gene set.
    pub fn insert_term<I, S>(&mut self, term: &str, label: Option<&str>, genes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.terms.entry(term.to_string()).or_default();
        if let Some(label) = label {
            entry.label = Some(label.to_string());
        }
        entry.genes.extend(genes.into_iter().map(Into::into));
    }

    /// Register genes expressed in a tissue.
    pub fn insert_tissue<I>(&mut self, tissue: &str, genes: I)
    where
        I: IntoIterator<Item = Accession>,
    {
        self.tissues
            .entry(tissue.to_ascii_lowercase())
            .or_default()
            .extend(genes);
    }

    /// Parse a tab-separated term table: `term label gene[,gene...]`.
    pub fn from_tsv(text: &str) -> Result<Self, NetworkError> {
        let mut ontology = Self::new();
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [term, label, genes] = columns.as_slice() else {
                return Err(NetworkError::DeserializationError(format!(
                    "line {}: expected `term<TAB>label<TAB>genes`",
                    number.saturating_add(1)
                )));
            };
            let label = Some(*label).filter(|l| !l.is_empty());
            ontology.insert_term(
                term,
                label,
                genes.split(',').map(str::trim).filter(|g| !g.is_empty()),
            );
        }
        Ok(ontology)
    }
}

impl Ontology for StaticOntology {
    fn genes_for_term(&self, term: &str) -> Result<BTreeSet<String>, NetworkError> {
        self.terms
            .get(term)
            .map(|entry| entry.genes.clone())
            .ok_or_else(|| NetworkError::UnknownTerm(term.to_string()))
    }

    fn check_tissue_annotation(
        &self,
        genes: &[Accession],
        tissue: &str,
    ) -> BTreeMap<Accession, bool> {
        let expressed = self.tissues.get(&tissue.to_ascii_lowercase());
        genes
            .iter()
            .map(|gene| {
                let hit = expressed.is_some_and(|set| set.contains(gene));
                (gene.clone(), hit)
            })
            .collect()
    }

    fn term_label(&self, term: &str) -> Option<String> {
        self.terms.get(term).and_then(|entry| entry.label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acc(s: &str) -> Accession {
        Accession::parse(s).expect("valid accession")
    }

    #[test]
    fn unknown_term_is_an_error() {
        let ontology = StaticOntology::new();
        assert!(matches!(
            ontology.genes_for_term("GO:0000001"),
            Err(NetworkError::UnknownTerm(_))
        ));
    }

    #[test]
    fn tsv_terms_and_labels() {
        let ontology =
            StaticOntology::from_tsv("GO:0006915\tapoptotic process\tP1, P2,P3\n").expect("parse");
        assert_eq!(
            ontology.genes_for_term("GO:0006915").expect("term").len(),
            3
        );
        assert_eq!(
            ontology.term_label("GO:0006915").as_deref(),
            Some("apoptotic process")
        );
    }

    #[test]
    fn tissue_annotation_is_case_insensitive() {
        let mut ontology = StaticOntology::new();
        ontology.insert_tissue("Liver", [acc("P1")]);

        let answer = ontology.check_tissue_annotation(&[acc("P1"), acc("P2")], "liver");
        assert_eq!(answer.get(&acc("P1")), Some(&true));
        assert_eq!(answer.get(&acc("P2")), Some(&false));
    }
}
