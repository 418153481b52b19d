//! # Identifier Translation
//!
//! Read-only capability normalizing user-facing identifiers (gene symbols,
//! aliases) to canonical accessions and providing display labels.

use crate::{Accession, NetworkError};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier translation collaborator.
pub trait IdentifierTranslator: Send + Sync + fmt::Debug {
    /// Resolve a raw identifier to its canonical accession.
    fn to_canonical(&self, identifier: &str) -> Result<Accession, NetworkError>;

    /// Display label for a canonical accession.
    fn label_for(&self, _canonical: &Accession) -> Option<String> {
        None
    }
}

/// Accepts every well-formed identifier as already canonical.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl IdentifierTranslator for IdentityTranslator {
    fn to_canonical(&self, identifier: &str) -> Result<Accession, NetworkError> {
        Accession::parse(identifier)
    }
}

/// Alias table translator.
///
/// Lookups try, in order: an exact alias, a case-insensitive alias, a
/// registered canonical accession. Unknown identifiers pass through as-is
/// unless the table is strict.
#[derive(Debug, Clone, Default)]
pub struct TableTranslator {
    aliases: BTreeMap<String, Accession>,
    folded: BTreeMap<String, Accession>,
    labels: BTreeMap<Accession, String>,
    strict: bool,
}

impl TableTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject identifiers that are neither aliases nor registered accessions.
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Register a canonical accession with its display label.
    /// The label itself becomes an alias.
    pub fn insert(&mut self, canonical: Accession, label: &str) {
        self.add_alias(label, canonical.clone());
        self.labels.insert(canonical, label.to_string());
    }

    /// Register an additional alias.
    pub fn add_alias(&mut self, alias: &str, canonical: Accession) {
        self.folded
            .insert(alias.to_ascii_uppercase(), canonical.clone());
        self.aliases.insert(alias.to_string(), canonical);
    }

    /// Parse a tab-separated mapping table: `accession label [alias,alias...]`.
    pub fn from_tsv(text: &str) -> Result<Self, NetworkError> {
        let mut table = Self::new();
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let columns: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
            let (canonical, label, aliases) = match columns.as_slice() {
                [canonical, label] => (*canonical, *label, ""),
                [canonical, label, aliases] => (*canonical, *label, *aliases),
                _ => {
                    return Err(NetworkError::DeserializationError(format!(
                        "line {}: expected `accession<TAB>label[<TAB>aliases]`",
                        number.saturating_add(1)
                    )));
                }
            };
            let canonical = Accession::parse(canonical)?;
            table.insert(canonical.clone(), label);
            for alias in aliases.split(',').map(str::trim).filter(|a| !a.is_empty()) {
                table.add_alias(alias, canonical.clone());
            }
        }
        Ok(table)
    }
}

impl IdentifierTranslator for TableTranslator {
    fn to_canonical(&self, identifier: &str) -> Result<Accession, NetworkError> {
        let trimmed = identifier.trim();
        if let Some(canonical) = self
            .aliases
            .get(trimmed)
            .or_else(|| self.folded.get(&trimmed.to_ascii_uppercase()))
        {
            return Ok(canonical.clone());
        }

        let parsed = Accession::parse(trimmed)?;
        if self.labels.contains_key(&parsed) || !self.strict {
            Ok(parsed)
        } else {
            Err(NetworkError::UnresolvedIdentifier(trimmed.to_string()))
        }
    }

    fn label_for(&self, canonical: &Accession) -> Option<String> {
        self.labels.get(canonical).cloned()
    }
}
