//! Identifier index over clause results

use crate::model::ClauseResult;
use octofhir_fqm_diagnostics::Diagnostic;
use std::collections::HashMap;

/// Lookup from node identifier to clause outcome, built once per group
///
/// Lookup misses are normal: an expression node with no outcome record
/// renders as unannotated. Duplicate identifiers are not expected within
/// a group; when present the last record wins and the duplicates are
/// reported through [`ClauseResultIndex::warnings`] so callers can
/// surface the data-quality issue without changing any verdict.
#[derive(Debug)]
pub struct ClauseResultIndex<'a> {
    by_id: HashMap<&'a str, &'a ClauseResult>,
    duplicates: Vec<String>,
}

impl<'a> ClauseResultIndex<'a> {
    /// Build the index in linear time
    pub fn new(clauses: &'a [ClauseResult]) -> Self {
        let mut by_id = HashMap::with_capacity(clauses.len());
        let mut duplicates = Vec::new();
        for clause in clauses {
            if by_id.insert(clause.local_id.as_str(), clause).is_some() {
                duplicates.push(clause.local_id.clone());
            }
        }
        Self { by_id, duplicates }
    }

    /// Look up the outcome record for an identifier
    pub fn get(&self, local_id: &str) -> Option<&'a ClauseResult> {
        self.by_id.get(local_id).copied()
    }

    /// Identifiers that occurred more than once, in input order
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Data-quality warnings for duplicate identifiers
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.duplicates
            .iter()
            .map(|id| {
                Diagnostic::warning(format!(
                    "duplicate clause identifier `{id}`: last record wins"
                ))
            })
            .collect()
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the group produced no clause results at all
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
