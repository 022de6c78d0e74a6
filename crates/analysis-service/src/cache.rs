//! In-memory evaluation cache keyed by canonical position string.
//!
//! Entries live for the lifetime of the loaded game; a new game load clears
//! the cache wholesale. Failed evaluations are cached as values too, so a
//! revisit does not retry a collaborator that already said no.

use std::collections::HashMap;

use crate::stockfish::PositionAnalysis;

/// Either a finished evaluation or the reason it was unavailable.
pub type EvalOutcome = Result<PositionAnalysis, String>;

#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: HashMap<String, EvalOutcome>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fen: &str) -> Option<&EvalOutcome> {
        self.entries.get(fen)
    }

    /// Store an outcome for `fen`. The first write wins; a position that
    /// already has an outcome keeps it, so repeated requests short-circuit.
    pub fn insert(&mut self, fen: &str, outcome: EvalOutcome) {
        self.entries.entry(fen.to_string()).or_insert(outcome);
    }

    /// Return the cached outcome for `fen`, computing and storing it on miss.
    pub fn get_or_compute<F>(&mut self, fen: &str, compute: F) -> &EvalOutcome
    where
        F: FnOnce(&str) -> EvalOutcome,
    {
        if !self.entries.contains_key(fen) {
            let outcome = compute(fen);
            self.entries.insert(fen.to_string(), outcome);
        }
        &self.entries[fen]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
