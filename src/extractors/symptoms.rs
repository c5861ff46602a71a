// src/extractors/symptoms.rs
use crate::extractors::patterns::SYMPTOM_VOCABULARY;
use crate::utils::error::ExtractError;
use regex::Regex;

#[derive(Debug)]
struct VocabularyEntry {
    term: &'static str,
    regex: Regex,
}

/// Scans the whole transcript once per vocabulary entry. Every entry is tested
/// on its own, so "pain"-style overlaps like "chest pain" and "back pain" can
/// both hit.
#[derive(Debug)]
pub struct SymptomExtractor {
    entries: Vec<VocabularyEntry>,
}

impl SymptomExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_vocabulary(SYMPTOM_VOCABULARY)
    }

    pub fn with_vocabulary(vocabulary: &[&'static str]) -> Result<Self, ExtractError> {
        let mut entries: Vec<VocabularyEntry> = Vec::with_capacity(vocabulary.len());
        for &term in vocabulary {
            if entries.iter().any(|e| e.term == term) {
                tracing::warn!("Duplicate vocabulary entry '{}' ignored", term);
                continue;
            }
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            let regex = Regex::new(&pattern).map_err(|source| ExtractError::InvalidPattern {
                name: term.to_string(),
                source,
            })?;
            entries.push(VocabularyEntry { term, regex });
        }
        Ok(Self { entries })
    }

    /// Matched terms in vocabulary order, each at most once.
    pub fn extract(&self, normalized: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.regex.is_match(normalized))
            .map(|entry| entry.term.to_string())
            .collect()
    }

    pub fn vocabulary(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.term)
    }
}
