// src/extractors/duration.rs
use crate::extractors::patterns::{PatternTable, DURATION_PATTERNS};
use crate::utils::error::ExtractError;

/// Pulls the first duration phrase ("for the last 3 days", "since monday",
/// "two weeks ago") out of the transcript.
///
/// The captured words are not checked for meaning. "the past three thingies"
/// yields "three thingies".
#[derive(Debug)]
pub struct DurationExtractor {
    table: PatternTable,
}

impl DurationExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            table: PatternTable::compile(DURATION_PATTERNS)?,
        })
    }

    pub fn extract(&self, normalized: &str) -> Option<String> {
        self.table
            .first_valid(normalized, |capture| Some(collapse_whitespace(capture)))
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
