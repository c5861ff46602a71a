// src/extractors/age.rs
use crate::extractors::patterns::{PatternTable, AGE_PATTERNS};
use crate::utils::error::ExtractError;

pub const MIN_AGE: u8 = 0;
pub const MAX_AGE: u8 = 120;

/// Finds the patient's age from phrases like "45-year-old" or "I'm 45".
#[derive(Debug)]
pub struct AgeExtractor {
    table: PatternTable,
}

impl AgeExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            table: PatternTable::compile(AGE_PATTERNS)?,
        })
    }

    /// Returns the first age that both matches a rule and lies in
    /// `MIN_AGE..=MAX_AGE`. A non-numeric or out-of-range capture only
    /// disqualifies the rule that produced it.
    pub fn extract(&self, normalized: &str) -> Option<u8> {
        self.table.first_valid(normalized, parse_age)
    }
}

fn parse_age(capture: &str) -> Option<u8> {
    // \d also matches non-ASCII digits, which do not parse.
    let value: u32 = capture.parse().ok()?;
    u8::try_from(value)
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
}
