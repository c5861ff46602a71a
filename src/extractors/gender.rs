// src/extractors/gender.rs
use crate::extractors::patterns::{PatternTable, GENDER_PATTERNS};
use crate::utils::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Maps a cue word to its canonical value.
    pub fn from_cue(cue: &str) -> Option<Self> {
        match cue.to_lowercase().as_str() {
            "male" | "man" | "boy" | "gentleman" | "he" | "him" | "his" => Some(Self::Male),
            "female" | "woman" | "girl" | "lady" | "she" | "her" | "hers" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves gender by pattern-group precedence, not by text position: a male
/// cue anywhere beats a female cue earlier in the text.
#[derive(Debug)]
pub struct GenderExtractor {
    table: PatternTable,
}

impl GenderExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            table: PatternTable::compile(GENDER_PATTERNS)?,
        })
    }

    pub fn extract(&self, normalized: &str) -> Option<Gender> {
        self.table.first_valid(normalized, Gender::from_cue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::patterns::normalize;

    fn gender_of(text: &str) -> Option<Gender> {
        GenderExtractor::new().unwrap().extract(&normalize(text))
    }

    #[test]
    fn maps_synonyms_to_canonical_values() {
        for text in ["a male patient", "this man", "my boy", "the Gentleman"] {
            assert_eq!(gender_of(text), Some(Gender::Male), "{text}");
        }
        for text in ["a female patient", "this woman", "my girl", "the LADY"] {
            assert_eq!(gender_of(text), Some(Gender::Female), "{text}");
        }
    }

    #[test]
    fn male_group_wins_on_co_occurrence() {
        assert_eq!(
            gender_of("the gentleman's wife said she is fine but he has a fever"),
            Some(Gender::Male)
        );
        assert_eq!(gender_of("a woman brought in her man"), Some(Gender::Male));
    }

    #[test]
    fn word_boundaries_are_respected() {
        // "woman" must not trigger the "man" cue, nor "female" the "male" cue.
        assert_eq!(gender_of("a woman with a cough"), Some(Gender::Female));
        assert_eq!(gender_of("female, 30"), Some(Gender::Female));
        assert_eq!(gender_of("manage the headache"), None);
    }

    #[test]
    fn pronouns_apply_only_without_noun_cues() {
        assert_eq!(gender_of("She has had a headache since yesterday"), Some(Gender::Female));
        assert_eq!(gender_of("he says his back hurts"), Some(Gender::Male));
        assert_eq!(gender_of("she is a woman"), Some(Gender::Female));
        assert_eq!(gender_of("he brought a girl"), Some(Gender::Female));
    }

    #[test]
    fn no_cue_yields_none() {
        assert_eq!(gender_of("I have a fever"), None);
        assert_eq!(gender_of(""), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
        assert_eq!(Gender::Male.to_string(), "male");
    }
}
