// src/extractors/patterns.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use regex::Regex;

/// One phrase rule: a regex plus the capture group holding the value.
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    pub name: &'static str,
    pub pattern: &'static str,
    pub group: usize,
}

const fn rule(name: &'static str, pattern: &'static str) -> PatternDef {
    PatternDef { name, pattern, group: 1 }
}

// --- Pattern Tables ---
// Order is load-bearing in every table below: the first rule that yields an
// accepted value decides the field. Most specific phrasing comes first.

// The number is bounded on the side that is not already fixed by the phrase,
// so "1000 years old" never reads as a three-digit age.
pub const AGE_PATTERNS: &[PatternDef] = &[
    rule("age_hyphenated", r"(?i)\b(\d{1,3})\s*[-–]\s*year[-\s]*old"),
    rule("age_years_old", r"(?i)\b(\d{1,3})\s*years?\s*old"),
    rule("age_yr_old", r"(?i)\b(\d{1,3})\s*yr[-\s]*old"),
    rule("age_yo", r"(?i)\b(\d{1,3})\s*y\.?o\.?"),
    rule("age_is_of", r"(?i)age\s*(?:is\s*|of\s*)?(\d{1,3})\b"),
    rule("age_i_am", r"(?i)i['’]?m\s*(\d{1,3})\b"),
    rule("age_years_of_age", r"(?i)\b(\d{1,3})\s*years?\s*of\s*age"),
];

// Noun cues first, pronouns only as a fallback tier. Within a tier the male
// group is declared first and therefore wins on co-occurrence.
pub const GENDER_PATTERNS: &[PatternDef] = &[
    rule("gender_male_noun", r"(?i)\b(male|man|boy|gentleman)\b"),
    rule("gender_female_noun", r"(?i)\b(female|woman|girl|lady)\b"),
    rule("gender_male_pronoun", r"(?i)\b(he|him|his)\b"),
    rule("gender_female_pronoun", r"(?i)\b(she|her|hers)\b"),
];

// "duration_for_unit" has an optional "for", so it already matches any
// "<word> <unit>" pair, including those after about/around/maybe or before
// ago/back. The later rules only decide text that rule 2 does not reach.
pub const DURATION_PATTERNS: &[PatternDef] = &[
    rule(
        "duration_last_past",
        r"(?i)(?:for\s+)?(?:the\s+)?(?:last|past)\s+(\w+\s+\w+|\w+)",
    ),
    rule(
        "duration_for_unit",
        r"(?i)(?:for\s+)?(\w+\s+(?:days?|weeks?|months?|years?))",
    ),
    rule("duration_since", r"(?i)since\s+(\w+(?:\s+\w+)?)"),
    rule(
        "duration_ago",
        r"(?i)(\w+\s+(?:days?|weeks?|months?|years?))\s+(?:ago|back)",
    ),
    rule(
        "duration_about",
        r"(?i)about\s+(\w+\s+(?:days?|weeks?|months?|years?))",
    ),
    rule(
        "duration_around",
        r"(?i)around\s+(\w+\s+(?:days?|weeks?|months?|years?))",
    ),
    rule(
        "duration_maybe",
        r"(?i)maybe\s+(?:the\s+)?(?:last\s+)?(\w+\s+(?:days?|weeks?|months?|years?))",
    ),
    rule(
        "duration_numeric",
        r"(?i)(?:for\s+)?(?:about\s+)?(\d+\s+(?:days?|weeks?|months?|years?))",
    ),
];

/// Closed symptom vocabulary. Result order follows this list.
pub const SYMPTOM_VOCABULARY: &[&str] = &[
    "fever",
    "headache",
    "cough",
    "body pain",
    "fatigue",
    "nausea",
    "vomiting",
    "diarrhea",
    "constipation",
    "dizziness",
    "chest pain",
    "back pain",
    "stomach pain",
    "sore throat",
    "runny nose",
    "stuffy nose",
    "shortness of breath",
    "weakness",
    "joint pain",
    "muscle pain",
    "chills",
    "sweating",
    "rash",
    "itching",
    "swelling",
    "bruising",
    "bleeding",
    "numbness",
    "tingling",
    "blurred vision",
    "ear pain",
    "tooth pain",
    "difficulty swallowing",
    "loss of appetite",
    "weight loss",
    "weight gain",
    "insomnia",
    "drowsiness",
    "anxiety",
    "depression",
];

/// Lower-cases the transcript. Patterns deal with whitespace themselves.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

// --- Compiled Tables ---
#[derive(Debug)]
struct PatternRule {
    name: &'static str,
    regex: Regex,
    group: usize,
}

/// An ordered, compiled pattern table evaluated first-match-wins.
#[derive(Debug)]
pub struct PatternTable {
    rules: Vec<PatternRule>,
}

impl PatternTable {
    pub fn compile(defs: &[PatternDef]) -> Result<Self, ExtractError> {
        let rules = defs
            .iter()
            .map(|def| {
                Regex::new(def.pattern)
                    .map(|regex| PatternRule {
                        name: def.name,
                        regex,
                        group: def.group,
                    })
                    .map_err(|source| ExtractError::InvalidPattern {
                        name: def.name.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Tries each rule in declaration order against its first occurrence in
    /// `text`. `accept` sees the designated capture; returning `None` moves on
    /// to the next rule instead of stopping.
    pub fn first_valid<'t, T>(
        &self,
        text: &'t str,
        mut accept: impl FnMut(&'t str) -> Option<T>,
    ) -> Option<T> {
        for rule in &self.rules {
            let Some(captured) = rule
                .regex
                .captures(text)
                .and_then(|caps| caps.get(rule.group))
            else {
                continue;
            };

            match accept(captured.as_str()) {
                Some(value) => {
                    tracing::trace!(
                        "Rule '{}' accepted capture '{}'",
                        rule.name,
                        captured.as_str()
                    );
                    return Some(value);
                }
                None => {
                    tracing::trace!(
                        "Rule '{}' matched '{}' but the value was rejected",
                        rule.name,
                        captured.as_str()
                    );
                }
            }
        }
        None
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_static_tables_compile() {
        assert_eq!(PatternTable::compile(AGE_PATTERNS).unwrap().len(), 7);
        assert_eq!(PatternTable::compile(GENDER_PATTERNS).unwrap().len(), 4);
        assert_eq!(PatternTable::compile(DURATION_PATTERNS).unwrap().len(), 8);
    }

    #[test]
    fn vocabulary_has_no_duplicates() {
        let unique: HashSet<_> = SYMPTOM_VOCABULARY.iter().collect();
        assert_eq!(unique.len(), SYMPTOM_VOCABULARY.len());
        assert_eq!(SYMPTOM_VOCABULARY.len(), 40);
    }

    #[test]
    fn compile_reports_the_broken_rule() {
        let defs = [rule("good", r"(\d+)"), rule("broken", r"(\d+")];
        let err = PatternTable::compile(&defs).unwrap_err();
        match err {
            ExtractError::InvalidPattern { name, .. } => assert_eq!(name, "broken"),
        }
    }

    #[test]
    fn rejected_value_falls_through_to_next_rule() {
        let defs = [rule("first", r"a(\d)"), rule("second", r"b(\d)")];
        let table = PatternTable::compile(&defs).unwrap();

        let picked = table.first_valid("a1 b2", |cap| (cap != "1").then(|| cap.to_string()));
        assert_eq!(picked.as_deref(), Some("2"));

        let none = table.first_valid("a1 b2", |_| None::<()>);
        assert!(none.is_none());
    }

    #[test]
    fn rule_order_is_preserved() {
        let table = PatternTable::compile(DURATION_PATTERNS).unwrap();
        let names: Vec<_> = table.rule_names().collect();
        assert_eq!(names.first(), Some(&"duration_last_past"));
        assert_eq!(names.last(), Some(&"duration_numeric"));
    }

    #[test]
    fn normalize_only_lowercases() {
        assert_eq!(normalize("  Chest  PAIN "), "  chest  pain ");
        assert_eq!(normalize(""), "");
    }
}
