//! Keyword Matching
//!
//! Case-insensitive substring matching of keyword sets against free-text
//! answers. `FlagMatcher` evaluates the configured rule list once per record
//! to derive the boolean record flags; the analysis modules reuse
//! `KeywordMatcher` for their own categorisations.

use crate::config::{AnalysisConfig, RecordFlag};
use crate::record::Record;
use crate::schema::SurveyField;

/// Lower-cased keyword set
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// True when any keyword occurs in the text
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Every keyword occurring in the text, in keyword order
    pub fn matched_keywords(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    /// Match against a record field; missing or non-text answers never match
    pub fn matches_field(&self, record: &Record, field: SurveyField) -> bool {
        record.text(field).map_or(false, |text| self.matches(text))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Ordered categories, first matching category wins
#[derive(Debug, Clone)]
pub struct KeywordCategorizer {
    categories: Vec<(String, KeywordMatcher)>,
}

impl KeywordCategorizer {
    pub fn new(categories: &[(&str, &[&str])]) -> Self {
        Self {
            categories: categories
                .iter()
                .map(|(name, keywords)| (name.to_string(), KeywordMatcher::new(*keywords)))
                .collect(),
        }
    }

    pub fn categorize(&self, text: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, matcher)| matcher.matches(text))
            .map(|(name, _)| name.as_str())
    }
}

/// Boolean flags derived from free text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFlags {
    pub biodiversity_impact: bool,
    pub deforestation_mentioned: bool,
}

/// Configured flag rules, compiled once per run
#[derive(Debug, Clone)]
pub struct FlagMatcher {
    rules: Vec<(RecordFlag, SurveyField, KeywordMatcher)>,
}

impl FlagMatcher {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            rules: config
                .flag_rules
                .iter()
                .map(|rule| (rule.flag, rule.field, KeywordMatcher::new(&rule.keywords)))
                .collect(),
        }
    }

    /// Evaluate every rule against one record; several rules may feed the same flag
    pub fn evaluate(&self, record: &Record) -> RecordFlags {
        let mut flags = RecordFlags::default();

        for (flag, field, matcher) in &self.rules {
            if !matcher.matches_field(record, *field) {
                continue;
            }
            match flag {
                RecordFlag::BiodiversityImpact => flags.biodiversity_impact = true,
                RecordFlag::DeforestationMentioned => flags.deforestation_mentioned = true,
            }
        }

        flags
    }
}
