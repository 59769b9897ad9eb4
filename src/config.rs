//! Analysis Configuration
//!
//! Thresholds, label lookup tables and keyword rules used by every stage of
//! the pipeline. Built-in defaults reproduce the questionnaire tables; a JSON
//! file may override any section. The structure is immutable once loaded and
//! passed by reference into each aggregator.

use crate::schema::SurveyField;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete configuration for one analysis run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thresholds: Thresholds,

    /// Education label → ordinal (0-4)
    pub education_levels: Vec<LabelValue<u8>>,

    /// Age brackets, checked in order, first match wins
    pub age_groups: Vec<AgeBracket>,

    /// Bucketed consumption answer → representative m³/ha
    pub water_consumption: Vec<LabelValue<f64>>,

    /// Soil condition label → erosion ordinal (1-4)
    pub soil_erosion: Vec<LabelValue<u8>>,
    pub soil_erosion_default: u8,

    /// Protection equipment answer → exposure multiplier
    pub protection_factors: Vec<LabelValue<f64>>,

    /// Profitability answer → score, unmapped answers score `profitability_default`
    pub profitability: Vec<LabelValue<f64>>,
    pub profitability_default: f64,

    /// Keyword rules deriving the boolean record flags
    pub flag_rules: Vec<FlagRule>,

    /// Marital-status answer identifying married respondents
    pub married_label: String,

    /// Age bracket targeted by the young-farmer recommendation
    pub young_group_label: String,

    /// Fixed "today" for age computation; the local date when absent
    pub reference_date: Option<NaiveDate>,
}

/// Numeric cut-offs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Thresholds {
    /// m³/ha above which consumption counts as over-consumption
    pub water_consumption_high: f64,
    /// Exposure score above which a respondent is high-exposure
    pub pesticide_exposure_risk: f64,
    /// Upper bound of the low exposure bucket
    pub exposure_low_max: f64,
    /// Protection factor at or above which protection is insufficient
    pub weak_protection_min: f64,
    /// p-value below which a test is significant
    pub significance_level: f64,
    /// Percentage above which a harmful practice is listed in summaries
    pub harmful_practice_display: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            water_consumption_high: 16250.0,
            pesticide_exposure_risk: 50.0,
            exposure_low_max: 20.0,
            weak_protection_min: 0.7,
            significance_level: 0.05,
            harmful_practice_display: 30.0,
        }
    }
}

/// One label → value mapping entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelValue<T> {
    pub label: String,
    pub value: T,
}

impl<T> LabelValue<T> {
    fn new(label: &str, value: T) -> Self {
        Self { label: label.to_string(), value }
    }
}

/// Inclusive age bracket
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgeBracket {
    pub label: String,
    pub min: i32,
    pub max: i32,
}

impl AgeBracket {
    pub fn contains(&self, age: i32) -> bool {
        self.min <= age && age <= self.max
    }
}

/// Which record flag a keyword rule feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFlag {
    BiodiversityImpact,
    DeforestationMentioned,
}

/// Keyword set matched against one free-text field
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlagRule {
    pub flag: RecordFlag,
    pub field: SurveyField,
    pub keywords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            education_levels: vec![
                LabelValue::new("Non scolarise", 0),
                LabelValue::new("Coranique", 1),
                LabelValue::new("Primaire", 2),
                LabelValue::new("Secondaire", 3),
                LabelValue::new("Superieur", 4),
            ],
            age_groups: vec![
                AgeBracket { label: "Jeune (18-35)".to_string(), min: 18, max: 35 },
                AgeBracket { label: "Adulte (36-50)".to_string(), min: 36, max: 50 },
                AgeBracket { label: "Senior (>50)".to_string(), min: 51, max: 100 },
            ],
            water_consumption: vec![
                LabelValue::new("<10000m3", 8000.0),
                LabelValue::new("10000-13000m3", 11500.0),
                LabelValue::new("13001-16250m3", 14625.0),
                LabelValue::new(">16250m3", 20000.0),
            ],
            soil_erosion: vec![
                LabelValue::new("epuises", 4),
                LabelValue::new("Pauvre", 3),
                LabelValue::new("moyen", 2),
                LabelValue::new("bon", 1),
            ],
            soil_erosion_default: 2,
            protection_factors: vec![
                LabelValue::new("habit_lourd", 0.5),
                LabelValue::new("Voile", 0.7),
                LabelValue::new("Négligeable", 1.0),
                LabelValue::new("neant", 1.0),
            ],
            profitability: vec![
                LabelValue::new("tres rentable", 3.0),
                LabelValue::new("moyennement rentable", 2.0),
                LabelValue::new("peu rentable", 1.0),
                LabelValue::new("pas rentable", 0.0),
            ],
            profitability_default: 1.0,
            flag_rules: vec![
                FlagRule {
                    flag: RecordFlag::BiodiversityImpact,
                    field: SurveyField::BiodiversityChange,
                    keywords: to_strings(&["disparition", "diminution", "prolifération"]),
                },
                FlagRule {
                    flag: RecordFlag::DeforestationMentioned,
                    field: SurveyField::Manifestation,
                    keywords: to_strings(&["déforestation", "coupe", "arbres"]),
                },
            ],
            married_label: "marié.e".to_string(),
            young_group_label: "Jeune (18-35)".to_string(),
            reference_date: None,
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Case-insensitive, trimmed lookup in a label table
pub fn lookup<T: Copy>(table: &[LabelValue<T>], answer: &str) -> Option<T> {
    let answer = answer.trim().to_lowercase();
    table
        .iter()
        .find(|entry| entry.label.trim().to_lowercase() == answer)
        .map(|entry| entry.value)
}

impl AnalysisConfig {
    /// Load configuration from JSON file; omitted sections keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config: {:?}", path))?;

        let config: AnalysisConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse analysis config JSON")?;

        config.validate()?;

        Ok(config)
    }

    /// Reject tables that would break the derived-field invariants
    pub fn validate(&self) -> Result<()> {
        for bracket in &self.age_groups {
            if bracket.min > bracket.max {
                anyhow::bail!(
                    "Age bracket '{}' has min {} above max {}",
                    bracket.label, bracket.min, bracket.max
                );
            }
        }

        for entry in &self.protection_factors {
            if !(0.5..=1.0).contains(&entry.value) {
                anyhow::bail!(
                    "Protection factor for '{}' is {}, expected a value in [0.5, 1.0]",
                    entry.label, entry.value
                );
            }
        }

        for entry in &self.education_levels {
            if entry.value > 4 {
                anyhow::bail!("Education level for '{}' is {}, expected 0-4", entry.label, entry.value);
            }
        }

        for entry in self.soil_erosion.iter().map(|e| e.value).chain([self.soil_erosion_default]) {
            if !(1..=4).contains(&entry) {
                anyhow::bail!("Soil erosion score {} outside 1-4", entry);
            }
        }

        let alpha = self.thresholds.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            anyhow::bail!("Significance level {} must lie in (0, 1)", alpha);
        }

        Ok(())
    }
}
