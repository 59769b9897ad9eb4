//! Survey records
//!
//! `Record` holds one respondent's raw answers keyed by `SurveyField`.
//! `CleanedRecord` wraps it with the derived analytic fields.

use crate::schema::SurveyField;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw survey cell
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Missing,
}

impl RawValue {
    /// Classify a raw cell: blank → Missing, finite float → Number, else Text
    pub fn parse(cell: Option<&str>) -> Self {
        let Some(cell) = cell else {
            return RawValue::Missing;
        };
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return RawValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => RawValue::Number(n),
            _ => RawValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, RawValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite()),
            RawValue::Missing => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Multi-select indicator: numeric codes are set when non-zero,
    /// "oui"/"true" and "non"/"false" are accepted as text
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            RawValue::Number(n) => Some(*n != 0.0),
            RawValue::Text(s) => match s.to_lowercase().as_str() {
                "oui" | "true" | "vrai" | "yes" => Some(true),
                "non" | "false" | "faux" | "no" => Some(false),
                _ => None,
            },
            RawValue::Missing => None,
        }
    }

    /// Case-insensitive comparison of a text answer
    pub fn eq_text(&self, expected: &str) -> bool {
        self.as_text()
            .map_or(false, |s| s.trim().to_lowercase() == expected.to_lowercase())
    }

    /// Case-insensitive substring test on a text answer
    pub fn contains_text(&self, needle: &str) -> bool {
        self.as_text()
            .map_or(false, |s| s.to_lowercase().contains(&needle.to_lowercase()))
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Missing => Ok(()),
        }
    }
}

static MISSING: RawValue = RawValue::Missing;

/// One respondent's raw answers
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: FxHashMap<SurveyField, RawValue>,
}

impl Record {
    pub fn new(values: FxHashMap<SurveyField, RawValue>) -> Self {
        Self { values }
    }

    /// Build a record from (field, cell) pairs; cells go through `RawValue::parse`
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (SurveyField, &'a str)>,
    {
        let values = pairs
            .into_iter()
            .map(|(field, cell)| (field, RawValue::parse(Some(cell))))
            .filter(|(_, value)| value.is_present())
            .collect();
        Self { values }
    }

    /// Raw value of a field; absent fields read as `Missing`
    pub fn get(&self, field: SurveyField) -> &RawValue {
        self.values.get(&field).unwrap_or(&MISSING)
    }

    pub fn text(&self, field: SurveyField) -> Option<&str> {
        self.get(field).as_text()
    }

    pub fn number(&self, field: SurveyField) -> Option<f64> {
        self.get(field).as_number()
    }

    pub fn flag(&self, field: SurveyField) -> Option<bool> {
        self.get(field).as_flag()
    }

    /// True only when the indicator is present and set
    pub fn is_set(&self, field: SurveyField) -> bool {
        self.flag(field) == Some(true)
    }
}

/// Age bracket assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    Bracket(String),
    Unspecified,
}

impl AgeGroup {
    pub const UNSPECIFIED_LABEL: &'static str = "unspecified";

    pub fn label(&self) -> &str {
        match self {
            AgeGroup::Bracket(name) => name,
            AgeGroup::Unspecified => Self::UNSPECIFIED_LABEL,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Record plus derived analytic fields
#[derive(Debug, Clone)]
pub struct CleanedRecord {
    pub raw: Record,
    pub age_years: Option<i32>,
    pub age_group: AgeGroup,
    pub education_level: u8,
    pub water_consumption_m3: f64,
    /// Whether the consumption answer mapped to a known bucket
    pub water_consumption_defined: bool,
    pub uses_pesticides: bool,
    /// Canal pesticide-presence rating, clamped to [0, 100]
    pub pesticide_presence: f64,
    pub protection_factor: f64,
    pub pesticide_exposure_score: f64,
    pub biodiversity_impact: bool,
    pub deforestation_mentioned: bool,
    pub soil_erosion_score: u8,
}

impl CleanedRecord {
    /// Consumption, only when the answer mapped to a bucket
    pub fn water_consumption(&self) -> Option<f64> {
        self.water_consumption_defined
            .then_some(self.water_consumption_m3)
    }
}
