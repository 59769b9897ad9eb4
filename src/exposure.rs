//! PESTICIDE EXPOSURE SCORE
//!
//! Composite score from the canal pesticide-presence rating (1-100) and the
//! protection-equipment multiplier:
//!
//!   exposure = presence × protection_factor
//!
//! Lower factor = better protected (heavy clothing 0.5, veil 0.7, nothing 1.0).
//! Missing presence scores 0; unknown equipment is treated as no protection.

use crate::config::{lookup, AnalysisConfig};
use crate::record::Record;
use crate::schema::SurveyField;

/// Multiplier applied when the equipment answer is missing or unmapped
pub const NO_PROTECTION_FACTOR: f64 = 1.0;

const MAX_PRESENCE: f64 = 100.0;

/// Exposure inputs and result for one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureScore {
    /// Presence rating, clamped to [0, 100]
    pub presence: f64,
    pub protection_factor: f64,
    pub score: f64,
}

/// Canal pesticide-presence rating; missing or non-numeric → 0
pub fn presence_rating(record: &Record) -> f64 {
    record
        .number(SurveyField::PesticidePresence)
        .map(|rating| rating.clamp(0.0, MAX_PRESENCE))
        .unwrap_or(0.0)
}

/// Protection multiplier for the equipment answer
pub fn protection_factor(record: &Record, config: &AnalysisConfig) -> f64 {
    record
        .text(SurveyField::ProtectionEquipment)
        .and_then(|answer| lookup(&config.protection_factors, answer))
        .unwrap_or(NO_PROTECTION_FACTOR)
}

/// Score one record
pub fn score_exposure(record: &Record, config: &AnalysisConfig) -> ExposureScore {
    let presence = presence_rating(record);
    let protection_factor = protection_factor(record, config);

    ExposureScore {
        presence,
        protection_factor,
        score: presence * protection_factor,
    }
}
