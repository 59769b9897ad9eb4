//! Record Cleaning
//!
//! One pass over the raw records deriving every analytic field. Cleaning never
//! fails: each derived field falls back to its documented default.

use crate::config::AnalysisConfig;
use crate::exposure::score_exposure;
use crate::record::{CleanedRecord, Record};
use crate::schema::SurveyField;
use crate::utils::normalization::{
    assign_age_group, education_level, parse_age, soil_erosion, water_consumption,
};
use crate::utils::FlagMatcher;
use chrono::NaiveDate;
use tracing::debug;

/// Derive the analytic fields of one record
pub fn clean_record(
    record: &Record,
    config: &AnalysisConfig,
    flags: &FlagMatcher,
    today: NaiveDate,
) -> CleanedRecord {
    let age_years = parse_age(record.get(SurveyField::Age), today);
    let water = water_consumption(record.get(SurveyField::WaterQuantity), &config.water_consumption);
    let exposure = score_exposure(record, config);
    let record_flags = flags.evaluate(record);

    let uses_pesticides =
        record.is_set(SurveyField::InputHerbicide) || record.is_set(SurveyField::InputBiopesticide);

    CleanedRecord {
        raw: record.clone(),
        age_years,
        age_group: assign_age_group(age_years, &config.age_groups),
        education_level: education_level(record.get(SurveyField::Education), &config.education_levels),
        water_consumption_m3: water.unwrap_or(0.0),
        water_consumption_defined: water.is_some(),
        uses_pesticides,
        pesticide_presence: exposure.presence,
        protection_factor: exposure.protection_factor,
        pesticide_exposure_score: exposure.score,
        biodiversity_impact: record_flags.biodiversity_impact,
        deforestation_mentioned: record_flags.deforestation_mentioned,
        soil_erosion_score: soil_erosion(
            record.get(SurveyField::SoilCondition),
            &config.soil_erosion,
            config.soil_erosion_default,
        ),
    }
}

/// Clean every record; the keyword rules are compiled once
pub fn clean_records(records: &[Record], config: &AnalysisConfig, today: NaiveDate) -> Vec<CleanedRecord> {
    let flags = FlagMatcher::from_config(config);

    let cleaned: Vec<CleanedRecord> = records
        .iter()
        .map(|record| clean_record(record, config, &flags, today))
        .collect();

    debug!(
        records = cleaned.len(),
        with_age = cleaned.iter().filter(|r| r.age_years.is_some()).count(),
        pesticide_users = cleaned.iter().filter(|r| r.uses_pesticides).count(),
        "Records cleaned"
    );

    cleaned
}
