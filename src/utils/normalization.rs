//! Field Normalization Utilities
//!
//! Converts raw survey answers to typed values: age from a birth date or a
//! number, label lookups to ordinals and bucket midpoints. Every function is
//! total: unparseable or missing input maps to its documented default.

use crate::config::{lookup, AgeBracket, LabelValue};
use crate::record::{AgeGroup, RawValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DAYS_PER_YEAR: f64 = 365.25;

/// Age in whole years
///
/// - Date-like text (ISO date, or date-time with `T`): `(today - birth) / 365.25`
///   days, truncated
/// - Number: truncated
/// - Anything else: `None`
pub fn parse_age(raw: &RawValue, today: NaiveDate) -> Option<i32> {
    match raw {
        RawValue::Number(n) => {
            let years = n.trunc();
            (years.abs() < i32::MAX as f64).then(|| years as i32)
        }
        RawValue::Text(text) => {
            let birth = parse_date(text)?;
            let days = (today - birth).num_days() as f64;
            Some((days / DAYS_PER_YEAR).trunc() as i32)
        }
        RawValue::Missing => None,
    }
}

/// Parse the date formats the survey export produces for birth dates
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }

    // Date-time with an unusual time or offset part: keep the date
    let (date_part, _) = text.split_once('T')?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// First bracket (inclusive bounds, configured order) containing the age
pub fn assign_age_group(age: Option<i32>, brackets: &[AgeBracket]) -> AgeGroup {
    let Some(age) = age else {
        return AgeGroup::Unspecified;
    };

    brackets
        .iter()
        .find(|bracket| bracket.contains(age))
        .map(|bracket| AgeGroup::Bracket(bracket.label.clone()))
        .unwrap_or(AgeGroup::Unspecified)
}

/// Education ordinal; unmapped or missing → 0
pub fn education_level(raw: &RawValue, table: &[LabelValue<u8>]) -> u8 {
    raw.as_text().and_then(|text| lookup(table, text)).unwrap_or(0)
}

/// Representative consumption for a bucketed answer; `None` when unmapped
pub fn water_consumption(raw: &RawValue, table: &[LabelValue<f64>]) -> Option<f64> {
    raw.as_text().and_then(|text| lookup(table, text))
}

/// Soil erosion ordinal; unmapped or missing → `default`
pub fn soil_erosion(raw: &RawValue, table: &[LabelValue<u8>], default: u8) -> u8 {
    raw.as_text().and_then(|text| lookup(table, text)).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()
    }

    #[test]
    fn test_parse_age_number_and_date() {
        assert_eq!(parse_age(&RawValue::Number(42.9), today()), Some(42));
        assert_eq!(
            parse_age(&RawValue::Text("1985-07-03T00:00:00".into()), today()),
            Some(40)
        );
        assert_eq!(parse_age(&RawValue::Text("1985-07-03".into()), today()), Some(40));
        assert_eq!(
            parse_age(&RawValue::Text("1985-07-03T00:00:00.000+00:00".into()), today()),
            Some(40)
        );
        assert_eq!(parse_age(&RawValue::Text("quarante".into()), today()), None);
        assert_eq!(parse_age(&RawValue::Missing, today()), None);
    }

    #[test]
    fn test_age_35_from_iso_date_is_young() {
        let config = AnalysisConfig::default();
        let age = parse_age(&RawValue::Text("1990-07-03T00:00:00".into()), today());
        assert_eq!(age, Some(35));
        assert_eq!(
            assign_age_group(age, &config.age_groups),
            AgeGroup::Bracket("Jeune (18-35)".to_string())
        );
        // One day short of the 35th birthday
        let younger = parse_age(&RawValue::Text("1990-07-04".into()), today());
        assert_eq!(younger, Some(34));
    }

    #[test]
    fn test_age_group_is_total() {
        let config = AnalysisConfig::default();
        let brackets = &config.age_groups;
        assert_eq!(assign_age_group(None, brackets), AgeGroup::Unspecified);
        assert_eq!(assign_age_group(Some(17), brackets), AgeGroup::Unspecified);
        assert_eq!(assign_age_group(Some(101), brackets), AgeGroup::Unspecified);
        assert_eq!(assign_age_group(Some(36), brackets).label(), "Adulte (36-50)");
        assert_eq!(assign_age_group(Some(51), brackets).label(), "Senior (>50)");
        assert_eq!(AgeGroup::Unspecified.label(), "unspecified");
    }

    #[test]
    fn test_first_matching_bracket_wins() {
        let brackets = vec![
            AgeBracket { label: "A".into(), min: 18, max: 40 },
            AgeBracket { label: "B".into(), min: 30, max: 60 },
        ];
        assert_eq!(assign_age_group(Some(35), &brackets).label(), "A");
    }

    #[test]
    fn test_lookups_and_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(education_level(&RawValue::Text("Secondaire".into()), &config.education_levels), 3);
        assert_eq!(education_level(&RawValue::Text("Autre".into()), &config.education_levels), 0);
        assert_eq!(education_level(&RawValue::Missing, &config.education_levels), 0);

        assert_eq!(
            water_consumption(&RawValue::Text("13001-16250m3".into()), &config.water_consumption),
            Some(14625.0)
        );
        assert_eq!(water_consumption(&RawValue::Missing, &config.water_consumption), None);

        assert_eq!(soil_erosion(&RawValue::Text("epuises".into()), &config.soil_erosion, 2), 4);
        assert_eq!(soil_erosion(&RawValue::Text("???".into()), &config.soil_erosion, 2), 2);
    }
}
