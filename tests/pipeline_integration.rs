//! End-to-end pipeline over survey CSV files written to a temp dir

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rice_survey_analysis::{
    export_cleaned, AnalysisConfig, JsonFormatter, MarkdownFormatter, SurveyAnalyzer, SurveyData,
    SurveyError, SurveyField,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Write a survey export using the questionnaire labels as headers
fn write_survey(dir: &Path, name: &str, fields: &[SurveyField], rows: &[&[&str]]) -> PathBuf {
    let mut csv = fields.iter().map(|f| quote(f.label())).collect::<Vec<_>>().join(",");
    csv.push('\n');
    for row in rows {
        csv.push_str(&row.iter().map(|cell| quote(cell)).collect::<Vec<_>>().join(","));
        csv.push('\n');
    }

    let path = dir.join(name);
    fs::write(&path, csv).unwrap();
    path
}

fn analyzer() -> SurveyAnalyzer {
    let config = AnalysisConfig {
        reference_date: NaiveDate::from_ymd_opt(2025, 7, 3),
        ..AnalysisConfig::default()
    };
    SurveyAnalyzer::new(config).unwrap()
}

const FIELDS: [SurveyField; 8] = [
    SurveyField::Age,
    SurveyField::Education,
    SurveyField::MaritalStatus,
    SurveyField::PesticidePresence,
    SurveyField::ProtectionEquipment,
    SurveyField::InputHerbicide,
    SurveyField::WaterQuantity,
    SurveyField::AgrochemicalTraining,
];

fn fixture(dir: &Path) -> PathBuf {
    write_survey(
        dir,
        "enquete.csv",
        &FIELDS,
        &[
            &["1990-07-03T00:00:00", "Primaire", "marié.e", "80", "Voile", "1", "13001-16250m3", "non"],
            &["45", "Secondaire", "marié.e", "10", "habit_lourd", "0", ">16250m3", "oui"],
            &["60", "Superieur", "celibataire", "20", "habit_lourd", "0", "<10000m3", "oui"],
            &["", "Non scolarise", "", "90", "neant", "1", ">16250m3", "non"],
            &["30", "Coranique", "", "", "", "0", "", ""],
        ],
    )
}

#[test]
fn test_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let data = SurveyData::load(&fixture(dir.path())).unwrap();

    assert_eq!(data.records.len(), 5);
    assert_eq!(data.resolution.resolved_count(), FIELDS.len());
    assert_eq!(data.resolution.missing.len(), SurveyField::ALL.len() - FIELDS.len());

    let analysis = analyzer().analyze(&data);
    let first = &analysis.cleaned[0];

    // Birth date exactly 35 years before the reference date
    assert_eq!(first.age_years, Some(35));
    assert_eq!(first.age_group.label(), "Jeune (18-35)");
    assert_relative_eq!(first.pesticide_exposure_score, 56.0);
    assert_relative_eq!(first.water_consumption_m3, 14625.0);
    assert!(!analysis.cleaned[4].water_consumption_defined);
    assert_relative_eq!(analysis.cleaned[4].pesticide_exposure_score, 0.0);

    let report = &analysis.report;
    assert_eq!(report.dataset.total_records, 5);
    assert_eq!(report.dataset.pesticide_users, 2);
    assert_eq!(report.dataset.missing_fields.len(), SurveyField::ALL.len() - FIELDS.len());

    let buckets = &report.water.consumption.distribution;
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 4);
    assert_eq!(buckets.last().unwrap().count, 2);
    assert_eq!(report.water.consumption.statistics.defined_count, 4);

    // Exposures 56, 5, 10, 90, 0
    assert_eq!(report.health.pesticide_exposure.exposure_levels.high.count, 2);
    assert_eq!(report.correlation.summary.high_risk_count, 2);
    assert!(report.correlation.education.anova.statistic.is_none());
}

#[test]
fn test_married_only_t_test_is_undefined() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(
        dir.path(),
        "maries.csv",
        &[SurveyField::MaritalStatus, SurveyField::PesticidePresence],
        &[
            &["marié.e", "10"],
            &["marié.e", "20"],
            &["marié.e", "30"],
            &["", "70"],
        ],
    );

    let data = SurveyData::load(&path).unwrap();
    let report = analyzer().analyze(&data).report;

    let t_test = &report.correlation.marital_status.t_test;
    assert!(!t_test.significant);
    assert_eq!(t_test.statistic, None);
    assert!(!report
        .correlation
        .summary
        .significant_correlations
        .contains(&"marital_status".to_string()));
}

#[test]
fn test_outputs_written() {
    let dir = TempDir::new().unwrap();
    let data = SurveyData::load(&fixture(dir.path())).unwrap();
    let analysis = analyzer().analyze(&data);

    let cleaned_path = dir.path().join("cleaned_data.csv");
    export_cleaned(&analysis.cleaned, &data.resolution, &cleaned_path).unwrap();
    let exported = fs::read_to_string(&cleaned_path).unwrap();
    let header = exported.lines().next().unwrap();
    assert!(header.contains("Pesticide_exposure_score"));
    assert!(header.contains("Age_group"));
    assert_eq!(exported.lines().count(), 6);

    let json = JsonFormatter::format(&analysis.report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["dataset"]["total_records"], 5);

    let md = MarkdownFormatter::format(&analysis.report, 30.0);
    assert!(md.contains("RÉSUMÉ EXÉCUTIF"));
    assert!(md.contains("Promotion du Système de Riziculture Intensive (SRI)"));
}

#[test]
fn test_unrecognised_headers_are_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("autre.csv");
    fs::write(&path, "colonne_a,colonne_b\n1,2\n").unwrap();

    let err = SurveyData::load(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SurveyError>(),
        Some(SurveyError::NoRecognisedColumns { .. })
    ));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(SurveyData::load(&dir.path().join("absent.csv")).is_err());
}
