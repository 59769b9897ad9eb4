use crate::analysis::{CorrelationReport, EnvironmentalReport, HealthReport, WaterReport};
use crate::record::CleanedRecord;
use crate::report::types::{DatasetSummary, SurveyReport};
use crate::schema::SchemaResolution;
use crate::utils::{percentage, stats};
use chrono::NaiveDate;
use tracing::debug;

/// Merges the domain reports into one `SurveyReport`
pub struct ReportGenerator;

impl ReportGenerator {
    /// Dataset-level indicators shown ahead of the domain sections
    pub fn dataset_summary(
        records: &[CleanedRecord],
        resolution: &SchemaResolution,
        reference_date: NaiveDate,
    ) -> DatasetSummary {
        let ages: Vec<f64> = records.iter().filter_map(|r| r.age_years).map(f64::from).collect();
        let consumption: Vec<f64> = records.iter().filter_map(|r| r.water_consumption()).collect();
        let pesticide_users = records.iter().filter(|r| r.uses_pesticides).count();

        DatasetSummary {
            total_records: records.len(),
            missing_fields: resolution.missing.iter().map(|f| f.key().to_string()).collect(),
            reference_date,
            mean_age: stats::mean(&ages),
            pesticide_users,
            pesticide_user_percentage: percentage(pesticide_users, records.len()),
            mean_water_consumption: stats::mean(&consumption),
            biodiversity_cases: records.iter().filter(|r| r.biodiversity_impact).count(),
        }
    }

    pub fn assemble(
        dataset: DatasetSummary,
        environmental: EnvironmentalReport,
        health: HealthReport,
        water: WaterReport,
        correlation: CorrelationReport,
    ) -> SurveyReport {
        debug!(
            records = dataset.total_records,
            missing_fields = dataset.missing_fields.len(),
            "Survey report assembled"
        );

        SurveyReport {
            dataset,
            environmental,
            health,
            water,
            correlation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_correlations, analyze_environment, analyze_health, analyze_water};
    use crate::cleaning::test_support::{cleaned, reference_date};
    use crate::config::AnalysisConfig;
    use crate::schema::{SurveyField, SurveySchema};
    use approx::assert_relative_eq;

    #[test]
    fn test_dataset_summary() {
        let records = vec![
            cleaned(&[
                (SurveyField::Age, "30"),
                (SurveyField::InputHerbicide, "1"),
                (SurveyField::WaterQuantity, "13001-16250m3"),
            ]),
            cleaned(&[(SurveyField::Age, "50"), (SurveyField::WaterQuantity, "je ne sais pas")]),
        ];
        let resolution = SurveySchema::resolve(&["Age", "Niveau d'education"]);

        let summary = ReportGenerator::dataset_summary(&records, &resolution, reference_date());

        assert_eq!(summary.total_records, 2);
        assert_relative_eq!(summary.mean_age.unwrap(), 40.0);
        assert_eq!(summary.pesticide_users, 1);
        assert_relative_eq!(summary.pesticide_user_percentage, 50.0);
        assert_relative_eq!(summary.mean_water_consumption.unwrap(), 14625.0);
        assert_eq!(summary.missing_fields.len(), resolution.missing.len());
    }

    #[test]
    fn test_assemble_empty_survey() {
        let config = AnalysisConfig::default();
        let records: Vec<CleanedRecord> = Vec::new();
        let dataset = ReportGenerator::dataset_summary(&records, &SchemaResolution::default(), reference_date());

        let report = ReportGenerator::assemble(
            dataset,
            analyze_environment(&records, &config),
            analyze_health(&records, &config),
            analyze_water(&records, &config),
            analyze_correlations(&records, &config),
        );

        assert_eq!(report.dataset.total_records, 0);
        assert_eq!(report.dataset.mean_age, None);
        assert_eq!(report.environmental.summary.main_harmful_practice, None);
    }
}
