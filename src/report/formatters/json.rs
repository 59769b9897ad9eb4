use crate::report::types::SurveyReport;
use serde_json;

/// JSON formatter for survey reports
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format report as pretty-printed JSON
    pub fn format(report: &SurveyReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Format report as compact JSON (no whitespace)
    pub fn format_compact(report: &SurveyReport) -> Result<String, serde_json::Error> {
        serde_json::to_string(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_correlations, analyze_environment, analyze_health, analyze_water};
    use crate::cleaning::test_support::{cleaned, reference_date};
    use crate::config::AnalysisConfig;
    use crate::report::ReportGenerator;
    use crate::schema::{SchemaResolution, SurveyField};

    fn sample_report() -> SurveyReport {
        let config = AnalysisConfig::default();
        let records = vec![
            cleaned(&[(SurveyField::MaritalStatus, "marié.e"), (SurveyField::PesticidePresence, "10")]),
            cleaned(&[(SurveyField::MaritalStatus, "marié.e"), (SurveyField::PesticidePresence, "20")]),
        ];
        ReportGenerator::assemble(
            ReportGenerator::dataset_summary(&records, &SchemaResolution::default(), reference_date()),
            analyze_environment(&records, &config),
            analyze_health(&records, &config),
            analyze_water(&records, &config),
            analyze_correlations(&records, &config),
        )
    }

    #[test]
    fn test_format_json() {
        let json = JsonFormatter::format(&sample_report()).unwrap();

        assert!(json.contains("\"total_records\": 2"));
        assert!(json.contains("\"reference_date\": \"2025-07-03\""));
        // Undefined statistics serialize as null, not zero
        assert!(json.contains("\"statistic\": null"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["correlation"]["marital_status"]["t_test"]["significant"] == false);
    }

    #[test]
    fn test_format_compact() {
        let json = JsonFormatter::format_compact(&sample_report()).unwrap();

        assert!(!json.contains("\n  "));
    }
}
