use crate::analysis::{CorrelationReport, EnvironmentalReport, HealthReport, WaterReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Complete survey analysis, ready for formatters and external renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReport {
    pub dataset: DatasetSummary,
    pub environmental: EnvironmentalReport,
    pub health: HealthReport,
    pub water: WaterReport,
    pub correlation: CorrelationReport,
}

/// What was analysed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    /// Schema fields with no column in the input (canonical keys)
    pub missing_fields: Vec<String>,
    /// "Today" used for age computation
    pub reference_date: NaiveDate,
    pub mean_age: Option<f64>,
    pub pesticide_users: usize,
    pub pesticide_user_percentage: f64,
    /// Over records with a mapped consumption answer
    pub mean_water_consumption: Option<f64>,
    pub biodiversity_cases: usize,
}
