//! Rice-farming survey analysis
//!
//! Turns raw questionnaire records from rice farmers into cleaned records with
//! a pesticide exposure score, then into environmental, health, water and
//! socio-demographic reports plus an executive summary.
//!
//! Layout:
//! - `schema`, `record`, `config`: typed questionnaire fields, records, tables
//! - `data`: CSV ingestion and cleaned-data export with Polars
//! - `cleaning`, `exposure`: field normalizer and exposure scorer
//! - `analysis/`: the four domain aggregators
//! - `report/`: merged report with Markdown and JSON formatters
//! - `analyzer`: pipeline coordinator

pub mod schema;
pub mod record;
pub mod config;
pub mod utils;
pub mod data;
pub mod exposure;
pub mod cleaning;
pub mod analysis;
pub mod report;
pub mod analyzer;

// Re-export commonly used types
pub use schema::{SchemaResolution, SurveyField, SurveySchema};
pub use record::{AgeGroup, CleanedRecord, RawValue, Record};
pub use config::AnalysisConfig;
pub use data::{export_cleaned, SurveyData, SurveyError};
pub use exposure::{score_exposure, ExposureScore};
pub use cleaning::{clean_record, clean_records};
pub use analysis::{
    analyze_correlations, analyze_environment, analyze_health, analyze_water, CorrelationReport,
    EnvironmentalReport, HealthReport, WaterReport,
};
pub use report::{DatasetSummary, JsonFormatter, MarkdownFormatter, ReportGenerator, SurveyReport};
pub use analyzer::{SurveyAnalysis, SurveyAnalyzer};
