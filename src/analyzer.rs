//! Survey Analyzer - main coordinator for the analysis pipeline
//!
//! Cleans the loaded records once, then runs the four domain aggregators over
//! the cleaned collection and merges their reports.

use crate::analysis::{analyze_correlations, analyze_environment, analyze_health, analyze_water};
use crate::cleaning::clean_records;
use crate::config::AnalysisConfig;
use crate::data::SurveyData;
use crate::record::CleanedRecord;
use crate::report::{ReportGenerator, SurveyReport};
use crate::schema::SchemaResolution;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::time::Instant;
use tracing::info;

/// Main survey analyzer
pub struct SurveyAnalyzer {
    config: AnalysisConfig,
    reference_date: NaiveDate,
}

/// Cleaned records plus the report computed from them
#[derive(Debug, Clone)]
pub struct SurveyAnalysis {
    pub cleaned: Vec<CleanedRecord>,
    pub report: SurveyReport,
}

impl SurveyAnalyzer {
    /// Validate the configuration and fix the reference date
    ///
    /// Without a configured `reference_date` the local date is used.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let reference_date = config.reference_date.unwrap_or_else(|| Local::now().date_naive());

        info!(%reference_date, "Survey analyzer initialized");

        Ok(Self {
            config,
            reference_date,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Run the full pipeline on a loaded survey
    pub fn analyze(&self, data: &SurveyData) -> SurveyAnalysis {
        let start = Instant::now();

        let cleaned = clean_records(&data.records, &self.config, self.reference_date);
        info!(records = cleaned.len(), "Records cleaned");

        let report = self.analyze_cleaned(&cleaned, &data.resolution);

        info!(
            records = cleaned.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Survey analysis complete"
        );

        SurveyAnalysis { cleaned, report }
    }

    /// Run the domain aggregators over an already cleaned collection
    pub fn analyze_cleaned(&self, records: &[CleanedRecord], resolution: &SchemaResolution) -> SurveyReport {
        let dataset = ReportGenerator::dataset_summary(records, resolution, self.reference_date);

        let t0 = Instant::now();
        let environmental = analyze_environment(records, &self.config);
        let t_environmental = t0.elapsed();

        let t1 = Instant::now();
        let health = analyze_health(records, &self.config);
        let t_health = t1.elapsed();

        let t2 = Instant::now();
        let water = analyze_water(records, &self.config);
        let t_water = t2.elapsed();

        let t3 = Instant::now();
        let correlation = analyze_correlations(records, &self.config);
        let t_correlation = t3.elapsed();

        info!(
            environmental_us = t_environmental.as_micros() as u64,
            health_us = t_health.as_micros() as u64,
            water_us = t_water.as_micros() as u64,
            correlation_us = t_correlation.as_micros() as u64,
            "Domain analyses complete"
        );

        ReportGenerator::assemble(dataset, environmental, health, water, correlation)
    }
}
