//! Data Loading and Export
//!
//! Loads the survey export (delimited text, French questionnaire labels in the
//! header row) with Polars, resolves the typed schema against its headers and
//! converts rows to `Record`s. Every column is read as a string so that cell
//! classification happens in one place (`RawValue::parse`).
//!
//! The cleaned collection can be written back to CSV with the derived columns
//! appended.

use crate::record::{CleanedRecord, Record};
use crate::schema::{SchemaResolution, SurveyField, SurveySchema};
use crate::utils::frame_helpers::{frame_from_string_columns, header_names, records_from_frame};
use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Fatal ingestion failures
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("survey file {path:?} has no data rows")]
    EmptySurvey { path: PathBuf },

    #[error("none of the expected survey columns were found in {path:?} (headers: {headers:?})")]
    NoRecognisedColumns { path: PathBuf, headers: Vec<String> },
}

/// Raw survey as loaded from disk
#[derive(Debug, Clone)]
pub struct SurveyData {
    /// One record per respondent, in file order
    pub records: Vec<Record>,

    /// Field → column mapping and the fields absent from the input
    pub resolution: SchemaResolution,

    /// Source file
    pub source: PathBuf,
}

impl SurveyData {
    /// Load a comma-separated survey export
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_separator(path, b',')
    }

    /// Load a survey export with an explicit field separator
    pub fn load_with_separator(path: &Path, separator: u8) -> Result<Self> {
        info!(path = %path.display(), "Loading survey data");

        let df = Self::read_frame(path, separator)?;
        let headers = header_names(&df);
        let resolution = SurveySchema::resolve(headers.as_slice());

        if resolution.resolved_count() == 0 {
            return Err(SurveyError::NoRecognisedColumns {
                path: path.to_path_buf(),
                headers,
            }
            .into());
        }
        if df.height() == 0 {
            return Err(SurveyError::EmptySurvey { path: path.to_path_buf() }.into());
        }

        if !resolution.missing.is_empty() {
            let missing: Vec<&str> = resolution.missing.iter().map(|f| f.key()).collect();
            warn!(
                count = missing.len(),
                fields = ?missing,
                "Survey fields absent from input; dependent indicators default to false/0"
            );
        }

        let records = records_from_frame(&df, &resolution)?;

        info!(
            records = records.len(),
            columns = resolution.resolved_count(),
            "Survey data loaded"
        );

        Ok(SurveyData {
            records,
            resolution,
            source: path.to_path_buf(),
        })
    }

    /// Read the file with every column typed as string
    fn read_frame(path: &Path, separator: u8) -> Result<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|options| options.with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to load survey CSV: {}", path.display()))
    }
}

/// Derived columns appended to the export, in order
pub const DERIVED_COLUMNS: &[&str] = &[
    "Age_clean",
    "Age_group",
    "Education_level",
    "Water_consumption_m3",
    "Uses_pesticides",
    "Protection_factor",
    "Pesticide_exposure_score",
    "Biodiversity_impact",
    "Deforestation_mentioned",
    "Soil_erosion_score",
];

/// Write the cleaned collection as CSV: resolved raw columns, then derived ones
pub fn export_cleaned(records: &[CleanedRecord], resolution: &SchemaResolution, path: &Path) -> Result<()> {
    let mut columns: Vec<(String, Vec<Option<String>>)> = Vec::new();

    // Raw fields in schema order, under their input header
    for field in SurveyField::ALL {
        let Some(name) = resolution.columns.get(&field) else {
            continue;
        };
        let values = records
            .iter()
            .map(|r| {
                let value = r.raw.get(field);
                value.is_present().then(|| value.to_string())
            })
            .collect();
        columns.push((name.clone(), values));
    }

    let derived: [Vec<Option<String>>; 10] = [
        records.iter().map(|r| r.age_years.map(|a| a.to_string())).collect(),
        records.iter().map(|r| Some(r.age_group.label().to_string())).collect(),
        records.iter().map(|r| Some(r.education_level.to_string())).collect(),
        records.iter().map(|r| Some(r.water_consumption_m3.to_string())).collect(),
        records.iter().map(|r| Some(r.uses_pesticides.to_string())).collect(),
        records.iter().map(|r| Some(r.protection_factor.to_string())).collect(),
        records.iter().map(|r| Some(r.pesticide_exposure_score.to_string())).collect(),
        records.iter().map(|r| Some(r.biodiversity_impact.to_string())).collect(),
        records.iter().map(|r| Some(r.deforestation_mentioned.to_string())).collect(),
        records.iter().map(|r| Some(r.soil_erosion_score.to_string())).collect(),
    ];
    for (name, values) in DERIVED_COLUMNS.iter().zip(derived) {
        columns.push((name.to_string(), values));
    }

    let mut df = frame_from_string_columns(columns)?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create cleaned data file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("Failed to write cleaned data: {}", path.display()))?;

    info!(path = %path.display(), rows = df.height(), "Cleaned data exported");
    Ok(())
}
