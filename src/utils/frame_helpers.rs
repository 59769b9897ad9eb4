//! DataFrame helpers with column validation
//!
//! Explicit access patterns for the string-typed survey frame, so a missing
//! or mistyped column surfaces as a contextual error instead of a panic.

use crate::record::{RawValue, Record};
use crate::schema::SchemaResolution;
use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;

/// Header names of a frame, in column order
pub fn header_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.as_str().to_string())
        .collect()
}

/// Borrow a column as strings
///
/// # Errors
/// Returns error if the column is absent or not string-typed. The message
/// lists the available columns.
pub fn string_column<'a>(df: &'a DataFrame, name: &str, context: &str) -> Result<&'a StringChunked> {
    let column = df.column(name).map_err(|_| {
        anyhow!(
            "{}: Missing expected column '{}'. Available columns: {:?}",
            context,
            name,
            header_names(df)
        )
    })?;

    column
        .str()
        .with_context(|| format!("{}: Column '{}' is not a string column", context, name))
}

/// Convert every frame row to a `Record`, reading only resolved columns
pub fn records_from_frame(df: &DataFrame, resolution: &SchemaResolution) -> Result<Vec<Record>> {
    let mut columns = Vec::with_capacity(resolution.columns.len());
    for (field, name) in &resolution.columns {
        let values = string_column(df, name, "Survey records")?;
        columns.push((*field, values));
    }

    let records = (0..df.height())
        .map(|row| {
            let values: FxHashMap<_, _> = columns
                .iter()
                .map(|(field, values)| (*field, RawValue::parse(values.get(row))))
                .filter(|(_, value)| value.is_present())
                .collect();
            Record::new(values)
        })
        .collect();

    Ok(records)
}

/// Build a frame from named optional-string columns of equal length
pub fn frame_from_string_columns(columns: Vec<(String, Vec<Option<String>>)>) -> Result<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Column::new(name.as_str().into(), values))
        .collect();

    DataFrame::new(columns).with_context(|| "Failed to assemble export frame")
}
