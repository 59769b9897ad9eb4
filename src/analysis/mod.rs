//! Domain aggregators
//!
//! Four independent passes over the cleaned collection, each a pure function
//! `(&[CleanedRecord], &AnalysisConfig) -> Report`:
//! - environmental: harmful practices, deforestation, biodiversity
//! - health: pesticide and fertiliser exposure, vulnerable groups
//! - water: consumption, irrigation, management, efficiency
//! - correlation: socio-demographic tests and the combined-factors pass
//!
//! Shared pattern: group by a categorical key, then count / mean / percentage
//! per group, optionally with one inferential statistic.

pub mod environmental;
pub mod health;
pub mod water;
pub mod correlation;

use crate::record::CleanedRecord;
use crate::utils::stats::{self, Correlation, TestResult};
use crate::utils::percentage;
use serde::{Deserialize, Serialize};

pub use environmental::{analyze_environment, EnvironmentalReport};
pub use health::{analyze_health, HealthReport};
pub use water::{analyze_water, WaterReport};
pub use correlation::{analyze_correlations, CorrelationReport};

/// Count, mean and share of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub count: usize,
    /// Mean of the measured value; `None` for an empty category
    pub mean: Option<f64>,
    /// Share of the category in the reference population (0-100)
    pub percentage: f64,
}

impl CategoryStats {
    pub fn from_values(values: &[f64], total: usize) -> Self {
        Self {
            count: values.len(),
            mean: stats::mean(values),
            percentage: percentage(values.len(), total),
        }
    }
}

/// One answer of a multi-answer field with its frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerCount {
    pub answer: String,
    pub count: usize,
}

impl AnswerCount {
    pub fn from_ranked(ranked: Vec<(String, usize)>) -> Vec<Self> {
        ranked
            .into_iter()
            .map(|(answer, count)| AnswerCount { answer, count })
            .collect()
    }
}

/// Outcome of a test whose precondition may fail
///
/// A failed precondition leaves `statistic` and `p_value` undefined and
/// `significant` false. Perfect separation keeps `p_value = 0` and
/// `significant` true but leaves the infinite statistic undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTest {
    pub statistic: Option<f64>,
    pub p_value: Option<f64>,
    pub significant: bool,
}

impl SignificanceTest {
    pub fn from_result(result: Option<TestResult>, alpha: f64) -> Self {
        Self {
            statistic: result.map(|r| r.statistic).filter(|s| s.is_finite()),
            p_value: result.map(|r| r.p_value),
            significant: result.map_or(false, |r| r.is_significant(alpha)),
        }
    }

    pub fn from_correlation(result: Option<Correlation>, alpha: f64) -> Self {
        Self {
            statistic: result.map(|c| c.r),
            p_value: result.map(|c| c.p_value),
            significant: result.map_or(false, |c| c.p_value < alpha),
        }
    }
}

/// Mean of a per-record value over a subset
pub(crate) fn mean_by<F>(records: &[&CleanedRecord], value: F) -> Option<f64>
where
    F: Fn(&CleanedRecord) -> f64,
{
    let values: Vec<f64> = records.iter().map(|r| value(*r)).collect();
    stats::mean(&values)
}

/// Percentage of a subset satisfying a predicate; 0 for an empty subset
pub(crate) fn share_by<F>(records: &[&CleanedRecord], predicate: F) -> f64
where
    F: Fn(&CleanedRecord) -> bool,
{
    let count = records.iter().filter(|r| predicate(**r)).count();
    percentage(count, records.len())
}
