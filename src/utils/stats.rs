//! Statistics Utilities
//!
//! Descriptive statistics and the three hypothesis tests used by the
//! socio-demographic analysis. p-values come from `statrs` distributions.
//!
//! Every function returns `None` instead of NaN when its input cannot support
//! the statistic (too few observations, zero variance everywhere). Perfectly
//! separated groups (zero spread within, distinct means) give an infinite
//! statistic with p = 0.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Outcome of one hypothesis test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Infinite when the groups are perfectly separated
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Pearson correlation with its two-sided p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample variance (n - 1 denominator)
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Pearson correlation coefficient alone
///
/// Needs at least two pairs and non-zero variance on both sides.
pub fn pearson_r(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Pearson correlation with two-sided p-value (t distribution, n - 2 df)
///
/// Requires more than two paired observations.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    if x.len() <= 2 {
        return None;
    }
    let r = pearson_r(x, y)?;
    let df = (x.len() - 2) as f64;

    let p_value = if (1.0 - r.abs()) < 1e-12 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        two_sided_t_p_value(t, df)?
    };

    Some(Correlation { r, p_value })
}

/// One-way ANOVA across groups
///
/// Empty groups are ignored; requires at least two non-empty groups and more
/// observations than groups. Zero within-group variance with distinct group
/// means is perfect separation; zero variance everywhere is undefined.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<TestResult> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    if k < 2 {
        return None;
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n <= k {
        return None;
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &groups {
        let group_mean = mean(group)?;
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;
    let ms_within = ss_within / df_within;
    if ms_within <= 0.0 {
        return (ss_between > 0.0).then_some(TestResult { statistic: f64::INFINITY, p_value: 0.0 });
    }

    let f = (ss_between / df_between) / ms_within;
    let dist = FisherSnedecor::new(df_between, df_within).ok()?;
    let p_value = dist.sf(f);

    Some(TestResult { statistic: f, p_value })
}

/// Two-sample Student t-test with pooled variance
///
/// Requires both samples non-empty and at least one residual degree of
/// freedom. Zero pooled variance with distinct means gives t = ±∞, p = 0.
pub fn two_sample_t_test(a: &[f64], b: &[f64]) -> Option<TestResult> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    if df < 1.0 {
        return None;
    }

    let m1 = mean(a)?;
    let m2 = mean(b)?;
    let ss1: f64 = a.iter().map(|v| (v - m1).powi(2)).sum();
    let ss2: f64 = b.iter().map(|v| (v - m2).powi(2)).sum();
    let pooled = (ss1 + ss2) / df;
    if pooled <= 0.0 {
        if m1 == m2 {
            return None;
        }
        let statistic = if m1 > m2 { f64::INFINITY } else { f64::NEG_INFINITY };
        return Some(TestResult { statistic, p_value: 0.0 });
    }

    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    let t = (m1 - m2) / se;
    let p_value = two_sided_t_p_value(t, df)?;

    Some(TestResult { statistic: t, p_value })
}

fn two_sided_t_p_value(t: f64, df: f64) -> Option<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).min(1.0))
}
