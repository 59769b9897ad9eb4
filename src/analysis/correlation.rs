//! SOCIO-DEMOGRAPHIC CORRELATION
//!
//! Relates pesticide exposure to education, age and marital status:
//!   - education: one-way ANOVA of exposure across education answers
//!   - age: Pearson correlation of age vs exposure
//!   - marital status: pooled t-test, married vs other recorded statuses
//!
//! A test whose precondition fails (too few groups or observations, no
//! variation at all) reports `significant = false` with the statistic
//! undefined. Perfectly separated groups are significant with p = 0.
//!
//! The combined-factors pass weighs education and age by their absolute
//! correlation with exposure, profiles high-risk farmers (high exposure with
//! weak protection) and decides which targeted recommendations fire.

use crate::analysis::{mean_by, share_by, CategoryStats, SignificanceTest};
use crate::config::AnalysisConfig;
use crate::record::{AgeGroup, CleanedRecord};
use crate::schema::SurveyField;
use crate::utils::stats::{self, one_way_anova, pearson, pearson_r, two_sample_t_test};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Education ordinal at or below which a farmer counts as low-educated
const LOW_EDUCATION_MAX: u8 = 1;
/// Mean exposure of low-educated farmers above which awareness programmes fire
const LOW_EDUCATION_EXPOSURE: f64 = 30.0;
/// Share of married heads employing women above which family protection fires
const FAMILY_WOMEN_EMPLOYMENT_PCT: f64 = 50.0;

const SAFE_DISPOSAL: &[&str] = &["recyclage", "collecte"];

/// Direction of the education/exposure relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Negative,
    Positive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationGroup {
    pub sample_size: usize,
    pub avg_exposure: Option<f64>,
    /// Share using any protection (factor < 1.0)
    pub protection_usage: f64,
    pub training_rate: f64,
    /// Share recycling or handing containers to collection
    pub safe_disposal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationAnalysis {
    /// ANOVA F statistic across education answers
    pub anova: SignificanceTest,
    pub by_education_level: BTreeMap<String, EducationGroup>,
    /// Sign of the education-level/exposure correlation; `None` when undefined
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeGroupPractices {
    pub sample_size: usize,
    pub avg_exposure: Option<f64>,
    pub pesticide_usage: f64,
    /// `None` for the unspecified group
    pub avg_age: Option<f64>,
    pub protection_usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeAnalysis {
    /// Pearson r as statistic
    pub pearson: SignificanceTest,
    pub by_age_group: BTreeMap<String, AgeGroupPractices>,
    /// Experience answer → exposure stats
    pub by_experience: BTreeMap<String, CategoryStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaritalGroup {
    pub sample_size: usize,
    pub avg_exposure: Option<f64>,
    /// Over respondents who answered; `None` when nobody did
    pub employs_women: Option<f64>,
    pub employs_youth: Option<f64>,
    pub child_labor: f64,
    pub protection_usage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaritalAnalysis {
    /// t statistic, married vs not married
    pub t_test: SignificanceTest,
    pub by_marital_status: BTreeMap<String, MaritalGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorsImpact {
    /// |r| of education level vs exposure
    pub education_weight: Option<f64>,
    /// |r| of age vs exposure
    pub age_weight: Option<f64>,
    /// Training answer → mean exposure
    pub training_impact: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighRiskProfile {
    pub count: usize,
    pub avg_age: Option<f64>,
    pub education_distribution: BTreeMap<String, usize>,
    pub marital_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetedRecommendation {
    pub key: String,
    /// Whether the targeting rule fired
    pub target: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedAnalysis {
    pub factors_impact: FactorsImpact,
    pub high_risk_profile: HighRiskProfile,
    pub targeted_recommendations: Vec<TargetedRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub significant_correlations: Vec<String>,
    pub high_risk_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub education: EducationAnalysis,
    pub age: AgeAnalysis,
    pub marital_status: MaritalAnalysis,
    pub combined_analysis: CombinedAnalysis,
    pub summary: CorrelationSummary,
}

/// Group records by the text of a field; missing answers are skipped
fn group_by_answer(records: &[CleanedRecord], field: SurveyField) -> BTreeMap<String, Vec<&CleanedRecord>> {
    let mut groups: BTreeMap<String, Vec<&CleanedRecord>> = BTreeMap::new();
    for record in records {
        let answer = record.raw.get(field);
        if answer.is_present() {
            groups.entry(answer.to_string()).or_default().push(record);
        }
    }
    groups
}

fn exposures(records: &[&CleanedRecord]) -> Vec<f64> {
    records.iter().map(|r| r.pesticide_exposure_score).collect()
}

fn uses_protection(record: &CleanedRecord) -> bool {
    record.protection_factor < 1.0
}

fn safe_disposal(record: &CleanedRecord) -> bool {
    let answer = record.raw.get(SurveyField::ContainerDisposal);
    SAFE_DISPOSAL.iter().any(|keyword| answer.contains_text(keyword))
}

/// Share of set indicators among records that answered the question
fn answered_share(records: &[&CleanedRecord], field: SurveyField) -> Option<f64> {
    let answered: Vec<&CleanedRecord> = records
        .iter()
        .copied()
        .filter(|r| r.raw.flag(field).is_some())
        .collect();
    (!answered.is_empty()).then(|| share_by(&answered, |r| r.raw.is_set(field)))
}

fn distribution(records: &[&CleanedRecord], field: SurveyField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let answer = record.raw.get(field);
        if answer.is_present() {
            *counts.entry(answer.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Pearson r of education level vs exposure over all records
fn education_exposure_r(records: &[CleanedRecord]) -> Option<f64> {
    let levels: Vec<f64> = records.iter().map(|r| r.education_level as f64).collect();
    let scores: Vec<f64> = records.iter().map(|r| r.pesticide_exposure_score).collect();
    pearson_r(&levels, &scores)
}

/// (age, exposure) pairs of records with a defined age
fn age_exposure_pairs(records: &[CleanedRecord]) -> (Vec<f64>, Vec<f64>) {
    records
        .iter()
        .filter_map(|r| r.age_years.map(|age| (age as f64, r.pesticide_exposure_score)))
        .unzip()
}

pub fn analyze_education(records: &[CleanedRecord], config: &AnalysisConfig) -> EducationAnalysis {
    let groups = group_by_answer(records, SurveyField::Education);

    let samples: Vec<Vec<f64>> = groups.values().map(|group| exposures(group)).collect();
    let anova = SignificanceTest::from_result(one_way_anova(&samples), config.thresholds.significance_level);

    let by_education_level = groups
        .iter()
        .map(|(label, group)| {
            let stats = EducationGroup {
                sample_size: group.len(),
                avg_exposure: mean_by(group, |r| r.pesticide_exposure_score),
                protection_usage: share_by(group, uses_protection),
                training_rate: share_by(group, |r| r.raw.get(SurveyField::AgrochemicalTraining).eq_text("oui")),
                safe_disposal: share_by(group, safe_disposal),
            };
            (label.clone(), stats)
        })
        .collect();

    let trend = education_exposure_r(records).map(|r| if r < 0.0 { Trend::Negative } else { Trend::Positive });

    EducationAnalysis {
        anova,
        by_education_level,
        trend,
    }
}

pub fn analyze_age(records: &[CleanedRecord], config: &AnalysisConfig) -> AgeAnalysis {
    let (ages, scores) = age_exposure_pairs(records);
    let pearson = SignificanceTest::from_correlation(pearson(&ages, &scores), config.thresholds.significance_level);

    let mut age_groups: BTreeMap<String, Vec<&CleanedRecord>> = BTreeMap::new();
    for record in records {
        age_groups.entry(record.age_group.label().to_string()).or_default().push(record);
    }

    let by_age_group = age_groups
        .iter()
        .map(|(label, group)| {
            let avg_age = if label == AgeGroup::UNSPECIFIED_LABEL {
                None
            } else {
                let ages: Vec<f64> = group.iter().filter_map(|r| r.age_years).map(f64::from).collect();
                stats::mean(&ages)
            };
            let practices = AgeGroupPractices {
                sample_size: group.len(),
                avg_exposure: mean_by(group, |r| r.pesticide_exposure_score),
                pesticide_usage: share_by(group, |r| r.uses_pesticides),
                avg_age,
                protection_usage: share_by(group, uses_protection),
            };
            (label.clone(), practices)
        })
        .collect();

    let by_experience = group_by_answer(records, SurveyField::Experience)
        .into_iter()
        .map(|(experience, group)| {
            (experience, CategoryStats::from_values(&exposures(&group), records.len()))
        })
        .collect();

    AgeAnalysis {
        pearson,
        by_age_group,
        by_experience,
    }
}

pub fn analyze_marital_status(records: &[CleanedRecord], config: &AnalysisConfig) -> MaritalAnalysis {
    let groups = group_by_answer(records, SurveyField::MaritalStatus);

    // Missing status belongs to neither side of the test
    let (married, not_married): (Vec<&CleanedRecord>, Vec<&CleanedRecord>) = groups
        .values()
        .flatten()
        .copied()
        .partition(|r| r.raw.get(SurveyField::MaritalStatus).eq_text(&config.married_label));

    let t_test = SignificanceTest::from_result(
        two_sample_t_test(&exposures(&married), &exposures(&not_married)),
        config.thresholds.significance_level,
    );

    let by_marital_status = groups
        .iter()
        .map(|(status, group)| {
            let stats = MaritalGroup {
                sample_size: group.len(),
                avg_exposure: mean_by(group, |r| r.pesticide_exposure_score),
                employs_women: answered_share(group, SurveyField::EmploysWomen),
                employs_youth: answered_share(group, SurveyField::EmploysYouth),
                child_labor: share_by(group, |r| r.raw.get(SurveyField::ChildLabor).eq_text("oui")),
                protection_usage: share_by(group, uses_protection),
            };
            (status.clone(), stats)
        })
        .collect();

    MaritalAnalysis {
        t_test,
        by_marital_status,
    }
}

pub fn analyze_combined_factors(records: &[CleanedRecord], config: &AnalysisConfig) -> CombinedAnalysis {
    let thresholds = &config.thresholds;

    // ========================================================================
    // STEP 1: Factor weights
    // ========================================================================

    let (ages, scores) = age_exposure_pairs(records);
    let age_weight = if ages.len() > 2 {
        pearson_r(&ages, &scores).map(f64::abs)
    } else {
        None
    };

    let training_impact = group_by_answer(records, SurveyField::AgrochemicalTraining)
        .into_iter()
        .filter_map(|(answer, group)| Some((answer, stats::mean(&exposures(&group))?)))
        .collect();

    let factors_impact = FactorsImpact {
        education_weight: education_exposure_r(records).map(f64::abs),
        age_weight,
        training_impact,
    };

    // ========================================================================
    // STEP 2: High-risk profile (high exposure, weak protection)
    // ========================================================================

    let high_risk: Vec<&CleanedRecord> = records
        .iter()
        .filter(|r| {
            r.pesticide_exposure_score > thresholds.pesticide_exposure_risk
                && r.protection_factor >= thresholds.weak_protection_min
        })
        .collect();

    let high_risk_ages: Vec<f64> = high_risk.iter().filter_map(|r| r.age_years).map(f64::from).collect();
    let high_risk_profile = HighRiskProfile {
        count: high_risk.len(),
        avg_age: stats::mean(&high_risk_ages),
        education_distribution: distribution(&high_risk, SurveyField::Education),
        marital_distribution: distribution(&high_risk, SurveyField::MaritalStatus),
    };

    // ========================================================================
    // STEP 3: Targeting rules; an empty target group never fires
    // ========================================================================

    let young: Vec<&CleanedRecord> = records
        .iter()
        .filter(|r| r.age_group.label() == config.young_group_label)
        .collect();
    let low_education: Vec<&CleanedRecord> = records
        .iter()
        .filter(|r| r.education_level <= LOW_EDUCATION_MAX)
        .collect();
    let married: Vec<&CleanedRecord> = records
        .iter()
        .filter(|r| r.raw.get(SurveyField::MaritalStatus).eq_text(&config.married_label))
        .collect();

    let young_target = mean_by(&young, |r| r.protection_factor)
        .map_or(false, |protection| protection > thresholds.weak_protection_min);
    let low_education_target = mean_by(&low_education, |r| r.pesticide_exposure_score)
        .map_or(false, |exposure| exposure > LOW_EDUCATION_EXPOSURE);
    let family_target = answered_share(&married, SurveyField::EmploysWomen)
        .map_or(false, |share| share > FAMILY_WOMEN_EMPLOYMENT_PCT);

    let targeted_recommendations = vec![
        TargetedRecommendation {
            key: "young_farmers".to_string(),
            target: young_target,
            message: "Formation intensive sur les risques des pesticides pour les jeunes agriculteurs".to_string(),
        },
        TargetedRecommendation {
            key: "low_education".to_string(),
            target: low_education_target,
            message: "Programmes de sensibilisation adaptés pour les agriculteurs peu scolarisés".to_string(),
        },
        TargetedRecommendation {
            key: "family_heads".to_string(),
            target: family_target,
            message: "Protection renforcée pour les exploitations familiales".to_string(),
        },
    ];

    CombinedAnalysis {
        factors_impact,
        high_risk_profile,
        targeted_recommendations,
    }
}

/// Full correlation pass
pub fn analyze_correlations(records: &[CleanedRecord], config: &AnalysisConfig) -> CorrelationReport {
    let education = analyze_education(records, config);
    let age = analyze_age(records, config);
    let marital_status = analyze_marital_status(records, config);
    let combined_analysis = analyze_combined_factors(records, config);

    let significant_correlations = [
        ("education", education.anova.significant),
        ("age", age.pearson.significant),
        ("marital_status", marital_status.t_test.significant),
    ]
    .iter()
    .filter(|(_, significant)| *significant)
    .map(|(name, _)| name.to_string())
    .collect();

    let summary = CorrelationSummary {
        significant_correlations,
        high_risk_count: combined_analysis.high_risk_profile.count,
    };

    debug!(
        significant = ?summary.significant_correlations,
        high_risk = summary.high_risk_count,
        "Correlation analysis complete"
    );

    CorrelationReport {
        education,
        age,
        marital_status,
        combined_analysis,
        summary,
    }
}
