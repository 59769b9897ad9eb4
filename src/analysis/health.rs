//! HEALTH EXPOSURE
//!
//! Pesticide exposure (product types, exposure buckets, protection, reported
//! health effects, training), fertiliser exposure (quantities, container
//! disposal, collection systems) and the exposure of vulnerable groups
//! employed on the farms.

use crate::analysis::{AnswerCount, CategoryStats};
use crate::config::AnalysisConfig;
use crate::record::CleanedRecord;
use crate::schema::SurveyField;
use crate::utils::answer_counter::count_equal;
use crate::utils::stats::mean;
use crate::utils::{count_listed_answers, most_common, percentage, KeywordMatcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const TOP_PESTICIDES: usize = 10;

const COMMON_SYMPTOMS: &[&str] = &["intoxication", "yeux", "plaie", "rhumatisme", "respiratoire"];

const DANGEROUS_DISPOSAL: &[&str] = &["brûlé", "enfouissement", "canal", "jeté"];

/// Fertiliser quantity bands (upper bounds inclusive)
const FERTILIZER_LOW_MAX: f64 = 3.0;
const FERTILIZER_MEDIUM_MAX: f64 = 6.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureLevels {
    /// Score ≤ low threshold (20)
    pub low: CategoryStats,
    /// Low threshold < score ≤ risk threshold (50)
    pub medium: CategoryStats,
    /// Score > risk threshold
    pub high: CategoryStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionUsage {
    /// Factor < 0.5
    pub adequate: usize,
    /// Factor in [0.5, 1.0)
    pub minimal: usize,
    /// Factor = 1.0
    pub none: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthImpacts {
    /// Farmers who described an accident or intoxication
    pub intoxication_cases: usize,
    /// Farmers answering "oui" to disease emergence
    pub disease_emergence: usize,
    pub symptom_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCounts {
    pub trained: usize,
    pub not_trained: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PesticideExposure {
    pub pesticide_types: Vec<AnswerCount>,
    pub exposure_levels: ExposureLevels,
    pub protection_usage: ProtectionUsage,
    pub health_impacts: HealthImpacts,
    pub training: TrainingCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilizerExposure {
    /// faible / moyen / eleve / non_specifie
    pub usage: BTreeMap<String, usize>,
    pub average_quantity: Option<f64>,
    pub waste_management: Vec<AnswerCount>,
    /// Disposal mentions matching a dangerous method
    pub dangerous_practices_count: usize,
    pub has_collection_system: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    pub women: usize,
    pub youth: usize,
    pub disabled: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerableGroups {
    pub child_labor_cases: usize,
    pub employment: Employment,
    /// Mean protection factor on farms employing women
    pub protection_women: Option<f64>,
    /// Mean protection factor on farms employing youth
    pub protection_youth: Option<f64>,
    pub percentage_women: f64,
    pub percentage_youth: f64,
    pub percentage_children: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub high_exposure_count: usize,
    pub no_protection_count: usize,
    pub untrained_count: usize,
    pub child_labor_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub pesticide_exposure: PesticideExposure,
    pub fertilizer_exposure: FertilizerExposure,
    pub vulnerable_groups: VulnerableGroups,
    pub summary: HealthSummary,
}

/// Exposure buckets over all farmers
pub fn exposure_levels(records: &[CleanedRecord], config: &AnalysisConfig) -> ExposureLevels {
    let low_max = config.thresholds.exposure_low_max;
    let risk = config.thresholds.pesticide_exposure_risk;

    let mut low = Vec::new();
    let mut medium = Vec::new();
    let mut high = Vec::new();
    for score in records.iter().map(|r| r.pesticide_exposure_score) {
        if score <= low_max {
            low.push(score);
        } else if score <= risk {
            medium.push(score);
        } else {
            high.push(score);
        }
    }

    let total = records.len();
    ExposureLevels {
        low: CategoryStats::from_values(&low, total),
        medium: CategoryStats::from_values(&medium, total),
        high: CategoryStats::from_values(&high, total),
    }
}

pub fn protection_usage(records: &[CleanedRecord]) -> ProtectionUsage {
    let mut usage = ProtectionUsage::default();
    for factor in records.iter().map(|r| r.protection_factor) {
        if factor < 0.5 {
            usage.adequate += 1;
        } else if factor < 1.0 {
            usage.minimal += 1;
        } else {
            usage.none += 1;
        }
    }
    usage
}

pub fn analyze_pesticide_exposure(records: &[CleanedRecord], config: &AnalysisConfig) -> PesticideExposure {
    let pesticide_counts = count_listed_answers(records, SurveyField::PesticidesUsed);

    let symptom_distribution = COMMON_SYMPTOMS
        .iter()
        .map(|symptom| {
            let count = records
                .iter()
                .filter(|r| r.raw.get(SurveyField::Manifestation).contains_text(symptom))
                .count();
            (symptom.to_string(), count)
        })
        .collect();

    PesticideExposure {
        pesticide_types: AnswerCount::from_ranked(most_common(&pesticide_counts, Some(TOP_PESTICIDES))),
        exposure_levels: exposure_levels(records, config),
        protection_usage: protection_usage(records),
        health_impacts: HealthImpacts {
            intoxication_cases: records
                .iter()
                .filter(|r| r.raw.get(SurveyField::IntoxicationAccount).is_present())
                .count(),
            disease_emergence: count_equal(records, SurveyField::DiseaseEmergence, "oui"),
            symptom_distribution,
        },
        training: TrainingCounts {
            trained: count_equal(records, SurveyField::AgrochemicalTraining, "oui"),
            not_trained: count_equal(records, SurveyField::AgrochemicalTraining, "non"),
        },
    }
}

/// Band of a fertiliser quantity; unparseable → non_specifie
pub fn fertilizer_category(quantity: Option<f64>) -> &'static str {
    match quantity {
        None => "non_specifie",
        Some(q) if q <= FERTILIZER_LOW_MAX => "faible",
        Some(q) if q <= FERTILIZER_MEDIUM_MAX => "moyen",
        Some(_) => "eleve",
    }
}

pub fn analyze_fertilizer_exposure(records: &[CleanedRecord]) -> FertilizerExposure {
    let quantities: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.raw.number(SurveyField::FertilizerQuantity))
        .collect();

    let mut usage: BTreeMap<String, usize> = BTreeMap::new();
    for quantity in &quantities {
        *usage.entry(fertilizer_category(*quantity).to_string()).or_insert(0) += 1;
    }
    let defined: Vec<f64> = quantities.iter().flatten().copied().collect();

    let waste_counts = count_listed_answers(records, SurveyField::ContainerDisposal);
    let dangerous = KeywordMatcher::new(DANGEROUS_DISPOSAL);
    let dangerous_practices_count = waste_counts
        .iter()
        .filter(|(method, _)| dangerous.matches(method))
        .map(|(_, count)| count)
        .sum();

    let has_collection_system = records
        .iter()
        .filter(|r| {
            let answer = r.raw.get(SurveyField::WasteCollection);
            answer.is_present() && !answer.eq_text("neant")
        })
        .count();

    FertilizerExposure {
        usage,
        average_quantity: mean(&defined),
        waste_management: AnswerCount::from_ranked(most_common(&waste_counts, None)),
        dangerous_practices_count,
        has_collection_system,
    }
}

pub fn analyze_vulnerable_groups(records: &[CleanedRecord]) -> VulnerableGroups {
    let employing = |field: SurveyField| {
        records.iter().filter(|r| r.raw.is_set(field)).collect::<Vec<_>>()
    };
    let women = employing(SurveyField::EmploysWomen);
    let youth = employing(SurveyField::EmploysYouth);
    let disabled = employing(SurveyField::EmploysDisabled);
    let child_labor_cases = count_equal(records, SurveyField::ChildLabor, "oui");

    let protection_of = |group: &[&CleanedRecord]| -> Option<f64> {
        let factors: Vec<f64> = group.iter().map(|r| r.protection_factor).collect();
        mean(&factors)
    };

    let total = records.len();
    VulnerableGroups {
        child_labor_cases,
        employment: Employment {
            women: women.len(),
            youth: youth.len(),
            disabled: disabled.len(),
        },
        protection_women: protection_of(&women),
        protection_youth: protection_of(&youth),
        percentage_women: percentage(women.len(), total),
        percentage_youth: percentage(youth.len(), total),
        percentage_children: percentage(child_labor_cases, total),
    }
}

/// Full health pass
pub fn analyze_health(records: &[CleanedRecord], config: &AnalysisConfig) -> HealthReport {
    let pesticide_exposure = analyze_pesticide_exposure(records, config);
    let fertilizer_exposure = analyze_fertilizer_exposure(records);
    let vulnerable_groups = analyze_vulnerable_groups(records);

    let summary = HealthSummary {
        high_exposure_count: pesticide_exposure.exposure_levels.high.count,
        no_protection_count: pesticide_exposure.protection_usage.none,
        untrained_count: pesticide_exposure.training.not_trained,
        child_labor_rate: vulnerable_groups.percentage_children,
    };

    debug!(
        high_exposure = summary.high_exposure_count,
        no_protection = summary.no_protection_count,
        untrained = summary.untrained_count,
        "Health analysis complete"
    );

    HealthReport {
        pesticide_exposure,
        fertilizer_exposure,
        vulnerable_groups,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::test_support::cleaned;
    use approx::assert_relative_eq;

    fn exposure_record(presence: &str, equipment: &str) -> CleanedRecord {
        cleaned(&[
            (SurveyField::PesticidePresence, presence),
            (SurveyField::ProtectionEquipment, equipment),
        ])
    }

    #[test]
    fn test_exposure_buckets_and_protection() {
        let config = AnalysisConfig::default();
        let records = vec![
            exposure_record("20", "neant"),        // 20 → low (boundary)
            exposure_record("40", "habit_lourd"),  // 20 → low
            exposure_record("50", "neant"),        // 50 → medium (boundary)
            exposure_record("80", "Voile"),        // 56 → high
        ];

        let levels = exposure_levels(&records, &config);
        assert_eq!(levels.low.count, 2);
        assert_eq!(levels.medium.count, 1);
        assert_eq!(levels.high.count, 1);
        assert_relative_eq!(levels.high.mean.unwrap(), 56.0, epsilon = 1e-9);
        assert_relative_eq!(levels.low.percentage, 50.0);

        let usage = protection_usage(&records);
        assert_eq!(usage, ProtectionUsage { adequate: 0, minimal: 2, none: 2 });
    }

    #[test]
    fn test_empty_buckets_report_zero() {
        let levels = exposure_levels(&[], &AnalysisConfig::default());
        assert_eq!(levels.high.count, 0);
        assert_eq!(levels.high.mean, None);
        assert_eq!(levels.high.percentage, 0.0);
    }

    #[test]
    fn test_health_impacts_and_training() {
        let config = AnalysisConfig::default();
        let records = vec![
            cleaned(&[
                (SurveyField::PesticidesUsed, "Glyphosate, propanil"),
                (SurveyField::IntoxicationAccount, "vertiges après traitement"),
                (SurveyField::DiseaseEmergence, "oui"),
                (SurveyField::Manifestation, "Irritation des yeux, plaie"),
                (SurveyField::AgrochemicalTraining, "oui"),
            ]),
            cleaned(&[
                (SurveyField::PesticidesUsed, "glyphosate"),
                (SurveyField::DiseaseEmergence, "non"),
                (SurveyField::AgrochemicalTraining, "non"),
            ]),
        ];

        let exposure = analyze_pesticide_exposure(&records, &config);

        assert_eq!(
            exposure.pesticide_types[0],
            AnswerCount { answer: "glyphosate".to_string(), count: 2 }
        );
        assert_eq!(exposure.health_impacts.intoxication_cases, 1);
        assert_eq!(exposure.health_impacts.disease_emergence, 1);
        assert_eq!(exposure.health_impacts.symptom_distribution["yeux"], 1);
        assert_eq!(exposure.health_impacts.symptom_distribution["plaie"], 1);
        assert_eq!(exposure.health_impacts.symptom_distribution["respiratoire"], 0);
        assert_eq!(exposure.training, TrainingCounts { trained: 1, not_trained: 1 });
    }

    #[test]
    fn test_fertilizer_exposure() {
        let records = vec![
            cleaned(&[
                (SurveyField::FertilizerQuantity, "2"),
                (SurveyField::ContainerDisposal, "Brûlé, jeté dans le canal"),
                (SurveyField::WasteCollection, "neant"),
            ]),
            cleaned(&[
                (SurveyField::FertilizerQuantity, "7,5"),
                (SurveyField::ContainerDisposal, "recyclage"),
                (SurveyField::WasteCollection, "collecte communale"),
            ]),
            cleaned(&[(SurveyField::FertilizerQuantity, "beaucoup")]),
        ];

        let report = analyze_fertilizer_exposure(&records);

        assert_eq!(report.usage["faible"], 1);
        assert_eq!(report.usage["eleve"], 1);
        assert_eq!(report.usage["non_specifie"], 1);
        assert_relative_eq!(report.average_quantity.unwrap(), 4.75);
        assert_eq!(report.dangerous_practices_count, 2);
        assert_eq!(report.has_collection_system, 1);
        assert_eq!(report.waste_management.len(), 3);
    }

    #[test]
    fn test_fertilizer_category_bounds() {
        assert_eq!(fertilizer_category(Some(3.0)), "faible");
        assert_eq!(fertilizer_category(Some(6.0)), "moyen");
        assert_eq!(fertilizer_category(Some(6.1)), "eleve");
        assert_eq!(fertilizer_category(None), "non_specifie");
    }

    #[test]
    fn test_vulnerable_groups() {
        let records = vec![
            cleaned(&[
                (SurveyField::EmploysWomen, "1"),
                (SurveyField::EmploysYouth, "1"),
                (SurveyField::ProtectionEquipment, "Voile"),
                (SurveyField::ChildLabor, "oui"),
            ]),
            cleaned(&[(SurveyField::EmploysWomen, "1")]),
            cleaned(&[(SurveyField::EmploysWomen, "0")]),
            cleaned(&[]),
        ];

        let groups = analyze_vulnerable_groups(&records);

        assert_eq!(groups.employment, Employment { women: 2, youth: 1, disabled: 0 });
        assert_relative_eq!(groups.protection_women.unwrap(), 0.85);
        assert_relative_eq!(groups.protection_youth.unwrap(), 0.7);
        assert_relative_eq!(groups.percentage_women, 50.0);
        assert_relative_eq!(groups.percentage_children, 25.0);
    }
}
