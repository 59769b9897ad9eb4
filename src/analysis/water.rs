//! WATER USE
//!
//! Consumption per hectare (statistics, four fixed buckets, estimated total
//! volume), irrigation methods / sources / energy, water-management practices
//! and a profitability-per-water efficiency score.
//!
//! Records whose consumption answer did not map to a bucket are excluded from
//! every consumption-based figure.

use crate::analysis::CategoryStats;
use crate::config::{lookup, AnalysisConfig};
use crate::record::CleanedRecord;
use crate::schema::{SurveyField, ENERGY_TYPES, IRRIGATION_METHODS, WATER_SOURCES};
use crate::utils::answer_counter::count_equal;
use crate::utils::stats::{self, mean};
use crate::utils::{count_flags, percentage, KeywordMatcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Efficiency is expressed per 10 000 m³
const EFFICIENCY_UNIT_M3: f64 = 10_000.0;

/// Bucket bounds (m³/ha)
const VERY_LOW_BELOW: f64 = 10_000.0;
const LOW_MAX: f64 = 13_000.0;

const SYSTEM_PROBLEMS: &[(&str, &[&str])] = &[
    ("ancien", &["ancien"]),
    ("manque_entretien", &["entretien"]),
    ("deficitaire", &["déficitaire", "deficitaire"]),
    ("archaique", &["archaique", "archaïque"]),
    ("pas_drainage", &["pas de drainage"]),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumptionStatistics {
    /// Records with a mapped consumption answer
    pub defined_count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One consumption bucket; percentage over records with defined consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionBucket {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalEstimation {
    /// Summed 2025 cultivated surface (ha)
    pub total_surface_ha: f64,
    /// Σ consumption × 2025 surface over farms with both values
    pub total_water_volume_m3: f64,
    pub average_per_farm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionReport {
    pub statistics: ConsumptionStatistics,
    pub distribution: Vec<ConsumptionBucket>,
    pub total_estimation: TotalEstimation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrigationReport {
    pub irrigation_methods: BTreeMap<String, usize>,
    pub water_sources: BTreeMap<String, usize>,
    pub energy_types: BTreeMap<String, usize>,
    pub pumping_percentage: f64,
    pub solar_energy_percentage: f64,
    /// Share of farms drawing from the Senegal river
    pub river_dependency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SriAdoption {
    pub knows_and_applies: usize,
    pub knows_but_not_applied: usize,
    pub does_not_know: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConservationPractices {
    pub buffer_zones: usize,
    pub contamination_strategies: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollutionPerception {
    pub turbid_water: usize,
    pub pesticide_residues: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementReport {
    pub sri_adoption: SriAdoption,
    pub system_problems: BTreeMap<String, usize>,
    pub conservation_practices: ConservationPractices,
    pub pollution_perception: PollutionPerception,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EfficiencyByConsumption {
    /// Consumption < 13 000
    pub low: Option<f64>,
    /// 13 000 ≤ consumption ≤ high threshold
    pub medium: Option<f64>,
    /// Consumption > high threshold
    pub high: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub average_efficiency: Option<f64>,
    pub efficiency_by_consumption: EfficiencyByConsumption,
    /// Campaigns-per-year answer → consumption stats
    pub campaigns_impact: BTreeMap<String, CategoryStats>,
    /// Efficiency below 1
    pub need_efficiency_improvement: usize,
    pub overconsumption_cases: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterSummary {
    pub average_consumption_m3: Option<f64>,
    pub total_water_used_m3: f64,
    /// Share of all farmers in the highest bucket
    pub high_consumption_percentage: f64,
    pub sri_adoption_rate: f64,
    pub irrigation_problems: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterReport {
    pub consumption: ConsumptionReport,
    pub irrigation: IrrigationReport,
    pub management: ManagementReport,
    pub efficiency: EfficiencyReport,
    pub summary: WaterSummary,
}

/// Bucket index of a consumption value
fn consumption_bucket(water: f64, high: f64) -> usize {
    if water < VERY_LOW_BELOW {
        0
    } else if water <= LOW_MAX {
        1
    } else if water <= high {
        2
    } else {
        3
    }
}

pub fn analyze_consumption(records: &[CleanedRecord], config: &AnalysisConfig) -> ConsumptionReport {
    let high = config.thresholds.water_consumption_high;
    let values: Vec<f64> = records.iter().filter_map(|r| r.water_consumption()).collect();

    let statistics = ConsumptionStatistics {
        defined_count: values.len(),
        mean: stats::mean(&values),
        median: stats::median(&values),
        std: stats::sample_std_dev(&values),
        min: stats::min(&values),
        max: stats::max(&values),
    };

    let labels = [
        "Très faible (<10000 m³/ha)".to_string(),
        "Faible (10000-13000 m³/ha)".to_string(),
        format!("Moyenne (13001-{} m³/ha)", high),
        format!("Élevée (>{} m³/ha)", high),
    ];
    let mut counts = [0usize; 4];
    for water in &values {
        counts[consumption_bucket(*water, high)] += 1;
    }
    let distribution = labels
        .into_iter()
        .zip(counts)
        .map(|(label, count)| ConsumptionBucket {
            label,
            count,
            percentage: percentage(count, values.len()),
        })
        .collect();

    let total_surface_ha: f64 = records
        .iter()
        .filter_map(|r| r.raw.number(SurveyField::Surface2025))
        .sum();
    let total_water_volume_m3: f64 = records
        .iter()
        .filter_map(|r| Some(r.water_consumption()? * r.raw.number(SurveyField::Surface2025)?))
        .sum();

    ConsumptionReport {
        statistics,
        distribution,
        total_estimation: TotalEstimation {
            total_surface_ha,
            total_water_volume_m3,
            average_per_farm: if records.is_empty() {
                0.0
            } else {
                total_water_volume_m3 / records.len() as f64
            },
        },
    }
}

pub fn analyze_irrigation(records: &[CleanedRecord]) -> IrrigationReport {
    let total = records.len();
    let set_share = |field: SurveyField| {
        percentage(records.iter().filter(|r| r.raw.is_set(field)).count(), total)
    };

    IrrigationReport {
        irrigation_methods: count_flags(records, IRRIGATION_METHODS),
        water_sources: count_flags(records, WATER_SOURCES),
        energy_types: count_flags(records, ENERGY_TYPES),
        pumping_percentage: set_share(SurveyField::IrrigationPumping),
        solar_energy_percentage: set_share(SurveyField::EnergySolar),
        river_dependency: set_share(SurveyField::SourceSenegalRiver),
    }
}

pub fn sri_adoption(records: &[CleanedRecord]) -> SriAdoption {
    let mut adoption = SriAdoption::default();

    for record in records {
        let answer = record.raw.get(SurveyField::SriKnowledge);
        let not_applied = answer.contains_text("pas appliqué");

        if answer.contains_text("oui") && !not_applied {
            adoption.knows_and_applies += 1;
        }
        if not_applied || answer.contains_text("pas utilisé") {
            adoption.knows_but_not_applied += 1;
        }
    }
    adoption.does_not_know = count_equal(records, SurveyField::SriKnowledge, "non");

    adoption
}

pub fn analyze_management(records: &[CleanedRecord]) -> ManagementReport {
    let system_problems = SYSTEM_PROBLEMS
        .iter()
        .map(|(name, keywords)| {
            let matcher = KeywordMatcher::new(*keywords);
            let count = records
                .iter()
                .filter(|r| matcher.matches_field(&r.raw, SurveyField::IrrigationSystemAssessment))
                .count();
            (name.to_string(), count)
        })
        .collect();

    let count_set = |field: SurveyField| records.iter().filter(|r| r.raw.is_set(field)).count();

    ManagementReport {
        sri_adoption: sri_adoption(records),
        system_problems,
        conservation_practices: ConservationPractices {
            buffer_zones: count_set(SurveyField::BufferZones),
            contamination_strategies: count_set(SurveyField::ContaminationStrategies),
        },
        pollution_perception: PollutionPerception {
            turbid_water: records
                .iter()
                .filter(|r| r.raw.get(SurveyField::WaterPollutionDescription).contains_text("trouble"))
                .count(),
            pesticide_residues: count_equal(records, SurveyField::PesticideResidues, "oui"),
        },
    }
}

/// Profitability score of a record; unmapped or missing → configured default
pub fn profitability_score(record: &CleanedRecord, config: &AnalysisConfig) -> f64 {
    record
        .raw
        .text(SurveyField::Profitability)
        .and_then(|answer| lookup(&config.profitability, answer))
        .unwrap_or(config.profitability_default)
}

/// Profitability per 10 000 m³; `None` without a positive consumption
pub fn water_efficiency(record: &CleanedRecord, config: &AnalysisConfig) -> Option<f64> {
    let water = record.water_consumption().filter(|w| *w > 0.0)?;
    Some(profitability_score(record, config) / (water / EFFICIENCY_UNIT_M3))
}

pub fn analyze_efficiency(records: &[CleanedRecord], config: &AnalysisConfig) -> EfficiencyReport {
    let high = config.thresholds.water_consumption_high;

    let mut all = Vec::new();
    let (mut low, mut medium, mut above) = (Vec::new(), Vec::new(), Vec::new());
    for record in records {
        let (Some(water), Some(efficiency)) = (record.water_consumption(), water_efficiency(record, config)) else {
            continue;
        };
        all.push(efficiency);
        if water < LOW_MAX {
            low.push(efficiency);
        } else if water <= high {
            medium.push(efficiency);
        } else {
            above.push(efficiency);
        }
    }

    let mut by_campaigns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in records {
        let campaigns = record.raw.get(SurveyField::CampaignsPerYear);
        let Some(water) = record.water_consumption() else {
            continue;
        };
        if campaigns.is_present() {
            by_campaigns.entry(campaigns.to_string()).or_default().push(water);
        }
    }
    let defined = records.iter().filter(|r| r.water_consumption_defined).count();
    let campaigns_impact = by_campaigns
        .into_iter()
        .map(|(campaigns, values)| (campaigns, CategoryStats::from_values(&values, defined)))
        .collect();

    EfficiencyReport {
        average_efficiency: mean(&all),
        efficiency_by_consumption: EfficiencyByConsumption {
            low: mean(&low),
            medium: mean(&medium),
            high: mean(&above),
        },
        campaigns_impact,
        need_efficiency_improvement: all.iter().filter(|e| **e < 1.0).count(),
        overconsumption_cases: above.len(),
    }
}

/// Full water pass
pub fn analyze_water(records: &[CleanedRecord], config: &AnalysisConfig) -> WaterReport {
    let consumption = analyze_consumption(records, config);
    let irrigation = analyze_irrigation(records);
    let management = analyze_management(records);
    let efficiency = analyze_efficiency(records, config);

    let high_bucket = consumption.distribution.last().map_or(0, |bucket| bucket.count);
    let summary = WaterSummary {
        average_consumption_m3: consumption.statistics.mean,
        total_water_used_m3: consumption.total_estimation.total_water_volume_m3,
        high_consumption_percentage: percentage(high_bucket, records.len()),
        sri_adoption_rate: percentage(management.sri_adoption.knows_and_applies, records.len()),
        irrigation_problems: management.system_problems.values().sum(),
    };

    debug!(
        mean_consumption = ?summary.average_consumption_m3,
        high_consumption_pct = summary.high_consumption_percentage,
        sri_rate = summary.sri_adoption_rate,
        "Water analysis complete"
    );

    WaterReport {
        consumption,
        irrigation,
        management,
        efficiency,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::test_support::cleaned;
    use approx::assert_relative_eq;

    fn water(answer: &str) -> CleanedRecord {
        cleaned(&[(SurveyField::WaterQuantity, answer)])
    }

    #[test]
    fn test_bucket_counts_sum_to_defined() {
        let config = AnalysisConfig::default();
        let records = vec![
            water("<10000m3"),
            water("10000-13000m3"),
            water("13001-16250m3"),
            water(">16250m3"),
            water(">16250m3"),
            water("je ne sais pas"),
            cleaned(&[]),
        ];

        let report = analyze_consumption(&records, &config);

        let counts: Vec<usize> = report.distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert_eq!(counts.iter().sum::<usize>(), report.statistics.defined_count);
        assert_eq!(report.statistics.defined_count, 5);
        assert_eq!(report.distribution[3].label, "Élevée (>16250 m³/ha)");
        assert_relative_eq!(report.distribution[3].percentage, 40.0);
        assert_relative_eq!(report.statistics.mean.unwrap(), 14825.0);
        assert_eq!(report.statistics.median, Some(14625.0));
        assert_eq!(report.statistics.min, Some(8000.0));
    }

    #[test]
    fn test_total_volume_uses_surface_2025() {
        let config = AnalysisConfig::default();
        let records = vec![
            cleaned(&[(SurveyField::WaterQuantity, "10000-13000m3"), (SurveyField::Surface2025, "2")]),
            cleaned(&[(SurveyField::Surface2025, "3")]),
        ];

        let report = analyze_consumption(&records, &config);

        assert_relative_eq!(report.total_estimation.total_surface_ha, 5.0);
        assert_relative_eq!(report.total_estimation.total_water_volume_m3, 23000.0);
        assert_relative_eq!(report.total_estimation.average_per_farm, 11500.0);
    }

    #[test]
    fn test_irrigation_indicators() {
        let records = vec![
            cleaned(&[
                (SurveyField::IrrigationPumping, "1"),
                (SurveyField::EnergySolar, "1"),
                (SurveyField::SourceSenegalRiver, "1"),
            ]),
            cleaned(&[(SurveyField::IrrigationGravity, "1"), (SurveyField::SourceSenegalRiver, "1")]),
        ];

        let report = analyze_irrigation(&records);

        assert_eq!(report.irrigation_methods["pompage"], 1);
        assert_eq!(report.irrigation_methods["gravitaire"], 1);
        assert_eq!(report.water_sources["fleuve senegal"], 2);
        assert_relative_eq!(report.pumping_percentage, 50.0);
        assert_relative_eq!(report.solar_energy_percentage, 50.0);
        assert_relative_eq!(report.river_dependency, 100.0);
    }

    #[test]
    fn test_sri_and_management() {
        let records = vec![
            cleaned(&[
                (SurveyField::SriKnowledge, "Oui, je l'applique"),
                (SurveyField::IrrigationSystemAssessment, "Ancien et manque d'entretien"),
                (SurveyField::BufferZones, "1"),
            ]),
            cleaned(&[
                (SurveyField::SriKnowledge, "oui mais pas appliqué"),
                (SurveyField::IrrigationSystemAssessment, "archaïque, pas de drainage"),
                (SurveyField::WaterPollutionDescription, "eau trouble"),
                (SurveyField::PesticideResidues, "oui"),
            ]),
            cleaned(&[(SurveyField::SriKnowledge, "non")]),
        ];

        let report = analyze_management(&records);

        assert_eq!(
            report.sri_adoption,
            SriAdoption { knows_and_applies: 1, knows_but_not_applied: 1, does_not_know: 1 }
        );
        assert_eq!(report.system_problems["ancien"], 1);
        assert_eq!(report.system_problems["manque_entretien"], 1);
        assert_eq!(report.system_problems["archaique"], 1);
        assert_eq!(report.system_problems["pas_drainage"], 1);
        assert_eq!(report.system_problems["deficitaire"], 0);
        assert_eq!(report.conservation_practices.buffer_zones, 1);
        assert_eq!(
            report.pollution_perception,
            PollutionPerception { turbid_water: 1, pesticide_residues: 1 }
        );
    }

    #[test]
    fn test_efficiency() {
        let config = AnalysisConfig::default();
        let records = vec![
            cleaned(&[
                (SurveyField::WaterQuantity, "<10000m3"),
                (SurveyField::Profitability, "tres rentable"),
                (SurveyField::CampaignsPerYear, "2"),
            ]),
            cleaned(&[
                (SurveyField::WaterQuantity, ">16250m3"),
                (SurveyField::Profitability, "pas rentable"),
                (SurveyField::CampaignsPerYear, "2"),
            ]),
            // Unmapped profitability scores the default
            cleaned(&[(SurveyField::WaterQuantity, "13001-16250m3"), (SurveyField::Profitability, "???")]),
            // No consumption: excluded
            cleaned(&[(SurveyField::Profitability, "tres rentable")]),
        ];

        let report = analyze_efficiency(&records, &config);

        assert_relative_eq!(report.efficiency_by_consumption.low.unwrap(), 3.75);
        assert_relative_eq!(report.efficiency_by_consumption.high.unwrap(), 0.0);
        assert_relative_eq!(report.efficiency_by_consumption.medium.unwrap(), 1.0 / 1.4625, epsilon = 1e-12);
        assert_eq!(report.need_efficiency_improvement, 2);
        assert_eq!(report.overconsumption_cases, 1);
        assert_eq!(report.campaigns_impact["2"].count, 2);
        assert_relative_eq!(report.campaigns_impact["2"].mean.unwrap(), 14000.0);
    }

    #[test]
    fn test_summary_over_all_farmers() {
        let config = AnalysisConfig::default();
        let records = vec![water(">16250m3"), cleaned(&[])];

        let report = analyze_water(&records, &config);

        assert_relative_eq!(report.summary.high_consumption_percentage, 50.0);
        assert_eq!(report.summary.average_consumption_m3, Some(20000.0));
    }
}
