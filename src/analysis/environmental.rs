//! ENVIRONMENTAL IMPACT
//!
//! Three views of the farms' environmental footprint:
//!   1. Harmful practices: six fixed indicators, each a rate over all farmers
//!   2. Deforestation: keyword mentions across three free-text answers, plus
//!      the cultivated surface per year
//!   3. Biodiversity: first-match categorisation of the observed change, and
//!      the decline rate among pesticide users vs non-users

use crate::config::AnalysisConfig;
use crate::record::CleanedRecord;
use crate::schema::SurveyField;
use crate::utils::{percentage, KeywordCategorizer, KeywordMatcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

const DEFORESTATION_KEYWORDS: &[&str] = &["déforestation", "coupe", "arbres", "défrichement", "déboisement"];

const DEFORESTATION_FIELDS: &[SurveyField] = &[
    SurveyField::BiodiversityChange,
    SurveyField::Manifestation,
    SurveyField::SurfaceExtension,
];

const SURFACE_FIELDS: &[(SurveyField, &str)] = &[
    (SurveyField::Surface2023, "2023"),
    (SurveyField::Surface2024, "2024"),
    (SurveyField::Surface2025, "2025"),
];

/// Biodiversity categories, checked in order
const BIODIVERSITY_CATEGORIES: &[(&str, &[&str])] = &[
    ("disparition", &["disparition", "disparu"]),
    ("diminution", &["diminution", "réduit", "baisse"]),
    ("proliferation_negative", &["prolifération", "herbe", "adventice", "mauvaise"]),
    ("pas_de_changement", &["pas de changement", "rien", "néant", "non"]),
];

const UNSPECIFIED_CATEGORY: &str = "non_specifie";

/// Harmful practice rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmfulPractice {
    pub count: usize,
    pub percentage: f64,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeforestationReport {
    /// Farmers with at least one deforestation keyword in any answer
    pub farmers_mentioning: usize,
    pub percentage: f64,
    /// Summed cultivated surface (ha) per year
    pub surface_evolution: BTreeMap<String, f64>,
    /// Keyword → number of (farmer, answer) mentions
    pub keyword_frequency: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiodiversityReport {
    pub impact_distribution: BTreeMap<String, usize>,
    /// Disappearance, decline or harmful proliferation, over all farmers
    pub negative_impact_percentage: f64,
    /// Disappearance/decline rate among pesticide users; `None` without users
    pub decline_rate_with_pesticides: Option<f64>,
    pub decline_rate_without_pesticides: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalSummary {
    pub total_farmers: usize,
    /// Key of the practice with the highest rate; `None` for an empty survey
    pub main_harmful_practice: Option<String>,
    pub deforestation_rate: f64,
    pub biodiversity_impact_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalReport {
    pub harmful_practices: BTreeMap<String, HarmfulPractice>,
    pub deforestation: DeforestationReport,
    pub biodiversity: BiodiversityReport,
    pub summary: EnvironmentalSummary,
}

/// One harmful-practice indicator
struct PracticeRule {
    key: &'static str,
    description: &'static str,
    impact: &'static str,
    indicator: fn(&CleanedRecord, &AnalysisConfig) -> bool,
}

const HARMFUL_PRACTICES: &[PracticeRule] = &[
    PracticeRule {
        key: "pesticides_chimiques",
        description: "Utilisation d'herbicides chimiques",
        impact: "Pollution des sols et de l'eau, risques sanitaires",
        indicator: |r, _| r.raw.is_set(SurveyField::InputHerbicide),
    },
    PracticeRule {
        key: "engrais_chimiques",
        description: "Utilisation d'engrais chimiques (urée, NPK)",
        impact: "Eutrophisation, pollution des nappes phréatiques",
        indicator: |r, _| r.raw.is_set(SurveyField::InputChemicalFertilizer),
    },
    PracticeRule {
        key: "brulage_dechets",
        description: "Brûlage des contenants de produits chimiques",
        impact: "Pollution atmosphérique, émission de dioxines",
        indicator: |r, _| r.raw.get(SurveyField::ContainerDisposal).contains_text("brûl"),
    },
    PracticeRule {
        key: "pas_de_protection",
        description: "Absence ou insuffisance d'équipements de protection",
        impact: "Exposition directe aux produits toxiques",
        indicator: |r, c| r.protection_factor >= c.thresholds.weak_protection_min,
    },
    PracticeRule {
        key: "surconsommation_eau",
        description: "Surconsommation d'eau (>16250 m³/ha)",
        impact: "Épuisement des ressources hydriques",
        indicator: |r, c| r.water_consumption().map_or(false, |w| w > c.thresholds.water_consumption_high),
    },
    PracticeRule {
        key: "pas_de_rotation",
        description: "Absence de rotation des cultures",
        impact: "Épuisement des sols, prolifération des ravageurs",
        // Only an explicit "no rotation" answer counts
        indicator: |r, _| r.raw.flag(SurveyField::RotationPractice) == Some(false),
    },
];

/// Practice keys in their fixed reporting order
pub fn harmful_practice_keys() -> impl Iterator<Item = &'static str> {
    HARMFUL_PRACTICES.iter().map(|rule| rule.key)
}

/// Rate of each harmful practice over all farmers
pub fn analyze_harmful_practices(
    records: &[CleanedRecord],
    config: &AnalysisConfig,
) -> BTreeMap<String, HarmfulPractice> {
    HARMFUL_PRACTICES
        .iter()
        .map(|rule| {
            let count = records.iter().filter(|r| (rule.indicator)(r, config)).count();
            let practice = HarmfulPractice {
                count,
                percentage: percentage(count, records.len()),
                description: rule.description.to_string(),
                impact: rule.impact.to_string(),
            };
            (rule.key.to_string(), practice)
        })
        .collect()
}

/// Highest-rate practice; ties go to the earlier practice in the fixed list
fn main_harmful_practice(practices: &BTreeMap<String, HarmfulPractice>, total: usize) -> Option<String> {
    if total == 0 {
        return None;
    }

    let mut best: Option<(&str, f64)> = None;
    for rule in HARMFUL_PRACTICES {
        let Some(practice) = practices.get(rule.key) else {
            continue;
        };
        if best.map_or(true, |(_, pct)| practice.percentage > pct) {
            best = Some((rule.key, practice.percentage));
        }
    }
    best.map(|(key, _)| key.to_string())
}

pub fn analyze_deforestation(records: &[CleanedRecord]) -> DeforestationReport {
    let matcher = KeywordMatcher::new(DEFORESTATION_KEYWORDS);
    let mut keyword_frequency: BTreeMap<String, usize> = BTreeMap::new();
    let mut farmers_mentioning = 0;

    for record in records {
        let mut mentioned = false;
        for field in DEFORESTATION_FIELDS {
            let Some(text) = record.raw.text(*field) else {
                continue;
            };
            for keyword in matcher.matched_keywords(text) {
                *keyword_frequency.entry(keyword.to_string()).or_insert(0) += 1;
                mentioned = true;
            }
        }
        if mentioned {
            farmers_mentioning += 1;
        }
    }

    let surface_evolution = SURFACE_FIELDS
        .iter()
        .map(|(field, year)| {
            let total: f64 = records.iter().filter_map(|r| r.raw.number(*field)).sum();
            (year.to_string(), total)
        })
        .collect();

    DeforestationReport {
        farmers_mentioning,
        percentage: percentage(farmers_mentioning, records.len()),
        surface_evolution,
        keyword_frequency,
    }
}

/// Category of one biodiversity answer; missing answers are unspecified
pub fn biodiversity_category<'a>(categorizer: &'a KeywordCategorizer, record: &CleanedRecord) -> &'a str {
    record
        .raw
        .text(SurveyField::BiodiversityChange)
        .and_then(|text| categorizer.categorize(text))
        .unwrap_or(UNSPECIFIED_CATEGORY)
}

pub fn analyze_biodiversity(records: &[CleanedRecord]) -> BiodiversityReport {
    let categorizer = KeywordCategorizer::new(BIODIVERSITY_CATEGORIES);

    let mut impact_distribution: BTreeMap<String, usize> = BIODIVERSITY_CATEGORIES
        .iter()
        .map(|(name, _)| name.to_string())
        .chain(std::iter::once(UNSPECIFIED_CATEGORY.to_string()))
        .map(|name| (name, 0))
        .collect();

    let mut negative = 0;
    let (mut users, mut users_declining) = (0usize, 0usize);
    let (mut non_users, mut non_users_declining) = (0usize, 0usize);

    for record in records {
        let category = biodiversity_category(&categorizer, record);
        *impact_distribution.entry(category.to_string()).or_insert(0) += 1;

        if matches!(category, "disparition" | "diminution" | "proliferation_negative") {
            negative += 1;
        }

        let declining = matches!(category, "disparition" | "diminution");
        if record.uses_pesticides {
            users += 1;
            users_declining += declining as usize;
        } else {
            non_users += 1;
            non_users_declining += declining as usize;
        }
    }

    BiodiversityReport {
        impact_distribution,
        negative_impact_percentage: percentage(negative, records.len()),
        decline_rate_with_pesticides: (users > 0).then(|| percentage(users_declining, users)),
        decline_rate_without_pesticides: (non_users > 0).then(|| percentage(non_users_declining, non_users)),
    }
}

/// Full environmental pass
pub fn analyze_environment(records: &[CleanedRecord], config: &AnalysisConfig) -> EnvironmentalReport {
    let harmful_practices = analyze_harmful_practices(records, config);
    let deforestation = analyze_deforestation(records);
    let biodiversity = analyze_biodiversity(records);

    let summary = EnvironmentalSummary {
        total_farmers: records.len(),
        main_harmful_practice: main_harmful_practice(&harmful_practices, records.len()),
        deforestation_rate: deforestation.percentage,
        biodiversity_impact_rate: biodiversity.negative_impact_percentage,
    };

    debug!(
        main_practice = ?summary.main_harmful_practice,
        deforestation_rate = summary.deforestation_rate,
        biodiversity_rate = summary.biodiversity_impact_rate,
        "Environmental analysis complete"
    );

    EnvironmentalReport {
        harmful_practices,
        deforestation,
        biodiversity,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::test_support::cleaned;
    use approx::assert_relative_eq;

    #[test]
    fn test_harmful_practices() {
        let config = AnalysisConfig::default();
        let records = vec![
            cleaned(&[
                (SurveyField::InputHerbicide, "1"),
                (SurveyField::ContainerDisposal, "Brûlé, enfouissement"),
                (SurveyField::ProtectionEquipment, "Voile"),
                (SurveyField::WaterQuantity, ">16250m3"),
                (SurveyField::RotationPractice, "0"),
            ]),
            cleaned(&[
                (SurveyField::InputChemicalFertilizer, "1"),
                (SurveyField::ProtectionEquipment, "habit_lourd"),
                (SurveyField::WaterQuantity, "13001-16250m3"),
                (SurveyField::RotationPractice, "1"),
            ]),
            // Nothing answered: only the missing-protection default applies
            cleaned(&[]),
            cleaned(&[(SurveyField::InputHerbicide, "1"), (SurveyField::ProtectionEquipment, "habit_lourd")]),
        ];

        let practices = analyze_harmful_practices(&records, &config);

        assert_eq!(practices["pesticides_chimiques"].count, 2);
        assert_eq!(practices["engrais_chimiques"].count, 1);
        assert_eq!(practices["brulage_dechets"].count, 1);
        assert_eq!(practices["pas_de_protection"].count, 2);
        assert_eq!(practices["surconsommation_eau"].count, 1);
        assert_eq!(practices["pas_de_rotation"].count, 1);
        assert_relative_eq!(practices["pesticides_chimiques"].percentage, 50.0);

        // Tie between herbicides and missing protection: first in the fixed order wins
        assert_eq!(
            main_harmful_practice(&practices, records.len()).as_deref(),
            Some("pesticides_chimiques")
        );
    }

    #[test]
    fn test_deforestation_mentions_and_surfaces() {
        let records = vec![
            cleaned(&[
                (SurveyField::Manifestation, "coupe des arbres"),
                (SurveyField::SurfaceExtension, "oui, défrichement"),
                (SurveyField::Surface2023, "2"),
                (SurveyField::Surface2025, "3.5"),
            ]),
            cleaned(&[(SurveyField::Surface2023, "1"), (SurveyField::Surface2024, "n/a")]),
        ];

        let report = analyze_deforestation(&records);

        assert_eq!(report.farmers_mentioning, 1);
        assert_relative_eq!(report.percentage, 50.0);
        assert_eq!(report.keyword_frequency["coupe"], 1);
        assert_eq!(report.keyword_frequency["arbres"], 1);
        assert_eq!(report.keyword_frequency["défrichement"], 1);
        assert_relative_eq!(report.surface_evolution["2023"], 3.0);
        assert_relative_eq!(report.surface_evolution["2024"], 0.0);
        assert_relative_eq!(report.surface_evolution["2025"], 3.5);
    }

    #[test]
    fn test_biodiversity_categories_and_pesticide_split() {
        let records = vec![
            cleaned(&[
                (SurveyField::BiodiversityChange, "Disparition des poissons"),
                (SurveyField::InputHerbicide, "1"),
            ]),
            cleaned(&[
                (SurveyField::BiodiversityChange, "prolifération des mauvaises herbes"),
                (SurveyField::InputHerbicide, "1"),
            ]),
            cleaned(&[(SurveyField::BiodiversityChange, "rien")]),
            cleaned(&[]),
        ];

        let report = analyze_biodiversity(&records);

        assert_eq!(report.impact_distribution["disparition"], 1);
        assert_eq!(report.impact_distribution["proliferation_negative"], 1);
        assert_eq!(report.impact_distribution["pas_de_changement"], 1);
        assert_eq!(report.impact_distribution["non_specifie"], 1);
        assert_eq!(report.impact_distribution["diminution"], 0);
        assert_relative_eq!(report.negative_impact_percentage, 50.0);
        assert_eq!(report.decline_rate_with_pesticides, Some(50.0));
        assert_eq!(report.decline_rate_without_pesticides, Some(0.0));
    }

    #[test]
    fn test_empty_survey() {
        let report = analyze_environment(&[], &AnalysisConfig::default());

        assert_eq!(report.summary.total_farmers, 0);
        assert_eq!(report.summary.main_harmful_practice, None);
        assert_eq!(report.harmful_practices["pas_de_protection"].percentage, 0.0);
        assert_eq!(report.biodiversity.decline_rate_with_pesticides, None);
    }
}
