use crate::analysis::environmental::{harmful_practice_keys, HarmfulPractice};
use crate::report::types::SurveyReport;

/// Standing recommendations closing every executive summary
pub const PRIORITY_RECOMMENDATIONS: [&str; 5] = [
    "Formation urgente sur l'utilisation sécurisée des pesticides",
    "Promotion du Système de Riziculture Intensive (SRI)",
    "Mise en place de systèmes de collecte des déchets chimiques",
    "Protection renforcée des groupes vulnérables (femmes, jeunes)",
    "Programme de reboisement et conservation de la biodiversité",
];

/// Markdown executive summary
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Format the report as a French executive summary
    ///
    /// Harmful practices are listed only above `display_threshold` percent.
    pub fn format(report: &SurveyReport, display_threshold: f64) -> String {
        let mut md = String::with_capacity(4096);

        md.push_str("# RÉSUMÉ EXÉCUTIF - ANALYSE ENVIRONNEMENTALE ET SANITAIRE\n\n");
        md.push_str(&format!(
            "Enquête auprès de {} riziculteurs (date de référence {}).\n\n",
            report.dataset.total_records, report.dataset.reference_date
        ));
        if !report.dataset.missing_fields.is_empty() {
            md.push_str(&format!(
                "*Champs absents du fichier ({}):* {}\n\n",
                report.dataset.missing_fields.len(),
                report.dataset.missing_fields.join(", ")
            ));
        }

        Self::format_key_indicators(&mut md, report);
        Self::format_harmful_practices(&mut md, report, display_threshold);
        Self::format_environment(&mut md, report);
        Self::format_health(&mut md, report);
        Self::format_water(&mut md, report);
        Self::format_correlation(&mut md, report);

        // Priority recommendations
        md.push_str("## Recommandations prioritaires\n\n");
        for (i, recommendation) in PRIORITY_RECOMMENDATIONS.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", i + 1, recommendation));
        }

        md
    }

    fn format_key_indicators(md: &mut String, report: &SurveyReport) {
        let env = &report.environmental.summary;
        let health = &report.health.summary;

        md.push_str("## Indicateurs clés\n\n");
        md.push_str("| Indicateur | Valeur |\n");
        md.push_str("|------------|--------|\n");
        md.push_str(&format!("| Agriculteurs enquêtés | {} |\n", env.total_farmers));
        md.push_str(&format!("| Taux de déforestation | {:.1}% |\n", env.deforestation_rate));
        md.push_str(&format!("| Impact sur biodiversité | {:.1}% |\n", env.biodiversity_impact_rate));
        md.push_str(&format!(
            "| Consommation eau moyenne | {} |\n",
            Self::optional(report.water.summary.average_consumption_m3, "m³/ha", 0)
        ));
        md.push_str(&format!(
            "| Sans protection pesticides | {} agriculteurs |\n",
            health.no_protection_count
        ));
        md.push_str(&format!("| Travail des enfants | {:.1}% |\n", health.child_labor_rate));
        md.push_str("\n");
    }

    fn format_harmful_practices(md: &mut String, report: &SurveyReport, threshold: f64) {
        md.push_str("## Pratiques nuisibles principales\n\n");

        // Most widespread first; equal rates keep the fixed practice order
        let practices = &report.environmental.harmful_practices;
        let mut shown: Vec<&HarmfulPractice> = harmful_practice_keys()
            .filter_map(|key| practices.get(key))
            .filter(|practice| practice.percentage > threshold)
            .collect();
        shown.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        for practice in &shown {
            md.push_str(&format!(
                "- **{}**: {:.1}% ({} cas)  \n  *Impact:* {}\n",
                practice.description, practice.percentage, practice.count, practice.impact
            ));
        }
        if shown.is_empty() {
            md.push_str(&format!("Aucune pratique ne dépasse {:.0}% des agriculteurs.\n", threshold));
        }
        md.push_str("\n");
    }

    fn format_environment(md: &mut String, report: &SurveyReport) {
        let env = &report.environmental;

        md.push_str("## Impacts environnementaux\n\n");
        if let Some(practice) = &env.summary.main_harmful_practice {
            md.push_str(&format!("- Pratique la plus répandue: {}\n", practice));
        }
        md.push_str(&format!(
            "- Déforestation mentionnée par {} agriculteurs ({:.1}%)\n",
            env.deforestation.farmers_mentioning, env.deforestation.percentage
        ));
        md.push_str(&format!(
            "- Impacts négatifs sur la biodiversité: {:.1}%\n",
            env.biodiversity.negative_impact_percentage
        ));
        md.push_str(&format!(
            "- Déclin chez les utilisateurs de pesticides: {} (non-utilisateurs: {})\n",
            Self::optional(env.biodiversity.decline_rate_with_pesticides, "%", 1),
            Self::optional(env.biodiversity.decline_rate_without_pesticides, "%", 1)
        ));
        md.push_str("\n");
    }

    fn format_health(md: &mut String, report: &SurveyReport) {
        let health = &report.health;
        let levels = &health.pesticide_exposure.exposure_levels;

        md.push_str("## Exposition sanitaire\n\n");
        md.push_str(&format!(
            "- Exposition faible / moyenne / élevée: {} / {} / {}\n",
            levels.low.count, levels.medium.count, levels.high.count
        ));
        md.push_str(&format!(
            "- {} agriculteurs non formés à l'utilisation des pesticides\n",
            health.summary.untrained_count
        ));
        md.push_str(&format!(
            "- Cas d'intoxication rapportés: {}\n",
            health.pesticide_exposure.health_impacts.intoxication_cases
        ));
        md.push_str(&format!(
            "- Pratiques dangereuses d'élimination des emballages: {}\n",
            health.fertilizer_exposure.dangerous_practices_count
        ));
        md.push_str(&format!(
            "- Emploi de femmes: {:.1}%, de jeunes: {:.1}%\n",
            health.vulnerable_groups.percentage_women, health.vulnerable_groups.percentage_youth
        ));
        md.push_str("\n");
    }

    fn format_water(md: &mut String, report: &SurveyReport) {
        let water = &report.water;

        md.push_str("## Utilisation de l'eau\n\n");
        md.push_str(&format!(
            "- Surconsommation: {:.1}% des agriculteurs\n",
            water.summary.high_consumption_percentage
        ));
        md.push_str(&format!(
            "- Volume total estimé: {:.0} m³\n",
            water.summary.total_water_used_m3
        ));
        md.push_str(&format!("- Application du SRI: {:.1}%\n", water.summary.sri_adoption_rate));
        md.push_str(&format!(
            "- Problèmes d'irrigation signalés: {} cas\n",
            water.summary.irrigation_problems
        ));
        md.push_str("\n");
    }

    fn format_correlation(md: &mut String, report: &SurveyReport) {
        let correlation = &report.correlation;

        md.push_str("## Facteurs socio-démographiques\n\n");
        if correlation.summary.significant_correlations.is_empty() {
            md.push_str("- Aucune corrélation significative\n");
        } else {
            md.push_str(&format!(
                "- Corrélations significatives: {}\n",
                correlation.summary.significant_correlations.join(", ")
            ));
        }
        md.push_str(&format!(
            "- Profils à haut risque (exposition élevée, protection faible): {}\n\n",
            correlation.summary.high_risk_count
        ));

        let fired: Vec<_> = correlation
            .combined_analysis
            .targeted_recommendations
            .iter()
            .filter(|r| r.target)
            .collect();
        if !fired.is_empty() {
            md.push_str("### Recommandations ciblées\n\n");
            for recommendation in fired {
                md.push_str(&format!("- {}\n", recommendation.message));
            }
            md.push_str("\n");
        }
    }

    fn optional(value: Option<f64>, unit: &str, precision: usize) -> String {
        match value {
            Some(v) => format!("{:.*} {}", precision, v, unit),
            None => "n/d".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze_correlations, analyze_environment, analyze_health, analyze_water};
    use crate::cleaning::test_support::{cleaned, reference_date};
    use crate::config::AnalysisConfig;
    use crate::record::CleanedRecord;
    use crate::report::ReportGenerator;
    use crate::schema::{SchemaResolution, SurveyField};

    fn report_for(records: &[CleanedRecord]) -> SurveyReport {
        let config = AnalysisConfig::default();
        ReportGenerator::assemble(
            ReportGenerator::dataset_summary(records, &SchemaResolution::default(), reference_date()),
            analyze_environment(records, &config),
            analyze_health(records, &config),
            analyze_water(records, &config),
            analyze_correlations(records, &config),
        )
    }

    #[test]
    fn test_format_markdown() {
        let records = vec![
            cleaned(&[
                (SurveyField::Age, "25"),
                (SurveyField::InputHerbicide, "1"),
                (SurveyField::PesticidePresence, "90"),
            ]),
            cleaned(&[(SurveyField::Age, "40"), (SurveyField::PesticidePresence, "10")]),
        ];
        let report = report_for(&records);

        let md = MarkdownFormatter::format(&report, 30.0);

        assert!(md.starts_with("# RÉSUMÉ EXÉCUTIF"));
        assert!(md.contains("| Agriculteurs enquêtés | 2 |"));
        assert!(md.contains("## Pratiques nuisibles principales"));
        assert!(md.contains("1. Formation urgente sur l'utilisation sécurisée des pesticides"));
        assert!(md.contains("5. Programme de reboisement et conservation de la biodiversité"));
        assert!(md.contains("Formation intensive sur les risques des pesticides pour les jeunes agriculteurs"));
    }

    #[test]
    fn test_harmful_practices_most_widespread_first() {
        let records = vec![
            cleaned(&[(SurveyField::InputHerbicide, "1"), (SurveyField::InputChemicalFertilizer, "1")]),
            cleaned(&[(SurveyField::InputChemicalFertilizer, "1")]),
            cleaned(&[(SurveyField::InputChemicalFertilizer, "1"), (SurveyField::ProtectionEquipment, "habit_lourd")]),
        ];
        let report = report_for(&records);

        let md = MarkdownFormatter::format(&report, 30.0);

        // engrais 100%, pas de protection 66.7%, herbicides 33.3%
        let fertilizer = md.find("Utilisation d'engrais chimiques").unwrap();
        let protection = md.find("Absence ou insuffisance").unwrap();
        let herbicide = md.find("Utilisation d'herbicides chimiques").unwrap();
        assert!(fertilizer < protection);
        assert!(protection < herbicide);
    }

    #[test]
    fn test_empty_survey_renders() {
        let md = MarkdownFormatter::format(&report_for(&[]), 30.0);

        assert!(md.contains("| Consommation eau moyenne | n/d |"));
        assert!(md.contains("Aucune pratique ne dépasse 30%"));
        assert!(!md.contains("### Recommandations ciblées"));
    }
}
