//! Survey Schema
//!
//! Typed enumeration of every questionnaire column the analyses read.
//!
//! The survey export uses long natural-language (French) headers, some with
//! trailing or doubled spaces, and a few questions exist under several labels
//! across questionnaire versions. Each `SurveyField` carries its canonical
//! label plus accepted aliases, and `SurveySchema::resolve` matches the whole
//! set against the actual header row once, at load time.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One expected input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurveyField {
    // Socio-demographics
    Age,
    Education,
    MaritalStatus,
    Experience,

    // Inputs and fertilisers (multi-select flags)
    InputHerbicide,
    InputBiopesticide,
    InputChemicalFertilizer,

    // Pesticide exposure
    PesticidePresence,
    ProtectionEquipment,
    PesticidesUsed,
    AgrochemicalTraining,
    FertilizerQuantity,
    ContainerDisposal,
    WasteCollection,

    // Environment
    BiodiversityChange,
    Manifestation,
    SurfaceExtension,
    SoilCondition,
    RotationPractice,
    BufferZones,
    ContaminationStrategies,
    Surface2023,
    Surface2024,
    Surface2025,

    // Health
    IntoxicationAccount,
    DiseaseEmergence,
    ChildLabor,
    EmploysWomen,
    EmploysYouth,
    EmploysDisabled,

    // Water use
    WaterQuantity,
    IrrigationGravity,
    IrrigationPumping,
    IrrigationRainfed,
    IrrigationFurrow,
    IrrigationOther,
    SourceSenegalRiver,
    SourceGuierLake,
    SourceBorehole,
    SourceChannel,
    SourceRain,
    SourceOther,
    EnergyDiesel,
    EnergySolar,
    EnergyElectricity,
    EnergyOther,
    SriKnowledge,
    IrrigationSystemAssessment,
    WaterPollutionDescription,
    PesticideResidues,
    Profitability,
    CampaignsPerYear,
}

impl SurveyField {
    /// Every field, in questionnaire order
    pub const ALL: [SurveyField; 52] = [
        SurveyField::Age,
        SurveyField::Education,
        SurveyField::MaritalStatus,
        SurveyField::Experience,
        SurveyField::InputHerbicide,
        SurveyField::InputBiopesticide,
        SurveyField::InputChemicalFertilizer,
        SurveyField::PesticidePresence,
        SurveyField::ProtectionEquipment,
        SurveyField::PesticidesUsed,
        SurveyField::AgrochemicalTraining,
        SurveyField::FertilizerQuantity,
        SurveyField::ContainerDisposal,
        SurveyField::WasteCollection,
        SurveyField::BiodiversityChange,
        SurveyField::Manifestation,
        SurveyField::SurfaceExtension,
        SurveyField::SoilCondition,
        SurveyField::RotationPractice,
        SurveyField::BufferZones,
        SurveyField::ContaminationStrategies,
        SurveyField::Surface2023,
        SurveyField::Surface2024,
        SurveyField::Surface2025,
        SurveyField::IntoxicationAccount,
        SurveyField::DiseaseEmergence,
        SurveyField::ChildLabor,
        SurveyField::EmploysWomen,
        SurveyField::EmploysYouth,
        SurveyField::EmploysDisabled,
        SurveyField::WaterQuantity,
        SurveyField::IrrigationGravity,
        SurveyField::IrrigationPumping,
        SurveyField::IrrigationRainfed,
        SurveyField::IrrigationFurrow,
        SurveyField::IrrigationOther,
        SurveyField::SourceSenegalRiver,
        SurveyField::SourceGuierLake,
        SurveyField::SourceBorehole,
        SurveyField::SourceChannel,
        SurveyField::SourceRain,
        SurveyField::SourceOther,
        SurveyField::EnergyDiesel,
        SurveyField::EnergySolar,
        SurveyField::EnergyElectricity,
        SurveyField::EnergyOther,
        SurveyField::SriKnowledge,
        SurveyField::IrrigationSystemAssessment,
        SurveyField::WaterPollutionDescription,
        SurveyField::PesticideResidues,
        SurveyField::Profitability,
        SurveyField::CampaignsPerYear,
    ];

    /// Canonical questionnaire header
    pub fn label(self) -> &'static str {
        match self {
            SurveyField::Age => "Age",
            SurveyField::Education => "niveau d'instruction ",
            SurveyField::MaritalStatus => "Situation matrimoniale",
            SurveyField::Experience => "Expérience en riziculture ",
            SurveyField::InputHerbicide => {
                "quels sont  les intrants  et  fertilisants que vous recevez ou utilisez/Herbicide"
            }
            SurveyField::InputBiopesticide => {
                "quels sont  les intrants  et  fertilisants que vous recevez ou utilisez/biopesticide"
            }
            SurveyField::InputChemicalFertilizer => {
                "quels sont  les intrants  et  fertilisants que vous recevez ou utilisez/engrais chimiques(uree, NPk...)"
            }
            SurveyField::PesticidePresence => {
                "sur une echelle de 1 a 100 notez la présence des pesticides dans les canaux"
            }
            SurveyField::ProtectionEquipment => {
                "quels equipements de protection utilisez vous lors de l'application de pesticides ou d'engrais?"
            }
            SurveyField::PesticidesUsed => "quels sont les pesticides que vous  utiliser ",
            SurveyField::AgrochemicalTraining => {
                "avez vous suivi une formation sur l'utilisation des produits agrochimiques"
            }
            SurveyField::FertilizerQuantity => "quelle quantite d'engrais chimique utiliser vous",
            SurveyField::ContainerDisposal => {
                "que faites vous des contenants vides de produits agrochimiques (sacs, bidons) après usage"
            }
            SurveyField::WasteCollection => {
                "avez vous un systeme de collecte ou de traitement des déchets agricoles (matières organique) et agrochimiques (contenant des pesticides)"
            }
            SurveyField::BiodiversityChange => {
                "depuis l'installation de la rizière, avez vous constaté une diminution, une prolifération ou une disparition des espèces végétales ou animale"
            }
            SurveyField::Manifestation => "comment ca se manifeste",
            SurveyField::SurfaceExtension => {
                "Avez vous beneficié d'une extention de vos surfaces rizicoles, si oui expliquez"
            }
            SurveyField::SoilCondition => "comment evaluez vous l'etat des sols",
            SurveyField::RotationPractice => {
                "utilisez vous des pratiques pour limiter l'impact de la riziculture sur l'environnement en adoptant ces mesures/rotation "
            }
            SurveyField::BufferZones => {
                "utilisez vous des pratiques pour limiter l'impact de la riziculture sur l'environnement en adoptant ces mesures/zones tamponspour proteger les cours d'eau"
            }
            SurveyField::ContaminationStrategies => {
                "utilisez vous des pratiques pour limiter l'impact de la riziculture sur l'environnement en adoptant ces mesures/strategies developpees pour eviter la contamination des eaux (digues, cordons, etc)"
            }
            SurveyField::Surface2023 => "Surperficie cultivée en 2023",
            SurveyField::Surface2024 => "Superficie cultivée en 2024",
            SurveyField::Surface2025 => "Superficie cultivée en 2025",
            SurveyField::IntoxicationAccount => {
                "pouvez vous raconter un cas d'accident ou d'intoxication lie à l'usage des produits chimiques? _1"
            }
            SurveyField::DiseaseEmergence => {
                "avez vous constaté une émergence de maladie liés à la production rizicole_1"
            }
            SurveyField::ChildLabor => {
                "Des enfants abandonnent ils  l'école pour venir travailler dans votre exploitation"
            }
            SurveyField::EmploysWomen => "employez vous /des femmes ",
            SurveyField::EmploysYouth => "employez vous /des jeunes",
            SurveyField::EmploysDisabled => "employez vous /des personnes en situation de handicap",
            SurveyField::WaterQuantity => "Quantité d'eau utilisée/ha en cas de pompage",
            SurveyField::IrrigationGravity => "les types d'irrigation utilisée /gravitaire",
            SurveyField::IrrigationPumping => "les types d'irrigation utilisée /pompage",
            SurveyField::IrrigationRainfed => "les types d'irrigation utilisée /pluvial unique",
            SurveyField::IrrigationFurrow => "les types d'irrigation utilisée /à la raie",
            SurveyField::IrrigationOther => "les types d'irrigation utilisée /autres",
            SurveyField::SourceSenegalRiver => "origine de l'eau /fleuve senegal",
            SurveyField::SourceGuierLake => "origine de l'eau /lac de guier",
            SurveyField::SourceBorehole => "origine de l'eau /Forage",
            SurveyField::SourceChannel => "origine de l'eau /chenal",
            SurveyField::SourceRain => "origine de l'eau /pluie",
            SurveyField::SourceOther => "origine de l'eau /autre ",
            SurveyField::EnergyDiesel => "Types d'energie pour l'irrigation pour /Gasoil",
            SurveyField::EnergySolar => "Types d'energie pour l'irrigation pour /solaire",
            SurveyField::EnergyElectricity => "Types d'energie pour l'irrigation pour /electricite",
            SurveyField::EnergyOther => "Types d'energie pour l'irrigation pour /autre",
            SurveyField::SriKnowledge => {
                "Avez vous connaissance du système de riziculture intensive qui consiste à produire avec moins d'eau et d'intrant agricole "
            }
            SurveyField::IrrigationSystemAssessment => {
                "comment jugez vous votre système d'irrigation et de drainage"
            }
            SurveyField::WaterPollutionDescription => {
                "comment decrivez vous la pollution de l'eau(eau trouble, mauvaise odeur, etc)"
            }
            SurveyField::PesticideResidues => {
                "votre zone est elle confrontée à la presence de residus de pesticides dans les canaux, expliquez_1"
            }
            SurveyField::Profitability => "comment notez vous la rentabilité de votre production",
            SurveyField::CampaignsPerYear => "Nombre de campagne par an",
        }
    }

    /// Alternative headers used by other questionnaire versions
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            SurveyField::IntoxicationAccount => &[
                "pouvez vous raconter un cas d'accident ou d'intoxication lie à l'usage des produits chimiques?",
                "accident intoxication produits chimiques",
            ],
            SurveyField::DiseaseEmergence => &[
                "avez vous constaté une émergence de maladie liés à la production rizicole",
                "emergence maladie production rizicole",
            ],
            SurveyField::PesticideResidues => &[
                "votre zone est elle confrontée à la presence de residus de pesticides dans les canaux",
                "presence residus pesticides canaux",
                "residus pesticides",
            ],
            _ => &[],
        }
    }

    /// Short identifier used for exported column names and logs
    pub fn key(self) -> &'static str {
        match self {
            SurveyField::Age => "age",
            SurveyField::Education => "education",
            SurveyField::MaritalStatus => "marital_status",
            SurveyField::Experience => "experience",
            SurveyField::InputHerbicide => "input_herbicide",
            SurveyField::InputBiopesticide => "input_biopesticide",
            SurveyField::InputChemicalFertilizer => "input_chemical_fertilizer",
            SurveyField::PesticidePresence => "pesticide_presence",
            SurveyField::ProtectionEquipment => "protection_equipment",
            SurveyField::PesticidesUsed => "pesticides_used",
            SurveyField::AgrochemicalTraining => "agrochemical_training",
            SurveyField::FertilizerQuantity => "fertilizer_quantity",
            SurveyField::ContainerDisposal => "container_disposal",
            SurveyField::WasteCollection => "waste_collection",
            SurveyField::BiodiversityChange => "biodiversity_change",
            SurveyField::Manifestation => "manifestation",
            SurveyField::SurfaceExtension => "surface_extension",
            SurveyField::SoilCondition => "soil_condition",
            SurveyField::RotationPractice => "rotation_practice",
            SurveyField::BufferZones => "buffer_zones",
            SurveyField::ContaminationStrategies => "contamination_strategies",
            SurveyField::Surface2023 => "surface_2023",
            SurveyField::Surface2024 => "surface_2024",
            SurveyField::Surface2025 => "surface_2025",
            SurveyField::IntoxicationAccount => "intoxication_account",
            SurveyField::DiseaseEmergence => "disease_emergence",
            SurveyField::ChildLabor => "child_labor",
            SurveyField::EmploysWomen => "employs_women",
            SurveyField::EmploysYouth => "employs_youth",
            SurveyField::EmploysDisabled => "employs_disabled",
            SurveyField::WaterQuantity => "water_quantity",
            SurveyField::IrrigationGravity => "irrigation_gravity",
            SurveyField::IrrigationPumping => "irrigation_pumping",
            SurveyField::IrrigationRainfed => "irrigation_rainfed",
            SurveyField::IrrigationFurrow => "irrigation_furrow",
            SurveyField::IrrigationOther => "irrigation_other",
            SurveyField::SourceSenegalRiver => "source_senegal_river",
            SurveyField::SourceGuierLake => "source_guier_lake",
            SurveyField::SourceBorehole => "source_borehole",
            SurveyField::SourceChannel => "source_channel",
            SurveyField::SourceRain => "source_rain",
            SurveyField::SourceOther => "source_other",
            SurveyField::EnergyDiesel => "energy_diesel",
            SurveyField::EnergySolar => "energy_solar",
            SurveyField::EnergyElectricity => "energy_electricity",
            SurveyField::EnergyOther => "energy_other",
            SurveyField::SriKnowledge => "sri_knowledge",
            SurveyField::IrrigationSystemAssessment => "irrigation_system_assessment",
            SurveyField::WaterPollutionDescription => "water_pollution_description",
            SurveyField::PesticideResidues => "pesticide_residues",
            SurveyField::Profitability => "profitability",
            SurveyField::CampaignsPerYear => "campaigns_per_year",
        }
    }
}

impl fmt::Display for SurveyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Irrigation method flags with their report names
pub const IRRIGATION_METHODS: &[(SurveyField, &str)] = &[
    (SurveyField::IrrigationGravity, "gravitaire"),
    (SurveyField::IrrigationPumping, "pompage"),
    (SurveyField::IrrigationRainfed, "pluvial unique"),
    (SurveyField::IrrigationFurrow, "à la raie"),
    (SurveyField::IrrigationOther, "autres"),
];

/// Water source flags with their report names
pub const WATER_SOURCES: &[(SurveyField, &str)] = &[
    (SurveyField::SourceSenegalRiver, "fleuve senegal"),
    (SurveyField::SourceGuierLake, "lac de guier"),
    (SurveyField::SourceBorehole, "Forage"),
    (SurveyField::SourceChannel, "chenal"),
    (SurveyField::SourceRain, "pluie"),
    (SurveyField::SourceOther, "autre"),
];

/// Irrigation energy flags with their report names
pub const ENERGY_TYPES: &[(SurveyField, &str)] = &[
    (SurveyField::EnergyDiesel, "Gasoil"),
    (SurveyField::EnergySolar, "solaire"),
    (SurveyField::EnergyElectricity, "electricite"),
    (SurveyField::EnergyOther, "autre"),
];

/// Result of matching the schema against one header row
#[derive(Debug, Clone, Default)]
pub struct SchemaResolution {
    /// Field → header actually present in the input
    pub columns: FxHashMap<SurveyField, String>,
    /// Fields with no matching header, in questionnaire order
    pub missing: Vec<SurveyField>,
}

impl SchemaResolution {
    pub fn is_present(&self, field: SurveyField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn resolved_count(&self) -> usize {
        self.columns.len()
    }
}

/// Header matcher for the survey questionnaire
pub struct SurveySchema;

impl SurveySchema {
    /// Resolve every `SurveyField` against the input headers
    ///
    /// Matching order per field: exact canonical label, whitespace-trimmed
    /// canonical label, then each alias (exact, then trimmed). A header is
    /// claimed by at most one field.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> SchemaResolution {
        let mut resolution = SchemaResolution::default();
        let mut claimed: Vec<bool> = vec![false; headers.len()];

        for field in SurveyField::ALL {
            let candidates = std::iter::once(field.label()).chain(field.aliases().iter().copied());
            let mut found = None;

            for candidate in candidates {
                found = find_header(headers, &claimed, candidate);
                if found.is_some() {
                    break;
                }
            }

            match found {
                Some(idx) => {
                    claimed[idx] = true;
                    resolution
                        .columns
                        .insert(field, headers[idx].as_ref().to_string());
                }
                None => resolution.missing.push(field),
            }
        }

        resolution
    }
}

fn find_header<S: AsRef<str>>(headers: &[S], claimed: &[bool], label: &str) -> Option<usize> {
    let exact = headers
        .iter()
        .enumerate()
        .position(|(i, h)| !claimed[i] && h.as_ref() == label);
    if exact.is_some() {
        return exact;
    }

    let wanted = collapse_whitespace(label);
    headers
        .iter()
        .enumerate()
        .position(|(i, h)| !claimed[i] && collapse_whitespace(h.as_ref()) == wanted)
}

/// Trim and collapse internal runs of whitespace
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
