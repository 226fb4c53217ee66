//! Recommendation Engine
//!
//! Independent remediation rules evaluated in a fixed order against a
//! `FertilityResult`. Each rule fires at most once; a closing rule on the
//! composite score always fires last.

use serde::{Deserialize, Serialize};

use super::dosage::{nitrogen_dose, phosphorus_dose, potassium_dose, DoseUnit, Dosage, Product};
use super::fertility::FertilityResult;
use super::scoring::SoilParameter;
use super::types::Crop;

/// Trigger thresholds
const LIMING_PH_BELOW: f64 = 5.5;
const ACIDIFYING_PH_ABOVE: f64 = 7.5;
const ORGANIC_MATTER_BELOW: f64 = 2.0;

/// Urgency of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    MediumHigh,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::MediumHigh => "Medium-High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// What the recommendation asks the grower to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Liming,
    Acidification,
    OrganicMatter,
    NitrogenFertilization,
    PhosphorusFertilization,
    PotassiumFertilization,
    Maintain,
    Improve,
    IntegralPlan,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Liming => "Liming",
            ActionKind::Acidification => "Acidification",
            ActionKind::OrganicMatter => "Organic matter build-up",
            ActionKind::NitrogenFertilization => "Nitrogen fertilization",
            ActionKind::PhosphorusFertilization => "Phosphorus fertilization",
            ActionKind::PotassiumFertilization => "Potassium fertilization",
            ActionKind::Maintain => "Maintain",
            ActionKind::Improve => "Improve",
            ActionKind::IntegralPlan => "Integral plan",
        }
    }

    /// Closing rules summarise the plan rather than correct a parameter
    pub fn is_closing(&self) -> bool {
        matches!(self, ActionKind::Maintain | ActionKind::Improve | ActionKind::IntegralPlan)
    }
}

/// One entry of the action plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub action_kind: ActionKind,
    pub dosage: Option<Dosage>,
    pub notes: String,
}

impl Recommendation {
    fn new(priority: Priority, action_kind: ActionKind, notes: impl Into<String>) -> Self {
        Self {
            priority,
            action_kind,
            dosage: None,
            notes: notes.into(),
        }
    }

    fn with_dosage(mut self, dosage: Dosage) -> Self {
        self.dosage = Some(dosage);
        self
    }
}

/// Build the ordered action plan for a scored sample
///
/// Deterministic: the same result and crop always yield the same list.
pub fn generate_recommendations(result: &FertilityResult, crop: Crop) -> Vec<Recommendation> {
    let mut plan = Vec::new();

    let ph = result.value(SoilParameter::Ph);
    if ph < LIMING_PH_BELOW {
        plan.push(Recommendation::new(
            Priority::High,
            ActionKind::Liming,
            "Apply agricultural lime at 2-4 t/ha. Prefer dolomitic lime if magnesium is deficient. \
             Incorporate 3 months before sowing.",
        ));
    }
    if ph > ACIDIFYING_PH_ABOVE {
        plan.push(Recommendation::new(
            Priority::MediumHigh,
            ActionKind::Acidification,
            "Apply elemental sulfur at 500-1000 kg/ha. Consider gypsum. \
             Add acidifying organic amendments.",
        ));
    }

    if result.value(SoilParameter::OrganicMatter) < ORGANIC_MATTER_BELOW {
        plan.push(Recommendation::new(
            Priority::MediumHigh,
            ActionKind::OrganicMatter,
            "Apply composted manure at 10-20 t/ha. Sow green manures. \
             Adopt no-till with cover crops. Apply compost at 5-10 t/ha.",
        ));
    }

    if is_deficient(result, SoilParameter::Nitrogen) {
        let n = result.value(SoilParameter::Nitrogen);
        let timing = if crop.is_cereal() {
            "Split 50/50 between sowing and tillering."
        } else {
            "Apply at sowing."
        };
        plan.push(
            Recommendation::new(
                Priority::High,
                ActionKind::NitrogenFertilization,
                format!(
                    "Use {} or {}. {}",
                    Product::Urea.as_str(),
                    Product::AmmoniumNitrate.as_str(),
                    timing
                ),
            )
            .with_dosage(Dosage::new(nitrogen_dose(crop, n), DoseUnit::KgNPerHa, Product::Urea)),
        );
    }

    if is_deficient(result, SoilParameter::Phosphorus) {
        let p = result.value(SoilParameter::Phosphorus);
        plan.push(
            Recommendation::new(
                Priority::Medium,
                ActionKind::PhosphorusFertilization,
                format!(
                    "Use {}. Apply all at sowing with shallow incorporation.",
                    Product::TripleSuperphosphate.as_str()
                ),
            )
            .with_dosage(Dosage::new(
                phosphorus_dose(crop, p),
                DoseUnit::KgP2O5PerHa,
                Product::TripleSuperphosphate,
            )),
        );
    }

    if is_deficient(result, SoilParameter::Potassium) {
        let k = result.value(SoilParameter::Potassium);
        plan.push(
            Recommendation::new(
                Priority::Medium,
                ActionKind::PotassiumFertilization,
                format!("Use {}. Apply all at sowing.", Product::PotassiumChloride.as_str()),
            )
            .with_dosage(Dosage::new(
                potassium_dose(crop, k),
                DoseUnit::KgK2OPerHa,
                Product::PotassiumChloride,
            )),
        );
    }

    plan.push(closing_recommendation(result.overall_score));

    tracing::debug!(
        crop = %crop,
        n_recommendations = plan.len(),
        "Generated recommendation plan"
    );

    plan
}

fn is_deficient(result: &FertilityResult, parameter: SoilParameter) -> bool {
    result
        .get(parameter)
        .and_then(|a| a.category.nutrient_level())
        .is_some_and(|level| level.is_deficient())
}

/// Closing rule; thresholds {80, 60} are deliberately not the label bands
fn closing_recommendation(overall_score: f64) -> Recommendation {
    if overall_score >= 80.0 {
        Recommendation::new(
            Priority::Low,
            ActionKind::Maintain,
            "Soil fertility is excellent. Maintain current practices and re-test annually.",
        )
    } else if overall_score >= 60.0 {
        Recommendation::new(
            Priority::Medium,
            ActionKind::Improve,
            "Soil fertility is good. Apply the corrective measures above and re-test next season.",
        )
    } else {
        Recommendation::new(
            Priority::High,
            ActionKind::IntegralPlan,
            "Soil fertility is limiting. Implement an integral management plan combining \
             amendments, fertilization and organic matter build-up over several seasons.",
        )
    }
}
