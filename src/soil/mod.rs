//! Soil Fertility Scorer
//!
//! Parameter scoring tables → weighted fertility aggregate → rule-based
//! remediation plan with fertilizer dosages.

pub mod types;
pub mod scoring;
pub mod fertility;
pub mod dosage;
pub mod recommendations;

// Re-export commonly used types
pub use types::{Crop, SoilInput, SoilSample, Texture};
pub use scoring::{
    assess_parameter, categorize_conductivity, categorize_nitrogen, categorize_organic_matter,
    categorize_ph, categorize_phosphorus, categorize_potassium, Category, NutrientLevel,
    OptimumRange, OrganicMatterLevel, ParameterAssessment, PhClass, SalinityClass, SoilParameter,
};
pub use fertility::{calculate_fertility, FertilityLabel, FertilityResult};
pub use dosage::{nitrogen_dose, phosphorus_dose, potassium_dose, DoseUnit, Dosage, Product};
pub use recommendations::{generate_recommendations, ActionKind, Priority, Recommendation};
