//! Fertility Aggregator
//!
//! Weighted sum of the seven parameter scores into a composite 0-100 score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::scoring::{assess_parameter, ParameterAssessment, SoilParameter};
use super::types::{Crop, SoilSample};

impl SoilParameter {
    /// Fixed aggregation weight; the seven weights sum to 1.0
    pub fn weight(&self) -> f64 {
        match self {
            SoilParameter::Ph => 0.15,
            SoilParameter::OrganicMatter => 0.20,
            SoilParameter::Nitrogen => 0.25,
            SoilParameter::Phosphorus => 0.20,
            SoilParameter::Potassium => 0.15,
            SoilParameter::Texture => 0.03,
            SoilParameter::Conductivity => 0.02,
        }
    }
}

/// Composite fertility band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FertilityLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl FertilityLabel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => FertilityLabel::Excellent,
            s if s >= 60.0 => FertilityLabel::Good,
            s if s >= 40.0 => FertilityLabel::Fair,
            _ => FertilityLabel::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FertilityLabel::Poor => "Poor",
            FertilityLabel::Fair => "Fair",
            FertilityLabel::Good => "Good",
            FertilityLabel::Excellent => "Excellent",
        }
    }
}

/// Result of scoring one soil sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilityResult {
    pub parameters: BTreeMap<SoilParameter, ParameterAssessment>,
    /// Weighted composite, 0-100
    pub overall_score: f64,
    pub label: FertilityLabel,
    pub crop: Crop,
}

impl FertilityResult {
    pub fn get(&self, parameter: SoilParameter) -> Option<&ParameterAssessment> {
        self.parameters.get(&parameter)
    }

    /// Measured value of a parameter (0 when absent)
    pub fn value(&self, parameter: SoilParameter) -> f64 {
        self.get(parameter).map_or(0.0, |a| a.value)
    }

    /// Weighted contribution of each parameter to the composite
    pub fn contributions(&self) -> Vec<(SoilParameter, f64)> {
        self.parameters
            .iter()
            .map(|(p, a)| (*p, p.weight() * f64::from(a.score)))
            .collect()
    }
}

/// Score a soil sample: per-parameter assessments plus weighted composite
pub fn calculate_fertility(sample: &SoilSample) -> FertilityResult {
    let parameters: BTreeMap<_, _> = SoilParameter::ALL
        .iter()
        .map(|&p| (p, assess_parameter(sample, p)))
        .collect();

    let overall_score = parameters
        .iter()
        .map(|(p, a)| p.weight() * f64::from(a.score))
        .sum::<f64>()
        .clamp(0.0, 100.0);

    tracing::debug!(
        crop = %sample.crop,
        overall_score,
        "Scored soil sample"
    );

    FertilityResult {
        parameters,
        overall_score,
        label: FertilityLabel::from_score(overall_score),
        crop: sample.crop,
    }
}
