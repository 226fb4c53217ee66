//! Parameter Scoring Tables
//!
//! Per-crop (or per-texture) optimum intervals and the piecewise scores
//! awarded inside, just outside ("shoulder"), and far outside ("floor") them,
//! plus the crop-independent categorization ladders.
//!
//! Every scorer accepts values outside the stated input domains and scores
//! them against the same table; nothing is clamped.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{Crop, SoilSample, Texture};

// ============================================================================
// OPTIMUM INTERVALS
// ============================================================================

/// Closed optimum interval `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimumRange {
    pub lo: f64,
    pub hi: f64,
}

impl OptimumRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

/// Scores awarded outside an optimum interval
///
/// "Near" covers values within `step` of the violated bound, "far" anything
/// beyond it.
#[derive(Debug, Clone, Copy)]
struct ShoulderProfile {
    step: f64,
    below_far: u8,
    below_near: u8,
    above_near: u8,
    above_far: u8,
}

impl ShoulderProfile {
    fn score(&self, value: f64, range: OptimumRange) -> u8 {
        if range.contains(value) {
            100
        } else if value < range.lo {
            if value < range.lo - self.step {
                self.below_far
            } else {
                self.below_near
            }
        } else if value > range.hi + self.step {
            self.above_far
        } else {
            self.above_near
        }
    }
}

const PH_PROFILE: ShoulderProfile = ShoulderProfile {
    step: 1.0,
    below_far: 30,
    below_near: 70,
    above_near: 70,
    above_far: 30,
};

const ORGANIC_MATTER_PROFILE: ShoulderProfile = ShoulderProfile {
    step: 1.0,
    below_far: 40,
    below_near: 80,
    above_near: 80,
    above_far: 80,
};

const NITROGEN_PROFILE: ShoulderProfile = ShoulderProfile {
    step: 20.0,
    below_far: 30,
    below_near: 70,
    above_near: 80,
    above_far: 80,
};

const PHOSPHORUS_PROFILE: ShoulderProfile = ShoulderProfile {
    step: 10.0,
    below_far: 35,
    below_near: 75,
    above_near: 85,
    above_far: 85,
};

const POTASSIUM_PROFILE: ShoulderProfile = ShoulderProfile {
    step: 50.0,
    below_far: 30,
    below_near: 70,
    above_near: 85,
    above_far: 85,
};

// ============================================================================
// LOOKUP TABLES
// ============================================================================

pub fn ph_optimum(crop: Crop) -> OptimumRange {
    match crop {
        Crop::Maize => OptimumRange::new(5.8, 7.0),
        Crop::Soy => OptimumRange::new(6.0, 7.0),
        Crop::Wheat => OptimumRange::new(6.0, 7.5),
        Crop::Sunflower => OptimumRange::new(6.0, 7.5),
        Crop::Cotton => OptimumRange::new(5.5, 7.0),
        Crop::Other => OptimumRange::new(6.0, 7.0),
    }
}

/// Organic matter optimum depends on texture, not crop
pub fn organic_matter_optimum(texture: Texture) -> OptimumRange {
    match texture {
        Texture::Sand => OptimumRange::new(2.0, 4.0),
        Texture::Loam => OptimumRange::new(3.0, 5.0),
        Texture::Clay => OptimumRange::new(4.0, 6.0),
        Texture::Other => OptimumRange::new(3.0, 5.0),
    }
}

pub fn nitrogen_optimum(crop: Crop) -> OptimumRange {
    match crop {
        Crop::Maize => OptimumRange::new(40.0, 80.0),
        Crop::Soy => OptimumRange::new(30.0, 60.0),
        Crop::Wheat => OptimumRange::new(35.0, 70.0),
        Crop::Sunflower => OptimumRange::new(25.0, 50.0),
        Crop::Cotton => OptimumRange::new(40.0, 75.0),
        Crop::Other => OptimumRange::new(40.0, 70.0),
    }
}

pub fn phosphorus_optimum(crop: Crop) -> OptimumRange {
    match crop {
        Crop::Maize => OptimumRange::new(25.0, 50.0),
        Crop::Soy => OptimumRange::new(20.0, 40.0),
        Crop::Wheat => OptimumRange::new(20.0, 45.0),
        Crop::Sunflower => OptimumRange::new(15.0, 35.0),
        Crop::Cotton => OptimumRange::new(25.0, 50.0),
        Crop::Other => OptimumRange::new(20.0, 45.0),
    }
}

pub fn potassium_optimum(crop: Crop) -> OptimumRange {
    match crop {
        Crop::Maize => OptimumRange::new(120.0, 200.0),
        Crop::Soy => OptimumRange::new(100.0, 180.0),
        Crop::Wheat => OptimumRange::new(100.0, 170.0),
        Crop::Sunflower => OptimumRange::new(80.0, 150.0),
        Crop::Cotton => OptimumRange::new(120.0, 200.0),
        Crop::Other => OptimumRange::new(100.0, 180.0),
    }
}

// ============================================================================
// SCORERS
// ============================================================================

pub fn score_ph(ph: f64, crop: Crop) -> u8 {
    PH_PROFILE.score(ph, ph_optimum(crop))
}

pub fn score_organic_matter(om_pct: f64, texture: Texture) -> u8 {
    ORGANIC_MATTER_PROFILE.score(om_pct, organic_matter_optimum(texture))
}

pub fn score_nitrogen(n_ppm: f64, crop: Crop) -> u8 {
    NITROGEN_PROFILE.score(n_ppm, nitrogen_optimum(crop))
}

pub fn score_phosphorus(p_ppm: f64, crop: Crop) -> u8 {
    PHOSPHORUS_PROFILE.score(p_ppm, phosphorus_optimum(crop))
}

pub fn score_potassium(k_ppm: f64, crop: Crop) -> u8 {
    POTASSIUM_PROFILE.score(k_ppm, potassium_optimum(crop))
}

pub fn score_texture(texture: Texture) -> u8 {
    match texture {
        Texture::Loam => 100,
        Texture::Clay => 80,
        Texture::Sand => 60,
        Texture::Other => 70,
    }
}

pub fn score_conductivity(ec_dsm: f64) -> u8 {
    if ec_dsm < 2.0 {
        100
    } else if ec_dsm < 4.0 {
        80
    } else if ec_dsm < 6.0 {
        50
    } else {
        20
    }
}

// ============================================================================
// CATEGORIZATION LADDERS
// ============================================================================

/// Soil reaction class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhClass {
    VeryAcid,
    SlightlyAcid,
    Neutral,
    Alkaline,
    VeryAlkaline,
}

impl PhClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhClass::VeryAcid => "Very Acid",
            PhClass::SlightlyAcid => "Slightly Acid",
            PhClass::Neutral => "Neutral",
            PhClass::Alkaline => "Alkaline",
            PhClass::VeryAlkaline => "Very Alkaline",
        }
    }
}

/// Organic matter content class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrganicMatterLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl OrganicMatterLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganicMatterLevel::VeryLow => "Very Low",
            OrganicMatterLevel::Low => "Low",
            OrganicMatterLevel::Medium => "Medium",
            OrganicMatterLevel::High => "High",
            OrganicMatterLevel::VeryHigh => "Very High",
        }
    }
}

/// Macronutrient (N, P, K) availability class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NutrientLevel {
    VeryLow,
    Low,
    Optimal,
    High,
    VeryHigh,
}

impl NutrientLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientLevel::VeryLow => "Very Low",
            NutrientLevel::Low => "Low",
            NutrientLevel::Optimal => "Optimal",
            NutrientLevel::High => "High",
            NutrientLevel::VeryHigh => "Very High",
        }
    }

    /// Deficient levels trigger a fertilizer recommendation
    pub fn is_deficient(&self) -> bool {
        matches!(self, NutrientLevel::VeryLow | NutrientLevel::Low)
    }

    /// Five-step ladder with ascending upper bounds
    fn from_ladder(value: f64, bounds: [f64; 4]) -> Self {
        if value < bounds[0] {
            NutrientLevel::VeryLow
        } else if value < bounds[1] {
            NutrientLevel::Low
        } else if value < bounds[2] {
            NutrientLevel::Optimal
        } else if value < bounds[3] {
            NutrientLevel::High
        } else {
            NutrientLevel::VeryHigh
        }
    }
}

/// Salinity class from electrical conductivity, banded like its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SalinityClass {
    NonSaline,
    SlightlySaline,
    ModeratelySaline,
    StronglySaline,
}

impl SalinityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalinityClass::NonSaline => "Non-saline",
            SalinityClass::SlightlySaline => "Slightly Saline",
            SalinityClass::ModeratelySaline => "Moderately Saline",
            SalinityClass::StronglySaline => "Strongly Saline",
        }
    }
}

pub fn categorize_ph(ph: f64) -> PhClass {
    if ph < 5.5 {
        PhClass::VeryAcid
    } else if ph < 6.5 {
        PhClass::SlightlyAcid
    } else if ph < 7.5 {
        PhClass::Neutral
    } else if ph < 8.5 {
        PhClass::Alkaline
    } else {
        PhClass::VeryAlkaline
    }
}

pub fn categorize_organic_matter(om_pct: f64) -> OrganicMatterLevel {
    if om_pct < 1.0 {
        OrganicMatterLevel::VeryLow
    } else if om_pct < 2.0 {
        OrganicMatterLevel::Low
    } else if om_pct < 4.0 {
        OrganicMatterLevel::Medium
    } else if om_pct < 6.0 {
        OrganicMatterLevel::High
    } else {
        OrganicMatterLevel::VeryHigh
    }
}

pub fn categorize_nitrogen(n_ppm: f64) -> NutrientLevel {
    NutrientLevel::from_ladder(n_ppm, [20.0, 40.0, 80.0, 120.0])
}

pub fn categorize_phosphorus(p_ppm: f64) -> NutrientLevel {
    NutrientLevel::from_ladder(p_ppm, [10.0, 20.0, 50.0, 80.0])
}

pub fn categorize_potassium(k_ppm: f64) -> NutrientLevel {
    NutrientLevel::from_ladder(k_ppm, [50.0, 100.0, 200.0, 300.0])
}

pub fn categorize_conductivity(ec_dsm: f64) -> SalinityClass {
    if ec_dsm < 2.0 {
        SalinityClass::NonSaline
    } else if ec_dsm < 4.0 {
        SalinityClass::SlightlySaline
    } else if ec_dsm < 6.0 {
        SalinityClass::ModeratelySaline
    } else {
        SalinityClass::StronglySaline
    }
}

// ============================================================================
// PARAMETER ASSESSMENTS
// ============================================================================

/// The seven scored soil parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoilParameter {
    Ph,
    OrganicMatter,
    Nitrogen,
    Phosphorus,
    Potassium,
    Texture,
    Conductivity,
}

impl SoilParameter {
    pub const ALL: [SoilParameter; 7] = [
        SoilParameter::Ph,
        SoilParameter::OrganicMatter,
        SoilParameter::Nitrogen,
        SoilParameter::Phosphorus,
        SoilParameter::Potassium,
        SoilParameter::Texture,
        SoilParameter::Conductivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoilParameter::Ph => "pH",
            SoilParameter::OrganicMatter => "Organic Matter",
            SoilParameter::Nitrogen => "Nitrogen",
            SoilParameter::Phosphorus => "Phosphorus",
            SoilParameter::Potassium => "Potassium",
            SoilParameter::Texture => "Texture",
            SoilParameter::Conductivity => "Conductivity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SoilParameter::Ph | SoilParameter::Texture => "",
            SoilParameter::OrganicMatter => "%",
            SoilParameter::Nitrogen | SoilParameter::Phosphorus | SoilParameter::Potassium => "ppm",
            SoilParameter::Conductivity => "dS/m",
        }
    }
}

/// Ordered categorical label attached to an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Ph(PhClass),
    OrganicMatter(OrganicMatterLevel),
    Nutrient(NutrientLevel),
    Texture(Texture),
    Salinity(SalinityClass),
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ph(c) => c.as_str(),
            Category::OrganicMatter(c) => c.as_str(),
            Category::Nutrient(c) => c.as_str(),
            Category::Texture(t) => t.as_str(),
            Category::Salinity(c) => c.as_str(),
        }
    }

    /// Nutrient level, if this is an N/P/K category
    pub fn nutrient_level(&self) -> Option<NutrientLevel> {
        match self {
            Category::Nutrient(level) => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and category for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssessment {
    /// Measured value (texture has none and reports 0)
    pub value: f64,
    /// Piecewise score, 0-100
    pub score: u8,
    pub category: Category,
}

/// Assess one parameter of a sample against the sample's crop
pub fn assess_parameter(sample: &SoilSample, parameter: SoilParameter) -> ParameterAssessment {
    let crop = sample.crop;
    match parameter {
        SoilParameter::Ph => ParameterAssessment {
            value: sample.ph,
            score: score_ph(sample.ph, crop),
            category: Category::Ph(categorize_ph(sample.ph)),
        },
        SoilParameter::OrganicMatter => ParameterAssessment {
            value: sample.organic_matter_pct,
            score: score_organic_matter(sample.organic_matter_pct, sample.texture),
            category: Category::OrganicMatter(categorize_organic_matter(sample.organic_matter_pct)),
        },
        SoilParameter::Nitrogen => ParameterAssessment {
            value: sample.nitrogen_ppm,
            score: score_nitrogen(sample.nitrogen_ppm, crop),
            category: Category::Nutrient(categorize_nitrogen(sample.nitrogen_ppm)),
        },
        SoilParameter::Phosphorus => ParameterAssessment {
            value: sample.phosphorus_ppm,
            score: score_phosphorus(sample.phosphorus_ppm, crop),
            category: Category::Nutrient(categorize_phosphorus(sample.phosphorus_ppm)),
        },
        SoilParameter::Potassium => ParameterAssessment {
            value: sample.potassium_ppm,
            score: score_potassium(sample.potassium_ppm, crop),
            category: Category::Nutrient(categorize_potassium(sample.potassium_ppm)),
        },
        SoilParameter::Texture => ParameterAssessment {
            value: 0.0,
            score: score_texture(sample.texture),
            category: Category::Texture(sample.texture),
        },
        SoilParameter::Conductivity => ParameterAssessment {
            value: sample.conductivity_dsm,
            score: score_conductivity(sample.conductivity_dsm),
            category: Category::Salinity(categorize_conductivity(sample.conductivity_dsm)),
        },
    }
}
