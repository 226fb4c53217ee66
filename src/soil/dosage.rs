//! Fertilizer Dose Calculators
//!
//! Per-crop base doses adjusted by the measured soil level. Nitrogen is
//! expressed as elemental N, phosphate as P2O5 and potash as K2O, all in
//! kg/ha.

use serde::{Deserialize, Serialize};

use super::types::Crop;

/// Base doses (N, P2O5, K2O) in kg/ha
fn base_doses(crop: Crop) -> (f64, f64, f64) {
    match crop {
        Crop::Maize => (120.0, 60.0, 80.0),
        Crop::Soy => (0.0, 40.0, 60.0),
        Crop::Wheat => (80.0, 50.0, 70.0),
        Crop::Sunflower => (60.0, 35.0, 50.0),
        Crop::Cotton => (90.0, 55.0, 75.0),
        Crop::Other => (80.0, 45.0, 65.0),
    }
}

/// Additive adjustment: two deficit steps, one surplus reduction with a floor
struct LevelAdjustment {
    very_low_below: f64,
    very_low_add: f64,
    low_below: f64,
    low_add: f64,
    surplus_above: f64,
    surplus_cut: f64,
    floor: f64,
}

impl LevelAdjustment {
    fn apply(&self, base: f64, level: f64) -> f64 {
        if level < self.very_low_below {
            base + self.very_low_add
        } else if level < self.low_below {
            base + self.low_add
        } else if level > self.surplus_above {
            (base - self.surplus_cut).max(self.floor)
        } else {
            base
        }
    }
}

const NITROGEN_ADJUSTMENT: LevelAdjustment = LevelAdjustment {
    very_low_below: 20.0,
    very_low_add: 40.0,
    low_below: 40.0,
    low_add: 20.0,
    surplus_above: 100.0,
    surplus_cut: 30.0,
    floor: 30.0,
};

const PHOSPHORUS_ADJUSTMENT: LevelAdjustment = LevelAdjustment {
    very_low_below: 10.0,
    very_low_add: 30.0,
    low_below: 20.0,
    low_add: 15.0,
    surplus_above: 60.0,
    surplus_cut: 20.0,
    floor: 20.0,
};

const POTASSIUM_ADJUSTMENT: LevelAdjustment = LevelAdjustment {
    very_low_below: 50.0,
    very_low_add: 40.0,
    low_below: 100.0,
    low_add: 20.0,
    surplus_above: 250.0,
    surplus_cut: 30.0,
    floor: 30.0,
};

/// Elemental nitrogen dose (kg N/ha) for a crop at soil nitrate `n_ppm`
pub fn nitrogen_dose(crop: Crop, n_ppm: f64) -> f64 {
    NITROGEN_ADJUSTMENT.apply(base_doses(crop).0, n_ppm)
}

/// Phosphate dose (kg P2O5/ha) for a crop at soil phosphorus `p_ppm`
pub fn phosphorus_dose(crop: Crop, p_ppm: f64) -> f64 {
    PHOSPHORUS_ADJUSTMENT.apply(base_doses(crop).1, p_ppm)
}

/// Potash dose (kg K2O/ha) for a crop at soil potassium `k_ppm`
pub fn potassium_dose(crop: Crop, k_ppm: f64) -> f64 {
    POTASSIUM_ADJUSTMENT.apply(base_doses(crop).2, k_ppm)
}

// ============================================================================
// COMMERCIAL PRODUCTS
// ============================================================================

/// Fertilizer product with its nutrient grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    Urea,
    AmmoniumNitrate,
    TripleSuperphosphate,
    PotassiumChloride,
}

impl Product {
    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Urea => "urea (46% N)",
            Product::AmmoniumNitrate => "ammonium nitrate (34% N)",
            Product::TripleSuperphosphate => "triple superphosphate (46% P2O5)",
            Product::PotassiumChloride => "potassium chloride (60% K2O)",
        }
    }

    /// Nutrient mass fraction of the product
    pub fn grade(&self) -> f64 {
        match self {
            Product::Urea => 0.46,
            Product::AmmoniumNitrate => 0.34,
            Product::TripleSuperphosphate => 0.46,
            Product::PotassiumChloride => 0.60,
        }
    }

    /// Product mass needed to deliver `nutrient_kg_ha`
    pub fn rate_for(&self, nutrient_kg_ha: f64) -> f64 {
        nutrient_kg_ha / self.grade()
    }
}

/// Unit a dose is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseUnit {
    KgNPerHa,
    KgP2O5PerHa,
    KgK2OPerHa,
}

impl DoseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseUnit::KgNPerHa => "kg N/ha",
            DoseUnit::KgP2O5PerHa => "kg P2O5/ha",
            DoseUnit::KgK2OPerHa => "kg K2O/ha",
        }
    }
}

/// Nutrient dose with the product recommended to supply it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dosage {
    pub amount: f64,
    pub unit: DoseUnit,
    pub product: Product,
    /// Product mass (kg/ha) delivering `amount`
    pub product_kg_ha: f64,
}

impl Dosage {
    pub fn new(amount: f64, unit: DoseUnit, product: Product) -> Self {
        Self {
            amount,
            unit,
            product,
            product_kg_ha: product.rate_for(amount),
        }
    }
}
