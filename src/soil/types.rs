//! Soil Sample Types
//!
//! Input records for the fertility scorer: the crop and texture keys, the
//! fully-resolved `SoilSample`, and the partially-filled `SoilInput` the shell
//! hands over before configuration defaults are applied.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CROP
// ============================================================================

/// Intended crop; indexes every per-crop table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Crop {
    Maize,
    Soy,
    Wheat,
    Sunflower,
    Cotton,
    Other,
}

impl Crop {
    pub const ALL: [Crop; 6] = [
        Crop::Maize,
        Crop::Soy,
        Crop::Wheat,
        Crop::Sunflower,
        Crop::Cotton,
        Crop::Other,
    ];

    /// Parse a crop key; unrecognised keys fall back to `Other`
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "maize" | "corn" => Crop::Maize,
            "soy" | "soybean" | "soya" => Crop::Soy,
            "wheat" => Crop::Wheat,
            "sunflower" => Crop::Sunflower,
            "cotton" => Crop::Cotton,
            _ => Crop::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Maize => "Maize",
            Crop::Soy => "Soy",
            Crop::Wheat => "Wheat",
            Crop::Sunflower => "Sunflower",
            Crop::Cotton => "Cotton",
            Crop::Other => "Other",
        }
    }

    /// Cereals get split nitrogen applications
    pub fn is_cereal(&self) -> bool {
        matches!(self, Crop::Maize | Crop::Wheat)
    }
}

impl From<String> for Crop {
    fn from(key: String) -> Self {
        Crop::from_key(&key)
    }
}

impl From<Crop> for String {
    fn from(crop: Crop) -> Self {
        crop.as_str().to_string()
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TEXTURE
// ============================================================================

/// Dominant soil texture class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Texture {
    Clay,
    Loam,
    Sand,
    /// Any texture key the tables do not list
    Other,
}

impl Texture {
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "clay" | "clayey" => Texture::Clay,
            "loam" | "loamy" => Texture::Loam,
            "sand" | "sandy" => Texture::Sand,
            _ => Texture::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Texture::Clay => "Clay",
            Texture::Loam => "Loam",
            Texture::Sand => "Sand",
            Texture::Other => "Other",
        }
    }
}

impl From<String> for Texture {
    fn from(key: String) -> Self {
        Texture::from_key(&key)
    }
}

impl From<Texture> for String {
    fn from(texture: Texture) -> Self {
        texture.as_str().to_string()
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SOIL SAMPLE
// ============================================================================

/// Fully-resolved soil parameter vector; immutable per analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub ph: f64,
    pub organic_matter_pct: f64,
    pub texture: Texture,
    pub nitrogen_ppm: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    pub field_capacity_pct: f64,
    pub conductivity_dsm: f64,
    pub crop: Crop,
    pub expected_yield_kg_ha: f64,
}

/// Stated input domains; values outside are still scored
const DOMAINS: [(&str, f64, f64); 8] = [
    ("ph", 3.0, 9.0),
    ("organic_matter_pct", 0.0, 10.0),
    ("nitrogen_ppm", 0.0, 200.0),
    ("phosphorus_ppm", 0.0, 150.0),
    ("potassium_ppm", 0.0, 300.0),
    ("field_capacity_pct", 10.0, 50.0),
    ("conductivity_dsm", 0.0, 8.0),
    ("expected_yield_kg_ha", 1000.0, 15000.0),
];

impl SoilSample {
    /// Fields outside their stated input domain, as `name (value)` strings
    ///
    /// Informational only: scoring never clamps.
    pub fn domain_warnings(&self) -> Vec<String> {
        let values = [
            self.ph,
            self.organic_matter_pct,
            self.nitrogen_ppm,
            self.phosphorus_ppm,
            self.potassium_ppm,
            self.field_capacity_pct,
            self.conductivity_dsm,
            self.expected_yield_kg_ha,
        ];

        DOMAINS
            .iter()
            .zip(values)
            .filter(|((_, lo, hi), v)| !(*lo..=*hi).contains(v))
            .map(|((name, lo, hi), v)| format!("{} ({}) outside [{}, {}]", name, v, lo, hi))
            .collect()
    }
}

/// Soil record as supplied by the shell; omitted values take configured defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilInput {
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub organic_matter_pct: Option<f64>,
    pub texture: Texture,
    pub nitrogen_ppm: f64,
    pub phosphorus_ppm: f64,
    pub potassium_ppm: f64,
    pub field_capacity_pct: f64,
    pub conductivity_dsm: f64,
    #[serde(default)]
    pub crop: Option<Crop>,
    pub expected_yield_kg_ha: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_keys() {
        assert_eq!(Crop::from_key("Maize"), Crop::Maize);
        assert_eq!(Crop::from_key(" corn "), Crop::Maize);
        assert_eq!(Crop::from_key("SOYBEAN"), Crop::Soy);
        // Unknown crops silently fall back
        assert_eq!(Crop::from_key("quinoa"), Crop::Other);
    }

    #[test]
    fn test_texture_keys() {
        assert_eq!(Texture::from_key("sandy"), Texture::Sand);
        assert_eq!(Texture::from_key("Loam"), Texture::Loam);
        assert_eq!(Texture::from_key("silt"), Texture::Other);
    }

    #[test]
    fn test_serde_unknown_crop() {
        let crop: Crop = serde_json::from_str("\"barley\"").unwrap();
        assert_eq!(crop, Crop::Other);
        assert_eq!(serde_json::to_string(&Crop::Sunflower).unwrap(), "\"Sunflower\"");
    }

    #[test]
    fn test_domain_warnings() {
        let mut sample = SoilSample {
            ph: 6.5,
            organic_matter_pct: 3.0,
            texture: Texture::Loam,
            nitrogen_ppm: 50.0,
            phosphorus_ppm: 30.0,
            potassium_ppm: 150.0,
            field_capacity_pct: 25.0,
            conductivity_dsm: 1.0,
            crop: Crop::Maize,
            expected_yield_kg_ha: 8000.0,
        };
        assert!(sample.domain_warnings().is_empty());

        sample.ph = 10.2;
        sample.nitrogen_ppm = 250.0;
        let warnings = sample.domain_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("ph"));
        assert!(warnings[1].starts_with("nitrogen_ppm"));
    }
}
