use serde::Serialize;

use crate::analyzer::{LidarAnalysis, SoilAnalysis};

/// JSON formatter for analysis results
pub struct JsonFormatter;

impl JsonFormatter {
    /// Soil analysis as pretty-printed JSON
    pub fn format_soil(analysis: &SoilAnalysis) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(analysis)
    }

    /// LiDAR analysis as pretty-printed JSON (canopy points omitted)
    pub fn format_lidar(analysis: &LidarAnalysis) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(analysis)
    }

    /// Any result record as compact JSON (no whitespace)
    pub fn format_compact<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_sample;
    use crate::soil::types::{Crop, SoilSample, Texture};

    fn analysis() -> SoilAnalysis {
        analyze_sample(SoilSample {
            ph: 4.8,
            organic_matter_pct: 1.5,
            texture: Texture::Sand,
            nitrogen_ppm: 15.0,
            phosphorus_ppm: 8.0,
            potassium_ppm: 60.0,
            field_capacity_pct: 15.0,
            conductivity_dsm: 0.5,
            crop: Crop::Maize,
            expected_yield_kg_ha: 6000.0,
        })
    }

    #[test]
    fn test_format_soil_json() {
        let json = JsonFormatter::format_soil(&analysis()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sample"]["crop"], "Maize");
        assert!(value["fertility"]["overall_score"].as_f64().unwrap() < 60.0);
        assert_eq!(value["recommendations"][0]["action_kind"], "Liming");
    }

    #[test]
    fn test_format_compact() {
        let json = JsonFormatter::format_compact(&analysis().fertility).unwrap();
        assert!(!json.contains('\n'));
    }
}
