// Soil pipeline integration tests
//
// Purpose: JSON record in → fertility score + action plan out, through the
// public API and configuration layer.
// Run with: cargo test --test soil_pipeline

use agronomy_core::soil::{ActionKind, FertilityLabel, Priority, SoilParameter};
use agronomy_core::{analyze_sample, analyze_soil, AnalyzerConfig, Crop, SoilInput, SoilSample, Texture};
use approx::assert_relative_eq;

fn reference_sample() -> SoilSample {
    SoilSample {
        ph: 6.5,
        organic_matter_pct: 2.5,
        texture: Texture::Loam,
        nitrogen_ppm: 50.0,
        phosphorus_ppm: 30.0,
        potassium_ppm: 100.0,
        field_capacity_pct: 25.0,
        conductivity_dsm: 1.5,
        crop: Crop::Maize,
        expected_yield_kg_ha: 8000.0,
    }
}

// =========================================================================
// Section 1: Scoring through the public API
// =========================================================================

#[test]
fn test_reference_maize_sample() {
    let analysis = analyze_sample(reference_sample());
    let f = &analysis.fertility;

    // OM 2.5 on loam and K 100 on maize sit just below their optima
    assert_eq!(f.get(SoilParameter::Ph).unwrap().score, 100);
    assert_eq!(f.get(SoilParameter::OrganicMatter).unwrap().score, 80);
    assert_eq!(f.get(SoilParameter::Potassium).unwrap().score, 70);
    assert_relative_eq!(f.overall_score, 91.5, epsilon = 1e-9);
    assert_eq!(f.label, FertilityLabel::Excellent);

    // K 100 is "Optimal" on the category ladder: no potassium action
    assert_eq!(analysis.recommendations.len(), 1);
    assert_eq!(analysis.recommendations[0].action_kind, ActionKind::Maintain);
}

#[test]
fn test_depleted_acid_soil_plan_order() {
    let sample = SoilSample {
        ph: 4.5,
        organic_matter_pct: 1.2,
        texture: Texture::Sand,
        nitrogen_ppm: 10.0,
        phosphorus_ppm: 5.0,
        potassium_ppm: 40.0,
        field_capacity_pct: 12.0,
        conductivity_dsm: 0.4,
        crop: Crop::Wheat,
        expected_yield_kg_ha: 4000.0,
    };
    let analysis = analyze_sample(sample);

    let kinds: Vec<ActionKind> = analysis.recommendations.iter().map(|r| r.action_kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Liming,
            ActionKind::OrganicMatter,
            ActionKind::NitrogenFertilization,
            ActionKind::PhosphorusFertilization,
            ActionKind::PotassiumFertilization,
            ActionKind::IntegralPlan,
        ]
    );
    assert_eq!(analysis.recommendations[0].priority, Priority::High);

    // Wheat base doses 80/50/70 plus the deficiency adjustments
    let doses: Vec<f64> = analysis
        .recommendations
        .iter()
        .filter_map(|r| r.dosage.as_ref().map(|d| d.amount))
        .collect();
    assert_eq!(doses, vec![120.0, 80.0, 110.0]);
    assert!(analysis.recommendations[2].notes.contains("Split 50/50"));
}

#[test]
fn test_alkaline_soil_acidification() {
    let mut sample = reference_sample();
    sample.ph = 8.2;
    sample.crop = Crop::Soy;
    let analysis = analyze_sample(sample);
    assert_eq!(analysis.recommendations[0].action_kind, ActionKind::Acidification);
    assert_eq!(analysis.recommendations[0].priority, Priority::MediumHigh);
}

#[test]
fn test_deterministic_plan() {
    let a = analyze_sample(reference_sample());
    let b = analyze_sample(reference_sample());
    assert_eq!(a, b);
}

// =========================================================================
// Section 2: JSON input and configured defaults
// =========================================================================

#[test]
fn test_json_record_with_defaults() {
    let record = r#"{
        "texture": "clay",
        "nitrogen_ppm": 35.0,
        "phosphorus_ppm": 18.0,
        "potassium_ppm": 220.0,
        "field_capacity_pct": 35.0,
        "conductivity_dsm": 3.0,
        "crop": "sunflower",
        "expected_yield_kg_ha": 3000.0
    }"#;
    let input: SoilInput = serde_json::from_str(record).unwrap();

    let config: AnalyzerConfig =
        serde_json::from_str(r#"{"optimal_ph_range": [6.2, 6.8], "optimal_organic_matter": 4.5}"#).unwrap();
    let analysis = analyze_soil(&input, &config.soil_defaults());

    assert_eq!(analysis.sample.crop, Crop::Sunflower);
    assert_relative_eq!(analysis.sample.ph, 6.5);
    assert_relative_eq!(analysis.sample.organic_matter_pct, 4.5);
    assert_eq!(analysis.fertility.get(SoilParameter::Conductivity).unwrap().score, 80);
}

#[test]
fn test_unknown_crop_maps_to_other() {
    let record = r#"{
        "ph": 6.5, "organic_matter_pct": 3.0, "texture": "loam",
        "nitrogen_ppm": 50.0, "phosphorus_ppm": 30.0, "potassium_ppm": 150.0,
        "field_capacity_pct": 25.0, "conductivity_dsm": 1.0,
        "crop": "quinoa", "expected_yield_kg_ha": 2000.0
    }"#;
    let input: SoilInput = serde_json::from_str(record).unwrap();
    let analysis = analyze_soil(&input, &AnalyzerConfig::default().soil_defaults());
    assert_eq!(analysis.sample.crop, Crop::Other);
    assert_eq!(analysis.fertility.crop, Crop::Other);
}
