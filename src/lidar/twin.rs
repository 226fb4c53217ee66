//! Digital Twin
//!
//! Timestamped snapshot of a plant's metrics with management annotations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::PlantMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalTwin {
    pub plant_type: String,
    pub metrics: PlantMetrics,
    pub timestamp: DateTime<Utc>,
    pub recommendations: Vec<String>,
}

impl DigitalTwin {
    /// Snapshot taken now
    pub fn new(plant_type: impl Into<String>, metrics: PlantMetrics) -> Self {
        Self::at(plant_type, metrics, Utc::now())
    }

    /// Snapshot with an explicit timestamp
    pub fn at(plant_type: impl Into<String>, metrics: PlantMetrics, timestamp: DateTime<Utc>) -> Self {
        let recommendations = annotate(&metrics);
        Self {
            plant_type: plant_type.into(),
            metrics,
            timestamp,
            recommendations,
        }
    }

    /// ISO-8601 UTC timestamp, second precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Management notes derived from health and height
pub fn annotate(metrics: &PlantMetrics) -> Vec<String> {
    let mut notes = Vec::new();

    if metrics.health_score < 50.0 {
        notes.push("Low vigour: inspect nutrients and irrigation".to_string());
    } else if metrics.health_score < 70.0 {
        notes.push("Moderate vigour: monitor development".to_string());
    } else {
        notes.push("Optimal vigour: keep current management".to_string());
    }

    if metrics.plant_height < 0.5 {
        notes.push("Early growth: ensure irrigation and weed control".to_string());
    } else if metrics.plant_height > 2.5 {
        notes.push("Advanced growth: prepare harvest logistics".to_string());
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lidar::metrics::GrowthStage;
    use chrono::TimeZone;

    fn metrics(height: f64, health: f64) -> PlantMetrics {
        PlantMetrics {
            plant_height: height,
            canopy_volume: 10.0,
            canopy_area: 4.0,
            plant_density_count: 1000,
            canopy_roughness: 0.2,
            max_height: height,
            min_height: 0.0,
            mean_height: height / 2.0,
            health_score: health,
            growth_stage: GrowthStage::Flowering,
        }
    }

    #[test]
    fn test_annotations() {
        let notes = annotate(&metrics(0.3, 40.0));
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("inspect nutrients"));
        assert!(notes[1].contains("ensure irrigation"));

        let notes = annotate(&metrics(1.2, 60.0));
        assert_eq!(notes, vec!["Moderate vigour: monitor development".to_string()]);

        let notes = annotate(&metrics(3.0, 85.0));
        assert!(notes[0].contains("Optimal"));
        assert!(notes[1].contains("prepare harvest"));
    }

    #[test]
    fn test_injected_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let twin = DigitalTwin::at("maize", metrics(1.0, 75.0), ts);
        assert_eq!(twin.timestamp_iso(), "2024-06-01T12:30:00Z");
        assert_eq!(twin.plant_type, "maize");

        let json = serde_json::to_value(&twin).unwrap();
        assert_eq!(json["timestamp"], "2024-06-01T12:30:00Z");
    }

    #[test]
    fn test_new_uses_current_time() {
        let before = Utc::now();
        let twin = DigitalTwin::new("soy", metrics(1.0, 75.0));
        assert!(twin.timestamp >= before);
    }
}
