//! Plant Metrics Extractor
//!
//! Canopy-level descriptors from a segmented vegetation cloud: height
//! statistics, convex-hull volume and projected area, roughness, a heuristic
//! health score and a growth-stage label.
//!
//! Hull failures on degenerate canopies fall back to bounding-box estimates.

use serde::{Deserialize, Serialize};

use super::hull::{convex_hull_area, convex_hull_volume};
use super::point_cloud::PointCloud;

/// Below this many canopy points the metrics are zero-filled
pub const MIN_POINTS_FOR_METRICS: usize = 10;

/// Bounding-box volume is scaled by this factor when the 3-D hull fails
const VOLUME_FALLBACK_FACTOR: f64 = 0.5;

// ============================================================================
// GROWTH STAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    Maturation,
    /// Too few canopy points to judge
    Insufficient,
}

impl GrowthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "seedling",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Maturation => "maturation",
            GrowthStage::Insufficient => "insufficient",
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "Seedling",
            GrowthStage::Vegetative => "Vegetative",
            GrowthStage::Flowering => "Flowering",
            GrowthStage::Maturation => "Maturation",
            GrowthStage::Insufficient => "Insufficient data",
        }
    }
}

/// Stage from height (m) and hull volume (m³)
///
/// Either condition alone is enough to hold a plant at the earlier stage.
pub fn growth_stage(height: f64, volume: f64) -> GrowthStage {
    if height < 0.5 || volume < 1.0 {
        GrowthStage::Seedling
    } else if height < 1.0 || volume < 5.0 {
        GrowthStage::Vegetative
    } else if height < 2.0 || volume < 20.0 {
        GrowthStage::Flowering
    } else {
        GrowthStage::Maturation
    }
}

/// Heuristic health in [0, 100]
pub fn health_score(height: f64, volume: f64, density: usize, roughness: f64) -> f64 {
    let h = 0.3 * (height / 3.0).min(1.0)
        + 0.3 * (volume / 50.0).min(1.0)
        + 0.3 * (density as f64 / 10_000.0).min(1.0)
        + 0.1 * (1.0 - roughness / 0.5).max(0.0);
    (100.0 * h).clamp(0.0, 100.0)
}

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantMetrics {
    /// max_height - min_height (m)
    pub plant_height: f64,
    /// 3-D convex hull volume (m³)
    pub canopy_volume: f64,
    /// 2-D convex hull area of the xy projection (m²)
    pub canopy_area: f64,
    pub plant_density_count: usize,
    /// Population standard deviation of z (m)
    pub canopy_roughness: f64,
    pub max_height: f64,
    pub min_height: f64,
    pub mean_height: f64,
    pub health_score: f64,
    pub growth_stage: GrowthStage,
}

impl PlantMetrics {
    /// All-zero record for canopies too small to measure
    pub fn insufficient() -> Self {
        Self {
            plant_height: 0.0,
            canopy_volume: 0.0,
            canopy_area: 0.0,
            plant_density_count: 0,
            canopy_roughness: 0.0,
            max_height: 0.0,
            min_height: 0.0,
            mean_height: 0.0,
            health_score: 0.0,
            growth_stage: GrowthStage::Insufficient,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.growth_stage == GrowthStage::Insufficient
    }
}

/// Derive plant metrics from a canopy cloud
pub fn extract_metrics(canopy: &PointCloud) -> PlantMetrics {
    let n = canopy.len();
    let bounds = match canopy.bounds() {
        Some(b) if n >= MIN_POINTS_FOR_METRICS => b,
        _ => {
            tracing::warn!("Only {} canopy points; metrics zero-filled", n);
            return PlantMetrics::insufficient();
        }
    };

    let z = canopy.z_values();
    let max_height = bounds.max.z;
    let min_height = bounds.min.z;
    let mean_height = z.iter().sum::<f64>() / n as f64;
    let variance = z.iter().map(|v| (v - mean_height).powi(2)).sum::<f64>() / n as f64;
    let canopy_roughness = variance.sqrt();
    let plant_height = max_height - min_height;

    let extent = bounds.extent();
    let canopy_volume = convex_hull_volume(canopy.points()).unwrap_or_else(|e| {
        tracing::debug!("3-D hull failed ({}); using bounding-box volume", e);
        extent.x * extent.y * extent.z * VOLUME_FALLBACK_FACTOR
    });

    let planar: Vec<[f64; 2]> = canopy.points().iter().map(|p| [p.x, p.y]).collect();
    let canopy_area = convex_hull_area(&planar).unwrap_or_else(|e| {
        tracing::debug!("2-D hull failed ({}); using bounding-box area", e);
        extent.x * extent.y
    });

    let health = health_score(plant_height, canopy_volume, n, canopy_roughness);
    let stage = growth_stage(plant_height, canopy_volume);

    tracing::info!(
        "Plant metrics: height {:.2} m, volume {:.2} m³, area {:.2} m², health {:.1}, stage {}",
        plant_height,
        canopy_volume,
        canopy_area,
        health,
        stage.as_str()
    );

    PlantMetrics {
        plant_height,
        canopy_volume,
        canopy_area,
        plant_density_count: n,
        canopy_roughness,
        max_height,
        min_height,
        // Summation error must not push the mean outside [min, max]
        mean_height: mean_height.clamp(min_height, max_height),
        health_score: health,
        growth_stage: stage,
    }
}
