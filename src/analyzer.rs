//! Pipeline Entry Points
//!
//! One orchestrating call per pipeline. The two pipelines share nothing but
//! the error type; configuration knobs are passed in per call.
//!
//! Soil:  SoilInput → resolve defaults → fertility → action plan
//! LiDAR: cloud → preprocess → segment → metrics → digital twin

use serde::Serialize;
use std::path::Path;

use crate::config::SoilDefaults;
use crate::error::AnalysisError;
use crate::lidar::loader::load_point_cloud;
use crate::lidar::metrics::extract_metrics;
use crate::lidar::point_cloud::PointCloud;
use crate::lidar::preprocess::{preprocess, PreprocessConfig, PreprocessStats};
use crate::lidar::segmentation::{segment_vegetation, SegmentationConfig};
use crate::lidar::twin::DigitalTwin;
use crate::soil::fertility::{calculate_fertility, FertilityResult};
use crate::soil::recommendations::{generate_recommendations, Recommendation};
use crate::soil::types::{SoilInput, SoilSample};

// ============================================================================
// SOIL
// ============================================================================

/// Outcome of the soil pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilAnalysis {
    pub sample: SoilSample,
    pub fertility: FertilityResult,
    pub recommendations: Vec<Recommendation>,
    /// Inputs outside their stated domain (scored anyway)
    pub warnings: Vec<String>,
}

/// Score a fully-specified sample and build its action plan
pub fn analyze_sample(sample: SoilSample) -> SoilAnalysis {
    let warnings = sample.domain_warnings();
    for w in &warnings {
        tracing::warn!("Soil input {}", w);
    }

    let fertility = calculate_fertility(&sample);
    let recommendations = generate_recommendations(&fertility, sample.crop);

    tracing::info!(
        "Soil analysis: {} {:.1}/100 ({}), {} recommendations",
        sample.crop,
        fertility.overall_score,
        fertility.label.as_str(),
        recommendations.len()
    );

    SoilAnalysis {
        sample,
        fertility,
        recommendations,
        warnings,
    }
}

/// Resolve omitted inputs from `defaults`, then run the soil pipeline
pub fn analyze_soil(input: &SoilInput, defaults: &SoilDefaults) -> SoilAnalysis {
    analyze_sample(defaults.resolve(input))
}

// ============================================================================
// LIDAR
// ============================================================================

/// Segmentation outcome without the canopy points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentationSummary {
    pub ground_z: f64,
    pub candidate_count: usize,
    pub cluster_count: usize,
    pub canopy_points: usize,
}

/// Outcome of the LiDAR pipeline
#[derive(Debug, Clone, Serialize)]
pub struct LidarAnalysis {
    pub preprocessing: PreprocessStats,
    pub segmentation: SegmentationSummary,
    pub twin: DigitalTwin,
    /// Canopy points; not serialised
    #[serde(skip)]
    pub canopy: PointCloud,
}

/// Run preprocess → segment → metrics → twin on an in-memory cloud
pub fn analyze_point_cloud(
    cloud: PointCloud,
    preprocess_config: &PreprocessConfig,
    segmentation_config: &SegmentationConfig,
    plant_type: &str,
) -> Result<LidarAnalysis, AnalysisError> {
    if cloud.is_empty() {
        return Err(AnalysisError::InsufficientPoints {
            found: 0,
            required: 1,
        });
    }

    let prepared = preprocess(cloud, preprocess_config);
    let segment = segment_vegetation(&prepared.cloud, segmentation_config)?;
    let metrics = extract_metrics(&segment.cloud);
    let twin = DigitalTwin::new(plant_type, metrics);

    Ok(LidarAnalysis {
        preprocessing: prepared.stats,
        segmentation: SegmentationSummary {
            ground_z: segment.ground_z,
            candidate_count: segment.candidate_count,
            cluster_count: segment.cluster_count,
            canopy_points: segment.indices.len(),
        },
        twin,
        canopy: segment.cloud,
    })
}

/// Load a LAS file and run the LiDAR pipeline on it
pub fn analyze_point_cloud_file(
    path: &Path,
    preprocess_config: &PreprocessConfig,
    segmentation_config: &SegmentationConfig,
    plant_type: &str,
) -> Result<LidarAnalysis, AnalysisError> {
    let cloud = load_point_cloud(path)?;
    analyze_point_cloud(cloud, preprocess_config, segmentation_config, plant_type)
}
