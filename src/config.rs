//! Analyzer Configuration
//!
//! Flat JSON configuration as supplied by the presentation shell. The core
//! never holds it: `AnalyzerConfig` only hands out the per-pipeline knobs
//! (`preprocess`, `segmentation`, `soil_defaults`), which are injected into
//! each call explicitly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::lidar::preprocess::PreprocessConfig;
use crate::lidar::segmentation::SegmentationConfig;
use crate::soil::types::{Crop, SoilInput, SoilSample};
use crate::soil::scoring::OptimumRange;

/// Recognised configuration keys; every key is optional
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Voxel edge (m) for downsampling; <= 0 disables it
    pub voxel_size_default: f64,
    pub outlier_std_ratio: f64,
    pub outlier_nb_neighbors: usize,
    pub remove_outliers: bool,
    pub estimate_normals: bool,
    /// Offset above ground height (m) for canopy candidates
    pub vegetation_height_threshold: f64,
    /// Advisory upload cap; enforced by the shell, not the core
    pub max_file_size_mb: u64,
    pub optimal_ph_range: (f64, f64),
    pub optimal_organic_matter: f64,
    pub default_crop: Crop,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            voxel_size_default: 0.05,
            outlier_std_ratio: 1.5,
            outlier_nb_neighbors: 50,
            remove_outliers: true,
            estimate_normals: true,
            vegetation_height_threshold: 0.30,
            max_file_size_mb: 200,
            optimal_ph_range: (6.0, 7.0),
            optimal_organic_matter: 3.0,
            default_crop: Crop::Maize,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: AnalyzerConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        if config.optimal_ph_range.0 > config.optimal_ph_range.1 {
            anyhow::bail!(
                "optimal_ph_range is inverted: {:?}",
                config.optimal_ph_range
            );
        }

        tracing::info!("Loaded analyzer config from {:?}", path);
        Ok(config)
    }

    /// Knobs for the LiDAR preprocessing stages
    pub fn preprocess(&self) -> PreprocessConfig {
        PreprocessConfig {
            voxel_size: self.voxel_size_default,
            remove_outliers: self.remove_outliers,
            outlier_nb_neighbors: self.outlier_nb_neighbors,
            outlier_std_ratio: self.outlier_std_ratio,
            estimate_normals: self.estimate_normals,
            ..PreprocessConfig::default()
        }
    }

    /// Knobs for the vegetation segmenter
    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig {
            height_threshold: self.vegetation_height_threshold,
            ..SegmentationConfig::default()
        }
    }

    /// Defaults injected into soil scoring when the caller omits a value
    pub fn soil_defaults(&self) -> SoilDefaults {
        SoilDefaults {
            ph_range: OptimumRange::new(self.optimal_ph_range.0, self.optimal_ph_range.1),
            organic_matter_pct: self.optimal_organic_matter,
            crop: self.default_crop,
        }
    }

    /// Whether a file of `size_bytes` exceeds the advisory upload cap
    pub fn exceeds_upload_cap(&self, size_bytes: u64) -> bool {
        size_bytes > self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Fallback soil values for omitted inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilDefaults {
    /// Omitted pH takes the midpoint of this range
    pub ph_range: OptimumRange,
    pub organic_matter_pct: f64,
    pub crop: Crop,
}

impl Default for SoilDefaults {
    fn default() -> Self {
        AnalyzerConfig::default().soil_defaults()
    }
}

impl SoilDefaults {
    /// Fill omitted values of a shell-supplied record
    pub fn resolve(&self, input: &SoilInput) -> SoilSample {
        SoilSample {
            ph: input.ph.unwrap_or_else(|| self.ph_range.midpoint()),
            organic_matter_pct: input.organic_matter_pct.unwrap_or(self.organic_matter_pct),
            texture: input.texture,
            nitrogen_ppm: input.nitrogen_ppm,
            phosphorus_ppm: input.phosphorus_ppm,
            potassium_ppm: input.potassium_ppm,
            field_capacity_pct: input.field_capacity_pct,
            conductivity_dsm: input.conductivity_dsm,
            crop: input.crop.unwrap_or(self.crop),
            expected_yield_kg_ha: input.expected_yield_kg_ha,
        }
    }
}
