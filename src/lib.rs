//! Agronomy Core
//!
//! Decision-support library with two independent analytical pipelines:
//! - `soil/`: parameter scoring tables, weighted fertility aggregate and a
//!   rule-based remediation plan with fertilizer dosages
//! - `lidar/`: LAS loading, point cloud preprocessing, canopy segmentation,
//!   plant metrics and digital-twin snapshots
//!
//! `analyzer` wires each pipeline end to end; `config` splits the shell's
//! JSON configuration into per-pipeline knobs; `report` renders results.

pub mod error;
pub mod config;
pub mod soil;
pub mod lidar;
pub mod analyzer;
pub mod report;

// Re-export commonly used types
pub use error::AnalysisError;
pub use config::{AnalyzerConfig, SoilDefaults};
pub use analyzer::{
    analyze_point_cloud, analyze_point_cloud_file, analyze_sample, analyze_soil, LidarAnalysis,
    SegmentationSummary, SoilAnalysis,
};
pub use soil::{Crop, FertilityResult, Recommendation, SoilInput, SoilSample, Texture};
pub use lidar::{DigitalTwin, PlantMetrics, PointCloud};
pub use report::{JsonFormatter, MarkdownFormatter};
