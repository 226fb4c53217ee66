//! LiDAR Vegetation Analyzer
//!
//! Load → preprocess (voxel, outliers, normals) → segment canopy from ground
//! → extract plant metrics → bundle a digital twin.

pub mod point_cloud;
pub mod spatial;
pub mod loader;
pub mod preprocess;
pub mod segmentation;
pub mod hull;
pub mod metrics;
pub mod twin;

// Re-export commonly used types
pub use point_cloud::{Bounds, Point, PointCloud};
pub use loader::{intensity_colors, load_point_cloud, save_point_cloud};
pub use preprocess::{preprocess, PreprocessConfig, PreprocessStats, Preprocessed};
pub use segmentation::{segment_vegetation, SegmentationConfig, VegetationSegment};
pub use metrics::{extract_metrics, GrowthStage, PlantMetrics};
pub use twin::DigitalTwin;
