//! Point Cloud Preprocessor
//!
//! Three independent, individually toggleable stages:
//!   1. Voxel downsample (centroid per occupied voxel)
//!   2. Statistical outlier removal (mean k-NN distance vs global μ + r·σ)
//!   3. Normal estimation (PCA over a capped radius neighbourhood)
//!
//! Stages 2 and 3 skip clouds with fewer than `MIN_POINTS_FOR_STATISTICS`
//! points. Per-point neighbour queries run in parallel over a shared
//! read-only index.

use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::point_cloud::{Point, PointCloud};
use super::spatial::SpatialIndex;

pub const MIN_POINTS_FOR_STATISTICS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Voxel edge in metres; <= 0 disables downsampling
    pub voxel_size: f64,
    pub remove_outliers: bool,
    pub outlier_nb_neighbors: usize,
    pub outlier_std_ratio: f64,
    pub estimate_normals: bool,
    pub normal_radius: f64,
    pub normal_max_neighbors: usize,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.05,
            remove_outliers: true,
            outlier_nb_neighbors: 50,
            outlier_std_ratio: 1.5,
            estimate_normals: true,
            normal_radius: 0.1,
            normal_max_neighbors: 30,
        }
    }
}

/// Point counts through the stages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessStats {
    pub input_points: usize,
    pub after_downsample: usize,
    pub after_outlier_removal: usize,
    pub normals_estimated: bool,
}

#[derive(Debug, Clone)]
pub struct Preprocessed {
    pub cloud: PointCloud,
    pub stats: PreprocessStats,
}

/// Run the enabled stages in order
pub fn preprocess(cloud: PointCloud, config: &PreprocessConfig) -> Preprocessed {
    let input_points = cloud.len();

    let cloud = if config.voxel_size > 0.0 {
        voxel_downsample(&cloud, config.voxel_size)
    } else {
        cloud
    };
    let after_downsample = cloud.len();

    let cloud = if config.remove_outliers {
        remove_statistical_outliers(&cloud, config.outlier_nb_neighbors, config.outlier_std_ratio)
    } else {
        cloud
    };
    let after_outlier_removal = cloud.len();

    let mut normals_estimated = false;
    let cloud = if config.estimate_normals {
        match estimate_normals(&cloud, config.normal_radius, config.normal_max_neighbors) {
            Some(with_normals) => {
                normals_estimated = true;
                with_normals
            }
            None => cloud,
        }
    } else {
        cloud
    };

    let stats = PreprocessStats {
        input_points,
        after_downsample,
        after_outlier_removal,
        normals_estimated,
    };
    tracing::info!(
        "Preprocessed cloud: {} -> {} (voxel) -> {} (outliers), normals: {}",
        input_points,
        after_downsample,
        after_outlier_removal,
        normals_estimated
    );

    Preprocessed { cloud, stats }
}

// ============================================================================
// VOXEL DOWNSAMPLE
// ============================================================================

#[derive(Default)]
struct VoxelAccumulator {
    count: usize,
    position: Vector3<f64>,
    intensity: f64,
    color: [f64; 3],
    normal: Vector3<f64>,
}

/// Replace the points of each occupied voxel by their centroid
///
/// Cells are the origin-anchored lattice `floor(p / voxel_size)`, not a grid
/// offset to the cloud's minimum corner. Centroids stay inside their cell, so
/// a second pass over the output changes nothing.
/// Intensities and colours are averaged; normals are averaged and
/// renormalised. Output order follows first occupancy.
pub fn voxel_downsample(cloud: &PointCloud, voxel_size: f64) -> PointCloud {
    if voxel_size <= 0.0 || cloud.is_empty() {
        return cloud.clone();
    }

    let key = |p: &Point| {
        (
            (p.x / voxel_size).floor() as i64,
            (p.y / voxel_size).floor() as i64,
            (p.z / voxel_size).floor() as i64,
        )
    };

    let mut slots: FxHashMap<(i64, i64, i64), usize> = FxHashMap::default();
    let mut voxels: Vec<VoxelAccumulator> = Vec::new();

    for (i, p) in cloud.points().iter().enumerate() {
        let slot = *slots.entry(key(p)).or_insert_with(|| {
            voxels.push(VoxelAccumulator::default());
            voxels.len() - 1
        });
        let acc = &mut voxels[slot];
        acc.count += 1;
        acc.position += p.coords;
        if let Some(intensities) = cloud.intensities() {
            acc.intensity += intensities[i];
        }
        if let Some(colors) = cloud.colors() {
            for (c, v) in acc.color.iter_mut().zip(colors[i]) {
                *c += v;
            }
        }
        if let Some(normals) = cloud.normals() {
            acc.normal += normals[i];
        }
    }

    let points = voxels
        .iter()
        .map(|v| Point::from(v.position / v.count as f64))
        .collect();
    let intensities = cloud
        .intensities()
        .map(|_| voxels.iter().map(|v| v.intensity / v.count as f64).collect());
    let colors = cloud.colors().map(|_| {
        voxels
            .iter()
            .map(|v| v.color.map(|c| c / v.count as f64))
            .collect()
    });
    let normals = cloud.normals().map(|_| {
        voxels
            .iter()
            .map(|v| v.normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros))
            .collect()
    });
    let out = PointCloud::from_parts(points, intensities, normals, colors);

    tracing::debug!(
        "Voxel downsample ({} m): {} -> {} points",
        voxel_size,
        cloud.len(),
        out.len()
    );
    out
}

// ============================================================================
// STATISTICAL OUTLIER REMOVAL
// ============================================================================

/// Mean distance from each point to its `k` nearest neighbours
pub fn mean_neighbor_distances(cloud: &PointCloud, k: usize) -> Vec<f64> {
    let index = SpatialIndex::build(cloud.points());
    cloud
        .points()
        .par_iter()
        .enumerate()
        .map(|(i, p)| {
            let d = index.knn_distances(p, i, k);
            if d.is_empty() {
                0.0
            } else {
                d.iter().sum::<f64>() / d.len() as f64
            }
        })
        .collect()
}

/// Indices of points whose mean k-NN distance is within `μ + std_ratio·σ`
pub fn statistical_inliers(cloud: &PointCloud, k: usize, std_ratio: f64) -> Vec<usize> {
    if cloud.len() < MIN_POINTS_FOR_STATISTICS || k == 0 {
        return (0..cloud.len()).collect();
    }

    let mean_distances = mean_neighbor_distances(cloud, k);
    let n = mean_distances.len() as f64;
    let mu = mean_distances.iter().sum::<f64>() / n;
    let variance = mean_distances.iter().map(|d| (d - mu).powi(2)).sum::<f64>() / (n - 1.0);
    let threshold = mu + std_ratio * variance.sqrt();

    mean_distances
        .iter()
        .enumerate()
        .filter(|(_, d)| **d <= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Keep only statistical inliers; clouds under 100 points pass through
pub fn remove_statistical_outliers(cloud: &PointCloud, k: usize, std_ratio: f64) -> PointCloud {
    if cloud.len() < MIN_POINTS_FOR_STATISTICS {
        tracing::debug!("Outlier removal skipped: {} points", cloud.len());
        return cloud.clone();
    }
    let inliers = statistical_inliers(cloud, k, std_ratio);
    tracing::debug!(
        "Outlier removal (k={}, r={}): removed {} of {} points",
        k,
        std_ratio,
        cloud.len() - inliers.len(),
        cloud.len()
    );
    cloud.select(&inliers)
}

// ============================================================================
// NORMAL ESTIMATION
// ============================================================================

/// Unit normal of the best-fit plane through `neighbors`
///
/// Eigenvector of the smallest covariance eigenvalue; sign unconstrained.
/// Fewer than three neighbours yields +Z.
pub fn plane_normal(points: &[Point], neighbors: &[usize]) -> Vector3<f64> {
    if neighbors.len() < 3 {
        return Vector3::z();
    }

    let n = neighbors.len() as f64;
    let centroid = neighbors
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + points[i].coords)
        / n;
    let covariance = neighbors.iter().fold(Matrix3::zeros(), |acc, &i| {
        let d = points[i].coords - centroid;
        acc + d * d.transpose()
    }) / n;

    let eigen = covariance.symmetric_eigen();
    let smallest = eigen.eigenvalues.imin();
    eigen
        .eigenvectors
        .column(smallest)
        .into_owned()
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::z)
}

/// Per-point normals; `None` when the cloud is too small
pub fn estimate_normals(cloud: &PointCloud, radius: f64, max_neighbors: usize) -> Option<PointCloud> {
    if cloud.len() < MIN_POINTS_FOR_STATISTICS {
        tracing::debug!("Normal estimation skipped: {} points", cloud.len());
        return None;
    }

    let points = cloud.points();
    let index = SpatialIndex::build(points);
    let normals: Vec<Vector3<f64>> = points
        .par_iter()
        .map(|p| {
            let neighbors = index.hybrid_neighbors(p, radius, max_neighbors);
            plane_normal(points, &neighbors)
        })
        .collect();

    cloud.clone().with_normals(normals).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_cloud(n: usize, seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        PointCloud::from_xyz((0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()]))
    }

    #[test]
    fn test_voxel_centroids() {
        let cloud = PointCloud::from_xyz([
            [0.01, 0.01, 0.01],
            [0.03, 0.03, 0.03],
            [0.21, 0.0, 0.0],
        ])
        .with_intensities(vec![10.0, 30.0, 5.0])
        .unwrap();
        let down = voxel_downsample(&cloud, 0.05);
        assert_eq!(down.len(), 2);
        assert_relative_eq!(down.points()[0].x, 0.02, epsilon = 1e-12);
        assert_eq!(down.intensities().unwrap(), &[20.0, 5.0]);
    }

    #[test]
    fn test_voxel_disabled() {
        let cloud = random_cloud(50, 1);
        assert_eq!(voxel_downsample(&cloud, 0.0).len(), 50);
        assert_eq!(voxel_downsample(&cloud, -1.0).len(), 50);
    }

    #[test]
    fn test_voxel_idempotent() {
        let cloud = random_cloud(5000, 7);
        let once = voxel_downsample(&cloud, 0.1);
        let twice = voxel_downsample(&once, 0.1);
        assert!(once.len() < cloud.len());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn test_outliers_removed() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut coords: Vec<[f64; 3]> = (0..300)
            .map(|_| [rng.gen::<f64>() * 0.5, rng.gen::<f64>() * 0.5, rng.gen::<f64>() * 0.5])
            .collect();
        coords.push([20.0, 20.0, 20.0]);
        coords.push([-15.0, 5.0, 30.0]);
        let cloud = PointCloud::from_xyz(coords);

        let cleaned = remove_statistical_outliers(&cloud, 20, 1.5);
        assert!(cleaned.len() <= 300);
        assert!(cleaned.points().iter().all(|p| p.x < 1.0 && p.z < 1.0));
    }

    #[test]
    fn test_outlier_removal_monotone_in_ratio() {
        let cloud = random_cloud(400, 11);
        let mut previous = 0;
        for ratio in [0.5, 1.0, 1.5, 2.0, 3.0] {
            let kept = statistical_inliers(&cloud, 20, ratio).len();
            assert!(kept >= previous);
            previous = kept;
        }
    }

    #[test]
    fn test_small_cloud_skips_statistics() {
        let cloud = random_cloud(99, 5);
        assert_eq!(remove_statistical_outliers(&cloud, 50, 0.1).len(), 99);
        assert!(estimate_normals(&cloud, 0.1, 30).is_none());
    }

    #[test]
    fn test_plane_normals() {
        // Dense horizontal sheet: normals along ±Z
        let coords: Vec<[f64; 3]> = (0..20)
            .flat_map(|i| (0..20).map(move |j| [i as f64 * 0.02, j as f64 * 0.02, 1.0]))
            .collect();
        let cloud = estimate_normals(&PointCloud::from_xyz(coords), 0.1, 30).unwrap();
        for n in cloud.normals().unwrap() {
            assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_pipeline_stats() {
        let cloud = random_cloud(2000, 21);
        let result = preprocess(cloud, &PreprocessConfig::default());
        assert_eq!(result.stats.input_points, 2000);
        assert!(result.stats.after_downsample <= 2000);
        assert!(result.stats.after_outlier_removal <= result.stats.after_downsample);
        assert!(result.stats.normals_estimated);
        assert_eq!(result.cloud.normals().unwrap().len(), result.cloud.len());
    }
}
