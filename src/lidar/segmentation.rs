//! Vegetation Segmenter
//!
//! Separates canopy from ground in a preprocessed cloud:
//!   1. Ground height = low percentile of z; candidates sit above it by a threshold
//!   2. DBSCAN over the candidates (3-D Euclidean)
//!   3. The most populous cluster is the canopy
//!
//! Cluster labels are assigned in point-index order, so the result depends
//! only on relative positions (translation-invariant in x/y).

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::point_cloud::PointCloud;
use super::spatial::SpatialIndex;
use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Offset above ground height (m) a point must exceed to be a candidate
    pub height_threshold: f64,
    /// Percentile of z taken as ground height
    pub ground_percentile: f64,
    /// DBSCAN neighbourhood radius (m)
    pub cluster_eps: f64,
    /// DBSCAN minimum neighbourhood size, the point itself included
    pub cluster_min_points: usize,
    /// Fewer candidates than this fails with `insufficient_vegetation`
    pub min_candidates: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            height_threshold: 0.30,
            ground_percentile: 2.0,
            cluster_eps: 0.5,
            cluster_min_points: 10,
            min_candidates: 50,
        }
    }
}

/// Canopy extracted from a cloud
#[derive(Debug, Clone)]
pub struct VegetationSegment {
    pub cloud: PointCloud,
    /// Indices of the canopy points in the input cloud, ascending
    pub indices: Vec<usize>,
    pub ground_z: f64,
    pub candidate_count: usize,
    pub cluster_count: usize,
}

/// Linear-interpolated percentile (`p` in 0-100) of unsorted values
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// DBSCAN labels; `None` marks noise
///
/// Clusters are numbered in order of their first core point.
pub fn dbscan(cloud: &PointCloud, eps: f64, min_points: usize) -> Vec<Option<usize>> {
    let points = cloud.points();
    let index = SpatialIndex::build(points);
    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_label = 0;

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let neighbors = index.within_radius(&points[start], eps);
        if neighbors.len() < min_points {
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[start] = Some(label);

        let mut queue: VecDeque<usize> = neighbors.into_iter().collect();
        while let Some(i) = queue.pop_front() {
            if labels[i].is_none() {
                // Border or core point joins the cluster
                labels[i] = Some(label);
            }
            if visited[i] {
                continue;
            }
            visited[i] = true;

            let expansion = index.within_radius(&points[i], eps);
            if expansion.len() >= min_points {
                queue.extend(expansion.into_iter().filter(|&j| !visited[j] || labels[j].is_none()));
            }
        }
    }

    labels
}

/// Label of the most populous cluster; ties go to the smallest label
fn largest_cluster(labels: &[Option<usize>]) -> Option<usize> {
    let n_clusters = labels.iter().flatten().max().map_or(0, |m| m + 1);
    let mut counts = vec![0usize; n_clusters];
    for label in labels.iter().flatten() {
        counts[*label] += 1;
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then(lb.cmp(la)))
        .map(|(label, _)| label)
}

/// Extract the main canopy cluster from a preprocessed cloud
pub fn segment_vegetation(
    cloud: &PointCloud,
    config: &SegmentationConfig,
) -> Result<VegetationSegment, AnalysisError> {
    let z = cloud.z_values();
    let ground_z = percentile(&z, config.ground_percentile).ok_or(
        AnalysisError::InsufficientVegetation {
            found: 0,
            required: config.min_candidates,
        },
    )?;

    let cutoff = ground_z + config.height_threshold;
    let candidates: Vec<usize> = z
        .iter()
        .enumerate()
        .filter(|(_, z)| **z > cutoff)
        .map(|(i, _)| i)
        .collect();

    if candidates.len() < config.min_candidates {
        tracing::warn!(
            "Only {} candidate vegetation points above {:.2} m",
            candidates.len(),
            cutoff
        );
        return Err(AnalysisError::InsufficientVegetation {
            found: candidates.len(),
            required: config.min_candidates,
        });
    }

    let candidate_cloud = cloud.select(&candidates);
    let labels = dbscan(&candidate_cloud, config.cluster_eps, config.cluster_min_points);
    let cluster_count = labels.iter().flatten().max().map_or(0, |m| m + 1);

    let indices: Vec<usize> = match largest_cluster(&labels) {
        Some(main) => labels
            .iter()
            .zip(&candidates)
            .filter(|(label, _)| **label == Some(main))
            .map(|(_, &i)| i)
            .collect(),
        None => Vec::new(),
    };

    let mut canopy = cloud.select(&indices);
    if canopy.colors().is_some() && candidates.len() != indices.len() {
        canopy = canopy.without_colors();
    }

    tracing::info!(
        "Segmented vegetation: ground {:.3} m, {} candidates, {} clusters, {} canopy points",
        ground_z,
        candidates.len(),
        cluster_count,
        indices.len()
    );

    Ok(VegetationSegment {
        cloud: canopy,
        indices,
        ground_z,
        candidate_count: candidates.len(),
        cluster_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// 500 ground points at z in [0, 0.1] and 200 canopy points at z in [1, 2]
    fn plot(seed: u64) -> PointCloud {
        let mut rng = StdRng::seed_from_u64(seed);
        let ground = (0..500).map(|_| {
            [
                rng.gen_range(0.0..4.0),
                rng.gen_range(0.0..4.0),
                rng.gen_range(0.0..0.1),
            ]
        });
        let mut coords: Vec<[f64; 3]> = ground.collect();
        for _ in 0..200 {
            coords.push([
                rng.gen_range(1.5..2.5),
                rng.gen_range(1.5..2.5),
                rng.gen_range(1.0..2.0),
            ]);
        }
        PointCloud::from_xyz(coords)
    }

    #[test]
    fn test_percentile() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        assert_eq!(percentile(&values, 2.0), Some(2.0));
        assert_eq!(percentile(&[1.0, 3.0], 50.0), Some(2.0));
        assert_eq!(percentile(&[], 2.0), None);
    }

    #[test]
    fn test_canopy_extracted() {
        let cloud = plot(42);
        let segment = segment_vegetation(&cloud, &SegmentationConfig::default()).unwrap();
        assert!(segment.ground_z < 0.1);
        assert_eq!(segment.candidate_count, 200);
        assert!(segment.indices.len() >= 190 && segment.indices.len() <= 200);
        assert!(segment.indices.iter().all(|&i| i >= 500));
        assert!(segment.cloud.points().iter().all(|p| p.z >= 1.0));
    }

    #[test]
    fn test_insufficient_vegetation() {
        let flat = PointCloud::from_xyz((0..300).map(|i| [i as f64 * 0.01, 0.0, 0.0]));
        let err = segment_vegetation(&flat, &SegmentationConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "insufficient_vegetation");

        let err = segment_vegetation(&PointCloud::default(), &SegmentationConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "insufficient_vegetation");
    }

    #[test]
    fn test_translation_invariant() {
        let cloud = plot(9);
        let config = SegmentationConfig::default();
        let base = segment_vegetation(&cloud, &config).unwrap();
        for offset in [Vector3::new(1000.0, 0.0, 0.0), Vector3::new(0.0, -250.0, 0.0)] {
            let moved = segment_vegetation(&cloud.translated(offset), &config).unwrap();
            assert_eq!(moved.indices, base.indices);
        }
    }

    #[test]
    fn test_largest_cluster_tie_break() {
        let labels = vec![Some(1), Some(1), Some(0), Some(0), None, Some(2)];
        assert_eq!(largest_cluster(&labels), Some(0));
        assert_eq!(largest_cluster(&[None, None]), None);
    }

    #[test]
    fn test_dbscan_two_blobs() {
        let mut coords = Vec::new();
        for i in 0..20 {
            coords.push([i as f64 * 0.05, 0.0, 0.0]);
        }
        for i in 0..12 {
            coords.push([10.0 + i as f64 * 0.05, 0.0, 0.0]);
        }
        coords.push([50.0, 50.0, 50.0]);
        let labels = dbscan(&PointCloud::from_xyz(coords), 0.5, 10);
        assert!(labels[..20].iter().all(|l| *l == Some(0)));
        assert!(labels[20..32].iter().all(|l| *l == Some(1)));
        assert_eq!(labels[32], None);
    }

    /// Flat 4x4 m ground grid under a 5x5x4 canopy block at 0.1 m spacing,
    /// plus `stray` points floating far from the block
    fn gridded_plot(stray: usize) -> PointCloud {
        let mut coords: Vec<[f64; 3]> = (0..400)
            .map(|i| [(i % 20) as f64 * 0.2, (i / 20) as f64 * 0.2, 0.0])
            .collect();
        for i in 0..100 {
            coords.push([
                1.8 + (i % 5) as f64 * 0.1,
                1.8 + (i / 5 % 5) as f64 * 0.1,
                1.0 + (i / 25) as f64 * 0.1,
            ]);
        }
        for i in 0..stray {
            coords.push([3.9, 3.9 - i as f64 * 0.05, 3.0]);
        }
        let colors = vec![[0.5, 0.0, 0.0]; coords.len()];
        PointCloud::from_xyz(coords).with_colors(colors).unwrap()
    }

    #[test]
    fn test_colors_kept_for_single_cluster() {
        let segment = segment_vegetation(&gridded_plot(0), &SegmentationConfig::default()).unwrap();
        assert_eq!(segment.candidate_count, 100);
        assert_eq!(segment.indices.len(), 100);
        assert_eq!(segment.cluster_count, 1);
        assert_eq!(segment.cloud.colors().unwrap().len(), 100);
    }

    #[test]
    fn test_colors_dropped_when_points_lost() {
        let segment = segment_vegetation(&gridded_plot(3), &SegmentationConfig::default()).unwrap();
        assert_eq!(segment.candidate_count, 103);
        assert_eq!(segment.indices.len(), 100);
        assert!(segment.indices.iter().all(|&i| (400..500).contains(&i)));
        assert!(segment.cloud.colors().is_none());
    }
}
