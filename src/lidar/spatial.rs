//! Spatial Index
//!
//! R*-tree over cloud points carrying their original indices. Read-only once
//! built, so it is shared freely across rayon workers.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use smallvec::SmallVec;

use super::point_cloud::Point;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Neighbour list sized for the hybrid search cap
pub type Neighbors = SmallVec<[usize; 32]>;

pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
}

impl SpatialIndex {
    pub fn build(points: &[Point]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new([p.x, p.y, p.z], i))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Euclidean distances to the `k` nearest points other than `self_index`
    ///
    /// Returns fewer than `k` distances when the cloud is smaller.
    pub fn knn_distances(&self, query: &Point, self_index: usize, k: usize) -> Vec<f64> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y, query.z])
            .filter(|(item, _)| item.data != self_index)
            .take(k)
            .map(|(_, d2)| d2.sqrt())
            .collect()
    }

    /// Indices of all points within `radius` of `query` (query point included)
    pub fn within_radius(&self, query: &Point, radius: f64) -> Vec<usize> {
        self.tree
            .locate_within_distance([query.x, query.y, query.z], radius * radius)
            .map(|item| item.data)
            .collect()
    }

    /// Nearest points within `radius`, at most `max_neighbors`, closest first
    pub fn hybrid_neighbors(&self, query: &Point, radius: f64, max_neighbors: usize) -> Neighbors {
        let r2 = radius * radius;
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y, query.z])
            .take_while(|(_, d2)| *d2 <= r2)
            .take(max_neighbors)
            .map(|(item, _)| item.data)
            .collect()
    }
}
