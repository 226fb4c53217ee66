//! Convex Hulls
//!
//! 2-D hull area (monotone chain) and 3-D hull volume (quickhull with
//! per-face conflict lists). Both report `DegenerateGeometry` for collinear or
//! coplanar input; callers substitute bounding-box estimates.

use nalgebra::Vector3;
use rustc_hash::FxHashMap;

use super::point_cloud::Point;
use crate::error::AnalysisError;

/// Relative tolerance scaled by the input extent
const RELATIVE_EPS: f64 = 1e-9;

fn cross_2d(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Area of the convex hull of planar points
pub fn convex_hull_area(points: &[[f64; 2]]) -> Result<f64, AnalysisError> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup();
    if sorted.len() < 3 {
        return Err(AnalysisError::DegenerateGeometry("fewer than 3 distinct points"));
    }

    let mut hull: Vec<[f64; 2]> = Vec::with_capacity(sorted.len() * 2);
    // Lower chain
    for &p in &sorted {
        while hull.len() >= 2 && cross_2d(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    // Upper chain, starting from the rightmost point already on the hull
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross_2d(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    // Last point repeats the first
    hull.pop();

    if hull.len() < 3 {
        return Err(AnalysisError::DegenerateGeometry("collinear points"));
    }

    let twice_area: f64 = (0..hull.len())
        .map(|i| {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum();
    let area = twice_area.abs() / 2.0;

    let (min, max) = sorted.iter().fold(
        ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
        |(lo, hi), p| ([lo[0].min(p[0]), lo[1].min(p[1])], [hi[0].max(p[0]), hi[1].max(p[1])]),
    );
    let scale = (max[0] - min[0]).max(max[1] - min[1]);
    if area <= (RELATIVE_EPS * scale).powi(2) {
        return Err(AnalysisError::DegenerateGeometry("zero-area hull"));
    }
    Ok(area)
}

// ============================================================================
// 3-D HULL
// ============================================================================

struct Face {
    v: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
    /// Unprocessed points strictly outside this face
    outside: Vec<usize>,
    alive: bool,
    /// Last expansion round that found this face visible
    seen: usize,
}

/// Quickhull state: faces carry conflict lists, visibility spreads through
/// the edge map, and dead face slots are recycled.
struct Hull<'a> {
    points: &'a [Point],
    faces: Vec<Face>,
    /// Directed edge -> owning face
    edges: FxHashMap<(usize, usize), usize>,
    free: Vec<usize>,
    round: usize,
    interior: Point,
    eps: f64,
}

impl<'a> Hull<'a> {
    fn add_face(&mut self, a: usize, b: usize, c: usize) -> usize {
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        let raw = (pb - pa).cross(&(pc - pa));
        let norm = raw.norm();
        let normal = if norm > 0.0 { raw / norm } else { raw };
        let face = Face {
            v: [a, b, c],
            normal,
            offset: normal.dot(&pa.coords),
            outside: Vec::new(),
            alive: true,
            seen: 0,
        };
        let idx = match self.free.pop() {
            Some(slot) => {
                self.faces[slot] = face;
                slot
            }
            None => {
                self.faces.push(face);
                self.faces.len() - 1
            }
        };
        for edge in [(a, b), (b, c), (c, a)] {
            self.edges.insert(edge, idx);
        }
        idx
    }

    fn signed_distance(&self, face: usize, p: &Point) -> f64 {
        let f = &self.faces[face];
        f.normal.dot(&p.coords) - f.offset
    }

    /// Give each candidate to the first face it lies outside of; the rest are interior
    fn assign<I>(&mut self, candidates: I, faces: &[usize])
    where
        I: IntoIterator<Item = usize>,
    {
        for i in candidates {
            let p = self.points[i];
            let owner = faces
                .iter()
                .copied()
                .find(|&f| self.signed_distance(f, &p) > self.eps);
            if let Some(f) = owner {
                self.faces[f].outside.push(i);
            }
        }
    }

    /// Add the farthest conflict point of `face` to the hull; returns the new faces
    fn expand(&mut self, face: usize) -> Vec<usize> {
        let eye = self.faces[face].outside.iter().copied().max_by(|&a, &b| {
            self.signed_distance(face, &self.points[a])
                .total_cmp(&self.signed_distance(face, &self.points[b]))
        });
        let Some(eye) = eye else {
            return Vec::new();
        };
        let p = self.points[eye];

        self.round += 1;
        let round = self.round;
        self.faces[face].seen = round;
        let mut visible = vec![face];
        let mut horizon = Vec::new();
        let mut next = 0;
        while next < visible.len() {
            let f = visible[next];
            next += 1;
            let [a, b, c] = self.faces[f].v;
            for (x, y) in [(a, b), (b, c), (c, a)] {
                match self.edges.get(&(y, x)).copied() {
                    Some(g) if self.faces[g].seen == round => {}
                    Some(g) if self.signed_distance(g, &p) > self.eps => {
                        self.faces[g].seen = round;
                        visible.push(g);
                    }
                    _ => horizon.push((x, y)),
                }
            }
        }

        let mut orphans = Vec::new();
        for &f in &visible {
            let [a, b, c] = self.faces[f].v;
            for edge in [(a, b), (b, c), (c, a)] {
                if self.edges.get(&edge) == Some(&f) {
                    self.edges.remove(&edge);
                }
            }
            let dead = &mut self.faces[f];
            dead.alive = false;
            orphans.append(&mut dead.outside);
            self.free.push(f);
        }
        orphans.retain(|&i| i != eye);

        let created: Vec<usize> = horizon
            .into_iter()
            .map(|(x, y)| self.add_face(x, y, eye))
            .collect();
        self.assign(orphans, &created);
        created
    }

    fn volume(&self) -> f64 {
        self.faces
            .iter()
            .filter(|f| f.alive)
            .map(|f| {
                let [a, b, c] = f.v;
                let (da, db, dc) = (
                    self.points[a] - self.interior,
                    self.points[b] - self.interior,
                    self.points[c] - self.interior,
                );
                da.dot(&db.cross(&dc)) / 6.0
            })
            .sum::<f64>()
            .abs()
    }
}

/// Volume of the convex hull of 3-D points
pub fn convex_hull_volume(points: &[Point]) -> Result<f64, AnalysisError> {
    build_hull(points).map(|hull| hull.volume())
}

fn build_hull(points: &[Point]) -> Result<Hull<'_>, AnalysisError> {
    if points.len() < 4 {
        return Err(AnalysisError::DegenerateGeometry("fewer than 4 points"));
    }

    let (lo, hi) = points
        .iter()
        .fold((points[0], points[0]), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
    let scale = (hi - lo).max();
    if scale <= 0.0 {
        return Err(AnalysisError::DegenerateGeometry("coincident points"));
    }
    let eps = RELATIVE_EPS * scale;

    // Initial simplex from extreme points
    let p0 = (0..points.len())
        .min_by(|&a, &b| points[a].x.total_cmp(&points[b].x))
        .unwrap_or(0);
    let p1 = farthest(points, |p| (p - points[p0]).norm());
    let axis = (points[p1] - points[p0]).normalize();
    let p2 = farthest(points, |p| {
        let d = p - points[p0];
        (d - axis * d.dot(&axis)).norm()
    });
    let line_dist = {
        let d = points[p2] - points[p0];
        (d - axis * d.dot(&axis)).norm()
    };
    if line_dist <= eps {
        return Err(AnalysisError::DegenerateGeometry("collinear points"));
    }
    let plane_normal = (points[p1] - points[p0])
        .cross(&(points[p2] - points[p0]))
        .normalize();
    let p3 = farthest(points, |p| (p - points[p0]).dot(&plane_normal).abs());
    let plane_offset = (points[p3] - points[p0]).dot(&plane_normal);
    if plane_offset.abs() <= eps {
        return Err(AnalysisError::DegenerateGeometry("coplanar points"));
    }

    // Base winding must face away from the apex
    let (p1, p2) = if plane_offset > 0.0 { (p2, p1) } else { (p1, p2) };

    let interior = Point::from(
        (points[p0].coords + points[p1].coords + points[p2].coords + points[p3].coords) / 4.0,
    );
    let mut hull = Hull {
        points,
        faces: Vec::new(),
        edges: FxHashMap::default(),
        free: Vec::new(),
        round: 0,
        interior,
        eps,
    };
    let base = [
        hull.add_face(p0, p1, p2),
        hull.add_face(p0, p3, p1),
        hull.add_face(p1, p3, p2),
        hull.add_face(p2, p3, p0),
    ];
    let simplex = [p0, p1, p2, p3];
    hull.assign((0..points.len()).filter(|i| !simplex.contains(i)), &base);

    let mut pending = base.to_vec();
    while let Some(f) = pending.pop() {
        if !hull.faces[f].alive || hull.faces[f].outside.is_empty() {
            continue;
        }
        let created = hull.expand(f);
        pending.extend(created.into_iter().filter(|&g| !hull.faces[g].outside.is_empty()));
    }

    Ok(hull)
}

fn farthest<F>(points: &[Point], metric: F) -> usize
where
    F: Fn(&Point) -> f64,
{
    (0..points.len())
        .max_by(|&a, &b| metric(&points[a]).total_cmp(&metric(&points[b])))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cube_corners() -> Vec<Point> {
        let mut corners = Vec::new();
        for x in [0.0, 2.0] {
            for y in [0.0, 3.0] {
                for z in [0.0, 4.0] {
                    corners.push(Point::new(x, y, z));
                }
            }
        }
        corners
    }

    #[test]
    fn test_box_volume() {
        let mut points = cube_corners();
        points.push(Point::new(1.0, 1.5, 2.0)); // interior
        assert_relative_eq!(convex_hull_volume(&points).unwrap(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tetrahedron_volume() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ];
        assert_relative_eq!(convex_hull_volume(&points).unwrap(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_random_points_in_cube() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut points: Vec<Point> = (0..2000)
            .map(|_| Point::new(rng.gen(), rng.gen(), rng.gen()))
            .collect();
        points.extend(cube_corners().iter().map(|p| Point::new(p.x / 2.0, p.y / 3.0, p.z / 4.0)));
        assert_relative_eq!(convex_hull_volume(&points).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_volume_approximation() {
        let mut rng = StdRng::seed_from_u64(5);
        let points: Vec<Point> = (0..3000)
            .map(|_| {
                let v = Vector3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                Point::from(v.normalize())
            })
            .collect();
        let volume = convex_hull_volume(&points).unwrap();
        let sphere = 4.0 / 3.0 * std::f64::consts::PI;
        assert!(volume < sphere && volume > 0.95 * sphere);
    }

    #[test]
    fn test_large_sphere_mesh_is_closed() {
        let mut rng = StdRng::seed_from_u64(23);
        let points: Vec<Point> = (0..20_000)
            .map(|_| {
                let v = Vector3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                Point::from(v.normalize() * 3.0)
            })
            .collect();
        let hull = build_hull(&points).unwrap();

        let alive: Vec<&Face> = hull.faces.iter().filter(|f| f.alive).collect();
        let mut vertices: Vec<usize> = alive.iter().flat_map(|f| f.v).collect();
        vertices.sort_unstable();
        vertices.dedup();
        // Closed triangulated sphere: F = 2V - 4, every edge paired
        assert_eq!(alive.len(), 2 * vertices.len() - 4);
        assert_eq!(hull.edges.len(), 3 * alive.len());
        assert!(hull.edges.keys().all(|&(a, b)| hull.edges.contains_key(&(b, a))));
        assert!(alive.iter().all(|f| f.outside.is_empty()));
        // Dead slots are reused, so storage stays near the live face count
        assert!(hull.faces.len() < 2 * alive.len());

        let sphere = 4.0 / 3.0 * std::f64::consts::PI * 27.0;
        let volume = hull.volume();
        assert!(volume < sphere && volume > 0.99 * sphere);
    }

    #[test]
    fn test_coplanar_is_degenerate() {
        let points: Vec<Point> = (0..50)
            .map(|i| Point::new((i % 7) as f64, (i / 7) as f64, 1.0))
            .collect();
        let err = convex_hull_volume(&points).unwrap_err();
        assert_eq!(err.kind(), "degenerate_geometry");
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, i as f64, i as f64)).collect();
        assert!(convex_hull_volume(&points).is_err());
        let planar: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, 2.0 * i as f64]).collect();
        assert!(convex_hull_area(&planar).is_err());
    }

    #[test]
    fn test_square_area() {
        let points = vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [1.0, 1.0], [0.5, 1.5]];
        assert_relative_eq!(convex_hull_area(&points).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_area() {
        let points = vec![[0.0, 0.0], [4.0, 0.0], [0.0, 3.0], [1.0, 1.0]];
        assert_relative_eq!(convex_hull_area(&points).unwrap(), 6.0, epsilon = 1e-12);
    }
}
