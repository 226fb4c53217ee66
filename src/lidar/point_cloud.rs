//! Point Cloud Container
//!
//! Unordered set of points with optional parallel per-point attributes.
//! Every attribute vector present has exactly one entry per point; the
//! builder methods reject mismatched lengths.

use nalgebra::{Point3, Vector3};

use crate::error::AnalysisError;

/// Point coordinates in metres
pub type Point = Point3<f64>;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Edge lengths (Δx, Δy, Δz)
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point>,
    intensities: Option<Vec<f64>>,
    normals: Option<Vec<Vector3<f64>>>,
    colors: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            intensities: None,
            normals: None,
            colors: None,
        }
    }

    /// Assemble from parts whose lengths already match by construction
    pub(crate) fn from_parts(
        points: Vec<Point>,
        intensities: Option<Vec<f64>>,
        normals: Option<Vec<Vector3<f64>>>,
        colors: Option<Vec<[f64; 3]>>,
    ) -> Self {
        debug_assert!(intensities.as_ref().map_or(true, |v| v.len() == points.len()));
        debug_assert!(normals.as_ref().map_or(true, |v| v.len() == points.len()));
        debug_assert!(colors.as_ref().map_or(true, |v| v.len() == points.len()));
        Self {
            points,
            intensities,
            normals,
            colors,
        }
    }

    /// Build from `[x, y, z]` triples
    pub fn from_xyz<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = [f64; 3]>,
    {
        Self::new(coords.into_iter().map(Point::from).collect())
    }

    pub fn with_intensities(mut self, intensities: Vec<f64>) -> Result<Self, AnalysisError> {
        self.check_len("intensities", intensities.len())?;
        self.intensities = Some(intensities);
        Ok(self)
    }

    pub fn with_normals(mut self, normals: Vec<Vector3<f64>>) -> Result<Self, AnalysisError> {
        self.check_len("normals", normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    pub fn with_colors(mut self, colors: Vec<[f64; 3]>) -> Result<Self, AnalysisError> {
        self.check_len("colors", colors.len())?;
        self.colors = Some(colors);
        Ok(self)
    }

    fn check_len(&self, attribute: &'static str, found: usize) -> Result<(), AnalysisError> {
        if found != self.points.len() {
            return Err(AnalysisError::MismatchedAttributes {
                attribute,
                expected: self.points.len(),
                found,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn intensities(&self) -> Option<&[f64]> {
        self.intensities.as_deref()
    }

    pub fn normals(&self) -> Option<&[Vector3<f64>]> {
        self.normals.as_deref()
    }

    pub fn colors(&self) -> Option<&[[f64; 3]]> {
        self.colors.as_deref()
    }

    /// Drop the colour vector
    pub fn without_colors(mut self) -> Self {
        self.colors = None;
        self
    }

    pub fn z_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.z).collect()
    }

    /// Bounding box, or `None` for an empty cloud
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let (min, max) = self.points.iter().fold((*first, *first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        Some(Bounds { min, max })
    }

    /// New cloud holding the points at `indices` (in that order) with their attributes
    pub fn select(&self, indices: &[usize]) -> PointCloud {
        fn pick<T: Copy>(values: &Option<Vec<T>>, indices: &[usize]) -> Option<Vec<T>> {
            values
                .as_ref()
                .map(|v| indices.iter().map(|&i| v[i]).collect())
        }

        PointCloud {
            points: indices.iter().map(|&i| self.points[i]).collect(),
            intensities: pick(&self.intensities, indices),
            normals: pick(&self.normals, indices),
            colors: pick(&self.colors, indices),
        }
    }

    /// Copy shifted by `offset`; attributes carried unchanged
    pub fn translated(&self, offset: Vector3<f64>) -> PointCloud {
        PointCloud {
            points: self.points.iter().map(|p| p + offset).collect(),
            ..self.clone()
        }
    }
}
