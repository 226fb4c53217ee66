//! Error kinds surfaced by the analytical cores
//!
//! Domain failures are typed; I/O and configuration surfaces wrap them in
//! `anyhow` with context where they cross into the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a soil or point-cloud analysis step
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// LAS/LAZ input could not be parsed (recoverable)
    #[error("invalid point cloud file {path:?}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    /// Too few candidate canopy points above ground to cluster
    #[error("insufficient vegetation: {found} candidate points (minimum {required})")]
    InsufficientVegetation { found: usize, required: usize },

    /// A stage received fewer points than it needs
    #[error("insufficient points: {found} (minimum {required})")]
    InsufficientPoints { found: usize, required: usize },

    /// Convex hull could not be built (collinear or coplanar input)
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// A per-point attribute vector does not match the point count
    #[error("{attribute} has {found} entries but the cloud has {expected} points")]
    MismatchedAttributes {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

impl AnalysisError {
    /// Stable snake_case kind, as exchanged with the presentation shell
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidFile { .. } => "invalid_file",
            AnalysisError::InsufficientVegetation { .. } => "insufficient_vegetation",
            AnalysisError::InsufficientPoints { .. } => "insufficient_points",
            AnalysisError::DegenerateGeometry(_) => "degenerate_geometry",
            AnalysisError::MismatchedAttributes { .. } => "mismatched_attributes",
        }
    }

    pub(crate) fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
