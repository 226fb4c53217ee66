//! Point Cloud Loader
//!
//! Reads ASPRS LAS files and LASzip-compressed LAZ files through the `las`
//! crate. Only the scaled x/y/z coordinates and the intensity are consumed;
//! intensity is additionally mapped onto a synthetic red channel for display.
//!
//! Records are decoded one at a time, so a header that overstates its point
//! count fails on the first missing record instead of on allocation. Every
//! failure is recoverable and reported once to the caller.

use las::{Builder, Reader, Transform, Vector, Writer};
use std::fs;
use std::path::Path;

use super::point_cloud::{Point, PointCloud};
use crate::error::AnalysisError;

/// Load a LAS or LAZ file into a point cloud with intensities and synthetic colours
///
/// The file handle is scoped to this call.
pub fn load_point_cloud(path: &Path) -> Result<PointCloud, AnalysisError> {
    let invalid = |reason: String| AnalysisError::invalid_file(path, reason);

    let file_len = fs::metadata(path)
        .map_err(|e| invalid(e.to_string()))?
        .len();
    let mut reader = Reader::from_path(path).map_err(|e| invalid(e.to_string()))?;

    let header = reader.header();
    let declared = header.number_of_points();
    let format = *header.point_format();
    tracing::debug!(
        "LAS {} {}{} with {} points",
        header.version(),
        format,
        if format.is_compressed { " (LAZ)" } else { "" },
        declared
    );

    // Uncompressed records cannot outnumber the bytes on disk
    let record_len = u64::from(format.len()).max(1);
    let capacity = usize::try_from(declared.min(file_len / record_len)).unwrap_or(0);

    let mut points = Vec::with_capacity(capacity);
    let mut intensities = Vec::with_capacity(capacity);
    for (i, record) in reader.points().enumerate() {
        let p = record.map_err(|e| {
            invalid(format!(
                "truncated or corrupt point data at record {} of {}: {}",
                i, declared, e
            ))
        })?;
        points.push(Point::new(p.x, p.y, p.z));
        intensities.push(f64::from(p.intensity));
    }

    let colors = intensity_colors(&intensities);
    let mut cloud = PointCloud::new(points).with_intensities(intensities)?;
    if let Some(colors) = colors {
        cloud = cloud.with_colors(colors)?;
    }

    tracing::info!("Loaded {} points from {:?}", cloud.len(), path);
    Ok(cloud)
}

/// Red-channel colours from min-max normalised intensity
///
/// `None` when the cloud is empty or every intensity is equal.
pub fn intensity_colors(intensities: &[f64]) -> Option<Vec<[f64; 3]>> {
    let min = intensities.iter().copied().fold(f64::INFINITY, f64::min);
    let max = intensities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return None;
    }
    Some(
        intensities
            .iter()
            .map(|i| [(i - min) / range, 0.0, 0.0])
            .collect(),
    )
}

/// Write a cloud as LAS 1.2, point format 0, at the given coordinate scale
///
/// A `.laz` extension writes LASzip-compressed records. Intensities are
/// written when present (saturated to u16); other attributes are not stored.
pub fn save_point_cloud(path: &Path, cloud: &PointCloud, scale: f64) -> Result<(), AnalysisError> {
    let invalid = |e: las::Error| AnalysisError::invalid_file(path, e.to_string());
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(AnalysisError::invalid_file(path, format!("invalid scale {}", scale)));
    }

    let offset = cloud.bounds().map_or(Point::origin(), |b| b.min);
    let mut builder = Builder::from((1u8, 2u8));
    builder.generating_software = "agronomy_core".to_string();
    builder.transforms = Vector {
        x: Transform { scale, offset: offset.x },
        y: Transform { scale, offset: offset.y },
        z: Transform { scale, offset: offset.z },
    };
    let header = builder.into_header().map_err(invalid)?;

    // Compression follows the extension
    let mut writer = Writer::from_path(path, header).map_err(invalid)?;
    let intensities = cloud.intensities();
    for (i, p) in cloud.points().iter().enumerate() {
        let intensity = intensities.map_or(0.0, |v| v[i]).clamp(0.0, f64::from(u16::MAX));
        writer
            .write_point(las::Point {
                x: p.x,
                y: p.y,
                z: p.z,
                intensity: intensity as u16,
                ..Default::default()
            })
            .map_err(invalid)?;
    }
    writer.close().map_err(invalid)?;
    Ok(())
}
