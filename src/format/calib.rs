//! KITTI calibration files and the velodyne/camera frame transform.
//!
//! A calibration file holds whitespace-separated `key: v0 v1 ...` lines.
//! The rectification matrix `R0_rect` (3x3) and the velodyne-to-camera
//! matrix `Tr_velo_to_cam` (3x4) combine into the homogeneous
//! `velo_to_cam` transform; `cam_to_velo` is its inverse.
//!
//! Transforms are a scoped per-call resource: a [`CalibCache`] lives for
//! one import or export call and is dropped with it, so a later frame can
//! never see a stale transform.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nalgebra::{Matrix4, Point3};

use super::error::FormatError;

/// Paired velodyne/camera frame transforms for one point cloud frame.
#[derive(Debug, Clone)]
pub struct CalibTransforms {
    pub velo_to_cam: Matrix4<f64>,
    pub cam_to_velo: Matrix4<f64>,
}

impl CalibTransforms {
    /// Apply the velodyne-to-camera transform to a point.
    pub fn velo_to_cam_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.velo_to_cam.transform_point(point)
    }

    /// Apply the camera-to-velodyne transform to a point.
    pub fn cam_to_velo_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.cam_to_velo.transform_point(point)
    }
}

/// Parse a calibration file into its raw key/value arrays.
fn read_calibration_file(calib_path: &Path) -> Result<HashMap<String, Vec<f64>>, FormatError> {
    let content = std::fs::read_to_string(calib_path)?;
    let mut calib = HashMap::new();
    for line in content.lines() {
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else {
            continue;
        };
        let values: Vec<f64> = tokens.filter_map(|t| t.parse().ok()).collect();
        calib.insert(key.trim_end_matches(':').to_string(), values);
    }
    Ok(calib)
}

fn matrix_from_rows(values: &[f64], rows: usize, cols: usize) -> Option<Matrix4<f64>> {
    if values.len() < rows * cols {
        return None;
    }
    let mut m = Matrix4::identity();
    for row in 0..rows {
        for col in 0..cols {
            m[(row, col)] = values[row * cols + col];
        }
    }
    // Unfilled entries keep the identity's homogeneous bottom row.
    Some(m)
}

/// Load the transforms for `pcd_path` from its calibration file.
///
/// The calibration file shares the point cloud's file stem and lives in
/// `calib_folder`.
pub fn load_transforms(
    calib_folder: &Path,
    pcd_path: &Path,
) -> Result<CalibTransforms, FormatError> {
    let stem = pcd_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let calib_path: PathBuf = calib_folder.join(format!("{stem}.txt"));

    if !calib_path.is_file() {
        return Err(FormatError::CalibrationNotFound {
            calib_path,
            pcd_name: pcd_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    let calib = read_calibration_file(&calib_path)?;

    let rect = calib
        .get("R0_rect")
        .and_then(|v| matrix_from_rows(v, 3, 3))
        .ok_or_else(|| FormatError::missing_field("R0_rect"))?;
    let tr = calib
        .get("Tr_velo_to_cam")
        .and_then(|v| matrix_from_rows(v, 3, 4))
        .ok_or_else(|| FormatError::missing_field("Tr_velo_to_cam"))?;

    let velo_to_cam = rect * tr;
    let cam_to_velo = velo_to_cam
        .try_inverse()
        .ok_or_else(|| FormatError::invalid_format("singular calibration matrix"))?;

    Ok(CalibTransforms {
        velo_to_cam,
        cam_to_velo,
    })
}

/// Lazily loaded calibration transforms, scoped to one import/export call.
pub struct CalibCache<'a> {
    calib_folder: &'a Path,
    transforms: Option<CalibTransforms>,
}

impl<'a> CalibCache<'a> {
    pub fn new(calib_folder: &'a Path) -> Self {
        Self {
            calib_folder,
            transforms: None,
        }
    }

    /// The transforms for `pcd_path`, loading them on first use.
    pub fn get(&mut self, pcd_path: &Path) -> Result<&CalibTransforms, FormatError> {
        let transforms = match self.transforms.take() {
            Some(transforms) => transforms,
            None => load_transforms(self.calib_folder, pcd_path)?,
        };
        Ok(self.transforms.insert(transforms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_calib(dir: &Path, stem: &str) {
        let mut file = std::fs::File::create(dir.join(format!("{stem}.txt"))).unwrap();
        writeln!(file, "P0: 1 0 0 0 0 1 0 0 0 0 1 0").unwrap();
        writeln!(file, "R0_rect: 1 0 0 0 0 1 0 1 0").unwrap();
        writeln!(file, "Tr_velo_to_cam: 0 -1 0 0.1 0 0 -1 0.2 1 0 0 0.3").unwrap();
    }

    #[test]
    fn test_transforms_are_inverse() {
        let dir = tempfile::tempdir().unwrap();
        write_calib(dir.path(), "frame0");

        let transforms = load_transforms(dir.path(), Path::new("frame0.ply")).unwrap();
        let identity = transforms.velo_to_cam * transforms.cam_to_velo;
        assert!((identity - Matrix4::identity()).norm() < 1e-12);

        let p = Point3::new(1.5, -2.0, 0.75);
        let roundtrip = transforms.cam_to_velo_point(&transforms.velo_to_cam_point(&p));
        assert!((roundtrip - p).norm() < 1e-12);
    }

    #[test]
    fn test_rectification_is_composed() {
        let dir = tempfile::tempdir().unwrap();
        // Swapped rows in R0_rect so composition is observable.
        write_calib(dir.path(), "frame1");

        let transforms = load_transforms(dir.path(), Path::new("frame1.ply")).unwrap();
        // R0_rect swaps y and z after Tr_velo_to_cam.
        let p = transforms.velo_to_cam_point(&Point3::origin());
        assert!((p - Point3::new(0.1, 0.3, 0.2)).norm() < 1e-12);
    }

    #[test]
    fn test_missing_calibration_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_transforms(dir.path(), Path::new("frame9.ply")).unwrap_err();
        assert!(err.is_calibration_not_found());
    }
}
