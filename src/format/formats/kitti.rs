//! KITTI text format implementation.
//!
//! One line per object in the 15-token KITTI layout
//! (type, truncated, occluded, alpha, 2D bbox, dimensions as h/w/l,
//! location, rotation about the camera y-axis), plus a custom extension
//! line `Point <classname> <x> <y> <z>` for point annotations.
//!
//! In transformed mode all geometry is converted between the camera frame
//! of the file and the sensor frame used internally, using the per-frame
//! calibration file. The KITTI location is the center of the box bottom
//! face; the half-height shift is applied symmetrically on both directions.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use nalgebra::Point3;

use crate::config::LabelConfig;
use crate::format::calib::CalibCache;
use crate::format::error::FormatError;
use crate::format::traits::{label_path, write_label_file, ExportSummary, LabelFormat};
use crate::geometry::{abs_to_rel, rel_to_abs};
use crate::model::{AnnotationItem, BBox, KittiMeta, Point};

/// Leading token of the custom point extension lines.
const POINT_MARKER: &str = "Point";

/// Class name of boxes that are written back entirely unmodified.
const DONT_CARE: &str = "DontCare";

/// KITTI text format, with or without the camera frame transform.
pub struct KittiFormat {
    config: LabelConfig,
    transformed: bool,
}

impl KittiFormat {
    /// Transformed mode: labels are in the camera frame and require a
    /// calibration file per point cloud.
    pub fn transformed(config: LabelConfig) -> Self {
        Self {
            config,
            transformed: true,
        }
    }

    /// Untransformed mode: labels stay in the sensor frame.
    pub fn untransformed(config: LabelConfig) -> Self {
        Self {
            config,
            transformed: false,
        }
    }

    fn parse_box_line(
        &self,
        tokens: &[&str],
        calib: &mut CalibCache<'_>,
        pcd_path: &Path,
    ) -> Result<Option<BBox>, FormatError> {
        if tokens.len() < 15 {
            log::warn!("Skipping malformed KITTI line with {} tokens", tokens.len());
            return Ok(None);
        }

        let meta = KittiMeta {
            object_type: tokens[0].to_string(),
            truncated: tokens[1].to_string(),
            occluded: tokens[2].to_string(),
            alpha: tokens[3].to_string(),
            bbox_2d: tokens[4..8].join(" "),
            dimensions: tokens[8..11].join(" "),
            location: tokens[11..14].join(" "),
            rotation_y: tokens[14].to_string(),
        };

        let Some(numbers) = parse_floats(&tokens[8..15]) else {
            log::warn!("Skipping KITTI line with unparsable numbers");
            return Ok(None);
        };
        let [height, width, length, x, y, z, rotation_y] = numbers[..] else {
            return Ok(None);
        };

        let mut centroid = Point3::new(x, y, z);
        if self.transformed {
            let transforms = calib.get(pcd_path)?;
            centroid = transforms.cam_to_velo_point(&centroid);
            // KITTI locates the box on its bottom face.
            centroid.z += height / 2.0;
        }

        let rotation = if self.transformed {
            -rotation_y + FRAC_PI_2
        } else {
            rotation_y
        };

        let mut bbox = BBox::new(centroid, (length, width, height), meta.object_type.clone());
        bbox.set_dimensions(length, width, height, self.config.min_dimension);
        bbox.set_rotations(0.0, 0.0, rel_to_abs(rotation));
        bbox.kitti_meta = Some(meta);
        Ok(Some(bbox))
    }

    fn parse_point_line(
        &self,
        tokens: &[&str],
        calib: &mut CalibCache<'_>,
        pcd_path: &Path,
    ) -> Result<Option<Point>, FormatError> {
        if tokens.len() < 5 {
            log::warn!("Skipping malformed point line with {} tokens", tokens.len());
            return Ok(None);
        }
        let Some(coords) = parse_floats(&tokens[2..5]) else {
            log::warn!("Skipping point line with unparsable coordinates");
            return Ok(None);
        };

        let mut point = Point3::new(coords[0], coords[1], coords[2]);
        if self.transformed {
            point = calib.get(pcd_path)?.cam_to_velo_point(&point);
        }
        Ok(Some(Point::new(point, tokens[1])))
    }

    fn format_box_line(
        &self,
        bbox: &BBox,
        calib: &mut CalibCache<'_>,
        pcd_path: &Path,
    ) -> Result<String, FormatError> {
        // The frame transform is required for the whole file, so even a
        // DontCare-only export fails without a calibration file.
        if self.transformed {
            calib.get(pcd_path)?;
        }

        let meta = bbox.kitti_meta.clone().unwrap_or_default();
        if bbox.classname() == DONT_CARE {
            return Ok(meta_line(&meta));
        }

        let (length, width, height) = bbox.dimensions();
        let mut centroid = bbox.center();
        if self.transformed {
            centroid.z -= height / 2.0;
            centroid = calib.get(pcd_path)?.velo_to_cam_point(&centroid);
        }

        let mut rotation = abs_to_rel(bbox.z_rotation());
        if self.transformed {
            rotation = -(rotation - FRAC_PI_2);
        }

        let round = |v: f64| self.config.round_dec(v);
        let updated = KittiMeta {
            object_type: bbox.classname().to_string(),
            // KITTI orders dimensions as height, width, length.
            dimensions: format!("{} {} {}", round(height), round(width), round(length)),
            location: format!(
                "{} {} {}",
                round(centroid.x),
                round(centroid.y),
                round(centroid.z)
            ),
            rotation_y: round(rotation).to_string(),
            ..meta
        };
        Ok(meta_line(&updated))
    }

    fn format_point_line(
        &self,
        point: &Point,
        calib: &mut CalibCache<'_>,
        pcd_path: &Path,
    ) -> Result<String, FormatError> {
        let mut coords = point.coords();
        if self.transformed {
            coords = calib.get(pcd_path)?.velo_to_cam_point(&coords);
        }
        let round = |v: f64| self.config.round_dec(v);
        Ok(format!(
            "{POINT_MARKER} {} {} {} {}",
            point.classname(),
            round(coords.x),
            round(coords.y),
            round(coords.z)
        ))
    }
}

impl LabelFormat for KittiFormat {
    fn id(&self) -> &'static str {
        if self.transformed {
            "kitti"
        } else {
            "kitti_untransformed"
        }
    }

    fn display_name(&self) -> &'static str {
        if self.transformed {
            "KITTI (camera frame)"
        } else {
            "KITTI (sensor frame)"
        }
    }

    fn file_ending(&self) -> &'static str {
        ".txt"
    }

    fn import(&self, pcd_path: &Path) -> Result<Vec<AnnotationItem>, FormatError> {
        let path = label_path(&self.config.label_folder, pcd_path, self.file_ending());
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)?;
        let mut calib = CalibCache::new(&self.config.calib_folder);

        let mut items = Vec::new();
        for line in content.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.first() {
                None => continue,
                Some(&POINT_MARKER) => {
                    if let Some(point) = self.parse_point_line(&tokens, &mut calib, pcd_path)? {
                        items.push(AnnotationItem::Point(point));
                    }
                }
                Some(_) => {
                    if let Some(bbox) = self.parse_box_line(&tokens, &mut calib, pcd_path)? {
                        items.push(AnnotationItem::BBox(bbox));
                    }
                }
            }
        }

        log::info!("Imported {} labels from {path:?}", items.len());
        Ok(items)
    }

    fn export(
        &self,
        items: &[AnnotationItem],
        pcd_path: &Path,
    ) -> Result<ExportSummary, FormatError> {
        let mut calib = CalibCache::new(&self.config.calib_folder);

        let mut lines = String::new();
        for item in items {
            let line = match item {
                AnnotationItem::BBox(bbox) => self.format_box_line(bbox, &mut calib, pcd_path)?,
                AnnotationItem::Point(point) => {
                    self.format_point_line(point, &mut calib, pcd_path)?
                }
            };
            lines.push_str(&line);
            lines.push('\n');
        }

        let path = label_path(&self.config.label_folder, pcd_path, self.file_ending());
        write_label_file(&path, &lines)?;
        log::info!("Exported {} labels to {path:?}", items.len());

        Ok(ExportSummary {
            items_exported: items.len(),
            files_created: vec![path],
            warnings: Vec::new(),
        })
    }
}

fn parse_floats(tokens: &[&str]) -> Option<Vec<f64>> {
    tokens.iter().map(|t| t.parse().ok()).collect()
}

fn meta_line(meta: &KittiMeta) -> String {
    [
        meta.object_type.as_str(),
        meta.truncated.as_str(),
        meta.occluded.as_str(),
        meta.alpha.as_str(),
        meta.bbox_2d.as_str(),
        meta.dimensions.as_str(),
        meta.location.as_str(),
        meta.rotation_y.as_str(),
    ]
    .join(" ")
}
