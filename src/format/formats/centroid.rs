//! Centroid JSON format implementation.
//!
//! Stores boxes as center + dimensions + rotations and points as a bare
//! centroid. The presence of the `dimensions` field discriminates the two
//! on import. Rotation angles are written either absolute (degrees) or
//! relative to the x-axis (radians), selected at construction.

use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::config::LabelConfig;
use crate::format::error::FormatError;
use crate::format::traits::{label_path, write_label_file, ExportSummary, LabelFormat};
use crate::geometry::{abs_to_rel, rel_to_abs};
use crate::model::{AnnotationItem, BBox, Point};

#[derive(Debug, Serialize, Deserialize)]
struct CentroidFile {
    folder: String,
    filename: String,
    path: String,
    #[serde(default)]
    annotator: String,
    objects: Vec<CentroidObject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CentroidObject {
    name: String,
    centroid: Xyz,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dimensions: Option<Lwh>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotations: Option<Xyz>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Xyz {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Lwh {
    length: f64,
    width: f64,
    height: f64,
}

/// Centroid JSON format, in absolute or relative rotation mode.
pub struct CentroidFormat {
    config: LabelConfig,
    relative_rotation: bool,
}

impl CentroidFormat {
    /// Absolute rotation mode: angles stored as degrees.
    pub fn absolute(config: LabelConfig) -> Self {
        Self {
            config,
            relative_rotation: false,
        }
    }

    /// Relative rotation mode: angles stored as radians from the x-axis.
    pub fn relative(config: LabelConfig) -> Self {
        Self {
            config,
            relative_rotation: true,
        }
    }

    fn convert_import(&self, angle: f64) -> f64 {
        if self.relative_rotation {
            rel_to_abs(angle)
        } else {
            angle
        }
    }

    fn convert_export(&self, angle: f64) -> f64 {
        if self.relative_rotation {
            abs_to_rel(angle)
        } else {
            angle
        }
    }
}

impl LabelFormat for CentroidFormat {
    fn id(&self) -> &'static str {
        if self.relative_rotation {
            "centroid_rel"
        } else {
            "centroid_abs"
        }
    }

    fn display_name(&self) -> &'static str {
        if self.relative_rotation {
            "Centroid (relative rotations)"
        } else {
            "Centroid (absolute rotations)"
        }
    }

    fn file_ending(&self) -> &'static str {
        ".json"
    }

    fn import(&self, pcd_path: &Path) -> Result<Vec<AnnotationItem>, FormatError> {
        let path = label_path(&self.config.label_folder, pcd_path, self.file_ending());
        if !path.is_file() {
            return Ok(Vec::new());
        }

        let json = std::fs::read_to_string(&path)?;
        let data: CentroidFile = match serde_json::from_str(&json) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Malformed label file {path:?}: {err}");
                return Ok(Vec::new());
            }
        };

        let mut items = Vec::with_capacity(data.objects.len());
        for object in data.objects {
            let centroid = Point3::new(object.centroid.x, object.centroid.y, object.centroid.z);
            match object.dimensions {
                Some(dimensions) => {
                    let mut bbox = BBox::new(
                        centroid,
                        (dimensions.length, dimensions.width, dimensions.height),
                        object.name,
                    );
                    // Degenerate dimensions in the file are clamped up.
                    bbox.set_dimensions(
                        dimensions.length,
                        dimensions.width,
                        dimensions.height,
                        self.config.min_dimension,
                    );
                    let rotations = object.rotations.unwrap_or(Xyz {
                        x: 0.0,
                        y: 0.0,
                        z: 0.0,
                    });
                    bbox.set_rotations(
                        self.convert_import(rotations.x),
                        self.convert_import(rotations.y),
                        self.convert_import(rotations.z),
                    );
                    items.push(AnnotationItem::BBox(bbox));
                }
                None => {
                    items.push(AnnotationItem::Point(Point::new(centroid, object.name)));
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
        let round = |v: f64| self.config.round_dec(v);

        let objects = items
            .iter()
            .map(|item| match item {
                AnnotationItem::BBox(bbox) => {
                    let center = bbox.center();
                    let (length, width, height) = bbox.dimensions();
                    let (rx, ry, rz) = bbox.rotations();
                    CentroidObject {
                        name: bbox.classname().to_string(),
                        centroid: Xyz {
                            x: round(center.x),
                            y: round(center.y),
                            z: round(center.z),
                        },
                        dimensions: Some(Lwh {
                            length: round(length),
                            width: round(width),
                            height: round(height),
                        }),
                        rotations: Some(Xyz {
                            x: round(self.convert_export(rx)),
                            y: round(self.convert_export(ry)),
                            z: round(self.convert_export(rz)),
                        }),
                    }
                }
                AnnotationItem::Point(point) => {
                    let coords = point.coords();
                    CentroidObject {
                        name: point.classname().to_string(),
                        centroid: Xyz {
                            x: round(coords.x),
                            y: round(coords.y),
                            z: round(coords.z),
                        },
                        dimensions: None,
                        rotations: None,
                    }
                }
            })
            .collect();

        let data = CentroidFile {
            folder: parent_name(pcd_path),
            filename: file_name(pcd_path),
            path: pcd_path.display().to_string(),
            annotator: self.config.annotator.clone(),
            objects,
        };

        let path = label_path(&self.config.label_folder, pcd_path, self.file_ending());
        write_label_file(&path, &serde_json::to_string_pretty(&data)?)?;
        log::info!("Exported {} labels to {path:?}", items.len());

        Ok(ExportSummary {
            items_exported: items.len(),
            files_created: vec![path],
            warnings: Vec::new(),
        })
    }
}

pub(crate) fn parent_name(pcd_path: &Path) -> String {
    pcd_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn file_name(pcd_path: &Path) -> String {
    pcd_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}
