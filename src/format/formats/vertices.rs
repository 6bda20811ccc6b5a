//! Vertex JSON format implementation.
//!
//! Boxes are stored as their eight corner vertices; center, dimensions and
//! rotations are recovered on import from designated corner pairs. Points
//! carry raw coordinates plus the index of the cloud sample they were
//! snapped to.
//!
//! Exporting additionally writes a keypoint artifact holding only the
//! point-type items, as consumed by the MPI horse keypoint pipeline.

use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LabelConfig;
use crate::format::error::FormatError;
use crate::format::traits::{label_path, write_label_file, ExportSummary, LabelFormat};
use crate::geometry::vertices_to_rotations;
use crate::model::{AnnotationItem, BBox, Point};

use super::centroid::{file_name, parent_name};

#[derive(Debug, Serialize, Deserialize)]
struct VerticesFile {
    folder: String,
    filename: String,
    path: String,
    #[serde(default)]
    annotator: String,
    objects: Vec<VerticesObject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VerticesObject {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertices: Option<Vec<[f64; 3]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point: Option<PointCoords>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    point_idx: Option<usize>,
}

/// Point coordinates appear as `[x, y, z]` or as `{"x": .., "y": .., "z": ..}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PointCoords {
    Array([f64; 3]),
    Object { x: f64, y: f64, z: f64 },
}

impl PointCoords {
    fn to_point(&self) -> Point3<f64> {
        match *self {
            PointCoords::Array([x, y, z]) => Point3::new(x, y, z),
            PointCoords::Object { x, y, z } => Point3::new(x, y, z),
        }
    }
}

/// Vertex JSON format.
pub struct VerticesFormat {
    config: LabelConfig,
}

impl VerticesFormat {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    /// Write the keypoint artifact: point-type items only, boxes skipped.
    fn export_keypoints(
        &self,
        items: &[AnnotationItem],
        pcd_path: &Path,
    ) -> Result<std::path::PathBuf, FormatError> {
        let round = |v: f64| self.config.round_dec(v);

        let keypoints: Vec<serde_json::Value> = items
            .iter()
            .filter_map(|item| match item {
                AnnotationItem::BBox(_) => None,
                AnnotationItem::Point(point) => {
                    let coords = point.coords();
                    Some(json!({
                        point.classname(): [round(coords.x), round(coords.y), round(coords.z)],
                        "PCD_point_index": point.point_id,
                    }))
                }
            })
            .collect();

        let data = json!({
            "metadata": {
                "folder": parent_name(pcd_path),
                "filename": file_name(pcd_path),
                "path": pcd_path.display().to_string(),
                "annotator": self.config.annotator,
            },
            "keypoints": keypoints,
        });

        let stem = pcd_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let path = self
            .config
            .label_folder
            .join(format!("{stem}_mpi_horse_ext{}", self.file_ending()));
        write_label_file(&path, &serde_json::to_string_pretty(&data)?)?;
        Ok(path)
    }
}

impl LabelFormat for VerticesFormat {
    fn id(&self) -> &'static str {
        "vertices"
    }

    fn display_name(&self) -> &'static str {
        "Vertices"
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
        let data: VerticesFile = match serde_json::from_str(&json) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Malformed label file {path:?}: {err}");
                return Ok(Vec::new());
            }
        };

        let mut items = Vec::with_capacity(data.objects.len());
        for object in data.objects {
            if let Some(raw) = object.vertices {
                if raw.len() != 8 {
                    log::warn!(
                        "Skipping box '{}' with {} vertices (expected 8)",
                        object.name,
                        raw.len()
                    );
                    continue;
                }
                let vertices: [Point3<f64>; 8] =
                    std::array::from_fn(|i| Point3::new(raw[i][0], raw[i][1], raw[i][2]));

                // The centroid is the midpoint of two opposite corners;
                // dimensions are the edge lengths at vertex 0.
                let centroid = nalgebra::center(&vertices[2], &vertices[4]);
                let length = (vertices[0] - vertices[3]).norm();
                let width = (vertices[0] - vertices[1]).norm();
                let height = (vertices[0] - vertices[4]).norm();
                let (rx, ry, rz) = vertices_to_rotations(&vertices);

                let mut bbox = BBox::new(centroid, (length, width, height), object.name);
                bbox.set_dimensions(length, width, height, self.config.min_dimension);
                bbox.set_rotations(rx, ry, rz);
                items.push(AnnotationItem::BBox(bbox));
            } else if let Some(coords) = object.point {
                let mut point = Point::new(coords.to_point(), object.name);
                point.point_id = object.point_idx;
                items.push(AnnotationItem::Point(point));
            } else {
                log::warn!("Skipping object '{}' without geometry", object.name);
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
                AnnotationItem::BBox(bbox) => VerticesObject {
                    name: bbox.classname().to_string(),
                    vertices: Some(
                        bbox.vertices()
                            .iter()
                            .map(|v| [round(v.x), round(v.y), round(v.z)])
                            .collect(),
                    ),
                    point: None,
                    point_idx: None,
                },
                AnnotationItem::Point(point) => {
                    let coords = point.coords();
                    VerticesObject {
                        name: point.classname().to_string(),
                        vertices: None,
                        point: Some(PointCoords::Array([
                            round(coords.x),
                            round(coords.y),
                            round(coords.z),
                        ])),
                        point_idx: point.point_id,
                    }
                }
            })
            .collect();

        let data = VerticesFile {
            folder: parent_name(pcd_path),
            filename: file_name(pcd_path),
            path: pcd_path.display().to_string(),
            annotator: self.config.annotator.clone(),
            objects,
        };

        let keypoints_path = self.export_keypoints(items, pcd_path)?;

        let path = label_path(&self.config.label_folder, pcd_path, self.file_ending());
        write_label_file(&path, &serde_json::to_string_pretty(&data)?)?;
        log::info!("Exported {} labels to {path:?}", items.len());

        Ok(ExportSummary {
            items_exported: items.len(),
            files_created: vec![path, keypoints_path],
            warnings: Vec::new(),
        })
    }
}
