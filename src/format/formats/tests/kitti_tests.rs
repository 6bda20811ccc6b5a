//! Tests for the KITTI text format.

use std::io::Write;
use std::path::Path;

use nalgebra::Point3;

use super::{assert_close, test_config};
use crate::format::formats::KittiFormat;
use crate::format::traits::LabelFormat;
use crate::model::{AnnotationItem, BBox, Point};

const LABEL_KITTI: &str =
    "cart 0 0 0 0 0 0 0 0.75 0.55 0.15 -0.409794 -0.012696 0.076757 0.436332";

fn write_label(dir: &Path, contents: &str) {
    std::fs::write(dir.join("test.txt"), contents).unwrap();
}

fn write_calib(dir: &Path, stem: &str) {
    let mut file = std::fs::File::create(dir.join(format!("{stem}.txt"))).unwrap();
    writeln!(file, "R0_rect: 1 0 0 0 1 0 0 0 1").unwrap();
    // Standard velodyne-to-camera axis swap with a small offset.
    writeln!(file, "Tr_velo_to_cam: 0 -1 0 0.02 0 0 -1 -0.06 1 0 0 -0.27").unwrap();
}

#[test]
fn test_import_untransformed() {
    let dir = tempfile::tempdir().unwrap();
    write_label(dir.path(), LABEL_KITTI);

    let format = KittiFormat::untransformed(test_config(dir.path()));
    let items = format.import(Path::new("test.ply")).unwrap();
    assert_eq!(items.len(), 1);

    let bbox = items[0].as_bbox().expect("expected a bounding box");
    assert_eq!(bbox.classname(), "cart");
    assert_eq!(bbox.center(), Point3::new(-0.409794, -0.012696, 0.076757));
    // KITTI stores dimensions as height, width, length.
    assert_eq!(bbox.dimensions(), (0.15, 0.55, 0.75));

    let (rx, ry, rz) = bbox.rotations();
    assert_eq!(rx, 0.0);
    assert_eq!(ry, 0.0);
    assert_close(rz, 25.0, 1e-4);
}

#[test]
fn test_import_point_line_untransformed() {
    let dir = tempfile::tempdir().unwrap();
    write_label(dir.path(), "Point tree 1.23 -0.45 2.34");

    let format = KittiFormat::untransformed(test_config(dir.path()));
    let items = format.import(Path::new("test.ply")).unwrap();

    let point = items[0].as_point().expect("expected a point");
    assert_eq!(point.classname(), "tree");
    assert_eq!(point.coords(), Point3::new(1.23, -0.45, 2.34));
}

#[test]
fn test_malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_label(
        dir.path(),
        &format!("short line\n{LABEL_KITTI}\nPoint lonely\n"),
    );

    let format = KittiFormat::untransformed(test_config(dir.path()));
    let items = format.import(Path::new("test.ply")).unwrap();
    assert_eq!(items.len(), 1);
}

#[test]
fn test_dont_care_lines_are_written_back_unmodified() {
    let dir = tempfile::tempdir().unwrap();
    let line = "DontCare -1 -1 -10 503.89 169.71 590.61 190.13 -1 -1 -1 -1000 -1000 -1000 -10";
    write_label(dir.path(), line);

    let format = KittiFormat::untransformed(test_config(dir.path()));
    let items = format.import(Path::new("test.ply")).unwrap();
    format.export(&items, Path::new("test.ply")).unwrap();

    let written = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
    assert_eq!(written.trim_end(), line);
}

#[test]
fn test_metadata_preserved_for_unchanged_class() {
    let dir = tempfile::tempdir().unwrap();
    let line = "cart 0.5 2 1.57 10 20 30 40 0.75 0.55 0.15 -0.4 0.0 0.1 0.436332";
    write_label(dir.path(), line);

    let format = KittiFormat::untransformed(test_config(dir.path()).with_export_precision(6));
    let items = format.import(Path::new("test.ply")).unwrap();
    format.export(&items, Path::new("test.ply")).unwrap();

    let written = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
    let tokens: Vec<&str> = written.split_whitespace().collect();
    // Non-geometric fields pass through verbatim.
    assert_eq!(&tokens[1..8], &["0.5", "2", "1.57", "10", "20", "30", "40"]);
}

#[test]
fn test_transformed_requires_calibration() {
    let dir = tempfile::tempdir().unwrap();
    write_label(dir.path(), LABEL_KITTI);

    let config = test_config(dir.path()).with_calib_folder(dir.path().join("calib"));
    let format = KittiFormat::transformed(config);

    let err = format.import(Path::new("test.ply")).unwrap_err();
    assert!(err.is_calibration_not_found());

    let items = vec![AnnotationItem::from(BBox::new(
        Point3::origin(),
        (1.0, 1.0, 1.0),
        "cart",
    ))];
    let err = format.export(&items, Path::new("test.ply")).unwrap_err();
    assert!(err.is_calibration_not_found());
}

#[test]
fn test_degenerate_dimensions_clamped_on_import() {
    let dir = tempfile::tempdir().unwrap();
    write_label(dir.path(), "cart 0 0 0 0 0 0 0 0.005 0 -1 1.0 2.0 3.0 0");

    let format = KittiFormat::untransformed(test_config(dir.path()));
    let items = format.import(Path::new("test.ply")).unwrap();

    let bbox = items[0].as_bbox().unwrap();
    assert_eq!(bbox.dimensions(), (0.01, 0.01, 0.01));
}

#[test]
fn test_dont_care_export_still_requires_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_calib_folder(dir.path().join("calib"));
    let format = KittiFormat::transformed(config);

    let mut bbox = BBox::new(Point3::origin(), (1.0, 1.0, 1.0), "DontCare");
    bbox.kitti_meta = Some(Default::default());

    let err = format
        .export(&[AnnotationItem::from(bbox)], Path::new("test.ply"))
        .unwrap_err();
    assert!(err.is_calibration_not_found());
}

#[test]
fn test_transformed_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let calib_dir = dir.path().join("calib");
    std::fs::create_dir_all(&calib_dir).unwrap();
    write_calib(&calib_dir, "test");

    let config = test_config(dir.path())
        .with_calib_folder(&calib_dir)
        .with_export_precision(6);
    let format = KittiFormat::transformed(config);

    let bbox = BBox::new(Point3::new(1.25, -0.5, 0.3), (0.8, 0.5, 0.2), "cart")
        .with_rotations(0.0, 0.0, 30.0);
    let point = Point::new(Point3::new(2.0, 1.0, -0.25), "tree");
    let items = vec![AnnotationItem::from(bbox), AnnotationItem::from(point)];

    format.export(&items, Path::new("test.ply")).unwrap();
    let imported = format.import(Path::new("test.ply")).unwrap();
    assert_eq!(imported.len(), 2);

    let loaded_box = imported[0].as_bbox().unwrap();
    assert!((loaded_box.center() - Point3::new(1.25, -0.5, 0.3)).norm() < 1e-4);
    let (length, width, height) = loaded_box.dimensions();
    assert_close(length, 0.8, 1e-6);
    assert_close(width, 0.5, 1e-6);
    assert_close(height, 0.2, 1e-6);
    assert_close(loaded_box.z_rotation(), 30.0, 1e-3);

    let loaded_point = imported[1].as_point().unwrap();
    assert!((loaded_point.coords() - Point3::new(2.0, 1.0, -0.25)).norm() < 1e-4);
}

#[test]
fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let format = KittiFormat::untransformed(test_config(dir.path()));
    assert!(format.import(Path::new("nope.ply")).unwrap().is_empty());
}
