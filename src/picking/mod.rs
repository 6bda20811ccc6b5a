//! Screen-to-world unprojection and pick resolution.
//!
//! Turns 2D cursor positions into 3D world points and rays, using the
//! camera matrices and depth buffer owned by the rendering front end, and
//! resolves picks against the annotation store's items.

pub mod depth;
pub mod kdtree;

use nalgebra::{Matrix4, Point3, Vector4};
use ndarray::Array2;

use crate::geometry::{BoxSide, Ray};
use crate::model::AnnotationItem;

pub use depth::{depth_min, depth_smoothing, DEPTH_WINDOW_SIZE};
pub use kdtree::KdTree;

/// Pick radius for point annotations, in world units.
pub const POINT_HIT_RADIUS: f64 = 0.1;

/// Camera state captured from the render loop.
///
/// `viewport` is `[x, y, width, height]` in device pixels with a
/// bottom-left origin, as OpenGL reports it.
#[derive(Debug, Clone)]
pub struct ViewportCamera {
    pub modelview: Matrix4<f64>,
    pub projection: Matrix4<f64>,
    pub viewport: [i32; 4],
    /// 1 on normal displays, 2 on retina-style displays
    pub device_pixel_ratio: f64,
}

impl ViewportCamera {
    /// Unproject window coordinates (bottom-left origin, depth in `[0, 1]`)
    /// into world space. `None` when the combined camera matrix is singular.
    pub fn unproject(&self, win_x: f64, win_y: f64, win_z: f64) -> Option<Point3<f64>> {
        let inverse = (self.projection * self.modelview).try_inverse()?;

        let [vx, vy, vw, vh] = self.viewport.map(f64::from);
        let ndc = Vector4::new(
            (win_x - vx) / vw * 2.0 - 1.0,
            (win_y - vy) / vh * 2.0 - 1.0,
            win_z * 2.0 - 1.0,
            1.0,
        );

        let world = inverse * ndc;
        if world.w == 0.0 {
            return None;
        }
        Some(Point3::new(
            world.x / world.w,
            world.y / world.w,
            world.z / world.w,
        ))
    }

    /// Project a world point into window coordinates (bottom-left origin,
    /// depth in `[0, 1]`). `None` for points on or behind the camera plane.
    pub fn project(&self, world: &Point3<f64>) -> Option<(f64, f64, f64)> {
        let clip =
            self.projection * self.modelview * Vector4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip / clip.w;

        let [vx, vy, vw, vh] = self.viewport.map(f64::from);
        Some((
            (ndc.x + 1.0) / 2.0 * vw + vx,
            (ndc.y + 1.0) / 2.0 * vh + vy,
            (ndc.z + 1.0) / 2.0,
        ))
    }
}

/// Access to the renderer's depth buffer.
pub trait DepthSampler {
    /// A `size` x `size` window of depth samples centered on the given
    /// window pixel (bottom-left origin, device pixels). Samples falling
    /// outside the viewport are zero-filled.
    fn depth_window(&self, x: i32, y: i32, size: usize) -> Array2<f32>;
}

/// Translate a 2D cursor position into 3D world coordinates.
///
/// `x`/`y` are logical screen coordinates with a top-left origin, as mouse
/// events report them. When `depth` is given it is used directly; otherwise
/// the depth buffer is sampled around the cursor with the policy of
/// [`depth`](crate::picking::depth): center sample, median smoothing at the
/// far plane, minimum depth in `correction` mode.
pub fn world_coords(
    camera: &ViewportCamera,
    sampler: &dyn DepthSampler,
    x: f64,
    y: f64,
    depth: Option<f64>,
    correction: bool,
) -> Option<Point3<f64>> {
    let x = x * camera.device_pixel_ratio;
    let y = y * camera.device_pixel_ratio;
    let real_y = f64::from(camera.viewport[3]) - y; // flip to bottom-left origin

    let z = match depth {
        Some(z) => z,
        None => {
            let depths = sampler.depth_window(x as i32, real_y as i32, DEPTH_WINDOW_SIZE);
            let center = DEPTH_WINDOW_SIZE / 2;
            let z = f64::from(depths[[center, center]]);
            if z == 1.0 {
                depth_smoothing(&depths)
            } else if correction {
                depth_min(&depths)
            } else {
                z
            }
        }
    };

    camera.unproject(x, real_y, z)
}

/// The world-space ray under a cursor position (top-left origin).
pub fn screen_ray(camera: &ViewportCamera, x: f64, y: f64) -> Option<Ray> {
    let x = x * camera.device_pixel_ratio;
    let y = y * camera.device_pixel_ratio;
    let real_y = f64::from(camera.viewport[3]) - y;

    let near = camera.unproject(x, real_y, 0.0)?;
    let far = camera.unproject(x, real_y, 1.0)?;
    Some(Ray::through_points(near, far))
}

/// Index of the nearest item under the cursor, or `None`.
///
/// Boxes are hit through their oriented faces, points within
/// [`POINT_HIT_RADIUS`] of the cursor ray.
pub fn pick_item(
    camera: &ViewportCamera,
    x: f64,
    y: f64,
    items: &[AnnotationItem],
) -> Option<usize> {
    let ray = screen_ray(camera, x, y)?;

    let mut best: Option<(usize, f64)> = None;
    for (index, item) in items.iter().enumerate() {
        let t = match item {
            AnnotationItem::BBox(bbox) => ray
                .intersect_box(&bbox.center(), bbox.dimensions(), bbox.rotations())
                .map(|hit| hit.t),
            AnnotationItem::Point(point) => {
                let (t, dist) = ray.distance_to_point(&point.coords());
                (t > 0.0 && dist < POINT_HIT_RADIUS).then_some(t)
            }
        };
        if let Some(t) = t {
            if best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((index, t));
            }
        }
    }
    best.map(|(index, _)| index)
}

/// Indices of the cloud samples whose projection falls inside the screen
/// rectangle spanned by two cursor positions (top-left origin), in cloud
/// order. Samples behind the camera are never selected.
pub fn pick_points_in_rectangle(
    camera: &ViewportCamera,
    corner_a: (f64, f64),
    corner_b: (f64, f64),
    points: &[Point3<f64>],
) -> Vec<usize> {
    let to_device = |(x, y): (f64, f64)| {
        (
            x * camera.device_pixel_ratio,
            f64::from(camera.viewport[3]) - y * camera.device_pixel_ratio,
        )
    };
    let (ax, ay) = to_device(corner_a);
    let (bx, by) = to_device(corner_b);
    let (min_x, max_x) = (ax.min(bx), ax.max(bx));
    let (min_y, max_y) = (ay.min(by), ay.max(by));

    points
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let (x, y, _) = camera.project(point)?;
            ((min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y)).then_some(index)
        })
        .collect()
}

/// The face of `bbox` the cursor ray enters, for drag-to-resize.
pub fn pick_box_side(
    camera: &ViewportCamera,
    x: f64,
    y: f64,
    bbox: &crate::model::BBox,
) -> Option<BoxSide> {
    let ray = screen_ray(camera, x, y)?;
    ray.intersect_box(&bbox.center(), bbox.dimensions(), bbox.rotations())
        .map(|hit| hit.side)
}
