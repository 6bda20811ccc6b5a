//! k-d tree for nearest-neighbor queries against the raw point cloud.
//!
//! Built once per loaded frame and used to snap placed annotation points to
//! real cloud samples.

use std::cmp::Ordering;

use nalgebra::Point3;

struct Node {
    point_index: usize,
    axis: usize,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

/// Spatial index over a point cloud.
pub struct KdTree {
    points: Vec<Point3<f64>>,
    root: Option<Box<Node>>,
}

impl KdTree {
    /// Build the index.
    ///
    /// # Panics
    ///
    /// Panics on an empty cloud; querying an empty cloud is a contract
    /// violation of the caller, not a runtime condition.
    pub fn build(points: Vec<Point3<f64>>) -> Self {
        assert!(
            !points.is_empty(),
            "cannot build a spatial index over an empty point cloud"
        );
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = build_node(&points, &mut indices, 0);
        Self { points, root }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Index of the sample closest to `query` and its distance.
    pub fn nearest(&self, query: &Point3<f64>) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        if let Some(root) = &self.root {
            self.search(root, query, &mut best);
        }
        (best.0, best.1.sqrt())
    }

    fn search(&self, node: &Node, query: &Point3<f64>, best: &mut (usize, f64)) {
        let point = &self.points[node.point_index];
        let dist_sq = (point - query).norm_squared();
        if dist_sq < best.1 {
            *best = (node.point_index, dist_sq);
        }

        let delta = query[node.axis] - point[node.axis];
        let (near, far) = if delta < 0.0 {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };

        if let Some(child) = near {
            self.search(child, query, best);
        }
        // The far subtree can only win if the splitting plane is closer
        // than the best match so far.
        if delta * delta < best.1 {
            if let Some(child) = far {
                self.search(child, query, best);
            }
        }
    }
}

fn build_node(points: &[Point3<f64>], indices: &mut [usize], depth: usize) -> Option<Box<Node>> {
    if indices.is_empty() {
        return None;
    }
    let axis = depth % 3;
    indices.sort_unstable_by(|&a, &b| {
        points[a][axis]
            .partial_cmp(&points[b][axis])
            .unwrap_or(Ordering::Equal)
    });

    let median = indices.len() / 2;
    let point_index = indices[median];
    let (left, rest) = indices.split_at_mut(median);
    let right = &mut rest[1..];

    Some(Box::new(Node {
        point_index,
        axis,
        left: build_node(points, left, depth + 1),
        right: build_node(points, right, depth + 1),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic pseudo-random cloud for brute-force comparison.
    fn test_cloud(n: usize) -> Vec<Point3<f64>> {
        let mut state: u64 = 0x2545F491;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 * 10.0 - 5.0
        };
        (0..n).map(|_| Point3::new(next(), next(), next())).collect()
    }

    fn brute_force_nearest(points: &[Point3<f64>], query: &Point3<f64>) -> usize {
        let mut best = (0, f64::INFINITY);
        for (i, p) in points.iter().enumerate() {
            let d = (p - query).norm_squared();
            if d < best.1 {
                best = (i, d);
            }
        }
        best.0
    }

    #[test]
    fn test_nearest_matches_brute_force() {
        let points = test_cloud(500);
        let tree = KdTree::build(points.clone());

        for query in test_cloud(50) {
            let (index, dist) = tree.nearest(&query);
            let expected = brute_force_nearest(&points, &query);
            assert_eq!(index, expected);
            assert!((dist - (points[expected] - query).norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_exact_sample_query() {
        let points = test_cloud(100);
        let tree = KdTree::build(points.clone());
        let (index, dist) = tree.nearest(&points[37]);
        assert_eq!(index, 37);
        assert_eq!(dist, 0.0);
    }

    #[test]
    #[should_panic(expected = "empty point cloud")]
    fn test_empty_cloud_panics() {
        KdTree::build(Vec::new());
    }
}
