//! Nearest-neighbor lookup over 3D points.
//!
//! The mirror cache only needs one query: "which inserted point is closest to
//! this reflected position". [`SpatialIndex`] is that contract; [`PointTree`]
//! is the R-tree backed implementation used by default.

use nalgebra::Point3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Nearest-neighbor index over 3D points, keyed by caller-chosen indices.
pub trait SpatialIndex {
    /// Add a point. Call [`balance`](Self::balance) before querying.
    fn insert(&mut self, index: usize, point: Point3<f64>);

    /// Finalize the structure after the last insertion.
    fn balance(&mut self);

    /// Index of the point closest to `point`, or `None` if the index is empty.
    fn find_nearest(&self, point: &Point3<f64>) -> Option<usize>;
}

/// A point tagged with the caller's index.
#[derive(Debug, Clone)]
struct IndexedPoint {
    index: usize,
    position: [f64; 3],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// An R-tree over inserted points.
///
/// Insertions are buffered; [`balance`](SpatialIndex::balance) bulk-loads
/// them into the tree.
#[derive(Debug, Clone)]
pub struct PointTree {
    points: Vec<IndexedPoint>,
    tree: RTree<IndexedPoint>,
    balanced: bool,
}

impl Default for PointTree {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            tree: RTree::new(),
            balanced: true,
        }
    }
}

impl PointTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of inserted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no point was inserted.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl SpatialIndex for PointTree {
    fn insert(&mut self, index: usize, point: Point3<f64>) {
        self.points.push(IndexedPoint {
            index,
            position: [point.x, point.y, point.z],
        });
        self.balanced = false;
    }

    fn balance(&mut self) {
        self.tree = RTree::bulk_load(self.points.clone());
        self.balanced = true;
    }

    fn find_nearest(&self, point: &Point3<f64>) -> Option<usize> {
        debug_assert!(self.balanced, "PointTree queried before balance()");
        self.tree
            .nearest_neighbor(&[point.x, point.y, point.z])
            .map(|p| p.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point3<f64>], query: &Point3<f64>) -> usize {
        let mut best = 0;
        for (i, p) in points.iter().enumerate() {
            if (*p - *query).norm_squared() < (points[best] - *query).norm_squared() {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = PointTree::new();
        tree.balance();
        assert!(tree.is_empty());
        assert_eq!(tree.find_nearest(&Point3::origin()), None);
    }

    #[test]
    fn test_single_point() {
        let mut tree = PointTree::new();
        tree.insert(7, Point3::new(1.0, 2.0, 3.0));
        tree.balance();
        assert_eq!(tree.find_nearest(&Point3::new(-5.0, 0.0, 0.0)), Some(7));
    }

    #[test]
    fn test_matches_brute_force() {
        // Deterministic scattered points
        let points: Vec<Point3<f64>> = (0..200)
            .map(|i| {
                let t = i as f64;
                Point3::new(
                    (t * 0.37).sin() * 3.0,
                    (t * 0.91).cos() * 2.0,
                    (t * 0.13).sin() * (t * 0.07).cos(),
                )
            })
            .collect();

        let mut tree = PointTree::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            tree.insert(i, *p);
        }
        tree.balance();
        assert_eq!(tree.len(), 200);

        for k in 0..50 {
            let t = k as f64;
            let query = Point3::new((t * 0.5).cos() * 3.5, (t * 0.3).sin() * 2.5, t * 0.01);
            let found = tree.find_nearest(&query).unwrap();
            let expected = brute_force(&points, &query);
            let d_found = (points[found] - query).norm_squared();
            let d_expected = (points[expected] - query).norm_squared();
            assert!(
                (d_found - d_expected).abs() < 1e-12,
                "query {:?}: got {} expected {}",
                query,
                found,
                expected
            );
        }
    }

    #[test]
    fn test_keys_are_caller_indices() {
        let mut tree = PointTree::new();
        tree.insert(10, Point3::new(0.0, 0.0, 0.0));
        tree.insert(20, Point3::new(1.0, 0.0, 0.0));
        tree.insert(30, Point3::new(2.0, 0.0, 0.0));
        tree.balance();

        assert_eq!(tree.find_nearest(&Point3::new(1.9, 0.1, 0.0)), Some(30));
        assert_eq!(tree.find_nearest(&Point3::new(0.6, 0.0, 0.0)), Some(20));
    }

    #[test]
    fn test_balance_again_keeps_earlier_points() {
        let mut tree = PointTree::new();
        tree.insert(1, Point3::new(-1.0, 0.0, 0.0));
        tree.balance();
        tree.insert(2, Point3::new(1.0, 0.0, 0.0));
        tree.balance();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find_nearest(&Point3::new(-0.9, 0.0, 0.0)), Some(1));
        assert_eq!(tree.find_nearest(&Point3::new(0.9, 0.0, 0.0)), Some(2));
    }
}
