//! UV connectivity analysis.
//!
//! A mesh vertex can carry several distinct UV coordinates, one per seam
//! side. This module regroups the face-corners around each vertex into
//! *UV vertices* (corners whose UVs coincide) and, on top of that, splits the
//! UV layout into *islands*.
//!
//! - [`UvVertMap`]: per-vertex UV groups, the lightweight variant.
//! - [`UvElementMap`]: the same grouping with per-corner provenance, a
//!   UV-selection predicate and optional island segmentation.
//!
//! Both builders return `None` when nothing is eligible.

mod element_map;
mod vert_map;

use nalgebra::Point2;

use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex};

pub use element_map::{ElementMapOptions, UvElement, UvElementMap};
pub use vert_map::{UvMapVert, UvVertMap};

/// Two UV coordinates closer than this on both axes are the same UV vertex.
pub const STD_UV_CONNECT_LIMIT: f64 = 0.0001;

/// Island id of an element no island pass reached.
pub const INVALID_ISLAND: usize = usize::MAX;

/// Check whether two UV coordinates belong to the same UV vertex.
///
/// The comparison is strict on each axis, so coordinates exactly
/// [`STD_UV_CONNECT_LIMIT`] apart stay separate.
#[inline]
pub fn uv_connected(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    (a.x - b.x).abs() < STD_UV_CONNECT_LIMIT && (a.y - b.y).abs() < STD_UV_CONNECT_LIMIT
}

/// Signed area of a polygon in UV space (positive when counter-clockwise).
pub fn uv_signed_area(uvs: &[Point2<f64>]) -> f64 {
    let n = uvs.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let a = uvs[i];
        let b = uvs[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Winding class of a face in UV space: `true` for strictly positive area.
///
/// Faces without UVs are classed as `false`.
pub(crate) fn face_uv_winding<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, f: FaceId<I>) -> bool {
    let uvs: Option<Vec<Point2<f64>>> = mesh.face_halfedges(f).map(|c| mesh.corner_uv(c)).collect();
    uvs.is_some_and(|uvs| uv_signed_area(&uvs) > 0.0)
}

/// Walk a singly linked list stored as `next` indices.
#[derive(Debug, Clone)]
pub(crate) struct Chain<'a> {
    next: &'a [Option<usize>],
    current: Option<usize>,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(next: &'a [Option<usize>], head: Option<usize>) -> Self {
        Self { next, current: head }
    }
}

impl Iterator for Chain<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let item = self.current?;
        self.current = self.next[item];
        Some(item)
    }
}

/// Regroup every per-vertex list so connected members are contiguous.
///
/// Each list is consumed from its head: the popped member collects every
/// remaining member that `connects` to it, and the last member moved into
/// that run becomes the run's first entry. Returns per-member flags marking
/// the first entry of each run.
pub(crate) fn split_uv_vertices(
    heads: &mut [Option<usize>],
    next: &mut [Option<usize>],
    mut connects: impl FnMut(usize, usize) -> bool,
) -> Vec<bool> {
    let mut separate = vec![false; next.len()];

    for head in heads.iter_mut() {
        let mut remaining = head.take();
        let mut out: Option<usize> = None;

        while let Some(v) = remaining {
            remaining = next[v];
            next[v] = out;
            out = Some(v);

            let mut last: Option<usize> = None;
            let mut cursor = remaining;
            while let Some(candidate) = cursor {
                let following = next[candidate];
                if connects(v, candidate) {
                    match last {
                        Some(l) => next[l] = following,
                        None => remaining = following,
                    }
                    next[candidate] = out;
                    out = Some(candidate);
                } else {
                    last = Some(candidate);
                }
                cursor = following;
            }

            if let Some(first) = out {
                separate[first] = true;
            }
        }

        *head = out;
    }

    separate
}
