//! # meshcorr
//!
//! Correspondence queries for editable polygon meshes.
//!
//! meshcorr answers two questions editors ask while a mesh is being edited:
//!
//! - **Which vertex mirrors this one?** [`algo::mirror::MirrorCache`] builds a
//!   symmetric vertex table across an axis, by position or by topology, and
//!   derives edge and face mirrors from it.
//! - **How is the UV layout connected?** [`algo::uv::UvVertMap`] and
//!   [`algo::uv::UvElementMap`] group face-corners into UV vertices and flood
//!   them into UV islands.
//!
//! Both work on [`mesh::HalfEdgeMesh`], a half-edge structure over polygon
//! faces whose interior half-edges double as face-corners.
//!
//! ## Quick Start
//!
//! ```
//! use meshcorr::prelude::*;
//! use nalgebra::{Point2, Point3};
//!
//! let vertices = vec![
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces: Vec<[usize; 3]> = vec![[0, 1, 3], [1, 2, 3]];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//!
//! // Mirror across X
//! let options = MirrorOptions::default();
//! let mut cache = MirrorCache::begin(&mut mesh, &options, MirrorStore::Layer).unwrap();
//! assert_eq!(cache.get(&mesh, VertexId::new(0)).unwrap(), Some(VertexId::new(2)));
//! cache.end();
//!
//! // UV islands
//! for f in mesh.face_ids().collect::<Vec<_>>() {
//!     let uvs: Vec<Point2<f64>> = mesh
//!         .face_vertices(f)
//!         .map(|v| Point2::new(mesh.position(v).x, mesh.position(v).y))
//!         .collect();
//!     mesh.set_face_uvs(f, &uvs);
//! }
//! let options = ElementMapOptions::default().with_islands(true);
//! let map = UvElementMap::build(&mesh, &options).unwrap();
//! assert_eq!(map.num_islands(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshcorr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::mirror::{Axis, MirrorCache, MirrorOptions, MirrorStore};
    pub use crate::algo::uv::{ElementMapOptions, UvElementMap, UvVertMap};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, FaceId, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Point2, Point3};

    /// A closed cube with a six-face cross UV unwrap; symmetric across X.
    fn unwrapped_cube() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [1, 2, 6, 5], // right
            [2, 3, 7, 6], // back
            [3, 0, 4, 7], // left
        ];
        let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();

        // Every face its own island
        for f in mesh.face_ids().collect::<Vec<_>>() {
            let offset = f.index() as f64 * 2.0;
            let uvs = [
                Point2::new(offset, 0.0),
                Point2::new(offset + 1.0, 0.0),
                Point2::new(offset + 1.0, 1.0),
                Point2::new(offset, 1.0),
            ];
            mesh.set_face_uvs(f, &uvs);
        }
        mesh
    }

    #[test]
    fn test_cube() {
        let mut mesh = unwrapped_cube();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_halfedges(), 24);
        assert!(mesh.is_valid());
        assert!(mesh.uv_check());

        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }

        let options = MirrorOptions::default();
        let cache = MirrorCache::begin(&mut mesh, &options, MirrorStore::Layer).unwrap();
        for v in mesh.vertex_ids() {
            let m = cache.get(&mesh, v).unwrap().unwrap();
            assert_eq!(mesh.position(m).x, -mesh.position(v).x);
        }
        // Left and right faces mirror each other
        assert_eq!(cache.get_face(&mesh, FaceId::new(3)).unwrap(), Some(FaceId::new(5)));

        let options = ElementMapOptions::default().with_islands(true);
        let map = UvElementMap::build(&mesh, &options).unwrap();
        assert_eq!(map.len(), 24);
        assert_eq!(map.num_islands(), 6);

        let vmap = UvVertMap::build(&mesh, false, false).unwrap();
        assert_eq!(vmap.num_uv_vertices(), 24);
    }
}
