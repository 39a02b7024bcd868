//! Core mesh data structures.
//!
//! The editable mesh is a half-edge structure over polygon faces. Its
//! interior half-edges are the face-corners that carry per-corner data
//! (UV coordinates, UV selection). Vertices carry editor flags (selected,
//! hidden) and any number of named integer layers.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge, and so a face-corner
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`]),
//! allowing `u16`, `u32`, or `u64` depending on mesh size.
//!
//! # Construction
//!
//! ```
//! use meshcorr::mesh::{HalfEdgeMesh, build_from_polygons};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces: Vec<[usize; 3]> = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! ```

mod attributes;
mod builder;
mod halfedge;
mod index;

pub use attributes::{IntLayer, LayerId};
pub use builder::{build_from_polygons, build_from_quads, build_from_triangles};
pub use halfedge::{
    Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
