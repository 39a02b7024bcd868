//! Error types for meshcorr.
//!
//! Empty inputs are not errors: builders that find nothing to work on return
//! `None`. The variants below cover malformed meshes and contract violations.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has too few corners or repeats a vertex where that is not allowed.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) is used twice in the same direction")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A vertex id beyond the current vertex count.
    #[error("vertex {vertex} out of range (mesh has {count} vertices)")]
    VertexOutOfRange {
        /// The requested vertex.
        vertex: usize,
        /// Current vertex count.
        count: usize,
    },

    /// A half-edge id beyond the current half-edge count.
    #[error("half-edge {halfedge} out of range (mesh has {count} half-edges)")]
    HalfEdgeOutOfRange {
        /// The requested half-edge.
        halfedge: usize,
        /// Current half-edge count.
        count: usize,
    },

    /// A face id beyond the current face count.
    #[error("face {face} out of range (mesh has {count} faces)")]
    FaceOutOfRange {
        /// The requested face.
        face: usize,
        /// Current face count.
        count: usize,
    },

    /// The mirror cache was queried outside an open session.
    #[error("mirror cache used outside a begin/end session")]
    MirrorCacheClosed,

    /// The mesh changed underneath an open mirror cache.
    #[error("mirror cache is stale: built for {built} vertices, mesh now has {current}")]
    StaleMirrorCache {
        /// Vertex count when the cache was built.
        built: usize,
        /// Vertex count now.
        current: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
