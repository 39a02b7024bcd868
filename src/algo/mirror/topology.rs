//! Topology-only mirror matching seam.
//!
//! Meshes that are symmetric in connectivity but not in space (posed,
//! sculpted, or shifted off the mirror plane) cannot be matched by distance.
//! A [`TopologyMatcher`] pairs vertices from graph shape alone; the mirror
//! cache consumes its table verbatim.

use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Produces a vertex-to-vertex mirror table from connectivity alone.
pub trait TopologyMatcher<I: MeshIndex = u32> {
    /// One entry per vertex: its mirror, or `None`.
    ///
    /// With `respect_hide`, hidden vertices should neither be matched nor be
    /// used as matches. The cache filters hidden mirrors again regardless.
    fn compute(&self, mesh: &HalfEdgeMesh<I>, respect_hide: bool) -> Vec<Option<VertexId<I>>>;
}

impl<I, F> TopologyMatcher<I> for F
where
    I: MeshIndex,
    F: Fn(&HalfEdgeMesh<I>, bool) -> Vec<Option<VertexId<I>>>,
{
    fn compute(&self, mesh: &HalfEdgeMesh<I>, respect_hide: bool) -> Vec<Option<VertexId<I>>> {
        self(mesh, respect_hide)
    }
}
