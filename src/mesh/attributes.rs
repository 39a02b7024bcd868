//! Per-element attribute storage.
//!
//! Two kinds of custom data live next to the connectivity:
//!
//! - **Corner data**: an optional UV layer and a UV-selection flag per
//!   face-corner, indexed by half-edge (boundary half-edges carry unused slots).
//! - **Vertex layers**: named integer layers, one value per vertex. Tools use
//!   them as scratch slots that travel with the mesh, e.g. a mirror table.

use nalgebra::Point2;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Per-corner attributes.
#[derive(Debug, Clone, Default)]
pub(crate) struct CornerData {
    uv: Option<Vec<Point2<f64>>>,
    uv_selected: Vec<bool>,
}

impl CornerData {
    pub(crate) fn resize(&mut self, num_halfedges: usize) {
        if let Some(uv) = &mut self.uv {
            uv.resize(num_halfedges, Point2::origin());
        }
        self.uv_selected.resize(num_halfedges, false);
    }

    pub(crate) fn len_matches(&self, num_halfedges: usize) -> bool {
        self.uv_selected.len() == num_halfedges
            && self.uv.as_ref().map_or(true, |uv| uv.len() == num_halfedges)
    }
}

/// Handle to a named per-vertex integer layer.
///
/// Handles stay valid until a layer is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

/// A named per-vertex integer layer.
#[derive(Debug, Clone)]
pub struct IntLayer {
    name: String,
    values: Vec<i32>,
    fill: i32,
    temporary: bool,
}

impl IntLayer {
    /// Layer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value given to vertices added after the layer was created.
    pub fn fill(&self) -> i32 {
        self.fill
    }

    /// Whether the layer is scratch data that should not outlive the session.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// All values, indexed by vertex.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Mutable values, indexed by vertex.
    pub fn values_mut(&mut self) -> &mut [i32] {
        &mut self.values
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VertexLayers {
    layers: Vec<IntLayer>,
}

impl VertexLayers {
    pub(crate) fn push_vertex(&mut self) {
        for layer in &mut self.layers {
            layer.values.push(layer.fill);
        }
    }

    pub(crate) fn len_matches(&self, num_vertices: usize) -> bool {
        self.layers.iter().all(|l| l.values.len() == num_vertices)
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    // ==================== UV Layer ====================

    /// Check whether the mesh carries UV coordinates.
    #[inline]
    pub fn has_uv_layer(&self) -> bool {
        self.corners.uv.is_some()
    }

    /// Add a UV layer with every corner at the origin. No-op if one exists.
    pub fn add_uv_layer(&mut self) {
        if self.corners.uv.is_none() {
            self.corners.uv = Some(vec![Point2::origin(); self.halfedges.len()]);
        }
    }

    /// Check whether UV tools can run on this mesh at all.
    pub fn uv_check(&self) -> bool {
        self.num_faces() > 0 && self.has_uv_layer()
    }

    /// UV coordinate of a corner, or `None` without a UV layer.
    #[inline]
    pub fn corner_uv(&self, corner: HalfEdgeId<I>) -> Option<Point2<f64>> {
        self.corners.uv.as_ref().map(|uv| uv[corner.index()])
    }

    /// Set the UV coordinate of a corner, creating the UV layer if needed.
    pub fn set_corner_uv(&mut self, corner: HalfEdgeId<I>, uv: Point2<f64>) {
        debug_assert!(!self.is_boundary_halfedge(corner), "{:?} is not a corner", corner);
        self.add_uv_layer();
        if let Some(layer) = &mut self.corners.uv {
            layer[corner.index()] = uv;
        }
    }

    /// Assign UVs to the corners of a face, in corner order.
    ///
    /// Extra coordinates are ignored; missing ones leave corners untouched.
    pub fn set_face_uvs(&mut self, f: FaceId<I>, uvs: &[Point2<f64>]) {
        let corners: Vec<_> = self.face_halfedges(f).collect();
        for (corner, &uv) in corners.into_iter().zip(uvs) {
            self.set_corner_uv(corner, uv);
        }
    }

    /// Check whether a corner is selected in UV space.
    #[inline]
    pub fn is_corner_uv_selected(&self, corner: HalfEdgeId<I>) -> bool {
        self.corners.uv_selected[corner.index()]
    }

    /// Set the UV-space selection of a corner.
    #[inline]
    pub fn set_corner_uv_selected(&mut self, corner: HalfEdgeId<I>, selected: bool) {
        self.corners.uv_selected[corner.index()] = selected;
    }

    // ==================== Vertex Layers ====================

    /// Look up a vertex layer by name.
    pub fn find_int_layer(&self, name: &str) -> Option<LayerId> {
        self.vertex_layers
            .layers
            .iter()
            .position(|l| l.name == name)
            .map(LayerId)
    }

    /// Add a named vertex layer with every slot set to `fill`.
    pub fn add_int_layer(&mut self, name: &str, fill: i32) -> LayerId {
        let id = LayerId(self.vertex_layers.layers.len());
        self.vertex_layers.layers.push(IntLayer {
            name: name.to_owned(),
            values: vec![fill; self.vertices.len()],
            fill,
            temporary: false,
        });
        id
    }

    /// Get a vertex layer, or `None` if the handle no longer refers to one.
    #[inline]
    pub fn int_layer(&self, id: LayerId) -> Option<&IntLayer> {
        self.vertex_layers.layers.get(id.0)
    }

    /// Get a mutable vertex layer.
    #[inline]
    pub fn int_layer_mut(&mut self, id: LayerId) -> Option<&mut IntLayer> {
        self.vertex_layers.layers.get_mut(id.0)
    }

    /// Tag a layer as temporary.
    pub fn set_int_layer_temporary(&mut self, id: LayerId, temporary: bool) {
        if let Some(layer) = self.int_layer_mut(id) {
            layer.temporary = temporary;
        }
    }

    /// Drop every temporary layer. Invalidates all [`LayerId`] handles.
    pub fn remove_temporary_layers(&mut self) -> usize {
        let before = self.vertex_layers.layers.len();
        self.vertex_layers.layers.retain(|l| !l.temporary);
        before - self.vertex_layers.layers.len()
    }

    /// Number of vertex layers.
    pub fn num_int_layers(&self) -> usize {
        self.vertex_layers.layers.len()
    }

    /// Read one vertex slot of a layer.
    #[inline]
    pub fn int_value(&self, id: LayerId, v: VertexId<I>) -> Option<i32> {
        self.int_layer(id).map(|l| l.values[v.index()])
    }
}
