//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes as used by interactive editing tools.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, **next**/**prev** around its face,
//!   **origin vertex**, and **incident face**
//! - Each vertex stores one outgoing half-edge per fan; vertices where
//!   several fans meet keep the extra fan starts on the side
//! - Each face stores one half-edge on its boundary and its corner count
//!
//! # Face-corners
//!
//! Every interior half-edge is a face-corner ("loop"): it belongs to exactly
//! one face and references exactly one vertex (its origin). Per-corner data
//! such as UV coordinates is indexed by [`HalfEdgeId`].
//!
//! # Boundary Handling
//!
//! Boundary half-edges have an invalid face ID and are never corners. Their
//! twins are interior half-edges.

use std::collections::HashMap;

use nalgebra::Point3;

use super::attributes::{CornerData, VertexLayers};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,

    /// Editor selection state.
    pub selected: bool,

    /// Editor visibility state.
    pub hidden: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, unselected and visible vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            selected: false,
            hidden: false,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge.
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A polygon face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The first corner of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Number of corners.
    pub len: usize,

    /// Editor selection state.
    pub selected: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new unselected face starting at the given corner.
    pub fn new(halfedge: HalfEdgeId<I>, len: usize) -> Self {
        Self {
            halfedge,
            len,
            selected: false,
        }
    }
}

/// A half-edge mesh for editable polygon meshes.
///
/// Stores connectivity, editor flags, per-corner attributes and named
/// per-vertex integer layers.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,

    /// Per-corner attributes, indexed by half-edge.
    pub(crate) corners: CornerData,

    /// Named per-vertex integer layers.
    pub(crate) vertex_layers: VertexLayers,

    /// Further fan starts of vertices where several fans meet.
    pub(crate) extra_fans: HashMap<usize, Vec<HalfEdgeId<I>>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            corners: CornerData::default(),
            vertex_layers: VertexLayers::default(),
            extra_fans: HashMap::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize, num_corners: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            // Corners plus roughly one boundary half-edge per open edge.
            halfedges: Vec::with_capacity(num_corners + num_corners / 2),
            faces: Vec::with_capacity(num_faces),
            corners: CornerData::default(),
            vertex_layers: VertexLayers::default(),
            extra_fans: HashMap::new(),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of face-corners (sum of all face sizes).
    pub fn num_corners(&self) -> usize {
        self.faces.iter().map(|f| f.len).sum()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Editor Flags ====================

    /// Check whether a vertex is selected.
    #[inline]
    pub fn is_vertex_selected(&self, v: VertexId<I>) -> bool {
        self.vertex(v).selected
    }

    /// Set the selection state of a vertex.
    #[inline]
    pub fn set_vertex_selected(&mut self, v: VertexId<I>, selected: bool) {
        self.vertex_mut(v).selected = selected;
    }

    /// Check whether a vertex is hidden.
    #[inline]
    pub fn is_vertex_hidden(&self, v: VertexId<I>) -> bool {
        self.vertex(v).hidden
    }

    /// Set the visibility state of a vertex.
    #[inline]
    pub fn set_vertex_hidden(&mut self, v: VertexId<I>, hidden: bool) {
        self.vertex_mut(v).hidden = hidden;
    }

    /// Check whether a face is selected.
    #[inline]
    pub fn is_face_selected(&self, f: FaceId<I>) -> bool {
        self.face(f).selected
    }

    /// Set the selection state of a face.
    #[inline]
    pub fn set_face_selected(&mut self, f: FaceId<I>, selected: bool) {
        self.face_mut(f).selected = selected;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        if !self.vertex(v).halfedge.is_valid() {
            return true; // Isolated vertex
        }
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he))
    }

    /// Number of corners of a face.
    #[inline]
    pub fn face_len(&self, f: FaceId<I>) -> usize {
        self.face(f).len
    }

    /// Position of a corner within its face, counting from the face's first corner.
    pub fn corner_index(&self, corner: HalfEdgeId<I>) -> usize {
        let f = self.face_of(corner);
        debug_assert!(f.is_valid(), "{:?} is a boundary half-edge", corner);
        self.face_halfedges(f)
            .position(|he| he == corner)
            .unwrap_or(0)
    }

    /// Find a half-edge going from `a` to `b`, if the edge exists.
    pub fn find_halfedge(&self, a: VertexId<I>, b: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(a).find(|&he| self.dest(he) == b)
    }

    /// Find the face whose corners visit exactly `cycle`.
    ///
    /// The cycle may start at any corner of the face and may be walked in
    /// either direction.
    pub fn find_face(&self, cycle: &[VertexId<I>]) -> Option<FaceId<I>> {
        let first = *cycle.first()?;
        let n = cycle.len();

        for he in self.vertex_halfedges(first) {
            let f = self.face_of(he);
            if !f.is_valid() || self.face_len(f) != n {
                continue;
            }

            let mut forward = he;
            let mut backward = he;
            let mut fwd_ok = true;
            let mut bwd_ok = true;
            for &expected in &cycle[1..] {
                forward = self.next(forward);
                backward = self.prev(backward);
                fwd_ok &= self.origin(forward) == expected;
                bwd_ok &= self.origin(backward) == expected;
                if !fwd_ok && !bwd_ok {
                    break;
                }
            }
            if fwd_ok || bwd_ok {
                return Some(f);
            }
        }
        None
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(|i| VertexId::new(i))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(|i| HalfEdgeId::new(i))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(|i| FaceId::new(i))
    }

    /// Iterate over outgoing half-edges around a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over the corners of a face in cyclic order.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the vertices of a face in cyclic order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    ///
    /// Every named vertex layer grows by one slot holding the layer's fill value.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        self.vertex_layers.push_vertex();
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() && self.halfedge(v.halfedge).origin.index() != i {
                return false;
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if he.twin.is_valid() && self.halfedge(he.twin).twin.index() != i {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev.index() != i {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next.index() != i {
                return false;
            }
        }

        for f in self.face_ids() {
            let face = self.face(f);
            if !face.halfedge.is_valid() || face.len < 3 {
                return false;
            }
            if self.face_halfedges(f).count() != face.len {
                return false;
            }
        }

        self.corners.len_matches(self.halfedges.len())
            && self.vertex_layers.len_matches(self.vertices.len())
    }
}

/// Iterator over outgoing half-edges around a vertex.
///
/// Walks each fan of the vertex in turn.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    pending: &'a [HalfEdgeId<I>],
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        let pending = mesh
            .extra_fans
            .get(&v.index())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Self {
            mesh,
            pending,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            let (&start, rest) = self.pending.split_first()?;
            self.pending = rest;
            self.start = start;
            self.current = start;
            self.done = false;
        }

        let result = self.current;

        // twin(he) ends at the vertex, so the half-edge after it leaves the vertex again.
        let twin = self.mesh.twin(self.current);
        self.current = if twin.is_valid() {
            self.mesh.next(twin)
        } else {
            HalfEdgeId::invalid()
        };

        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the corners of a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
