//! UV element map and island segmentation.
//!
//! [`UvElementMap`] groups face-corners into UV vertices like
//! [`UvVertMap`](super::UvVertMap), but additionally
//!
//! - restricts the map to corners passing a UV-selection predicate,
//! - never connects a selected corner with an unselected one,
//! - optionally floods the UV layout into islands and lays the elements out
//!   island by island.
//!
//! # Example
//!
//! ```
//! use meshcorr::prelude::*;
//! use meshcorr::algo::uv::{ElementMapOptions, UvElementMap};
//! use nalgebra::{Point2, Point3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces: Vec<[usize; 3]> = vec![[0, 1, 2]];
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! mesh.set_face_uvs(
//!     FaceId::new(0),
//!     &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
//! );
//!
//! let options = ElementMapOptions::default().with_islands(true);
//! let map = UvElementMap::build(&mesh, &options).unwrap();
//! assert_eq!(map.num_islands(), 1);
//! assert_eq!(map.island_elements(0).len(), 3);
//! ```

use crate::algo::progress::Progress;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::{face_uv_winding, split_uv_vertices, uv_connected, Chain, INVALID_ISLAND};

/// Options for [`UvElementMap`] construction.
#[derive(Debug, Clone, Default)]
pub struct ElementMapOptions {
    /// Only include corners of selected faces.
    pub face_selected: bool,

    /// Only include corners passing the UV-selection predicate.
    pub uv_selected: bool,

    /// Keep corners of faces with opposite UV winding apart.
    pub use_winding: bool,

    /// Segment the map into islands.
    pub do_islands: bool,
}

impl ElementMapOptions {
    /// Restrict to selected faces.
    pub fn with_face_selected(mut self, face_selected: bool) -> Self {
        self.face_selected = face_selected;
        self
    }

    /// Restrict to UV-selected corners.
    pub fn with_uv_selected(mut self, uv_selected: bool) -> Self {
        self.uv_selected = uv_selected;
        self
    }

    /// Separate corners by UV winding.
    pub fn with_winding(mut self, use_winding: bool) -> Self {
        self.use_winding = use_winding;
        self
    }

    /// Compute islands.
    pub fn with_islands(mut self, do_islands: bool) -> Self {
        self.do_islands = do_islands;
        self
    }
}

/// One face-corner in a [`UvElementMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvElement<I: MeshIndex = u32> {
    /// The corner itself.
    pub corner: HalfEdgeId<I>,
    /// Face owning the corner.
    pub face: FaceId<I>,
    /// Mesh vertex of the corner.
    pub vertex: VertexId<I>,
    /// Position of the corner within its face.
    pub corner_index: usize,
    /// First element of a UV vertex when walking the vertex's list.
    pub separate: bool,
    /// Island id, or [`INVALID_ISLAND`].
    pub island: usize,
}

/// Face-corners grouped into UV vertices, optionally segmented into islands.
#[derive(Debug, Clone)]
pub struct UvElementMap<I: MeshIndex = u32> {
    elements: Vec<UvElement<I>>,
    next: Vec<Option<usize>>,
    heads: Vec<Option<usize>>,
    /// Start of each island in `elements`; empty without islands.
    island_starts: Vec<usize>,
}

impl<I: MeshIndex> UvElementMap<I> {
    /// Build the map, using the mesh's per-corner UV selection as predicate.
    ///
    /// Returns `None` if the mesh has no UV layer or no corner is eligible.
    pub fn build(mesh: &HalfEdgeMesh<I>, options: &ElementMapOptions) -> Option<Self> {
        Self::build_with_progress(mesh, options, &Progress::none())
    }

    /// [`build`](Self::build) with progress reporting during the island pass.
    pub fn build_with_progress(
        mesh: &HalfEdgeMesh<I>,
        options: &ElementMapOptions,
        progress: &Progress,
    ) -> Option<Self> {
        Self::build_with_predicate_with_progress(
            mesh,
            options,
            |corner| mesh.is_corner_uv_selected(corner),
            progress,
        )
    }

    /// Build the map with a caller-supplied UV-selection predicate.
    pub fn build_with_predicate<P>(
        mesh: &HalfEdgeMesh<I>,
        options: &ElementMapOptions,
        uv_select: P,
    ) -> Option<Self>
    where
        P: Fn(HalfEdgeId<I>) -> bool,
    {
        Self::build_with_predicate_with_progress(mesh, options, uv_select, &Progress::none())
    }

    /// [`build_with_predicate`](Self::build_with_predicate) with progress reporting.
    pub fn build_with_predicate_with_progress<P>(
        mesh: &HalfEdgeMesh<I>,
        options: &ElementMapOptions,
        uv_select: P,
        progress: &Progress,
    ) -> Option<Self>
    where
        P: Fn(HalfEdgeId<I>) -> bool,
    {
        if !mesh.has_uv_layer() {
            return None;
        }

        let face_ok = |f: FaceId<I>| !options.face_selected || mesh.is_face_selected(f);
        let corner_ok = |c: HalfEdgeId<I>| !options.uv_selected || uv_select(c);

        let total = mesh
            .face_ids()
            .filter(|&f| face_ok(f))
            .flat_map(|f| mesh.face_halfedges(f))
            .filter(|&c| corner_ok(c))
            .count();
        if total == 0 {
            log::debug!("UV element map: no eligible corners");
            return None;
        }

        let mut elements = Vec::with_capacity(total);
        let mut next = Vec::with_capacity(total);
        let mut heads = vec![None; mesh.num_vertices()];
        let mut winding = vec![false; if options.use_winding { mesh.num_faces() } else { 0 }];

        for f in mesh.face_ids().filter(|&f| face_ok(f)) {
            for (corner_index, corner) in mesh.face_halfedges(f).enumerate() {
                if !corner_ok(corner) {
                    continue;
                }
                let vertex = mesh.origin(corner);
                next.push(heads[vertex.index()]);
                heads[vertex.index()] = Some(elements.len());
                elements.push(UvElement {
                    corner,
                    face: f,
                    vertex,
                    corner_index,
                    separate: false,
                    island: INVALID_ISLAND,
                });
            }
            if options.use_winding {
                winding[f.index()] = face_uv_winding(mesh, f);
            }
        }

        let selected: Vec<bool> = elements.iter().map(|e| uv_select(e.corner)).collect();
        let separate = split_uv_vertices(&mut heads, &mut next, |a, b| {
            let (ea, eb) = (&elements[a], &elements[b]);
            if selected[a] != selected[b] {
                return false;
            }
            let same_uv = match (mesh.corner_uv(ea.corner), mesh.corner_uv(eb.corner)) {
                (Some(ua), Some(ub)) => uv_connected(&ua, &ub),
                _ => false,
            };
            same_uv
                && (!options.use_winding || winding[ea.face.index()] == winding[eb.face.index()])
        });
        for (element, sep) in elements.iter_mut().zip(separate) {
            element.separate = sep;
        }

        let mut map = Self {
            elements,
            next,
            heads,
            island_starts: Vec::new(),
        };

        if options.do_islands {
            let order = map.assign_islands(mesh, progress);
            map.compact_by_island(&order);
            log::debug!(
                "UV element map: {} elements in {} islands",
                map.len(),
                map.num_islands()
            );
        } else {
            log::debug!("UV element map: {} elements", map.len());
        }

        Some(map)
    }

    // ==================== Islands ====================

    /// Flood islands face by face.
    ///
    /// Popping a face claims the element of each of its eligible corners and
    /// pushes every unvisited face reachable through that element's UV vertex.
    /// Returns the elements in the order they were claimed.
    fn assign_islands(&mut self, mesh: &HalfEdgeMesh<I>, progress: &Progress) -> Vec<usize> {
        let total = self.elements.len();
        let mut face_island = vec![INVALID_ISLAND; mesh.num_faces()];
        let mut stack: Vec<FaceId<I>> = Vec::new();
        let mut order = Vec::with_capacity(total);
        let mut island = 0;

        for seed in 0..total {
            if self.elements[seed].island != INVALID_ISLAND {
                continue;
            }

            let seed_face = self.elements[seed].face;
            face_island[seed_face.index()] = island;
            stack.push(seed_face);

            while let Some(f) = stack.pop() {
                for corner in mesh.face_halfedges(f) {
                    let Some((element, group_start)) =
                        self.locate(mesh.origin(corner), corner)
                    else {
                        continue;
                    };
                    self.elements[element].island = island;
                    order.push(element);

                    for member in self.uv_vertex_from(group_start) {
                        let face = self.elements[member].face;
                        if face_island[face.index()] == INVALID_ISLAND {
                            face_island[face.index()] = island;
                            stack.push(face);
                        }
                    }
                }
            }

            island += 1;
            progress.report(order.len(), total, "Assigning UV islands");
        }

        debug_assert_eq!(order.len(), total, "every element belongs to exactly one island");
        order
    }

    /// Lay elements out in claim order, so each island is a contiguous run,
    /// and remap every link into the new layout.
    fn compact_by_island(&mut self, order: &[usize]) {
        let total = self.elements.len();
        let mut remap = vec![0; total];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }

        let elements: Vec<UvElement<I>> = order.iter().map(|&old| self.elements[old]).collect();
        let next: Vec<Option<usize>> = order
            .iter()
            .map(|&old| self.next[old].map(|n| remap[n]))
            .collect();
        for head in self.heads.iter_mut() {
            *head = head.map(|h| remap[h]);
        }

        self.island_starts.clear();
        for (i, element) in elements.iter().enumerate() {
            if self.island_starts.len() <= element.island {
                self.island_starts.push(i);
            }
        }

        self.elements = elements;
        self.next = next;
    }

    // ==================== Accessors ====================

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the map holds no elements. Never true for a built map.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get an element by index.
    #[inline]
    pub fn element(&self, id: usize) -> &UvElement<I> {
        &self.elements[id]
    }

    /// All elements, island by island when islands were computed.
    #[inline]
    pub fn elements(&self) -> &[UvElement<I>] {
        &self.elements
    }

    /// Element indices of a mesh vertex, grouped UV vertex by UV vertex.
    pub fn vertex_elements(&self, v: VertexId<I>) -> impl Iterator<Item = usize> + '_ {
        let head = self.heads.get(v.index()).copied().flatten();
        Chain::new(&self.next, head)
    }

    /// Element of a corner, or `None` if the corner is not in the map.
    pub fn element_of(&self, mesh: &HalfEdgeMesh<I>, corner: HalfEdgeId<I>) -> Option<usize> {
        if corner.index() >= mesh.num_halfedges() || mesh.is_boundary_halfedge(corner) {
            return None;
        }
        self.locate(mesh.origin(corner), corner).map(|(element, _)| element)
    }

    /// All elements sharing a UV vertex with `id`, `id` included.
    pub fn uv_vertex_members(&self, id: usize) -> Vec<usize> {
        let vertex = self.elements[id].vertex;
        let mut group_start = None;
        for e in self.vertex_elements(vertex) {
            if self.elements[e].separate {
                group_start = Some(e);
            }
            if e == id {
                break;
            }
        }
        group_start
            .map(|start| self.uv_vertex_from(start).collect())
            .unwrap_or_default()
    }

    /// Whether islands were computed.
    #[inline]
    pub fn has_islands(&self) -> bool {
        !self.island_starts.is_empty()
    }

    /// Number of islands; zero without islands.
    #[inline]
    pub fn num_islands(&self) -> usize {
        self.island_starts.len()
    }

    /// Island of an element, or `None` if it was never assigned.
    pub fn island_of(&self, id: usize) -> Option<usize> {
        let island = self.elements[id].island;
        (island != INVALID_ISLAND).then_some(island)
    }

    /// Start index of each island in [`elements`](Self::elements).
    #[inline]
    pub fn island_offsets(&self) -> &[usize] {
        &self.island_starts
    }

    /// The elements of one island, as a contiguous slice.
    pub fn island_elements(&self, island: usize) -> &[UvElement<I>] {
        let Some(&start) = self.island_starts.get(island) else {
            return &[];
        };
        let end = self
            .island_starts
            .get(island + 1)
            .copied()
            .unwrap_or(self.elements.len());
        &self.elements[start..end]
    }

    // ==================== Helpers ====================

    /// Find the element of `corner` in `vertex`'s list, with the first
    /// element of its UV vertex.
    fn locate(&self, vertex: VertexId<I>, corner: HalfEdgeId<I>) -> Option<(usize, usize)> {
        let mut group_start = None;
        for e in self.vertex_elements(vertex) {
            if self.elements[e].separate {
                group_start = Some(e);
            }
            if self.elements[e].corner == corner {
                return Some((e, group_start.unwrap_or(e)));
            }
        }
        None
    }

    /// Elements of the UV vertex opened by `start`.
    fn uv_vertex_from(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        Chain::new(&self.next, Some(start))
            .enumerate()
            .take_while(move |&(i, e)| i == 0 || !self.elements[e].separate)
            .map(|(_, e)| e)
    }
}
