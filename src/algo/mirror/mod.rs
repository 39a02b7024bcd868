//! Mirror correspondence cache.
//!
//! Symmetric editing needs to know, for each vertex, which vertex sits on the
//! other side of the mirror plane. [`MirrorCache`] computes that table once
//! per editing session and answers vertex, edge and face queries from it.
//!
//! Two matching strategies are available:
//!
//! - **Spatial** (default): reflect each vertex across the axis and take the
//!   nearest vertex from a [`SpatialIndex`] if it lies within
//!   `max_distance`.
//! - **Topological**: delegate to a caller-supplied [`TopologyMatcher`].
//!
//! The table lives either in a caller buffer or in a temporary integer layer
//! on the mesh named [`MIRROR_LAYER_NAME`]; see [`MirrorStore`].
//!
//! # Example
//!
//! ```
//! use meshcorr::prelude::*;
//! use meshcorr::algo::mirror::{MirrorCache, MirrorOptions, MirrorStore};
//! use nalgebra::Point3;
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
//! // Vertices 1 and 3 lie on the mirror plane
//! let options = MirrorOptions::default().with_self(true);
//! let mut cache = MirrorCache::begin(&mut mesh, &options, MirrorStore::Layer).unwrap();
//! assert_eq!(cache.get(&mesh, VertexId::new(0)).unwrap(), Some(VertexId::new(2)));
//! assert_eq!(cache.get_face(&mesh, FaceId::new(0)).unwrap(), Some(FaceId::new(1)));
//! cache.end();
//! ```

mod spatial;
mod topology;

use std::marker::PhantomData;

use nalgebra::Point3;

pub use spatial::{PointTree, SpatialIndex};
pub use topology::TopologyMatcher;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, LayerId, MeshIndex, VertexId};

/// Default match distance for the spatial strategy.
pub const DEFAULT_MIRROR_MAX_DISTANCE: f64 = 0.00002;

/// Name of the vertex layer holding the table when no buffer is supplied.
pub const MIRROR_LAYER_NAME: &str = "__mirror_index";

const NONE: i32 = -1;

/// Mirror plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    /// Mirror across the YZ plane.
    #[default]
    X,
    /// Mirror across the XZ plane.
    Y,
    /// Mirror across the XY plane.
    Z,
}

impl Axis {
    /// Coordinate index of the axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Reflect a point across the plane through the origin normal to this axis.
    #[inline]
    pub fn reflect(self, p: &Point3<f64>) -> Point3<f64> {
        let mut q = *p;
        q[self.index()] = -q[self.index()];
        q
    }
}

/// Options for building a mirror table.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Mirror axis.
    pub axis: Axis,

    /// Allow a vertex to be its own mirror (vertices on the mirror plane).
    pub use_self: bool,

    /// Only compute mirrors for selected vertices.
    pub use_select: bool,

    /// Ignore hidden vertices entirely.
    pub respect_hide: bool,

    /// Match by connectivity through a [`TopologyMatcher`] instead of by position.
    pub use_topology: bool,

    /// Maximum distance between a reflected vertex and its match.
    pub max_distance: f64,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            use_self: false,
            use_select: false,
            respect_hide: false,
            use_topology: false,
            max_distance: DEFAULT_MIRROR_MAX_DISTANCE,
        }
    }
}

impl MirrorOptions {
    /// Set the mirror axis.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Allow vertices on the mirror plane to map to themselves.
    pub fn with_self(mut self, use_self: bool) -> Self {
        self.use_self = use_self;
        self
    }

    /// Restrict matching to selected vertices.
    pub fn with_select(mut self, use_select: bool) -> Self {
        self.use_select = use_select;
        self
    }

    /// Skip hidden vertices.
    pub fn with_respect_hide(mut self, respect_hide: bool) -> Self {
        self.respect_hide = respect_hide;
        self
    }

    /// Match by topology.
    pub fn with_topology(mut self, use_topology: bool) -> Self {
        self.use_topology = use_topology;
        self
    }

    /// Set the spatial match distance.
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }

    fn is_excluded<I: MeshIndex>(&self, mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> bool {
        (self.respect_hide && mesh.is_vertex_hidden(v))
            || (self.use_select && !mesh.is_vertex_selected(v))
    }
}

/// Where a mirror table is kept for the session.
///
/// Slots hold the mirror's vertex index, or `-1` for none.
#[derive(Debug)]
pub enum MirrorStore<'a> {
    /// The mesh's [`MIRROR_LAYER_NAME`] vertex layer, created on first use and
    /// tagged temporary.
    Layer,
    /// A caller buffer with one slot per vertex.
    Buffer(&'a mut [i32]),
}

#[derive(Debug)]
enum Storage<'a> {
    Layer(LayerId),
    Buffer(&'a mut [i32]),
}

impl Storage<'_> {
    fn read<I: MeshIndex>(&self, mesh: &HalfEdgeMesh<I>, v: usize) -> Result<i32> {
        match self {
            Storage::Buffer(buf) => Ok(buf[v]),
            Storage::Layer(id) => Ok(Self::layer(mesh, *id)?[v]),
        }
    }

    fn write<I: MeshIndex>(
        &mut self,
        mesh: &mut HalfEdgeMesh<I>,
        v: usize,
        value: i32,
    ) -> Result<()> {
        match self {
            Storage::Buffer(buf) => buf[v] = value,
            Storage::Layer(id) => {
                Self::layer(mesh, *id)?;
                if let Some(layer) = mesh.int_layer_mut(*id) {
                    layer.values_mut()[v] = value;
                }
            }
        }
        Ok(())
    }

    fn layer<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, id: LayerId) -> Result<&[i32]> {
        match mesh.int_layer(id) {
            Some(layer) if layer.name() == MIRROR_LAYER_NAME => Ok(layer.values()),
            _ => Err(MeshError::InvalidState(format!(
                "vertex layer {:?} was removed during a mirror session",
                MIRROR_LAYER_NAME
            ))),
        }
    }
}

/// An open mirror session over one mesh.
///
/// Created by [`begin`](Self::begin), closed by [`end`](Self::end). Every
/// query checks that the session is still open and that the mesh still has
/// the vertex count the table was built for.
#[derive(Debug)]
pub struct MirrorCache<'a, I: MeshIndex = u32> {
    storage: Storage<'a>,
    axis: Axis,
    num_vertices: usize,
    open: bool,
    _marker: PhantomData<I>,
}

impl<'a, I: MeshIndex> MirrorCache<'a, I> {
    /// Build the mirror table with the default [`PointTree`] spatial index.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] for a negative or non-finite
    ///   `max_distance`, a buffer whose length differs from the vertex count,
    ///   or `use_topology` without a matcher (use [`begin_with`](Self::begin_with))
    pub fn begin(
        mesh: &mut HalfEdgeMesh<I>,
        options: &MirrorOptions,
        store: MirrorStore<'a>,
    ) -> Result<Self> {
        let tree = PointTree::with_capacity(mesh.num_vertices());
        Self::begin_with(mesh, options, store, tree, None)
    }

    /// Build the mirror table with an explicit spatial index and topology matcher.
    ///
    /// `spatial` must be empty; it is filled and balanced here. `matcher` is
    /// required when `options.use_topology` is set and ignored otherwise.
    pub fn begin_with<S: SpatialIndex>(
        mesh: &mut HalfEdgeMesh<I>,
        options: &MirrorOptions,
        store: MirrorStore<'a>,
        spatial: S,
        matcher: Option<&dyn TopologyMatcher<I>>,
    ) -> Result<Self> {
        let n = mesh.num_vertices();

        if !options.max_distance.is_finite() || options.max_distance < 0.0 {
            return Err(MeshError::invalid_param(
                "max_distance",
                options.max_distance,
                "must be finite and non-negative",
            ));
        }
        if let MirrorStore::Buffer(buf) = &store {
            if buf.len() != n {
                return Err(MeshError::invalid_param(
                    "index_buffer.len",
                    buf.len(),
                    "must equal the vertex count",
                ));
            }
        }

        let table = if options.use_topology {
            let matcher = matcher.ok_or_else(|| {
                MeshError::invalid_param("use_topology", true, "requires a topology matcher")
            })?;
            match_by_topology(mesh, options, matcher)?
        } else {
            match_by_position(mesh, options, spatial)
        };

        let pairs = table.iter().filter(|&&m| m != NONE).count();
        log::debug!(
            "mirror cache: {} of {} vertices matched ({})",
            pairs,
            n,
            if options.use_topology { "topology" } else { "spatial" }
        );

        let storage = match store {
            MirrorStore::Buffer(buf) => {
                buf.copy_from_slice(&table);
                Storage::Buffer(buf)
            }
            MirrorStore::Layer => {
                let id = match mesh.find_int_layer(MIRROR_LAYER_NAME) {
                    Some(id) => id,
                    None => mesh.add_int_layer(MIRROR_LAYER_NAME, NONE),
                };
                mesh.set_int_layer_temporary(id, true);
                if let Some(layer) = mesh.int_layer_mut(id) {
                    layer.values_mut().copy_from_slice(&table);
                }
                Storage::Layer(id)
            }
        };

        Ok(Self {
            storage,
            axis: options.axis,
            num_vertices: n,
            open: true,
            _marker: PhantomData,
        })
    }

    /// Whether the session is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The session's mirror axis.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The backing mesh layer, if the table lives on the mesh.
    pub fn layer(&self) -> Option<LayerId> {
        match self.storage {
            Storage::Layer(id) => Some(id),
            Storage::Buffer(_) => None,
        }
    }

    /// Mirror of a vertex, or `None` if it has none.
    pub fn get(&self, mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Result<Option<VertexId<I>>> {
        self.check_session(mesh)?;
        self.check_vertex(v)?;

        let raw = self.storage.read(mesh, v.index())?;
        if raw >= 0 && (raw as usize) < self.num_vertices {
            Ok(Some(VertexId::new(raw as usize)))
        } else {
            Ok(None)
        }
    }

    /// Mirror of the edge containing half-edge `he`.
    ///
    /// Exists only if both endpoints have mirrors and those mirrors share an
    /// edge. The returned half-edge runs from the mirror of `he`'s origin to
    /// the mirror of its destination.
    pub fn get_edge(
        &self,
        mesh: &HalfEdgeMesh<I>,
        he: HalfEdgeId<I>,
    ) -> Result<Option<HalfEdgeId<I>>> {
        self.check_session(mesh)?;
        if he.index() >= mesh.num_halfedges() {
            return Err(MeshError::HalfEdgeOutOfRange {
                halfedge: he.index(),
                count: mesh.num_halfedges(),
            });
        }

        let Some(a) = self.get(mesh, mesh.origin(he))? else {
            return Ok(None);
        };
        let Some(b) = self.get(mesh, mesh.dest(he))? else {
            return Ok(None);
        };
        Ok(mesh.find_halfedge(a, b))
    }

    /// Mirror of a face.
    ///
    /// Exists only if every corner has a mirror and a face with exactly the
    /// mirrored vertex cycle exists.
    pub fn get_face(&self, mesh: &HalfEdgeMesh<I>, f: FaceId<I>) -> Result<Option<FaceId<I>>> {
        self.check_session(mesh)?;
        if f.index() >= mesh.num_faces() {
            return Err(MeshError::FaceOutOfRange {
                face: f.index(),
                count: mesh.num_faces(),
            });
        }

        let mut cycle = Vec::with_capacity(mesh.face_len(f));
        for v in mesh.face_vertices(f) {
            match self.get(mesh, v)? {
                Some(m) => cycle.push(m),
                None => return Ok(None),
            }
        }
        Ok(mesh.find_face(&cycle))
    }

    /// Forget the mirror of one vertex, e.g. after it was deleted or moved.
    pub fn clear(&mut self, mesh: &mut HalfEdgeMesh<I>, v: VertexId<I>) -> Result<()> {
        self.check_session(mesh)?;
        self.check_vertex(v)?;
        self.storage.write(mesh, v.index(), NONE)
    }

    /// Copy positions across the mirror plane.
    ///
    /// Every vertex whose selection state equals `select_from` pushes its
    /// reflected position onto its mirror, if that mirror's selection state
    /// equals `select_to`. Returns the number of vertices moved.
    pub fn apply(
        &self,
        mesh: &mut HalfEdgeMesh<I>,
        select_from: bool,
        select_to: bool,
    ) -> Result<usize> {
        self.check_session(mesh)?;

        let mut moves = Vec::new();
        for v in mesh.vertex_ids() {
            if mesh.is_vertex_selected(v) != select_from {
                continue;
            }
            if let Some(m) = self.get(mesh, v)? {
                if mesh.is_vertex_selected(m) == select_to {
                    moves.push((m, self.axis.reflect(mesh.position(v))));
                }
            }
        }

        for &(m, pos) in &moves {
            mesh.set_position(m, pos);
        }
        Ok(moves.len())
    }

    /// Close the session.
    ///
    /// The table itself is left in place; a later [`begin`](Self::begin) with
    /// [`MirrorStore::Layer`] reuses the same layer.
    pub fn end(&mut self) {
        self.open = false;
    }

    fn check_session(&self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        if !self.open {
            return Err(MeshError::MirrorCacheClosed);
        }
        if mesh.num_vertices() != self.num_vertices {
            return Err(MeshError::StaleMirrorCache {
                built: self.num_vertices,
                current: mesh.num_vertices(),
            });
        }
        Ok(())
    }

    fn check_vertex(&self, v: VertexId<I>) -> Result<()> {
        if v.index() >= self.num_vertices {
            return Err(MeshError::VertexOutOfRange {
                vertex: v.index(),
                count: self.num_vertices,
            });
        }
        Ok(())
    }
}

/// Spatial strategy: nearest reflected neighbor within `max_distance`.
fn match_by_position<I: MeshIndex, S: SpatialIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &MirrorOptions,
    mut spatial: S,
) -> Vec<i32> {
    for v in mesh.vertex_ids() {
        if options.respect_hide && mesh.is_vertex_hidden(v) {
            continue;
        }
        spatial.insert(v.index(), *mesh.position(v));
    }
    spatial.balance();

    let max_sq = options.max_distance * options.max_distance;
    pair_up(mesh, options, |v| {
        let co = options.axis.reflect(mesh.position(v));
        let i_mirr = spatial.find_nearest(&co)?;
        let candidate = VertexId::new(i_mirr);
        ((*mesh.position(candidate) - co).norm_squared() < max_sq).then_some(candidate)
    })
}

/// Topological strategy: take the matcher's table, dropping hidden mirrors.
fn match_by_topology<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &MirrorOptions,
    matcher: &dyn TopologyMatcher<I>,
) -> Result<Vec<i32>> {
    let n = mesh.num_vertices();
    let lookup = matcher.compute(mesh, options.respect_hide);
    if lookup.len() != n {
        return Err(MeshError::InvalidState(format!(
            "topology matcher returned {} entries for {} vertices",
            lookup.len(),
            n
        )));
    }

    Ok(pair_up(mesh, options, |v| {
        let m = lookup[v.index()]?;
        if m.index() >= n {
            log::warn!("topology matcher paired {:?} with out-of-range {:?}", v, m);
            return None;
        }
        if options.respect_hide && mesh.is_vertex_hidden(m) {
            return None;
        }
        Some(m)
    }))
}

/// Fill a table from a per-vertex candidate function.
///
/// Matches are written into both slots. Excluded vertices keep `-1`, and a
/// final pass drops pairs that a later match overwrote on one side only.
fn pair_up<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &MirrorOptions,
    mut candidate: impl FnMut(VertexId<I>) -> Option<VertexId<I>>,
) -> Vec<i32> {
    let n = mesh.num_vertices();
    let mut table = vec![NONE; n];

    for v in mesh.vertex_ids() {
        if options.is_excluded(mesh, v) {
            continue;
        }

        match candidate(v) {
            Some(m) if options.use_self || m != v => {
                table[v.index()] = m.index() as i32;
                if !options.is_excluded(mesh, m) {
                    table[m.index()] = v.index() as i32;
                }
            }
            _ => table[v.index()] = NONE,
        }
    }

    let one_sided: Vec<usize> = (0..n)
        .filter(|&v| {
            let m = table[v];
            m != NONE
                && m as usize != v
                && !options.is_excluded(mesh, VertexId::new(m as usize))
                && table[m as usize] != v as i32
        })
        .collect();
    if !one_sided.is_empty() {
        log::debug!("mirror cache: dropping {} one-sided matches", one_sided.len());
    }
    for v in one_sided {
        table[v] = NONE;
    }

    table
}
