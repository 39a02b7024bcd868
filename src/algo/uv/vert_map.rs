//! Per-vertex UV groups.

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::{face_uv_winding, split_uv_vertices, uv_connected, Chain};

/// One face-corner in a [`UvVertMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UvMapVert<I: MeshIndex = u32> {
    /// The corner itself.
    pub corner: HalfEdgeId<I>,
    /// Face owning the corner.
    pub face: FaceId<I>,
    /// Position of the corner within its face.
    pub corner_index: usize,
    /// First member of a UV vertex when walking the vertex's list.
    pub separate: bool,
}

/// Face-corners grouped by mesh vertex, then by coinciding UV.
///
/// The members of one mesh vertex form a list; a member with
/// [`separate`](UvMapVert::separate) set starts a new UV vertex, and every
/// member up to the next such marker belongs to it.
#[derive(Debug, Clone)]
pub struct UvVertMap<I: MeshIndex = u32> {
    members: Vec<UvMapVert<I>>,
    next: Vec<Option<usize>>,
    heads: Vec<Option<usize>>,
}

impl<I: MeshIndex> UvVertMap<I> {
    /// Build the map over all faces, or only selected faces with `use_select`.
    ///
    /// With `use_winding`, corners only share a UV vertex when their faces
    /// have the same winding in UV space.
    ///
    /// Returns `None` if the mesh has no UV layer or no face is eligible.
    pub fn build(mesh: &HalfEdgeMesh<I>, use_select: bool, use_winding: bool) -> Option<Self> {
        if !mesh.has_uv_layer() {
            return None;
        }

        let eligible = |f: FaceId<I>| !use_select || mesh.is_face_selected(f);
        let total: usize = mesh
            .face_ids()
            .filter(|&f| eligible(f))
            .map(|f| mesh.face_len(f))
            .sum();
        if total == 0 {
            return None;
        }

        let mut members = Vec::with_capacity(total);
        let mut next = Vec::with_capacity(total);
        let mut heads = vec![None; mesh.num_vertices()];
        let mut winding = vec![false; if use_winding { mesh.num_faces() } else { 0 }];

        for f in mesh.face_ids().filter(|&f| eligible(f)) {
            for (corner_index, corner) in mesh.face_halfedges(f).enumerate() {
                let v = mesh.origin(corner).index();
                next.push(heads[v]);
                heads[v] = Some(members.len());
                members.push(UvMapVert {
                    corner,
                    face: f,
                    corner_index,
                    separate: false,
                });
            }
            if use_winding {
                winding[f.index()] = face_uv_winding(mesh, f);
            }
        }

        let separate = split_uv_vertices(&mut heads, &mut next, |a, b| {
            let (ma, mb) = (&members[a], &members[b]);
            let same_uv = match (mesh.corner_uv(ma.corner), mesh.corner_uv(mb.corner)) {
                (Some(ua), Some(ub)) => uv_connected(&ua, &ub),
                _ => false,
            };
            same_uv && (!use_winding || winding[ma.face.index()] == winding[mb.face.index()])
        });
        for (member, sep) in members.iter_mut().zip(separate) {
            member.separate = sep;
        }

        let map = Self {
            members,
            next,
            heads,
        };
        log::debug!(
            "UV vertex map: {} corners, {} UV vertices",
            map.len(),
            map.num_uv_vertices()
        );
        Some(map)
    }

    /// Total number of corners in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the map holds no corners. Never true for a built map.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of mesh vertices the map was built for.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.heads.len()
    }

    /// Total number of UV vertices over all mesh vertices.
    pub fn num_uv_vertices(&self) -> usize {
        self.members.iter().filter(|m| m.separate).count()
    }

    /// Iterate over the corners of a mesh vertex, grouped UV vertex by UV vertex.
    pub fn at_vertex(&self, v: VertexId<I>) -> impl Iterator<Item = &UvMapVert<I>> + '_ {
        let head = self.heads.get(v.index()).copied().flatten();
        Chain::new(&self.next, head).map(move |i| &self.members[i])
    }

    /// The UV vertices of a mesh vertex, each as its list of corners.
    pub fn uv_vertices(&self, v: VertexId<I>) -> Vec<Vec<&UvMapVert<I>>> {
        let mut groups: Vec<Vec<&UvMapVert<I>>> = Vec::new();
        for member in self.at_vertex(v) {
            match groups.last_mut() {
                Some(group) if !member.separate => group.push(member),
                _ => groups.push(vec![member]),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::{Point2, Point3};

    fn folded_quad() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 0]];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
        mesh.set_face_uvs(
            FaceId::new(0),
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 0.0),
            ],
        );
        mesh
    }

    /// Two triangles sharing edge 1-2. The second is mirrored in UV space
    /// so the shared corners coincide but the windings differ.
    fn opposite_windings() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let faces: Vec<[usize; 3]> = vec![[0, 1, 2], [2, 1, 3]];
        let mut mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
        // Counter-clockwise in UV
        mesh.set_face_uvs(
            FaceId::new(0),
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        );
        // Folded back over the first triangle: clockwise in UV
        mesh.set_face_uvs(
            FaceId::new(1),
            &[Point2::new(0.0, 1.0), Point2::new(1.0, 0.0), Point2::new(0.2, 0.2)],
        );
        mesh
    }

    #[test]
    fn test_folded_quad_merges_repeated_vertex() {
        let mesh = folded_quad();
        let map = UvVertMap::build(&mesh, false, false).unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map.num_uv_vertices(), 3);

        let groups = map.uv_vertices(VertexId::new(0));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
        let mut indices: Vec<usize> = groups[0].iter().map(|m| m.corner_index).collect();
        indices.sort();
        assert_eq!(indices, vec![0, 3]);

        assert_eq!(map.uv_vertices(VertexId::new(1)).len(), 1);
        assert_eq!(map.uv_vertices(VertexId::new(2)).len(), 1);
    }

    #[test]
    fn test_folded_quad_split_when_uvs_differ() {
        let mut mesh = folded_quad();
        let last = mesh.face_halfedges(FaceId::new(0)).last().unwrap();
        mesh.set_corner_uv(last, Point2::new(0.5, 0.5));

        let map = UvVertMap::build(&mesh, false, false).unwrap();
        assert_eq!(map.uv_vertices(VertexId::new(0)).len(), 2);
        assert_eq!(map.num_uv_vertices(), 4);
    }

    #[test]
    fn test_winding_prevents_merge() {
        let mesh = opposite_windings();

        let merged = UvVertMap::build(&mesh, false, false).unwrap();
        assert_eq!(merged.uv_vertices(VertexId::new(1)).len(), 1);
        assert_eq!(merged.uv_vertices(VertexId::new(2)).len(), 1);

        let split = UvVertMap::build(&mesh, false, true).unwrap();
        assert_eq!(split.uv_vertices(VertexId::new(1)).len(), 2);
        assert_eq!(split.uv_vertices(VertexId::new(2)).len(), 2);
    }

    #[test]
    fn test_groups_carry_provenance() {
        let mesh = opposite_windings();
        let map = UvVertMap::build(&mesh, false, false).unwrap();

        for v in mesh.vertex_ids() {
            let mut first = true;
            for member in map.at_vertex(v) {
                assert_eq!(mesh.origin(member.corner), v);
                assert_eq!(mesh.face_of(member.corner), member.face);
                assert_eq!(mesh.corner_index(member.corner), member.corner_index);
                if first {
                    assert!(member.separate, "list of {:?} must open a UV vertex", v);
                    first = false;
                }
            }
        }
    }

    #[test]
    fn test_use_select_filters_faces() {
        let mut mesh = opposite_windings();
        assert!(UvVertMap::build(&mesh, true, false).is_none());

        mesh.set_face_selected(FaceId::new(1), true);
        let map = UvVertMap::build(&mesh, true, false).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.at_vertex(VertexId::new(0)).count(), 0);
        assert!(map.at_vertex(VertexId::new(3)).all(|m| m.face == FaceId::new(1)));
    }

    #[test]
    fn test_no_uv_layer() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces: Vec<[usize; 3]> = vec![[0, 1, 2]];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
        assert!(UvVertMap::build(&mesh, false, false).is_none());
    }
}
