//! Mesh construction utilities.
//!
//! Builds half-edge meshes from face-vertex lists, the layout editors and
//! file formats hand over.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygon faces.
///
/// Each face lists its vertex indices in winding order and needs at least
/// three corners. A face may revisit a vertex (e.g. a folded `[a, b, c, a]`
/// quad); the corresponding self-edge is its own twin.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] if `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for out-of-range indices
/// - [`MeshError::DegenerateFace`] for faces with fewer than three corners
/// - [`MeshError::NonManifoldEdge`] if two corners share a directed edge
///
/// # Example
/// ```
/// use meshcorr::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_corners(), 4);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut num_corners = 0;
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        num_corners += face.len();
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len(), num_corners);

    let vertex_ids: Vec<VertexId<I>> = vertices
        .iter()
        .map(|&pos| mesh.add_vertex(pos))
        .collect();

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);

    // First pass: one half-edge per corner
    for face in faces {
        let face = face.as_ref();
        let n = face.len();
        let base = mesh.num_halfedges();
        let face_id = FaceId::<I>::new(mesh.num_faces());

        mesh.faces.push(Face::new(HalfEdgeId::new(base), n));

        for (k, &v) in face.iter().enumerate() {
            let he_id = HalfEdgeId::<I>::new(base + k);
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v],
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (k + 1) % n),
                prev: HalfEdgeId::new(base + (k + n - 1) % n),
                face: face_id,
            });

            // Overwritten for shared vertices, fixed up for boundaries below
            mesh.vertex_mut(vertex_ids[v]).halfedge = he_id;

            let w = face[(k + 1) % n];
            if edge_map.insert((v, w), he_id).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: v, v1: w });
            }
        }
    }

    // Second pass: link twins, creating boundary half-edges for open edges
    let mut directed: Vec<_> = edge_map.iter().map(|(&k, &he)| (k, he)).collect();
    directed.sort_unstable_by_key(|&(_, he)| he);
    for ((v0, v1), he) in directed {
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            let boundary_he = HalfEdgeId::<I>::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[v1],
                twin: he,
                ..HalfEdge::new()
            });
            mesh.halfedge_mut(he).twin = boundary_he;
        }
    }

    // Third pass: link boundary half-edges into loops
    link_boundary_loops(&mut mesh);

    // Fourth pass: record the fans around each vertex
    assign_vertex_fans(&mut mesh);

    mesh.corners.resize(mesh.num_halfedges());

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// Unlike [`build_from_polygons`], triangles that repeat a vertex are rejected.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    for (fi, face) in faces.iter().enumerate() {
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces.
///
/// Quads that repeat a vertex are rejected.
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    for (fi, face) in faces.iter().enumerate() {
        let repeats = (0..4).any(|i| (i + 1..4).any(|j| face[i] == face[j]));
        if repeats {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }
    build_from_polygons(vertices, faces)
}

/// Link boundary half-edges into loops, one fan at a time.
///
/// The successor of boundary half-edge `x -> y` is found by rotating through
/// the interior corners at `y`, starting from its twin, until the open side
/// of the same fan is reached. Several fans may meet at `y`.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    for &he in &boundary_hes {
        let mut corner = mesh.twin(he);
        let mut next_he = None;
        for _ in 0..mesh.num_halfedges() {
            let candidate = mesh.twin(mesh.prev(corner));
            if mesh.is_boundary_halfedge(candidate) {
                next_he = Some(candidate);
                break;
            }
            corner = candidate;
        }
        if let Some(next_he) = next_he {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Point every vertex at one outgoing half-edge per fan.
///
/// Boundary fans start at their outgoing boundary half-edge so a walk covers
/// the whole fan. Fans beyond the first go to `extra_fans`.
fn assign_vertex_fans<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let mut outgoing: Vec<Vec<HalfEdgeId<I>>> = vec![Vec::new(); mesh.num_vertices()];
    for he in mesh.halfedge_ids() {
        outgoing[mesh.origin(he).index()].push(he);
    }

    let mut visited = vec![false; mesh.num_halfedges()];
    for (vi, mut hes) in outgoing.into_iter().enumerate() {
        hes.sort_by_key(|&he| !mesh.is_boundary_halfedge(he));

        let mut fans = Vec::new();
        for start in hes {
            if visited[start.index()] {
                continue;
            }
            fans.push(start);
            let mut he = start;
            loop {
                visited[he.index()] = true;
                let twin = mesh.twin(he);
                if !twin.is_valid() {
                    break;
                }
                he = mesh.next(twin);
                if !he.is_valid() || he == start || visited[he.index()] {
                    break;
                }
            }
        }

        if let Some((&first, rest)) = fans.split_first() {
            mesh.vertex_mut(VertexId::new(vi)).halfedge = first;
            if !rest.is_empty() {
                mesh.extra_fans.insert(vi, rest.to_vec());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_quad() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_mixed_polygons() {
        // Quad with a triangle and a pentagon hanging off it
        let mut vertices = single_quad();
        vertices.push(Point3::new(2.0, 0.5, 0.0));
        vertices.push(Point3::new(0.5, 2.0, 0.0));
        vertices.push(Point3::new(1.5, 1.5, 0.0));
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![1, 4, 2], vec![3, 2, 4, 6, 5]];
        let mesh: HalfEdgeMesh<u32> = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_corners(), 12);
        assert_eq!(mesh.face_len(FaceId::new(2)), 5);
        assert!(mesh.is_valid());

        let f2: Vec<usize> = mesh.face_vertices(FaceId::new(2)).map(|v| v.index()).collect();
        assert_eq!(f2, vec![3, 2, 4, 6, 5]);
    }

    #[test]
    fn test_folded_face_with_repeated_vertex() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let faces: Vec<[usize; 4]> = vec![[0, 1, 2, 0]];
        let mesh: HalfEdgeMesh<u32> = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_corners(), 4);
        assert!(mesh.is_valid());

        let corners_at_0 = mesh
            .face_halfedges(FaceId::new(0))
            .filter(|&he| mesh.origin(he) == VertexId::new(0))
            .count();
        assert_eq!(corners_at_0, 2);
    }

    #[test]
    fn test_empty_faces() {
        let faces: Vec<[usize; 3]> = Vec::new();
        let result: Result<HalfEdgeMesh<u32>> = build_from_polygons(&single_quad(), &faces);
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &[[0, 1, 2]]);
        assert!(matches!(
            result,
            Err(MeshError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_faces() {
        let vertices = single_quad();

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &[[0, 0, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result: Result<HalfEdgeMesh<u32>> = build_from_quads(&vertices, &[[0, 1, 0, 3]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let faces: Vec<Vec<usize>> = vec![vec![0, 1]];
        let result: Result<HalfEdgeMesh<u32>> = build_from_polygons(&vertices, &faces);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_duplicate_directed_edge() {
        let vertices = single_quad();
        // Both triangles walk 0 -> 1
        let result: Result<HalfEdgeMesh<u32>> =
            build_from_triangles(&vertices, &[[0, 1, 2], [0, 1, 3]]);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { v0: 0, v1: 1 })));
    }

    #[test]
    fn test_two_quads_share_edge() {
        let mut vertices = single_quad();
        vertices.push(Point3::new(2.0, 0.0, 0.0));
        vertices.push(Point3::new(2.0, 1.0, 0.0));
        let mesh: HalfEdgeMesh<u32> =
            build_from_quads(&vertices, &[[0, 1, 2, 3], [1, 4, 5, 2]]).unwrap();

        // 8 interior half-edges + 6 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 14);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_bowtie_keeps_both_fans() {
        // Two triangles touching only at vertex 0
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh<u32> =
            build_from_triangles(&vertices, &[[0, 2, 1], [0, 3, 4]]).unwrap();
        assert!(mesh.is_valid());

        let v0 = VertexId::new(0);
        // Two corners and two outgoing boundary half-edges
        assert_eq!(mesh.vertex_halfedges(v0).count(), 4);
        for w in 1..5 {
            let he = mesh.find_halfedge(v0, VertexId::new(w)).unwrap();
            assert_eq!(mesh.dest(he), VertexId::new(w));
        }

        // Each boundary loop stays within its own triangle
        for he in mesh.halfedge_ids().filter(|&he| mesh.is_boundary_halfedge(he)) {
            let mut loop_len = 1;
            let mut cur = mesh.next(he);
            while cur != he {
                assert!(mesh.is_boundary_halfedge(cur));
                cur = mesh.next(cur);
                loop_len += 1;
                assert!(loop_len <= 3);
            }
            assert_eq!(loop_len, 3);
        }
    }
}
