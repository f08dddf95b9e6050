//! Mesh construction utilities.
//!
//! This module provides functions for building half-edge meshes from
//! face-vertex lists as commonly found in mesh file formats, and for
//! converting a mesh back to a face-vertex list.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Result, SpruceError};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// The input must describe an oriented manifold surface: a directed edge may
/// appear in at most one face. Violations are rejected with
/// [`SpruceError::NonManifoldEdge`].
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Returns
/// A half-edge mesh, or an error if the input is invalid.
///
/// # Example
/// ```
/// use spruce::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(SpruceError::EmptyMesh);
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(SpruceError::InvalidVertexIndex {
                    face: fi,
                    vertex: vi,
                });
            }
        }
        // Check for degenerate faces
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(SpruceError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    // Add vertices
    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&pos| mesh.add_vertex(pos)).collect();

    // Map from directed edge (v0, v1) to half-edge ID
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    // First pass: create all half-edges and faces
    for face in faces {
        let v0 = face[0];
        let v1 = face[1];
        let v2 = face[2];

        // Create three half-edges for this face
        let he0 = HalfEdgeId::<I>::new(mesh.halfedges.len());
        let he1 = HalfEdgeId::<I>::new(mesh.halfedges.len() + 1);
        let he2 = HalfEdgeId::<I>::new(mesh.halfedges.len() + 2);

        // Add half-edges to mesh storage
        for _ in 0..3 {
            push_halfedge(&mut mesh);
        }

        // Create face
        let face_id = FaceId::<I>::new(mesh.faces.len());
        mesh.faces.push(Face::new(he0));
        mesh.removed_faces.push(false);

        // Set up half-edge connectivity within the face
        for (he, (origin, (next, prev))) in [
            (he0, (v0, (he1, he2))),
            (he1, (v1, (he2, he0))),
            (he2, (v2, (he0, he1))),
        ] {
            let h = mesh.halfedge_mut(he);
            h.origin = vertex_ids[origin];
            h.next = next;
            h.prev = prev;
            h.face = face_id;
        }

        // Set vertex half-edges (will be overwritten for shared vertices)
        mesh.vertex_mut(vertex_ids[v0]).halfedge = he0;
        mesh.vertex_mut(vertex_ids[v1]).halfedge = he1;
        mesh.vertex_mut(vertex_ids[v2]).halfedge = he2;

        // Record edges for twin linking; a repeated directed edge means the
        // surface is non-manifold or inconsistently wound.
        for (a, b, he) in [(v0, v1, he0), (v1, v2, he1), (v2, v0, he2)] {
            if edge_map.insert((a, b), he).is_some() {
                return Err(SpruceError::NonManifoldEdge { v0: a, v1: b });
            }
        }
    }

    // Second pass: link twins
    for (&(v0, v1), &he) in &edge_map {
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedge_mut(he).twin = twin;
        } else {
            // Boundary edge - create border half-edge
            let border_he = HalfEdgeId::<I>::new(mesh.halfedges.len());
            push_halfedge(&mut mesh);

            mesh.halfedge_mut(he).twin = border_he;
            {
                let bhe = mesh.halfedge_mut(border_he);
                bhe.origin = vertex_ids[v1];
                bhe.twin = he;
                // Face is invalid (border)
            }
        }
    }

    // Third pass: link border half-edges into loops
    link_border_loops(&mut mesh);

    // Fourth pass: ensure boundary vertices point to border half-edges
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

fn push_halfedge<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    mesh.halfedges.push(HalfEdge::new());
    mesh.removed_halfedges.push(false);
}

/// Link border half-edges into proper loops.
fn link_border_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    // Find all border half-edges
    let border_hes: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    // Group by origin vertex for quick lookup
    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    for he in &border_hes {
        let origin = mesh.origin(*he).index();
        outgoing.insert(origin, *he);
    }

    // Link next/prev for border half-edges
    for &he in &border_hes {
        // The next border half-edge starts where this one ends
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedge_mut(he).next = next_he;
            mesh.halfedge_mut(next_he).prev = he;
        }
    }
}

/// Ensure boundary vertices point to a border half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let start_he = mesh.vertex(vid).halfedge;
        if !start_he.is_valid() {
            continue;
        }

        // Walk around the vertex to find a border half-edge
        // Uses the same iteration pattern as VertexHalfEdgeIter: twin -> next
        let mut he = start_he;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertex_mut(vid).halfedge = he;
                break;
            }
            he = mesh.next(mesh.twin(he));
            if he == start_he {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Retired elements are compacted out: only live vertices are emitted, and
/// face indices refer to the emitted order.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.vertices.len()];
    let mut vertices = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        remap[v.index()] = vertices.len();
        vertices.push(*mesh.position(v));
    }

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [remap[v0.index()], remap[v1.index()], remap[v2.index()]]
        })
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 border half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        // All vertices should be on boundary
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 border half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh: HalfEdgeMesh<u32> = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        assert_eq!(faces.len(), out_faces.len());

        // Positions should match
        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]]; // Indices 1 and 2 are invalid

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(SpruceError::InvalidVertexIndex { .. })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 0, 2]]; // Degenerate: v0 == v1

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(SpruceError::DegenerateFace { .. })));
    }

    #[test]
    fn test_non_manifold_rejected() {
        // Two faces using the same directed edge (0 -> 1)
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 1, 3]];

        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(SpruceError::NonManifoldEdge { .. })));
    }

    #[test]
    fn test_empty_input() {
        let result: Result<HalfEdgeMesh<u32>> = build_from_triangles(&[], &[]);
        assert!(matches!(result, Err(SpruceError::EmptyMesh)));
    }
}
