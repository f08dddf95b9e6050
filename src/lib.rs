//! # Spruce
//!
//! Cleanup algorithms for triangle meshes and point clouds.
//!
//! Spruce provides a half-edge mesh data structure with in-place topology
//! operators, and two cleanup algorithms built on top of the same working-set
//! pattern: repair of almost-degenerate triangles, and consistent orientation
//! of point-cloud normals.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe
//!   indices, stable element ids across topology edits
//! - **Degenerate-face repair**: needles are collapsed, caps are flipped,
//!   with re-validation of candidates after every topology change
//! - **Normal orientation**: minimum-spanning-tree propagation over a
//!   k-nearest-neighbor graph weighted by normal alignment
//!
//! ## Repairing a mesh
//!
//! ```
//! use spruce::prelude::*;
//! use spruce::algo::repair::{repair_all_almost_degenerate_faces, RepairOptions};
//! use nalgebra::Point3;
//!
//! // A sliver triangle: its wide angle is nearly 180 degrees.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.01, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let done = repair_all_almost_degenerate_faces(&mut mesh, &RepairOptions::default()).unwrap();
//! assert!(done);
//! assert_eq!(mesh.num_faces(), 0);
//! ```
//!
//! ## Orienting normals
//!
//! ```
//! use spruce::algo::orient::{orient_normals_via_mst, OrientOptions, PointNormal};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut points: Vec<PointNormal> = (0..20)
//!     .map(|i| {
//!         let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
//!         PointNormal::new(Point3::new(i as f64 * 0.1, 0.0, 0.0), sign * Vector3::z())
//!     })
//!     .collect();
//!
//! let boundary = orient_normals_via_mst(&mut points, 4, &OrientOptions::default()).unwrap();
//!
//! // Every normal ends up on the seed's side; none are left ambiguous.
//! assert_eq!(boundary, points.len());
//! assert!(points.iter().all(|p| p.normal == Vector3::z()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use spruce::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, SpruceError};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        // Closed mesh: 4 faces * 3 = 12 half-edges, no boundary
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        // Check that it's a closed mesh (no boundary vertices)
        for v in mesh.vertex_ids() {
            assert!(
                !mesh.is_boundary_vertex(v),
                "vertex {:?} should not be on boundary",
                v
            );
        }
    }

    #[test]
    fn test_repair_keeps_closed_mesh_closed() {
        use crate::algo::repair::{repair_all_almost_degenerate_faces, RepairOptions};

        // A closed octahedron squashed along x: already well shaped enough
        // for the default thresholds, so repair succeeds without touching it.
        let vertices = vec![
            Point3::new(0.6, 0.0, 0.0),
            Point3::new(-0.6, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, -1.0),
        ];
        let faces = vec![
            [0, 2, 4],
            [2, 1, 4],
            [1, 3, 4],
            [3, 0, 4],
            [2, 0, 5],
            [1, 2, 5],
            [3, 1, 5],
            [0, 3, 5],
        ];
        let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert!(repair_all_almost_degenerate_faces(&mut mesh, &RepairOptions::default()).unwrap());
        assert_eq!(mesh.num_faces(), 8);
        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v));
        }
    }
}
