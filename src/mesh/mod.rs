//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing and manipulating triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a triangle mesh using
//! a half-edge (doubly-connected edge list) data structure. This representation
//! provides O(1) adjacency queries, and supports the in-place topology
//! operators (edge collapse, edge flip, face removal) that the repair
//! algorithms are built on.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`EdgeId`] - Identifies a full edge (a half-edge pair)
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`]
//! trait), allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//! Ids are stable across topology operations; retired elements keep their
//! slots until [`HalfEdgeMesh::compact`] is called.
//!
//! # Construction
//!
//! Meshes are typically constructed from face-vertex lists:
//!
//! ```
//! use spruce::mesh::{HalfEdgeMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod edit;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
