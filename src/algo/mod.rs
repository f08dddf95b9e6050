//! Geometry processing algorithms.
//!
//! This module contains the two cleanup algorithms of the library:
//!
//! - **Repair**: elimination of almost-degenerate triangles (needles and
//!   caps) by edge collapses and edge flips
//! - **Orientation**: consistent sign assignment for point-cloud normals by
//!   propagation over a minimum spanning tree

pub mod orient;
pub mod repair;
