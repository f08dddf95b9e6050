//! Error types for spruce.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`SpruceError`].
pub type Result<T> = std::result::Result<T, SpruceError>;

/// Errors that can occur during mesh and point-set operations.
#[derive(Error, Debug)]
pub enum SpruceError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// The point set has no points.
    #[error("point set is empty")]
    EmptyPointSet,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge appears in more than one face (non-manifold topology
    /// or inconsistent winding).
    #[error("edge ({v0}, {v1}) is non-manifold")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl SpruceError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        SpruceError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
