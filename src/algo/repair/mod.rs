//! Removal of almost-degenerate triangles.
//!
//! This module eliminates *needles* (triangles with one edge much shorter
//! than the others) and *caps* (triangles with one interior angle close to
//! 180 degrees) from a triangle mesh. Needles are removed by collapsing their
//! short edge, caps by flipping the edge opposite the wide angle (or by
//! deleting the triangle when that edge lies on the border).
//!
//! The driver alternates collapse and flip passes, re-validating candidates
//! against the current mesh before acting on them, until no bad faces remain
//! or an iteration makes no progress.
//!
//! # Example
//!
//! ```
//! use spruce::prelude::*;
//! use spruce::algo::repair::{repair_all_almost_degenerate_faces, RepairOptions};
//! use nalgebra::Point3;
//!
//! // A thin quad triangulated along its long diagonal: both triangles are caps.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.3, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(1.0, -0.3, 0.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 3, 2]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let options = RepairOptions::new().with_cap_angle_cosine((140.0_f64).to_radians().cos());
//! assert!(repair_all_almost_degenerate_faces(&mut mesh, &options).unwrap());
//! ```

mod degenerate;
mod shape;

pub use degenerate::{repair_all_almost_degenerate_faces, repair_almost_degenerate_faces};
pub use shape::{cap_halfedge, classify_face, needle_halfedge, FaceShape};

use crate::error::{Result, SpruceError};

/// Options for almost-degenerate face repair.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// A face is a needle when its longest edge is more than this many times
    /// longer than its shortest edge.
    pub needle_ratio: f64,

    /// A face is a cap when the cosine of one of its interior angles drops
    /// below this value.
    pub cap_angle_cosine: f64,

    /// Needle edges longer than this are not collapsed; zero disables
    /// collapsing entirely.
    pub collapse_length_max: f64,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            needle_ratio: 4.0,
            cap_angle_cosine: (160.0_f64).to_radians().cos(),
            collapse_length_max: 0.2,
        }
    }
}

impl RepairOptions {
    /// Create options with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the needle aspect-ratio threshold.
    pub fn with_needle_ratio(mut self, ratio: f64) -> Self {
        self.needle_ratio = ratio;
        self
    }

    /// Set the cap angle threshold as a cosine.
    pub fn with_cap_angle_cosine(mut self, cosine: f64) -> Self {
        self.cap_angle_cosine = cosine;
        self
    }

    /// Set the maximum length of edges allowed to be collapsed.
    pub fn with_collapse_length_max(mut self, length: f64) -> Self {
        self.collapse_length_max = length;
        self
    }

    /// Check threshold ranges.
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.needle_ratio.is_finite() && self.needle_ratio > 0.0) {
            return Err(SpruceError::invalid_param(
                "needle_ratio",
                self.needle_ratio,
                "must be positive and finite",
            ));
        }
        if !(-1.0..=1.0).contains(&self.cap_angle_cosine) {
            return Err(SpruceError::invalid_param(
                "cap_angle_cosine",
                self.cap_angle_cosine,
                "must be a cosine in [-1, 1]",
            ));
        }
        if !(self.collapse_length_max.is_finite() && self.collapse_length_max >= 0.0) {
            return Err(SpruceError::invalid_param(
                "collapse_length_max",
                self.collapse_length_max,
                "must be non-negative and finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RepairOptions::default();
        assert_eq!(options.needle_ratio, 4.0);
        assert!((options.cap_angle_cosine - (-0.9396926207859084)).abs() < 1e-12);
        assert_eq!(options.collapse_length_max, 0.2);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_option_builders() {
        let options = RepairOptions::new()
            .with_needle_ratio(10.0)
            .with_cap_angle_cosine(-0.5)
            .with_collapse_length_max(1.0);
        assert_eq!(options.needle_ratio, 10.0);
        assert_eq!(options.cap_angle_cosine, -0.5);
        assert_eq!(options.collapse_length_max, 1.0);
    }

    #[test]
    fn test_invalid_options() {
        assert!(RepairOptions::new()
            .with_needle_ratio(0.0)
            .validate()
            .is_err());
        assert!(RepairOptions::new()
            .with_cap_angle_cosine(1.5)
            .validate()
            .is_err());
        assert!(RepairOptions::new()
            .with_collapse_length_max(-0.1)
            .validate()
            .is_err());
        // Zero is allowed: it disables collapsing.
        assert!(RepairOptions::new()
            .with_collapse_length_max(0.0)
            .validate()
            .is_ok());
    }
}
