//! Consistent orientation of point-cloud normals.
//!
//! Point clouds with estimated normals usually carry an ambiguous sign: each
//! normal is correct up to a flip. This module assigns a globally consistent
//! orientation by propagating the orientation of an unambiguous seed point
//! (the highest point, whose normal is forced towards +z) through a minimum
//! spanning tree of the *Riemannian graph*: the k-nearest-neighbor graph
//! weighted by how badly neighboring normals align, so propagation prefers
//! paths along which the surface bends least.
//!
//! After propagation the input is stably partitioned: confidently oriented
//! points first, points whose orientation could not be established after
//! them, each side in input order.
//!
//! # Example
//!
//! ```
//! use spruce::algo::orient::{orient_normals_via_mst, OrientOptions, PointNormal};
//! use nalgebra::{Point3, Vector3};
//!
//! // A line of points, one normal flipped the wrong way.
//! let mut points: Vec<PointNormal> = (0..10)
//!     .map(|i| {
//!         let sign = if i == 4 { -1.0 } else { 1.0 };
//!         PointNormal::new(Point3::new(i as f64, 0.0, 0.0), sign * Vector3::z())
//!     })
//!     .collect();
//!
//! let boundary =
//!     orient_normals_via_mst(&mut points, 2, &OrientOptions::default()).unwrap();
//! assert_eq!(boundary, points.len());
//! assert!(points.iter().all(|p| p.normal == Vector3::z()));
//! ```
//!
//! # References
//!
//! - Hoppe, H. et al. (1992). "Surface Reconstruction from Unorganized
//!   Points." SIGGRAPH '92.

mod mst;
mod riemannian;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::error::{Result, SpruceError};

/// A point-cloud sample: a position and a unit normal of ambiguous sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointNormal {
    /// Sample position.
    pub position: Point3<f64>,

    /// Unit normal. Orientation algorithms may negate it in place.
    pub normal: Vector3<f64>,
}

impl PointNormal {
    /// Create a new sample.
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }
}

/// Options for normal orientation.
#[derive(Debug, Clone)]
pub struct OrientOptions {
    /// Maximum angle (radians) between neighboring normals across which
    /// orientation is still propagated confidently. In (0, pi/2].
    pub max_propagation_angle: f64,
}

impl Default for OrientOptions {
    fn default() -> Self {
        Self {
            max_propagation_angle: std::f64::consts::FRAC_PI_2,
        }
    }
}

impl OrientOptions {
    /// Create options with the default propagation angle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum propagation angle in radians.
    pub fn with_max_propagation_angle(mut self, angle: f64) -> Self {
        self.max_propagation_angle = angle;
        self
    }

    /// Check parameter ranges.
    pub(crate) fn validate(&self) -> Result<()> {
        let angle = self.max_propagation_angle;
        if !(angle > 0.0 && angle <= std::f64::consts::FRAC_PI_2) {
            return Err(SpruceError::invalid_param(
                "max_propagation_angle",
                angle,
                "must be in (0, pi/2] radians",
            ));
        }
        Ok(())
    }
}

/// Orient the normals of `points` consistently by MST propagation.
///
/// The seed is the highest point, its normal forced towards +z; orientation
/// spreads outward along the minimum spanning tree of the Riemannian k-NN
/// graph, flipping each normal to agree in sign with its tree parent. Points
/// whose orientation could not be established confidently (the propagation
/// crossed an angle wider than the threshold, or the point is unreachable
/// with `k` neighbors) are moved behind the others.
///
/// The slice is reordered stably: confidently oriented points first in input
/// order, then the rest in input order. Returns the index of the first
/// unoriented point, enabling the erase-remove idiom (`points.truncate(n)`).
///
/// # Errors
///
/// Fails with [`SpruceError::EmptyPointSet`] on empty input and
/// [`SpruceError::InvalidParameter`] if `k < 2` or the angle threshold is
/// out of range, without modifying the input.
pub fn orient_normals_via_mst(
    points: &mut [PointNormal],
    k: usize,
    options: &OrientOptions,
) -> Result<usize> {
    options.validate()?;
    if points.is_empty() {
        return Err(SpruceError::EmptyPointSet);
    }
    if k < 2 {
        return Err(SpruceError::invalid_param(
            "k",
            k,
            "at least 2 neighbors are required",
        ));
    }

    let seed = riemannian::find_seed(points);
    let graph = riemannian::build_riemannian_graph(points, k);
    let predecessor = mst::prim_mst(&graph, seed);
    let oriented = mst::propagate_orientation(
        points,
        &predecessor,
        seed,
        options.max_propagation_angle.cos(),
    );

    // Stable partition: confident points first, both sides in input order.
    let mut front = Vec::with_capacity(points.len());
    let mut back = Vec::new();
    for (p, ok) in points.iter().zip(&oriented) {
        if *ok {
            front.push(*p);
        } else {
            back.push(*p);
        }
    }
    let boundary = front.len();
    debug!(
        oriented = boundary,
        unoriented = back.len(),
        "normal orientation finished"
    );
    for (dst, src) in points.iter_mut().zip(front.into_iter().chain(back)) {
        *dst = src;
    }

    Ok(boundary)
}
