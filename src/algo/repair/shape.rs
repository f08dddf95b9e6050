//! Triangle shape predicates.

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::RepairOptions;

/// Shape classification of a triangle face.
///
/// A face is never both a needle and a cap: the needle test runs first, and a
/// needle-shaped face is not considered for the cap test even when its short
/// edge is too long to collapse. This keeps a face from oscillating between
/// the collapse and flip candidate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceShape<I: MeshIndex = u32> {
    /// The face is acceptably shaped.
    Fine,
    /// The face is a needle; the half-edge is its shortest edge.
    Needle(HalfEdgeId<I>),
    /// The face is a cap; the half-edge is the edge opposite the wide angle.
    Cap(HalfEdgeId<I>),
}

/// Return the half-edge of the shortest edge of `f` if the face is a needle:
/// its longest edge is more than `needle_ratio` times its shortest edge.
///
/// The comparison is cross-multiplied, so a zero-length shortest edge
/// classifies as a needle without dividing.
pub fn needle_halfedge<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    f: FaceId<I>,
    needle_ratio: f64,
) -> Option<HalfEdgeId<I>> {
    let h0 = mesh.face_halfedge(f);
    let h1 = mesh.next(h0);
    let h2 = mesh.next(h1);

    let mut shortest = h0;
    let mut min_len = mesh.edge_length(h0);
    let mut max_len = min_len;
    for h in [h1, h2] {
        let len = mesh.edge_length(h);
        if len < min_len {
            min_len = len;
            shortest = h;
        }
        if len > max_len {
            max_len = len;
        }
    }

    if max_len > needle_ratio * min_len {
        Some(shortest)
    } else {
        None
    }
}

/// Return the half-edge opposite the first interior angle of `f` whose cosine
/// is below `cap_angle_cosine`, if any.
pub fn cap_halfedge<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    f: FaceId<I>,
    cap_angle_cosine: f64,
) -> Option<HalfEdgeId<I>> {
    let h0 = mesh.face_halfedge(f);
    let h1 = mesh.next(h0);
    let h2 = mesh.next(h1);

    for h in [h0, h1, h2] {
        // The angle sits at origin(h); the opposite edge is next(h).
        if mesh.corner_cosine(h) < cap_angle_cosine {
            return Some(mesh.next(h));
        }
    }
    None
}

/// Classify a face against the repair thresholds.
///
/// The needle test runs first; a needle whose shortest edge exceeds
/// `collapse_length_max` is reported as [`FaceShape::Fine`] (the cap test is
/// skipped for it). Otherwise the cap test decides.
pub fn classify_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    f: FaceId<I>,
    options: &RepairOptions,
) -> FaceShape<I> {
    if let Some(h) = needle_halfedge(mesh, f, options.needle_ratio) {
        if mesh.edge_length(h) <= options.collapse_length_max {
            return FaceShape::Needle(h);
        }
        return FaceShape::Fine;
    }
    if let Some(h) = cap_halfedge(mesh, f, options.cap_angle_cosine) {
        return FaceShape::Cap(h);
    }
    FaceShape::Fine
}
