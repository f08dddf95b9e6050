//! Fixed-point driver for almost-degenerate face removal.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::Result;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::shape::{classify_face, FaceShape};
use super::RepairOptions;

/// Repair the almost-degenerate faces among `faces`.
///
/// Needles are collapsed along their short edge, caps are resolved by edge
/// flips (or by deleting the triangle when the offending edge is on the
/// border). Candidates invalidated by earlier operations are re-validated
/// when popped and rerouted to the next round, so the working sets tolerate
/// stale entries.
///
/// Returns `Ok(true)` once no candidate remains, `Ok(false)` if an entire
/// iteration made no change while bad faces remain (for example, when every
/// remaining needle fails the link condition). The mesh keeps whatever
/// progress was made either way.
///
/// # Errors
///
/// Fails with [`SpruceError::InvalidParameter`](crate::error::SpruceError)
/// if the options are out of range, without touching the mesh.
pub fn repair_almost_degenerate_faces<I: MeshIndex>(
    faces: &[FaceId<I>],
    mesh: &mut HalfEdgeMesh<I>,
    options: &RepairOptions,
) -> Result<bool> {
    options.validate()?;

    let mut to_collapse: BTreeSet<EdgeId<I>> = BTreeSet::new();
    let mut to_flip: BTreeSet<EdgeId<I>> = BTreeSet::new();

    for &f in faces {
        if mesh.is_removed_face(f) {
            continue;
        }
        match classify_face(mesh, f, options) {
            FaceShape::Needle(h) => {
                to_collapse.insert(mesh.edge(h));
            }
            FaceShape::Cap(h) => {
                to_flip.insert(mesh.edge(h));
            }
            FaceShape::Fine => {}
        }
    }

    loop {
        debug!(
            needles = to_collapse.len(),
            caps = to_flip.len(),
            "repair iteration"
        );

        if to_collapse.is_empty() && to_flip.is_empty() {
            return Ok(true);
        }

        let mut something_was_done = false;
        let mut next_collapse: BTreeSet<EdgeId<I>> = BTreeSet::new();
        let mut next_flip: BTreeSet<EdgeId<I>> = BTreeSet::new();

        // Treat needles.
        while let Some(e) = to_collapse.pop_first() {
            let h = match live_interior_halfedge(mesh, e) {
                Some(h) => h,
                None => continue,
            };

            // The candidate may have been invalidated by a previous
            // operation; reroute whatever the face looks like now.
            match classify_face(mesh, mesh.face_of(h), options) {
                FaceShape::Needle(nh) if nh == h => {}
                other => {
                    route(other, mesh, &mut next_collapse, &mut next_flip);
                    continue;
                }
            }

            if mesh.is_boundary_edge(h) || !mesh.satisfies_link_condition(h) {
                debug!(edge = e.index(), "uncollapsable edge, deferred");
                next_collapse.insert(e);
                continue;
            }

            // The prev-side edge of each incident triangle is retired by the
            // collapse; drop those ids from every live set.
            for hh in [h, mesh.twin(h)] {
                if !mesh.is_boundary_halfedge(hh) {
                    let pe = mesh.edge(mesh.prev(hh));
                    to_collapse.remove(&pe);
                    to_flip.remove(&pe);
                    next_collapse.remove(&pe);
                }
            }
            to_flip.remove(&e);

            mesh.collapse_edge(h);
            something_was_done = true;
        }

        // Treat caps.
        while let Some(e) = to_flip.pop_first() {
            let h = match live_interior_halfedge(mesh, e) {
                Some(h) => h,
                None => continue,
            };

            match classify_face(mesh, mesh.face_of(h), options) {
                FaceShape::Cap(ch) if ch == h => {}
                other => {
                    route(other, mesh, &mut next_collapse, &mut next_flip);
                    continue;
                }
            }

            // A cap with its wide edge on the border cannot be flipped;
            // delete the triangle instead.
            if mesh.is_boundary_edge(h) {
                let pe = mesh.edge(mesh.prev(h));
                let ne = mesh.edge(mesh.next(h));
                to_flip.remove(&pe);
                to_flip.remove(&ne);
                mesh.remove_face(mesh.face_of(h));
                something_was_done = true;
                continue;
            }

            // The flip is valid only if the edge it would create does not
            // already exist.
            let w = mesh.dest(mesh.next(h));
            let x = mesh.dest(mesh.next(mesh.twin(h)));
            if mesh.find_halfedge(w, x).is_some() {
                debug!(edge = e.index(), "unflippable configuration, skipped");
                continue;
            }

            mesh.flip_edge(h);
            something_was_done = true;

            // The four surrounding edges may hold entries describing the old
            // faces.
            for hh in [h, mesh.twin(h)] {
                let pe = mesh.edge(mesh.prev(hh));
                let ne = mesh.edge(mesh.next(hh));
                to_flip.remove(&pe);
                to_flip.remove(&ne);
            }

            // Examine the two new faces. A fresh cap on another edge is
            // queued for the next round; a needle is re-entered only when it
            // sits exactly on the flipped edge, to rule out flip cycles.
            for hh in [h, mesh.twin(h)] {
                match classify_face(mesh, mesh.face_of(hh), options) {
                    FaceShape::Cap(ch) if mesh.edge(ch) != e => {
                        next_flip.insert(mesh.edge(ch));
                    }
                    FaceShape::Needle(nh) if mesh.edge(nh) == e => {
                        next_collapse.insert(e);
                    }
                    _ => {}
                }
            }
        }

        to_collapse = next_collapse;
        to_flip = next_flip;

        if !something_was_done {
            debug!("no progress, bad faces remain");
            return Ok(false);
        }
    }
}

/// Repair all almost-degenerate faces of the mesh.
///
/// Convenience wrapper around [`repair_almost_degenerate_faces`] over every
/// live face.
pub fn repair_all_almost_degenerate_faces<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RepairOptions,
) -> Result<bool> {
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    repair_almost_degenerate_faces(&faces, mesh, options)
}

/// Resolve a candidate edge to a live half-edge with an incident face.
fn live_interior_halfedge<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    e: EdgeId<I>,
) -> Option<HalfEdgeId<I>> {
    if mesh.is_removed_edge(e) {
        return None;
    }
    let h = mesh.edge_halfedge(e);
    if !mesh.is_boundary_halfedge(h) {
        return Some(h);
    }
    let t = mesh.twin(h);
    if !mesh.is_boundary_halfedge(t) {
        return Some(t);
    }
    None
}

/// Queue a re-classification result into the next-round sets.
fn route<I: MeshIndex>(
    shape: FaceShape<I>,
    mesh: &HalfEdgeMesh<I>,
    next_collapse: &mut BTreeSet<EdgeId<I>>,
    next_flip: &mut BTreeSet<EdgeId<I>>,
) {
    match shape {
        FaceShape::Needle(h) => {
            next_collapse.insert(mesh.edge(h));
        }
        FaceShape::Cap(h) => {
            next_flip.insert(mesh.edge(h));
        }
        FaceShape::Fine => {}
    }
}
