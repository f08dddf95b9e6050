//! In-place topology operators.
//!
//! This module implements the mutating operations used by the repair
//! algorithms: edge collapse, edge flip, and face removal, together with the
//! link-condition test that guards collapses. All operators work in place on
//! the half-edge arenas, retiring elements via removal flags; surviving
//! element ids remain stable.
//!
//! Operators assume a triangle mesh. Each documents its element delta:
//! collapsing an interior edge retires 1 vertex, 3 edges, and 2 faces; a flip
//! retires nothing; face removal depends on how many of the face's edges lie
//! on the border.

use std::collections::HashSet;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Set `next(a) = b` and `prev(b) = a`.
    fn link_halfedges(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) {
        self.halfedge_mut(a).next = b;
        self.halfedge_mut(b).prev = a;
    }

    /// Retire a half-edge together with its twin.
    fn retire_halfedge_pair(&mut self, h: HalfEdgeId<I>) {
        for he in [h, self.twin(h)] {
            if !self.removed_halfedges[he.index()] {
                self.removed_halfedges[he.index()] = true;
                self.num_removed_halfedges += 1;
            }
        }
    }

    /// Retire a vertex and invalidate its outgoing half-edge anchor.
    fn retire_vertex(&mut self, v: VertexId<I>) {
        if !self.removed_vertices[v.index()] {
            self.removed_vertices[v.index()] = true;
            self.num_removed_vertices += 1;
        }
        self.vertex_mut(v).halfedge = HalfEdgeId::invalid();
    }

    /// Retire a face.
    fn retire_face(&mut self, f: FaceId<I>) {
        if !self.removed_faces[f.index()] {
            self.removed_faces[f.index()] = true;
            self.num_removed_faces += 1;
        }
    }

    /// Re-anchor a vertex to a border half-edge if it has one.
    ///
    /// Maintains the invariant that boundary vertices point to an outgoing
    /// border half-edge.
    fn adjust_outgoing_halfedge(&mut self, v: VertexId<I>) {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return;
        }
        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                self.vertex_mut(v).halfedge = he;
                return;
            }
            he = self.next(self.twin(he));
            if he == start {
                return;
            }
        }
    }

    /// Test whether collapsing the edge of `h` preserves manifoldness.
    ///
    /// This is the link condition of Edelsbrunner: the common neighbors of
    /// the two endpoints must be exactly the apex vertices of the edge's
    /// incident triangles. Additional guards reject collapsing the edge of a
    /// lone triangle and collapsing an interior edge whose endpoints lie on
    /// two different boundaries.
    pub fn satisfies_link_condition(&self, h: HalfEdgeId<I>) -> bool {
        let o = self.twin(h);
        let vo = self.origin(h); // vertex that a collapse would retire
        let vh = self.dest(h); // surviving vertex
        let h_has_face = !self.is_boundary_halfedge(h);
        let o_has_face = !self.is_boundary_halfedge(o);

        // A triangle whose other two edges are both border cannot lose this
        // edge without degenerating.
        if h_has_face {
            let h1 = self.next(h);
            let h2 = self.next(h1);
            if self.is_boundary_halfedge(self.twin(h1))
                && self.is_boundary_halfedge(self.twin(h2))
            {
                return false;
            }
        }
        if o_has_face {
            let o1 = self.next(o);
            let o2 = self.next(o1);
            if self.is_boundary_halfedge(self.twin(o1))
                && self.is_boundary_halfedge(self.twin(o2))
            {
                return false;
            }
        }

        let vl = if h_has_face {
            Some(self.dest(self.next(h)))
        } else {
            None
        };
        let vr = if o_has_face {
            Some(self.dest(self.next(o)))
        } else {
            None
        };
        if let (Some(vl), Some(vr)) = (vl, vr) {
            if vl == vr {
                return false;
            }
        }

        // Collapsing an interior edge between two boundary vertices would
        // pinch two boundaries together.
        if self.is_boundary_vertex(vo) && self.is_boundary_vertex(vh) && h_has_face && o_has_face {
            return false;
        }

        // One-ring intersection: only the apex vertices may be shared.
        let vh_neighbors: HashSet<VertexId<I>> = self.vertex_neighbors(vh).collect();
        for v in self.vertex_neighbors(vo) {
            if v == vh {
                continue;
            }
            if vh_neighbors.contains(&v) && Some(v) != vl && Some(v) != vr {
                return false;
            }
        }

        true
    }

    /// Collapse the edge of `h`, merging `origin(h)` into `dest(h)`.
    ///
    /// The surviving vertex keeps its position (the merged vertex is *not*
    /// moved to the edge midpoint: on curved surfaces repeatedly moving a
    /// vertex drifts it off the surface). The edge, its two incident faces,
    /// and the `prev`-side edge of each incident triangle are retired; the
    /// `next`-side edges take over the merged connectivity.
    ///
    /// Preconditions: the link condition holds for `h` and the edge is not a
    /// border edge. Returns the surviving vertex.
    pub fn collapse_edge(&mut self, h: HalfEdgeId<I>) -> VertexId<I> {
        debug_assert!(!self.is_removed_halfedge(h));
        debug_assert!(!self.is_boundary_edge(h));

        let o = self.twin(h);
        let hn = self.next(h);
        let hp = self.prev(h);
        let on = self.next(o);
        let op = self.prev(o);
        let fh = self.face_of(h);
        let fo = self.face_of(o);
        let vh = self.dest(h);
        let vo = self.origin(h);

        // Re-root every half-edge leaving the retired vertex.
        let ring: Vec<HalfEdgeId<I>> = self.vertex_halfedges(vo).collect();
        for he in ring {
            self.halfedge_mut(he).origin = vh;
        }

        // Splice the collapsed pair out of both loops.
        self.link_halfedges(hp, hn);
        self.link_halfedges(op, on);

        // Re-anchor faces and the surviving vertex.
        if fh.is_valid() {
            self.face_mut(fh).halfedge = hn;
        }
        if fo.is_valid() {
            self.face_mut(fo).halfedge = on;
        }
        if self.vertex(vh).halfedge == o {
            self.vertex_mut(vh).halfedge = hn;
        }

        self.retire_vertex(vo);
        self.retire_halfedge_pair(h);

        // Both incident triangles are now two-sided loops; collapse them onto
        // their neighbors, retiring the prev-side edge of each.
        if self.next(hn) == hp {
            self.collapse_degenerate_loop(hp);
        }
        if self.next(on) == op {
            self.collapse_degenerate_loop(op);
        }

        self.adjust_outgoing_halfedge(vh);
        vh
    }

    /// Collapse a two-sided loop `[h, next(h)]` left behind by an edge
    /// collapse, retiring the edge of `h` and the loop's face.
    fn collapse_degenerate_loop(&mut self, h: HalfEdgeId<I>) {
        let h1 = self.next(h);
        debug_assert_eq!(self.next(h1), h);

        let o = self.twin(h);
        let o1 = self.twin(h1);
        let va = self.origin(h);
        let vb = self.origin(h1);
        let fh = self.face_of(h);
        let fo = self.face_of(o);

        // h1 takes o's place in the neighboring loop.
        let on = self.next(o);
        let op = self.prev(o);
        self.link_halfedges(h1, on);
        self.link_halfedges(op, h1);
        self.halfedge_mut(h1).face = fo;

        // Anchors of the endpoints and the neighboring face.
        self.vertex_mut(vb).halfedge = h1;
        self.vertex_mut(va).halfedge = o1;
        if fo.is_valid() && self.face(fo).halfedge == o {
            self.face_mut(fo).halfedge = h1;
        }

        if fh.is_valid() {
            self.retire_face(fh);
        }
        self.retire_halfedge_pair(h);

        self.adjust_outgoing_halfedge(va);
        self.adjust_outgoing_halfedge(vb);
    }

    /// Flip an interior edge, reconnecting it between the two apex vertices
    /// of its incident triangles.
    ///
    /// `h` and its twin keep their ids, so the edge id of the flipped edge is
    /// unchanged. No elements are created or retired.
    ///
    /// Preconditions: both sides of the edge carry a face, and no half-edge
    /// between the two apex vertices exists yet.
    pub fn flip_edge(&mut self, h: HalfEdgeId<I>) {
        debug_assert!(!self.is_removed_halfedge(h));
        debug_assert!(!self.is_boundary_edge(h));

        let t = self.twin(h);
        let hn = self.next(h);
        let hp = self.prev(h);
        let tn = self.next(t);
        let tp = self.prev(t);
        let fa = self.face_of(h);
        let fb = self.face_of(t);
        let u = self.origin(h);
        let v = self.origin(t);
        let w = self.dest(hn); // apex of face a
        let x = self.dest(tn); // apex of face b

        debug_assert!(self.find_halfedge(w, x).is_none());

        // h becomes x -> w, t becomes w -> x.
        self.halfedge_mut(h).origin = x;
        self.halfedge_mut(t).origin = w;

        // Face a keeps hp, gains tn: loop [h, hp, tn].
        self.link_halfedges(hp, tn);
        self.link_halfedges(tn, h);
        self.link_halfedges(h, hp);
        self.halfedge_mut(tn).face = fa;
        self.face_mut(fa).halfedge = h;

        // Face b keeps tp, gains hn: loop [t, tp, hn].
        self.link_halfedges(tp, hn);
        self.link_halfedges(hn, t);
        self.link_halfedges(t, tp);
        self.halfedge_mut(hn).face = fb;
        self.face_mut(fb).halfedge = t;

        // The old endpoints may have been anchored on the flipped pair.
        if self.vertex(u).halfedge == h {
            self.vertex_mut(u).halfedge = tn;
        }
        if self.vertex(v).halfedge == t {
            self.vertex_mut(v).halfedge = hn;
        }
    }

    /// Remove a face, turning its non-border edges into border edges.
    ///
    /// Edges of the face that were already on the border are retired
    /// entirely, along with any vertex this isolates: removing a face with
    /// one border edge retires that edge; with two border edges it also
    /// retires the ear vertex between them; with three it retires the whole
    /// isolated triangle.
    pub fn remove_face(&mut self, f: FaceId<I>) {
        debug_assert!(!self.is_removed_face(f));

        let h0 = self.face(f).halfedge;
        let h1 = self.next(h0);
        let h2 = self.next(h1);
        debug_assert_eq!(self.next(h2), h0);

        let on_border =
            |mesh: &Self, h: HalfEdgeId<I>| mesh.is_boundary_halfedge(mesh.twin(h));
        let border_count = [h0, h1, h2]
            .iter()
            .filter(|&&h| on_border(self, h))
            .count();

        self.retire_face(f);

        match border_count {
            0 => {
                // The face loop becomes a new border loop.
                for h in [h0, h1, h2] {
                    self.halfedge_mut(h).face = FaceId::invalid();
                }
                for h in [h0, h1, h2] {
                    self.adjust_outgoing_halfedge(self.origin(h));
                }
            }
            1 => {
                // Rotate so the border edge is the loop anchor's prev.
                let hb = if on_border(self, h0) {
                    h0
                } else if on_border(self, h1) {
                    h1
                } else {
                    h2
                };
                let ha = self.next(hb);
                let hc = self.next(ha);
                let tb = self.twin(hb);
                let pt = self.prev(tb);
                let nt = self.next(tb);

                // ha and hc replace tb in the border loop.
                self.halfedge_mut(ha).face = FaceId::invalid();
                self.halfedge_mut(hc).face = FaceId::invalid();
                self.link_halfedges(pt, ha);
                self.link_halfedges(hc, nt);

                let va = self.origin(ha);
                let vc = self.origin(hb);
                if self.vertex(va).halfedge == tb {
                    self.vertex_mut(va).halfedge = ha;
                }
                if self.vertex(vc).halfedge == hb {
                    self.vertex_mut(vc).halfedge = nt;
                }
                self.retire_halfedge_pair(hb);

                self.adjust_outgoing_halfedge(va);
                self.adjust_outgoing_halfedge(self.origin(hc));
                self.adjust_outgoing_halfedge(vc);
            }
            2 => {
                // Rotate so the single interior edge comes first.
                let ha = if !on_border(self, h0) {
                    h0
                } else if !on_border(self, h1) {
                    h1
                } else {
                    h2
                };
                let hb = self.next(ha); // border
                let hc = self.next(hb); // border
                let tb = self.twin(hb);
                let tc = self.twin(hc);
                // Manifold: the border loop passes tc -> tb through the ear.
                debug_assert_eq!(self.next(tc), tb);

                let pt = self.prev(tc);
                let nt = self.next(tb);
                let va = self.origin(ha);
                let vb = self.origin(hb);
                let ear = self.origin(hc);

                self.halfedge_mut(ha).face = FaceId::invalid();
                self.link_halfedges(pt, ha);
                self.link_halfedges(ha, nt);

                if self.vertex(va).halfedge == tc {
                    self.vertex_mut(va).halfedge = ha;
                }
                if self.vertex(vb).halfedge == hb {
                    self.vertex_mut(vb).halfedge = nt;
                }
                self.retire_halfedge_pair(hb);
                self.retire_halfedge_pair(hc);
                self.retire_vertex(ear);

                self.adjust_outgoing_halfedge(va);
                self.adjust_outgoing_halfedge(vb);
            }
            _ => {
                // Isolated triangle: retire the whole component.
                for h in [h0, h1, h2] {
                    self.retire_halfedge_pair(h);
                }
                for h in [h0, h1, h2] {
                    self.retire_vertex(self.origin(h));
                }
            }
        }
    }

    /// Garbage-collect retired elements, rebuilding dense arenas.
    ///
    /// Live vertices and faces survive with new ids; edges without faces are
    /// dropped. After compaction no element is flagged as removed.
    pub fn compact(&mut self) -> crate::error::Result<()> {
        if self.num_faces() == 0 {
            let positions: Vec<_> = self.vertex_ids().map(|v| *self.position(v)).collect();
            let mut mesh = HalfEdgeMesh::new();
            for p in positions {
                mesh.add_vertex(p);
            }
            *self = mesh;
            return Ok(());
        }
        let (vertices, faces) = super::builder::to_face_vertex(self);
        *self = super::builder::build_from_triangles(&vertices, &faces)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::mesh::{build_from_triangles, FaceId, HalfEdgeMesh, VertexId};

    fn create_octahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
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
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_quad() -> HalfEdgeMesh {
        // Two triangles sharing the diagonal (0, 2)
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_single_triangle() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_bipyramid() -> HalfEdgeMesh {
        // Triangular ring c, d, e with apexes a (top) and b (bottom)
        let vertices = vec![
            Point3::new(0.0, 0.0, 1.0),   // 0: a
            Point3::new(0.0, 0.0, -1.0),  // 1: b
            Point3::new(0.01, 0.0, 0.0),  // 2: c
            Point3::new(-0.005, 0.0087, 0.0), // 3: d
            Point3::new(-0.005, -0.0087, 0.0), // 4: e
        ];
        let faces = vec![
            [2, 3, 0],
            [3, 4, 0],
            [4, 2, 0],
            [3, 2, 1],
            [4, 3, 1],
            [2, 4, 1],
        ];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_link_condition_closed_mesh() {
        let mesh = create_octahedron();
        for he in mesh.halfedge_ids() {
            assert!(mesh.satisfies_link_condition(he));
        }
    }

    #[test]
    fn test_link_condition_lone_triangle() {
        let mesh = create_single_triangle();
        for he in mesh.halfedge_ids() {
            assert!(!mesh.satisfies_link_condition(he));
        }
    }

    #[test]
    fn test_link_condition_bipyramid_ring() {
        let mesh = create_bipyramid();
        // Ring edges have three common neighbors (both apexes plus the third
        // ring vertex), so their collapse is rejected.
        for (u, v) in [(2usize, 3usize), (3, 4), (4, 2)] {
            let he = mesh
                .find_halfedge(VertexId::new(u), VertexId::new(v))
                .unwrap();
            assert!(!mesh.satisfies_link_condition(he));
        }
        // Apex edges are fine.
        let he = mesh
            .find_halfedge(VertexId::new(2), VertexId::new(0))
            .unwrap();
        assert!(mesh.satisfies_link_condition(he));
    }

    #[test]
    fn test_collapse_edge_counts() {
        let mut mesh = create_octahedron();
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .unwrap();
        assert!(mesh.satisfies_link_condition(he));

        let survivor = mesh.collapse_edge(he);
        assert_eq!(survivor, VertexId::new(2));

        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_edges(), 9);
        assert_eq!(mesh.num_faces(), 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_collapse_keeps_survivor_position() {
        let mut mesh = create_octahedron();
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .unwrap();
        let expected = *mesh.position(VertexId::new(2));

        let survivor = mesh.collapse_edge(he);
        // The survivor stays where it was; no midpoint averaging.
        assert_eq!(*mesh.position(survivor), expected);
    }

    #[test]
    fn test_collapse_then_compact() {
        let mut mesh = create_octahedron();
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .unwrap();
        mesh.collapse_edge(he);

        mesh.compact().unwrap();
        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_edges(), 9);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_flip_edge() {
        let mut mesh = create_quad();
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .unwrap();
        let area_before: f64 = mesh.face_ids().map(|f| mesh.face_area(f)).sum();

        mesh.flip_edge(he);

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);

        // The diagonal now connects vertices 1 and 3.
        assert!(mesh
            .find_halfedge(VertexId::new(1), VertexId::new(3))
            .is_some());
        assert!(mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .is_none());

        // Planar quad: total area is unchanged by the flip.
        let area_after: f64 = mesh.face_ids().map(|f| mesh.face_area(f)).sum();
        assert!((area_before - area_after).abs() < 1e-12);

        // Both faces wind the same way.
        for f in mesh.face_ids() {
            assert!(mesh.face_normal(f).z > 0.0);
        }
    }

    #[test]
    fn test_flip_preserves_edge_id() {
        let mut mesh = create_quad();
        let he = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(2))
            .unwrap();
        let e = mesh.edge(he);

        mesh.flip_edge(he);

        // The flipped pair keeps its ids, so the edge id is stable.
        assert_eq!(mesh.edge(he), e);
        let o = mesh.origin(he).index();
        assert!(o == 1 || o == 3);
    }

    fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_remove_face_one_border_edge() {
        // Corner face [0, 1, 4] of the 2x2 grid touches the border only
        // along edge (0, 1).
        let mut mesh = create_grid_mesh(2);
        assert_eq!(mesh.num_edges(), 16);

        mesh.remove_face(FaceId::new(0));
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 7);
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_edges(), 15);
    }

    #[test]
    fn test_remove_face_two_border_edges() {
        // Quad face (0, 1, 2) has border edges (0,1) and (1,2); vertex 1 is
        // the ear between them.
        let mut mesh = create_quad();
        mesh.remove_face(FaceId::new(0));

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert!(mesh.is_removed_vertex(VertexId::new(1)));
    }

    #[test]
    fn test_remove_face_isolated_triangle() {
        let mut mesh = create_single_triangle();
        mesh.remove_face(FaceId::new(0));

        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_interior_face_makes_hole() {
        let mesh = create_octahedron();
        let mut mesh = mesh;
        mesh.remove_face(FaceId::new(0));

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 7);
        // No edges disappear; three half-edges became border.
        assert_eq!(mesh.num_edges(), 12);
        let borders = mesh
            .halfedge_ids()
            .filter(|&he| mesh.is_boundary_halfedge(he))
            .count();
        assert_eq!(borders, 3);
    }
}
