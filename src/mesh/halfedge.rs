//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for triangle meshes. This structure enables O(1) adjacency queries and is
//! the foundation for the topology-changing repair operations.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin** (opposite half-edge), **next** (next half-edge
//!   around the face), **origin vertex**, and **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Border half-edges (on mesh boundaries) have an invalid face ID. Their twins
//! are the interior half-edges. Border loops can be traversed using the `next`
//! pointer on border half-edges.
//!
//! # Element Removal
//!
//! Topology operators (edge collapse, edge flip, face removal) retire elements
//! in place: each arena carries a parallel `removed` flag, ids of live elements
//! stay stable across removals, and the id iterators skip retired slots.
//! [`compact`](HalfEdgeMesh::compact) rebuilds dense arenas when the churn is
//! done.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a border half-edge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face (clockwise).
    /// This is redundant but speeds up many operations.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to.
    /// Invalid for border half-edges.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self { halfedge }
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge mesh data structure for triangle meshes.
///
/// This structure stores vertices, half-edges, and faces with full connectivity
/// information, enabling O(1) adjacency queries. Elements retired by topology
/// operators stay in the arenas with their `removed` flag set until
/// [`compact`](HalfEdgeMesh::compact) is called.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,

    /// Removal flags, parallel to `vertices`.
    pub(crate) removed_vertices: Vec<bool>,

    /// Removal flags, parallel to `halfedges`.
    pub(crate) removed_halfedges: Vec<bool>,

    /// Removal flags, parallel to `faces`.
    pub(crate) removed_faces: Vec<bool>,

    /// Number of retired vertices.
    pub(crate) num_removed_vertices: usize,

    /// Number of retired half-edges.
    pub(crate) num_removed_halfedges: usize,

    /// Number of retired faces.
    pub(crate) num_removed_faces: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            removed_vertices: Vec::new(),
            removed_halfedges: Vec::new(),
            removed_faces: Vec::new(),
            num_removed_vertices: 0,
            num_removed_halfedges: 0,
            num_removed_faces: 0,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Each triangle has 3 half-edges, but each interior edge is shared.
        // For a closed mesh: E = 3F/2, so HE = 3F; with boundary, slightly more.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            removed_vertices: Vec::with_capacity(num_vertices),
            removed_halfedges: Vec::with_capacity(num_halfedges),
            removed_faces: Vec::with_capacity(num_faces),
            num_removed_vertices: 0,
            num_removed_halfedges: 0,
            num_removed_faces: 0,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() - self.num_removed_vertices
    }

    /// Get the number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len() - self.num_removed_halfedges
    }

    /// Get the number of live edges (half-edge pairs).
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_halfedges() / 2
    }

    /// Get the number of live faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len() - self.num_removed_faces
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by ID.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by ID.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Removal Flags ====================

    /// Check whether a vertex has been retired by a topology operator.
    #[inline]
    pub fn is_removed_vertex(&self, v: VertexId<I>) -> bool {
        self.removed_vertices[v.index()]
    }

    /// Check whether a half-edge has been retired by a topology operator.
    #[inline]
    pub fn is_removed_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.removed_halfedges[he.index()]
    }

    /// Check whether a face has been retired by a topology operator.
    #[inline]
    pub fn is_removed_face(&self, f: FaceId<I>) -> bool {
        self.removed_faces[f.index()]
    }

    /// Check whether an edge has been retired by a topology operator.
    #[inline]
    pub fn is_removed_edge(&self, e: EdgeId<I>) -> bool {
        self.removed_halfedges[e.index()]
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Get the anchor half-edge of a face.
    #[inline]
    pub fn face_halfedge(&self, f: FaceId<I>) -> HalfEdgeId<I> {
        self.face(f).halfedge
    }

    /// Get the canonical edge id of a half-edge (the smaller index of the
    /// twin pair).
    #[inline]
    pub fn edge(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        let t = self.twin(he);
        EdgeId::new(he.index().min(t.index()))
    }

    /// Get the canonical half-edge of an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId<I>) -> HalfEdgeId<I> {
        HalfEdgeId::new(e.index())
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true; // Isolated vertex
        }

        // Walk around the vertex using the same logic as VertexHalfEdgeIter
        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return true;
            }
            he = self.next(self.twin(he));
            if he == start {
                break;
            }
        }
        false
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.twin(he))
    }

    /// Find the half-edge from `u` to `v`, if one exists.
    pub fn find_halfedge(&self, u: VertexId<I>, v: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(u).find(|&he| self.dest(he) == v)
    }

    // ==================== Iteration ====================

    /// Iterate over all live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len())
            .filter(|&i| !self.removed_vertices[i])
            .map(VertexId::new)
    }

    /// Iterate over all live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len())
            .filter(|&i| !self.removed_halfedges[i])
            .map(HalfEdgeId::new)
    }

    /// Iterate over all live edge IDs (one per half-edge pair).
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.halfedge_ids().filter_map(|he| {
            let e = self.edge(he);
            if e.index() == he.index() {
                Some(e)
            } else {
                None
            }
        })
    }

    /// Iterate over all live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len())
            .filter(|&i| !self.removed_faces[i])
            .map(FaceId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v).filter_map(|he| {
            let f = self.face_of(he);
            if f.is_valid() {
                Some(f)
            } else {
                None
            }
        })
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the normal of a face.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        e1.cross(&e2).normalize()
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        0.5 * e1.cross(&e2).norm()
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId<I>) -> f64 {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        (p1 - p0).norm()
    }

    /// Compute the edge vector (from origin to destination).
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        p1 - p0
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, he: HalfEdgeId<I>) -> Point3<f64> {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the cosine of the interior angle at the origin of a half-edge.
    ///
    /// The angle is spanned by this half-edge and the reversed previous
    /// half-edge of the same face. Returns NaN if either spanning edge has
    /// zero length.
    pub fn corner_cosine(&self, he: HalfEdgeId<I>) -> f64 {
        let a = self.edge_vector(he);
        let b = -self.edge_vector(self.prev(he));
        a.dot(&b) / (a.norm() * b.norm())
    }

    // ==================== Construction ====================

    /// Add a new vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        self.removed_vertices.push(false);
        id
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity among live elements is
    /// consistent).
    pub fn is_valid(&self) -> bool {
        // Check vertices
        for vid in self.vertex_ids() {
            let v = self.vertex(vid);
            if v.halfedge.is_valid() {
                if self.is_removed_halfedge(v.halfedge) {
                    return false;
                }
                if self.origin(v.halfedge) != vid {
                    return false;
                }
            }
        }

        // Check half-edges
        for heid in self.halfedge_ids() {
            let he = self.halfedge(heid);

            if !he.origin.is_valid() || self.is_removed_vertex(he.origin) {
                return false;
            }

            // Twin consistency
            if !he.twin.is_valid()
                || self.is_removed_halfedge(he.twin)
                || self.twin(he.twin) != heid
            {
                return false;
            }

            // Next/prev consistency
            if !he.next.is_valid() || self.prev(he.next) != heid {
                return false;
            }
            if !he.prev.is_valid() || self.next(he.prev) != heid {
                return false;
            }

            // A half-edge's face must be live
            if he.face.is_valid() && self.is_removed_face(he.face) {
                return false;
            }
        }

        // Check faces: live anchor and a closed triangle loop
        for fid in self.face_ids() {
            let anchor = self.face(fid).halfedge;
            if !anchor.is_valid() || self.is_removed_halfedge(anchor) {
                return false;
            }
            let mut he = anchor;
            for _ in 0..3 {
                if self.face_of(he) != fid {
                    return false;
                }
                he = self.next(he);
            }
            if he != anchor {
                return false;
            }
        }

        true
    }
}

/// Iterator over half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // Move to next outgoing half-edge: twin -> next.
        // If he goes v -> w, then twin(he) goes w -> v.
        // next(twin(he)) is the half-edge after twin(he) in its face,
        // which originates at v (the next outgoing half-edge from v).
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
