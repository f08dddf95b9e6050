//! Minimum spanning tree and orientation propagation.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use super::riemannian::RiemannianGraph;
use super::PointNormal;

/// Entry in Prim's priority queue.
#[derive(Debug, Clone)]
struct MstEntry {
    /// The vertex index.
    vertex: usize,
    /// Cheapest known connection weight into the tree.
    weight: f64,
}

impl MstEntry {
    fn new(vertex: usize, weight: f64) -> Self {
        Self { vertex, weight }
    }
}

// Implement ordering for min-heap (BinaryHeap is a max-heap by default)
impl PartialEq for MstEntry {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl Eq for MstEntry {}

impl PartialOrd for MstEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MstEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .weight
            .partial_cmp(&self.weight)
            .unwrap_or(Ordering::Equal)
    }
}

/// Compute a minimum spanning tree of the graph rooted at `root` using
/// Prim's algorithm.
///
/// Returns the predecessor array: `p[root] == root`, and any vertex the root
/// cannot reach keeps itself as predecessor.
pub(crate) fn prim_mst(graph: &RiemannianGraph, root: usize) -> Vec<usize> {
    let n = graph.len();
    let mut predecessor: Vec<usize> = (0..n).collect();
    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];

    let mut heap = BinaryHeap::new();
    best[root] = 0.0;
    heap.push(MstEntry::new(root, 0.0));

    while let Some(entry) = heap.pop() {
        let u = entry.vertex;

        // Skip stale entries: a cheaper connection was processed already.
        if in_tree[u] || entry.weight > best[u] {
            continue;
        }
        in_tree[u] = true;

        for edge in &graph.adjacency[u] {
            let v = edge.target;
            if !in_tree[v] && edge.weight < best[v] {
                best[v] = edge.weight;
                predecessor[v] = u;
                heap.push(MstEntry::new(v, edge.weight));
            }
        }
    }

    predecessor
}

/// Walk the rooted MST breadth-first, flipping each target normal to agree
/// in sign with its already-visited source.
///
/// A target counts as confidently oriented only when its source is and the
/// unsigned normal agreement reaches `cos_angle_max`. A target that misses
/// the threshold is still flipped, but it and all its descendants stay
/// unconfident.
///
/// Returns the per-point confidence flags; vertices outside the root's tree
/// are untouched and unconfident.
pub(crate) fn propagate_orientation(
    points: &mut [PointNormal],
    predecessor: &[usize],
    root: usize,
    cos_angle_max: f64,
) -> Vec<bool> {
    let n = points.len();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, &p) in predecessor.iter().enumerate() {
        if i != root && p != i {
            children[p].push(i);
        }
    }

    let mut oriented = vec![false; n];
    oriented[root] = true;

    let mut queue = VecDeque::new();
    queue.push_back(root);

    while let Some(s) = queue.pop_front() {
        let source_normal = points[s].normal;
        for &t in &children[s] {
            let dot = source_normal.dot(&points[t].normal);
            if dot < 0.0 {
                points[t].normal = -points[t].normal;
            }
            oriented[t] = oriented[s] && dot.abs() >= cos_angle_max;
            queue.push_back(t);
        }
    }

    oriented
}
