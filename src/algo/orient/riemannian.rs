//! Seed selection and the Riemannian k-nearest-neighbor graph.

use kiddo::{KdTree, SquaredEuclidean};

use super::PointNormal;

/// An adjacency entry of the Riemannian graph.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GraphEdge {
    /// Index of the neighboring point.
    pub target: usize,
    /// Alignment defect `1 - |n_i . n_j|` of the endpoint normals.
    pub weight: f64,
}

/// Undirected k-NN graph; `adjacency[i]` lists the neighbors of point `i`.
#[derive(Debug, Default)]
pub(crate) struct RiemannianGraph {
    pub adjacency: Vec<Vec<GraphEdge>>,
}

impl RiemannianGraph {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }
}

/// Find the seed point whose outward direction is unambiguous: the point
/// with the highest z-coordinate (first occurrence on ties). Its normal is
/// flipped towards +z if necessary.
pub(crate) fn find_seed(points: &mut [PointNormal]) -> usize {
    let mut top = 0;
    for i in 1..points.len() {
        if points[i].position.z > points[top].position.z {
            top = i;
        }
    }
    if points[top].normal.z < 0.0 {
        points[top].normal = -points[top].normal;
    }
    top
}

/// Build the Riemannian graph: each point is connected to its k nearest
/// neighbors, with edges weighted by how badly the endpoint normals align
/// (sign ignored).
///
/// Each point queries `k + 1` neighbors, since the query point itself comes
/// back first. A neighbor pair is recorded once, from its lower-index side.
/// Round-off can push the alignment defect slightly negative, so weights are
/// clamped at zero.
pub(crate) fn build_riemannian_graph(points: &[PointNormal], k: usize) -> RiemannianGraph {
    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, p) in points.iter().enumerate() {
        tree.add(&[p.position.x, p.position.y, p.position.z], i as u64);
    }

    let mut adjacency = vec![Vec::new(); points.len()];
    for (i, p) in points.iter().enumerate() {
        let query = [p.position.x, p.position.y, p.position.z];
        for neighbor in tree.nearest_n::<SquaredEuclidean>(&query, k + 1) {
            let j = neighbor.item as usize;
            if j > i {
                let weight = (1.0 - p.normal.dot(&points[j].normal).abs()).max(0.0);
                adjacency[i].push(GraphEdge { target: j, weight });
                adjacency[j].push(GraphEdge { target: i, weight });
            }
        }
    }

    RiemannianGraph { adjacency }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};

    use super::*;

    fn point(x: f64, y: f64, z: f64, normal: Vector3<f64>) -> PointNormal {
        PointNormal::new(Point3::new(x, y, z), normal)
    }

    #[test]
    fn test_find_seed_picks_highest() {
        let mut points = vec![
            point(0.0, 0.0, 0.1, Vector3::z()),
            point(1.0, 0.0, 0.9, Vector3::z()),
            point(2.0, 0.0, 0.5, Vector3::z()),
        ];
        assert_eq!(find_seed(&mut points), 1);
    }

    #[test]
    fn test_find_seed_flips_downward_normal() {
        let mut points = vec![
            point(0.0, 0.0, 0.0, Vector3::z()),
            point(0.0, 0.0, 1.0, -Vector3::z()),
        ];
        let seed = find_seed(&mut points);
        assert_eq!(seed, 1);
        assert_eq!(points[1].normal, Vector3::z());
    }

    #[test]
    fn test_find_seed_tie_takes_first() {
        let mut points = vec![
            point(0.0, 0.0, 1.0, Vector3::z()),
            point(1.0, 0.0, 1.0, Vector3::z()),
        ];
        assert_eq!(find_seed(&mut points), 0);
    }

    #[test]
    fn test_graph_is_symmetric() {
        let points = vec![
            point(0.0, 0.0, 0.0, Vector3::z()),
            point(1.0, 0.0, 0.0, Vector3::z()),
            point(2.0, 0.0, 0.0, Vector3::z()),
            point(3.0, 0.0, 0.0, Vector3::z()),
        ];
        let graph = build_riemannian_graph(&points, 2);

        assert_eq!(graph.len(), 4);
        for (i, edges) in graph.adjacency.iter().enumerate() {
            for edge in edges {
                assert!(graph.adjacency[edge.target]
                    .iter()
                    .any(|back| back.target == i));
            }
        }
    }

    #[test]
    fn test_graph_weights() {
        let points = vec![
            point(0.0, 0.0, 0.0, Vector3::z()),
            point(1.0, 0.0, 0.0, Vector3::z()),
            point(2.0, 0.0, 0.0, Vector3::x()),
        ];
        let graph = build_riemannian_graph(&points, 2);

        // Aligned normals give weight 0; orthogonal normals give weight 1.
        // An anti-aligned pair would also give 0: the sign is ignored.
        let w01 = graph.adjacency[0]
            .iter()
            .find(|e| e.target == 1)
            .unwrap()
            .weight;
        let w12 = graph.adjacency[1]
            .iter()
            .find(|e| e.target == 2)
            .unwrap()
            .weight;
        assert!(w01.abs() < 1e-12);
        assert!((w12 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_clamped_at_zero() {
        // Slightly over-unit normals can push the dot product above one;
        // the defect must not go negative.
        let n = Vector3::new(0.0, 0.0, 1.0 + 1e-9);
        let points = vec![point(0.0, 0.0, 0.0, n), point(1.0, 0.0, 0.0, n)];
        let graph = build_riemannian_graph(&points, 2);

        let w = graph.adjacency[0][0].weight;
        assert!(w >= 0.0);
    }

    #[test]
    fn test_single_point_graph() {
        let points = vec![point(0.0, 0.0, 0.0, Vector3::z())];
        let graph = build_riemannian_graph(&points, 2);
        assert_eq!(graph.len(), 1);
        assert!(graph.adjacency[0].is_empty());
    }
}
