//! Dense undirected projection used by the detectors.

use super::{edge_weight, Graph, NodeId};
use crate::error::Result;
use petgraph::EdgeType;
use std::collections::HashMap;

/// Index-addressed undirected weighted graph.
///
/// Node `i` is the `i`-th node of the source graph in insertion order.
/// Reciprocal and parallel edges are summed into one edge. Self-loop weight
/// lives on the diagonal (`self_loops`) and counts once toward the degree, so
/// `total_weight` (= 2m) is the sum of all degrees.
#[derive(Debug, Clone)]
pub(crate) struct WeightedGraph {
    /// Non-loop edges `(i, j, w)` with `i < j`, in first-seen order.
    pub(crate) edges: Vec<(usize, usize, f64)>,
    /// Adjacency: node -> [(neighbor, weight)], loops excluded.
    pub(crate) adj: Vec<Vec<(usize, f64)>>,
    /// Diagonal weight per node.
    pub(crate) self_loops: Vec<f64>,
    /// Weighted degree of each node.
    pub(crate) degrees: Vec<f64>,
    /// Sum of degrees (2m in the modularity formula).
    pub(crate) total_weight: f64,
}

impl WeightedGraph {
    /// Project `graph` using the weights stored under `weight_key`.
    pub(crate) fn from_graph<N: NodeId, Ty: EdgeType>(
        graph: &Graph<N, Ty>,
        weight_key: &str,
    ) -> Result<Self> {
        let n = graph.node_count();
        let mut self_loops = vec![0.0; n];
        let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(graph.edge_count());
        let mut slot: HashMap<(usize, usize), usize> = HashMap::new();

        for (i, j, attrs) in graph.edge_positions() {
            let w = edge_weight(attrs, weight_key)?;
            if i == j {
                self_loops[i] += w;
                continue;
            }
            let key = if i < j { (i, j) } else { (j, i) };
            match slot.get(&key) {
                Some(&pos) => edges[pos].2 += w,
                None => {
                    let _ = slot.insert(key, edges.len());
                    edges.push((key.0, key.1, w));
                }
            }
        }

        Ok(Self::from_parts(n, edges, self_loops))
    }

    /// Assemble from canonical edges and diagonal weights.
    pub(crate) fn from_parts(
        n: usize,
        edges: Vec<(usize, usize, f64)>,
        self_loops: Vec<f64>,
    ) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut degrees = self_loops.clone();
        for &(i, j, w) in &edges {
            adj[i].push((j, w));
            adj[j].push((i, w));
            degrees[i] += w;
            degrees[j] += w;
        }
        let total_weight = degrees.iter().sum();

        Self {
            edges,
            adj,
            self_loops,
            degrees,
            total_weight,
        }
    }

    pub(crate) fn n(&self) -> usize {
        self.degrees.len()
    }

    /// Modularity of `assignment` in per-community aggregate form.
    ///
    /// `assignment[i]` is the community of node `i`; ids need not be contiguous.
    /// Returns 0.0 for a graph without edge weight.
    pub(crate) fn modularity(&self, assignment: &[usize], resolution: f64) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let k = assignment.iter().copied().max().map_or(0, |c| c + 1);
        let mut internal = vec![0.0; k];
        let mut total = vec![0.0; k];

        for (i, &c) in assignment.iter().enumerate() {
            total[c] += self.degrees[i];
            internal[c] += self.self_loops[i];
        }
        for &(i, j, w) in &self.edges {
            if assignment[i] == assignment[j] {
                internal[assignment[i]] += 2.0 * w;
            }
        }

        let two_m = self.total_weight;
        internal
            .iter()
            .zip(&total)
            .map(|(&inside, &tot)| inside / two_m - resolution * (tot / two_m).powi(2))
            .sum()
    }
}
