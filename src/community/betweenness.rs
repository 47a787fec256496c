//! Edge betweenness on a removable-edge working graph.
//!
//! Brandes' accumulation: one shortest-path search per source node, then a
//! reverse sweep crediting each edge on a shortest path with its share of
//! the dependency. O(V·E) unweighted, O(V·E + V² log V) weighted.
//!
//! Each source's credits are collected into their own buffer and added to
//! the total in source order, so the sequential and `parallel` builds sum in
//! the same order and agree bit for bit.

use crate::graph::WeightedGraph;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Detector-owned copy of an undirected projection with removable edges.
///
/// Edge ids are positions in the projection's edge list and stay stable
/// across removals.
#[derive(Debug, Clone)]
pub(crate) struct EdgeArena {
    edges: Vec<Option<(usize, usize, f64)>>,
    incident: Vec<Vec<usize>>,
    live: usize,
}

impl EdgeArena {
    pub(crate) fn from_weighted(graph: &WeightedGraph) -> Self {
        let mut incident = vec![Vec::new(); graph.n()];
        for (id, &(i, j, _)) in graph.edges.iter().enumerate() {
            incident[i].push(id);
            incident[j].push(id);
        }
        Self {
            edges: graph.edges.iter().copied().map(Some).collect(),
            incident,
            live: graph.edges.len(),
        }
    }

    pub(crate) fn n(&self) -> usize {
        self.incident.len()
    }

    pub(crate) fn live_edges(&self) -> usize {
        self.live
    }

    pub(crate) fn endpoints(&self, id: usize) -> Option<(usize, usize)> {
        self.edges.get(id).copied().flatten().map(|(i, j, _)| (i, j))
    }

    /// Remove an edge. Removing a missing edge is a no-op.
    pub(crate) fn remove(&mut self, id: usize) {
        let Some((i, j, _)) = self.edges.get_mut(id).and_then(Option::take) else {
            return;
        };
        self.incident[i].retain(|&e| e != id);
        self.incident[j].retain(|&e| e != id);
        self.live -= 1;
    }

    fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.incident[node].iter().filter_map(move |&id| {
            let (i, j, w) = self.edges[id]?;
            let other = if i == node { j } else { i };
            Some((other, id, w))
        })
    }

    /// Connected components labelled in order of first appearance.
    pub(crate) fn components(&self) -> (Vec<usize>, usize) {
        let n = self.n();
        let mut labels = vec![usize::MAX; n];
        let mut count = 0;
        let mut queue = VecDeque::new();

        for start in 0..n {
            if labels[start] != usize::MAX {
                continue;
            }
            labels[start] = count;
            queue.push_back(start);
            while let Some(node) = queue.pop_front() {
                for (neighbor, _, _) in self.neighbors(node) {
                    if labels[neighbor] == usize::MAX {
                        labels[neighbor] = count;
                        queue.push_back(neighbor);
                    }
                }
            }
            count += 1;
        }

        (labels, count)
    }

    /// Betweenness of every edge id; removed edges score 0.0.
    ///
    /// Each unordered pair of endpoints is counted once. With `weighted`,
    /// edge weights are path lengths and must all be positive.
    pub(crate) fn edge_betweenness(&self, weighted: bool) -> Vec<f64> {
        let m = self.edges.len();

        #[cfg(feature = "parallel")]
        let per_source: Vec<Vec<f64>> = (0..self.n())
            .into_par_iter()
            .map(|source| {
                let mut credit = vec![0.0; m];
                self.accumulate(source, weighted, &mut credit);
                credit
            })
            .collect();

        let mut scores = vec![0.0; m];

        #[cfg(feature = "parallel")]
        for credit in &per_source {
            for (total, c) in scores.iter_mut().zip(credit) {
                *total += c;
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut credit = vec![0.0; m];
            for source in 0..self.n() {
                credit.fill(0.0);
                self.accumulate(source, weighted, &mut credit);
                for (total, c) in scores.iter_mut().zip(&credit) {
                    *total += c;
                }
            }
        }

        // Every pair was reached from both ends.
        for score in &mut scores {
            *score /= 2.0;
        }
        scores
    }

    /// Add one source's dependencies into `credit`.
    fn accumulate(&self, source: usize, weighted: bool, credit: &mut [f64]) {
        let paths = if weighted {
            self.dijkstra(source)
        } else {
            self.bfs(source)
        };

        let mut delta = vec![0.0; self.n()];
        for &w in paths.order.iter().rev() {
            let coeff = (1.0 + delta[w]) / paths.sigma[w];
            for &(v, edge) in &paths.pred[w] {
                let c = paths.sigma[v] * coeff;
                credit[edge] += c;
                delta[v] += c;
            }
        }
    }

    fn bfs(&self, source: usize) -> ShortestPaths {
        let n = self.n();
        let mut paths = ShortestPaths::new(n);
        let mut dist = vec![usize::MAX; n];
        let mut queue = VecDeque::new();

        dist[source] = 0;
        paths.sigma[source] = 1.0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            paths.order.push(v);
            for (w, edge, _) in self.neighbors(v) {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    paths.sigma[w] += paths.sigma[v];
                    paths.pred[w].push((v, edge));
                }
            }
        }
        paths
    }

    fn dijkstra(&self, source: usize) -> ShortestPaths {
        let n = self.n();
        let mut paths = ShortestPaths::new(n);
        let mut settled = vec![false; n];
        let mut seen = vec![f64::INFINITY; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0usize;

        seen[source] = 0.0;
        paths.sigma[source] = 1.0;
        heap.push(Frontier {
            dist: 0.0,
            seq,
            node: source,
        });

        while let Some(Frontier { dist, node: v, .. }) = heap.pop() {
            if settled[v] || dist > seen[v] {
                continue;
            }
            settled[v] = true;
            paths.order.push(v);

            for (w, edge, weight) in self.neighbors(v) {
                if settled[w] {
                    continue;
                }
                let through = dist + weight;
                match through.partial_cmp(&seen[w]) {
                    Some(Ordering::Less) => {
                        seen[w] = through;
                        paths.sigma[w] = paths.sigma[v];
                        paths.pred[w].clear();
                        paths.pred[w].push((v, edge));
                        seq += 1;
                        heap.push(Frontier {
                            dist: through,
                            seq,
                            node: w,
                        });
                    }
                    Some(Ordering::Equal) => {
                        paths.sigma[w] += paths.sigma[v];
                        paths.pred[w].push((v, edge));
                    }
                    _ => {}
                }
            }
        }
        paths
    }
}

/// Single-source shortest-path DAG.
struct ShortestPaths {
    /// Nodes in non-decreasing distance order.
    order: Vec<usize>,
    /// Number of shortest paths from the source.
    sigma: Vec<f64>,
    /// Predecessors on shortest paths, with the connecting edge id.
    pred: Vec<Vec<(usize, usize)>>,
}

impl ShortestPaths {
    fn new(n: usize) -> Self {
        Self {
            order: Vec::with_capacity(n),
            sigma: vec![0.0; n],
            pred: vec![Vec::new(); n],
        }
    }
}

/// Heap entry ordered so the smallest distance pops first, then the earliest push.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    dist: f64,
    seq: usize,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
