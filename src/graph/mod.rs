//! In-memory graph model shared by every detector.
//!
//! [`Graph`] wraps a petgraph [`petgraph::Graph`] and keeps an insertion-ordered
//! index from caller node identifiers to petgraph indices. Node order is the
//! order in which nodes were first added, and every algorithm in this crate
//! walks nodes in that order.
//!
//! Edges carry an open-ended [`Attributes`] map. The numeric weight of an edge
//! is read from the attribute named by a weight key (default
//! [`DEFAULT_WEIGHT_KEY`]); an edge without that attribute weighs `1.0`.
//!
//! ```rust
//! use cohort::graph::UnGraph;
//!
//! let mut graph = UnGraph::new_undirected();
//! graph.add_edge("a", "b");
//! graph.add_weighted_edge("b", "c", 2.5).unwrap();
//!
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.degree(&"b", "weight").unwrap(), 3.5);
//! ```

mod weighted;

pub(crate) use weighted::WeightedGraph;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction, EdgeType, Undirected};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Attribute name read as edge weight unless configured otherwise.
pub const DEFAULT_WEIGHT_KEY: &str = "weight";

/// Open-ended edge attribute map.
pub type Attributes = BTreeMap<String, Value>;

/// Requirements on node identifiers.
pub trait NodeId: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> NodeId for T {}

/// Undirected graph.
pub type UnGraph<N> = Graph<N, Undirected>;

/// Directed graph.
pub type DiGraph<N> = Graph<N, Directed>;

/// Mutable graph of hashable node identifiers and attributed edges.
///
/// `Ty` selects the directed or undirected form. Between any ordered (directed)
/// or unordered (undirected) pair there is at most one edge; adding it again
/// merges the new attributes into the existing edge.
#[derive(Clone)]
pub struct Graph<N, Ty = Undirected> {
    inner: petgraph::Graph<N, Attributes, Ty>,
    index: IndexMap<N, NodeIndex>,
}

impl<N: Debug, Ty: EdgeType> fmt::Debug for Graph<N, Ty> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("directed", &Ty::is_directed())
            .field("nodes", &self.index.keys().collect::<Vec<_>>())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<N: NodeId> Graph<N, Undirected> {
    /// Create an empty undirected graph.
    pub fn new_undirected() -> Self {
        Self::new()
    }
}

impl<N: NodeId> Graph<N, Directed> {
    /// Create an empty directed graph.
    pub fn new_directed() -> Self {
        Self::new()
    }
}

impl<N: NodeId, Ty: EdgeType> Default for Graph<N, Ty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeId, Ty: EdgeType> Graph<N, Ty> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty graph with preallocated room.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            inner: petgraph::Graph::with_capacity(nodes, edges),
            index: IndexMap::with_capacity(nodes),
        }
    }

    /// Build a graph from unweighted edges.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Build a graph from `(u, v, weight)` triples stored under [`DEFAULT_WEIGHT_KEY`].
    pub fn from_weighted_edges<I>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, N, f64)>,
    {
        let mut graph = Self::new();
        for (u, v, w) in edges {
            graph.add_weighted_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Whether edges are ordered pairs.
    pub fn is_directed(&self) -> bool {
        Ty::is_directed()
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: N) {
        let _ = self.ensure_node(node);
    }

    fn ensure_node(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.inner.add_node(node.clone());
        let _ = self.index.insert(node, idx);
        idx
    }

    /// Add an edge without attributes (weight 1.0 under any key).
    pub fn add_edge(&mut self, u: N, v: N) {
        self.add_edge_with_attrs(u, v, Attributes::new());
    }

    /// Add an edge carrying `weight` under [`DEFAULT_WEIGHT_KEY`].
    ///
    /// Fails with [`Error::InvalidWeight`] for negative or non-finite weights.
    pub fn add_weighted_edge(&mut self, u: N, v: N, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight {
                key: DEFAULT_WEIGHT_KEY.to_string(),
                value: weight.to_string(),
            });
        }
        let mut attrs = Attributes::new();
        let _ = attrs.insert(DEFAULT_WEIGHT_KEY.to_string(), Value::from(weight));
        self.add_edge_with_attrs(u, v, attrs);
        Ok(())
    }

    /// Add an edge with attributes, creating missing endpoints.
    ///
    /// If the edge already exists its attributes are updated key by key.
    pub fn add_edge_with_attrs(&mut self, u: N, v: N, attrs: Attributes) {
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        match self.inner.find_edge(a, b) {
            Some(edge) => {
                if let Some(existing) = self.inner.edge_weight_mut(edge) {
                    existing.extend(attrs);
                }
            }
            None => {
                let _ = self.inner.add_edge(a, b, attrs);
            }
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether `node` is in the graph.
    pub fn contains_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Whether the edge `(u, v)` exists. Direction matters for directed graphs.
    pub fn has_edge(&self, u: &N, v: &N) -> bool {
        self.find_edge(u, v).is_some()
    }

    fn find_edge(&self, u: &N, v: &N) -> Option<EdgeIndex> {
        let a = *self.index.get(u)?;
        let b = *self.index.get(v)?;
        self.inner.find_edge(a, b)
    }

    /// Attributes of the edge `(u, v)`, if present.
    pub fn edge_attrs(&self, u: &N, v: &N) -> Option<&Attributes> {
        self.find_edge(u, v)
            .and_then(|edge| self.inner.edge_weight(edge))
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.index.keys()
    }

    /// Edges in insertion order as `(source, target, attributes)`.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, &Attributes)> + '_ {
        self.inner.edge_references().map(move |e| {
            (
                &self.inner[e.source()],
                &self.inner[e.target()],
                e.weight(),
            )
        })
    }

    /// Position of `node` in insertion order.
    pub fn node_position(&self, node: &N) -> Option<usize> {
        self.index.get_index_of(node)
    }

    /// Node at `position` in insertion order.
    pub fn node_at(&self, position: usize) -> Option<&N> {
        self.index.get_index(position).map(|(node, _)| node)
    }

    /// Neighbors of `node` with the weight of the connecting edge.
    ///
    /// Directed graphs report successors. A missing node has no neighbors.
    pub fn neighbors(&self, node: &N, weight_key: &str) -> Result<Vec<(&N, f64)>> {
        let Some(&idx) = self.index.get(node) else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in self.inner.edges_directed(idx, Direction::Outgoing) {
            if !seen.insert(edge.id()) {
                continue;
            }
            let other = if edge.source() == idx {
                edge.target()
            } else {
                edge.source()
            };
            out.push((&self.inner[other], edge_weight(edge.weight(), weight_key)?));
        }
        Ok(out)
    }

    /// Weighted degree of `node`. A self-loop counts once.
    ///
    /// For directed graphs this is in-degree plus out-degree.
    pub fn degree(&self, node: &N, weight_key: &str) -> Result<f64> {
        let Some(&idx) = self.index.get(node) else {
            return Ok(0.0);
        };
        let mut seen = HashSet::new();
        let mut total = 0.0;
        let incident = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.inner.edges_directed(idx, Direction::Incoming));
        for edge in incident {
            if seen.insert(edge.id()) {
                total += edge_weight(edge.weight(), weight_key)?;
            }
        }
        Ok(total)
    }

    /// Total edge weight, each edge counted once.
    pub fn size(&self, weight_key: &str) -> Result<f64> {
        self.inner
            .edge_references()
            .map(|e| edge_weight(e.weight(), weight_key))
            .sum()
    }

    /// Undirected projection, summing the weights of `(u, v)` and `(v, u)`.
    pub fn to_undirected(&self) -> Result<UnGraph<N>> {
        self.to_undirected_by(DEFAULT_WEIGHT_KEY)
    }

    /// Undirected projection summing weights read from `weight_key`.
    ///
    /// The summed weight is stored under `weight_key`; other attributes of
    /// collapsed edges are merged, later edges winning.
    pub fn to_undirected_by(&self, weight_key: &str) -> Result<UnGraph<N>> {
        let mut out = UnGraph::with_capacity(self.node_count(), self.edge_count());
        for node in self.nodes() {
            out.add_node(node.clone());
        }
        for (u, v, attrs) in self.edges() {
            let w = edge_weight(attrs, weight_key)?;
            let summed = match out.edge_attrs(u, v) {
                Some(existing) => edge_weight(existing, weight_key)? + w,
                None => w,
            };
            let mut merged = attrs.clone();
            let _ = merged.insert(weight_key.to_string(), Value::from(summed));
            out.add_edge_with_attrs(u.clone(), v.clone(), merged);
        }
        Ok(out)
    }

    pub(crate) fn edge_positions(
        &self,
    ) -> impl Iterator<Item = (usize, usize, &Attributes)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (e.source().index(), e.target().index(), e.weight()))
    }
}

/// Read the weight of an edge from its attributes.
///
/// Missing attributes weigh `1.0`; anything else must be a finite,
/// non-negative number.
pub fn edge_weight(attrs: &Attributes, weight_key: &str) -> Result<f64> {
    let Some(value) = attrs.get(weight_key) else {
        return Ok(1.0);
    };
    match value.as_f64() {
        Some(w) if w.is_finite() && w >= 0.0 => Ok(w),
        _ => Err(Error::InvalidWeight {
            key: weight_key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_debug_lists_nodes_in_order() {
        let graph = UnGraph::from_edges([("b", "a"), ("a", "c")]);
        assert_eq!(
            format!("{graph:?}"),
            r#"Graph { directed: false, nodes: ["b", "a", "c"], edge_count: 2 }"#
        );
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut graph = UnGraph::new_undirected();
        graph.add_node(1);
        graph.add_node(2);
        graph.add_node(1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nodes().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_undirected_edge_existence_is_symmetric() {
        let graph = UnGraph::from_edges([(1, 2)]);
        assert!(graph.has_edge(&1, &2));
        assert!(graph.has_edge(&2, &1));
        assert!(!graph.has_edge(&1, &3));
    }

    #[test]
    fn test_directed_edge_existence_is_ordered() {
        let graph = DiGraph::from_edges([(1, 2)]);
        assert!(graph.is_directed());
        assert!(graph.has_edge(&1, &2));
        assert!(!graph.has_edge(&2, &1));
    }

    #[test]
    fn test_repeated_edge_merges_attributes() {
        let mut graph = UnGraph::new_undirected();
        graph.add_weighted_edge("a", "b", 2.0).unwrap();
        let mut attrs = Attributes::new();
        attrs.insert("label".to_string(), json!("x"));
        graph.add_edge_with_attrs("b", "a", attrs);

        assert_eq!(graph.edge_count(), 1);
        let attrs = graph.edge_attrs(&"a", &"b").unwrap();
        assert_eq!(attrs.get("weight"), Some(&json!(2.0)));
        assert_eq!(attrs.get("label"), Some(&json!("x")));
    }

    #[test]
    fn test_degree_counts_self_loop_once() {
        let mut graph = UnGraph::new_undirected();
        graph.add_weighted_edge(1, 1, 3.0).unwrap();
        graph.add_weighted_edge(1, 2, 1.0).unwrap();
        assert_eq!(graph.degree(&1, "weight").unwrap(), 4.0);
        assert_eq!(graph.size("weight").unwrap(), 4.0);
    }

    #[test]
    fn test_missing_weight_falls_back_to_one() {
        let graph = UnGraph::from_edges([(1, 2), (2, 3)]);
        assert_eq!(graph.degree(&2, "capacity").unwrap(), 2.0);
        assert_eq!(graph.size("weight").unwrap(), 2.0);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut graph = UnGraph::new_undirected();
        let err = graph.add_weighted_edge(1, 2, -1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { .. }));
    }

    #[test]
    fn test_non_numeric_weight_rejected_on_read() {
        let mut graph = UnGraph::new_undirected();
        let mut attrs = Attributes::new();
        attrs.insert("weight".to_string(), json!("heavy"));
        graph.add_edge_with_attrs(1, 2, attrs);
        assert!(graph.size("weight").is_err());
        assert_eq!(graph.size("other").unwrap(), 1.0);
    }

    #[test]
    fn test_neighbors_report_weights() {
        let graph = UnGraph::from_weighted_edges([(1, 2, 0.5), (1, 3, 2.0)]).unwrap();
        let mut neighbors: Vec<(i32, f64)> = graph
            .neighbors(&1, "weight")
            .unwrap()
            .into_iter()
            .map(|(n, w)| (*n, w))
            .collect();
        neighbors.sort_by_key(|(n, _)| *n);
        assert_eq!(neighbors, vec![(2, 0.5), (3, 2.0)]);
        assert!(graph.neighbors(&9, "weight").unwrap().is_empty());
    }

    #[test]
    fn test_directed_neighbors_are_successors() {
        let graph = DiGraph::from_edges([(1, 2), (3, 1)]);
        let neighbors: Vec<i32> = graph
            .neighbors(&1, "weight")
            .unwrap()
            .into_iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(neighbors, vec![2]);
        assert_eq!(graph.degree(&1, "weight").unwrap(), 2.0);
    }

    #[test]
    fn test_to_undirected_sums_reciprocal_edges() {
        let mut graph = DiGraph::new_directed();
        graph.add_weighted_edge("a", "b", 1.5).unwrap();
        graph.add_weighted_edge("b", "a", 2.0).unwrap();
        graph.add_edge("b", "c");

        let undirected = graph.to_undirected().unwrap();
        assert!(!undirected.is_directed());
        assert_eq!(undirected.edge_count(), 2);
        let attrs = undirected.edge_attrs(&"b", &"a").unwrap();
        assert_eq!(edge_weight(attrs, "weight").unwrap(), 3.5);
        assert_eq!(
            undirected.nodes().copied().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }
}
