//! Node-to-community assignments and their validation.

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use indexmap::IndexMap;
use petgraph::EdgeType;
use std::collections::HashMap;
use tracing::warn;

/// Assignment of nodes to community ids.
///
/// A partition built by a detector is total over the graph and canonical:
/// ids are contiguous from 0 and numbered in order of first appearance along
/// the graph's node order. There are no mutating methods; detectors build new
/// partitions instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<N: NodeId> {
    assignment: IndexMap<N, usize>,
    num_communities: usize,
}

impl<N: NodeId> Partition<N> {
    /// Partition with no nodes.
    pub fn empty() -> Self {
        Self {
            assignment: IndexMap::new(),
            num_communities: 0,
        }
    }

    /// Build from raw `(node, community)` pairs, keeping the ids as given.
    ///
    /// A node listed twice keeps its last id. Use [`Partition::canonicalize`]
    /// to renumber and [`validate_communities`] to check against a graph.
    pub fn from_assignment<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, usize)>,
    {
        let assignment: IndexMap<N, usize> = pairs.into_iter().collect();
        let mut ids: Vec<usize> = assignment.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        Self {
            num_communities: ids.len(),
            assignment,
        }
    }

    /// Build a canonical partition from per-position labels.
    pub(crate) fn from_labels<Ty: EdgeType>(graph: &Graph<N, Ty>, labels: &[usize]) -> Self {
        Self::from_assignment(graph.nodes().cloned().zip(labels.iter().copied())).canonicalize()
    }

    /// Renumber ids contiguously from 0 in order of first appearance.
    pub fn canonicalize(&self) -> Self {
        let mut mapping: HashMap<usize, usize> = HashMap::new();
        let assignment: IndexMap<N, usize> = self
            .assignment
            .iter()
            .map(|(node, &c)| {
                let next = mapping.len();
                (node.clone(), *mapping.entry(c).or_insert(next))
            })
            .collect();
        Self {
            num_communities: mapping.len(),
            assignment,
        }
    }

    /// Whether ids are already contiguous and in first-appearance order.
    pub fn is_canonical(&self) -> bool {
        let mut next = 0;
        for &c in self.assignment.values() {
            if c == next {
                next += 1;
            } else if c > next {
                return false;
            }
        }
        true
    }

    /// Community of `node`.
    pub fn get(&self, node: &N) -> Option<usize> {
        self.assignment.get(node).copied()
    }

    /// Whether `node` is assigned.
    pub fn contains(&self, node: &N) -> bool {
        self.assignment.contains_key(node)
    }

    /// Number of assigned nodes.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    /// Whether no node is assigned.
    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Number of distinct community ids.
    pub fn num_communities(&self) -> usize {
        self.num_communities
    }

    /// `(node, community)` pairs in node order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, usize)> + '_ {
        self.assignment.iter().map(|(node, &c)| (node, c))
    }

    /// The underlying map.
    pub fn as_map(&self) -> &IndexMap<N, usize> {
        &self.assignment
    }

    /// Member lists ordered by ascending community id.
    pub fn communities(&self) -> Vec<Vec<N>> {
        let mut ids: Vec<usize> = self.assignment.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        let slot: HashMap<usize, usize> = ids.iter().enumerate().map(|(i, &c)| (c, i)).collect();

        let mut groups = vec![Vec::new(); ids.len()];
        for (node, c) in &self.assignment {
            groups[slot[c]].push(node.clone());
        }
        groups
    }

    /// Community sizes ordered by ascending community id.
    pub fn community_sizes(&self) -> Vec<usize> {
        self.communities().iter().map(Vec::len).collect()
    }

    /// Per-position labels for `graph`, or `None` if a node is unassigned.
    pub(crate) fn labels_for<Ty: EdgeType>(&self, graph: &Graph<N, Ty>) -> Option<Vec<usize>> {
        graph.nodes().map(|node| self.get(node)).collect()
    }
}

/// Check that `partition` is a valid partition of `graph`.
///
/// Every graph node must be assigned, every assigned node must be in the
/// graph, and every id between 0 and the largest id must have members.
pub fn validate_communities<N: NodeId, Ty: EdgeType>(
    graph: &Graph<N, Ty>,
    partition: &Partition<N>,
) -> Result<()> {
    let reject = |reason: String| {
        warn!(%reason, "partition rejected");
        Err(Error::invalid_partition(reason))
    };

    if let Some(node) = graph.nodes().find(|node| !partition.contains(node)) {
        return reject(format!("node {node:?} is missing from the partition"));
    }
    if let Some((node, _)) = partition.iter().find(|(node, _)| !graph.contains_node(node)) {
        return reject(format!("partition key {node:?} is not a graph node"));
    }

    let Some(max_id) = partition.iter().map(|(_, c)| c).max() else {
        return Ok(());
    };
    let mut counts = vec![0usize; max_id + 1];
    for (_, c) in partition.iter() {
        counts[c] += 1;
    }
    if let Some(empty) = counts.iter().position(|&count| count == 0) {
        return reject(format!("community {empty} has no nodes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::UnGraph;

    fn path() -> UnGraph<u32> {
        UnGraph::from_edges([(1, 2), (2, 3), (3, 4)])
    }

    #[test]
    fn test_canonicalize_first_appearance() {
        let p = Partition::from_assignment([("a", 7), ("b", 3), ("c", 7), ("d", 9)]);
        assert!(!p.is_canonical());
        let c = p.canonicalize();
        assert!(c.is_canonical());
        assert_eq!(c.get(&"a"), Some(0));
        assert_eq!(c.get(&"b"), Some(1));
        assert_eq!(c.get(&"c"), Some(0));
        assert_eq!(c.get(&"d"), Some(2));
        assert_eq!(c.num_communities(), 3);
    }

    #[test]
    fn test_communities_grouped_by_id() {
        let p = Partition::from_assignment([(1, 1), (2, 0), (3, 1)]);
        assert_eq!(p.communities(), vec![vec![2], vec![1, 3]]);
        assert_eq!(p.community_sizes(), vec![1, 2]);
    }

    #[test]
    fn test_validate_accepts_total_partition() {
        let p = Partition::from_assignment([(1, 0), (2, 0), (3, 1), (4, 1)]);
        assert!(validate_communities(&path(), &p).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_node() {
        let p = Partition::from_assignment([(1, 0), (2, 0), (3, 1)]);
        let err = validate_communities(&path(), &p).unwrap_err();
        assert!(
            matches!(err, Error::InvalidPartition { ref reason } if reason.contains("missing"))
        );
    }

    #[test]
    fn test_validate_rejects_foreign_key() {
        let p = Partition::from_assignment([(1, 0), (2, 0), (3, 1), (4, 1), (5, 1)]);
        let err = validate_communities(&path(), &p).unwrap_err();
        let Error::InvalidPartition { reason } = &err else {
            panic!("expected InvalidPartition, got {err:?}");
        };
        assert!(reason.contains("not a graph node"));
    }

    #[test]
    fn test_validate_rejects_empty_community() {
        let p = Partition::from_assignment([(1, 0), (2, 0), (3, 2), (4, 2)]);
        let err = validate_communities(&path(), &p).unwrap_err();
        assert!(
            matches!(err, Error::InvalidPartition { ref reason } if reason.contains("community 1"))
        );
    }

    #[test]
    fn test_validate_empty_graph() {
        let graph = UnGraph::<u32>::new_undirected();
        assert!(validate_communities(&graph, &Partition::empty()).is_ok());
    }
}
