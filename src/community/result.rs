//! The result contract shared by all detectors.

use super::factory::Algorithm;
use super::partition::Partition;
use crate::graph::NodeId;

/// Outcome of one detector run.
///
/// Holds the validated partition, its modularity on the input graph, the
/// algorithm that produced it, and algorithm-specific history. Read-only once
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityResult<N: NodeId> {
    partition: Partition<N>,
    modularity: f64,
    algorithm: Algorithm,
    history: History<N>,
}

/// Algorithm-specific auxiliary data.
#[derive(Debug, Clone, PartialEq)]
pub enum History<N: NodeId> {
    /// No history recorded.
    None,
    /// Louvain: one entry per kept aggregation pass, coarsening over time.
    Passes(Vec<PassLevel<N>>),
    /// Girvan-Newman: dendrogram levels, refining over time.
    Dendrogram(Vec<DendrogramLevel<N>>),
}

/// Partition reached after one Louvain pass, unwound to the input nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PassLevel<N: NodeId> {
    /// Partition of the input graph after this pass.
    pub partition: Partition<N>,
    /// Modularity of that partition.
    pub modularity: f64,
}

/// One level of a Girvan-Newman dendrogram.
#[derive(Debug, Clone, PartialEq)]
pub struct DendrogramLevel<N: NodeId> {
    /// Connected components after the removals that produced this level.
    pub partition: Partition<N>,
    /// Edges removed since the previous level, in removal order.
    ///
    /// Empty for the first level.
    pub removed_edges: Vec<(N, N)>,
    /// Modularity of `partition` on the input graph.
    pub modularity: f64,
}

impl<N: NodeId> CommunityResult<N> {
    pub(crate) fn new(
        algorithm: Algorithm,
        partition: Partition<N>,
        modularity: f64,
        history: History<N>,
    ) -> Self {
        Self {
            partition,
            modularity,
            algorithm,
            history,
        }
    }

    /// The chosen partition.
    pub fn partition(&self) -> &Partition<N> {
        &self.partition
    }

    /// Modularity of [`Self::partition`] on the input graph.
    pub fn modularity(&self) -> f64 {
        self.modularity
    }

    /// Algorithm that produced this result.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Number of communities in the partition.
    pub fn num_communities(&self) -> usize {
        self.partition.num_communities()
    }

    /// Member lists ordered by community id.
    pub fn communities(&self) -> Vec<Vec<N>> {
        self.partition.communities()
    }

    /// Community sizes ordered by community id.
    pub fn community_sizes(&self) -> Vec<usize> {
        self.partition.community_sizes()
    }

    /// Auxiliary history.
    pub fn history(&self) -> &History<N> {
        &self.history
    }

    /// Louvain pass history, if this is a Louvain result.
    pub fn passes(&self) -> Option<&[PassLevel<N>]> {
        match &self.history {
            History::Passes(levels) => Some(levels),
            _ => None,
        }
    }

    /// Girvan-Newman dendrogram, if this is a Girvan-Newman result.
    pub fn dendrogram(&self) -> Option<&[DendrogramLevel<N>]> {
        match &self.history {
            History::Dendrogram(levels) => Some(levels),
            _ => None,
        }
    }

    /// Coarsest dendrogram level with at least `k` communities.
    pub fn level_with_communities(&self, k: usize) -> Option<&DendrogramLevel<N>> {
        self.dendrogram()?
            .iter()
            .find(|level| level.partition.num_communities() >= k)
    }
}
