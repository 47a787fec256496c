//! Community detection traits.

use super::config::CommunityConfig;
use super::factory::Algorithm;
use super::result::CommunityResult;
use crate::error::Result;
use crate::graph::{Graph, NodeId};
use petgraph::EdgeType;

/// Trait for community detection algorithms.
pub trait CommunityDetection {
    /// Which registered algorithm this detector runs.
    fn algorithm(&self) -> Algorithm;

    /// Detect communities in a graph.
    ///
    /// Directed graphs are read through their undirected projection. The
    /// graph is never mutated. The returned partition has been validated
    /// against `graph`.
    fn detect<N: NodeId, Ty: EdgeType>(
        &self,
        graph: &Graph<N, Ty>,
        config: &CommunityConfig,
    ) -> Result<CommunityResult<N>>;
}
