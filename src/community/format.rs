//! Response shaping for [`CommunityResult`].
//!
//! [`format_community_result`] only reshapes: it reads the result, copies
//! what it needs and never recomputes modularity.

use super::factory::Algorithm;
use super::partition::Partition;
use super::result::{CommunityResult, History};
use crate::error::{Error, Result};
use crate::graph::NodeId;
use indexmap::IndexMap;
use serde::Serialize;

/// Stable output shape of a detector run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedCommunities<N: NodeId> {
    /// Algorithm registry name.
    pub algorithm: Algorithm,
    /// Modularity of the partition.
    pub modularity: f64,
    /// Number of communities.
    pub num_communities: usize,
    /// Node to community id.
    pub partition: IndexMap<N, usize>,
    /// Members per community, by id.
    pub communities: Vec<Vec<N>>,
    /// Size statistics.
    pub statistics: CommunityStatistics,
    /// Louvain passes or Girvan-Newman dendrogram levels, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<FormattedLevel<N>>>,
}

/// Community size summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStatistics {
    /// Number of communities.
    pub num_communities: usize,
    /// Size of each community, by id.
    pub sizes: Vec<usize>,
    /// Largest community size (0 when empty).
    pub largest: usize,
    /// Smallest community size (0 when empty).
    pub smallest: usize,
    /// Mean community size (0.0 when empty).
    pub mean_size: f64,
    /// Communities with exactly one member.
    pub singletons: usize,
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedLevel<N: NodeId> {
    /// Position in the history, from 0.
    pub level: usize,
    /// Number of communities at this level.
    pub num_communities: usize,
    /// Modularity at this level.
    pub modularity: f64,
    /// Node to community id.
    pub partition: IndexMap<N, usize>,
    /// Edges removed to reach this level (Girvan-Newman only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_edges: Option<Vec<(N, N)>>,
}

impl<N: NodeId + Serialize> FormattedCommunities<N> {
    /// Render as a JSON value.
    ///
    /// Node identifiers must serialize as strings or integers.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::Format(e.to_string()))
    }
}

impl CommunityStatistics {
    fn from_sizes(sizes: Vec<usize>) -> Self {
        let num_communities = sizes.len();
        let total: usize = sizes.iter().sum();
        Self {
            num_communities,
            largest: sizes.iter().copied().max().unwrap_or(0),
            smallest: sizes.iter().copied().min().unwrap_or(0),
            mean_size: if num_communities == 0 {
                0.0
            } else {
                total as f64 / num_communities as f64
            },
            singletons: sizes.iter().filter(|&&s| s == 1).count(),
            sizes,
        }
    }
}

fn level<N: NodeId>(
    index: usize,
    partition: &Partition<N>,
    modularity: f64,
    removed_edges: Option<Vec<(N, N)>>,
) -> FormattedLevel<N> {
    FormattedLevel {
        level: index,
        num_communities: partition.num_communities(),
        modularity,
        partition: partition.as_map().clone(),
        removed_edges,
    }
}

/// Render `result` into its stable output shape.
pub fn format_community_result<N: NodeId>(result: &CommunityResult<N>) -> FormattedCommunities<N> {
    let partition = result.partition();
    let levels = match result.history() {
        History::None => None,
        History::Passes(passes) => Some(
            passes
                .iter()
                .enumerate()
                .map(|(i, pass)| level(i, &pass.partition, pass.modularity, None))
                .collect(),
        ),
        History::Dendrogram(dendrogram) => Some(
            dendrogram
                .iter()
                .enumerate()
                .map(|(i, l)| level(i, &l.partition, l.modularity, Some(l.removed_edges.clone())))
                .collect(),
        ),
    };

    FormattedCommunities {
        algorithm: result.algorithm(),
        modularity: result.modularity(),
        num_communities: partition.num_communities(),
        partition: partition.as_map().clone(),
        communities: partition.communities(),
        statistics: CommunityStatistics::from_sizes(partition.community_sizes()),
        levels,
    }
}
