//! Modularity of a partition.
//!
//! ```text
//! Q = Σ_c [ L_c / m - γ (d_c / 2m)² ]
//! ```
//!
//! where `L_c` is the edge weight inside community `c` and `d_c` the summed
//! degree of its members. This is the per-community form of the pairwise
//! definition and costs O(nodes + edges).

use super::partition::Partition;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, WeightedGraph};
use petgraph::EdgeType;

/// Modularity of `partition` on `graph`.
///
/// Directed graphs are scored on their undirected projection. A graph without
/// edge weight scores 0.0. Fails with [`Error::InvalidPartition`] if a graph
/// node is unassigned.
pub fn modularity<N: NodeId, Ty: EdgeType>(
    graph: &Graph<N, Ty>,
    partition: &Partition<N>,
    weight_key: &str,
    resolution: f64,
) -> Result<f64> {
    let labels = partition
        .labels_for(graph)
        .ok_or_else(|| Error::invalid_partition("partition does not cover every graph node"))?;
    let wg = WeightedGraph::from_graph(graph, weight_key)?;
    Ok(wg.modularity(&labels, resolution))
}
