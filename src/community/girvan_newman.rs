//! Girvan-Newman divisive community detection.
//!
//! Repeatedly removes the edges with the highest betweenness from a private
//! working copy of the graph. Each time the number of connected components
//! grows, the components become a new dendrogram level. The level with the
//! highest modularity on the input graph is the reported partition; the full
//! dendrogram is kept for callers who want a different granularity.
//!
//! ## Ties
//!
//! All edges whose betweenness equals the maximum (within a relative
//! tolerance of 1e-9) are removed in the same round, in edge insertion order.
//!
//! ## Weighted Betweenness
//!
//! With `use_weighted_betweenness`, edge weights are path lengths and every
//! edge of the undirected projection must weigh more than zero. A zero-length
//! edge fails the run with [`Error::InvalidWeight`].
//!
//! ## Complexity
//!
//! Betweenness is recomputed after every round: O(E · V) per round and
//! O(E² · V) in the worst case. This is inherent to the method and limits it
//! to graphs of a few thousand edges. Use a [`Budget`](super::config::Budget)
//! to bound runtime.
//!
//! ## References
//!
//! Girvan & Newman (2002). "Community structure in social and biological
//! networks." PNAS 99(12), 7821-7826.

use super::betweenness::EdgeArena;
use super::config::{BudgetTracker, CommunityConfig};
use super::factory::Algorithm;
use super::partition::{validate_communities, Partition};
use super::result::{CommunityResult, DendrogramLevel, History};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, WeightedGraph};
use petgraph::EdgeType;
use tracing::{debug, trace, warn};

/// Relative tolerance when collecting edges tied at the maximum betweenness.
const TIE_TOLERANCE: f64 = 1e-9;

/// Girvan-Newman community detection algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct GirvanNewman;

/// One recorded split, in working-graph positions.
struct Split {
    labels: Vec<usize>,
    removed: Vec<(usize, usize)>,
    modularity: f64,
}

impl GirvanNewman {
    /// Create a new Girvan-Newman detector.
    pub fn new() -> Self {
        Self
    }

    /// Remove edges until none remain, recording each split.
    fn divide(
        base: &WeightedGraph,
        config: &CommunityConfig,
        budget: &mut BudgetTracker,
    ) -> Result<Vec<Split>> {
        let mut working = EdgeArena::from_weighted(base);
        let (labels, mut components) = working.components();
        let mut splits = vec![Split {
            modularity: base.modularity(&labels, config.resolution),
            labels,
            removed: Vec::new(),
        }];
        debug!(
            nodes = working.n(),
            edges = working.live_edges(),
            components,
            "girvan-newman initialized"
        );

        let mut pending: Vec<(usize, usize)> = Vec::new();
        while working.live_edges() > 0 {
            budget.tick()?;

            let scores = working.edge_betweenness(config.use_weighted_betweenness);
            let max = (0..scores.len())
                .filter(|&id| working.endpoints(id).is_some())
                .map(|id| scores[id])
                .fold(f64::NEG_INFINITY, f64::max);
            let cutoff = max - TIE_TOLERANCE * max.abs().max(1.0);

            let doomed: Vec<usize> = (0..scores.len())
                .filter(|&id| working.endpoints(id).is_some() && scores[id] >= cutoff)
                .collect();
            for &id in &doomed {
                if let Some(endpoints) = working.endpoints(id) {
                    pending.push(endpoints);
                }
                working.remove(id);
            }
            trace!(
                removed = doomed.len(),
                betweenness = max,
                remaining = working.live_edges(),
                "girvan-newman round"
            );

            let (labels, count) = working.components();
            if count > components {
                components = count;
                let modularity = base.modularity(&labels, config.resolution);
                debug!(level = splits.len(), components, modularity, "girvan-newman split");
                splits.push(Split {
                    labels,
                    removed: std::mem::take(&mut pending),
                    modularity,
                });
            }
        }

        Ok(splits)
    }
}

impl CommunityDetection for GirvanNewman {
    fn algorithm(&self) -> Algorithm {
        Algorithm::GirvanNewman
    }

    fn detect<N: NodeId, Ty: EdgeType>(
        &self,
        graph: &Graph<N, Ty>,
        config: &CommunityConfig,
    ) -> Result<CommunityResult<N>> {
        config.validate()?;
        if graph.node_count() == 0 {
            if config.require_nodes {
                return Err(Error::EmptyGraph);
            }
            let level = DendrogramLevel {
                partition: Partition::empty(),
                removed_edges: Vec::new(),
                modularity: 0.0,
            };
            return Ok(CommunityResult::new(
                Algorithm::GirvanNewman,
                Partition::empty(),
                0.0,
                History::Dendrogram(vec![level]),
            ));
        }

        let base = WeightedGraph::from_graph(graph, &config.weight_key)?;
        if config.use_weighted_betweenness {
            reject_zero_lengths(&base, &config.weight_key)?;
        }
        let mut budget = BudgetTracker::new(Algorithm::GirvanNewman.as_str(), config.budget);
        let splits = Self::divide(&base, config, &mut budget)?;

        let node = |position: usize| {
            graph.node_at(position).cloned().ok_or_else(|| {
                Error::invalid_partition(format!("working graph position {position} has no node"))
            })
        };

        let mut levels = Vec::with_capacity(splits.len());
        for split in splits {
            let removed_edges = split
                .removed
                .iter()
                .map(|&(i, j)| -> Result<(N, N)> { Ok((node(i)?, node(j)?)) })
                .collect::<Result<Vec<_>>>()?;
            let partition = Partition::from_labels(graph, &split.labels);
            validate_communities(graph, &partition)?;
            levels.push(DendrogramLevel {
                partition,
                removed_edges,
                modularity: split.modularity,
            });
        }

        // Highest modularity wins; the earlier, coarser level wins ties.
        let mut best = 0;
        for (idx, level) in levels.iter().enumerate().skip(1) {
            if level.modularity > levels[best].modularity {
                best = idx;
            }
        }
        let partition = levels[best].partition.clone();
        let modularity = levels[best].modularity;

        debug!(
            levels = levels.len(),
            best_level = best,
            communities = partition.num_communities(),
            modularity,
            rounds = budget.iterations(),
            "girvan-newman finished"
        );
        Ok(CommunityResult::new(
            Algorithm::GirvanNewman,
            partition,
            modularity,
            History::Dendrogram(levels),
        ))
    }
}

/// Weighted betweenness reads weights as path lengths, which must be positive.
fn reject_zero_lengths(base: &WeightedGraph, weight_key: &str) -> Result<()> {
    match base.edges.iter().find(|&&(_, _, w)| w <= 0.0) {
        Some(&(_, _, w)) => {
            warn!(key = weight_key, weight = w, "zero-length edge in weighted betweenness");
            Err(Error::InvalidWeight {
                key: weight_key.to_string(),
                value: w.to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Run Girvan-Newman on `graph`.
pub fn girvan_newman_communities<N: NodeId, Ty: EdgeType>(
    graph: &Graph<N, Ty>,
    config: &CommunityConfig,
) -> Result<CommunityResult<N>> {
    GirvanNewman::new().detect(graph, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::config::Budget;
    use crate::graph::{DiGraph, UnGraph};
    use std::time::Duration;

    fn two_triangles() -> UnGraph<u32> {
        UnGraph::from_edges([(1, 2), (2, 3), (1, 3), (4, 5), (5, 6), (4, 6)])
    }

    #[test]
    fn test_path_first_removal_is_middle_edge() {
        let graph = UnGraph::from_edges([(1, 2), (2, 3), (3, 4)]);
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        let levels = result.dendrogram().unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].partition.num_communities(), 1);
        assert!(levels[0].removed_edges.is_empty());
        assert_eq!(levels[1].removed_edges, vec![(2, 3)]);
        assert_eq!(levels[1].partition.communities(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(levels[2].partition.num_communities(), 4);
        assert_eq!(levels[2].removed_edges, vec![(1, 2), (3, 4)]);

        assert_eq!(result.communities(), vec![vec![1, 2], vec![3, 4]]);
        assert!((result.modularity() - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_triangles_start_split() {
        let result = girvan_newman_communities(&two_triangles(), &CommunityConfig::default())
            .unwrap();
        let levels = result.dendrogram().unwrap();

        assert_eq!(levels[0].partition.num_communities(), 2);
        assert!(levels
            .iter()
            .all(|level| level.partition.num_communities() >= 2));
        assert_eq!(levels.last().unwrap().partition.num_communities(), 6);
        assert_eq!(result.communities(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert!((result.modularity() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bridged_cliques_cut_at_bridge() {
        let graph = UnGraph::from_edges([
            ("a0", "a1"),
            ("a1", "a2"),
            ("a0", "a2"),
            ("b0", "b1"),
            ("b1", "b2"),
            ("b0", "b2"),
            ("a2", "b0"),
        ]);
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        let levels = result.dendrogram().unwrap();

        assert_eq!(levels[1].removed_edges, vec![("a2", "b0")]);
        assert_eq!(result.num_communities(), 2);
        assert_eq!(result.partition().get(&"a0"), result.partition().get(&"a2"));
        assert_ne!(result.partition().get(&"a0"), result.partition().get(&"b0"));
    }

    #[test]
    fn test_component_counts_never_decrease() {
        let graph = UnGraph::from_edges([
            (0, 1),
            (1, 2),
            (2, 0),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 3),
            (5, 6),
            (6, 7),
        ]);
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        let levels = result.dendrogram().unwrap();

        for pair in levels.windows(2) {
            assert!(pair[1].partition.num_communities() > pair[0].partition.num_communities());
        }
        assert_eq!(levels.last().unwrap().partition.num_communities(), 8);
        let removed: usize = levels.iter().map(|l| l.removed_edges.len()).sum();
        assert_eq!(removed, graph.edge_count());
    }

    #[test]
    fn test_edgeless_graph_single_level() {
        let mut graph = UnGraph::new_undirected();
        graph.add_node("x");
        graph.add_node("y");
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        let levels = result.dendrogram().unwrap();

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].partition.num_communities(), 2);
        assert_eq!(levels[0].modularity, 0.0);
        assert_eq!(result.modularity(), 0.0);
    }

    #[test]
    fn test_empty_graph() {
        let graph = UnGraph::<u32>::new_undirected();
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        assert!(result.partition().is_empty());
        assert_eq!(result.modularity(), 0.0);
        assert_eq!(result.dendrogram().unwrap().len(), 1);

        let strict = CommunityConfig::default().with_require_nodes(true);
        assert_eq!(
            girvan_newman_communities(&graph, &strict).unwrap_err(),
            Error::EmptyGraph
        );
    }

    #[test]
    fn test_input_graph_untouched() {
        let graph = two_triangles();
        let before = graph.edge_count();
        let _ = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        assert_eq!(graph.edge_count(), before);
    }

    #[test]
    fn test_level_with_communities() {
        let graph = UnGraph::from_edges([(1, 2), (2, 3), (3, 4)]);
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();

        assert_eq!(result.level_with_communities(1).unwrap().partition.num_communities(), 1);
        assert_eq!(result.level_with_communities(2).unwrap().partition.num_communities(), 2);
        assert_eq!(result.level_with_communities(3).unwrap().partition.num_communities(), 4);
        assert!(result.level_with_communities(5).is_none());
    }

    #[test]
    fn test_weighted_betweenness_changes_first_cut() {
        // Triangle 1-2-3 where 1-3 is long; weighted paths avoid it.
        let graph = UnGraph::from_weighted_edges([
            (1, 2, 1.0),
            (2, 3, 1.0),
            (1, 3, 5.0),
            (3, 4, 1.0),
        ])
        .unwrap();

        let unweighted = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        assert_eq!(unweighted.dendrogram().unwrap()[1].removed_edges, vec![(3, 4)]);

        let config = CommunityConfig::default().with_weighted_betweenness(true);
        let weighted = girvan_newman_communities(&graph, &config).unwrap();
        let levels = weighted.dendrogram().unwrap();
        // 2-3 carries every weighted shortest path from 1 to 3 and 4.
        assert_eq!(levels[1].removed_edges[0], (2, 3));
    }

    #[test]
    fn test_directed_input_uses_projection() {
        let graph = DiGraph::from_edges([(1, 2), (2, 1), (2, 3), (3, 4)]);
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        assert_eq!(result.dendrogram().unwrap().last().unwrap().partition.num_communities(), 4);
    }

    #[test]
    fn test_budget_exceeded() {
        let graph = UnGraph::from_edges([(1, 2), (2, 3), (3, 4)]);
        let config = CommunityConfig::default().with_budget(Budget::iterations(1));
        assert!(matches!(
            girvan_newman_communities(&graph, &config),
            Err(Error::BudgetExceeded {
                algorithm: "girvan_newman",
                ..
            })
        ));
    }

    #[test]
    fn test_time_budget_exceeded() {
        let config = CommunityConfig::default().with_budget(Budget::duration(Duration::ZERO));
        assert!(matches!(
            girvan_newman_communities(&two_triangles(), &config),
            Err(Error::BudgetExceeded {
                algorithm: "girvan_newman",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_length_edge_rejected_for_weighted_betweenness() {
        let graph = UnGraph::from_weighted_edges([(0, 2, 2.0), (0, 3, 0.0), (2, 3, 2.0)]).unwrap();

        let config = CommunityConfig::default().with_weighted_betweenness(true);
        assert_eq!(
            girvan_newman_communities(&graph, &config).unwrap_err(),
            Error::InvalidWeight {
                key: "weight".to_string(),
                value: "0".to_string(),
            }
        );

        // Hop counts ignore weights, so the same graph is fine unweighted.
        let result = girvan_newman_communities(&graph, &CommunityConfig::default()).unwrap();
        assert_eq!(result.dendrogram().unwrap().last().unwrap().partition.num_communities(), 3);
    }

    #[test]
    fn test_deterministic() {
        let graph = UnGraph::from_edges([
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 3),
            (3, 4),
            (3, 5),
            (4, 5),
            (1, 4),
        ]);
        let config = CommunityConfig::default();
        let a = girvan_newman_communities(&graph, &config).unwrap();
        let b = girvan_newman_communities(&graph, &config).unwrap();
        assert_eq!(a, b);
    }
}
