//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! Louvain is a multi-level, greedy modularity optimization algorithm:
//!
//! 1. **Phase 1 (Local Moving)**: Start with each node in its own community.
//!    Sweep the nodes in order, moving each to the neighboring community with
//!    the highest modularity gain, until a full sweep moves nothing.
//!
//! 2. **Phase 2 (Aggregation)**: Build a meta-graph where communities become
//!    single nodes. Edge weights are sums of edges between communities.
//!    Self-loops carry twice the internal edge weight.
//!
//! 3. **Iterate**: Repeat phases 1-2 on the meta-graph until a pass merges
//!    nothing or modularity stops improving by more than `epsilon`.
//!
//! ## Determinism
//!
//! Nodes are visited in graph insertion order (meta-nodes in community id
//! order). A node only leaves its community for a strictly better gain, and
//! equal gains go to the lowest community id. Two runs on the same input
//! produce identical partitions.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use super::config::{BudgetTracker, CommunityConfig};
use super::factory::Algorithm;
use super::partition::{validate_communities, Partition};
use super::result::{CommunityResult, History, PassLevel};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId, WeightedGraph};
use petgraph::EdgeType;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Gains closer than this are treated as equal.
const MOVE_TOLERANCE: f64 = 1e-12;

/// Meta-graph and unwound modularity must agree within this.
const TELESCOPE_TOLERANCE: f64 = 1e-9;

/// Louvain community detection algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Louvain;

impl Louvain {
    /// Create a new Louvain detector.
    pub fn new() -> Self {
        Self
    }

    /// Phase 1: Local moving on a weighted graph.
    /// Returns (canonical communities, moved).
    fn local_moving(
        graph: &WeightedGraph,
        config: &CommunityConfig,
        budget: &mut BudgetTracker,
    ) -> Result<(Vec<usize>, bool)> {
        let n = graph.n();
        if graph.total_weight <= 0.0 {
            return Ok(((0..n).collect(), false));
        }
        let m = graph.total_weight / 2.0;
        let resolution = config.resolution;

        let mut communities: Vec<usize> = (0..n).collect();
        let mut community_degrees = graph.degrees.clone();
        let mut community_weights: BTreeMap<usize, f64> = BTreeMap::new();
        let mut moved_any = false;

        for sweep in 0..config.max_sweeps {
            budget.tick()?;
            let mut moves = 0usize;

            for node in 0..n {
                let current = communities[node];
                let ki = graph.degrees[node];

                // Take the node out of its community before scoring.
                community_degrees[current] -= ki;

                community_weights.clear();
                for &(neighbor, w) in &graph.adj[node] {
                    *community_weights.entry(communities[neighbor]).or_insert(0.0) += w;
                }

                let gain = |community: usize, ki_in: f64| {
                    ki_in / m - resolution * community_degrees[community] * ki / (2.0 * m * m)
                };

                let mut best = current;
                let stay = community_weights.get(&current).copied().unwrap_or(0.0);
                let mut best_gain = gain(current, stay);
                for (&target, &ki_in) in &community_weights {
                    if target == current {
                        continue;
                    }
                    let candidate = gain(target, ki_in);
                    if candidate > best_gain + MOVE_TOLERANCE {
                        best = target;
                        best_gain = candidate;
                    }
                }

                community_degrees[best] += ki;
                if best != current {
                    communities[node] = best;
                    moves += 1;
                }
            }

            trace!(sweep, moves, "louvain sweep");
            if moves == 0 {
                break;
            }
            moved_any = true;
        }

        Ok((renumber(&communities), moved_any))
    }

    /// Phase 2: Aggregate graph based on communities.
    ///
    /// `communities` must be canonical with `k` distinct ids.
    fn aggregate(graph: &WeightedGraph, communities: &[usize], k: usize) -> WeightedGraph {
        let mut self_loops = vec![0.0; k];
        for (node, &sl) in graph.self_loops.iter().enumerate() {
            self_loops[communities[node]] += sl;
        }

        let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(i, j, w) in &graph.edges {
            let ci = communities[i];
            let cj = communities[j];
            if ci == cj {
                self_loops[ci] += 2.0 * w;
            } else {
                let key = if ci < cj { (ci, cj) } else { (cj, ci) };
                *between.entry(key).or_insert(0.0) += w;
            }
        }

        let edges = between.into_iter().map(|((i, j), w)| (i, j, w)).collect();
        WeightedGraph::from_parts(k, edges, self_loops)
    }

    /// Run passes until convergence.
    ///
    /// Returns the membership of every original node, the modularity of the
    /// final meta-graph's singleton partition, and the per-pass history as
    /// (membership, modularity).
    ///
    /// The meta-graph modularity is scored on the aggregated graph itself, so
    /// it only matches the unwound membership if aggregation preserved Q.
    fn run(
        base: &WeightedGraph,
        config: &CommunityConfig,
        budget: &mut BudgetTracker,
    ) -> Result<(Vec<usize>, f64, Vec<(Vec<usize>, f64)>)> {
        let n = base.n();
        let mut membership: Vec<usize> = (0..n).collect();
        let mut current = base.clone();
        let mut current_modularity = base.modularity(&membership, config.resolution);
        let mut history = Vec::new();

        debug!(nodes = n, modularity = current_modularity, "louvain initialized");

        loop {
            if config.max_passes.is_some_and(|max| history.len() >= max) {
                debug!(passes = history.len(), "louvain pass cap reached");
                break;
            }

            let (communities, moved) = Self::local_moving(&current, config, budget)?;
            if !moved {
                break;
            }

            let k = communities.iter().copied().max().map_or(0, |c| c + 1);
            if k == current.n() {
                break;
            }

            let modularity = current.modularity(&communities, config.resolution);
            if modularity - current_modularity < config.epsilon {
                debug!(
                    modularity,
                    previous = current_modularity,
                    "louvain modularity gain below epsilon"
                );
                break;
            }

            for m in membership.iter_mut() {
                *m = communities[*m];
            }
            current_modularity = modularity;
            history.push((membership.clone(), modularity));

            debug!(
                pass = history.len(),
                nodes = current.n(),
                communities = k,
                modularity,
                "louvain pass aggregated"
            );
            current = Self::aggregate(&current, &communities, k);
        }

        let singletons: Vec<usize> = (0..current.n()).collect();
        let meta_modularity = current.modularity(&singletons, config.resolution);
        debug!(
            meta_modularity,
            last_pass = current_modularity,
            "louvain finished aggregating"
        );
        Ok((membership, meta_modularity, history))
    }
}

impl CommunityDetection for Louvain {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Louvain
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
            return Ok(CommunityResult::new(
                Algorithm::Louvain,
                Partition::empty(),
                0.0,
                History::Passes(Vec::new()),
            ));
        }

        let base = WeightedGraph::from_graph(graph, &config.weight_key)?;
        let mut budget = BudgetTracker::new(Algorithm::Louvain.as_str(), config.budget);
        let (membership, meta_modularity, history) = Self::run(&base, config, &mut budget)?;

        // Aggregation preserves modularity, so the unwound partition must
        // score the same on the input graph.
        let modularity = base.modularity(&membership, config.resolution);
        if (modularity - meta_modularity).abs() > TELESCOPE_TOLERANCE * modularity.abs().max(1.0) {
            return Err(Error::invalid_partition(format!(
                "modularity {modularity} on the input graph differs from \
                 {meta_modularity} on the aggregated graph"
            )));
        }

        let partition = Partition::from_labels(graph, &membership);
        validate_communities(graph, &partition)?;

        let passes = history
            .into_iter()
            .map(|(labels, modularity)| PassLevel {
                partition: Partition::from_labels(graph, &labels),
                modularity,
            })
            .collect();

        debug!(
            communities = partition.num_communities(),
            modularity,
            sweeps = budget.iterations(),
            "louvain converged"
        );
        Ok(CommunityResult::new(
            Algorithm::Louvain,
            partition,
            modularity,
            History::Passes(passes),
        ))
    }
}

/// Run Louvain on `graph`.
pub fn louvain_communities<N: NodeId, Ty: EdgeType>(
    graph: &Graph<N, Ty>,
    config: &CommunityConfig,
) -> Result<CommunityResult<N>> {
    Louvain::new().detect(graph, config)
}

/// Renumber communities to consecutive integers in order of first appearance.
fn renumber(assignment: &[usize]) -> Vec<usize> {
    let mut mapping = vec![usize::MAX; assignment.len()];
    let mut next = 0;
    assignment
        .iter()
        .map(|&c| {
            if mapping[c] == usize::MAX {
                mapping[c] = next;
                next += 1;
            }
            mapping[c]
        })
        .collect()
}
