//! Community detection algorithms for graphs.
//!
//! Given a graph, find natural groupings where nodes within groups are
//! densely connected, and connections between groups are sparse.
//!
//! ## The Modularity Objective
//!
//! Both detectors are judged by **modularity** Q, which compares the actual
//! edge weight within communities to the expected weight in a random graph
//! with the same degree sequence:
//!
//! ```text
//! Q = Σ_c [ L_c / 2m  −  γ (d_c / 2m)² ]
//! ```
//!
//! Where:
//! - 2m = sum of all node degrees
//! - L_c = twice the weight of edges inside community c (self-loops once)
//! - d_c = sum of degrees in community c
//! - γ = resolution parameter
//!
//! A self-loop counts once toward its node's degree. Directed graphs are
//! scored on their undirected projection.
//!
//! ## The Resolution Parameter γ
//!
//! - **γ = 1**: Standard modularity (default)
//! - **γ > 1**: Smaller communities (higher penalty for merging)
//! - **γ < 1**: Larger communities (lower penalty for merging)
//!
//! Modularity has a **resolution limit**: it can't detect communities smaller
//! than roughly √(2m). Increasing γ helps find fine-grained structure.
//!
//! ## Algorithms
//!
//! ### Louvain
//!
//! Greedy agglomerative optimization ([Blondel et al. 2008](https://arxiv.org/abs/0803.0476)).
//! Local moving followed by aggregation, repeated until no pass improves Q.
//! Can produce disconnected communities.
//!
//! ### Girvan-Newman
//!
//! Divisive ([Girvan & Newman 2002](https://arxiv.org/abs/cond-mat/0112110)).
//! Repeatedly removes the edges of highest betweenness, recording a level of
//! the dendrogram each time the graph splits. O(E²·V), so suited to small
//! graphs only. The level with the highest modularity is returned, and the
//! whole dendrogram is kept on the result.
//!
//! ## Usage
//!
//! ```rust
//! use cohort::community::{get_community_detector, CommunityConfig};
//! use cohort::graph::UnGraph;
//!
//! let graph = UnGraph::from_edges([(1, 2), (2, 3), (3, 4)]);
//!
//! let detector = get_community_detector("louvain", &graph).unwrap();
//! let result = detector.detect(&CommunityConfig::default()).unwrap();
//! assert_eq!(result.communities(), vec![vec![1, 2], vec![3, 4]]);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Girvan & Newman (2002). "Community structure in social and biological networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."
//! - Brandes (2001). "A faster algorithm for betweenness centrality."

mod betweenness;
mod config;
mod factory;
mod format;
mod girvan_newman;
mod louvain;
mod modularity;
mod partition;
mod result;
mod traits;


pub use config::{Budget, CommunityConfig};
pub use factory::{get_community_detector, Algorithm, BoundDetector, CommunityDetector};
pub use format::{
    format_community_result, CommunityStatistics, FormattedCommunities, FormattedLevel,
};
pub use girvan_newman::{girvan_newman_communities, GirvanNewman};
pub use louvain::{louvain_communities, Louvain};
pub use modularity::modularity;
pub use partition::{validate_communities, Partition};
pub use result::{CommunityResult, DendrogramLevel, History, PassLevel};
pub use traits::CommunityDetection;
