//! # cohort
//!
//! Community detection on in-memory graphs: Louvain and Girvan-Newman behind
//! one result contract.
//!
//! Build a [`graph::Graph`] keyed by your own node identifiers, pick a
//! detector by name with [`get_community_detector`], and read back a
//! validated [`Partition`] with its modularity. [`format_community_result`]
//! turns a result into a stable, serializable shape.
//!
//! The `parallel` feature spreads edge-betweenness computation across
//! threads with rayon. Results are identical with and without it.

pub mod community;
/// Error types used across `cohort`.
pub mod error;
pub mod graph;

pub use community::{
    format_community_result, get_community_detector, girvan_newman_communities,
    louvain_communities, modularity, validate_communities, Algorithm, Budget, CommunityConfig,
    CommunityDetection, CommunityDetector, CommunityResult, FormattedCommunities, GirvanNewman,
    Louvain, Partition,
};
pub use error::{Error, Result};
pub use graph::{DiGraph, Graph, UnGraph};
