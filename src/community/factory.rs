//! Algorithm registry and name-based detector selection.

use super::config::CommunityConfig;
use super::girvan_newman::GirvanNewman;
use super::louvain::Louvain;
use super::result::CommunityResult;
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use petgraph::EdgeType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registered community detection algorithms.
///
/// The registry is closed: names are matched exactly and case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Modularity-optimizing agglomerative clustering.
    #[serde(rename = "louvain")]
    Louvain,
    /// Edge-betweenness divisive clustering.
    #[serde(rename = "girvan_newman")]
    GirvanNewman,
}

impl Algorithm {
    /// Every registered algorithm.
    pub const ALL: [Algorithm; 2] = [Algorithm::Louvain, Algorithm::GirvanNewman];

    /// Registry name.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Louvain => "louvain",
            Algorithm::GirvanNewman => "girvan_newman",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == name)
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))
    }
}

/// A detector for one of the registered algorithms.
#[derive(Debug, Clone, Copy)]
pub enum CommunityDetector {
    /// Louvain.
    Louvain(Louvain),
    /// Girvan-Newman.
    GirvanNewman(GirvanNewman),
}

impl CommunityDetector {
    /// Detector for `algorithm`.
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Louvain => CommunityDetector::Louvain(Louvain::new()),
            Algorithm::GirvanNewman => CommunityDetector::GirvanNewman(GirvanNewman::new()),
        }
    }
}

impl From<Algorithm> for CommunityDetector {
    fn from(algorithm: Algorithm) -> Self {
        Self::new(algorithm)
    }
}

impl CommunityDetection for CommunityDetector {
    fn algorithm(&self) -> Algorithm {
        match self {
            CommunityDetector::Louvain(d) => d.algorithm(),
            CommunityDetector::GirvanNewman(d) => d.algorithm(),
        }
    }

    fn detect<N: NodeId, Ty: EdgeType>(
        &self,
        graph: &Graph<N, Ty>,
        config: &CommunityConfig,
    ) -> Result<CommunityResult<N>> {
        match self {
            CommunityDetector::Louvain(d) => d.detect(graph, config),
            CommunityDetector::GirvanNewman(d) => d.detect(graph, config),
        }
    }
}

/// A detector paired with the graph it will run on.
#[derive(Clone)]
pub struct BoundDetector<'g, N, Ty> {
    detector: CommunityDetector,
    graph: &'g Graph<N, Ty>,
}

impl<N: fmt::Debug, Ty: EdgeType> fmt::Debug for BoundDetector<'_, N, Ty> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundDetector")
            .field("detector", &self.detector)
            .field("graph", self.graph)
            .finish()
    }
}

impl<'g, N: NodeId, Ty: EdgeType> BoundDetector<'g, N, Ty> {
    /// Algorithm this detector runs.
    pub fn algorithm(&self) -> Algorithm {
        self.detector.algorithm()
    }

    /// Graph this detector reads.
    pub fn graph(&self) -> &'g Graph<N, Ty> {
        self.graph
    }

    /// Run the detector.
    pub fn detect(&self, config: &CommunityConfig) -> Result<CommunityResult<N>> {
        self.detector.detect(self.graph, config)
    }
}

/// Select a detector by registry name (`"louvain"` or `"girvan_newman"`).
///
/// Fails with [`Error::UnknownAlgorithm`] for any other name.
pub fn get_community_detector<'g, N: NodeId, Ty: EdgeType>(
    algorithm: &str,
    graph: &'g Graph<N, Ty>,
) -> Result<BoundDetector<'g, N, Ty>> {
    let algorithm: Algorithm = algorithm.parse()?;
    Ok(BoundDetector {
        detector: CommunityDetector::new(algorithm),
        graph,
    })
}
