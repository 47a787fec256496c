use thiserror::Error;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the graph model and the community detectors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A detector produced a partition that failed validation.
    ///
    /// This is always a logic bug inside the detector and is never repaired.
    #[error("invalid partition: {reason}")]
    InvalidPartition {
        /// What the validator rejected.
        reason: String,
    },

    /// The requested algorithm is not registered.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Strict mode was requested and the graph has no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// A caller-imposed iteration or time budget ran out.
    #[error("{algorithm} exceeded its budget: {limit}")]
    BudgetExceeded {
        /// Algorithm that was running.
        algorithm: &'static str,
        /// The limit that was hit.
        limit: String,
    },

    /// An edge weight attribute is not a finite, non-negative number.
    #[error("invalid edge weight under '{key}': {value}")]
    InvalidWeight {
        /// Attribute name used as weight.
        key: String,
        /// Offending value, rendered.
        value: String,
    },

    /// A formatted result could not be rendered as JSON.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_partition(reason: impl Into<String>) -> Self {
        Error::InvalidPartition {
            reason: reason.into(),
        }
    }
}
