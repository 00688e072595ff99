//! Error taxonomy for graph mutation and queries.
//!
//! Every failure here is a caller-contract violation, not a transient
//! condition. Checks that reject a mutation run to completion before any
//! state changes, so an `Err` always leaves the graph exactly as it was.

use std::fmt;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DuplicateKey,
    CycleDetected,
    NodeNotFound,
    InvalidArgument,
    TypeMismatch,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DuplicateKey => "E2001",
            Self::CycleDetected => "E2002",
            Self::NodeNotFound => "E2003",
            Self::InvalidArgument => "E4001",
            Self::TypeMismatch => "E4002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DuplicateKey => "Node key already present",
            Self::CycleDetected => "Cycle would be created",
            Self::NodeNotFound => "Node not found",
            Self::InvalidArgument => "Required argument missing",
            Self::TypeMismatch => "Payload lacks satisfiability check",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DuplicateKey => Some("Remove the existing node first or pick a fresh key."),
            Self::CycleDetected => {
                Some("Drop the outgoing edge that closes the reported path to keep the graph acyclic.")
            }
            Self::NodeNotFound => None,
            Self::InvalidArgument => Some("Pass an explicit (possibly empty) root collection."),
            Self::TypeMismatch => {
                Some("Store payloads of the type the query is evaluated against.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors returned by [`Dag`](crate::graph::Dag) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DagError<K: fmt::Debug> {
    /// A node with this key is already in the graph.
    #[error("node already exists: {0:?}")]
    DuplicateKey(K),

    /// Admitting the node would close a cycle.
    ///
    /// `path` starts and ends at `key`: `key → d → … → p → key`.
    #[error("adding node {key:?} would create a cycle: {path:?}")]
    CycleDetected { key: K, path: Vec<K> },

    /// The operation requires a node that is not present.
    #[error("node not found: {0:?}")]
    NodeNotFound(K),

    /// A required argument was not supplied.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The payload stored under this key cannot be evaluated for
    /// satisfiability.
    #[error("payload for node {0:?} does not expose a satisfiability check")]
    TypeMismatch(K),
}

impl<K: fmt::Debug> DagError<K> {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateKey(_) => ErrorCode::DuplicateKey,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::NodeNotFound(_) => ErrorCode::NodeNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::TypeMismatch(_) => ErrorCode::TypeMismatch,
        }
    }
}
