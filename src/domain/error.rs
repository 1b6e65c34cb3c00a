//! Core node errors (no external dependencies)

use thiserror::Error;

use super::key::Key;

/// Failure reported by a unit of work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkError {
    #[error("unit of work was interrupted")]
    Interrupted,

    #[error("unit of work failed: {0}")]
    Failed(String),
}

/// Precondition failures of the node capability set.
///
/// All of them are local and synchronous: nothing is retried and the node's
/// state is left as it was before the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("invalid connections for node {node}: {reason}")]
    InvalidConnection { node: Key, reason: String },

    #[error("node {node} is not connected with parent {}", fmt_key(.found))]
    DisconnectedParent {
        node: Key,
        expected: Option<Key>,
        found: Option<Key>,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node {node} has no children, only a leaf can have no children")]
    StructuralInconsistency { node: Key },

    #[error("node {node} is still waiting for children {pending:?}")]
    NotReady { node: Key, pending: Vec<Key> },

    #[error("simulation of node {node} did not complete")]
    Work {
        node: Key,
        #[source]
        source: WorkError,
    },
}

fn fmt_key(key: &Option<Key>) -> String {
    key.map(|k| k.to_string()).unwrap_or_else(|| "none".into())
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;
