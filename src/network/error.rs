//! Network composition errors (wraps node errors)

use thiserror::Error;

use crate::domain::{Key, NodeError};

/// Errors raised while composing a drainage network from its description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("{0}")]
    Node(#[from] NodeError),

    #[error("subbasin {0} is declared more than once")]
    DuplicateKey(Key),

    #[error("subbasin {node} drains into unknown subbasin {parent}")]
    UnknownParent { node: Key, parent: Key },

    #[error("network has no outlet: every subbasin declares a parent")]
    MissingRoot,

    #[error("network has several outlets: {0:?}")]
    MultipleRoots(Vec<Key>),

    #[error("subbasin {0} cannot be reached from the outlet")]
    Unreachable(Key),

    #[error("no free key left above subbasin {0} for a ghost node")]
    KeySpaceExhausted(Key),

    #[error("invalid network description: {message}")]
    Parse { message: String },
}

/// Result type for network composition.
pub type NetworkResult<T> = Result<T, NetworkError>;
