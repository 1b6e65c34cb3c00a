//! Network composition: turns a flat list of subbasins into a binary tree of
//! nodes and serves as the traverser those nodes share.
//!
//! Composing a network never runs it; driving a simulation round is left to
//! the caller.

pub mod arena;
pub mod builder;
pub mod description;
pub mod error;
pub mod render;

pub use arena::Network;
pub use builder::NetworkBuilder;
pub use description::{NetworkDescription, SubbasinRecord};
pub use error::{NetworkError, NetworkResult};
pub use render::TreeNodeConvert;
