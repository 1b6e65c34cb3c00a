//! Domain layer: identities, connection descriptors and attribute entities
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod connections;
pub mod entities;
pub mod error;
pub mod key;

pub use connections::Connections;
pub use entities::{Area, Confluence, Entity, Point};
pub use error::{NodeError, NodeResult, WorkError};
pub use key::Key;
