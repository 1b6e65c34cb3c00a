//! Concurrent binary tree of subbasins evaluated bottom-up.
//!
//! A river drainage network is modeled as a tree of nodes: a node may run its
//! simulation step only after all of its children finished theirs. Children
//! report completion to their parent by key, and the parent's readiness
//! barrier flips once every child has reported.

use std::path::Path;
use std::sync::Arc;

use tracing::instrument;

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod exitcode;
pub mod network;
pub mod node;
pub mod traversal;
pub mod util;

use crate::config::Settings;
use crate::errors::{AppError, AppResult};
use crate::network::{Network, NetworkBuilder, NetworkDescription};

/// Read a network description from a TOML file.
#[instrument(level = "debug")]
pub fn load_description(path: &Path) -> AppResult<NetworkDescription> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AppError::io("read network", path, e))?;
    Ok(NetworkDescription::from_toml_str(&content)?)
}

/// Compose the network described in `path` and bind it as its nodes' traverser.
#[instrument(level = "debug", skip(settings))]
pub fn compose(path: &Path, settings: &Settings) -> AppResult<Arc<Network>> {
    let description = load_description(path)?;
    let network = NetworkBuilder::new(settings.node_options()).build(&description)?;
    Ok(network.into_shared()?)
}
