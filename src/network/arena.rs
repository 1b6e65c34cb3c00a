use std::collections::HashMap;
use std::sync::Arc;

use generational_arena::{Arena, Index};
use rayon::prelude::*;
use tracing::{debug, instrument};

use super::error::{NetworkError, NetworkResult};
use crate::domain::Key;
use crate::node::{Component, NodeKind};
use crate::traversal::TreeTraverser;

/// Arena-based registry of the nodes of one drainage network.
///
/// Nodes are stored once and addressed by their key. The registry is also the
/// traverser the nodes share once it has been turned into a shared handle
/// with [`Network::into_shared`].
#[derive(Debug)]
pub struct Network {
    /// Arena storage for all nodes
    arena: Arena<Arc<dyn Component>>,
    /// Arena slot of every bound key
    index: HashMap<Key, Index>,
    /// Key of the outlet, None for empty networks
    root: Option<Key>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
            root: None,
        }
    }

    /// Bind `node` to its key.
    ///
    /// Binding is first-wins: when the key is already bound the existing node
    /// is returned and `node` is discarded.
    #[instrument(level = "trace", skip(self, node), fields(node = %node))]
    pub fn insert(&mut self, node: Arc<dyn Component>) -> NetworkResult<Arc<dyn Component>> {
        let connections = node.connections();
        let key = connections.id();
        if let Some(existing) = self.get(key) {
            debug!(%key, "key already bound, keeping existing node");
            return Ok(existing);
        }
        if connections.is_root() {
            match self.root {
                Some(root) => return Err(NetworkError::MultipleRoots(vec![root, key])),
                None => self.root = Some(key),
            }
        }
        let idx = self.arena.insert(Arc::clone(&node));
        self.index.insert(key, idx);
        Ok(node)
    }

    pub fn get(&self, key: Key) -> Option<Arc<dyn Component>> {
        self.index
            .get(&key)
            .and_then(|idx| self.arena.get(*idx))
            .cloned()
    }

    pub fn root(&self) -> Option<Key> {
        self.root
    }

    pub fn root_node(&self) -> Option<Arc<dyn Component>> {
        self.root.and_then(|root| self.get(root))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// All bound keys in ascending order.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.index.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<dyn Component>> {
        self.arena.iter().map(|(_, node)| node)
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes().filter(|node| node.kind() == kind).count()
    }

    /// Ghost nodes inserted for confluences of more than two streams.
    pub fn ghost_count(&self) -> usize {
        self.count(NodeKind::Ghost)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        match self.root {
            Some(root) => self.calculate_depth(root),
            None => 0,
        }
    }

    fn calculate_depth(&self, key: Key) -> usize {
        match self.get(key) {
            Some(node) => {
                1 + node
                    .connections()
                    .children()
                    .map(|child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Keys of every node without children, ascending.
    pub fn leaf_keys(&self) -> Vec<Key> {
        let mut leaves: Vec<Key> = self
            .nodes()
            .filter(|node| node.kind() == NodeKind::Leaf)
            .map(|node| node.id())
            .collect();
        leaves.sort();
        leaves
    }

    /// Share the network and bind it as every node's traverser.
    pub fn into_shared(self) -> NetworkResult<Arc<Network>> {
        let shared = Arc::new(self);
        let traverser: Arc<dyn TreeTraverser> = shared.clone();
        for node in shared.nodes() {
            node.set_traverser(Some(&traverser))?;
        }
        Ok(shared)
    }

    /// Re-arm every node's readiness barrier for a new simulation round.
    #[instrument(level = "debug", skip(self))]
    pub fn rearm(&self) -> NetworkResult<()> {
        let nodes: Vec<&Arc<dyn Component>> = self.nodes().collect();
        nodes
            .par_iter()
            .try_for_each(|node| node.set_new_connections(node.connections()))?;
        Ok(())
    }
}

impl TreeTraverser for Network {
    fn resolve(&self, key: Key) -> Option<Arc<dyn Component>> {
        self.get(key)
    }
}
