//! Ghost nodes: binary re-expression of confluences with more than two streams

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::readiness::ReadinessMap;
use super::shared::NodeCore;
use super::{Component, NodeKind, NodeOptions};
use crate::domain::{Connections, Entity, Key, NodeResult, Point};
use crate::traversal::TreeTraverser;

/// Junction inserted where more than two streams meet.
///
/// A junction of three streams is outlined as one stream plus a ghost node
/// into which the other two flow; larger junctions nest further ghosts. The
/// ghost behaves exactly like an [`InternalNode`](super::InternalNode): it
/// waits for its one or two children and then notifies its parent.
#[derive(Debug)]
pub struct GhostNode {
    core: NodeCore,
    entity: Arc<dyn Entity>,
}

impl GhostNode {
    pub fn admits(children: usize) -> bool {
        (1..=2).contains(&children)
    }

    pub fn new(connections: Connections, entity: Arc<dyn Entity>) -> NodeResult<Self> {
        Self::with_options(connections, entity, NodeOptions::default())
    }

    pub fn with_options(
        connections: Connections,
        entity: Arc<dyn Entity>,
        options: NodeOptions,
    ) -> NodeResult<Self> {
        let core = NodeCore::bind(NodeKind::Ghost, Self::admits, connections, options)?;
        Ok(Self { core, entity })
    }

    pub fn entity(&self) -> Arc<dyn Entity> {
        Arc::clone(&self.entity)
    }
}

impl Component for GhostNode {
    fn kind(&self) -> NodeKind {
        self.core.kind()
    }

    fn connections(&self) -> Connections {
        self.core.connections()
    }

    fn set_new_connections(&self, connections: Connections) -> NodeResult<()> {
        self.core.set_new_connections(connections)
    }

    fn start_point(&self) -> Point {
        self.entity.start_point()
    }

    fn end_point(&self) -> Point {
        self.entity.end_point()
    }

    fn set_traverser(&self, traverser: Option<&Arc<dyn TreeTraverser>>) -> NodeResult<()> {
        self.core.set_traverser(traverser)
    }

    fn pre_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>> {
        self.core.pre_order_traversal()
    }

    fn post_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>> {
        self.core.post_order_traversal()
    }

    fn is_ready_for_simulation(&self) -> bool {
        self.core.is_ready_for_simulation()
    }

    fn readiness(&self) -> Option<ReadinessMap> {
        self.core.readiness()
    }

    fn notify(&self, child: Key) {
        self.core.notify(child)
    }

    fn await_readiness(&self, timeout: Option<Duration>) -> bool {
        self.core.await_readiness(timeout)
    }

    fn run_simulation(&self, parent: Option<&dyn Component>) -> NodeResult<()> {
        self.core.run_simulation(parent)
    }
}

impl fmt::Display for GhostNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core.describe(f)
    }
}
