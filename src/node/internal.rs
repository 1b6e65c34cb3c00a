//! Subbasins fed by one or two upstream subbasins

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::readiness::ReadinessMap;
use super::shared::NodeCore;
use super::{Component, NodeKind, NodeOptions};
use crate::domain::{Area, Connections, Entity, Key, NodeResult, Point};
use crate::traversal::TreeTraverser;

/// Subbasin of the binary drainage tree.
///
/// An internal node may simulate only after each of its children notified it;
/// the children are tracked in a [`ReadinessMap`] re-armed on every
/// connection swap.
#[derive(Debug)]
pub struct InternalNode {
    core: NodeCore,
    entity: Area,
}

impl InternalNode {
    /// One or two children; a childless internal node is a modeling error.
    pub fn admits(children: usize) -> bool {
        (1..=2).contains(&children)
    }

    pub fn new(connections: Connections, entity: Area) -> NodeResult<Self> {
        Self::with_options(connections, entity, NodeOptions::default())
    }

    pub fn with_options(
        connections: Connections,
        entity: Area,
        options: NodeOptions,
    ) -> NodeResult<Self> {
        let core = NodeCore::bind(NodeKind::Internal, Self::admits, connections, options)?;
        Ok(Self { core, entity })
    }

    pub fn entity(&self) -> &Area {
        &self.entity
    }
}

impl Component for InternalNode {
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

impl fmt::Display for InternalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core.describe(f)
    }
}
