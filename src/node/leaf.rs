//! Subbasins without upstream contributions

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::readiness::ReadinessMap;
use super::shared::NodeCore;
use super::{Component, NodeKind, NodeOptions};
use crate::domain::{Connections, Entity, Key, NodeResult, Point};
use crate::traversal::TreeTraverser;

/// Headwater subbasin: no children, hence always ready to simulate.
#[derive(Debug)]
pub struct Leaf {
    core: NodeCore,
    entity: Arc<dyn Entity>,
}

impl Leaf {
    /// A leaf admits no children.
    pub fn admits(children: usize) -> bool {
        children == 0
    }

    pub fn new(connections: Connections, entity: Arc<dyn Entity>) -> NodeResult<Self> {
        Self::with_options(connections, entity, NodeOptions::default())
    }

    pub fn with_options(
        connections: Connections,
        entity: Arc<dyn Entity>,
        options: NodeOptions,
    ) -> NodeResult<Self> {
        let core = NodeCore::bind(NodeKind::Leaf, Self::admits, connections, options)?;
        Ok(Self { core, entity })
    }
}

impl Component for Leaf {
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
        true
    }

    fn readiness(&self) -> Option<ReadinessMap> {
        None
    }

    // Leaves are never parents; accepted and ignored.
    fn notify(&self, child: Key) {
        self.core.notify(child)
    }

    fn await_readiness(&self, _timeout: Option<Duration>) -> bool {
        true
    }

    fn run_simulation(&self, parent: Option<&dyn Component>) -> NodeResult<()> {
        self.core.run_simulation(parent)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.core.describe(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Area, NodeError};

    fn entity() -> Arc<dyn Entity> {
        Arc::new(Area::new(Point::new(0.0, 1.0, 10.0), Point::new(0.0, 0.0, 5.0), 2.5))
    }

    #[test]
    fn given_new_leaf_when_checking_readiness_then_ready() {
        let leaf = Leaf::new(Connections::leaf(Key::new(2), Some(Key::new(1))).unwrap(), entity()).unwrap();
        assert!(leaf.is_ready_for_simulation());
        assert!(leaf.readiness().is_none());
        assert_eq!(leaf.start_point(), Point::new(0.0, 1.0, 10.0));
    }

    #[test]
    fn given_children_when_creating_leaf_then_invalid_connection() {
        let conns = Connections::with_children(Key::new(2), Some(Key::new(1)), &[Key::new(3)]).unwrap();
        let result = Leaf::new(conns, entity());
        assert!(matches!(result, Err(NodeError::InvalidConnection { .. })));
    }

    #[test]
    fn given_leaf_when_notified_then_stays_ready_without_map() {
        let leaf = Leaf::new(Connections::leaf(Key::new(2), Some(Key::new(1))).unwrap(), entity()).unwrap();
        leaf.notify(Key::new(9));
        assert!(leaf.is_ready_for_simulation());
        assert!(leaf.readiness().is_none());
    }

    #[test]
    fn given_leaf_when_displaying_then_names_variant_and_identity() {
        let leaf = Leaf::new(Connections::leaf(Key::new(2), Some(Key::new(1))).unwrap(), entity()).unwrap();
        assert_eq!(leaf.to_string(), "Leaf ==> ID = 2 PARENT = 1 CHILDREN = []");
    }
}
