//! Tree node variants and their readiness-synchronization protocol
//!
//! Every node of the drainage network is one of three variants sharing the
//! [`Component`] capability set:
//!
//! - [`Leaf`]: no children, always ready.
//! - [`InternalNode`]: one or two children, carries an [`Area`](crate::domain::Area).
//! - [`GhostNode`]: one or two children, carries a generic entity. Ghosts let
//!   a confluence of more than two streams be expressed as nested binary joins.
//!
//! Children report completion to their parent with [`Component::notify`]; a
//! parent may run its own step only when [`Component::is_ready_for_simulation`]
//! holds.

mod shared;
pub mod ghost;
pub mod internal;
pub mod leaf;
pub mod readiness;
pub mod work;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{Connections, Key, NodeResult, Point};
use crate::traversal::TreeTraverser;

pub use ghost::GhostNode;
pub use internal::InternalNode;
pub use leaf::Leaf;
pub use readiness::ReadinessMap;
pub use work::{Delay, UnitOfWork};

/// Variant tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf,
    Internal,
    Ghost,
}

impl NodeKind {
    pub fn has_children(self) -> bool {
        !matches!(self, NodeKind::Leaf)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Leaf => "Leaf",
            NodeKind::Internal => "Node",
            NodeKind::Ghost => "GhostNode",
        };
        f.write_str(name)
    }
}

/// How long a node holds its state lock while performing its unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockScope {
    /// Lock only around state reads and writes; the unit of work runs unlocked.
    #[default]
    Narrow,
    /// Hold the lock for the whole unit of work, serializing every other
    /// operation on the node while it computes.
    Exclusive,
}

/// Construction-time collaborators shared by all variants.
#[derive(Clone)]
pub struct NodeOptions {
    pub work: Arc<dyn UnitOfWork>,
    pub lock_scope: LockScope,
}

impl NodeOptions {
    pub fn new(work: Arc<dyn UnitOfWork>, lock_scope: LockScope) -> Self {
        Self { work, lock_scope }
    }

    pub fn with_work(mut self, work: Arc<dyn UnitOfWork>) -> Self {
        self.work = work;
        self
    }

    pub fn with_lock_scope(mut self, lock_scope: LockScope) -> Self {
        self.lock_scope = lock_scope;
        self
    }
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            work: Arc::new(Delay::default()),
            lock_scope: LockScope::default(),
        }
    }
}

impl fmt::Debug for NodeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeOptions")
            .field("lock_scope", &self.lock_scope)
            .finish_non_exhaustive()
    }
}

/// Capability set shared by every node variant.
pub trait Component: fmt::Debug + fmt::Display + Send + Sync {
    fn kind(&self) -> NodeKind;

    /// Current connection descriptor.
    fn connections(&self) -> Connections;

    /// Identity of this node.
    fn id(&self) -> Key {
        self.connections().id()
    }

    /// Replace the connection descriptor and re-arm the readiness barrier.
    ///
    /// Fails with [`NodeError::InvalidConnection`](crate::domain::NodeError)
    /// when the descriptor violates the variant's arity; the previous state is
    /// kept in that case.
    fn set_new_connections(&self, connections: Connections) -> NodeResult<()>;

    fn start_point(&self) -> Point;

    fn end_point(&self) -> Point;

    /// Bind the shared traverser. Only a weak reference is kept.
    fn set_traverser(&self, traverser: Option<&Arc<dyn TreeTraverser>>) -> NodeResult<()>;

    fn pre_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>>;

    fn post_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>>;

    /// True once every child has notified this node.
    fn is_ready_for_simulation(&self) -> bool;

    /// Snapshot of the readiness barrier; `None` for variants without children.
    fn readiness(&self) -> Option<ReadinessMap>;

    /// Record that `child` finished its simulation step.
    fn notify(&self, child: Key);

    /// Block until ready or until `timeout` elapses; returns the readiness
    /// observed on return.
    fn await_readiness(&self, timeout: Option<Duration>) -> bool;

    /// Perform this node's simulation step and report completion to `parent`.
    ///
    /// `parent` must be the node recorded as this node's parent; the root
    /// ignores it and notifies nobody.
    fn run_simulation(&self, parent: Option<&dyn Component>) -> NodeResult<()>;
}
