//! State and protocol shared by all node variants

use std::fmt;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, instrument, trace, warn};

use super::readiness::ReadinessMap;
use super::{Component, LockScope, NodeKind, NodeOptions};
use crate::domain::{Connections, Key, NodeError, NodeResult};
use crate::traversal::TreeTraverser;

/// Everything a node mutates after construction; guarded as one unit so a
/// connection swap and the re-armed barrier are observed together.
#[derive(Debug)]
struct NodeState {
    connections: Connections,
    readiness: Option<ReadinessMap>,
    traverser: Option<Weak<dyn TreeTraverser>>,
}

impl NodeState {
    fn is_ready(&self) -> bool {
        self.readiness.as_ref().map_or(true, ReadinessMap::is_complete)
    }
}

#[derive(Debug)]
pub(crate) struct NodeCore {
    kind: NodeKind,
    admits: fn(usize) -> bool,
    state: Mutex<NodeState>,
    ready: Condvar,
    options: NodeOptions,
}

impl NodeCore {
    /// Validate `connections` against the variant's arity and arm the barrier.
    pub(crate) fn bind(
        kind: NodeKind,
        admits: fn(usize) -> bool,
        connections: Connections,
        options: NodeOptions,
    ) -> NodeResult<Self> {
        let readiness = prepare(kind, admits, &connections)?;
        debug!(%kind, %connections, "node bound");
        Ok(Self {
            kind,
            admits,
            state: Mutex::new(NodeState {
                connections,
                readiness,
                traverser: None,
            }),
            ready: Condvar::new(),
            options,
        })
    }

    pub(crate) fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn connections(&self) -> Connections {
        self.state.lock().connections.clone()
    }

    #[instrument(level = "debug", skip(self), fields(kind = %self.kind))]
    pub(crate) fn set_new_connections(&self, connections: Connections) -> NodeResult<()> {
        let readiness = prepare(self.kind, self.admits, &connections)?;
        {
            let mut state = self.state.lock();
            state.connections = connections;
            state.readiness = readiness;
        }
        self.ready.notify_all();
        Ok(())
    }

    pub(crate) fn set_traverser(&self, traverser: Option<&Arc<dyn TreeTraverser>>) -> NodeResult<()> {
        let traverser = traverser
            .ok_or_else(|| NodeError::InvalidArgument("traverser cannot be absent".into()))?;
        self.state.lock().traverser = Some(Arc::downgrade(traverser));
        Ok(())
    }

    pub(crate) fn pre_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>> {
        let (id, traverser) = self.bound_traverser()?;
        traverser.pre_order(id)
    }

    pub(crate) fn post_order_traversal(&self) -> NodeResult<Vec<Arc<dyn Component>>> {
        let (id, traverser) = self.bound_traverser()?;
        traverser.post_order(id)
    }

    // The lock is released before traversing: the traverser reads this node too.
    fn bound_traverser(&self) -> NodeResult<(Key, Arc<dyn TreeTraverser>)> {
        let state = self.state.lock();
        let id = state.connections.id();
        let traverser = state
            .traverser
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or_else(|| NodeError::InvalidArgument(format!("no traverser bound to node {id}")))?;
        Ok((id, traverser))
    }

    pub(crate) fn is_ready_for_simulation(&self) -> bool {
        self.state.lock().is_ready()
    }

    pub(crate) fn readiness(&self) -> Option<ReadinessMap> {
        self.state.lock().readiness.clone()
    }

    pub(crate) fn notify(&self, child: Key) {
        let mut state = self.state.lock();
        let id = state.connections.id();
        match state.readiness.as_mut() {
            Some(readiness) => {
                if readiness.mark(child) {
                    trace!(node = %id, %child, "child finished");
                    self.ready.notify_all();
                } else {
                    warn!(node = %id, %child, "notification from unknown child ignored");
                }
            }
            None => trace!(node = %id, %child, "no children to track, notification ignored"),
        }
    }

    pub(crate) fn await_readiness(&self, timeout: Option<Duration>) -> bool {
        let mut state = self.state.lock();
        let Some(timeout) = timeout else {
            while !state.is_ready() {
                self.ready.wait(&mut state);
            }
            return true;
        };
        let deadline = Instant::now() + timeout;
        while !state.is_ready() {
            if self.ready.wait_until(&mut state, deadline).timed_out() {
                return state.is_ready();
            }
        }
        true
    }

    #[instrument(level = "debug", skip(self, parent), fields(kind = %self.kind))]
    pub(crate) fn run_simulation(&self, parent: Option<&dyn Component>) -> NodeResult<()> {
        let snapshot = self.connections();
        let id = snapshot.id();
        let expected = snapshot.parent();

        // Resolved without holding our own lock: `parent` may alias this node.
        let found = match expected {
            Some(_) => parent.map(|p| p.id()),
            None => None,
        };
        if expected.is_some() && found != expected {
            return Err(NodeError::DisconnectedParent {
                node: id,
                expected,
                found,
            });
        }

        let mut state = self.state.lock();
        if state.connections.parent() != expected {
            return Err(NodeError::DisconnectedParent {
                node: id,
                expected: state.connections.parent(),
                found,
            });
        }
        if let Some(readiness) = state.readiness.as_ref() {
            if !readiness.is_complete() {
                return Err(NodeError::NotReady {
                    node: id,
                    pending: readiness.pending(),
                });
            }
        }

        let connections = state.connections.clone();
        let current = thread::current();
        info!(
            node = %id,
            parent = %DisplayParent(expected),
            thread = current.name().unwrap_or("unnamed"),
            "computing"
        );
        let outcome = match self.options.lock_scope {
            LockScope::Exclusive => self.options.work.perform(&connections),
            LockScope::Narrow => {
                MutexGuard::unlocked(&mut state, || self.options.work.perform(&connections))
            }
        };
        drop(state);

        if let Err(source) = outcome {
            warn!(node = %id, error = %source, "unit of work did not complete, parent not notified");
            return Err(NodeError::Work { node: id, source });
        }

        match (expected, parent) {
            (Some(parent_key), Some(parent)) => {
                parent.notify(id);
                debug!(node = %id, parent = %parent_key, "parent notified");
            }
            _ => debug!(node = %id, "root finished"),
        }
        Ok(())
    }

    pub(crate) fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ==> {}", self.kind, self.state.lock().connections)
    }
}

/// Validate-then-build: nothing is committed unless both steps succeed.
fn prepare(
    kind: NodeKind,
    admits: fn(usize) -> bool,
    connections: &Connections,
) -> NodeResult<Option<ReadinessMap>> {
    let count = connections.child_count();
    if !admits(count) {
        return Err(NodeError::InvalidConnection {
            node: connections.id(),
            reason: format!("{kind} cannot have {count} children"),
        });
    }
    if kind.has_children() {
        ReadinessMap::arm(connections.id(), connections.children()).map(Some)
    } else {
        Ok(None)
    }
}

struct DisplayParent(Option<Key>);

impl fmt::Display for DisplayParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, "{key}"),
            None => f.write_str("none"),
        }
    }
}
