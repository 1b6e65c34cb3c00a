//! Tree traversal strategy shared by the nodes of one network

use std::sync::Arc;

use tracing::instrument;

use crate::domain::{Key, NodeError, NodeResult};
use crate::node::Component;

/// Walks the children relationship implied by each node's connections.
///
/// Implementors provide the two lookups; the orderings are derived from them.
pub trait TreeTraverser: Send + Sync {
    /// Node registered under `key`, if any.
    fn resolve(&self, key: Key) -> Option<Arc<dyn Component>>;

    /// Children of `node` in slot order. Unknown child keys are skipped.
    fn children(&self, node: &dyn Component) -> Vec<Arc<dyn Component>> {
        node.connections()
            .children()
            .filter_map(|child| self.resolve(child))
            .collect()
    }

    /// Parent before children, children left to right.
    #[instrument(level = "trace", skip(self))]
    fn pre_order(&self, root: Key) -> NodeResult<Vec<Arc<dyn Component>>> {
        let mut stack = vec![self.lookup_root(root)?];
        let mut ordered = Vec::new();
        while let Some(current) = stack.pop() {
            // Push children in reverse order for left-to-right traversal
            for child in self.children(current.as_ref()).into_iter().rev() {
                stack.push(child);
            }
            ordered.push(current);
        }
        Ok(ordered)
    }

    /// Children left to right before their parent: the order in which a
    /// bottom-up simulation round can run sequentially.
    #[instrument(level = "trace", skip(self))]
    fn post_order(&self, root: Key) -> NodeResult<Vec<Arc<dyn Component>>> {
        let mut stack = vec![(self.lookup_root(root)?, false)];
        let mut ordered = Vec::new();
        while let Some((current, visited)) = stack.pop() {
            if visited {
                ordered.push(current);
                continue;
            }
            let children = self.children(current.as_ref());
            stack.push((current, true));
            for child in children.into_iter().rev() {
                stack.push((child, false));
            }
        }
        Ok(ordered)
    }

    #[doc(hidden)]
    fn lookup_root(&self, root: Key) -> NodeResult<Arc<dyn Component>> {
        self.resolve(root)
            .ok_or_else(|| NodeError::InvalidArgument(format!("unknown traversal root {root}")))
    }
}
