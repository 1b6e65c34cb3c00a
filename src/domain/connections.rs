//! Connection descriptor of a node

use std::fmt;

use super::error::{NodeError, NodeResult};
use super::key::Key;

/// Identity of a node plus the links to its parent and (at most two) children.
///
/// A descriptor is validated once on construction and never mutated; a node
/// replaces its descriptor wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connections {
    id: Key,
    parent: Option<Key>,
    children: [Option<Key>; 2],
}

impl Connections {
    /// Build a descriptor. `parent == None` marks the network root.
    pub fn new(id: Key, parent: Option<Key>, children: [Option<Key>; 2]) -> NodeResult<Self> {
        if parent == Some(id) {
            return Err(invalid(id, "a node cannot be its own parent"));
        }
        if children.contains(&Some(id)) {
            return Err(invalid(id, "a node cannot be its own child"));
        }
        if let [Some(left), Some(right)] = children {
            if left == right {
                return Err(invalid(id, format!("child {left} is listed twice")));
            }
        }
        if parent.is_some() && children.contains(&parent) {
            return Err(invalid(id, "the parent cannot also be a child"));
        }
        Ok(Self {
            id,
            parent,
            children,
        })
    }

    /// Descriptor of a node without children.
    pub fn leaf(id: Key, parent: Option<Key>) -> NodeResult<Self> {
        Self::new(id, parent, [None, None])
    }

    /// Descriptor built from a slice of up to two children.
    pub fn with_children(id: Key, parent: Option<Key>, children: &[Key]) -> NodeResult<Self> {
        match children {
            [] => Self::new(id, parent, [None, None]),
            [only] => Self::new(id, parent, [Some(*only), None]),
            [left, right] => Self::new(id, parent, [Some(*left), Some(*right)]),
            _ => Err(invalid(
                id,
                format!("{} children given, a node holds at most two", children.len()),
            )),
        }
    }

    pub fn id(&self) -> Key {
        self.id
    }

    pub fn parent(&self) -> Option<Key> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Present children in slot order.
    pub fn children(&self) -> impl Iterator<Item = Key> + '_ {
        self.children.iter().flatten().copied()
    }

    pub fn child_slots(&self) -> [Option<Key>; 2] {
        self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.iter().flatten().count()
    }

    pub fn has_child(&self, key: Key) -> bool {
        self.children.contains(&Some(key))
    }
}

fn invalid(node: Key, reason: impl Into<String>) -> NodeError {
    NodeError::InvalidConnection {
        node,
        reason: reason.into(),
    }
}

impl fmt::Display for Connections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID = {} PARENT = ", self.id)?;
        match self.parent {
            Some(parent) => write!(f, "{parent}")?,
            None => write!(f, "none")?,
        }
        write!(f, " CHILDREN = [")?;
        for (i, child) in self.children().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, "]")
    }
}
