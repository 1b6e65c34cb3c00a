//! Per-child completion flags used as a fan-in barrier

use std::collections::BTreeMap;

use crate::domain::{Key, NodeError, NodeResult};

/// Maps every child of a node to whether it has finished its simulation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessMap {
    flags: BTreeMap<Key, bool>,
}

impl ReadinessMap {
    /// Arm the barrier with every child pending.
    ///
    /// A children-bearing node without children is a modeling error.
    pub fn arm(node: Key, children: impl IntoIterator<Item = Key>) -> NodeResult<Self> {
        let flags: BTreeMap<Key, bool> = children.into_iter().map(|c| (c, false)).collect();
        if flags.is_empty() {
            return Err(NodeError::StructuralInconsistency { node });
        }
        Ok(Self { flags })
    }

    /// Mark `child` finished. Returns false when `child` is not tracked.
    pub fn mark(&mut self, child: Key) -> bool {
        match self.flags.get_mut(&child) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.flags.values().all(|finished| *finished)
    }

    pub fn pending(&self) -> Vec<Key> {
        self.flags
            .iter()
            .filter(|(_, finished)| !**finished)
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn get(&self, child: Key) -> Option<bool> {
        self.flags.get(&child).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn finished_count(&self) -> usize {
        self.flags.values().filter(|finished| **finished).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, bool)> + '_ {
        self.flags.iter().map(|(k, v)| (*k, *v))
    }
}
