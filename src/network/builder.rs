//! Composes a binary drainage tree from a network description.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, instrument};

use super::arena::Network;
use super::description::{NetworkDescription, SubbasinRecord};
use super::error::{NetworkError, NetworkResult};
use crate::domain::{Confluence, Connections, Key, Point};
use crate::node::{Component, GhostNode, InternalNode, Leaf, NodeOptions};

/// Builds a [`Network`] of nodes from a flat list of subbasins.
///
/// The variant of every node follows from its number of upstream subbasins:
/// none makes a [`Leaf`], one or two an [`InternalNode`]. A confluence with
/// more than two upstream subbasins keeps the first one and hangs the rest off
/// a cascade of [`GhostNode`]s, so no node ever holds more than two children.
pub struct NetworkBuilder {
    options: NodeOptions,
    visited: HashSet<Key>,
    /// Highest key handed out so far, subbasin or ghost
    last_key: Key,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new(NodeOptions::default())
    }
}

impl NetworkBuilder {
    pub fn new(options: NodeOptions) -> Self {
        Self {
            options,
            visited: HashSet::new(),
            last_key: Key::new(0),
        }
    }

    #[instrument(level = "debug", skip_all, fields(subbasins = description.subbasins.len()))]
    pub fn build(&mut self, description: &NetworkDescription) -> NetworkResult<Network> {
        // Reset state for a fresh build
        self.visited.clear();

        let records = index_records(description)?;
        let root = find_root(&records)?;
        let upstream = group_upstream(&records)?;
        self.last_key = records.keys().next_back().copied().unwrap_or(Key::new(0));

        let mut network = Network::new();
        let mut stack: Vec<(Key, Option<Key>)> = vec![(root, None)];

        while let Some((key, parent)) = stack.pop() {
            self.visited.insert(key);
            let record = records[&key];
            let contributors = upstream.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            let children = self.attach(key, record.start, contributors, &mut network, &mut stack)?;
            let connections = Connections::with_children(key, parent, &children)?;

            if children.is_empty() {
                let leaf = Leaf::with_options(connections, Arc::new(record.to_area()), self.options.clone())?;
                bind(&mut network, Arc::new(leaf))?;
            } else {
                let node = InternalNode::with_options(connections, record.to_area(), self.options.clone())?;
                bind(&mut network, Arc::new(node))?;
            }
        }

        // Records hanging off a parent cycle are never reached from the outlet
        if let Some(orphan) = records.keys().find(|key| !self.visited.contains(*key)) {
            return Err(NetworkError::Unreachable(*orphan));
        }

        debug!(nodes = network.len(), root = %root, "network composed");
        Ok(network)
    }

    /// Direct children of `owner`, at most two. Every real contributor is
    /// scheduled on `stack` together with the node it now drains into.
    fn attach(
        &mut self,
        owner: Key,
        junction: Point,
        contributors: &[Key],
        network: &mut Network,
        stack: &mut Vec<(Key, Option<Key>)>,
    ) -> NetworkResult<Vec<Key>> {
        if contributors.len() <= 2 {
            for child in contributors {
                stack.push((*child, Some(owner)));
            }
            return Ok(contributors.to_vec());
        }

        let (first, rest) = (contributors[0], &contributors[1..]);
        stack.push((first, Some(owner)));

        let ghost = self.allocate_ghost()?;
        let ghost_children = self.attach(ghost, junction, rest, network, stack)?;
        let connections = Connections::with_children(ghost, Some(owner), &ghost_children)?;
        let node = GhostNode::with_options(
            connections,
            Arc::new(Confluence { point: junction }),
            self.options.clone(),
        )?;
        bind(network, Arc::new(node))?;
        debug!(%owner, %ghost, "ghost node inserted");

        Ok(vec![first, ghost])
    }

    fn allocate_ghost(&mut self) -> NetworkResult<Key> {
        let key = self
            .last_key
            .successor()
            .ok_or(NetworkError::KeySpaceExhausted(self.last_key))?;
        self.last_key = key;
        Ok(key)
    }
}

/// A composed network holds every key once; unlike [`Network::insert`] a
/// clash is an error here.
fn bind(network: &mut Network, node: Arc<dyn Component>) -> NetworkResult<()> {
    let key = node.id();
    if network.get(key).is_some() {
        return Err(NetworkError::DuplicateKey(key));
    }
    network.insert(node)?;
    Ok(())
}

fn index_records(description: &NetworkDescription) -> NetworkResult<BTreeMap<Key, &SubbasinRecord>> {
    let mut records = BTreeMap::new();
    for record in &description.subbasins {
        if records.insert(record.id, record).is_some() {
            return Err(NetworkError::DuplicateKey(record.id));
        }
    }
    Ok(records)
}

fn find_root(records: &BTreeMap<Key, &SubbasinRecord>) -> NetworkResult<Key> {
    let roots: Vec<Key> = records
        .values()
        .filter(|record| record.parent.is_none())
        .map(|record| record.id)
        .collect();
    match roots.as_slice() {
        [] => Err(NetworkError::MissingRoot),
        [root] => Ok(*root),
        _ => Err(NetworkError::MultipleRoots(roots)),
    }
}

/// Upstream subbasins of every subbasin, in key order.
fn group_upstream(records: &BTreeMap<Key, &SubbasinRecord>) -> NetworkResult<BTreeMap<Key, Vec<Key>>> {
    let mut upstream: BTreeMap<Key, Vec<Key>> = BTreeMap::new();
    for record in records.values() {
        if let Some(parent) = record.parent {
            if !records.contains_key(&parent) {
                return Err(NetworkError::UnknownParent {
                    node: record.id,
                    parent,
                });
            }
            upstream.entry(parent).or_default().push(record.id);
        }
    }
    Ok(upstream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn record(id: u64, parent: Option<u64>) -> SubbasinRecord {
        SubbasinRecord {
            id: Key::new(id),
            parent: parent.map(Key::new),
            start: Point::new(id as f64, 1.0, 0.0),
            end: Point::new(id as f64, 0.0, 0.0),
            area: 1.0,
            name: None,
        }
    }

    fn describe(records: Vec<SubbasinRecord>) -> NetworkDescription {
        NetworkDescription { subbasins: records }
    }

    #[test]
    fn given_three_way_confluence_when_building_then_inserts_one_ghost() {
        let description = describe(vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(1)),
            record(4, Some(1)),
        ]);

        let network = NetworkBuilder::default().build(&description).unwrap();

        assert_eq!(network.len(), 5);
        let root = network.get(Key::new(1)).unwrap();
        assert_eq!(root.connections().children().collect::<Vec<_>>(), vec![Key::new(2), Key::new(5)]);

        let ghost = network.get(Key::new(5)).unwrap();
        assert_eq!(ghost.kind(), NodeKind::Ghost);
        assert_eq!(ghost.connections().parent(), Some(Key::new(1)));
        assert_eq!(ghost.connections().children().collect::<Vec<_>>(), vec![Key::new(3), Key::new(4)]);
        assert_eq!(ghost.start_point(), root.start_point());

        let rerouted = network.get(Key::new(4)).unwrap();
        assert_eq!(rerouted.connections().parent(), Some(Key::new(5)));
    }

    #[test]
    fn given_cycle_detached_from_outlet_when_building_then_unreachable() {
        let description = describe(vec![record(1, None), record(2, Some(3)), record(3, Some(2))]);
        let result = NetworkBuilder::default().build(&description);
        assert!(matches!(result, Err(NetworkError::Unreachable(_))));
    }

    #[test]
    fn given_unknown_parent_when_building_then_rejects() {
        let description = describe(vec![record(1, None), record(2, Some(9))]);
        let result = NetworkBuilder::default().build(&description);
        assert_eq!(
            result.err(),
            Some(NetworkError::UnknownParent {
                node: Key::new(2),
                parent: Key::new(9)
            })
        );
    }

    #[test]
    fn given_largest_key_with_three_way_confluence_when_building_then_key_space_exhausted() {
        let description = describe(vec![
            record(1, None),
            record(2, Some(1)),
            record(3, Some(1)),
            record(4, Some(1)),
            record(u64::MAX, Some(2)),
        ]);

        let result = NetworkBuilder::default().build(&description);

        assert_eq!(result.err(), Some(NetworkError::KeySpaceExhausted(Key::new(u64::MAX))));
    }

    #[test]
    fn given_largest_key_without_ghosts_when_building_then_keeps_every_subbasin() {
        let description = describe(vec![record(1, None), record(2, Some(1)), record(u64::MAX, Some(2))]);

        let network = NetworkBuilder::default().build(&description).unwrap();

        assert_eq!(network.len(), 3);
        let headwater = network.get(Key::new(u64::MAX)).unwrap();
        assert_eq!(headwater.kind(), NodeKind::Leaf);
        assert_eq!(headwater.connections().parent(), Some(Key::new(2)));
    }

    #[test]
    fn given_bound_key_when_binding_again_then_duplicate_key() {
        let mut network = Network::new();
        let leaf = |id: u64| {
            let connections = Connections::leaf(Key::new(id), Some(Key::new(1))).unwrap();
            Arc::new(Leaf::new(connections, Arc::new(record(id, Some(1)).to_area())).unwrap())
        };
        bind(&mut network, leaf(2)).unwrap();

        let result = bind(&mut network, leaf(2));

        assert_eq!(result, Err(NetworkError::DuplicateKey(Key::new(2))));
        assert_eq!(network.len(), 1);
    }
}
