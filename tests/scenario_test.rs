//! Hand-wired trees run bottom-up, sequentially and one worker per node

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hydrotree::domain::{Area, Confluence, Connections, Key, Point};
use hydrotree::node::{Component, GhostNode, InternalNode, Leaf};
use hydrotree::util::testing;

fn k(id: u64) -> Key {
    Key::new(id)
}

fn area(id: u64) -> Area {
    Area::new(Point::new(id as f64, 1.0, 0.0), Point::new(id as f64, 0.0, 0.0), 2.0)
}

/// Internal(1) -> [Leaf(2), Ghost(3, [Leaf(4), Leaf(5)])]
struct GhostScenario {
    root: InternalNode,
    leaf2: Leaf,
    ghost3: GhostNode,
    leaf4: Leaf,
    leaf5: Leaf,
}

impl GhostScenario {
    fn new() -> Self {
        let leaf = |id: u64, parent: u64| {
            Leaf::new(Connections::leaf(k(id), Some(k(parent))).unwrap(), Arc::new(area(id))).unwrap()
        };
        Self {
            root: InternalNode::new(
                Connections::with_children(k(1), None, &[k(2), k(3)]).unwrap(),
                area(1),
            )
            .unwrap(),
            leaf2: leaf(2, 1),
            ghost3: GhostNode::new(
                Connections::with_children(k(3), Some(k(1)), &[k(4), k(5)]).unwrap(),
                Arc::new(Confluence {
                    point: Point::new(1.0, 1.0, 0.0),
                }),
            )
            .unwrap(),
            leaf4: leaf(4, 3),
            leaf5: leaf(5, 3),
        }
    }
}

#[test]
fn given_chain_when_run_bottom_up_then_root_ready() {
    testing::init_test_setup();
    let root = InternalNode::new(Connections::with_children(k(1), None, &[k(2)]).unwrap(), area(1)).unwrap();
    let leaf = Leaf::new(Connections::leaf(k(2), Some(k(1))).unwrap(), Arc::new(area(2))).unwrap();

    assert!(!root.is_ready_for_simulation());
    leaf.run_simulation(Some(&root)).unwrap();

    assert!(root.is_ready_for_simulation());
    assert_eq!(root.readiness().unwrap().get(k(2)), Some(true));
}

#[test]
fn given_ghost_scenario_when_one_grandchild_missing_then_ghost_blocks_root() {
    testing::init_test_setup();
    let s = GhostScenario::new();

    s.leaf2.run_simulation(Some(&s.root)).unwrap();
    s.leaf4.run_simulation(Some(&s.ghost3)).unwrap();

    assert!(!s.ghost3.is_ready_for_simulation());
    assert_eq!(s.ghost3.readiness().unwrap().pending(), vec![k(5)]);
    assert!(s.ghost3.run_simulation(Some(&s.root)).is_err());
    assert_eq!(s.root.readiness().unwrap().get(k(3)), Some(false));
    assert!(!s.root.is_ready_for_simulation());
}

#[test]
fn given_ghost_scenario_when_all_run_then_root_ready() {
    let s = GhostScenario::new();

    s.leaf5.run_simulation(Some(&s.ghost3)).unwrap();
    s.leaf2.run_simulation(Some(&s.root)).unwrap();
    s.leaf4.run_simulation(Some(&s.ghost3)).unwrap();
    assert!(s.ghost3.is_ready_for_simulation());
    s.ghost3.run_simulation(Some(&s.root)).unwrap();

    assert!(s.root.is_ready_for_simulation());
    s.root.run_simulation(None).unwrap();
}

#[test]
fn given_one_worker_per_node_when_awaiting_readiness_then_round_completes() {
    testing::init_test_setup();
    let s = GhostScenario::new();
    let wait = Some(Duration::from_secs(10));

    thread::scope(|scope| {
        let root = &s.root;
        let ghost = &s.ghost3;
        let runs = [
            scope.spawn(move || {
                assert!(root.await_readiness(wait));
                root.run_simulation(None)
            }),
            scope.spawn(move || {
                assert!(ghost.await_readiness(wait));
                ghost.run_simulation(Some(root))
            }),
            scope.spawn(|| s.leaf2.run_simulation(Some(root))),
            scope.spawn(|| s.leaf4.run_simulation(Some(ghost))),
            scope.spawn(|| s.leaf5.run_simulation(Some(ghost))),
        ];
        for run in runs {
            run.join().unwrap().unwrap();
        }
    });

    assert!(s.root.is_ready_for_simulation());
    assert!(s.ghost3.is_ready_for_simulation());
}
