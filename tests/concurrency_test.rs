//! Concurrent notifications, readiness waits and lock scopes

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rstest::rstest;

use hydrotree::domain::{Area, Connections, Key, Point, WorkError};
use hydrotree::node::{Component, InternalNode, Leaf, LockScope, NodeOptions, UnitOfWork};
use hydrotree::util::testing;

fn k(id: u64) -> Key {
    Key::new(id)
}

fn area() -> Area {
    Area::new(Point::new(0.0, 1.0, 0.0), Point::default(), 1.0)
}

fn internal(id: u64, children: &[u64]) -> InternalNode {
    let children: Vec<Key> = children.iter().copied().map(k).collect();
    InternalNode::new(Connections::with_children(k(id), None, &children).unwrap(), area()).unwrap()
}

/// Signals on `started`, then blocks until something arrives on `release`.
fn gated_work(started: mpsc::Sender<()>, release: mpsc::Receiver<()>) -> Arc<dyn UnitOfWork> {
    let release = Mutex::new(release);
    Arc::new(move |_: &Connections| {
        let _ = started.send(());
        release
            .lock()
            .map_err(|_| WorkError::Interrupted)?
            .recv_timeout(Duration::from_secs(10))
            .map_err(|_| WorkError::Interrupted)
    })
}

#[rstest]
#[case::one_child(&[2])]
#[case::two_children(&[2, 3])]
fn given_many_threads_when_notifying_then_no_update_lost(#[case] children: &[u64]) {
    testing::init_test_setup();
    let node = internal(1, children);

    thread::scope(|scope| {
        for i in 0..16 {
            let node = &node;
            let child = k(children[i % children.len()]);
            scope.spawn(move || node.notify(child));
        }
    });

    assert!(node.is_ready_for_simulation());
    assert_eq!(node.readiness().unwrap().finished_count(), children.len());
}

#[test]
fn given_many_nodes_when_notified_in_parallel_then_all_ready() {
    let nodes: Vec<InternalNode> = (0..200u64)
        .map(|i| internal(1000 + i, &[2 * i + 1, 2 * i + 2]))
        .collect();
    let calls: Vec<(&InternalNode, Key)> = nodes
        .iter()
        .flat_map(|node| {
            node.connections()
                .children()
                .map(|child| (node, child))
                .collect::<Vec<_>>()
        })
        .collect();

    calls.par_iter().for_each(|(node, child)| node.notify(*child));

    assert!(nodes.iter().all(|node| node.is_ready_for_simulation()));
}

#[test]
fn given_rearm_racing_notify_when_settled_then_map_matches_connections() {
    let node = internal(1, &[2, 3]);
    let next = Connections::with_children(k(1), None, &[k(4), k(5)]).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| node.notify(k(2)));
        scope.spawn(|| node.notify(k(4)));
        scope.spawn(|| node.set_new_connections(next.clone()).unwrap());
    });

    let readiness = node.readiness().unwrap();
    let tracked: Vec<Key> = readiness.iter().map(|(child, _)| child).collect();
    assert_eq!(node.connections(), next);
    assert_eq!(tracked, vec![k(4), k(5)]);
    assert_eq!(readiness.get(k(5)), Some(false));
    assert!(!node.is_ready_for_simulation());
}

#[test]
fn given_waiter_when_last_child_notifies_then_wakes_ready() {
    testing::init_test_setup();
    let node = internal(1, &[2, 3]);
    node.notify(k(2));

    thread::scope(|scope| {
        let waiter = scope.spawn(|| node.await_readiness(None));
        thread::sleep(Duration::from_millis(20));
        node.notify(k(3));
        assert!(waiter.join().unwrap());
    });
}

#[test]
fn given_silent_child_when_waiting_with_timeout_then_returns_not_ready() {
    let node = internal(1, &[2]);
    assert!(!node.await_readiness(Some(Duration::from_millis(30))));
}

#[test]
fn given_leaf_when_waiting_then_returns_immediately() {
    let leaf = Leaf::new(Connections::leaf(k(2), Some(k(1))).unwrap(), Arc::new(area())).unwrap();
    assert!(leaf.await_readiness(None));
}

#[test]
fn given_narrow_scope_when_work_runs_then_node_stays_responsive() {
    testing::init_test_setup();
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let parent = internal(1, &[2]);
    let leaf = Leaf::with_options(
        Connections::leaf(k(2), Some(k(1))).unwrap(),
        Arc::new(area()),
        NodeOptions::default()
            .with_work(gated_work(started_tx, release_rx))
            .with_lock_scope(LockScope::Narrow),
    )
    .unwrap();

    thread::scope(|scope| {
        let run = scope.spawn(|| leaf.run_simulation(Some(&parent)));
        started_rx.recv().unwrap();

        // Would block until release under an exclusive scope
        assert!(leaf.is_ready_for_simulation());
        assert_eq!(leaf.connections().id(), k(2));

        release_tx.send(()).unwrap();
        run.join().unwrap().unwrap();
    });

    assert!(parent.is_ready_for_simulation());
}

#[test]
fn given_exclusive_scope_when_work_runs_then_readers_wait_for_it() {
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let parent = internal(1, &[2]);
    let leaf = Leaf::with_options(
        Connections::leaf(k(2), Some(k(1))).unwrap(),
        Arc::new(area()),
        NodeOptions::default()
            .with_work(gated_work(started_tx, release_rx))
            .with_lock_scope(LockScope::Exclusive),
    )
    .unwrap();

    thread::scope(|scope| {
        let run = scope.spawn(|| leaf.run_simulation(Some(&parent)));
        started_rx.recv().unwrap();

        let reader = scope.spawn(|| {
            leaf.connections();
            Instant::now()
        });
        thread::sleep(Duration::from_millis(50));
        let released_at = Instant::now();
        release_tx.send(()).unwrap();

        assert!(reader.join().unwrap() >= released_at);
        run.join().unwrap().unwrap();
    });

    assert!(parent.is_ready_for_simulation());
}

#[test]
fn given_interrupted_work_when_running_then_parent_never_notified() {
    let (started_tx, _started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    drop(release_tx);
    let parent = internal(1, &[2]);
    let leaf = Leaf::with_options(
        Connections::leaf(k(2), Some(k(1))).unwrap(),
        Arc::new(area()),
        NodeOptions::default().with_work(gated_work(started_tx, release_rx)),
    )
    .unwrap();

    let result = leaf.run_simulation(Some(&parent));

    assert!(result.is_err());
    assert!(!parent.is_ready_for_simulation());
}
