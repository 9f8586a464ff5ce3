mod common;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use revgraph_core::{
    FragmentManager, GraphElement, GraphFragment, NoRefs, NodeId, Replace, UpdateListener,
};
use revgraph_error::ErrorKind;

use common::{
    assert_dense_row_indices, commit_node, commits, edge_between, edge_snapshot, refs,
    visibility_snapshot, visible_rows_snapshot,
};

/// a -> b -> c -> d with refs pinning the ends; b and c are the collapsible
/// run.
fn linear_manager() -> FragmentManager<HashSet<revgraph_core::CommitHash>> {
    let log = commits(&[("a", &["b"]), ("b", &["c"]), ("c", &["d"]), ("d", &[])]);
    FragmentManager::from_commits(&log, refs(&["a", "d"])).unwrap()
}

#[test]
fn relating_a_run_spans_its_boundaries() {
    let manager = linear_manager();
    let graph = manager.graph();
    let a = commit_node(graph, "a");
    let b = commit_node(graph, "b");
    let c = commit_node(graph, "c");
    let d = commit_node(graph, "d");

    let fragment = manager
        .relate_fragment(GraphElement::Node(b))
        .expect("b sits on a collapsible run");
    assert_eq!(fragment.up_node(), a);
    assert_eq!(fragment.down_node(), d);
    let expected: HashSet<NodeId> = [b, c].into_iter().collect();
    assert_eq!(fragment.intermediates(), &expected);

    // Any element of the run resolves to the same fragment.
    assert_eq!(manager.relate_fragment(GraphElement::Node(c)), Some(fragment.clone()));
    assert_eq!(manager.relate_fragment(GraphElement::Node(a)), Some(fragment.clone()));
    let first_edge = edge_between(graph, a, b);
    assert_eq!(manager.relate_fragment(GraphElement::Edge(first_edge)), Some(fragment));
}

#[test]
fn relate_fragment_is_idempotent() {
    let manager = linear_manager();
    let b = commit_node(manager.graph(), "b");
    let first = manager.relate_fragment(GraphElement::Node(b));
    let second = manager.relate_fragment(GraphElement::Node(b));
    assert_eq!(first, second);
}

#[test]
fn hide_then_show_restores_the_graph_exactly() {
    let mut manager = linear_manager();
    let a = commit_node(manager.graph(), "a");
    let d = commit_node(manager.graph(), "d");

    let pristine_edges = edge_snapshot(manager.graph());
    let pristine_visibility = visibility_snapshot(manager.graph());
    let pristine_rows = visible_rows_snapshot(manager.graph());

    let fragment = manager.relate_fragment(GraphElement::Node(a)).unwrap();
    let replace = manager.change_visibility(&fragment).unwrap();
    assert_eq!(
        replace,
        Replace {
            from_row_index: 0,
            to_row_index: 3,
            new_row_count: 2
        }
    );
    assert!(!manager.is_visible(&fragment));
    assert_eq!(manager.graph().visible_row_count(), 2);
    assert_eq!(manager.hidden_fragment_count(), 1);
    assert_dense_row_indices(manager.graph());

    // One synthetic edge now joins the boundaries, on the up boundary's lane.
    let long_edge = manager.graph().edge(edge_between(manager.graph(), a, d));
    assert_eq!(long_edge.kind(), revgraph_core::EdgeKind::Collapsed);
    assert_eq!(long_edge.branch(), manager.graph().node(a).branch());

    // Relating the collapsed edge yields the fragment back, empty.
    let collapsed = manager
        .relate_fragment(GraphElement::Node(a))
        .expect("collapsed fragment relates back");
    assert_eq!(collapsed.up_node(), a);
    assert_eq!(collapsed.down_node(), d);
    assert!(!collapsed.has_intermediates());

    let replace = manager.change_visibility(&collapsed).unwrap();
    assert_eq!(
        replace,
        Replace {
            from_row_index: 0,
            to_row_index: 1,
            new_row_count: 4
        }
    );
    assert_eq!(manager.hidden_fragment_count(), 0);
    assert_eq!(edge_snapshot(manager.graph()), pristine_edges);
    assert_eq!(visibility_snapshot(manager.graph()), pristine_visibility);
    assert_eq!(visible_rows_snapshot(manager.graph()), pristine_rows);
    assert_dense_row_indices(manager.graph());
}

#[test]
fn single_edge_span_is_not_collapsible() {
    let log = commits(&[("a", &["b"]), ("b", &[])]);
    let manager = FragmentManager::from_commits(&log, NoRefs).unwrap();
    let a = commit_node(manager.graph(), "a");
    let b = commit_node(manager.graph(), "b");

    assert_eq!(manager.relate_fragment(GraphElement::Node(a)), None);
    assert_eq!(manager.relate_fragment(GraphElement::Node(b)), None);
}

#[test]
fn convergent_region_stays_expanded() {
    // d0 merges two lanes that rejoin at c3; collapsing either side would
    // strand the other lane's edge at a boundary.
    let log = commits(&[
        ("d0", &["a1", "b2"]),
        ("a1", &["c3"]),
        ("b2", &["c3"]),
        ("c3", &[]),
    ]);
    let mut manager = FragmentManager::from_commits(&log, NoRefs).unwrap();

    for hex in ["d0", "a1", "b2", "c3"] {
        let node = commit_node(manager.graph(), hex);
        assert_eq!(manager.relate_fragment(GraphElement::Node(node)), None);
    }

    manager.hide_all().unwrap();
    assert_eq!(manager.hidden_fragment_count(), 0);
    assert_eq!(
        manager.graph().visible_row_count(),
        manager.graph().row_count()
    );
}

#[test]
fn hide_all_keeps_reffed_commits_visible() {
    let log = commits(&[
        ("a", &["b"]),
        ("b", &["c"]),
        ("c", &["d"]),
        ("d", &["e"]),
        ("e", &[]),
    ]);
    let mut manager = FragmentManager::from_commits(&log, refs(&["c"])).unwrap();

    manager.hide_all().unwrap();

    let graph = manager.graph();
    assert!(graph.node(commit_node(graph, "c")).is_visible());
    assert_eq!(manager.hidden_fragment_count(), 2);
    let visible: Vec<usize> = graph.visible_rows().map(|r| r.log_index()).collect();
    assert_eq!(visible, vec![0, 2, 4]);
    assert_dense_row_indices(graph);
}

#[test]
fn show_all_drains_the_registry() {
    let log = commits(&[
        ("a", &["b"]),
        ("b", &["c"]),
        ("c", &["d"]),
        ("d", &["e"]),
        ("e", &[]),
    ]);
    let mut manager = FragmentManager::from_commits(&log, refs(&["c"])).unwrap();
    let pristine_edges = edge_snapshot(manager.graph());

    manager.hide_all().unwrap();
    manager.show_all().unwrap();

    assert_eq!(manager.hidden_fragment_count(), 0);
    assert_eq!(
        manager.graph().visible_row_count(),
        manager.graph().row_count()
    );
    assert!(manager.graph().nodes().all(|n| n.is_visible()));
    assert_eq!(edge_snapshot(manager.graph()), pristine_edges);
    assert_dense_row_indices(manager.graph());
}

#[test]
fn inner_collapse_survives_an_outer_expand() {
    let log = commits(&[
        ("a", &["b"]),
        ("b", &["c"]),
        ("c", &["d"]),
        ("d", &["e"]),
        ("e", &["f"]),
        ("f", &[]),
    ]);
    let mut manager = FragmentManager::from_commits(&log, refs(&["a", "f"])).unwrap();
    let graph = manager.graph();
    let [b, c, d, e] = ["b", "c", "d", "e"].map(|h| commit_node(graph, h));
    let pristine_edges = edge_snapshot(graph);

    // Collapse c..d inside first, then the whole run around it.
    let inner = GraphFragment::new(b, e, [c, d].into_iter().collect());
    manager.set_visible(&inner, false).unwrap();
    let a = commit_node(manager.graph(), "a");
    let outer = manager
        .relate_fragment(GraphElement::Node(a))
        .expect("outer run is collapsible");
    let expected: HashSet<NodeId> = [b, e].into_iter().collect();
    assert_eq!(outer.intermediates(), &expected);
    manager.set_visible(&outer, false).unwrap();
    assert_eq!(manager.hidden_fragment_count(), 2);
    assert_eq!(manager.graph().visible_row_count(), 2);

    // Expanding the outer fragment reveals only the inner boundaries.
    manager.set_visible(&outer, true).unwrap();
    assert_eq!(manager.hidden_fragment_count(), 1);
    let graph = manager.graph();
    assert!(graph.node(b).is_visible());
    assert!(graph.node(e).is_visible());
    assert!(!graph.node(c).is_visible());
    assert!(!graph.node(d).is_visible());
    assert_dense_row_indices(graph);

    // The inner fragment is still collapsed and expands on its own.
    let inner_again = manager
        .relate_fragment(GraphElement::Node(b))
        .expect("inner collapse relates from its boundary");
    assert!(!inner_again.has_intermediates());
    manager.change_visibility(&inner_again).unwrap();
    assert_eq!(manager.hidden_fragment_count(), 0);
    assert_eq!(edge_snapshot(manager.graph()), pristine_edges);
    assert!(manager.graph().nodes().all(|n| n.is_visible()));
}

#[test]
fn interior_fork_and_join_round_trips() {
    // m1 fans out to x2/y3 which rejoin at z4. Anchored above the fork, the
    // maximal fragment swallows the whole diamond; expanding it must bring
    // back both paths, not just one.
    let log = commits(&[
        ("a0", &["e1"]),
        ("e1", &["b2", "c3"]),
        ("b2", &["d4"]),
        ("c3", &["d4"]),
        ("d4", &["f5"]),
        ("f5", &[]),
    ]);
    let mut manager = FragmentManager::from_commits(&log, refs(&["a0", "f5"])).unwrap();
    let pristine_edges = edge_snapshot(manager.graph());
    let pristine_visibility = visibility_snapshot(manager.graph());

    let a = commit_node(manager.graph(), "a0");
    let fragment = manager
        .relate_fragment(GraphElement::Node(a))
        .expect("diamond collapses behind its boundaries");
    let f = commit_node(manager.graph(), "f5");
    assert_eq!(fragment.up_node(), a);
    assert_eq!(fragment.down_node(), f);

    manager.set_visible(&fragment, false).unwrap();
    assert_eq!(manager.graph().visible_row_count(), 2);

    let collapsed = manager.relate_fragment(GraphElement::Node(a)).unwrap();
    manager.set_visible(&collapsed, true).unwrap();
    assert_eq!(edge_snapshot(manager.graph()), pristine_edges);
    assert_eq!(visibility_snapshot(manager.graph()), pristine_visibility);
    assert_dense_row_indices(manager.graph());
}

#[test]
fn showing_an_expanded_fragment_fails() {
    let mut manager = linear_manager();
    let b = commit_node(manager.graph(), "b");
    let fragment = manager.relate_fragment(GraphElement::Node(b)).unwrap();

    let err = manager.set_visible(&fragment, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssertionFailed);
}

#[test]
fn hiding_without_intermediates_fails() {
    let mut manager = linear_manager();
    let a = commit_node(manager.graph(), "a");
    let b = commit_node(manager.graph(), "b");

    let bare = GraphFragment::new(a, b, HashSet::new());
    let err = manager.set_visible(&bare, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssertionFailed);
}

#[test]
fn hiding_twice_fails() {
    let mut manager = linear_manager();
    let b = commit_node(manager.graph(), "b");
    let fragment = manager.relate_fragment(GraphElement::Node(b)).unwrap();

    manager.set_visible(&fragment, false).unwrap();
    let err = manager.set_visible(&fragment, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssertionFailed);
}

#[test]
fn reachability_queries_cover_their_extent() {
    let manager = linear_manager();
    let graph = manager.graph();
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|h| commit_node(graph, h));

    let up: HashSet<NodeId> = [a, b, c].into_iter().collect();
    assert_eq!(manager.up_nodes(c), up);

    let all: HashSet<NodeId> = [a, b, c, d].into_iter().collect();
    assert_eq!(manager.all_commits_current_branch(b), all);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notification {
    RowRange(NodeId, NodeId),
    Rebuilt,
}

struct Recorder(Rc<RefCell<Vec<Notification>>>);

impl UpdateListener for Recorder {
    fn row_range_updated(&mut self, up: NodeId, down: NodeId) {
        self.0.borrow_mut().push(Notification::RowRange(up, down));
    }

    fn graph_rebuilt(&mut self) {
        self.0.borrow_mut().push(Notification::Rebuilt);
    }
}

#[test]
fn listener_sees_one_notification_per_operation() {
    let mut manager = linear_manager();
    let a = commit_node(manager.graph(), "a");
    let d = commit_node(manager.graph(), "d");
    let events = Rc::new(RefCell::new(Vec::new()));
    manager.set_listener(Box::new(Recorder(events.clone())));

    let fragment = manager.relate_fragment(GraphElement::Node(a)).unwrap();
    manager.change_visibility(&fragment).unwrap();
    assert_eq!(&*events.borrow(), &[Notification::RowRange(a, d)]);

    events.borrow_mut().clear();
    manager.show_all().unwrap();
    assert_eq!(&*events.borrow(), &[Notification::Rebuilt]);

    // A bulk collapse suppresses the per-fragment calls.
    events.borrow_mut().clear();
    manager.hide_all().unwrap();
    assert_eq!(&*events.borrow(), &[Notification::Rebuilt]);
}
