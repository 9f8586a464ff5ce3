//! Shared fixtures for the integration tests: compact commit-list builders
//! and lookup/snapshot helpers over the built graph.

#![allow(dead_code)]

use std::collections::HashSet;

use revgraph_core::{
    BranchId, Commit, CommitHash, EdgeId, EdgeKind, Graph, NodeId, NodeKind,
};

pub fn hash(hex: &str) -> CommitHash {
    CommitHash::from_hex(hex).unwrap()
}

pub fn commit(hex: &str, parents: &[&str]) -> Commit {
    Commit::new(hash(hex), parents.iter().map(|p| hash(p)).collect())
}

pub fn commits(log: &[(&str, &[&str])]) -> Vec<Commit> {
    log.iter().map(|(h, parents)| commit(h, parents)).collect()
}

pub fn refs(hexes: &[&str]) -> HashSet<CommitHash> {
    hexes.iter().map(|h| hash(h)).collect()
}

/// The commit node standing for `hex`.
pub fn commit_node(graph: &Graph, hex: &str) -> NodeId {
    let wanted = hash(hex);
    graph
        .nodes()
        .find(|n| n.commit() == wanted && n.kind() == NodeKind::Commit)
        .unwrap_or_else(|| panic!("no commit node for {}", hex))
        .id()
}

/// The edge connecting two specific nodes, whatever its kind.
pub fn edge_between(graph: &Graph, up: NodeId, down: NodeId) -> EdgeId {
    graph
        .edges()
        .find(|(_, e)| e.up_node() == up && e.down_node() == down)
        .unwrap_or_else(|| panic!("no edge {} -> {}", up, down))
        .0
}

/// Logical edge set, id-independent, for exact-restoration comparisons.
pub fn edge_snapshot(graph: &Graph) -> Vec<(NodeId, NodeId, EdgeKind, BranchId)> {
    let mut edges: Vec<_> = graph
        .edges()
        .map(|(_, e)| (e.up_node(), e.down_node(), e.kind(), e.branch()))
        .collect();
    edges.sort();
    edges
}

/// Per-node visibility flags by node id.
pub fn visibility_snapshot(graph: &Graph) -> Vec<(NodeId, bool)> {
    graph.nodes().map(|n| (n.id(), n.is_visible())).collect()
}

/// `(log_index, row_index)` pairs of the visible rows, in order.
pub fn visible_rows_snapshot(graph: &Graph) -> Vec<(usize, usize)> {
    graph
        .visible_rows()
        .map(|r| (r.log_index(), r.row_index()))
        .collect()
}

/// Visible row indices must always read `0..N`.
pub fn assert_dense_row_indices(graph: &Graph) {
    let indices: Vec<usize> = graph.visible_rows().map(|r| r.row_index()).collect();
    let expected: Vec<usize> = (0..graph.visible_row_count()).collect();
    assert_eq!(indices, expected);
}
