//! One-shot transform from an ordered commit list into the initial graph.
//!
//! Commits are consumed one row at a time in input order. A parent that has
//! not been reached yet is represented by a pending placeholder; when a row
//! closes, every pending placeholder not resolved by the very next row is
//! frozen into a [`NodeKind::Placeholder`] node occupying that row and
//! re-chained below, so an in-transit lane owns exactly one node per row it
//! passes through. Placeholders that never resolve become
//! [`NodeKind::Boundary`] nodes in one final row.

use std::collections::HashMap;

use revgraph_error::{Error, Result};

use crate::branch::Branch;
use crate::branch::BranchId;
use crate::commit::{Commit, CommitHash};
use crate::edge::EdgeKind;
use crate::graph::Graph;
use crate::node::{NodeId, NodeKind};

/// Build a [`Graph`] from commits in log order (typically reverse
/// chronological). The position of a commit in the slice is its log index.
///
/// Fails only on caller contract violations: a commit hash appearing twice.
pub fn build_graph(commits: &[Commit]) -> Result<Graph> {
    GraphBuilder::new(commits)?.build()
}

struct GraphBuilder<'a> {
    commits: &'a [Commit],
    log_indexes: HashMap<CommitHash, usize>,
    graph: Graph,
    /// Placeholders awaiting their real commit, plus their creation order so
    /// per-row freezing is deterministic.
    pending: HashMap<CommitHash, NodeId>,
    pending_order: Vec<CommitHash>,
}

impl<'a> GraphBuilder<'a> {
    fn new(commits: &'a [Commit]) -> Result<Self> {
        let mut log_indexes = HashMap::with_capacity(commits.len());
        for (log_index, commit) in commits.iter().enumerate() {
            if log_indexes.insert(commit.hash(), log_index).is_some() {
                return Err(Error::duplicate_commit(commit.hash().to_string())
                    .with_operation("graph_builder::build")
                    .with_context("log_index", log_index.to_string()));
            }
        }
        Ok(Self {
            commits,
            log_indexes,
            graph: Graph::new(),
            pending: HashMap::new(),
            pending_order: Vec::new(),
        })
    }

    fn build(mut self) -> Result<Graph> {
        for (log_index, commit) in self.commits.iter().enumerate() {
            self.append(log_index, commit);
            if log_index + 1 < self.commits.len() {
                self.freeze_passing_lanes(log_index + 1);
            }
        }
        self.close_boundary_row();
        self.graph.rebuild_visibility();

        tracing::debug!(
            "built graph: {} rows, {} nodes, {} edges, {} branches",
            self.graph.row_count(),
            self.graph.node_count(),
            self.graph.edge_count(),
            self.graph.branch_count(),
        );
        Ok(self.graph)
    }

    /// Finish the current commit's row and wire up its parents.
    fn append(&mut self, log_index: usize, commit: &Commit) {
        let row = self.graph.ensure_row(log_index);

        let node = match self.take_pending(commit.hash()) {
            Some(node) => {
                self.graph.node_mut(node).set_kind(NodeKind::Commit);
                node
            }
            None => {
                let branch = self.graph.new_branch(Branch::new(commit.hash()));
                self.graph.new_node(commit.hash(), NodeKind::Commit, branch)
            }
        };
        self.graph.node_mut(node).set_row(row);
        self.graph.row_mut(row).push_node(node);

        for (slot, &parent) in commit.parents().iter().enumerate() {
            let branch = if slot == 0 {
                self.graph.node(node).branch()
            } else {
                self.graph
                    .new_branch(Branch::merge_lane(commit.hash(), parent))
            };
            self.add_parent(node, parent, branch);
        }
    }

    fn add_parent(&mut self, node: NodeId, parent: CommitHash, branch: BranchId) {
        match self.pending.get(&parent) {
            Some(&placeholder) => {
                self.graph.add_edge(node, placeholder, EdgeKind::Usual, branch);
            }
            None => {
                let placeholder = self.graph.new_node(parent, NodeKind::Placeholder, branch);
                self.graph.add_edge(node, placeholder, EdgeKind::Usual, branch);
                self.pending.insert(parent, placeholder);
                self.pending_order.push(parent);
            }
        }
    }

    /// Pin every pending placeholder that will not resolve at `next_row` into
    /// that row and chain a fresh placeholder below it on the same branch.
    fn freeze_passing_lanes(&mut self, next_row: usize) {
        let order = std::mem::take(&mut self.pending_order);
        self.graph.ensure_row(next_row);

        for hash in &order {
            let expected = self.log_indexes.get(hash).copied();
            if expected == Some(next_row) {
                continue;
            }

            let node = self.pending[hash];
            self.graph.node_mut(node).set_row(next_row);
            self.graph.row_mut(next_row).push_node(node);

            let branch = self.graph.node(node).branch();
            let successor = self.graph.new_node(*hash, NodeKind::Placeholder, branch);
            self.graph.add_edge(node, successor, EdgeKind::Usual, branch);
            self.pending.insert(*hash, successor);
        }
        self.pending_order = order;
    }

    /// Placeholders that survived the whole log reference commits outside it;
    /// close them out as history-boundary nodes in one final row.
    fn close_boundary_row(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let row = self.graph.ensure_row(self.commits.len());
        for hash in std::mem::take(&mut self.pending_order) {
            let node = self.pending[&hash];
            self.graph.node_mut(node).set_kind(NodeKind::Boundary);
            self.graph.node_mut(node).set_row(row);
            self.graph.row_mut(row).push_node(node);
        }
        self.pending.clear();
    }

    fn take_pending(&mut self, hash: CommitHash) -> Option<NodeId> {
        let node = self.pending.remove(&hash)?;
        self.pending_order.retain(|&h| h != hash);
        Some(node)
    }
}
