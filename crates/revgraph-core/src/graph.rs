//! The graph container.
//!
//! Owns every node, edge, branch, and row in indexed tables; all references
//! between them are plain ids. The full row list is fixed at build time (one
//! slot per log index); the visible-row list is derived from per-row cached
//! flags and recomputed after visibility changes.

use revgraph_error::{Error, Result};

use crate::branch::{Branch, BranchId};
use crate::commit::CommitHash;
use crate::edge::{Edge, EdgeId, EdgeKind};
use crate::node::{Node, NodeId, NodeKind};
use crate::row::Row;

/// The minimal description of a visible-row range change, handed to the
/// rendering collaborator so it can redraw incrementally.
///
/// `from_row_index..=to_row_index` is the changed span in the *previous*
/// visible-row numbering; `new_row_count` is how many visible rows that span
/// now holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replace {
    pub from_row_index: usize,
    pub to_row_index: usize,
    pub new_row_count: usize,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Option<Edge>>,
    free_edges: Vec<EdgeId>,
    branches: Vec<Branch>,
    rows: Vec<Row>,
    /// Log indices of visible rows, ascending.
    visible_rows: Vec<usize>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub(crate) fn new_node(
        &mut self,
        commit: CommitHash,
        kind: NodeKind,
        branch: BranchId,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, commit, kind, branch));
        id
    }

    /// Look up a node by id.
    ///
    /// # Panics
    /// Panics on an id from a different graph; node ids are never freed.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Flip the selection flag on a node. Selection is viewer state; no
    /// engine operation reads it.
    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) {
        self.node_mut(id).set_selected(selected);
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.set_selected(false);
        }
    }

    pub(crate) fn mark_all_nodes_visible(&mut self) {
        for node in &mut self.nodes {
            node.set_visible(true);
        }
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Create an edge from `up` (earlier row) to `down` (later row) and
    /// register it on both endpoints' ordered lists. Freed slots are reused
    /// so collapse/expand cycles do not grow the table.
    pub(crate) fn add_edge(
        &mut self,
        up: NodeId,
        down: NodeId,
        kind: EdgeKind,
        branch: BranchId,
    ) -> EdgeId {
        let edge = Edge::new(up, down, kind, branch);
        let id = match self.free_edges.pop() {
            Some(id) => {
                self.edges[id.index()] = Some(edge);
                id
            }
            None => {
                let id = EdgeId::new(self.edges.len() as u32);
                self.edges.push(Some(edge));
                id
            }
        };
        self.node_mut(up).push_down_edge(id);
        self.node_mut(down).push_up_edge(id);
        id
    }

    /// Detach an edge from both endpoints and free its slot.
    pub(crate) fn remove_edge(&mut self, id: EdgeId) -> Edge {
        let edge = self.edges[id.index()]
            .take()
            .expect("edge slot is already free");
        self.node_mut(edge.up_node()).remove_down_edge(id);
        self.node_mut(edge.down_node()).remove_up_edge(id);
        self.free_edges.push(id);
        edge
    }

    /// Look up a live edge by id.
    ///
    /// # Panics
    /// Panics if the id refers to a freed slot; holding an `EdgeId` across a
    /// mutation that removed it is a caller bug.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        self.edges[id.index()]
            .as_ref()
            .expect("edge slot is already free")
    }

    /// All live edges with their ids, in table order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EdgeId::new(i as u32), e)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|slot| slot.is_some()).count()
    }

    // ------------------------------------------------------------------
    // Branches
    // ------------------------------------------------------------------

    pub(crate) fn new_branch(&mut self, branch: Branch) -> BranchId {
        let id = BranchId::new(self.branches.len() as u32);
        self.branches.push(branch);
        id
    }

    pub fn branch(&self, id: BranchId) -> &Branch {
        &self.branches[id.index()]
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    pub(crate) fn push_row(&mut self) -> usize {
        let log_index = self.rows.len();
        self.rows.push(Row::new(log_index));
        log_index
    }

    /// Make sure rows up to and including `log_index` exist.
    pub(crate) fn ensure_row(&mut self, log_index: usize) -> usize {
        while self.rows.len() <= log_index {
            self.push_row();
        }
        log_index
    }

    pub(crate) fn row_mut(&mut self, log_index: usize) -> &mut Row {
        &mut self.rows[log_index]
    }

    pub fn row(&self, log_index: usize) -> &Row {
        &self.rows[log_index]
    }

    /// The full row list, by log index, collapsed rows included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    /// Currently visible rows in order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.visible_rows.iter().map(|&log| &self.rows[log])
    }

    pub fn visible_row_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// The visible row at a dense row index.
    pub fn visible_row(&self, row_index: usize) -> Option<&Row> {
        self.visible_rows.get(row_index).map(|&log| &self.rows[log])
    }

    /// Re-derive row visibility after the node visibility inside a visible
    /// span changed.
    ///
    /// `from..=to` are *visible* row indices under the current numbering;
    /// the cached has-visible-nodes flag is refreshed for every row between
    /// the log indices they span, then the visible list and all row indices
    /// are recomputed. Returns the [`Replace`] the renderer needs.
    pub fn fix_row_visibility(&mut self, from: usize, to: usize) -> Result<Replace> {
        if from > to || to >= self.visible_rows.len() {
            return Err(Error::invalid_argument(format!(
                "visible range {}..={} outside 0..{}",
                from,
                to,
                self.visible_rows.len()
            ))
            .with_operation("graph::fix_row_visibility"));
        }

        let log_from = self.visible_rows[from];
        let log_to = self.visible_rows[to];
        for log in log_from..=log_to {
            self.refresh_row_flag(log);
        }
        self.recompute_visible_list();

        let new_row_count = self
            .visible_rows
            .iter()
            .filter(|&&log| log >= log_from && log <= log_to)
            .count();
        Ok(Replace {
            from_row_index: from,
            to_row_index: to,
            new_row_count,
        })
    }

    /// Refresh every row flag and the visible list from scratch; used after
    /// construction and by bulk expand-all.
    pub(crate) fn rebuild_visibility(&mut self) {
        for log in 0..self.rows.len() {
            self.refresh_row_flag(log);
        }
        self.recompute_visible_list();
    }

    fn refresh_row_flag(&mut self, log_index: usize) {
        let visible = self.rows[log_index]
            .nodes()
            .iter()
            .any(|&n| self.nodes[n.index()].is_visible());
        self.rows[log_index].set_visible(visible);
    }

    fn recompute_visible_list(&mut self) {
        self.visible_rows.clear();
        for row in &mut self.rows {
            if row.is_visible() {
                row.set_row_index(self.visible_rows.len());
                self.visible_rows.push(row.log_index());
            }
        }
    }
}
