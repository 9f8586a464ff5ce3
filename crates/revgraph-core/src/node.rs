//! Graph nodes.

use std::fmt;

use smallvec::SmallVec;
use strum_macros::{Display, EnumIter, EnumString};

use crate::branch::BranchId;
use crate::commit::CommitHash;
use crate::edge::EdgeId;

/// Identifier of a [`Node`] in the graph's node table.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// A real commit sitting at its own row.
    Commit,
    /// A stand-in occupying a row on a lane whose real commit has not been
    /// reached yet; one per row the lane passes through.
    Placeholder,
    /// A dangling reference to a parent that never appears in the input
    /// (history boundary).
    Boundary,
}

/// One node of the commit graph.
///
/// Every node knows the commit hash it stands for: its own hash for a
/// `Commit` node, the awaited commit for a `Placeholder`, the missing parent
/// for a `Boundary`. Edge lists are kept in insertion order; `up_edges` all
/// lead to earlier rows (by log index), `down_edges` to later rows — "up" and
/// "down" follow history order, not screen direction.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    commit: CommitHash,
    kind: NodeKind,
    row: usize,
    branch: BranchId,
    visible: bool,
    selected: bool,
    up_edges: SmallVec<[EdgeId; 2]>,
    down_edges: SmallVec<[EdgeId; 2]>,
}

impl Node {
    pub(crate) fn new(id: NodeId, commit: CommitHash, kind: NodeKind, branch: BranchId) -> Self {
        Self {
            id,
            commit,
            kind,
            row: 0,
            branch,
            visible: true,
            selected: false,
            up_edges: SmallVec::new(),
            down_edges: SmallVec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn commit(&self) -> CommitHash {
        self.commit
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }

    /// Log index of the owning row.
    pub fn row(&self) -> usize {
        self.row
    }

    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    pub fn branch(&self) -> BranchId {
        self.branch
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Edges to nodes in earlier rows, in insertion order.
    pub fn up_edges(&self) -> &[EdgeId] {
        &self.up_edges
    }

    /// Edges to nodes in later rows, in insertion order.
    pub fn down_edges(&self) -> &[EdgeId] {
        &self.down_edges
    }

    pub(crate) fn push_up_edge(&mut self, edge: EdgeId) {
        self.up_edges.push(edge);
    }

    pub(crate) fn push_down_edge(&mut self, edge: EdgeId) {
        self.down_edges.push(edge);
    }

    pub(crate) fn remove_up_edge(&mut self, edge: EdgeId) -> bool {
        if let Some(pos) = self.up_edges.iter().position(|&e| e == edge) {
            self.up_edges.remove(pos);
            return true;
        }
        false
    }

    pub(crate) fn remove_down_edge(&mut self, edge: EdgeId) -> bool {
        if let Some(pos) = self.down_edges.iter().position(|&e| e == edge) {
            self.down_edges.remove(pos);
            return true;
        }
        false
    }
}
