//! Graph edges.

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString};

use crate::branch::BranchId;
use crate::node::NodeId;

/// Identifier of an [`Edge`] in the graph's edge table.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EdgeId {
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

/// What an edge stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeKind {
    /// A direct parent relationship or a placeholder chain link.
    Usual,
    /// A synthetic long edge standing in for a collapsed linear run.
    Collapsed,
}

/// One edge of the commit graph, connecting a node in an earlier row (`up`)
/// to a node in a later row (`down`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    up: NodeId,
    down: NodeId,
    kind: EdgeKind,
    branch: BranchId,
}

impl Edge {
    pub(crate) fn new(up: NodeId, down: NodeId, kind: EdgeKind, branch: BranchId) -> Self {
        Self {
            up,
            down,
            kind,
            branch,
        }
    }

    /// The endpoint in the earlier row.
    pub fn up_node(&self) -> NodeId {
        self.up
    }

    /// The endpoint in the later row.
    pub fn down_node(&self) -> NodeId {
        self.down
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn branch(&self) -> BranchId {
        self.branch
    }

    /// The endpoint that is not `node`.
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if node == self.up { self.down } else { self.up }
    }
}
