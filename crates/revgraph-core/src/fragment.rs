//! Fragment value types.

use std::collections::HashSet;

use crate::edge::EdgeId;
use crate::node::NodeId;

/// A selectable piece of the graph, as the viewer reports clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphElement {
    Node(NodeId),
    Edge(EdgeId),
}

/// A collapsible span: two boundary nodes plus every node strictly between
/// them on the run.
///
/// Fragments are ephemeral — computed on demand, never stored in the graph.
/// A fragment discovered on the expanded graph carries its intermediate
/// nodes; one related from an already-collapsed edge has an empty
/// intermediate set (the nodes are hidden and the registry knows how to get
/// them back).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFragment {
    up: NodeId,
    down: NodeId,
    intermediates: HashSet<NodeId>,
}

impl GraphFragment {
    pub fn new(up: NodeId, down: NodeId, intermediates: HashSet<NodeId>) -> Self {
        Self {
            up,
            down,
            intermediates,
        }
    }

    /// The boundary in the earlier row.
    pub fn up_node(&self) -> NodeId {
        self.up
    }

    /// The boundary in the later row.
    pub fn down_node(&self) -> NodeId {
        self.down
    }

    pub fn intermediates(&self) -> &HashSet<NodeId> {
        &self.intermediates
    }

    pub fn has_intermediates(&self) -> bool {
        !self.intermediates.is_empty()
    }
}
