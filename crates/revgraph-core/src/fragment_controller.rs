//! Collapse/expand protocol and the hidden-fragment registry.
//!
//! Hiding a fragment swaps the two boundary-adjacent `Usual` edges for one
//! synthetic `Collapsed` edge and records which inner nodes the originals
//! attached to, keyed by the new edge. The registry is the single source of
//! truth for what is collapsed; showing consults it to rebuild the original
//! wiring exactly. Every operation validates its preconditions before
//! touching the graph, so a failed call leaves no partial state.

use std::collections::{HashMap, HashSet, VecDeque};

use revgraph_error::{Error, Result};

use crate::edge::{EdgeId, EdgeKind};
use crate::fragment::GraphFragment;
use crate::graph::{Graph, Replace};
use crate::node::NodeId;

/// Where the removed boundary edges attached, remembered for exact
/// restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HiddenFragment {
    up_inner: NodeId,
    down_inner: NodeId,
}

#[derive(Debug, Default)]
pub struct FragmentController {
    hidden: HashMap<EdgeId, HiddenFragment>,
}

impl FragmentController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently collapsed fragments.
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn set_visible(
        &mut self,
        graph: &mut Graph,
        fragment: &GraphFragment,
        visible: bool,
    ) -> Result<Replace> {
        if visible {
            self.show(graph, fragment)
        } else {
            self.hide(graph, fragment)
        }
    }

    /// True iff no `Collapsed` edge leaves the fragment's up boundary for its
    /// down boundary.
    pub fn is_visible(&self, graph: &Graph, fragment: &GraphFragment) -> bool {
        self.collapsed_edge(graph, fragment).is_none()
    }

    /// Collapse a fragment discovered on the expanded graph.
    pub fn hide(&mut self, graph: &mut Graph, fragment: &GraphFragment) -> Result<Replace> {
        if !fragment.has_intermediates() {
            return Err(Error::assertion_failed(
                "fragment has no intermediate nodes to hide",
            )
            .with_operation("fragment_controller::hide"));
        }
        if let Some(existing) = self.direct_edge(graph, fragment) {
            let kind = graph.edge(existing).kind();
            return Err(match kind {
                EdgeKind::Collapsed => Error::assertion_failed("fragment is already collapsed"),
                EdgeKind::Usual => Error::invariant_violation(
                    "fragment boundaries are directly connected; collapsing would leave a parallel edge",
                ),
            }
            .with_operation("fragment_controller::hide"));
        }
        let up_edge = self.leaving_edge(graph, fragment)?;
        let down_edge = self.entering_edge(graph, fragment)?;

        let up_inner = graph.edge(up_edge).down_node();
        let down_inner = graph.edge(down_edge).up_node();
        let (from, to) = self.boundary_row_range(graph, fragment)?;

        graph.remove_edge(up_edge);
        graph.remove_edge(down_edge);
        let branch = graph.node(fragment.up_node()).branch();
        let long_edge = graph.add_edge(
            fragment.up_node(),
            fragment.down_node(),
            EdgeKind::Collapsed,
            branch,
        );
        self.hidden.insert(
            long_edge,
            HiddenFragment {
                up_inner,
                down_inner,
            },
        );
        for &node in fragment.intermediates() {
            graph.node_mut(node).set_visible(false);
        }

        graph
            .fix_row_visibility(from, to)
            .map_err(|e| e.with_operation("fragment_controller::hide"))
    }

    /// Expand a collapsed fragment, restoring the original wiring from the
    /// registry record.
    pub fn show(&mut self, graph: &mut Graph, fragment: &GraphFragment) -> Result<Replace> {
        let long_edge = self.collapsed_edge(graph, fragment).ok_or_else(|| {
            Error::assertion_failed("fragment is not collapsed")
                .with_operation("fragment_controller::show")
                .with_context("up", fragment.up_node().to_string())
                .with_context("down", fragment.down_node().to_string())
        })?;
        let record = *self.hidden.get(&long_edge).ok_or_else(|| {
            Error::assertion_failed("no hidden-fragment record for the collapsed edge")
                .with_operation("fragment_controller::show")
                .with_context("edge", long_edge.to_string())
        })?;

        // The hidden run still holds its interior edges; walking them both
        // validates the record and yields the nodes to reveal. Nested
        // collapsed edges are crossed, not expanded, so inner collapses
        // survive an outer expand.
        let hidden_nodes = self.hidden_region(graph, record)?;
        let (from, to) = self.boundary_row_range(graph, fragment)?;

        self.hidden.remove(&long_edge);
        graph.remove_edge(long_edge);
        graph.add_edge(
            fragment.up_node(),
            record.up_inner,
            EdgeKind::Usual,
            graph.node(record.up_inner).branch(),
        );
        graph.add_edge(
            record.down_inner,
            fragment.down_node(),
            EdgeKind::Usual,
            graph.node(record.down_inner).branch(),
        );
        for node in hidden_nodes {
            graph.node_mut(node).set_visible(true);
        }

        graph
            .fix_row_visibility(from, to)
            .map_err(|e| e.with_operation("fragment_controller::show"))
    }

    /// Restore every collapsed fragment and clear all hidden marks in one
    /// step.
    pub fn show_all(&mut self, graph: &mut Graph) -> Result<()> {
        let entries: Vec<(EdgeId, HiddenFragment)> = self.hidden.drain().collect();
        for (long_edge, record) in entries {
            let removed = graph.remove_edge(long_edge);
            graph.add_edge(
                removed.up_node(),
                record.up_inner,
                EdgeKind::Usual,
                graph.node(record.up_inner).branch(),
            );
            graph.add_edge(
                record.down_inner,
                removed.down_node(),
                EdgeKind::Usual,
                graph.node(record.down_inner).branch(),
            );
        }
        graph.mark_all_nodes_visible();
        graph.rebuild_visibility();
        Ok(())
    }

    /// The single `Usual` edge leaving the up boundary into the intermediate
    /// set; any other shape means the caller handed over a fragment the
    /// protocol cannot invert.
    fn leaving_edge(&self, graph: &Graph, fragment: &GraphFragment) -> Result<EdgeId> {
        let mut found = None;
        for &edge_id in graph.node(fragment.up_node()).down_edges() {
            if !fragment.intermediates().contains(&graph.edge(edge_id).down_node()) {
                continue;
            }
            self.check_boundary_edge(graph, edge_id, found, "up")?;
            found = Some(edge_id);
        }
        found.ok_or_else(|| {
            Error::assertion_failed("no edge crosses the up boundary")
                .with_operation("fragment_controller::hide")
        })
    }

    /// The single `Usual` edge entering the down boundary from the
    /// intermediate set.
    fn entering_edge(&self, graph: &Graph, fragment: &GraphFragment) -> Result<EdgeId> {
        let mut found = None;
        for &edge_id in graph.node(fragment.down_node()).up_edges() {
            if !fragment.intermediates().contains(&graph.edge(edge_id).up_node()) {
                continue;
            }
            self.check_boundary_edge(graph, edge_id, found, "down")?;
            found = Some(edge_id);
        }
        found.ok_or_else(|| {
            Error::assertion_failed("no edge crosses the down boundary")
                .with_operation("fragment_controller::hide")
        })
    }

    fn check_boundary_edge(
        &self,
        graph: &Graph,
        edge_id: EdgeId,
        already_found: Option<EdgeId>,
        side: &'static str,
    ) -> Result<()> {
        if graph.edge(edge_id).kind() != EdgeKind::Usual {
            return Err(Error::invariant_violation(format!(
                "edge at the {} boundary is not usual",
                side
            ))
            .with_operation("fragment_controller::hide")
            .with_context("edge", edge_id.to_string()));
        }
        if already_found.is_some() {
            return Err(Error::invariant_violation(format!(
                "more than one edge crosses the {} boundary",
                side
            ))
            .with_operation("fragment_controller::hide"));
        }
        Ok(())
    }

    /// Any edge connecting the two boundaries directly.
    fn direct_edge(&self, graph: &Graph, fragment: &GraphFragment) -> Option<EdgeId> {
        graph
            .node(fragment.up_node())
            .down_edges()
            .iter()
            .copied()
            .find(|&e| graph.edge(e).down_node() == fragment.down_node())
    }

    fn collapsed_edge(&self, graph: &Graph, fragment: &GraphFragment) -> Option<EdgeId> {
        self.direct_edge(graph, fragment)
            .filter(|&e| graph.edge(e).kind() == EdgeKind::Collapsed)
    }

    /// Every node of the hidden run between the two inner nodes.
    ///
    /// Removing the boundary edges at hide time disconnected the run from the
    /// visible graph, so the nodes to reveal are exactly the component around
    /// `up_inner`. The run may fan out and reconverge inside; nodes behind a
    /// nested collapsed edge lost their own boundary edges and stay out of
    /// reach.
    fn hidden_region(&self, graph: &Graph, record: HiddenFragment) -> Result<Vec<NodeId>> {
        let mut visited: HashSet<NodeId> = HashSet::from([record.up_inner]);
        let mut queue = VecDeque::from([record.up_inner]);
        while let Some(current) = queue.pop_front() {
            let node = graph.node(current);
            for &edge in node.up_edges().iter().chain(node.down_edges()) {
                let other = graph.edge(edge).other_end(current);
                if visited.insert(other) {
                    queue.push_back(other);
                }
            }
        }
        if !visited.contains(&record.down_inner) {
            return Err(Error::invariant_violation(
                "hidden run does not connect its inner nodes",
            )
            .with_operation("fragment_controller::show")
            .with_context("up_inner", record.up_inner.to_string())
            .with_context("down_inner", record.down_inner.to_string()));
        }
        Ok(visited.into_iter().collect())
    }

    /// Visible row indices of the two boundary rows, read before any
    /// mutation.
    fn boundary_row_range(&self, graph: &Graph, fragment: &GraphFragment) -> Result<(usize, usize)> {
        let up = graph.node(fragment.up_node());
        let down = graph.node(fragment.down_node());
        if !up.is_visible() || !down.is_visible() {
            return Err(
                Error::assertion_failed("fragment boundary node is not visible")
                    .with_operation("fragment_controller::set_visible"),
            );
        }
        let from = graph.row(up.row()).row_index();
        let to = graph.row(down.row()).row_index();
        Ok((from, to))
    }
}
