//! Façade over fragment discovery and visibility toggling.
//!
//! Owns the graph, the ref-lookup collaborator, and the controller, and is
//! the single surface the viewer talks to: resolve a clicked element to its
//! fragment, toggle it, or collapse/expand everything at once. After each
//! incremental change the registered listener is told which row range to
//! redraw; bulk operations suppress the per-step calls and fire one rebuild
//! notification instead.

use std::collections::HashSet;

use revgraph_error::Result;

use crate::commit::Commit;
use crate::edge::EdgeKind;
use crate::fragment::{GraphElement, GraphFragment};
use crate::fragment_controller::FragmentController;
use crate::fragment_generator::{FragmentGenerator, FragmentOptions};
use crate::graph::{Graph, Replace};
use crate::graph_builder::build_graph;
use crate::node::{NodeId, NodeKind};
use crate::refs::RefLookup;

/// Rendering-collaborator callbacks.
pub trait UpdateListener {
    /// One fragment was hidden or shown; redraw between these boundary
    /// nodes' rows.
    fn row_range_updated(&mut self, up: NodeId, down: NodeId);
    /// A bulk operation changed visibility wholesale; rebuild the view.
    fn graph_rebuilt(&mut self);
}

pub struct FragmentManager<R> {
    graph: Graph,
    refs: R,
    controller: FragmentController,
    options: FragmentOptions,
    listener: Option<Box<dyn UpdateListener>>,
}

impl<R: RefLookup> FragmentManager<R> {
    pub fn new(graph: Graph, refs: R) -> Self {
        Self::with_options(graph, refs, FragmentOptions::default())
    }

    pub fn with_options(graph: Graph, refs: R, options: FragmentOptions) -> Self {
        Self {
            graph,
            refs,
            controller: FragmentController::new(),
            options,
            listener: None,
        }
    }

    /// Build the graph from an ordered commit list and wrap it.
    pub fn from_commits(commits: &[Commit], refs: R) -> Result<Self> {
        Ok(Self::new(build_graph(commits)?, refs))
    }

    pub fn set_listener(&mut self, listener: Box<dyn UpdateListener>) {
        self.listener = Some(listener);
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn hidden_fragment_count(&self) -> usize {
        self.controller.hidden_count()
    }

    fn generator(&self) -> FragmentGenerator<'_, R> {
        FragmentGenerator::new(&self.graph, &self.refs, self.options)
    }

    /// Resolve a clicked element to the fragment it belongs to: the exact
    /// collapsed fragment for anything carrying a collapsed edge, otherwise
    /// the maximal collapsible fragment around it.
    pub fn relate_fragment(&self, element: GraphElement) -> Option<GraphFragment> {
        match element {
            GraphElement::Edge(edge_id) => {
                let edge = self.graph.edge(edge_id);
                if edge.kind() == EdgeKind::Collapsed {
                    return Some(GraphFragment::new(
                        edge.up_node(),
                        edge.down_node(),
                        HashSet::new(),
                    ));
                }
                self.generator().fragment(edge.up_node())
            }
            GraphElement::Node(node_id) => {
                if let Some(fragment) = self.adjacent_collapsed_fragment(node_id) {
                    return Some(fragment);
                }
                self.generator().fragment(node_id)
            }
        }
    }

    /// Toggle a fragment: one that still carries its intermediate nodes gets
    /// hidden, one related from a collapsed edge gets shown.
    pub fn change_visibility(&mut self, fragment: &GraphFragment) -> Result<Replace> {
        self.set_visible(fragment, !fragment.has_intermediates())
    }

    pub fn set_visible(&mut self, fragment: &GraphFragment, visible: bool) -> Result<Replace> {
        let replace = self
            .controller
            .set_visible(&mut self.graph, fragment, visible)?;
        if let Some(listener) = &mut self.listener {
            listener.row_range_updated(fragment.up_node(), fragment.down_node());
        }
        Ok(replace)
    }

    pub fn is_visible(&self, fragment: &GraphFragment) -> bool {
        self.controller.is_visible(&self.graph, fragment)
    }

    /// Collapse the maximal down-fragment at every still-uncollapsed commit
    /// node, walking visible rows top to bottom. Fires one rebuild
    /// notification at the end instead of one per fragment.
    pub fn hide_all(&mut self) -> Result<()> {
        let mut row_index = 0;
        let mut collapsed = 0usize;
        while row_index < self.graph.visible_row_count() {
            let log_index = self
                .graph
                .visible_row(row_index)
                .expect("row index bounded by visible count")
                .log_index();
            let candidates: Vec<NodeId> = self
                .graph
                .row(log_index)
                .nodes()
                .iter()
                .copied()
                .filter(|&n| {
                    let node = self.graph.node(n);
                    node.kind() == NodeKind::Commit && node.is_visible()
                })
                .collect();

            for node_id in candidates {
                let already_collapsed = self
                    .graph
                    .node(node_id)
                    .down_edges()
                    .iter()
                    .any(|&e| self.graph.edge(e).kind() == EdgeKind::Collapsed);
                if already_collapsed {
                    continue;
                }
                let Some(fragment) = self.generator().maximum_down_fragment(node_id) else {
                    continue;
                };
                if !fragment.has_intermediates() {
                    continue;
                }
                self.controller
                    .set_visible(&mut self.graph, &fragment, false)?;
                collapsed += 1;
            }
            row_index += 1;
        }

        tracing::debug!(
            "hide_all collapsed {} fragments, {} rows visible",
            collapsed,
            self.graph.visible_row_count(),
        );
        if let Some(listener) = &mut self.listener {
            listener.graph_rebuilt();
        }
        Ok(())
    }

    /// Expand every collapsed fragment in one step and fire one rebuild
    /// notification.
    pub fn show_all(&mut self) -> Result<()> {
        self.controller.show_all(&mut self.graph)?;
        if let Some(listener) = &mut self.listener {
            listener.graph_rebuilt();
        }
        Ok(())
    }

    /// Branch extent: every node reachable from `node` in both directions,
    /// the node included.
    pub fn all_commits_current_branch(&self, node: NodeId) -> HashSet<NodeId> {
        self.generator().all_commits_current_branch(node)
    }

    /// Every node reachable from `node` through up-edges, the node included.
    pub fn up_nodes(&self, node: NodeId) -> HashSet<NodeId> {
        self.generator().up_nodes(node)
    }

    fn adjacent_collapsed_fragment(&self, node_id: NodeId) -> Option<GraphFragment> {
        let node = self.graph.node(node_id);
        let collapsed = node
            .down_edges()
            .iter()
            .chain(node.up_edges())
            .copied()
            .find(|&e| self.graph.edge(e).kind() == EdgeKind::Collapsed)?;
        let edge = self.graph.edge(collapsed);
        Some(GraphFragment::new(
            edge.up_node(),
            edge.down_node(),
            HashSet::new(),
        ))
    }
}
