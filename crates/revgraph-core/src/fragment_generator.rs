//! Maximal-fragment composition and reachability queries.

use std::collections::{HashSet, VecDeque};

use crate::edge::EdgeKind;
use crate::fragment::GraphFragment;
use crate::graph::Graph;
use crate::node::{NodeId, NodeKind};
use crate::refs::RefLookup;
use crate::short_fragment::{Direction, ShortFragmentGenerator};

/// Search bounds for fragment discovery.
#[derive(Debug, Clone, Copy)]
pub struct FragmentOptions {
    /// Node cap for a single short-fragment walk.
    pub max_short_fragment_nodes: usize,
    /// How many times `fragment` re-anchors upward before giving up.
    pub max_search_attempts: usize,
}

impl Default for FragmentOptions {
    fn default() -> Self {
        Self {
            max_short_fragment_nodes: 100,
            max_search_attempts: 20,
        }
    }
}

impl FragmentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_short_fragment_nodes(mut self, max: usize) -> Self {
        self.max_short_fragment_nodes = max;
        self
    }

    pub fn with_max_search_attempts(mut self, max: usize) -> Self {
        self.max_search_attempts = max;
        self
    }
}

/// Computes the maximal fragment usable for one hide/show action, anchored at
/// a node or edge the caller selected.
pub struct FragmentGenerator<'g, R> {
    graph: &'g Graph,
    refs: &'g R,
    options: FragmentOptions,
}

impl<'g, R: RefLookup> FragmentGenerator<'g, R> {
    pub fn new(graph: &'g Graph, refs: &'g R, options: FragmentOptions) -> Self {
        Self {
            graph,
            refs,
            options,
        }
    }

    fn short(&self) -> ShortFragmentGenerator<'g, R> {
        ShortFragmentGenerator::new(self.graph, self.refs, self.options.max_short_fragment_nodes)
    }

    pub fn maximum_down_fragment(&self, node: NodeId) -> Option<GraphFragment> {
        self.maximum_fragment(node, Direction::Down)
    }

    pub fn maximum_up_fragment(&self, node: NodeId) -> Option<GraphFragment> {
        self.maximum_fragment(node, Direction::Up)
    }

    /// Chain short fragments in one direction, re-anchoring at each far
    /// boundary; a boundary with refs must stay visible, so growth stops
    /// there.
    ///
    /// The anchor-side boundary is fixed for the whole composition, so a
    /// violation there (several crossing edges, or a collapsed one) can never
    /// heal and ends the search. The far side moves with each absorbed span —
    /// a collapsed edge at the current far boundary becomes interior once the
    /// walk grows past it — so the far side only has to hold for the fragment
    /// finally returned; the last composition state where it held is kept.
    fn maximum_fragment(&self, start: NodeId, direction: Direction) -> Option<GraphFragment> {
        let short = self.short();
        let mut fragment = short.short_fragment(start, direction)?;
        if !self.anchor_side_ok(&fragment, direction) {
            return None;
        }
        let mut last_good = if self.far_side_ok(&fragment, direction) {
            Some(fragment.clone())
        } else {
            None
        };

        loop {
            let boundary = match direction {
                Direction::Down => fragment.down_node(),
                Direction::Up => fragment.up_node(),
            };
            if self.unconcealable(boundary) {
                break;
            }
            let Some(next) = short.short_fragment(boundary, direction) else {
                break;
            };

            let mut intermediates = fragment.intermediates().clone();
            intermediates.insert(boundary);
            intermediates.extend(next.intermediates());
            let merged = match direction {
                Direction::Down => {
                    GraphFragment::new(fragment.up_node(), next.down_node(), intermediates)
                }
                Direction::Up => {
                    GraphFragment::new(next.up_node(), fragment.down_node(), intermediates)
                }
            };
            if !self.anchor_side_ok(&merged, direction) {
                break;
            }
            fragment = merged;
            if self.far_side_ok(&fragment, direction) {
                last_good = Some(fragment.clone());
            }
        }
        last_good
    }

    /// Resolve the fragment a selection on `node` should act on.
    ///
    /// If no down-fragment exists at the node itself, re-anchor upward
    /// through up-edges (first edge each step, bounded by the retry cap)
    /// until one is found, then grow the maximal up-fragment from the same
    /// anchor and merge the halves. Spans with no intermediate nodes are not
    /// worth collapsing and yield `None`.
    pub fn fragment(&self, node: NodeId) -> Option<GraphFragment> {
        let mut anchor = node;
        let mut attempts = 0;
        let down = loop {
            if let Some(found) = self.maximum_down_fragment(anchor) {
                break found;
            }
            if attempts >= self.options.max_search_attempts {
                return None;
            }
            attempts += 1;
            let &first = self.graph.node(anchor).up_edges().first()?;
            anchor = self.graph.edge(first).up_node();
        };

        let merged = match self.maximum_up_fragment(anchor) {
            Some(up) => {
                let mut intermediates = up.intermediates().clone();
                intermediates.insert(anchor);
                intermediates.extend(down.intermediates());
                GraphFragment::new(up.up_node(), down.down_node(), intermediates)
            }
            None => down.clone(),
        };

        if merged.has_intermediates() && self.collapsible(&merged) {
            return Some(merged);
        }
        // The merge can turn a boundary-adjacent collapsed edge interior side
        // into a violation; the down half alone is still sound.
        if down.has_intermediates() {
            return Some(down);
        }
        None
    }

    /// Every node reachable from `node` following edges both ways; the node
    /// itself included. Pure set membership, no ordering guarantee.
    pub fn all_commits_current_branch(&self, node: NodeId) -> HashSet<NodeId> {
        self.reachable(node, true, true)
    }

    /// Every node reachable from `node` following up-edges only.
    pub fn up_nodes(&self, node: NodeId) -> HashSet<NodeId> {
        self.reachable(node, true, false)
    }

    fn reachable(&self, start: NodeId, up: bool, down: bool) -> HashSet<NodeId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let node = self.graph.node(current);
            if up {
                for &edge in node.up_edges() {
                    let next = self.graph.edge(edge).up_node();
                    if !visited.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
            if down {
                for &edge in node.down_edges() {
                    let next = self.graph.edge(edge).down_node();
                    if !visited.contains(&next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        visited
    }

    fn unconcealable(&self, node: NodeId) -> bool {
        let node = self.graph.node(node);
        node.kind() == NodeKind::Commit && self.refs.has_refs(node.commit())
    }

    /// Both boundaries of a collapse must be crossed by exactly one `Usual`
    /// edge; anything else the hide protocol cannot invert.
    fn collapsible(&self, fragment: &GraphFragment) -> bool {
        self.up_boundary_ok(fragment) && self.down_boundary_ok(fragment)
    }

    fn anchor_side_ok(&self, fragment: &GraphFragment, direction: Direction) -> bool {
        match direction {
            Direction::Down => self.up_boundary_ok(fragment),
            Direction::Up => self.down_boundary_ok(fragment),
        }
    }

    fn far_side_ok(&self, fragment: &GraphFragment, direction: Direction) -> bool {
        match direction {
            Direction::Down => self.down_boundary_ok(fragment),
            Direction::Up => self.up_boundary_ok(fragment),
        }
    }

    fn up_boundary_ok(&self, fragment: &GraphFragment) -> bool {
        if !fragment.has_intermediates() {
            return true;
        }
        let mut crossings = 0;
        for &edge_id in self.graph.node(fragment.up_node()).down_edges() {
            let edge = self.graph.edge(edge_id);
            if !fragment.intermediates().contains(&edge.down_node()) {
                continue;
            }
            if edge.kind() != EdgeKind::Usual {
                return false;
            }
            crossings += 1;
        }
        crossings == 1
    }

    fn down_boundary_ok(&self, fragment: &GraphFragment) -> bool {
        if !fragment.has_intermediates() {
            return true;
        }
        let mut crossings = 0;
        for &edge_id in self.graph.node(fragment.down_node()).up_edges() {
            let edge = self.graph.edge(edge_id);
            if !fragment.intermediates().contains(&edge.up_node()) {
                continue;
            }
            if edge.kind() != EdgeKind::Usual {
                return false;
            }
            crossings += 1;
        }
        crossings == 1
    }
}
