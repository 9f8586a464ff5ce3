//! Minimal collapsible-span search.
//!
//! From a starting node, walk one direction row by row until every path out
//! of the start has converged back onto a single commit — the smallest span
//! that could be collapsed. The walk is an iterative work-list over two
//! explicit sets: `visited` (reached nodes) and `waiting` (nodes some
//! traversed edge points at but the walk has not consumed yet).

use std::collections::HashSet;

use crate::edge::EdgeId;
use crate::fragment::GraphFragment;
use crate::graph::Graph;
use crate::node::{NodeId, NodeKind};
use crate::refs::RefLookup;

/// Walk direction in history order: `Down` toward ancestors (later rows),
/// `Up` toward descendants (earlier rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Down,
    Up,
}

pub struct ShortFragmentGenerator<'g, R> {
    graph: &'g Graph,
    refs: &'g R,
    /// Walks that visit more nodes than this fail; keeps runaway searches on
    /// fanned-out history bounded.
    max_nodes: usize,
}

impl<'g, R: RefLookup> ShortFragmentGenerator<'g, R> {
    pub fn new(graph: &'g Graph, refs: &'g R, max_nodes: usize) -> Self {
        Self {
            graph,
            refs,
            max_nodes,
        }
    }

    pub fn down_fragment(&self, start: NodeId) -> Option<GraphFragment> {
        self.short_fragment(start, Direction::Down)
    }

    pub fn up_fragment(&self, start: NodeId) -> Option<GraphFragment> {
        self.short_fragment(start, Direction::Up)
    }

    /// Find the nearest short fragment from `start` in `direction`.
    ///
    /// Succeeds when the walk reaches a commit node that is the only waiting
    /// node and all of whose predecessors-in-direction were already visited.
    /// Fails (`None`) when a traversed node is not simple, the walk runs off
    /// the end of the graph, the node cap is hit, or collapsing would leave a
    /// parallel edge between the boundaries.
    pub fn short_fragment(&self, start: NodeId, direction: Direction) -> Option<GraphFragment> {
        let mut waiting: HashSet<NodeId> = self
            .forward_edges(start, direction)
            .iter()
            .map(|&e| self.forward_end(e, direction))
            .collect();
        if waiting.is_empty() {
            return None;
        }

        let mut visited: HashSet<NodeId> = HashSet::from([start]);
        let mut intermediates: HashSet<NodeId> = HashSet::new();

        loop {
            if visited.len() > self.max_nodes {
                return None;
            }

            let candidate = self.next_candidate(&waiting, direction);
            let backward = self.backward_edges(candidate, direction);
            let converged = waiting.len() == 1
                && backward
                    .iter()
                    .all(|&e| visited.contains(&self.backward_end(e, direction)));

            if converged && self.graph.node(candidate).kind() == NodeKind::Commit {
                // A direct boundary-to-boundary edge parallel to the span
                // would survive the collapse; such spans stay expanded.
                if !intermediates.is_empty()
                    && backward
                        .iter()
                        .any(|&e| self.backward_end(e, direction) == start)
                {
                    return None;
                }
                let (up, down) = match direction {
                    Direction::Down => (start, candidate),
                    Direction::Up => (candidate, start),
                };
                return Some(GraphFragment::new(up, down, intermediates));
            }

            // Not the far boundary: the walk has to pass through it.
            if !self.is_simple(candidate) {
                return None;
            }
            waiting.remove(&candidate);
            visited.insert(candidate);
            intermediates.insert(candidate);

            let forward = self.forward_edges(candidate, direction);
            if forward.is_empty() {
                // Ran off the end of the graph.
                return None;
            }
            for &edge in &forward {
                waiting.insert(self.forward_end(edge, direction));
            }
        }
    }

    /// A node may sit inside a fragment only if it has at most one edge on
    /// each side and, for a real commit, no externally-visible refs.
    fn is_simple(&self, id: NodeId) -> bool {
        let node = self.graph.node(id);
        if node.up_edges().len() > 1 || node.down_edges().len() > 1 {
            return false;
        }
        node.kind() != NodeKind::Commit || !self.refs.has_refs(node.commit())
    }

    /// The waiting node nearest in row order; ties go to the lowest node id.
    fn next_candidate(&self, waiting: &HashSet<NodeId>, direction: Direction) -> NodeId {
        let nearest = match direction {
            Direction::Down => waiting
                .iter()
                .copied()
                .min_by_key(|&n| (self.graph.node(n).row(), n)),
            Direction::Up => waiting
                .iter()
                .copied()
                .max_by_key(|&n| (self.graph.node(n).row(), std::cmp::Reverse(n))),
        };
        nearest.expect("waiting set is never empty here")
    }

    fn forward_edges(&self, node: NodeId, direction: Direction) -> Vec<EdgeId> {
        let node = self.graph.node(node);
        match direction {
            Direction::Down => node.down_edges().to_vec(),
            Direction::Up => node.up_edges().to_vec(),
        }
    }

    fn backward_edges(&self, node: NodeId, direction: Direction) -> Vec<EdgeId> {
        let node = self.graph.node(node);
        match direction {
            Direction::Down => node.up_edges().to_vec(),
            Direction::Up => node.down_edges().to_vec(),
        }
    }

    fn forward_end(&self, edge: EdgeId, direction: Direction) -> NodeId {
        let edge = self.graph.edge(edge);
        match direction {
            Direction::Down => edge.down_node(),
            Direction::Up => edge.up_node(),
        }
    }

    fn backward_end(&self, edge: EdgeId, direction: Direction) -> NodeId {
        let edge = self.graph.edge(edge);
        match direction {
            Direction::Down => edge.up_node(),
            Direction::Up => edge.down_node(),
        }
    }
}
