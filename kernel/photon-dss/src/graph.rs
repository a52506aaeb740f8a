//! Signal-routing graph supplied by the application.
//!
//! The edge list is validated and stored as a whole. Routing queries go
//! through an adjacency table built once at that point: every pipe feeds at
//! most one blender and every blender drives at most one output, so a
//! single `next` slot per node is enough.

use photon_driver_api::DriverError;
use planck_noalloc::vec::ArrayVec;

use crate::config::MAX_EDGES;
use crate::node::{NodeId, NodeKind};

/// Directed signal-flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Upstream node.
    pub start: NodeId,
    /// Downstream node.
    pub end: NodeId,
}

impl Edge {
    /// Creates an edge.
    pub const fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }
}

/// A validated edge list plus its adjacency table.
pub struct Graph {
    edges: ArrayVec<Edge, MAX_EDGES>,
    next: [Option<NodeId>; NodeId::COUNT],
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// An empty graph.
    pub const fn new() -> Self {
        Self {
            edges: ArrayVec::new(),
            next: [None; NodeId::COUNT],
        }
    }

    /// Validates `edges` and builds the adjacency table.
    ///
    /// Accepted edges are `DssIn -> pipe`, `pipe -> blender` and
    /// `blender -> output`. Repeating an edge is harmless; giving a pipe two
    /// blenders or a blender two outputs is not.
    ///
    /// # Errors
    ///
    /// - [`DriverError::OutOfRange`] for more than [`MAX_EDGES`] edges.
    /// - [`DriverError::InvalidParams`] for any other malformed edge.
    pub fn build(edges: &[Edge]) -> Result<Self, DriverError> {
        if edges.len() > MAX_EDGES {
            return Err(DriverError::OutOfRange);
        }
        let mut graph = Self::new();
        for &edge in edges {
            match (edge.start.kind(), edge.end.kind()) {
                (NodeKind::Input, NodeKind::Pipe) => {}
                (NodeKind::Pipe, NodeKind::Blender) | (NodeKind::Blender, NodeKind::Output) => {
                    let slot = &mut graph.next[edge.start.index()];
                    match *slot {
                        Some(end) if end != edge.end => return Err(DriverError::InvalidParams),
                        _ => *slot = Some(edge.end),
                    }
                }
                _ => return Err(DriverError::InvalidParams),
            }
            if !graph.edges.contains(&edge) {
                graph
                    .edges
                    .try_push(edge)
                    .map_err(|_| DriverError::OutOfRange)?;
            }
        }
        Ok(graph)
    }

    /// The stored edges, in the order supplied (duplicates dropped).
    pub fn edges(&self) -> &[Edge] {
        self.edges.as_slice()
    }

    /// Returns `true` when no configuration is stored.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Blender fed by `pipe`.
    pub fn blender_of(&self, pipe: NodeId) -> Option<NodeId> {
        (pipe.kind() == NodeKind::Pipe)
            .then(|| self.next[pipe.index()])
            .flatten()
    }

    /// Output driven by `blender`.
    pub fn output_of(&self, blender: NodeId) -> Option<NodeId> {
        (blender.kind() == NodeKind::Blender)
            .then(|| self.next[blender.index()])
            .flatten()
    }

    /// Blender driving `output`.
    pub fn blender_driving(&self, output: NodeId) -> Option<NodeId> {
        NodeId::ALL
            .into_iter()
            .filter(|n| n.kind() == NodeKind::Blender)
            .find(|b| self.next[b.index()] == Some(output))
    }

    /// Every `(pipe, blender)` pair, in edge order.
    pub fn pipes(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges
            .iter()
            .filter(|e| e.start.kind() == NodeKind::Pipe)
            .map(|e| (e.start, e.end))
    }
}
