// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Undirected adjacency over diagram node names.
//!
//! The graph is built once from the diagram's connector list and is read-only
//! afterwards. `BTreeMap`/`BTreeSet` keep every traversal deterministic.

use std::collections::{BTreeMap, BTreeSet};

/// Builder for [`Graph`]. Edge insertion is symmetric: both directions are
/// added, so the finished adjacency always satisfies
/// `a ∈ neighbors(b) ⇔ b ∈ neighbors(a)`.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `name` exists in the adjacency map, with no edges yet.
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.adjacency.entry(name.into()).or_default();
    }

    /// Inserts the undirected edge `source ↔ destination`.
    ///
    /// Self-loops (`source == destination`, a reflexive relation edge) are
    /// preserved: the node becomes its own neighbor.
    pub fn add_edge(&mut self, source: &str, destination: &str) {
        self.adjacency
            .entry(source.to_owned())
            .or_default()
            .insert(destination.to_owned());
        self.adjacency
            .entry(destination.to_owned())
            .or_default()
            .insert(source.to_owned());
    }

    /// Finalizes the adjacency into an immutable [`Graph`].
    #[must_use]
    pub fn build(self) -> Graph {
        Graph {
            adjacency: self.adjacency,
        }
    }
}

/// Immutable undirected graph over node names.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl Graph {
    /// Builds a graph from a flat list of `(source, destination)` pairs.
    #[must_use]
    pub fn from_edges<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut builder = GraphBuilder::new();
        for (source, destination) in pairs {
            builder.add_edge(source.as_ref(), destination.as_ref());
        }
        builder.build()
    }

    /// Returns `true` if `node` appears in the adjacency map.
    #[must_use]
    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Iterates over the neighbors of `node` in lexicographic order.
    ///
    /// Unknown nodes yield an empty iterator.
    pub fn neighbors(&self, node: &str) -> impl Iterator<Item = &String> {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Number of neighbors of `node` (0 for unknown nodes).
    #[must_use]
    pub fn degree(&self, node: &str) -> usize {
        self.adjacency.get(node).map_or(0, BTreeSet::len)
    }

    /// Iterates over all node names in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.adjacency.keys()
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_insertion_is_symmetric() {
        let mut builder = GraphBuilder::new();
        builder.add_edge("Advises", "Professor");
        let graph = builder.build();

        assert!(graph.neighbors("Advises").any(|n| n == "Professor"));
        assert!(graph.neighbors("Professor").any(|n| n == "Advises"));
    }

    #[test]
    fn self_loops_are_preserved() {
        let graph = Graph::from_edges([("Friends", "Friends")]);
        assert!(graph.neighbors("Friends").any(|n| n == "Friends"));
        assert_eq!(graph.degree("Friends"), 1);
    }

    #[test]
    fn unknown_node_has_no_neighbors() {
        let graph = Graph::from_edges([("a", "b")]);
        assert_eq!(graph.neighbors("missing").count(), 0);
        assert!(!graph.contains("missing"));
    }

    #[test]
    fn isolated_node_survives_build() {
        let mut builder = GraphBuilder::new();
        builder.add_node("Orphan");
        builder.add_edge("a", "b");
        let graph = builder.build();
        assert!(graph.contains("Orphan"));
        assert_eq!(graph.degree("Orphan"), 0);
        assert_eq!(graph.len(), 3);
    }
}
