// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Path enumeration over the diagram graph.
//!
//! Three variants with deliberately different termination rules:
//! * [`find_all_paths`] — exhaustive simple-path enumeration (no revisits);
//! * [`shortest_paths`] — the minimal-length subset of an enumeration;
//! * [`random_walk`] — a depth-bounded walk that MAY revisit nodes.
//!
//! The revisit asymmetry between the exhaustive and random variants is
//! intentional: one is a complete enumeration, the other a cheap heuristic.

use tracing::debug;

use crate::graph::Graph;
use crate::prng::Prng;

/// Ordered node-name sequence from a walk's start to its end.
pub type Path = Vec<String>;

/// Returns every simple path from `start` to `end`.
///
/// Recursive depth-first search: a branch extends the current path with any
/// neighbor not yet on it and terminates when `end` is reached. Exponential
/// in the worst case, which is acceptable for diagrams of tens of nodes.
///
/// `start == end` yields the single trivial path `[start]`, even when the
/// node is unknown to the graph. A start with no neighbors yields nothing.
#[must_use]
pub fn find_all_paths(graph: &Graph, start: &str, end: &str) -> Vec<Path> {
    let mut found = Vec::new();
    let mut current = vec![start.to_owned()];
    extend_path(graph, start, end, &mut current, &mut found);
    debug!(start, end, count = found.len(), "enumerated simple paths");
    found
}

fn extend_path(graph: &Graph, node: &str, end: &str, current: &mut Path, found: &mut Vec<Path>) {
    if node == end {
        found.push(current.clone());
        return;
    }
    for next in graph.neighbors(node) {
        if current.iter().any(|seen| seen == next) {
            continue;
        }
        current.push(next.clone());
        extend_path(graph, next, end, current, found);
        current.pop();
    }
}

/// Keeps only the paths of minimal length; ties all survive.
///
/// Empty input stays empty; nonempty input is never emptied.
#[must_use]
pub fn shortest_paths(paths: Vec<Path>) -> Vec<Path> {
    let Some(min) = paths.iter().map(Vec::len).min() else {
        return Vec::new();
    };
    paths.into_iter().filter(|p| p.len() == min).collect()
}

/// Walks up to `depth` uniformly random steps from `start`.
///
/// Unlike [`find_all_paths`], prior nodes may be revisited. The walk stops
/// early only at a dead end (a node with no neighbors); depth 0 returns just
/// `[start]`.
#[must_use]
pub fn random_walk(graph: &Graph, start: &str, depth: usize, prng: &mut Prng) -> Path {
    let mut path = vec![start.to_owned()];
    let mut node = start.to_owned();
    for _ in 0..depth {
        let neighbors: Vec<&String> = graph.neighbors(&node).collect();
        if neighbors.is_empty() {
            break;
        }
        let next = neighbors[prng.next_index(neighbors.len())].clone();
        path.push(next.clone());
        node = next;
    }
    debug!(start, steps = path.len() - 1, "random walk finished");
    path
}
