//! Layered topological sort with detached-node detection.
//!
//! # Layers
//!
//! Layer 0 holds every node with no outgoing edges (the sinks). A node sits in
//! layer `n` once every one of its destinations has been placed in some layer
//! below `n`. Nodes inside one layer never point at each other.
//!
//! # Detached Nodes
//!
//! A node with an edge to a key that is not in the graph can never be placed.
//! Neither can anything that waits on it, directly or transitively. All such
//! nodes are reported as **detached** instead of being layered.
//!
//! # Algorithm
//!
//! Frontier expansion in the style of Kahn's algorithm, walking incoming
//! edges upward from the sinks:
//!
//! 1. Seed layer 0 with the sinks; mark nodes with a dangling destination as
//!    detached right away.
//! 2. Candidates for the next layer are the present predecessors of the
//!    previous layer plus every candidate deferred last round.
//! 3. A candidate whose destinations are all placed is promoted; the rest are
//!    deferred.
//! 4. Stop at the first empty layer. Every present node never placed is
//!    detached.
//!
//! Order within a layer and within the detached list is unspecified.
//!
//! # Complexity
//!
//! Each promotion test is O(out-degree). A deferred candidate is retried once
//! per round it waits, so the bound is O(V+E) per round and O(L·(V+E)) in
//! the worst case for L layers.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use super::store::{Dag, NodeKey};

// ---------------------------------------------------------------------------
// Layering
// ---------------------------------------------------------------------------

/// Result of [`Dag::topological_sort`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layering<K> {
    /// `layers[0]` are the sinks; each later layer depends only on earlier
    /// ones. Never contains an empty layer.
    pub layers: Vec<Vec<K>>,
    /// Present nodes that wait on a dangling or never-placed destination.
    pub detached: Vec<K>,
}

impl<K: NodeKey> Layering<K> {
    /// Number of layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of nodes placed in some layer.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Index of the layer holding `key`, if it was placed.
    #[must_use]
    pub fn layer_of(&self, key: &K) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(key))
    }

    /// Return `true` if `key` was reported as detached.
    #[must_use]
    pub fn is_detached(&self, key: &K) -> bool {
        self.detached.contains(key)
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

impl<K: NodeKey, V: ?Sized> Dag<K, V> {
    /// Sort the graph into layers, sinks first, and collect detached nodes.
    ///
    /// An empty graph yields no layers and no detached nodes.
    #[must_use]
    #[instrument(skip_all, fields(nodes = self.len()))]
    pub fn topological_sort(&self) -> Layering<K> {
        let mut sinks: Vec<&K> = Vec::new();
        let mut dangling: HashSet<&K> = HashSet::new();

        for key in self.keys() {
            if self.out_degree(key) == 0 {
                sinks.push(key);
            } else if self.outgoing_of(key).any(|dest| !self.contains(dest)) {
                dangling.insert(key);
            }
        }

        let mut placed: HashSet<&K> = sinks.iter().copied().collect();
        let mut layers: Vec<Vec<&K>> = Vec::new();
        let mut frontier = sinks;
        let mut deferred: Vec<&K> = Vec::new();

        while !frontier.is_empty() {
            let mut seen: HashSet<&K> = HashSet::new();
            let candidates: Vec<&K> = frontier
                .iter()
                .flat_map(|key| self.incoming_of(key))
                .chain(deferred.iter().copied())
                .filter(|key| {
                    self.contains(key)
                        && !placed.contains(*key)
                        && !dangling.contains(*key)
                        && seen.insert(*key)
                })
                .collect();

            layers.push(frontier);

            let (next, waiting): (Vec<&K>, Vec<&K>) = candidates
                .into_iter()
                .partition(|key| self.outgoing_of(key).all(|dest| placed.contains(dest)));

            placed.extend(next.iter().copied());
            deferred = waiting;
            frontier = next;
        }

        let detached: Vec<K> = self
            .keys()
            .filter(|key| !placed.contains(*key))
            .cloned()
            .collect();

        debug!(
            layers = layers.len(),
            placed = placed.len(),
            detached = detached.len(),
            dangling = dangling.len(),
            "topological sort complete"
        );

        Layering {
            layers: layers
                .into_iter()
                .map(|layer| layer.into_iter().cloned().collect())
                .collect(),
            detached,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
