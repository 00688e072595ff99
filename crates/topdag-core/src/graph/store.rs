//! Key-indexed node/edge store with bidirectional adjacency.
//!
//! # Data Model
//!
//! - `payloads`: key → shared payload handle (`Rc<V>`).
//! - `outgoing`: key → set of destination keys. Present for every node,
//!   possibly empty, and for nothing else.
//! - `incoming`: key → set of source keys. May exist for keys that were never
//!   added: an edge may name a destination that is not (yet) a node. Such
//!   **dangling** edges are legal and are resolved at query time.
//!
//! # Invariants
//!
//! 1. `payloads` and `outgoing` have the same key set.
//! 2. No walk along outgoing edges returns to its starting node.
//! 3. For every edge `a → b` where `b` is present, `incoming[b]` contains `a`.
//!
//! [`Dag::add_node`] validates (2) through the cycle guard before touching any
//! state, so a rejected insertion leaves the graph unchanged.
//!
//! # Payload Sharing
//!
//! [`Dag::snapshot_copy`] builds new topology containers but clones the `Rc`
//! handles, so both graphs alias the same payload values. Rewiring one graph
//! never affects the other; mutating a payload through interior mutability is
//! visible through both.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use crate::error::DagError;

// ---------------------------------------------------------------------------
// NodeKey
// ---------------------------------------------------------------------------

/// Requirements on node keys.
///
/// Keys must be hashable for map/set membership and `Debug` so errors and log
/// events can name them. Blanket-implemented for every qualifying type.
pub trait NodeKey: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> NodeKey for T {}

/// Iterator over one adjacency set; empty when the key has no entry.
pub(crate) type Neighbors<'a, K> = std::iter::Flatten<std::option::IntoIter<&'a HashSet<K>>>;

// ---------------------------------------------------------------------------
// Dag
// ---------------------------------------------------------------------------

/// An acyclic directed graph of keyed payloads.
///
/// `V` may be unsized (e.g. `dyn Any`); payloads are held behind `Rc` so a
/// [snapshot](Dag::snapshot_copy) can share them.
pub struct Dag<K, V: ?Sized> {
    /// key → payload.
    payloads: HashMap<K, Rc<V>>,
    /// key → destinations of its outgoing edges.
    outgoing: HashMap<K, HashSet<K>>,
    /// key → sources of edges pointing at it (the key need not be present).
    incoming: HashMap<K, HashSet<K>>,
}

impl<K, V: ?Sized> Default for Dag<K, V> {
    fn default() -> Self {
        Self {
            payloads: HashMap::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
        }
    }
}

impl<K: NodeKey, V: ?Sized> Clone for Dag<K, V> {
    /// Same as [`Dag::snapshot_copy`].
    fn clone(&self) -> Self {
        self.snapshot_copy()
    }
}

impl<K: fmt::Debug, V: ?Sized> fmt::Debug for Dag<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dag")
            .field("outgoing", &self.outgoing)
            .field("incoming", &self.incoming)
            .finish_non_exhaustive()
    }
}

impl<K: NodeKey, V: ?Sized> Dag<K, V> {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add a node with its payload and outgoing edges.
    ///
    /// Destinations need not be present yet; repeated destinations collapse.
    /// The insertion is atomic: either the node and all of its edges are
    /// added, or nothing changes.
    ///
    /// # Errors
    ///
    /// - [`DagError::DuplicateKey`] if `key` is already present.
    /// - [`DagError::CycleDetected`] if any new edge would close a cycle. The
    ///   error carries the witness path.
    pub fn add_node<I>(
        &mut self,
        key: K,
        payload: impl Into<Rc<V>>,
        outgoing: I,
    ) -> Result<(), DagError<K>>
    where
        I: IntoIterator<Item = K>,
    {
        if self.contains(&key) {
            return Err(DagError::DuplicateKey(key));
        }

        let destinations: HashSet<K> = outgoing.into_iter().collect();
        if let Some(path) = self.find_cycle(&key, &destinations) {
            debug!(?key, ?path, "rejected node: would close a cycle");
            return Err(DagError::CycleDetected { key, path });
        }

        for dest in &destinations {
            self.incoming
                .entry(dest.clone())
                .or_default()
                .insert(key.clone());
        }
        debug!(?key, out_degree = destinations.len(), "node added");
        self.payloads.insert(key.clone(), payload.into());
        self.outgoing.insert(key, destinations);
        Ok(())
    }

    /// Remove a node and its outgoing edges, returning its payload handle.
    ///
    /// Edges from *other* nodes that point at `key` are left in place and
    /// become dangling; removal does not cascade.
    ///
    /// # Errors
    ///
    /// [`DagError::NodeNotFound`] if `key` is not present.
    pub fn remove_node(&mut self, key: &K) -> Result<Rc<V>, DagError<K>> {
        let Some(payload) = self.payloads.remove(key) else {
            return Err(DagError::NodeNotFound(key.clone()));
        };

        let destinations = self.outgoing.remove(key).unwrap_or_default();
        for dest in &destinations {
            if let Some(sources) = self.incoming.get_mut(dest) {
                sources.remove(key);
                if sources.is_empty() {
                    self.incoming.remove(dest);
                }
            }
        }

        debug!(?key, out_degree = destinations.len(), "node removed");
        Ok(payload)
    }

    /// Build a structurally independent copy that shares payload handles.
    ///
    /// The adjacency maps and sets are new; each payload `Rc` is cloned, not
    /// the value behind it.
    #[must_use]
    pub fn snapshot_copy(&self) -> Self {
        Self {
            payloads: self
                .payloads
                .iter()
                .map(|(key, payload)| (key.clone(), Rc::clone(payload)))
                .collect(),
            outgoing: self.outgoing.clone(),
            incoming: self.incoming.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Return `true` if a node with this key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.payloads.contains_key(key)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Return `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Number of stored edges, dangling ones included.
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(HashSet::len).sum()
    }

    /// The shared payload handle for `key`.
    pub fn get(&self, key: &K) -> Option<&Rc<V>> {
        self.payloads.get(key)
    }

    /// The payload for `key`.
    pub fn payload(&self, key: &K) -> Option<&V> {
        self.payloads.get(key).map(|payload| &**payload)
    }

    /// Iterate over every node key. Order is unspecified.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.payloads.keys()
    }

    /// Iterate over every `(key, payload)` pair. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.payloads
            .iter()
            .map(|(key, payload)| (key, &**payload))
    }

    /// Destinations of `key`'s outgoing edges.
    ///
    /// Returns an empty set if the key is not present.
    pub fn outgoing(&self, key: &K) -> HashSet<&K> {
        self.outgoing_of(key).collect()
    }

    /// Sources of edges pointing at `key`, whether or not `key` is present.
    ///
    /// Returns an empty set if nothing points at the key.
    pub fn incoming(&self, key: &K) -> HashSet<&K> {
        self.incoming_of(key).collect()
    }

    /// Number of outgoing edges (0 if absent).
    pub fn out_degree(&self, key: &K) -> usize {
        self.outgoing.get(key).map_or(0, HashSet::len)
    }

    /// Number of incoming edges (0 if nothing points at the key).
    pub fn in_degree(&self, key: &K) -> usize {
        self.incoming.get(key).map_or(0, HashSet::len)
    }

    /// Present nodes with no incoming edges.
    pub fn roots(&self) -> Vec<&K> {
        self.keys().filter(|key| self.in_degree(key) == 0).collect()
    }

    /// Present nodes with no outgoing edges.
    pub fn sinks(&self) -> Vec<&K> {
        self.outgoing
            .iter()
            .filter(|(_, destinations)| destinations.is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    /// Return `true` if both graphs hold the very same payload value for
    /// `key` (as opposed to equal values).
    pub fn shares_payload(&self, other: &Self, key: &K) -> bool {
        match (self.payloads.get(key), other.payloads.get(key)) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn outgoing_of(&self, key: &K) -> Neighbors<'_, K> {
        self.outgoing.get(key).into_iter().flatten()
    }

    pub(crate) fn incoming_of(&self, key: &K) -> Neighbors<'_, K> {
        self.incoming.get(key).into_iter().flatten()
    }

    pub(crate) fn payload_entries(&self) -> impl Iterator<Item = (&K, &Rc<V>)> {
        self.payloads.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
