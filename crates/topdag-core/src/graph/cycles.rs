//! Reachability and cycle admission for [`Dag`].
//!
//! # Design
//!
//! - **BFS-based**: [`Dag::path_exists`] walks outgoing edges breadth-first
//!   and never re-enqueues a visited key, so each check is O(V+E).
//! - **Zero-length paths count**: a key reaches itself. This is what makes a
//!   new edge back to an existing predecessor register as a cycle.
//! - **Check before mutate**: [`Dag::add_node`] runs the admission rule to
//!   completion before any container is touched.
//!
//! # Admission Rule
//!
//! A new node `key` with destinations `D` closes a cycle iff `key ∈ D`
//! (self-loop) or some `d ∈ D` reaches some existing predecessor `p` of
//! `key`: the walk `key → d → … → p → key` is then a loop. A key nothing
//! points at yet can never be on a cycle through its own new edges.

use std::collections::{HashMap, HashSet, VecDeque};

use super::store::{Dag, NodeKey};

impl<K: NodeKey, V: ?Sized> Dag<K, V> {
    /// Return `true` if `end` is reachable from `start` along outgoing edges.
    ///
    /// `start == end` is always reachable. Absent keys have no outgoing
    /// edges, so they reach only themselves.
    ///
    /// # Complexity
    ///
    /// O(V+E): each key is enqueued at most once.
    pub fn path_exists(&self, start: &K, end: &K) -> bool {
        self.bfs_path(start, end).is_some()
    }

    /// Return `true` if adding `key` with the given destinations would create
    /// a cycle.
    ///
    /// This is the same check [`Dag::add_node`] runs; it never mutates.
    pub fn causes_cycle<'a, I>(&self, key: &K, outgoing: I) -> bool
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let destinations: HashSet<K> = outgoing.into_iter().cloned().collect();
        self.find_cycle(key, &destinations).is_some()
    }

    /// Return the cycle that admitting `key → destinations` would close, as
    /// `key → d → … → p → key`, or `None` if the edges are safe.
    pub(crate) fn find_cycle(&self, key: &K, destinations: &HashSet<K>) -> Option<Vec<K>> {
        if destinations.contains(key) {
            return Some(vec![key.clone(), key.clone()]);
        }

        if self.in_degree(key) == 0 {
            return None;
        }

        for start in destinations {
            for end in self.incoming_of(key) {
                if let Some(route) = self.bfs_path(start, end) {
                    let mut cycle = Vec::with_capacity(route.len() + 2);
                    cycle.push(key.clone());
                    cycle.extend(route);
                    cycle.push(key.clone());
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// BFS from `start` looking for `end`; returns the route `start..=end`.
    fn bfs_path(&self, start: &K, end: &K) -> Option<Vec<K>> {
        let mut queue: VecDeque<&K> = VecDeque::from([start]);
        let mut visited: HashSet<&K> = HashSet::from([start]);
        let mut parent: HashMap<&K, &K> = HashMap::new();

        while let Some(current) = queue.pop_front() {
            if current == end {
                return Some(reconstruct_route(&parent, start, current));
            }

            for next in self.outgoing_of(current) {
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        None
    }
}

/// Follow parent links back from `end` to `start` and return them in walk
/// order.
fn reconstruct_route<'a, K: NodeKey>(parent: &HashMap<&'a K, &'a K>, start: &K, end: &'a K) -> Vec<K> {
    let mut route = vec![end.clone()];
    let mut cursor = end;

    while cursor != start {
        match parent.get(cursor) {
            Some(&previous) => {
                cursor = previous;
                route.push(cursor.clone());
            }
            None => break,
        }
    }

    route.reverse();
    route
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
