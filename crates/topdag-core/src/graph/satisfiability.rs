//! Satisfied-path enumeration over a layered [`Dag`].
//!
//! # Overview
//!
//! Every payload answers a yes/no question through [`Satisfiable`]. A
//! **satisfied path** runs from a root (a node nothing points at) down to a
//! sink (a node with no outgoing edges) through nodes that all answer yes.
//!
//! # Eligibility
//!
//! Nodes are classified bottom-up along the [`Layering`]:
//!
//! - a sink is eligible iff its own predicate holds;
//! - any other layered node is eligible iff at least one destination is
//!   eligible *and* its own predicate holds. The destination check runs
//!   first, so predicates of nodes that cannot lie on a path are never asked;
//! - a detached node is eligible iff its own predicate holds. Its edges are
//!   never followed and it forms a one-element path on its own.
//!
//! Each predicate is evaluated at most once per query.
//!
//! # Enumeration
//!
//! For every eligible root, an explicit-stack DFS walks the eligible
//! subgraph. Each stack frame carries a cursor over its own eligible
//! children, so a child is tried once per frame and a node reached again
//! through a different parent gets a fresh frame. When the top frame is a
//! sink, the stack (bottom to top) is recorded as a path, root first.
//!
//! # Complexity
//!
//! Classification is O(V+E). Enumeration is proportional to the number of
//! root-to-sink paths in the eligible subgraph, which is exponential in the
//! worst case (stacked diamonds double the count per level). That cost is
//! inherent to listing every path; cap it with
//! [`SatisfiabilityConfig::max_paths`] when the graph shape is not trusted.

#![allow(clippy::module_name_repetitions)]

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::layering::Layering;
use super::store::{Dag, NodeKey};
use crate::config::SatisfiabilityConfig;
use crate::error::DagError;

// ---------------------------------------------------------------------------
// Satisfiable
// ---------------------------------------------------------------------------

/// Payload capability required for satisfiability queries.
///
/// Implementations should be free of side effects: the engine may ask the
/// same payload more than once across queries and expects a stable answer.
pub trait Satisfiable {
    /// Return `true` if this node is satisfied.
    fn is_satisfied(&self) -> bool;
}

impl Satisfiable for bool {
    fn is_satisfied(&self) -> bool {
        *self
    }
}

impl<T: Satisfiable + ?Sized> Satisfiable for &T {
    fn is_satisfied(&self) -> bool {
        (**self).is_satisfied()
    }
}

impl<T: Satisfiable + ?Sized> Satisfiable for Box<T> {
    fn is_satisfied(&self) -> bool {
        (**self).is_satisfied()
    }
}

impl<T: Satisfiable + ?Sized> Satisfiable for Rc<T> {
    fn is_satisfied(&self) -> bool {
        (**self).is_satisfied()
    }
}

// ---------------------------------------------------------------------------
// SatisfiedPaths
// ---------------------------------------------------------------------------

/// Result of a bounded satisfied-path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SatisfiedPaths<K> {
    /// Each path runs root first, sink last. Detached nodes appear as
    /// one-element paths.
    pub paths: Vec<Vec<K>>,
    /// `true` if at least one satisfied path was found beyond the configured
    /// limit and dropped.
    pub truncated: bool,
}

impl<K> SatisfiedPaths<K> {
    fn empty() -> Self {
        Self {
            paths: Vec::new(),
            truncated: false,
        }
    }

    /// Record a path, or drop it and return `false` if the limit is already
    /// full.
    fn record(&mut self, path: Vec<K>, limit: Option<usize>) -> bool {
        if limit.is_some_and(|max| self.paths.len() >= max) {
            self.truncated = true;
            return false;
        }
        self.paths.push(path);
        true
    }
}

// ---------------------------------------------------------------------------
// Typed entry points
// ---------------------------------------------------------------------------

impl<K: NodeKey, V: Satisfiable + ?Sized> Dag<K, V> {
    /// Every satisfied path through the graph, root first and sink last.
    ///
    /// Returns an empty list if no path is satisfied.
    #[must_use]
    pub fn find_satisfied_paths(&self) -> Vec<Vec<K>> {
        self.find_satisfied_paths_with(&SatisfiabilityConfig::default())
            .paths
    }

    /// Like [`Dag::find_satisfied_paths`], honouring `config.max_paths`.
    #[must_use]
    pub fn find_satisfied_paths_with(&self, config: &SatisfiabilityConfig) -> SatisfiedPaths<K> {
        let found = collect_paths(self, config.max_paths, |payload| payload.is_satisfied());
        warn_if_truncated(&found, config);
        found
    }

    /// Return `true` if at least one satisfied path exists.
    ///
    /// Stops as soon as a second path turns up.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        !collect_paths(self, Some(1), |payload| payload.is_satisfied())
            .paths
            .is_empty()
    }
}

// ---------------------------------------------------------------------------
// Type-erased entry points
// ---------------------------------------------------------------------------

impl<K: NodeKey> Dag<K, dyn Any> {
    /// Every satisfied path, evaluating each payload as a `T`.
    ///
    /// # Errors
    ///
    /// [`DagError::TypeMismatch`] naming the first payload found that is not a
    /// `T`. Every payload is checked before any predicate runs.
    pub fn find_satisfied_paths_as<T>(&self) -> Result<Vec<Vec<K>>, DagError<K>>
    where
        T: Satisfiable + 'static,
    {
        self.find_satisfied_paths_as_with::<T>(&SatisfiabilityConfig::default())
            .map(|found| found.paths)
    }

    /// Like [`Dag::find_satisfied_paths_as`], honouring `config.max_paths`.
    ///
    /// # Errors
    ///
    /// [`DagError::TypeMismatch`] if any payload is not a `T`.
    pub fn find_satisfied_paths_as_with<T>(
        &self,
        config: &SatisfiabilityConfig,
    ) -> Result<SatisfiedPaths<K>, DagError<K>>
    where
        T: Satisfiable + 'static,
    {
        self.ensure_payloads_are::<T>()?;
        let found = collect_paths(self, config.max_paths, downcast_predicate::<T>);
        warn_if_truncated(&found, config);
        Ok(found)
    }

    /// Return `true` if at least one satisfied path exists, evaluating each
    /// payload as a `T`.
    ///
    /// # Errors
    ///
    /// [`DagError::TypeMismatch`] if any payload is not a `T`.
    pub fn is_satisfied_as<T>(&self) -> Result<bool, DagError<K>>
    where
        T: Satisfiable + 'static,
    {
        self.ensure_payloads_are::<T>()?;
        Ok(!collect_paths(self, Some(1), downcast_predicate::<T>)
            .paths
            .is_empty())
    }

    fn ensure_payloads_are<T: 'static>(&self) -> Result<(), DagError<K>> {
        match self
            .payload_entries()
            .find(|(_, payload)| !payload.is::<T>())
        {
            Some((key, _)) => Err(DagError::TypeMismatch(key.clone())),
            None => Ok(()),
        }
    }
}

fn warn_if_truncated<K>(found: &SatisfiedPaths<K>, config: &SatisfiabilityConfig) {
    if found.truncated {
        warn!(
            paths = found.paths.len(),
            max_paths = ?config.max_paths,
            "satisfied-path search truncated"
        );
    }
}

fn downcast_predicate<T: Satisfiable + 'static>(payload: &dyn Any) -> bool {
    payload.downcast_ref::<T>().is_some_and(T::is_satisfied)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One DFS stack frame: a node and a cursor over its eligible children.
struct Frame<'g, K> {
    key: &'g K,
    children: Vec<&'g K>,
    next: usize,
}

/// Memoised predicate evaluation keyed by node.
struct Verdicts<'g, K, V: ?Sized, P> {
    dag: &'g Dag<K, V>,
    predicate: P,
    cache: HashMap<&'g K, bool>,
}

impl<'g, K, V, P> Verdicts<'g, K, V, P>
where
    K: NodeKey,
    V: ?Sized,
    P: FnMut(&V) -> bool,
{
    fn holds(&mut self, key: &'g K) -> bool {
        if let Some(&verdict) = self.cache.get(key) {
            return verdict;
        }
        let verdict = self
            .dag
            .payload(key)
            .is_some_and(|payload| (self.predicate)(payload));
        self.cache.insert(key, verdict);
        verdict
    }
}

#[instrument(skip_all, fields(nodes = dag.len(), limit = ?limit))]
fn collect_paths<K, V, P>(dag: &Dag<K, V>, limit: Option<usize>, predicate: P) -> SatisfiedPaths<K>
where
    K: NodeKey,
    V: ?Sized,
    P: FnMut(&V) -> bool,
{
    let layering = dag.topological_sort();
    let mut verdicts = Verdicts {
        dag,
        predicate,
        cache: HashMap::new(),
    };
    let mut found = SatisfiedPaths::empty();

    for key in &layering.detached {
        if verdicts.holds(key) && !found.record(vec![key.clone()], limit) {
            debug!("path limit reached among detached nodes");
            return found;
        }
    }

    let eligible = classify(dag, &layering, &mut verdicts);

    // Roots in the highest layers first; a root can sit in any layer.
    let roots = layering
        .layers
        .iter()
        .rev()
        .flatten()
        .filter(|key| eligible.contains(key) && dag.in_degree(key) == 0);

    for root in roots {
        if !walk_from_root(dag, root, &eligible, &mut found, limit) {
            debug!(?root, "path limit reached");
            return found;
        }
    }

    debug!(
        paths = found.paths.len(),
        eligible = eligible.len(),
        "satisfied-path search complete"
    );
    found
}

/// Bottom-up eligibility over the layered nodes.
fn classify<'g, K, V, P>(
    dag: &'g Dag<K, V>,
    layering: &'g Layering<K>,
    verdicts: &mut Verdicts<'g, K, V, P>,
) -> HashSet<&'g K>
where
    K: NodeKey,
    V: ?Sized,
    P: FnMut(&V) -> bool,
{
    let mut eligible: HashSet<&K> = HashSet::new();

    for key in layering.layers.iter().flatten() {
        let leads_somewhere = dag.out_degree(key) == 0
            || dag.outgoing_of(key).any(|dest| eligible.contains(dest));
        if leads_somewhere && verdicts.holds(key) {
            eligible.insert(key);
        }
    }

    eligible
}

/// Enumerate every path from `root` through eligible nodes to a sink.
///
/// Returns `false` once the path limit is hit.
fn walk_from_root<'g, K, V>(
    dag: &'g Dag<K, V>,
    root: &'g K,
    eligible: &HashSet<&'g K>,
    found: &mut SatisfiedPaths<K>,
    limit: Option<usize>,
) -> bool
where
    K: NodeKey,
    V: ?Sized,
{
    let frame = |key: &'g K| Frame {
        key,
        children: dag
            .outgoing_of(key)
            .filter(|dest| eligible.contains(*dest))
            .collect(),
        next: 0,
    };

    let mut stack: Vec<Frame<'g, K>> = vec![frame(root)];

    while let Some(top) = stack.last_mut() {
        if let Some(&child) = top.children.get(top.next) {
            top.next += 1;
            stack.push(frame(child));
            continue;
        }

        if dag.out_degree(top.key) == 0 {
            let path: Vec<K> = stack.iter().map(|f| f.key.clone()).collect();
            if !found.record(path, limit) {
                return false;
            }
        }
        stack.pop();
    }

    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
