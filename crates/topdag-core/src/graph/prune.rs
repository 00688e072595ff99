//! Reachability-based pruning.
//!
//! [`Dag::trim`] keeps every node reachable from a caller-given root set and
//! removes the rest through [`Dag::remove_node`]. Removal order does not
//! matter: a removed node only repairs the incoming sets of its own targets.

use std::collections::{HashSet, VecDeque};

use tracing::{info, instrument};

use super::store::{Dag, NodeKey};
use crate::error::DagError;

impl<K: NodeKey, V: ?Sized> Dag<K, V> {
    /// Remove every node not reachable from `roots`, returning the removed
    /// keys in unspecified order.
    ///
    /// An empty root collection is a valid request and empties the graph.
    /// Roots that are not present are ignored.
    ///
    /// # Errors
    ///
    /// [`DagError::InvalidArgument`] if `roots` is `None`: callers must say
    /// explicitly which nodes to keep.
    #[instrument(skip_all, fields(nodes = self.len()))]
    pub fn trim<I>(&mut self, roots: Option<I>) -> Result<Vec<K>, DagError<K>>
    where
        I: IntoIterator<Item = K>,
    {
        let Some(roots) = roots else {
            return Err(DagError::InvalidArgument("trim requires a root collection"));
        };

        let unreachable = self.unreachable_from(roots);
        for key in &unreachable {
            self.remove_node(key)?;
        }

        info!(removed = unreachable.len(), kept = self.len(), "trimmed graph");
        Ok(unreachable)
    }

    /// Keys of present nodes that no walk from `roots` reaches.
    fn unreachable_from<I>(&self, roots: I) -> Vec<K>
    where
        I: IntoIterator<Item = K>,
    {
        let mut unsearched: VecDeque<K> = roots.into_iter().collect();
        let mut reached: HashSet<K> = HashSet::new();

        while let Some(key) = unsearched.pop_front() {
            if !self.contains(&key) || reached.contains(&key) {
                continue;
            }
            unsearched.extend(self.outgoing_of(&key).cloned());
            reached.insert(key);
        }

        self.keys()
            .filter(|key| !reached.contains(*key))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
