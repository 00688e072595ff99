//! The keyed DAG and the queries that run over it.
//!
//! ## Submodules
//!
//! - [`store`]: Node/edge storage, insertion, removal and snapshots.
//! - [`cycles`]: Reachability and the cycle guard run on every insertion.
//! - [`prune`]: Dropping everything unreachable from a root set.
//! - [`layering`]: Layered topological sort with detached-node detection.
//! - [`satisfiability`]: Root-to-sink paths whose nodes all hold.

pub mod cycles;
pub mod layering;
pub mod prune;
pub mod satisfiability;
pub mod store;

pub use layering::Layering;
pub use satisfiability::{Satisfiable, SatisfiedPaths};
pub use store::{Dag, NodeKey};
