#![forbid(unsafe_code)]
//! topdag-core library.
//!
//! An in-memory directed acyclic graph of keyed payloads. Insertions that
//! would close a cycle are rejected with the offending path; edges may point
//! at keys that are not (yet) nodes. On top of the store sit a layered
//! topological sort that reports nodes stranded behind such dangling edges,
//! reachability pruning, and enumeration of root-to-sink paths whose payloads
//! all report themselves satisfied.
//!
//! ```
//! use topdag_core::Dag;
//!
//! let mut graph: Dag<&str, bool> = Dag::new();
//! graph.add_node("build", true, ["fetch"]).unwrap();
//! graph.add_node("fetch", true, []).unwrap();
//!
//! assert_eq!(graph.topological_sort().layers, vec![vec!["fetch"], vec!["build"]]);
//! assert_eq!(graph.find_satisfied_paths(), vec![vec!["build", "fetch"]]);
//! ```
//!
//! # Conventions
//!
//! - **Errors**: Graph operations return [`DagError`]; config loading uses
//!   `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`). The
//!   crate never installs a subscriber.

pub mod config;
pub mod error;
pub mod graph;

pub use config::{DagConfig, SatisfiabilityConfig};
pub use error::{DagError, ErrorCode};
pub use graph::{Dag, Layering, NodeKey, Satisfiable, SatisfiedPaths};
