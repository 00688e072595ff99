//! End-to-end scenarios over the public API.
//!
//! Graph layouts are written top-down: `A → {B, C}` means A depends on B and C.

use std::any::Any;
use std::cell::Cell;
use std::collections::HashSet;
use std::io::Write;
use std::rc::Rc;

use topdag_core::config::load_config;
use topdag_core::{Dag, DagError, ErrorCode, Satisfiable};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn path_set(paths: Vec<Vec<&'static str>>) -> HashSet<Vec<&'static str>> {
    let count = paths.len();
    let set: HashSet<_> = paths.into_iter().collect();
    assert_eq!(set.len(), count, "duplicate paths returned");
    set
}

fn expect(paths: &[&[&'static str]]) -> HashSet<Vec<&'static str>> {
    paths.iter().map(|path| path.to_vec()).collect()
}

/// ```text
///                         A
///                        /|\
///                       / | \          J
///        M   N(->K)    /  |  \        /
///         \  |        B   C   D ------
///          \ |       /|   |   |\
///            L      / |   | K | \
///             \    /  |   |/  |  \
///               E     F   G   H   I(->M)
/// ```
///
/// `N` also points at `K`, and `I` points at `M`. `unsatisfied` lists the
/// nodes whose predicate fails.
fn complex_graph(unsatisfied: &[&str]) -> Dag<&'static str, bool> {
    let layout: [(&'static str, &[&'static str]); 14] = [
        ("A", &["B", "C", "D"]),
        ("B", &["E", "F"]),
        ("C", &["G"]),
        ("D", &["H", "I"]),
        ("E", &[]),
        ("F", &[]),
        ("G", &[]),
        ("H", &[]),
        ("I", &["M"]),
        ("J", &["D"]),
        ("K", &["G"]),
        ("L", &["E"]),
        ("M", &["L"]),
        ("N", &["L", "K"]),
    ];

    let mut graph = Dag::new();
    for (key, outgoing) in layout {
        graph
            .add_node(key, !unsatisfied.contains(&key), outgoing.iter().copied())
            .unwrap();
    }
    graph
}

// ---------------------------------------------------------------------------
// Satisfiability
// ---------------------------------------------------------------------------

#[test]
fn complex_graph_all_satisfied() {
    init_tracing();
    let graph = complex_graph(&[]);

    let paths = path_set(graph.find_satisfied_paths());

    assert_eq!(
        paths,
        expect(&[
            &["A", "B", "E"],
            &["A", "B", "F"],
            &["A", "C", "G"],
            &["A", "D", "H"],
            &["A", "D", "I", "M", "L", "E"],
            &["J", "D", "H"],
            &["J", "D", "I", "M", "L", "E"],
            &["N", "L", "E"],
            &["N", "K", "G"],
        ])
    );
    assert!(graph.is_satisfied());
}

#[test]
fn complex_graph_with_failing_nodes() {
    init_tracing();
    let graph = complex_graph(&["B", "I", "J"]);

    let paths = path_set(graph.find_satisfied_paths());

    assert_eq!(
        paths,
        expect(&[
            &["A", "C", "G"],
            &["A", "D", "H"],
            &["N", "L", "E"],
            &["N", "K", "G"],
        ])
    );
}

#[test]
fn every_sink_failing_leaves_nothing() {
    let graph = complex_graph(&["E", "F", "G", "H"]);
    assert!(graph.find_satisfied_paths().is_empty());
    assert!(!graph.is_satisfied());
}

#[test]
fn payload_changes_are_seen_by_snapshots() {
    struct Toggle(Cell<bool>);

    impl Satisfiable for Toggle {
        fn is_satisfied(&self) -> bool {
            self.0.get()
        }
    }

    let mut graph: Dag<&str, Toggle> = Dag::new();
    graph.add_node("a", Toggle(Cell::new(true)), ["b"]).unwrap();
    graph.add_node("b", Toggle(Cell::new(true)), []).unwrap();
    let snapshot = graph.snapshot_copy();

    graph.payload(&"b").unwrap().0.set(false);

    assert!(!graph.is_satisfied());
    assert!(!snapshot.is_satisfied());
    assert!(graph.shares_payload(&snapshot, &"b"));
}

#[test]
fn mixed_payloads_are_rejected_before_evaluation() {
    #[derive(Debug)]
    struct Check(bool);

    impl Satisfiable for Check {
        fn is_satisfied(&self) -> bool {
            self.0
        }
    }

    let mut graph: Dag<&str, dyn Any> = Dag::new();
    graph.add_node("a", Rc::new(Check(true)) as Rc<dyn Any>, ["b", "c"]).unwrap();
    graph.add_node("b", Rc::new(Check(true)) as Rc<dyn Any>, []).unwrap();
    graph.add_node("c", Rc::new(Check(false)) as Rc<dyn Any>, []).unwrap();

    assert_eq!(graph.find_satisfied_paths_as::<Check>().unwrap(), vec![vec!["a", "b"]]);

    graph.add_node("d", Rc::new("text") as Rc<dyn Any>, []).unwrap();
    let err = graph.is_satisfied_as::<Check>().unwrap_err();
    assert_eq!(err, DagError::TypeMismatch("d"));
    assert_eq!(err.code(), ErrorCode::TypeMismatch);
}

// ---------------------------------------------------------------------------
// Mutation, pruning and sorting together
// ---------------------------------------------------------------------------

#[test]
fn trimmed_snapshot_sorts_without_detached_nodes() {
    init_tracing();
    let mut graph: Dag<i32, i32> = Dag::new();
    graph.add_node(1, 1, [2, 3, 4]).unwrap();
    graph.add_node(2, 4, [4]).unwrap();
    graph.add_node(3, 9, [2, 4]).unwrap();
    graph.add_node(4, 16, []).unwrap();

    let mut trimmed = graph.snapshot_copy();
    trimmed.trim(Some([3])).unwrap();

    let original = graph.topological_sort();
    let layering = trimmed.topological_sort();

    assert_eq!(graph.len(), 4);
    assert_eq!(original.depth(), 4);
    assert_eq!(trimmed.len(), 3);
    assert_eq!(layering.layers, vec![vec![4], vec![2], vec![3]]);
    assert!(layering.detached.is_empty());

    assert!(matches!(
        trimmed.trim(None::<Vec<i32>>),
        Err(DagError::InvalidArgument(_))
    ));
    assert_eq!(trimmed.remove_node(&100), Err(DagError::NodeNotFound(100)));
}

#[test]
fn branch_graph_inserted_out_of_order() {
    let mut graph: Dag<i32, i32> = Dag::new();
    graph.add_node(7, 1, [4, 6]).unwrap();
    graph.add_node(5, 1, [1, 4]).unwrap();
    graph.add_node(4, 1, [2, 3]).unwrap();
    graph.add_node(3, 1, [1, 2]).unwrap();
    graph.add_node(2, 1, [1]).unwrap();
    graph.add_node(1, 1, []).unwrap();
    graph.add_node(6, 1, [5, 4]).unwrap();

    let layering = graph.topological_sort();

    assert_eq!(
        layering.layers,
        vec![vec![1], vec![2], vec![3], vec![4], vec![5], vec![6], vec![7]]
    );
    assert_eq!(graph.incoming(&4).len(), 3);
    assert_eq!(graph.outgoing(&4).len(), 2);
    assert_eq!(graph.roots(), vec![&7]);
}

#[test]
fn filling_a_dangling_key_reattaches_its_dependents() {
    let mut graph: Dag<&str, bool> = Dag::new();
    graph.add_node("app", true, ["lib"]).unwrap();

    let before = graph.topological_sort();
    assert_eq!(before.detached, vec!["app"]);
    assert_eq!(graph.find_satisfied_paths(), vec![vec!["app"]]);

    graph.add_node("lib", true, []).unwrap();

    let after = graph.topological_sort();
    assert_eq!(after.layers, vec![vec!["lib"], vec!["app"]]);
    assert!(after.detached.is_empty());
    assert_eq!(graph.find_satisfied_paths(), vec![vec!["app", "lib"]]);
}

#[test]
fn cycle_errors_carry_code_and_path() {
    let mut graph: Dag<i32, ()> = Dag::new();
    graph.add_node(1, (), [5]).unwrap();

    let err = graph.add_node(5, (), [1]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CycleDetected);
    assert_eq!(
        err,
        DagError::CycleDetected {
            key: 5,
            path: vec![5, 1, 5],
        }
    );

    let err = graph.add_node(5, (), [5]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CycleDetected);
    assert!(!graph.contains(&5));
}

// ---------------------------------------------------------------------------
// Config and serialization
// ---------------------------------------------------------------------------

#[test]
fn configured_limit_caps_the_search() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[satisfiability]\nmax_paths = 4").unwrap();
    let config = load_config(file.path()).unwrap();

    let found = complex_graph(&[]).find_satisfied_paths_with(&config.satisfiability);

    assert_eq!(found.paths.len(), 4);
    assert!(found.truncated);
}

#[test]
fn query_results_serialize_to_json() {
    let mut graph: Dag<&str, bool> = Dag::new();
    graph.add_node("a", true, ["b"]).unwrap();
    graph.add_node("b", true, []).unwrap();
    graph.add_node("x", true, ["missing"]).unwrap();

    let layering = serde_json::to_value(graph.topological_sort()).unwrap();
    assert_eq!(
        layering,
        serde_json::json!({ "layers": [["b"], ["a"]], "detached": ["x"] })
    );

    let config = topdag_core::SatisfiabilityConfig::default();
    let mut found = graph.find_satisfied_paths_with(&config);
    found.paths.sort();
    assert_eq!(
        serde_json::to_value(found).unwrap(),
        serde_json::json!({ "paths": [["a", "b"], ["x"]], "truncated": false })
    );
}
