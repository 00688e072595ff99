#![allow(dead_code, clippy::cast_possible_truncation)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use topdag_core::Dag;

#[derive(Clone, Copy, Debug)]
pub struct GraphTier {
    pub name: &'static str,
    pub node_count: usize,
    /// Each node points at up to this many earlier nodes.
    pub max_fan_out: usize,
    /// Edges are drawn from the previous `window` nodes only.
    pub window: usize,
}

pub const TIER_S: GraphTier = GraphTier {
    name: "S",
    node_count: 1_000,
    max_fan_out: 3,
    window: 32,
};

pub const TIER_M: GraphTier = GraphTier {
    name: "M",
    node_count: 10_000,
    max_fan_out: 3,
    window: 64,
};

pub const TIER_L: GraphTier = GraphTier {
    name: "L",
    node_count: 50_000,
    max_fan_out: 4,
    window: 128,
};

pub const TIERS: [GraphTier; 3] = [TIER_S, TIER_M, TIER_L];

/// Edge lists for a random DAG: node `i` only points at nodes below `i`.
///
/// Roughly one node in fifty also points at a key that is never added, so
/// sorts exercise the detached path.
pub fn generate_edges(tier: GraphTier, seed: u64) -> Vec<(u32, Vec<u32>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dangling_base = tier.node_count as u32;

    (0..tier.node_count)
        .map(|i| {
            let mut outgoing = Vec::new();
            if i > 0 {
                let low = i.saturating_sub(tier.window);
                for _ in 0..rng.gen_range(0..=tier.max_fan_out) {
                    outgoing.push(rng.gen_range(low..i) as u32);
                }
            }
            if rng.gen_bool(0.02) {
                outgoing.push(dangling_base + i as u32);
            }
            (i as u32, outgoing)
        })
        .collect()
}

/// Build a graph from `edges`, inserting sinks-last so most edges dangle
/// briefly before their targets arrive.
pub fn build_graph(edges: &[(u32, Vec<u32>)], seed: u64) -> Dag<u32, bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Dag::new();
    for (key, outgoing) in edges.iter().rev() {
        let satisfied = rng.gen_bool(0.9);
        if graph
            .add_node(*key, satisfied, outgoing.iter().copied())
            .is_err()
        {
            unreachable!("generated edges only point at lower keys");
        }
    }
    graph
}
