mod common;

use common::set;
use sleep_groups::{Group, MergeStrategy, merge_chains, merge_chains_with};
use std::collections::BTreeSet;

const STRATEGIES: [MergeStrategy; 2] = [MergeStrategy::UnionFind, MergeStrategy::Incremental];

fn permutations(items: &[Group]) -> Vec<Vec<Group>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

fn assert_partition(chains: &[Group], groups: &[Group]) {
    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            assert!(a.is_disjoint(b), "{a:?} overlaps {b:?}");
        }
    }
    let input: BTreeSet<&String> = chains.iter().flatten().collect();
    let output: BTreeSet<&String> = groups.iter().flatten().collect();
    assert_eq!(input, output);
}

/// Deterministic pseudo-random chains over a small alphabet.
fn generated_chains(seed: u64, count: usize) -> Vec<Group> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    (0..count)
        .map(|_| {
            let len = 1 + next() % 3;
            (0..len).map(|_| format!("N{}", next() % 40)).collect()
        })
        .collect()
}

#[test]
fn overlapping_chains_merge_regardless_of_order() {
    let chains = vec![set(&["A", "B", "C"]), set(&["C", "D"]), set(&["E", "F"])];
    let expected = vec![set(&["A", "B", "C", "D"]), set(&["E", "F"])];
    for strategy in STRATEGIES {
        for order in permutations(&chains) {
            assert_eq!(merge_chains_with(&order, strategy), expected, "{strategy:?} {order:?}");
        }
    }
}

#[test]
fn empty_input_yields_no_groups() {
    for strategy in STRATEGIES {
        assert!(merge_chains_with(&[], strategy).is_empty());
        assert!(merge_chains_with(&[Group::new()], strategy).is_empty());
    }
}

#[test]
fn lone_chain_becomes_singleton_group() {
    let chains = vec![set(&["A", "B"]), set(&["Z"])];
    assert_eq!(merge_chains(&chains), vec![set(&["A", "B"]), set(&["Z"])]);
}

#[test]
fn subset_chains_do_not_create_duplicates() {
    let chains = vec![set(&["A", "B", "C"]), set(&["B"]), set(&["A", "C"])];
    for strategy in STRATEGIES {
        assert_eq!(merge_chains_with(&chains, strategy), vec![set(&["A", "B", "C"])]);
    }
}

#[test]
fn bridge_chain_joins_groups_formed_earlier() {
    let chains = vec![set(&["A", "B"]), set(&["C", "D"]), set(&["B", "C"])];
    for strategy in STRATEGIES {
        assert_eq!(merge_chains_with(&chains, strategy), vec![set(&["A", "B", "C", "D"])]);
    }
}

#[test]
fn strategies_agree_and_partition_generated_inputs() {
    for seed in 0..50 {
        let chains = generated_chains(seed, 25);
        let by_union_find = merge_chains_with(&chains, MergeStrategy::UnionFind);
        let by_incremental = merge_chains_with(&chains, MergeStrategy::Incremental);
        assert_partition(&chains, &by_union_find);
        assert_eq!(by_union_find, by_incremental, "seed {seed}");
    }
}

#[test]
fn every_chain_lands_inside_one_group() {
    let chains = generated_chains(99, 40);
    let groups = merge_chains(&chains);
    for chain in &chains {
        let holders = groups.iter().filter(|g| chain.is_subset(g)).count();
        assert_eq!(holders, 1, "{chain:?}");
    }
}
