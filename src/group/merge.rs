use super::Group;
use crate::config::MergeStrategy;
use petgraph::unionfind::UnionFind;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Partitions `chains` into maximal groups under "shares at least one node".
pub fn merge_chains(chains: &[Group]) -> Vec<Group> {
    merge_chains_with(chains, MergeStrategy::UnionFind)
}

pub fn merge_chains_with(chains: &[Group], strategy: MergeStrategy) -> Vec<Group> {
    let groups = match strategy {
        MergeStrategy::UnionFind => merge_union_find(chains),
        MergeStrategy::Incremental => merge_incremental(chains),
    };
    order_groups(groups)
}

fn merge_union_find(chains: &[Group]) -> Vec<Group> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut names: Vec<&str> = Vec::new();
    for node in chains.iter().flatten() {
        index.entry(node.as_str()).or_insert_with(|| {
            names.push(node.as_str());
            names.len() - 1
        });
    }

    let mut sets: UnionFind<usize> = UnionFind::new(names.len());
    for chain in chains {
        let mut members = chain.iter().map(|n| index[n.as_str()]);
        if let Some(first) = members.next() {
            for other in members {
                sets.union(first, other);
            }
        }
    }

    let mut components: BTreeMap<usize, Group> = BTreeMap::new();
    for (ix, root) in sets.into_labeling().into_iter().enumerate() {
        components
            .entry(root)
            .or_default()
            .insert(names[ix].to_string());
    }
    components.into_values().collect()
}

fn merge_incremental(chains: &[Group]) -> Vec<Group> {
    // Phase 1: fold each chain into the first group it touches.
    let mut inclusive: Vec<Group> = Vec::new();
    for chain in chains.iter().filter(|c| !c.is_empty()) {
        match inclusive.iter_mut().find(|g| !g.is_disjoint(chain)) {
            Some(group) => group.extend(chain.iter().cloned()),
            None => inclusive.push(chain.clone()),
        }
    }

    // Phase 2: a chain can bridge two groups that phase 1 already closed, so
    // keep absorbing until nothing pending overlaps.
    let mut pending: VecDeque<Group> = inclusive.into();
    let mut merged = Vec::with_capacity(pending.len());
    while let Some(mut current) = pending.pop_front() {
        loop {
            let (overlapping, rest): (Vec<Group>, Vec<Group>) = pending
                .into_iter()
                .partition(|g| !g.is_disjoint(&current));
            pending = rest.into();
            if overlapping.is_empty() {
                break;
            }
            for group in overlapping {
                current.extend(group);
            }
        }
        merged.push(current);
    }
    merged
}

/// Groups sorted by their smallest member, which makes the output independent
/// of input order.
pub(crate) fn order_groups(groups: Vec<Group>) -> Vec<Group> {
    let mut groups: Vec<Group> = groups.into_iter().filter(|g| !g.is_empty()).collect();
    groups.sort_by(|a, b| a.first().cmp(&b.first()));
    groups
}
