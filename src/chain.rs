use crate::config::{ChainExclusion, GroupingConfig};
use crate::error::GroupingError;
use crate::tree::ParentMap;
use rayon::prelude::*;

/// Walks from `leaf` up to the root and returns the surviving ancestry,
/// root-most first and `leaf` last.
///
/// Nodes matched by `exclusion` are skipped but still walked through. The walk
/// is bounded by the number of known nodes, so a looping map fails with
/// `CycleDetected` instead of spinning. A `leaf` without a row of its own is
/// `UnknownNode`.
pub fn extract_chain(
    leaf: &str,
    parent_map: &ParentMap,
    exclusion: ChainExclusion<'_>,
) -> Result<Vec<String>, GroupingError> {
    if !parent_map.contains(leaf) {
        return Err(GroupingError::UnknownNode(leaf.to_string()));
    }
    // +1 lets the walk step onto a parent that has no row of its own
    let bound = parent_map.len() + 1;
    let mut chain = Vec::new();
    let mut current = Some(leaf);
    let mut steps = 0usize;

    while let Some(node) = current {
        if steps == bound {
            return Err(GroupingError::CycleDetected {
                node: leaf.to_string(),
            });
        }
        steps += 1;

        if !exclusion.excludes(node) {
            chain.push(node.to_string());
        }
        current = parent_map.parent_of(node);
    }

    chain.reverse();
    Ok(chain)
}

/// Chains for every leaf-tier node, in table order. On failure the error of
/// the earliest failing leaf in table order is returned.
pub fn extract_all_chains(
    parent_map: &ParentMap,
    config: &GroupingConfig,
) -> Result<Vec<Vec<String>>, GroupingError> {
    let leaves: Vec<&str> = parent_map.nodes_with_prefix(&config.leaf_prefix).collect();
    let exclusion = config.exclusion();
    let results: Vec<Result<Vec<String>, GroupingError>> = leaves
        .par_iter()
        .map(|leaf| extract_chain(leaf, parent_map, exclusion))
        .collect();
    results.into_iter().collect()
}
