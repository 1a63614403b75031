use super::Group;
use super::merge::{merge_chains_with, order_groups};
use crate::config::{CollisionPolicy, GroupingConfig};
use crate::error::GroupingError;
use crate::tree::ParentMap;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Pulls the immediate parent of every representative-tier member into the
/// member's group.
///
/// Attached parents can land in more than one group; `config.collision_policy`
/// decides whether those groups are unified, rejected, or left alone. The
/// returned groups are pairwise disjoint under every policy.
pub fn attach_representatives(
    groups: Vec<Group>,
    parent_map: &ParentMap,
    config: &GroupingConfig,
) -> Result<Vec<Group>, GroupingError> {
    let attachments: Vec<BTreeSet<String>> = groups
        .iter()
        .map(|group| representative_parents(group, parent_map, &config.representative_prefix))
        .collect();

    let attached = attachments.iter().map(BTreeSet::len).sum::<usize>();
    debug!(attached, "representative parents found");

    match config.collision_policy {
        CollisionPolicy::Merge => {
            let extended: Vec<Group> = groups
                .into_iter()
                .zip(attachments)
                .map(|(mut group, parents)| {
                    group.extend(parents);
                    group
                })
                .collect();
            let before = extended.len();
            let merged = merge_chains_with(&extended, config.merge_strategy);
            if merged.len() < before {
                warn!(
                    before,
                    after = merged.len(),
                    "representative attachment joined groups"
                );
            }
            Ok(merged)
        }
        CollisionPolicy::Reject | CollisionPolicy::Ignore => {
            let mut owner: HashMap<String, usize> = HashMap::new();
            for (idx, group) in groups.iter().enumerate() {
                for node in group {
                    owner.entry(node.clone()).or_insert(idx);
                }
            }

            let mut groups = groups;
            for (idx, parents) in attachments.into_iter().enumerate() {
                for parent in parents {
                    match owner.get(&parent).copied() {
                        Some(existing) if existing != idx => {
                            if config.collision_policy == CollisionPolicy::Reject {
                                return Err(GroupingError::RepresentativeCollision {
                                    node: parent,
                                    first_group: existing,
                                    second_group: idx,
                                });
                            }
                            warn!(
                                node = %parent,
                                kept_in = existing,
                                skipped_for = idx,
                                "representative already scheduled with another group"
                            );
                        }
                        Some(_) => {}
                        None => {
                            owner.insert(parent.clone(), idx);
                            groups[idx].insert(parent);
                        }
                    }
                }
            }
            Ok(order_groups(groups))
        }
    }
}

fn representative_parents(group: &Group, parent_map: &ParentMap, prefix: &str) -> BTreeSet<String> {
    let mut parents = BTreeSet::new();
    for node in group.iter().filter(|n| n.starts_with(prefix)) {
        match parent_map.parent_of(node) {
            Some(parent) => {
                parents.insert(parent.to_string());
            }
            None => warn!(node = %node, "representative has no parent to attach"),
        }
    }
    parents
}
