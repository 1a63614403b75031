use std::collections::BTreeSet;

pub mod attach;
pub mod merge;

pub use attach::attach_representatives;
pub use merge::{merge_chains, merge_chains_with};

/// Nodes that share one wake/sleep window, in natural name order.
pub type Group = BTreeSet<String>;

pub fn chain_sets<C>(chains: &[C]) -> Vec<Group>
where
    C: AsRef<[String]>,
{
    chains
        .iter()
        .map(|chain| chain.as_ref().iter().cloned().collect())
        .collect()
}
