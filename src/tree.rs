use crate::error::GroupingError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// One row of the checkpoint table, reduced to what the grouping needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    pub name: String,
    pub parent: Option<String>,
}

impl NodeRow {
    pub fn new(name: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(ToOwned::to_owned),
        }
    }
}

/// Child → parent lookup built once per run.
#[derive(Debug, Clone, Default)]
pub struct ParentMap {
    parents: HashMap<String, Option<String>>,
    order: Vec<String>,
}

impl ParentMap {
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = NodeRow>,
    {
        let mut map = Self::default();
        for row in rows {
            let name = row.name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            let parent = row
                .parent
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty());
            if !map.parents.contains_key(&name) {
                map.order.push(name.clone());
            }
            // later rows overwrite the parent, first appearance keeps the position
            map.parents.insert(name, parent);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.parents.contains_key(node)
    }

    pub fn parent_of(&self, node: &str) -> Option<&str> {
        self.parents.get(node).and_then(|p| p.as_deref())
    }

    /// Nodes in table order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn nodes_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.nodes().filter(move |n| n.starts_with(prefix))
    }

    /// Rejects parent links that loop back on themselves.
    pub fn check_acyclic(&self) -> Result<(), GroupingError> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for node in self.nodes() {
            let ix = graph.add_node(node);
            index.insert(node, ix);
        }
        for node in self.nodes() {
            if let Some(parent) = self.parent_of(node) {
                let parent_ix = *index
                    .entry(parent)
                    .or_insert_with(|| graph.add_node(parent));
                graph.add_edge(index[node], parent_ix, ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| GroupingError::CycleDetected {
            node: graph[cycle.node_id()].to_string(),
        })
    }
}
