#![allow(dead_code)]

use sleep_groups::{Group, NodeRow, ParentMap};

pub fn set(nodes: &[&str]) -> Group {
    nodes.iter().map(|n| n.to_string()).collect()
}

/// CloudDBServer
/// └── L1Node
///     ├── L2Node_1
///     │   ├── L3Node_1 ── L4Node_1, L4Node_2
///     │   └── L3Node_2 ── L4Node_3
///     └── L2Node_2
///         └── L3Node_3 ── L4Node_4
pub const SAMPLE_EDGES: [(&str, Option<&str>); 11] = [
    ("CloudDBServer", None),
    ("L1Node", Some("CloudDBServer")),
    ("L2Node_1", Some("L1Node")),
    ("L2Node_2", Some("L1Node")),
    ("L3Node_1", Some("L2Node_1")),
    ("L3Node_2", Some("L2Node_1")),
    ("L3Node_3", Some("L2Node_2")),
    ("L4Node_1", Some("L3Node_1")),
    ("L4Node_2", Some("L3Node_1")),
    ("L4Node_3", Some("L3Node_2")),
    ("L4Node_4", Some("L3Node_3")),
];

pub fn sample_map() -> ParentMap {
    ParentMap::from_rows(
        SAMPLE_EDGES
            .iter()
            .map(|(name, parent)| NodeRow::new(*name, *parent)),
    )
}

pub fn camel_csv() -> String {
    let mut out = String::from("nodeName,parentNodeId,layer\n");
    for (name, parent) in SAMPLE_EDGES {
        out.push_str(&format!("{},{},{}\n", name, parent.unwrap_or(""), layer(name)));
    }
    out
}

/// Title row first, then a header whose parent column has a leading space.
pub fn spaced_csv() -> String {
    let mut out = String::from("Checkpoint table,,\nNode Name, Parent Node ID,Layer\n");
    for (name, parent) in SAMPLE_EDGES {
        out.push_str(&format!("{},{},{}\n", name, parent.unwrap_or(""), layer(name)));
    }
    out
}

fn layer(name: &str) -> &'static str {
    match &name[..2] {
        "L1" => "1",
        "L2" => "2",
        "L3" => "3",
        "L4" => "4",
        _ => "0",
    }
}
