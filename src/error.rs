use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    /// A parent walk starting at `node` did not reach a root.
    CycleDetected { node: String },
    UnknownNode(String),
    RepresentativeCollision {
        node: String,
        first_group: usize,
        second_group: usize,
    },
}

impl fmt::Display for GroupingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingError::CycleDetected { node } => {
                write!(f, "cycle detected in parent links reachable from '{node}'")
            }
            GroupingError::UnknownNode(node) => write!(f, "node '{node}' is not in the table"),
            GroupingError::RepresentativeCollision {
                node,
                first_group,
                second_group,
            } => write!(
                f,
                "representative '{node}' belongs to group {first_group} and group {second_group}"
            ),
        }
    }
}

impl std::error::Error for GroupingError {}
