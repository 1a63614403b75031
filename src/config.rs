use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

pub const DEFAULT_ACTIVE_DURATION_SECS: f64 = 70.0;
pub const DEFAULT_INACTIVE_DURATION_SECS: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    #[default]
    UnionFind,
    Incremental,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::UnionFind => "union_find",
            MergeStrategy::Incremental => "incremental",
        }
    }
}

/// What to do when an attached representative parent already sits in another
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Unify the colliding groups.
    #[default]
    Merge,
    /// Fail the run with `GroupingError::RepresentativeCollision`.
    Reject,
    /// Keep the parent in the lowest-index group only.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub active_duration_secs: f64,
    pub inactive_duration_secs: f64,
    pub excluded_nodes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    pub leaf_prefix: String,
    pub representative_prefix: String,
    pub merge_strategy: MergeStrategy,
    pub collision_policy: CollisionPolicy,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            active_duration_secs: DEFAULT_ACTIVE_DURATION_SECS,
            inactive_duration_secs: DEFAULT_INACTIVE_DURATION_SECS,
            excluded_nodes: vec!["CloudDBServer".to_string(), "L1Node".to_string()],
            excluded_prefixes: vec!["L2Node_".to_string()],
            leaf_prefix: "L4Node".to_string(),
            representative_prefix: "L3Node_".to_string(),
            merge_strategy: MergeStrategy::default(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl GroupingConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: GroupingConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("active_duration_secs", self.active_duration_secs),
            ("inactive_duration_secs", self.inactive_duration_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        if self.leaf_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyLeafPrefix);
        }
        Ok(())
    }

    pub fn exclusion(&self) -> ChainExclusion<'_> {
        ChainExclusion {
            nodes: &self.excluded_nodes,
            prefixes: &self.excluded_prefixes,
        }
    }
}

/// Borrowed view of the nodes a chain walk skips.
#[derive(Debug, Clone, Copy)]
pub struct ChainExclusion<'a> {
    pub nodes: &'a [String],
    pub prefixes: &'a [String],
}

impl ChainExclusion<'_> {
    pub fn excludes(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
            || self.prefixes.iter().any(|p| node.starts_with(p.as_str()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidDuration { field: &'static str, value: f64 },
    EmptyLeafPrefix,
    Io(io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDuration { field, value } => {
                write!(f, "{field} must be a finite, non-negative number of seconds (got {value})")
            }
            ConfigError::EmptyLeafPrefix => write!(f, "leaf_prefix must not be empty"),
            ConfigError::Io(err) => write!(f, "io error: {err}"),
            ConfigError::Serialization(err) => write!(f, "invalid config json: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
