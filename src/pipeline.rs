use crate::chain::extract_all_chains;
use crate::config::{ConfigError, GroupingConfig};
use crate::error::GroupingError;
use crate::group::{Group, attach_representatives, chain_sets, merge_chains_with};
use crate::schedule::{ScheduleError, SchedulePlan, assign_schedule};
use crate::tree::ParentMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub node_count: usize,
    pub chain_count: usize,
    pub merged_group_count: usize,
    pub group_count: usize,
    pub scheduled_node_count: usize,
}

impl RunSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("nodes={}", self.node_count),
            format!("chains={}", self.chain_count),
            format!("groups={}", self.group_count),
        ];
        if self.merged_group_count != self.group_count {
            parts.push(format!("before_attach={}", self.merged_group_count));
        }
        if self.scheduled_node_count > 0 {
            parts.push(format!("scheduled={}", self.scheduled_node_count));
        }
        parts.join(", ")
    }
}

#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Grouping(GroupingError),
    Schedule(ScheduleError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "config error: {err}"),
            PipelineError::Grouping(err) => write!(f, "grouping error: {err}"),
            PipelineError::Schedule(err) => write!(f, "schedule error: {err}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ConfigError> for PipelineError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<GroupingError> for PipelineError {
    fn from(value: GroupingError) -> Self {
        Self::Grouping(value)
    }
}

impl From<ScheduleError> for PipelineError {
    fn from(value: ScheduleError) -> Self {
        Self::Schedule(value)
    }
}

/// Chains → merged groups → representative attachment.
pub fn build_groups(
    parent_map: &ParentMap,
    config: &GroupingConfig,
) -> Result<(Vec<Group>, RunSummary), PipelineError> {
    config.validate()?;
    parent_map.check_acyclic()?;

    let chains = extract_all_chains(parent_map, config)?;
    debug!(chains = chains.len(), leaf_prefix = %config.leaf_prefix, "extracted chains");

    let merged = merge_chains_with(&chain_sets(&chains), config.merge_strategy);
    let merged_group_count = merged.len();
    let groups = attach_representatives(merged, parent_map, config)?;
    info!("Number of inclusive groups: {}", groups.len());

    let summary = RunSummary {
        node_count: parent_map.len(),
        chain_count: chains.len(),
        merged_group_count,
        group_count: groups.len(),
        scheduled_node_count: 0,
    };
    Ok((groups, summary))
}

pub fn plan_schedule(
    parent_map: &ParentMap,
    config: &GroupingConfig,
    base_time: f64,
) -> Result<(SchedulePlan, RunSummary), PipelineError> {
    let (groups, mut summary) = build_groups(parent_map, config)?;
    let plan = assign_schedule(
        &groups,
        config.active_duration_secs,
        config.inactive_duration_secs,
        base_time,
    )?;
    summary.scheduled_node_count = plan.entries.len();
    info!(
        groups = plan.group_count(),
        nodes = plan.entries.len(),
        base_time,
        "assigned sleep windows"
    );
    Ok((plan, summary))
}
