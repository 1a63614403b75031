pub mod chain;
pub mod config;
pub mod error;
pub mod group;
pub mod persistence;
pub mod pipeline;
pub mod schedule;
#[cfg(feature = "simulation")]
pub mod simulation;
pub mod tree;

pub use chain::{extract_all_chains, extract_chain};
pub use config::{ChainExclusion, CollisionPolicy, ConfigError, GroupingConfig, MergeStrategy};
pub use error::GroupingError;
pub use group::{Group, attach_representatives, chain_sets, merge_chains, merge_chains_with};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteScheduleStore;
pub use persistence::{
    CheckpointTable, ColumnConvention, PersistenceError, ScheduleStore, load_plan_from_json,
    save_plan_to_json, update_checkpoint_table, validate_plan,
};
pub use pipeline::{PipelineError, RunSummary, build_groups, plan_schedule};
pub use schedule::{
    GroupWindow, ScheduleEntry, ScheduleError, SchedulePlan, assign_schedule, now_epoch_seconds,
};
pub use tree::{NodeRow, ParentMap};
