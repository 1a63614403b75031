use crate::schedule::{GroupWindow, ScheduleEntry, SchedulePlan};
use serde_json::Error as SerdeJsonError;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PersistenceError {
    FileNotFound(PathBuf),
    ColumnConventionMismatch { headers: Vec<String> },
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::FileNotFound(path) => {
                write!(f, "file not found: {}", path.display())
            }
            PersistenceError::ColumnConventionMismatch { headers } => write!(
                f,
                "no node/parent columns found (expected 'nodeName'/'parentNodeId' or 'Node Name'/'Parent Node ID', got [{}])",
                headers.join(", ")
            ),
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no schedule stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ScheduleStore {
    fn save_plan(&self, plan: &SchedulePlan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<SchedulePlan>>;
}

/// Checks that a plan read back from storage still holds one window per node
/// and that every entry agrees with its window.
pub fn validate_plan(plan: &SchedulePlan) -> PersistenceResult<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for window in &plan.windows {
        if window.wake_at < window.sleep_at {
            return Err(PersistenceError::InvalidData(format!(
                "group {} wakes before it sleeps",
                window.index
            )));
        }
        for node in &window.members {
            if let Some(first) = seen.insert(node.as_str(), window.index) {
                return Err(PersistenceError::InvalidData(format!(
                    "node '{node}' appears in group {first} and group {}",
                    window.index
                )));
            }
            match plan.entries.get(node) {
                Some(entry) if same_window(entry, window) => {}
                Some(_) => {
                    return Err(PersistenceError::InvalidData(format!(
                        "entry for '{node}' does not match group {}",
                        window.index
                    )));
                }
                None => {
                    return Err(PersistenceError::InvalidData(format!(
                        "node '{node}' in group {} has no entry",
                        window.index
                    )));
                }
            }
        }
    }
    if seen.len() != plan.entries.len() {
        return Err(PersistenceError::InvalidData(format!(
            "{} entries but {} grouped nodes",
            plan.entries.len(),
            seen.len()
        )));
    }
    Ok(())
}

// is_sleeping may have flipped after assignment; only the timing must agree
fn same_window(entry: &ScheduleEntry, window: &GroupWindow) -> bool {
    entry.time_to_sleep == window.sleep_at && entry.time_to_wake == window.wake_at
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod table;

pub use file::{load_plan_from_json, save_plan_to_json};
pub use table::{CheckpointTable, ColumnConvention, update_checkpoint_table};
