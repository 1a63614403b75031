use crate::group::Group;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-node sleep/wake record. Timestamps are Unix epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub time_to_sleep: f64,
    pub time_to_wake: f64,
    pub is_sleeping: bool,
}

impl ScheduleEntry {
    pub fn sleep_at_utc(&self) -> Option<DateTime<Utc>> {
        epoch_to_utc(self.time_to_sleep)
    }

    pub fn wake_at_utc(&self) -> Option<DateTime<Utc>> {
        epoch_to_utc(self.time_to_wake)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWindow {
    pub index: usize,
    pub members: Group,
    pub sleep_at: f64,
    pub wake_at: f64,
}

impl GroupWindow {
    pub fn entry(&self) -> ScheduleEntry {
        ScheduleEntry {
            time_to_sleep: self.sleep_at,
            time_to_wake: self.wake_at,
            is_sleeping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub base_time: f64,
    pub active_duration: f64,
    pub inactive_duration: f64,
    pub windows: Vec<GroupWindow>,
    pub entries: BTreeMap<String, ScheduleEntry>,
}

impl SchedulePlan {
    pub fn group_count(&self) -> usize {
        self.windows.len()
    }

    pub fn entry(&self, node: &str) -> Option<&ScheduleEntry> {
        self.entries.get(node)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.windows.iter().map(|w| &w.members)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    DuplicateAssignment {
        node: String,
        first_group: usize,
        second_group: usize,
    },
    InvalidDuration {
        field: &'static str,
        value: f64,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::DuplicateAssignment {
                node,
                first_group,
                second_group,
            } => write!(
                f,
                "node '{node}' is assigned to group {first_group} and group {second_group}"
            ),
            ScheduleError::InvalidDuration { field, value } => {
                write!(f, "{field} must be finite and non-negative (got {value})")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Staggers the groups' sleep windows one after another.
///
/// Group `i` sleeps at `base_time + active + i * inactive` and wakes
/// `inactive` seconds later. Every member of a group gets the same entry.
pub fn assign_schedule(
    groups: &[Group],
    active_duration: f64,
    inactive_duration: f64,
    base_time: f64,
) -> Result<SchedulePlan, ScheduleError> {
    for (field, value) in [
        ("active_duration", active_duration),
        ("inactive_duration", inactive_duration),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ScheduleError::InvalidDuration { field, value });
        }
    }

    let start = base_time + active_duration;
    let mut windows = Vec::with_capacity(groups.len());
    let mut entries: BTreeMap<String, ScheduleEntry> = BTreeMap::new();
    let mut assigned_to: BTreeMap<&str, usize> = BTreeMap::new();

    for (index, group) in groups.iter().enumerate() {
        let sleep_at = start + index as f64 * inactive_duration;
        let window = GroupWindow {
            index,
            members: group.clone(),
            sleep_at,
            wake_at: sleep_at + inactive_duration,
        };
        let entry = window.entry();

        for node in group {
            if let Some(&first_group) = assigned_to.get(node.as_str()) {
                return Err(ScheduleError::DuplicateAssignment {
                    node: node.clone(),
                    first_group,
                    second_group: index,
                });
            }
            assigned_to.insert(node.as_str(), index);
            entries.insert(node.clone(), entry);
        }
        windows.push(window);
    }

    Ok(SchedulePlan {
        base_time,
        active_duration,
        inactive_duration,
        windows,
        entries,
    })
}

/// Current wall-clock time as Unix epoch seconds.
pub fn now_epoch_seconds() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

fn epoch_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}
