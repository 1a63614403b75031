use super::{PersistenceError, PersistenceResult};
use crate::schedule::{ScheduleEntry, SchedulePlan};
use crate::tree::{NodeRow, ParentMap};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// Column naming used by a checkpoint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConvention {
    /// `Node Name`, `Parent Node ID`, ...
    Spaced,
    /// `nodeName`, `parentNodeId`, ...
    Camel,
}

impl ColumnConvention {
    pub fn node_column(&self) -> &'static str {
        match self {
            ColumnConvention::Spaced => "Node Name",
            ColumnConvention::Camel => "nodeName",
        }
    }

    pub fn parent_column(&self) -> &'static str {
        match self {
            ColumnConvention::Spaced => "Parent Node ID",
            ColumnConvention::Camel => "parentNodeId",
        }
    }
}

/// Schedule columns carry the entry's field names under either convention.
pub const SLEEP_COLUMN: &str = "timeToSleep";
pub const WAKE_COLUMN: &str = "timeToWake";
pub const SLEEPING_COLUMN: &str = "isSleeping";

/// (header row index, convention), tried in order.
const LAYOUTS: [(usize, ColumnConvention); 4] = [
    (1, ColumnConvention::Spaced),
    (0, ColumnConvention::Camel),
    (0, ColumnConvention::Spaced),
    (1, ColumnConvention::Camel),
];

/// The checkpoint table: one row per node, plus whatever other columns and
/// preamble rows the file carries. Those are written back untouched.
#[derive(Debug, Clone)]
pub struct CheckpointTable {
    preamble: Vec<Vec<String>>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    convention: ColumnConvention,
    node_col: usize,
    parent_col: usize,
}

impl CheckpointTable {
    pub fn load<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => PersistenceError::FileNotFound(path.to_path_buf()),
            _ => PersistenceError::Io(err),
        })?;
        let table = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = table.rows.len(),
            convention = ?table.convention,
            "loaded checkpoint table"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> PersistenceResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            records.push(record?.iter().map(ToOwned::to_owned).collect());
        }

        for (header_row, convention) in LAYOUTS {
            let Some(headers) = records.get(header_row) else {
                continue;
            };
            let node_col = find_column(headers, convention.node_column());
            let parent_col = find_column(headers, convention.parent_column());
            if let (Some(node_col), Some(parent_col)) = (node_col, parent_col) {
                let mut records = records;
                let mut rows = records.split_off(header_row + 1);
                let mut headers = records.pop().unwrap_or_default();
                // unnamed trailing cells get blank headers so new columns land after them
                let width = rows.iter().map(Vec::len).fold(headers.len(), usize::max);
                headers.resize(width, String::new());
                for row in &mut rows {
                    row.resize(width, String::new());
                }
                return Ok(Self {
                    preamble: records,
                    headers,
                    rows,
                    convention,
                    node_col,
                    parent_col,
                });
            }
        }

        Err(PersistenceError::ColumnConventionMismatch {
            headers: records.into_iter().next().unwrap_or_default(),
        })
    }

    pub fn convention(&self) -> ColumnConvention {
        self.convention
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn node_rows(&self) -> Vec<NodeRow> {
        self.rows
            .iter()
            .map(|row| NodeRow {
                name: row[self.node_col].trim().to_string(),
                parent: Some(row[self.parent_col].trim())
                    .filter(|p| !p.is_empty())
                    .map(ToOwned::to_owned),
            })
            .filter(|row| !row.name.is_empty())
            .collect()
    }

    pub fn parent_map(&self) -> ParentMap {
        ParentMap::from_rows(self.node_rows())
    }

    /// Writes the entries into the sleep/wake columns, adding the columns if
    /// the table lacks them. Returns the number of rows touched.
    pub fn apply_schedule(&mut self, entries: &BTreeMap<String, ScheduleEntry>) -> usize {
        let sleep_col = self.ensure_column(SLEEP_COLUMN);
        let wake_col = self.ensure_column(WAKE_COLUMN);
        let sleeping_col = self.ensure_column(SLEEPING_COLUMN);

        let mut updated = 0;
        for row in &mut self.rows {
            let Some(entry) = entries.get(row[self.node_col].trim()) else {
                continue;
            };
            row[sleep_col] = entry.time_to_sleep.to_string();
            row[wake_col] = entry.time_to_wake.to_string();
            row[sleeping_col] = entry.is_sleeping.to_string();
            updated += 1;
        }
        updated
    }

    /// The stored entry for `node`, or `None` when the node is missing or has
    /// never been scheduled.
    pub fn schedule_entry(&self, node: &str) -> PersistenceResult<Option<ScheduleEntry>> {
        let Some(row) = self.rows.iter().find(|r| r[self.node_col].trim() == node) else {
            return Ok(None);
        };
        let cell = |column: &str| {
            find_column(&self.headers, column)
                .map(|ix| row[ix].trim())
                .filter(|v| !v.is_empty())
        };
        let (Some(sleep), Some(wake), Some(sleeping)) = (
            cell(SLEEP_COLUMN),
            cell(WAKE_COLUMN),
            cell(SLEEPING_COLUMN),
        ) else {
            return Ok(None);
        };
        Ok(Some(ScheduleEntry {
            time_to_sleep: parse_timestamp(sleep)?,
            time_to_wake: parse_timestamp(wake)?,
            is_sleeping: parse_bool(sleeping)?,
        }))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> PersistenceResult<()> {
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(file);
        for record in &self.preamble {
            writer.write_record(record)?;
        }
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(ix) = find_column(&self.headers, name) {
            return ix;
        }
        self.headers.push(name.to_string());
        let width = self.headers.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        width - 1
    }
}

/// Loads the table at `path`, writes the plan's entries into it and saves it
/// in place.
pub fn update_checkpoint_table<P: AsRef<Path>>(
    path: P,
    plan: &SchedulePlan,
) -> PersistenceResult<CheckpointTable> {
    let path = path.as_ref();
    let mut table = CheckpointTable::load(path)?;
    info!("Updating checkpoint table with new timings...");
    let updated = table.apply_schedule(&plan.entries);
    info!(updated, "Saving updated data back to {}", path.display());
    table.save(path)?;
    Ok(table)
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn parse_timestamp(input: &str) -> PersistenceResult<f64> {
    input
        .parse::<f64>()
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}

fn parse_bool(input: &str) -> PersistenceResult<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(PersistenceError::InvalidData(format!(
            "invalid boolean '{input}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_python_spelling() {
        assert!(parse_bool("True").unwrap());
        assert!(!parse_bool("FALSE").unwrap());
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn parse_bool_error_quotes_the_cell_as_written() {
        match parse_bool("Maybe") {
            Err(PersistenceError::InvalidData(msg)) => assert!(msg.contains("'Maybe'"), "{msg}"),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn ensure_column_pads_existing_rows() {
        let csv = "nodeName,parentNodeId\nA,\nB,A\n";
        let mut table = CheckpointTable::from_reader(csv.as_bytes()).unwrap();
        let ix = table.ensure_column("timeToSleep");
        assert_eq!(ix, 2);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.ensure_column("timeToSleep"), 2);
    }
}
