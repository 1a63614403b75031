use super::{PersistenceError, PersistenceResult, ScheduleStore};
use crate::schedule::{GroupWindow, ScheduleEntry, SchedulePlan};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS schedule_plan (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                base_time REAL NOT NULL,
                active_duration REAL NOT NULL,
                inactive_duration REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS group_windows (
                group_index INTEGER PRIMARY KEY,
                sleep_at REAL NOT NULL,
                wake_at REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS node_schedule (
                node_name TEXT PRIMARY KEY,
                group_index INTEGER NOT NULL REFERENCES group_windows(group_index),
                time_to_sleep REAL NOT NULL,
                time_to_wake REAL NOT NULL,
                is_sleeping INTEGER NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_windows(&self, tx: &rusqlite::Transaction, plan: &SchedulePlan) -> PersistenceResult<()> {
        tx.execute("DELETE FROM node_schedule", [])?;
        tx.execute("DELETE FROM group_windows", [])?;
        let mut window_stmt =
            tx.prepare("INSERT INTO group_windows (group_index, sleep_at, wake_at) VALUES (?1, ?2, ?3)")?;
        let mut node_stmt = tx.prepare(
            "INSERT INTO node_schedule (node_name, group_index, time_to_sleep, time_to_wake, is_sleeping)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for window in &plan.windows {
            window_stmt.execute(params![window.index as i64, window.sleep_at, window.wake_at])?;
            for node in &window.members {
                let entry = plan.entries.get(node).copied().unwrap_or_else(|| window.entry());
                node_stmt.execute(params![
                    node,
                    window.index as i64,
                    entry.time_to_sleep,
                    entry.time_to_wake,
                    entry.is_sleeping
                ])?;
            }
        }
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn save_plan(&self, plan: &SchedulePlan) -> PersistenceResult<()> {
        super::validate_plan(plan)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM schedule_plan", [])?;
        tx.execute(
            "INSERT INTO schedule_plan (id, base_time, active_duration, inactive_duration) VALUES (1, ?1, ?2, ?3)",
            params![plan.base_time, plan.active_duration, plan.inactive_duration],
        )?;
        self.save_windows(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    fn load_plan(&self) -> PersistenceResult<Option<SchedulePlan>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare(
            "SELECT base_time, active_duration, inactive_duration FROM schedule_plan WHERE id = 1",
        )?;
        let header: Option<(f64, f64, f64)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;
        let Some((base_time, active_duration, inactive_duration)) = header else {
            return Ok(None);
        };

        let mut windows: Vec<GroupWindow> = Vec::new();
        let mut stmt =
            conn.prepare("SELECT group_index, sleep_at, wake_at FROM group_windows ORDER BY group_index ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
        })?;
        for row in rows {
            let (index, sleep_at, wake_at) = row?;
            windows.push(GroupWindow {
                index: group_index(index)?,
                members: Default::default(),
                sleep_at,
                wake_at,
            });
        }

        let mut entries = BTreeMap::new();
        let mut stmt = conn.prepare(
            "SELECT node_name, group_index, time_to_sleep, time_to_wake, is_sleeping FROM node_schedule",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                ScheduleEntry {
                    time_to_sleep: row.get(2)?,
                    time_to_wake: row.get(3)?,
                    is_sleeping: row.get(4)?,
                },
            ))
        })?;
        for row in rows {
            let (node, index, entry) = row?;
            let index = group_index(index)?;
            if let Some(window) = windows.iter_mut().find(|w| w.index == index) {
                window.members.insert(node.clone());
            }
            entries.insert(node, entry);
        }

        let plan = SchedulePlan {
            base_time,
            active_duration,
            inactive_duration,
            windows,
            entries,
        };
        super::validate_plan(&plan)?;
        Ok(Some(plan))
    }
}

fn group_index(value: i64) -> PersistenceResult<usize> {
    usize::try_from(value)
        .map_err(|_| PersistenceError::InvalidData(format!("invalid group index {value}")))
}
