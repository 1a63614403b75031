mod common;

use common::{camel_csv, spaced_csv};
use sleep_groups::{
    CheckpointTable, ColumnConvention, GroupingConfig, PersistenceError, ScheduleEntry,
    plan_schedule, update_checkpoint_table,
};
use std::collections::BTreeMap;
use std::fs;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), contents).unwrap();
    file
}

#[test]
fn camel_table_loads_from_first_row_header() {
    let table = CheckpointTable::from_reader(camel_csv().as_bytes()).unwrap();
    assert_eq!(table.convention(), ColumnConvention::Camel);
    assert_eq!(table.len(), 11);
    let map = table.parent_map();
    assert_eq!(map.parent_of("L4Node_3"), Some("L3Node_2"));
    assert_eq!(map.parent_of("CloudDBServer"), None);
}

#[test]
fn spaced_table_with_title_row_loads_from_second_row_header() {
    let table = CheckpointTable::from_reader(spaced_csv().as_bytes()).unwrap();
    assert_eq!(table.convention(), ColumnConvention::Spaced);
    assert_eq!(table.len(), 11);
    assert_eq!(table.parent_map().parent_of("L1Node"), Some("CloudDBServer"));
}

#[test]
fn spaced_header_on_first_row_is_accepted() {
    let csv = "Node Name,Parent Node ID\nL1Node,\nL4Node_1,L1Node\n";
    let table = CheckpointTable::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(table.convention(), ColumnConvention::Spaced);
    assert_eq!(table.parent_map().parent_of("L4Node_1"), Some("L1Node"));
}

#[test]
fn unknown_columns_are_a_convention_mismatch() {
    let csv = "id,parent\n1,\n2,1\n";
    match CheckpointTable::from_reader(csv.as_bytes()) {
        Err(PersistenceError::ColumnConventionMismatch { headers }) => {
            assert_eq!(headers, vec!["id".to_string(), "parent".to_string()]);
        }
        other => panic!("expected ColumnConventionMismatch, got {other:?}"),
    }
}

#[test]
fn missing_file_is_reported_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint_table.csv");
    match CheckpointTable::load(&path) {
        Err(PersistenceError::FileNotFound(reported)) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[test]
fn written_entry_reads_back_unchanged() {
    let file = write_temp(&camel_csv());
    let mut table = CheckpointTable::load(file.path()).unwrap();
    let entry = ScheduleEntry {
        time_to_sleep: 1_729_331_070.125,
        time_to_wake: 1_729_331_160.125,
        is_sleeping: false,
    };
    let entries: BTreeMap<String, ScheduleEntry> =
        [("L4Node_2".to_string(), entry)].into_iter().collect();
    assert_eq!(table.apply_schedule(&entries), 1);
    table.save(file.path()).unwrap();

    let reloaded = CheckpointTable::load(file.path()).unwrap();
    assert_eq!(reloaded.schedule_entry("L4Node_2").unwrap(), Some(entry));
    assert_eq!(reloaded.schedule_entry("L4Node_1").unwrap(), None);
    assert!(reloaded.headers().iter().any(|h| h == "timeToSleep"));
}

#[test]
fn spaced_table_keeps_title_row_and_gains_entry_named_columns() {
    let file = write_temp(&spaced_csv());
    let config = GroupingConfig::default();
    let map = CheckpointTable::load(file.path()).unwrap().parent_map();
    let (plan, _) = plan_schedule(&map, &config, 0.0).unwrap();

    update_checkpoint_table(file.path(), &plan).unwrap();

    let written = fs::read_to_string(file.path()).unwrap();
    assert!(written.starts_with("Checkpoint table,,\n"));
    let header = written.lines().nth(1).unwrap();
    assert!(header.starts_with("Node Name, Parent Node ID,Layer"), "{header}");
    assert!(header.ends_with("timeToSleep,timeToWake,isSleeping"), "{header}");

    let reloaded = CheckpointTable::load(file.path()).unwrap();
    assert_eq!(reloaded.convention(), ColumnConvention::Spaced);
    for (node, entry) in &plan.entries {
        assert_eq!(reloaded.schedule_entry(node).unwrap().as_ref(), Some(entry));
    }
}

#[test]
fn rows_without_entries_keep_existing_values() {
    let csv = "nodeName,parentNodeId,timeToSleep,timeToWake,isSleeping\nL1Node,,5,6,True\nL4Node_1,L1Node,,,\n";
    let mut table = CheckpointTable::from_reader(csv.as_bytes()).unwrap();
    let entry = ScheduleEntry {
        time_to_sleep: 70.0,
        time_to_wake: 160.0,
        is_sleeping: false,
    };
    let entries: BTreeMap<String, ScheduleEntry> =
        [("L4Node_1".to_string(), entry)].into_iter().collect();
    table.apply_schedule(&entries);

    assert_eq!(
        table.schedule_entry("L1Node").unwrap(),
        Some(ScheduleEntry {
            time_to_sleep: 5.0,
            time_to_wake: 6.0,
            is_sleeping: true,
        })
    );
    assert_eq!(table.schedule_entry("L4Node_1").unwrap(), Some(entry));
    assert_eq!(table.headers().len(), 5);
}

#[test]
fn malformed_timestamp_is_invalid_data() {
    let csv = "nodeName,parentNodeId,timeToSleep,timeToWake,isSleeping\nA,,soon,6,false\n";
    let table = CheckpointTable::from_reader(csv.as_bytes()).unwrap();
    match table.schedule_entry("A") {
        Err(PersistenceError::InvalidData(msg)) => assert!(msg.contains("soon"), "{msg}"),
        other => panic!("expected InvalidData, got {other:?}"),
    }
}

#[test]
fn trailing_unnamed_cells_survive_write_back() {
    let file = write_temp("nodeName,parentNodeId\nL4Node_1,L3Node_1,note\nL3Node_1,\n");
    let mut table = CheckpointTable::load(file.path()).unwrap();
    let entry = ScheduleEntry {
        time_to_sleep: 70.0,
        time_to_wake: 160.0,
        is_sleeping: false,
    };
    let entries: BTreeMap<String, ScheduleEntry> =
        [("L4Node_1".to_string(), entry)].into_iter().collect();
    table.apply_schedule(&entries);
    table.save(file.path()).unwrap();

    let written = fs::read_to_string(file.path()).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "nodeName,parentNodeId,,timeToSleep,timeToWake,isSleeping");
    assert_eq!(lines[1], "L4Node_1,L3Node_1,note,70,160,false");
    assert_eq!(lines[2], "L3Node_1,,,,,");

    let reloaded = CheckpointTable::load(file.path()).unwrap();
    assert_eq!(reloaded.schedule_entry("L4Node_1").unwrap(), Some(entry));
}
