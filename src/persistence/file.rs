use super::{PersistenceError, PersistenceResult};
use crate::layout::TrackLayout;
use crate::task::{TaskRecord, UnitId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct TaskSnapshot {
    tasks: Vec<TaskRecord>,
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    records: &[TaskRecord],
    path: P,
) -> PersistenceResult<()> {
    let snapshot = TaskSnapshot {
        tasks: records.to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskRecord>> {
    let file = File::open(path)?;
    let snapshot: TaskSnapshot = serde_json::from_reader(file)?;
    Ok(snapshot.tasks)
}

pub fn save_layout_to_json<P: AsRef<Path>>(layout: &TrackLayout, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, layout)?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    anticipated_start: String,
    anticipated_end: String,
    apparent_start: String,
    apparent_end: String,
    dependencies: String,
}

impl From<&TaskRecord> for TaskCsvRecord {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            anticipated_start: format_instant(Some(record.anticipated_start)),
            anticipated_end: format_instant(Some(record.anticipated_end)),
            apparent_start: format_instant(record.apparent_start),
            apparent_end: format_instant(record.apparent_end),
            dependencies: join_ids(&record.dependencies),
        }
    }
}

impl TaskCsvRecord {
    fn into_record(self) -> PersistenceResult<TaskRecord> {
        let anticipated_start = parse_instant(&self.anticipated_start)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("task {} has no anticipated_start", self.id))
        })?;
        let anticipated_end = parse_instant(&self.anticipated_end)?.ok_or_else(|| {
            PersistenceError::InvalidData(format!("task {} has no anticipated_end", self.id))
        })?;

        let mut record = TaskRecord::new(self.id.as_str(), self.name, anticipated_start, anticipated_end)
            .with_dependencies(split_ids(&self.dependencies));
        record.apparent_start = parse_instant(&self.apparent_start)?;
        record.apparent_end = parse_instant(&self.apparent_end)?;
        Ok(record)
    }
}

pub fn save_snapshot_to_csv<P: AsRef<Path>>(
    records: &[TaskRecord],
    path: P,
) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(TaskCsvRecord::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_snapshot_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<TaskRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<TaskCsvRecord>() {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

fn format_instant(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn parse_instant(value: &str) -> PersistenceResult<Option<DateTime<Utc>>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|err| PersistenceError::InvalidData(format!("invalid instant '{trimmed}': {err}")))
}

fn join_ids(ids: &[UnitId]) -> String {
    ids.iter()
        .map(UnitId::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

fn split_ids(value: &str) -> Vec<UnitId> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(UnitId::from)
        .collect()
}
