//! On-disk layout of the task store and its schema migrations.
//!
//! # Layout
//! - Version 2 (current): `{"schema_version": 2, "tasks": [...]}`.
//! - Version 1 (legacy): a bare array of records with `itemNumber` and a
//!   nullable boolean `status`. Rewritten to version 2 on open.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::task::{Status, Task};

pub const DEFAULT_FILE_NAME: &str = "tasks.json";
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Deserialize)]
struct StoreFile {
    schema_version: u32,
    #[serde(default)]
    tasks: Value,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    schema_version: u32,
    tasks: &'a [Task],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTask {
    #[serde(default)]
    item_number: u32,
    #[serde(default)]
    note: String,
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    completion_time: Option<f64>,
}

impl From<LegacyTask> for Task {
    fn from(legacy: LegacyTask) -> Self {
        // Legacy ids were not UUIDs; records get fresh ones.
        Task {
            id: Uuid::new_v4(),
            sequence_number: legacy.item_number,
            note: legacy.note,
            status: Status::from_flag(legacy.status),
            completion_time: legacy.completion_time,
        }
    }
}

/// Handle on the JSON file backing a persistent store.
#[derive(Debug)]
pub(crate) struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    /// Opens `<dir>/tasks.json`, creating it when absent and migrating legacy layouts.
    pub(crate) fn open(dir: &Path) -> StoreResult<(Self, Vec<Task>)> {
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;
        let file = TaskFile {
            path: dir.join(DEFAULT_FILE_NAME),
        };

        if !file.path.exists() {
            file.persist(&[])?;
            info!(
                "event=store_create module=store status=ok path={}",
                file.path.display()
            );
            return Ok((file, Vec::new()));
        }

        let raw = fs::read_to_string(&file.path).map_err(|err| StoreError::io(&file.path, err))?;
        if raw.trim().is_empty() {
            file.persist(&[])?;
            return Ok((file, Vec::new()));
        }

        let value: Value =
            serde_json::from_str(&raw).map_err(|err| StoreError::serde(&file.path, err))?;
        let (tasks, found_version) = decode(value).map_err(|err| match err {
            DecodeError::Json(source) => StoreError::serde(&file.path, source),
            DecodeError::TooNew(found) => StoreError::UnsupportedSchemaVersion {
                found,
                supported: SCHEMA_VERSION,
            },
        })?;

        if found_version < SCHEMA_VERSION {
            if let Err(err) = file.persist(&tasks) {
                error!(
                    "event=store_migrate module=store status=error from={} to={} error={}",
                    found_version, SCHEMA_VERSION, err
                );
                return Err(err);
            }
            info!(
                "event=store_migrate module=store status=ok from={} to={} tasks={}",
                found_version,
                SCHEMA_VERSION,
                tasks.len()
            );
        }

        Ok((file, tasks))
    }

    /// Replaces the file contents atomically via a sibling temp file and rename.
    pub(crate) fn persist(&self, tasks: &[Task]) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let body = StoreFileRef {
                schema_version: SCHEMA_VERSION,
                tasks,
            };
            serde_json::to_writer_pretty(&mut writer, &body)
                .map_err(|err| StoreError::serde(&self.path, err))?;
            writer.flush().map_err(|err| StoreError::io(&self.path, err))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|err| StoreError::io(&self.path, err))?;
        tmp.persist(&self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[derive(Debug)]
enum DecodeError {
    Json(serde_json::Error),
    TooNew(u32),
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        DecodeError::Json(value)
    }
}

/// Returns the decoded records and the schema version they were stored with.
fn decode(value: Value) -> Result<(Vec<Task>, u32), DecodeError> {
    if value.is_array() {
        let legacy: Vec<LegacyTask> = serde_json::from_value(value)?;
        return Ok((legacy.into_iter().map(Task::from).collect(), 1));
    }

    let file: StoreFile = serde_json::from_value(value)?;
    match file.schema_version {
        v if v > SCHEMA_VERSION => Err(DecodeError::TooNew(v)),
        SCHEMA_VERSION => Ok((serde_json::from_value(file.tasks)?, SCHEMA_VERSION)),
        v => {
            let legacy: Vec<LegacyTask> = serde_json::from_value(file.tasks)?;
            Ok((legacy.into_iter().map(Task::from).collect(), v))
        }
    }
}
