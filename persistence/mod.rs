/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Durable storage for the workspace history and saved projects.
//!
//! Layout:
//! - one redb database file under the data directory
//! - table `workspace`, key `latest`: the JSON [`WorkspaceRecord`]
//! - table `projects`, keyed by project id: JSON [`Project`] records
//!
//! Corrupt or malformed entries read back as absent.

pub mod types;

use std::path::PathBuf;

use log::warn;
use redb::{ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::ProjectId;
use types::{Project, WorkspaceRecord, validate_project};

type JsonTable = redb::TableDefinition<'static, &'static str, &'static [u8]>;

const WORKSPACE_TABLE: JsonTable = redb::TableDefinition::new("workspace");
const PROJECTS_TABLE: JsonTable = redb::TableDefinition::new("projects");
const WORKSPACE_KEY: &str = "latest";
const DATABASE_FILE: &str = "canvas.redb";

fn redb_error(e: impl std::fmt::Display) -> CanvasStoreError {
    CanvasStoreError::Redb(format!("{e}"))
}

/// redb-backed store for workspace and project records.
pub struct CanvasStore {
    db: redb::Database,
    base_dir: PathBuf,
}

impl CanvasStore {
    /// Open (or create) the store in `base_dir`.
    pub fn open(base_dir: PathBuf) -> Result<Self, CanvasStoreError> {
        std::fs::create_dir_all(&base_dir)
            .map_err(|e| CanvasStoreError::Io(format!("Failed to create dir: {e}")))?;

        let db = redb::Database::create(base_dir.join(DATABASE_FILE)).map_err(redb_error)?;

        // Create both tables up front so readers never see a missing table.
        let write_txn = db.begin_write().map_err(redb_error)?;
        {
            write_txn.open_table(WORKSPACE_TABLE).map_err(redb_error)?;
            write_txn.open_table(PROJECTS_TABLE).map_err(redb_error)?;
        }
        write_txn.commit().map_err(redb_error)?;

        Ok(Self { db, base_dir })
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn write_json<T: Serialize>(
        &mut self,
        table: JsonTable,
        key: &str,
        value: &T,
    ) -> Result<(), CanvasStoreError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| CanvasStoreError::Serialization(format!("{e}")))?;
        let write_txn = self.db.begin_write().map_err(redb_error)?;
        {
            let mut table = write_txn.open_table(table).map_err(redb_error)?;
            table.insert(key, bytes.as_slice()).map_err(redb_error)?;
        }
        write_txn.commit().map_err(redb_error)?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        table: JsonTable,
        key: &str,
    ) -> Option<T> {
        let read_txn = self.db.begin_read().ok()?;
        let table = read_txn.open_table(table).ok()?;
        let entry = table.get(key).ok()??;
        match serde_json::from_slice(entry.value()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable record {key}: {e}");
                None
            },
        }
    }

    fn remove(
        &mut self,
        table: JsonTable,
        key: &str,
    ) -> Result<(), CanvasStoreError> {
        let write_txn = self.db.begin_write().map_err(redb_error)?;
        {
            let mut table = write_txn.open_table(table).map_err(redb_error)?;
            let _ = table.remove(key).map_err(redb_error)?;
        }
        write_txn.commit().map_err(redb_error)?;
        Ok(())
    }

    pub fn save_workspace(&mut self, record: &WorkspaceRecord) -> Result<(), CanvasStoreError> {
        self.write_json(WORKSPACE_TABLE, WORKSPACE_KEY, record)
    }

    /// The persisted workspace, if one exists and decodes.
    pub fn load_workspace(&self) -> Option<WorkspaceRecord> {
        self.read_json(WORKSPACE_TABLE, WORKSPACE_KEY)
    }

    pub fn clear_workspace(&mut self) -> Result<(), CanvasStoreError> {
        self.remove(WORKSPACE_TABLE, WORKSPACE_KEY)
    }

    pub fn save_project(&mut self, project: &Project) -> Result<(), CanvasStoreError> {
        let key = project.id.to_string();
        self.write_json(PROJECTS_TABLE, &key, project)
    }

    pub fn load_project(&self, id: ProjectId) -> Option<Project> {
        let project: Project = self.read_json(PROJECTS_TABLE, &id.to_string())?;
        match validate_project(&project) {
            Ok(()) => Some(project),
            Err(e) => {
                warn!("Ignoring invalid project {id}: {e}");
                None
            },
        }
    }

    /// All readable projects, oldest first.
    pub fn load_projects(&self) -> Vec<Project> {
        let Ok(read_txn) = self.db.begin_read() else {
            return Vec::new();
        };
        let Ok(table) = read_txn.open_table(PROJECTS_TABLE) else {
            return Vec::new();
        };
        let Ok(iter) = table.iter() else {
            return Vec::new();
        };
        let mut projects = Vec::new();
        for entry in iter.flatten() {
            let (key, value) = entry;
            match serde_json::from_slice::<Project>(value.value()) {
                Ok(project) => match validate_project(&project) {
                    Ok(()) => projects.push(project),
                    Err(e) => warn!("Ignoring invalid project {}: {e}", key.value()),
                },
                Err(e) => warn!("Ignoring unreadable project {}: {e}", key.value()),
            }
        }
        projects.sort_by_key(|p| p.created_at);
        projects
    }

    pub fn delete_project(&mut self, id: ProjectId) -> Result<(), CanvasStoreError> {
        self.remove(PROJECTS_TABLE, &id.to_string())
    }

    /// Default data directory: `<config dir>/canvasshell/data`.
    pub fn default_data_dir() -> PathBuf {
        let mut dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.push("canvasshell");
        dir.push("data");
        dir
    }
}

/// Errors from the canvas store
#[derive(Debug)]
pub enum CanvasStoreError {
    Io(String),
    Redb(String),
    Serialization(String),
}

impl std::fmt::Display for CanvasStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasStoreError::Io(e) => write!(f, "IO error: {e}"),
            CanvasStoreError::Redb(e) => write!(f, "Redb error: {e}"),
            CanvasStoreError::Serialization(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for CanvasStoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CanvasView;
    use crate::history::HistoryManager;
    use crate::manager::{ActionKind, WindowAction, WindowManager};
    use tempfile::TempDir;

    fn create_test_store() -> (CanvasStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = CanvasStore::open(dir.path().to_path_buf()).unwrap();
        (store, dir)
    }

    fn project(name: &str, created_at: u64) -> Project {
        Project {
            id: ProjectId::new(),
            name: name.to_string(),
            created_at,
            last_modified_at: created_at,
            windows: Vec::new(),
            canvas_state: CanvasView::default(),
            next_window_id: 0,
        }
    }

    fn sample_record() -> WorkspaceRecord {
        let mut manager = WindowManager::new();
        let mut history = HistoryManager::new(manager.state().snapshot(ActionKind::RestoreState, 1));
        manager.dispatch(WindowAction::create_default());
        history.record(manager.state().snapshot(ActionKind::CreateWindow, 2));
        WorkspaceRecord {
            history: history.to_record(),
            current_project_id: None,
            current_project_name: types::UNTITLED_PROJECT_NAME.to_string(),
        }
    }

    #[test]
    fn test_empty_startup() {
        let (store, _dir) = create_test_store();
        assert!(store.load_workspace().is_none());
        assert!(store.load_projects().is_empty());
    }

    #[test]
    fn test_workspace_roundtrip_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        let record = sample_record();
        {
            let mut store = CanvasStore::open(path.clone()).unwrap();
            store.save_workspace(&record).unwrap();
        }
        {
            let store = CanvasStore::open(path).unwrap();
            assert_eq!(store.load_workspace(), Some(record));
        }
    }

    #[test]
    fn test_clear_workspace() {
        let (mut store, _dir) = create_test_store();
        store.save_workspace(&sample_record()).unwrap();
        store.clear_workspace().unwrap();
        assert!(store.load_workspace().is_none());
    }

    #[test]
    fn test_projects_listed_oldest_first() {
        let (mut store, _dir) = create_test_store();
        let newer = project("Newer", 200);
        let older = project("Older", 100);
        store.save_project(&newer).unwrap();
        store.save_project(&older).unwrap();
        let names: Vec<String> = store.load_projects().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Older".to_string(), "Newer".to_string()]);
    }

    #[test]
    fn test_project_delete() {
        let (mut store, _dir) = create_test_store();
        let doomed = project("Doomed", 1);
        store.save_project(&doomed).unwrap();
        assert!(store.load_project(doomed.id).is_some());
        store.delete_project(doomed.id).unwrap();
        assert!(store.load_project(doomed.id).is_none());
        // Deleting twice is fine.
        store.delete_project(doomed.id).unwrap();
    }

    #[test]
    fn test_corrupt_records_read_as_absent() {
        let (mut store, _dir) = create_test_store();
        store
            .write_json(WORKSPACE_TABLE, WORKSPACE_KEY, &serde_json::json!({ "bogus": true }))
            .unwrap();
        assert!(store.load_workspace().is_none());

        let good = project("Good", 1);
        store.save_project(&good).unwrap();
        store
            .write_json(PROJECTS_TABLE, "not-a-project", &serde_json::json!([1, 2, 3]))
            .unwrap();
        let mut blank = project("   ", 2);
        blank.id = ProjectId::new();
        store.save_project(&blank).unwrap();

        let projects = store.load_projects();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, good.id);
    }
}
