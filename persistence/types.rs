/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable records kept in the canvas store, and the checks applied to
//! them on load.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::CanvasView;
use crate::history::HistoryRecord;
use crate::manager::WorkspaceSnapshot;
use crate::model::{ProjectId, Window, WindowId};

/// Name shown while no project is open.
pub const UNTITLED_PROJECT_NAME: &str = "Untitled Project";

/// The live workspace: undo/redo stacks plus which project they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    #[serde(flatten)]
    pub history: HistoryRecord,
    #[serde(default)]
    pub current_project_id: Option<ProjectId>,
    #[serde(default = "untitled_project_name")]
    pub current_project_name: String,
}

fn untitled_project_name() -> String {
    UNTITLED_PROJECT_NAME.to_string()
}

/// A named, saved canvas layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    #[serde(alias = "updatedAt")]
    pub last_modified_at: u64,
    #[serde(default)]
    pub windows: Vec<Window>,
    #[serde(default)]
    pub canvas_state: CanvasView,
    #[serde(default)]
    pub next_window_id: u64,
}

impl Project {
    /// Window-name counter to resume from. Older records do not carry one,
    /// so fall back to the window count.
    pub fn resume_window_counter(&self) -> u64 {
        self.next_window_id.max(self.windows.len() as u64)
    }
}

/// Why a stored snapshot or project was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    MalformedWindow(WindowId),
    DuplicateWindow(WindowId),
    UnknownActiveWindow(WindowId),
    InvalidCanvas,
    EmptyName,
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::MalformedWindow(id) => write!(f, "window {id} is malformed"),
            SnapshotError::DuplicateWindow(id) => write!(f, "window {id} appears twice"),
            SnapshotError::UnknownActiveWindow(id) => {
                write!(f, "active window {id} is not in the snapshot")
            },
            SnapshotError::InvalidCanvas => write!(f, "canvas view is not finite"),
            SnapshotError::EmptyName => write!(f, "project name is empty"),
        }
    }
}

impl std::error::Error for SnapshotError {}

fn validate_windows(windows: &[Window], canvas: &CanvasView) -> Result<(), SnapshotError> {
    if !canvas.is_finite() || canvas.zoom <= 0.0 {
        return Err(SnapshotError::InvalidCanvas);
    }
    let mut seen = HashSet::new();
    for window in windows {
        if !window.is_well_formed() {
            return Err(SnapshotError::MalformedWindow(window.id));
        }
        if !seen.insert(window.id) {
            return Err(SnapshotError::DuplicateWindow(window.id));
        }
    }
    Ok(())
}

pub fn validate_snapshot(snapshot: &WorkspaceSnapshot) -> Result<(), SnapshotError> {
    validate_windows(&snapshot.windows, &snapshot.canvas)?;
    if let Some(active) = snapshot.active_window_id
        && !snapshot.windows.iter().any(|w| w.id == active)
    {
        return Err(SnapshotError::UnknownActiveWindow(active));
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> Result<(), SnapshotError> {
    if project.name.trim().is_empty() {
        return Err(SnapshotError::EmptyName);
    }
    validate_windows(&project.windows, &project.canvas_state)
}
