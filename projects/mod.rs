/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Named project layouts and the debounced autosave that feeds them.
//!
//! [`ProjectStore`] is the in-memory catalogue. Each mutating call returns
//! the record it touched so the caller can write it to the
//! [`CanvasStore`](crate::persistence::CanvasStore).

use std::time::{Duration, Instant};

use crate::geometry::CanvasView;
use crate::model::{ProjectId, Window};
use crate::persistence::types::{Project, UNTITLED_PROJECT_NAME};

/// Quiet period before an autosave fires.
pub const DEFAULT_AUTOSAVE_QUIET_MS: u64 = 1000;

/// Catalogue of saved projects, kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

fn clean_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_projects(mut projects: Vec<Project>) -> Self {
        projects.sort_by_key(|p| p.created_at);
        Self { projects }
    }

    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// New empty project. A blank name falls back to the untitled name.
    pub fn create(&mut self, name: &str, now: u64) -> Project {
        let project = Project {
            id: ProjectId::new(),
            name: clean_name(name).unwrap_or_else(|| UNTITLED_PROJECT_NAME.to_string()),
            created_at: now,
            last_modified_at: now,
            windows: Vec::new(),
            canvas_state: CanvasView::default(),
            next_window_id: 0,
        };
        self.projects.push(project.clone());
        project
    }

    /// Deep copy under a new id, named `<name> (Copy)`.
    pub fn duplicate(&mut self, id: ProjectId, now: u64) -> Option<Project> {
        let source = self.get(id)?;
        let copy = Project {
            id: ProjectId::new(),
            name: format!("{} (Copy)", source.name),
            created_at: now,
            last_modified_at: now,
            windows: source.windows.clone(),
            canvas_state: source.canvas_state,
            next_window_id: source.next_window_id,
        };
        self.projects.push(copy.clone());
        Some(copy)
    }

    /// Rename. Blank names are rejected.
    pub fn rename(&mut self, id: ProjectId, name: &str, now: u64) -> Option<Project> {
        let name = clean_name(name)?;
        let project = self.get_mut(id)?;
        project.name = name;
        project.last_modified_at = now;
        Some(project.clone())
    }

    pub fn delete(&mut self, id: ProjectId) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        Some(self.projects.remove(index))
    }

    /// Store the live layout into a project.
    pub fn save_state(
        &mut self,
        id: ProjectId,
        windows: &[Window],
        canvas: CanvasView,
        next_window_id: u64,
        now: u64,
    ) -> Option<Project> {
        let project = self.get_mut(id)?;
        project.windows = windows.to_vec();
        project.canvas_state = canvas;
        project.next_window_id = next_window_id;
        project.last_modified_at = now;
        Some(project.clone())
    }
}

/// Fires once after changes stop arriving for a quiet period.
#[derive(Debug, Clone)]
pub struct AutosaveDebouncer {
    quiet_period: Duration,
    pending_since: Option<Instant>,
}

impl AutosaveDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending_since: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Note a change at `now`, restarting the quiet period.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    /// True exactly once when the quiet period has elapsed since the last
    /// change.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.quiet_period => {
                self.pending_since = None;
                true
            },
            _ => false,
        }
    }
}

impl Default for AutosaveDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_QUIET_MS))
    }
}
