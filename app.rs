/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Application state for the canvas.
//!
//! [`CanvasApp`] owns the window manager, its undo/redo history, the project
//! catalogue and the durable store, and runs every dispatch through the same
//! pipeline: reduce, record history, persist the workspace, mark autosave.

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};

use crate::content::{self, ContentEvent, NavigationCommand, NavigationController};
use crate::geometry::{CanvasView, ViewportPoint, ViewportSize};
use crate::history::{HistoryManager, RecordOutcome};
use crate::input::gesture::PointerPress;
use crate::input::{GestureController, KeyCommand, KeyInput, KeyboardRouter, Platform, WheelController, WheelInput};
use crate::manager::{
    ActionKind, DispatchOutcome, WindowAction, WindowManager, WindowManagerState, WorkspaceSnapshot,
};
use crate::model::{ProjectId, TabId, WindowId, now_millis};
use crate::persistence::CanvasStore;
use crate::persistence::types::{Project, UNTITLED_PROJECT_NAME, WorkspaceRecord};
use crate::prefs::CanvasPreferences;
use crate::projects::{AutosaveDebouncer, ProjectStore};

/// Main application state
pub struct CanvasApp {
    manager: WindowManager,
    history: HistoryManager,
    projects: ProjectStore,
    /// `None` when the store could not be opened; everything then lives in
    /// memory only.
    persistence: Option<CanvasStore>,
    autosave: AutosaveDebouncer,
    prefs: CanvasPreferences,
    current_project_id: Option<ProjectId>,
    current_project_name: String,
    /// Last reported size of the canvas viewport, in pixels.
    viewport: ViewportSize,
    wheel: WheelController,
    gestures: GestureController,
    keyboard: KeyboardRouter,
}

impl CanvasApp {
    /// Open the app on the data directory named by `prefs`, or the default
    /// one.
    pub fn new(prefs: CanvasPreferences) -> Self {
        let data_dir = prefs
            .data_dir
            .clone()
            .unwrap_or_else(CanvasStore::default_data_dir);
        Self::new_from_dir(data_dir, prefs)
    }

    /// Open the app on a specific persistence directory.
    pub fn new_from_dir(data_dir: PathBuf, prefs: CanvasPreferences) -> Self {
        let persistence = match CanvasStore::open(data_dir) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Failed to open canvas store: {e}");
                None
            },
        };
        let mut app = Self::with_store(persistence, prefs);
        app.recover();
        app
    }

    /// In-memory app with default preferences.
    pub fn new_for_testing() -> Self {
        Self::with_store(None, CanvasPreferences::default())
    }

    fn with_store(persistence: Option<CanvasStore>, prefs: CanvasPreferences) -> Self {
        let manager = WindowManager::new();
        let history = HistoryManager::with_limit(
            manager.state().snapshot(ActionKind::RestoreState, now_millis()),
            prefs.history_limit,
            prefs.coalesce_tab_updates,
        );
        Self {
            manager,
            history,
            projects: ProjectStore::new(),
            persistence,
            autosave: AutosaveDebouncer::new(prefs.autosave_quiet_period()),
            wheel: WheelController::from_prefs(&prefs),
            gestures: GestureController::new(),
            keyboard: KeyboardRouter::from_prefs(Platform::current(), &prefs),
            prefs,
            current_project_id: None,
            current_project_name: UNTITLED_PROJECT_NAME.to_string(),
            viewport: ViewportSize::zero(),
        }
    }

    /// Reload projects and the last workspace from the store.
    fn recover(&mut self) {
        let Some(store) = &self.persistence else {
            return;
        };
        self.projects = ProjectStore::from_projects(store.load_projects());
        let Some(record) = store.load_workspace() else {
            debug!("No persisted workspace");
            return;
        };

        let history = match HistoryManager::from_record(
            record.history,
            self.prefs.history_limit,
            self.prefs.coalesce_tab_updates,
        ) {
            Ok(history) => history,
            Err(e) => {
                warn!("Discarding persisted workspace: {e}");
                return;
            },
        };
        let present = history.present().clone();
        self.history = history;
        self.apply_snapshot(present);

        match record.current_project_id {
            Some(id) if self.projects.get(id).is_some() => {
                self.current_project_id = Some(id);
                self.current_project_name = record.current_project_name;
            },
            Some(id) => warn!("Workspace refers to missing project {id}; detaching"),
            None => {},
        }
        info!(
            "Recovered workspace with {} windows, {} undo steps",
            self.state().windows.len(),
            self.history.past_len()
        );
    }

    pub fn state(&self) -> &WindowManagerState {
        self.manager.state()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn prefs(&self) -> &CanvasPreferences {
        &self.prefs
    }

    pub fn has_persistence(&self) -> bool {
        self.persistence.is_some()
    }

    pub fn current_project_id(&self) -> Option<ProjectId> {
        self.current_project_id
    }

    pub fn current_project_name(&self) -> &str {
        &self.current_project_name
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    /// Apply one action and run the post-dispatch pipeline.
    pub fn dispatch(&mut self, action: WindowAction, now: Instant) -> DispatchOutcome {
        let outcome = self.manager.dispatch(action);
        // A committing action after live updates leaves the state unchanged
        // but still closes the gesture's undo step.
        let commits_gesture = outcome.kind.is_gesture_commit() && self.history.gesture_pending();
        if !outcome.changed && !commits_gesture {
            return outcome;
        }

        let snapshot = self.state().snapshot(outcome.kind, now_millis());
        if self.history.record(snapshot) != RecordOutcome::Ignored {
            self.persist_workspace();
        }
        if outcome.changed {
            self.autosave.mark_dirty(now);
        }
        outcome
    }

    pub fn dispatch_all<I>(&mut self, actions: I, now: Instant)
    where
        I: IntoIterator<Item = WindowAction>,
    {
        for action in actions {
            self.dispatch(action, now);
        }
    }

    /// Load a snapshot into the window manager without recording it.
    fn apply_snapshot(&mut self, snapshot: WorkspaceSnapshot) {
        self.history.begin_restore();
        self.manager
            .dispatch(WindowAction::RestoreFromSnapshot(Box::new(snapshot)));
        self.history.end_restore();
    }

    /// Run `action` under the restore guard: the state changes, history does
    /// not.
    fn dispatch_unrecorded(&mut self, action: WindowAction, now: Instant) {
        self.history.begin_restore();
        self.dispatch(action, now);
        self.history.end_restore();
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        self.persist_workspace();
        self.autosave.mark_dirty(now);
        true
    }

    pub fn redo(&mut self, now: Instant) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        self.persist_workspace();
        self.autosave.mark_dirty(now);
        true
    }

    /// Record the viewport size; the first report also centres the canvas.
    pub fn set_viewport(&mut self, viewport: ViewportSize, now: Instant) {
        let first = self.viewport.is_empty();
        self.viewport = viewport;
        if first && !viewport.is_empty() {
            self.dispatch(WindowAction::InitializeCanvasView(viewport), now);
        }
    }

    pub fn handle_wheel(&mut self, input: &WheelInput, now: Instant) {
        let action = self.wheel.handle(input, &self.state().canvas, self.viewport);
        if let Some(action) = action {
            self.dispatch(action, now);
        }
    }

    /// Ctrl+wheel forwarded from page content.
    pub fn handle_forwarded_zoom(&mut self, delta_y: f64, pointer: ViewportPoint, now: Instant) {
        let action = self
            .wheel
            .forwarded_zoom(delta_y, pointer, &self.state().canvas, self.viewport);
        if let Some(action) = action {
            self.dispatch(action, now);
        }
    }

    pub fn pointer_down(&mut self, press: &PointerPress, now: Instant) {
        let actions = self.gestures.pointer_down(self.manager.state(), press);
        self.dispatch_all(actions, now);
    }

    pub fn pointer_move(&mut self, position: ViewportPoint, now: Instant) {
        let action = self
            .gestures
            .pointer_move(self.manager.state(), position, self.viewport);
        if let Some(action) = action {
            self.dispatch(action, now);
        }
    }

    pub fn pointer_up(&mut self, position: ViewportPoint, now: Instant) {
        let action = self
            .gestures
            .pointer_up(self.manager.state(), position, self.viewport);
        if let Some(action) = action {
            self.dispatch(action, now);
        }
        self.finish_gesture();
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        if let Some(action) = self.gestures.pointer_leave(self.manager.state()) {
            self.dispatch(action, now);
        }
        self.finish_gesture();
    }

    /// A gesture released where it started emits no commit; its baseline
    /// must not be picked up by a later step.
    fn finish_gesture(&mut self) {
        if !self.gestures.is_active() {
            self.history.cancel_gesture();
        }
    }

    /// Route a key press. Window actions, undo/redo and zoom-to-selection
    /// are applied here; anything the host must handle is returned.
    pub fn handle_key(&mut self, input: &KeyInput, now: Instant) -> Option<KeyCommand> {
        let command = self.keyboard.route(input, self.manager.state(), now)?;
        match command {
            KeyCommand::Window(action) => {
                self.dispatch(action, now);
                None
            },
            KeyCommand::Undo => {
                self.undo(now);
                None
            },
            KeyCommand::Redo => {
                self.redo(now);
                None
            },
            KeyCommand::ZoomToSelection => {
                self.dispatch(WindowAction::ZoomToSelection(self.viewport), now);
                None
            },
            other => Some(other),
        }
    }

    /// Apply an event from a tab's content surface. Returns a command when
    /// the surface itself must act.
    pub fn handle_content_event(
        &mut self,
        tab: TabId,
        event: &ContentEvent,
        now: Instant,
    ) -> Option<NavigationCommand> {
        if let Some(command) = NavigationController::new_window_request(tab, event) {
            return Some(command);
        }
        if let Some(action) = content::content_event_action(self.manager.state(), tab, event) {
            self.dispatch(action, now);
        }
        None
    }

    /// Navigate the tab at `index` of `window` to URL-bar input.
    pub fn submit_url(
        &mut self,
        window: WindowId,
        index: usize,
        input: &str,
        now: Instant,
    ) -> Option<NavigationCommand> {
        let (action, command) = NavigationController::submit(self.manager.state(), window, index, input)?;
        self.dispatch(action, now);
        Some(command)
    }

    fn persist_workspace(&mut self) {
        let Some(store) = &mut self.persistence else {
            return;
        };
        let record = WorkspaceRecord {
            history: self.history.to_record(),
            current_project_id: self.current_project_id,
            current_project_name: self.current_project_name.clone(),
        };
        if let Err(e) = store.save_workspace(&record) {
            warn!("Failed to save workspace: {e}");
        }
    }

    fn persist_project(&mut self, project: &Project) {
        let Some(store) = &mut self.persistence else {
            return;
        };
        if let Err(e) = store.save_project(project) {
            warn!("Failed to save project {}: {e}", project.id);
        }
    }

    /// Start a fresh history at the current state.
    fn reset_history(&mut self) {
        let snapshot = self.state().snapshot(ActionKind::RestoreState, now_millis());
        self.history.reset(snapshot);
        self.autosave.cancel();
        self.persist_workspace();
    }

    /// Create a project, open it and give it one default window.
    pub fn create_project(&mut self, name: &str, now: Instant) -> ProjectId {
        self.save_current_project();
        let project = self.projects.create(name, now_millis());
        self.persist_project(&project);

        self.dispatch_unrecorded(
            WindowAction::RestoreState {
                windows: Vec::new(),
                canvas: project.canvas_state,
                next_window_id: 0,
            },
            now,
        );
        self.dispatch_unrecorded(WindowAction::create_default(), now);
        if !self.viewport.is_empty() {
            self.dispatch_unrecorded(WindowAction::InitializeCanvasView(self.viewport), now);
        }

        self.current_project_id = Some(project.id);
        self.current_project_name = project.name.clone();
        self.save_current_project();
        self.reset_history();
        info!("Created project {} ({})", project.name, project.id);
        project.id
    }

    /// Load a saved project into the live state. Returns false for an
    /// unknown id.
    pub fn open_project(&mut self, id: ProjectId, now: Instant) -> bool {
        let Some(project) = self.projects.get(id).cloned() else {
            warn!("Cannot open unknown project {id}");
            return false;
        };
        if self.current_project_id != Some(id) {
            self.save_current_project();
        }

        self.dispatch_unrecorded(
            WindowAction::RestoreState {
                windows: project.windows.clone(),
                canvas: project.canvas_state,
                next_window_id: project.resume_window_counter(),
            },
            now,
        );
        if self.state().windows.is_empty() {
            self.dispatch_unrecorded(WindowAction::create_default(), now);
        }

        self.current_project_id = Some(id);
        self.current_project_name = project.name;
        self.reset_history();
        true
    }

    /// Save the open project, then clear the canvas and detach from it.
    pub fn close_project(&mut self, now: Instant) {
        self.save_current_project();
        self.dispatch_unrecorded(
            WindowAction::RestoreState {
                windows: Vec::new(),
                canvas: CanvasView::default(),
                next_window_id: 0,
            },
            now,
        );
        self.current_project_id = None;
        self.current_project_name = UNTITLED_PROJECT_NAME.to_string();
        self.reset_history();
    }

    /// Delete a project. Deleting the open project detaches it without
    /// saving.
    pub fn delete_project(&mut self, id: ProjectId) -> bool {
        if self.projects.delete(id).is_none() {
            return false;
        }
        if let Some(store) = &mut self.persistence
            && let Err(e) = store.delete_project(id)
        {
            warn!("Failed to delete project {id}: {e}");
        }
        if self.current_project_id == Some(id) {
            self.current_project_id = None;
            self.current_project_name = UNTITLED_PROJECT_NAME.to_string();
            self.autosave.cancel();
            self.persist_workspace();
        }
        true
    }

    pub fn rename_project(&mut self, id: ProjectId, name: &str) -> bool {
        let Some(project) = self.projects.rename(id, name, now_millis()) else {
            return false;
        };
        self.persist_project(&project);
        if self.current_project_id == Some(id) {
            self.current_project_name = project.name;
            self.persist_workspace();
        }
        true
    }

    pub fn duplicate_project(&mut self, id: ProjectId) -> Option<ProjectId> {
        let copy = self.projects.duplicate(id, now_millis())?;
        self.persist_project(&copy);
        Some(copy.id)
    }

    /// Write the live layout into the open project. Nothing is saved
    /// without an open project or with an empty canvas.
    pub fn save_current_project(&mut self) -> bool {
        let Some(id) = self.current_project_id else {
            return false;
        };
        let state = self.manager.state();
        if state.windows.is_empty() {
            return false;
        }
        let saved = self.projects.save_state(
            id,
            &state.windows,
            state.canvas,
            state.next_window_id,
            now_millis(),
        );
        match saved {
            Some(project) => {
                self.persist_project(&project);
                true
            },
            None => false,
        }
    }

    /// Drive the autosave timer. Returns true when a save happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.autosave.poll(now) {
            return false;
        }
        let saved = self.save_current_project();
        if saved {
            debug!("Autosaved project {}", self.current_project_name);
        }
        saved
    }
}
