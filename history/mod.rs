/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bounded undo/redo over window manager snapshots.
//!
//! The manager keeps `past`, `present` and `future`. Recordable actions push
//! the old present onto `past` and clear `future`; every other action only
//! refreshes `present`, so undo always lands on the latest unrecorded view of
//! a step. Live drag and resize updates refresh `present` too, but
//! only the matching `MoveWindowEnd`/`ResizeWindowEnd` pushes the state
//! from before the gesture. Any other action, or a gesture that ends without
//! a commit, drops that baseline.
//! Applying an undo/redo snapshot back into the window manager must
//! happen inside [`HistoryManager::begin_restore`] /
//! [`HistoryManager::end_restore`] so the resulting dispatch is not itself
//! recorded.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::manager::{ActionKind, WorkspaceSnapshot};
use crate::persistence::types::{SnapshotError, validate_snapshot};

/// Depth of both the undo and the redo stack.
pub const MAX_HISTORY_STEPS: usize = 35;

/// Persisted form of the history stacks. `past` is oldest first, `future`
/// is next-redo first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default)]
    pub past: Vec<WorkspaceSnapshot>,
    pub present: WorkspaceSnapshot,
    #[serde(default)]
    pub future: Vec<WorkspaceSnapshot>,
}

/// How [`HistoryManager::record`] handled a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new undo step.
    Pushed,
    /// Folded into the present step.
    Replaced,
    /// Dropped because a snapshot is being restored.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    past: Vec<WorkspaceSnapshot>,
    present: WorkspaceSnapshot,
    future: Vec<WorkspaceSnapshot>,
    limit: usize,
    coalesce_tab_updates: bool,
    /// Set while the present step was produced by a recorded tab update, so
    /// the next tab update can be folded into it.
    tab_update_open: bool,
    /// Present as it was before the first live update of a gesture; the
    /// committing action pushes this instead of the in-gesture present.
    gesture_base: Option<WorkspaceSnapshot>,
    restoring: bool,
}

impl HistoryManager {
    pub fn new(present: WorkspaceSnapshot) -> Self {
        Self::with_limit(present, MAX_HISTORY_STEPS, true)
    }

    pub fn with_limit(present: WorkspaceSnapshot, limit: usize, coalesce_tab_updates: bool) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
            limit: limit.clamp(1, MAX_HISTORY_STEPS),
            coalesce_tab_updates,
            tab_update_open: false,
            gesture_base: None,
            restoring: false,
        }
    }

    pub fn present(&self) -> &WorkspaceSnapshot {
        &self.present
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// True between the first live move/resize and its committing action.
    pub fn gesture_pending(&self) -> bool {
        self.gesture_base.is_some()
    }

    /// Drop the pre-gesture baseline of a gesture that ended without a
    /// commit, e.g. a drag released where it started.
    pub fn cancel_gesture(&mut self) {
        self.gesture_base = None;
    }

    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    fn trim_past(&mut self) {
        if self.past.len() > self.limit {
            let excess = self.past.len() - self.limit;
            self.past.drain(0..excess);
        }
    }

    /// Record the state that follows an action of `snapshot.action_type`.
    pub fn record(&mut self, snapshot: WorkspaceSnapshot) -> RecordOutcome {
        if self.restoring {
            return RecordOutcome::Ignored;
        }
        let kind = snapshot.action_type;
        if kind.is_live_update() {
            if self.gesture_base.is_none() {
                self.gesture_base = Some(self.present.clone());
            }
        } else if !kind.is_gesture_commit() {
            // Anything between a live update and its commit starts a new
            // baseline at the next live update.
            self.gesture_base = None;
        }
        if !kind.is_recordable() {
            self.present = snapshot;
            return RecordOutcome::Replaced;
        }

        let is_tab_update = kind == ActionKind::UpdateTab;
        if is_tab_update && self.coalesce_tab_updates && self.tab_update_open {
            self.present = snapshot;
            self.future.clear();
            return RecordOutcome::Replaced;
        }

        let replaced = std::mem::replace(&mut self.present, snapshot);
        let previous = match self.gesture_base.take() {
            Some(base) if kind.is_gesture_commit() => base,
            _ => replaced,
        };
        self.past.push(previous);
        self.trim_past();
        self.future.clear();
        self.tab_update_open = is_tab_update;
        RecordOutcome::Pushed
    }

    /// Step back. Returns the snapshot to apply, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<WorkspaceSnapshot> {
        let previous = self.past.pop()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.insert(0, current);
        self.future.truncate(self.limit);
        self.tab_update_open = false;
        self.gesture_base = None;
        Some(self.present.clone())
    }

    /// Step forward. Returns the snapshot to apply, or `None` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Option<WorkspaceSnapshot> {
        if self.future.is_empty() {
            return None;
        }
        let next = self.future.remove(0);
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        self.trim_past();
        self.tab_update_open = false;
        self.gesture_base = None;
        Some(self.present.clone())
    }

    /// Forget both stacks and start over from `present`.
    pub fn reset(&mut self, present: WorkspaceSnapshot) {
        self.past.clear();
        self.future.clear();
        self.present = present;
        self.tab_update_open = false;
        self.gesture_base = None;
    }

    pub fn to_record(&self) -> HistoryRecord {
        let skip = self.past.len().saturating_sub(self.limit);
        HistoryRecord {
            past: self.past[skip..].to_vec(),
            present: self.present.clone(),
            future: self.future.iter().take(self.limit).cloned().collect(),
        }
    }

    /// Rebuild from a persisted record. An invalid present rejects the whole
    /// record; invalid past or future entries are dropped.
    pub fn from_record(
        record: HistoryRecord,
        limit: usize,
        coalesce_tab_updates: bool,
    ) -> Result<Self, SnapshotError> {
        validate_snapshot(&record.present)?;
        let mut history = Self::with_limit(record.present, limit, coalesce_tab_updates);

        let keep_valid = |entries: Vec<WorkspaceSnapshot>, stack: &str| -> Vec<WorkspaceSnapshot> {
            entries
                .into_iter()
                .filter(|entry| match validate_snapshot(entry) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Dropping invalid {stack} history entry: {e}");
                        false
                    },
                })
                .collect()
        };

        let mut past = keep_valid(record.past, "undo");
        let skip = past.len().saturating_sub(history.limit);
        past.drain(0..skip);
        let mut future = keep_valid(record.future, "redo");
        future.truncate(history.limit);

        history.past = past;
        history.future = future;
        Ok(history)
    }
}
