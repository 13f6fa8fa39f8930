/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! User preferences, read from a TOML file.
//!
//! Every key is optional; anything missing takes its default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::history::MAX_HISTORY_STEPS;
use crate::projects::DEFAULT_AUTOSAVE_QUIET_MS;

pub const PREFS_FILE_NAME: &str = "canvasshell.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasPreferences {
    /// Undo steps kept in each direction.
    pub history_limit: usize,
    pub autosave_quiet_ms: u64,
    /// Fold consecutive tab updates into one undo step.
    pub coalesce_tab_updates: bool,
    pub pinch_zoom_sensitivity: f64,
    pub wheel_zoom_sensitivity: f64,
    /// Additive zoom per pixel for wheel events forwarded by page content.
    pub forwarded_zoom_speed: f64,
    pub escape_panic_presses: usize,
    pub escape_panic_window_ms: u64,
    /// Overrides the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for CanvasPreferences {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY_STEPS,
            autosave_quiet_ms: DEFAULT_AUTOSAVE_QUIET_MS,
            coalesce_tab_updates: true,
            pinch_zoom_sensitivity: 0.01,
            wheel_zoom_sensitivity: 0.002,
            forwarded_zoom_speed: 0.005,
            escape_panic_presses: 4,
            escape_panic_window_ms: 1500,
            data_dir: None,
        }
    }
}

impl CanvasPreferences {
    /// `<config dir>/canvasshell/canvasshell.toml`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("canvasshell");
        path.push(PREFS_FILE_NAME);
        path
    }

    pub fn from_toml(contents: &str) -> Result<Self, PrefsError> {
        let prefs: CanvasPreferences =
            toml::from_str(contents).map_err(|e| PrefsError::Parse(format!("{e}")))?;
        prefs.validate()?;
        Ok(prefs)
    }

    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PrefsError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Load `path`, falling back to defaults when the file is missing or bad.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Ignoring preferences: {e}");
                Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<(), PrefsError> {
        if self.history_limit == 0 {
            return Err(PrefsError::invalid("history_limit", "must be > 0"));
        }
        if self.history_limit > MAX_HISTORY_STEPS {
            return Err(PrefsError::invalid(
                "history_limit",
                &format!("must be <= {MAX_HISTORY_STEPS}"),
            ));
        }
        for (field, value) in [
            ("pinch_zoom_sensitivity", self.pinch_zoom_sensitivity),
            ("wheel_zoom_sensitivity", self.wheel_zoom_sensitivity),
            ("forwarded_zoom_speed", self.forwarded_zoom_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PrefsError::invalid(field, "must be a positive number"));
            }
        }
        if self.escape_panic_presses < 2 {
            return Err(PrefsError::invalid("escape_panic_presses", "must be >= 2"));
        }
        Ok(())
    }

    pub fn autosave_quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }

    pub fn escape_panic_window(&self) -> Duration {
        Duration::from_millis(self.escape_panic_window_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrefsError {
    Io(String),
    Parse(String),
    InvalidValue { field: &'static str, reason: String },
}

impl PrefsError {
    fn invalid(field: &'static str, reason: &str) -> Self {
        PrefsError::InvalidValue {
            field,
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsError::Io(e) => write!(f, "Failed to read preferences: {e}"),
            PrefsError::Parse(e) => write!(f, "Failed to parse preferences: {e}"),
            PrefsError::InvalidValue { field, reason } => {
                write!(f, "Invalid preference {field}: {reason}")
            },
        }
    }
}

impl std::error::Error for PrefsError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_is_all_defaults() {
        assert_eq!(CanvasPreferences::from_toml("").unwrap(), CanvasPreferences::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let prefs = CanvasPreferences::from_toml(
            "history_limit = 10\ncoalesce_tab_updates = false\ndata_dir = \"/tmp/canvas\"\n",
        )
        .unwrap();
        assert_eq!(prefs.history_limit, 10);
        assert!(!prefs.coalesce_tab_updates);
        assert_eq!(prefs.data_dir, Some(PathBuf::from("/tmp/canvas")));
        assert_eq!(prefs.autosave_quiet_ms, DEFAULT_AUTOSAVE_QUIET_MS);
        assert_eq!(prefs.escape_panic_window(), Duration::from_millis(1500));
    }

    #[test]
    fn test_unknown_key_and_bad_values_rejected() {
        assert!(matches!(
            CanvasPreferences::from_toml("histroy_limit = 3"),
            Err(PrefsError::Parse(_))
        ));
        assert!(matches!(
            CanvasPreferences::from_toml("history_limit = 0"),
            Err(PrefsError::InvalidValue { field: "history_limit", .. })
        ));
        assert!(matches!(
            CanvasPreferences::from_toml("history_limit = 36"),
            Err(PrefsError::InvalidValue { field: "history_limit", .. })
        ));
        assert_eq!(
            CanvasPreferences::from_toml("history_limit = 35").map(|p| p.history_limit),
            Ok(MAX_HISTORY_STEPS)
        );
        assert!(matches!(
            CanvasPreferences::from_toml("wheel_zoom_sensitivity = -1.0"),
            Err(PrefsError::InvalidValue { field: "wheel_zoom_sensitivity", .. })
        ));
    }

    #[test]
    fn test_load_or_default_tolerates_missing_and_broken_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PREFS_FILE_NAME);
        assert_eq!(CanvasPreferences::load_or_default(&path), CanvasPreferences::default());

        std::fs::write(&path, "history_limit = [").unwrap();
        assert!(matches!(CanvasPreferences::load(&path), Err(PrefsError::Parse(_))));
        assert_eq!(CanvasPreferences::load_or_default(&path), CanvasPreferences::default());

        std::fs::write(&path, "escape_panic_presses = 6").unwrap();
        assert_eq!(CanvasPreferences::load_or_default(&path).escape_panic_presses, 6);
    }
}
