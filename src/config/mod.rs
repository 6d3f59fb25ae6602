//! Configuration module for SpiceView
//!
//! This module handles application configuration:
//! - Tool paths for the external schematic exporter and circuit simulator
//! - UI preferences for the waveform plot
//! - Persistence to a JSON settings file in the platform data directory
//!
//! # App Data Location
//!
//! Settings are stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/spiceview/settings.json`
//! - **macOS**: `~/Library/Application Support/spiceview/settings.json`
//! - **Windows**: `%APPDATA%\spiceview\settings.json`
//!
//! # Example
//!
//! ```ignore
//! use spiceview::config::AppSettings;
//!
//! let mut settings = AppSettings::load_or_default();
//! settings.tools.simulator_path = "/opt/ngspice/bin/ngspice".to_string();
//! settings.save()?;
//! ```

use crate::error::{Result, SpiceViewError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "spiceview";

/// Settings filename
pub const SETTINGS_FILE: &str = "settings.json";

/// Schematic file extension accepted by the open dialog
pub const SCHEMATIC_EXTENSION: &str = "kicad_sch";

/// Command name of the schematic exporter when not configured
pub const DEFAULT_EXPORTER: &str = "kicad-cli";

/// Command name of the circuit simulator when not configured
pub const DEFAULT_SIMULATOR: &str = "ngspice";

/// Exporter location inside the macOS application bundle
const BUNDLED_EXPORTER: &str = "/Applications/KiCad/KiCad.app/Contents/MacOS/kicad-cli";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        SpiceViewError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            SpiceViewError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the settings file
pub fn settings_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(SETTINGS_FILE))
}

// ==================== Default Path Probe ====================

/// Candidate path of a platform-bundled exporter, if the platform has one
fn bundled_exporter() -> Option<&'static Path> {
    if cfg!(target_os = "macos") {
        Some(Path::new(BUNDLED_EXPORTER))
    } else {
        None
    }
}

/// Resolve the default exporter: the bundled path when it exists on disk,
/// else the bare command name assumed to be on the search path.
fn probe_exporter(bundled: Option<&Path>) -> String {
    match bundled {
        Some(path) if path.is_file() => path.display().to_string(),
        _ => DEFAULT_EXPORTER.to_string(),
    }
}

/// Default exporter path for this machine
pub fn default_exporter_path() -> String {
    probe_exporter(bundled_exporter())
}

// ==================== Tool Settings ====================

/// Paths of the external tool binaries
///
/// No validation that the paths are executable happens here; a bad path
/// surfaces as a `ToolNotFound` error when the tool is invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Schematic-to-netlist exporter binary (kicad-cli)
    #[serde(default = "default_exporter_path")]
    pub exporter_path: String,

    /// Circuit simulator binary (ngspice)
    #[serde(default = "default_simulator_path")]
    pub simulator_path: String,
}

fn default_simulator_path() -> String {
    DEFAULT_SIMULATOR.to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            exporter_path: default_exporter_path(),
            simulator_path: default_simulator_path(),
        }
    }
}

// ==================== UI Config ====================

/// UI configuration for the waveform plot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show grid on the plot
    #[serde(default = "default_true")]
    pub show_grid: bool,

    /// Show legend on the plot
    #[serde(default = "default_true")]
    pub show_legend: bool,

    /// Plot line width in pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    /// Whether adding a signal that is already plotted appends another
    /// series (the historical behavior) or is ignored
    #[serde(default = "default_true")]
    pub allow_duplicate_traces: bool,
}

fn default_true() -> bool {
    true
}

fn default_line_width() -> f32 {
    1.5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_legend: true,
            line_width: 1.5,
            allow_duplicate_traces: true,
        }
    }
}

// ==================== App Settings ====================

/// Persistent application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Version for future migration support
    #[serde(default = "default_settings_version")]
    pub version: u32,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolSettings,

    /// Plot preferences
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_settings_version() -> u32 {
    1
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            tools: ToolSettings::default(),
            ui: UiConfig::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SpiceViewError::Config(format!("Failed to read settings: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| SpiceViewError::Config(format!("Failed to parse settings: {}", e)))
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        let path = settings_path().ok_or_else(|| {
            SpiceViewError::Config("Could not determine settings path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load settings, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save settings to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SpiceViewError::Config(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SpiceViewError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SpiceViewError::Config(format!("Failed to write settings: {}", e)))
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(SETTINGS_FILE))
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_returns_bundled_path_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = dir.path().join("kicad-cli");
        std::fs::write(&bundled, b"#!/bin/sh\n").unwrap();

        assert_eq!(
            probe_exporter(Some(&bundled)),
            bundled.display().to_string()
        );
    }

    #[test]
    fn test_probe_falls_back_to_command_name() {
        let missing = Path::new("/definitely/not/here/kicad-cli");
        assert_eq!(probe_exporter(Some(missing)), DEFAULT_EXPORTER);
        assert_eq!(probe_exporter(None), DEFAULT_EXPORTER);
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = AppSettings::default();
        settings.tools.exporter_path = "/opt/kicad/bin/kicad-cli".to_string();
        settings.tools.simulator_path = "/opt/ngspice/bin/ngspice".to_string();
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.tools, settings.tools);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppSettings::load_from(dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded.tools.simulator_path, DEFAULT_SIMULATOR);
    }

    #[test]
    fn test_partial_settings_fill_in_defaults() {
        let loaded: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(loaded.version, 1);
        assert!(loaded.ui.show_legend);
        assert!(loaded.ui.allow_duplicate_traces);
    }

    #[test]
    fn test_corrupt_settings_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = AppSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, SpiceViewError::Config(_)));
    }
}
