//! Error handling for the SpiceView application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application. External-tool failures carry the captured
//! exit status and stderr so the UI can report them instead of silently
//! discarding shell return codes.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for SpiceView operations
#[derive(Error, Debug)]
pub enum SpiceViewError {
    /// An external tool exited with a non-zero status
    #[error("{tool} failed{}: {stderr}", fmt_status(.status))]
    Toolchain {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// An external tool binary could not be launched
    #[error("{tool} not found at '{path}' (set the binary path in Settings)")]
    ToolNotFound { tool: String, path: String },

    /// An external tool exited successfully but did not produce its output file
    #[error("{tool} produced no output at {path:?}")]
    MissingOutput { tool: String, path: PathBuf },

    /// The simulator's rawfile is absent
    #[error("waveform file {0:?} is missing (did the simulation run?)")]
    RawfileMissing(PathBuf),

    /// The rawfile exists but is not a valid SPICE rawfile
    #[error("malformed rawfile: {0}")]
    RawfileFormat(String),

    /// A selected signal name is not present in the loaded waveform
    #[error("signal '{0}' not found in the loaded waveform")]
    SignalNotFound(String),

    /// Errors related to settings loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The user cancelled an in-flight simulation
    #[error("operation cancelled")]
    Cancelled,
}

fn fmt_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" with exit status {}", code),
        None => String::new(),
    }
}

/// Result type alias for SpiceView operations
pub type Result<T> = std::result::Result<T, SpiceViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_error_display() {
        let err = SpiceViewError::Toolchain {
            tool: "ngspice".to_string(),
            status: Some(1),
            stderr: "no convergence".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ngspice failed with exit status 1: no convergence"
        );
    }

    #[test]
    fn test_toolchain_error_display_without_status() {
        let err = SpiceViewError::Toolchain {
            tool: "kicad-cli".to_string(),
            status: None,
            stderr: "killed".to_string(),
        };
        assert_eq!(err.to_string(), "kicad-cli failed: killed");
    }

    #[test]
    fn test_signal_not_found_display() {
        let err = SpiceViewError::SignalNotFound("v(out)".to_string());
        assert!(err.to_string().contains("v(out)"));
    }
}
