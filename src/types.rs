//! Core data model for SpiceView
//!
//! The unit of data is a [`Waveform`]: the shared scale axis (time for
//! transient runs, frequency for AC sweeps) plus one [`Trace`] per probed
//! signal, all sample-aligned. A waveform is replaced wholesale on each
//! simulation run and owned by the main window for the lifetime of that run.
//!
//! The plot selection is an ordered list of [`TraceEntry`] values. Each
//! entry carries a [`TraceOrigin`] distinguishing names taken from the
//! loaded waveform from free-text manual entries, which are only resolved
//! at plot time.

use std::path::PathBuf;

// ==================== Waveform ====================

/// A single named sample sequence within a waveform
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Signal name as written by the simulator (e.g. `v(out)`)
    pub name: String,
    /// Samples aligned to the waveform's scale axis
    pub values: Vec<f64>,
}

/// Parsed simulation output: a scale axis plus aligned traces
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waveform {
    /// Plot name from the rawfile header (e.g. "Transient Analysis")
    pub plot_name: String,
    /// Name of the scale variable (usually "time", "frequency" for AC)
    pub scale_name: String,
    /// The shared X axis
    pub scale: Vec<f64>,
    /// Signal traces in file order, excluding the scale variable
    pub traces: Vec<Trace>,
}

impl Waveform {
    /// Number of sample points per trace
    pub fn points(&self) -> usize {
        self.scale.len()
    }

    /// Signal names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traces.iter().map(|t| t.name.as_str())
    }

    /// Look up a trace by name
    ///
    /// Simulators lowercase signal names, so an exact match is tried first
    /// and an ASCII-case-insensitive match second. Manual entries typed as
    /// `VOUT` therefore still resolve against a stored `vout`.
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.traces.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }
}

// ==================== Selection ====================

/// Where a selected name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOrigin {
    /// Picked from the loaded waveform's signal list
    Waveform,
    /// Typed by hand; may not exist until resolved at plot time
    Manual,
}

/// One entry of the plot selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub name: String,
    pub origin: TraceOrigin,
}

impl TraceEntry {
    /// Entry for a name taken from the waveform's signal list
    pub fn listed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: TraceOrigin::Waveform,
        }
    }

    /// Entry for a free-text manual name
    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: TraceOrigin::Manual,
        }
    }
}

// ==================== Session ====================

/// Per-window state: the open schematic, the current waveform and the
/// plot selection. Destroyed on window close.
#[derive(Debug, Default)]
pub struct Session {
    /// Path of the currently open schematic file
    pub schematic_path: Option<PathBuf>,
    /// Ordered list of plotted signal names
    pub selection: Vec<TraceEntry>,
    /// Result of the most recent simulation run
    pub waveform: Option<Waveform>,
}

impl Session {
    /// Open a new schematic: replaces the path and clears all results
    pub fn open_schematic(&mut self, path: PathBuf) {
        self.schematic_path = Some(path);
        self.selection.clear();
        self.waveform = None;
    }

    /// Install a freshly simulated waveform, clearing the stale selection
    pub fn install_waveform(&mut self, waveform: Waveform) {
        self.selection.clear();
        self.waveform = Some(waveform);
    }

    /// Append an entry to the selection
    ///
    /// When `allow_duplicates` is false, an entry whose name is already
    /// selected is ignored. Returns whether the entry was appended.
    pub fn add_trace(&mut self, entry: TraceEntry, allow_duplicates: bool) -> bool {
        if !allow_duplicates && self.selection.iter().any(|e| e.name == entry.name) {
            return false;
        }
        self.selection.push(entry);
        true
    }

    /// Reset the selection to a single entry (double-click behavior)
    pub fn reselect(&mut self, entry: TraceEntry) {
        self.selection.clear();
        self.selection.push(entry);
    }
}
