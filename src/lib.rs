//! # SpiceView: KiCad/ngspice Waveform Viewer
//!
//! A desktop viewer for circuit simulation waveforms. SpiceView drives two
//! external tools (`kicad-cli` to export a schematic to a SPICE netlist,
//! `ngspice -b` to simulate it), then reads the resulting rawfile and
//! plots selected signals with eframe/egui and egui_plot.
//!
//! ## Architecture
//!
//! - **Backend**: external tool invocation and rawfile parsing, run as
//!   one-shot background jobs on worker threads
//! - **Frontend**: eframe/egui UI with a signal list, a waveform plot and a
//!   tool-paths settings dialog
//! - **Communication**: crossbeam channels for job events, an `AtomicBool`
//!   token for cancellation
//!
//! ## Configuration
//!
//! Tool paths and plot preferences are stored in the platform-appropriate
//! data directory under `spiceview`:
//!
//! - **Linux**: `~/.local/share/spiceview/settings.json`
//! - **macOS**: `~/Library/Application Support/spiceview/settings.json`
//! - **Windows**: `%APPDATA%\spiceview\settings.json`
//!
//! ## Example
//!
//! ```ignore
//! use spiceview::{config::AppSettings, frontend::SpiceViewApp};
//!
//! fn main() -> eframe::Result<()> {
//!     let settings = AppSettings::load_or_default();
//!     let work_dir = tempfile::tempdir().expect("Failed to create work directory");
//!
//!     eframe::run_native(
//!         "SpiceView",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(SpiceViewApp::new(cc, settings, None, work_dir)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod types;

// Re-export commonly used types
pub use backend::{read_rawfile, JobKind, SimEvent, SimJob, Toolchain};
pub use config::{AppSettings, ToolSettings, UiConfig};
pub use error::{Result, SpiceViewError};
pub use frontend::SpiceViewApp;
pub use types::{Session, Trace, TraceEntry, TraceOrigin, Waveform};
