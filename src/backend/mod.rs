//! Backend module for external tools and waveform loading
//!
//! Everything that leaves the process lives here:
//!
//! - [`toolchain`] - exporter/simulator invocation with captured exit
//!   status and stderr
//! - [`rawfile`] - SPICE rawfile reader
//! - [`worker`] - background jobs running the export → simulate → read
//!   pipeline off the UI thread

pub mod rawfile;
pub mod toolchain;
pub mod worker;

pub use rawfile::read_rawfile;
pub use toolchain::{Toolchain, NETLIST_FILE_NAME, RAW_FILE_NAME};
pub use worker::{JobKind, JobOutput, SimEvent, SimJob, SimStage};
