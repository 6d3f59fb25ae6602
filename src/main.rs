//! SpiceView - Main Entry Point
//!
//! Desktop viewer for ngspice simulation waveforms driven from KiCad
//! schematics.

use clap::Parser;
use spiceview::{config::AppSettings, frontend::SpiceViewApp};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "spiceview", version, about = "Waveform viewer for KiCad schematics simulated with ngspice")]
struct Cli {
    /// Path to a *.kicad_sch file
    schematic: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,spiceview=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting SpiceView {}", env!("CARGO_PKG_VERSION"));

    let settings = AppSettings::load_or_default();

    // Netlists and rawfiles live in a per-session scratch directory so
    // concurrent instances cannot clobber each other's output.
    let work_dir = tempfile::tempdir().expect("Failed to create work directory");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 640.0])
            .with_min_inner_size([800.0, 480.0])
            .with_title("SpiceView"),
        ..Default::default()
    };

    eframe::run_native(
        "SpiceView",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(SpiceViewApp::new(
                cc,
                settings,
                cli.schematic,
                work_dir,
            )))
        }),
    )
}
