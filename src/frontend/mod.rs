//! Frontend module for the egui UI
//!
//! The main window composes the signal catalog (left panel), the waveform
//! plot (central panel), a menu bar and a status bar. UI code emits
//! [`AppAction`] values instead of mutating state in place; all mutation
//! funnels through [`SpiceViewApp::handle_action`].
//!
//! Background simulation jobs are polled non-blockingly each frame; their
//! completion repopulates the catalog and clears the plot. Failures land in
//! a dismissible error line in the status bar.

pub mod dialogs;
pub mod plot;
pub mod signal_list;

pub use plot::{collect_series, PlotView, ResolvedSelection, TraceSeries};
pub use signal_list::SignalCatalog;

use crate::backend::{JobKind, JobOutput, SimEvent, SimJob, SimStage};
use crate::config::{AppSettings, SCHEMATIC_EXTENSION};
use crate::error::SpiceViewError;
use crate::types::{Session, TraceEntry};
use dialogs::{show_tool_paths_dialog, ToolPathsAction, ToolPathsState};
use std::path::PathBuf;
use std::time::Duration;

/// Actions the UI can emit
///
/// Panes and menus return these instead of mutating state directly, which
/// keeps the interaction logic in one place and testable.
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Replace the current schematic, clearing selection and waveform
    OpenSchematic(PathBuf),
    /// Export + simulate + reload the waveform in the background
    Resimulate,
    /// Export only, then open the netlist in the OS default viewer
    ShowNetlist,
    /// Cancel the in-flight background job
    CancelSimulation,
    /// Append signals to the plot selection
    AddTraces(Vec<TraceEntry>),
    /// Reset the selection to a single signal (double-click)
    ReselectTrace(TraceEntry),
    /// Empty the plot selection
    ClearSelection,
    /// Open the tool-paths settings dialog
    OpenSettings,
    /// Persist edited tool paths
    ApplyToolPaths(ToolPathsState),
    /// Close the window
    Exit,
}

/// Main application state
pub struct SpiceViewApp {
    settings: AppSettings,
    session: Session,
    catalog: SignalCatalog,

    /// Scratch directory for netlists and rawfiles, removed on drop
    work_dir: tempfile::TempDir,

    /// At most one background job is in flight
    job: Option<SimJob>,
    sim_stage: Option<SimStage>,

    /// Wall-clock time of the last successful simulation
    last_sim: Option<chrono::DateTime<chrono::Local>>,
    /// Transient informational message for the status bar
    status: Option<String>,
    /// Dismissible error line
    last_error: Option<String>,

    tool_paths_open: bool,
    tool_paths_state: ToolPathsState,
}

impl SpiceViewApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        schematic: Option<PathBuf>,
        work_dir: tempfile::TempDir,
    ) -> Self {
        let mut session = Session::default();
        if let Some(path) = schematic {
            session.open_schematic(path);
        }

        let app = Self {
            settings,
            session,
            catalog: SignalCatalog::default(),
            work_dir,
            job: None,
            sim_stage: None,
            last_sim: None,
            status: None,
            last_error: None,
            tool_paths_open: false,
            tool_paths_state: ToolPathsState::default(),
        };
        cc.egui_ctx
            .send_viewport_cmd(egui::ViewportCommand::Title(app.window_title()));
        app
    }

    fn window_title(&self) -> String {
        let file = self
            .session
            .schematic_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no schematic".to_string());
        format!("SpiceView {} - {}", env!("CARGO_PKG_VERSION"), file)
    }

    /// Spawn a background job unless one is already running
    fn spawn_job(&mut self, kind: JobKind) {
        if self.job.is_some() {
            return;
        }
        let Some(schematic) = self.session.schematic_path.clone() else {
            self.last_error = Some("Open a schematic first".to_string());
            return;
        };

        self.last_error = None;
        self.status = None;
        self.job = Some(SimJob::spawn(
            kind,
            self.settings.tools.clone(),
            self.work_dir.path().to_path_buf(),
            schematic,
        ));
        self.sim_stage = Some(SimStage::Exporting);
    }

    /// Drain events from the background job
    fn poll_job(&mut self) {
        let Some(job) = &self.job else { return };

        let mut finished = None;
        while let Some(event) = job.try_event() {
            match event {
                SimEvent::Stage(stage) => self.sim_stage = Some(stage),
                SimEvent::Finished(result) => {
                    finished = Some(result);
                    break;
                }
            }
        }

        let Some(result) = finished else { return };
        self.job = None;
        self.sim_stage = None;

        match result {
            Ok(JobOutput::Waveform(waveform)) => {
                self.session.install_waveform(*waveform);
                if let Some(wf) = &self.session.waveform {
                    self.catalog.populate(wf);
                }
                self.last_sim = Some(chrono::Local::now());
                self.status = None;
            }
            Ok(JobOutput::Netlist(path)) => {
                self.status = Some(format!("Netlist opened: {}", path.display()));
            }
            Err(SpiceViewError::Cancelled) => {
                self.status = Some("Simulation cancelled".to_string());
            }
            Err(e) => {
                tracing::error!("background job failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn handle_action(&mut self, action: AppAction, ctx: &egui::Context) {
        match action {
            AppAction::OpenSchematic(path) => {
                tracing::info!("opening schematic {:?}", path);
                self.session.open_schematic(path);
                self.catalog.clear();
                self.last_error = None;
                self.status = None;
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
            }
            AppAction::Resimulate => self.spawn_job(JobKind::Resimulate),
            AppAction::ShowNetlist => self.spawn_job(JobKind::ShowNetlist),
            AppAction::CancelSimulation => {
                if let Some(job) = &self.job {
                    job.cancel();
                }
            }
            AppAction::AddTraces(entries) => {
                let allow = self.settings.ui.allow_duplicate_traces;
                for entry in entries {
                    self.session.add_trace(entry, allow);
                }
            }
            AppAction::ReselectTrace(entry) => self.session.reselect(entry),
            AppAction::ClearSelection => self.session.selection.clear(),
            AppAction::OpenSettings => {
                self.tool_paths_state = ToolPathsState::from_settings(&self.settings.tools);
                self.tool_paths_open = true;
            }
            AppAction::ApplyToolPaths(state) => {
                self.settings.tools.exporter_path = state.exporter_path;
                self.settings.tools.simulator_path = state.simulator_path;
                if let Err(e) = self.settings.save() {
                    self.last_error = Some(e.to_string());
                }
            }
            AppAction::Exit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let job_running = self.job.is_some();
        let has_schematic = self.session.schematic_path.is_some();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Open Schematic")
                            .add_filter("KiCad schematic", &[SCHEMATIC_EXTENSION])
                            .pick_file()
                        {
                            actions.push(AppAction::OpenSchematic(path));
                        }
                        ui.close();
                    }
                    if ui.button("Settings...").clicked() {
                        actions.push(AppAction::OpenSettings);
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        actions.push(AppAction::Exit);
                        ui.close();
                    }
                });

                ui.menu_button("Simulation", |ui| {
                    let can_run = has_schematic && !job_running;
                    if ui
                        .add_enabled(can_run, egui::Button::new("Resimulate"))
                        .clicked()
                    {
                        actions.push(AppAction::Resimulate);
                        ui.close();
                    }
                    if ui
                        .add_enabled(can_run, egui::Button::new("Show Netlist"))
                        .clicked()
                    {
                        actions.push(AppAction::ShowNetlist);
                        ui.close();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(job_running, egui::Button::new("Cancel"))
                        .clicked()
                    {
                        actions.push(AppAction::CancelSimulation);
                        ui.close();
                    }
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(stage) = self.sim_stage {
                        ui.spinner();
                        ui.label(stage.to_string());
                    }
                });
            });
        });

        actions
    }

    fn status_bar(&mut self, ctx: &egui::Context, resolved: Option<&ResolvedSelection>) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(error) = self.last_error.clone() {
                    if ui.button("x").on_hover_text("Dismiss").clicked() {
                        self.last_error = None;
                    }
                    ui.colored_label(egui::Color32::from_rgb(255, 100, 100), error);
                    return;
                }

                if let Some(resolved) = resolved {
                    if !resolved.unresolved.is_empty() {
                        let missing = resolved
                            .unresolved
                            .iter()
                            .map(|name| SpiceViewError::SignalNotFound(name.clone()).to_string())
                            .collect::<Vec<_>>()
                            .join("; ");
                        ui.colored_label(egui::Color32::from_rgb(255, 200, 80), missing);
                        return;
                    }
                }

                if let Some(status) = &self.status {
                    ui.label(status.clone());
                } else if let Some(wf) = &self.session.waveform {
                    let when = self
                        .last_sim
                        .map(|t| t.format(" at %H:%M:%S").to_string())
                        .unwrap_or_default();
                    ui.label(format!(
                        "{}: {} signals, {} points{}",
                        wf.plot_name,
                        wf.traces.len(),
                        wf.points(),
                        when
                    ));
                } else {
                    ui.weak("Ready");
                }
            });
        });
    }
}

impl eframe::App for SpiceViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job();
        if self.job.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Resolve the selection once per frame; panels share the result
        let resolved = self
            .session
            .waveform
            .as_ref()
            .map(|wf| collect_series(wf, &self.session.selection));

        let mut actions = self.menu_bar(ctx);

        self.status_bar(ctx, resolved.as_ref());

        egui::SidePanel::left("signal_list")
            .default_width(240.0)
            .show(ctx, |ui| {
                actions.extend(self.catalog.show(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let plot = PlotView::from_config(&self.settings.ui);
            let scale_name = self
                .session
                .waveform
                .as_ref()
                .map(|wf| wf.scale_name.as_str())
                .unwrap_or("time");
            let series = resolved.as_ref().map(|r| r.series.as_slice()).unwrap_or(&[]);
            plot.show(ui, scale_name, series);
        });

        if let Some(ToolPathsAction::Save(state)) =
            show_tool_paths_dialog(ctx, &mut self.tool_paths_open, &mut self.tool_paths_state)
        {
            actions.push(AppAction::ApplyToolPaths(state));
        }

        for action in actions {
            self.handle_action(action, ctx);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(job) = &self.job {
            job.cancel();
        }
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }
}
