//! Settings dialog for the external tool paths
//!
//! A centered modal form over the persisted settings: one path input plus
//! Browse button per tool, Save persists immediately, Cancel discards.

use crate::config::ToolSettings;
use egui::{Align2, Context, Ui};

/// Editable copy of the tool paths while the dialog is open
#[derive(Debug, Clone, Default)]
pub struct ToolPathsState {
    pub exporter_path: String,
    pub simulator_path: String,
}

impl ToolPathsState {
    pub fn from_settings(tools: &ToolSettings) -> Self {
        Self {
            exporter_path: tools.exporter_path.clone(),
            simulator_path: tools.simulator_path.clone(),
        }
    }
}

/// Actions produced by the settings dialog
#[derive(Debug, Clone)]
pub enum ToolPathsAction {
    /// Persist the edited paths
    Save(ToolPathsState),
}

/// Show the settings dialog; returns an action when the user commits
pub fn show_tool_paths_dialog(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut ToolPathsState,
) -> Option<ToolPathsAction> {
    if !*is_open {
        return None;
    }

    let mut action = None;
    let mut should_close = false;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(false)
        .default_width(460.0)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Grid::new("tool_paths_grid")
                .num_columns(3)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    path_input_row(
                        ui,
                        "KiCad-cli binary:",
                        "Path to the kicad-cli binary",
                        &mut state.exporter_path,
                    );
                    path_input_row(
                        ui,
                        "Ngspice binary:",
                        "Path to the ngspice binary",
                        &mut state.simulator_path,
                    );
                });

            ui.add_space(8.0);
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    action = Some(ToolPathsAction::Save(state.clone()));
                    should_close = true;
                }
                if ui.button("Cancel").clicked() {
                    should_close = true;
                }
            });
        });

    if should_close {
        *is_open = false;
    }

    action
}

fn path_input_row(ui: &mut Ui, label: &str, tooltip: &str, path: &mut String) {
    ui.label(label);
    ui.add(egui::TextEdit::singleline(path).desired_width(260.0))
        .on_hover_text(tooltip);
    if ui.button("Browse...").clicked() {
        if let Some(picked) = rfd::FileDialog::new().set_title("Select Binary").pick_file() {
            *path = picked.display().to_string();
        }
    }
    ui.end_row();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mirrors_settings() {
        let tools = ToolSettings {
            exporter_path: "/opt/kicad-cli".to_string(),
            simulator_path: "/opt/ngspice".to_string(),
        };
        let state = ToolPathsState::from_settings(&tools);
        assert_eq!(state.exporter_path, tools.exporter_path);
        assert_eq!(state.simulator_path, tools.simulator_path);
    }
}
