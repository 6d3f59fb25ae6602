//! Signal catalog pane
//!
//! The left-hand list of signal names available for plotting. Populated
//! from the loaded waveform after each simulation run, emptied on file open
//! or clear. Supports double-click-to-plot, ctrl-click multi-select with a
//! context-menu "Add to Plot", and a free-text row for adding names by hand
//! (which may reference signals that do not exist; those surface as a
//! warning at plot time).

use crate::frontend::AppAction;
use crate::types::{TraceEntry, TraceOrigin, Waveform};
use std::collections::HashSet;

/// One row of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub origin: TraceOrigin,
}

/// Catalog state: Empty until a waveform loads, Populated afterwards
#[derive(Debug, Default)]
pub struct SignalCatalog {
    entries: Vec<CatalogEntry>,
    selected: HashSet<usize>,
    manual_input: String,
}

impl SignalCatalog {
    /// Repopulate from a waveform, dropping manual entries and selection
    pub fn populate(&mut self, waveform: &Waveform) {
        self.entries = waveform
            .names()
            .map(|name| CatalogEntry {
                name: name.to_string(),
                origin: TraceOrigin::Waveform,
            })
            .collect();
        self.selected.clear();
    }

    /// Back to the Empty state
    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected.clear();
    }

    /// Append a free-text name
    pub fn add_manual(&mut self, name: impl Into<String>) {
        self.entries.push(CatalogEntry {
            name: name.into(),
            origin: TraceOrigin::Manual,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Currently multi-selected entries in list order
    fn selected_entries(&self) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| self.selected.contains(i))
            .map(|(_, e)| e)
            .collect()
    }

    fn trace_entry(entry: &CatalogEntry) -> TraceEntry {
        TraceEntry {
            name: entry.name.clone(),
            origin: entry.origin,
        }
    }

    /// Render the list; interactions are returned as actions
    pub fn show(&mut self, ui: &mut egui::Ui) -> Vec<AppAction> {
        let mut actions = Vec::new();

        ui.heading("Signals");
        ui.separator();

        if self.entries.is_empty() {
            ui.weak("No signals loaded. Open a schematic and resimulate.");
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for index in 0..self.entries.len() {
                    let entry = self.entries[index].clone();
                    let is_selected = self.selected.contains(&index);

                    let label = match entry.origin {
                        TraceOrigin::Waveform => entry.name.clone(),
                        TraceOrigin::Manual => format!("{} (manual)", entry.name),
                    };

                    let response = ui.selectable_label(is_selected, label);

                    if response.double_clicked() {
                        // Double-click resets the plot to this one signal
                        actions.push(AppAction::ReselectTrace(Self::trace_entry(&entry)));
                    } else if response.clicked() {
                        let multi = ui.input(|i| i.modifiers.command || i.modifiers.ctrl);
                        if !multi {
                            self.selected.clear();
                        }
                        if is_selected && multi {
                            self.selected.remove(&index);
                        } else {
                            self.selected.insert(index);
                        }
                    }

                    response.context_menu(|ui| {
                        if ui.button("Add to Plot").clicked() {
                            let mut picked = self.selected_entries();
                            if !self.selected.contains(&index) {
                                picked = vec![&self.entries[index]];
                            }
                            actions.push(AppAction::AddTraces(
                                picked.into_iter().map(Self::trace_entry).collect(),
                            ));
                            ui.close();
                        }
                        if ui.button("Clear Plot").clicked() {
                            actions.push(AppAction::ClearSelection);
                            ui.close();
                        }
                    });
                }
            });

        ui.separator();

        // Manual entry row for names not present in the list
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.manual_input).hint_text("signal name"),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Add").clicked() || submitted) && !self.manual_input.trim().is_empty() {
                self.add_manual(self.manual_input.trim().to_string());
                self.manual_input.clear();
            }
        });

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trace;

    fn waveform() -> Waveform {
        Waveform {
            plot_name: String::new(),
            scale_name: "time".to_string(),
            scale: vec![0.0],
            traces: vec![
                Trace {
                    name: "v(out)".to_string(),
                    values: vec![0.0],
                },
                Trace {
                    name: "v(in)".to_string(),
                    values: vec![0.0],
                },
            ],
        }
    }

    #[test]
    fn test_populate_lists_signals_in_file_order() {
        let mut catalog = SignalCatalog::default();
        catalog.populate(&waveform());

        let names: Vec<_> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["v(out)", "v(in)"]);
        assert!(catalog
            .entries()
            .iter()
            .all(|e| e.origin == TraceOrigin::Waveform));
    }

    #[test]
    fn test_populate_drops_manual_entries() {
        let mut catalog = SignalCatalog::default();
        catalog.add_manual("v(fantasy)");
        catalog.populate(&waveform());

        assert_eq!(catalog.entries().len(), 2);
    }

    #[test]
    fn test_clear_empties_catalog() {
        let mut catalog = SignalCatalog::default();
        catalog.populate(&waveform());
        catalog.clear();

        assert!(catalog.is_empty());
    }

    #[test]
    fn test_manual_entries_are_tagged() {
        let mut catalog = SignalCatalog::default();
        catalog.populate(&waveform());
        catalog.add_manual("i(v1)");

        let last = catalog.entries().last().unwrap();
        assert_eq!(last.origin, TraceOrigin::Manual);
        assert_eq!(last.name, "i(v1)");
    }
}
