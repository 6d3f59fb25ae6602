//! Plot rendering using egui_plot
//!
//! Resolving the selection into drawable series is separated from drawing:
//! [`collect_series`] is a pure function from (waveform, selection) to line
//! series plus the list of names that did not resolve, so the same inputs
//! always produce the same plot and a missing signal degrades to a warning
//! instead of a crash. [`PlotView`] draws the resolved series with grid and
//! legend per the UI configuration.

use crate::config::UiConfig;
use crate::types::{TraceEntry, Waveform};
use egui::Ui;
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};

/// One resolved line series, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSeries {
    /// Legend label (the stored signal name)
    pub label: String,
    /// (scale, value) pairs
    pub points: Vec<[f64; 2]>,
}

/// Result of resolving a selection against a waveform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSelection {
    /// Series in selection order, one per occurrence
    pub series: Vec<TraceSeries>,
    /// Selected names absent from the waveform, in selection order
    pub unresolved: Vec<String>,
}

/// Resolve the selection in order into line series over the shared scale
pub fn collect_series(waveform: &Waveform, selection: &[TraceEntry]) -> ResolvedSelection {
    let mut resolved = ResolvedSelection::default();

    for entry in selection {
        match waveform.trace(&entry.name) {
            Some(trace) => {
                let points = waveform
                    .scale
                    .iter()
                    .zip(&trace.values)
                    .map(|(&x, &y)| [x, y])
                    .collect();
                resolved.series.push(TraceSeries {
                    label: trace.name.clone(),
                    points,
                });
            }
            None => resolved.unresolved.push(entry.name.clone()),
        }
    }

    resolved
}

/// Waveform plot configuration and rendering
pub struct PlotView {
    pub show_grid: bool,
    pub show_legend: bool,
    pub line_width: f32,
}

impl PlotView {
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            show_grid: config.show_grid,
            show_legend: config.show_legend,
            line_width: config.line_width,
        }
    }

    /// Draw the resolved series
    ///
    /// Clears nothing explicitly: egui_plot repaints from scratch each
    /// frame, so drawing the same series twice is visually idempotent.
    pub fn show(&self, ui: &mut Ui, scale_name: &str, series: &[TraceSeries]) {
        let mut plot = Plot::new("waveform_plot")
            .show_grid(self.show_grid)
            .x_axis_label(axis_label(scale_name))
            .y_axis_label("Value");

        if self.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }

        plot.show(ui, |plot_ui| {
            for s in series {
                let line = Line::new(&s.label, PlotPoints::from(s.points.clone()))
                    .width(self.line_width);
                plot_ui.line(line);
            }
        });
    }
}

fn axis_label(scale_name: &str) -> String {
    match scale_name {
        "time" => "Time (s)".to_string(),
        "frequency" => "Frequency (Hz)".to_string(),
        other => other.to_string(),
    }
}
