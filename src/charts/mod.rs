//! Charts module - egui_plot chart builders

mod plotter;

pub use plotter::{BoxSeries, ChartPlotter};
