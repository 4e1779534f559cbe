//! Filter Panel Widget
//! Left side panel with the range sliders, shelf-location multiselect,
//! tri-state radios, and the browse/export buttons.

use crate::data::LoadedDataset;
use crate::filter::{FilterSpec, TriState};
use egui::{Color32, RichText};
use std::collections::BTreeSet;

/// Left side control panel. Widget state mirrors one FilterSpec; the slider
/// bounds are clamped to the dataset's observed ranges.
pub struct FilterPanel {
    sales_bounds: (f64, f64),
    price_bounds: (f64, f64),
    sales_range: (f64, f64),
    price_range: (f64, f64),
    shelve_labels: Vec<String>,
    shelve_selected: Vec<bool>,
    urban: TriState,
    us: TriState,
    pub status: String,
    configured: bool,
}

impl Default for FilterPanel {
    fn default() -> Self {
        Self {
            sales_bounds: (0.0, 0.0),
            price_bounds: (0.0, 0.0),
            sales_range: (0.0, 0.0),
            price_range: (0.0, 0.0),
            shelve_labels: Vec::new(),
            shelve_selected: Vec::new(),
            urban: TriState::Any,
            us: TriState::Any,
            status: "No data loaded".to_string(),
            configured: false,
        }
    }
}

/// Actions triggered by the filter panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPanelAction {
    None,
    FilterChanged,
    BrowseCsv,
    ExportCsv,
}

impl FilterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the widgets to the unrestricted spec for a freshly loaded
    /// dataset.
    pub fn configure(&mut self, dataset: &LoadedDataset) {
        self.sales_bounds = dataset.sales_bounds;
        self.price_bounds = dataset.price_bounds;
        self.shelve_labels = dataset.shelve_labels.clone();
        self.reset_filters();
        self.configured = true;
    }

    fn reset_filters(&mut self) {
        self.sales_range = self.sales_bounds;
        self.price_range = self.price_bounds;
        self.shelve_selected = vec![true; self.shelve_labels.len()];
        self.urban = TriState::Any;
        self.us = TriState::Any;
    }

    /// The FilterSpec the widgets currently describe.
    pub fn current_spec(&self) -> FilterSpec {
        let shelve_locs: BTreeSet<String> = self
            .shelve_labels
            .iter()
            .zip(self.shelve_selected.iter())
            .filter(|(_, &selected)| selected)
            .map(|(label, _)| label.clone())
            .collect();

        FilterSpec {
            sales_range: self.sales_range,
            price_range: self.price_range,
            shelve_locs,
            urban: self.urban,
            us: self.us,
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> FilterPanelAction {
        let mut action = FilterPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 SaleScope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Company Sales Dashboard")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);
        if ui.button("📂 Browse CSV").clicked() {
            action = FilterPanelAction::BrowseCsv;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔍 Filter Data").size(14.0).strong());
        ui.add_space(8.0);

        ui.add_enabled_ui(self.configured, |ui| {
            let mut changed = false;

            changed |= Self::range_sliders(
                ui,
                "Sales Range",
                &mut self.sales_range,
                self.sales_bounds,
            );
            ui.add_space(8.0);
            changed |= Self::range_sliders(
                ui,
                "Price Range",
                &mut self.price_range,
                self.price_bounds,
            );

            ui.add_space(10.0);
            ui.label("Shelve Location:");
            for (i, label) in self.shelve_labels.iter().enumerate() {
                if ui.checkbox(&mut self.shelve_selected[i], label).changed() {
                    changed = true;
                }
            }

            ui.add_space(10.0);
            changed |= Self::tri_state_radio(ui, "Urban Location:", &mut self.urban);
            ui.add_space(5.0);
            changed |= Self::tri_state_radio(ui, "US Location:", &mut self.us);

            ui.add_space(10.0);
            if ui.button("↺ Reset Filters").clicked() {
                self.reset_filters();
                changed = true;
            }

            if changed {
                action = FilterPanelAction::FilterChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.configured, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export Filtered CSV").size(14.0))
                    .min_size(egui::vec2(200.0, 30.0));
                if ui.add(button).clicked() {
                    action = FilterPanelAction::ExportCsv;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Min/max slider pair clamped to the dataset bounds; keeps min <= max.
    fn range_sliders(
        ui: &mut egui::Ui,
        label: &str,
        range: &mut (f64, f64),
        bounds: (f64, f64),
    ) -> bool {
        let mut changed = false;
        ui.label(format!("{label}:"));
        changed |= ui
            .add(egui::Slider::new(&mut range.0, bounds.0..=bounds.1).text("min"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut range.1, bounds.0..=bounds.1).text("max"))
            .changed();
        if range.1 < range.0 {
            range.1 = range.0;
        }
        changed
    }

    fn tri_state_radio(ui: &mut egui::Ui, label: &str, state: &mut TriState) -> bool {
        let mut changed = false;
        ui.label(label);
        ui.horizontal(|ui| {
            for option in [TriState::Any, TriState::Yes, TriState::No] {
                if ui.radio_value(state, option, option.label()).changed() {
                    changed = true;
                }
            }
        });
        changed
    }
}
