//! SaleScope Main Application
//! Composition root: owns the memoized dataset store, the filter panel, and
//! the dashboard, and recomputes the derived view when filters change.

use crate::data::DatasetStore;
use crate::export;
use crate::gui::{Dashboard, DashboardData, FilterPanel, FilterPanelAction};
use anyhow::Context;
use egui::{Color32, RichText, SidePanel};
use std::path::Path;

/// Dataset shipped next to the binary; Browse overrides it.
const DEFAULT_DATA_PATH: &str = "company_Data.csv";

/// Main application window.
pub struct SaleScopeApp {
    store: DatasetStore,
    filter_panel: FilterPanel,
    dashboard: Dashboard,
    data: Option<DashboardData>,
    load_error: Option<String>,
}

impl SaleScopeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            store: DatasetStore::new(),
            filter_panel: FilterPanel::new(),
            dashboard: Dashboard::new(),
            data: None,
            load_error: None,
        };
        app.load_dataset(Path::new(DEFAULT_DATA_PATH));
        app
    }

    /// Load (or re-target) the dataset and reset filters to unrestricted.
    fn load_dataset(&mut self, path: &Path) {
        match self.store.ensure_loaded(path) {
            Ok(dataset) => {
                self.filter_panel.configure(dataset);
                self.load_error = None;
                self.recompute();
            }
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.load_error = Some(e.to_string());
                self.data = None;
                self.filter_panel.set_status(&format!("Error: {e}"));
            }
        }
    }

    /// Recompute the filtered view and every aggregate from the current
    /// widget state. Synchronous: the dataset is small enough to finish
    /// well within a frame.
    fn recompute(&mut self) {
        // After a failed load the store may still hold the previous dataset;
        // recomputing would overwrite the error status with stale counts.
        if self.load_error.is_some() {
            return;
        }
        let Some(dataset) = self.store.get() else {
            return;
        };
        let spec = self.filter_panel.current_spec();
        match DashboardData::compute(dataset, &spec) {
            Ok(data) => {
                self.filter_panel.set_status(&format!(
                    "{} of {} records in view",
                    data.view.height(),
                    dataset.df.height()
                ));
                self.data = Some(data);
            }
            Err(e) => {
                // Filtering is total over normalized input; reaching this is
                // a bug worth surfacing, not panicking over.
                log::error!("recompute failed: {e}");
                self.filter_panel.set_status(&format!("Error: {e}"));
            }
        }
    }

    fn handle_browse(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.load_dataset(&path);
        }
    }

    fn handle_export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("filtered_company_data.csv")
            .save_file()
        else {
            return;
        };

        match self.export_view(&path) {
            Ok(rows) => self
                .filter_panel
                .set_status(&format!("Exported {rows} records to {}", path.display())),
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.filter_panel.set_status(&format!("Error: {e}"));
            }
        }
    }

    fn export_view(&self, path: &Path) -> anyhow::Result<usize> {
        let data = self
            .data
            .as_ref()
            .context("no filtered view to export")?;
        export::write_csv(&data.view, path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(data.view.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Sales,Price,Advertising,Income,Population,Age,Education,ShelveLoc,Urban,US
9.5,120,11,73,276,42,17,Bad,Yes,Yes
11.22,83,16,48,260,65,10,Good,Yes,Yes
";

    fn app() -> SaleScopeApp {
        SaleScopeApp {
            store: DatasetStore::new(),
            filter_panel: FilterPanel::new(),
            dashboard: Dashboard::new(),
            data: None,
            load_error: None,
        }
    }

    #[test]
    fn failed_browse_keeps_error_status() {
        let good = std::env::temp_dir().join("salescope_app_good.csv");
        let mut file = std::fs::File::create(&good).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut app = app();
        app.load_dataset(&good);
        assert!(app.load_error.is_none());
        assert!(app.data.is_some());

        app.load_dataset(Path::new("/nonexistent/other.csv"));
        assert!(app.load_error.is_some());
        assert!(app.data.is_none());
        assert!(app.filter_panel.status.contains("Error"));

        // The previous dataset is still cached, but filter changes must not
        // resurface its counts over the error.
        let status = app.filter_panel.status.clone();
        app.recompute();
        assert_eq!(app.filter_panel.status, status);
        assert!(app.data.is_none());
    }
}

impl eframe::App for SaleScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = FilterPanelAction::None;

        SidePanel::left("filter_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    action = self.filter_panel.show(ui);
                });
            });

        match action {
            FilterPanelAction::FilterChanged => self.recompute(),
            FilterPanelAction::BrowseCsv => self.handle_browse(),
            FilterPanelAction::ExportCsv => self.handle_export(),
            FilterPanelAction::None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.load_error {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        RichText::new(format!("⚠ {error}"))
                            .size(16.0)
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                });
                return;
            }

            match (self.store.get(), &self.data) {
                (Some(dataset), Some(data)) => self.dashboard.show(ui, dataset, data),
                _ => {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No data loaded").size(20.0));
                    });
                }
            }
        });
    }
}
