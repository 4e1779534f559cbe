//! SaleScope - Company Sales Dashboard
//!
//! A Rust application for exploring the company sales dataset: sidebar
//! filters, KPI cards, and interactive charts over the filtered view.

mod charts;
mod data;
mod export;
mod filter;
mod gui;
mod stats;

use eframe::egui;
use gui::SaleScopeApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("SaleScope"),
        ..Default::default()
    };

    eframe::run_native(
        "SaleScope",
        options,
        Box::new(|cc| Ok(Box::new(SaleScopeApp::new(cc)))),
    )
}
