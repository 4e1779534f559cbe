//! Dashboard Widget
//! Central panel: KPI cards, the four analysis tabs, and the data preview.

use crate::charts::{BoxSeries, ChartPlotter};
use crate::data::{self, LoadedDataset};
use crate::filter::{self, FilterSpec};
use crate::stats::{self, CorrelationMatrix, GroupMean, KpiSummary, QuantileBin};
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::*;
use std::collections::BTreeMap;

const PREVIEW_ROWS: usize = 50;
const HISTOGRAM_BINS: usize = 30;

/// Everything derived from one FilterSpec: the view plus its aggregates.
/// Recomputed wholesale whenever the spec changes.
pub struct DashboardData {
    pub view: DataFrame,
    pub kpis: KpiSummary,
    pub shelve_means: Vec<GroupMean>,
    pub urban_means: Vec<GroupMean>,
    pub us_means: Vec<GroupMean>,
    pub price_bins: Vec<QuantileBin>,
    pub correlation: CorrelationMatrix,
}

impl DashboardData {
    pub fn compute(dataset: &LoadedDataset, spec: &FilterSpec) -> PolarsResult<Self> {
        let view = filter::apply(&dataset.df, spec)?;
        Ok(Self {
            kpis: KpiSummary::compute(&view),
            shelve_means: stats::mean_by_group(&view, "ShelveLoc")?,
            urban_means: stats::mean_by_group(&view, "Urban")?,
            us_means: stats::mean_by_group(&view, "US")?,
            price_bins: stats::quantile_binned_means(&view, "Price", stats::PRICE_QUANTILES)?,
            correlation: stats::correlation_matrix(&view, &dataset.numeric_columns),
            view,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DashboardTab {
    SalesAnalysis,
    PricingInsights,
    MarketCharacteristics,
    DeepDive,
}

impl DashboardTab {
    const ALL: [DashboardTab; 4] = [
        DashboardTab::SalesAnalysis,
        DashboardTab::PricingInsights,
        DashboardTab::MarketCharacteristics,
        DashboardTab::DeepDive,
    ];

    fn title(self) -> &'static str {
        match self {
            DashboardTab::SalesAnalysis => "📈 Sales Analysis",
            DashboardTab::PricingInsights => "💰 Pricing Insights",
            DashboardTab::MarketCharacteristics => "📊 Market Characteristics",
            DashboardTab::DeepDive => "🔍 Deep Dive",
        }
    }
}

/// Preset two-factor views for the deep-dive tab. The third variable is
/// rendered as point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisPreset {
    PriceAdvertising,
    IncomePopulation,
    AgeEducation,
}

impl AnalysisPreset {
    const ALL: [AnalysisPreset; 3] = [
        AnalysisPreset::PriceAdvertising,
        AnalysisPreset::IncomePopulation,
        AnalysisPreset::AgeEducation,
    ];

    fn title(self) -> &'static str {
        match self {
            AnalysisPreset::PriceAdvertising => "Sales vs Price & Advertising",
            AnalysisPreset::IncomePopulation => "Sales vs Income & Population",
            AnalysisPreset::AgeEducation => "Sales vs Age & Education",
        }
    }

    fn axes(self) -> (&'static str, &'static str) {
        match self {
            AnalysisPreset::PriceAdvertising => ("Price", "Advertising"),
            AnalysisPreset::IncomePopulation => ("Income", "Population"),
            AnalysisPreset::AgeEducation => ("Age", "Education"),
        }
    }
}

/// Central dashboard area. Holds only presentation state (active tab,
/// deep-dive column pickers); all data comes in per frame.
pub struct Dashboard {
    active_tab: DashboardTab,
    preset: AnalysisPreset,
    custom_x: String,
    custom_y: String,
    custom_color: String,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            active_tab: DashboardTab::SalesAnalysis,
            preset: AnalysisPreset::PriceAdvertising,
            custom_x: "Price".to_string(),
            custom_y: "Sales".to_string(),
            custom_color: "ShelveLoc".to_string(),
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the dashboard
    pub fn show(&mut self, ui: &mut egui::Ui, dataset: &LoadedDataset, data: &DashboardData) {
        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            Self::kpi_row(ui, &data.kpis);
            ui.add_space(10.0);

            ui.horizontal(|ui| {
                for tab in DashboardTab::ALL {
                    if ui
                        .selectable_label(self.active_tab == tab, tab.title())
                        .clicked()
                    {
                        self.active_tab = tab;
                    }
                }
            });
            ui.separator();
            ui.add_space(5.0);

            match self.active_tab {
                DashboardTab::SalesAnalysis => Self::sales_analysis_tab(ui, data),
                DashboardTab::PricingInsights => Self::pricing_insights_tab(ui, data),
                DashboardTab::MarketCharacteristics => Self::market_tab(ui, data),
                DashboardTab::DeepDive => self.deep_dive_tab(ui, dataset, data),
            }

            ui.add_space(15.0);
            ui.separator();
            Self::preview_table(ui, &data.view);
        });
    }

    fn kpi_row(ui: &mut egui::Ui, kpis: &KpiSummary) {
        ui.label(
            RichText::new("📊 Key Performance Indicators")
                .size(16.0)
                .strong(),
        );
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            Self::kpi_card(ui, "Total Sales", &format!("${:.0}", kpis.total_sales));
            Self::kpi_card(ui, "Average Sales", &format_mean(kpis.mean_sales, "$"));
            Self::kpi_card(ui, "Products Analyzed", &kpis.record_count.to_string());
            Self::kpi_card(
                ui,
                "Avg Advertising Spend",
                &format_mean(kpis.mean_advertising, "$"),
            );
        });
    }

    fn kpi_card(ui: &mut egui::Ui, title: &str, value: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_min_width(150.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).size(11.0).color(Color32::GRAY));
                    ui.label(RichText::new(value).size(18.0).strong());
                });
            });
    }

    // ===== Tab 1: Sales Analysis =====
    fn sales_analysis_tab(ui: &mut egui::Ui, data: &DashboardData) {
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Sales Distribution").strong());
            let groups = grouped_values(&data.view, "ShelveLoc", "Sales");
            ChartPlotter::draw_histogram(
                &mut columns[0],
                "sales_hist",
                &groups,
                HISTOGRAM_BINS,
                "Sales",
            );

            columns[1].label(RichText::new("Sales vs Advertising Spend").strong());
            let points = grouped_points(&data.view, "ShelveLoc", "Advertising", "Sales");
            ChartPlotter::draw_scatter(
                &mut columns[1],
                "sales_vs_adv",
                &points,
                "Advertising",
                "Sales",
            );
        });

        ui.add_space(10.0);
        ui.label(
            RichText::new("Sales Distribution by Shelf Location and US Market").strong(),
        );
        let categories = category_order(&data.shelve_means);
        let series = split_box_series(&data.view, "ShelveLoc", &categories, "Sales", "US");
        ChartPlotter::draw_box_plot(ui, "sales_by_shelve_us", &categories, &series, "Sales");
    }

    // ===== Tab 2: Pricing Insights =====
    fn pricing_insights_tab(ui: &mut egui::Ui, data: &DashboardData) {
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Price vs Sales Relationship").strong());
            let points = grouped_points(&data.view, "ShelveLoc", "Price", "Sales");
            ChartPlotter::draw_scatter(
                &mut columns[0],
                "price_vs_sales",
                &points,
                "Price",
                "Sales",
            );

            columns[1].label(RichText::new("Price Distribution by Shelf Location").strong());
            let categories = category_order(&data.shelve_means);
            let values: Vec<Vec<f64>> = categories
                .iter()
                .map(|c| category_values(&data.view, "ShelveLoc", c, "Price"))
                .collect();
            let series = [BoxSeries {
                label: "Price".to_string(),
                color_index: 2,
                values_by_category: values,
            }];
            ChartPlotter::draw_box_plot(
                &mut columns[1],
                "price_by_shelve",
                &categories,
                &series,
                "Price",
            );
        });

        ui.add_space(10.0);
        ui.label(RichText::new("Price Elasticity Analysis").strong());
        if data.price_bins.is_empty() {
            ui.label("No records in view");
        } else {
            ChartPlotter::draw_binned_line(
                ui,
                "price_elasticity",
                &data.price_bins,
                "Price Midpoint",
            );
        }
    }

    // ===== Tab 3: Market Characteristics =====
    fn market_tab(ui: &mut egui::Ui, data: &DashboardData) {
        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Average Sales: Urban vs Rural").strong());
            ChartPlotter::draw_group_bars(
                &mut columns[0],
                "urban_means",
                &data.urban_means,
                "Urban Location",
            );

            columns[1].label(RichText::new("Average Sales: US vs Non-US").strong());
            ChartPlotter::draw_group_bars(&mut columns[1], "us_means", &data.us_means, "US Market");
        });

        ui.add_space(10.0);
        ui.label(RichText::new("Feature Correlation Matrix").strong());
        ChartPlotter::draw_correlation_heatmap(ui, &data.correlation);
    }

    // ===== Tab 4: Deep Dive =====
    fn deep_dive_tab(&mut self, ui: &mut egui::Ui, dataset: &LoadedDataset, data: &DashboardData) {
        ui.horizontal(|ui| {
            ui.label("Analysis:");
            egui::ComboBox::from_id_salt("deep_dive_preset")
                .width(240.0)
                .selected_text(self.preset.title())
                .show_ui(ui, |ui| {
                    for preset in AnalysisPreset::ALL {
                        ui.selectable_value(&mut self.preset, preset, preset.title());
                    }
                });
        });

        let (x_col, y_col) = self.preset.axes();
        ui.label(RichText::new(self.preset.title()).strong());
        let points = grouped_points3(&data.view, "ShelveLoc", x_col, y_col, "Sales");
        ChartPlotter::draw_sized_scatter(
            ui,
            "deep_dive_preset_chart",
            &points,
            x_col,
            y_col,
            "Sales",
        );

        ui.add_space(15.0);
        ui.label(RichText::new("Custom Data Exploration").strong());

        // X admits numeric and categorical columns, Y numeric only, color any
        // categorical column. Selections are re-clamped because a Browse can
        // swap in a dataset with different columns.
        let mut x_columns = dataset.numeric_columns.clone();
        x_columns.extend(dataset.categorical_columns.iter().cloned());
        clamp_selection(&mut self.custom_x, &x_columns);
        clamp_selection(&mut self.custom_y, &dataset.numeric_columns);
        clamp_selection(&mut self.custom_color, &dataset.categorical_columns);

        ui.horizontal(|ui| {
            Self::column_picker(ui, "X-axis", &x_columns, &mut self.custom_x);
            Self::column_picker(ui, "Y-axis", &dataset.numeric_columns, &mut self.custom_y);
            Self::column_picker(
                ui,
                "Color by",
                &dataset.categorical_columns,
                &mut self.custom_color,
            );
        });

        if dataset.categorical_columns.contains(&self.custom_x) {
            let (groups, x_labels) = categorical_x_points(
                &data.view,
                &self.custom_color,
                &self.custom_x,
                &self.custom_y,
            );
            ChartPlotter::draw_category_scatter(
                ui,
                "deep_dive_custom_cat",
                &groups,
                &x_labels,
                &self.custom_x,
                &self.custom_y,
            );
        } else {
            let points = grouped_points(&data.view, &self.custom_color, &self.custom_x, &self.custom_y);
            ChartPlotter::draw_scatter(
                ui,
                "deep_dive_custom",
                &points,
                &self.custom_x,
                &self.custom_y,
            );
        }
    }

    fn column_picker(ui: &mut egui::Ui, label: &str, columns: &[String], selected: &mut String) {
        ui.label(format!("{label}:"));
        egui::ComboBox::from_id_salt(label.to_string())
            .width(130.0)
            .selected_text(selected.clone())
            .show_ui(ui, |ui| {
                for column in columns {
                    ui.selectable_value(selected, column.clone(), column);
                }
            });
    }

    // ===== Data preview =====
    fn preview_table(ui: &mut egui::Ui, view: &DataFrame) {
        ui.label(RichText::new("🔎 Filtered Data Preview").size(16.0).strong());
        ui.add_space(5.0);

        let shown = view.height().min(PREVIEW_ROWS);
        if shown == 0 {
            ui.label("No records match the current filters");
            return;
        }

        let names: Vec<String> = view
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        ScrollArea::horizontal().show(ui, |ui| {
            egui::Grid::new("data_preview")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for name in &names {
                        ui.label(RichText::new(name).strong().size(11.0));
                    }
                    ui.end_row();

                    for row in 0..shown {
                        for name in &names {
                            let text = view
                                .column(name)
                                .ok()
                                .and_then(|column| column.get(row).ok())
                                .map(|v| stats::value_label(&v))
                                .unwrap_or_default();
                            ui.label(RichText::new(text).size(11.0));
                        }
                        ui.end_row();
                    }
                });
        });

        if view.height() > PREVIEW_ROWS {
            ui.label(
                RichText::new(format!(
                    "Showing first {PREVIEW_ROWS} of {} records",
                    view.height()
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        }
    }
}

/// Category order for the shelf box plots; reuses the grouped-mean labels so
/// charts agree with the aggregate tables.
fn category_order(means: &[GroupMean]) -> Vec<String> {
    means.iter().map(|m| m.label.clone()).collect()
}

/// Row labels of a grouping column, bools rendered as Yes/No.
fn row_labels(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    let Ok(col) = df.column(column) else {
        return Vec::new();
    };
    (0..df.height())
        .map(|i| {
            col.get(i).ok().and_then(|v| {
                if v.is_null() {
                    None
                } else {
                    Some(stats::value_label(&v))
                }
            })
        })
        .collect()
}

/// One value vector per group label, sorted by label.
fn grouped_values(df: &DataFrame, group_col: &str, value_col: &str) -> Vec<(String, Vec<f64>)> {
    let labels = row_labels(df, group_col);
    let values = data::numeric_values(df, value_col).unwrap_or_default();

    let mut acc: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        if let Some(label) = label {
            if value.is_finite() {
                acc.entry(label).or_default().push(value);
            }
        }
    }
    acc.into_iter().collect()
}

/// One (x, y) point list per group label, sorted by label.
fn grouped_points(
    df: &DataFrame,
    group_col: &str,
    x_col: &str,
    y_col: &str,
) -> Vec<(String, Vec<[f64; 2]>)> {
    let labels = row_labels(df, group_col);
    let xs = data::numeric_values(df, x_col).unwrap_or_default();
    let ys = data::numeric_values(df, y_col).unwrap_or_default();

    let mut acc: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for i in 0..labels.len().min(xs.len()).min(ys.len()) {
        if let Some(label) = &labels[i] {
            if xs[i].is_finite() && ys[i].is_finite() {
                acc.entry(label.clone()).or_default().push([xs[i], ys[i]]);
            }
        }
    }
    acc.into_iter().collect()
}

/// Like `grouped_points` with a third column carried for point sizing.
fn grouped_points3(
    df: &DataFrame,
    group_col: &str,
    x_col: &str,
    y_col: &str,
    size_col: &str,
) -> Vec<(String, Vec<[f64; 3]>)> {
    let labels = row_labels(df, group_col);
    let xs = data::numeric_values(df, x_col).unwrap_or_default();
    let ys = data::numeric_values(df, y_col).unwrap_or_default();
    let sizes = data::numeric_values(df, size_col).unwrap_or_default();

    let mut acc: BTreeMap<String, Vec<[f64; 3]>> = BTreeMap::new();
    let rows = labels.len().min(xs.len()).min(ys.len()).min(sizes.len());
    for i in 0..rows {
        if let Some(label) = &labels[i] {
            if xs[i].is_finite() && ys[i].is_finite() && sizes[i].is_finite() {
                acc.entry(label.clone())
                    .or_default()
                    .push([xs[i], ys[i], sizes[i]]);
            }
        }
    }
    acc.into_iter().collect()
}

/// Snap a picker selection back to the column list when it no longer exists,
/// e.g. after browsing to a dataset with different columns.
fn clamp_selection(selected: &mut String, columns: &[String]) {
    if !columns.contains(selected) {
        if let Some(first) = columns.first() {
            *selected = first.clone();
        }
    }
}

/// Points for a scatter over a categorical X column: labels are mapped to
/// index positions, grouped by the color column. Returns the groups plus the
/// sorted label list for axis ticks.
fn categorical_x_points(
    df: &DataFrame,
    group_col: &str,
    x_col: &str,
    y_col: &str,
) -> (Vec<(String, Vec<[f64; 2]>)>, Vec<String>) {
    let group_labels = row_labels(df, group_col);
    let x_values = row_labels(df, x_col);
    let ys = data::numeric_values(df, y_col).unwrap_or_default();

    let mut x_labels: Vec<String> = x_values.iter().flatten().cloned().collect();
    x_labels.sort();
    x_labels.dedup();

    let mut acc: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    let rows = group_labels.len().min(x_values.len()).min(ys.len());
    for i in 0..rows {
        let (Some(group), Some(x_value)) = (&group_labels[i], &x_values[i]) else {
            continue;
        };
        if !ys[i].is_finite() {
            continue;
        }
        if let Ok(index) = x_labels.binary_search(x_value) {
            acc.entry(group.clone())
                .or_default()
                .push([index as f64, ys[i]]);
        }
    }
    (acc.into_iter().collect(), x_labels)
}

/// Values of `value_col` for rows whose group label equals `category`.
fn category_values(df: &DataFrame, group_col: &str, category: &str, value_col: &str) -> Vec<f64> {
    let labels = row_labels(df, group_col);
    let values = data::numeric_values(df, value_col).unwrap_or_default();
    labels
        .into_iter()
        .zip(values)
        .filter_map(|(label, value)| {
            (label.as_deref() == Some(category) && value.is_finite()).then_some(value)
        })
        .collect()
}

/// Box series per value of `split_col`, each holding values per category.
fn split_box_series(
    df: &DataFrame,
    category_col: &str,
    categories: &[String],
    value_col: &str,
    split_col: &str,
) -> Vec<BoxSeries> {
    let split_labels = row_labels(df, split_col);
    let category_labels = row_labels(df, category_col);
    let values = data::numeric_values(df, value_col).unwrap_or_default();

    let mut split_names: Vec<String> = split_labels.iter().flatten().cloned().collect();
    split_names.sort();
    split_names.dedup();

    split_names
        .into_iter()
        .enumerate()
        .map(|(si, split_name)| {
            let values_by_category: Vec<Vec<f64>> = categories
                .iter()
                .map(|category| {
                    let rows = split_labels
                        .len()
                        .min(category_labels.len())
                        .min(values.len());
                    (0..rows)
                        .filter(|&i| {
                            split_labels[i].as_deref() == Some(split_name.as_str())
                                && category_labels[i].as_deref() == Some(category.as_str())
                                && values[i].is_finite()
                        })
                        .map(|i| values[i])
                        .collect()
                })
                .collect();

            BoxSeries {
                label: format!("{split_col}: {split_name}"),
                color_index: si,
                values_by_category,
            }
        })
        .collect()
}

fn format_mean(value: f64, prefix: &str) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{prefix}{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn view() -> DataFrame {
        df!(
            "Sales" => [5.0, 7.0, 12.0],
            "Price" => [100.0, 90.0, 150.0],
            "Advertising" => [4.0, 2.0, 6.0],
            "ShelveLoc" => ["Good", "Good", "Medium"],
            "US" => [true, false, false],
        )
        .unwrap()
    }

    #[test]
    fn grouped_points_align_rows() {
        let groups = grouped_points(&view(), "ShelveLoc", "Price", "Sales");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Good");
        assert_eq!(groups[0].1, vec![[100.0, 5.0], [90.0, 7.0]]);
        assert_eq!(groups[1].1, vec![[150.0, 12.0]]);
    }

    #[test]
    fn grouped_values_bucket_by_label() {
        let groups = grouped_values(&view(), "US", "Sales");
        // Booleans label as Yes/No, BTreeMap order: No first.
        assert_eq!(groups[0].0, "No");
        assert_eq!(groups[0].1, vec![7.0, 12.0]);
        assert_eq!(groups[1].0, "Yes");
        assert_eq!(groups[1].1, vec![5.0]);
    }

    #[test]
    fn categorical_x_maps_labels_to_indices() {
        let (groups, x_labels) = categorical_x_points(&view(), "US", "ShelveLoc", "Sales");
        assert_eq!(x_labels, vec!["Good", "Medium"]);
        // Booleans label as Yes/No, BTreeMap order: No first.
        assert_eq!(groups[0].0, "No");
        assert_eq!(groups[0].1, vec![[0.0, 7.0], [1.0, 12.0]]);
        assert_eq!(groups[1].0, "Yes");
        assert_eq!(groups[1].1, vec![[0.0, 5.0]]);
    }

    #[test]
    fn clamp_selection_snaps_to_first_column() {
        let columns = vec!["Sales".to_string(), "Price".to_string()];
        let mut selected = "Gone".to_string();
        clamp_selection(&mut selected, &columns);
        assert_eq!(selected, "Sales");

        let mut kept = "Price".to_string();
        clamp_selection(&mut kept, &columns);
        assert_eq!(kept, "Price");
    }

    #[test]
    fn split_box_series_partitions_rows() {
        let categories = vec!["Good".to_string(), "Medium".to_string()];
        let series = split_box_series(&view(), "ShelveLoc", &categories, "Sales", "US");
        assert_eq!(series.len(), 2);
        let no = &series[0];
        assert_eq!(no.label, "US: No");
        assert_eq!(no.values_by_category[0], vec![7.0]);
        assert_eq!(no.values_by_category[1], vec![12.0]);
        let yes = &series[1];
        assert_eq!(yes.values_by_category[0], vec![5.0]);
        assert!(yes.values_by_category[1].is_empty());
    }
}
