//! Chart Plotter Module
//! Builds the dashboard's interactive visualizations with egui_plot: grouped
//! histograms, scatters, box plots, bar and line charts, and the correlation
//! heatmap. All functions take already-prepared data, never a DataFrame.

use crate::stats::{percentile, CorrelationMatrix, GroupMean, QuantileBin};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

/// Color palette for categorical series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

const CHART_HEIGHT: f32 = 280.0;

/// Values per category for one box-plot series. `values_by_category` is
/// row-aligned with the category label list passed alongside it.
pub struct BoxSeries {
    pub label: String,
    pub color_index: usize,
    pub values_by_category: Vec<Vec<f64>>,
}

/// Builds the dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Stacked histogram of one numeric column, one bar stack per group.
    pub fn draw_histogram(
        ui: &mut egui::Ui,
        id: &str,
        groups: &[(String, Vec<f64>)],
        bin_count: usize,
        x_label: &str,
    ) {
        let all: Vec<f64> = groups
            .iter()
            .flat_map(|(_, values)| values.iter().copied())
            .collect();
        if all.is_empty() || bin_count == 0 {
            Self::empty_plot(ui, id);
            return;
        }

        let min = all.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = all.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let width = if max > min {
            (max - min) / bin_count as f64
        } else {
            1.0
        };

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label("Count")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let mut charts: Vec<BarChart> = Vec::new();

                for (gi, (label, values)) in groups.iter().enumerate() {
                    let mut counts = vec![0usize; bin_count];
                    for &v in values {
                        let mut idx = ((v - min) / width) as usize;
                        if idx >= bin_count {
                            idx = bin_count - 1;
                        }
                        counts[idx] += 1;
                    }

                    let bars: Vec<Bar> = counts
                        .iter()
                        .enumerate()
                        .filter(|(_, &count)| count > 0)
                        .map(|(k, &count)| {
                            Bar::new(min + (k as f64 + 0.5) * width, count as f64)
                                .width(width * 0.95)
                        })
                        .collect();

                    let mut chart = BarChart::new(bars)
                        .color(Self::series_color(gi))
                        .name(label);
                    {
                        let below: Vec<&BarChart> = charts.iter().collect();
                        chart = chart.stack_on(&below);
                    }
                    charts.push(chart);
                }

                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }

    /// Scatter of (x, y) points, one color per group.
    pub fn draw_scatter(
        ui: &mut egui::Ui,
        id: &str,
        groups: &[(String, Vec<[f64; 2]>)],
        x_label: &str,
        y_label: &str,
    ) {
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (gi, (label, points)) in groups.iter().enumerate() {
                    let plot_points: PlotPoints = points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(plot_points)
                            .radius(3.0)
                            .color(Self::series_color(gi))
                            .name(label),
                    );
                }
            });
    }

    /// Scatter with a categorical x-axis: points carry label indices and the
    /// axis formatter shows the labels themselves.
    pub fn draw_category_scatter(
        ui: &mut egui::Ui,
        id: &str,
        groups: &[(String, Vec<[f64; 2]>)],
        x_labels: &[String],
        x_label: &str,
        y_label: &str,
    ) {
        let labels = x_labels.to_vec();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 0.25 && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (gi, (label, points)) in groups.iter().enumerate() {
                    let plot_points: PlotPoints = points.iter().copied().collect();
                    plot_ui.points(
                        Points::new(plot_points)
                            .radius(3.0)
                            .color(Self::series_color(gi))
                            .name(label),
                    );
                }
            });
    }

    /// Scatter with a third variable mapped to point radius, the flat
    /// rendition of a three-axis view. Points are [x, y, size].
    pub fn draw_sized_scatter(
        ui: &mut egui::Ui,
        id: &str,
        groups: &[(String, Vec<[f64; 3]>)],
        x_label: &str,
        y_label: &str,
        size_label: &str,
    ) {
        let (size_min, size_max) = groups
            .iter()
            .flat_map(|(_, points)| points.iter().map(|p| p[2]))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let size_span = (size_max - size_min).max(f64::EPSILON);

        ui.label(
            RichText::new(format!("Point size: {size_label}"))
                .size(11.0)
                .color(Color32::GRAY),
        );

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (gi, (label, points)) in groups.iter().enumerate() {
                    let color = Self::series_color(gi);
                    for point in points {
                        let radius = 2.0 + 6.0 * ((point[2] - size_min) / size_span) as f32;
                        plot_ui.points(
                            Points::new(PlotPoints::new(vec![[point[0], point[1]]]))
                                .radius(radius)
                                .color(color.gamma_multiply(0.8)),
                        );
                    }
                    // One zero-sized entry so the legend shows the group once.
                    plot_ui.points(
                        Points::new(PlotPoints::new(Vec::new()))
                            .color(color)
                            .name(label),
                    );
                }
            });
    }

    /// Box plots per category, optionally split into several side-by-side
    /// series (e.g. Sales by ShelveLoc split by US).
    pub fn draw_box_plot(
        ui: &mut egui::Ui,
        id: &str,
        categories: &[String],
        series: &[BoxSeries],
        y_label: &str,
    ) {
        let x_labels: Vec<String> = categories.to_vec();
        let split = series.len() > 1;

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .y_axis_label(y_label)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 0.25 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (si, one) in series.iter().enumerate() {
                    let color = Self::series_color(one.color_index);
                    let offset = if split {
                        (si as f64 - (series.len() - 1) as f64 / 2.0) * 0.4
                    } else {
                        0.0
                    };
                    let box_width = if split { 0.3 } else { 0.5 };

                    let mut elems: Vec<BoxElem> = Vec::new();
                    for (ci, values) in one.values_by_category.iter().enumerate() {
                        if values.is_empty() {
                            continue;
                        }
                        let spread = Self::box_spread(values);
                        elems.push(
                            BoxElem::new(ci as f64 + offset, spread)
                                .box_width(box_width)
                                .fill(color.gamma_multiply(0.3))
                                .stroke(egui::Stroke::new(1.5, color)),
                        );
                    }

                    plot_ui.box_plot(BoxPlot::new(elems).name(&one.label).color(color));
                }
            });
    }

    /// Quartiles plus 1.5 IQR whiskers clipped to observed values.
    fn box_spread(values: &[f64]) -> BoxSpread {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = percentile(&sorted, 25.0);
        let median = percentile(&sorted, 50.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        BoxSpread::new(whisker_low, q1, median, q3, whisker_high)
    }

    /// Bar chart of grouped means (Urban vs Rural, US vs non-US).
    pub fn draw_group_bars(ui: &mut egui::Ui, id: &str, means: &[GroupMean], x_label: &str) {
        let x_labels: Vec<String> = means.iter().map(|m| m.label.clone()).collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .x_axis_label(x_label)
            .y_axis_label("Average Sales")
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 0.25 && idx < x_labels.len() {
                    x_labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = means
                    .iter()
                    .enumerate()
                    .map(|(i, m)| {
                        Bar::new(i as f64, m.mean_sales)
                            .width(0.6)
                            .fill(Self::series_color(i))
                            .name(&m.label)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Mean Sales by quantile bin midpoint, as a line with markers.
    pub fn draw_binned_line(ui: &mut egui::Ui, id: &str, bins: &[QuantileBin], x_label: &str) {
        let points: Vec<[f64; 2]> = bins.iter().map(|b| [b.midpoint, b.mean_sales]).collect();

        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .x_axis_label(x_label)
            .y_axis_label("Average Sales")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(PALETTE[2])
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(PALETTE[2]),
                );
            });
    }

    /// Correlation heatmap drawn as a colored grid. NaN entries show as "-".
    pub fn draw_correlation_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        if matrix.is_empty() {
            ui.label("No numeric columns to correlate");
            return;
        }

        let n = matrix.len();
        let cell = 54.0_f32;
        let label_w = 90.0_f32;
        let header_h = 22.0_f32;
        let size = egui::vec2(label_w + n as f32 * cell, header_h + n as f32 * cell);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        if !ui.is_rect_visible(rect) {
            return;
        }
        let painter = ui.painter_at(rect);
        let font = egui::FontId::proportional(10.0);
        let text_color = ui.visuals().text_color();

        for (j, name) in matrix.columns.iter().enumerate() {
            painter.text(
                egui::pos2(
                    rect.left() + label_w + (j as f32 + 0.5) * cell,
                    rect.top() + header_h / 2.0,
                ),
                egui::Align2::CENTER_CENTER,
                Self::short_label(name),
                font.clone(),
                text_color,
            );
        }

        for (i, name) in matrix.columns.iter().enumerate() {
            let y = rect.top() + header_h + (i as f32 + 0.5) * cell;
            painter.text(
                egui::pos2(rect.left() + label_w - 6.0, y),
                egui::Align2::RIGHT_CENTER,
                Self::short_label(name),
                font.clone(),
                text_color,
            );

            for j in 0..n {
                let value = matrix.get(i, j);
                let cell_rect = egui::Rect::from_min_size(
                    egui::pos2(
                        rect.left() + label_w + j as f32 * cell,
                        rect.top() + header_h + i as f32 * cell,
                    ),
                    egui::vec2(cell - 1.0, cell - 1.0),
                );
                painter.rect_filled(cell_rect, 2.0, Self::correlation_color(value));

                let text = if value.is_nan() {
                    "-".to_string()
                } else {
                    format!("{value:.2}")
                };
                painter.text(
                    cell_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    font.clone(),
                    Color32::BLACK,
                );
            }
        }
    }

    /// Blue (-1) through white (0) to red (+1); gray for NaN.
    fn correlation_color(value: f64) -> Color32 {
        if value.is_nan() {
            return Color32::from_gray(70);
        }
        let v = value.clamp(-1.0, 1.0);
        if v >= 0.0 {
            let t = v as f32;
            Color32::from_rgb(
                255,
                (255.0 * (1.0 - 0.65 * t)) as u8,
                (255.0 * (1.0 - 0.75 * t)) as u8,
            )
        } else {
            let t = (-v) as f32;
            Color32::from_rgb(
                (255.0 * (1.0 - 0.75 * t)) as u8,
                (255.0 * (1.0 - 0.55 * t)) as u8,
                255,
            )
        }
    }

    /// Shorten long column names for the heatmap axes. Truncates by chars,
    /// not bytes: browsed CSVs can carry multi-byte headers.
    fn short_label(name: &str) -> String {
        if name.chars().count() > 9 {
            let head: String = name.chars().take(8).collect();
            format!("{head}.")
        } else {
            name.to_string()
        }
    }

    fn empty_plot(ui: &mut egui::Ui, id: &str) {
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .show(ui, |_plot_ui| {});
    }
}

#[cfg(test)]
mod tests {
    use super::ChartPlotter;

    #[test]
    fn short_label_truncates_by_chars() {
        assert_eq!(ChartPlotter::short_label("Sales"), "Sales");
        assert_eq!(ChartPlotter::short_label("Education"), "Education");
        assert_eq!(ChartPlotter::short_label("Population"), "Populati.");
    }

    #[test]
    fn short_label_handles_multibyte_headers() {
        // A browsed CSV can have headers where byte 8 falls inside a
        // codepoint; truncation must not split it.
        assert_eq!(ChartPlotter::short_label("Prix_méd_2024"), "Prix_méd.");
        assert_eq!(ChartPlotter::short_label("Ventes_été_24"), "Ventes_é.");
    }
}
