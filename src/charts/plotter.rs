//! Chart Plotter Module
//! Creates interactive bar charts using egui_plot.

use crate::charts::palette::{ChartStyle, Rgb};
use crate::stats::Breakdown;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot};

pub const SIGNIFICANT_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Creates frequency charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Build one bar per category at integer positions.
    ///
    /// Horizontal charts place the first category at the top.
    pub fn build_bars(breakdown: &Breakdown, style: &ChartStyle) -> Vec<Bar> {
        let n = breakdown.counts.len();
        let colors = style.palette.colors(n);

        breakdown
            .counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let position = if style.horizontal { (n - 1 - i) as f64 } else { i as f64 };
                Bar::new(position, c.count as f64)
                    .name(&c.label)
                    .fill(to_color32(colors[i]))
                    .width(0.8)
            })
            .collect()
    }

    /// Category label at a tick position, empty between categories.
    pub fn axis_label(labels: &[String], value: f64, horizontal: bool) -> String {
        let n = labels.len() as f64;
        let rounded = value.round();
        if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= n {
            return String::new();
        }
        let idx = if horizontal {
            (n - 1.0 - rounded) as usize
        } else {
            rounded as usize
        };
        labels.get(idx).cloned().unwrap_or_default()
    }

    /// Draw a frequency bar chart
    pub fn draw_bar_chart(ui: &mut egui::Ui, breakdown: &Breakdown, height: f32) {
        let style = ChartStyle::for_dimension(breakdown.dimension);
        let labels: Vec<String> = breakdown.counts.iter().map(|c| c.label.clone()).collect();
        let horizontal = style.horizontal;

        let mut chart = BarChart::new(Self::build_bars(breakdown, &style)).name(style.title);
        if horizontal {
            chart = chart.horizontal();
        }

        let (x_label, y_label) = if horizontal {
            (style.count_label, style.category_label)
        } else {
            (style.category_label, style.count_label)
        };

        let category_labels = labels.clone();
        Plot::new(format!("bars_{}", breakdown.column))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .x_axis_formatter(move |mark, _range| {
                if horizontal {
                    format!("{}", mark.value)
                } else {
                    Self::axis_label(&category_labels, mark.value, false)
                }
            })
            .y_axis_formatter(move |mark, _range| {
                if horizontal {
                    Self::axis_label(&labels, mark.value, true)
                } else {
                    format!("{}", mark.value)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(chart);
            });
    }

    /// One-line uniformity test result under a chart
    pub fn draw_test_result(ui: &mut egui::Ui, breakdown: &Breakdown) {
        let text = match (breakdown.chi_square, breakdown.p_value) {
            (Some(stat), Some(p)) => format!(
                "n = {}   chi-square = {:.2}   p = {:.4}",
                breakdown.total, stat, p
            ),
            _ => format!("n = {}   uniformity test not applicable", breakdown.total),
        };
        let color = if breakdown.is_significant {
            SIGNIFICANT_COLOR
        } else {
            ui.visuals().text_color()
        };
        ui.label(RichText::new(text).size(12.0).color(color));
    }
}
