//! Chart Viewer Widget
//! Scrollable panel of chart cards with a responsive multi-column layout.

use crate::charts::{ChartPlotter, ChartStyle, SIGNIFICANT_COLOR};
use crate::stats::Breakdown;
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CARD_HEIGHT: f32 = 400.0;
const CHART_WIDTH: f32 = 640.0;
const PLOT_HEIGHT: f32 = 300.0;

/// Scrollable chart display area.
/// Automatically arranges charts into columns based on available width.
#[derive(Default)]
pub struct ChartViewer {
    pub breakdowns: Vec<Breakdown>,
}

impl ChartViewer {
    pub fn new(breakdowns: Vec<Breakdown>) -> Self {
        Self { breakdowns }
    }

    /// Number of card columns that fit in `avail_width`, at least one.
    pub fn column_count(avail_width: f32) -> usize {
        ((avail_width / (CHART_WIDTH + CHART_SPACING)).floor() as usize).max(1)
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        if self.breakdowns.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        let num_columns = Self::column_count(ui.available_width());
        let total_rows = self.breakdowns.len().div_ceil(num_columns);
        let row_height = CARD_HEIGHT + CHART_SPACING;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, row_height, total_rows, |ui, row_range| {
                for row in row_range {
                    ui.horizontal(|ui| {
                        for col in 0..num_columns {
                            if let Some(breakdown) = self.breakdowns.get(row * num_columns + col) {
                                Self::draw_chart_card(ui, breakdown);
                                ui.add_space(CHART_SPACING);
                            }
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, breakdown: &Breakdown) {
        let style = ChartStyle::for_dimension(breakdown.dimension);
        let border_color = if breakdown.is_significant {
            SIGNIFICANT_COLOR
        } else {
            Color32::from_rgb(40, 167, 69)
        };

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, border_color))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(CHART_WIDTH - 20.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(style.title).size(16.0).strong());
                    ui.add_space(6.0);
                    ChartPlotter::draw_bar_chart(ui, breakdown, PLOT_HEIGHT);
                    ui.add_space(6.0);
                    ChartPlotter::draw_test_result(ui, breakdown);
                });
            });
    }
}
