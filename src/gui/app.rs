//! Accident Insights Viewer Window
//! Summary header with the cleaning report above the chart viewer.

use crate::data::CleaningReport;
use crate::gui::ChartViewer;
use crate::stats::Breakdown;
use egui::{RichText, TopBottomPanel};

/// Main viewer window.
pub struct InsightsApp {
    report: CleaningReport,
    heatmap_path: Option<String>,
    chart_viewer: ChartViewer,
}

impl InsightsApp {
    pub fn new(
        report: CleaningReport,
        breakdowns: Vec<Breakdown>,
        heatmap_path: Option<String>,
    ) -> Self {
        Self {
            report,
            heatmap_path,
            chart_viewer: ChartViewer::new(breakdowns),
        }
    }

    pub fn status_line(&self) -> String {
        format!(
            "{} of {} rows kept, {} without coordinates, {} imputed columns",
            self.report.rows_kept,
            self.report.rows_loaded,
            self.report.rows_without_coordinates,
            self.report.imputations.len()
        )
    }
}

impl eframe::App for InsightsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("summary").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new("Accident Insights").size(20.0).strong());
            ui.label(self.status_line());
            if let Some(path) = &self.heatmap_path {
                ui.label(format!("Heatmap: {}", path));
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

/// Open the viewer window and block until it is closed.
pub fn run_viewer(
    report: CleaningReport,
    breakdowns: Vec<Breakdown>,
    heatmap_path: Option<String>,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("Accident Insights"),
        ..Default::default()
    };

    eframe::run_native(
        "Accident Insights",
        options,
        Box::new(move |_cc| Ok(Box::new(InsightsApp::new(report, breakdowns, heatmap_path)))),
    )
}
