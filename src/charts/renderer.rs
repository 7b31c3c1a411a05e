//! Static Chart Renderer
//! Draws frequency bar charts to PNG files with plotters.
//!
//! Layout:
//! 1. Title centered on top, chi-square p-value in the top right corner
//! 2. One bar per category, colored by sampling the dimension's palette
//! 3. Vertical bars for ordinal dimensions, horizontal for conditions

use crate::charts::palette::{ChartStyle, Rgb};
use crate::stats::Breakdown;
use plotters::coord::ranged1d::SegmentValue;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

const TITLE_FONT: (&str, u32) = ("sans-serif", 24);
const LABEL_FONT: (&str, u32) = ("sans-serif", 15);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create chart directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Nothing to plot for column '{0}'")]
    Empty(String),
    #[error("Drawing failed: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(e.to_string())
    }
}

fn to_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Label for a segment center; edges get no label.
fn segment_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) if *i >= 0 => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every breakdown into `dir` as `<file_stem>.png`, one chart per task.
    pub fn render_all(
        breakdowns: &[Breakdown],
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;

        breakdowns
            .par_iter()
            .filter(|b| {
                if b.counts.is_empty() {
                    log::warn!("No values in '{}', chart skipped", b.column);
                }
                !b.counts.is_empty()
            })
            .map(|b| -> Result<PathBuf, RenderError> {
                let style = ChartStyle::for_dimension(b.dimension);
                let path = dir.join(format!("{}.png", style.file_stem));
                Self::render_png(b, &style, &path, width, height)?;
                log::info!("Saved chart {}", path.display());
                Ok(path)
            })
            .collect()
    }

    /// Render one breakdown as a bar chart PNG.
    pub fn render_png(
        breakdown: &Breakdown,
        style: &ChartStyle,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if breakdown.counts.is_empty() {
            return Err(RenderError::Empty(breakdown.column.clone()));
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let n = breakdown.counts.len() as i32;
        let top = ((breakdown.max_count() as f64) * 1.1).ceil() as u32 + 1;
        let colors: Vec<RGBColor> = style
            .palette
            .colors(breakdown.counts.len())
            .into_iter()
            .map(to_color)
            .collect();

        if style.horizontal {
            // First category at the top, as in a ranked list
            let labels: Vec<String> = breakdown
                .counts
                .iter()
                .rev()
                .map(|c| c.label.clone())
                .collect();

            let mut chart = ChartBuilder::on(&root)
                .caption(style.title, TITLE_FONT)
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(220)
                .build_cartesian_2d(0u32..top, (0..n).into_segmented())?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .x_desc(style.count_label)
                .y_desc(style.category_label)
                .y_labels(labels.len())
                .y_label_formatter(&|v| segment_label(v, &labels))
                .label_style(LABEL_FONT)
                .draw()?;

            chart.draw_series(breakdown.counts.iter().enumerate().map(|(i, c)| {
                let slot = n - 1 - i as i32;
                let mut bar = Rectangle::new(
                    [
                        (0, SegmentValue::Exact(slot)),
                        (c.count as u32, SegmentValue::Exact(slot + 1)),
                    ],
                    colors[i].filled(),
                );
                bar.set_margin(4, 4, 0, 0);
                bar
            }))?;
        } else {
            let labels: Vec<String> = breakdown.counts.iter().map(|c| c.label.clone()).collect();

            let mut chart = ChartBuilder::on(&root)
                .caption(style.title, TITLE_FONT)
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .build_cartesian_2d((0..n).into_segmented(), 0u32..top)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(style.category_label)
                .y_desc(style.count_label)
                .x_labels(labels.len())
                .x_label_formatter(&|v| segment_label(v, &labels))
                .label_style(LABEL_FONT)
                .draw()?;

            chart.draw_series(breakdown.counts.iter().enumerate().map(|(i, c)| {
                let slot = i as i32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(slot), 0),
                        (SegmentValue::Exact(slot + 1), c.count as u32),
                    ],
                    colors[i].filled(),
                );
                bar.set_margin(0, 0, 4, 4);
                bar
            }))?;
        }

        if let Some(p) = breakdown.p_value {
            let note = format!("uniformity p = {:.4}", p);
            root.draw(&Text::new(
                note,
                (width as i32 - 210, 12),
                ("sans-serif", 13).into_font().color(&BLACK),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}
