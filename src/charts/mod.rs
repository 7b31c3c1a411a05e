//! Charts module - Chart styling and rendering

mod palette;
mod plotter;
mod renderer;

pub use palette::ChartStyle;
pub use plotter::{ChartPlotter, SIGNIFICANT_COLOR};
pub use renderer::StaticChartRenderer;
