//! GUI module - Interactive chart window

mod app;
mod chart_viewer;

pub use app::run_viewer;
pub use chart_viewer::ChartViewer;
