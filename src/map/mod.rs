//! Map module - Accident hotspot heatmap

mod heatmap;

pub use heatmap::Heatmap;
