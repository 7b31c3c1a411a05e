//! Statistics module - Frequency breakdowns and column summaries

mod calculator;

pub use calculator::{Breakdown, CategoryCount, ColumnSummary, Dimension, StatsCalculator};
