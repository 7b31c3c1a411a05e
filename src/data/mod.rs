//! Data module - CSV loading and cleaning

mod loader;
mod parse;
mod processor;

pub use loader::{is_numeric_dtype, numeric_columns, text_columns, DataLoader};
pub use processor::{CleanedData, CleaningReport, DataProcessor};
