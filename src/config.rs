//! Analysis Configuration Module
//! Column names, cleaning rules and output tuning, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Names of the columns the pipeline reads or derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub identifier: String,
    pub date: String,
    pub time: String,
    pub hour: String,
    pub day_of_week: String,
    pub severity: String,
    pub weather: String,
    pub road_surface: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: "Accident_Index".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            hour: "Hour".to_string(),
            day_of_week: "Day_of_Week".to_string(),
            severity: "Accident_Severity".to_string(),
            weather: "Weather_Conditions".to_string(),
            road_surface: "Road_Surface_Conditions".to_string(),
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
        }
    }
}

/// Leaflet heat layer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapSettings {
    pub zoom_start: u8,
    pub radius: u32,
    pub blur: u32,
    pub min_opacity: f64,
    pub max_zoom: u8,
}

impl Default for HeatmapSettings {
    fn default() -> Self {
        Self {
            zoom_start: 10,
            radius: 25,
            blur: 15,
            min_opacity: 0.5,
            max_zoom: 18,
        }
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnNames,
    /// Columns removed right after loading. Absent ones are skipped.
    pub drop_columns: Vec<String>,
    /// Fill value for missing text cells.
    pub missing_sentinel: String,
    /// Cell contents read as missing.
    pub null_tokens: Vec<String>,
    /// Day-first date formats, tried in order.
    pub date_formats: Vec<String>,
    pub time_format: String,
    /// Names for day-of-week codes: code 1 is the first entry.
    pub day_names: Vec<String>,
    pub heatmap: HeatmapSettings,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            drop_columns: [
                "Unnamed: 0",
                "Accident_Index",
                "Police_Force",
                "Local_Authority_(Highway)",
                "LSOA_of_Accident_Location",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            missing_sentinel: "Unknown".to_string(),
            null_tokens: [
                "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
                "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            date_formats: ["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            time_format: "%H:%M".to_string(),
            day_names: [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            heatmap: HeatmapSettings::default(),
            chart_width: 1000,
            chart_height: 500,
        }
    }
}

impl AnalysisConfig {
    /// Load a JSON config file; keys left out keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
