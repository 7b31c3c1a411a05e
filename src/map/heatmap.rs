//! Heatmap export
//!
//! Writes a self-contained HTML page showing accident density on an
//! OpenStreetMap base layer, using Leaflet and the Leaflet.heat plugin.

use crate::config::HeatmapSettings;
use polars::prelude::*;
use serde_json::json;
use std::path::Path;
use thiserror::Error;

const LEAFLET_CSS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://cdn.jsdelivr.net/npm/leaflet@1.9.4/dist/leaflet.js";
const LEAFLET_HEAT_JS: &str =
    "https://cdn.jsdelivr.net/gh/python-visualization/folium@main/folium/templates/leaflet_heat.min.js";

#[derive(Error, Debug)]
pub enum HeatmapError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("No coordinates to plot")]
    NoPoints,
    #[error("Failed to serialize heat data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write heatmap: {0}")]
    Io(#[from] std::io::Error),
}

/// Accident locations and the point the map opens on.
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub center: [f64; 2],
    pub points: Vec<[f64; 2]>,
}

impl Heatmap {
    /// Collect `[lat, lon]` pairs from the cleaned table; the center is their mean.
    pub fn from_table(df: &DataFrame, lat_col: &str, lon_col: &str) -> Result<Self, HeatmapError> {
        let lat = df.column(lat_col)?.cast(&DataType::Float64)?;
        let lon = df.column(lon_col)?.cast(&DataType::Float64)?;

        let points: Vec<[f64; 2]> = lat
            .f64()?
            .into_iter()
            .zip(lon.f64()?.into_iter())
            .filter_map(|(la, lo)| Some([la?, lo?]))
            .collect();

        if points.is_empty() {
            return Err(HeatmapError::NoPoints);
        }

        let n = points.len() as f64;
        let center = [
            points.iter().map(|p| p[0]).sum::<f64>() / n,
            points.iter().map(|p| p[1]).sum::<f64>() / n,
        ];

        Ok(Self { center, points })
    }

    /// Build the HTML page.
    pub fn render_html(&self, settings: &HeatmapSettings) -> Result<String, HeatmapError> {
        let heat_data = serde_json::to_string(&self.points)?;
        let heat_options = serde_json::to_string(&json!({
            "radius": settings.radius,
            "blur": settings.blur,
            "minOpacity": settings.min_opacity,
            "maxZoom": settings.max_zoom,
        }))?;
        let center = serde_json::to_string(&self.center)?;

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Accident Hotspots</title>
    <link rel="stylesheet" href="{leaflet_css}">
    <script src="{leaflet_js}"></script>
    <script src="{leaflet_heat_js}"></script>
    <style>
        html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
        #map {{ position: absolute; top: 0; bottom: 0; right: 0; left: 0; }}
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var map = L.map("map", {{ center: {center}, zoom: {zoom} }});
        L.tileLayer("https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
            maxZoom: 19,
            attribution: "&copy; OpenStreetMap contributors"
        }}).addTo(map);
        var heatData = {heat_data};
        L.heatLayer(heatData, {heat_options}).addTo(map);
    </script>
</body>
</html>
"#,
            leaflet_css = LEAFLET_CSS,
            leaflet_js = LEAFLET_JS,
            leaflet_heat_js = LEAFLET_HEAT_JS,
            center = center,
            zoom = settings.zoom_start,
            heat_data = heat_data,
            heat_options = heat_options,
        ))
    }

    /// Render and write the page to `path`.
    pub fn save(&self, path: &Path, settings: &HeatmapSettings) -> Result<(), HeatmapError> {
        let html = self.render_html(settings)?;
        std::fs::write(path, html)?;
        log::info!(
            "Heatmap with {} points saved to {}",
            self.points.len(),
            path.display()
        );
        Ok(())
    }
}
