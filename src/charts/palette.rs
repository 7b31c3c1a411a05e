//! Color palettes and per-dimension chart styling.

use crate::stats::Dimension;

/// Plain RGB triple, converted to backend colors at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const COOLWARM: [Rgb; 3] = [Rgb(59, 76, 192), Rgb(221, 221, 221), Rgb(180, 4, 38)];

const VIRIDIS: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

const MAGMA: [Rgb; 5] = [
    Rgb(0, 0, 4),
    Rgb(81, 18, 124),
    Rgb(183, 55, 121),
    Rgb(252, 137, 97),
    Rgb(252, 253, 191),
];

const SET2: [Rgb; 8] = [
    Rgb(102, 194, 165),
    Rgb(252, 141, 98),
    Rgb(141, 160, 203),
    Rgb(231, 138, 195),
    Rgb(166, 216, 84),
    Rgb(255, 217, 47),
    Rgb(229, 196, 148),
    Rgb(179, 179, 179),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Coolwarm,
    Viridis,
    Magma,
    Set2,
}

impl Palette {
    /// `n` colors for `n` bars.
    ///
    /// Continuous maps are sampled at evenly spaced interior points so the
    /// extremes are never used; qualitative ones cycle.
    pub fn colors(&self, n: usize) -> Vec<Rgb> {
        let stops: &[Rgb] = match self {
            Palette::Coolwarm => &COOLWARM,
            Palette::Viridis => &VIRIDIS,
            Palette::Magma => &MAGMA,
            Palette::Set2 => return (0..n).map(|i| SET2[i % SET2.len()]).collect(),
        };

        (0..n)
            .map(|i| interpolate(stops, (i + 1) as f64 / (n + 1) as f64))
            .collect()
    }
}

fn interpolate(stops: &[Rgb], t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (stops.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(stops.len() - 1);
    let frac = pos - lower as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (stops[lower], stops[upper]);
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Labels, palette and layout for a dimension's chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub title: &'static str,
    pub category_label: &'static str,
    pub count_label: &'static str,
    pub palette: Palette,
    /// Bars run left to right with categories on the y axis.
    pub horizontal: bool,
    pub file_stem: &'static str,
}

impl ChartStyle {
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Hour => Self {
                title: "Accident Frequency by Time of Day",
                category_label: "Hour of the Day",
                count_label: "Number of Accidents",
                palette: Palette::Coolwarm,
                horizontal: false,
                file_stem: "hour",
            },
            Dimension::DayOfWeek => Self {
                title: "Accident Frequency by Day of the Week",
                category_label: "Day of the Week",
                count_label: "Number of Accidents",
                palette: Palette::Viridis,
                horizontal: false,
                file_stem: "day_of_week",
            },
            Dimension::Severity => Self {
                title: "Distribution of Accident Severity",
                category_label: "Accident Severity (1 = Most Severe, 3 = Least Severe)",
                count_label: "Count",
                palette: Palette::Magma,
                horizontal: false,
                file_stem: "severity",
            },
            Dimension::Weather => Self {
                title: "Impact of Weather Conditions on Accidents",
                category_label: "Weather Conditions",
                count_label: "Number of Accidents",
                palette: Palette::Set2,
                horizontal: true,
                file_stem: "weather",
            },
            Dimension::RoadSurface => Self {
                title: "Impact of Road Surface Conditions on Accidents",
                category_label: "Road Surface Conditions",
                count_label: "Number of Accidents",
                palette: Palette::Coolwarm,
                horizontal: true,
                file_stem: "road_surface",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_palette_skips_extremes() {
        let colors = Palette::Coolwarm.colors(1);
        assert_eq!(colors, vec![Rgb(221, 221, 221)]);

        let colors = Palette::Viridis.colors(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], VIRIDIS[0]);
        assert_ne!(colors[2], VIRIDIS[4]);
        assert_eq!(colors[1], VIRIDIS[2]);
    }

    #[test]
    fn qualitative_palette_cycles() {
        let colors = Palette::Set2.colors(10);
        assert_eq!(colors[0], colors[8]);
        assert_eq!(colors[1], colors[9]);
    }

    #[test]
    fn every_dimension_has_a_distinct_file() {
        let mut stems: Vec<&str> = Dimension::ALL
            .iter()
            .map(|d| ChartStyle::for_dimension(*d).file_stem)
            .collect();
        stems.sort();
        stems.dedup();
        assert_eq!(stems.len(), Dimension::ALL.len());
    }

    #[test]
    fn categorical_conditions_are_horizontal() {
        assert!(ChartStyle::for_dimension(Dimension::Weather).horizontal);
        assert!(ChartStyle::for_dimension(Dimension::RoadSurface).horizontal);
        assert!(!ChartStyle::for_dimension(Dimension::Hour).horizontal);
    }
}
