//! Statistics Calculator Module
//! Frequency breakdowns with a uniformity test, and numeric column summaries.

use crate::config::{AnalysisConfig, ColumnNames};
use crate::data::numeric_columns;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Significance threshold for the chi-square test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// A categorical view of the accident table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Hour,
    DayOfWeek,
    Severity,
    Weather,
    RoadSurface,
}

/// How the categories of a breakdown are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOrder {
    /// Numeric value ascending, non-numeric labels last.
    Numeric,
    /// Monday through Sunday when labels are weekday names.
    Weekday,
    /// Most frequent first.
    CountDescending,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Hour,
        Dimension::DayOfWeek,
        Dimension::Severity,
        Dimension::Weather,
        Dimension::RoadSurface,
    ];

    pub fn column<'a>(&self, columns: &'a ColumnNames) -> &'a str {
        match self {
            Dimension::Hour => &columns.hour,
            Dimension::DayOfWeek => &columns.day_of_week,
            Dimension::Severity => &columns.severity,
            Dimension::Weather => &columns.weather,
            Dimension::RoadSurface => &columns.road_surface,
        }
    }

    pub fn order(&self) -> CategoryOrder {
        match self {
            Dimension::Hour | Dimension::Severity => CategoryOrder::Numeric,
            Dimension::DayOfWeek => CategoryOrder::Weekday,
            Dimension::Weather | Dimension::RoadSurface => CategoryOrder::CountDescending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Accident counts per category of one dimension.
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub column: String,
    pub counts: Vec<CategoryCount>,
    pub total: usize,
    /// Chi-square statistic against an even spread over the categories
    pub chi_square: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl Breakdown {
    pub fn max_count(&self) -> usize {
        self.counts.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p95: f64,
}

/// Handles statistical calculations over the cleaned table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Render a cell as a category label. Whole floats drop the fraction so
    /// an imputed `14.0` groups with `14`.
    pub fn cell_labels(column: &Column) -> PolarsResult<Vec<Option<String>>> {
        let series = column.as_materialized_series();
        match series.dtype() {
            DataType::String => Ok(series
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect()),
            dtype if crate::data::is_numeric_dtype(dtype) => {
                let floats = series.cast(&DataType::Float64)?;
                Ok(floats
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(format_number))
                    .collect())
            }
            _ => {
                let text = series.cast(&DataType::String)?;
                Ok(text
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect())
            }
        }
    }

    /// Count accidents per category of `dimension`. Missing cells are skipped.
    /// Day-of-week codes are counted under their configured day names.
    pub fn compute_breakdown(
        df: &DataFrame,
        dimension: Dimension,
        config: &AnalysisConfig,
    ) -> PolarsResult<Breakdown> {
        let name = dimension.column(&config.columns);
        let labels = Self::cell_labels(df.column(name)?)?;

        let mut tally: HashMap<String, usize> = HashMap::new();
        for label in labels.into_iter().flatten() {
            let label = match dimension {
                Dimension::DayOfWeek => day_name(&label, &config.day_names).unwrap_or(label),
                _ => label,
            };
            *tally.entry(label).or_default() += 1;
        }

        let mut counts: Vec<CategoryCount> = tally
            .into_iter()
            .map(|(label, count)| CategoryCount { label, count })
            .collect();
        Self::sort_categories(&mut counts, dimension.order());

        let total = counts.iter().map(|c| c.count).sum();
        let observed: Vec<usize> = counts.iter().map(|c| c.count).collect();
        let (chi_square, p_value) = match Self::uniformity_test(&observed) {
            Some((stat, p)) => (Some(stat), Some(p)),
            None => (None, None),
        };

        Ok(Breakdown {
            dimension,
            column: name.to_string(),
            counts,
            total,
            chi_square,
            p_value,
            is_significant: p_value.is_some_and(|p| p <= SIGNIFICANCE_THRESHOLD),
        })
    }

    /// Compute breakdowns for every dimension present in the table, in parallel.
    pub fn compute_all_breakdowns(df: &DataFrame, config: &AnalysisConfig) -> Vec<Breakdown> {
        Dimension::ALL
            .par_iter()
            .filter_map(|&dimension| match Self::compute_breakdown(df, dimension, config) {
                Ok(breakdown) => Some(breakdown),
                Err(e) => {
                    log::warn!("Skipping {:?} breakdown: {}", dimension, e);
                    None
                }
            })
            .collect()
    }

    pub fn sort_categories(counts: &mut [CategoryCount], order: CategoryOrder) {
        match order {
            CategoryOrder::Numeric => counts.sort_by(|a, b| natural_cmp(&a.label, &b.label)),
            CategoryOrder::Weekday => counts.sort_by(|a, b| {
                weekday_rank(&a.label)
                    .cmp(&weekday_rank(&b.label))
                    .then_with(|| natural_cmp(&a.label, &b.label))
            }),
            CategoryOrder::CountDescending => counts.sort_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| a.label.cmp(&b.label))
            }),
        }
    }

    /// Chi-square goodness-of-fit against equal counts in every category.
    ///
    /// Returns `(statistic, p_value)`, or `None` with fewer than two
    /// categories or no observations.
    pub fn uniformity_test(observed: &[usize]) -> Option<(f64, f64)> {
        let k = observed.len();
        let total: usize = observed.iter().sum();
        if k < 2 || total == 0 {
            return None;
        }

        let expected = total as f64 / k as f64;
        let stat = observed
            .iter()
            .map(|&o| (o as f64 - expected).powi(2) / expected)
            .sum::<f64>();

        let dist = ChiSquared::new((k - 1) as f64).ok()?;
        let p_value = (1.0 - dist.cdf(stat)).clamp(0.0, 1.0);
        Some((stat, p_value))
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(column: &str, values: &[f64]) -> ColumnSummary {
        let n = values.len();
        if n == 0 {
            return ColumnSummary {
                column: column.to_string(),
                count: 0,
                mean: f64::NAN,
                median: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
                p05: f64::NAN,
                p95: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        ColumnSummary {
            column: column.to_string(),
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for every numeric column of the cleaned table.
    pub fn summarize_numeric(df: &DataFrame) -> PolarsResult<Vec<ColumnSummary>> {
        numeric_columns(df)
            .iter()
            .map(|name| {
                let floats = df.column(name)?.cast(&DataType::Float64)?;
                let values: Vec<f64> = floats.f64()?.into_iter().flatten().collect();
                Ok(Self::compute_descriptive_stats(name, &values))
            })
            .collect()
    }
}

/// Format a number without a trailing `.0` when it is whole.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Name for a whole-number day code, 1-based into `names`.
fn day_name(label: &str, names: &[String]) -> Option<String> {
    let code = label.trim().parse::<f64>().ok()?;
    if code.fract() != 0.0 || code < 1.0 {
        return None;
    }
    names.get(code as usize - 1).cloned()
}

fn weekday_rank(label: &str) -> usize {
    let lower = label.trim().to_lowercase();
    WEEKDAYS
        .iter()
        .position(|d| *d == lower)
        .unwrap_or(WEEKDAYS.len())
}

/// Numbers before text; numbers by value, text lexically.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Hour".into(), [14.0f64, 9.0, 14.0, 11.5, 9.0]),
            Column::new(
                "Day_of_Week".into(),
                ["Sunday", "Monday", "Friday", "Monday", "Unknown"],
            ),
            Column::new("Accident_Severity".into(), [3i64, 1, 3, 2, 3]),
            Column::new(
                "Weather_Conditions".into(),
                ["Raining", "Fine", "Fine", "Snowing", "Raining"],
            ),
            Column::new("Latitude".into(), [51.5f64, 51.6, 51.7, 51.8, 51.9]),
        ])
        .unwrap()
    }

    fn labels(b: &Breakdown) -> Vec<&str> {
        b.counts.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn hour_breakdown_is_numeric_order() {
        let cols = AnalysisConfig::default();
        let b = StatsCalculator::compute_breakdown(&cleaned_frame(), Dimension::Hour, &cols).unwrap();

        assert_eq!(labels(&b), vec!["9", "11.5", "14"]);
        assert_eq!(b.counts[0].count, 2);
        assert_eq!(b.total, 5);
        assert_eq!(b.max_count(), 2);
    }

    #[test]
    fn weekday_order() {
        let cols = AnalysisConfig::default();
        let b = StatsCalculator::compute_breakdown(&cleaned_frame(), Dimension::DayOfWeek, &cols)
            .unwrap();
        assert_eq!(labels(&b), vec!["Monday", "Friday", "Sunday", "Unknown"]);
    }

    #[test]
    fn day_codes_are_named() {
        let df = DataFrame::new(vec![Column::new(
            "Day_of_Week".into(),
            [7i64, 1, 2, 1, 9],
        )])
        .unwrap();
        let cfg = AnalysisConfig::default();
        let b = StatsCalculator::compute_breakdown(&df, Dimension::DayOfWeek, &cfg).unwrap();

        assert_eq!(labels(&b), vec!["Monday", "Tuesday", "Sunday", "9"]);
        assert_eq!(b.counts[0].count, 2);
    }

    #[test]
    fn weather_by_frequency() {
        let cols = AnalysisConfig::default();
        let b = StatsCalculator::compute_breakdown(&cleaned_frame(), Dimension::Weather, &cols)
            .unwrap();
        assert_eq!(labels(&b), vec!["Fine", "Raining", "Snowing"]);
    }

    #[test]
    fn missing_dimension_is_skipped() {
        let cols = AnalysisConfig::default();
        let all = StatsCalculator::compute_all_breakdowns(&cleaned_frame(), &cols);
        let dims: Vec<Dimension> = all.iter().map(|b| b.dimension).collect();
        assert_eq!(dims.len(), 4);
        assert!(!dims.contains(&Dimension::RoadSurface));
    }

    #[test]
    fn uniformity() {
        let (stat, p) = StatsCalculator::uniformity_test(&[10, 10, 10]).unwrap();
        assert_eq!(stat, 0.0);
        assert!((p - 1.0).abs() < 1e-9);

        let (_, p) = StatsCalculator::uniformity_test(&[100, 5, 5]).unwrap();
        assert!(p < SIGNIFICANCE_THRESHOLD);

        assert!(StatsCalculator::uniformity_test(&[7]).is_none());
        assert!(StatsCalculator::uniformity_test(&[]).is_none());
    }

    #[test]
    fn descriptive_stats() {
        let s = StatsCalculator::compute_descriptive_stats("x", &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!((s.p95 - 3.85).abs() < 1e-9);
    }

    #[test]
    fn summaries_cover_numeric_columns() {
        let summaries = StatsCalculator::summarize_numeric(&cleaned_frame()).unwrap();
        let names: Vec<&str> = summaries.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["Hour", "Accident_Severity", "Latitude"]);
    }

    #[test]
    fn number_labels() {
        assert_eq!(format_number(14.0), "14");
        assert_eq!(format_number(13.5), "13.5");
        assert_eq!(format_number(-2.0), "-2");
    }
}
