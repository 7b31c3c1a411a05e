//! Data Processor Module
//! Cleans the raw accident table: column pruning, date/hour derivation,
//! imputation and coordinate validation.

use crate::config::AnalysisConfig;
use crate::data::loader::is_numeric_dtype;
use crate::data::parse::{parse_day_first_date, parse_hour, parse_number};
use chrono::Datelike;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// `num_days_from_ce` of 1970-01-01, the origin of Polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Required column '{0}' not found")]
    MissingColumn(String),
    #[error("Unparseable date '{value}' in row {row}")]
    InvalidDate { row: usize, value: String },
}

/// How a missing cell was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputeKind {
    Median,
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub kind: ImputeKind,
    pub count: usize,
    pub fill_value: String,
}

/// What the cleaning pass did to the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    pub rows_kept: usize,
    pub rows_without_coordinates: usize,
    pub dropped_columns: Vec<String>,
    pub missing_hours: usize,
    pub unparseable_coordinates: usize,
    pub imputations: Vec<Imputation>,
}

/// Cleaned table plus the record of how it was produced.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub df: DataFrame,
    pub report: CleaningReport,
}

/// Handles data cleaning operations.
pub struct DataProcessor<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DataProcessor<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run every cleaning step in order.
    ///
    /// Medians are taken after the hour is derived and before any row is
    /// removed; coordinate validation runs last.
    pub fn clean(&self, raw: DataFrame) -> Result<CleanedData, ProcessorError> {
        let mut report = CleaningReport {
            rows_loaded: raw.height(),
            ..Default::default()
        };

        let df = self.drop_irrelevant_columns(raw, &mut report)?;
        let df = self.parse_dates(df)?;
        let df = self.derive_hour(df, &mut report)?;
        let df = self.impute_numeric(df, &mut report)?;
        let df = self.impute_text(df, &mut report)?;
        let df = self.coerce_coordinates(df, &mut report)?;
        let df = self.drop_missing_coordinates(df, &mut report)?;

        report.rows_kept = df.height();
        log::info!(
            "Cleaning kept {} of {} rows ({} without coordinates)",
            report.rows_kept,
            report.rows_loaded,
            report.rows_without_coordinates
        );

        Ok(CleanedData { df, report })
    }

    fn require(&self, df: &DataFrame, name: &str) -> Result<(), ProcessorError> {
        if df.get_column_index(name).is_none() {
            return Err(ProcessorError::MissingColumn(name.to_string()));
        }
        Ok(())
    }

    /// Remove the configured irrelevant columns; ones not present are skipped.
    pub fn drop_irrelevant_columns(
        &self,
        mut df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        for name in &self.config.drop_columns {
            if df.get_column_index(name).is_some() {
                df = df.drop(name)?;
                report.dropped_columns.push(name.clone());
            } else {
                log::info!("Column '{}' not present, nothing to drop", name);
            }
        }
        Ok(df)
    }

    /// Replace the date column with a calendar date. Any present value that
    /// cannot be read day-first aborts the run.
    pub fn parse_dates(&self, mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        let name = self.config.columns.date.as_str();
        self.require(&df, name)?;

        let text = df.column(name)?.cast(&DataType::String)?;
        let mut days: Vec<Option<i32>> = Vec::with_capacity(df.height());
        for (row, value) in text.str()?.into_iter().enumerate() {
            let Some(value) = value else {
                days.push(None);
                continue;
            };
            let date = parse_day_first_date(value, &self.config.date_formats).ok_or_else(|| {
                ProcessorError::InvalidDate {
                    row,
                    value: value.to_string(),
                }
            })?;
            days.push(Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE));
        }

        let dates = Series::new(name.into(), days).cast(&DataType::Date)?;
        df.with_column(dates)?;
        Ok(df)
    }

    /// Derive the hour of day from the time column, then drop the time column.
    /// Unparseable times leave the hour missing.
    pub fn derive_hour(
        &self,
        df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        let time = self.config.columns.time.as_str();
        self.require(&df, time)?;

        let text = df.column(time)?.cast(&DataType::String)?;
        let hours: Vec<Option<i32>> = text
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| parse_hour(s, &self.config.time_format)).map(|h| h as i32))
            .collect();

        report.missing_hours = hours.iter().filter(|h| h.is_none()).count();
        if report.missing_hours > 0 {
            log::warn!(
                "{} rows have no usable time, hour will be imputed",
                report.missing_hours
            );
        }

        let mut df = df.drop(time)?;
        df.with_column(Column::new(self.config.columns.hour.as_str().into(), hours))?;
        Ok(df)
    }

    /// Fill missing numeric cells with the column median.
    ///
    /// Columns that need filling are widened to `Float64`, since a median
    /// of integers may be fractional.
    pub fn impute_numeric(
        &self,
        mut df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        let targets: Vec<(String, usize)> = df
            .get_columns()
            .iter()
            .filter(|c| is_numeric_dtype(c.dtype()) && c.null_count() > 0)
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        for (name, missing) in targets {
            let series = df.column(&name)?.as_materialized_series().cast(&DataType::Float64)?;
            let Some(median) = series.median() else {
                log::warn!("Column '{}' has no values, median undefined", name);
                continue;
            };

            let filled = series.f64()?.fill_null_with_values(median)?;
            df.with_column(filled.into_series())?;

            log::debug!("Filled {} missing '{}' with median {}", missing, name, median);
            report.imputations.push(Imputation {
                column: name,
                kind: ImputeKind::Median,
                count: missing,
                fill_value: median.to_string(),
            });
        }

        Ok(df)
    }

    /// Fill missing text cells with the sentinel.
    pub fn impute_text(
        &self,
        mut df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        let sentinel = self.config.missing_sentinel.as_str();
        let targets: Vec<(String, usize)> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::String && c.null_count() > 0)
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        for (name, missing) in targets {
            let values: Vec<&str> = df
                .column(&name)?
                .str()?
                .into_iter()
                .map(|v| v.unwrap_or(sentinel))
                .collect();
            let filled = Column::new(name.as_str().into(), values);
            df.with_column(filled)?;

            log::debug!("Filled {} missing '{}' with '{}'", missing, name, sentinel);
            report.imputations.push(Imputation {
                column: name,
                kind: ImputeKind::Sentinel,
                count: missing,
                fill_value: sentinel.to_string(),
            });
        }

        Ok(df)
    }

    /// Make latitude and longitude `Float64`; text that is not a number
    /// (including the sentinel) becomes missing.
    pub fn coerce_coordinates(
        &self,
        mut df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        for name in [&self.config.columns.latitude, &self.config.columns.longitude] {
            self.require(&df, name)?;
            let column = df.column(name)?;

            let coerced = if column.dtype() == &DataType::String {
                let text = column.str()?;
                let parsed: Vec<Option<f64>> =
                    text.into_iter().map(|v| v.and_then(parse_number)).collect();
                let lost = text
                    .into_iter()
                    .zip(parsed.iter())
                    .filter(|(raw, num)| raw.is_some() && num.is_none())
                    .count();
                report.unparseable_coordinates += lost;
                Column::new(name.as_str().into(), parsed)
            } else {
                column.cast(&DataType::Float64)?
            };

            df.with_column(coerced)?;
        }
        Ok(df)
    }

    /// Remove rows where either coordinate is missing.
    pub fn drop_missing_coordinates(
        &self,
        df: DataFrame,
        report: &mut CleaningReport,
    ) -> Result<DataFrame, ProcessorError> {
        let lat = df.column(&self.config.columns.latitude)?.as_materialized_series();
        let lon = df.column(&self.config.columns.longitude)?.as_materialized_series();
        let mask = &lat.is_not_null() & &lon.is_not_null();

        let kept = df.filter(&mask)?;
        report.rows_without_coordinates = df.height() - kept.height();
        if report.rows_without_coordinates > 0 {
            log::warn!(
                "Dropped {} rows without valid coordinates",
                report.rows_without_coordinates
            );
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Accident_Index".into(), ["A1", "A2", "A3", "A4"]),
            Column::new("Police_Force".into(), [1i64, 1, 2, 2]),
            Column::new(
                "Date".into(),
                [Some("04/01/2005"), Some("05/01/2005"), Some("06/01/2005"), None],
            ),
            Column::new("Time".into(), [Some("14:30"), Some(""), None, Some("08:10")]),
            Column::new("Number_of_Vehicles".into(), [Some(1i64), None, Some(3), Some(3)]),
            Column::new(
                "Weather_Conditions".into(),
                [Some("Fine"), None, Some("Raining"), Some("Fine")],
            ),
            Column::new(
                "Latitude".into(),
                [Some("51.5"), Some("abc"), Some("51.7"), None],
            ),
            Column::new("Longitude".into(), [Some(-0.1f64), Some(-0.2), None, Some(-0.4)]),
        ])
        .unwrap()
    }

    #[test]
    fn full_clean() {
        let config = AnalysisConfig::default();
        let cleaned = DataProcessor::new(&config).clean(raw_frame()).unwrap();
        let df = &cleaned.df;

        // Longitude was numeric: its missing value took the median, so only
        // the "abc" latitude and the missing latitude (sentinel) are dropped.
        assert_eq!(df.height(), 2);
        assert!(df.height() <= cleaned.report.rows_loaded);
        assert_eq!(cleaned.report.rows_without_coordinates, 2);
        assert!(df.column("Accident_Index").is_err());
        assert!(df.column("Police_Force").is_err());
        assert!(df.column("Time").is_err());
        assert_eq!(df.column("Date").unwrap().dtype(), &DataType::Date);

        for name in ["Latitude", "Longitude"] {
            let col = df.column(name).unwrap();
            assert_eq!(col.dtype(), &DataType::Float64);
            assert_eq!(col.null_count(), 0);
        }

        let lat: Vec<f64> = df.column("Latitude").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(lat, vec![51.5, 51.7]);

        let lon: Vec<f64> = df.column("Longitude").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(lon, vec![-0.1, -0.2]);
    }

    #[test]
    fn hour_is_derived_then_imputed() {
        let config = AnalysisConfig::default();
        let processor = DataProcessor::new(&config);
        let mut report = CleaningReport::default();

        let df = processor.derive_hour(raw_frame(), &mut report).unwrap();
        let hours: Vec<Option<i32>> = df.column("Hour").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(hours, vec![Some(14), None, None, Some(8)]);
        assert_eq!(report.missing_hours, 2);
        assert!(df.column("Time").is_err());

        let df = processor.impute_numeric(df, &mut report).unwrap();
        let hours: Vec<f64> = df.column("Hour").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(hours, vec![14.0, 11.0, 11.0, 8.0]);
    }

    #[test]
    fn numeric_median_fill() {
        let config = AnalysisConfig::default();
        let mut report = CleaningReport::default();
        let df = DataProcessor::new(&config)
            .impute_numeric(raw_frame(), &mut report)
            .unwrap();

        let vehicles: Vec<f64> = df
            .column("Number_of_Vehicles")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(vehicles, vec![1.0, 3.0, 3.0, 3.0]);

        // Columns without gaps keep their type
        assert_eq!(df.column("Police_Force").unwrap().dtype(), &DataType::Int64);

        let entry = report
            .imputations
            .iter()
            .find(|i| i.column == "Number_of_Vehicles")
            .unwrap();
        assert_eq!(entry.kind, ImputeKind::Median);
        assert_eq!(entry.count, 1);
        assert_eq!(entry.fill_value, "3");
    }

    #[test]
    fn median_of_one_and_three_is_two() {
        let config = AnalysisConfig::default();
        let mut report = CleaningReport::default();
        let df = DataFrame::new(vec![Column::new(
            "Speed_limit".into(),
            [Some(1i64), None, Some(3)],
        )])
        .unwrap();

        let df = DataProcessor::new(&config).impute_numeric(df, &mut report).unwrap();
        let values: Vec<f64> = df
            .column("Speed_limit")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn text_sentinel_fill() {
        let config = AnalysisConfig::default();
        let mut report = CleaningReport::default();
        let df = DataProcessor::new(&config)
            .impute_text(raw_frame(), &mut report)
            .unwrap();

        let weather: Vec<&str> = df
            .column("Weather_Conditions")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(weather, vec!["Fine", "Unknown", "Raining", "Fine"]);

        // Dates are still text at this point and get the sentinel too
        assert!(report.imputations.iter().all(|i| i.kind == ImputeKind::Sentinel));
        assert!(report.imputations.iter().all(|i| i.fill_value == "Unknown"));
    }

    #[test]
    fn malformed_date_is_fatal() {
        let config = AnalysisConfig::default();
        let df = DataFrame::new(vec![Column::new(
            "Date".into(),
            ["04/01/2005", "not a date"],
        )])
        .unwrap();

        let err = DataProcessor::new(&config).parse_dates(df).unwrap_err();
        match err {
            ProcessorError::InvalidDate { row, value } => {
                assert_eq!(row, 1);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_date_stays_missing() {
        let config = AnalysisConfig::default();
        let df = DataProcessor::new(&config).parse_dates(raw_frame()).unwrap();
        let dates = df.column("Date").unwrap();
        assert_eq!(dates.dtype(), &DataType::Date);
        assert_eq!(dates.null_count(), 1);
    }

    #[test]
    fn coordinates_are_coerced() {
        let config = AnalysisConfig::default();
        let mut report = CleaningReport::default();
        let df = DataProcessor::new(&config)
            .coerce_coordinates(raw_frame(), &mut report)
            .unwrap();

        let lat = df.column("Latitude").unwrap();
        assert_eq!(lat.dtype(), &DataType::Float64);
        assert_eq!(lat.null_count(), 2);
        assert_eq!(report.unparseable_coordinates, 1);
    }

    #[test]
    fn missing_required_column() {
        let config = AnalysisConfig::default();
        let df = DataFrame::new(vec![Column::new("Date".into(), ["04/01/2005"])]).unwrap();
        let err = DataProcessor::new(&config).clean(df).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(ref c) if c == "Time"));
    }

    #[test]
    fn absent_drop_columns_are_skipped() {
        let config = AnalysisConfig::default();
        let mut report = CleaningReport::default();
        let df = DataProcessor::new(&config)
            .drop_irrelevant_columns(raw_frame(), &mut report)
            .unwrap();

        assert_eq!(report.dropped_columns, vec!["Accident_Index", "Police_Force"]);
        assert_eq!(df.width(), 6);
    }
}
