//! CSV Data Loader Module
//! Reads the accident CSV with Polars and settles each column's kind.

use crate::config::AnalysisConfig;
use crate::data::parse::{is_integral, parse_number};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
}

/// Handles CSV file loading with Polars.
///
/// Every column is read as text first so that identifier codes such as
/// `200501BS00001` or `0123` never go through numeric coercion. Kinds are
/// then inferred per column, see [`DataLoader::infer_column_kinds`].
pub struct DataLoader<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DataLoader<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load a CSV file and return the typed raw table.
    pub fn load_csv(&self, file_path: &Path) -> Result<DataFrame, LoaderError> {
        if !file_path.exists() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        let null_values: Vec<PlSmallStr> = self
            .config
            .null_tokens
            .iter()
            .map(|t| t.as_str().into())
            .collect();

        // Schema inference length 0 reads every column as String
        let raw = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_null_values(Some(NullValues::AllColumns(null_values)))
            .finish()?
            .collect()?;

        log::info!(
            "Read {} rows, {} columns from {}",
            raw.height(),
            raw.width(),
            file_path.display()
        );

        Ok(self.infer_column_kinds(raw)?)
    }

    /// Turn an all-text frame into a typed one.
    ///
    /// A column becomes numeric when it has at least one value and every
    /// value parses as a number: `Int64` if all are whole, `Float64`
    /// otherwise. The identifier column always stays text. Blank header
    /// names are replaced with `Unnamed: {index}`, 0-based.
    pub fn infer_column_kinds(&self, raw: DataFrame) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(raw.width());

        for (idx, column) in raw.get_columns().iter().enumerate() {
            // Polars names blank headers `column_{n}`, 1-based
            let auto_name = format!("column_{}", idx + 1);
            let blank = column.name().trim().is_empty() || column.name().as_str() == auto_name;
            let name: PlSmallStr = if blank {
                format!("Unnamed: {idx}").into()
            } else {
                column.name().clone()
            };

            let series = column.as_materialized_series();
            if name.as_str() == self.config.columns.identifier || series.dtype() != &DataType::String
            {
                columns.push(series.clone().with_name(name).into());
                continue;
            }

            let values = series.str()?;
            let present: Vec<&str> = values.into_iter().flatten().collect();
            let numeric = !present.is_empty() && present.iter().all(|v| parse_number(v).is_some());

            if !numeric {
                columns.push(series.clone().with_name(name).into());
            } else if present.iter().all(|v| is_integral(v)) {
                let parsed: Vec<Option<i64>> = values
                    .into_iter()
                    .map(|v| v.and_then(|s| s.trim().parse::<i64>().ok()))
                    .collect();
                log::debug!("Column '{}' inferred as integer", name);
                columns.push(Column::new(name, parsed));
            } else {
                let parsed: Vec<Option<f64>> =
                    values.into_iter().map(|v| v.and_then(parse_number)).collect();
                log::debug!("Column '{}' inferred as float", name);
                columns.push(Column::new(name, parsed));
            }
        }

        DataFrame::new(columns)
    }
}

/// Names of the numeric columns of a frame.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of the text columns of a frame.
pub fn text_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String)
        .map(|col| col.name().to_string())
        .collect()
}

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn identifier_stays_text_and_kinds_are_inferred() {
        let file = write_csv(
            "Accident_Index,Accident_Severity,Latitude,Weather_Conditions\n\
             0012,3,51.5,Fine\n\
             0013,,51.6,\n\
             0014,1,abc,Raining\n",
        );
        let config = AnalysisConfig::default();
        let df = DataLoader::new(&config).load_csv(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("Accident_Index").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Accident_Severity").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Latitude").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Weather_Conditions").unwrap().dtype(), &DataType::String);

        let ids = df.column("Accident_Index").unwrap();
        assert_eq!(ids.str().unwrap().get(0), Some("0012"));
        assert_eq!(df.column("Accident_Severity").unwrap().null_count(), 1);
        assert_eq!(df.column("Weather_Conditions").unwrap().null_count(), 1);
    }

    #[test]
    fn null_tokens_and_floats() {
        let file = write_csv("Speed_limit,Longitude\n30,-0.12\nNA,0.5\n60,N/A\n");
        let config = AnalysisConfig::default();
        let df = DataLoader::new(&config).load_csv(file.path()).unwrap();

        assert_eq!(df.column("Speed_limit").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Speed_limit").unwrap().null_count(), 1);
        assert_eq!(df.column("Longitude").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Longitude").unwrap().null_count(), 1);
    }

    #[test]
    fn lowercase_na_marker_keeps_column_numeric() {
        let file = write_csv("Speed_limit,Junction_Detail\n30,<NA>\nn/a,1\n60,-nan\n");
        let config = AnalysisConfig::default();
        let df = DataLoader::new(&config).load_csv(file.path()).unwrap();

        assert_eq!(df.column("Speed_limit").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Speed_limit").unwrap().null_count(), 1);
        assert_eq!(df.column("Junction_Detail").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Junction_Detail").unwrap().null_count(), 2);
    }

    #[test]
    fn blank_header_becomes_unnamed() {
        let config = AnalysisConfig::default();
        let raw = DataFrame::new(vec![
            Column::new("".into(), ["0", "1"]),
            Column::new("Day_of_Week".into(), ["Monday", "Friday"]),
        ])
        .unwrap();

        let df = DataLoader::new(&config).infer_column_kinds(raw).unwrap();
        assert_eq!(numeric_columns(&df), vec!["Unnamed: 0".to_string()]);
        assert_eq!(text_columns(&df), vec!["Day_of_Week".to_string()]);
    }

    #[test]
    fn all_missing_column_is_text() {
        let config = AnalysisConfig::default();
        let raw = DataFrame::new(vec![Column::new(
            "Junction_Control".into(),
            [None::<&str>, None],
        )])
        .unwrap();

        let df = DataLoader::new(&config).infer_column_kinds(raw).unwrap();
        assert_eq!(df.column("Junction_Control").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn missing_file() {
        let config = AnalysisConfig::default();
        let err = DataLoader::new(&config)
            .load_csv(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }
}
