use super::{
    columns::{RequiredColumn, TIMESTAMP_ALIASES},
    validator::DataValidator,
};
use crate::error::{Result, TradevolveError};
use crate::types::PricePoint;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::path::Path;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TradevolveError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load a CSV file and convert it into validated bars
    pub fn load_points<P: AsRef<Path>>(path: P, min_rows: usize) -> Result<Vec<PricePoint>> {
        let df = Self::load(&path)?;
        DataValidator::validate_minimum_rows(&df, min_rows)?;

        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        Self::to_points(&df)
    }

    /// Convert an OHLCV frame with a timestamp column into bars.
    /// Rows with null prices are skipped.
    pub fn to_points(df: &DataFrame) -> Result<Vec<PricePoint>> {
        let column_map = DataValidator::validate_ohlcv(df)?;
        let timestamps = Self::timestamps(df)?;

        let numeric = |required: RequiredColumn| -> Result<Vec<Option<f64>>> {
            let column = df.column(&column_map[&required])?.cast(&DataType::Float64)?;
            Ok(column.f64()?.into_iter().collect())
        };
        let open = numeric(RequiredColumn::Open)?;
        let high = numeric(RequiredColumn::High)?;
        let low = numeric(RequiredColumn::Low)?;
        let close = numeric(RequiredColumn::Close)?;
        let volume = numeric(RequiredColumn::Volume)?;

        let mut points = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(timestamp), Some(o), Some(h), Some(l), Some(c)) =
                (timestamps[i], open[i], high[i], low[i], close[i])
            else {
                continue;
            };
            let point = PricePoint {
                timestamp,
                open: o,
                high: h,
                low: l,
                close: c,
                volume: volume[i].unwrap_or(0.0),
            };
            DataValidator::validate_bar(i, &point)?;
            points.push(point);
        }

        Ok(points)
    }

    fn timestamps(df: &DataFrame) -> Result<Vec<Option<DateTime<Utc>>>> {
        let name = DataValidator::find_column(df, &TIMESTAMP_ALIASES).ok_or_else(|| {
            TradevolveError::DataLoading(format!(
                "Missing timestamp column (tried aliases: {:?})",
                TIMESTAMP_ALIASES
            ))
        })?;
        let column = df.column(name)?;

        match column.dtype() {
            DataType::String => column
                .str()?
                .into_iter()
                .enumerate()
                .map(|(i, raw)| raw.map(|s| parse_timestamp(i, s)).transpose())
                .collect(),
            DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32 => {
                let seconds = column.cast(&DataType::Int64)?;
                Ok(seconds
                    .i64()?
                    .into_iter()
                    .map(|s| s.and_then(|s| DateTime::from_timestamp(s, 0)))
                    .collect())
            }
            other => Err(TradevolveError::DataLoading(format!(
                "Timestamp column '{}' has unsupported type {:?}",
                name, other
            ))),
        }
    }
}

/// RFC 3339, `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d`, interpreted as UTC
fn parse_timestamp(row: usize, raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts.and_utc());
        }
    }
    Err(TradevolveError::DataLoading(format!(
        "Unparseable timestamp '{}' at row {}",
        raw, row
    )))
}
