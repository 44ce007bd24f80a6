use super::columns::RequiredColumn;
use crate::data::series::SeriesGap;
use crate::error::{Result, TradevolveError};
use crate::types::PricePoint;
use polars::prelude::*;
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Map each OHLCV column to the name actually used in the frame
    pub fn validate_ohlcv(df: &DataFrame) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in RequiredColumn::all() {
            let Some(name) = Self::find_column(df, required.aliases()) else {
                return Err(TradevolveError::DataLoading(format!(
                    "Missing required column: {} (tried aliases: {:?})",
                    required.as_str(),
                    required.aliases()
                )));
            };

            let dtype = df.column(name)?.dtype().clone();
            if !matches!(
                dtype,
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(TradevolveError::DataLoading(format!(
                    "Column '{}' ({}) must be numeric, found {:?}",
                    name,
                    required.as_str(),
                    dtype
                )));
            }
            column_map.insert(required, name.to_string());
        }

        Ok(column_map)
    }

    /// First alias present in the frame
    pub fn find_column<'a>(df: &DataFrame, aliases: &[&'a str]) -> Option<&'a str> {
        let columns = df.get_column_names();
        aliases
            .iter()
            .find(|alias| columns.iter().any(|col| col.as_str() == **alias))
            .copied()
    }

    /// High must bound open/close from above and low from below
    pub fn validate_bar(index: usize, bar: &PricePoint) -> Result<()> {
        if bar.high < bar.low {
            return Err(TradevolveError::DataLoading(format!(
                "Invalid data at row {}: high ({}) < low ({})",
                index, bar.high, bar.low
            )));
        }
        if bar.high < bar.open || bar.high < bar.close {
            return Err(TradevolveError::DataLoading(format!(
                "Invalid data at row {}: high ({}) < open ({}) or close ({})",
                index, bar.high, bar.open, bar.close
            )));
        }
        if bar.low > bar.open || bar.low > bar.close {
            return Err(TradevolveError::DataLoading(format!(
                "Invalid data at row {}: low ({}) > open ({}) or close ({})",
                index, bar.low, bar.open, bar.close
            )));
        }
        Ok(())
    }

    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(TradevolveError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Columns with null values and their counts
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let null_count = df.column(col_name)?.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }

    /// Timestamps must be strictly increasing
    pub fn validate_chronological(points: &[PricePoint]) -> Result<()> {
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(TradevolveError::DataLoading(format!(
                    "Series not chronologically ordered at row {}: {} follows {}",
                    i + 1,
                    pair[1].timestamp,
                    pair[0].timestamp
                )));
            }
        }
        Ok(())
    }

    /// Spacings wider than twice the median spacing
    pub fn detect_gaps(points: &[PricePoint]) -> Vec<SeriesGap> {
        if points.len() < 3 {
            return Vec::new();
        }

        let mut spacings: Vec<i64> = points
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_seconds())
            .collect();
        spacings.sort_unstable();
        let median = spacings[spacings.len() / 2];
        if median <= 0 {
            return Vec::new();
        }

        points
            .windows(2)
            .enumerate()
            .filter(|(_, w)| (w[1].timestamp - w[0].timestamp).num_seconds() > 2 * median)
            .map(|(i, w)| SeriesGap {
                index: i + 1,
                from: w[0].timestamp,
                to: w[1].timestamp,
            })
            .collect()
    }
}
