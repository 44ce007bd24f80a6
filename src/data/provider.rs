use crate::data::{connectors::CsvConnector, series::PriceSeries};
use crate::error::{Result, TradevolveError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;

/// Source of historical bars consumed by the optimizer
pub trait HistoricalDataProvider {
    /// Chronologically sorted bars for `symbol` within `[start, end]`
    fn get_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries>;
}

/// Reads `<root>/<symbol>.csv`
pub struct CsvDataProvider {
    root: PathBuf,
    min_rows: usize,
}

impl CsvDataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_rows: 1,
        }
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{}.csv", symbol))
    }
}

impl HistoricalDataProvider for CsvDataProvider {
    fn get_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        if start > end {
            return Err(TradevolveError::DataLoading(format!(
                "Start {} is after end {}",
                start, end
            )));
        }

        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(TradevolveError::DataLoading(format!(
                "No data file for {} at {}",
                symbol,
                path.display()
            )));
        }

        let mut points = CsvConnector::load_points(&path, self.min_rows)?;
        points.retain(|p| p.timestamp >= start && p.timestamp <= end);
        // Files are not required to be sorted on disk
        points.sort_by_key(|p| p.timestamp);
        log::info!("Loaded {} bars of {} from {}", points.len(), symbol, path.display());

        PriceSeries::new(symbol, points)
    }
}

/// Provider over series already held in memory
#[derive(Default)]
pub struct InMemoryDataProvider {
    series: HashMap<String, PriceSeries>,
}

impl InMemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }
}

impl HistoricalDataProvider for InMemoryDataProvider {
    fn get_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let series = self.series.get(symbol).ok_or_else(|| {
            TradevolveError::DataLoading(format!("Unknown symbol {}", symbol))
        })?;
        series.between(start, end)
    }
}
