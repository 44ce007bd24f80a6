use super::traits::ConfigSection;
use crate::error::{Result, TradevolveError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub symbol: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_min_rows() -> usize {
    2
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            data_dir: default_data_dir(),
            start: None,
            end: None,
            min_rows: default_min_rows(),
        }
    }
}

impl DataConfig {
    /// Requested range, open ends widened to the full timeline
    pub fn range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start.unwrap_or(DateTime::<Utc>::MIN_UTC),
            self.end.unwrap_or(DateTime::<Utc>::MAX_UTC),
        )
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(TradevolveError::Configuration(
                "data.symbol is required".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(TradevolveError::Configuration(format!(
                    "data.start ({}) is after data.end ({})",
                    start, end
                )));
            }
        }
        Ok(())
    }
}
