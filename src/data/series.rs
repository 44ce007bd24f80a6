use crate::data::connectors::DataValidator;
use crate::error::{Result, TradevolveError};
use crate::types::PricePoint;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A stretch of the series where bars are missing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesGap {
    /// Index of the bar right after the gap
    pub index: usize,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Chronologically ordered, non-empty price history for one symbol.
///
/// The series is read-only once built; evaluation workers borrow it
/// concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
    gaps: Vec<SeriesGap>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(TradevolveError::DataLoading(format!(
                "Series for {} is empty",
                symbol
            )));
        }
        DataValidator::validate_chronological(&points)?;
        let gaps = DataValidator::detect_gaps(&points);
        if !gaps.is_empty() {
            log::warn!("{}: {} gap(s) detected in price history", symbol, gaps.len());
        }

        Ok(Self {
            symbol,
            points,
            gaps,
        })
    }

    /// Build a series of flat bars from closing prices spaced `step` apart
    pub fn from_closes(
        symbol: impl Into<String>,
        start: DateTime<Utc>,
        step: Duration,
        closes: &[f64],
    ) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let timestamp = i32::try_from(i)
                    .ok()
                    .and_then(|i| step.checked_mul(i))
                    .and_then(|offset| start.checked_add_signed(offset))
                    .ok_or_else(|| {
                        TradevolveError::DataLoading(format!(
                            "Timestamp of bar {} overflows from {} in steps of {}",
                            i, start, step
                        ))
                    })?;
                Ok(PricePoint::flat(timestamp, close))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn gaps(&self) -> &[SeriesGap] {
        &self.gaps
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.points[0].timestamp
    }

    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.points[self.points.len() - 1].timestamp
    }

    /// Sub-series with timestamps in `[start, end]`
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let points: Vec<PricePoint> = self
            .points
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .copied()
            .collect();
        if points.is_empty() {
            return Err(TradevolveError::DataLoading(format!(
                "No {} bars between {} and {}",
                self.symbol, start, end
            )));
        }
        Self::new(self.symbol.clone(), points)
    }

    /// Key identifying this series for memoization
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.symbol,
            self.points.len(),
            self.first_timestamp().timestamp(),
            self.last_timestamp().timestamp()
        )
    }
}
