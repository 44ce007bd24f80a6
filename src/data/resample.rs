use crate::data::series::PriceSeries;
use crate::error::{Result, TradevolveError};
use crate::types::PricePoint;

/// Aggregate every `factor` consecutive bars into one OHLCV bar.
///
/// The bar keeps the first timestamp and open, the last close, the extreme
/// high/low and the summed volume. A trailing partial bucket is kept.
pub fn downsample(series: &PriceSeries, factor: usize) -> Result<PriceSeries> {
    if factor == 0 {
        return Err(TradevolveError::Configuration(
            "Downsampling factor must be at least 1".to_string(),
        ));
    }
    if factor == 1 {
        return Ok(series.clone());
    }

    let points: Vec<PricePoint> = series
        .points()
        .chunks(factor)
        .map(|bucket| {
            let first = bucket[0];
            let last = bucket[bucket.len() - 1];
            PricePoint {
                timestamp: first.timestamp,
                open: first.open,
                high: bucket.iter().map(|p| p.high).fold(f64::MIN, f64::max),
                low: bucket.iter().map(|p| p.low).fold(f64::MAX, f64::min),
                close: last.close,
                volume: bucket.iter().map(|p| p.volume).sum(),
            }
        })
        .collect();

    PriceSeries::new(series.symbol().to_string(), points)
}
