use crate::data::{resample::downsample, series::PriceSeries};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Memoizes downsampled copies of a series, keyed by series fingerprint and factor.
///
/// Shared by evaluation workers; the lock is only held for lookups and inserts.
pub struct SeriesCache {
    data: Mutex<HashMap<(String, usize), Arc<PriceSeries>>>,
    capacity: usize,
}

impl SeriesCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn get(&self, series: &PriceSeries, factor: usize) -> Option<Arc<PriceSeries>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&(series.fingerprint(), factor)).cloned()
    }

    /// Downsampled series, computed on first request
    pub fn get_or_downsample(&self, series: &PriceSeries, factor: usize) -> Result<Arc<PriceSeries>> {
        if let Some(cached) = self.get(series, factor) {
            return Ok(cached);
        }

        let resampled = Arc::new(downsample(series, factor)?);
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        if data.len() >= self.capacity {
            // Clear everything when full
            data.clear();
        }
        data.insert((series.fingerprint(), factor), Arc::clone(&resampled));
        Ok(resampled)
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_cache_reuses_downsampled_series() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let series =
            PriceSeries::from_closes("SOL", start, Duration::hours(1), &[1.0, 2.0, 3.0, 4.0])
                .unwrap();
        let cache = SeriesCache::new(4);

        let first = cache.get_or_downsample(&series, 2).unwrap();
        let second = cache.get_or_downsample(&series, 2).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
