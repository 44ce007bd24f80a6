pub mod cache;
pub mod connectors;
pub mod provider;
pub mod resample;
pub mod series;

pub use cache::SeriesCache;
pub use connectors::{CsvConnector, DataValidator, RequiredColumn};
pub use provider::{CsvDataProvider, HistoricalDataProvider, InMemoryDataProvider};
pub use resample::downsample;
pub use series::{PriceSeries, SeriesGap};
