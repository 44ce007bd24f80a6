/// OHLCV columns every price file must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Accepted names for the bar timestamp column
pub const TIMESTAMP_ALIASES: [&str; 8] = [
    "timestamp", "Timestamp", "date", "Date", "datetime", "DateTime", "time", "Time",
];

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    pub fn all() -> [Self; 5] {
        [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume]
    }

    /// Common alternative column names
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Open => &["open", "Open", "OPEN", "o"],
            Self::High => &["high", "High", "HIGH", "h"],
            Self::Low => &["low", "Low", "LOW", "l"],
            Self::Close => &["close", "Close", "CLOSE", "c"],
            Self::Volume => &["volume", "Volume", "VOLUME", "vol", "Vol", "v"],
        }
    }
}
