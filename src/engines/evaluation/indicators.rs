use crate::error::Result;
use polars::prelude::*;

fn window_options(period: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: period,
        min_periods: period,
        ..Default::default()
    }
}

fn frame(closes: &[f64]) -> Result<DataFrame> {
    Ok(df! { "close" => closes }?)
}

fn extract(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

/// Simple moving average; `None` until the window is full
pub fn sma(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let out = frame(closes)?
        .lazy()
        .select([col("close").rolling_mean(window_options(period)).alias("sma")])
        .collect()?;
    extract(&out, "sma")
}

/// Rolling mean and sample standard deviation over the same window
pub fn rolling_mean_std(
    closes: &[f64],
    period: usize,
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>)> {
    let out = frame(closes)?
        .lazy()
        .select([
            col("close").rolling_mean(window_options(period)).alias("mean"),
            col("close").rolling_std(window_options(period)).alias("std"),
        ])
        .collect()?;
    Ok((extract(&out, "mean")?, extract(&out, "std")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_warmup_and_values() {
        let values = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_relative_eq!(values[2].unwrap(), 2.0);
        assert_relative_eq!(values[4].unwrap(), 4.0);
    }

    #[test]
    fn test_rolling_std_of_constant_is_zero() {
        let (mean, std) = rolling_mean_std(&[5.0; 6], 4).unwrap();
        assert_relative_eq!(mean[5].unwrap(), 5.0);
        assert_relative_eq!(std[5].unwrap(), 0.0);
        assert_eq!(std[2], None);
    }
}
