use crate::error::{Result, TradevolveError};
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<()>;
}

/// Reject values outside `[0, 1]`
pub(crate) fn ensure_unit_interval(section: &str, name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(TradevolveError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, name, value
        )));
    }
    Ok(())
}

/// Reject negative or non-finite values
pub(crate) fn ensure_non_negative(section: &str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TradevolveError::Configuration(format!(
            "{}.{} must be a non-negative number, got {}",
            section, name, value
        )));
    }
    Ok(())
}
