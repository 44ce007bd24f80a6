use crate::error::{Result, TradevolveError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    #[default]
    Real,
    Integer,
}

/// Admissible range of one strategy parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub kind: ParameterKind,
}

impl ParameterBounds {
    pub fn real(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            kind: ParameterKind::Real,
        }
    }

    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            name: name.into(),
            min: min as f64,
            max: max as f64,
            kind: ParameterKind::Integer,
        }
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(TradevolveError::Configuration(format!(
                "Bounds of '{}' must be finite",
                self.name
            )));
        }
        if !self.range().is_finite() {
            return Err(TradevolveError::Configuration(format!(
                "Range of '{}' overflows: [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(TradevolveError::Configuration(format!(
                "Invalid bounds for '{}': min ({}) must be below max ({})",
                self.name, self.min, self.max
            )));
        }
        if self.kind == ParameterKind::Integer && self.min.ceil() > self.max.floor() {
            return Err(TradevolveError::Configuration(format!(
                "Integer parameter '{}' has no integer inside [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        Ok(())
    }

    /// Clamp into range; integers are rounded, NaN maps to `min`
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.lower();
        }
        match self.kind {
            ParameterKind::Real => value.clamp(self.min, self.max),
            ParameterKind::Integer => value.round().clamp(self.lower(), self.upper()),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let in_range = value >= self.min && value <= self.max;
        match self.kind {
            ParameterKind::Real => in_range,
            ParameterKind::Integer => in_range && value.fract() == 0.0,
        }
    }

    /// Uniform draw; integers are uniform over the inclusive integer range
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match self.kind {
            ParameterKind::Real => rng.gen_range(self.min..=self.max),
            ParameterKind::Integer => {
                rng.gen_range(self.lower() as i64..=self.upper() as i64) as f64
            }
        }
    }

    fn lower(&self) -> f64 {
        match self.kind {
            ParameterKind::Real => self.min,
            ParameterKind::Integer => self.min.ceil(),
        }
    }

    fn upper(&self) -> f64 {
        match self.kind {
            ParameterKind::Real => self.max,
            ParameterKind::Integer => self.max.floor(),
        }
    }
}

/// Immutable, ordered parameter values.
///
/// There is no mutable access; variation operators always build a fresh
/// vector through [`ParameterSchema::clamp_to_bounds`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector(Vec<f64>);

impl ParameterVector {
    /// Wrap raw values without bounds checks
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.clone()
    }

    /// Signature used to deduplicate vectors
    pub fn signature(&self) -> String {
        self.0
            .iter()
            .map(|v| format!("{:.6}", v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Index<usize> for ParameterVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Ordered parameter declarations of a strategy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    parameters: Vec<ParameterBounds>,
}

impl ParameterSchema {
    pub fn new(parameters: Vec<ParameterBounds>) -> Result<Self> {
        if parameters.is_empty() {
            return Err(TradevolveError::Configuration(
                "Parameter schema must declare at least one parameter".to_string(),
            ));
        }
        for bounds in &parameters {
            bounds.validate()?;
        }
        Ok(Self { parameters })
    }

    pub fn parameters(&self) -> &[ParameterBounds] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// Schema with one more parameter appended
    pub fn with_parameter(&self, bounds: ParameterBounds) -> Result<Self> {
        let mut parameters = self.parameters.clone();
        parameters.push(bounds);
        Self::new(parameters)
    }

    /// Component-wise clamp into bounds.
    ///
    /// Missing trailing components are filled with the lower bound and extra
    /// ones are dropped, so the result always has the schema's length.
    pub fn clamp_to_bounds(&self, values: &[f64]) -> ParameterVector {
        ParameterVector(
            self.parameters
                .iter()
                .enumerate()
                .map(|(i, bounds)| bounds.clamp(values.get(i).copied().unwrap_or(f64::NAN)))
                .collect(),
        )
    }

    pub fn contains(&self, vector: &ParameterVector) -> bool {
        vector.len() == self.len()
            && self
                .parameters
                .iter()
                .zip(vector.iter())
                .all(|(bounds, &value)| bounds.contains(value))
    }

    /// Uniform random vector within bounds
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ParameterVector {
        ParameterVector(self.parameters.iter().map(|b| b.sample(rng)).collect())
    }

    /// Parameter names paired with values
    pub fn label(&self, vector: &ParameterVector) -> Vec<(String, f64)> {
        self.parameters
            .iter()
            .zip(vector.iter())
            .map(|(bounds, &value)| (bounds.name.clone(), value))
            .collect()
    }
}
