pub mod engine;
pub mod profitability;
pub mod risk;

pub use engine::{FitnessMetric, MetricsEngine};
pub use profitability::ProfitabilityMetrics;
pub use risk::RiskMetrics;
