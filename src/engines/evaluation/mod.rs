pub mod backtester;
pub mod evaluator;
pub mod indicators;
pub mod portfolio;
pub mod strategies;

pub use backtester::Backtester;
pub use evaluator::{BacktestEvaluator, FnEvaluator, StrategyEvaluator};
pub use portfolio::{Portfolio, PortfolioSettings};
pub use strategies::{MeanReversion, MovingAverageCrossover, SignalStrategy, StrategyKind};
