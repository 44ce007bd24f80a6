use std::fs;
use tempfile::TempDir;
use tradevolve::config::{AlgorithmConfig, ConfigManager};
use tradevolve::engines::evaluation::StrategyKind;
use tradevolve::engines::metrics::FitnessMetric;
use tradevolve::engines::optimization::{FitnessDirection, ParameterKind};

const FULL_TOML: &str = r#"
[optimizer]
population_size = 24
max_iterations = 50
max_stagnation = 10
stagnation_epsilon = 0.001
time_budget_secs = 30.0
random_seed = 99
fitness_direction = "maximize"
concurrency_limit = 2

[optimizer.algorithm]
kind = "swarm"
inertia_weight = 0.6

[[optimizer.bounds]]
name = "lookback"
min = 5.0
max = 100.0
kind = "integer"

[[optimizer.bounds]]
name = "entry_z"
min = 0.5
max = 3.0

[[optimizer.bounds]]
name = "exit_z"
min = 0.0
max = 1.5

[backtesting]
initial_capital = 50000.0
commission = 0.002
fitness_metric = "sharpe_ratio"

[strategy]
kind = "mean_reversion"
timeframes = [1, 4]

[data]
symbol = "BTCUSD"
data_dir = "prices"
start = "2024-01-01T00:00:00Z"
"#;

fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_load_full_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "run.toml", FULL_TOML);

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.optimizer.population_size, 24);
    assert_eq!(config.optimizer.max_iterations, 50);
    assert_eq!(config.optimizer.max_stagnation, Some(10));
    assert_eq!(config.optimizer.random_seed, Some(99));
    assert_eq!(config.optimizer.fitness_direction, FitnessDirection::Maximize);
    assert_eq!(config.optimizer.bounds.len(), 3);
    assert_eq!(config.optimizer.bounds[0].kind, ParameterKind::Integer);
    assert_eq!(config.optimizer.bounds[1].kind, ParameterKind::Real);

    match config.optimizer.algorithm {
        AlgorithmConfig::Swarm {
            inertia_weight,
            cognitive_coefficient,
            ..
        } => {
            assert_eq!(inertia_weight, 0.6);
            assert_eq!(cognitive_coefficient, 1.5);
        }
        other => panic!("expected swarm, got {:?}", other),
    }

    let criteria = config.optimizer.termination_criteria();
    assert_eq!(criteria.time_budget.map(|d| d.as_secs()), Some(30));

    assert_eq!(config.backtesting.initial_capital, 50000.0);
    assert_eq!(config.backtesting.fitness_metric, FitnessMetric::SharpeRatio);
    // Unset fields keep their defaults
    assert_eq!(config.backtesting.position_fraction, 0.1);

    assert_eq!(config.strategy.kind, StrategyKind::MeanReversion);
    assert_eq!(config.strategy.timeframes, vec![1, 4]);
    assert_eq!(config.data.symbol, "BTCUSD");
    assert!(config.data.start.is_some());
    assert!(config.data.end.is_none());
}

#[test]
fn test_minimal_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "min.toml", "[data]\nsymbol = \"ETH\"\n");

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.optimizer.population_size, 30);
    assert_eq!(config.optimizer.max_iterations, 100);
    assert_eq!(config.optimizer.algorithm, AlgorithmConfig::genetic());
    assert_eq!(config.strategy.kind, StrategyKind::MovingAverageCrossover);
    assert_eq!(config.data.min_rows, 2);
}

#[test]
fn test_missing_symbol_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "nosym.toml", "[optimizer]\npopulation_size = 10\n");

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    // The previous configuration is kept
    assert_eq!(manager.get().optimizer.population_size, 30);
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let cases = [
        "[optimizer]\npopulation_size = 0\n",
        "[optimizer]\nmax_iterations = 0\n",
        "[optimizer.algorithm]\nkind = \"genetic\"\nmutation_rate = 1.5\n",
        "[optimizer.algorithm]\nkind = \"annealing\"\ncooling_rate = 1.2\n",
        "[optimizer.algorithm]\nkind = \"genetic\"\n[optimizer.algorithm.replacement]\npolicy = \"elitist\"\ncount = 40\n",
        "[backtesting]\ncommission = -0.1\n",
        "[strategy]\ntimeframes = [0]\n",
        "[[optimizer.bounds]]\nname = \"x\"\nmin = 5.0\nmax = 1.0\n",
        "[[optimizer.bounds]]\nname = \"x\"\nmin = -1e308\nmax = 1e308\n",
        "[optimizer]\ntime_budget_secs = 1e20\n",
    ];

    for (i, body) in cases.iter().enumerate() {
        let path = write(
            &dir,
            &format!("bad{}.toml", i),
            &format!("{}\n[data]\nsymbol = \"BTC\"\n", body),
        );
        assert!(
            ConfigManager::new().load_from_file(&path).is_err(),
            "case {} should fail:\n{}",
            i,
            body
        );
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(ConfigManager::new()
        .load_from_file(dir.path().join("absent.toml"))
        .is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "run.toml", FULL_TOML);
    let manager = ConfigManager::new();
    manager.load_from_file(&source).unwrap();

    let saved = dir.path().join("saved.toml");
    manager.save_to_file(&saved).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&saved).unwrap();

    let before = manager.get();
    let after = reloaded.get();
    assert_eq!(after.optimizer.algorithm, before.optimizer.algorithm);
    assert_eq!(after.optimizer.bounds, before.optimizer.bounds);
    assert_eq!(after.optimizer.population_size, before.optimizer.population_size);
    assert_eq!(after.strategy.timeframes, before.strategy.timeframes);
    assert_eq!(after.data.start, before.data.start);
}

#[test]
fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "run.json",
        r#"{
            "optimizer": {
                "population_size": 16,
                "fitness_direction": "minimize",
                "algorithm": { "kind": "annealing", "cooling_rate": 0.9 }
            },
            "backtesting": { "fitness_metric": "max_drawdown_pct" },
            "data": { "symbol": "SPY" }
        }"#,
    );

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.optimizer.population_size, 16);
    assert_eq!(config.optimizer.fitness_direction, FitnessDirection::Minimize);
    assert!(matches!(
        config.optimizer.algorithm,
        AlgorithmConfig::Annealing { cooling_rate, .. } if cooling_rate == 0.9
    ));
    assert_eq!(config.backtesting.fitness_metric, FitnessMetric::MaxDrawdownPct);
}

#[test]
fn test_update_validates_before_commit() {
    let manager = ConfigManager::new();
    manager
        .update(|config| config.data.symbol = "BTC".to_string())
        .unwrap();

    let result = manager.update(|config| config.optimizer.population_size = 0);
    assert!(result.is_err());
    assert_eq!(manager.get().optimizer.population_size, 30);
    assert_eq!(manager.get().data.symbol, "BTC");
}
