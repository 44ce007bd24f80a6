use approx::assert_relative_eq;
use tradevolve::engines::evaluation::{Portfolio, PortfolioSettings};
use tradevolve::types::{Direction, ExitReason};

#[test]
fn test_unrealized_pnl_long_position() {
    let mut portfolio = Portfolio::new(10000.0);

    // With 10% of capital ($1000) at $50/share, we buy 20 shares.
    portfolio.open_position(0, Direction::Long, 50.0).unwrap();

    // Price increases to $55
    portfolio.calculate_unrealized_pnl(55.0);

    // Unrealized P&L should be (55-50) * 20 = $100
    assert_eq!(portfolio.unrealized_pnl, 100.0);
    assert_eq!(portfolio.total_pnl, 100.0);
}

#[test]
fn test_equity_marks_open_long_to_market() {
    let mut portfolio = Portfolio::new(10000.0);

    // Buy 20 shares at $50 (costs $1000)
    portfolio.open_position(0, Direction::Long, 50.0).unwrap();

    // Price increases to $60
    portfolio.calculate_unrealized_pnl(60.0);

    // $9000 cash + 20 * $60 position value = $10200
    assert_eq!(portfolio.cash, 9000.0);
    assert_eq!(portfolio.equity(), 10200.0);
}

#[test]
fn test_equity_short_position() {
    let mut portfolio = Portfolio::new(10000.0);

    // Short 10 shares at $100, receiving $1000
    portfolio.process_bar(0, -1.0, 100.0).unwrap();

    // Price decreases to $90: liability is 10 * 90 = 900
    portfolio.process_bar(1, -1.0, 90.0).unwrap();

    assert_eq!(portfolio.cash, 11000.0);
    assert_eq!(portfolio.equity(), 10100.0);
    // Cash minus the 10 * 90 buy-back liability
    assert_eq!(portfolio.cash - 900.0, portfolio.equity());
}

#[test]
fn test_equity_curve_tracks_unrealized_losses() {
    let mut portfolio = Portfolio::new(10000.0);

    // Buy 10 shares at $100 (costs $1000)
    portfolio.process_bar(0, 1.0, 100.0).unwrap();

    // Price drops to $80 while still long
    portfolio.process_bar(1, 1.0, 80.0).unwrap();

    // Unrealized loss: (80-100) * 10 = -$200
    assert_eq!(portfolio.unrealized_pnl, -200.0);
    assert_eq!(portfolio.get_equity_curve(), &[10000.0, 10000.0, 9800.0]);
}

#[test]
fn test_close_position_updates_pnl() {
    let mut portfolio = Portfolio::new(10000.0);

    // Buy 10 shares at $100
    portfolio.open_position(0, Direction::Long, 100.0).unwrap();

    // Close position at $110
    portfolio.close_position(1, 110.0, ExitReason::Signal).unwrap();

    // Realized P&L should be (110 - 100) * 10 = $100
    assert_eq!(portfolio.realized_pnl, 100.0);
    assert_eq!(portfolio.cash, 10100.0);
}

#[test]
fn test_flat_target_closes_position() {
    let mut portfolio = Portfolio::new(10000.0);

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.process_bar(1, 0.0, 105.0).unwrap();

    let trades = portfolio.get_trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].direction, Direction::Long);
    assert_eq!(trades[0].exit_bar, 1);
    assert!(portfolio.position.is_none());
}

#[test]
fn test_reversal_opens_opposite_position() {
    let mut portfolio = Portfolio::new(10000.0);

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.process_bar(1, -1.0, 110.0).unwrap();

    let trades = portfolio.get_trades();
    assert_eq!(trades.len(), 1);
    assert!(trades[0].profit > 0.0);
    assert_eq!(
        portfolio.position.as_ref().map(|p| p.direction),
        Some(Direction::Short)
    );
}

#[test]
fn test_short_disabled_stays_flat() {
    let mut portfolio = Portfolio::with_settings(PortfolioSettings {
        allow_short: false,
        ..Default::default()
    });

    portfolio.process_bar(0, -1.0, 100.0).unwrap();
    portfolio.process_bar(1, 1.0, 100.0).unwrap();
    portfolio.process_bar(2, -1.0, 90.0).unwrap();

    let trades = portfolio.get_trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].direction, Direction::Long);
    assert!(portfolio.position.is_none());
}

#[test]
fn test_commission_reduces_profit() {
    let mut portfolio = Portfolio::with_settings(PortfolioSettings {
        commission: 0.001,
        ..Default::default()
    });

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.process_bar(1, 0.0, 110.0).unwrap();

    // Gross 100, fees 1.0 on entry and 1.1 on exit
    let trade = &portfolio.get_trades()[0];
    assert_relative_eq!(trade.fees, 2.1, epsilon = 1e-9);
    assert_relative_eq!(trade.profit, 97.9, epsilon = 1e-9);
    assert_relative_eq!(portfolio.cash, 10097.9, epsilon = 1e-9);
    assert_relative_eq!(portfolio.equity(), portfolio.cash, epsilon = 1e-9);
}

#[test]
fn test_slippage_worsens_fills() {
    let mut portfolio = Portfolio::with_settings(PortfolioSettings {
        slippage: 0.01,
        ..Default::default()
    });

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.process_bar(1, 0.0, 110.0).unwrap();

    let trade = &portfolio.get_trades()[0];
    assert_relative_eq!(trade.entry_price, 101.0, epsilon = 1e-9);
    assert_relative_eq!(trade.exit_price, 108.9, epsilon = 1e-9);
    assert!(trade.profit < 100.0);
}

#[test]
fn test_finish_closes_at_end_of_data() {
    let mut portfolio = Portfolio::new(10000.0);

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.finish(1, 120.0).unwrap();

    let trades = portfolio.get_trades();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].exit_reason, ExitReason::EndOfData);
    assert_eq!(portfolio.get_equity_curve().last().copied(), Some(10200.0));
}

#[test]
fn test_finish_rewrites_last_equity_net_of_fees() {
    let mut portfolio = Portfolio::with_settings(PortfolioSettings {
        commission: 0.001,
        ..Default::default()
    });

    portfolio.process_bar(0, 1.0, 100.0).unwrap();
    portfolio.process_bar(1, 1.0, 120.0).unwrap();
    portfolio.finish(1, 120.0).unwrap();

    // Gross 200, fees 1.0 on entry and 1.2 on exit
    let curve = portfolio.get_equity_curve();
    assert_eq!(curve.len(), 3);
    assert_relative_eq!(curve[2], 10197.8, epsilon = 1e-9);
    assert_relative_eq!(curve[2], portfolio.cash, epsilon = 1e-9);
    assert!(portfolio.position.is_none());
}

#[test]
fn test_finish_without_position_keeps_curve() {
    let mut portfolio = Portfolio::new(10000.0);

    portfolio.process_bar(0, 0.0, 100.0).unwrap();
    portfolio.finish(0, 100.0).unwrap();

    assert!(portfolio.get_trades().is_empty());
    assert_eq!(portfolio.get_equity_curve(), &[10000.0, 10000.0]);
}

#[test]
fn test_invalid_price_is_rejected() {
    let mut portfolio = Portfolio::new(10000.0);
    let err = portfolio.process_bar(0, 1.0, f64::NAN).unwrap_err();
    assert!(err.is_recoverable());
}
