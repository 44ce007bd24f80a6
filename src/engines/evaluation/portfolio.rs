use crate::{
    error::{Result, TradevolveError},
    types::{Direction, ExitReason, Trade},
};

/// Execution assumptions for a simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSettings {
    pub initial_capital: f64,
    /// Fee as a fraction of traded notional, charged on entry and exit
    pub commission: f64,
    /// Adverse price move applied to every fill, as a fraction of price
    pub slippage: f64,
    /// Share of available cash committed to each new position
    pub position_fraction: f64,
    pub allow_short: bool,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            initial_capital: 10000.0,
            commission: 0.0,
            slippage: 0.0,
            position_fraction: 0.1,
            allow_short: true,
        }
    }
}

pub struct Portfolio {
    pub settings: PortfolioSettings,
    pub cash: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,

    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_pnl: f64,
}

pub struct Position {
    pub direction: Direction,
    pub entry_bar: usize,
    pub entry_price: f64,
    pub size: f64,
    pub entry_fee: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self::with_settings(PortfolioSettings {
            initial_capital,
            ..Default::default()
        })
    }

    pub fn with_settings(settings: PortfolioSettings) -> Self {
        let initial_capital = settings.initial_capital;
        Self {
            settings,
            cash: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: vec![initial_capital],
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            total_pnl: 0.0,
        }
    }

    /// Move toward the target exposure for this bar: positive is long,
    /// negative is short (flat when shorting is disabled), zero is flat.
    pub fn process_bar(&mut self, bar: usize, target: f64, price: f64) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(TradevolveError::Evaluation(format!(
                "Invalid price {} at bar {}",
                price, bar
            )));
        }

        let desired = self.desired_direction(target);
        let current = self.position.as_ref().map(|p| p.direction);

        if current.is_some() && current != desired {
            self.close_position(bar, price, ExitReason::Signal)?;
        }
        if self.position.is_none() {
            if let Some(direction) = desired {
                self.open_position(bar, direction, price)?;
            }
        }

        self.calculate_unrealized_pnl(price);
        self.equity_curve.push(self.equity());

        Ok(())
    }

    fn desired_direction(&self, target: f64) -> Option<Direction> {
        if target > 0.0 {
            Some(Direction::Long)
        } else if target < 0.0 && self.settings.allow_short {
            Some(Direction::Short)
        } else {
            None
        }
    }

    /// Fill price after slippage; buying pays more, selling receives less
    fn fill_price(&self, price: f64, buying: bool) -> f64 {
        if buying {
            price * (1.0 + self.settings.slippage)
        } else {
            price * (1.0 - self.settings.slippage)
        }
    }

    pub fn open_position(&mut self, bar: usize, direction: Direction, price: f64) -> Result<()> {
        let fill = self.fill_price(price, direction == Direction::Long);
        let notional = self.cash.max(0.0) * self.settings.position_fraction;
        if notional <= 0.0 {
            return Ok(());
        }
        let quantity = notional / fill;
        let fee = notional * self.settings.commission;

        match direction {
            Direction::Long => self.cash -= notional + fee,
            Direction::Short => self.cash += notional - fee, // Add proceeds from short sale
        }

        self.position = Some(Position {
            direction,
            entry_bar: bar,
            entry_price: fill,
            size: quantity,
            entry_fee: fee,
        });

        Ok(())
    }

    pub fn close_position(&mut self, bar: usize, price: f64, reason: ExitReason) -> Result<()> {
        if let Some(pos) = self.position.take() {
            let fill = self.fill_price(price, pos.direction == Direction::Short);
            let notional = fill * pos.size;
            let exit_fee = notional * self.settings.commission;

            let gross = match pos.direction {
                Direction::Long => (fill - pos.entry_price) * pos.size,
                Direction::Short => (pos.entry_price - fill) * pos.size,
            };
            let fees = pos.entry_fee + exit_fee;
            let profit = gross - fees;

            match pos.direction {
                Direction::Long => self.cash += notional - exit_fee,
                Direction::Short => self.cash -= notional + exit_fee, // Deduct cost to buy back shares
            }
            self.realized_pnl += profit;

            self.trades.push(Trade {
                entry_bar: pos.entry_bar,
                exit_bar: bar,
                entry_price: pos.entry_price,
                exit_price: fill,
                direction: pos.direction,
                size: pos.size,
                profit,
                exit_reason: reason,
                fees,
            });
        }

        Ok(())
    }

    /// Close any open position on the last bar and record the final equity
    pub fn finish(&mut self, bar: usize, price: f64) -> Result<()> {
        if self.position.is_some() {
            self.close_position(bar, price, ExitReason::EndOfData)?;
            self.calculate_unrealized_pnl(price);
            let equity = self.equity();
            if let Some(last) = self.equity_curve.last_mut() {
                *last = equity;
            }
        }
        Ok(())
    }

    pub fn get_trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn get_equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    /// Calculate unrealized P&L for the open position, net of the entry fee.
    pub fn calculate_unrealized_pnl(&mut self, current_price: f64) {
        if let Some(position) = &self.position {
            let entry_value = position.size * position.entry_price;
            let current_value = position.size * current_price;

            let pnl = match position.direction {
                Direction::Long => current_value - entry_value,
                Direction::Short => entry_value - current_value,
            };

            self.unrealized_pnl = pnl - position.entry_fee;
        } else {
            self.unrealized_pnl = 0.0;
        }

        self.total_pnl = self.realized_pnl + self.unrealized_pnl;
    }

    /// Marked-to-market equity: initial capital plus realized and open P&L
    pub fn equity(&self) -> f64 {
        self.settings.initial_capital + self.total_pnl
    }
}
