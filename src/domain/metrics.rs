//! Equity-curve summary statistics.

use crate::domain::portfolio::EquityPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_value: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn compute(history: &[EquityPoint], initial_cash: f64) -> Self {
        let final_value = history.last().map(|p| p.value).unwrap_or(initial_cash);

        let total_return = if initial_cash > 0.0 {
            (final_value - initial_cash) / initial_cash
        } else {
            0.0
        };

        let years = history.len() as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        Metrics {
            final_value,
            total_return,
            annualized_return,
            max_drawdown: compute_max_drawdown(history),
        }
    }
}

fn compute_max_drawdown(history: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for point in history {
        if point.value > peak {
            peak = point.value;
        } else if peak > 0.0 {
            let dd = (peak - point.value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
