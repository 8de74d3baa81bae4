//! Trade directive synthesis.
//!
//! Discretizes the seasonality and momentum indicator series against their
//! thresholds, combines them under a strict-agreement rule (both must point
//! the same way, anything else is Hold), and suppresses chatter with a
//! cooldown window after every fired directive.

use crate::domain::series::SeriesPoint;
use crate::domain::signal::{Directive, MomentumSignal};
use crate::ports::log_port::LogPort;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisParams {
    /// Seasonality value above which the seasonal leg votes Buy.
    pub buy_threshold: f64,
    /// Seasonality value below which the seasonal leg votes Sell.
    pub sell_threshold: f64,
    /// Calendar days after a fired directive during which everything is
    /// forced to Hold.
    pub cooldown_days: i64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        SynthesisParams {
            buy_threshold: 0.0001,
            sell_threshold: -0.0001,
            cooldown_days: 5,
        }
    }
}

/// Builds the daily directive series over `calendar`.
///
/// The momentum series is reindexed to the calendar by carrying the last
/// observation forward, back-filling the first observation over leading
/// dates; with no momentum at all every date reads Neutral. Seasonality
/// values missing for a calendar date read as 0.
pub fn synthesize(
    calendar: &[NaiveDate],
    seasonality: &[SeriesPoint],
    momentum: &[(NaiveDate, MomentumSignal)],
    params: &SynthesisParams,
    logger: &dyn LogPort,
) -> Vec<(NaiveDate, Directive)> {
    let seasonality_by_date: HashMap<NaiveDate, f64> =
        seasonality.iter().map(|p| (p.date, p.value)).collect();

    let mut directives = Vec::with_capacity(calendar.len());
    let mut last_fired: Option<NaiveDate> = None;
    let mut buys = 0usize;
    let mut sells = 0usize;

    for &date in calendar {
        let season_value = seasonality_by_date.get(&date).copied().unwrap_or(0.0);
        let season_vote = discretize_seasonality(season_value, params);
        let momentum_vote = discretize_momentum(momentum_at(momentum, date));
        let combined = combine(season_vote, momentum_vote);

        let in_cooldown = last_fired
            .map(|fired| (date - fired).num_days() <= params.cooldown_days)
            .unwrap_or(false);

        let directive = if in_cooldown { Directive::Hold } else { combined };
        if directive.is_active() {
            last_fired = Some(date);
            match directive {
                Directive::Buy => buys += 1,
                Directive::Sell => sells += 1,
                Directive::Hold => {}
            }
        }
        directives.push((date, directive));
    }

    logger.log(&format!(
        "Synthesized {} directives: {} buy, {} sell, {} hold",
        directives.len(),
        buys,
        sells,
        directives.len() - buys - sells,
    ));

    directives
}

fn discretize_seasonality(value: f64, params: &SynthesisParams) -> Directive {
    if value > params.buy_threshold {
        Directive::Buy
    } else if value < params.sell_threshold {
        Directive::Sell
    } else {
        Directive::Hold
    }
}

fn discretize_momentum(signal: MomentumSignal) -> Directive {
    match signal {
        MomentumSignal::Long => Directive::Buy,
        MomentumSignal::Short => Directive::Sell,
        MomentumSignal::Neutral => Directive::Hold,
    }
}

/// Both legs must agree; a single directional vote is not enough.
fn combine(season: Directive, momentum: Directive) -> Directive {
    match (season, momentum) {
        (Directive::Buy, Directive::Buy) => Directive::Buy,
        (Directive::Sell, Directive::Sell) => Directive::Sell,
        _ => Directive::Hold,
    }
}

/// Momentum value for `date`: forward-fill, with the first observation
/// back-filled over leading dates. Neutral when the series is empty.
fn momentum_at(momentum: &[(NaiveDate, MomentumSignal)], date: NaiveDate) -> MomentumSignal {
    if momentum.is_empty() {
        return MomentumSignal::Neutral;
    }
    let upto = momentum.partition_point(|&(d, _)| d <= date);
    if upto == 0 {
        momentum[0].1
    } else {
        momentum[upto - 1].1
    }
}
