//! Position ledger: cash, open positions, trade execution, and equity
//! history.
//!
//! One ledger instance owns its own price cache and is mutated only by the
//! engine's daily step. At most one position per instrument; longs and
//! shorts never coexist. Failed operations (cash shortfall, missing price,
//! conflicting position) are logged no-ops, not errors.

use crate::domain::position::{Position, SHARE_EPSILON, Side, Transaction, TransactionKind};
use crate::domain::price_resolver::PriceResolver;
use crate::ports::data_port::DataPort;
use crate::ports::log_port::LogPort;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

pub struct PositionLedger<'a> {
    pub cash: f64,
    pub initial_cash: f64,
    pub positions: HashMap<String, Position>,
    pub transactions: Vec<Transaction>,
    pub history: Vec<EquityPoint>,
    resolver: PriceResolver<'a>,
    logger: &'a dyn LogPort,
}

impl<'a> PositionLedger<'a> {
    pub fn new(
        initial_cash: f64,
        data_port: &'a dyn DataPort,
        logger: &'a dyn LogPort,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        PositionLedger {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
            transactions: Vec::new(),
            history: Vec::new(),
            resolver: PriceResolver::new(data_port, logger, start_date, end_date),
            logger,
        }
    }

    pub fn has_position(&self, ticker: &str) -> bool {
        self.positions.contains_key(ticker)
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    /// As-of price via the ledger's cache. Exposed so the engine can probe
    /// tradability (benchmark buy-in) with the same cache the ledger uses.
    pub fn resolve_price(&mut self, ticker: &str, date: NaiveDate) -> Option<f64> {
        self.resolver.resolve(ticker, date)
    }

    fn valid_price(&mut self, ticker: &str, date: NaiveDate, action: &str) -> Option<f64> {
        match self.resolver.resolve(ticker, date) {
            Some(price) if price > 0.0 => Some(price),
            _ => {
                self.logger.log(&format!(
                    "No valid price for {ticker} on {date} to {action}"
                ));
                None
            }
        }
    }

    fn record_transaction(
        &mut self,
        date: NaiveDate,
        kind: TransactionKind,
        ticker: &str,
        shares: f64,
        price: f64,
    ) {
        self.logger.log(&format!(
            "TRANSACTION: {date} {kind} {shares:.4} {ticker} @ {price:.4}"
        ));
        self.transactions.push(Transaction {
            date,
            kind,
            ticker: ticker.to_string(),
            shares,
            price,
        });
    }

    /// Opens a new long or merges into an existing one at the
    /// weighted-average entry price. Refused when cash is short, the price
    /// is unavailable, or a short is open for the instrument.
    pub fn open_long(&mut self, ticker: &str, amount: f64, date: NaiveDate) -> bool {
        if self.cash < amount {
            self.logger.log(&format!(
                "Not enough cash to open long {ticker}: have {:.2}, need {amount:.2}",
                self.cash
            ));
            return false;
        }

        let Some(price) = self.valid_price(ticker, date, "open long") else {
            return false;
        };

        let shares = amount / price;
        let cost = shares * price;

        match self.positions.get_mut(ticker) {
            Some(pos) if pos.is_long() => {
                let held_cost = pos.shares * pos.entry_price;
                pos.shares += shares;
                pos.entry_price = (held_cost + cost) / pos.shares;
                pos.entry_date = date;
                self.logger.log(&format!(
                    "Added to long {ticker}: {shares:.4} shares at {price:.4}, new avg entry {:.4}",
                    pos.entry_price
                ));
            }
            Some(_) => {
                self.logger.log(&format!(
                    "Cannot open long {ticker}: short position exists, cover it first"
                ));
                return false;
            }
            None => {
                self.positions.insert(
                    ticker.to_string(),
                    Position {
                        ticker: ticker.to_string(),
                        side: Side::Long,
                        shares,
                        entry_price: price,
                        entry_date: date,
                    },
                );
                self.logger.log(&format!(
                    "Opened long {ticker}: {shares:.4} shares at {price:.4}"
                ));
            }
        }

        self.cash -= cost;
        self.record_transaction(date, TransactionKind::OpenLong, ticker, shares, price);
        true
    }

    /// Closes a long, fully by default or partially via `shares`. The
    /// position is deleted once remaining shares are negligible.
    pub fn close_long(&mut self, ticker: &str, date: NaiveDate, shares: Option<f64>) -> bool {
        if !self.positions.get(ticker).is_some_and(Position::is_long) {
            self.logger
                .log(&format!("No long position in {ticker} to close"));
            return false;
        }

        let Some(price) = self.valid_price(ticker, date, "close long") else {
            return false;
        };

        let held = self.positions[ticker].shares;
        let sold = match shares {
            Some(requested) if requested < held => requested,
            _ => held,
        };

        if sold >= held {
            self.positions.remove(ticker);
            self.logger.log(&format!(
                "Closed long {ticker}: sold {sold:.4} shares at {price:.4}"
            ));
        } else if let Some(pos) = self.positions.get_mut(ticker) {
            pos.shares -= sold;
            let remaining = pos.shares;
            self.logger.log(&format!(
                "Partially closed long {ticker}: sold {sold:.4} at {price:.4}, {remaining:.4} remaining"
            ));
            if remaining <= SHARE_EPSILON {
                self.positions.remove(ticker);
                self.logger
                    .log(&format!("Remaining shares for {ticker} negligible, position closed"));
            }
        }

        self.cash += sold * price;
        self.record_transaction(date, TransactionKind::CloseLong, ticker, sold, price);
        true
    }

    /// Opens a short with the given notional. Proceeds are credited to cash;
    /// no margin is checked or reserved. Refused when any position already
    /// exists for the instrument.
    pub fn open_short(&mut self, ticker: &str, notional: f64, date: NaiveDate) -> bool {
        if self.has_position(ticker) {
            self.logger.log(&format!(
                "Cannot open short {ticker}: position already exists, close it first"
            ));
            return false;
        }

        let Some(price) = self.valid_price(ticker, date, "open short") else {
            return false;
        };

        let shares = notional / price;
        let proceeds = shares * price;

        self.positions.insert(
            ticker.to_string(),
            Position {
                ticker: ticker.to_string(),
                side: Side::Short,
                shares,
                entry_price: price,
                entry_date: date,
            },
        );
        self.cash += proceeds;
        self.logger.log(&format!(
            "Opened short {ticker}: {shares:.4} shares at {price:.4}, cash {:.2}",
            self.cash
        ));
        self.record_transaction(date, TransactionKind::OpenShort, ticker, shares, price);
        true
    }

    /// Buys back a short, fully by default or partially via `shares`.
    pub fn cover_short(&mut self, ticker: &str, date: NaiveDate, shares: Option<f64>) -> bool {
        if !self.positions.get(ticker).is_some_and(Position::is_short) {
            self.logger
                .log(&format!("No short position in {ticker} to cover"));
            return false;
        }

        let Some(price) = self.valid_price(ticker, date, "cover short") else {
            return false;
        };

        let held = self.positions[ticker].shares;
        let covered = match shares {
            Some(requested) if requested < held => requested,
            _ => held,
        };

        if covered >= held {
            self.positions.remove(ticker);
            self.logger.log(&format!(
                "Covered short {ticker}: bought back {covered:.4} shares at {price:.4}"
            ));
        } else if let Some(pos) = self.positions.get_mut(ticker) {
            pos.shares -= covered;
            let remaining = pos.shares;
            self.logger.log(&format!(
                "Partially covered short {ticker}: bought back {covered:.4} at {price:.4}, {remaining:.4} remaining"
            ));
            if remaining <= SHARE_EPSILON {
                self.positions.remove(ticker);
                self.logger
                    .log(&format!("Remaining short for {ticker} negligible, position covered"));
            }
        }

        self.cash -= covered * price;
        self.record_transaction(date, TransactionKind::CoverShort, ticker, covered, price);
        true
    }

    /// Mark-to-market value: cash plus every position valued at the latest
    /// available price. When no price resolves for an instrument its entry
    /// price substitutes and a warning is logged.
    pub fn calculate_total_value(&mut self, date: NaiveDate) -> f64 {
        let mut total = self.cash;
        let tickers: Vec<String> = self.positions.keys().cloned().collect();
        for ticker in tickers {
            let resolved = self.resolver.resolve(&ticker, date);
            let pos = &self.positions[&ticker];
            let price = match resolved {
                Some(p) => p,
                None => {
                    self.logger.log(&format!(
                        "Warning: no price for {ticker} on {date}, valuing at entry price"
                    ));
                    pos.entry_price
                }
            };
            total += pos.market_value(price);
        }
        total
    }

    /// Appends a `(date, total_value)` snapshot. Repeated calls for the same
    /// date append again; duplicates are retained.
    pub fn record_portfolio_value(&mut self, date: NaiveDate) {
        let value = self.calculate_total_value(date);
        self.history.push(EquityPoint { date, value });
    }
}
