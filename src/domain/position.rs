//! Position and transaction records.

use chrono::NaiveDate;

/// Shares drop below this and the position is considered closed.
pub const SHARE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

/// One open position. Shares are stored as a positive count for both sides;
/// `side` carries the direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticker: String,
    pub side: Side,
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == Side::Short
    }

    /// Mark-to-market contribution of this position at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => self.shares * price,
            Side::Short => (self.entry_price - price) * self.shares,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    OpenLong,
    CloseLong,
    OpenShort,
    CoverShort,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::OpenLong => write!(f, "OPEN_LONG"),
            TransactionKind::CloseLong => write!(f, "CLOSE_LONG"),
            TransactionKind::OpenShort => write!(f, "OPEN_SHORT"),
            TransactionKind::CoverShort => write!(f, "COVER_SHORT"),
        }
    }
}

/// Immutable audit record of one executed trade operation. Not used in
/// valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub ticker: String,
    pub shares: f64,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_position() -> Position {
        Position {
            ticker: "EURUSD=X".into(),
            side: Side::Long,
            shares: 500.0,
            entry_price: 2.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn short_position() -> Position {
        Position {
            side: Side::Short,
            ..long_position()
        }
    }

    #[test]
    fn side_predicates() {
        assert!(long_position().is_long());
        assert!(!long_position().is_short());
        assert!(short_position().is_short());
    }

    #[test]
    fn long_market_value_tracks_price() {
        let pos = long_position();
        assert!((pos.market_value(2.5) - 1250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_market_value_is_entry_minus_current() {
        let pos = short_position();
        // Price fell: short gains.
        assert!((pos.market_value(1.5) - 250.0).abs() < f64::EPSILON);
        // Price rose: short loses.
        assert!((pos.market_value(2.5) - (-250.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn transaction_kind_display() {
        assert_eq!(TransactionKind::OpenLong.to_string(), "OPEN_LONG");
        assert_eq!(TransactionKind::CoverShort.to_string(), "COVER_SHORT");
    }
}
