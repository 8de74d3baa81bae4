//! Decision-log port trait.
//!
//! The simulation narrates data loads, signal distributions, trades, and
//! valuation fallbacks through this sink. Hosts inject an implementation
//! (console, collecting buffer, UI channel) instead of the components
//! sharing a global callback.

pub trait LogPort {
    fn log(&self, line: &str);
}

/// Sink that drops everything; for callers that do not want the narration.
pub struct NullLog;

impl LogPort for NullLog {
    fn log(&self, _line: &str) {}
}
