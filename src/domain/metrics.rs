//! Descriptive statistics over a simulation report, for display.

use chrono::NaiveDateTime;

use super::simulator::{EquityPoint, Fill, Side, SimulationReport};

/// An entry matched with its exit (strategy or forced).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub forced: bool,
}

impl RoundTrip {
    pub fn return_pct(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub round_trips: Vec<RoundTrip>,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
}

impl Metrics {
    pub fn compute(report: &SimulationReport) -> Self {
        let round_trips = pair_fills(&report.fills, report.forced_exit.as_ref());
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&report.equity_curve);

        let trades_won = round_trips.iter().filter(|t| t.exit_price > t.entry_price).count();
        let trades_lost = round_trips.iter().filter(|t| t.exit_price < t.entry_price).count();
        let win_rate = if round_trips.is_empty() {
            0.0
        } else {
            trades_won as f64 / round_trips.len() as f64
        };

        Self {
            max_drawdown,
            max_drawdown_duration,
            round_trips,
            trades_won,
            trades_lost,
            win_rate,
        }
    }
}

fn pair_fills(fills: &[Fill], forced_exit: Option<&Fill>) -> Vec<RoundTrip> {
    let mut trips = Vec::new();
    let mut open: Option<&Fill> = None;

    for fill in fills {
        match (fill.side, open) {
            (Side::Buy, None) => open = Some(fill),
            (Side::Sell, Some(entry)) => {
                trips.push(RoundTrip {
                    entry_time: entry.timestamp,
                    exit_time: fill.timestamp,
                    entry_price: entry.price,
                    exit_price: fill.price,
                    forced: false,
                });
                open = None;
            }
            _ => {}
        }
    }

    if let (Some(entry), Some(exit)) = (open, forced_exit) {
        trips.push(RoundTrip {
            entry_time: entry.timestamp,
            exit_time: exit.timestamp,
            entry_price: entry.price,
            exit_price: exit.price,
            forced: true,
        });
    }

    trips
}

/// Largest peak-to-trough decline as a fraction of the peak, and the longest
/// run of bars spent below a prior peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut current_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            current_duration += 1;
            max_duration = max_duration.max(current_duration);
        }
    }

    (max_dd, max_duration)
}
