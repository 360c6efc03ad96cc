//! Random-walk generator for the simulated live revenue/expense feed

use crate::inputs::LiveDataOverlay;
use chrono::Utc;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Bounds of the revenue multiplier walk
pub const REVENUE_MULTIPLIER_RANGE: (f64, f64) = (0.8, 1.2);

/// Bounds of the expenses delta walk
pub const EXPENSES_DELTA_RANGE: (f64, f64) = (-50_000.0, 100_000.0);

/// Kind of change produced by one step of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Revenue drift with a slight upward bias
    Revenue,
    /// Expense drift with a slight upward bias
    Expenses,
    /// Smaller unbiased revenue move
    Market,
}

/// Owns the walk state and its RNG; every step yields a fresh snapshot
///
/// The feed starts connected. Nothing here is shared: the async side moves
/// the feed into its task (see [`LiveFeed::spawn`](super::LiveFeed::spawn)).
#[derive(Debug, Clone)]
pub struct LiveFeed {
    state: LiveDataOverlay,
    rng: StdRng,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveFeed {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible feed for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: LiveDataOverlay {
                is_connected: true,
                last_update: Some(Utc::now()),
                ..Default::default()
            },
            rng,
        }
    }

    pub fn snapshot(&self) -> LiveDataOverlay {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected
    }

    pub fn set_connected(&mut self, connected: bool) -> LiveDataOverlay {
        if self.state.is_connected != connected {
            info!("live feed {}", if connected { "connected" } else { "disconnected" });
        }
        self.state.is_connected = connected;
        self.state
    }

    /// Back to multiplier 1.0, no delta and zero updates; connection is kept
    pub fn reset(&mut self) -> LiveDataOverlay {
        self.state = LiveDataOverlay {
            is_connected: self.state.is_connected,
            last_update: Some(Utc::now()),
            ..Default::default()
        };
        self.state
    }

    /// One random-walk step, applied whether or not the feed is connected
    pub fn tick(&mut self) -> LiveDataOverlay {
        let kind = match self.rng.gen_range(0..3) {
            0 => UpdateKind::Revenue,
            1 => UpdateKind::Expenses,
            _ => UpdateKind::Market,
        };
        self.apply(kind)
    }

    /// Apply a step of the given kind
    pub fn apply(&mut self, kind: UpdateKind) -> LiveDataOverlay {
        let r: f64 = self.rng.gen();
        let (lo_mult, hi_mult) = REVENUE_MULTIPLIER_RANGE;
        let (lo_delta, hi_delta) = EXPENSES_DELTA_RANGE;

        match kind {
            UpdateKind::Revenue => {
                self.state.revenue_multiplier =
                    (self.state.revenue_multiplier + (r - 0.4) * 0.13).clamp(lo_mult, hi_mult);
            }
            UpdateKind::Expenses => {
                self.state.expenses_delta =
                    (self.state.expenses_delta + (r - 0.3) * 35_000.0).clamp(lo_delta, hi_delta);
            }
            UpdateKind::Market => {
                self.state.revenue_multiplier =
                    (self.state.revenue_multiplier + (r - 0.5) * 0.06).clamp(lo_mult, hi_mult);
            }
        }

        self.state.update_count += 1;
        self.state.last_update = Some(Utc::now());

        debug!(
            "live feed {:?} update #{}: multiplier {:.3}, delta {:.0}",
            kind, self.state.update_count, self.state.revenue_multiplier, self.state.expenses_delta
        );
        self.state
    }

    /// Tick period: `interval` plus a random share of `jitter`
    pub fn sample_period(&mut self, interval: Duration, jitter: Duration) -> Duration {
        interval + jitter.mul_f64(self.rng.gen::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feed_is_connected_baseline() {
        let feed = LiveFeed::seeded(1);
        let snapshot = feed.snapshot();
        assert!(snapshot.is_connected);
        assert_eq!(snapshot.revenue_multiplier, 1.0);
        assert_eq!(snapshot.expenses_delta, 0.0);
        assert_eq!(snapshot.update_count, 0);
    }

    #[test]
    fn test_walk_stays_in_bounds() {
        let mut feed = LiveFeed::seeded(42);
        for i in 1..=10_000u32 {
            let snapshot = feed.tick();
            assert_eq!(snapshot.update_count, i);
            assert!((0.8..=1.2).contains(&snapshot.revenue_multiplier));
            assert!((-50_000.0..=100_000.0).contains(&snapshot.expenses_delta));
        }
    }

    #[test]
    fn test_step_kinds_touch_their_field_only() {
        let mut feed = LiveFeed::seeded(7);

        let after = feed.apply(UpdateKind::Expenses);
        assert_eq!(after.revenue_multiplier, 1.0);
        assert!(after.expenses_delta != 0.0);

        let delta = after.expenses_delta;
        let after = feed.apply(UpdateKind::Market);
        assert_eq!(after.expenses_delta, delta);
        assert_eq!(after.update_count, 2);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = LiveFeed::seeded(99);
        let mut b = LiveFeed::seeded(99);
        for _ in 0..50 {
            let (x, y) = (a.tick(), b.tick());
            assert_eq!(x.revenue_multiplier, y.revenue_multiplier);
            assert_eq!(x.expenses_delta, y.expenses_delta);
        }
    }

    #[test]
    fn test_reset_keeps_connection_state() {
        let mut feed = LiveFeed::seeded(3);
        feed.tick();
        feed.set_connected(false);

        let snapshot = feed.reset();
        assert!(!snapshot.is_connected);
        assert_eq!(snapshot.update_count, 0);
        assert_eq!(snapshot.revenue_multiplier, 1.0);
    }

    #[test]
    fn test_sample_period_within_jitter() {
        let mut feed = LiveFeed::seeded(5);
        let base = Duration::from_millis(15_000);
        let jitter = Duration::from_millis(15_000);
        for _ in 0..100 {
            let period = feed.sample_period(base, jitter);
            assert!(period >= base && period <= base + jitter);
        }
    }
}
