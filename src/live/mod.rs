//! Simulated live revenue/expense feed
//!
//! [`LiveFeed`] is a plain value that produces immutable [`LiveDataOverlay`]
//! snapshots. [`LiveFeed::spawn`] runs it on a tokio timer and hands back a
//! [`FeedHandle`] for subscribing and control.
//!
//! [`LiveDataOverlay`]: crate::inputs::LiveDataOverlay

mod feed;
mod handle;

pub use feed::{LiveFeed, UpdateKind, EXPENSES_DELTA_RANGE, REVENUE_MULTIPLIER_RANGE};
pub use handle::{FeedHandle, MIN_TICK_PERIOD};
