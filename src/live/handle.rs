//! Async driver for [`LiveFeed`]: a tokio task publishing snapshots on a watch channel

use super::feed::LiveFeed;
use crate::inputs::LiveDataOverlay;
use log::debug;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Shortest tick period the feed task accepts
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy)]
enum Command {
    Trigger,
    SetConnected(bool),
    Reset,
}

/// Control side of a running feed; dropping it stops the task
#[derive(Debug)]
pub struct FeedHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<LiveDataOverlay>,
    task: JoinHandle<()>,
}

impl LiveFeed {
    /// Run the feed on a tokio task, ticking every `period` while connected
    ///
    /// Must be called from within a tokio runtime. The first tick happens one
    /// full period after spawning. Periods below [`MIN_TICK_PERIOD`] are
    /// raised to it.
    pub fn spawn(self, period: Duration) -> FeedHandle {
        let period = period.max(MIN_TICK_PERIOD);
        let (tx, rx) = watch::channel(self.snapshot());
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_feed(self, period, tx, command_rx));

        FeedHandle {
            commands,
            snapshots: rx,
            task,
        }
    }
}

async fn run_feed(
    mut feed: LiveFeed,
    period: Duration,
    tx: watch::Sender<LiveDataOverlay>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let snapshot = tokio::select! {
            _ = ticker.tick() => {
                if !feed.is_connected() {
                    continue;
                }
                feed.tick()
            }
            command = commands.recv() => match command {
                Some(Command::Trigger) => feed.tick(),
                Some(Command::SetConnected(connected)) => feed.set_connected(connected),
                Some(Command::Reset) => feed.reset(),
                None => break,
            },
        };
        tx.send_replace(snapshot);
    }
    debug!("live feed task finished");
}

impl FeedHandle {
    /// New receiver; its first value is the current snapshot
    pub fn subscribe(&self) -> watch::Receiver<LiveDataOverlay> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> LiveDataOverlay {
        *self.snapshots.borrow()
    }

    /// Force one update, even while disconnected
    pub fn trigger(&self) {
        self.send(Command::Trigger);
    }

    pub fn set_connected(&self, connected: bool) {
        self.send(Command::SetConnected(connected));
    }

    pub fn reset(&self) {
        self.send(Command::Reset);
    }

    pub fn stop(self) {
        drop(self);
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("live feed already stopped, dropping {command:?}");
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
