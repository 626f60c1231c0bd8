//! Live update sessions
//!
//! A session moves `Initializing → Active → Terminated`. It publishes one
//! snapshot (or one error) on start, then polls the chain tip and publishes an
//! update whenever the tip rises above the last recorded height. A separate
//! timer emits keep-alives. Cancelling or dropping the subscription aborts
//! both timer tasks; a consumer that stops receiving ends the session too.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::LiveConfig;
use crate::scanner::SysScanner;
use crate::types::MatchResult;

const EVENT_BUFFER: usize = 16;

/// Events published to a live consumer
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Snapshot(Vec<MatchResult>),
    Update(Vec<MatchResult>),
    Error { message: String },
    KeepAlive,
}

impl LiveEvent {
    /// Event-stream event name
    pub fn name(&self) -> &'static str {
        match self {
            LiveEvent::Snapshot(_) => "snapshot",
            LiveEvent::Update(_) => "update",
            LiveEvent::Error { .. } => "error",
            LiveEvent::KeepAlive => "keepalive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Initializing,
    Active,
    Terminated,
}

/// Handle to a running live session
pub struct LiveSubscription {
    events: mpsc::Receiver<LiveEvent>,
    state: watch::Receiver<LiveState>,
    state_tx: Arc<watch::Sender<LiveState>>,
    poll_task: JoinHandle<()>,
    keepalive_task: JoinHandle<()>,
}

impl LiveSubscription {
    /// Next event; `None` once the session has terminated and drained
    pub async fn recv(&mut self) -> Option<LiveEvent> {
        self.events.recv().await
    }

    pub fn state(&self) -> LiveState {
        *self.state.borrow()
    }

    /// Stop both timers; no further events are published
    pub fn cancel(&mut self) {
        self.poll_task.abort();
        self.keepalive_task.abort();
        self.events.close();
        // Nothing buffered is delivered after termination
        while self.events.try_recv().is_ok() {}
        self.state_tx.send_replace(LiveState::Terminated);
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub(crate) fn subscribe(scanner: Arc<SysScanner>, config: &LiveConfig) -> LiveSubscription {
    let (events_tx, events) = mpsc::channel(EVENT_BUFFER);
    let (state_tx, state) = watch::channel(LiveState::Initializing);
    let state_tx = Arc::new(state_tx);

    let poll_task = tokio::spawn(run_poll_loop(
        scanner,
        events_tx.clone(),
        Arc::clone(&state_tx),
        config.poll_interval(),
    ));
    let keepalive_task = tokio::spawn(run_keepalive_loop(
        events_tx,
        state.clone(),
        config.keepalive_interval(),
    ));

    LiveSubscription {
        events,
        state,
        state_tx,
        poll_task,
        keepalive_task,
    }
}

async fn run_poll_loop(
    scanner: Arc<SysScanner>,
    events: mpsc::Sender<LiveEvent>,
    state: Arc<watch::Sender<LiveState>>,
    period: Duration,
) {
    // Tip read before the scan; a block landing mid-scan must still trigger an update
    let tip_before = scanner.current_tip_height().await.ok();

    let (event, snapshot_ok) = match scanner.compute_top8().await {
        Ok(snapshot) => {
            info!("Live session snapshot: {} matches", snapshot.len());
            (LiveEvent::Snapshot(snapshot), true)
        }
        Err(e) => {
            warn!("Live session snapshot failed: {}", e);
            let message = e.to_string();
            (LiveEvent::Error { message }, false)
        }
    };
    let mut last_top = match &event {
        LiveEvent::Snapshot(snapshot) => top_height(snapshot).unwrap_or(0),
        _ => 0,
    };
    if events.send(event).await.is_err() {
        state.send_replace(LiveState::Terminated);
        return;
    }

    // Record the tip too, so a tip without a match does not trigger an update
    if snapshot_ok {
        if let Some(tip) = tip_before {
            last_top = last_top.max(tip);
        }
    }

    state.send_replace(LiveState::Active);

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if events.is_closed() {
            break;
        }

        let tip = match scanner.current_tip_height().await {
            Ok(tip) => tip,
            Err(e) => {
                debug!("Tip poll failed: {}", e);
                continue;
            }
        };
        if tip <= last_top {
            continue;
        }

        match scanner.compute_top8().await {
            Ok(update) => {
                last_top = top_height(&update).unwrap_or(last_top).max(tip);
                info!("Live session update at tip {}", tip);
                if events.send(LiveEvent::Update(update)).await.is_err() {
                    break;
                }
            }
            Err(e) => warn!("Live update recompute failed: {}", e),
        }
    }

    debug!("Live poll loop stopped");
    state.send_replace(LiveState::Terminated);
}

async fn run_keepalive_loop(
    events: mpsc::Sender<LiveEvent>,
    mut state: watch::Receiver<LiveState>,
    period: Duration,
) {
    let started = state
        .wait_for(|s| *s != LiveState::Initializing)
        .await
        .map(|s| *s);
    if !matches!(started, Ok(LiveState::Active)) {
        return;
    }

    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        if events.send(LiveEvent::KeepAlive).await.is_err() {
            break;
        }
    }
}

fn top_height(results: &[MatchResult]) -> Option<u64> {
    results.first().map(|r| r.block_height)
}
