//! Price screen: application state plus the task that drives it
//!
//! `ScreenState` is plain data changed only through `ScreenState::apply`.
//! `PriceScreen` owns the state, the auto-update timer and the provider, and
//! turns timer events, fetch results and user actions into state updates.
//!
//! ```text
//! AutoRefreshTimer ──Fire──┐
//!                          ├─> spawn fetch ──FetchOutcome──> PriceScreen::handle
//! refresh() / start() ─────┘                                   │
//!                                                  ScreenState::apply
//! ```
//!
//! Everything runs on one logical task. Fetches are spawned so that turning
//! auto-update off never cancels one already in flight; their results come
//! back over a channel and are dropped once the screen is torn down.

use crate::{
    clock::Clock,
    config::TickerConfig,
    error::FetchError,
    metrics::{MetricsCollector, ProviderMetrics},
    provider::SummaryProvider,
    timer::{AutoRefreshTimer, CountdownPolicy, TimerEvent},
    types::{FetchOrigin, PriceSummary},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// State update consumed by `ScreenState::apply`
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    /// A fetch was dispatched
    FetchStarted,
    /// A fetch returned a summary; `at` is the "last updated" label
    FetchSucceeded {
        request_id: u64,
        summary: PriceSummary,
        at: String,
    },
    /// A fetch failed
    FetchFailed { request_id: u64, message: String },
    /// Live countdown value
    Countdown(u64),
    /// Auto-update switched on or off
    AutoUpdate { enabled: bool, window_secs: u64 },
    /// Forget the last known summary
    Cleared,
}

/// What the screen should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase<'a> {
    /// Nothing fetched yet and nothing in flight
    Empty,
    Loading,
    Failed(&'a str),
    Ready(&'a PriceSummary),
}

/// Screen state
///
/// A failed fetch raises `error` but keeps the previous `summary` in memory;
/// `phase` shows one or the other, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenState {
    pub summary: Option<PriceSummary>,
    pub error: Option<String>,
    pub last_updated: Option<String>,
    pub auto_update_enabled: bool,
    pub seconds_until_update: u64,
    in_flight: usize,
    last_applied_request: u64,
}

impl ScreenState {
    pub fn new(window_secs: u64) -> Self {
        Self {
            summary: None,
            error: None,
            last_updated: None,
            auto_update_enabled: false,
            seconds_until_update: window_secs,
            in_flight: 0,
            last_applied_request: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Loading wins over an error, which wins over data
    pub fn phase(&self) -> Phase<'_> {
        if self.is_loading() {
            Phase::Loading
        } else if let Some(message) = &self.error {
            Phase::Failed(message)
        } else if let Some(summary) = &self.summary {
            Phase::Ready(summary)
        } else {
            Phase::Empty
        }
    }

    /// Applies an update and returns whether it was accepted
    ///
    /// A fetch result older than one already applied is counted as finished
    /// but otherwise ignored.
    pub fn apply(&mut self, update: StateUpdate) -> bool {
        match update {
            StateUpdate::FetchStarted => {
                self.in_flight += 1;
                self.error = None;
                true
            }
            StateUpdate::FetchSucceeded {
                request_id,
                summary,
                at,
            } => {
                if !self.finish(request_id) {
                    return false;
                }
                self.summary = Some(summary);
                self.last_updated = Some(at);
                self.error = None;
                true
            }
            StateUpdate::FetchFailed {
                request_id,
                message,
            } => {
                if !self.finish(request_id) {
                    return false;
                }
                self.error = Some(message);
                true
            }
            StateUpdate::Countdown(remaining) => {
                self.seconds_until_update = remaining;
                true
            }
            StateUpdate::AutoUpdate {
                enabled,
                window_secs,
            } => {
                self.auto_update_enabled = enabled;
                self.seconds_until_update = window_secs;
                true
            }
            StateUpdate::Cleared => {
                self.summary = None;
                self.last_updated = None;
                true
            }
        }
    }

    fn finish(&mut self, request_id: u64) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        if request_id < self.last_applied_request {
            return false;
        }
        self.last_applied_request = request_id;
        true
    }
}

/// Result of one spawned fetch
#[derive(Debug)]
pub struct FetchOutcome {
    pub request_id: u64,
    pub origin: FetchOrigin,
    pub result: Result<PriceSummary, FetchError>,
    pub elapsed: Duration,
}

/// Input to `PriceScreen::handle`
#[derive(Debug)]
pub enum ScreenEvent {
    Timer(TimerEvent),
    Fetched(FetchOutcome),
}

/// What an event changed, for deciding how much to redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenChange {
    Nothing,
    /// Only the countdown moved
    Countdown,
    /// Summary, error or loading flag changed
    Content,
}

/// Drives one price screen
pub struct PriceScreen {
    provider: Arc<dyn SummaryProvider>,
    clock: Arc<dyn Clock>,
    policy: CountdownPolicy,
    auto_update_on_start: bool,
    state: ScreenState,
    timer: AutoRefreshTimer,
    timer_rx: UnboundedReceiver<TimerEvent>,
    fetch_tx: UnboundedSender<FetchOutcome>,
    fetch_rx: UnboundedReceiver<FetchOutcome>,
    metrics: MetricsCollector,
    next_request_id: u64,
    torn_down: bool,
    provider_closed: bool,
}

impl PriceScreen {
    pub fn new(
        provider: Arc<dyn SummaryProvider>,
        clock: Arc<dyn Clock>,
        config: &TickerConfig,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let timer = AutoRefreshTimer::new(config.window_secs, config.tick, timer_tx);
        let metrics = MetricsCollector::new(provider.provider_name());

        Self {
            provider,
            clock,
            policy: config.countdown_policy,
            auto_update_on_start: config.auto_update,
            state: ScreenState::new(timer.window_secs()),
            timer,
            timer_rx,
            fetch_tx,
            fetch_rx,
            metrics,
            next_request_id: 0,
            torn_down: false,
            provider_closed: false,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn metrics(&self) -> ProviderMetrics {
        self.metrics.get_metrics()
    }

    /// Initial load, then auto-update if configured
    pub fn start(&mut self) {
        self.request(FetchOrigin::Initial);
        if self.auto_update_on_start {
            self.set_auto_update(true);
        }
    }

    /// Manual refresh or retry; returns the request id
    pub fn refresh(&mut self) -> Option<u64> {
        self.request(FetchOrigin::Manual)
    }

    /// Turns auto-update on or off
    ///
    /// Enabling while already counting keeps the current countdown.
    pub fn set_auto_update(&mut self, enabled: bool) {
        if self.torn_down {
            return;
        }

        let changed = if enabled {
            self.timer.enable()
        } else {
            self.timer.disable()
        };

        if changed {
            self.state.apply(StateUpdate::AutoUpdate {
                enabled,
                window_secs: self.timer.window_secs(),
            });
        }
    }

    pub fn toggle_auto_update(&mut self) {
        let enabled = self.state.auto_update_enabled;
        self.set_auto_update(!enabled);
    }

    /// Forgets the last known summary
    pub fn clear(&mut self) {
        self.state.apply(StateUpdate::Cleared);
    }

    fn request(&mut self, origin: FetchOrigin) -> Option<u64> {
        if self.torn_down {
            return None;
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.state.apply(StateUpdate::FetchStarted);

        tracing::debug!(request_id, origin = %origin, "Dispatching summary fetch");

        let provider = self.provider.clone();
        let fetch_tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let start = Instant::now();
            let result = provider.fetch_summary().await;
            let outcome = FetchOutcome {
                request_id,
                origin,
                result,
                elapsed: start.elapsed(),
            };
            if fetch_tx.send(outcome).is_err() {
                tracing::debug!(request_id, "Screen gone, dropping fetch result");
            }
        });

        Some(request_id)
    }

    /// Waits for the next timer event or fetch result
    ///
    /// Returns `None` once the screen has been torn down.
    pub async fn next_event(&mut self) -> Option<ScreenEvent> {
        if self.torn_down {
            return None;
        }

        tokio::select! {
            Some(event) = self.timer_rx.recv() => Some(ScreenEvent::Timer(event)),
            Some(outcome) = self.fetch_rx.recv() => Some(ScreenEvent::Fetched(outcome)),
            else => None,
        }
    }

    /// Applies one event
    pub fn handle(&mut self, event: ScreenEvent) -> ScreenChange {
        if self.torn_down {
            tracing::debug!("Discarding event after teardown");
            return ScreenChange::Nothing;
        }

        match event {
            ScreenEvent::Timer(event) if !self.timer.accepts(&event) => ScreenChange::Nothing,
            ScreenEvent::Timer(TimerEvent::Tick { remaining_secs, .. }) => {
                self.state.apply(StateUpdate::Countdown(remaining_secs));
                ScreenChange::Countdown
            }
            ScreenEvent::Timer(TimerEvent::Fire { .. }) => {
                self.request(FetchOrigin::Timer);
                ScreenChange::Content
            }
            ScreenEvent::Fetched(outcome) => self.complete(outcome),
        }
    }

    /// Waits for and applies the next event
    pub async fn step(&mut self) -> ScreenChange {
        match self.next_event().await {
            Some(event) => self.handle(event),
            None => ScreenChange::Nothing,
        }
    }

    fn complete(&mut self, outcome: FetchOutcome) -> ScreenChange {
        let FetchOutcome {
            request_id,
            origin,
            result,
            elapsed,
        } = outcome;
        self.metrics.record_request(elapsed, result.is_ok());

        let update = match result {
            Ok(summary) => {
                tracing::info!(
                    request_id,
                    origin = %origin,
                    price_usd = summary.price_usd,
                    latency_ms = elapsed.as_millis() as u64,
                    "Summary updated"
                );
                StateUpdate::FetchSucceeded {
                    request_id,
                    summary,
                    at: self.clock.now_string(),
                }
            }
            Err(e) => {
                tracing::warn!(request_id, origin = %origin, error = %e, "Failed to fetch summary");
                StateUpdate::FetchFailed {
                    request_id,
                    message: e.to_string(),
                }
            }
        };

        let succeeded = matches!(update, StateUpdate::FetchSucceeded { .. });
        if !self.state.apply(update) {
            tracing::debug!(request_id, "Ignoring result of a superseded fetch");
        } else if succeeded
            && origin.is_manual()
            && self.policy == CountdownPolicy::ResetOnManualSuccess
            && self.timer.is_running()
        {
            self.timer.restart();
            self.state
                .apply(StateUpdate::Countdown(self.timer.window_secs()));
        }

        ScreenChange::Content
    }

    /// Stops the timer and stops accepting results
    ///
    /// Fetches still in flight run to completion, but their results are
    /// dropped. Does not shut the provider down; see `close`.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.timer.disable();
        self.timer_rx.close();
        self.fetch_rx.close();
        tracing::info!("Price screen torn down");
    }

    /// Tears the screen down and shuts the provider down
    ///
    /// The provider's `shutdown` runs on the first call only.
    pub async fn close(&mut self) {
        self.teardown();
        if self.provider_closed {
            return;
        }
        self.provider_closed = true;
        self.provider.shutdown().await;
    }
}
