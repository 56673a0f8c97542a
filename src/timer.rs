//! Auto-refresh countdown
//!
//! Two states: idle (no task) and counting (one spawned task). While
//! counting, the task emits a `Tick` every second with the seconds left and a
//! `Fire` each time the window runs out, then starts the next window. It
//! never fetches by itself; the owner reacts to `Fire`, so aborting the
//! countdown can never cancel a fetch that is already running.

use crate::{config::ENV_COUNTDOWN_POLICY, error::ConfigError};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// How manual fetches interact with a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownPolicy {
    /// Manual fetches leave the countdown alone
    #[default]
    Independent,
    /// A successful manual fetch restarts the countdown from the full window
    ResetOnManualSuccess,
}

impl FromStr for CountdownPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "reset-on-manual" | "reset_on_manual" => Ok(Self::ResetOnManualSuccess),
            _ => Err(ConfigError::invalid_value(ENV_COUNTDOWN_POLICY, s)),
        }
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Seconds still left in the current window
    Counting(u64),
    /// The window ran out; the countdown is back at the full window
    Elapsed,
}

/// Seconds-left counter for one auto-update window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    window: u64,
    remaining: u64,
}

impl Countdown {
    /// Starts a full window; a zero window is treated as one second
    pub fn new(window_secs: u64) -> Self {
        let window = window_secs.max(1);
        Self {
            window,
            remaining: window,
        }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Advances by one second
    pub fn tick(&mut self) -> CountdownStep {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.remaining = self.window;
            CountdownStep::Elapsed
        } else {
            CountdownStep::Counting(self.remaining)
        }
    }
}

/// Event emitted by a countdown task
///
/// `generation` identifies the enable call that started the task, so events
/// queued before a disable can be told apart from the current loop's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { generation: u64, remaining_secs: u64 },
    Fire { generation: u64 },
}

impl TimerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Tick { generation, .. } | TimerEvent::Fire { generation } => *generation,
        }
    }
}

/// Auto-update timer owning at most one countdown task
pub struct AutoRefreshTimer {
    window_secs: u64,
    tick: Duration,
    events: UnboundedSender<TimerEvent>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl AutoRefreshTimer {
    /// Creates an idle timer that will report to `events`
    pub fn new(window_secs: u64, tick: Duration, events: UnboundedSender<TimerEvent>) -> Self {
        Self {
            window_secs,
            tick,
            events,
            generation: 0,
            task: None,
        }
    }

    pub fn window_secs(&self) -> u64 {
        Countdown::new(self.window_secs).window()
    }

    /// Returns true while a countdown task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Starts counting from the full window
    ///
    /// Returns false (and does nothing) when a countdown is already running.
    pub fn enable(&mut self) -> bool {
        if self.is_running() {
            tracing::debug!(generation = self.generation, "Auto-update already running");
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        let countdown = Countdown::new(self.window_secs);

        tracing::info!(
            window_secs = countdown.window(),
            generation,
            "Starting auto-update countdown"
        );

        self.task = Some(tokio::spawn(run_countdown(
            countdown,
            self.tick,
            generation,
            self.events.clone(),
        )));
        true
    }

    /// Stops the countdown immediately without firing
    ///
    /// Returns false when the timer was already idle.
    pub fn disable(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                tracing::info!(generation = self.generation, "Auto-update countdown stopped");
                true
            }
            None => false,
        }
    }

    /// Restarts a running countdown from the full window
    pub fn restart(&mut self) {
        if self.disable() {
            self.enable();
        }
    }

    /// Returns true if `event` comes from the countdown that is running now
    pub fn accepts(&self, event: &TimerEvent) -> bool {
        self.is_running() && event.generation() == self.generation
    }
}

impl Drop for AutoRefreshTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_countdown(
    mut countdown: Countdown,
    tick: Duration,
    generation: u64,
    events: UnboundedSender<TimerEvent>,
) {
    loop {
        let event = TimerEvent::Tick {
            generation,
            remaining_secs: countdown.remaining(),
        };
        if events.send(event).is_err() {
            return;
        }

        sleep(tick).await;

        if countdown.tick() == CountdownStep::Elapsed {
            tracing::debug!(generation, "Auto-update window elapsed");
            if events.send(TimerEvent::Fire { generation }).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn timer(window_secs: u64) -> (AutoRefreshTimer, UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AutoRefreshTimer::new(window_secs, Duration::from_secs(1), tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn fires(events: &[TimerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Fire { .. }))
            .count()
    }

    #[test]
    fn test_countdown_wraps_after_window() {
        let mut countdown = Countdown::new(3);
        assert_eq!(countdown.remaining(), 3);
        assert_eq!(countdown.tick(), CountdownStep::Counting(2));
        assert_eq!(countdown.tick(), CountdownStep::Counting(1));
        assert_eq!(countdown.tick(), CountdownStep::Elapsed);
        assert_eq!(countdown.remaining(), 3);
        assert_eq!(countdown.tick(), CountdownStep::Counting(2));
    }

    #[test]
    fn test_zero_window_counts_one_second() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.window(), 1);
        assert_eq!(countdown.tick(), CountdownStep::Elapsed);
        assert_eq!(countdown.tick(), CountdownStep::Elapsed);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "independent".parse::<CountdownPolicy>(),
            Ok(CountdownPolicy::Independent)
        );
        assert_eq!(
            "Reset-On-Manual".parse::<CountdownPolicy>(),
            Ok(CountdownPolicy::ResetOnManualSuccess)
        );
        assert!("sometimes".parse::<CountdownPolicy>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_fire_per_window() {
        let (mut timer, mut rx) = timer(3);
        assert!(timer.enable());

        sleep(Duration::from_millis(10_500)).await;
        let events = drain(&mut rx);
        assert_eq!(fires(&events), 3);

        // countdown is visible: 3, 2, 1, then back to 3
        let ticks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::Tick { remaining_secs, .. } => Some(*remaining_secs),
                _ => None,
            })
            .take(5)
            .collect();
        assert_eq!(ticks, vec![3, 2, 1, 3, 2]);
        assert!(events.iter().all(|e| timer.accepts(e)));

        sleep(Duration::from_secs(3)).await;
        assert_eq!(fires(&drain(&mut rx)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_before_first_fire() {
        let (mut timer, mut rx) = timer(3);
        timer.enable();
        sleep(Duration::from_millis(1_500)).await;
        assert!(timer.disable());
        assert!(!timer.is_running());

        sleep(Duration::from_secs(20)).await;
        assert_eq!(fires(&drain(&mut rx)), 0);
        assert!(!timer.disable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_enable_keeps_one_loop() {
        let (mut timer, mut rx) = timer(3);
        assert!(timer.enable());
        assert!(!timer.enable());

        sleep(Duration::from_millis(9_500)).await;
        assert_eq!(fires(&drain(&mut rx)), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_starts_a_fresh_window() {
        let (mut timer, mut rx) = timer(3);
        timer.enable();
        sleep(Duration::from_millis(2_500)).await;

        timer.restart();
        sleep(Duration::from_millis(2_000)).await;
        let events = drain(&mut rx);
        let current: Vec<TimerEvent> = events.into_iter().filter(|e| timer.accepts(e)).collect();
        assert!(!current.is_empty());
        assert_eq!(fires(&current), 0);

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fires(&drain(&mut rx)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_rejected() {
        let (mut timer, mut rx) = timer(3);
        timer.enable();
        let first = rx.recv().await.unwrap();
        assert!(timer.accepts(&first));

        timer.disable();
        assert!(!timer.accepts(&first));

        timer.enable();
        assert!(!timer.accepts(&first));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.generation(), 2);
        assert!(timer.accepts(&second));
    }
}
