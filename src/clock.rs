//! Wall-clock capability for the "last updated" label

use crate::constants::CLOCK_FORMAT;
use chrono::Local;

/// Returns the current local time as display text
pub trait Clock: Send + Sync {
    fn now_string(&self) -> String;
}

/// System clock, formatted as `HH:MM:SS`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now_string(&self) -> String {
        Local::now().format(CLOCK_FORMAT).to_string()
    }
}

/// Clock that always reports the same text
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_string(&self) -> String {
        self.0.clone()
    }
}
