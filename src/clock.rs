//! Time sources and the two gameplay timers (auto-drop and gray rows).
//!
//! Nothing here sleeps or spawns threads. The driver polls [`GameClock`]
//! with a timestamp once per frame and applies whatever fired.

use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Monotonic time since some fixed origin.
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// What fired during one poll.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ClockTick {
    pub drop: bool,
    pub gray_rows: u32,
}

#[derive(Clone, Debug, Default)]
pub struct GameClock {
    running: bool,
    drop_interval: Duration,
    last_drop: Duration,
    gray_period: Option<Duration>,
    next_gray: Duration,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the drop timer and, when `gray_period` is set, the gray row timer.
    pub fn start(&mut self, now: Duration, drop_interval: Duration, gray_period: Option<Duration>) {
        self.running = true;
        self.drop_interval = drop_interval;
        self.last_drop = now;
        self.gray_period = gray_period;
        self.next_gray = gray_period.map_or(now, |period| now + period);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.gray_period = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    pub fn set_drop_interval(&mut self, interval: Duration) {
        self.drop_interval = interval;
    }

    /// At most one drop fires per poll no matter how late it is. The gray
    /// timer fires once for every period that elapsed.
    pub fn poll(&mut self, now: Duration) -> ClockTick {
        let mut tick = ClockTick::default();
        if !self.running {
            return tick;
        }

        if now.saturating_sub(self.last_drop) > self.drop_interval {
            tick.drop = true;
            self.last_drop = now;
        }

        if let Some(period) = self.gray_period.filter(|p| !p.is_zero()) {
            while now >= self.next_gray {
                tick.gray_rows += 1;
                self.next_gray += period;
            }
        }

        tick
    }
}
