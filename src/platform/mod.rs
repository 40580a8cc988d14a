//! Platform abstraction layer
//!
//! Handles the pieces the simulation must not touch directly:
//! - Time (monotonic milliseconds, local hour, wall-clock timestamps)
//! - Frame pacing (tick rate follows snake speed)

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Timelike;

/// Source of time for a game session.
///
/// The driver samples `now_ms` once per tick and passes that value through
/// every check in the tick.
pub trait Clock {
    /// Monotonic milliseconds since the clock started
    fn now_ms(&self) -> u64;
    /// Local hour of day (0-23)
    fn hour_of_day(&self) -> u32;
    /// Wall-clock Unix timestamp in milliseconds (for leaderboard entries)
    fn timestamp_ms(&self) -> i64;
}

/// Real clock backed by `Instant` and the local timezone
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn hour_of_day(&self) -> u32 {
        chrono::Local::now().hour()
    }

    fn timestamp_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests and replays.
///
/// Clones share the same time, so a test can keep one handle while the game
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    hour: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
            hour: Rc::new(Cell::new(0)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn set_hour(&self, hour: u32) {
        self.hour.set(hour % 24);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn hour_of_day(&self) -> u32 {
        self.hour.get()
    }

    fn timestamp_ms(&self) -> i64 {
        self.now.get() as i64
    }
}

/// Slowest rate the limiter will pace at (ticks per second)
const MIN_RATE: f32 = 1.0;

/// Frame-rate limiter whose target rate is the snake's current speed
#[derive(Debug, Default)]
pub struct FrameLimiter {
    last_frame: Option<Instant>,
}

impl FrameLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration of one frame at `rate` ticks per second
    pub fn frame_duration(rate: f32) -> Duration {
        let rate = f64::from(rate.max(MIN_RATE));
        Duration::from_nanos((1e9 / rate).round() as u64)
    }

    /// Sleep out the remainder of the current frame, then start the next.
    /// Returns the time since the previous frame began.
    pub fn wait(&mut self, rate: f32) -> Duration {
        let target = Self::frame_duration(rate);
        let now = Instant::now();
        let elapsed = match self.last_frame {
            Some(last) => now.duration_since(last),
            None => target,
        };
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
        let frame_start = Instant::now();
        let since_last = self
            .last_frame
            .map(|last| frame_start.duration_since(last))
            .unwrap_or(target);
        self.last_frame = Some(frame_start);
        since_last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now_ms(), 1_250);

        clock.set(10);
        assert_eq!(handle.now_ms(), 10);
    }

    #[test]
    fn test_manual_clock_hour_wraps() {
        let clock = ManualClock::new(0);
        clock.set_hour(26);
        assert_eq!(clock.hour_of_day(), 2);
    }

    #[test]
    fn test_frame_duration_follows_speed() {
        assert_eq!(FrameLimiter::frame_duration(5.0), Duration::from_millis(200));
        assert_eq!(FrameLimiter::frame_duration(10.0), Duration::from_millis(100));
        // Zero or negative speed is clamped instead of dividing by zero
        assert_eq!(FrameLimiter::frame_duration(0.0), Duration::from_secs(1));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
        assert!(clock.hour_of_day() < 24);
    }
}
