//! Frame timing utilities.
//!
//! Two clocks live here:
//!
//! * [`FrameClock`] is owned by the session and paces the main loop to the
//!   configured frame rate, handing out a [`Time`] snapshot per frame.
//! * [`Timer`] is a user-facing stopwatch that can be paused; the paused
//!   interval never shows up in its readings.
//!
//! # Example
//! ```rust
//! use fastgame_core::Timer;
//!
//! let mut timer = Timer::new();
//! timer.pause();
//! let frozen = timer.elapsed_exact();
//! assert_eq!(timer.elapsed_exact(), frozen);
//! timer.unpause();
//! ```

use std::time::{Duration, Instant};

/// A snapshot of timing information for the current frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Seconds elapsed since the previous frame.  Clamped to a maximum of
    /// 0.1 so a stalled frame does not produce a huge step.
    pub delta: f32,

    /// Total seconds elapsed since the clock was created.
    pub elapsed: f64,

    /// Number of ticks so far (starts at 0 for the first frame).
    pub frame_count: u64,

    /// Instantaneous frames-per-second derived from `delta`.
    pub fps: f32,
}

// ─── Frame clock (lives in the session) ────────────────────────────────────

/// Paces the main loop.
///
/// `tick(fps)` sleeps just long enough that consecutive ticks are at least
/// `1 / fps` seconds apart, then advances the frame count.
pub struct FrameClock {
    start:       Instant,
    last_tick:   Instant,
    frame_count: u64,
}

impl FrameClock {
    /// Create a new clock, starting the epoch now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start:       now,
            last_tick:   now,
            frame_count: 0,
        }
    }

    /// Return the current [`Time`] snapshot without advancing the clock.
    pub fn peek(&self) -> Time {
        self.snapshot(Instant::now())
    }

    /// Sleep until the target frame period has passed, then advance by one
    /// frame.  A `target_fps` of zero disables the sleep.
    pub fn tick(&mut self, target_fps: u32) -> Time {
        if let Some(period) = frame_period(target_fps) {
            let since = self.last_tick.elapsed();
            if since < period {
                std::thread::sleep(period - since);
            }
        }

        let now  = Instant::now();
        let time = self.snapshot(now);

        self.last_tick   = now;
        self.frame_count += 1;

        time
    }

    fn snapshot(&self, now: Instant) -> Time {
        let raw_dt  = (now - self.last_tick).as_secs_f32();
        let delta   = raw_dt.min(0.1);
        let elapsed = (now - self.start).as_secs_f64();
        let fps     = if delta > 0.0 { 1.0 / delta } else { 0.0 };
        Time { delta, elapsed, frame_count: self.frame_count, fps }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Duration of one frame at `fps`, or `None` when pacing is disabled.
pub fn frame_period(fps: u32) -> Option<Duration> {
    if fps == 0 {
        None
    } else {
        Some(Duration::from_secs_f64(1.0 / fps as f64))
    }
}

// ─── Stopwatch ─────────────────────────────────────────────────────────────

/// Wall-clock stopwatch with pause support.
///
/// While paused, every reading returns the value captured by [`pause`].
/// [`unpause`] shifts the start reference forward by the paused interval so
/// readings continue from where they stopped.
///
/// [`pause`]: Timer::pause
/// [`unpause`]: Timer::unpause
#[derive(Debug, Clone)]
pub struct Timer {
    start:  Instant,
    paused: Option<Duration>,
}

impl Timer {
    /// Starts a new timer at zero.
    pub fn new() -> Self {
        Self {
            start:  Instant::now(),
            paused: None,
        }
    }

    /// Restart from zero.  A paused timer stays paused (and reads zero).
    pub fn reset(&mut self) {
        self.start = Instant::now();
        if self.paused.is_some() {
            self.paused = Some(Duration::ZERO);
        }
    }

    /// Exact elapsed time.
    pub fn elapsed_exact(&self) -> Duration {
        match self.paused {
            Some(frozen) => frozen,
            None => self.start.elapsed(),
        }
    }

    /// Elapsed seconds rounded to `digits` decimal places.
    pub fn elapsed(&self, digits: u32) -> f64 {
        let secs = self.elapsed_exact().as_secs_f64();
        let scale = 10f64.powi(digits.min(15) as i32);
        (secs * scale).round() / scale
    }

    pub fn pause(&mut self) {
        if self.paused.is_none() {
            self.paused = Some(self.start.elapsed());
        }
    }

    pub fn unpause(&mut self) {
        if let Some(frozen) = self.paused.take() {
            self.start = Instant::now()
                .checked_sub(frozen)
                .unwrap_or_else(Instant::now);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Timer> for f64 {
    fn from(t: &Timer) -> Self {
        t.elapsed_exact().as_secs_f64()
    }
}
