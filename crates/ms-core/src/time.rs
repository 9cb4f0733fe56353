//! Simulation time model.
//!
//! # Design
//!
//! Unlike a fixed-resolution scheduler, every tick here carries its own
//! `dt`: a display-synced host delivers irregular frame deltas.  Two clocks
//! cover the two sides of that:
//!
//! - [`SimClock`] counts ticks and accumulates simulated seconds.
//! - [`FrameClock`] turns successive wall-clock instants into a clamped `dt`.
//!
//! The physics never looks at a clock; it only receives `dt`.

use std::fmt;
use std::time::Instant;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// A monotonically increasing tick (frame) counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// `true` every `interval` ticks, starting at tick 0.  Always `false`
    /// for an interval of 0.
    #[inline]
    pub fn is_on_interval(self, interval: u64) -> bool {
        interval > 0 && self.0.is_multiple_of(interval)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus accumulated simulated time.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// The current tick, advanced by [`SimClock::advance`] each iteration.
    pub current_tick: Tick,
    /// Simulated seconds summed over every `dt` applied so far.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current tick, which simulated `dt` seconds.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        self.current_tick = self.current_tick + 1;
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_secs += dt;
        }
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} s)", self.current_tick, self.elapsed_secs)
    }
}

// ── FrameClock ────────────────────────────────────────────────────────────────

/// A `dt` measured between two frames.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FrameDelta {
    /// The step to simulate, in `[0, max_dt_secs]`.
    pub dt: f64,
    /// The unclamped wall-clock gap in seconds.
    pub raw: f64,
}

impl FrameDelta {
    /// `true` if the wall-clock gap exceeded the ceiling and was cut.
    #[inline]
    pub fn was_clamped(&self) -> bool {
        self.raw > self.dt
    }
}

/// Derives per-frame `dt` from wall-clock instants.
///
/// The first frame has nothing to measure against and yields `dt = 0`.
/// After a long pause (process suspended, tab hidden) the gap is clamped to
/// `max_dt_secs` instead of being integrated in one step.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last:        Option<Instant>,
    max_dt_secs: f64,
}

impl FrameClock {
    pub fn new(max_dt_secs: f64) -> Self {
        Self { last: None, max_dt_secs }
    }

    /// Record a frame at `now` and return the delta since the previous one.
    ///
    /// `Instant` is monotonic, but `now` is caller-supplied; an instant
    /// earlier than the previous frame yields zero rather than a negative
    /// step.
    pub fn delta(&mut self, now: Instant) -> FrameDelta {
        let raw = match self.last {
            None       => 0.0,
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
        };
        if self.last.is_none_or(|prev| now > prev) {
            self.last = Some(now);
        }
        FrameDelta { dt: raw.clamp(0.0, self.max_dt_secs), raw }
    }

    /// Forget the previous frame; the next call yields `dt = 0`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn max_dt_secs(&self) -> f64 {
        self.max_dt_secs
    }
}
