//! Simulation time model.
//!
//! # Design
//!
//! The traffic core is driven by the host's render loop: one call per frame
//! with a variable elapsed-time delta in seconds.  Two quantities are tracked:
//!
//! - a monotonically increasing `Tick` counter (one per frame), used for
//!   deterministic ordering and for observer callbacks, and
//! - accumulated simulated seconds, used by nothing inside the core but
//!   handy for logging.
//!
//! Every delta passes through [`SimClock::clamp_dt`] first, so a stalled
//! frame (tab switch, debugger pause) never produces a huge catch-up jump.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute frame counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
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

/// Frame counter plus accumulated simulated time.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Largest delta (seconds) a single frame may advance the simulation.
    pub max_dt: f32,
    /// The current tick, advanced by [`SimClock::advance`] each frame.
    pub current_tick: Tick,
    /// Simulated seconds elapsed since tick 0.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt: max_dt.max(0.0),
            current_tick: Tick::ZERO,
            elapsed_secs: 0.0,
        }
    }

    /// Sanitize a raw frame delta: NaN and negatives become `0`, anything
    /// above `max_dt` is capped.
    #[inline]
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_dt)
    }

    /// Advance by one frame of `dt` seconds (already clamped by the caller).
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.current_tick = self.current_tick + 1;
        self.elapsed_secs += dt as f64;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2} s)", self.current_tick, self.elapsed_secs)
    }
}
