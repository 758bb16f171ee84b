//! A single intersection's fixed-cycle traffic light.
//!
//! # Cycle
//!
//! ```text
//!   index  duration  north-south  east-west
//!   0      green     Green        Red
//!   1      yellow    Yellow       Red
//!   2      all-red   Red          Red
//!   3      green     Red          Green
//!   4      yellow    Red          Yellow
//!   5      all-red   Red          Red
//! ```
//!
//! With the default [`SignalTiming`] the cycle is 10+2+1+10+2+1 = 26 s.
//!
//! The phase offset only seeds the starting phase; after
//! [`SignalController::set_phase_offset`] the controller advances purely by
//! [`SignalController::update`].

use crate::{SignalError, SignalResult};

// ── Aspects & directions ──────────────────────────────────────────────────────

/// What a signal head shows.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aspect {
    Green,
    Yellow,
    Red,
}

impl Aspect {
    /// `true` for yellow and red: a vehicle that can still stop should.
    #[inline]
    pub fn requires_stop(self) -> bool {
        !matches!(self, Aspect::Green)
    }
}

/// The two conflicting signal groups of a four-way crossing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    NorthSouth,
    EastWest,
}

/// Compass direction of travel through an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CardinalDirection {
    North,
    South,
    East,
    West,
}

impl CardinalDirection {
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            CardinalDirection::North | CardinalDirection::South => Axis::NorthSouth,
            CardinalDirection::East  | CardinalDirection::West  => Axis::EastWest,
        }
    }
}

// ── Phases ────────────────────────────────────────────────────────────────────

/// One timed step of the cycle.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phase {
    /// Seconds; always positive.
    pub duration:    f32,
    pub north_south: Aspect,
    pub east_west:   Aspect,
}

impl Phase {
    #[inline]
    pub fn aspect(&self, axis: Axis) -> Aspect {
        match axis {
            Axis::NorthSouth => self.north_south,
            Axis::EastWest   => self.east_west,
        }
    }

    /// Both groups show red.
    #[inline]
    pub fn is_all_red(&self) -> bool {
        self.north_south == Aspect::Red && self.east_west == Aspect::Red
    }
}

/// Durations of the six-phase cycle, in seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SignalTiming {
    pub green:   f32,
    pub yellow:  f32,
    pub all_red: f32,
}

impl Default for SignalTiming {
    fn default() -> Self {
        Self { green: 10.0, yellow: 2.0, all_red: 1.0 }
    }
}

impl SignalTiming {
    /// The six phases in cycle order.
    pub fn phases(&self) -> Vec<Phase> {
        use Aspect::*;
        let phase = |duration, north_south, east_west| Phase { duration, north_south, east_west };
        vec![
            phase(self.green,   Green,  Red),
            phase(self.yellow,  Yellow, Red),
            phase(self.all_red, Red,    Red),
            phase(self.green,   Red,    Green),
            phase(self.yellow,  Red,    Yellow),
            phase(self.all_red, Red,    Red),
        ]
    }

    #[inline]
    pub fn cycle_length(&self) -> f32 {
        2.0 * (self.green + self.yellow + self.all_red)
    }
}

// ── SignalController ──────────────────────────────────────────────────────────

/// Traffic-light state machine for one intersection.
#[derive(Clone, Debug)]
pub struct SignalController {
    phases:        Vec<Phase>,
    cycle_length:  f32,
    index:         usize,
    time_in_phase: f32,
}

impl SignalController {
    /// Start at phase 0, time 0.  Fails on an empty phase list or a phase
    /// whose duration is not positive.
    pub fn new(phases: Vec<Phase>) -> SignalResult<Self> {
        if phases.is_empty() {
            return Err(SignalError::EmptyPhases);
        }
        if let Some((index, p)) = phases.iter().enumerate().find(|(_, p)| !(p.duration > 0.0)) {
            return Err(SignalError::InvalidPhaseDuration { index, duration: p.duration });
        }
        let cycle_length = phases.iter().map(|p| p.duration).sum();
        Ok(Self { phases, cycle_length, index: 0, time_in_phase: 0.0 })
    }

    pub fn from_timing(timing: &SignalTiming) -> SignalResult<Self> {
        Self::new(timing.phases())
    }

    /// Advance by `dt` seconds.
    ///
    /// Overflow past the end of a phase carries into the next one, so a
    /// single call may step through several phases.  Non-positive and
    /// non-finite deltas are ignored.
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0) || !dt.is_finite() {
            return;
        }
        // Whole cycles leave the state unchanged.
        let dt = if dt >= self.cycle_length { dt.rem_euclid(self.cycle_length) } else { dt };

        self.time_in_phase += dt;
        while self.time_in_phase >= self.phases[self.index].duration {
            self.time_in_phase -= self.phases[self.index].duration;
            self.index = (self.index + 1) % self.phases.len();
        }
    }

    /// Aspect shown to traffic travelling in `direction`.
    #[inline]
    pub fn get_state(&self, direction: CardinalDirection) -> Aspect {
        self.current_phase().aspect(direction.axis())
    }

    /// Re-synchronise to `offset` seconds into the cycle.
    ///
    /// This is a one-time reseed of `(index, time_in_phase)`; no delay is
    /// applied afterwards.  Equivalent to a fresh controller advanced by
    /// `offset mod cycle_length`.
    pub fn set_phase_offset(&mut self, offset: f32) {
        let mut remainder = if offset.is_finite() { offset.rem_euclid(self.cycle_length) } else { 0.0 };
        let mut index = 0;
        while remainder >= self.phases[index].duration {
            remainder -= self.phases[index].duration;
            index = (index + 1) % self.phases.len();
        }
        self.index = index;
        self.time_in_phase = remainder;
    }

    /// Jump to the start of phase `index` (wrapped modulo the phase count).
    pub fn set_phase(&mut self, index: usize) {
        self.index = index % self.phases.len();
        self.time_in_phase = 0.0;
    }

    #[inline]
    pub fn current_phase_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn time_in_phase(&self) -> f32 {
        self.time_in_phase
    }

    #[inline]
    pub fn current_phase(&self) -> &Phase {
        &self.phases[self.index]
    }

    #[inline]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[inline]
    pub fn cycle_length(&self) -> f32 {
        self.cycle_length
    }

    #[inline]
    pub fn is_all_red(&self) -> bool {
        self.current_phase().is_all_red()
    }
}
