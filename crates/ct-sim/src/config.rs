//! Top-level simulation configuration.

use ct_agent::DriverParams;
use ct_road::CityLayout;
use ct_signal::SignalTiming;

use crate::{SimError, SimResult};

/// Everything needed to build a [`TrafficSimulation`][crate::TrafficSimulation].
///
/// Typically built from `Default` or loaded from JSON by the host (with the
/// `serde` feature) and handed to [`TrafficSimBuilder`][crate::TrafficSimBuilder].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical runs.
    pub seed: u64,

    /// NPC vehicles spawned on random main/highway lanes.
    pub agent_count: usize,

    /// Largest frame delta in seconds; longer frames are capped.
    pub max_dt: f32,

    /// Two agents closer than this collide.
    pub collision_radius: f32,

    /// Speed (units/s) the green wave is timed for.
    pub wave_speed: f32,

    /// Distance beyond the highway ring at which agents turn back.
    pub boundary_margin: f32,

    pub layout: CityLayout,
    pub timing: SignalTiming,
    pub driver: DriverParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:             42,
            agent_count:      40,
            max_dt:           0.1,
            collision_radius: 3.0,
            wave_speed:       30.0,
            boundary_margin:  40.0,
            layout:           CityLayout::default(),
            timing:           SignalTiming::default(),
            driver:           DriverParams::default(),
        }
    }
}

impl SimConfig {
    /// Radius from the origin beyond which agents steer back to the centre.
    #[inline]
    pub fn boundary_radius(&self) -> f32 {
        self.layout.highway_radius + self.boundary_margin
    }

    /// Reject values the tick loop cannot work with.  Road, signal, and
    /// wave-speed values are checked by their own constructors.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.max_dt > 0.0) || !self.max_dt.is_finite() {
            return Err(SimError::Config(format!("max_dt must be positive, got {}", self.max_dt)));
        }
        if !(self.collision_radius > 0.0) || !self.collision_radius.is_finite() {
            return Err(SimError::Config(format!(
                "collision_radius must be positive, got {}",
                self.collision_radius
            )));
        }
        if !(self.boundary_margin >= 0.0) {
            return Err(SimError::Config(format!(
                "boundary_margin must not be negative, got {}",
                self.boundary_margin
            )));
        }
        Ok(())
    }
}
