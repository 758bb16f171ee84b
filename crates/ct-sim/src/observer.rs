//! Simulation observer trait for progress reporting and data collection.

use ct_core::{AgentId, Tick};

use crate::AgentFrame;

/// Callbacks invoked by [`TrafficSimulation::tick_observed`][crate::TrafficSimulation::tick_observed]
/// and [`TrafficSimulation::run_ticks`][crate::TrafficSimulation::run_ticks].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: collision counter
///
/// ```rust,ignore
/// struct Collisions(usize);
///
/// impl SimObserver for Collisions {
///     fn on_collision(&mut self, _tick: Tick, _a: AgentId, _b: AgentId) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before signals advance.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per pair of agents that collided this tick, after both
    /// have been turned around.
    fn on_collision(&mut self, _tick: Tick, _a: AgentId, _b: AgentId) {}

    /// Called at the end of each tick with the committed per-agent frames.
    fn on_tick_end(&mut self, _tick: Tick, _frames: &[AgentFrame]) {}

    /// Called once by `run_ticks` after its final tick.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
