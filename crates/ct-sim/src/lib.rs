//! `ct-sim`: per-frame orchestrator for the city traffic core.
//!
//! # Tick
//!
//! ```text
//! tick(dt, player):
//!   ① Clamp       - dt into [0, max_dt]; NaN becomes 0.
//!   ② Signals     - SignalCoordinator::update(dt).
//!   ③ Snapshot    - every agent plus the player, as of the top of the frame.
//!   ④ Agents      - Agent::update in id order, sensing only the snapshot
//!                   (parallel with the `parallel` feature).
//!   ⑤ Collisions  - agents closer than collision_radius turn around and
//!                   revert to their snapshot position.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the agent phase on Rayon's thread pool.           |
//! | `serde`    | `SimConfig` and `AgentFrame` (de)serialization.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ct_sim::{NoopObserver, SimConfig, TrafficSimBuilder};
//!
//! let mut sim = TrafficSimBuilder::new(SimConfig::default()).build()?;
//! sim.run_ticks(600, 1.0 / 60.0, &mut NoopObserver);
//! sim.teardown();
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::TrafficSimBuilder;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{AgentFrame, TeardownSummary, TrafficSimulation};
