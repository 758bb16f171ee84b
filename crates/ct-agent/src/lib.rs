//! `ct-agent`: autonomous NPC vehicles.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`agent`]   | `Agent`: spawn, per-tick update, collision reversal         |
//! | [`state`]   | `DriveState`, `TurnSignal`, `LeadVehicle`, `SegmentTrack`   |
//! | [`context`] | `SenseContext<'a>`, `Sensed` - read-only per-tick inputs    |
//! | [`params`]  | `DriverParams`                                              |
//!
//! # Determinism
//!
//! An agent's only source of randomness is its own `AgentRng`, and it only
//! reads other vehicles from the top-of-frame snapshot in its
//! `SenseContext`.  Updating agents in any order, or in parallel, gives
//! identical results.

pub mod agent;
pub mod context;
pub mod params;
pub mod state;


pub use agent::Agent;
pub use context::{SenseContext, Sensed};
pub use params::DriverParams;
pub use state::{DriveState, LeadVehicle, SegmentTrack, TurnSignal};
