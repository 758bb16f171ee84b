//! `ct-core`: foundational types for the city traffic simulation core.
//!
//! This crate is a dependency of every other `ct-*` crate.  It intentionally
//! has no `ct-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `SegmentId`, `LaneId`, `WaypointId`, `IntersectionId` |
//! | [`geo`]         | `Vec2` planar point/vector, heading helpers               |
//! | [`vehicle`]     | `Vehicle` capability trait, `VehicleState`                |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{Vec2, wrap_angle};
pub use ids::{AgentId, IntersectionId, LaneId, SegmentId, WaypointId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
pub use vehicle::{Vehicle, VehicleState};
