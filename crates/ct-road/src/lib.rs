//! `ct-road`: static road topology and spatial queries.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`segment`] | `SegmentKind`, `Geometry`, `Segment`, `Projection`            |
//! | [`lane`]    | `Direction`, `Lane`, `Waypoint`, `WaypointKey`, `Intersection` |
//! | [`builder`] | `RoadGraphBuilder` - segment validation, lane/waypoint generation, crossing detection |
//! | [`graph`]   | `RoadGraph` (arenas + R-tree), `SpawnPoint`                    |
//! | [`layout`]  | `CityLayout`, `RoadClass`, `RoadGraph::city`                  |
//! | [`error`]   | `RoadError`, `RoadResult<T>`                                  |
//!
//! # Ownership
//!
//! A `RoadGraph` is built once and never mutated afterwards.  Every arena is
//! a `Vec` indexed by the matching typed id from `ct-core`, so lookups are
//! O(1) and return `Option` for ids that do not resolve.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod builder;
pub mod error;
pub mod graph;
pub mod lane;
pub mod layout;
pub mod segment;


pub use builder::RoadGraphBuilder;
pub use error::{RoadError, RoadResult};
pub use graph::{CONNECT_RADIUS, RoadGraph, SpawnPoint};
pub use lane::{Direction, Intersection, Lane, Waypoint, WaypointKey};
pub use layout::{CityLayout, RoadClass};
pub use segment::{Geometry, Projection, Segment, SegmentKind};
