//! Road-graph construction error type.
//!
//! Every variant is a startup-time invariant violation: the graph is built
//! once from fixed constants, so a failure here means the layout itself is
//! wrong.  Runtime queries never produce a `RoadError`.

use thiserror::Error;

use crate::SegmentKind;

/// Errors produced while building a [`RoadGraph`][crate::RoadGraph].
#[derive(Debug, Error)]
pub enum RoadError {
    #[error("{kind} segment has zero length")]
    ZeroLengthSegment { kind: SegmentKind },

    #[error("{kind} segment needs an even lane count of at least 2, got {lanes}")]
    InvalidLaneCount { kind: SegmentKind, lanes: u32 },

    #[error("{kind} segment speed limit must be positive, got {limit}")]
    InvalidSpeedLimit { kind: SegmentKind, limit: f32 },

    #[error("waypoint spacing and lane width must be positive (spacing {spacing}, lane width {lane_width})")]
    InvalidSpacing { spacing: f32, lane_width: f32 },

    #[error("invalid city layout: {0}")]
    Layout(String),
}

pub type RoadResult<T> = Result<T, RoadError>;
