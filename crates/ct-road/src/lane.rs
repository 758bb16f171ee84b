//! Lanes, waypoints, and intersections.

use std::fmt;

use ct_core::{IntersectionId, LaneId, SegmentId, Vec2, WaypointId};

/// Travel direction of a lane relative to its segment's geometry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Start → end (sign `+1`).
    #[default]
    Forward,
    /// End → start (sign `−1`).
    Backward,
}

impl Direction {
    /// Lanes in the upper half of a segment (right of the centre line) run
    /// forward; the lower half runs backward.
    #[inline]
    pub fn for_lane(index: u32, lane_count: u32) -> Self {
        if index >= lane_count / 2 { Direction::Forward } else { Direction::Backward }
    }

    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Forward  => 1,
            Direction::Backward => -1,
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward  => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// Map travel progress (`0` at entry, `1` at exit) to the geometric
    /// parameter of the segment.
    #[inline]
    pub fn geometric_t(self, progress: f32) -> f32 {
        match self {
            Direction::Forward  => progress,
            Direction::Backward => 1.0 - progress,
        }
    }
}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// One directional traffic channel within a segment.
#[derive(Clone, Debug)]
pub struct Lane {
    pub id:             LaneId,
    pub segment:        SegmentId,
    /// Index within the segment, `0 .. lane_count`.
    pub index:          u32,
    pub direction:      Direction,
    /// Inherited from the owning segment.
    pub speed_limit:    f32,
    /// Signed distance right of the centre line.
    pub lateral_offset: f32,
    /// Waypoints in geometric order (start → end).  Travel order equals
    /// index order for `Forward` lanes and the reverse for `Backward` ones.
    pub waypoints:      Vec<WaypointId>,
}

impl Lane {
    /// First waypoint a vehicle reaches when traversing the lane in
    /// `direction`.
    pub fn entry_for(&self, direction: Direction) -> Option<WaypointId> {
        match direction {
            Direction::Forward  => self.waypoints.first().copied(),
            Direction::Backward => self.waypoints.last().copied(),
        }
    }

    /// First waypoint in the lane's own travel direction.
    #[inline]
    pub fn entry(&self) -> Option<WaypointId> {
        self.entry_for(self.direction)
    }

    /// Waypoints in travel order.
    pub fn travel_order(&self) -> Box<dyn Iterator<Item = WaypointId> + '_> {
        match self.direction {
            Direction::Forward  => Box::new(self.waypoints.iter().copied()),
            Direction::Backward => Box::new(self.waypoints.iter().rev().copied()),
        }
    }
}

// ── Waypoint ──────────────────────────────────────────────────────────────────

/// The derived identity of a waypoint: owning segment, longitudinal index,
/// and lane index.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaypointKey {
    pub segment: SegmentId,
    pub index:   u32,
    pub lane:    u32,
}

impl fmt::Display for WaypointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg{}_wp{}_lane{}", self.segment.0, self.index, self.lane)
    }
}

/// A discrete navigable point along a lane.
#[derive(Clone, Debug)]
pub struct Waypoint {
    pub id:        WaypointId,
    pub key:       WaypointKey,
    pub position:  Vec2,
    pub segment:   SegmentId,
    pub lane:      LaneId,
    pub direction: Direction,
}

// ── Intersection ──────────────────────────────────────────────────────────────

/// A four-way crossing of two straight segments.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub id:       IntersectionId,
    pub position: Vec2,
    pub segments: Vec<SegmentId>,
    /// Signaled crossings get a traffic light; the rest are yield-controlled.
    pub signaled: bool,
}
