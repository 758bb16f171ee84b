//! Incremental construction of a [`RoadGraph`].
//!
//! # Example
//!
//! ```
//! use ct_core::Vec2;
//! use ct_road::{Geometry, RoadGraphBuilder, SegmentKind};
//!
//! let mut b = RoadGraphBuilder::new(8.0, 3.5).unwrap();
//! b.add_segment(
//!     SegmentKind::Main,
//!     Geometry::Straight { start: Vec2::new(-120.0, 0.0), end: Vec2::new(120.0, 0.0) },
//!     4,
//!     30.0,
//! ).unwrap();
//! let graph = b.build();
//! assert_eq!(graph.waypoints().len(), 124); // 31 positions × 4 lanes
//! ```

use log::debug;
use rstar::RTree;
use rustc_hash::FxHashMap;

use ct_core::{IntersectionId, LaneId, SegmentId, Vec2, WaypointId};

use crate::graph::WaypointEntry;
use crate::{
    Direction, Geometry, Intersection, Lane, RoadError, RoadGraph, RoadResult, Segment,
    SegmentKind, Waypoint, WaypointKey,
};

/// Crossings closer than this are merged into one intersection.
const MERGE_RADIUS: f32 = 1.0;

/// Accumulate validated segments, then call [`build`](Self::build).
///
/// `build()` derives everything else: lanes, waypoints at fixed spacing,
/// intersections at every crossing of straight `main`/`side` segments, the
/// waypoint key map, and the R-tree.
pub struct RoadGraphBuilder {
    waypoint_spacing: f32,
    lane_width:       f32,
    segments:         Vec<Segment>,
}

impl RoadGraphBuilder {
    pub fn new(waypoint_spacing: f32, lane_width: f32) -> RoadResult<Self> {
        if !(waypoint_spacing > 0.0 && lane_width > 0.0) {
            return Err(RoadError::InvalidSpacing { spacing: waypoint_spacing, lane_width });
        }
        Ok(Self { waypoint_spacing, lane_width, segments: Vec::new() })
    }

    /// Add a segment and return its `SegmentId` (sequential from 0).
    ///
    /// Fails fast on a zero-length geometry, an odd or too-small lane count,
    /// or a non-positive speed limit.
    pub fn add_segment(
        &mut self,
        kind:        SegmentKind,
        geometry:    Geometry,
        lane_count:  u32,
        speed_limit: f32,
    ) -> RoadResult<SegmentId> {
        let length = geometry.length();
        if !(length > f32::EPSILON) {
            return Err(RoadError::ZeroLengthSegment { kind });
        }
        if lane_count < 2 || lane_count % 2 != 0 {
            return Err(RoadError::InvalidLaneCount { kind, lanes: lane_count });
        }
        if !(speed_limit > 0.0) {
            return Err(RoadError::InvalidSpeedLimit { kind, limit: speed_limit });
        }

        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(Segment {
            id,
            kind,
            geometry,
            width: lane_count as f32 * self.lane_width,
            lane_count,
            speed_limit,
            length,
            lanes: Vec::with_capacity(lane_count as usize),
        });
        Ok(id)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Consume the builder and produce a [`RoadGraph`].
    pub fn build(self) -> RoadGraph {
        let mut segments = self.segments;
        let mut lanes:     Vec<Lane>     = Vec::new();
        let mut waypoints: Vec<Waypoint> = Vec::new();
        let mut keys = FxHashMap::default();

        for segment in &mut segments {
            let steps = (segment.length / self.waypoint_spacing).ceil().max(1.0) as u32;

            for lane_index in 0..segment.lane_count {
                let lane_id   = LaneId(lanes.len() as u32);
                let direction = Direction::for_lane(lane_index, segment.lane_count);
                let lateral   = segment.lane_offset(lane_index, self.lane_width);

                let mut lane_wps = Vec::with_capacity(steps as usize + 1);
                for i in 0..=steps {
                    let t   = i as f32 / steps as f32;
                    let id  = WaypointId(waypoints.len() as u32);
                    let key = WaypointKey { segment: segment.id, index: i, lane: lane_index };
                    waypoints.push(Waypoint {
                        id,
                        key,
                        position: segment.point_at(t, lateral),
                        segment: segment.id,
                        lane: lane_id,
                        direction,
                    });
                    keys.insert(key, id);
                    lane_wps.push(id);
                }

                lanes.push(Lane {
                    id: lane_id,
                    segment: segment.id,
                    index: lane_index,
                    direction,
                    speed_limit: segment.speed_limit,
                    lateral_offset: lateral,
                    waypoints: lane_wps,
                });
                segment.lanes.push(lane_id);
            }
        }

        let intersections = detect_crossings(&segments);

        let entries: Vec<WaypointEntry> = waypoints
            .iter()
            .map(|w| WaypointEntry { point: [w.position.x, w.position.z], id: w.id })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        debug!(
            "road graph built: {} segments, {} lanes, {} waypoints, {} intersections ({} signaled)",
            segments.len(),
            lanes.len(),
            waypoints.len(),
            intersections.len(),
            intersections.iter().filter(|i| i.signaled).count(),
        );

        RoadGraph {
            segments,
            lanes,
            waypoints,
            intersections,
            keys,
            spatial_idx,
            lane_width: self.lane_width,
            waypoint_spacing: self.waypoint_spacing,
        }
    }
}

// ── Crossing detection ────────────────────────────────────────────────────────

/// Find every crossing between straight `main`/`side` segments.
///
/// A crossing is signaled unless both segments are side streets.
fn detect_crossings(segments: &[Segment]) -> Vec<Intersection> {
    let mut out: Vec<Intersection> = Vec::new();

    let crossable: Vec<&Segment> = segments
        .iter()
        .filter(|s| matches!(s.kind, SegmentKind::Main | SegmentKind::Side))
        .filter(|s| !s.geometry.is_curved())
        .collect();

    for (i, a) in crossable.iter().enumerate() {
        for b in &crossable[i + 1..] {
            let Some(point) = crossing_point(a.start(), a.end(), b.start(), b.end()) else {
                continue;
            };
            let signaled = !(a.kind == SegmentKind::Side && b.kind == SegmentKind::Side);

            match out.iter_mut().find(|x| x.position.distance(point) <= MERGE_RADIUS) {
                Some(existing) => {
                    for id in [a.id, b.id] {
                        if !existing.segments.contains(&id) {
                            existing.segments.push(id);
                        }
                    }
                    existing.signaled |= signaled;
                }
                None => out.push(Intersection {
                    id: IntersectionId(out.len() as u32),
                    position: point,
                    segments: vec![a.id, b.id],
                    signaled,
                }),
            }
        }
    }
    out
}

/// Intersection point of segments `p0→p1` and `q0→q1`, if they cross.
fn crossing_point(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<Vec2> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.cross(s);
    if denom.abs() < f32::EPSILON {
        return None; // parallel or collinear
    }
    let qp = q0 - p0;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p0 + r * t)
    } else {
        None
    }
}
