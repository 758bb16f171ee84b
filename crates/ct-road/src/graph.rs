//! The immutable road graph and its spatial queries.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, z)` to the nearest `WaypointId`.  It
//! answers `nearest_lane` in O(log W) instead of a linear scan over every
//! waypoint; the result is identical.  The remaining queries scan segments
//! or intersections, which number in the dozens.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ct_core::{IntersectionId, LaneId, SegmentId, Vec2, WaypointId};

use crate::{
    Direction, Geometry, Intersection, Lane, Projection, Segment, SegmentKind, Waypoint,
    WaypointKey,
};

/// Radius (world units) used to associate waypoints and segment ends with
/// a nearby intersection.
pub const CONNECT_RADIUS: f32 = 15.0;

/// Extra tolerance beyond half the paved width for [`RoadGraph::on_road`].
const ON_ROAD_MARGIN: f32 = 2.0;

// ── R-tree waypoint entry ─────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, z]` point with the
/// associated `WaypointId`.
#[derive(Clone)]
pub(crate) struct WaypointEntry {
    pub(crate) point: [f32; 2],
    pub(crate) id:    WaypointId,
}

impl RTreeObject for WaypointEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WaypointEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── SpawnPoint ────────────────────────────────────────────────────────────────

/// A position on a lane suitable for placing a new vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnPoint {
    pub position:  Vec2,
    /// Heading along the lane's travel direction.
    pub heading:   f32,
    pub lane:      LaneId,
    pub waypoint:  WaypointId,
    pub direction: Direction,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Static road topology: segments, lanes, waypoints, and intersections.
///
/// Built once via [`RoadGraphBuilder`][crate::RoadGraphBuilder] (or
/// [`RoadGraph::city`]) and read-only thereafter, so it can be shared by
/// reference with every agent without synchronisation.
pub struct RoadGraph {
    pub(crate) segments:         Vec<Segment>,
    pub(crate) lanes:            Vec<Lane>,
    pub(crate) waypoints:        Vec<Waypoint>,
    pub(crate) intersections:    Vec<Intersection>,
    pub(crate) keys:             FxHashMap<WaypointKey, WaypointId>,
    pub(crate) spatial_idx:      RTree<WaypointEntry>,
    pub(crate) lane_width:       f32,
    pub(crate) waypoint_spacing: f32,
}

impl RoadGraph {
    // ── Arena access ──────────────────────────────────────────────────────

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    #[inline]
    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    #[inline]
    pub fn waypoint(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index())
    }

    #[inline]
    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(id.index())
    }

    /// Resolve a derived waypoint key in O(1).
    #[inline]
    pub fn waypoint_by_key(&self, key: WaypointKey) -> Option<WaypointId> {
        self.keys.get(&key).copied()
    }

    pub fn lane_width(&self) -> f32 {
        self.lane_width
    }

    pub fn waypoint_spacing(&self) -> f32 {
        self.waypoint_spacing
    }

    /// Lanes of `segment` that travel in `direction`.
    pub fn lanes_in_direction(
        &self,
        segment:   SegmentId,
        direction: Direction,
    ) -> impl Iterator<Item = &Lane> + '_ {
        self.segment(segment)
            .into_iter()
            .flat_map(|s| s.lanes.iter())
            .filter_map(|&l| self.lane(l))
            .filter(move |l| l.direction == direction)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The waypoint closest to `p`.  `None` only for an empty graph.
    pub fn nearest_waypoint(&self, p: Vec2) -> Option<WaypointId> {
        self.spatial_idx.nearest_neighbor(&[p.x, p.z]).map(|e| e.id)
    }

    /// The lane owning the waypoint closest to `p`.
    pub fn nearest_lane(&self, p: Vec2) -> Option<LaneId> {
        self.nearest_waypoint(p)
            .and_then(|w| self.waypoint(w))
            .map(|w| w.lane)
    }

    /// `true` if `p` is on the paved surface of any segment (plus a margin).
    ///
    /// Straight and bezier segments test the distance to the clamped centre
    /// line; arcs test the radius band.
    pub fn on_road(&self, p: Vec2) -> bool {
        self.segments.iter().any(|s| {
            let tolerance = s.width / 2.0 + ON_ROAD_MARGIN;
            match s.geometry {
                Geometry::Arc { center, radius, .. } => {
                    (p.distance(center) - radius).abs() <= tolerance
                }
                _ => s.geometry.project(p).distance <= tolerance,
            }
        })
    }

    /// Closest intersection within `max_distance` of `p`.
    pub fn nearest_intersection(&self, p: Vec2, max_distance: f32) -> Option<&Intersection> {
        self.intersections
            .iter()
            .map(|i| (i, i.position.distance(p)))
            .filter(|&(_, d)| d <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Closest segment centre line within `max_distance` of `p`, with the
    /// projected parameter.
    pub fn nearest_segment(&self, p: Vec2, max_distance: f32) -> Option<(SegmentId, Projection)> {
        self.segments
            .iter()
            .map(|s| (s.id, s.geometry.project(p)))
            .filter(|(_, proj)| proj.distance <= max_distance)
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }

    /// Segments (other than `exclude`) with an end point within `radius` of `p`.
    pub fn segments_with_endpoint_near(
        &self,
        p:       Vec2,
        radius:  f32,
        exclude: Option<SegmentId>,
    ) -> Vec<SegmentId> {
        self.segments
            .iter()
            .filter(|s| Some(s.id) != exclude && s.has_endpoint_near(p, radius))
            .map(|s| s.id)
            .collect()
    }

    // ── Waypoint navigation ───────────────────────────────────────────────

    /// The waypoint after `current` when moving in `direction` along its
    /// lane.  At the lane bound, defers to
    /// [`find_connecting_waypoint`](Self::find_connecting_waypoint).
    pub fn next_waypoint<R: Rng>(
        &self,
        current:   WaypointId,
        direction: Direction,
        rng:       &mut R,
    ) -> Option<WaypointId> {
        let wp   = self.waypoint(current)?;
        let lane = self.lane(wp.lane)?;
        let next = wp.key.index as i64 + direction.sign() as i64;
        if next >= 0 && (next as usize) < lane.waypoints.len() {
            return Some(lane.waypoints[next as usize]);
        }
        self.find_connecting_waypoint(current, direction, rng)
    }

    /// Pick where a vehicle leaving `current` goes next.
    ///
    /// - No intersection within [`CONNECT_RADIUS`]: loop back to the entry of
    ///   the same lane for `direction`.
    /// - Otherwise: a uniformly random lane of another segment whose start or
    ///   end lies within [`CONNECT_RADIUS`] of that intersection, entered at
    ///   its own first waypoint.  `None` if there is no such lane.
    pub fn find_connecting_waypoint<R: Rng>(
        &self,
        current:   WaypointId,
        direction: Direction,
        rng:       &mut R,
    ) -> Option<WaypointId> {
        let wp = self.waypoint(current)?;

        let Some(intersection) = self.nearest_intersection(wp.position, CONNECT_RADIUS) else {
            return self.lane(wp.lane)?.entry_for(direction);
        };

        let candidates: Vec<&Lane> = self
            .lanes
            .iter()
            .filter(|l| l.segment != wp.segment)
            .filter(|l| {
                self.segment(l.segment)
                    .is_some_and(|s| s.has_endpoint_near(intersection.position, CONNECT_RADIUS))
            })
            .collect();

        match candidates.choose(rng) {
            Some(lane) => lane.entry(),
            None => {
                debug!("no connecting lane at {} for {}", intersection.id, wp.key);
                None
            }
        }
    }

    /// A uniformly random position on a `main` or `highway` lane, never at
    /// the last waypoint in the lane's travel order.
    pub fn random_spawn_point<R: Rng>(&self, rng: &mut R) -> Option<SpawnPoint> {
        let candidates: Vec<&Lane> = self
            .lanes
            .iter()
            .filter(|l| l.waypoints.len() >= 2)
            .filter(|l| {
                self.segment(l.segment)
                    .is_some_and(|s| matches!(s.kind, SegmentKind::Main | SegmentKind::Highway))
            })
            .collect();

        let lane    = *candidates.choose(rng)?;
        let segment = self.segment(lane.segment)?;
        let last    = lane.waypoints.len() - 1;
        let step    = rng.gen_range(0..last);
        let index   = match lane.direction {
            Direction::Forward  => step,
            Direction::Backward => last - step,
        };
        let id      = lane.waypoints[index];
        let wp      = self.waypoint(id)?;

        let t = index as f32 / last as f32;
        let travel = segment.tangent_at(t) * lane.direction.sign() as f32;

        Some(SpawnPoint {
            position:  wp.position,
            heading:   travel.heading(),
            lane:      lane.id,
            waypoint:  id,
            direction: lane.direction,
        })
    }
}
