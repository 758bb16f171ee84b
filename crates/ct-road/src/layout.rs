//! The fixed city layout.
//!
//! # Construction
//!
//! ```text
//!   main roads  - 3 horizontal + 3 vertical, 4 lanes, spanning the city
//!   side roads  - 2 horizontal + 2 vertical, 2 lanes, spanning the city
//!   highway     - ring of 16 arcs around the city, 4 lanes
//!   connectors  - 4 bezier ramps from the central main roads' ends to the ring
//! ```
//!
//! Roads of one class are evenly spaced: with `n` roads across a city of
//! size `S` centred on the origin, road `k` (1-based) sits at
//! `−S/2 + k·S/(n+1)`.  Intersections are derived by the builder at every
//! main×main, side×side, and main×side crossing.

use std::f32::consts::TAU;

use ct_core::Vec2;

use crate::{Geometry, RoadError, RoadGraph, RoadGraphBuilder, RoadResult, SegmentKind};

/// Lane count and speed limit of one road class.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadClass {
    pub lanes:       u32,
    pub speed_limit: f32,
}

/// Constants the city graph is regenerated from at every startup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CityLayout {
    /// Edge length of the square city, centred on the origin.
    pub city_size:        f32,
    /// Radius of the highway ring.  Must exceed `city_size / 2`.
    pub highway_radius:   f32,
    pub waypoint_spacing: f32,
    pub lane_width:       f32,
    /// Main roads per axis.
    pub main_roads:       u32,
    /// Side roads per axis.
    pub side_roads:       u32,
    /// Arcs approximating the highway circle.
    pub highway_arcs:     u32,
    pub main:             RoadClass,
    pub side:             RoadClass,
    pub highway:          RoadClass,
    pub connector:        RoadClass,
}

impl Default for CityLayout {
    fn default() -> Self {
        Self {
            city_size:        240.0,
            highway_radius:   180.0,
            waypoint_spacing: 8.0,
            lane_width:       3.5,
            main_roads:       3,
            side_roads:       2,
            highway_arcs:     16,
            main:      RoadClass { lanes: 4, speed_limit: 30.0 },
            side:      RoadClass { lanes: 2, speed_limit: 20.0 },
            highway:   RoadClass { lanes: 4, speed_limit: 45.0 },
            connector: RoadClass { lanes: 2, speed_limit: 25.0 },
        }
    }
}

impl CityLayout {
    /// Half the city edge; the city spans `[-half, half]` on both axes.
    #[inline]
    pub fn half_size(&self) -> f32 {
        self.city_size / 2.0
    }

    /// Evenly spaced coordinates for `count` parallel roads.
    fn road_offsets(&self, count: u32) -> Vec<f32> {
        let step = self.city_size / (count + 1) as f32;
        (1..=count).map(|k| -self.half_size() + k as f32 * step).collect()
    }
}

impl RoadGraph {
    /// Build the city graph described by `layout`.
    pub fn city(layout: &CityLayout) -> RoadResult<RoadGraph> {
        let half = layout.half_size();
        if !(layout.city_size > 0.0) {
            return Err(RoadError::Layout(format!("city size must be positive, got {}", layout.city_size)));
        }
        if layout.highway_radius <= half {
            return Err(RoadError::Layout(format!(
                "highway radius {} must exceed half the city size {half}",
                layout.highway_radius
            )));
        }
        if layout.main_roads == 0 || layout.highway_arcs < 3 {
            return Err(RoadError::Layout("need at least one main road and three highway arcs".into()));
        }

        let mut b = RoadGraphBuilder::new(layout.waypoint_spacing, layout.lane_width)?;

        // ── Grid roads ────────────────────────────────────────────────────
        let grid = [
            (SegmentKind::Main, layout.main, layout.main_roads),
            (SegmentKind::Side, layout.side, layout.side_roads),
        ];
        for (kind, class, count) in grid {
            for c in layout.road_offsets(count) {
                let horizontal = Geometry::Straight { start: Vec2::new(-half, c), end: Vec2::new(half, c) };
                b.add_segment(kind, horizontal, class.lanes, class.speed_limit)?;
            }
            for c in layout.road_offsets(count) {
                let vertical = Geometry::Straight { start: Vec2::new(c, -half), end: Vec2::new(c, half) };
                b.add_segment(kind, vertical, class.lanes, class.speed_limit)?;
            }
        }

        // ── Highway ring ──────────────────────────────────────────────────
        let sweep = TAU / layout.highway_arcs as f32;
        for i in 0..layout.highway_arcs {
            let arc = Geometry::Arc {
                center:      Vec2::ZERO,
                radius:      layout.highway_radius,
                start_angle: i as f32 * sweep,
                end_angle:   (i + 1) as f32 * sweep,
            };
            b.add_segment(SegmentKind::Highway, arc, layout.highway.lanes, layout.highway.speed_limit)?;
        }

        // ── Connectors from the central main roads' ends ──────────────────
        let mid = layout.road_offsets(layout.main_roads)[layout.main_roads as usize / 2];
        let ends = [
            Vec2::new(half, mid),
            Vec2::new(-half, mid),
            Vec2::new(mid, half),
            Vec2::new(mid, -half),
        ];
        for start in ends {
            let end = start.normalize_or_zero() * layout.highway_radius;
            let span = end - start;
            let control = start.lerp(end, 0.5) + span.normalize_or_zero().right_normal() * (span.length() * 0.25);
            let ramp = Geometry::Bezier { start, control, end };
            b.add_segment(SegmentKind::Connector, ramp, layout.connector.lanes, layout.connector.speed_limit)?;
        }

        Ok(b.build())
    }
}
