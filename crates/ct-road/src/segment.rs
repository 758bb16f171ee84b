//! Road segments and their three geometry variants.
//!
//! # Parameterisation
//!
//! Every geometry is evaluated at a normalised parameter `t ∈ [0, 1]` from its
//! start to its end point.  Straight and arc geometries are exact in arc
//! length; a bezier connector is evaluated uniformly in its curve parameter,
//! which is close enough to arc length for the gentle curves the city layout
//! produces.
//!
//! Lateral offsets are measured along the right-hand normal of the geometric
//! direction (start → end), so a positive offset is on the right of a
//! vehicle driving `Direction::Forward`.

use ct_core::{LaneId, SegmentId, Vec2, wrap_angle};

/// Polyline resolution used to measure and project onto bezier curves.
const BEZIER_SAMPLES: usize = 32;

/// Road class of a segment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// 4-lane arterial spanning the whole city.
    Main,
    /// 2-lane street spanning the whole city.
    Side,
    /// One arc of the circular ring road.
    Highway,
    /// Bezier ramp joining a main-road end to the ring road.
    Connector,
}

impl SegmentKind {
    /// Human-readable label, used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Main      => "main",
            SegmentKind::Side      => "side",
            SegmentKind::Highway   => "highway",
            SegmentKind::Connector => "connector",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Centre-line shape of a segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Geometry {
    Straight {
        start: Vec2,
        end:   Vec2,
    },
    /// Circular arc; angles are measured from `+x` towards `+z`.
    Arc {
        center:      Vec2,
        radius:      f32,
        start_angle: f32,
        end_angle:   f32,
    },
    /// Quadratic bezier.
    Bezier {
        start:   Vec2,
        control: Vec2,
        end:     Vec2,
    },
}

/// Result of projecting a point onto a geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// Parameter of the closest centre-line point, in `[0, 1]`.
    pub t: f32,
    /// Distance from the query point to that centre-line point.
    pub distance: f32,
}

impl Geometry {
    /// Centre-line point at parameter `t`.
    pub fn point(&self, t: f32) -> Vec2 {
        match *self {
            Geometry::Straight { start, end } => start.lerp(end, t),
            Geometry::Arc { center, radius, start_angle, end_angle } => {
                let a = start_angle + (end_angle - start_angle) * t;
                center + Vec2::new(a.cos(), a.sin()) * radius
            }
            Geometry::Bezier { start, control, end } => {
                let u = 1.0 - t;
                start * (u * u) + control * (2.0 * u * t) + end * (t * t)
            }
        }
    }

    /// Unit tangent (direction of increasing `t`) at parameter `t`.
    pub fn tangent(&self, t: f32) -> Vec2 {
        match *self {
            Geometry::Straight { start, end } => (end - start).normalize_or_zero(),
            Geometry::Arc { start_angle, end_angle, .. } => {
                let a = start_angle + (end_angle - start_angle) * t;
                let sweep = (end_angle - start_angle).signum();
                Vec2::new(-a.sin(), a.cos()) * sweep
            }
            Geometry::Bezier { start, control, end } => {
                let d = (control - start) * (2.0 * (1.0 - t)) + (end - control) * (2.0 * t);
                d.normalize_or_zero()
            }
        }
    }

    /// Point at parameter `t`, shifted `lateral` units along the right-hand
    /// normal.  Arcs interpolate the angle at the offset radius.
    pub fn offset_point(&self, t: f32, lateral: f32) -> Vec2 {
        match *self {
            Geometry::Arc { center, radius, start_angle, end_angle } => {
                // Right of a counter-clockwise sweep is towards the centre.
                let r = radius - lateral * (end_angle - start_angle).signum();
                let a = start_angle + (end_angle - start_angle) * t;
                center + Vec2::new(a.cos(), a.sin()) * r
            }
            _ => self.point(t) + self.tangent(t).right_normal() * lateral,
        }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.point(0.0)
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.point(1.0)
    }

    /// Centre-line length (exact for straight and arc, sampled for bezier).
    pub fn length(&self) -> f32 {
        match *self {
            Geometry::Straight { start, end } => start.distance(end),
            Geometry::Arc { radius, start_angle, end_angle, .. } => {
                radius * (end_angle - start_angle).abs()
            }
            Geometry::Bezier { .. } => {
                let mut total = 0.0;
                let mut prev = self.start();
                for i in 1..=BEZIER_SAMPLES {
                    let p = self.point(i as f32 / BEZIER_SAMPLES as f32);
                    total += prev.distance(p);
                    prev = p;
                }
                total
            }
        }
    }

    /// Closest centre-line point to `p`.
    pub fn project(&self, p: Vec2) -> Projection {
        match *self {
            Geometry::Straight { start, end } => {
                let d = end - start;
                let len2 = d.length_squared();
                let t = if len2 > 0.0 { ((p - start).dot(d) / len2).clamp(0.0, 1.0) } else { 0.0 };
                Projection { t, distance: p.distance(start.lerp(end, t)) }
            }
            Geometry::Arc { center, radius, start_angle, end_angle } => {
                let rel = p - center;
                let sweep = end_angle - start_angle;
                let along = wrap_angle(rel.z.atan2(rel.x) - start_angle);
                let t = along / sweep;
                if (0.0..=1.0).contains(&t) {
                    Projection { t, distance: (rel.length() - radius).abs() }
                } else {
                    // Outside the swept angle: snap to whichever end is nearer.
                    let (d0, d1) = (p.distance(self.start()), p.distance(self.end()));
                    if d0 <= d1 {
                        Projection { t: 0.0, distance: d0 }
                    } else {
                        Projection { t: 1.0, distance: d1 }
                    }
                }
            }
            Geometry::Bezier { .. } => {
                let mut best = Projection { t: 0.0, distance: f32::INFINITY };
                let mut prev = self.start();
                for i in 1..=BEZIER_SAMPLES {
                    let t1 = i as f32 / BEZIER_SAMPLES as f32;
                    let t0 = (i - 1) as f32 / BEZIER_SAMPLES as f32;
                    let next = self.point(t1);
                    let piece = Geometry::Straight { start: prev, end: next }.project(p);
                    if piece.distance < best.distance {
                        best = Projection { t: t0 + piece.t * (t1 - t0), distance: piece.distance };
                    }
                    prev = next;
                }
                best
            }
        }
    }

    /// `true` for arcs and bezier connectors.
    pub fn is_curved(&self) -> bool {
        !matches!(self, Geometry::Straight { .. })
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// A stretch of road with fixed geometry, width, and lane count.
///
/// Immutable after graph construction.  Do not construct directly; use
/// [`RoadGraphBuilder::add_segment`][crate::RoadGraphBuilder::add_segment].
#[derive(Clone, Debug)]
pub struct Segment {
    pub id:          SegmentId,
    pub kind:        SegmentKind,
    pub geometry:    Geometry,
    /// Paved width: `lane_count × lane_width`.
    pub width:       f32,
    /// Always even and ≥ 2; the lower half of the lanes runs `Backward`.
    pub lane_count:  u32,
    pub speed_limit: f32,
    /// Cached centre-line length.
    pub length:      f32,
    /// Lanes in index order.
    pub lanes:       Vec<LaneId>,
}

impl Segment {
    #[inline]
    pub fn start(&self) -> Vec2 {
        self.geometry.start()
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.geometry.end()
    }

    /// Point at parameter `t`, `lateral` units right of the centre line.
    #[inline]
    pub fn point_at(&self, t: f32, lateral: f32) -> Vec2 {
        self.geometry.offset_point(t, lateral)
    }

    #[inline]
    pub fn tangent_at(&self, t: f32) -> Vec2 {
        self.geometry.tangent(t)
    }

    /// Lateral offset of lane `index`: `(index − (lane_count − 1) / 2) × lane_width`.
    #[inline]
    pub fn lane_offset(&self, index: u32, lane_width: f32) -> f32 {
        (index as f32 - (self.lane_count as f32 - 1.0) / 2.0) * lane_width
    }

    /// `true` if the segment is straight and runs mostly along the x axis.
    pub fn is_horizontal(&self) -> bool {
        match self.geometry {
            Geometry::Straight { start, end } => (end.x - start.x).abs() >= (end.z - start.z).abs(),
            _ => false,
        }
    }

    /// `true` if either end point lies within `radius` of `p`.
    pub fn has_endpoint_near(&self, p: Vec2, radius: f32) -> bool {
        self.start().distance(p) <= radius || self.end().distance(p) <= radius
    }
}
