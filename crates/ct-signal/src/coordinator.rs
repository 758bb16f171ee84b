//! Ownership of every signal, green-wave scheduling, and stop/go queries.
//!
//! # Green wave
//!
//! Each straight main segment groups the signaled intersections lying on it,
//! sorted along its axis.  The first light of a horizontal group starts at
//! offset `0`, the first of a vertical group at `cycle / 2`; every following
//! light adds `distance to previous / wave_speed`, wrapped into the cycle.
//! Horizontal groups are scheduled first and the first group to reach an
//! intersection fixes its offset.
//!
//! # Stop queries
//!
//! A light is considered when it is between 2 units and the lookahead
//! distance away and not behind the vehicle.  The approach is classified
//! by the dominant axis of the vehicle→light vector, and a yellow or red
//! aspect for that approach produces a [`StopRequest`] whose stop point sits
//! [`STOP_LINE_SETBACK`] units before the light.

use log::debug;
use rustc_hash::FxHashMap;

use ct_core::{IntersectionId, Vec2};
use ct_road::{RoadGraph, SegmentKind};

use crate::{Aspect, CardinalDirection, SignalController, SignalError, SignalResult, SignalTiming};

/// Distance of the stop line before the intersection centre.
pub const STOP_LINE_SETBACK: f32 = 8.0;

/// Lights closer than this are treated as already passed.
pub const PASSED_DISTANCE: f32 = 2.0;

/// Radius within which a pedestrian obeys an intersection's signal.
pub const PEDESTRIAN_RADIUS: f32 = 20.0;

/// A required stop in front of a yellow or red light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StopRequest {
    pub intersection:  IntersectionId,
    /// Distance from the vehicle to the intersection centre.
    pub distance:      f32,
    pub stop_position: Vec2,
    pub aspect:        Aspect,
    /// Direction the vehicle is travelling through the intersection.
    pub approach:      CardinalDirection,
}

/// Read-only signal queries used by vehicles and other traffic actors.
pub trait SignalQuery {
    /// The nearest light ahead within `lookahead` that shows yellow or red
    /// for the vehicle's approach, or `None` when no stop is required.
    fn should_stop(&self, position: Vec2, heading: f32, lookahead: f32) -> Option<StopRequest>;

    /// `true` unless a signaled intersection is within
    /// [`PEDESTRIAN_RADIUS`] and the nearest one is not in an all-red phase.
    fn is_pedestrian_walk_signal(&self, position: Vec2) -> bool;
}

struct ManagedSignal {
    intersection: IntersectionId,
    position:     Vec2,
    offset:       f32,
    controller:   SignalController,
}

/// Owns one [`SignalController`] per signaled intersection.
pub struct SignalCoordinator {
    signals:         Vec<ManagedSignal>,
    by_intersection: FxHashMap<IntersectionId, usize>,
    cycle_length:    f32,
    wave_speed:      f32,
}

impl SignalCoordinator {
    /// Create a controller for every signaled intersection of `graph` and
    /// seed each with its green-wave offset.
    pub fn new(graph: &RoadGraph, timing: &SignalTiming, wave_speed: f32) -> SignalResult<Self> {
        if !(wave_speed > 0.0) {
            return Err(SignalError::InvalidWaveSpeed(wave_speed));
        }
        let template = SignalController::from_timing(timing)?;
        let cycle_length = template.cycle_length();
        let offsets = green_wave_offsets(graph, cycle_length, wave_speed);

        let mut signals = Vec::new();
        let mut by_intersection = FxHashMap::default();
        for x in graph.intersections().iter().filter(|x| x.signaled) {
            let offset = offsets.get(&x.id).copied().unwrap_or(0.0);
            let mut controller = template.clone();
            controller.set_phase_offset(offset);
            by_intersection.insert(x.id, signals.len());
            signals.push(ManagedSignal { intersection: x.id, position: x.position, offset, controller });
        }

        debug!(
            "signal coordinator: {} lights, cycle {cycle_length} s, wave speed {wave_speed}",
            signals.len()
        );
        Ok(Self { signals, by_intersection, cycle_length, wave_speed })
    }

    /// Advance every light by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for s in &mut self.signals {
            s.controller.update(dt);
        }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn cycle_length(&self) -> f32 {
        self.cycle_length
    }

    pub fn wave_speed(&self) -> f32 {
        self.wave_speed
    }

    pub fn signal(&self, intersection: IntersectionId) -> Option<&SignalController> {
        self.by_intersection.get(&intersection).map(|&i| &self.signals[i].controller)
    }

    pub fn signal_mut(&mut self, intersection: IntersectionId) -> Option<&mut SignalController> {
        self.by_intersection.get(&intersection).map(|&i| &mut self.signals[i].controller)
    }

    /// Green-wave offset the light was seeded with.
    pub fn offset_of(&self, intersection: IntersectionId) -> Option<f32> {
        self.by_intersection.get(&intersection).map(|&i| self.signals[i].offset)
    }

    /// `(intersection, position, controller)` for every managed light.
    pub fn iter(&self) -> impl Iterator<Item = (IntersectionId, Vec2, &SignalController)> + '_ {
        self.signals.iter().map(|s| (s.intersection, s.position, &s.controller))
    }

    /// Drop every controller; returns how many were released.
    pub fn release(&mut self) -> usize {
        let n = self.signals.len();
        self.signals.clear();
        self.by_intersection.clear();
        n
    }
}

impl SignalQuery for SignalCoordinator {
    fn should_stop(&self, position: Vec2, heading: f32, lookahead: f32) -> Option<StopRequest> {
        let forward = Vec2::from_heading(heading);
        let mut best: Option<StopRequest> = None;

        for s in &self.signals {
            let to_light = s.position - position;
            let distance = to_light.length();
            if distance > lookahead || distance < PASSED_DISTANCE {
                continue;
            }
            if forward.dot(to_light) < 0.0 {
                continue;
            }

            let (approach, axis_unit) = classify_approach(to_light);
            let aspect = s.controller.get_state(approach);
            if !aspect.requires_stop() {
                continue;
            }
            if best.is_some_and(|b| b.distance <= distance) {
                continue;
            }
            best = Some(StopRequest {
                intersection: s.intersection,
                distance,
                stop_position: s.position - axis_unit * STOP_LINE_SETBACK,
                aspect,
                approach,
            });
        }
        best
    }

    fn is_pedestrian_walk_signal(&self, position: Vec2) -> bool {
        self.signals
            .iter()
            .map(|s| (s, s.position.distance(position)))
            .filter(|&(_, d)| d <= PEDESTRIAN_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .is_none_or(|(s, _)| s.controller.is_all_red())
    }
}

/// Direction of travel implied by the vehicle→light vector, with the unit
/// vector of that direction.
fn classify_approach(to_light: Vec2) -> (CardinalDirection, Vec2) {
    if to_light.x.abs() > to_light.z.abs() {
        if to_light.x > 0.0 {
            (CardinalDirection::East, Vec2::new(1.0, 0.0))
        } else {
            (CardinalDirection::West, Vec2::new(-1.0, 0.0))
        }
    } else if to_light.z > 0.0 {
        (CardinalDirection::South, Vec2::new(0.0, 1.0))
    } else {
        (CardinalDirection::North, Vec2::new(0.0, -1.0))
    }
}

/// Offsets for every signaled intersection lying on a straight main road.
fn green_wave_offsets(graph: &RoadGraph, cycle: f32, wave_speed: f32) -> FxHashMap<IntersectionId, f32> {
    let mut offsets = FxHashMap::default();

    let mains: Vec<_> = graph
        .segments()
        .iter()
        .filter(|s| s.kind == SegmentKind::Main && !s.geometry.is_curved())
        .collect();
    let horizontal = mains.iter().filter(|s| s.is_horizontal());
    let vertical   = mains.iter().filter(|s| !s.is_horizontal());

    for (segment, is_horizontal) in horizontal.map(|s| (s, true)).chain(vertical.map(|s| (s, false))) {
        let mut group: Vec<_> = graph
            .intersections()
            .iter()
            .filter(|x| x.signaled && x.segments.contains(&segment.id))
            .collect();
        let along = |p: Vec2| if is_horizontal { p.x } else { p.z };
        group.sort_by(|a, b| along(a.position).total_cmp(&along(b.position)));

        let mut cumulative = if is_horizontal { 0.0 } else { cycle / 2.0 };
        let mut prev: Option<Vec2> = None;
        for x in group {
            if let Some(p) = prev {
                cumulative += p.distance(x.position) / wave_speed;
            }
            prev = Some(x.position);
            offsets.entry(x.id).or_insert(cumulative.rem_euclid(cycle));
        }
    }

    for (id, offset) in &offsets {
        debug!("green wave: {id} offset {offset:.2} s");
    }
    offsets
}
