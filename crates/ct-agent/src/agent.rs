//! The NPC vehicle and its per-tick update.
//!
//! # Tick
//!
//! 1. Signal check: a stop within `stop_trigger` enters `Stopping`; no stop
//!    releases a `Waiting` agent into `Accelerating`.
//! 2. Lead scan over the top-of-frame snapshot.
//! 3. State transitions and target speed.
//! 4. Linear speed change towards the target.
//! 5. Segment following (or binding to the nearest segment).
//! 6. Boundary return.
//! 7. Position integration.

use log::trace;

use ct_core::{AgentId, AgentRng, LaneId, Vec2, Vehicle, VehicleState, wrap_angle};
use ct_road::{Direction, RoadGraph, Segment};

use crate::{DriveState, DriverParams, LeadVehicle, SegmentTrack, SenseContext, TurnSignal};

/// Speed below which a stopping agent counts as stationary.
const STOPPED_SPEED: f32 = 0.5;

/// Floor on the remaining stop-line gap when sizing the brake rate.
const MIN_STOP_GAP: f32 = 0.1;

/// Heading error above which the turn signal comes on, and below which a
/// turning agent resumes driving.
const SIGNAL_DELTA: f32 = 0.3;

/// An autonomous NPC vehicle.
///
/// Exclusively owns its mutable state and its RNG; reads the road graph,
/// signals, and other vehicles only through a [`SenseContext`].
pub struct Agent {
    pub(crate) id:               AgentId,
    pub(crate) position:         Vec2,
    pub(crate) heading:          f32,
    pub(crate) speed:            f32,
    pub(crate) target_speed:     f32,
    pub(crate) state:            DriveState,
    pub(crate) track:            Option<SegmentTrack>,
    pub(crate) wait_timer:       f32,
    pub(crate) turn_signal:      TurnSignal,
    pub(crate) blink_phase:      f32,
    pub(crate) heading_delta:    f32,
    pub(crate) lead:             Option<LeadVehicle>,
    pub(crate) braking_distance: Option<f32>,
    pub(crate) params:           DriverParams,
    pub(crate) rng:              AgentRng,
}

impl Agent {
    /// A new, unbound agent at rest in `Driving`.
    pub fn spawn(id: AgentId, position: Vec2, heading: f32, params: DriverParams, rng: AgentRng) -> Self {
        Self {
            id,
            position,
            heading: wrap_angle(heading),
            speed: 0.0,
            target_speed: 0.0,
            state: DriveState::Driving,
            track: None,
            wait_timer: 0.0,
            turn_signal: TurnSignal::None,
            blink_phase: 0.0,
            heading_delta: 0.0,
            lead: None,
            braking_distance: None,
            params,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn track(&self) -> Option<&SegmentTrack> {
        self.track.as_ref()
    }

    pub fn wait_timer(&self) -> f32 {
        self.wait_timer
    }

    pub fn turn_signal(&self) -> TurnSignal {
        self.turn_signal
    }

    /// `true` while the active turn signal lamp is in the lit half of its
    /// blink period.
    pub fn blinker_lit(&self) -> bool {
        self.turn_signal != TurnSignal::None && self.blink_phase < self.params.blink_period / 2.0
    }

    pub fn lead(&self) -> Option<&LeadVehicle> {
        self.lead.as_ref()
    }

    /// Remaining distance along the heading to the stop line, recorded by
    /// the last signal check while a stop is required.  Zero once the line
    /// is reached or passed.
    pub fn braking_distance(&self) -> Option<f32> {
        self.braking_distance
    }

    pub fn params(&self) -> &DriverParams {
        &self.params
    }

    pub fn snapshot(&self) -> VehicleState {
        VehicleState::of(self)
    }

    // ── External commands ─────────────────────────────────────────────────

    /// Bind to `lane` at travel `progress`.  Returns `false` (and leaves
    /// the agent unbound) if the lane does not resolve.
    pub fn bind_lane(&mut self, graph: &RoadGraph, lane: LaneId, progress: f32) -> bool {
        let Some(lane) = graph.lane(lane) else {
            return false;
        };
        self.track = Some(SegmentTrack {
            segment:   lane.segment,
            lane:      lane.id,
            direction: lane.direction,
            progress:  progress.clamp(0.0, 1.0),
            lateral:   lane.lateral_offset,
        });
        true
    }

    /// Enter `Stopping` regardless of the current state.
    pub fn force_stop(&mut self) {
        self.transition(DriveState::Stopping);
    }

    /// Turn around in place: heading flips by π, the segment traversal
    /// reverses onto the mirrored lane, and the agent moves to `position`.
    pub fn reverse_travel(&mut self, graph: &RoadGraph, heading: f32, position: Vec2) {
        self.heading = wrap_angle(heading + std::f32::consts::PI);
        self.position = position;
        if let Some(track) = self.track {
            self.track = graph.segment(track.segment).map(|seg| reversed(seg, track));
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32, ctx: &SenseContext<'_>) {
        if !(dt > 0.0) {
            return;
        }
        self.check_signals(ctx);
        self.scan_for_lead(ctx);
        self.apply_transitions(dt, ctx.graph);
        self.change_speed(dt);
        self.follow_road(dt, ctx.graph);
        self.return_inside(dt, ctx.boundary_radius);
        self.position += self.forward() * (self.speed * dt);
        self.update_blinker(dt);
    }

    fn transition(&mut self, to: DriveState) {
        if self.state != to {
            trace!("{}: {} → {}", self.id, self.state, to);
            if to == DriveState::Waiting {
                self.wait_timer = 0.0;
            }
            self.state = to;
        }
    }

    /// Step 1.
    fn check_signals(&mut self, ctx: &SenseContext<'_>) {
        let stop = ctx
            .signals
            .should_stop(self.position, self.heading, self.params.signal_lookahead)
            .filter(|s| s.distance <= self.params.stop_trigger);

        match stop {
            Some(request) => {
                let to_line = self.forward().dot(request.stop_position - self.position);
                self.braking_distance = Some(to_line.max(0.0));
                if !matches!(self.state, DriveState::Stopping | DriveState::Waiting) {
                    self.transition(DriveState::Stopping);
                }
            }
            None => {
                self.braking_distance = None;
                if self.state == DriveState::Waiting {
                    self.transition(DriveState::Accelerating);
                }
            }
        }
    }

    /// Step 2.
    fn scan_for_lead(&mut self, ctx: &SenseContext<'_>) {
        let forward = self.forward();
        let horizon = 2.0 * self.params.follow_distance;

        self.lead = ctx
            .others
            .iter()
            .filter(|o| o.agent != Some(self.id))
            .filter_map(|o| {
                let rel = o.state.position - self.position;
                let distance = rel.length();
                let ahead = forward.dot(rel) > 0.0;
                let same_lane = forward.cross(rel).abs() <= self.params.lane_tolerance;
                (distance <= horizon && ahead && same_lane).then_some(LeadVehicle {
                    agent: o.agent,
                    distance,
                    speed: o.state.speed,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        if self.lead.is_some_and(|l| l.distance < self.params.safe_distance)
            && self.state != DriveState::Waiting
        {
            self.transition(DriveState::Stopping);
        }
    }

    /// Step 3.
    fn apply_transitions(&mut self, dt: f32, graph: &RoadGraph) {
        let limit = self.speed_limit(graph);
        let target = match self.state {
            DriveState::Driving => {
                if self.heading_delta.abs() > self.params.turn_threshold {
                    self.transition(DriveState::Turning);
                    limit.min(self.params.turning_speed)
                } else {
                    limit
                }
            }
            DriveState::Stopping => {
                if self.speed < STOPPED_SPEED {
                    self.transition(DriveState::Waiting);
                }
                0.0
            }
            DriveState::Waiting => {
                self.wait_timer += dt;
                0.0
            }
            DriveState::Accelerating => {
                if self.speed >= 0.8 * limit {
                    self.transition(DriveState::Driving);
                }
                limit
            }
            DriveState::Turning => {
                if self.heading_delta.abs() < SIGNAL_DELTA {
                    self.transition(DriveState::Driving);
                    limit
                } else {
                    limit.min(self.params.turning_speed)
                }
            }
        };

        let following = self.lead.filter(|l| l.distance < self.params.follow_distance);
        self.target_speed = match following {
            Some(lead) => target.min(lead.speed),
            None => target,
        }
        .clamp(0.0, self.params.max_speed);
    }

    /// Step 4.
    ///
    /// Stopping for a signal brakes at least hard enough to come to rest at
    /// the stop line: `v² / 2d` for a remaining gap `d`.
    fn change_speed(&mut self, dt: f32) {
        let speed = if self.speed < self.target_speed {
            (self.speed + self.params.acceleration * dt).min(self.target_speed)
        } else {
            let braking = match (self.state, self.braking_distance) {
                (DriveState::Stopping, Some(gap)) => self
                    .params
                    .braking
                    .max(self.speed * self.speed / (2.0 * gap.max(MIN_STOP_GAP))),
                _ => self.params.braking,
            };
            (self.speed - braking * dt).max(self.target_speed)
        };
        self.speed = speed.clamp(0.0, self.params.max_speed);
    }

    /// Step 5.
    fn follow_road(&mut self, dt: f32, graph: &RoadGraph) {
        let Some(track) = self.track else {
            self.heading_delta = 0.0;
            self.turn_signal = TurnSignal::None;
            self.bind_nearest(graph);
            return;
        };
        let Some(seg) = graph.segment(track.segment) else {
            self.track = None;
            return;
        };

        let ahead = (track.progress + self.params.look_ahead).min(1.0);
        let target = seg.point_at(track.direction.geometric_t(ahead), track.lateral);
        let to_target = target - self.position;
        self.steer_towards(to_target, dt);

        let mut progress = track.progress + self.speed * dt / seg.length;
        if to_target.length() < self.params.arrive_radius {
            progress = progress.max(ahead);
        }

        if progress >= 1.0 {
            self.enter_next_segment(graph, seg, track);
        } else {
            self.track = Some(SegmentTrack { progress, ..track });
        }
    }

    /// Pick a random segment with an end point near the current position,
    /// or turn around on the current one.
    fn enter_next_segment(&mut self, graph: &RoadGraph, current: &Segment, track: SegmentTrack) {
        let candidates =
            graph.segments_with_endpoint_near(self.position, self.params.connect_radius, Some(current.id));

        let next = self.rng.choose(&candidates).and_then(|&id| graph.segment(id)).and_then(|seg| {
            let direction = if seg.start().distance(self.position) <= seg.end().distance(self.position) {
                Direction::Forward
            } else {
                Direction::Backward
            };
            let lanes: Vec<_> = graph.lanes_in_direction(seg.id, direction).collect();
            self.rng.choose(&lanes).map(|lane| SegmentTrack {
                segment: seg.id,
                lane: lane.id,
                direction,
                progress: 0.0,
                lateral: lane.lateral_offset,
            })
        });

        match next {
            Some(next) => {
                trace!("{}: {} → {}", self.id, current.id, next.segment);
                self.track = Some(next);
            }
            None => {
                trace!("{}: dead end on {}, turning around", self.id, current.id);
                self.track = Some(reversed(current, SegmentTrack { progress: 1.0, ..track }));
            }
        }
    }

    /// Snap onto the nearest segment within `bind_radius`, on a random lane.
    fn bind_nearest(&mut self, graph: &RoadGraph) {
        let Some((segment, projection)) = graph.nearest_segment(self.position, self.params.bind_radius) else {
            return;
        };
        let Some(seg) = graph.segment(segment) else {
            return;
        };
        let Some(&lane) = self.rng.choose(&seg.lanes) else {
            return;
        };
        let direction = graph.lane(lane).map(|l| l.direction).unwrap_or_default();
        self.bind_lane(graph, lane, direction.geometric_t(projection.t));
    }

    /// Step 6.
    fn return_inside(&mut self, dt: f32, boundary_radius: f32) {
        if self.position.length() > boundary_radius {
            self.track = None;
            self.steer_towards(-self.position, dt);
        }
    }

    /// Rotate smoothly towards `direction` and set the turn signal.
    fn steer_towards(&mut self, direction: Vec2, dt: f32) {
        if direction.length_squared() < 1e-6 {
            return;
        }
        let delta = wrap_angle(direction.heading() - self.heading);
        self.heading_delta = delta;
        let rate = (self.params.turn_speed * dt).min(1.0);
        self.heading = wrap_angle(self.heading + delta * rate);

        self.turn_signal = if delta > SIGNAL_DELTA {
            TurnSignal::Left
        } else if delta < -SIGNAL_DELTA {
            TurnSignal::Right
        } else {
            TurnSignal::None
        };
    }

    fn update_blinker(&mut self, dt: f32) {
        self.blink_phase = match self.turn_signal {
            TurnSignal::None => 0.0,
            _ => (self.blink_phase + dt) % self.params.blink_period,
        };
    }

    fn speed_limit(&self, graph: &RoadGraph) -> f32 {
        self.track
            .and_then(|t| graph.lane(t.lane))
            .map_or(self.params.turning_speed, |l| l.speed_limit)
    }
}

/// The same place on `seg` travelling the other way, on the mirrored lane.
fn reversed(seg: &Segment, track: SegmentTrack) -> SegmentTrack {
    let lane = seg
        .lanes
        .iter()
        .position(|&l| l == track.lane)
        .and_then(|i| seg.lanes.get(seg.lanes.len() - 1 - i))
        .copied()
        .unwrap_or(track.lane);
    SegmentTrack {
        segment:   seg.id,
        lane,
        direction: track.direction.reversed(),
        progress:  1.0 - track.progress,
        lateral:   -track.lateral,
    }
}

impl Vehicle for Agent {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    fn heading(&self) -> f32 {
        self.heading
    }

    #[inline]
    fn speed(&self) -> f32 {
        self.speed
    }
}
