//! Tunable driver constants.

/// Per-agent driving parameters.  Every agent of a simulation shares one
/// copy; the defaults reproduce the stock city traffic.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverParams {
    /// Hard cap on speed, world units per second.
    pub max_speed:         f32,
    /// Linear acceleration towards a higher target speed.
    pub acceleration:      f32,
    /// Linear deceleration towards a lower target speed.
    pub braking:           f32,
    /// Below this gap the agent matches the lead vehicle's speed.  Vehicles
    /// further than twice this are not sensed at all.
    pub follow_distance:   f32,
    /// Below this gap the agent brakes to a stop.
    pub safe_distance:     f32,
    /// Vehicles laterally further than this are in another lane.
    pub lane_tolerance:    f32,
    /// Heading smoothing rate, per second.
    pub turn_speed:        f32,
    /// Target speed cap while in `Turning`.
    pub turning_speed:     f32,
    /// Heading error (radians) that starts a `Turning` slow-down.
    pub turn_threshold:    f32,
    /// Distance passed to the signal stop query.
    pub signal_lookahead:  f32,
    /// A red or yellow light closer than this triggers `Stopping`.
    pub stop_trigger:      f32,
    /// Fraction of the segment the steering target runs ahead.
    pub look_ahead:        f32,
    /// Progress jumps to the steering target inside this radius.
    pub arrive_radius:     f32,
    /// Radius used to find the next segment at the end of the current one.
    pub connect_radius:    f32,
    /// Radius within which an unbound agent snaps onto a segment.
    pub bind_radius:       f32,
    /// Full on/off period of the turn signal lamp, seconds.
    pub blink_period:      f32,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            max_speed:        50.0,
            acceleration:     8.0,
            braking:          20.0,
            follow_distance:  15.0,
            safe_distance:    6.0,
            lane_tolerance:   3.0,
            turn_speed:       3.0,
            turning_speed:    15.0,
            turn_threshold:   0.6,
            signal_lookahead: 25.0,
            stop_trigger:     15.0,
            look_ahead:       0.2,
            arrive_radius:    3.0,
            connect_radius:   15.0,
            bind_radius:      20.0,
            blink_period:     0.8,
        }
    }
}
