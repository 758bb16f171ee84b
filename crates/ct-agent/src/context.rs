//! Read-only inputs an agent senses each tick.

use ct_core::{AgentId, VehicleState};
use ct_road::RoadGraph;
use ct_signal::SignalQuery;

/// One vehicle in the top-of-frame snapshot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sensed {
    /// `None` for the external player vehicle.
    pub agent: Option<AgentId>,
    pub state: VehicleState,
}

/// Everything an agent may read during [`Agent::update`][crate::Agent::update].
///
/// All references are shared; nothing an agent senses can be mutated
/// through this context.
pub struct SenseContext<'a> {
    pub graph:           &'a RoadGraph,
    pub signals:         &'a (dyn SignalQuery + Sync),
    /// Every vehicle as it was at the top of the frame, including the
    /// agent being updated.
    pub others:          &'a [Sensed],
    /// Agents further than this from the origin steer back to the centre.
    pub boundary_radius: f32,
}
