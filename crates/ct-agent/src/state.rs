//! Behavior-state enums and the sensed lead vehicle.

use std::fmt;

use ct_core::{AgentId, LaneId, SegmentId};
use ct_road::Direction;

/// Finite driving state of an NPC.
///
/// ```text
///   Driving ──► Stopping ──► Waiting ──► Accelerating ──► Driving
///      │  ▲
///      ▼  │
///    Turning
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriveState {
    #[default]
    Driving,
    Stopping,
    Waiting,
    Accelerating,
    Turning,
}

impl DriveState {
    pub const ALL: [DriveState; 5] = [
        DriveState::Driving,
        DriveState::Stopping,
        DriveState::Waiting,
        DriveState::Accelerating,
        DriveState::Turning,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DriveState::Driving      => "driving",
            DriveState::Stopping     => "stopping",
            DriveState::Waiting      => "waiting",
            DriveState::Accelerating => "accelerating",
            DriveState::Turning      => "turning",
        }
    }
}

impl fmt::Display for DriveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which turn signal is on.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnSignal {
    #[default]
    None,
    Left,
    Right,
}

/// The nearest vehicle ahead in the same lane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeadVehicle {
    /// `None` for the externally driven player vehicle.
    pub agent:    Option<AgentId>,
    pub distance: f32,
    pub speed:    f32,
}

/// Where on the road graph an agent is travelling.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentTrack {
    pub segment:   SegmentId,
    pub lane:      LaneId,
    pub direction: Direction,
    /// `0` at the entry end, `1` at the exit end, in travel order.
    pub progress:  f32,
    /// Signed lateral offset from the centre line (the lane's offset).
    pub lateral:   f32,
}
