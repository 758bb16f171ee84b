//! The sensing capability shared by every vehicle in the traffic core.
//!
//! NPC agents, the externally driven player vehicle, and the per-frame
//! snapshot copies all expose the same three read accessors.  The traffic
//! core only ever depends on this trait, never on a concrete vehicle type.

use crate::Vec2;

/// Read-only kinematic view of a vehicle on the ground plane.
pub trait Vehicle {
    fn position(&self) -> Vec2;

    /// Heading in radians (see [`crate::geo`] for the convention).
    fn heading(&self) -> f32;

    /// Current speed in world units per second (never negative).
    fn speed(&self) -> f32;

    /// Unit vector the vehicle is facing.
    #[inline]
    fn forward(&self) -> Vec2 {
        Vec2::from_heading(self.heading())
    }
}

/// A plain copy of a vehicle's kinematic state.
///
/// Used for the external player input and for the top-of-frame snapshot that
/// agents read when scanning for the vehicle ahead.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleState {
    pub position: Vec2,
    pub heading:  f32,
    pub speed:    f32,
}

impl VehicleState {
    #[inline]
    pub fn new(position: Vec2, heading: f32, speed: f32) -> Self {
        Self { position, heading, speed }
    }

    /// Copy the kinematic state out of any [`Vehicle`].
    pub fn of<V: Vehicle + ?Sized>(vehicle: &V) -> Self {
        Self {
            position: vehicle.position(),
            heading:  vehicle.heading(),
            speed:    vehicle.speed(),
        }
    }
}

impl Vehicle for VehicleState {
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
