//! `ct-signal`: traffic lights and their coordination.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`controller`]  | `Aspect`, `Axis`, `CardinalDirection`, `Phase`, `SignalTiming`, `SignalController` |
//! | [`coordinator`] | `SignalCoordinator`, `SignalQuery`, `StopRequest`          |
//! | [`error`]       | `SignalError`, `SignalResult<T>`                           |
//!
//! # Ownership
//!
//! The coordinator exclusively owns every controller.  Vehicles only see
//! the read-only [`SignalQuery`] trait, so they can never advance or
//! re-phase a light.

pub mod controller;
pub mod coordinator;
pub mod error;

#[cfg(test)]
mod tests;

pub use controller::{Aspect, Axis, CardinalDirection, Phase, SignalController, SignalTiming};
pub use coordinator::{
    PASSED_DISTANCE, PEDESTRIAN_RADIUS, STOP_LINE_SETBACK, SignalCoordinator, SignalQuery,
    StopRequest,
};
pub use error::{SignalError, SignalResult};
