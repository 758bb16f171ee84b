//! Strongly typed, zero-cost identifier wrappers.
//!
//! Every arena in the traffic core (segments, lanes, waypoints,
//! intersections, agents) is a `Vec` indexed by one of these ids.  The inner
//! integer is `pub` so hot paths can index directly, but callers should prefer
//! the `.index()` helper for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" (`u32::MAX`).
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an NPC vehicle in the simulation's agent list.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a road segment in the graph arena.
    pub struct SegmentId(u32);
}

typed_id! {
    /// Index of a lane in the graph arena (unique across all segments).
    pub struct LaneId(u32);
}

typed_id! {
    /// Index of a waypoint in the graph arena.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Index of an intersection in the graph arena.
    pub struct IntersectionId(u32);
}
