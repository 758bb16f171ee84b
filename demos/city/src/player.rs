//! A synthetic player vehicle driving a fixed circle around the origin.

use std::f32::consts::TAU;

use ct_core::{Vec2, Vehicle, wrap_angle};

/// Drives counter-clockwise (as seen on the ground plane) at constant speed.
pub struct CirclingPlayer {
    radius: f32,
    speed:  f32,
    angle:  f32,
}

impl CirclingPlayer {
    pub fn new(radius: f32, speed: f32) -> Self {
        Self { radius, speed, angle: 0.0 }
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.speed * dt / self.radius) % TAU;
    }
}

impl Vehicle for CirclingPlayer {
    fn position(&self) -> Vec2 {
        Vec2::new(self.radius * self.angle.cos(), self.radius * self.angle.sin())
    }

    fn heading(&self) -> f32 {
        // Tangent of (cos a, sin a) is (−sin a, cos a), whose heading is
        // atan2(−sin a, cos a) = −a.
        wrap_angle(-self.angle)
    }

    fn speed(&self) -> f32 {
        self.speed
    }
}
