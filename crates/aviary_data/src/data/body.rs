use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D vector in arena units. The arena uses canvas orientation: `+x` right,
/// `+y` down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Rotates the vector counter-clockwise (in arena orientation) by `angle` radians.
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}


/// Dimensions of the bounded arena the drones fly in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Maps a fractional position (`0.0..=1.0` on both axes) to arena units,
    /// flooring to whole units.
    #[must_use]
    pub fn from_fraction(&self, fx: f32, fy: f32) -> Vec2 {
        Vec2::new((self.width * fx).floor(), (self.height * fy).floor())
    }
}

/// Opaque handle to a body owned by a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    pub index: u32,
    pub generation: u32,
}

/// Kinematic state of a rigid body.
///
/// Velocities are expressed per simulation tick (arena units per tick and
/// radians per tick), which keeps controller input scaling independent of
/// the integrator's time step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
}

impl BodyState {
    #[must_use]
    pub fn at_rest(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle,
            angular_velocity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_fraction_floors() {
        let arena = Arena {
            width: 1001.0,
            height: 801.0,
        };
        assert_eq!(arena.from_fraction(0.5, 0.5), Vec2::new(500.0, 400.0));
    }

    #[test]
    fn test_distance_symmetry() {
        let a = Vec2::new(3.0, 4.0);
        assert_eq!(Vec2::ZERO.distance(a), 5.0);
        assert_eq!(a.distance(Vec2::ZERO), 5.0);
    }
}
