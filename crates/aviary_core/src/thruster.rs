use crate::physics::{PhysicsError, PhysicsWorld};
use aviary_data::{BodyHandle, BodyState, Vec2};

/// Force actuator mounted at a fixed offset on a drone hull.
///
/// With orientation `0` the thrust points along the hull's local up axis
/// (`-y` in arena coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thruster {
    pub max_force: f32,
    pub power: f32,
    /// Radians relative to the hull.
    pub orientation: f32,
    /// Mount point in body space.
    pub offset: Vec2,
}

impl Thruster {
    #[must_use]
    pub fn new(offset: Vec2, max_force: f32) -> Self {
        Self {
            max_force,
            power: 0.0,
            orientation: 0.0,
            offset,
        }
    }

    pub fn set_orientation(&mut self, angle: f32) {
        self.orientation = angle;
    }

    pub fn set_power(&mut self, power: f32) {
        self.power = power;
    }

    /// World-space force for a hull rotated by `body_angle`.
    #[must_use]
    pub fn force_vector(&self, body_angle: f32) -> Vec2 {
        let magnitude = self.power * self.max_force;
        Vec2::new(0.0, -magnitude).rotated(body_angle + self.orientation)
    }

    #[must_use]
    pub fn world_position(&self, body: &BodyState) -> Vec2 {
        body.position + self.offset.rotated(body.angle)
    }

    /// Queues this thruster's force on `handle` for the next physics step.
    pub fn apply<W: PhysicsWorld + ?Sized>(
        &self,
        world: &mut W,
        handle: BodyHandle,
        body: &BodyState,
    ) -> Result<(), PhysicsError> {
        world.apply_force(
            handle,
            self.world_position(body),
            self.force_vector(body.angle),
        )
    }
}
