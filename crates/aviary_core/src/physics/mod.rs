//! Rigid-body world contract.
//!
//! Drones and the evolution engine only talk to physics through
//! [`PhysicsWorld`]. [`ArenaWorld`] backs it with `rapier2d`; tests can plug
//! in their own deterministic worlds.

pub mod arena;

pub use arena::ArenaWorld;
pub use aviary_data::{Arena, BodyHandle, BodyState, Vec2};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("Unknown body handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("Boundary body {0:?} cannot be modified")]
    BoundaryBody(BodyHandle),
}

/// One rectangular part of a compound body, placed relative to its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePart {
    pub offset: Vec2,
    pub half_extents: Vec2,
    /// Sensor parts take part in collision checks but carry no mass.
    pub sensor: bool,
}

/// Compound rigid body description.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyShape {
    pub parts: Vec<ShapePart>,
    /// Total mass, shared evenly by the solid parts.
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

pub trait PhysicsWorld {
    fn create_body(&mut self, shape: &BodyShape, position: Vec2, angle: f32) -> BodyHandle;

    fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Queues a force for the next [`step`](Self::step). `at_point` is in world space.
    fn apply_force(
        &mut self,
        handle: BodyHandle,
        at_point: Vec2,
        force: Vec2,
    ) -> Result<(), PhysicsError>;

    /// Advances the world by one tick and clears queued forces.
    fn step(&mut self);

    /// True when any part of `a` overlaps any part of `b`.
    fn collides(&self, a: BodyHandle, b: BodyHandle) -> bool;

    fn body_state(&self, handle: BodyHandle) -> Result<BodyState, PhysicsError>;

    /// Teleports a body, overwriting its kinematics.
    fn set_body_state(&mut self, handle: BodyHandle, state: &BodyState)
        -> Result<(), PhysicsError>;

    /// Static walls around the arena. Created once, never removed.
    fn boundaries(&self) -> &[BodyHandle];

    fn arena(&self) -> Arena;

    /// Number of bodies currently in the world, boundaries included.
    fn body_count(&self) -> usize;

    /// True when `handle` touches any boundary.
    fn hits_boundary(&self, handle: BodyHandle) -> bool {
        self.boundaries().iter().any(|b| self.collides(handle, *b))
    }
}
