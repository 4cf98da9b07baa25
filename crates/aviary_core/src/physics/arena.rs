use super::{BodyShape, PhysicsError, PhysicsWorld};
use crate::config::ArenaConfig;
use aviary_data::{Arena, BodyHandle, BodyState, Vec2};
use rapier2d::parry::query;
use rapier2d::prelude::*;

/// `rapier2d` world bounded by four static walls.
///
/// Drone parts are inserted as sensors: drones pass through each other and
/// the walls, and wall contact is detected geometrically by
/// [`PhysicsWorld::collides`].
pub struct ArenaWorld {
    arena: Arena,
    pipeline: PhysicsPipeline,
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    boundaries: Vec<BodyHandle>,
}

impl ArenaWorld {
    #[must_use]
    pub fn new(config: &ArenaConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.dt();

        let mut world = Self {
            arena: config.arena(),
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, config.gravity],
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            boundaries: Vec::with_capacity(4),
        };
        world.build_boundaries(config.wall_thickness);
        world
    }

    fn build_boundaries(&mut self, thickness: f32) {
        let w = self.arena.width;
        let h = self.arena.height;
        let t = thickness;
        // (center x, center y, width, height); the floor is wider than the arena.
        let walls = [
            (w / 2.0, h + t / 2.0, 4.0 * w, t),
            (w / 2.0, -t / 2.0, w, t),
            (-t / 2.0, h / 2.0, t, h),
            (w + t / 2.0, h / 2.0, t, h),
        ];
        for (cx, cy, ww, wh) in walls {
            let handle = self
                .bodies
                .insert(RigidBodyBuilder::fixed().translation(vector![cx, cy]).build());
            let collider = ColliderBuilder::cuboid(ww / 2.0, wh / 2.0).build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
            self.boundaries.push(to_data(handle));
        }
    }

    #[must_use]
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .get(to_rapier(handle))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies
            .get_mut(to_rapier(handle))
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// World pose of a collider derived from its parent's current position,
    /// so teleports are visible before the next step.
    fn collider_pose(&self, collider: &Collider) -> Isometry<f32> {
        match (
            collider.parent().and_then(|p| self.bodies.get(p)),
            collider.position_wrt_parent(),
        ) {
            (Some(parent), Some(local)) => parent.position() * local,
            _ => *collider.position(),
        }
    }

    fn colliders_intersect(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        let (Some(ca), Some(cb)) = (self.colliders.get(a), self.colliders.get(b)) else {
            return false;
        };
        let pa = self.collider_pose(ca);
        let pb = self.collider_pose(cb);
        query::intersection_test(&pa, ca.shape(), &pb, cb.shape()).unwrap_or(false)
    }
}

impl PhysicsWorld for ArenaWorld {
    fn create_body(&mut self, shape: &BodyShape, position: Vec2, angle: f32) -> BodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .rotation(angle)
            .linear_damping(shape.linear_damping)
            .angular_damping(shape.angular_damping)
            .can_sleep(false)
            .build();
        let handle = self.bodies.insert(body);

        let solid_parts = shape.parts.iter().filter(|p| !p.sensor).count().max(1);
        let part_mass = shape.mass / solid_parts as f32;
        for part in &shape.parts {
            let builder = ColliderBuilder::cuboid(part.half_extents.x, part.half_extents.y)
                .translation(vector![part.offset.x, part.offset.y])
                .sensor(true);
            let collider = if part.sensor {
                builder.density(0.0).build()
            } else {
                builder.mass(part_mass).build()
            };
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }
        to_data(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if self.boundaries.contains(&handle) {
            return Err(PhysicsError::BoundaryBody(handle));
        }
        self.bodies
            .remove(
                to_rapier(handle),
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn apply_force(
        &mut self,
        handle: BodyHandle,
        at_point: Vec2,
        force: Vec2,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        body.add_force_at_point(
            vector![force.x, force.y],
            point![at_point.x, at_point.y],
            true,
        );
        Ok(())
    }

    fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
        }
    }

    fn collides(&self, a: BodyHandle, b: BodyHandle) -> bool {
        let (Ok(ba), Ok(bb)) = (self.body(a), self.body(b)) else {
            return false;
        };
        ba.colliders().iter().any(|ca| {
            bb.colliders()
                .iter()
                .any(|cb| self.colliders_intersect(*ca, *cb))
        })
    }

    fn body_state(&self, handle: BodyHandle) -> Result<BodyState, PhysicsError> {
        let dt = self.dt();
        let body = self.body(handle)?;
        let t = body.translation();
        let v = body.linvel();
        Ok(BodyState {
            position: Vec2::new(t.x, t.y),
            velocity: Vec2::new(v.x * dt, v.y * dt),
            angle: body.rotation().angle(),
            angular_velocity: body.angvel() * dt,
        })
    }

    fn set_body_state(
        &mut self,
        handle: BodyHandle,
        state: &BodyState,
    ) -> Result<(), PhysicsError> {
        if self.boundaries.contains(&handle) {
            return Err(PhysicsError::BoundaryBody(handle));
        }
        let dt = self.dt();
        let body = self.body_mut(handle)?;
        body.set_position(
            Isometry::new(vector![state.position.x, state.position.y], state.angle),
            true,
        );
        body.set_linvel(vector![state.velocity.x / dt, state.velocity.y / dt], true);
        body.set_angvel(state.angular_velocity / dt, true);
        Ok(())
    }

    fn boundaries(&self) -> &[BodyHandle] {
        &self.boundaries
    }

    fn arena(&self) -> Arena {
        self.arena
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

fn to_rapier(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn to_data(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle { index, generation }
}
