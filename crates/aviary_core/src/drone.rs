//! A single drone: hull, two thrusters, a controller and a waypoint course.
//!
//! A tick is split into three phases so the engine can run controller
//! inference for the whole population in parallel:
//!
//! 1. [`Drone::sense`] reads kinematics, checks walls, scores and advances
//!    waypoints, and returns the controller inputs.
//! 2. [`ControllerLogic::predict`] runs on those inputs.
//! 3. [`Drone::actuate`] sets the thrusters, queues their forces and runs the
//!    waypoint clock.
//!
//! [`Drone::update`] chains the three for callers that fly drones one at a time.

use crate::config::DroneConfig;
use crate::controller::{Controller, ControllerLogic};
use crate::physics::{BodyShape, PhysicsError, PhysicsWorld, ShapePart};
use crate::thruster::Thruster;
use aviary_data::{BodyHandle, BodyState, ControllerInputs, ControllerOutputs, DeathCause, Vec2};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DroneError {
    #[error("Drone needs at least one waypoint")]
    EmptyCourse,
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// What a drone does once it has dwelled on its current waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaypointScript {
    /// Advance through the course; clearing the last waypoint ends the flight.
    #[default]
    Sequence,
    /// Stay on the current waypoint indefinitely. Used for formation flying.
    Hover,
}

/// Scoring and timing constants copied out of [`DroneConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightRules {
    pub max_duration: u32,
    pub arrival_radius: f32,
    pub dwell_ticks: u32,
    pub speed_weight: f64,
    pub arrival_bonus: f64,
    pub angle_scale: f32,
}

impl From<&DroneConfig> for FlightRules {
    fn from(config: &DroneConfig) -> Self {
        Self {
            max_duration: config.max_duration,
            arrival_radius: config.arrival_radius,
            dwell_ticks: config.dwell_ticks,
            speed_weight: config.speed_weight,
            arrival_bonus: config.arrival_bonus,
            angle_scale: config.angle_scale,
        }
    }
}

/// Compound hull: a solid square plus two massless thruster sensors.
#[must_use]
pub fn drone_shape(config: &DroneConfig) -> BodyShape {
    let half = config.size / 2.0;
    let [tw, th] = config.thruster_size;
    let mut parts = vec![ShapePart {
        offset: Vec2::ZERO,
        half_extents: Vec2::new(half, half),
        sensor: false,
    }];
    parts.extend(config.thruster_offsets.iter().map(|[x, y]| ShapePart {
        offset: Vec2::new(*x, *y),
        half_extents: Vec2::new(tw / 2.0, th / 2.0),
        sensor: true,
    }));
    BodyShape {
        parts,
        mass: config.mass,
        linear_damping: config.linear_damping,
        angular_damping: config.angular_damping,
    }
}

/// Not `Clone`: a drone owns its physics body. Use [`Drone::copy`] for a
/// detached snapshot.
#[derive(Debug)]
pub struct Drone {
    pub id: Uuid,
    /// Physics body. `None` once destroyed and for detached snapshots.
    pub body: Option<BodyHandle>,
    /// Kinematics read at the start of the last live tick.
    pub body_state: BodyState,
    /// Left then right.
    pub thrusters: [Thruster; 2],
    pub controller: Controller,
    pub waypoints: Vec<Vec2>,
    pub current_target: usize,
    pub timer: u32,
    pub arrival_counter: u32,
    pub arrival_ticks_total: u64,
    pub waypoints_reached: usize,
    pub score: f64,
    pub fitness: f64,
    pub alive: bool,
    pub death_cause: Option<DeathCause>,
    pub script: WaypointScript,
    pub rules: FlightRules,
}

impl Drone {
    /// Spawns a drone at the configured spawn point.
    ///
    /// Fails without touching the world when the course is empty. If the new
    /// body cannot be read back it is removed again.
    pub fn new<W: PhysicsWorld + ?Sized, R: Rng>(
        world: &mut W,
        config: &DroneConfig,
        controller: Controller,
        rng: &mut R,
    ) -> Result<Self, DroneError> {
        let arena = world.arena();
        let waypoints = config.waypoints_for(&arena);
        if waypoints.is_empty() {
            return Err(DroneError::EmptyCourse);
        }
        let spawn = config.spawn_point(&arena);
        let handle = world.create_body(&drone_shape(config), spawn, config.spawn_angle);
        let body_state = match world.body_state(handle) {
            Ok(state) => state,
            Err(e) => {
                let _ = world.remove_body(handle);
                return Err(e.into());
            }
        };
        let [left, right] = config.thruster_offsets;

        Ok(Self {
            id: uuid::Builder::from_random_bytes(rng.gen()).into_uuid(),
            body: Some(handle),
            body_state,
            thrusters: [
                Thruster::new(Vec2::new(left[0], left[1]), config.thruster_force),
                Thruster::new(Vec2::new(right[0], right[1]), config.thruster_force),
            ],
            controller,
            waypoints,
            current_target: 0,
            timer: 0,
            arrival_counter: 0,
            arrival_ticks_total: 0,
            waypoints_reached: 0,
            score: 0.0,
            fitness: 0.0,
            alive: true,
            death_cause: None,
            script: WaypointScript::Sequence,
            rules: FlightRules::from(config),
        })
    }

    #[must_use]
    pub fn with_script(mut self, script: WaypointScript) -> Self {
        self.script = script;
        self
    }

    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.waypoints[self.current_target]
    }

    /// Redirects the drone by overwriting its current waypoint.
    pub fn set_target(&mut self, position: Vec2) {
        self.waypoints[self.current_target] = position;
    }

    #[must_use]
    pub fn distance_to_target(&self) -> f32 {
        self.body_state.position.distance(self.target())
    }

    /// Collision check, scoring and waypoint progress.
    ///
    /// Returns the controller inputs, or `None` when the drone is dead or
    /// died during this phase.
    pub fn sense<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
    ) -> Result<Option<ControllerInputs>, PhysicsError> {
        let Some(handle) = self.body.filter(|_| self.alive) else {
            return Ok(None);
        };
        self.body_state = world.body_state(handle)?;

        if world.hits_boundary(handle) {
            self.arrival_counter = 0;
            self.destroy(world, DeathCause::Collision)?;
            return Ok(None);
        }

        let distance = self.distance_to_target();
        self.score += 1.0 / (f64::from(distance) + 1.0);

        if distance <= self.rules.arrival_radius {
            self.arrival_counter += 1;
            self.arrival_ticks_total += 1;
            if self.arrival_counter >= self.rules.dwell_ticks && self.clear_waypoint() {
                self.destroy(world, DeathCause::Completed)?;
                return Ok(None);
            }
        } else {
            self.arrival_counter = 0;
        }

        let target_vector = self.target() - self.body_state.position;
        Ok(Some(ControllerInputs::from_state(
            &self.body_state,
            target_vector,
            &world.arena(),
        )))
    }

    /// Awards the arrival bonus and moves on. Returns true when the course
    /// is finished.
    fn clear_waypoint(&mut self) -> bool {
        let remaining = f64::from(self.rules.max_duration.saturating_sub(self.timer));
        self.score += remaining * self.rules.speed_weight + self.rules.arrival_bonus;
        self.waypoints_reached += 1;
        self.arrival_counter = 0;
        self.timer = 0;

        match self.script {
            WaypointScript::Hover => false,
            WaypointScript::Sequence => {
                if self.current_target + 1 < self.waypoints.len() {
                    self.current_target += 1;
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Sets both thrusters from controller outputs, queues their forces and
    /// advances the waypoint clock.
    pub fn actuate<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        outputs: ControllerOutputs,
    ) -> Result<(), PhysicsError> {
        let Some(handle) = self.body.filter(|_| self.alive) else {
            return Ok(());
        };

        let [left, right] = &mut self.thrusters;
        left.set_power(outputs.left_power.abs());
        right.set_power(outputs.right_power.abs());
        left.set_orientation(outputs.left_angle * self.rules.angle_scale);
        right.set_orientation(outputs.right_angle * self.rules.angle_scale);

        for thruster in &self.thrusters {
            thruster.apply(world, handle, &self.body_state)?;
        }

        self.timer += 1;
        if self.timer >= self.rules.max_duration {
            self.destroy(world, DeathCause::Timeout)?;
        }
        Ok(())
    }

    /// One full tick for this drone, without stepping the world.
    pub fn update<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) -> Result<(), PhysicsError> {
        if let Some(inputs) = self.sense(world)? {
            let outputs = self.controller.predict(&inputs);
            self.actuate(world, outputs)?;
        }
        Ok(())
    }

    fn destroy<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        cause: DeathCause,
    ) -> Result<(), PhysicsError> {
        self.alive = false;
        self.death_cause = Some(cause);
        if let Some(handle) = self.body.take() {
            world.remove_body(handle)?;
        }
        Ok(())
    }

    /// Physics-free snapshot for history records.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self {
            id: self.id,
            body: None,
            body_state: self.body_state,
            thrusters: self.thrusters,
            controller: self.controller.clone(),
            waypoints: self.waypoints.clone(),
            current_target: self.current_target,
            timer: self.timer,
            arrival_counter: self.arrival_counter,
            arrival_ticks_total: self.arrival_ticks_total,
            waypoints_reached: self.waypoints_reached,
            score: self.score,
            fitness: self.fitness,
            alive: false,
            death_cause: self.death_cause,
            script: self.script,
            rules: self.rules,
        }
    }

    /// Removes the body (if any) and releases the controller.
    pub fn dispose<W: PhysicsWorld + ?Sized>(mut self, world: &mut W) -> Result<(), PhysicsError> {
        let removed = match self.body.take() {
            Some(handle) => world.remove_body(handle),
            None => Ok(()),
        };
        self.controller.dispose();
        removed
    }
}
