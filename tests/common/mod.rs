#[macro_use]
pub mod macros;

use aviary_lib::model::config::AppConfig;
use aviary_lib::model::controller::Controller;
use aviary_lib::model::evolution::EvolutionEngine;
use aviary_lib::model::geometry::{Arena, BodyHandle, BodyState, Vec2};
use aviary_lib::model::physics::{BodyShape, PhysicsError, PhysicsWorld};
use aviary_lib::model::ControllerLogic;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};

/// Physics double whose bodies never move on their own.
///
/// Forces are recorded but ignored. Bodies change only through
/// `set_body_state`. A body touches the walls when it leaves the arena or
/// when a test marks it with `force_collision`. After `break_new_bodies`
/// freshly created bodies exist but cannot be read back.
#[allow(dead_code)]
pub struct FrozenWorld {
    arena: Arena,
    walls: Vec<BodyHandle>,
    bodies: HashMap<BodyHandle, BodyState>,
    forced: HashSet<BodyHandle>,
    unreadable: HashSet<BodyHandle>,
    break_new: bool,
    next_index: u32,
    pub steps: u64,
    pub forces_applied: u64,
}

#[allow(dead_code)]
impl FrozenWorld {
    pub fn new(width: f32, height: f32) -> Self {
        let mut world = Self {
            arena: Arena { width, height },
            walls: Vec::new(),
            bodies: HashMap::new(),
            forced: HashSet::new(),
            unreadable: HashSet::new(),
            break_new: false,
            next_index: 0,
            steps: 0,
            forces_applied: 0,
        };
        for _ in 0..4 {
            let handle = world.allocate();
            world.walls.push(handle);
        }
        world
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.arena.width, config.arena.height)
    }

    fn allocate(&mut self) -> BodyHandle {
        let handle = BodyHandle {
            index: self.next_index,
            generation: 0,
        };
        self.next_index += 1;
        handle
    }

    pub fn force_collision(&mut self, handle: BodyHandle) {
        self.forced.insert(handle);
    }

    pub fn break_new_bodies(&mut self) {
        self.break_new = true;
    }

    /// Pins a body to `position` at rest.
    pub fn hold(&mut self, handle: BodyHandle, position: Vec2) {
        self.bodies
            .insert(handle, BodyState::at_rest(position, 0.0));
    }

    /// Live drone bodies, walls excluded.
    pub fn live_bodies(&self) -> usize {
        self.bodies.len()
    }
}

impl PhysicsWorld for FrozenWorld {
    fn create_body(&mut self, _shape: &BodyShape, position: Vec2, angle: f32) -> BodyHandle {
        let handle = self.allocate();
        self.bodies.insert(handle, BodyState::at_rest(position, angle));
        if self.break_new {
            self.unreadable.insert(handle);
        }
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if self.walls.contains(&handle) {
            return Err(PhysicsError::BoundaryBody(handle));
        }
        self.forced.remove(&handle);
        self.unreadable.remove(&handle);
        self.bodies
            .remove(&handle)
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn apply_force(
        &mut self,
        handle: BodyHandle,
        _at_point: Vec2,
        _force: Vec2,
    ) -> Result<(), PhysicsError> {
        if !self.bodies.contains_key(&handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        self.forces_applied += 1;
        Ok(())
    }

    fn step(&mut self) {
        self.steps += 1;
    }

    fn collides(&self, a: BodyHandle, b: BodyHandle) -> bool {
        if !self.walls.contains(&b) {
            return false;
        }
        if self.forced.contains(&a) {
            return true;
        }
        self.bodies
            .get(&a)
            .is_some_and(|state| !self.arena.contains(state.position))
    }

    fn body_state(&self, handle: BodyHandle) -> Result<BodyState, PhysicsError> {
        if self.unreadable.contains(&handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        self.bodies
            .get(&handle)
            .copied()
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn set_body_state(
        &mut self,
        handle: BodyHandle,
        state: &BodyState,
    ) -> Result<(), PhysicsError> {
        match self.bodies.get_mut(&handle) {
            Some(current) => {
                *current = *state;
                Ok(())
            }
            None => Err(PhysicsError::UnknownBody(handle)),
        }
    }

    fn boundaries(&self) -> &[BodyHandle] {
        &self.walls
    }

    fn arena(&self) -> Arena {
        self.arena
    }

    fn body_count(&self) -> usize {
        self.walls.len() + self.bodies.len()
    }
}

/// Builder for evolution engines with deterministic defaults.
#[allow(dead_code)]
pub struct EngineBuilder {
    config: AppConfig,
    controllers: Option<Vec<Controller>>,
}

#[allow(dead_code)]
impl EngineBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.evolution.population_size = 10;
        config.evolution.seed = Some(42);
        Self {
            config,
            controllers: None,
        }
    }

    pub fn with_population(mut self, size: usize) -> Self {
        self.config.evolution.population_size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.evolution.seed = Some(seed);
        self
    }

    pub fn with_elite_fraction(mut self, fraction: f64) -> Self {
        self.config.evolution.elite_fraction = fraction;
        self
    }

    pub fn with_controllers(mut self, controllers: Vec<Controller>) -> Self {
        self.controllers = Some(controllers);
        self
    }

    pub fn with_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        f(&mut self.config);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build<W: PhysicsWorld>(self, world: &mut W) -> EvolutionEngine {
        match self.controllers {
            Some(controllers) => {
                EvolutionEngine::with_controllers(world, &self.config, controllers)
            }
            None => EvolutionEngine::new(world, &self.config),
        }
        .expect("Failed to build engine")
    }
}

/// `count` distinct controllers from a fixed seed.
#[allow(dead_code)]
pub fn seeded_controllers(count: usize, seed: u64) -> Vec<Controller> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| Controller::new_random_with_rng(&mut rng))
        .collect()
}
