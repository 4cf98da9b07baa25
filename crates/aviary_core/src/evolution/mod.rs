//! Generational genetic algorithm over a population of drones.
//!
//! The engine flies every live drone once per [`tick`](EvolutionEngine::tick)
//! and steps the world once. When the whole population is down it rolls over:
//! fitness is normalized, the generation is recorded, elites are cloned and the
//! remaining slots are bred by fitness-proportional selection.

pub mod history;
pub mod selection;

pub use history::GenerationRecord;
pub use selection::{normalize_fitness, select_index, sort_by_fitness};

use crate::config::{AppConfig, ControllerConfig};
use crate::controller::{Controller, ControllerError, ControllerLogic, ControllerWeights};
use crate::drone::{Drone, DroneError};
use crate::metrics::Metrics;
use crate::physics::{PhysicsError, PhysicsWorld};
use aviary_data::{ControllerInputs, ControllerOutputs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("Population is empty")]
    EmptyPopulation,
    #[error("Invalid population size {0}, must be at least 1")]
    InvalidPopulationSize(usize),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Drone(#[from] DroneError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every drone was down; a new generation replaced them. Carries the id
    /// of the recorded generation.
    Rollover(u32),
    /// Live drones were updated and the world stepped once.
    Stepped { alive: usize },
}

pub struct EvolutionEngine {
    pub population: Vec<Drone>,
    /// Id of the generation currently flying. Starts at 1.
    pub generation_count: u32,
    pub generations: Vec<GenerationRecord>,
    pub highscore: f64,
    pub elite_fraction: f64,
    target_size: usize,
    parallel_inference: bool,
    config: AppConfig,
    rng: ChaCha8Rng,
    metrics: Metrics,
}

impl EvolutionEngine {
    /// Spawns a population of random controllers.
    pub fn new<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        config: &AppConfig,
    ) -> Result<Self, EvolutionError> {
        let mut rng = seeded_rng(config.evolution.seed);
        let controllers = (0..config.evolution.population_size)
            .map(|_| Controller::new_random_with_rng(&mut rng))
            .collect();
        Self::assemble(world, config, controllers, rng)
    }

    /// Spawns one drone per supplied controller.
    pub fn with_controllers<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        config: &AppConfig,
        controllers: Vec<Controller>,
    ) -> Result<Self, EvolutionError> {
        let rng = seeded_rng(config.evolution.seed);
        Self::assemble(world, config, controllers, rng)
    }

    fn assemble<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        config: &AppConfig,
        controllers: Vec<Controller>,
        rng: ChaCha8Rng,
    ) -> Result<Self, EvolutionError> {
        config
            .validate()
            .map_err(|e| EvolutionError::InvalidConfig(e.to_string()))?;
        if controllers.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        let mut engine = Self {
            population: Vec::new(),
            generation_count: 1,
            generations: Vec::new(),
            highscore: 0.0,
            elite_fraction: config.evolution.elite_fraction,
            target_size: controllers.len(),
            parallel_inference: cfg!(feature = "parallel"),
            config: config.clone(),
            rng,
            metrics: Metrics::new(),
        };
        engine.replace_population(world, controllers)?;
        tracing::info!(
            population = engine.population.len(),
            fingerprint = %config.fingerprint(),
            "Evolution engine ready"
        );
        Ok(engine)
    }

    fn spawn<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        controller: Controller,
    ) -> Result<Drone, DroneError> {
        let drone = Drone::new(world, &self.config.drone, controller, &mut self.rng)?;
        self.metrics.record_spawn();
        Ok(drone)
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs controller inference on the rayon pool. Without the `parallel`
    /// feature inference is always sequential and this has no effect.
    pub fn set_parallel_inference(&mut self, enabled: bool) {
        self.parallel_inference = enabled && cfg!(feature = "parallel");
    }

    #[must_use]
    pub fn parallel_inference(&self) -> bool {
        self.parallel_inference
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.population.iter().filter(|d| d.alive).count()
    }

    /// Population size the next rollover will produce.
    #[must_use]
    pub fn target_population_size(&self) -> usize {
        self.target_size
    }

    /// Resizes the population at the next rollover.
    pub fn set_population_size(&mut self, size: usize) -> Result<(), EvolutionError> {
        if size == 0 {
            return Err(EvolutionError::InvalidPopulationSize(size));
        }
        self.target_size = size;
        Ok(())
    }

    /// Slot 0. After a rollover it flies the previous generation's best
    /// controller, since elites are placed first.
    #[must_use]
    pub fn best_agent(&self) -> Option<&Drone> {
        self.population.first()
    }

    /// Advances the simulation by one tick, rolling over when every drone is down.
    pub fn tick<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
    ) -> Result<TickOutcome, EvolutionError> {
        if self.population.iter().all(|d| !d.alive) {
            let id = self.rollover(world)?;
            return Ok(TickOutcome::Rollover(id));
        }

        let start = Instant::now();
        let was_alive: Vec<bool> = self.population.iter().map(|d| d.alive).collect();
        let mut inputs: Vec<Option<ControllerInputs>> = Vec::with_capacity(self.population.len());
        for drone in &mut self.population {
            inputs.push(drone.sense(world)?);
        }

        let outputs = predict_all(&self.population, &inputs, self.parallel_inference);

        for (drone, output) in self.population.iter_mut().zip(outputs) {
            if let Some(output) = output {
                drone.actuate(world, output)?;
            }
        }

        for (drone, was) in self.population.iter().zip(was_alive) {
            if let (true, false, Some(cause)) = (was, drone.alive, drone.death_cause) {
                self.metrics.record_death(cause);
            }
        }

        world.step();
        let alive = self.alive_count();
        self.metrics.record_tick(start.elapsed(), alive);
        Ok(TickOutcome::Stepped { alive })
    }

    /// Ends the current generation and replaces the population.
    ///
    /// Returns the id of the recorded generation.
    pub fn rollover<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
    ) -> Result<u32, EvolutionError> {
        if self.population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let fitness_sum = normalize_fitness(&mut self.population);
        sort_by_fitness(&mut self.population);

        let id = self.generation_count;
        let record = GenerationRecord::from_sorted(id, fitness_sum, &self.population)
            .ok_or(EvolutionError::EmptyPopulation)?;

        let target = self.target_size;
        let elite_count = ((target as f64 * self.elite_fraction).floor() as usize)
            .max(1)
            .min(target)
            .min(self.population.len());

        let fitness: Vec<f64> = self.population.iter().map(|d| d.fitness).collect();
        let mut controllers: Vec<Controller> = self.population[..elite_count]
            .iter()
            .map(|d| d.controller.clone())
            .collect();
        while controllers.len() < target {
            let a = select_index(&fitness, self.rng.gen());
            let b = select_index(&fitness, self.rng.gen());
            controllers.push(breed(
                &self.population[a].controller,
                &self.population[b].controller,
                &self.config.controller,
                &mut self.rng,
            ));
        }

        let best_score = self
            .population
            .iter()
            .map(|d| d.score)
            .fold(f64::NEG_INFINITY, f64::max);
        self.replace_population(world, controllers)?;

        if best_score > self.highscore {
            self.highscore = best_score;
        }

        tracing::info!(
            generation = id,
            fitness_sum = fitness_sum,
            mean_fitness = record.mean_fitness,
            best_score = record.best_score,
            elite_count = elite_count,
            population = target,
            elapsed_s = self.metrics.elapsed().as_secs_f64(),
            "Generation complete"
        );

        self.generations.push(record);
        self.generation_count += 1;
        self.metrics.record_rollover();
        Ok(id)
    }

    /// Spawns the next population before releasing the current one, so a
    /// failed spawn leaves the running population untouched.
    fn replace_population<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        controllers: Vec<Controller>,
    ) -> Result<(), DroneError> {
        let mut fresh = Vec::with_capacity(controllers.len());
        for controller in controllers {
            match self.spawn(world, controller) {
                Ok(drone) => fresh.push(drone),
                Err(e) => {
                    for drone in fresh {
                        self.dispose_drone(world, drone);
                    }
                    return Err(e);
                }
            }
        }
        let old = std::mem::replace(&mut self.population, fresh);
        for drone in old {
            self.dispose_drone(world, drone);
        }
        Ok(())
    }

    fn dispose_drone<W: PhysicsWorld + ?Sized>(&self, world: &mut W, drone: Drone) {
        if let Err(e) = drone.dispose(world) {
            tracing::warn!(error = %e, "Drone body already gone");
        }
        self.metrics.record_dispose();
    }

    /// Restarts training from one controller: slot 0 gets it unchanged, every
    /// other slot a mutated self-cross. History and highscore are cleared.
    pub fn reseed<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        controller: Controller,
    ) -> Result<(), EvolutionError> {
        let mut controllers = Vec::with_capacity(self.target_size);
        for _ in 1..self.target_size {
            controllers.push(breed(
                &controller,
                &controller,
                &self.config.controller,
                &mut self.rng,
            ));
        }
        controllers.insert(0, controller);

        self.replace_population(world, controllers)?;
        self.generation_count = 1;
        self.generations.clear();
        self.highscore = 0.0;
        tracing::info!(population = self.target_size, "Population reseeded");
        Ok(())
    }

    /// [`reseed`](Self::reseed) from a weight snapshot, rejecting foreign topologies.
    pub fn reseed_from_weights<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: &mut W,
        weights: ControllerWeights,
    ) -> Result<(), EvolutionError> {
        let controller = Controller::from_weights(weights)?;
        self.reseed(world, controller)
    }

    /// Removes every body the population still holds.
    pub fn dispose<W: PhysicsWorld + ?Sized>(mut self, world: &mut W) {
        for drone in std::mem::take(&mut self.population) {
            self.dispose_drone(world, drone);
        }
    }
}

/// Crossover followed by mutation.
pub fn breed<R: Rng>(
    a: &Controller,
    b: &Controller,
    config: &ControllerConfig,
    rng: &mut R,
) -> Controller {
    let mut child = a.crossover_with_rng(b, config.crossover, rng);
    child.mutate_with_config(config, rng);
    child
}

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn predict_all(
    population: &[Drone],
    inputs: &[Option<ControllerInputs>],
    parallel: bool,
) -> Vec<Option<ControllerOutputs>> {
    #[cfg(feature = "parallel")]
    if parallel {
        return population
            .par_iter()
            .zip(inputs.par_iter())
            .map(|(drone, input)| input.as_ref().map(|i| drone.controller.predict(i)))
            .collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    population
        .iter()
        .zip(inputs)
        .map(|(drone, input)| input.as_ref().map(|i| drone.controller.predict(i)))
        .collect()
}
