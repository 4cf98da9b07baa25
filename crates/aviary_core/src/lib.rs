//! # Aviary Core
//!
//! Simulation and evolution engine for the Aviary drone trainer.
//!
//! This crate contains:
//! - The fixed-topology drone controller (6 → 10 → 10 → 4, tanh)
//! - Thrusters, drones and the waypoint scoring rules
//! - The physics contract and its `rapier2d` arena implementation
//! - The generational evolution engine and formation flying
//! - Configuration, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use aviary_core::config::AppConfig;
//! use aviary_core::evolution::{EvolutionEngine, TickOutcome};
//! use aviary_core::physics::ArenaWorld;
//!
//! let mut config = AppConfig::default();
//! config.evolution.population_size = 8;
//! config.evolution.seed = Some(42);
//!
//! let mut world = ArenaWorld::new(&config.arena);
//! let mut engine = EvolutionEngine::new(&mut world, &config).unwrap();
//! let outcome = engine.tick(&mut world).unwrap();
//! assert!(matches!(outcome, TickOutcome::Stepped { .. }));
//! ```

/// Training parameters loaded from `config.toml`
pub mod config;
/// Neural controller logic: forward pass, crossover, mutation
pub mod controller;
/// Drone agents and their per-tick flight algorithm
pub mod drone;
/// Generational genetic algorithm
pub mod evolution;
/// Formation flying with a pretrained controller
pub mod formation;
/// Metrics collection and logging setup
pub mod metrics;
/// Rigid-body world contract and the rapier-backed arena
pub mod physics;
pub mod thruster;

pub use aviary_data as data;
