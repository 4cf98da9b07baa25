mod common;

use aviary_lib::model::config::AppConfig;
use aviary_lib::model::evolution::{EvolutionEngine, TickOutcome};
use aviary_lib::model::history::GenerationSummary;
use aviary_lib::model::physics::ArenaWorld;
use common::EngineBuilder;

/// Runs rapier-backed training until `generations` rollovers have happened.
fn run(
    config: &AppConfig,
    generations: usize,
    parallel: bool,
) -> (Vec<GenerationSummary>, EvolutionEngine) {
    let mut world = ArenaWorld::new(&config.arena);
    let mut engine = EvolutionEngine::new(&mut world, config).unwrap();
    engine.set_parallel_inference(parallel);
    let mut ticks = 0;
    while engine.generations.len() < generations {
        if let TickOutcome::Rollover(_) = engine.tick(&mut world).unwrap() {
            continue;
        }
        ticks += 1;
        assert!(ticks < 20_000, "training stalled");
    }
    let summaries = engine.generations.iter().map(|g| g.summary()).collect();
    (summaries, engine)
}

#[test]
fn test_same_seed_same_history() {
    let config = EngineBuilder::new().with_population(6).with_seed(2024).config().clone();
    let (first, engine_a) = run(&config, 2, true);
    let (second, engine_b) = run(&config, 2, true);

    assert_eq!(first, second);
    for (a, b) in engine_a.population.iter().zip(&engine_b.population) {
        assert_eq!(a.controller, b.controller);
        assert_eq!(a.id, b.id);
    }
}

#[test]
fn test_parallel_inference_matches_sequential() {
    let config = EngineBuilder::new().with_population(6).with_seed(77).config().clone();
    let (parallel, engine_a) = run(&config, 2, true);
    let (sequential, engine_b) = run(&config, 2, false);

    assert!(!engine_b.parallel_inference());
    assert_eq!(parallel, sequential);
    for (a, b) in engine_a.population.iter().zip(&engine_b.population) {
        assert_eq!(a.controller, b.controller);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let a = EngineBuilder::new().with_population(4).with_seed(1).config().clone();
    let b = EngineBuilder::new().with_population(4).with_seed(2).config().clone();
    let mut world_a = ArenaWorld::new(&a.arena);
    let mut world_b = ArenaWorld::new(&b.arena);
    let engine_a = EvolutionEngine::new(&mut world_a, &a).unwrap();
    let engine_b = EvolutionEngine::new(&mut world_b, &b).unwrap();
    assert_ne!(
        engine_a.population[0].controller,
        engine_b.population[0].controller
    );
}

#[test]
fn test_fingerprint_tracks_training_parameters() {
    let base = AppConfig::default();
    let mut tweaked = base.clone();
    tweaked.controller.mutation_std = 0.5;
    let mut cosmetic = base.clone();
    cosmetic.trainer.speed = 8;

    assert_ne!(base.fingerprint(), tweaked.fingerprint());
    assert_eq!(base.fingerprint(), cosmetic.fingerprint());
}
