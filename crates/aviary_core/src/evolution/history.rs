use crate::drone::Drone;
use aviary_data::{DeathCause, GenerationSummary};

/// Immutable record of one finished generation.
#[derive(Debug)]
pub struct GenerationRecord {
    pub id: u32,
    /// Score sum divided by population size.
    pub mean_fitness: f64,
    pub fitness_sum: f64,
    pub best_score: f64,
    /// Detached copy of the top drone.
    pub best_agent: Drone,
    pub population: usize,
    pub collisions: usize,
    pub timeouts: usize,
    pub completions: usize,
}

impl GenerationRecord {
    pub(crate) fn from_sorted(id: u32, fitness_sum: f64, population: &[Drone]) -> Option<Self> {
        let best = population.first()?;
        let count = |cause| {
            population
                .iter()
                .filter(|d| d.death_cause == Some(cause))
                .count()
        };
        Some(Self {
            id,
            mean_fitness: fitness_sum / population.len() as f64,
            fitness_sum,
            best_score: best.score,
            best_agent: best.copy(),
            population: population.len(),
            collisions: count(DeathCause::Collision),
            timeouts: count(DeathCause::Timeout),
            completions: count(DeathCause::Completed),
        })
    }

    #[must_use]
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            id: self.id,
            population: self.population,
            mean_fitness: self.mean_fitness,
            fitness_sum: self.fitness_sum,
            best_score: self.best_score,
            best_waypoints: self.best_agent.waypoints_reached,
            collisions: self.collisions,
            timeouts: self.timeouts,
            completions: self.completions,
        }
    }
}
